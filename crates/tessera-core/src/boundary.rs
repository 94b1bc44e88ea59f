//! Named mesh boundaries.

use indexmap::IndexMap;

use crate::id::BoundaryId;

/// Mesh boundary names, in declaration order.
///
/// IDs are assigned densely from zero as names are inserted.
#[derive(Clone, Debug, Default)]
pub struct BoundaryTable {
    names: IndexMap<String, BoundaryId>,
}

impl BoundaryTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name`, returning its ID. Re-inserting returns the
    /// existing ID.
    pub fn insert(&mut self, name: impl Into<String>) -> BoundaryId {
        let next = BoundaryId(self.names.len() as u16);
        *self.names.entry(name.into()).or_insert(next)
    }

    /// ID of the boundary called `name`.
    pub fn id(&self, name: &str) -> Option<BoundaryId> {
        self.names.get(name).copied()
    }

    /// Name of boundary `id`.
    pub fn name(&self, id: BoundaryId) -> Option<&str> {
        self.names
            .get_index(id.0 as usize)
            .map(|(name, _)| name.as_str())
    }

    /// Number of boundaries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(name, id)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, BoundaryId)> {
        self.names.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

impl<S: Into<String>> FromIterator<S> for BoundaryTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::new();
        for name in iter {
            table.insert(name);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_dense_ids() {
        let mut table = BoundaryTable::new();
        assert_eq!(table.insert("left"), BoundaryId(0));
        assert_eq!(table.insert("right"), BoundaryId(1));
        assert_eq!(table.insert("left"), BoundaryId(0));
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(BoundaryId(1)), Some("right"));
        assert_eq!(table.name(BoundaryId(7)), None);
    }

    #[test]
    fn collects_in_order() {
        let table: BoundaryTable = ["bottom", "top"].into_iter().collect();
        let names: Vec<_> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["bottom", "top"]);
        assert_eq!(table.id("top"), Some(BoundaryId(1)));
        assert!(!table.is_empty());
    }
}
