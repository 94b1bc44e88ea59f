//! Property types and the registry that expands them into aux outputs.

use std::fmt;

use indexmap::IndexMap;
use tessera_core::MESH_DIM;

/// Declared value type of a material property.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// A scalar.
    Real,
    /// A 3-vector.
    RealVector,
    /// A 3x3 tensor.
    RealTensor,
    /// A rank-two tensor.
    RankTwoTensor,
    /// A rank-four tensor.
    RankFourTensor,
    /// Any other type, by name.
    Other(String),
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => write!(f, "Real"),
            Self::RealVector => write!(f, "RealVectorValue"),
            Self::RealTensor => write!(f, "RealTensorValue"),
            Self::RankTwoTensor => write!(f, "RankTwoTensor"),
            Self::RankFourTensor => write!(f, "RankFourTensor"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// The auxiliary computation that copies one scalar out of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuxKind {
    /// Copy a scalar property.
    MaterialRealAux,
    /// Copy one component of a vector property.
    MaterialRealVectorValueAux {
        /// Component index.
        component: usize,
    },
    /// Copy one entry of a tensor property.
    MaterialRealTensorValueAux {
        /// Row index.
        row: usize,
        /// Column index.
        column: usize,
    },
    /// Copy one entry of a rank-two tensor property.
    MaterialRankTwoTensorAux {
        /// First index.
        i: usize,
        /// Second index.
        j: usize,
    },
    /// Copy one entry of a rank-four tensor property.
    MaterialRankFourTensorAux {
        /// First index.
        i: usize,
        /// Second index.
        j: usize,
        /// Third index.
        k: usize,
        /// Fourth index.
        l: usize,
    },
}

impl AuxKind {
    /// Type name of the computation.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::MaterialRealAux => "MaterialRealAux",
            Self::MaterialRealVectorValueAux { .. } => "MaterialRealVectorValueAux",
            Self::MaterialRealTensorValueAux { .. } => "MaterialRealTensorValueAux",
            Self::MaterialRankTwoTensorAux { .. } => "MaterialRankTwoTensorAux",
            Self::MaterialRankFourTensorAux { .. } => "MaterialRankFourTensorAux",
        }
    }
}

/// One scalar output of a property: the aux variable name and the
/// computation that fills it.
pub type Expansion = Vec<(String, AuxKind)>;

/// Expands a property named by the first argument into its outputs.
pub type Expander = fn(&str) -> Expansion;

/// Maps each supported [`PropertyType`] to its [`Expander`].
#[derive(Clone, Debug)]
pub struct ExpanderRegistry {
    expanders: IndexMap<PropertyType, Expander>,
}

impl Default for ExpanderRegistry {
    /// The five built-in types.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(PropertyType::Real, expand_real);
        registry.register(PropertyType::RealVector, expand_vector);
        registry.register(PropertyType::RealTensor, expand_tensor);
        registry.register(PropertyType::RankTwoTensor, expand_rank_two);
        registry.register(PropertyType::RankFourTensor, expand_rank_four);
        registry
    }
}

impl ExpanderRegistry {
    /// A registry that supports nothing.
    pub fn empty() -> Self {
        Self {
            expanders: IndexMap::new(),
        }
    }

    /// Add or replace the expander for `ty`.
    pub fn register(&mut self, ty: PropertyType, expander: Expander) {
        self.expanders.insert(ty, expander);
    }

    /// Whether `ty` has an expander.
    pub fn supports(&self, ty: &PropertyType) -> bool {
        self.expanders.contains_key(ty)
    }

    /// Outputs of property `name` of type `ty`, or `None` if unsupported.
    pub fn expand(&self, ty: &PropertyType, name: &str) -> Option<Expansion> {
        self.expanders.get(ty).map(|expand| expand(name))
    }
}

const COMPONENT_SUFFIX: [char; 3] = ['x', 'y', 'z'];

fn expand_real(name: &str) -> Expansion {
    vec![(name.to_string(), AuxKind::MaterialRealAux)]
}

fn expand_vector(name: &str) -> Expansion {
    (0..MESH_DIM)
        .map(|component| {
            (
                format!("{name}_{}", COMPONENT_SUFFIX[component]),
                AuxKind::MaterialRealVectorValueAux { component },
            )
        })
        .collect()
}

fn pairs() -> impl Iterator<Item = (usize, usize)> {
    (0..MESH_DIM).flat_map(|i| (0..MESH_DIM).map(move |j| (i, j)))
}

fn expand_tensor(name: &str) -> Expansion {
    pairs()
        .map(|(row, column)| {
            (
                format!("{name}_{row}{column}"),
                AuxKind::MaterialRealTensorValueAux { row, column },
            )
        })
        .collect()
}

fn expand_rank_two(name: &str) -> Expansion {
    pairs()
        .map(|(i, j)| {
            (
                format!("{name}_{i}{j}"),
                AuxKind::MaterialRankTwoTensorAux { i, j },
            )
        })
        .collect()
}

fn expand_rank_four(name: &str) -> Expansion {
    pairs()
        .flat_map(|(i, j)| pairs().map(move |(k, l)| (i, j, k, l)))
        .map(|(i, j, k, l)| {
            (
                format!("{name}_{i}{j}{k}{l}"),
                AuxKind::MaterialRankFourTensorAux { i, j, k, l },
            )
        })
        .collect()
}
