//! Automatic output of material properties.
//!
//! [`plan_material_output`] runs once at setup. It decides which material
//! properties are written to which outputs, expands each property into
//! scalar auxiliary variables through the [`ExpanderRegistry`], and
//! builds per-output hide lists. The resulting [`MaterialOutputPlan`] is
//! applied to a [`Subproblem`] with
//! [`add_aux_variables`](MaterialOutputPlan::add_aux_variables).

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tessera_core::{VariableDef, VariableError, VariableId};
use tessera_vars::Subproblem;
use tracing::{debug, warn};

use crate::registry::{AuxKind, ExpanderRegistry, PropertyType};

/// Output name meaning "write this material to no output".
pub const NO_OUTPUT: &str = "none";

// ── Declarations ───────────────────────────────────────────────────

/// Where a material is defined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Restriction {
    /// On these subdomains.
    Blocks(Vec<String>),
    /// On these boundaries.
    Boundaries(Vec<String>),
}

/// A material as seen by the output planner.
#[derive(Clone, Debug)]
pub struct MaterialDecl {
    name: String,
    properties: IndexMap<String, PropertyType>,
    output_properties: Vec<String>,
    outputs: BTreeSet<String>,
    restriction: Restriction,
}

impl MaterialDecl {
    /// A material on every block, writing to no output.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
            output_properties: Vec::new(),
            outputs: [NO_OUTPUT.to_string()].into(),
            restriction: Restriction::Blocks(Vec::new()),
        }
    }

    /// Declare a supplied property.
    pub fn property(mut self, name: impl Into<String>, ty: PropertyType) -> Self {
        self.properties.insert(name.into(), ty);
        self
    }

    /// Limit output to these properties. Empty means all.
    pub fn output_properties<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.output_properties = names.into_iter().map(Into::into).collect();
        self
    }

    /// Outputs this material writes to.
    pub fn outputs<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.outputs = names.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to subdomains.
    pub fn blocks<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.restriction = Restriction::Blocks(names.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to boundaries.
    pub fn boundaries<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.restriction = Restriction::Boundaries(names.into_iter().map(Into::into).collect());
        self
    }

    /// Material name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the material is defined.
    pub fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    fn writes_to_outputs(&self) -> bool {
        !self.outputs.contains(NO_OUTPUT)
    }
}

/// An output object's material-property settings.
#[derive(Clone, Debug, Default)]
pub struct OutputDecl {
    /// Output name.
    pub name: String,
    /// Whether this output requests material properties.
    pub output_material_properties: bool,
    /// Properties it requests (when enabled).
    pub show_material_properties: Vec<String>,
}

impl OutputDecl {
    /// An output that does not request material properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Request the listed material properties.
    pub fn show<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.output_material_properties = true;
        self.show_material_properties = names.into_iter().map(Into::into).collect();
        self
    }
}

// ── Plan ───────────────────────────────────────────────────────────

/// When an aux computation runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecuteOn {
    /// At the end of each timestep, after the solve.
    TimestepEnd,
}

/// One auxiliary computation copying a property into a variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuxComputation {
    /// `<material>_<variable>`.
    pub name: String,
    /// What is copied.
    pub kind: AuxKind,
    /// Source property.
    pub property: String,
    /// Target aux variable.
    pub variable: String,
    /// Schedule.
    pub execute_on: ExecuteOn,
    /// Inherited from the material.
    pub restriction: Restriction,
}

/// Everything material output adds to a problem.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct MaterialOutputPlan {
    computations: Vec<AuxComputation>,
    variables: BTreeSet<String>,
    hide: BTreeMap<String, BTreeSet<String>>,
}

impl MaterialOutputPlan {
    /// Aux computations in creation order.
    pub fn computations(&self) -> &[AuxComputation] {
        &self.computations
    }

    /// Names of the aux variables to create, sorted and deduplicated.
    pub fn aux_variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    /// Variables `output` must not show, if it has a hide list.
    pub fn hidden_for(&self, output: &str) -> Option<&BTreeSet<String>> {
        self.hide.get(output)
    }

    /// Every `(output, hidden variables)` pair.
    pub fn hide_lists(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.hide
    }

    /// Whether the plan adds nothing.
    pub fn is_empty(&self) -> bool {
        self.computations.is_empty()
    }

    /// Register each planned aux variable (elemental scalar auxiliary)
    /// with `subproblem`, returning the new IDs in name order.
    ///
    /// Nothing is registered unless every name is free.
    ///
    /// # Errors
    ///
    /// [`VariableError::DuplicateVariable`] if a name is already taken.
    pub fn add_aux_variables(
        &self,
        subproblem: &mut Subproblem,
    ) -> Result<Vec<VariableId>, VariableError> {
        if let Some(taken) = self.variables.iter().find(|n| subproblem.has_variable(n)) {
            return Err(VariableError::DuplicateVariable {
                name: taken.clone(),
            });
        }
        self.variables
            .iter()
            .map(|name| {
                let def = VariableDef::scalar(name.as_str())
                    .auxiliary()
                    .interpolated();
                subproblem.add_variable(def)
            })
            .collect()
    }
}

// ── Planning ───────────────────────────────────────────────────────

/// Plan material property output with the built-in property types.
pub fn plan_material_output(
    materials: &[MaterialDecl],
    outputs: &[OutputDecl],
) -> MaterialOutputPlan {
    plan_material_output_with(&ExpanderRegistry::default(), materials, outputs)
}

/// Plan material property output using `registry` to expand properties.
///
/// - With no outputs declared the plan is empty.
/// - Properties requested by outputs are appended to every material's
///   `output_properties`.
/// - A material contributes when some output requests properties or its
///   own `outputs` does not contain [`NO_OUTPUT`].
/// - A property is emitted when the material's list is empty or names it.
/// - For each output a material names, every planned variable that no
///   such material produces is hidden from that output.
pub fn plan_material_output_with(
    registry: &ExpanderRegistry,
    materials: &[MaterialDecl],
    outputs: &[OutputDecl],
) -> MaterialOutputPlan {
    let mut plan = MaterialOutputPlan::default();
    if outputs.is_empty() {
        return plan;
    }

    let requested: BTreeSet<&str> = outputs
        .iter()
        .filter(|o| o.output_material_properties)
        .flat_map(|o| o.show_material_properties.iter().map(String::as_str))
        .collect();
    let outputs_have_properties = outputs.iter().any(|o| o.output_material_properties);

    let mut shown: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for material in materials {
        if !(outputs_have_properties || material.writes_to_outputs()) {
            continue;
        }
        let mut wanted: Vec<&str> = material
            .output_properties
            .iter()
            .map(String::as_str)
            .collect();
        if outputs_have_properties {
            wanted.extend(requested.iter().copied());
        }

        let mut names: Vec<(&String, &PropertyType)> = material.properties.iter().collect();
        names.sort_by(|a, b| a.0.cmp(b.0));

        let mut material_variables = BTreeSet::new();
        for (property, ty) in names {
            if !(wanted.is_empty() || wanted.contains(&property.as_str())) {
                continue;
            }
            let Some(expansion) = registry.expand(ty, property) else {
                warn!(
                    material = material.name(),
                    property = property.as_str(),
                    ty = %ty,
                    "material property type is not supported for automatic output"
                );
                continue;
            };
            for (variable, kind) in expansion {
                plan.computations.push(AuxComputation {
                    name: format!("{}_{}", material.name(), variable),
                    kind,
                    property: property.clone(),
                    variable: variable.clone(),
                    execute_on: ExecuteOn::TimestepEnd,
                    restriction: material.restriction.clone(),
                });
                plan.variables.insert(variable.clone());
                material_variables.insert(variable);
            }
        }

        for output in material.outputs.iter().filter(|o| o.as_str() != NO_OUTPUT) {
            shown
                .entry(output.clone())
                .or_default()
                .extend(material_variables.iter().cloned());
        }
    }

    for (output, visible) in shown {
        let hidden: BTreeSet<String> = plan.variables.difference(&visible).cloned().collect();
        plan.hide.insert(output, hidden);
    }

    debug!(
        computations = plan.computations.len(),
        variables = plan.variables.len(),
        "planned material output"
    );
    plan
}
