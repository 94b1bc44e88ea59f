//! The [`SidePostprocessor`] trait and its evaluation context.
//!
//! A side postprocessor integrates a per-quadrature-point quantity over
//! the element sides of one or more boundaries. The framework calls
//! [`execute`](SidePostprocessor::execute) once per side with the
//! thread's data positioned on that side; partial results live in a
//! [`SideAccumulator`] per thread and are joined before
//! [`value`](SidePostprocessor::value) is read.

use tessera_core::{
    BoundaryId, BoundaryTable, InputParameters, Real, RealVectorValue, ThreadId, VarKindFilter,
};
use tessera_vars::{FaceQuadrature, Subproblem, ThreadData, VariableBinding};
use tracing::debug;

use crate::error::PostprocessorError;

/// Boundaries and variable a side postprocessor integrates over.
#[derive(Clone, Debug)]
pub struct SideBinding {
    object: String,
    boundaries: Vec<BoundaryId>,
    boundary_names: Vec<String>,
    variable: VariableBinding<Real>,
}

impl SideBinding {
    /// Resolve every name under `boundary` and bind `variable` (any kind)
    /// at quadrature points.
    pub fn resolve(
        object: &str,
        params: &InputParameters,
        boundaries: &BoundaryTable,
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<Self, PostprocessorError> {
        let names: Vec<&str> = params
            .names("boundary")
            .into_iter()
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            return Err(PostprocessorError::MissingBoundary {
                object: object.to_string(),
            });
        }
        let ids = names
            .iter()
            .map(|name| {
                boundaries
                    .id(name)
                    .ok_or_else(|| PostprocessorError::UnknownBoundary {
                        object: object.to_string(),
                        boundary: name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let variable = VariableBinding::<Real>::builder(object, params)
            .kind(VarKindFilter::Any)
            .resolve(subproblem, thread)?;
        debug!(
            object,
            variable = variable.name(),
            boundaries = ?names,
            "bound side postprocessor"
        );
        Ok(Self {
            object: object.to_string(),
            boundaries: ids,
            boundary_names: names.into_iter().map(str::to_string).collect(),
            variable,
        })
    }

    /// Name of the owning object.
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Boundaries integrated over.
    pub fn boundaries(&self) -> &[BoundaryId] {
        &self.boundaries
    }

    /// Their names, in the order given.
    pub fn boundary_names(&self) -> &[String] {
        &self.boundary_names
    }

    /// Whether `boundary` is one of this object's boundaries.
    pub fn applies_to(&self, boundary: BoundaryId) -> bool {
        self.boundaries.contains(&boundary)
    }

    /// The integrated variable.
    pub fn variable(&self) -> &VariableBinding<Real> {
        &self.variable
    }

    /// Build the evaluation context for the side `data` is positioned on.
    ///
    /// # Errors
    ///
    /// [`PostprocessorError::InconsistentQuadrature`] if the face arrays
    /// disagree with each other or with the variable's values.
    pub fn context<'a>(&'a self, data: &'a ThreadData) -> Result<SideContext<'a>, PostprocessorError> {
        let view = self.variable.attach(data)?;
        let face = data.assembly().face();
        let u = view.value()?;
        let n_qp = face.n_qp();
        if !face.is_consistent() {
            return Err(self.inconsistent(n_qp, face.coord.len().min(face.normals.len())));
        }
        if u.len() != n_qp {
            return Err(self.inconsistent(n_qp, u.len()));
        }
        Ok(SideContext {
            object: &self.object,
            u,
            grad_u: view.gradient()?,
            face,
        })
    }

    fn inconsistent(&self, n_qp: usize, available: usize) -> PostprocessorError {
        PostprocessorError::InconsistentQuadrature {
            object: self.object.clone(),
            n_qp,
            available,
        }
    }
}

/// Variable values and face geometry on the current side.
#[derive(Clone, Copy, Debug)]
pub struct SideContext<'a> {
    object: &'a str,
    u: &'a [Real],
    grad_u: &'a [RealVectorValue],
    face: &'a FaceQuadrature,
}

impl<'a> SideContext<'a> {
    /// Quadrature data of the side.
    pub fn face(&self) -> &'a FaceQuadrature {
        self.face
    }

    /// Number of quadrature points.
    pub fn n_qp(&self) -> usize {
        self.face.n_qp()
    }

    /// Variable value at `qp`.
    pub fn u(&self, qp: usize) -> Result<Real, PostprocessorError> {
        self.u.get(qp).copied().ok_or_else(|| self.missing(self.u.len()))
    }

    /// Variable gradient at `qp`.
    pub fn grad_u(&self, qp: usize) -> Result<RealVectorValue, PostprocessorError> {
        self.grad_u
            .get(qp)
            .copied()
            .ok_or_else(|| self.missing(self.grad_u.len()))
    }

    /// Outward normal at `qp`.
    pub fn normal(&self, qp: usize) -> Result<RealVectorValue, PostprocessorError> {
        self.face
            .normals
            .get(qp)
            .copied()
            .ok_or_else(|| self.missing(self.face.normals.len()))
    }

    fn missing(&self, available: usize) -> PostprocessorError {
        PostprocessorError::InconsistentQuadrature {
            object: self.object.to_string(),
            n_qp: self.face.n_qp(),
            available,
        }
    }
}

/// Running totals of one thread's side integration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SideAccumulator {
    integral: Real,
    measure: Real,
    sides: usize,
}

impl SideAccumulator {
    /// Zeroed totals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one side's integral and measure.
    pub fn add(&mut self, integral: Real, measure: Real) {
        self.integral += integral;
        self.measure += measure;
        self.sides += 1;
    }

    /// Fold another thread's totals into this one.
    pub fn join(&mut self, other: &Self) {
        self.integral += other.integral;
        self.measure += other.measure;
        self.sides += other.sides;
    }

    /// Summed integral.
    pub fn integral(&self) -> Real {
        self.integral
    }

    /// Summed side measure.
    pub fn measure(&self) -> Real {
        self.measure
    }

    /// Number of sides added.
    pub fn sides(&self) -> usize {
        self.sides
    }
}

/// A postprocessor that integrates over boundary sides.
///
/// Implementors supply [`compute_qp_integral`](Self::compute_qp_integral);
/// the provided methods weight it by `JxW * coord`, accumulate, and
/// report the total. Evaluation is `&self`; state lives in the caller's
/// [`SideAccumulator`].
pub trait SidePostprocessor: Send {
    /// Object name for error reporting.
    fn name(&self) -> &str;

    /// Boundaries and variable.
    fn side(&self) -> &SideBinding;

    /// Integrand at quadrature point `qp`.
    fn compute_qp_integral(&self, qp: usize, ctx: &SideContext<'_>)
        -> Result<Real, PostprocessorError>;

    /// Boundaries integrated over.
    fn boundaries(&self) -> &[BoundaryId] {
        self.side().boundaries()
    }

    /// `sum_qp JxW[qp] * coord[qp] * f(qp)` over the current side.
    fn compute_integral(&self, ctx: &SideContext<'_>) -> Result<Real, PostprocessorError> {
        let face = ctx.face();
        let mut sum = 0.0;
        for qp in 0..face.n_qp() {
            sum += face.jxw[qp] * face.coord[qp] * self.compute_qp_integral(qp, ctx)?;
        }
        Ok(sum)
    }

    /// Integrate the side `data` is positioned on into `acc`.
    fn execute(&self, data: &ThreadData, acc: &mut SideAccumulator) -> Result<(), PostprocessorError> {
        let ctx = self.side().context(data)?;
        let integral = self.compute_integral(&ctx)?;
        acc.add(integral, ctx.face().side_volume);
        Ok(())
    }

    /// Final value from the joined totals. Defaults to the integral.
    fn value(&self, acc: &SideAccumulator) -> Result<Real, PostprocessorError> {
        Ok(acc.integral())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accumulator_joins_threads() {
        let mut a = SideAccumulator::new();
        a.add(1.0, 0.5);
        let mut b = SideAccumulator::new();
        b.add(2.0, 0.25);
        b.add(0.5, 0.25);
        a.join(&b);
        assert_eq!(a.integral(), 3.5);
        assert_eq!(a.measure(), 1.0);
        assert_eq!(a.sides(), 3);
    }

    proptest! {
        #[test]
        fn split_accumulation_matches_serial(
            sides in prop::collection::vec((-100i32..100, 0u8..10), 0..40),
            split in 0usize..40,
        ) {
            let split = split.min(sides.len());
            let mut serial = SideAccumulator::new();
            let mut first = SideAccumulator::new();
            let mut second = SideAccumulator::new();
            for (i, (integral, measure)) in sides.iter().enumerate() {
                let (integral, measure) = (*integral as Real, *measure as Real);
                serial.add(integral, measure);
                if i < split {
                    first.add(integral, measure);
                } else {
                    second.add(integral, measure);
                }
            }
            first.join(&second);
            prop_assert_eq!(first, serial);
        }
    }
}
