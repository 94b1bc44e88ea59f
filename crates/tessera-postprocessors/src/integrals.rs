//! Reference side postprocessors.

use tessera_core::{BoundaryTable, InputParameters, Real, ThreadId};
use tessera_vars::Subproblem;

use crate::error::PostprocessorError;
use crate::side::{SideAccumulator, SideBinding, SideContext, SidePostprocessor};

/// `∫ u dS` over the boundaries.
#[derive(Clone, Debug)]
pub struct SideIntegralVariable {
    side: SideBinding,
}

impl SideIntegralVariable {
    /// Build from `variable` and `boundary`.
    pub fn from_params(
        object: &str,
        params: &InputParameters,
        boundaries: &BoundaryTable,
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<Self, PostprocessorError> {
        Ok(Self {
            side: SideBinding::resolve(object, params, boundaries, subproblem, thread)?,
        })
    }
}

impl SidePostprocessor for SideIntegralVariable {
    fn name(&self) -> &str {
        self.side.object()
    }

    fn side(&self) -> &SideBinding {
        &self.side
    }

    fn compute_qp_integral(
        &self,
        qp: usize,
        ctx: &SideContext<'_>,
    ) -> Result<Real, PostprocessorError> {
        ctx.u(qp)
    }
}

/// `∫ u dS / ∫ dS`: the mean of `u` over the boundaries.
#[derive(Clone, Debug)]
pub struct SideAverageValue {
    side: SideBinding,
}

impl SideAverageValue {
    /// Build from `variable` and `boundary`.
    pub fn from_params(
        object: &str,
        params: &InputParameters,
        boundaries: &BoundaryTable,
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<Self, PostprocessorError> {
        Ok(Self {
            side: SideBinding::resolve(object, params, boundaries, subproblem, thread)?,
        })
    }
}

impl SidePostprocessor for SideAverageValue {
    fn name(&self) -> &str {
        self.side.object()
    }

    fn side(&self) -> &SideBinding {
        &self.side
    }

    fn compute_qp_integral(
        &self,
        qp: usize,
        ctx: &SideContext<'_>,
    ) -> Result<Real, PostprocessorError> {
        ctx.u(qp)
    }

    fn value(&self, acc: &SideAccumulator) -> Result<Real, PostprocessorError> {
        if acc.measure() == 0.0 {
            return Err(PostprocessorError::ZeroMeasure {
                object: self.side.object().to_string(),
            });
        }
        Ok(acc.integral() / acc.measure())
    }
}

/// `∫ -k ∇u · n dS`: diffusive flux out through the boundaries.
///
/// `k` comes from the `diffusivity` parameter (default 1).
#[derive(Clone, Debug)]
pub struct SideFluxIntegral {
    side: SideBinding,
    diffusivity: Real,
}

impl SideFluxIntegral {
    /// Build from `variable`, `boundary` and `diffusivity`.
    pub fn from_params(
        object: &str,
        params: &InputParameters,
        boundaries: &BoundaryTable,
        subproblem: &Subproblem,
        thread: ThreadId,
    ) -> Result<Self, PostprocessorError> {
        let diffusivity = if params.is_param_valid("diffusivity") {
            params.get_real("diffusivity")?
        } else {
            1.0
        };
        Ok(Self {
            side: SideBinding::resolve(object, params, boundaries, subproblem, thread)?,
            diffusivity,
        })
    }

    /// The diffusivity `k`.
    pub fn diffusivity(&self) -> Real {
        self.diffusivity
    }
}

impl SidePostprocessor for SideFluxIntegral {
    fn name(&self) -> &str {
        self.side.object()
    }

    fn side(&self) -> &SideBinding {
        &self.side
    }

    fn compute_qp_integral(
        &self,
        qp: usize,
        ctx: &SideContext<'_>,
    ) -> Result<Real, PostprocessorError> {
        let grad = ctx.grad_u(qp)?;
        let normal = ctx.normal(qp)?;
        Ok(-self.diffusivity * grad.dot(&normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{BoundaryId, RealVectorValue, VariableDef, VariableId};
    use tessera_vars::{FaceQuadrature, TimeLevel};

    /// Unit square side along x = 1 with two points of weight 0.5.
    fn setup(u: [Real; 2], grad: RealVectorValue) -> (Subproblem, BoundaryTable) {
        let mut sp = Subproblem::new(1);
        sp.add_variable(VariableDef::scalar("u")).unwrap();
        let data = sp.thread_mut(ThreadId(0)).unwrap();
        let var = data.variable_mut::<Real>(VariableId(0)).unwrap();
        var.set_sln(TimeLevel::Current, u.to_vec());
        var.set_grad_sln(TimeLevel::Current, vec![grad; 2]);
        data.assembly_mut().set_face(FaceQuadrature {
            q_points: vec![
                RealVectorValue::new(1.0, 0.25, 0.0),
                RealVectorValue::new(1.0, 0.75, 0.0),
            ],
            jxw: vec![0.5, 0.5],
            coord: vec![1.0, 1.0],
            normals: vec![RealVectorValue::new(1.0, 0.0, 0.0); 2],
            side_volume: 1.0,
        });
        (sp, ["left", "right"].into_iter().collect())
    }

    fn params() -> InputParameters {
        InputParameters::new()
            .with("variable", "u")
            .with("boundary", "right")
    }

    #[test]
    fn integral_of_variable() {
        let (sp, table) = setup([2.0, 4.0], RealVectorValue::default());
        let pp = SideIntegralVariable::from_params("int", &params(), &table, &sp, ThreadId(0))
            .unwrap();
        assert_eq!(pp.boundaries(), &[BoundaryId(1)]);
        let mut acc = SideAccumulator::new();
        pp.execute(sp.thread(ThreadId(0)).unwrap(), &mut acc).unwrap();
        assert_eq!(pp.value(&acc).unwrap(), 3.0);
    }

    #[test]
    fn average_divides_by_measure() {
        let (sp, table) = setup([2.0, 4.0], RealVectorValue::default());
        let pp =
            SideAverageValue::from_params("avg", &params(), &table, &sp, ThreadId(0)).unwrap();
        let data = sp.thread(ThreadId(0)).unwrap();
        let mut acc = SideAccumulator::new();
        pp.execute(data, &mut acc).unwrap();
        pp.execute(data, &mut acc).unwrap();
        assert_eq!(acc.sides(), 2);
        assert_eq!(pp.value(&acc).unwrap(), 3.0);
        assert!(matches!(
            pp.value(&SideAccumulator::new()),
            Err(PostprocessorError::ZeroMeasure { .. })
        ));
    }

    #[test]
    fn flux_is_negative_normal_gradient() {
        let (sp, table) = setup([0.0, 0.0], RealVectorValue::new(-3.0, 1.0, 0.0));
        let pp = SideFluxIntegral::from_params(
            "flux",
            &params().with("diffusivity", 2.0),
            &table,
            &sp,
            ThreadId(0),
        )
        .unwrap();
        let mut acc = SideAccumulator::new();
        pp.execute(sp.thread(ThreadId(0)).unwrap(), &mut acc).unwrap();
        assert_eq!(pp.value(&acc).unwrap(), 6.0);
    }

    #[test]
    fn multiple_boundaries_are_all_resolved() {
        let (sp, table) = setup([0.0, 0.0], RealVectorValue::default());
        let p = params().with("boundary", &["left", "right"][..]);
        let pp = SideIntegralVariable::from_params("int", &p, &table, &sp, ThreadId(0)).unwrap();
        assert!(pp.side().applies_to(BoundaryId(0)));
        assert!(pp.side().applies_to(BoundaryId(1)));
        assert_eq!(pp.side().boundary_names(), ["left", "right"]);
    }

    #[test]
    fn mismatched_quadrature_is_rejected() {
        let (mut sp, table) = setup([1.0, 1.0], RealVectorValue::default());
        sp.thread_mut(ThreadId(0))
            .unwrap()
            .variable_mut::<Real>(VariableId(0))
            .unwrap()
            .set_sln(TimeLevel::Current, vec![1.0]);
        let pp = SideIntegralVariable::from_params("int", &params(), &table, &sp, ThreadId(0))
            .unwrap();
        let err = pp
            .execute(sp.thread(ThreadId(0)).unwrap(), &mut SideAccumulator::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'int': side has 2 quadrature points but 1 values"
        );
    }

    #[test]
    fn unknown_boundary_is_rejected() {
        let (sp, table) = setup([0.0, 0.0], RealVectorValue::default());
        let p = params().with("boundary", "inlet");
        let err = SideFluxIntegral::from_params("flux", &p, &table, &sp, ThreadId(0)).unwrap_err();
        assert!(matches!(err, PostprocessorError::UnknownBoundary { .. }));
    }
}
