//! Point-value types stored per degree of freedom or quadrature point.
//!
//! All spatial types are fixed at [`MESH_DIM`] components, matching the
//! way the mesh library stores points regardless of the problem dimension.

use std::ops::{Add, Index, IndexMut, Mul, Sub};

/// Scalar floating-point type for all field data.
pub type Real = f64;

/// Number of spatial components carried by vector and tensor values.
pub const MESH_DIM: usize = 3;

/// A spatial vector: the value of a vector field, or the gradient of a
/// scalar field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RealVectorValue(pub [Real; MESH_DIM]);

impl RealVectorValue {
    /// Construct from three components.
    pub const fn new(x: Real, y: Real, z: Real) -> Self {
        Self([x, y, z])
    }

    /// Euclidean inner product.
    pub fn dot(&self, other: &Self) -> Real {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> Real {
        self.dot(self).sqrt()
    }
}

impl Index<usize> for RealVectorValue {
    type Output = Real;

    fn index(&self, i: usize) -> &Real {
        &self.0[i]
    }
}

impl IndexMut<usize> for RealVectorValue {
    fn index_mut(&mut self, i: usize) -> &mut Real {
        &mut self.0[i]
    }
}

impl Add for RealVectorValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl Sub for RealVectorValue {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

impl Mul<Real> for RealVectorValue {
    type Output = Self;

    fn mul(self, rhs: Real) -> Self {
        Self(self.0.map(|c| c * rhs))
    }
}

/// A rank-two spatial tensor, row-major: the gradient of a vector field,
/// or the second derivative (Hessian) of a scalar field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RealTensorValue(pub [[Real; MESH_DIM]; MESH_DIM]);

impl RealTensorValue {
    /// The identity tensor.
    pub fn identity() -> Self {
        Self(std::array::from_fn(|i| {
            std::array::from_fn(|j| if i == j { 1.0 } else { 0.0 })
        }))
    }

    /// Entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Real {
        self.0[row][col]
    }

    /// Sum of the diagonal entries.
    pub fn trace(&self) -> Real {
        (0..MESH_DIM).map(|i| self.0[i][i]).sum()
    }

    /// Tensor-vector product `T · v`.
    pub fn apply(&self, v: &RealVectorValue) -> RealVectorValue {
        RealVectorValue(std::array::from_fn(|i| {
            (0..MESH_DIM).map(|j| self.0[i][j] * v.0[j]).sum()
        }))
    }
}

/// Second derivative of a vector field: one Hessian per component.
pub type VectorSecond = [RealTensorValue; MESH_DIM];
