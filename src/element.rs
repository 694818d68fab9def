//! Capability traits connecting boundary face elements to their bulk element
//!
//! A face element never owns mesh data. It reads everything through two
//! capabilities supplied by the mesh layer:
//!
//! - [`HelmholtzBulk`]: the attached bulk element's complex unknown (which two
//!   scalar slots per node store it), its nodal values, and its shape-function
//!   derivatives in global coordinates
//! - [`FaceAdjacency`]: the geometry and indexing of one face of that bulk
//!   element (shape functions, Jacobian, outward normal, face-to-bulk node
//!   and coordinate maps, equation numbers)

use crate::quadrature::FaceQuadratureRule;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while binding a face element to a bulk element
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("real and imaginary parts must occupy distinct nodal slots (both map to slot {0})")]
    DuplicateSlot(usize),
    #[error("face has no nodes")]
    EmptyFace,
    #[error("face node {node} maps to bulk node {bulk_node}, but the bulk element has {bulk_count} nodes")]
    NodeOutOfRange {
        node: usize,
        bulk_node: usize,
        bulk_count: usize,
    },
    #[error("face index {face} out of range for an element with {count} faces")]
    FaceOutOfRange { face: usize, count: usize },
}

/// Which two scalar storage slots at a node hold the complex unknown
///
/// The real and imaginary parts of the single physical unknown live in two
/// distinct per-node scalar slots; the bulk element declares which. The pair
/// is read once when a face element binds and is immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexDofIndex {
    real: usize,
    imag: usize,
}

impl ComplexDofIndex {
    /// Pair up the two slot indices, rejecting aliased storage
    pub fn new(real: usize, imag: usize) -> Result<Self, ConfigurationError> {
        if real == imag {
            return Err(ConfigurationError::DuplicateSlot(real));
        }
        Ok(Self { real, imag })
    }

    /// Slot holding the real part
    pub fn real(&self) -> usize {
        self.real
    }

    /// Slot holding the imaginary part
    pub fn imag(&self) -> usize {
        self.imag
    }
}

/// Shape functions and their global spatial derivatives at one local coordinate
#[derive(Debug, Clone)]
pub struct ShapeDerivatives {
    /// Shape function values [N_0, N_1, ..., N_n]
    pub values: Vec<f64>,
    /// Global derivatives: `gradients[l][i]` = dN_l/dx_i
    pub gradients: Vec<Vec<f64>>,
}

/// Capability a bulk element must expose so face elements can attach to it
///
/// The mismatch between a face element and an incompatible bulk element is a
/// compile-time contract: only types implementing this trait can be bound.
pub trait HelmholtzBulk {
    /// Nodal storage slots of the complex unknown
    fn complex_unknown_index(&self) -> ComplexDofIndex;

    /// Number of nodes in the bulk element
    fn node_count(&self) -> usize;

    /// Spatial dimension of the bulk element (2 for the meridian plane)
    fn dimension(&self) -> usize;

    /// Current value stored in scalar slot `dof` at local node `node`
    fn nodal_value(&self, node: usize, dof: usize) -> f64;

    /// Shape functions and global derivatives at a bulk-local coordinate
    ///
    /// Face quadrature points are generally not quadrature points of the bulk
    /// element, so evaluation goes through the local coordinate.
    fn shape_derivatives(&self, local: &[f64]) -> ShapeDerivatives;
}

/// Geometry and indexing of one face of a bulk element
///
/// The face is a codimension-1 sub-manifold of the bulk element with its own
/// local parametrization `s` on [-1, 1].
pub trait FaceAdjacency {
    /// Number of nodes on the face
    fn node_count(&self) -> usize;

    /// Bulk-element local node index backing face node `node`
    fn bulk_node(&self, node: usize) -> usize;

    /// Face shape functions at face-local coordinate `s`
    fn shape_functions(&self, s: f64) -> Vec<f64>;

    /// Jacobian of the face-local to global mapping at `s`
    fn geometric_jacobian(&self, s: f64) -> f64;

    /// Unit normal pointing out of the bulk element at `s`
    fn outward_unit_normal(&self, s: f64) -> Vec<f64>;

    /// Bulk-local coordinate of the face point `s`
    fn bulk_coordinate(&self, s: f64) -> Vec<f64>;

    /// Global position component `dir` of face node `node`
    fn nodal_position(&self, node: usize, dir: usize) -> f64;

    /// Equation number of scalar slot `dof` at face node `node`
    ///
    /// `None` marks a pinned (Dirichlet-constrained) value that receives no
    /// residual contribution.
    fn local_equation(&self, node: usize, dof: usize) -> Option<usize>;

    /// Face shape functions at quadrature point `point` of `rule`
    ///
    /// Implementors with cached per-knot evaluations may override this.
    fn shape_functions_at(&self, rule: &FaceQuadratureRule, point: usize) -> Vec<f64> {
        self.shape_functions(rule.points[point].s)
    }

    /// Geometric Jacobian at quadrature point `point` of `rule`
    fn geometric_jacobian_at(&self, rule: &FaceQuadratureRule, point: usize) -> f64 {
        self.geometric_jacobian(rule.points[point].s)
    }
}
