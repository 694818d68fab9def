//! Reference implementations of the capability traits
//!
//! A single bilinear quadrilateral in the (r, z) meridian plane, together
//! with adjacencies for its four edges. The test-suite binds face elements
//! against it; downstream mesh layers can use it as a template for their own
//! trait implementations.

use crate::element::{
    ComplexDofIndex, ConfigurationError, FaceAdjacency, HelmholtzBulk, ShapeDerivatives,
};
use num_complex::Complex64;

/// Q1 shape functions on the reference square [-1, 1]²
fn q1_shape(xi: f64, eta: f64) -> [f64; 4] {
    [
        0.25 * (1.0 - xi) * (1.0 - eta),
        0.25 * (1.0 + xi) * (1.0 - eta),
        0.25 * (1.0 + xi) * (1.0 + eta),
        0.25 * (1.0 - xi) * (1.0 + eta),
    ]
}

/// Q1 shape function gradients with respect to (xi, eta)
fn q1_shape_grad(xi: f64, eta: f64) -> [[f64; 2]; 4] {
    [
        [-0.25 * (1.0 - eta), -0.25 * (1.0 - xi)],
        [0.25 * (1.0 - eta), -0.25 * (1.0 + xi)],
        [0.25 * (1.0 + eta), 0.25 * (1.0 + xi)],
        [-0.25 * (1.0 + eta), 0.25 * (1.0 - xi)],
    ]
}

/// One bilinear quadrilateral element in the (r, z) meridian plane
///
/// Nodes must be ordered counter-clockwise so the edge normals point out of
/// the element. Each node stores two scalar slots: slot 0 holds the real
/// part of the unknown, slot 1 the imaginary part. Equation numbers start as
/// `2 * node + slot`; pinning a node removes both its equations.
#[derive(Debug, Clone)]
pub struct ReferenceQuadElement {
    coords: [[f64; 2]; 4],
    values: [[f64; 2]; 4],
    equations: [[Option<usize>; 2]; 4],
    u_index: ComplexDofIndex,
}

impl ReferenceQuadElement {
    /// Build the element from its four corner positions, counter-clockwise
    pub fn new(coords: [[f64; 2]; 4]) -> Self {
        let mut equations = [[None; 2]; 4];
        for (node, eqns) in equations.iter_mut().enumerate() {
            *eqns = [Some(2 * node), Some(2 * node + 1)];
        }
        Self {
            coords,
            values: [[0.0; 2]; 4],
            equations,
            u_index: ComplexDofIndex::new(0, 1).expect("slots 0 and 1 are distinct"),
        }
    }

    /// Store a scalar value in slot `dof` at `node`
    pub fn set_value(&mut self, node: usize, dof: usize, value: f64) {
        self.values[node][dof] = value;
    }

    /// Store a complex unknown at `node` in its two slots
    pub fn set_complex_value(&mut self, node: usize, value: Complex64) {
        self.values[node][self.u_index.real()] = value.re;
        self.values[node][self.u_index.imag()] = value.im;
    }

    /// Constrain both slots of `node`; pinned values receive no residuals
    pub fn pin(&mut self, node: usize) {
        self.equations[node] = [None, None];
    }

    /// Global position component `dir` of `node`
    pub fn nodal_position(&self, node: usize, dir: usize) -> f64 {
        self.coords[node][dir]
    }

    /// Adjacency for edge `index` (0 = first edge, counter-clockwise)
    pub fn edge(&self, index: usize) -> Result<QuadEdge<'_>, ConfigurationError> {
        if index >= 4 {
            return Err(ConfigurationError::FaceOutOfRange {
                face: index,
                count: 4,
            });
        }
        Ok(QuadEdge {
            element: self,
            edge: index,
        })
    }
}

impl HelmholtzBulk for ReferenceQuadElement {
    fn complex_unknown_index(&self) -> ComplexDofIndex {
        self.u_index
    }

    fn node_count(&self) -> usize {
        4
    }

    fn dimension(&self) -> usize {
        2
    }

    fn nodal_value(&self, node: usize, dof: usize) -> f64 {
        self.values[node][dof]
    }

    fn shape_derivatives(&self, local: &[f64]) -> ShapeDerivatives {
        let (xi, eta) = (local[0], local[1]);
        let values = q1_shape(xi, eta);
        let grad_ref = q1_shape_grad(xi, eta);

        // 2x2 Jacobian of the (xi, eta) -> (r, z) mapping
        let mut j = [[0.0; 2]; 2];
        for (g, c) in grad_ref.iter().zip(&self.coords) {
            j[0][0] += g[0] * c[0];
            j[0][1] += g[1] * c[0];
            j[1][0] += g[0] * c[1];
            j[1][1] += g[1] * c[1];
        }
        let det = j[0][0] * j[1][1] - j[0][1] * j[1][0];
        let inv_det = 1.0 / det;
        let inverse = [
            [j[1][1] * inv_det, -j[0][1] * inv_det],
            [-j[1][0] * inv_det, j[0][0] * inv_det],
        ];

        // Global gradients: grad = J^{-T} grad_ref
        let gradients = grad_ref
            .iter()
            .map(|g| {
                vec![
                    inverse[0][0] * g[0] + inverse[1][0] * g[1],
                    inverse[0][1] * g[0] + inverse[1][1] * g[1],
                ]
            })
            .collect();

        ShapeDerivatives {
            values: values.to_vec(),
            gradients,
        }
    }
}

/// Adjacency for one edge of a [`ReferenceQuadElement`]
///
/// Edge `e` runs from quad node `e` to quad node `(e + 1) % 4`, with the
/// face-local coordinate `s` in [-1, 1] along it.
#[derive(Debug, Clone, Copy)]
pub struct QuadEdge<'a> {
    element: &'a ReferenceQuadElement,
    edge: usize,
}

impl QuadEdge<'_> {
    fn endpoints(&self) -> (usize, usize) {
        (self.edge, (self.edge + 1) % 4)
    }

    /// Half the edge vector: dX/ds for the linear edge parametrization
    fn tangent(&self) -> [f64; 2] {
        let (n0, n1) = self.endpoints();
        let x0 = self.element.coords[n0];
        let x1 = self.element.coords[n1];
        [0.5 * (x1[0] - x0[0]), 0.5 * (x1[1] - x0[1])]
    }
}

impl FaceAdjacency for QuadEdge<'_> {
    fn node_count(&self) -> usize {
        2
    }

    fn bulk_node(&self, node: usize) -> usize {
        let (n0, n1) = self.endpoints();
        if node == 0 {
            n0
        } else {
            n1
        }
    }

    fn shape_functions(&self, s: f64) -> Vec<f64> {
        vec![0.5 * (1.0 - s), 0.5 * (1.0 + s)]
    }

    fn geometric_jacobian(&self, _s: f64) -> f64 {
        let t = self.tangent();
        (t[0] * t[0] + t[1] * t[1]).sqrt()
    }

    fn outward_unit_normal(&self, s: f64) -> Vec<f64> {
        let t = self.tangent();
        let len = self.geometric_jacobian(s);
        // Counter-clockwise traversal: rotating the tangent clockwise points
        // out of the element
        vec![t[1] / len, -t[0] / len]
    }

    fn bulk_coordinate(&self, s: f64) -> Vec<f64> {
        match self.edge {
            0 => vec![s, -1.0],
            1 => vec![1.0, s],
            2 => vec![-s, 1.0],
            _ => vec![-1.0, -s],
        }
    }

    fn nodal_position(&self, node: usize, dir: usize) -> f64 {
        self.element.coords[self.bulk_node(node)][dir]
    }

    fn local_equation(&self, node: usize, dof: usize) -> Option<usize> {
        self.element.equations[self.bulk_node(node)][dof]
    }
}
