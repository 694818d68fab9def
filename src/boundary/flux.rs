//! Prescribed-flux boundary elements
//!
//! Imposes ∂φ/∂n = g on a boundary face by subtracting
//! ∫_Γ g φ_l r dΓ from the residual entries of the complex unknown. The extra
//! factor r is the cylindrical volume element of the Fourier-decomposed
//! formulation.

use super::{
    interpolated_position, shape_and_test_at, validate_binding, IntegrationError,
};
use crate::element::{ComplexDofIndex, ConfigurationError, FaceAdjacency, HelmholtzBulk};
use crate::quadrature::FaceQuadratureRule;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Prescribed flux callback: (r, z) -> complex flux
pub type FluxFn = Box<dyn Fn(f64, f64) -> Complex64>;

/// A face element imposing a prescribed complex flux on one face of a bulk
/// Helmholtz element
///
/// The element borrows the bulk element for its whole lifetime; its face
/// binding is fixed at construction. The flux callback is optional: while
/// unset the imposed flux is zero.
pub struct PrescribedFluxElement<'a, B, A> {
    bulk: &'a B,
    face: A,
    u_index: ComplexDofIndex,
    flux_fn: Option<FluxFn>,
}

impl<B, A> std::fmt::Debug for PrescribedFluxElement<'_, B, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrescribedFluxElement")
            .field("u_index", &self.u_index)
            .field("has_flux_fn", &self.flux_fn.is_some())
            .finish()
    }
}

impl<'a, B, A> PrescribedFluxElement<'a, B, A>
where
    B: HelmholtzBulk,
    A: FaceAdjacency,
{
    /// Bind to one face of `bulk`
    ///
    /// Reads the complex unknown's slot pair from the bulk element once.
    /// Fails when the adjacency is structurally inconsistent with the bulk
    /// element; no partial element is produced.
    pub fn bind(bulk: &'a B, face: A) -> Result<Self, ConfigurationError> {
        let u_index = validate_binding(bulk, &face)?;
        Ok(Self {
            bulk,
            face,
            u_index,
            flux_fn: None,
        })
    }

    /// Install the prescribed-flux callback
    pub fn set_flux_fn<F>(&mut self, flux_fn: F)
    where
        F: Fn(f64, f64) -> Complex64 + 'static,
    {
        self.flux_fn = Some(Box::new(flux_fn));
    }

    /// Remove the callback; the imposed flux reverts to zero
    pub fn clear_flux_fn(&mut self) {
        self.flux_fn = None;
    }

    /// Effective prescribed flux at a position (zero while no callback is set)
    pub fn flux(&self, r: f64, z: f64) -> Complex64 {
        match &self.flux_fn {
            Some(f) => f(r, z),
            None => Complex64::new(0.0, 0.0),
        }
    }

    /// The bulk element this face is attached to
    pub fn bulk(&self) -> &B {
        self.bulk
    }

    /// The face adjacency this element integrates over
    pub fn face(&self) -> &A {
        &self.face
    }

    /// Nodal storage slots of the complex unknown, as read at binding
    pub fn complex_unknown_index(&self) -> ComplexDofIndex {
        self.u_index
    }

    /// Subtract the weak-form flux terms from the residual vector
    ///
    /// For every quadrature point and face node l, the entries addressed by
    /// the complex unknown's equation numbers receive
    /// `-flux.{re,im} * test_l * r * weight * jacobian`. Pinned values
    /// (no equation number) are skipped. On error the residual vector is
    /// left untouched.
    pub fn residual_contribution(
        &self,
        rule: &FaceQuadratureRule,
        residuals: &mut Array1<f64>,
    ) -> Result<(), IntegrationError> {
        let n_node = self.face.node_count();

        // Accumulate locally so a degenerate point cannot leave the caller's
        // buffer half-updated.
        let mut contributions = vec![Complex64::new(0.0, 0.0); n_node];

        for (ipt, qp) in rule.points.iter().enumerate() {
            let (psi, test, jacobian) = shape_and_test_at(&self.face, rule, ipt);
            if jacobian <= 0.0 {
                return Err(IntegrationError::DegenerateJacobian {
                    point: ipt,
                    jacobian,
                });
            }
            let w = qp.weight * jacobian;

            let x = interpolated_position(&self.face, &psi);
            let r = x[0];

            let flux = self.flux(x[0], x[1]);

            for (l, t) in test.iter().enumerate() {
                contributions[l] += flux * (t * r * w);
            }
        }

        for (l, contribution) in contributions.iter().enumerate() {
            if let Some(eqn) = self.face.local_equation(l, self.u_index.real()) {
                residuals[eqn] -= contribution.re;
            }
            if let Some(eqn) = self.face.local_equation(l, self.u_index.imag()) {
                residuals[eqn] -= contribution.im;
            }
        }

        log::trace!(
            "prescribed-flux contribution over {} quadrature points, {} face nodes",
            rule.len(),
            n_node
        );
        Ok(())
    }

    /// Residual terms plus the (identically zero) Jacobian block
    ///
    /// The imposed flux does not depend on the solution, so the element never
    /// writes to the Jacobian matrix. The operation exists so the element
    /// composes uniformly with Newton assembly over elements that do.
    pub fn residual_and_jacobian_contribution(
        &self,
        rule: &FaceQuadratureRule,
        residuals: &mut Array1<f64>,
        _jacobian: &mut Array2<f64>,
    ) -> Result<(), IntegrationError> {
        self.residual_contribution(rule, residuals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ReferenceQuadElement;
    use approx::assert_relative_eq;

    fn unit_quad() -> ReferenceQuadElement {
        // Away from the symmetry axis so the r weighting is visible
        ReferenceQuadElement::new([[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0]])
    }

    #[test]
    fn test_null_flux_contributes_nothing() {
        let bulk = unit_quad();
        for edge in 0..4 {
            let element = PrescribedFluxElement::bind(&bulk, bulk.edge(edge).unwrap()).unwrap();
            let rule = FaceQuadratureRule::gauss_legendre(3);
            let mut residuals = Array1::zeros(8);
            element.residual_contribution(&rule, &mut residuals).unwrap();
            assert!(residuals.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_constant_flux_on_vertical_edge() {
        // East edge: r = 2 along its whole length 1, so for constant flux c
        // the total subtracted weight per channel is c * r * length split
        // evenly over the two edge nodes.
        let bulk = unit_quad();
        let mut element = PrescribedFluxElement::bind(&bulk, bulk.edge(1).unwrap()).unwrap();
        element.set_flux_fn(|_, _| Complex64::new(3.0, -4.0));

        let rule = FaceQuadratureRule::gauss_legendre(2);
        let mut residuals = Array1::zeros(8);
        element.residual_contribution(&rule, &mut residuals).unwrap();

        // Edge nodes are bulk nodes 1 and 2; equations (2,3) and (4,5).
        // Each node integrates psi over the edge to 1/2: entry = -c * 2 * 1/2.
        assert_relative_eq!(residuals[2], -3.0, epsilon = 1e-12);
        assert_relative_eq!(residuals[3], 4.0, epsilon = 1e-12);
        assert_relative_eq!(residuals[4], -3.0, epsilon = 1e-12);
        assert_relative_eq!(residuals[5], 4.0, epsilon = 1e-12);
        // Off-edge nodes untouched
        assert_eq!(residuals[0], 0.0);
        assert_eq!(residuals[6], 0.0);
    }

    #[test]
    fn test_radial_weighting_on_horizontal_edge() {
        // South edge runs from r=1 to r=2 at z=0. With flux c = 1:
        //   entry_l = -∫ psi_l(r) r dr over [1, 2]
        // psi_0 = 2 - r, psi_1 = r - 1 on that edge, giving 2/3 and 5/6.
        let bulk = unit_quad();
        let mut element = PrescribedFluxElement::bind(&bulk, bulk.edge(0).unwrap()).unwrap();
        element.set_flux_fn(|_, _| Complex64::new(1.0, 0.0));

        let rule = FaceQuadratureRule::gauss_legendre(2);
        let mut residuals = Array1::zeros(8);
        element.residual_contribution(&rule, &mut residuals).unwrap();

        assert_relative_eq!(residuals[0], -2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(residuals[2], -5.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_flux_sees_interpolated_position() {
        // Position-dependent flux g(r, z) = r on the south edge:
        //   entry_l = -∫ r psi_l(r) r dr over [1, 2]
        // which is 11/12 for psi_0 = 2 - r and 17/12 for psi_1 = r - 1.
        let bulk = unit_quad();
        let mut element = PrescribedFluxElement::bind(&bulk, bulk.edge(0).unwrap()).unwrap();
        element.set_flux_fn(|r, _| Complex64::new(r, 0.0));

        let rule = FaceQuadratureRule::gauss_legendre(3);
        let mut residuals = Array1::zeros(8);
        element.residual_contribution(&rule, &mut residuals).unwrap();

        assert_relative_eq!(residuals[0], -11.0 / 12.0, epsilon = 1e-12);
        assert_relative_eq!(residuals[2], -17.0 / 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pinned_nodes_receive_nothing() {
        let mut bulk = unit_quad();
        for node in 0..4 {
            bulk.pin(node);
        }
        let mut element = PrescribedFluxElement::bind(&bulk, bulk.edge(1).unwrap()).unwrap();
        element.set_flux_fn(|_, _| Complex64::new(5.0, 5.0));

        let rule = FaceQuadratureRule::gauss_legendre(2);
        let mut residuals = Array1::zeros(8);
        element.residual_contribution(&rule, &mut residuals).unwrap();
        assert!(residuals.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_jacobian_block_stays_zero() {
        let bulk = unit_quad();
        let mut element = PrescribedFluxElement::bind(&bulk, bulk.edge(2).unwrap()).unwrap();
        element.set_flux_fn(|r, z| Complex64::new(r * z, -z));

        let rule = FaceQuadratureRule::gauss_legendre(3);
        let mut residuals = Array1::zeros(8);
        let mut jacobian = Array2::zeros((8, 8));
        element
            .residual_and_jacobian_contribution(&rule, &mut residuals, &mut jacobian)
            .unwrap();

        assert!(jacobian.iter().all(|&v| v == 0.0));
        // while the residual terms are still produced
        assert!(residuals.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_clear_flux_fn_reverts_to_zero() {
        let bulk = unit_quad();
        let mut element = PrescribedFluxElement::bind(&bulk, bulk.edge(0).unwrap()).unwrap();
        element.set_flux_fn(|_, _| Complex64::new(1.0, 1.0));
        assert_eq!(element.flux(1.5, 0.0), Complex64::new(1.0, 1.0));

        element.clear_flux_fn();
        assert_eq!(element.flux(1.5, 0.0), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_degenerate_edge_is_reported() {
        // Collapse the east edge to a point: zero-length face, zero Jacobian
        let bulk = ReferenceQuadElement::new([[1.0, 0.0], [2.0, 0.0], [2.0, 0.0], [1.0, 1.0]]);
        let element = PrescribedFluxElement::bind(&bulk, bulk.edge(1).unwrap()).unwrap();

        let rule = FaceQuadratureRule::gauss_legendre(1);
        let mut residuals = Array1::zeros(8);
        let err = element
            .residual_contribution(&rule, &mut residuals)
            .unwrap_err();
        assert!(matches!(
            err,
            IntegrationError::DegenerateJacobian { point: 0, .. }
        ));
        // all-or-nothing: the buffer is untouched after a failure
        assert!(residuals.iter().all(|&v| v == 0.0));
    }
}
