//! Radiated-power monitor elements
//!
//! Computes the element's contribution to the time-averaged power radiated
//! through an artificial outer boundary:
//!
//!   P = π ∫_Γ r (Re(φ)·Im(∂φ/∂n) − Im(φ)·Re(∂φ/∂n)) dΓ
//!
//! The field value is interpolated with the face's own shape functions while
//! the gradient is pulled from the bulk element through the face-to-bulk
//! coordinate map; the two parametrizations agree to quadrature-order
//! accuracy, not exactly.

use super::{interpolated_position, validate_binding, IntegrationError};
use crate::element::{ComplexDofIndex, ConfigurationError, FaceAdjacency, HelmholtzBulk};
use crate::output::{NullSink, PowerSample, PowerSink};
use crate::quadrature::FaceQuadratureRule;
use num_complex::Complex64;
use std::f64::consts::PI;

/// A face element monitoring the time-averaged power radiated through one
/// face of a bulk Helmholtz element
///
/// The power integral is only exact when the medium's constitutive parameters
/// are uniform across the domain; with genuinely varying parameters it is a
/// known approximation.
#[derive(Debug)]
pub struct PowerMonitorElement<'a, B, A> {
    bulk: &'a B,
    face: A,
    u_index: ComplexDofIndex,
}

impl<'a, B, A> PowerMonitorElement<'a, B, A>
where
    B: HelmholtzBulk,
    A: FaceAdjacency,
{
    /// Bind to one face of `bulk`
    ///
    /// Same contract as [`super::PrescribedFluxElement::bind`]: the complex
    /// unknown's slot pair is read once, and a structurally inconsistent
    /// adjacency aborts construction.
    pub fn bind(bulk: &'a B, face: A) -> Result<Self, ConfigurationError> {
        let u_index = validate_binding(bulk, &face)?;
        Ok(Self {
            bulk,
            face,
            u_index,
        })
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

    /// Power contribution without diagnostics
    ///
    /// Identical numeric result to [`Self::power_contribution_with`] against
    /// any inactive sink.
    pub fn power_contribution(&self, rule: &FaceQuadratureRule) -> Result<f64, IntegrationError> {
        self.power_contribution_with(rule, &mut NullSink)
    }

    /// Power contribution, streaming one diagnostic record per quadrature
    /// point into `sink` when it is active
    ///
    /// Per quadrature point: evaluate the outward normal and geometric
    /// Jacobian, map the face coordinate into the bulk element, reconstruct
    /// the complex gradient from the bulk nodal values and the complex field
    /// value from the face interpolation, project the gradient onto the
    /// normal, and accumulate `π r integrand w J`. The running sum is local
    /// to the call.
    pub fn power_contribution_with(
        &self,
        rule: &FaceQuadratureRule,
        sink: &mut dyn PowerSink,
    ) -> Result<f64, IntegrationError> {
        let n_node_bulk = self.bulk.node_count();
        let dim = self.bulk.dimension();
        let u = self.u_index;

        let active = sink.is_active();
        if active {
            sink.begin_face()?;
        }

        let mut power = 0.0;

        for (ipt, qp) in rule.points.iter().enumerate() {
            let s = qp.s;

            let normal = self.face.outward_unit_normal(s);
            let jacobian = self.face.geometric_jacobian_at(rule, ipt);
            if jacobian <= 0.0 {
                return Err(IntegrationError::DegenerateJacobian {
                    point: ipt,
                    jacobian,
                });
            }
            let w = qp.weight * jacobian;

            // The face quadrature point is not a quadrature point of the bulk
            // element; its shape derivatives must be evaluated through the
            // mapped local coordinate.
            let s_bulk = self.face.bulk_coordinate(s);
            let bulk_shape = self.bulk.shape_derivatives(&s_bulk);
            let psi = self.face.shape_functions_at(rule, ipt);

            // Complex gradient from the bulk interpolation
            let mut gradient = vec![Complex64::new(0.0, 0.0); dim];
            for l in 0..n_node_bulk {
                let phi_value = Complex64::new(
                    self.bulk.nodal_value(l, u.real()),
                    self.bulk.nodal_value(l, u.imag()),
                );
                for (g, d) in gradient.iter_mut().zip(&bulk_shape.gradients[l]) {
                    *g += phi_value * *d;
                }
            }

            // Complex field value from the face's own interpolation
            let mut phi = Complex64::new(0.0, 0.0);
            for (l, p) in psi.iter().enumerate() {
                let bulk_node = self.face.bulk_node(l);
                let phi_value = Complex64::new(
                    self.bulk.nodal_value(bulk_node, u.real()),
                    self.bulk.nodal_value(bulk_node, u.imag()),
                );
                phi += phi_value * *p;
            }

            // Normal derivative
            let mut dphi_dn = Complex64::new(0.0, 0.0);
            for (g, n) in gradient.iter().zip(&normal) {
                dphi_dn += *g * *n;
            }

            let integrand = phi.re * dphi_dn.im - phi.im * dphi_dn.re;

            let x = interpolated_position(&self.face, &psi);
            if active {
                let theta = x[0].atan2(x[1]);
                sink.record(&PowerSample {
                    r: x[0],
                    z: x[1],
                    theta,
                    integrand,
                })?;
            }

            // π r converts the meridional line integral into the
            // axisymmetric surface integral
            power += PI * x[0] * integrand * w;
        }

        log::debug!(
            "radiated-power contribution {:.6e} over {} quadrature points",
            power,
            rule.len()
        );
        Ok(power)
    }
}
