//! Boundary face elements for the axisymmetric Helmholtz equation
//!
//! Provides the two face-element kinds that attach to one face of a bulk
//! element:
//! - [`PrescribedFluxElement`]: imposes ∂φ/∂n = g as a weak-form residual
//!   contribution
//! - [`PowerMonitorElement`]: integrates the time-averaged radiated power
//!   over the face

mod flux;
mod power;

pub use flux::*;
pub use power::*;

use crate::element::{ComplexDofIndex, ConfigurationError, FaceAdjacency, HelmholtzBulk};
use crate::quadrature::FaceQuadratureRule;
use thiserror::Error;

/// Errors raised inside a face element's quadrature loop
///
/// There is no partial success: on error the caller's buffers are untouched.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("non-positive geometric Jacobian {jacobian} at quadrature point {point}")]
    DegenerateJacobian { point: usize, jacobian: f64 },
    #[error("diagnostic output failed: {0}")]
    Output(#[from] std::io::Error),
}

/// Check a face/bulk binding and read the complex unknown's slot pair
///
/// Rejects empty faces and face-to-bulk node maps that point outside the
/// bulk element. Runs once, at construction.
pub(crate) fn validate_binding<B, A>(
    bulk: &B,
    face: &A,
) -> Result<ComplexDofIndex, ConfigurationError>
where
    B: HelmholtzBulk,
    A: FaceAdjacency,
{
    let n_node = face.node_count();
    if n_node == 0 {
        return Err(ConfigurationError::EmptyFace);
    }
    let bulk_count = bulk.node_count();
    for l in 0..n_node {
        let bulk_node = face.bulk_node(l);
        if bulk_node >= bulk_count {
            return Err(ConfigurationError::NodeOutOfRange {
                node: l,
                bulk_node,
                bulk_count,
            });
        }
    }
    Ok(bulk.complex_unknown_index())
}

/// Face shape functions, Galerkin test functions and the geometric Jacobian
/// at one quadrature point
///
/// The test functions are chosen equal to the shape functions.
pub(crate) fn shape_and_test_at<A: FaceAdjacency>(
    face: &A,
    rule: &FaceQuadratureRule,
    point: usize,
) -> (Vec<f64>, Vec<f64>, f64) {
    let psi = face.shape_functions_at(rule, point);
    let test = psi.clone();
    let jacobian = face.geometric_jacobian_at(rule, point);
    (psi, test, jacobian)
}

/// Interpolate the global (r, z) position from the face's nodal positions
pub(crate) fn interpolated_position<A: FaceAdjacency>(face: &A, psi: &[f64]) -> [f64; 2] {
    let mut x = [0.0; 2];
    for (l, p) in psi.iter().enumerate() {
        for (i, xi) in x.iter_mut().enumerate() {
            *xi += face.nodal_position(l, i) * p;
        }
    }
    x
}

/// Sum the radiated-power contributions of a set of monitor elements
///
/// Each element's contribution is an independent pure scalar, so the sum may
/// be evaluated in parallel; accumulation order does not affect correctness
/// beyond floating-point rounding.
#[cfg(feature = "parallel")]
pub fn total_radiated_power<B, A>(
    monitors: &[PowerMonitorElement<'_, B, A>],
    rule: &FaceQuadratureRule,
) -> Result<f64, IntegrationError>
where
    B: HelmholtzBulk + Sync,
    A: FaceAdjacency + Sync,
{
    use rayon::prelude::*;

    let contributions = monitors
        .par_iter()
        .map(|m| m.power_contribution(rule))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(contributions.iter().sum())
}

/// Sum the radiated-power contributions of a set of monitor elements
#[cfg(not(feature = "parallel"))]
pub fn total_radiated_power<B, A>(
    monitors: &[PowerMonitorElement<'_, B, A>],
    rule: &FaceQuadratureRule,
) -> Result<f64, IntegrationError>
where
    B: HelmholtzBulk,
    A: FaceAdjacency,
{
    let mut total = 0.0;
    for monitor in monitors {
        total += monitor.power_contribution(rule)?;
    }
    Ok(total)
}
