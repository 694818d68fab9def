//! Boundary face elements for the Fourier-decomposed (axisymmetric) Helmholtz equation
//!
//! This crate provides the boundary-face side of an axisymmetric Helmholtz
//! finite element discretization: elements that sit on one face of a "bulk"
//! PDE element and either impose a prescribed complex flux or monitor the
//! time-averaged power radiated through the face.
//!
//! # Features
//!
//! - **Prescribed flux**: weak-form residual contribution of a complex
//!   Neumann-type boundary condition, with the cylindrical `r` weighting of
//!   the Fourier-decomposed formulation
//! - **Power monitoring**: surface integral of the power-density integrand
//!   `Re(φ)·Im(∂φ/∂n) − Im(φ)·Re(∂φ/∂n)` on an artificial outer boundary,
//!   with optional per-quadrature-point diagnostics
//! - **Capability traits**: the bulk element and the face-to-bulk adjacency
//!   are consumed through traits, so any mesh layer can attach these elements
//!
//! # Example
//!
//! ```
//! use helmholtz_axisym::boundary::PrescribedFluxElement;
//! use helmholtz_axisym::quadrature::FaceQuadratureRule;
//! use helmholtz_axisym::testing::ReferenceQuadElement;
//! use ndarray::Array1;
//! use num_complex::Complex64;
//!
//! // A single bilinear quad in the (r, z) meridian plane, away from the axis
//! let bulk = ReferenceQuadElement::new([[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0]]);
//! let mut flux = PrescribedFluxElement::bind(&bulk, bulk.edge(1).unwrap()).unwrap();
//! flux.set_flux_fn(|_r, _z| Complex64::new(1.0, 0.0));
//!
//! let rule = FaceQuadratureRule::gauss_legendre(2);
//! let mut residuals = Array1::zeros(8);
//! flux.residual_contribution(&rule, &mut residuals).unwrap();
//! ```

pub mod boundary;
pub mod element;
pub mod output;
pub mod quadrature;
pub mod testing;

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
