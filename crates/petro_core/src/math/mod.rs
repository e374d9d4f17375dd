//! Numerical primitives.
//!
//! - [`regression`]: Ordinary least squares of one response on one regressor,
//!   reporting slope, intercept and the coefficient of determination.

pub mod regression;

pub use regression::LinearFit;
