//! # Spectral operators
//!
//! Forward/inverse Fourier transforms of a doubly periodic grid,
//! wavenumbers, dealiasing, projection and spectral derivatives.
pub mod operators2d;
pub use operators2d::{enforce_hermitian_symmetry, ArrayK, Operators2D};
