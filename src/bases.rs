//! # Bases
//! Fourier bases of `funspace`
//!
//! Periodic domains use a complex-to-complex basis along axis 0
//! and a real-to-complex basis along axis 1:
//! - `FourierC2c`, see [`fourier_c2c()`]
//! - `FourierR2c`, see [`fourier_r2c()`]
pub use funspace::fourier_c2c;
pub use funspace::fourier_r2c;
pub use funspace::{BaseC2c, BaseR2c};
pub use funspace::{BaseSpace, Space2};

/// Doubly periodic space (c2c along x, r2c along y)
pub type SpaceFourier2 = Space2<BaseC2c<f64>, BaseR2c<f64>>;

/// Doubly periodic space distributed in pencils
#[cfg(feature = "mpi")]
pub type SpaceFourier2Mpi<'a> = crate::mpi::Space2Mpi<'a, BaseC2c<f64>, BaseR2c<f64>>;

/// Wavenumber indices of a complex-to-complex axis in transform order
/// (0, 1, .., n/2-1, -n/2, .., -1)
pub fn wavenumber_indices_c2c(n: usize) -> Vec<f64> {
    let n_pos = (n + 1) / 2;
    (0..n)
        .map(|i| {
            if i < n_pos {
                i as f64
            } else {
                i as f64 - n as f64
            }
        })
        .collect()
}

/// Wavenumber indices of a real-to-complex axis (0, .., n/2)
pub fn wavenumber_indices_r2c(n: usize) -> Vec<f64> {
    (0..n / 2 + 1).map(|i| i as f64).collect()
}
