//! Types and traits for real and complex numbers
use ndarray::ScalarOperand;
use num_complex::Complex;
use num_traits::Zero;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

/// Scalar type of the evolved variables (`f64` in physical
/// space, `Complex<f64>` in spectral space)
pub trait Scalar:
    Copy
    + Zero
    + Debug
    + Send
    + Sync
    + ScalarOperand
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Mul<f64, Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign<f64>
{
    /// Squared modulus
    fn norm_sqr(&self) -> f64;
    /// True if no component is NaN or infinite
    fn is_finite(&self) -> bool;
    /// Complex conjugate (identity for reals)
    fn conj(&self) -> Self;
    /// Real part
    fn re(&self) -> f64;
}

impl Scalar for f64 {
    fn norm_sqr(&self) -> f64 {
        self * self
    }

    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }

    fn conj(&self) -> Self {
        *self
    }

    fn re(&self) -> f64 {
        *self
    }
}

impl Scalar for Complex<f64> {
    fn norm_sqr(&self) -> f64 {
        Complex::norm_sqr(self)
    }

    fn is_finite(&self) -> bool {
        Complex::is_finite(*self)
    }

    fn conj(&self) -> Self {
        Complex::conj(self)
    }

    fn re(&self) -> f64 {
        self.re
    }
}
