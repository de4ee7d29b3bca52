//! # Forcing
//!
//! Forcing schemes, resolved by name (`params.forcing.type_`):
//! - pseudo-spectral models: `random`, `proportional`, `waves`,
//!   see [`ForcingPseudoSpectral`]
//! - 0D models: `noise`, see [`ForcingNoise`]
//!
//! The forcing is computed once per time step and added to the
//! tendencies of every Runge-Kutta stage.
pub mod noise;
pub mod pseudo_spectral;
pub mod specific;
use crate::error::{Error, Result};
use crate::mpi::Comm;
use crate::setofvariables::SetOfVariables;
pub use noise::ForcingNoise;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::{Rng, SeedableRng};
pub use pseudo_spectral::ForcingPseudoSpectral;
use std::str::FromStr;

/// Forcing of a simulation
pub trait Forcing<A, D: ndarray::Dimension> {
    /// Regenerate the forcing for the coming time step
    ///
    /// # Errors
    /// State does not contain the forced variable or
    /// does not conform to the forcing.
    fn compute(&mut self, state_spect: &SetOfVariables<A, D>, deltat: f64) -> Result<()>;

    /// Forcing computed by the last call of `compute`
    fn get_forcing(&self) -> &SetOfVariables<A, D>;
}

/// Registered forcing schemes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForcingKind {
    /// Random field in the forced band
    Random,
    /// Forced variable itself, restricted to the forced band
    Proportional,
    /// Random forcing of the surface displacement
    Waves,
    /// White noise of 0D variables
    Noise,
}

impl ForcingKind {
    /// Names of all schemes
    pub const AVAILABLE: [&'static str; 4] = ["random", "proportional", "waves", "noise"];

    /// Name in the registry
    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Proportional => "proportional",
            Self::Waves => "waves",
            Self::Noise => "noise",
        }
    }

    /// Error for a scheme that a family of models does not provide
    pub(crate) fn unknown(name: &str, available: &[&str]) -> Error {
        Error::UnknownForcingType {
            name: name.to_owned(),
            available: available.join(", "),
        }
    }
}

impl FromStr for ForcingKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(Self::Random),
            "proportional" => Ok(Self::Proportional),
            "waves" => Ok(Self::Waves),
            "noise" => Ok(Self::Noise),
            _ => Err(Self::unknown(s, &Self::AVAILABLE)),
        }
    }
}

/// Seed shared by all workers of `comm`
///
/// Without a configured seed the root draws one from entropy and
/// broadcasts it. Collective.
pub(crate) fn resolve_seed(seed: Option<u64>, comm: &Comm) -> u64 {
    let seed = match seed {
        Some(seed) => seed,
        None if comm.is_root() => StdRng::from_entropy().gen(),
        None => 0,
    };
    comm.broadcast_u64(seed)
}

/// Smallest-magnitude root of `b x^2 + a x - p = 0`
///
/// With `x` the amplitude of a forcing `F`, `a = sum(w Re(conj(u) F))`
/// and `b = dt / 2 sum(w |F|^2)`, an Euler step of length `dt` injects
/// the quadratic quantity `1/2 sum(w |u|^2)` at the rate `p`.
pub fn coef_normalization(a: f64, b: f64, p: f64) -> f64 {
    if b == 0. {
        return if a == 0. { 0. } else { p / a };
    }
    let discriminant = (a * a + 4. * b * p).max(0.);
    let q = -0.5 * (a + a.signum() * discriminant.sqrt());
    if q == 0. {
        0.
    } else {
        -p / q
    }
}
