//! Schemes of the pseudo-spectral forcing
//!
//! A scheme only provides the shape of the forcing of the forced
//! variable. Band restriction and normalization are common to all
//! schemes, see [`super::ForcingPseudoSpectral`].
use crate::operators::{ArrayK, Operators2D};
use ndarray_rand::rand::rngs::StdRng;

/// Shape of a pseudo-spectral forcing
#[enum_dispatch]
pub trait SpecificForcing {
    /// Forced variable if `key_forced` is not set
    fn default_key(&self) -> &'static str;

    /// Unnormalized forcing of the forced variable `a_fft`
    fn forcing_shape(&self, oper: &Operators2D, a_fft: &ArrayK, rng: &mut StdRng) -> ArrayK;
}

/// New random field at every time step
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomForcing;

impl SpecificForcing for RandomForcing {
    fn default_key(&self) -> &'static str {
        "rot_fft"
    }

    fn forcing_shape(&self, oper: &Operators2D, _a_fft: &ArrayK, rng: &mut StdRng) -> ArrayK {
        oper.random_fft(rng)
    }
}

/// Forcing proportional to the forced variable
#[derive(Clone, Copy, Debug, Default)]
pub struct ProportionalForcing;

impl SpecificForcing for ProportionalForcing {
    fn default_key(&self) -> &'static str {
        "rot_fft"
    }

    fn forcing_shape(&self, _oper: &Operators2D, a_fft: &ArrayK, _rng: &mut StdRng) -> ArrayK {
        a_fft.to_owned()
    }
}

/// Random forcing of the surface displacement, excites gravity waves
#[derive(Clone, Copy, Debug, Default)]
pub struct WavesForcing;

impl SpecificForcing for WavesForcing {
    fn default_key(&self) -> &'static str {
        "eta_fft"
    }

    fn forcing_shape(&self, oper: &Operators2D, _a_fft: &ArrayK, rng: &mut StdRng) -> ArrayK {
        oper.random_fft(rng)
    }
}

/// Pseudo-spectral forcing schemes
#[enum_dispatch(SpecificForcing)]
#[derive(Clone, Debug)]
pub enum SpecificForcingKind {
    /// `random`
    Random(RandomForcing),
    /// `proportional`
    Proportional(ProportionalForcing),
    /// `waves`
    Waves(WavesForcing),
}
