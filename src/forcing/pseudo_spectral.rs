//! Forcing of pseudo-spectral models
use super::specific::{ProportionalForcing, RandomForcing, WavesForcing};
use super::specific::{SpecificForcing, SpecificForcingKind};
use super::{coef_normalization, resolve_seed, Forcing, ForcingKind};
use crate::error::{Error, Result};
use crate::operators::{ArrayK, Operators2D};
use crate::params::ForcingParams;
use crate::setofvariables::SetOfVariables;
use ndarray::{Array2, Ix2, Zip};
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use num_complex::Complex;
use std::sync::Arc;

/// Forcing in the wavenumber band `[nkmin_forcing, nkmax_forcing] * deltakh`
///
/// The forcing `F` of the forced variable `a` is scaled such that an
/// Euler step injects `1/2 sum(w |a|^2)` at the rate `forcing_rate`,
/// with `w = 1 / k^2` for the vorticity (energy) and `w = 1` otherwise.
///
/// Random schemes draw the same global field on every worker, which
/// keeps its columns, see [`Operators2D::random_fft`].
pub struct ForcingPseudoSpectral<'a> {
    oper: Arc<Operators2D<'a>>,
    specific: SpecificForcingKind,
    kind: ForcingKind,
    key_forced: String,
    forcing_rate: f64,
    in_band: Array2<bool>,
    weight: Array2<f64>,
    seed: u64,
    rng: StdRng,
    forcing_fft: SetOfVariables<Complex<f64>, Ix2>,
}

impl<'a> ForcingPseudoSpectral<'a> {
    /// Schemes of the pseudo-spectral family
    pub const AVAILABLE: [&'static str; 3] = ["random", "proportional", "waves"];

    /// Resolve the scheme `params.type_` for a state with keys
    /// `keys_state_spect`. Collective, see [`Self::seed`].
    ///
    /// # Errors
    /// Unknown scheme (`UnknownForcingType`), forced variable not
    /// part of the state (`UnknownVariable`) or invalid parameters.
    pub fn new(params: &ForcingParams, oper: Arc<Operators2D<'a>>, keys_state_spect: &[&str]) -> Result<Self> {
        let unknown = || ForcingKind::unknown(&params.type_, &Self::AVAILABLE);
        let kind: ForcingKind = params.type_.parse().map_err(|_| unknown())?;
        let specific: SpecificForcingKind = match kind {
            ForcingKind::Random => RandomForcing.into(),
            ForcingKind::Proportional => ProportionalForcing.into(),
            ForcingKind::Waves => WavesForcing.into(),
            ForcingKind::Noise => return Err(unknown()),
        };
        params.validate()?;

        let key_forced = params
            .key_forced
            .clone()
            .unwrap_or_else(|| specific.default_key().to_owned());
        if !keys_state_spect.contains(&key_forced.as_str()) {
            return Err(Error::UnknownVariable(key_forced));
        }

        let kmin = params.nkmin_forcing * oper.deltakh;
        let kmax = params.nkmax_forcing * oper.deltakh;
        let in_band = oper.kk.mapv(|kk| {
            let k = kk.sqrt();
            kk > 0. && k >= kmin && k <= kmax
        });
        let weight = if key_forced == "rot_fft" {
            oper.kk_not0.mapv(|kk| 1. / kk)
        } else {
            Array2::ones(oper.kk.raw_dim())
        };
        let seed = resolve_seed(params.seed, oper.comm());
        log::info!(
            "forcing {}: {} in [{:.3}, {:.3}], rate {}, seed {}",
            kind.name(),
            key_forced,
            kmin,
            kmax,
            params.forcing_rate,
            seed
        );

        let forcing_fft = SetOfVariables::zeros(keys_state_spect, oper.shape_k_loc());
        Ok(Self {
            oper,
            specific,
            kind,
            key_forced,
            forcing_rate: params.forcing_rate,
            in_band,
            weight,
            seed,
            rng: StdRng::seed_from_u64(seed),
            forcing_fft,
        })
    }

    /// Scheme
    pub fn kind(&self) -> ForcingKind {
        self.kind
    }

    /// Forced variable
    pub fn key_forced(&self) -> &str {
        &self.key_forced
    }

    /// Mask of the forced wavenumbers (local)
    pub fn in_band(&self) -> &Array2<bool> {
        &self.in_band
    }

    /// Seed of the random schemes, the configured one or drawn by the root
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Injection rate of `f_fft` into `a_fft` for an Euler step `deltat`:
    /// `sum(w Re(conj(a) f)) + deltat / 2 sum(w |f|^2)`. Collective.
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn injection_rate(&self, a_fft: &ArrayK, f_fft: &ArrayK, deltat: f64) -> Result<f64> {
        let (a, b) = self.injection_coefs(a_fft, f_fft, deltat)?;
        Ok(a + b)
    }

    fn injection_coefs(&self, a_fft: &ArrayK, f_fft: &ArrayK, deltat: f64) -> Result<(f64, f64)> {
        let linear = Zip::from(a_fft)
            .and(f_fft)
            .and(&self.weight)
            .map_collect(|a, f, &w| w * (a.conj() * f).re);
        let quadratic = Zip::from(f_fft)
            .and(&self.weight)
            .map_collect(|f, &w| w * f.norm_sqr());
        Ok((
            self.oper.sum_wavenumbers(&linear)?,
            deltat / 2. * self.oper.sum_wavenumbers(&quadratic)?,
        ))
    }


    /// Unnormalized forcing of `a_fft`, zero outside of the band.
    /// Local, advances the generator.
    ///
    /// # Errors
    /// Shape mismatch.
    pub(crate) fn forcing_in_band(&mut self, a_fft: &ArrayK) -> Result<ArrayK> {
        let mut f_fft = self
            .specific
            .forcing_shape(&self.oper, a_fft, &mut self.rng);
        if f_fft.shape() != a_fft.shape() {
            return Err(Error::shape(a_fft.shape(), f_fft.shape()));
        }
        Zip::from(&mut f_fft)
            .and(&self.in_band)
            .for_each(|f, &forced| {
                if !forced {
                    *f = Complex::new(0., 0.);
                }
            });
        Ok(f_fft)
    }
}

impl Forcing<Complex<f64>, Ix2> for ForcingPseudoSpectral<'_> {
    fn compute(&mut self, state_spect: &SetOfVariables<Complex<f64>, Ix2>, deltat: f64) -> Result<()> {
        let a_fft = state_spect.get_var(&self.key_forced)?;
        let mut f_fft = self.forcing_in_band(a_fft)?;
        let (a, b) = self.injection_coefs(a_fft, &f_fft, deltat)?;
        let alpha = coef_normalization(a, b, self.forcing_rate);
        f_fft.mapv_inplace(|f| f * alpha);

        self.forcing_fft.fill_zero();
        self.forcing_fft.set_var(&self.key_forced, &f_fft)?;
        Ok(())
    }

    fn get_forcing(&self) -> &SetOfVariables<Complex<f64>, Ix2> {
        &self.forcing_fft
    }
}
