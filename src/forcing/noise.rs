//! Forcing of 0D models
use super::{resolve_seed, Forcing, ForcingKind};
use crate::error::{Error, Result};
use crate::mpi::Comm;
use crate::params::ForcingParams;
use crate::setofvariables::SetOfVariables;
use ndarray::{Array, Dimension};
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

/// White noise with variance `forcing_rate / deltat`, drawn once per
/// time step (an Euler-Maruyama step of diffusion `forcing_rate`)
pub struct ForcingNoise<D: Dimension> {
    keys_forced: Vec<String>,
    forcing_rate: f64,
    seed: u64,
    rng: StdRng,
    forcing: SetOfVariables<f64, D>,
}

impl<D: Dimension> ForcingNoise<D> {
    /// Schemes of the 0D family
    pub const AVAILABLE: [&'static str; 1] = ["noise"];

    /// Noise on `key_forced`, or on every variable if it is not set.
    /// Collective, see [`Self::seed`].
    ///
    /// # Errors
    /// Unknown scheme or forced variable.
    pub fn new(params: &ForcingParams, keys_state: &[&str], dim: D, comm: &Comm) -> Result<Self> {
        match params.type_.parse::<ForcingKind>() {
            Ok(ForcingKind::Noise) => (),
            _ => return Err(ForcingKind::unknown(&params.type_, &Self::AVAILABLE)),
        }
        params.validate()?;
        let keys_forced = match &params.key_forced {
            Some(key) if keys_state.contains(&key.as_str()) => vec![key.clone()],
            Some(key) => return Err(Error::UnknownVariable(key.clone())),
            None => keys_state.iter().map(|k| (*k).to_owned()).collect(),
        };
        let seed = resolve_seed(params.seed, comm);
        log::info!("forcing noise: {:?}, seed {}", keys_forced, seed);
        Ok(Self {
            keys_forced,
            forcing_rate: params.forcing_rate,
            seed,
            rng: StdRng::seed_from_u64(seed),
            forcing: SetOfVariables::zeros(keys_state, dim),
        })
    }

    /// Seed of the noise, the configured one or drawn by the root
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl<D: Dimension> Forcing<f64, D> for ForcingNoise<D> {
    fn compute(&mut self, state: &SetOfVariables<f64, D>, deltat: f64) -> Result<()> {
        let amplitude = (12. * self.forcing_rate.abs() / deltat).sqrt();
        let dist = Uniform::new(-0.5, 0.5);
        for key in &self.keys_forced {
            let shape = state.get_var(key)?.raw_dim();
            let noise = Array::random_using(shape, dist, &mut self.rng) * amplitude;
            self.forcing.set_var(key, &noise)?;
        }
        Ok(())
    }

    fn get_forcing(&self) -> &SetOfVariables<f64, D> {
        &self.forcing
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Ix0;

    fn params() -> ForcingParams {
        ForcingParams {
            type_: "noise".to_owned(),
            key_forced: Some("Y".to_owned()),
            seed: Some(3),
            ..ForcingParams::default()
        }
    }

    #[test]
    fn test_noise_on_forced_key() {
        let keys = ["X", "Y", "Z"];
        let state = SetOfVariables::<f64, _>::zeros(&keys, Ix0());
        let mut forcing = ForcingNoise::new(&params(), &keys, Ix0(), &Comm::serial()).unwrap();
        assert_eq!(forcing.seed(), 3);
        forcing.compute(&state, 0.01).unwrap();
        let f = forcing.get_forcing();
        assert_eq!(f.get_var("X").unwrap()[()], 0.);
        assert!(f.get_var("Y").unwrap()[()] != 0.);
        // |noise| <= sqrt(12 rate / dt) / 2
        assert!(f.get_var("Y").unwrap()[()].abs() <= (12. / 0.01f64).sqrt() / 2.);
    }

    #[test]
    fn test_noise_rejects_spectral_schemes() {
        let p = ForcingParams {
            type_: "random".to_owned(),
            ..params()
        };
        assert!(matches!(
            ForcingNoise::new(&p, &["X"], Ix0(), &Comm::serial()),
            Err(Error::UnknownForcingType { .. })
        ));
    }
}
