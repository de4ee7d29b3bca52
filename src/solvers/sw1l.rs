//! # One-layer shallow water
//!
//! Rotating shallow water in velocity / surface displacement form
//!
//! `du/dt = -(rot + f) z x u - grad(c^2 eta + |u|^2 / 2)`
//!
//! `d eta/dt = -div((1 + eta) u)`
//!
//! with the Coriolis parameter `f` and the gravity wave speed `c`.
//! The mean of `eta` (mass) is conserved exactly.
use super::ns2d::{freq_advection, rotfft_from_init, save_state_2d};
use super::{Model, Solver, StatePhys, StateSpect};
use crate::error::{Error, Result};
use crate::forcing::ForcingPseudoSpectral;
use crate::init_fields::{constant_fft, load_state_spect, vecfft_noise, InitFieldsKind};
use crate::mpi::Comm;
use crate::operators::{ArrayK, Operators2D};
use crate::params::{ForcingParams, InitFieldsParams, Params};
use crate::setofvariables::SetOfVariables;
use ndarray::{Array1, Array2, Ix2, Zip};
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Parameters of the `sw1l` model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SW1LParams {
    /// Viscosity
    pub nu_2: f64,
    /// Hyper-viscosity of order 4
    pub nu_4: f64,
    /// Hyper-viscosity of order 8
    pub nu_8: f64,
    /// Hypo-viscosity
    pub nu_m4: f64,
    /// Coriolis parameter
    pub f: f64,
    /// Squared gravity wave speed
    pub c2: f64,
}

impl Default for SW1LParams {
    fn default() -> Self {
        Self {
            nu_2: 0.,
            nu_4: 0.,
            nu_8: 0.,
            nu_m4: 0.,
            f: 0.,
            c2: 20.,
        }
    }
}

/// Shallow water solver
pub struct SW1L<'a> {
    /// Spectral operators
    pub oper: Arc<Operators2D<'a>>,
    /// Model parameters
    pub physics: SW1LParams,
}

impl SW1L<'_> {
    fn energy_densities(&self, state_spect: &StateSpect<Self>) -> Result<(Array2<f64>, Array2<f64>)> {
        let c2 = self.physics.c2;
        let ux_fft = state_spect.get_var("ux_fft")?;
        let uy_fft = state_spect.get_var("uy_fft")?;
        let eta_fft = state_spect.get_var("eta_fft")?;
        let energy_kinetic = Zip::from(ux_fft)
            .and(uy_fft)
            .map_collect(|ux, uy| 0.5 * (ux.norm_sqr() + uy.norm_sqr()));
        let energy_potential = eta_fft.mapv(|eta| 0.5 * c2 * eta.norm_sqr());
        Ok((energy_kinetic, energy_potential))
    }

    fn set_velocity(&self, state_spect: &mut StateSpect<Self>, ux_fft: &ArrayK, uy_fft: &ArrayK) -> Result<()> {
        state_spect.set_var("ux_fft", ux_fft)?;
        state_spect.set_var("uy_fft", uy_fft)?;
        state_spect.set_var("eta_fft", &self.oper.zeros_spectral())
    }
}

impl Model for SW1L<'_> {
    type Elem = Complex<f64>;
    type Dim = Ix2;
    type Physics = SW1LParams;

    const NAME: &'static str = "sw1l";
    const KEYS_STATE_SPECT: &'static [&'static str] = &["ux_fft", "uy_fft", "eta_fft"];
    const KEYS_STATE_PHYS: &'static [&'static str] = &["ux", "uy", "eta", "rot"];
    const ENERGY_PARTS: &'static [&'static str] = &["energyK", "energyA"];
}

impl<'a> Solver<'a> for SW1L<'a> {
    type Forcing = ForcingPseudoSpectral<'a>;

    fn new(params: &Params<SW1LParams>, comm: Comm<'a>) -> Result<Self> {
        if !(params.physics.c2 > 0. && params.physics.c2.is_finite()) {
            return Err(Error::Config(format!(
                "physics.c2 must be positive, got {}",
                params.physics.c2
            )));
        }
        let oper = Operators2D::new(&params.oper, comm)?;
        log::info!(
            "{}: nx = {}, ny = {}, f = {}, c2 = {}, nu_8 = {:e}",
            Self::NAME,
            oper.nx,
            oper.ny,
            params.physics.f,
            params.physics.c2,
            params.physics.nu_8
        );
        Ok(Self {
            oper: Arc::new(oper),
            physics: params.physics.clone(),
        })
    }

    fn comm(&self) -> &Comm<'a> {
        self.oper.comm()
    }

    fn zeros_state_spect(&self) -> StateSpect<Self> {
        SetOfVariables::zeros(Self::KEYS_STATE_SPECT, self.oper.shape_k_loc())
    }

    fn zeros_state_phys(&self) -> StatePhys<Self> {
        SetOfVariables::zeros(Self::KEYS_STATE_PHYS, self.oper.shape_phys_loc())
    }

    fn state_phys_from_state_spect(&self, state_spect: &StateSpect<Self>) -> Result<StatePhys<Self>> {
        let ux_fft = state_spect.get_var("ux_fft")?;
        let uy_fft = state_spect.get_var("uy_fft")?;
        let rot_fft = self.oper.rotfft_from_vecfft(ux_fft, uy_fft)?;
        let vars = vec![
            self.oper.ifft(ux_fft)?,
            self.oper.ifft(uy_fft)?,
            self.oper.ifft(state_spect.get_var("eta_fft")?)?,
            self.oper.ifft(&rot_fft)?,
        ];
        SetOfVariables::from_arrays(Self::KEYS_STATE_PHYS, vars)
    }

    fn tendencies_nonlin(
        &self,
        state_spect: &StateSpect<Self>,
        forcing: Option<&StateSpect<Self>>,
    ) -> Result<StateSpect<Self>> {
        let oper = &self.oper;
        let (f, c2) = (self.physics.f, self.physics.c2);
        let ux_fft = state_spect.get_var("ux_fft")?;
        let uy_fft = state_spect.get_var("uy_fft")?;
        let eta_fft = state_spect.get_var("eta_fft")?;
        let rot_fft = oper.rotfft_from_vecfft(ux_fft, uy_fft)?;
        let ux = oper.ifft(ux_fft)?;
        let uy = oper.ifft(uy_fft)?;
        let eta = oper.ifft(eta_fft)?;
        let rot = oper.ifft(&rot_fft)?;

        // -(rot + f) z x u
        let fx = Zip::from(&rot).and(&uy).map_collect(|&rot, &uy| (rot + f) * uy);
        let fy = Zip::from(&rot).and(&ux).map_collect(|&rot, &ux| -(rot + f) * ux);
        let bernoulli = Zip::from(&eta)
            .and(&ux)
            .and(&uy)
            .map_collect(|&eta, &ux, &uy| c2 * eta + 0.5 * (ux * ux + uy * uy));
        let (px_bern_fft, py_bern_fft) = oper.gradfft_from_fft(&oper.fft(&bernoulli)?)?;
        let mut fx_fft = oper.fft(&fx)? - px_bern_fft;
        let mut fy_fft = oper.fft(&fy)? - py_bern_fft;

        // mass flux
        let jx = Zip::from(&eta).and(&ux).map_collect(|&eta, &ux| (1. + eta) * ux);
        let jy = Zip::from(&eta).and(&uy).map_collect(|&eta, &uy| (1. + eta) * uy);
        let mut feta_fft = -oper.divfft_from_vecfft(&oper.fft(&jx)?, &oper.fft(&jy)?)?;
        if oper.owns_zero_mode() {
            feta_fft[[0, 0]] = Complex::new(0., 0.);
        }
        oper.dealiasing(&mut [&mut fx_fft, &mut fy_fft, &mut feta_fft])?;

        let mut tendencies = SetOfVariables::from_arrays(Self::KEYS_STATE_SPECT, vec![fx_fft, fy_fft, feta_fft])?;
        if let Some(forcing) = forcing {
            tendencies.axpy(1., forcing)?;
        }
        Ok(tendencies)
    }

    fn freq_lin(&self) -> Array2<f64> {
        let p = &self.physics;
        self.oper.freq_lin_viscosity(p.nu_2, p.nu_4, p.nu_8, p.nu_m4)
    }

    fn freq_cfl(&self, state_phys: &StatePhys<Self>) -> Result<Option<f64>> {
        let ux = state_phys.get_var("ux")?;
        let uy = state_phys.get_var("uy")?;
        let c = self.physics.c2.sqrt();
        let freq_waves = c / self.oper.deltax + c / self.oper.deltay;
        Ok(Some(freq_advection(&self.oper, ux, uy)? + freq_waves))
    }

    fn dealiasing(&self, state_spect: &mut StateSpect<Self>) -> Result<()> {
        self.oper.dealiasing_setofvar(state_spect)
    }

    fn compute_energy(&self, state_spect: &StateSpect<Self>) -> Result<f64> {
        Ok(self.compute_energy_parts(state_spect)?.iter().sum())
    }

    fn compute_energy_parts(&self, state_spect: &StateSpect<Self>) -> Result<Vec<f64>> {
        let (energy_kinetic, energy_potential) = self.energy_densities(state_spect)?;
        Ok(vec![
            self.oper.sum_wavenumbers(&energy_kinetic)?,
            self.oper.sum_wavenumbers(&energy_potential)?,
        ])
    }

    fn compute_enstrophy(&self, state_spect: &StateSpect<Self>) -> Result<f64> {
        let rot_fft = self
            .oper
            .rotfft_from_vecfft(state_spect.get_var("ux_fft")?, state_spect.get_var("uy_fft")?)?;
        self.oper
            .sum_wavenumbers(&rot_fft.mapv(|r| 0.5 * r.norm_sqr()))
    }

    fn init_fields(&self, params: &InitFieldsParams, state_spect: &mut StateSpect<Self>) -> Result<()> {
        let oper = &self.oper;
        let kind = InitFieldsKind::parse_among(&params.type_, &InitFieldsKind::AVAILABLE_2D)?;
        match kind {
            InitFieldsKind::Constant => {
                let constant = constant_fft(oper, params.constant);
                for key in Self::KEYS_STATE_SPECT {
                    state_spect.set_var(key, &constant)?;
                }
            }
            InitFieldsKind::FromFile => {
                let loaded = load_state_spect(oper, Self::KEYS_STATE_SPECT, &params.from_file)?;
                state_spect.assign(&loaded)?;
            }
            InitFieldsKind::Noise => {
                let (ux_fft, uy_fft) = vecfft_noise(oper, params)?;
                self.set_velocity(state_spect, &ux_fft, &uy_fft)?;
            }
            _ => {
                if let Some(rot_fft) = rotfft_from_init(oper, params, kind)? {
                    let (ux_fft, uy_fft) = oper.vecfft_from_rotfft(&rot_fft)?;
                    self.set_velocity(state_spect, &ux_fft, &uy_fft)?;
                }
            }
        }
        log::info!("init_fields: {}", params.type_);
        self.dealiasing(state_spect)
    }

    fn create_forcing(&self, params: &ForcingParams) -> Result<ForcingPseudoSpectral<'a>> {
        ForcingPseudoSpectral::new(params, Arc::clone(&self.oper), Self::KEYS_STATE_SPECT)
    }

    fn compute_spectra(&self, state_spect: &StateSpect<Self>) -> Result<Option<(Array1<f64>, Vec<(String, Array1<f64>)>)>> {
        let (energy_kinetic, energy_potential) = self.energy_densities(state_spect)?;
        let spectra = vec![
            ("spectrum2d_EK".to_owned(), self.oper.spectrum2d_from_fft(&energy_kinetic)?),
            ("spectrum2d_EA".to_owned(), self.oper.spectrum2d_from_fft(&energy_potential)?),
        ];
        Ok(Some((self.oper.kh.clone(), spectra)))
    }

    fn save_state(&self, state_spect: &StateSpect<Self>, state_phys: &StatePhys<Self>, filename: &Path) -> Result<()> {
        save_state_2d(&self.oper, state_spect, state_phys, filename)
    }
}
