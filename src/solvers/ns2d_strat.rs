//! # Stratified 2D Navier-Stokes (Boussinesq)
//!
//! Vertical plane `(x, y)`, gravity along `-y`, buoyancy `b`:
//!
//! `d rot / dt = -u . grad(rot) + db/dx`
//!
//! `d b / dt = -u . grad(b) - N^2 uy`
//!
//! The total energy `1/2 sum(|u|^2 + |b|^2 / N^2)` is conserved by the
//! inviscid equations.
use super::ns2d::{advection, energy_from_rotfft, freq_advection, rotfft_from_init, save_state_2d};
use super::{Model, Solver, StatePhys, StateSpect};
use crate::error::{Error, Result};
use crate::forcing::ForcingPseudoSpectral;
use crate::init_fields::{constant_fft, load_state_spect, InitFieldsKind};
use crate::mpi::Comm;
use crate::operators::Operators2D;
use crate::params::{ForcingParams, InitFieldsParams, Params};
use crate::setofvariables::SetOfVariables;
use ndarray::{Array1, Array2, Ix2, Zip};
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Parameters of the `ns2d.strat` model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NS2DStratParams {
    /// Viscosity
    pub nu_2: f64,
    /// Hyper-viscosity of order 4
    pub nu_4: f64,
    /// Hyper-viscosity of order 8
    pub nu_8: f64,
    /// Hypo-viscosity
    pub nu_m4: f64,
    /// Brunt-Vaisala frequency
    #[serde(rename = "N")]
    pub n: f64,
}

impl Default for NS2DStratParams {
    fn default() -> Self {
        Self {
            nu_2: 0.,
            nu_4: 0.,
            nu_8: 0.,
            nu_m4: 0.,
            n: 1.,
        }
    }
}

/// Boussinesq solver in vorticity-buoyancy form
pub struct NS2DStrat<'a> {
    /// Spectral operators
    pub oper: Arc<Operators2D<'a>>,
    /// Model parameters
    pub physics: NS2DStratParams,
}

impl NS2DStrat<'_> {
    /// Kinetic energy `1/2 sum |u|^2`. Collective.
    ///
    /// # Errors
    /// State has no `rot_fft` or wrong shape.
    pub fn compute_energy_kinetic(&self, state_spect: &StateSpect<Self>) -> Result<f64> {
        energy_from_rotfft(&self.oper, state_spect.get_var("rot_fft")?)
    }

    /// Potential energy `1/2 sum |b|^2 / N^2`. Collective.
    ///
    /// # Errors
    /// State has no `b_fft` or wrong shape.
    pub fn compute_energy_potential(&self, state_spect: &StateSpect<Self>) -> Result<f64> {
        let n2 = self.physics.n * self.physics.n;
        let b_fft = state_spect.get_var("b_fft")?;
        self.oper
            .sum_wavenumbers(&b_fft.mapv(|b| 0.5 * b.norm_sqr() / n2))
    }
}

impl Model for NS2DStrat<'_> {
    type Elem = Complex<f64>;
    type Dim = Ix2;
    type Physics = NS2DStratParams;

    const NAME: &'static str = "ns2d.strat";
    const KEYS_STATE_SPECT: &'static [&'static str] = &["rot_fft", "b_fft"];
    const KEYS_STATE_PHYS: &'static [&'static str] = &["rot", "b", "ux", "uy"];
    const ENERGY_PARTS: &'static [&'static str] = &["energyK", "energyA"];
}

impl<'a> Solver<'a> for NS2DStrat<'a> {
    type Forcing = ForcingPseudoSpectral<'a>;

    fn new(params: &Params<NS2DStratParams>, comm: Comm<'a>) -> Result<Self> {
        if !(params.physics.n > 0. && params.physics.n.is_finite()) {
            return Err(Error::Config(format!(
                "physics.N must be positive, got {}",
                params.physics.n
            )));
        }
        let oper = Operators2D::new(&params.oper, comm)?;
        log::info!(
            "{}: nx = {}, ny = {}, N = {}, nu_2 = {:e}, nu_8 = {:e}",
            Self::NAME,
            oper.nx,
            oper.ny,
            params.physics.n,
            params.physics.nu_2,
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
        let rot_fft = state_spect.get_var("rot_fft")?;
        let (ux_fft, uy_fft) = self.oper.vecfft_from_rotfft(rot_fft)?;
        let vars = vec![
            self.oper.ifft(rot_fft)?,
            self.oper.ifft(state_spect.get_var("b_fft")?)?,
            self.oper.ifft(&ux_fft)?,
            self.oper.ifft(&uy_fft)?,
        ];
        SetOfVariables::from_arrays(Self::KEYS_STATE_PHYS, vars)
    }

    fn tendencies_nonlin(
        &self,
        state_spect: &StateSpect<Self>,
        forcing: Option<&StateSpect<Self>>,
    ) -> Result<StateSpect<Self>> {
        let oper = &self.oper;
        let n2 = self.physics.n * self.physics.n;
        let rot_fft = state_spect.get_var("rot_fft")?;
        let b_fft = state_spect.get_var("b_fft")?;
        let (ux_fft, uy_fft) = oper.vecfft_from_rotfft(rot_fft)?;
        let ux = oper.ifft(&ux_fft)?;
        let uy = oper.ifft(&uy_fft)?;

        let mut frot_fft = oper.fft(&advection(oper, &ux, &uy, rot_fft)?)?;
        let mut fb_fft = oper.fft(&advection(oper, &ux, &uy, b_fft)?)?;
        oper.dealiasing(&mut [&mut frot_fft, &mut fb_fft])?;

        // buoyancy torque and exchange with the potential energy
        let i = Complex::<f64>::i();
        Zip::from(&mut frot_fft)
            .and(b_fft)
            .and(&oper.kx)
            .for_each(|f, &b, &kx| *f += i * b * kx);
        Zip::from(&mut fb_fft)
            .and(&uy_fft)
            .for_each(|f, &uy| *f -= uy * n2);

        let mut tendencies = SetOfVariables::from_arrays(Self::KEYS_STATE_SPECT, vec![frot_fft, fb_fft])?;
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
        let freq = freq_advection(&self.oper, ux, uy)?;
        Ok(Some(freq.max(self.physics.n)))
    }

    fn dealiasing(&self, state_spect: &mut StateSpect<Self>) -> Result<()> {
        self.oper.dealiasing_setofvar(state_spect)
    }

    fn compute_energy(&self, state_spect: &StateSpect<Self>) -> Result<f64> {
        Ok(self.compute_energy_kinetic(state_spect)? + self.compute_energy_potential(state_spect)?)
    }

    fn compute_energy_parts(&self, state_spect: &StateSpect<Self>) -> Result<Vec<f64>> {
        Ok(vec![
            self.compute_energy_kinetic(state_spect)?,
            self.compute_energy_potential(state_spect)?,
        ])
    }

    fn compute_enstrophy(&self, state_spect: &StateSpect<Self>) -> Result<f64> {
        let rot_fft = state_spect.get_var("rot_fft")?;
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
            _ => {
                if let Some(rot_fft) = rotfft_from_init(oper, params, kind)? {
                    state_spect.set_var("rot_fft", &rot_fft)?;
                    state_spect.set_var("b_fft", &oper.zeros_spectral())?;
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
        let n2 = self.physics.n * self.physics.n;
        let rot_fft = state_spect.get_var("rot_fft")?;
        let b_fft = state_spect.get_var("b_fft")?;
        let (ux_fft, uy_fft) = self.oper.vecfft_from_rotfft(rot_fft)?;
        let energy_kinetic = Zip::from(&ux_fft)
            .and(&uy_fft)
            .map_collect(|ux, uy| 0.5 * (ux.norm_sqr() + uy.norm_sqr()));
        let energy_potential = b_fft.mapv(|b| 0.5 * b.norm_sqr() / n2);
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
