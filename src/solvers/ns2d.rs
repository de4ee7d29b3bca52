//! # Incompressible 2D Navier-Stokes
//!
//! Vorticity form on a doubly periodic domain
//!
//! `d rot / dt = -u . grad(rot) - freq_lin rot + forcing`
//!
//! with the velocity recovered from the vorticity (`u = curl^-1 rot`).
//!
//! # Example
//! Decaying turbulence from a random initial field
//! ```no_run
//! use fluidspec::simul::Simul;
//! use fluidspec::solvers::{Model, NS2D};
//!
//! let mut params = NS2D::create_default_params();
//! params.oper.nx = 64;
//! params.oper.ny = 64;
//! params.physics.nu_8 = 2e-6;
//! params.init_fields.type_ = "noise".to_owned();
//! params.time_stepping.t_end = 2.;
//! let mut sim = Simul::<NS2D>::new(params, Default::default()).unwrap();
//! sim.start().unwrap();
//! ```
use super::{Model, Solver, StatePhys, StateSpect};
use crate::error::Result;
use crate::forcing::ForcingPseudoSpectral;
use crate::init_fields::{constant_fft, load_state_spect, rot_dipole, rot_jet};
use crate::init_fields::{rotfft_from_rot, rotfft_noise, save_state_spect, InitFieldsKind};
use crate::io::{write_scalar_to_hdf5, write_to_hdf5};
use crate::mpi::Comm;
use crate::operators::{ArrayK, Operators2D};
use crate::params::{ForcingParams, InitFieldsParams, Params};
use crate::setofvariables::SetOfVariables;
use ndarray::{Array1, Array2, Ix2, Zip};
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Viscosities of the `ns2d` model
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NS2DParams {
    /// Viscosity
    pub nu_2: f64,
    /// Hyper-viscosity of order 4
    pub nu_4: f64,
    /// Hyper-viscosity of order 8
    pub nu_8: f64,
    /// Hypo-viscosity
    pub nu_m4: f64,
}

/// 2D Navier-Stokes solver in vorticity form
pub struct NS2D<'a> {
    /// Spectral operators
    pub oper: Arc<Operators2D<'a>>,
    /// Model parameters
    pub physics: NS2DParams,
}

/// `-(ux df/dx + uy df/dy)` in physical space
pub(crate) fn advection(oper: &Operators2D, ux: &Array2<f64>, uy: &Array2<f64>, f_fft: &ArrayK) -> Result<Array2<f64>> {
    let (px_f_fft, py_f_fft) = oper.gradfft_from_fft(f_fft)?;
    let px_f = oper.ifft(&px_f_fft)?;
    let py_f = oper.ifft(&py_f_fft)?;
    Ok(Zip::from(ux)
        .and(uy)
        .and(&px_f)
        .and(&py_f)
        .map_collect(|&ux, &uy, &px, &py| -ux * px - uy * py))
}

/// Largest advective frequency `max|ux| / dx + max|uy| / dy`. Collective.
pub(crate) fn freq_advection(oper: &Operators2D, ux: &Array2<f64>, uy: &Array2<f64>) -> Result<f64> {
    let max_ux = oper.max_global(&ux.mapv(f64::abs))?;
    let max_uy = oper.max_global(&uy.mapv(f64::abs))?;
    Ok(max_ux / oper.deltax + max_uy / oper.deltay)
}

/// Kinetic energy `1/2 sum |u|^2` of a vorticity field. Collective.
pub(crate) fn energy_from_rotfft(oper: &Operators2D, rot_fft: &ArrayK) -> Result<f64> {
    let (ux_fft, uy_fft) = oper.vecfft_from_rotfft(rot_fft)?;
    let energy = Zip::from(&ux_fft)
        .and(&uy_fft)
        .map_collect(|ux, uy| 0.5 * (ux.norm_sqr() + uy.norm_sqr()));
    oper.sum_wavenumbers(&energy)
}

/// Vorticity of the strategies shared by the vorticity based models,
/// `None` if the strategy does not produce a vorticity
pub(crate) fn rotfft_from_init(oper: &Operators2D, params: &InitFieldsParams, kind: InitFieldsKind) -> Result<Option<ArrayK>> {
    let rot_fft = match kind {
        InitFieldsKind::Noise => rotfft_noise(oper, params)?,
        InitFieldsKind::Jet => rotfft_from_rot(oper, &rot_jet(oper))?,
        InitFieldsKind::Dipole => rotfft_from_rot(oper, &rot_dipole(oper))?,
        _ => return Ok(None),
    };
    Ok(Some(rot_fft))
}

/// Write spectral and physical variables of a 2D model. Collective.
pub(crate) fn save_state_2d(
    oper: &Operators2D,
    state_spect: &SetOfVariables<Complex<f64>, Ix2>,
    state_phys: &SetOfVariables<f64, Ix2>,
    filename: &Path,
) -> Result<()> {
    save_state_spect(oper, state_spect, filename)?;
    for (key, var) in state_phys.iter() {
        if let Some(global) = oper.gather_physical(var)? {
            write_to_hdf5(filename, key, &global)?;
        }
    }
    if oper.comm().is_root() {
        write_scalar_to_hdf5(filename, "lx", oper.lx)?;
        write_scalar_to_hdf5(filename, "ly", oper.ly)?;
    }
    Ok(())
}

impl Model for NS2D<'_> {
    type Elem = Complex<f64>;
    type Dim = Ix2;
    type Physics = NS2DParams;

    const NAME: &'static str = "ns2d";
    const KEYS_STATE_SPECT: &'static [&'static str] = &["rot_fft"];
    const KEYS_STATE_PHYS: &'static [&'static str] = &["rot", "ux", "uy"];
}

impl<'a> Solver<'a> for NS2D<'a> {
    type Forcing = ForcingPseudoSpectral<'a>;

    fn new(params: &Params<NS2DParams>, comm: Comm<'a>) -> Result<Self> {
        let oper = Operators2D::new(&params.oper, comm)?;
        log::info!(
            "{}: nx = {}, ny = {}, lx = {}, ly = {}, nu_2 = {:e}, nu_8 = {:e}",
            Self::NAME,
            oper.nx,
            oper.ny,
            oper.lx,
            oper.ly,
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
        let rot = self.oper.ifft(rot_fft)?;
        let ux = self.oper.ifft(&ux_fft)?;
        let uy = self.oper.ifft(&uy_fft)?;
        SetOfVariables::from_arrays(Self::KEYS_STATE_PHYS, vec![rot, ux, uy])
    }

    fn tendencies_nonlin(
        &self,
        state_spect: &StateSpect<Self>,
        forcing: Option<&StateSpect<Self>>,
    ) -> Result<StateSpect<Self>> {
        let oper = &self.oper;
        let rot_fft = state_spect.get_var("rot_fft")?;
        let (ux_fft, uy_fft) = oper.vecfft_from_rotfft(rot_fft)?;
        let ux = oper.ifft(&ux_fft)?;
        let uy = oper.ifft(&uy_fft)?;

        let mut frot_fft = oper.fft(&advection(oper, &ux, &uy, rot_fft)?)?;
        oper.dealiasing_variable(&mut frot_fft)?;

        let mut tendencies = SetOfVariables::from_arrays(Self::KEYS_STATE_SPECT, vec![frot_fft])?;
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
        freq_advection(&self.oper, ux, uy).map(Some)
    }

    fn dealiasing(&self, state_spect: &mut StateSpect<Self>) -> Result<()> {
        self.oper.dealiasing_setofvar(state_spect)
    }

    fn compute_energy(&self, state_spect: &StateSpect<Self>) -> Result<f64> {
        energy_from_rotfft(&self.oper, state_spect.get_var("rot_fft")?)
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
                state_spect.set_var("rot_fft", &constant_fft(oper, params.constant))?;
            }
            InitFieldsKind::FromFile => {
                let loaded = load_state_spect(oper, Self::KEYS_STATE_SPECT, &params.from_file)?;
                state_spect.assign(&loaded)?;
            }
            _ => {
                if let Some(rot_fft) = rotfft_from_init(oper, params, kind)? {
                    state_spect.set_var("rot_fft", &rot_fft)?;
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
        let rot_fft = state_spect.get_var("rot_fft")?;
        let (ux_fft, uy_fft) = self.oper.vecfft_from_rotfft(rot_fft)?;
        let energy = Zip::from(&ux_fft)
            .and(&uy_fft)
            .map_collect(|ux, uy| 0.5 * (ux.norm_sqr() + uy.norm_sqr()));
        let enstrophy = rot_fft.mapv(|r| 0.5 * r.norm_sqr());
        let spectra = vec![
            ("spectrum2d_E".to_owned(), self.oper.spectrum2d_from_fft(&energy)?),
            ("spectrum2d_Z".to_owned(), self.oper.spectrum2d_from_fft(&enstrophy)?),
        ];
        Ok(Some((self.oper.kh.clone(), spectra)))
    }

    fn save_state(&self, state_spect: &StateSpect<Self>, state_phys: &StatePhys<Self>, filename: &Path) -> Result<()> {
        save_state_2d(&self.oper, state_spect, state_phys, filename)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray_rand::rand::rngs::StdRng;
    use ndarray_rand::rand::SeedableRng;

    fn solver() -> NS2D<'static> {
        let mut params = NS2D::create_default_params();
        params.oper.nx = 32;
        params.oper.ny = 24;
        NS2D::new(&params, Comm::serial()).unwrap()
    }

    fn random_state(solver: &NS2D, seed: u64) -> StateSpect<NS2D<'static>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = solver.zeros_state_spect();
        let mut rot_fft = solver.oper.random_fft(&mut rng);
        rot_fft[[0, 0]] = Complex::new(0., 0.);
        state.set_var("rot_fft", &rot_fft).unwrap();
        solver.dealiasing(&mut state).unwrap();
        state
    }

    #[test]
    fn test_advection_conserves_energy_and_enstrophy() {
        let solver = solver();
        let oper = &solver.oper;
        let state = random_state(&solver, 1);
        let tendencies = solver.tendencies_nonlin(&state, None).unwrap();
        let rot_fft = state.get_var("rot_fft").unwrap();
        let f_fft = tendencies.get_var("rot_fft").unwrap();

        let energy = solver.compute_energy(&state).unwrap();
        let enstrophy = solver.compute_enstrophy(&state).unwrap();
        // inverse eddy turnover time
        let rate = (2. * enstrophy).sqrt();

        let dz = Zip::from(rot_fft)
            .and(f_fft)
            .map_collect(|r, f| (r.conj() * f).re);
        let dz_dt = oper.sum_wavenumbers(&dz).unwrap();
        assert!(dz_dt.abs() < 1e-10 * enstrophy * rate, "dZ/dt = {}", dz_dt);

        let de = Zip::from(rot_fft)
            .and(f_fft)
            .and(&oper.kk_not0)
            .map_collect(|r, f, &kk| (r.conj() * f).re / kk);
        let de_dt = oper.sum_wavenumbers(&de).unwrap();
        assert!(de_dt.abs() < 1e-10 * energy * rate, "dE/dt = {}", de_dt);
    }

    #[test]
    fn test_tendencies_add_forcing() {
        let solver = solver();
        let state = random_state(&solver, 2);
        let forcing = random_state(&solver, 3);
        let without = solver.tendencies_nonlin(&state, None).unwrap();
        let with = solver.tendencies_nonlin(&state, Some(&forcing)).unwrap();
        let expected = without.checked_add(&forcing).unwrap();
        for (a, b) in with.get_var("rot_fft").unwrap().iter().zip(expected.get_var("rot_fft").unwrap()) {
            assert!((a - b).norm() < 1e-14);
        }
    }

    #[test]
    fn test_state_phys_and_energy() {
        let solver = solver();
        let state = random_state(&solver, 4);
        let phys = solver.state_phys_from_state_spect(&state).unwrap();
        let ux = phys.get_var("ux").unwrap();
        let uy = phys.get_var("uy").unwrap();
        // energy from spectral space equals the physical mean
        let energy_phys = solver
            .oper
            .mean_global(&Zip::from(ux).and(uy).map_collect(|a, b| 0.5 * (a * a + b * b)))
            .unwrap();
        let energy = solver.compute_energy(&state).unwrap();
        assert!((energy - energy_phys).abs() < 1e-10 * energy);
        assert!(solver.freq_cfl(&phys).unwrap().unwrap() > 0.);
    }

    #[test]
    fn test_spectra_sum_to_energy() {
        let solver = solver();
        let state = random_state(&solver, 5);
        let (kh, spectra) = solver.compute_spectra(&state).unwrap().unwrap();
        assert_eq!(kh.len(), spectra[0].1.len());
        let energy = spectra[0].1.sum() * solver.oper.deltakh;
        assert!((energy - solver.compute_energy(&state).unwrap()).abs() < 1e-10 * energy);
    }

    #[test]
    fn test_init_fields() {
        let solver = solver();
        let mut state = solver.zeros_state_spect();
        let mut params = InitFieldsParams::default();
        params.type_ = "dipole".to_owned();
        solver.init_fields(&params, &mut state).unwrap();
        assert!(solver.compute_energy(&state).unwrap() > 0.);
        params.type_ = "manual".to_owned();
        assert!(solver.init_fields(&params, &mut state).is_err());
    }
}
