//! # Solvers
//!
//! A solver defines the evolved variables of a model, their nonlinear
//! tendencies and linear frequencies, and how they are initialized,
//! forced and written. Solvers are selected by name with [`SolverKind`].
//!
//! [`Model`] holds what does not depend on the workers (variables,
//! parameters, name), [`Solver`] the operations of a model on the
//! workers of a communicator.
//!
//! Implemented models:
//! - `lorenz`: Lorenz system, see [`Lorenz`]
//! - `ns2d`: 2D Navier-Stokes in vorticity form, see [`NS2D`]
//! - `ns2d.strat`: 2D Boussinesq stratified flow, see [`NS2DStrat`]
//! - `sw1l`: one-layer shallow water, see [`SW1L`]
pub mod lorenz;
pub mod ns2d;
pub mod ns2d_strat;
pub mod sw1l;
use crate::error::{Error, Result};
use crate::forcing::Forcing;
use crate::io::write_scalar_to_hdf5;
use crate::mpi::Comm;
use crate::params::{ForcingParams, InitFieldsParams, Params};
use crate::setofvariables::SetOfVariables;
use crate::types::Scalar;
pub use lorenz::{Lorenz, LorenzParams};
use ndarray::{Array, Array1, Dimension};
pub use ns2d::{NS2DParams, NS2D};
pub use ns2d_strat::{NS2DStrat, NS2DStratParams};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use std::str::FromStr;
pub use sw1l::{SW1LParams, SW1L};

/// Evolved variables of solver `S`
pub type StateSpect<S> = SetOfVariables<<S as Model>::Elem, <S as Model>::Dim>;

/// Physical variables of solver `S`
pub type StatePhys<S> = SetOfVariables<f64, <S as Model>::Dim>;

/// Variables, parameters and name of a model
pub trait Model: Sized {
    /// Scalar type of the evolved variables
    type Elem: Scalar;
    /// Dimension of the variables
    type Dim: Dimension;
    /// Model parameters
    type Physics: Clone + Debug + Default + Serialize + DeserializeOwned;

    /// Name in the registry
    const NAME: &'static str;
    /// Keys of the evolved variables
    const KEYS_STATE_SPECT: &'static [&'static str];
    /// Keys of the physical variables
    const KEYS_STATE_PHYS: &'static [&'static str];
    /// Names of the parts of the energy, see [`Solver::compute_energy_parts`]
    const ENERGY_PARTS: &'static [&'static str] = &[];

    /// Model specific defaults on top of the generic ones
    fn complete_params(_params: &mut Params<Self::Physics>) {}

    /// Default parameters of the solver
    fn create_default_params() -> Params<Self::Physics> {
        let mut params = Params::<Self::Physics>::default();
        params.solver = Self::NAME.to_owned();
        Self::complete_params(&mut params);
        params
    }
}

/// Model of a simulation, run on the workers of a communicator
pub trait Solver<'a>: Model {
    /// Forcing scheme family
    type Forcing: Forcing<Self::Elem, Self::Dim>;

    /// Build the solver
    ///
    /// # Errors
    /// Invalid parameters.
    fn new(params: &Params<Self::Physics>, comm: Comm<'a>) -> Result<Self>;

    /// Communicator
    fn comm(&self) -> &Comm<'a>;

    /// True on the worker which writes files
    fn is_root(&self) -> bool {
        self.comm().is_root()
    }

    /// Zero evolved variables
    fn zeros_state_spect(&self) -> StateSpect<Self>;

    /// Zero physical variables
    fn zeros_state_phys(&self) -> StatePhys<Self>;

    /// Physical variables from the evolved ones
    ///
    /// # Errors
    /// State does not conform to the solver.
    fn state_phys_from_state_spect(&self, state_spect: &StateSpect<Self>) -> Result<StatePhys<Self>>;

    /// Nonlinear tendencies of `state_spect`, plus `forcing` if given
    ///
    /// # Errors
    /// State does not conform to the solver.
    fn tendencies_nonlin(
        &self,
        state_spect: &StateSpect<Self>,
        forcing: Option<&StateSpect<Self>>,
    ) -> Result<StateSpect<Self>>;

    /// Linear frequencies (dissipation) handled by the integrating factor
    fn freq_lin(&self) -> Array<f64, Self::Dim>;

    /// Largest frequency of the CFL condition, `None` without condition
    ///
    /// # Errors
    /// State does not conform to the solver.
    fn freq_cfl(&self, _state_phys: &StatePhys<Self>) -> Result<Option<f64>> {
        Ok(None)
    }

    /// Remove aliased modes
    ///
    /// # Errors
    /// State does not conform to the solver.
    fn dealiasing(&self, _state_spect: &mut StateSpect<Self>) -> Result<()> {
        Ok(())
    }

    /// Quadratic energy (spatial mean)
    ///
    /// # Errors
    /// State does not conform to the solver.
    fn compute_energy(&self, state_spect: &StateSpect<Self>) -> Result<f64>;

    /// Enstrophy (spatial mean), zero for models without vorticity
    ///
    /// # Errors
    /// State does not conform to the solver.
    fn compute_enstrophy(&self, _state_spect: &StateSpect<Self>) -> Result<f64> {
        Ok(0.)
    }

    /// Parts of the energy in the order of [`Model::ENERGY_PARTS`],
    /// printed and saved next to the total
    ///
    /// # Errors
    /// State does not conform to the solver.
    fn compute_energy_parts(&self, _state_spect: &StateSpect<Self>) -> Result<Vec<f64>> {
        Ok(Vec::new())
    }

    /// Initialize the evolved variables
    ///
    /// # Errors
    /// Strategy not supported by the model (`UnknownInitFields`).
    fn init_fields(&self, params: &InitFieldsParams, state_spect: &mut StateSpect<Self>) -> Result<()>;

    /// Forcing scheme of `params.type_`
    ///
    /// # Errors
    /// Scheme not supported by the model (`UnknownForcingType`).
    fn create_forcing(&self, params: &ForcingParams) -> Result<Self::Forcing>;

    /// Radial spectra `(name, spectrum)` and their wavenumbers
    ///
    /// # Errors
    /// State does not conform to the solver.
    fn compute_spectra(&self, _state_spect: &StateSpect<Self>) -> Result<Option<(Array1<f64>, Vec<(String, Array1<f64>)>)>> {
        Ok(None)
    }

    /// Write the state to an hdf5 file. Collective, the root writes.
    ///
    /// # Errors
    /// File can not be written.
    fn save_state(
        &self,
        state_spect: &StateSpect<Self>,
        state_phys: &StatePhys<Self>,
        filename: &Path,
    ) -> Result<()>;
}

/// Write the simulation time next to the state
pub(crate) fn save_time(filename: &Path, t: f64, it: usize) -> Result<()> {
    write_scalar_to_hdf5(filename, "t", t)?;
    write_scalar_to_hdf5(filename, "it", it as u64)?;
    Ok(())
}

/// Registered solvers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverKind {
    /// `lorenz`
    Lorenz,
    /// `ns2d`
    NS2D,
    /// `ns2d.strat`
    NS2DStrat,
    /// `sw1l`
    SW1L,
}

impl SolverKind {
    /// Names of all solvers
    pub const AVAILABLE: [&'static str; 4] = [Lorenz::NAME, NS2D::NAME, NS2DStrat::NAME, SW1L::NAME];
}

impl FromStr for SolverKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            Lorenz::NAME => Ok(Self::Lorenz),
            NS2D::NAME => Ok(Self::NS2D),
            NS2DStrat::NAME => Ok(Self::NS2DStrat),
            SW1L::NAME => Ok(Self::SW1L),
            _ => Err(Error::UnknownSolver {
                name: s.to_owned(),
                available: Self::AVAILABLE.join(", "),
            }),
        }
    }
}
