//! # Simulation
//!
//! [`Simul`] wires one solver, its state, the optional forcing, the time
//! stepping and the output from one set of parameters.
//!
//! # Example
//! Forced 2D turbulence
//! ```no_run
//! use fluidspec::simul::Simul;
//! use fluidspec::solvers::{Model, NS2D};
//!
//! let mut params = NS2D::create_default_params();
//! params.short_name_type_run = "forced".to_owned();
//! params.physics.nu_8 = 1e-8;
//! params.forcing_enabled = true;
//! params.forcing.type_ = "random".to_owned();
//! params.forcing.seed = Some(1);
//! params.output.has_to_save = true;
//! params.output.periods_save.spatial_means = 0.1;
//! let mut sim = Simul::<NS2D>::new(params, Default::default()).unwrap();
//! sim.start().unwrap();
//! ```
use crate::error::{Error, Result};
use crate::forcing::Forcing;
use crate::mpi::Comm;
use crate::output::Output;
use crate::params::Params;
use crate::solvers::{Solver, StatePhys, StateSpect};
use crate::state::State;
use crate::time_stepping::{Status, TimeStepping};
use crate::{integrate, Integrate};
use std::sync::Arc;

/// Simulation of the model `S` on the workers of a communicator
pub struct Simul<'a, S: Solver<'a>> {
    /// Parameters (frozen)
    pub params: Arc<Params<S::Physics>>,
    /// Model
    pub solver: S,
    /// Evolved and physical variables
    pub state: State<S::Elem, S::Dim>,
    /// Forcing, `None` if `forcing_enabled` is false
    pub forcing: Option<S::Forcing>,
    /// Time, time step and status
    pub time_stepping: TimeStepping<S::Dim>,
    /// Print and save hooks
    pub output: Output,
}

impl<'a, S: Solver<'a>> Simul<'a, S> {
    /// Build and initialize a simulation
    ///
    /// # Errors
    /// Invalid parameters, unknown solver, forcing, initialization or
    /// time scheme, or an output directory which can not be written.
    pub fn new(params: Params<S::Physics>, comm: Comm<'a>) -> Result<Self> {
        params.validate()?;
        if !params.solver.is_empty() && params.solver != S::NAME {
            return Err(Error::Config(format!(
                "parameters of solver {:?} used with solver {:?}",
                params.solver,
                S::NAME
            )));
        }
        let params = Arc::new(params);

        let solver = S::new(&params, comm)?;
        let forcing = if params.forcing_enabled {
            Some(solver.create_forcing(&params.forcing)?)
        } else {
            None
        };
        let time_stepping = TimeStepping::new(&params.time_stepping, solver.freq_lin())?;

        let mut state_spect = solver.zeros_state_spect();
        solver.init_fields(&params.init_fields, &mut state_spect)?;
        let state = State::new(state_spect, solver.zeros_state_phys());

        let output = Output::new::<S>(&params, &solver)?;
        Ok(Self {
            params,
            solver,
            state,
            forcing,
            time_stepping,
            output,
        })
    }

    /// Run the time stepping until a termination condition holds
    ///
    /// # Errors
    /// Numerical divergence, tendency or output errors. The status is
    /// `Finished` in every case.
    pub fn start(&mut self) -> Result<()> {
        log::info!(
            "start {}: t = {}, it = {}",
            S::NAME,
            self.time_stepping.t,
            self.time_stepping.it
        );
        self.time_stepping.status = Status::Stepping;
        let result = self.callback().and_then(|_| integrate(self));
        self.time_stepping.status = Status::Finished;
        result?;
        self.output
            .end(&self.solver, &self.state, &self.time_stepping)
    }

    /// Nonlinear tendencies (forcing included) of `state_spect`,
    /// or of the current state if `None`
    ///
    /// # Errors
    /// State does not conform to the solver.
    pub fn tendencies_nonlin(&self, state_spect: Option<&StateSpect<S>>) -> Result<StateSpect<S>> {
        let state_spect = state_spect.unwrap_or_else(|| self.state.state_spect());
        let forcing = self.forcing.as_ref().map(|f| f.get_forcing());
        self.solver.tendencies_nonlin(state_spect, forcing)
    }

    /// Physical variables of the current state
    ///
    /// # Errors
    /// State does not conform to the solver.
    pub fn state_phys(&mut self) -> Result<&StatePhys<S>> {
        let solver = &self.solver;
        self.state
            .state_phys_with(|s| solver.state_phys_from_state_spect(s))
    }
}

impl<'a, S: Solver<'a>> Integrate for Simul<'a, S> {
    /// Advance one time step
    fn update(&mut self) -> Result<()> {
        let Self {
            params,
            solver,
            state,
            forcing,
            time_stepping,
            ..
        } = self;
        let solver = &*solver;

        let freq_cfl = if params.time_stepping.use_cfl {
            let state_phys = state.state_phys_with(|s| solver.state_phys_from_state_spect(s))?;
            solver.freq_cfl(state_phys)?
        } else {
            None
        };
        time_stepping.compute_deltat(freq_cfl);

        if let Some(forcing) = forcing.as_mut() {
            forcing.compute(state.state_spect(), time_stepping.deltat)?;
        }
        let forcing = forcing.as_ref().map(|f| f.get_forcing());
        let state_spect = state.state_spect_mut();
        time_stepping.step(state_spect, |s| solver.tendencies_nonlin(s, forcing))?;
        solver.dealiasing(state_spect)
    }

    fn get_time(&self) -> f64 {
        self.time_stepping.t
    }

    fn get_dt(&self) -> f64 {
        self.time_stepping.deltat
    }

    /// Outputs
    fn callback(&mut self) -> Result<()> {
        self.output
            .on_step(&self.solver, &mut self.state, &self.time_stepping)
    }

    fn exit(&mut self) -> bool {
        self.time_stepping.is_finished()
    }
}
