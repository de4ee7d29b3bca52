//! # Lorenz system
//!
//! `dX/dt = sigma (Y - X)`, `dY/dt = rho X - Y - X Z`, `dZ/dt = X Y - beta Z`
//!
//! A 0D toy model, evolved with the same time stepping as the
//! pseudo-spectral models. By default the initial state is set by hand
//! (`init_fields.type = "manual"`).
//!
//! # Example
//! ```
//! use fluidspec::simul::Simul;
//! use fluidspec::solvers::{Lorenz, Model};
//! use ndarray::arr0;
//!
//! let mut params = Lorenz::create_default_params();
//! params.time_stepping.t_end = 1.;
//! params.output.periods_print.print_stdout = 0.;
//! let mut sim = Simul::<Lorenz>::new(params, Default::default()).unwrap();
//! let [x0, y0, z0] = sim.solver.fixed_points()[0];
//! for (key, value) in [("X", x0 + 2.), ("Y", y0), ("Z", z0)] {
//!     sim.state.state_spect_mut().set_var(key, &arr0(value)).unwrap();
//! }
//! sim.start().unwrap();
//! assert_eq!(sim.time_stepping.it, 50);
//! ```
use super::{Model, Solver, StatePhys, StateSpect};
use crate::error::{Error, Result};
use crate::forcing::ForcingNoise;
use crate::init_fields::InitFieldsKind;
use crate::io::write_scalar_to_hdf5;
use crate::mpi::Comm;
use crate::params::{ForcingParams, InitFieldsParams, Params};
use crate::setofvariables::SetOfVariables;
use ndarray::{arr0, Array0, Ix0};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of the Lorenz system
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LorenzParams {
    /// Prandtl number
    pub sigma: f64,
    /// Geometric factor
    pub beta: f64,
    /// Rayleigh number
    pub rho: f64,
}

impl Default for LorenzParams {
    fn default() -> Self {
        Self {
            sigma: 10.,
            beta: 8. / 3.,
            rho: 28.,
        }
    }
}

/// Lorenz solver
pub struct Lorenz<'a> {
    /// Model parameters
    pub physics: LorenzParams,
    comm: Comm<'a>,
}

impl Lorenz<'_> {
    /// The two non-trivial fixed points `[X, Y, Z]`
    pub fn fixed_points(&self) -> [[f64; 3]; 2] {
        let LorenzParams { beta, rho, .. } = self.physics;
        let z = rho - 1.;
        let x = (beta * z).max(0.).sqrt();
        [[x, x, z], [-x, -x, z]]
    }
}

impl Model for Lorenz<'_> {
    type Elem = f64;
    type Dim = Ix0;
    type Physics = LorenzParams;

    const NAME: &'static str = "lorenz";
    const KEYS_STATE_SPECT: &'static [&'static str] = &["X", "Y", "Z"];
    const KEYS_STATE_PHYS: &'static [&'static str] = &["X", "Y", "Z"];

    fn complete_params(params: &mut Params<LorenzParams>) {
        params.time_stepping.deltat0 = 0.02;
        params.time_stepping.t_end = 20.;
        params.time_stepping.use_cfl = false;
        params.init_fields.type_ = "manual".to_owned();
    }
}

impl<'a> Solver<'a> for Lorenz<'a> {
    type Forcing = ForcingNoise<Ix0>;

    fn new(params: &Params<LorenzParams>, comm: Comm<'a>) -> Result<Self> {
        let p = &params.physics;
        log::info!(
            "{}: sigma = {}, beta = {:.4}, rho = {}",
            Self::NAME,
            p.sigma,
            p.beta,
            p.rho
        );
        Ok(Self {
            physics: p.clone(),
            comm,
        })
    }

    fn comm(&self) -> &Comm<'a> {
        &self.comm
    }

    fn zeros_state_spect(&self) -> StateSpect<Self> {
        SetOfVariables::zeros(Self::KEYS_STATE_SPECT, Ix0())
    }

    fn zeros_state_phys(&self) -> StatePhys<Self> {
        SetOfVariables::zeros(Self::KEYS_STATE_PHYS, Ix0())
    }

    fn state_phys_from_state_spect(&self, state_spect: &StateSpect<Self>) -> Result<StatePhys<Self>> {
        Ok(state_spect.clone())
    }

    fn tendencies_nonlin(
        &self,
        state_spect: &StateSpect<Self>,
        forcing: Option<&StateSpect<Self>>,
    ) -> Result<StateSpect<Self>> {
        let LorenzParams { sigma, beta, rho } = self.physics;
        let x = state_spect.get_var("X")?[()];
        let y = state_spect.get_var("Y")?[()];
        let z = state_spect.get_var("Z")?[()];
        let vars = vec![
            arr0(sigma * (y - x)),
            arr0(rho * x - y - x * z),
            arr0(x * y - beta * z),
        ];
        let mut tendencies = SetOfVariables::from_arrays(Self::KEYS_STATE_SPECT, vars)?;
        if let Some(forcing) = forcing {
            tendencies.axpy(1., forcing)?;
        }
        Ok(tendencies)
    }

    fn freq_lin(&self) -> Array0<f64> {
        arr0(0.)
    }

    fn compute_energy(&self, state_spect: &StateSpect<Self>) -> Result<f64> {
        Ok(0.5 * state_spect.iter().map(|(_, v)| v[()] * v[()]).sum::<f64>())
    }

    fn init_fields(&self, params: &InitFieldsParams, state_spect: &mut StateSpect<Self>) -> Result<()> {
        match InitFieldsKind::parse_among(&params.type_, &InitFieldsKind::AVAILABLE_0D)? {
            InitFieldsKind::Constant => {
                for v in state_spect.vars_mut() {
                    v.fill(params.constant);
                }
            }
            InitFieldsKind::Manual => (),
            _ => {
                return Err(Error::UnknownInitFields {
                    name: params.type_.clone(),
                    available: InitFieldsKind::AVAILABLE_0D.join(", "),
                })
            }
        }
        Ok(())
    }

    fn create_forcing(&self, params: &ForcingParams) -> Result<ForcingNoise<Ix0>> {
        ForcingNoise::new(params, Self::KEYS_STATE_SPECT, Ix0(), &self.comm)
    }

    fn save_state(&self, state_spect: &StateSpect<Self>, _state_phys: &StatePhys<Self>, filename: &Path) -> Result<()> {
        if self.is_root() {
            for (key, v) in state_spect.iter() {
                write_scalar_to_hdf5(filename, key, v[()])?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn state(solver: &Lorenz, x: f64, y: f64, z: f64) -> StateSpect<Lorenz<'static>> {
        let mut state = solver.zeros_state_spect();
        for (key, value) in [("X", x), ("Y", y), ("Z", z)] {
            state.set_var(key, &arr0(value)).unwrap();
        }
        state
    }

    #[test]
    fn test_fixed_points_are_stationary() {
        let solver = Lorenz::new(&Lorenz::create_default_params(), Comm::serial()).unwrap();
        let [xs, ys, zs] = solver.fixed_points()[1];
        assert_relative_eq!(zs, 27.);
        assert_relative_eq!(xs, -(8f64 / 3. * 27.).sqrt());
        let tendencies = solver.tendencies_nonlin(&state(&solver, xs, ys, zs), None).unwrap();
        for (_, v) in tendencies.iter() {
            assert!(v[()].abs() < 1e-12);
        }
    }

    #[test]
    fn test_tendencies() {
        let solver = Lorenz::new(&Lorenz::create_default_params(), Comm::serial()).unwrap();
        let tendencies = solver.tendencies_nonlin(&state(&solver, 1., 2., 3.), None).unwrap();
        assert_relative_eq!(tendencies.get_var("X").unwrap()[()], 10.);
        assert_relative_eq!(tendencies.get_var("Y").unwrap()[()], 28. - 2. - 3.);
        assert_relative_eq!(tendencies.get_var("Z").unwrap()[()], 2. - 8.);
    }

    #[test]
    fn test_default_params() {
        let params = Lorenz::create_default_params();
        assert_eq!(params.time_stepping.deltat0, 0.02);
        assert!(!params.time_stepping.use_cfl);
        assert_eq!(params.init_fields.type_, "manual");
    }

    #[test]
    fn test_init_fields() {
        let solver = Lorenz::new(&Lorenz::create_default_params(), Comm::serial()).unwrap();
        let mut s = solver.zeros_state_spect();
        let params = InitFieldsParams {
            constant: 2.,
            ..InitFieldsParams::default()
        };
        solver.init_fields(&params, &mut s).unwrap();
        assert_relative_eq!(solver.compute_energy(&s).unwrap(), 6.);
        let params = InitFieldsParams {
            type_: "noise".to_owned(),
            ..InitFieldsParams::default()
        };
        assert!(matches!(
            solver.init_fields(&params, &mut s),
            Err(Error::UnknownInitFields { .. })
        ));
    }
}
