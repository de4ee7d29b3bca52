//! # `fluidspec`: Pseudo-spectral solvers for periodic flows
//!
//! # Dependencies
//! - cargo >= v1.56
//! - `hdf5` (sudo apt-get install -y libhdf5-dev)
//!
//! Distributed runs need the feature `mpi`, which additionally requires
//!
//! - mpi installation
//! - libclang
//!
//! # Details
//!
//! This library advances physical fields on a doubly periodic rectangle
//! in time. Spatial derivatives are computed with Fourier transforms
//! (`fourier_c2c` x `fourier_r2c`, see [`operators::Operators2D`]),
//! products in physical space (pseudo-spectral method) with 2/3
//! dealiasing. The time integration is an explicit Runge-Kutta scheme
//! with an integrating factor for the linear dissipation, see
//! [`time_stepping`].
//!
//! ## Implemented solver
//!
//! - `lorenz`: Lorenz system, see [`solvers::lorenz`]
//! - `ns2d`: 2-D Navier-Stokes (vorticity), see [`solvers::ns2d`]
//! - `ns2d.strat`: 2-D stratified Navier-Stokes (Boussinesq),
//! see [`solvers::ns2d_strat`]
//! - `sw1l`: one-layer shallow water, see [`solvers::sw1l`]
//!
//! Forcing schemes are listed in [`forcing`], initializations in
//! [`init_fields`].
//!
//! # Example
//! Solve forced 2-D turbulence ( Run with `cargo run --release --example ns2d_forced` )
//! ```no_run
//! use fluidspec::simul::Simul;
//! use fluidspec::solvers::{Model, NS2D};
//!
//! let mut params = NS2D::create_default_params();
//! params.oper.nx = 128;
//! params.oper.ny = 128;
//! params.physics.nu_8 = 1e-9;
//! params.forcing_enabled = true;
//! params.forcing.type_ = "random".to_owned();
//! params.time_stepping.t_end = 10.;
//! params.output.has_to_save = true;
//! params.output.periods_save.phys_fields = 1.;
//! let mut sim = Simul::<NS2D>::new(params, Default::default()).unwrap();
//! sim.start().unwrap();
//! ```
//!
//! ## Postprocess the output
//!
//! Outputs are written to `data/<solver>_<short_name_type_run>`:
//! `params.json`, `spatial_means.txt`, and the `hdf5` files
//! `state_phys_t*.h5` and `spectra_t*.h5`. Complex arrays are stored
//! as `<name>_re` and `<name>_im`.
//!
//! ## Documentation
//!
//! Download and run:
//!
//! `cargo doc --open`
#![warn(missing_docs)]
#![allow(clippy::unnecessary_cast)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate enum_dispatch;
pub mod bases;
pub mod error;
pub mod forcing;
pub mod init_fields;
pub mod io;
pub mod mpi;
pub mod operators;
pub mod output;
pub mod params;
pub mod setofvariables;
pub mod simul;
pub mod solvers;
pub mod state;
pub mod time_stepping;
pub mod types;
pub use error::{Error, Result};
use time_stepping::MAX_TIMESTEP;

/// Integrate trait, step forward in time, and write results
pub trait Integrate {
    /// Update solution
    ///
    /// # Errors
    /// Stepping failed, e.g. numerical divergence.
    fn update(&mut self) -> Result<()>;
    /// Receive current time
    fn get_time(&self) -> f64;
    /// Get timestep
    fn get_dt(&self) -> f64;
    /// Callback function (can be used for i/o)
    ///
    /// # Errors
    /// Output failed.
    fn callback(&mut self) -> Result<()>;
    /// Break criteria (end time, number of steps, ...)
    fn exit(&mut self) -> bool;
}

/// Integrate pde, that implements the Integrate trait.
///
/// The callback runs after every update.
///
/// Stop Criteria:
/// 1. `exit` of the pde
/// 2. Timestep limit
///
/// # Errors
/// First error of `update` or `callback`.
pub fn integrate<T: Integrate>(pde: &mut T) -> Result<()> {
    let mut timestep: usize = 0;
    loop {
        // Break
        if pde.exit() {
            log::info!("time limit reached: {:?}", pde.get_time());
            break;
        }
        if timestep >= MAX_TIMESTEP {
            log::info!("timestep limit reached: {:?}", timestep);
            break;
        }

        // Update
        pde.update()?;
        timestep += 1;

        // Save
        pde.callback()?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    struct Decay {
        value: f64,
        time: f64,
        dt: f64,
        calls: usize,
    }

    impl Integrate for Decay {
        fn update(&mut self) -> Result<()> {
            self.value -= self.dt * self.value;
            self.time += self.dt;
            Ok(())
        }

        fn get_time(&self) -> f64 {
            self.time
        }

        fn get_dt(&self) -> f64 {
            self.dt
        }

        fn callback(&mut self) -> Result<()> {
            self.calls += 1;
            Ok(())
        }

        fn exit(&mut self) -> bool {
            self.time + self.dt * 1e-4 >= 1.
        }
    }

    #[test]
    fn test_integrate() {
        let mut pde = Decay {
            value: 1.,
            time: 0.,
            dt: 0.25,
            calls: 0,
        };
        integrate(&mut pde).unwrap();
        assert_eq!(pde.calls, 4);
        assert!((pde.value - 0.75f64.powi(4)).abs() < 1e-14);
    }
}
