//! Run example:
//!
//! cargo run --release --example ns2d_forced
//!
//! Distributed:
//!
//! cargo mpirun --np 2 --features mpi --example ns2d_forced --release
//!
//! Forced 2-D turbulence with hyper-viscosity
use fluidspec::mpi::Comm;
use fluidspec::simul::Simul;
use fluidspec::solvers::{Model, NS2D};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    #[cfg(feature = "mpi")]
    let universe = fluidspec::mpi::initialize().unwrap();
    #[cfg(feature = "mpi")]
    let comm = Comm::mpi(&universe);
    #[cfg(not(feature = "mpi"))]
    let comm = Comm::serial();

    // Parameters
    let mut params = NS2D::create_default_params();
    params.short_name_type_run = "forced".to_owned();
    params.oper.nx = 128;
    params.oper.ny = 128;
    params.oper.lx = 2. * std::f64::consts::PI;
    params.oper.ly = 2. * std::f64::consts::PI;
    params.physics.nu_8 = 1e-14;
    params.physics.nu_m4 = 1e-2;
    params.init_fields.type_ = "noise".to_owned();
    params.init_fields.noise.velo_max = 0.1;
    params.forcing_enabled = true;
    params.forcing.type_ = "random".to_owned();
    params.forcing.forcing_rate = 1.;
    params.forcing.nkmin_forcing = 8.;
    params.forcing.nkmax_forcing = 10.;
    params.forcing.seed = Some(1);
    params.time_stepping.t_end = 20.;
    params.time_stepping.deltat_max = 0.05;
    params.output.has_to_save = true;
    params.output.periods_print.print_stdout = 0.5;
    params.output.periods_save.phys_fields = 5.;
    params.output.periods_save.spatial_means = 0.1;
    params.output.periods_save.spectra = 1.;

    let mut sim = Simul::<NS2D>::new(params, comm).unwrap();
    sim.start().unwrap();
}
