//! Run example:
//!
//! cargo run --release --example sw1l_waves
//!
//! Rotating shallow water, gravity waves excited by the forcing of
//! the surface displacement
use fluidspec::simul::Simul;
use fluidspec::solvers::{Model, SW1L};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parameters
    let mut params = SW1L::create_default_params();
    params.short_name_type_run = "waves".to_owned();
    params.oper.nx = 96;
    params.oper.ny = 96;
    params.physics.f = 1.;
    params.physics.c2 = 10.;
    params.physics.nu_8 = 1e-10;
    params.init_fields.type_ = "constant".to_owned();
    params.forcing_enabled = true;
    params.forcing.type_ = "waves".to_owned();
    params.forcing.forcing_rate = 0.1;
    params.forcing.seed = Some(7);
    params.time_stepping.t_end = 10.;
    params.output.has_to_save = true;
    params.output.periods_save.spatial_means = 0.2;
    params.output.periods_save.spectra = 2.;

    let mut sim = Simul::<SW1L>::new(params, Default::default()).unwrap();
    sim.start().unwrap();
}
