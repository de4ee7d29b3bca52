//! Run example:
//!
//! cargo run --release --example lorenz
//!
//! Lorenz attractor, started close to one of the unstable fixed points
use fluidspec::simul::Simul;
use fluidspec::solvers::{Lorenz, Model};
use ndarray::arr0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parameters
    let mut params = Lorenz::create_default_params();
    params.time_stepping.t_end = 20.;
    params.output.periods_print.print_stdout = 1.;
    params.output.has_to_save = true;
    params.output.periods_save.spatial_means = 0.1;

    let mut sim = Simul::<Lorenz>::new(params, Default::default()).unwrap();
    // Set initial conditions
    let [x0, y0, z0] = sim.solver.fixed_points()[0];
    for (key, value) in [("X", x0 + 2.), ("Y", y0), ("Z", z0)] {
        sim.state.state_spect_mut().set_var(key, &arr0(value)).unwrap();
    }
    sim.start().unwrap();

    let state = sim.state.state_spect();
    println!(
        "t = {:.2}: X = {:.4}, Y = {:.4}, Z = {:.4}",
        sim.time_stepping.t,
        state.get_var("X").unwrap()[()],
        state.get_var("Y").unwrap()[()],
        state.get_var("Z").unwrap()[()]
    );
}
