//! Run a simulation:
//!
//! cargo run --release -- <solver> [params.json]
//!
//! `solver` is one of `lorenz`, `ns2d`, `ns2d.strat`, `sw1l`. Without a
//! parameter file the defaults of the solver are used. Set the log level
//! with `RUST_LOG` (default `info`).
//!
//! Distributed run (feature `mpi`):
//!
//! cargo mpirun --np 2 --features mpi --bin fluidspec --release -- ns2d params.json
use fluidspec::mpi::Comm;
use fluidspec::params::Params;
use fluidspec::simul::Simul;
use fluidspec::solvers::{Lorenz, NS2DStrat, Solver, SolverKind, NS2D, SW1L};
use fluidspec::Result;

fn run<'a, S: Solver<'a>>(params_file: Option<&str>, comm: Comm<'a>) -> Result<()> {
    let params = match params_file {
        Some(path) => {
            log::info!("read parameters from {}", path);
            let mut params = Params::<S::Physics>::from_json_file(path)?;
            if params.solver.is_empty() {
                params.solver = S::NAME.to_owned();
            }
            params
        }
        None => S::create_default_params(),
    };
    let mut sim = Simul::<S>::new(params, comm)?;
    sim.start()
}

#[cfg(feature = "mpi")]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match fluidspec::mpi::initialize() {
        Some(universe) => main_with(Comm::mpi(&universe)),
        None => {
            log::error!("mpi initialization failed");
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "mpi"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    main_with(Comm::serial());
}

fn main_with(comm: Comm) {
    let args: Vec<String> = std::env::args().collect();
    let name = args.get(1).map_or("ns2d", String::as_str);
    let params_file = args.get(2).map(String::as_str);

    let result = name.parse::<SolverKind>().and_then(|kind| match kind {
        SolverKind::Lorenz => run::<Lorenz>(params_file, comm),
        SolverKind::NS2D => run::<NS2D>(params_file, comm),
        SolverKind::NS2DStrat => run::<NS2DStrat>(params_file, comm),
        SolverKind::SW1L => run::<SW1L>(params_file, comm),
    });
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
