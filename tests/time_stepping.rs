use fluidspec::error::Error;
use fluidspec::mpi::Comm;
use fluidspec::params::Params;
use fluidspec::simul::Simul;
use fluidspec::solvers::{Lorenz, Model, NS2DParams, NS2D};
use fluidspec::time_stepping::Status;
use fluidspec::Integrate;
use ndarray::arr0;
use num_complex::Complex;

fn params_ns2d() -> Params<NS2DParams> {
    let mut params = NS2D::create_default_params();
    params.oper.nx = 16;
    params.oper.ny = 16;
    params.init_fields.type_ = "noise".to_owned();
    params.time_stepping.use_cfl = false;
    params.time_stepping.deltat0 = 0.1;
    params.time_stepping.t_end = 0.5;
    params.output.periods_print.print_stdout = 0.;
    params
}

#[test]
fn test_t_end_binds() {
    for scheme in ["RK4", "RK2"] {
        let mut params = params_ns2d();
        params.time_stepping.type_time_scheme = scheme.to_owned();
        let mut sim = Simul::<NS2D>::new(params, Comm::serial()).unwrap();
        sim.start().unwrap();
        assert_eq!(sim.time_stepping.it, 5);
        assert!((sim.time_stepping.t - 0.5).abs() < 1e-12);
        assert_eq!(sim.time_stepping.status, Status::Finished);
    }
}

#[test]
fn test_it_end_binds() {
    let mut params = params_ns2d();
    params.time_stepping.use_t_end = false;
    params.time_stepping.it_end = 7;
    let mut sim = Simul::<NS2D>::new(params, Comm::serial()).unwrap();
    sim.start().unwrap();
    assert_eq!(sim.time_stepping.it, 7);
    assert!(sim.time_stepping.t > 0.5);
}

#[test]
fn test_cfl_adapts_time_step() {
    let mut params = params_ns2d();
    params.time_stepping.use_cfl = true;
    params.time_stepping.deltat_max = 10.;
    params.init_fields.noise.velo_max = 50.;
    params.time_stepping.it_end = 1;
    params.time_stepping.use_t_end = false;
    let mut sim = Simul::<NS2D>::new(params, Comm::serial()).unwrap();
    sim.start().unwrap();
    // |u| = 50 on a grid of spacing 0.5
    assert!(sim.time_stepping.deltat < 0.1);
    assert!(sim.get_dt() > 0.);
}

#[test]
fn test_nan_stops_stepping() {
    let mut sim = Simul::<NS2D>::new(params_ns2d(), Comm::serial()).unwrap();
    sim.state.state_spect_mut().get_var_mut("rot_fft").unwrap()[[1, 1]] = Complex::new(f64::NAN, 0.);
    match sim.start() {
        Err(Error::NumericalDivergence { t, it }) => {
            assert_eq!(it, 0);
            assert_eq!(t, 0.);
        }
        other => panic!("expected numerical divergence, got {:?}", other.err()),
    }
    assert_eq!(sim.time_stepping.status, Status::Finished);
    assert!(sim.exit());
}

#[test]
fn test_unknown_time_scheme() {
    let mut params = params_ns2d();
    params.time_stepping.type_time_scheme = "RK3".to_owned();
    assert!(matches!(
        Simul::<NS2D>::new(params, Comm::serial()),
        Err(Error::UnknownTimeScheme(_))
    ));
}

#[test]
fn test_lorenz_end_to_end() {
    let params = Lorenz::create_default_params();
    let mut sim = Simul::<Lorenz>::new(params, Comm::serial()).unwrap();
    let [xs, ys, zs] = sim.solver.fixed_points()[0];
    for (key, value) in [("X", xs + 2.), ("Y", ys), ("Z", zs)] {
        sim.state.state_spect_mut().set_var(key, &arr0(value)).unwrap();
    }

    let distance = |sim: &Simul<Lorenz>| {
        let s = sim.state.state_spect();
        let x = s.get_var("X").unwrap()[()];
        let y = s.get_var("Y").unwrap()[()];
        let z = s.get_var("Z").unwrap()[()];
        ((x - xs).powi(2) + (y - ys).powi(2) + (z - zs).powi(2)).sqrt()
    };
    let mut max_first_half: f64 = 0.;
    let mut max_all: f64 = 0.;
    while !sim.exit() {
        sim.update().unwrap();
        let d = distance(&sim);
        if sim.get_time() <= 10. {
            max_first_half = max_first_half.max(d);
        }
        max_all = max_all.max(d);
        for (_, v) in sim.state.state_spect().iter() {
            assert!(v[()].abs() < 60.);
        }
    }
    assert_eq!(sim.time_stepping.it, 1000);
    assert!(max_first_half > 2.5);
    assert!(max_all > 8.);
}
