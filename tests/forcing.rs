use fluidspec::error::Error;
use fluidspec::forcing::Forcing;
use fluidspec::mpi::Comm;
use fluidspec::params::Params;
use fluidspec::simul::Simul;
use fluidspec::solvers::{Lorenz, Model, NS2DParams, Solver, NS2D, SW1L};
use ndarray::Zip;

fn params_forced() -> Params<NS2DParams> {
    let mut params = NS2D::create_default_params();
    params.oper.nx = 24;
    params.oper.ny = 24;
    params.init_fields.type_ = "noise".to_owned();
    params.forcing_enabled = true;
    params.forcing.type_ = "random".to_owned();
    params.forcing.seed = Some(42);
    params.time_stepping.t_end = 0.3;
    params.time_stepping.use_cfl = false;
    params.time_stepping.deltat0 = 0.05;
    params.output.periods_print.print_stdout = 0.;
    params
}

#[test]
fn test_forcing_is_deterministic() {
    let mut sim1 = Simul::<NS2D>::new(params_forced(), Comm::serial()).unwrap();
    let mut sim2 = Simul::<NS2D>::new(params_forced(), Comm::serial()).unwrap();
    sim1.start().unwrap();
    sim2.start().unwrap();
    assert_eq!(sim1.state.state_spect(), sim2.state.state_spect());
    let f1 = sim1.forcing.as_ref().unwrap().get_forcing();
    let f2 = sim2.forcing.as_ref().unwrap().get_forcing();
    assert_eq!(f1, f2);
}

#[test]
fn test_forcing_band_and_rate() {
    let sim = Simul::<NS2D>::new(params_forced(), Comm::serial()).unwrap();
    let mut forcing = sim.solver.create_forcing(&sim.params.forcing).unwrap();
    let deltat = 0.05;
    forcing.compute(sim.state.state_spect(), deltat).unwrap();
    let f_fft = forcing.get_forcing().get_var("rot_fft").unwrap();
    let rot_fft = sim.state.state_spect().get_var("rot_fft").unwrap();

    // nonzero only in the band
    let oper = &sim.solver.oper;
    let (kmin, kmax) = (4. * oper.deltakh, 5. * oper.deltakh);
    Zip::from(f_fft).and(&oper.kk).for_each(|f, &kk| {
        let k = kk.sqrt();
        if k < kmin - 1e-12 || k > kmax + 1e-12 {
            assert_eq!(f.norm(), 0.);
        }
    });
    assert!(f_fft.iter().any(|f| f.norm() > 0.));

    // an Euler step injects energy at the forcing rate
    let rate = forcing.injection_rate(rot_fft, f_fft, deltat).unwrap();
    assert!((rate - 1.).abs() < 1e-9);
}

#[test]
fn test_unknown_forcing_type() {
    let mut params = params_forced();
    params.forcing.type_ = "tcrandom".to_owned();
    assert!(matches!(
        Simul::<NS2D>::new(params, Comm::serial()),
        Err(Error::UnknownForcingType { .. })
    ));

    // 0D models only provide the noise
    let mut params = Lorenz::create_default_params();
    params.forcing_enabled = true;
    params.forcing.type_ = "random".to_owned();
    assert!(matches!(
        Simul::<Lorenz>::new(params, Comm::serial()),
        Err(Error::UnknownForcingType { .. })
    ));
}

#[test]
fn test_disabled_forcing_is_not_built() {
    let mut params = params_forced();
    params.forcing_enabled = false;
    params.forcing.type_ = "tcrandom".to_owned();
    let sim = Simul::<NS2D>::new(params, Comm::serial()).unwrap();
    assert!(sim.forcing.is_none());
}

#[test]
fn test_waves_forcing_sw1l() {
    let mut params = SW1L::create_default_params();
    params.oper.nx = 24;
    params.oper.ny = 24;
    params.forcing_enabled = true;
    params.forcing.type_ = "waves".to_owned();
    params.forcing.seed = Some(3);
    params.time_stepping.t_end = 0.05;
    params.output.periods_print.print_stdout = 0.;
    let mut sim = Simul::<SW1L>::new(params, Comm::serial()).unwrap();
    sim.start().unwrap();
    let eta_fft = sim.state.state_spect().get_var("eta_fft").unwrap();
    assert!(eta_fft.iter().any(|e| e.norm() > 0.));
    assert!(sim.solver.compute_energy(sim.state.state_spect()).unwrap() > 0.);
}

#[test]
fn test_lorenz_noise_forcing() {
    let mut params = Lorenz::create_default_params();
    params.forcing_enabled = true;
    params.forcing.type_ = "noise".to_owned();
    params.forcing.seed = Some(9);
    params.time_stepping.t_end = 0.2;
    params.output.periods_print.print_stdout = 0.;
    let mut sim = Simul::<Lorenz>::new(params, Comm::serial()).unwrap();
    sim.start().unwrap();
    // the origin is a fixed point, only the noise moves the state
    assert!(sim.solver.compute_energy(sim.state.state_spect()).unwrap() > 0.);
}
