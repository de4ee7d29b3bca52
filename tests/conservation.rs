//! Quadratic invariants of the nonlinear terms, evaluated on dealiased
//! random states
use fluidspec::mpi::Comm;
use fluidspec::operators::{ArrayK, Operators2D};
use fluidspec::simul::Simul;
use fluidspec::solvers::{Model, NS2DStrat, Solver, NS2D, SW1L};
use ndarray::Zip;

/// `sum(w(k^2) Re(conj(a) b))` over all wavenumbers
fn sum_k(oper: &Operators2D, a: &ArrayK, b: &ArrayK, weight: impl Fn(f64) -> f64) -> f64 {
    let prod = Zip::from(a)
        .and(b)
        .and(&oper.kk_not0)
        .map_collect(|a, b, &kk| weight(kk) * (a.conj() * b).re);
    oper.sum_wavenumbers(&prod).unwrap()
}

#[test]
fn test_ns2d_energy_and_enstrophy() {
    let mut params = NS2D::create_default_params();
    params.oper.nx = 32;
    params.oper.ny = 24;
    params.init_fields.type_ = "noise".to_owned();
    let sim = Simul::<NS2D>::new(params, Comm::serial()).unwrap();
    let tendencies = sim.tendencies_nonlin(None).unwrap();
    let rot_fft = sim.state.state_spect().get_var("rot_fft").unwrap();
    let f_fft = tendencies.get_var("rot_fft").unwrap();
    let oper = &sim.solver.oper;

    let enstrophy = sum_k(oper, rot_fft, rot_fft, |_| 1.);
    let d_enstrophy = sum_k(oper, rot_fft, f_fft, |_| 1.);
    let d_energy = sum_k(oper, rot_fft, f_fft, |kk| 1. / kk);
    assert!(enstrophy > 0.);
    assert!(d_enstrophy.abs() < 1e-10 * enstrophy);
    assert!(d_energy.abs() < 1e-10 * enstrophy);
}

#[test]
fn test_ns2d_strat_total_energy() {
    let mut params = NS2DStrat::create_default_params();
    params.oper.nx = 32;
    params.oper.ny = 32;
    params.init_fields.type_ = "noise".to_owned();
    let mut sim = Simul::<NS2DStrat>::new(params, Comm::serial()).unwrap();
    // add buoyancy to the noise vorticity
    let rot_fft = sim.state.state_spect().get_var("rot_fft").unwrap().clone();
    sim.state.state_spect_mut().set_var("b_fft", &rot_fft.mapv(|r| r * 0.3)).unwrap();

    let tendencies = sim.tendencies_nonlin(None).unwrap();
    let state = sim.state.state_spect();
    let oper = &sim.solver.oper;
    let n2 = sim.solver.physics.n.powi(2);
    let d_kinetic = sum_k(
        oper,
        state.get_var("rot_fft").unwrap(),
        tendencies.get_var("rot_fft").unwrap(),
        |kk| 1. / kk,
    );
    let d_potential = sum_k(
        oper,
        state.get_var("b_fft").unwrap(),
        tendencies.get_var("b_fft").unwrap(),
        |_| 1. / n2,
    );
    let energy = sim.solver.compute_energy(state).unwrap();
    assert!(energy > 0.);
    assert!((d_kinetic + d_potential).abs() < 1e-10 * energy);
}

#[test]
fn test_sw1l_mass() {
    let mut params = SW1L::create_default_params();
    params.oper.nx = 24;
    params.oper.ny = 24;
    params.init_fields.type_ = "noise".to_owned();
    let sim = Simul::<SW1L>::new(params, Comm::serial()).unwrap();
    let tendencies = sim.tendencies_nonlin(None).unwrap();
    let eta_fft = tendencies.get_var("eta_fft").unwrap();
    assert!(eta_fft[[0, 0]].norm() < 1e-14);
}
