use fluidspec::io::{read_from_hdf5, read_from_hdf5_complex, read_scalar_from_hdf5};
use fluidspec::mpi::Comm;
use fluidspec::params::Params;
use fluidspec::simul::Simul;
use fluidspec::solvers::{Model, NS2DParams, NS2DStrat, NS2D};
use ndarray::{Array1, Array2, Ix1, Ix2};
use num_complex::Complex;
use std::path::Path;

fn params_saved(path_run: &Path) -> Params<NS2DParams> {
    let mut params = NS2D::create_default_params();
    params.oper.nx = 16;
    params.oper.ny = 16;
    params.init_fields.type_ = "dipole".to_owned();
    params.time_stepping.use_cfl = false;
    params.time_stepping.deltat0 = 0.05;
    params.time_stepping.t_end = 0.2;
    params.output.has_to_save = true;
    params.output.path_run = Some(path_run.to_string_lossy().into_owned());
    params.output.periods_print.print_stdout = 0.;
    params.output.periods_save.phys_fields = 0.1;
    params.output.periods_save.spatial_means = 0.05;
    params.output.periods_save.spectra = 0.2;
    params
}

#[test]
fn test_output_files() {
    let dir = tempfile::tempdir().unwrap();
    let path_run = dir.path().join("run");
    let mut sim = Simul::<NS2D>::new(params_saved(&path_run), Comm::serial()).unwrap();
    assert_eq!(sim.output.path_run(), Some(path_run.as_path()));
    sim.start().unwrap();

    // parameters
    let params = Params::<NS2DParams>::from_json_file(path_run.join("params.json")).unwrap();
    assert_eq!(params.solver, "ns2d");
    assert_eq!(params.oper.nx, 16);

    // spatial means: t = 0, 0.05, ..., 0.2
    let text = std::fs::read_to_string(path_run.join("spatial_means.txt")).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("# t energy enstrophy"));
    let rows: Vec<Vec<f64>> = lines
        .map(|l| l.split_whitespace().map(|x| x.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0][0], 0.);
    assert!(rows.iter().all(|r| r.len() == 3 && r[1] > 0. && r[2] > 0.));

    // snapshots at t = 0, 0.1, 0.2
    for name in ["state_phys_t000.000.h5", "state_phys_t000.100.h5", "state_phys_t000.200.h5"] {
        assert!(path_run.join(name).exists(), "{} missing", name);
    }
    let last = path_run.join("state_phys_t000.200.h5");
    let t: f64 = read_scalar_from_hdf5(&last, "t").unwrap();
    let it: u64 = read_scalar_from_hdf5(&last, "it").unwrap();
    assert!((t - 0.2).abs() < 1e-12);
    assert_eq!(it, 4);
    let rot_fft: Array2<Complex<f64>> = read_from_hdf5_complex::<f64, Ix2, _>(&last, "rot_fft").unwrap();
    assert_eq!(&rot_fft, sim.state.state_spect().get_var("rot_fft").unwrap());
    let rot: Array2<f64> = read_from_hdf5::<f64, Ix2, _>(&last, "rot").unwrap();
    assert_eq!(rot.shape(), &[16, 16]);

    // spectra at t = 0 and 0.2
    let spectra = path_run.join("spectra_t000.200.h5");
    let kh: Array1<f64> = read_from_hdf5::<f64, Ix1, _>(&spectra, "kh").unwrap();
    let spectrum: Array1<f64> = read_from_hdf5::<f64, Ix1, _>(&spectra, "spectrum2d_E").unwrap();
    assert_eq!(kh.len(), spectrum.len());
    assert!(path_run.join("spectra_t000.000.h5").exists());
}

#[test]
fn test_spatial_means_with_energy_parts() {
    let dir = tempfile::tempdir().unwrap();
    let path_run = dir.path().join("run");
    let mut params = NS2DStrat::create_default_params();
    params.oper.nx = 16;
    params.oper.ny = 16;
    params.physics.n = 2.;
    params.init_fields.type_ = "dipole".to_owned();
    params.time_stepping.use_cfl = false;
    params.time_stepping.deltat0 = 0.05;
    params.time_stepping.t_end = 0.2;
    params.output.has_to_save = true;
    params.output.path_run = Some(path_run.to_string_lossy().into_owned());
    params.output.periods_print.print_stdout = 0.05;
    params.output.periods_save.spatial_means = 0.05;
    let mut sim = Simul::<NS2DStrat>::new(params, Comm::serial()).unwrap();
    sim.start().unwrap();

    let text = std::fs::read_to_string(path_run.join("spatial_means.txt")).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("# t energy enstrophy energyK energyA"));
    let rows: Vec<Vec<f64>> = lines
        .map(|l| l.split_whitespace().map(|x| x.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows.len(), 5);
    for row in &rows {
        assert_eq!(row.len(), 5);
        let (energy, energy_k, energy_a) = (row[1], row[3], row[4]);
        assert!(energy_k > 0. && energy_a >= 0.);
        assert!((energy_k + energy_a - energy).abs() < 1e-10 * energy);
    }
    // the dipole starts without buoyancy
    assert_eq!(rows[0][4], 0.);
    assert!(rows[4][4] > 0.);
}

#[test]
fn test_restart_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path_run = dir.path().join("run");
    let mut sim = Simul::<NS2D>::new(params_saved(&path_run), Comm::serial()).unwrap();
    sim.start().unwrap();

    let mut params = NS2D::create_default_params();
    params.oper.nx = 16;
    params.oper.ny = 16;
    params.init_fields.type_ = "from_file".to_owned();
    params.init_fields.from_file = path_run
        .join("state_phys_t000.200.h5")
        .to_string_lossy()
        .into_owned();
    let restart = Simul::<NS2D>::new(params, Comm::serial()).unwrap();
    assert_eq!(restart.state.state_spect(), sim.state.state_spect());
}

#[test]
fn test_nothing_saved_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path_run = dir.path().join("run");
    let mut params = params_saved(&path_run);
    params.output.has_to_save = false;
    let mut sim = Simul::<NS2D>::new(params, Comm::serial()).unwrap();
    sim.start().unwrap();
    assert!(sim.output.path_run().is_none());
    assert!(!path_run.exists());
}
