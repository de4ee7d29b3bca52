//! # Output
//!
//! Called after every time step, each output acts when its period
//! (simulation time) has elapsed since it last acted, and always at the
//! first call:
//! - `print_stdout`: log line with `it`, `t`, `deltat`, the parts of the
//!   energy, the energy and its change
//! - `phys_fields`: hdf5 snapshot `state_phys_t<t>.h5` of the spectral
//!   and physical variables
//! - `spatial_means`: line `t energy enstrophy` followed by the parts of
//!   the energy (`energyK energyA` for `ns2d.strat` and `sw1l`) in
//!   `spatial_means.txt`
//! - `spectra`: hdf5 file `spectra_t<t>.h5` with the radial spectra
//!
//! Files are written to the run directory and only if
//! `params.output.has_to_save`, by the root worker. The parameters are
//! saved next to them as `params.json`. All workers compute the
//! collective quantities.
use crate::error::Result;
use crate::io::write_to_hdf5;
use crate::params::{OutputParams, Params};
use crate::solvers::{save_time, Solver};
use crate::state::State;
use crate::time_stepping::TimeStepping;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Relative tolerance of the periods
const PERIOD_TOLERANCE: f64 = 1e-6;

/// Name of the parameter file in the run directory
pub const PARAMS_FILE: &str = "params.json";

/// Name of the spatial means file in the run directory
pub const SPATIAL_MEANS_FILE: &str = "spatial_means.txt";

/// Periodic trigger in simulation time
#[derive(Clone, Debug)]
struct Period {
    period: f64,
    t_last: Option<f64>,
}

impl Period {
    fn new(period: f64) -> Self {
        Self {
            period,
            t_last: None,
        }
    }

    fn is_active(&self) -> bool {
        self.period > 0.
    }

    /// True (and reset) if the period elapsed, or at the first call
    fn is_due(&mut self, t: f64) -> bool {
        if !self.is_active() {
            return false;
        }
        let due = self
            .t_last
            .map_or(true, |t_last| t - t_last >= self.period * (1. - PERIOD_TOLERANCE));
        if due {
            self.t_last = Some(t);
        }
        due
    }
}

/// Header of the spatial means file of a model with the energy parts `parts`
fn header_spatial_means(parts: &[&str]) -> String {
    let mut header = "# t energy enstrophy".to_owned();
    for name in parts {
        header.push(' ');
        header.push_str(name);
    }
    header
}

/// `", energyK = .., energyA = .."` of the print line
fn format_energy_parts(parts: &[&str], values: &[f64]) -> String {
    parts
        .iter()
        .zip(values)
        .map(|(name, value)| format!(", {} = {:.6e}", name, value))
        .collect()
}

/// Run directory `data/<solver>_<short_name_type_run>` unless set
pub fn default_path_run<P>(params: &Params<P>) -> PathBuf {
    let name = if params.short_name_type_run.is_empty() {
        params.solver.clone()
    } else {
        format!("{}_{}", params.solver, params.short_name_type_run)
    };
    Path::new("data").join(name)
}

/// Print and save hooks of a simulation
pub struct Output {
    path_run: Option<PathBuf>,
    is_root: bool,
    print_stdout: Period,
    phys_fields: Period,
    spatial_means: Period,
    spectra: Period,
    energy_last_print: Option<f64>,
    file_spatial_means: Option<BufWriter<File>>,
}

impl Output {
    /// Prepare the run directory (root worker) if files are saved
    ///
    /// # Errors
    /// Run directory or parameter file can not be written.
    pub fn new<'a, S: Solver<'a>>(params: &Params<S::Physics>, solver: &S) -> Result<Self> {
        let p: &OutputParams = &params.output;
        let is_root = solver.is_root();
        let path_run = if p.has_to_save {
            Some(
                p.path_run
                    .as_ref()
                    .map_or_else(|| default_path_run(params), PathBuf::from),
            )
        } else {
            None
        };

        let mut file_spatial_means = None;
        if let (Some(path_run), true) = (&path_run, is_root) {
            std::fs::create_dir_all(path_run)?;
            params.save_json(path_run.join(PARAMS_FILE))?;
            if p.periods_save.spatial_means > 0. {
                let mut file = BufWriter::new(File::create(path_run.join(SPATIAL_MEANS_FILE))?);
                writeln!(file, "{}", header_spatial_means(S::ENERGY_PARTS))?;
                file_spatial_means = Some(file);
            }
            log::info!("path_run: {}", path_run.display());
        }

        let save_period = |period: f64| {
            if path_run.is_some() {
                Period::new(period)
            } else {
                Period::new(0.)
            }
        };
        Ok(Self {
            is_root,
            print_stdout: Period::new(p.periods_print.print_stdout),
            phys_fields: save_period(p.periods_save.phys_fields),
            spatial_means: save_period(p.periods_save.spatial_means),
            spectra: save_period(p.periods_save.spectra),
            path_run,
            energy_last_print: None,
            file_spatial_means,
        })
    }

    /// Run directory, `None` if nothing is saved
    pub fn path_run(&self) -> Option<&Path> {
        self.path_run.as_deref()
    }

    /// Run the outputs whose period elapsed. Collective.
    ///
    /// # Errors
    /// Files can not be written, or the state does not conform to the solver.
    pub fn on_step<'a, S: Solver<'a>>(
        &mut self,
        solver: &S,
        state: &mut State<S::Elem, S::Dim>,
        time_stepping: &TimeStepping<S::Dim>,
    ) -> Result<()> {
        let (t, it) = (time_stepping.t, time_stepping.it);

        if self.print_stdout.is_due(t) {
            let energy = solver.compute_energy(state.state_spect())?;
            let parts = solver.compute_energy_parts(state.state_spect())?;
            let delta_energy = self.energy_last_print.map_or(0., |e| energy - e);
            self.energy_last_print = Some(energy);
            if self.is_root {
                log::info!(
                    "it = {:7}, t = {:10.3}, deltat = {:10.4e}{}, energy = {:.6e}, dE = {:+.3e}",
                    it,
                    t,
                    time_stepping.deltat,
                    format_energy_parts(S::ENERGY_PARTS, &parts),
                    energy,
                    delta_energy
                );
            }
        }

        if self.spatial_means.is_due(t) {
            let energy = solver.compute_energy(state.state_spect())?;
            let enstrophy = solver.compute_enstrophy(state.state_spect())?;
            let parts = solver.compute_energy_parts(state.state_spect())?;
            if let Some(file) = self.file_spatial_means.as_mut() {
                write!(file, "{:.6e} {:.12e} {:.12e}", t, energy, enstrophy)?;
                for part in &parts {
                    write!(file, " {:.12e}", part)?;
                }
                writeln!(file)?;
                file.flush()?;
            }
        }

        if let Some(path_run) = &self.path_run {
            if self.phys_fields.is_due(t) {
                let filename = path_run.join(format!("state_phys_t{:07.3}.h5", t));
                state.state_phys_with(|s| solver.state_phys_from_state_spect(s))?;
                solver.save_state(state.state_spect(), state.state_phys_cached(), &filename)?;
                if self.is_root {
                    save_time(&filename, t, it)?;
                    log::debug!("saved {}", filename.display());
                }
            }

            if self.spectra.is_due(t) {
                if let Some((kh, spectra)) = solver.compute_spectra(state.state_spect())? {
                    if self.is_root {
                        let filename = path_run.join(format!("spectra_t{:07.3}.h5", t));
                        write_to_hdf5(&filename, "kh", &kh)?;
                        for (name, spectrum) in &spectra {
                            write_to_hdf5(&filename, name, spectrum)?;
                        }
                        save_time(&filename, t, it)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Final log line
    ///
    /// # Errors
    /// State does not conform to the solver.
    pub fn end<'a, S: Solver<'a>>(&mut self, solver: &S, state: &State<S::Elem, S::Dim>, time_stepping: &TimeStepping<S::Dim>) -> Result<()> {
        let energy = solver.compute_energy(state.state_spect())?;
        if let Some(file) = self.file_spatial_means.as_mut() {
            file.flush()?;
        }
        if self.is_root {
            log::info!(
                "end of simulation: it = {}, t = {:.4}, energy = {:.6e}",
                time_stepping.it,
                time_stepping.t,
                energy
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_period() {
        let mut period = Period::new(0.5);
        assert!(period.is_due(0.));
        assert!(!period.is_due(0.2));
        assert!(period.is_due(0.5 - 1e-9));
        assert!(!period.is_due(0.7));
        assert!(period.is_due(1.1));
        let mut never = Period::new(0.);
        assert!(!never.is_due(0.));
        assert!(!never.is_due(10.));
    }

    #[test]
    fn test_energy_parts_columns() {
        assert_eq!(header_spatial_means(&[]), "# t energy enstrophy");
        assert_eq!(
            header_spatial_means(&["energyK", "energyA"]),
            "# t energy enstrophy energyK energyA"
        );
        assert_eq!(
            format_energy_parts(&["energyK", "energyA"], &[1.5, 0.25]),
            ", energyK = 1.500000e0, energyA = 2.500000e-1"
        );
        assert_eq!(format_energy_parts(&[], &[]), "");
    }

    #[test]
    fn test_default_path_run() {
        let mut params = Params::<()>::default();
        params.solver = "ns2d".to_owned();
        assert_eq!(default_path_run(&params), Path::new("data/ns2d"));
        params.short_name_type_run = "forced".to_owned();
        assert_eq!(default_path_run(&params), Path::new("data/ns2d_forced"));
    }
}
