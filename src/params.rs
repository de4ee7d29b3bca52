//! # Parameters
//!
//! One [`Params`] value per simulation, created by
//! `Solver::create_default_params`, adjusted by the caller and then
//! frozen (shared as `Arc` by all components). Every struct
//! deserializes from json with missing entries set to their defaults.
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Parameters of a simulation with model parameters `P`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "P: Deserialize<'de> + Default"))]
pub struct Params<P> {
    /// Name of the solver (registry key)
    pub solver: String,
    /// Short name appended to the run directory
    pub short_name_type_run: String,
    /// Model parameters
    pub physics: P,
    /// Grid
    pub oper: OperParams,
    /// Time stepping
    pub time_stepping: TimeSteppingParams,
    /// Initialization
    pub init_fields: InitFieldsParams,
    /// Construct and apply the forcing
    pub forcing_enabled: bool,
    /// Forcing
    pub forcing: ForcingParams,
    /// Output
    pub output: OutputParams,
}

impl<P: Default> Default for Params<P> {
    fn default() -> Self {
        Self {
            solver: String::new(),
            short_name_type_run: String::new(),
            physics: P::default(),
            oper: OperParams::default(),
            time_stepping: TimeSteppingParams::default(),
            init_fields: InitFieldsParams::default(),
            forcing_enabled: false,
            forcing: ForcingParams::default(),
            output: OutputParams::default(),
        }
    }
}

impl<P> Params<P>
where
    P: Serialize + for<'de> Deserialize<'de> + Default,
{
    /// Read parameters from a json file
    ///
    /// # Errors
    /// File can not be read or is no valid parameter file.
    pub fn from_json_file<Q: AsRef<Path>>(path: Q) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write parameters to a json file
    ///
    /// # Errors
    /// File can not be written.
    pub fn save_json<Q: AsRef<Path>>(&self, path: Q) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

impl<P> Params<P> {
    /// Check consistency of the generic parameters
    ///
    /// # Errors
    /// `Error::Config` naming the first offending entry.
    pub fn validate(&self) -> Result<()> {
        self.oper.validate()?;
        self.time_stepping.validate()?;
        if self.forcing_enabled {
            self.forcing.validate()?;
        }
        if self.output.periods_print.print_stdout < 0. {
            return Err(config("output.periods_print.print_stdout must be >= 0"));
        }
        Ok(())
    }
}

fn config(msg: &str) -> Error {
    Error::Config(msg.to_owned())
}

/// Grid of the doubly periodic domain
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperParams {
    /// Grid points along x (axis 0)
    pub nx: usize,
    /// Grid points along y (axis 1)
    pub ny: usize,
    /// Domain length along x
    pub lx: f64,
    /// Domain length along y
    pub ly: f64,
    /// Fraction of the maximum wavenumber kept by the dealiasing
    pub coef_dealiasing: f64,
}

impl Default for OperParams {
    fn default() -> Self {
        Self {
            nx: 48,
            ny: 48,
            lx: 8.,
            ly: 8.,
            coef_dealiasing: 2. / 3.,
        }
    }
}

impl OperParams {
    /// # Errors
    /// Grid with less than two points, non-positive lengths
    /// or dealiasing coefficient outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.nx < 2 || self.ny < 2 {
            return Err(Error::Config(format!(
                "oper: need at least 2 points per direction, got nx = {}, ny = {}",
                self.nx, self.ny
            )));
        }
        if !(self.lx > 0. && self.ly > 0.) || !self.lx.is_finite() || !self.ly.is_finite() {
            return Err(Error::Config(format!(
                "oper: domain lengths must be positive, got lx = {}, ly = {}",
                self.lx, self.ly
            )));
        }
        if !(self.coef_dealiasing > 0. && self.coef_dealiasing <= 1.) {
            return Err(Error::Config(format!(
                "oper: coef_dealiasing must be in (0, 1], got {}",
                self.coef_dealiasing
            )));
        }
        Ok(())
    }
}

/// Time stepping
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSteppingParams {
    /// Stop at `t_end` (else after `it_end` steps)
    pub use_t_end: bool,
    /// End time
    pub t_end: f64,
    /// Number of time steps
    pub it_end: usize,
    /// Adapt the time step to the CFL condition
    pub use_cfl: bool,
    /// Initial (or fixed) time step
    pub deltat0: f64,
    /// Upper bound of the adapted time step
    pub deltat_max: f64,
    /// CFL coefficient, default depends on the scheme
    pub cfl_coef: Option<f64>,
    /// "RK4" or "RK2"
    pub type_time_scheme: String,
}

impl Default for TimeSteppingParams {
    fn default() -> Self {
        Self {
            use_t_end: true,
            t_end: 10.,
            it_end: 10,
            use_cfl: true,
            deltat0: 0.2,
            deltat_max: 0.2,
            cfl_coef: None,
            type_time_scheme: "RK4".to_owned(),
        }
    }
}

impl TimeSteppingParams {
    /// # Errors
    /// Non-positive time steps or negative end time.
    pub fn validate(&self) -> Result<()> {
        if !(self.deltat0 > 0. && self.deltat0.is_finite()) {
            return Err(config("time_stepping.deltat0 must be positive"));
        }
        if !(self.deltat_max > 0.) {
            return Err(config("time_stepping.deltat_max must be positive"));
        }
        if !(self.t_end >= 0.) {
            return Err(config("time_stepping.t_end must be >= 0"));
        }
        if let Some(c) = self.cfl_coef {
            if !(c > 0.) {
                return Err(config("time_stepping.cfl_coef must be positive"));
            }
        }
        Ok(())
    }
}

/// Initialization of the state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitFieldsParams {
    /// Strategy: "constant", "noise", "jet", "dipole", "from_file", "manual"
    #[serde(rename = "type")]
    pub type_: String,
    /// Value of the "constant" strategy
    pub constant: f64,
    /// Parameters of the "noise" strategy
    pub noise: NoiseParams,
    /// Hdf5 file of the "from_file" strategy
    pub from_file: String,
    /// Seed of the random strategies
    pub seed: u64,
}

impl Default for InitFieldsParams {
    fn default() -> Self {
        Self {
            type_: "constant".to_owned(),
            constant: 0.,
            noise: NoiseParams::default(),
            from_file: String::new(),
            seed: 42,
        }
    }
}

/// Parameters of the noise initialization
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Maximum velocity of the initial field
    pub velo_max: f64,
    /// Typical length of the vortices, 0 selects lx / 4
    pub length: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            velo_max: 1.,
            length: 0.,
        }
    }
}

/// Forcing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForcingParams {
    /// Strategy: "random", "proportional", "waves", "noise"
    #[serde(rename = "type")]
    pub type_: String,
    /// Injection rate of the forced quadratic quantity
    pub forcing_rate: f64,
    /// Forced variable, default depends on the strategy
    pub key_forced: Option<String>,
    /// Lower bound of the forced band (in units of `deltakh`)
    pub nkmin_forcing: f64,
    /// Upper bound of the forced band (in units of `deltakh`)
    pub nkmax_forcing: f64,
    /// Seed of the random strategies, `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for ForcingParams {
    fn default() -> Self {
        Self {
            type_: String::new(),
            forcing_rate: 1.,
            key_forced: None,
            nkmin_forcing: 4.,
            nkmax_forcing: 5.,
            seed: None,
        }
    }
}

impl ForcingParams {
    /// # Errors
    /// Empty band or non-finite rate.
    pub fn validate(&self) -> Result<()> {
        if !self.forcing_rate.is_finite() {
            return Err(config("forcing.forcing_rate must be finite"));
        }
        if !(self.nkmin_forcing >= 0. && self.nkmin_forcing <= self.nkmax_forcing) {
            return Err(Error::Config(format!(
                "forcing: need 0 <= nkmin_forcing <= nkmax_forcing, got {} and {}",
                self.nkmin_forcing, self.nkmax_forcing
            )));
        }
        Ok(())
    }
}

/// Output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputParams {
    /// Write files (stdout printing is always active)
    pub has_to_save: bool,
    /// Run directory, default `data/<solver>_<short_name_type_run>`
    pub path_run: Option<String>,
    /// Printing periods
    pub periods_print: PeriodsPrint,
    /// Saving periods, 0 disables an output
    pub periods_save: PeriodsSave,
}

impl Default for OutputParams {
    fn default() -> Self {
        Self {
            has_to_save: false,
            path_run: None,
            periods_print: PeriodsPrint::default(),
            periods_save: PeriodsSave::default(),
        }
    }
}

/// Printing periods (simulation time)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodsPrint {
    /// Log line with time, time step and energy, 0 disables it
    pub print_stdout: f64,
}

impl Default for PeriodsPrint {
    fn default() -> Self {
        Self { print_stdout: 1. }
    }
}

/// Saving periods (simulation time)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodsSave {
    /// Hdf5 snapshots of the fields
    pub phys_fields: f64,
    /// Energy and enstrophy text file
    pub spatial_means: f64,
    /// Hdf5 radial spectra
    pub spectra: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Physics {
        nu_2: f64,
    }

    #[test]
    fn test_defaults_validate() {
        let params = Params::<Physics>::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.oper.nx, 48);
        assert_eq!(params.forcing.nkmax_forcing, 5.);
    }

    #[test]
    fn test_invalid_grid() {
        let mut params = Params::<Physics>::default();
        params.oper.lx = 0.;
        assert!(matches!(params.validate(), Err(Error::Config(_))));
        let mut params = Params::<Physics>::default();
        params.oper.coef_dealiasing = 1.5;
        assert!(matches!(params.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{"physics": {"nu_2": 0.01}, "oper": {"nx": 32}, "forcing": {"type": "random"}}"#;
        let params: Params<Physics> = serde_json::from_str(json).unwrap();
        assert_eq!(params.physics.nu_2, 0.01);
        assert_eq!(params.oper.nx, 32);
        assert_eq!(params.oper.ny, 48);
        assert_eq!(params.forcing.type_, "random");
        assert_eq!(params.time_stepping.type_time_scheme, "RK4");
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let mut params = Params::<Physics>::default();
        params.time_stepping.t_end = 3.;
        params.save_json(&path).unwrap();
        let read = Params::<Physics>::from_json_file(&path).unwrap();
        assert_eq!(read, params);
    }
}
