//! # Initialization of the state
//!
//! Strategies are resolved by name (`params.init_fields.type_`) and run
//! once, before the time stepping. Every solver supports a subset:
//! - 2D models: `constant`, `noise`, `jet`, `dipole`, `from_file`
//! - 0D models: `constant`, `manual`
//!
//! `manual` leaves the state untouched, the caller sets it before
//! starting the simulation.
use crate::error::{Error, Result};
use crate::io::{read_from_hdf5_complex, write_to_hdf5_complex};
use crate::operators::{ArrayK, Operators2D};
use crate::params::InitFieldsParams;
use crate::setofvariables::SetOfVariables;
use ndarray::{Array2, Ix2, Zip};
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use num_complex::Complex;
use std::f64::consts::PI;
use std::path::Path;
use std::str::FromStr;

/// Registered initialization strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitFieldsKind {
    /// Uniform value
    Constant,
    /// Smoothed random divergence-free velocity
    Noise,
    /// Two opposite shear layers
    Jet,
    /// Periodic Lamb-Oseen like dipole
    Dipole,
    /// Hdf5 file written by `phys_fields`
    FromFile,
    /// Set by the caller
    Manual,
}

impl InitFieldsKind {
    /// Names of all strategies
    pub const AVAILABLE: [&'static str; 6] =
        ["constant", "noise", "jet", "dipole", "from_file", "manual"];

    /// Strategies of 2D models
    pub const AVAILABLE_2D: [&'static str; 5] = ["constant", "noise", "jet", "dipole", "from_file"];

    /// Strategies of 0D models
    pub const AVAILABLE_0D: [&'static str; 2] = ["constant", "manual"];

    /// Parse a name among the strategies `available`
    ///
    /// # Errors
    /// `UnknownInitFields` if the name is not part of `available`.
    pub fn parse_among(name: &str, available: &[&str]) -> Result<Self> {
        if available.contains(&name) {
            name.parse()
        } else {
            Err(Error::UnknownInitFields {
                name: name.to_owned(),
                available: available.join(", "),
            })
        }
    }
}

impl FromStr for InitFieldsKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "constant" => Ok(Self::Constant),
            "noise" => Ok(Self::Noise),
            "jet" => Ok(Self::Jet),
            "dipole" => Ok(Self::Dipole),
            "from_file" => Ok(Self::FromFile),
            "manual" => Ok(Self::Manual),
            _ => Err(Error::UnknownInitFields {
                name: s.to_owned(),
                available: Self::AVAILABLE.join(", "),
            }),
        }
    }
}

fn h_smooth(x: f64, delta: f64) -> f64 {
    (1. + (2. * PI * x / delta).tanh()) / 2.
}

/// Random divergence-free velocity `(ux_fft, uy_fft)`
///
/// Uniform noise is projected, dealiased, smoothly cut above
/// `k0 = 2 pi / length` (`length = lx / 4` if not set) and scaled such
/// that the maximum velocity equals `noise.velo_max`. The field only
/// depends on `seed`, not on the number of workers. Collective.
///
/// # Errors
/// Propagates transform errors.
pub fn vecfft_noise(oper: &Operators2D, params: &InitFieldsParams) -> Result<(ArrayK, ArrayK)> {
    let (ux_fft, uy_fft) = vecfft_noise_unscaled(oper, params)?;
    let ux = oper.ifft(&ux_fft)?;
    let uy = oper.ifft(&uy_fft)?;
    let velo = Zip::from(&ux)
        .and(&uy)
        .map_collect(|ux, uy| (ux * ux + uy * uy).sqrt());
    let velo_max = oper.max_global(&velo)?;
    if velo_max > 0. {
        let coef = params.noise.velo_max / velo_max;
        return Ok((ux_fft.mapv(|u| u * coef), uy_fft.mapv(|u| u * coef)));
    }
    Ok((ux_fft, uy_fft))
}

/// Noise velocity before the scaling to `noise.velo_max`. Local.
fn vecfft_noise_unscaled(oper: &Operators2D, params: &InitFieldsParams) -> Result<(ArrayK, ArrayK)> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut ux_fft = oper.random_fft(&mut rng);
    let mut uy_fft = oper.random_fft(&mut rng);
    if oper.owns_zero_mode() {
        ux_fft[[0, 0]] = Complex::new(0., 0.);
        uy_fft[[0, 0]] = Complex::new(0., 0.);
    }
    oper.projection_perp(&mut ux_fft, &mut uy_fft)?;
    oper.dealiasing(&mut [&mut ux_fft, &mut uy_fft])?;

    let lambda0 = if params.noise.length == 0. {
        oper.lx / 4.
    } else {
        params.noise.length
    };
    let k0 = 2. * PI / lambda0;
    let delta_k0 = k0;
    let smooth = oper.kk.mapv(|kk| h_smooth(k0 - kk.sqrt(), delta_k0));
    for u in [&mut ux_fft, &mut uy_fft] {
        Zip::from(u).and(&smooth).for_each(|u, &h| *u *= h);
    }
    Ok((ux_fft, uy_fft))
}

/// Vorticity of the noise initialization
///
/// # Errors
/// Propagates transform errors.
pub fn rotfft_noise(oper: &Operators2D, params: &InitFieldsParams) -> Result<ArrayK> {
    let (ux_fft, uy_fft) = vecfft_noise(oper, params)?;
    oper.rotfft_from_vecfft(&ux_fft, &uy_fft)
}

/// Vorticity of two opposite Gaussian shear layers (periodic in y)
pub fn rot_jet(oper: &Operators2D) -> Array2<f64> {
    let (_, yy) = oper.xx_yy();
    let ly = oper.ly;
    let a = 0.5;
    let b = ly / 2.;
    let omega0 = 2.;
    let gauss = |y: f64| (-(y / a).powi(2)).exp();
    yy.mapv(|y| {
        let y = y - ly / 2.;
        let mut omega = 0.;
        for shift in [0., ly, -ly] {
            omega += gauss(y + b / 2. + shift) - gauss(y - b / 2. + shift);
        }
        omega0 * omega
    })
}

/// Vorticity of a tilted dipole at the center of the domain,
/// summed over the neighbouring periodic images
pub fn rot_dipole(oper: &Operators2D) -> Array2<f64> {
    let (xx, yy) = oper.xx_yy();
    let xs = oper.lx / 2.;
    let ys = oper.ly / 2.;
    let theta = PI / 2.3;
    let b = 2.5;
    let (sin, cos) = theta.sin_cos();
    let wz_2lo = |x: f64, y: f64| {
        2. * (-(x * x + (y - b / 2.).powi(2))).exp() - 2. * (-(x * x + (y + b / 2.).powi(2))).exp()
    };
    Zip::from(&xx).and(&yy).map_collect(|&x, &y| {
        let mut omega = 0.;
        for ip in -1..=1 {
            for jp in -1..=1 {
                let dx = x - xs - f64::from(ip) * oper.lx;
                let dy = y - ys - f64::from(jp) * oper.ly;
                omega += wz_2lo(cos * dx + sin * dy, cos * dy - sin * dx);
            }
        }
        omega
    })
}

/// Spectral field with the mean `value` and no fluctuation
pub fn constant_fft(oper: &Operators2D, value: f64) -> ArrayK {
    let mut a = oper.zeros_spectral();
    if oper.owns_zero_mode() {
        a[[0, 0]] = Complex::new(value, 0.);
    }
    a
}

/// Transform a physical vorticity and remove its mean
///
/// # Errors
/// Propagates transform errors.
pub fn rotfft_from_rot(oper: &Operators2D, rot: &Array2<f64>) -> Result<ArrayK> {
    let mut rot_fft = oper.fft(rot)?;
    if oper.owns_zero_mode() {
        rot_fft[[0, 0]] = Complex::new(0., 0.);
    }
    Ok(rot_fft)
}

/// Read the spectral variables `keys` (global arrays) from an hdf5 file
/// and keep the local slabs
///
/// # Errors
/// File or variable missing, or wrong shape.
pub fn load_state_spect<P: AsRef<Path>>(
    oper: &Operators2D,
    keys: &[&str],
    filename: P,
) -> Result<SetOfVariables<Complex<f64>, Ix2>> {
    let vars = keys
        .iter()
        .map(|key| {
            let global = read_from_hdf5_complex::<f64, Ix2, _>(filename.as_ref(), key)?;
            oper.scatter_spectral(&global)
        })
        .collect::<Result<Vec<_>>>()?;
    SetOfVariables::from_arrays(keys, vars)
}

/// Write the spectral variables (global arrays) to an hdf5 file,
/// collective, the root worker writes
///
/// # Errors
/// File can not be written.
pub fn save_state_spect<P: AsRef<Path>>(
    oper: &Operators2D,
    state_spect: &SetOfVariables<Complex<f64>, Ix2>,
    filename: P,
) -> Result<()> {
    for (key, var) in state_spect.iter() {
        if let Some(global) = oper.gather_spectral(var)? {
            write_to_hdf5_complex(filename.as_ref(), key, &global)?;
        }
    }
    Ok(())
}
