//! Pseudo-spectral operators on a doubly periodic rectangle
#[cfg(feature = "mpi")]
use crate::bases::SpaceFourier2Mpi;
use crate::bases::{fourier_c2c, fourier_r2c, BaseSpace, Space2, SpaceFourier2};
use crate::bases::{wavenumber_indices_c2c, wavenumber_indices_r2c};
use crate::error::{Error, Result};
#[cfg(feature = "mpi")]
use crate::mpi::BaseSpaceMpi;
use crate::mpi::{Comm, Decomp};
use crate::params::OperParams;
use crate::setofvariables::SetOfVariables;
use ndarray::{Array1, Array2, ArrayBase, ArrayViewMut1, Axis, Data, DataMut, Ix2, Zip};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use num_complex::Complex;
use std::f64::consts::PI;

/// Spectral array
pub type ArrayK = Array2<Complex<f64>>;

/// Replacement of `|k|^2 = 0` in [`Operators2D::kk_not0`]
const KK_ZERO_REPLACEMENT: f64 = 1e-14;

/// Transforms, wavenumbers and spectral operators of a 2D periodic grid
///
/// Spectral arrays have the global shape `(nx, ny / 2 + 1)`, axis 0 holds
/// all `kx` in transform order and axis 1 the non-negative `ky`. On
/// several workers physical arrays are y-pencils `(nx_loc, ny)` and
/// spectral arrays x-pencils `(nx, nky_loc)`, see [`Decomp`]. The forward
/// transform is normalised such that the zero mode equals the mean of
/// the field.
///
/// # Example
/// ```
/// use fluidspec::mpi::Comm;
/// use fluidspec::operators::Operators2D;
/// use fluidspec::params::OperParams;
/// use ndarray::Array2;
///
/// let params = OperParams { nx: 16, ny: 12, ..OperParams::default() };
/// let oper = Operators2D::new(&params, Comm::serial()).unwrap();
/// let v = Array2::from_elem((16, 12), 3.);
/// let vhat = oper.fft(&v).unwrap();
/// assert!((vhat[[0, 0]].re - 3.).abs() < 1e-12);
/// ```
pub struct Operators2D<'a> {
    /// Grid points along x
    pub nx: usize,
    /// Grid points along y
    pub ny: usize,
    /// Number of ky (= ny / 2 + 1)
    pub nky: usize,
    /// Domain length along x
    pub lx: f64,
    /// Domain length along y
    pub ly: f64,
    /// Grid spacing along x
    pub deltax: f64,
    /// Grid spacing along y
    pub deltay: f64,
    /// Smallest wavenumber along x
    pub deltakx: f64,
    /// Smallest wavenumber along y
    pub deltaky: f64,
    /// Width of the radial wavenumber bins
    pub deltakh: f64,
    /// Fraction of the maximum wavenumber kept by the dealiasing
    pub coef_dealiasing: f64,
    /// Largest |kx| of the grid
    pub kmax_x: f64,
    /// Largest |ky| of the grid
    pub kmax_y: f64,
    /// Largest wavenumber kept by the dealiasing
    pub kmax: f64,
    /// Local kx
    pub kx: Array2<f64>,
    /// Local ky
    pub ky: Array2<f64>,
    /// Local |k|^2
    pub kk: Array2<f64>,
    /// Local |k|^2 with the zero mode set to a tiny number
    pub kk_not0: Array2<f64>,
    /// Centers of the radial bins
    pub kh: Array1<f64>,
    /// Local x coordinates
    pub x: Array1<f64>,
    /// y coordinates
    pub y: Array1<f64>,
    where_dealiased: Array2<bool>,
    /// Transforms of a single worker
    space: Option<SpaceFourier2>,
    /// Pencil transforms of several workers
    #[cfg(feature = "mpi")]
    space_mpi: Option<SpaceFourier2Mpi<'a>>,
    norm: f64,
    decomp: Decomp,
    comm: Comm<'a>,
}

impl<'a> Operators2D<'a> {
    /// Build the operators of the grid described by `params`
    ///
    /// # Errors
    /// Invalid grid, or more workers than rows along x or
    /// columns along ky.
    pub fn new(params: &OperParams, comm: Comm<'a>) -> Result<Self> {
        params.validate()?;
        let decomp = Decomp::new(params.nx, params.ny / 2 + 1, comm.nb_proc(), comm.rank())?;
        Self::build(params, comm, decomp)
    }

    /// Operators of one worker of `decomp` without communicator. Local
    /// operations and random fields are available, transforms and
    /// collectives only for a single worker.
    ///
    /// # Errors
    /// Invalid grid, or a decomposition of another grid.
    pub(crate) fn with_decomp(params: &OperParams, decomp: Decomp) -> Result<Self> {
        params.validate()?;
        if decomp.phys.n_global != params.nx || decomp.spec.n_global != params.ny / 2 + 1 {
            return Err(Error::Config(format!(
                "decomposition {:?} does not match nx = {}, ny = {}",
                decomp, params.nx, params.ny
            )));
        }
        Self::build(params, Comm::serial(), decomp)
    }

    fn build(params: &OperParams, comm: Comm<'a>, decomp: Decomp) -> Result<Self> {
        let (nx, ny, lx, ly) = (params.nx, params.ny, params.lx, params.ly);
        let nky = ny / 2 + 1;
        let (phys, spec) = (&decomp.phys, &decomp.spec);

        let deltax = lx / nx as f64;
        let deltay = ly / ny as f64;
        let deltakx = 2. * PI / lx;
        let deltaky = 2. * PI / ly;
        let deltakh = deltakx;

        let kx_1d: Vec<f64> = wavenumber_indices_c2c(nx)
            .iter()
            .map(|i| i * deltakx)
            .collect();
        let ky_1d: Vec<f64> = wavenumber_indices_r2c(ny)
            .iter()
            .map(|j| j * deltaky)
            .collect();
        let shape_k = (nx, spec.n_local());
        let kx = Array2::from_shape_fn(shape_k, |(i, _)| kx_1d[i]);
        let ky = Array2::from_shape_fn(shape_k, |(_, j)| ky_1d[spec.start + j]);
        let kk = Zip::from(&kx)
            .and(&ky)
            .map_collect(|&kx, &ky| kx * kx + ky * ky);
        let kk_not0 = kk.mapv(|k| if k == 0. { KK_ZERO_REPLACEMENT } else { k });

        let kmax_x = deltakx * (nx / 2) as f64;
        let kmax_y = deltaky * (ny / 2) as f64;
        let coef = params.coef_dealiasing;
        let kmax = coef * kmax_x.min(kmax_y);
        let where_dealiased = Zip::from(&kx).and(&ky).map_collect(|&kx, &ky| {
            kx.abs() >= coef * kmax_x || ky.abs() >= coef * kmax_y
        });

        let nkh = (kmax_x.hypot(kmax_y) / deltakh).round() as usize + 1;
        let kh = Array1::from_shape_fn(nkh, |i| i as f64 * deltakh);
        let x = Array1::from_shape_fn(phys.n_local(), |i| (phys.start + i) as f64 * deltax);
        let y = Array1::from_shape_fn(ny, |j| j as f64 * deltay);

        let space = if decomp.nb_proc == 1 {
            Some(Space2::new(&fourier_c2c::<f64>(nx), &fourier_r2c::<f64>(ny)))
        } else {
            None
        };
        #[cfg(feature = "mpi")]
        let space_mpi = Self::build_space_mpi(nx, ny, &comm, &decomp)?;

        Ok(Self {
            nx,
            ny,
            nky,
            lx,
            ly,
            deltax,
            deltay,
            deltakx,
            deltaky,
            deltakh,
            coef_dealiasing: coef,
            kmax_x,
            kmax_y,
            kmax,
            kx,
            ky,
            kk,
            kk_not0,
            kh,
            x,
            y,
            where_dealiased,
            space,
            #[cfg(feature = "mpi")]
            space_mpi,
            // the forward transform of funspace is not normalised
            norm: (nx * ny) as f64,
            decomp,
            comm,
        })
    }

    #[cfg(feature = "mpi")]
    fn build_space_mpi(nx: usize, ny: usize, comm: &Comm<'a>, decomp: &Decomp) -> Result<Option<SpaceFourier2Mpi<'a>>> {
        let universe = match comm.universe() {
            Some(universe) if decomp.nb_proc > 1 => universe,
            _ => return Ok(None),
        };
        let space = SpaceFourier2Mpi::new(&fourier_c2c::<f64>(nx), &fourier_r2c::<f64>(ny), universe);
        let pencils = (space.shape_physical_y_pen(), space.shape_spectral_x_pen());
        let expected = (
            [decomp.phys.n_local(), ny],
            [nx, decomp.spec.n_local()],
        );
        if pencils != expected {
            return Err(Error::Config(format!(
                "pencils {:?} of funspace differ from the decomposition {:?}",
                pencils, expected
            )));
        }
        Ok(Some(space))
    }

    /// Communicator
    pub fn comm(&self) -> &Comm<'a> {
        &self.comm
    }

    /// Pencil decomposition
    pub fn decomp(&self) -> &Decomp {
        &self.decomp
    }

    /// True if this worker holds the mode `k = 0`
    pub fn owns_zero_mode(&self) -> bool {
        self.decomp.owns_zero_mode()
    }

    /// Local shape of physical arrays
    pub fn shape_phys_loc(&self) -> Ix2 {
        Ix2(self.decomp.phys.n_local(), self.ny)
    }

    /// Local shape of spectral arrays
    pub fn shape_k_loc(&self) -> Ix2 {
        Ix2(self.nx, self.decomp.spec.n_local())
    }

    /// Zero physical array (local)
    pub fn zeros_physical(&self) -> Array2<f64> {
        Array2::zeros(self.shape_phys_loc())
    }

    /// Zero spectral array (local)
    pub fn zeros_spectral(&self) -> ArrayK {
        Array2::zeros(self.shape_k_loc())
    }

    /// Local physical coordinates as 2D arrays `(xx, yy)`
    pub fn xx_yy(&self) -> (Array2<f64>, Array2<f64>) {
        let shape = self.shape_phys_loc();
        let xx = Array2::from_shape_fn(shape, |(i, _)| self.x[i]);
        let yy = Array2::from_shape_fn(shape, |(_, j)| self.y[j]);
        (xx, yy)
    }

    fn check_phys<S: Data>(&self, a: &ArrayBase<S, Ix2>) -> Result<()> {
        let expected = [self.decomp.phys.n_local(), self.ny];
        if a.shape() == expected {
            Ok(())
        } else {
            Err(Error::shape(&expected, a.shape()))
        }
    }

    fn check_k<S: Data>(&self, a: &ArrayBase<S, Ix2>) -> Result<()> {
        let expected = [self.nx, self.decomp.spec.n_local()];
        if a.shape() == expected {
            Ok(())
        } else {
            Err(Error::shape(&expected, a.shape()))
        }
    }

    fn no_transform(&self) -> Error {
        Error::Config(format!(
            "worker {} of {} has no communicator, transforms are not available",
            self.decomp.rank, self.decomp.nb_proc
        ))
    }

    fn forward<S: Data<Elem = f64>>(&self, v: &ArrayBase<S, Ix2>, vhat: &mut ArrayK) -> Result<()> {
        match &self.space {
            Some(space) => {
                space.forward_inplace_par(v, vhat);
                Ok(())
            }
            None => self.forward_mpi(v, vhat),
        }
    }

    fn backward(&self, vhat: &ArrayK, v: &mut Array2<f64>) -> Result<()> {
        match &self.space {
            Some(space) => {
                space.backward_inplace_par(vhat, v);
                Ok(())
            }
            None => self.backward_mpi(vhat, v),
        }
    }

    #[cfg(feature = "mpi")]
    fn forward_mpi<S: Data<Elem = f64>>(&self, v: &ArrayBase<S, Ix2>, vhat: &mut ArrayK) -> Result<()> {
        let space = self.space_mpi.as_ref().ok_or_else(|| self.no_transform())?;
        space.forward_inplace_mpi(v, vhat);
        Ok(())
    }

    #[cfg(not(feature = "mpi"))]
    fn forward_mpi<S: Data<Elem = f64>>(&self, _v: &ArrayBase<S, Ix2>, _vhat: &mut ArrayK) -> Result<()> {
        Err(self.no_transform())
    }

    #[cfg(feature = "mpi")]
    fn backward_mpi(&self, vhat: &ArrayK, v: &mut Array2<f64>) -> Result<()> {
        let space = self.space_mpi.as_ref().ok_or_else(|| self.no_transform())?;
        space.backward_inplace_mpi(vhat, v);
        Ok(())
    }

    #[cfg(not(feature = "mpi"))]
    fn backward_mpi(&self, _vhat: &ArrayK, _v: &mut Array2<f64>) -> Result<()> {
        Err(self.no_transform())
    }

    /// Forward transform, physical -> spectral. Collective.
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn fft<S: Data<Elem = f64>>(&self, v: &ArrayBase<S, Ix2>) -> Result<ArrayK> {
        self.check_phys(v)?;
        let mut vhat = self.zeros_spectral();
        self.forward(v, &mut vhat)?;
        let norm = self.norm;
        vhat.mapv_inplace(|z| z / norm);
        Ok(vhat)
    }

    /// Inverse transform, spectral -> physical. Collective.
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn ifft<S: Data<Elem = Complex<f64>>>(&self, vhat: &ArrayBase<S, Ix2>) -> Result<Array2<f64>> {
        self.check_k(vhat)?;
        let scaled = vhat.mapv(|z| z * self.norm);
        let mut v = self.zeros_physical();
        self.backward(&scaled, &mut v)?;
        Ok(v)
    }

    /// Global physical array on the root worker, `None` on the others.
    /// Collective.
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn gather_physical<S: Data<Elem = f64>>(&self, v: &ArrayBase<S, Ix2>) -> Result<Option<Array2<f64>>> {
        self.check_phys(v)?;
        if self.space.is_some() {
            return Ok(Some(v.to_owned()));
        }
        self.gather_physical_mpi(v)
    }

    /// Global spectral array on the root worker, `None` on the others.
    /// Collective.
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn gather_spectral<S>(&self, vhat: &ArrayBase<S, Ix2>) -> Result<Option<ArrayK>>
    where
        S: Data<Elem = Complex<f64>>,
    {
        self.check_k(vhat)?;
        if self.space.is_some() {
            return Ok(Some(vhat.to_owned()));
        }
        self.gather_spectral_mpi(vhat)
    }

    #[cfg(feature = "mpi")]
    fn gather_physical_mpi<S: Data<Elem = f64>>(&self, v: &ArrayBase<S, Ix2>) -> Result<Option<Array2<f64>>> {
        let space = self.space_mpi.as_ref().ok_or_else(|| self.no_transform())?;
        if self.comm.is_root() {
            let mut global = Array2::zeros((self.nx, self.ny));
            space.gather_from_y_pencil_phys_root(v, &mut global);
            Ok(Some(global))
        } else {
            space.gather_from_y_pencil_phys(v);
            Ok(None)
        }
    }

    #[cfg(not(feature = "mpi"))]
    fn gather_physical_mpi<S: Data<Elem = f64>>(&self, _v: &ArrayBase<S, Ix2>) -> Result<Option<Array2<f64>>> {
        Err(self.no_transform())
    }

    #[cfg(feature = "mpi")]
    fn gather_spectral_mpi<S>(&self, vhat: &ArrayBase<S, Ix2>) -> Result<Option<ArrayK>>
    where
        S: Data<Elem = Complex<f64>>,
    {
        let space = self.space_mpi.as_ref().ok_or_else(|| self.no_transform())?;
        if self.comm.is_root() {
            let mut global = Array2::zeros((self.nx, self.nky));
            space.gather_from_x_pencil_spec_root(vhat, &mut global);
            Ok(Some(global))
        } else {
            space.gather_from_x_pencil_spec(vhat);
            Ok(None)
        }
    }

    #[cfg(not(feature = "mpi"))]
    fn gather_spectral_mpi<S>(&self, _vhat: &ArrayBase<S, Ix2>) -> Result<Option<ArrayK>>
    where
        S: Data<Elem = Complex<f64>>,
    {
        Err(self.no_transform())
    }

    /// Local pencil of a global spectral array
    ///
    /// # Errors
    /// Global array does not have the shape `(nx, ny / 2 + 1)`.
    pub fn scatter_spectral<S>(&self, global: &ArrayBase<S, Ix2>) -> Result<ArrayK>
    where
        S: Data<Elem = Complex<f64>>,
    {
        let expected = [self.nx, self.nky];
        if global.shape() != expected {
            return Err(Error::shape(&expected, global.shape()));
        }
        Ok(self.decomp.local_columns(global))
    }

    /// Zero the modes beyond the dealiasing cutoff
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn dealiasing_variable<S>(&self, vhat: &mut ArrayBase<S, Ix2>) -> Result<()>
    where
        S: Data<Elem = Complex<f64>> + DataMut,
    {
        self.check_k(vhat)?;
        Zip::from(vhat)
            .and(&self.where_dealiased)
            .for_each(|v, &dealiased| {
                if dealiased {
                    *v = Complex::new(0., 0.);
                }
            });
        Ok(())
    }

    /// Dealias several spectral arrays in place
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn dealiasing(&self, arrays: &mut [&mut ArrayK]) -> Result<()> {
        for a in arrays.iter_mut() {
            self.dealiasing_variable(&mut **a)?;
        }
        Ok(())
    }

    /// Dealias every variable of a spectral set
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn dealiasing_setofvar(&self, sov: &mut SetOfVariables<Complex<f64>, Ix2>) -> Result<()> {
        for v in sov.vars_mut() {
            self.dealiasing_variable(v)?;
        }
        Ok(())
    }

    /// Remove the component of the vector field parallel to k
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn projection_perp(&self, ux_fft: &mut ArrayK, uy_fft: &mut ArrayK) -> Result<()> {
        self.check_k(ux_fft)?;
        self.check_k(uy_fft)?;
        Zip::from(ux_fft)
            .and(uy_fft)
            .and(&self.kx)
            .and(&self.ky)
            .and(&self.kk_not0)
            .for_each(|ux, uy, &kx, &ky, &kk| {
                let tmp = (*ux * kx + *uy * ky) / kk;
                *ux -= tmp * kx;
                *uy -= tmp * ky;
            });
        Ok(())
    }

    /// Gradient `(i kx f, i ky f)`
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn gradfft_from_fft<S>(&self, f_fft: &ArrayBase<S, Ix2>) -> Result<(ArrayK, ArrayK)>
    where
        S: Data<Elem = Complex<f64>>,
    {
        self.check_k(f_fft)?;
        let i = Complex::<f64>::i();
        let px = Zip::from(f_fft)
            .and(&self.kx)
            .map_collect(|&f, &kx| i * f * kx);
        let py = Zip::from(f_fft)
            .and(&self.ky)
            .map_collect(|&f, &ky| i * f * ky);
        Ok((px, py))
    }

    /// Divergence `i kx ux + i ky uy`
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn divfft_from_vecfft(&self, ux_fft: &ArrayK, uy_fft: &ArrayK) -> Result<ArrayK> {
        self.check_k(ux_fft)?;
        self.check_k(uy_fft)?;
        let i = Complex::<f64>::i();
        Ok(Zip::from(ux_fft)
            .and(uy_fft)
            .and(&self.kx)
            .and(&self.ky)
            .map_collect(|&ux, &uy, &kx, &ky| i * (ux * kx + uy * ky)))
    }

    /// Curl `i kx uy - i ky ux`
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn rotfft_from_vecfft(&self, ux_fft: &ArrayK, uy_fft: &ArrayK) -> Result<ArrayK> {
        self.check_k(ux_fft)?;
        self.check_k(uy_fft)?;
        let i = Complex::<f64>::i();
        Ok(Zip::from(ux_fft)
            .and(uy_fft)
            .and(&self.kx)
            .and(&self.ky)
            .map_collect(|&ux, &uy, &kx, &ky| i * (uy * kx - ux * ky)))
    }

    /// Divergence-free velocity of a vorticity field
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn vecfft_from_rotfft(&self, rot_fft: &ArrayK) -> Result<(ArrayK, ArrayK)> {
        self.check_k(rot_fft)?;
        let i = Complex::<f64>::i();
        let ux = Zip::from(rot_fft)
            .and(&self.ky)
            .and(&self.kk_not0)
            .map_collect(|&rot, &ky, &kk| i * rot * (ky / kk));
        let uy = Zip::from(rot_fft)
            .and(&self.kx)
            .and(&self.kk_not0)
            .map_collect(|&rot, &kx, &kk| -i * rot * (kx / kk));
        Ok((ux, uy))
    }

    /// Curl-free velocity of a divergence field
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn vecfft_from_divfft(&self, div_fft: &ArrayK) -> Result<(ArrayK, ArrayK)> {
        self.check_k(div_fft)?;
        let i = Complex::<f64>::i();
        let ux = Zip::from(div_fft)
            .and(&self.kx)
            .and(&self.kk_not0)
            .map_collect(|&div, &kx, &kk| -i * div * (kx / kk));
        let uy = Zip::from(div_fft)
            .and(&self.ky)
            .and(&self.kk_not0)
            .map_collect(|&div, &ky, &kk| -i * div * (ky / kk));
        Ok((ux, uy))
    }

    /// Linear dissipation frequency `nu_2 k^2 + nu_4 k^4 + nu_8 k^8 + nu_m4 k^-4`
    /// (the hypo-viscous term vanishes at `k = 0`)
    pub fn freq_lin_viscosity(&self, nu_2: f64, nu_4: f64, nu_8: f64, nu_m4: f64) -> Array2<f64> {
        self.kk.mapv(|kk| {
            let hypo = if kk > 0. { nu_m4 / (kk * kk) } else { 0. };
            nu_2 * kk + nu_4 * kk * kk + nu_8 * kk.powi(4) + hypo
        })
    }

    /// True for the columns `ky = 0` and, for even `ny`, `ky = ny / 2`
    /// which hold their own complex conjugates
    fn is_self_conjugate(&self, j_global: usize) -> bool {
        j_global == 0 || (self.ny % 2 == 0 && j_global == self.ny / 2)
    }

    /// Weight of the local spectral column `j` in sums over the full spectrum
    fn column_weight(&self, j: usize) -> f64 {
        if self.is_self_conjugate(self.decomp.spec.start + j) {
            1.
        } else {
            2.
        }
    }

    /// Sum of a quantity defined on the half spectrum over the full
    /// spectrum, the columns `ky = 0` (and `ky = ny / 2` for even `ny`)
    /// count once, all others twice. Collective.
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn sum_wavenumbers<S: Data<Elem = f64>>(&self, a: &ArrayBase<S, Ix2>) -> Result<f64> {
        self.check_k(a)?;
        let local = a
            .axis_iter(Axis(1))
            .enumerate()
            .map(|(j, column)| self.column_weight(j) * column.sum())
            .sum();
        Ok(self.comm.all_reduce_sum(local))
    }

    /// Radial spectrum of a quantity defined on the half spectrum,
    /// normalised such that `sum(spectrum) * deltakh` equals
    /// [`Operators2D::sum_wavenumbers`]. Collective.
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn spectrum2d_from_fft<S: Data<Elem = f64>>(&self, a: &ArrayBase<S, Ix2>) -> Result<Array1<f64>> {
        self.check_k(a)?;
        let nkh = self.kh.len();
        let mut spectrum = vec![0.; nkh];
        Zip::indexed(a)
            .and(&self.kk)
            .for_each(|(_, j), &value, &kk| {
                let ik = ((kk.sqrt() / self.deltakh).round() as usize).min(nkh - 1);
                spectrum[ik] += self.column_weight(j) * value;
            });
        self.comm.all_reduce_sum_slice(&mut spectrum);
        Ok(Array1::from(spectrum) / self.deltakh)
    }

    /// Maximum of a physical array over all workers. Collective.
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn max_global<S: Data<Elem = f64>>(&self, a: &ArrayBase<S, Ix2>) -> Result<f64> {
        self.check_phys(a)?;
        let local = a.fold(f64::NEG_INFINITY, |m, &x| m.max(x));
        Ok(self.comm.all_reduce_max(local))
    }

    /// Spatial mean of a physical array over all workers. Collective.
    ///
    /// # Errors
    /// Shape mismatch.
    pub fn mean_global<S: Data<Elem = f64>>(&self, a: &ArrayBase<S, Ix2>) -> Result<f64> {
        self.check_phys(a)?;
        let local = a.sum() / (self.nx * self.ny) as f64;
        Ok(self.comm.all_reduce_sum(local))
    }

    /// Random spectral array (local pencil), uniform in `[-0.5, 0.5)` for
    /// real and imaginary part, Hermitian on the self-conjugate columns.
    ///
    /// Every worker draws all columns in the same order and keeps its
    /// own, so the field only depends on the generator and not on the
    /// number of workers.
    pub fn random_fft<R: Rng + ?Sized>(&self, rng: &mut R) -> ArrayK {
        let dist = Uniform::new(-0.5, 0.5);
        let spec = &self.decomp.spec;
        let mut a = self.zeros_spectral();
        for j in 0..self.nky {
            let re = Array1::random_using(self.nx, dist, rng);
            let im = Array1::random_using(self.nx, dist, rng);
            if !spec.contains(j) {
                continue;
            }
            let mut column = a.column_mut(j - spec.start);
            Zip::from(&mut column)
                .and(&re)
                .and(&im)
                .for_each(|a, &re, &im| *a = Complex::new(re, im));
            if self.is_self_conjugate(j) {
                enforce_hermitian_symmetry(column);
            }
        }
        a
    }
}

/// Make a spectral column of a self-conjugate `ky` consistent with a
/// real field: `a[-i] = conj(a[i])` along `kx`
pub fn enforce_hermitian_symmetry(mut column: ArrayViewMut1<Complex<f64>>) {
    let nx = column.len();
    if nx == 0 {
        return;
    }
    column[0].im = 0.;
    for i in 1..(nx + 1) / 2 {
        column[nx - i] = column[i].conj();
    }
    if nx % 2 == 0 {
        column[nx / 2].im = 0.;
    }
}
