//! `Hdf5` functions to write ndarrays
use super::H5Type;
use crate::error::{Error, Result};
use ndarray::{Array, ArrayBase, ArrayD, Data, Dimension};
use num_complex::Complex;
use num_traits::Num;
use std::path::Path;

/// Open a file for writing, create it if it does not exist
fn open_or_create<P: AsRef<Path>>(filename: P) -> Result<hdf5::File> {
    let file = if filename.as_ref().exists() {
        hdf5::File::append(filename)?
    } else {
        hdf5::File::create(filename)?
    };
    Ok(file)
}

fn internal(msg: String) -> Error {
    Error::Hdf5(hdf5::Error::Internal(msg))
}

/// Read scalar from hdf5
///
/// # Errors
/// When file or variable does not exists, or when the
/// dataset is not one dimensional.
pub fn read_scalar_from_hdf5<T, P>(filename: P, name: &str) -> Result<T>
where
    T: H5Type + Copy,
    P: AsRef<Path>,
{
    let file = hdf5::File::open(filename)?;
    let dset = file.dataset(name)?;
    if dset.shape().len() != 1 {
        return Err(internal(format!(
            "{} must be of dimension 1, but is of dimension {}",
            name,
            dset.shape().len()
        )));
    }
    let scalar: ndarray::Array1<T> = dset.read()?;
    Ok(scalar[0])
}

/// Write scalar to hdf5 file (stored as array of length 1)
///
/// # Errors
/// When file can not be created.
pub fn write_scalar_to_hdf5<T, P>(filename: P, name: &str, scalar: T) -> Result<()>
where
    T: H5Type + Copy,
    P: AsRef<Path>,
{
    let x = ndarray::Array1::<T>::from_elem(1, scalar);
    write_to_hdf5(filename, name, &x)
}

/// Read ndarray from hdf5 file
///
/// # Errors
/// Errors when file/variable does not exist and
/// when the stored dimensionality differs from `D`.
pub fn read_from_hdf5<A, D, P>(filename: P, varname: &str) -> Result<Array<A, D>>
where
    A: H5Type,
    D: Dimension,
    P: AsRef<Path>,
{
    let file = hdf5::File::open(filename)?;
    let data = file.dataset(varname)?;
    let y: ArrayD<A> = data.read_dyn::<A>()?;
    y.into_dimensionality::<D>()
        .map_err(|e| internal(format!("{}: {}", varname, e)))
}

/// Read complex typed ndarray from hdf5 file
///
/// # Errors
/// Errors when file/variable does not exist and
/// when the stored dimensionality differs from `D`.
pub fn read_from_hdf5_complex<A, D, P>(filename: P, varname: &str) -> Result<Array<Complex<A>, D>>
where
    A: H5Type + Num + Clone,
    D: Dimension,
    P: AsRef<Path>,
{
    let r = read_from_hdf5::<A, D, _>(filename.as_ref(), &format!("{}_re", varname))?;
    let i = read_from_hdf5::<A, D, _>(filename.as_ref(), &format!("{}_im", varname))?;
    if r.shape() != i.shape() {
        return Err(internal(format!(
            "{}: real and imaginary parts differ in shape",
            varname
        )));
    }
    let mut array = Array::<Complex<A>, D>::zeros(r.raw_dim());
    let Complex { mut re, mut im } = array.view_mut().split_complex();
    re.assign(&r);
    im.assign(&i);
    Ok(array)
}

/// Write ndarray to hdf5 file
///
/// An existing dataset is overwritten.
///
/// # Errors
/// When file can not be created or when the
/// variable exists with a different shape.
pub fn write_to_hdf5<A, S, D, P>(filename: P, varname: &str, array: &ArrayBase<S, D>) -> Result<()>
where
    A: H5Type,
    S: Data<Elem = A>,
    D: Dimension,
    P: AsRef<Path>,
{
    let file = open_or_create(filename)?;
    let dset = match file.dataset(varname) {
        Ok(dset) => dset,
        Err(..) => file
            .new_dataset::<A>()
            .no_chunk()
            .shape(array.shape())
            .create(varname)?,
    };
    dset.write(&array.view())?;
    Ok(())
}

/// Write complex typed ndarray to hdf5 file
///
/// # Errors
/// When file can not be created or when the
/// variable exists with a different shape.
pub fn write_to_hdf5_complex<A, S, D, P>(
    filename: P,
    varname: &str,
    array: &ArrayBase<S, D>,
) -> Result<()>
where
    A: H5Type + Copy,
    S: Data<Elem = Complex<A>>,
    D: Dimension,
    P: AsRef<Path>,
{
    write_to_hdf5(filename.as_ref(), &format!("{}_re", varname), &array.map(|x| x.re))?;
    write_to_hdf5(filename.as_ref(), &format!("{}_im", varname), &array.map(|x| x.im))?;
    Ok(())
}
