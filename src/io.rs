//! # Input / output
//! `Hdf5` helpers to read and write ndarrays, complex arrays
//! are stored as two datasets `<name>_re` and `<name>_im`. Errors of
//! `hdf5` are returned as [`crate::Error::Hdf5`].
pub mod read_write_hdf5;
pub use hdf5::H5Type;
pub use read_write_hdf5::{read_from_hdf5, read_from_hdf5_complex};
pub use read_write_hdf5::{read_scalar_from_hdf5, write_scalar_to_hdf5};
pub use read_write_hdf5::{write_to_hdf5, write_to_hdf5_complex};
