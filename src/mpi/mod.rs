//! Process topology
//!
//! Physical arrays are y-pencils and spectral arrays x-pencils, see
//! [`Decomp`]. With feature `mpi` the transforms between them run on
//! the pencil decomposition of `funspace`, scalar collectives are routed
//! through [`Comm`].
pub mod comm;
pub mod decomp;
pub use comm::Comm;
pub use decomp::{Decomp, Slab};
#[cfg(feature = "mpi")]
pub use funspace::spaces_mpi::{initialize, BaseSpaceMpi, Space2 as Space2Mpi, Universe};
