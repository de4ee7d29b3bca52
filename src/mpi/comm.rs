//! Collective operations on scalars
//!
//! Distributed arrays are transposed and gathered by the pencil
//! decomposition of `funspace`, see [`crate::operators::Operators2D`].
//! The communicator only reduces and broadcasts scalars.
#[cfg(feature = "mpi")]
use funspace::spaces_mpi::{all_gather_sum, broadcast_scalar};
#[cfg(feature = "mpi")]
use funspace::spaces_mpi::{Communicator, CommunicatorCollectives, Universe};
use std::marker::PhantomData;

/// Communicator of a group of workers
///
/// Either a single process ([`Comm::serial`], the default) or the world
/// of an mpi universe ([`Comm::mpi`], feature `mpi`). Every worker must
/// call the same collectives in the same order.
#[derive(Clone, Copy, Default)]
pub struct Comm<'a> {
    #[cfg(feature = "mpi")]
    universe: Option<&'a Universe>,
    marker: PhantomData<&'a ()>,
}

impl<'a> Comm<'a> {
    /// Single process
    pub fn serial() -> Self {
        Self::default()
    }

    /// True on the worker which writes files
    pub fn is_root(&self) -> bool {
        self.rank() == 0
    }
}

#[cfg(not(feature = "mpi"))]
impl<'a> Comm<'a> {
    /// Index of this worker
    pub fn rank(&self) -> usize {
        0
    }

    /// Number of workers
    pub fn nb_proc(&self) -> usize {
        1
    }

    /// Sum over all workers
    pub fn all_reduce_sum(&self, local: f64) -> f64 {
        local
    }

    /// Elementwise sum over all workers
    pub fn all_reduce_sum_slice(&self, _local: &mut [f64]) {}

    /// Maximum over all workers
    pub fn all_reduce_max(&self, local: f64) -> f64 {
        local
    }

    /// Value of the root worker
    pub fn broadcast_u64(&self, value: u64) -> u64 {
        value
    }
}

#[cfg(feature = "mpi")]
impl<'a> Comm<'a> {
    /// World of an initialized universe
    pub fn mpi(universe: &'a Universe) -> Self {
        Self {
            universe: Some(universe),
            marker: PhantomData,
        }
    }

    /// Mpi universe, `None` for a single process
    pub fn universe(&self) -> Option<&'a Universe> {
        self.universe
    }

    /// Index of this worker
    pub fn rank(&self) -> usize {
        self.universe
            .map_or(0, |universe| universe.world().rank() as usize)
    }

    /// Number of workers
    pub fn nb_proc(&self) -> usize {
        self.universe
            .map_or(1, |universe| universe.world().size() as usize)
    }

    /// Sum over all workers
    pub fn all_reduce_sum(&self, local: f64) -> f64 {
        match self.universe {
            Some(universe) => {
                let mut global = 0.;
                all_gather_sum(universe, &local, &mut global);
                global
            }
            None => local,
        }
    }

    /// Elementwise sum over all workers
    pub fn all_reduce_sum_slice(&self, local: &mut [f64]) {
        if let Some(universe) = self.universe {
            let n = local.len();
            let mut recv = vec![0.; n * self.nb_proc()];
            universe.world().all_gather_into(&local[..], &mut recv[..]);
            for (i, x) in local.iter_mut().enumerate() {
                *x = recv.iter().skip(i).step_by(n).sum();
            }
        }
    }

    /// Maximum over all workers
    pub fn all_reduce_max(&self, local: f64) -> f64 {
        match self.universe {
            Some(universe) => {
                let mut recv = vec![0.; self.nb_proc()];
                universe.world().all_gather_into(&local, &mut recv[..]);
                recv.into_iter().fold(f64::NEG_INFINITY, f64::max)
            }
            None => local,
        }
    }

    /// Value of the root worker
    pub fn broadcast_u64(&self, value: u64) -> u64 {
        let mut value = value;
        if let Some(universe) = self.universe {
            broadcast_scalar(universe, &mut value);
        }
        value
    }
}

impl std::fmt::Debug for Comm<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Comm(rank {} of {})", self.rank(), self.nb_proc())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_serial() {
        let comm = Comm::serial();
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.nb_proc(), 1);
        assert!(comm.is_root());
        assert_eq!(comm.all_reduce_sum(2.5), 2.5);
        assert_eq!(comm.all_reduce_max(-1.), -1.);
        assert_eq!(comm.broadcast_u64(17), 17);
        let mut a = [1., 2.];
        comm.all_reduce_sum_slice(&mut a);
        assert_eq!(a, [1., 2.]);
    }
}
