//! Pencil decomposition of the physical and spectral grids
use crate::error::{Error, Result};
use ndarray::{s, Array2, ArrayBase, Data, Ix2};

/// Contiguous blocks of one axis distributed over the workers
///
/// The first workers hold `n / nb_proc` indices, the last
/// `n % nb_proc` workers one index more (the distribution of
/// `funspace::spaces_mpi::Decomp2d`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slab {
    /// Global number of indices
    pub n_global: usize,
    /// Indices held by every worker
    pub counts: Vec<usize>,
    /// First global index of this worker
    pub start: usize,
    /// One past the last global index of this worker
    pub end: usize,
}

impl Slab {
    fn new(n_global: usize, nb_proc: usize, rank: usize, name: &str) -> Result<Self> {
        if n_global < nb_proc {
            return Err(Error::Config(format!(
                "{} = {} can not be split over {} workers",
                name, n_global, nb_proc
            )));
        }
        let n_short = nb_proc - n_global % nb_proc;
        let counts: Vec<usize> = (0..nb_proc)
            .map(|r| n_global / nb_proc + usize::from(r >= n_short))
            .collect();
        let start: usize = counts[..rank].iter().sum();
        let end = start + counts[rank];
        Ok(Self {
            n_global,
            counts,
            start,
            end,
        })
    }

    /// Number of local indices
    pub fn n_local(&self) -> usize {
        self.end - self.start
    }

    /// True if the global index is held by this worker
    pub fn contains(&self, i_global: usize) -> bool {
        (self.start..self.end).contains(&i_global)
    }
}

/// Distribution of a 2D grid over the workers
///
/// Physical arrays `(nx, ny)` are y-pencils, split along axis 0 into
/// rows. Spectral arrays `(nx, ny / 2 + 1)` are x-pencils, split along
/// axis 1 into columns: every worker holds all `kx` of some `ky`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decomp {
    /// Rank of this worker
    pub rank: usize,
    /// Number of workers
    pub nb_proc: usize,
    /// Rows of the physical grid
    pub phys: Slab,
    /// Columns of the spectral grid
    pub spec: Slab,
}

impl Decomp {
    /// Decompose a grid of `nx` rows and `nky` spectral columns
    ///
    /// # Errors
    /// Some worker would hold no row or column, or `rank >= nb_proc`.
    pub fn new(nx: usize, nky: usize, nb_proc: usize, rank: usize) -> Result<Self> {
        if nb_proc == 0 || rank >= nb_proc {
            return Err(Error::Config(format!(
                "invalid rank {} for {} workers",
                rank, nb_proc
            )));
        }
        Ok(Self {
            rank,
            nb_proc,
            phys: Slab::new(nx, nb_proc, rank, "nx")?,
            spec: Slab::new(nky, nb_proc, rank, "ny / 2 + 1")?,
        })
    }

    /// True if this worker holds the zero wavenumber (spectral column 0)
    pub fn owns_zero_mode(&self) -> bool {
        self.spec.contains(0)
    }

    /// Local columns of a global spectral array
    pub fn local_columns<A, S>(&self, global: &ArrayBase<S, Ix2>) -> Array2<A>
    where
        A: Clone,
        S: Data<Elem = A>,
    {
        global
            .slice(s![.., self.spec.start..self.spec.end])
            .to_owned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decomp_counts() {
        let decomps: Vec<Decomp> = (0..3).map(|r| Decomp::new(10, 5, 3, r).unwrap()).collect();
        // remainder on the last workers
        assert_eq!(decomps[0].phys.counts, vec![3, 3, 4]);
        assert_eq!(decomps[0].spec.counts, vec![1, 2, 2]);
        assert_eq!((decomps[1].phys.start, decomps[1].phys.end), (3, 6));
        assert_eq!((decomps[2].phys.start, decomps[2].phys.end), (6, 10));
        assert_eq!((decomps[2].spec.start, decomps[2].spec.end), (3, 5));
        assert!(decomps[0].owns_zero_mode());
        assert!(!decomps[1].owns_zero_mode());
        assert!(!decomps[2].owns_zero_mode());
    }

    #[test]
    fn test_decomp_too_many_workers() {
        assert!(Decomp::new(8, 2, 3, 0).is_err());
        assert!(Decomp::new(2, 5, 3, 0).is_err());
        assert!(Decomp::new(8, 5, 2, 2).is_err());
    }

    #[test]
    fn test_local_columns() {
        let global = Array2::from_shape_fn((5, 3), |(i, j)| (10 * i + j) as f64);
        let decomp = Decomp::new(5, 3, 2, 1).unwrap();
        assert_eq!((decomp.phys.start, decomp.phys.n_local()), (2, 3));
        let columns = decomp.local_columns(&global);
        assert_eq!(columns.shape(), &[5, 2]);
        assert_eq!(columns[[4, 0]], 41.);
    }
}
