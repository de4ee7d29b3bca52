//! # State
//!
//! The evolved variables (`state_spect`) and the physical variables
//! derived from them (`state_phys`). The physical variables are only
//! recomputed when the evolved ones changed since the last request.
use crate::error::Result;
use crate::setofvariables::SetOfVariables;
use crate::types::Scalar;
use ndarray::Dimension;

/// State of a simulation
#[derive(Clone, Debug)]
pub struct State<A, D: Dimension> {
    state_spect: SetOfVariables<A, D>,
    state_phys: SetOfVariables<f64, D>,
    phys_is_fresh: bool,
}

impl<A: Scalar, D: Dimension> State<A, D> {
    /// New state, the physical variables are marked outdated
    pub fn new(state_spect: SetOfVariables<A, D>, state_phys: SetOfVariables<f64, D>) -> Self {
        Self {
            state_spect,
            state_phys,
            phys_is_fresh: false,
        }
    }

    /// Evolved variables
    pub fn state_spect(&self) -> &SetOfVariables<A, D> {
        &self.state_spect
    }

    /// Mutable evolved variables, outdates the physical variables
    pub fn state_spect_mut(&mut self) -> &mut SetOfVariables<A, D> {
        self.phys_is_fresh = false;
        &mut self.state_spect
    }

    /// True if `state_phys` reflects `state_spect`
    pub fn is_phys_fresh(&self) -> bool {
        self.phys_is_fresh
    }

    /// Physical variables, recomputed with `compute` if outdated
    ///
    /// # Errors
    /// Propagates the error of `compute`.
    pub fn state_phys_with<F>(&mut self, compute: F) -> Result<&SetOfVariables<f64, D>>
    where
        F: FnOnce(&SetOfVariables<A, D>) -> Result<SetOfVariables<f64, D>>,
    {
        if !self.phys_is_fresh {
            self.state_phys = compute(&self.state_spect)?;
            self.phys_is_fresh = true;
        }
        Ok(&self.state_phys)
    }

    /// Last computed physical variables, possibly outdated
    pub fn state_phys_cached(&self) -> &SetOfVariables<f64, D> {
        &self.state_phys
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Ix1;

    #[test]
    fn test_freshness() {
        let spect = SetOfVariables::<f64, _>::zeros(&["a"], Ix1(3));
        let mut state = State::new(spect.clone(), spect);
        let mut calls = 0;
        let mut compute = |s: &SetOfVariables<f64, Ix1>| -> Result<SetOfVariables<f64, Ix1>> {
            calls += 1;
            Ok(s * 2.)
        };
        state.state_phys_with(&mut compute).unwrap();
        state.state_phys_with(&mut compute).unwrap();
        assert!(state.is_phys_fresh());
        state.state_spect_mut().get_var_mut("a").unwrap()[1] = 1.;
        assert!(!state.is_phys_fresh());
        let phys = state.state_phys_with(&mut compute).unwrap();
        assert_eq!(phys.get_var("a").unwrap()[1], 2.);
        assert_eq!(calls, 2);
    }
}
