//! # Time stepping
//!
//! Explicit Runge-Kutta schemes (RK2, RK4) for
//!
//! `da/dt = N(a) - freq_lin a`
//!
//! The linear term is integrated exactly with the factors
//! `exp(-dt freq_lin)` and `exp(-dt/2 freq_lin)`. The nonlinear
//! tendencies `N` (forcing included) are supplied by a closure.
use crate::error::{Error, Result};
use crate::params::TimeSteppingParams;
use crate::setofvariables::SetOfVariables;
use crate::types::Scalar;
use ndarray::{Array, Dimension};
use std::str::FromStr;

/// Hard cap on the number of time steps
pub const MAX_TIMESTEP: usize = 10_000_000;

/// Relative change of the CFL time step below which the step is kept
const CFL_TOLERANCE: f64 = 0.02;

/// Runge-Kutta scheme
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeScheme {
    /// Heun / midpoint second order
    RK2,
    /// Classical fourth order
    RK4,
}

impl TimeScheme {
    /// Default CFL coefficient
    pub fn default_cfl_coef(&self) -> f64 {
        match self {
            Self::RK2 => 0.4,
            Self::RK4 => 1.0,
        }
    }
}

impl FromStr for TimeScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RK2" => Ok(Self::RK2),
            "RK4" => Ok(Self::RK4),
            _ => Err(Error::UnknownTimeScheme(s.to_owned())),
        }
    }
}

/// Stepping status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Not started
    Idle,
    /// Inside the stepping loop
    Stepping,
    /// Terminated (end reached or error)
    Finished,
}

/// Time, time step and Runge-Kutta stages of a simulation
#[derive(Clone, Debug)]
pub struct TimeStepping<D: Dimension> {
    /// Simulation time
    pub t: f64,
    /// Number of completed time steps
    pub it: usize,
    /// Current time step
    pub deltat: f64,
    /// Stepping status
    pub status: Status,
    /// Scheme
    pub scheme: TimeScheme,
    params: TimeSteppingParams,
    cfl_coef: f64,
    freq_lin: Array<f64, D>,
    exact: Array<f64, D>,
    exact2: Array<f64, D>,
    deltat_exact: f64,
}

impl<D: Dimension> TimeStepping<D> {
    /// Time stepping of a system with linear frequencies `freq_lin`
    ///
    /// # Errors
    /// Invalid parameters or unknown scheme.
    pub fn new(params: &TimeSteppingParams, freq_lin: Array<f64, D>) -> Result<Self> {
        params.validate()?;
        let scheme = params.type_time_scheme.parse::<TimeScheme>()?;
        let cfl_coef = params.cfl_coef.unwrap_or_else(|| scheme.default_cfl_coef());
        let deltat = params.deltat0;
        let exact = freq_lin.mapv(|f| (-deltat * f).exp());
        let exact2 = freq_lin.mapv(|f| (-deltat / 2. * f).exp());
        Ok(Self {
            t: 0.,
            it: 0,
            deltat,
            status: Status::Idle,
            scheme,
            params: params.clone(),
            cfl_coef,
            freq_lin,
            exact,
            exact2,
            deltat_exact: deltat,
        })
    }

    /// True if a termination condition holds
    pub fn is_finished(&self) -> bool {
        if self.status == Status::Finished || self.it >= MAX_TIMESTEP {
            return true;
        }
        if self.params.use_t_end {
            self.t + self.deltat * 1e-4 >= self.params.t_end
        } else {
            self.it >= self.params.it_end
        }
    }

    /// Time step of the coming step
    ///
    /// With `use_cfl`, `deltat = cfl_coef / freq_cfl` bounded by `deltat_max`,
    /// changed only if it differs by more than 2 %. The step is shortened
    /// to land on `t_end`.
    pub fn compute_deltat(&mut self, freq_cfl: Option<f64>) {
        if self.params.use_cfl {
            if let Some(freq) = freq_cfl {
                let deltat_cfl = if freq > 0. && freq.is_finite() {
                    (self.cfl_coef / freq).min(self.params.deltat_max)
                } else {
                    self.params.deltat_max
                };
                if ((deltat_cfl - self.deltat) / self.deltat).abs() > CFL_TOLERANCE {
                    log::debug!(
                        "it = {}: deltat {:.4e} -> {:.4e}",
                        self.it,
                        self.deltat,
                        deltat_cfl
                    );
                    self.deltat = deltat_cfl;
                }
            }
        }
        if self.params.use_t_end {
            let remaining = self.params.t_end - self.t;
            if remaining > 0. && remaining < self.deltat * (1. - 1e-4) {
                self.deltat = remaining;
            }
        }
    }

    fn update_exact(&mut self) {
        if self.deltat != self.deltat_exact {
            let dt = self.deltat;
            self.exact = self.freq_lin.mapv(|f| (-dt * f).exp());
            self.exact2 = self.freq_lin.mapv(|f| (-dt / 2. * f).exp());
            self.deltat_exact = dt;
        }
    }

    fn check_finite<A: Scalar>(&mut self, s: &SetOfVariables<A, D>) -> Result<()> {
        if s.is_finite() {
            Ok(())
        } else {
            self.status = Status::Finished;
            log::warn!("numerical divergence at t = {:.4}, it = {}", self.t, self.it);
            Err(Error::NumericalDivergence {
                t: self.t,
                it: self.it,
            })
        }
    }

    /// Advance `state` by one time step, then `t` and `it`
    ///
    /// `tendencies` returns the nonlinear tendencies (forcing included)
    /// of a stage state.
    ///
    /// # Errors
    /// Non-finite stage or final state (`NumericalDivergence`, the
    /// status becomes `Finished`), or errors of `tendencies`.
    pub fn step<A, F>(&mut self, state: &mut SetOfVariables<A, D>, tendencies: F) -> Result<()>
    where
        A: Scalar,
        F: FnMut(&SetOfVariables<A, D>) -> Result<SetOfVariables<A, D>>,
    {
        self.update_exact();
        match self.scheme {
            TimeScheme::RK2 => self.step_rk2(state, tendencies)?,
            TimeScheme::RK4 => self.step_rk4(state, tendencies)?,
        }
        self.check_finite(state)?;
        self.t += self.deltat;
        self.it += 1;
        Ok(())
    }

    fn step_rk2<A, F>(&mut self, state: &mut SetOfVariables<A, D>, mut tendencies: F) -> Result<()>
    where
        A: Scalar,
        F: FnMut(&SetOfVariables<A, D>) -> Result<SetOfVariables<A, D>>,
    {
        let dt = self.deltat;

        let tendencies_n = tendencies(&*state)?;
        let mut state_n12 = state.clone();
        state_n12.axpy(dt / 2., &tendencies_n)?;
        state_n12.mul_factor(&self.exact2)?;
        self.check_finite(&state_n12)?;

        let tendencies_n12 = tendencies(&state_n12)?;
        state.mul_factor(&self.exact)?;
        state.axpy_with_factor(dt, &self.exact2, &tendencies_n12)?;
        Ok(())
    }

    fn step_rk4<A, F>(&mut self, state: &mut SetOfVariables<A, D>, mut tendencies: F) -> Result<()>
    where
        A: Scalar,
        F: FnMut(&SetOfVariables<A, D>) -> Result<SetOfVariables<A, D>>,
    {
        let dt = self.deltat;

        // stage 0
        let tendencies_0 = tendencies(&*state)?;
        let mut state_temp = state.clone();
        state_temp.axpy(dt / 6., &tendencies_0)?;
        state_temp.mul_factor(&self.exact)?;

        // stage 1
        let mut state_np12_approx1 = state.clone();
        state_np12_approx1.axpy(dt / 2., &tendencies_0)?;
        state_np12_approx1.mul_factor(&self.exact2)?;
        self.check_finite(&state_np12_approx1)?;
        let tendencies_1 = tendencies(&state_np12_approx1)?;
        state_temp.axpy_with_factor(dt / 3., &self.exact2, &tendencies_1)?;

        // stage 2
        let mut state_np12_approx2 = state.clone();
        state_np12_approx2.mul_factor(&self.exact2)?;
        state_np12_approx2.axpy(dt / 2., &tendencies_1)?;
        self.check_finite(&state_np12_approx2)?;
        let tendencies_2 = tendencies(&state_np12_approx2)?;
        state_temp.axpy_with_factor(dt / 3., &self.exact2, &tendencies_2)?;

        // stage 3
        let mut state_np1_approx = state.clone();
        state_np1_approx.mul_factor(&self.exact)?;
        state_np1_approx.axpy_with_factor(dt, &self.exact2, &tendencies_2)?;
        self.check_finite(&state_np1_approx)?;
        let tendencies_3 = tendencies(&state_np1_approx)?;
        state_temp.axpy(dt / 6., &tendencies_3)?;

        state.assign(&state_temp)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array0, Array1, Ix0, Ix1};

    fn params(scheme: &str) -> TimeSteppingParams {
        TimeSteppingParams {
            use_cfl: false,
            deltat0: 0.1,
            t_end: 1.,
            type_time_scheme: scheme.to_owned(),
            ..TimeSteppingParams::default()
        }
    }

    fn scalar_state(value: f64) -> SetOfVariables<f64, Ix0> {
        SetOfVariables::from_arrays(&["a"], vec![Array0::from_elem((), value)]).unwrap()
    }

    #[test]
    fn test_unknown_scheme() {
        let p = params("Euler");
        assert!(matches!(
            TimeStepping::new(&p, Array0::zeros(())),
            Err(Error::UnknownTimeScheme(_))
        ));
    }

    #[test]
    fn test_rk4_exponential_growth() {
        // da/dt = a
        let mut ts = TimeStepping::new(&params("RK4"), Array0::zeros(())).unwrap();
        let mut state = scalar_state(1.);
        while !ts.is_finished() {
            ts.compute_deltat(None);
            ts.step(&mut state, |s| Ok(s.clone())).unwrap();
        }
        assert_eq!(ts.it, 10);
        assert_relative_eq!(state.get_var("a").unwrap()[()], 1f64.exp(), max_relative = 1e-5);
    }

    #[test]
    fn test_rk2_order() {
        let mut ts = TimeStepping::new(&params("RK2"), Array0::zeros(())).unwrap();
        let mut state = scalar_state(1.);
        while !ts.is_finished() {
            ts.step(&mut state, |s| Ok(s * -1.)).unwrap();
        }
        assert_relative_eq!(state.get_var("a").unwrap()[()], (-1f64).exp(), max_relative = 5e-3);
    }

    #[test]
    fn test_integrating_factor_is_exact() {
        let freq = Array1::from(vec![0., 1., 10.]);
        let mut ts = TimeStepping::new(&params("RK4"), freq.clone()).unwrap();
        let mut state =
            SetOfVariables::from_arrays(&["a"], vec![Array1::from_elem(3, 2.)]).unwrap();
        for _ in 0..5 {
            ts.step(&mut state, |s| Ok(s.zeros_like())).unwrap();
        }
        let a = state.get_var("a").unwrap();
        for (v, f) in a.iter().zip(freq.iter()) {
            assert_relative_eq!(*v, 2. * (-0.5 * f).exp(), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_termination_t_end() {
        let p = TimeSteppingParams {
            t_end: 0.5,
            ..params("RK4")
        };
        let mut ts = TimeStepping::<Ix0>::new(&p, Array0::zeros(())).unwrap();
        let mut state = scalar_state(0.);
        while !ts.is_finished() {
            ts.compute_deltat(None);
            ts.step(&mut state, |s| Ok(s.zeros_like())).unwrap();
        }
        assert_eq!(ts.it, 5);
        assert_relative_eq!(ts.t, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_last_step_lands_on_t_end() {
        let p = TimeSteppingParams {
            t_end: 0.25,
            ..params("RK2")
        };
        let mut ts = TimeStepping::<Ix0>::new(&p, Array0::zeros(())).unwrap();
        let mut state = scalar_state(0.);
        while !ts.is_finished() {
            ts.compute_deltat(None);
            ts.step(&mut state, |s| Ok(s.zeros_like())).unwrap();
        }
        assert_eq!(ts.it, 3);
        assert_relative_eq!(ts.t, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_termination_it_end() {
        let p = TimeSteppingParams {
            use_t_end: false,
            it_end: 7,
            ..params("RK4")
        };
        let mut ts = TimeStepping::<Ix0>::new(&p, Array0::zeros(())).unwrap();
        let mut state = scalar_state(0.);
        while !ts.is_finished() {
            ts.step(&mut state, |s| Ok(s.zeros_like())).unwrap();
        }
        assert_eq!(ts.it, 7);
    }

    #[test]
    fn test_cfl() {
        let p = TimeSteppingParams {
            use_cfl: true,
            deltat0: 0.1,
            deltat_max: 0.5,
            cfl_coef: Some(0.5),
            ..params("RK4")
        };
        let mut ts = TimeStepping::<Ix0>::new(&p, Array0::zeros(())).unwrap();
        ts.compute_deltat(Some(10.));
        assert_relative_eq!(ts.deltat, 0.05);
        // less than 2 % change: kept
        ts.compute_deltat(Some(10.1));
        assert_relative_eq!(ts.deltat, 0.05);
        // bounded by deltat_max
        ts.compute_deltat(Some(0.));
        assert_relative_eq!(ts.deltat, 0.5);
    }

    #[test]
    fn test_divergence() {
        let mut ts = TimeStepping::<Ix1>::new(&params("RK4"), Array1::zeros(2)).unwrap();
        let mut state =
            SetOfVariables::from_arrays(&["a"], vec![Array1::from(vec![1., f64::NAN])]).unwrap();
        let result = ts.step(&mut state, |s| Ok(s.clone()));
        assert!(matches!(result, Err(Error::NumericalDivergence { it: 0, .. })));
        assert_eq!(ts.status, Status::Finished);
        assert!(ts.is_finished());
    }
}
