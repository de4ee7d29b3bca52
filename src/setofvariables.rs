//! # Set of variables
//!
//! Ordered stack of equally shaped arrays addressed by key
//! (e.g. `rot_fft`, `b_fft`), with the vector arithmetic needed
//! by the Runge-Kutta stages.
use crate::error::{Error, Result};
use crate::types::Scalar;
use ndarray::{Array, ArrayBase, Data, Dimension, Zip};
use std::ops::Mul;

/// Named arrays of identical shape
#[derive(Clone, Debug, PartialEq)]
pub struct SetOfVariables<A, D: Dimension> {
    keys: Vec<String>,
    vars: Vec<Array<A, D>>,
}

impl<A: Scalar, D: Dimension> SetOfVariables<A, D> {
    /// Zero initialized variables of shape `dim`
    ///
    /// ```
    /// use fluidspec::setofvariables::SetOfVariables;
    /// use ndarray::Ix2;
    /// let sov = SetOfVariables::<f64, _>::zeros(&["ux", "uy"], Ix2(4, 3));
    /// assert_eq!(sov.nvar(), 2);
    /// assert_eq!(sov.shape(), &[4, 3]);
    /// ```
    pub fn zeros(keys: &[&str], dim: D) -> Self {
        Self {
            keys: keys.iter().map(|k| (*k).to_owned()).collect(),
            vars: keys.iter().map(|_| Array::zeros(dim.clone())).collect(),
        }
    }

    /// Build from arrays, one per key
    ///
    /// # Errors
    /// Number of keys and arrays differ, or arrays differ in shape.
    pub fn from_arrays(keys: &[&str], vars: Vec<Array<A, D>>) -> Result<Self> {
        if keys.len() != vars.len() || vars.is_empty() {
            return Err(Error::Config(format!(
                "{} keys for {} arrays",
                keys.len(),
                vars.len()
            )));
        }
        for v in &vars[1..] {
            if v.shape() != vars[0].shape() {
                return Err(Error::shape(vars[0].shape(), v.shape()));
            }
        }
        Ok(Self {
            keys: keys.iter().map(|k| (*k).to_owned()).collect(),
            vars,
        })
    }

    /// Same keys and shape, zero values
    pub fn zeros_like(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            vars: self.vars.iter().map(|v| Array::zeros(v.raw_dim())).collect(),
        }
    }

    /// Keys in storage order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of variables
    pub fn nvar(&self) -> usize {
        self.keys.len()
    }

    /// Shape shared by all variables
    pub fn shape(&self) -> &[usize] {
        self.vars.first().map_or(&[][..], |v| v.shape())
    }

    /// True if `key` is part of the set
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    fn index(&self, key: &str) -> Result<usize> {
        self.keys
            .iter()
            .position(|k| k == key)
            .ok_or_else(|| Error::UnknownVariable(key.to_owned()))
    }

    /// Variable by key
    ///
    /// # Errors
    /// Unknown key.
    pub fn get_var(&self, key: &str) -> Result<&Array<A, D>> {
        let i = self.index(key)?;
        Ok(&self.vars[i])
    }

    /// Mutable variable by key
    ///
    /// # Errors
    /// Unknown key.
    pub fn get_var_mut(&mut self, key: &str) -> Result<&mut Array<A, D>> {
        let i = self.index(key)?;
        Ok(&mut self.vars[i])
    }

    /// Overwrite a variable
    ///
    /// # Errors
    /// Unknown key or shape mismatch.
    pub fn set_var<S: Data<Elem = A>>(&mut self, key: &str, value: &ArrayBase<S, D>) -> Result<()> {
        let var = self.get_var_mut(key)?;
        if var.shape() != value.shape() {
            return Err(Error::shape(var.shape(), value.shape()));
        }
        var.assign(value);
        Ok(())
    }

    /// Iterate over (key, variable)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array<A, D>)> {
        self.keys.iter().map(String::as_str).zip(self.vars.iter())
    }

    /// Iterate over mutable variables
    pub fn vars_mut(&mut self) -> impl Iterator<Item = &mut Array<A, D>> {
        self.vars.iter_mut()
    }

    fn check_conform(&self, other: &Self) -> Result<()> {
        if self.keys != other.keys {
            return Err(Error::Config(format!(
                "sets of variables differ in keys: {:?} and {:?}",
                self.keys, other.keys
            )));
        }
        if self.shape() != other.shape() {
            return Err(Error::shape(self.shape(), other.shape()));
        }
        Ok(())
    }

    /// Copy values of `other`
    ///
    /// # Errors
    /// Keys or shapes differ.
    pub fn assign(&mut self, other: &Self) -> Result<()> {
        self.check_conform(other)?;
        for (v, o) in self.vars.iter_mut().zip(other.vars.iter()) {
            v.assign(o);
        }
        Ok(())
    }

    /// `self += a * x`
    ///
    /// # Errors
    /// Keys or shapes differ.
    pub fn axpy(&mut self, a: f64, x: &Self) -> Result<()> {
        self.check_conform(x)?;
        for (v, xv) in self.vars.iter_mut().zip(x.vars.iter()) {
            Zip::from(v).and(xv).for_each(|v, &x| *v += x * a);
        }
        Ok(())
    }

    /// `self += a * factor * x` with a real factor per grid point
    ///
    /// # Errors
    /// Keys or shapes differ.
    pub fn axpy_with_factor<S>(&mut self, a: f64, factor: &ArrayBase<S, D>, x: &Self) -> Result<()>
    where
        S: Data<Elem = f64>,
    {
        self.check_conform(x)?;
        self.check_factor(factor)?;
        for (v, xv) in self.vars.iter_mut().zip(x.vars.iter()) {
            Zip::from(v)
                .and(xv)
                .and(factor)
                .for_each(|v, &x, &f| *v += x * (a * f));
        }
        Ok(())
    }

    /// `self + other` as a new set
    ///
    /// # Errors
    /// Keys or shapes differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        let mut out = self.clone();
        out.axpy(1., other)?;
        Ok(out)
    }

    /// Multiply every variable by a scalar
    pub fn scale(&mut self, a: f64) {
        for v in &mut self.vars {
            v.map_inplace(|x| *x *= a);
        }
    }

    /// Multiply every variable elementwise by a real factor
    ///
    /// # Errors
    /// Shape of `factor` differs.
    pub fn mul_factor<S: Data<Elem = f64>>(&mut self, factor: &ArrayBase<S, D>) -> Result<()> {
        self.check_factor(factor)?;
        for v in &mut self.vars {
            Zip::from(v).and(factor).for_each(|v, &f| *v *= f);
        }
        Ok(())
    }

    fn check_factor<S: Data<Elem = f64>>(&self, factor: &ArrayBase<S, D>) -> Result<()> {
        if factor.shape() == self.shape() {
            Ok(())
        } else {
            Err(Error::shape(self.shape(), factor.shape()))
        }
    }

    /// Set all values to zero
    pub fn fill_zero(&mut self) {
        for v in &mut self.vars {
            v.fill(A::zero());
        }
    }

    /// True if no value is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.vars.iter().all(|v| v.iter().all(Scalar::is_finite))
    }
}

impl<A: Scalar, D: Dimension> Mul<f64> for &SetOfVariables<A, D> {
    type Output = SetOfVariables<A, D>;

    fn mul(self, rhs: f64) -> Self::Output {
        let mut out = self.clone();
        out.scale(rhs);
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{array, Array0, Ix2};
    use num_complex::Complex;

    #[test]
    fn test_get_set_var() {
        let mut sov = SetOfVariables::<f64, _>::zeros(&["ux", "uy"], Ix2(2, 2));
        sov.set_var("uy", &array![[1., 2.], [3., 4.]]).unwrap();
        assert_eq!(sov.get_var("uy").unwrap()[[1, 0]], 3.);
        assert!(matches!(
            sov.get_var("eta"),
            Err(Error::UnknownVariable(k)) if k == "eta"
        ));
        assert!(matches!(
            sov.set_var("ux", &array![[1., 2., 3.]]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_axpy_and_factor() {
        let mut a = SetOfVariables::from_arrays(
            &["rot_fft"],
            vec![array![[Complex::new(1., 1.), Complex::new(2., 0.)]]],
        )
        .unwrap();
        let b = a.clone();
        a.axpy(2., &b).unwrap();
        assert_eq!(a.get_var("rot_fft").unwrap()[[0, 0]], Complex::new(3., 3.));
        a.mul_factor(&array![[0.5, 0.]]).unwrap();
        assert_eq!(a.get_var("rot_fft").unwrap()[[0, 0]], Complex::new(1.5, 1.5));
        assert_eq!(a.get_var("rot_fft").unwrap()[[0, 1]], Complex::new(0., 0.));
        a.axpy_with_factor(1., &array![[2., 1.]], &b).unwrap();
        assert_eq!(a.get_var("rot_fft").unwrap()[[0, 0]], Complex::new(3.5, 3.5));
        assert_eq!(a.get_var("rot_fft").unwrap()[[0, 1]], Complex::new(2., 0.));
    }

    #[test]
    fn test_ops_0d() {
        let x = SetOfVariables::from_arrays(
            &["X", "Y", "Z"],
            vec![Array0::from_elem((), 1.), Array0::from_elem((), 2.), Array0::from_elem((), 3.)],
        )
        .unwrap();
        let y = (&x * 2.).checked_add(&x).unwrap();
        assert_eq!(y.get_var("Z").unwrap()[()], 9.);
        assert!(y.is_finite());
        let mut z = y.zeros_like();
        z.get_var_mut("X").unwrap()[()] = f64::NAN;
        assert!(!z.is_finite());
    }

    #[test]
    fn test_conform_error() {
        let mut a = SetOfVariables::<f64, _>::zeros(&["ux"], Ix2(2, 2));
        let b = SetOfVariables::<f64, _>::zeros(&["uy"], Ix2(2, 2));
        assert!(a.axpy(1., &b).is_err());
        assert!(matches!(a.checked_add(&b), Err(Error::Config(_))));
        let c = SetOfVariables::<f64, _>::zeros(&["ux"], Ix2(2, 3));
        assert!(matches!(a.checked_add(&c), Err(Error::ShapeMismatch { .. })));
        assert_eq!(a.checked_add(&a).unwrap(), a);
    }
}
