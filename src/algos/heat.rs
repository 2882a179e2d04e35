//! Heat kernel diffusion.
//!
//! Evaluates `S = exp(-t * (I - T)) = e^{-t} * e^{t T}`, the continuous-time
//! diffusion of unit mass for time `t`.  Three methods: the plain Taylor
//! expansion, a Chebyshev expansion with modified Bessel coefficients that
//! stays better conditioned at larger `t`, and an eigendecomposition route
//! that is exact up to factorization error but requires a symmetric operator.

use nalgebra::DMatrix;
use special_fun::FloatSpecial;

use crate::algos::utils::{check_finite, csr_to_dense};
use crate::errors::DiffusionError;
use crate::progress::KernelProgress;
use crate::transition::{Transition, TransitionKind};

/// How the matrix exponential is evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeatMethod {
    /// `e^{-t} * sum_{n=0}^{order} t^n / n! * T^n`.
    Taylor { order: usize },
    /// `e^{-t} * (I_0(t) + 2 * sum_{n=1}^{order} I_n(t) * T_n(T))` where
    /// `T_n` are Chebyshev polynomials and `I_n` modified Bessel functions.
    Chebyshev { order: usize },
    /// `Q * diag(e^{-t (1 - lambda_i)}) * Q^T` from the symmetric
    /// eigendecomposition `T = Q * diag(lambda) * Q^T`.
    Eigen,
}

/// Heat kernel configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heat {
    /// Diffusion time, finite and non-negative.  `t = 0` is the identity.
    pub t: f64,
    pub method: HeatMethod,
}

impl Default for Heat {
    fn default() -> Self {
        Heat {
            t: 5.0,
            method: HeatMethod::Chebyshev { order: 32 },
        }
    }
}

impl Heat {
    pub fn validate(&self) -> Result<(), DiffusionError> {
        if !(self.t >= 0.0 && self.t.is_finite()) {
            return Err(DiffusionError::InvalidDiffusionTime(self.t));
        }
        match self.method {
            HeatMethod::Taylor { order } | HeatMethod::Chebyshev { order } => {
                // Both coefficient sequences only start decaying past n = t.
                if (order as f64) <= self.t {
                    return Err(DiffusionError::SeriesOrderTooSmall { order, t: self.t });
                }
            }
            HeatMethod::Eigen => {}
        }
        Ok(())
    }

    /// Computes the dense diffusion matrix over `transition`.
    pub fn compute(
        &self,
        transition: &Transition,
        indicator: bool,
    ) -> Result<DMatrix<f64>, DiffusionError> {
        self.validate()?;
        // The kind label alone does not guarantee symmetry: directed
        // adjacency stays asymmetric under the symmetric scaling, and
        // symmetric_eigen would silently read one triangle of it.
        if matches!(self.method, HeatMethod::Eigen)
            && (transition.kind() != TransitionKind::Symmetric || !transition.is_symmetric())
        {
            return Err(DiffusionError::EigenNeedsSymmetric);
        }
        let diffusion = match self.method {
            HeatMethod::Taylor { order } => self.taylor(transition, order, indicator),
            HeatMethod::Chebyshev { order } => self.chebyshev(transition, order, indicator),
            HeatMethod::Eigen => self.eigen(transition),
        };
        check_finite(&diffusion)?;
        Ok(diffusion)
    }

    fn taylor(&self, transition: &Transition, order: usize, indicator: bool) -> DMatrix<f64> {
        let n = transition.len();
        let mut coeff = (-self.t).exp();
        let mut power = DMatrix::identity(n, n);
        let mut acc = coeff * &power;
        let pb = KernelProgress::new(order as u64, indicator);
        for term in 1..=order {
            power = transition.csr() * &power;
            coeff *= self.t / term as f64;
            acc += coeff * &power;
            pb.status(format!("Coefficient: {:.5e}", coeff));
            pb.inc();
        }
        pb.finish();
        acc
    }

    fn chebyshev(&self, transition: &Transition, order: usize, indicator: bool) -> DMatrix<f64> {
        let n = transition.len();
        let scale = (-self.t).exp();
        let mut prev = DMatrix::identity(n, n);
        let mut curr = csr_to_dense(transition.csr());
        let mut acc = (scale * i0(self.t)) * &prev;
        acc += (2.0 * scale * i1(self.t)) * &curr;
        let pb = KernelProgress::new(order as u64, indicator);
        for term in 2..=order {
            // T_{n+1}(T) = 2 * T * T_n(T) - T_{n-1}(T)
            let mut next = transition.csr() * &curr;
            next *= 2.0;
            next -= &prev;
            acc += (2.0 * scale * iv(term as f64, self.t)) * &next;
            prev = curr;
            curr = next;
            pb.inc();
        }
        pb.finish();
        acc
    }

    fn eigen(&self, transition: &Transition) -> DMatrix<f64> {
        // symmetric_eigen cannot factor the 0 x 0 matrix.
        if transition.is_empty() {
            return DMatrix::zeros(0, 0);
        }
        let eigen = csr_to_dense(transition.csr()).symmetric_eigen();
        let decayed = eigen.eigenvalues.map(|l| (-self.t * (1.0 - l)).exp());
        &eigen.eigenvectors * DMatrix::from_diagonal(&decayed) * eigen.eigenvectors.transpose()
    }
}

/// Modified Bessel function of the first kind, order 0
fn i0(v: f64) -> f64 {
    v.besseli(0.0)
}

/// Modified Bessel function of the first kind, order 1
fn i1(v: f64) -> f64 {
    v.besseli(1.0)
}

/// Modified Bessel function of the first kind, real order n
fn iv(n: f64, v: f64) -> f64 {
    v.besseli(n)
}
