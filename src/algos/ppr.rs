//! Personalized PageRank diffusion.
//!
//! Evaluates the closed form `S = alpha * (I - (1 - alpha) * T)^{-1}`, every
//! column of which is the PPR vector of the corresponding node.  Two methods:
//! dense LU inversion (exact, O(N^3)) and the truncated Neumann series (the
//! scalable substitute).  Both are deterministic, running the same graph and
//! parameters twice yields bit-identical output.

use log::debug;
use nalgebra::DMatrix;

use crate::algos::utils::{check_finite, csr_to_dense};
use crate::errors::DiffusionError;
use crate::progress::KernelProgress;
use crate::transition::Transition;

/// How the PPR closed form is evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PprMethod {
    /// Dense LU inversion of `I - (1 - alpha) T`.
    Exact,
    /// Truncated Neumann expansion `alpha * sum_{n=0}^{K} ((1 - alpha) T)^n`
    /// with `K = iterations`.  The spectral radius of `T` is at most 1, so
    /// the truncation error is bounded by `(1 - alpha)^{K + 1}`.
    Series { iterations: usize },
}

/// Personalized PageRank kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ppr {
    /// Teleport probability, in (0, 1].  `alpha = 1` teleports every step
    /// and the diffusion collapses to the identity.
    pub alpha: f64,
    pub method: PprMethod,
}

impl Default for Ppr {
    fn default() -> Self {
        Ppr {
            alpha: 0.15,
            method: PprMethod::Exact,
        }
    }
}

impl Ppr {
    pub fn validate(&self) -> Result<(), DiffusionError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(DiffusionError::InvalidAlpha(self.alpha));
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
        let diffusion = match self.method {
            PprMethod::Exact => self.invert(transition)?,
            PprMethod::Series { iterations } => self.series(transition, iterations, indicator),
        };
        check_finite(&diffusion)?;
        Ok(diffusion)
    }

    fn invert(&self, transition: &Transition) -> Result<DMatrix<f64>, DiffusionError> {
        let n = transition.len();
        debug!("inverting {}x{} system, alpha = {}", n, n, self.alpha);
        let mut system = csr_to_dense(transition.csr());
        system *= -(1.0 - self.alpha);
        for i in 0..n {
            system[(i, i)] += 1.0;
        }
        let inverse = system
            .try_inverse()
            .ok_or(DiffusionError::SingularSystem { alpha: self.alpha })?;
        Ok(self.alpha * inverse)
    }

    fn series(&self, transition: &Transition, iterations: usize, indicator: bool) -> DMatrix<f64> {
        let n = transition.len();
        let decay = 1.0 - self.alpha;
        // S_0 = alpha * I; S_{k+1} = alpha * I + (1 - alpha) * T * S_k.
        let mut acc = DMatrix::from_diagonal_element(n, n, self.alpha);
        let mut bound = decay;
        let pb = KernelProgress::new(iterations as u64, indicator);
        for _ in 0..iterations {
            let mut next = transition.csr() * &acc;
            next *= decay;
            for i in 0..n {
                next[(i, i)] += self.alpha;
            }
            acc = next;
            bound *= decay;
            pb.status(format!("Residual bound: {:.5e}", bound));
            pb.inc();
        }
        pb.finish();
        acc
    }
}
