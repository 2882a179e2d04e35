//! The end-to-end pipeline: transition, kernel, sparsify, renormalize,
//! assemble.

use log::{debug, info};

use crate::algos::assemble::{assemble, DiffusionEdges, MergePolicy};
use crate::algos::heat::{Heat, HeatMethod};
use crate::algos::ppr::Ppr;
use crate::algos::renormalize::renormalize;
use crate::algos::sparsify::{sparsify, SparsifyPolicy};
use crate::errors::DiffusionError;
use crate::graph::Adjacency;
use crate::transition::{build_transition, TransitionKind};

/// Which diffusion kernel runs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiffusionKernel {
    Ppr(Ppr),
    Heat(Heat),
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffusionConfig {
    pub transition: TransitionKind,
    pub kernel: DiffusionKernel,
    pub sparsify: SparsifyPolicy,
    /// `Some(policy)` reconciles every edge with its reverse so the output
    /// is genuinely undirected.  Runs after renormalization, so policies
    /// other than `Mean` on asymmetric input leave column sums near, not
    /// exactly at, 1.
    pub symmetrize: Option<MergePolicy>,
    /// Show a progress bar during the kernel loops.
    pub indicator: bool,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        DiffusionConfig {
            transition: TransitionKind::Symmetric,
            kernel: DiffusionKernel::Ppr(Ppr::default()),
            sparsify: SparsifyPolicy::Threshold { eps: 1e-4 },
            symmetrize: None,
            indicator: false,
        }
    }
}

impl DiffusionConfig {
    /// Surfaces every configuration error before any numeric work.
    pub fn validate(&self) -> Result<(), DiffusionError> {
        match &self.kernel {
            DiffusionKernel::Ppr(ppr) => ppr.validate()?,
            DiffusionKernel::Heat(heat) => {
                heat.validate()?;
                if heat.method == HeatMethod::Eigen
                    && self.transition != TransitionKind::Symmetric
                {
                    return Err(DiffusionError::EigenNeedsSymmetric);
                }
            }
        }
        self.sparsify.validate()
    }
}

/// Runs the full diffusion pipeline over `adjacency`.
///
/// The output depends only on the graph and the configuration.  Callers
/// training across many random splits of the same graph should run this
/// once per (graph, config) pair and reuse the edges, never once per split.
pub fn diffusion_edges(
    adjacency: &Adjacency,
    config: &DiffusionConfig,
) -> Result<DiffusionEdges, DiffusionError> {
    config.validate()?;
    info!(
        "diffusing {} nodes, {} edges: {:?}",
        adjacency.len(),
        adjacency.edges(),
        config.kernel
    );

    let transition = build_transition(adjacency, config.transition)?;
    let dense = match &config.kernel {
        DiffusionKernel::Ppr(ppr) => ppr.compute(&transition, config.indicator)?,
        DiffusionKernel::Heat(heat) => heat.compute(&transition, config.indicator)?,
    };
    let sparse = sparsify(&dense, &config.sparsify)?;
    debug!(
        "sparsified {} dense entries down to {}",
        dense.len(),
        sparse.nnz()
    );
    let edges = assemble(&renormalize(&sparse), config.symmetrize);
    info!("assembled {} edges", edges.len());
    Ok(edges)
}
