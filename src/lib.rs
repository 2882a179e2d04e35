//! Graph diffusion preprocessing for graph convolutional networks.
//!
//! Builds a sparsified, renormalized diffusion matrix from a graph's
//! adjacency matrix, via Personalized PageRank or the heat kernel, and
//! exposes it as parallel edge-index / edge-weight arrays ready to replace
//! the raw adjacency in message passing.
//!
//! ```
//! use dandelion::{diffusion_edges, Adjacency, DiffusionConfig};
//!
//! let adjacency = Adjacency::from_edges(3, [
//!     (0, 1, 1.0), (1, 0, 1.0),
//!     (1, 2, 1.0), (2, 1, 1.0),
//! ]).unwrap();
//! let edges = diffusion_edges(&adjacency, &DiffusionConfig::default()).unwrap();
//! assert_eq!(edges.num_nodes(), 3);
//! ```

pub mod algos;
pub mod diffusion;
pub mod errors;
pub mod graph;
pub mod transition;
mod progress;

#[cfg(feature = "python-ffi")]
mod ffi;

pub use crate::algos::assemble::{assemble, symmetrize, DiffusionEdges, MergePolicy};
pub use crate::algos::heat::{Heat, HeatMethod};
pub use crate::algos::ppr::{Ppr, PprMethod};
pub use crate::algos::renormalize::renormalize;
pub use crate::algos::sparsify::{sparsify, SparsifyPolicy};
pub use crate::diffusion::{diffusion_edges, DiffusionConfig, DiffusionKernel};
pub use crate::errors::{DiffusionError, ErrorKind};
pub use crate::graph::{Adjacency, NodeID};
pub use crate::transition::{build_transition, Transition, TransitionKind};
