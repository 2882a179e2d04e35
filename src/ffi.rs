//! Python bindings.  Mirrors the Rust surface: build a graph, run a
//! diffusion, get back (sources, targets, weights) ready to hand to a GNN
//! framework as edge_index / edge_weight.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::algos::assemble::MergePolicy;
use crate::algos::heat::{Heat, HeatMethod};
use crate::algos::ppr::{Ppr, PprMethod};
use crate::algos::sparsify::SparsifyPolicy;
use crate::diffusion::{diffusion_edges, DiffusionConfig, DiffusionKernel};
use crate::errors::DiffusionError;
use crate::graph::{Adjacency, NodeID};
use crate::transition::TransitionKind;

type PyEdges = (Vec<NodeID>, Vec<NodeID>, Vec<f64>);

fn to_py_err(err: DiffusionError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_sparsify(eps: Option<f64>, k: Option<usize>) -> PyResult<SparsifyPolicy> {
    match (eps, k) {
        (Some(eps), None) => Ok(SparsifyPolicy::Threshold { eps }),
        (None, Some(k)) => Ok(SparsifyPolicy::TopK { k }),
        _ => Err(PyValueError::new_err(
            "Provide exactly one of eps (threshold) or k (top-k)!",
        )),
    }
}

fn parse_merge(symmetrize: Option<String>) -> PyResult<Option<MergePolicy>> {
    match symmetrize.as_deref() {
        None => Ok(None),
        Some("max") => Ok(Some(MergePolicy::Max)),
        Some("mean") => Ok(Some(MergePolicy::Mean)),
        Some("sum") => Ok(Some(MergePolicy::Sum)),
        Some(other) => Err(PyValueError::new_err(format!(
            "Unknown merge policy '{}'; expected max, mean or sum!",
            other
        ))),
    }
}

fn parse_transition(column_stochastic: Option<bool>) -> TransitionKind {
    if column_stochastic.unwrap_or(false) {
        TransitionKind::ColumnStochastic
    } else {
        TransitionKind::Symmetric
    }
}

#[pyclass]
#[derive(Clone)]
enum EdgeType {
    Directed,
    Undirected,
}

#[pyclass]
struct GraphBuilder {
    num_nodes: usize,
    edges: Vec<(NodeID, NodeID, f64)>,
}

#[pymethods]
impl GraphBuilder {
    #[new]
    pub fn new(num_nodes: usize) -> Self {
        GraphBuilder {
            num_nodes,
            edges: Vec::new(),
        }
    }

    pub fn add_edge(
        &mut self,
        from_node: NodeID,
        to_node: NodeID,
        weight: f64,
        edge_type: EdgeType,
    ) {
        self.edges.push((from_node, to_node, weight));
        if matches!(edge_type, EdgeType::Undirected) && from_node != to_node {
            self.edges.push((to_node, from_node, weight));
        }
    }

    pub fn build_graph(&mut self) -> PyResult<DiffusionGraph> {
        let mut edges = Vec::new();
        std::mem::swap(&mut edges, &mut self.edges);
        let adjacency = Adjacency::from_edges(self.num_nodes, edges).map_err(to_py_err)?;
        Ok(DiffusionGraph { adjacency })
    }
}

#[pyclass]
struct DiffusionGraph {
    adjacency: Adjacency,
}

#[pymethods]
impl DiffusionGraph {
    pub fn nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edges(&self) -> usize {
        self.adjacency.edges()
    }

    pub fn ppr_edges(
        &self,
        alpha: f64,
        eps: Option<f64>,
        k: Option<usize>,
        iterations: Option<usize>,
        symmetrize: Option<String>,
        column_stochastic: Option<bool>,
        indicator: Option<bool>,
    ) -> PyResult<PyEdges> {
        let method = match iterations {
            Some(iterations) => PprMethod::Series { iterations },
            None => PprMethod::Exact,
        };
        let config = DiffusionConfig {
            transition: parse_transition(column_stochastic),
            kernel: DiffusionKernel::Ppr(Ppr { alpha, method }),
            sparsify: parse_sparsify(eps, k)?,
            symmetrize: parse_merge(symmetrize)?,
            indicator: indicator.unwrap_or(false),
        };
        self.run(&config)
    }

    pub fn heat_edges(
        &self,
        t: f64,
        order: usize,
        eps: Option<f64>,
        k: Option<usize>,
        symmetrize: Option<String>,
        column_stochastic: Option<bool>,
        indicator: Option<bool>,
    ) -> PyResult<PyEdges> {
        let config = DiffusionConfig {
            transition: parse_transition(column_stochastic),
            kernel: DiffusionKernel::Heat(Heat {
                t,
                method: HeatMethod::Chebyshev { order },
            }),
            sparsify: parse_sparsify(eps, k)?,
            symmetrize: parse_merge(symmetrize)?,
            indicator: indicator.unwrap_or(false),
        };
        self.run(&config)
    }
}

impl DiffusionGraph {
    fn run(&self, config: &DiffusionConfig) -> PyResult<PyEdges> {
        let edges = diffusion_edges(&self.adjacency, config).map_err(to_py_err)?;
        Ok((
            edges.sources().to_vec(),
            edges.targets().to_vec(),
            edges.weights().to_vec(),
        ))
    }
}

#[pymodule]
fn dandelion(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<EdgeType>()?;
    m.add_class::<GraphBuilder>()?;
    m.add_class::<DiffusionGraph>()?;
    Ok(())
}
