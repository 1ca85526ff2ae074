use bitvec::prelude::*;
use std::fmt::{self, Write};

pub mod approx;
pub mod cnf;
pub mod deadline;
pub mod error;
pub mod exact;
pub mod parse;
pub mod round;
pub mod sat;
pub mod three_cnf;

pub use error::Error;
pub use exact::{SearchMode, SearchOutcome};
pub use parse::{ParseError, Session};
pub use round::{Orchestrator, RoundConfig, RoundResult};

/// Bit set indexed by vertex (or edge) number.
pub type Bits = BitVec<usize, Lsb0>;

/// An undirected graph for one round. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    edges: Vec<(u32, u32)>,
    incident: Vec<u32>,
    incident_indices: Vec<u32>,
    vertices: u32,
}

/// A set of vertices, kept sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cover {
    vertices: Vec<u32>,
}

impl Cover {
    pub fn new(mut vertices: Vec<u32>) -> Cover {
        vertices.sort_unstable();
        vertices.dedup();
        Cover { vertices }
    }

    #[cfg(test)]
    pub(crate) fn full(n: u32) -> Cover {
        Cover {
            vertices: (0..n).collect(),
        }
    }

    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, vertex: u32) -> bool {
        self.vertices.binary_search(&vertex).is_ok()
    }

    pub fn is_subset_of(&self, other: &Cover) -> bool {
        self.vertices.iter().all(|&v| other.contains(v))
    }

    /// Space separated vertex list, ascending.
    pub fn format(&self) -> String {
        let mut output = String::new();
        for (i, vertex) in self.vertices.iter().enumerate() {
            if i > 0 {
                output.push(' ');
            }
            let _ = write!(&mut output, "{}", vertex);
        }
        output
    }

    pub(crate) fn to_bits(&self, vertices: u32) -> Bits {
        let mut bits = bitvec![usize, Lsb0; 0; vertices as usize];
        for &v in &self.vertices {
            bits.set(v as usize, true);
        }
        bits
    }
}

impl fmt::Display for Cover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl From<Bits> for Cover {
    fn from(value: Bits) -> Self {
        Cover::from(value.as_bitslice())
    }
}

impl From<&BitSlice<usize, Lsb0>> for Cover {
    fn from(value: &BitSlice<usize, Lsb0>) -> Self {
        Cover {
            vertices: value.iter_ones().map(|x| x as u32).collect(),
        }
    }
}

impl Graph {
    /// Builds a graph. Endpoints must be below `vertices`; the parser
    /// enforces this for input lines.
    pub fn new(vertices: u32, edges: Vec<(u32, u32)>) -> Graph {
        debug_assert!(edges.iter().all(|&(s, e)| s < vertices && e < vertices));
        let mut graph = Graph {
            edges,
            vertices,
            ..Default::default()
        };
        graph.populate_incidence();
        graph
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices
    }

    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    pub fn validate_cover(&self, cover: &Cover) -> bool {
        for (start, end) in &self.edges {
            if !(cover.contains(*start) || cover.contains(*end)) {
                log::debug!("edge ({start}, {end}) not covered");
                return false;
            }
        }
        true
    }

    /// Same check as [`Graph::validate_cover`] against a membership bit set.
    pub fn covered_by(&self, selected: &BitSlice<usize, Lsb0>) -> bool {
        self.edges
            .iter()
            .all(|&(start, end)| selected[start as usize] || selected[end as usize])
    }

    fn populate_incidence(&mut self) {
        self.incident.clear();
        self.incident_indices.clear();

        let mut degree = vec![0u32; self.vertices as usize];
        for &(start, end) in &self.edges {
            degree[start as usize] += 1;
            if start != end {
                degree[end as usize] += 1;
            }
        }
        let mut offset = 0;
        for d in &degree {
            self.incident_indices.push(offset);
            offset += d;
        }
        self.incident_indices.push(offset);

        let mut fill: Vec<u32> = self.incident_indices[..self.vertices as usize].to_vec();
        self.incident = vec![0; offset as usize];
        for (index, &(start, end)) in self.edges.iter().enumerate() {
            self.incident[fill[start as usize] as usize] = index as u32;
            fill[start as usize] += 1;
            if start != end {
                self.incident[fill[end as usize] as usize] = index as u32;
                fill[end as usize] += 1;
            }
        }
    }

    /// Indices into [`Graph::edges`] of the edges touching `vertex`.
    /// A self-loop is listed once.
    pub fn incident_edges(&self, vertex: u32) -> &[u32] {
        let start = self.incident_indices[vertex as usize] as usize;
        let end = self.incident_indices[vertex as usize + 1] as usize;
        &self.incident[start..end]
    }

    pub fn deg(&self, vertex: u32) -> usize {
        self.incident_edges(vertex).len()
    }
}
