//! Ordered bin edges for half-open classification
//!
//! Edges `[b1, ..., bn]` define `n + 1` classes:
//! `< b1` is class 0, `[b_i, b_{i+1})` is class `i`, `>= bn` is class `n`.

use climstress_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest number of edges whose classes still fit below the no-data code
const MAX_EDGES: usize = 254;

/// Strictly ascending, finite bin edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct BinEdges(Vec<f64>);

impl BinEdges {
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        if edges.is_empty() {
            return Err(Error::invalid_param("bin_edges", "[]", "at least one edge is required"));
        }
        if edges.len() > MAX_EDGES {
            return Err(Error::invalid_param(
                "bin_edges",
                edges.len(),
                format!("at most {MAX_EDGES} edges are supported"),
            ));
        }
        if let Some(bad) = edges.iter().find(|e| !e.is_finite()) {
            return Err(Error::invalid_param("bin_edges", bad, "edges must be finite"));
        }
        if let Some(w) = edges.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::invalid_param(
                "bin_edges",
                format!("{:?}", edges),
                format!("not strictly ascending at {} >= {}", w[0], w[1]),
            ));
        }
        Ok(Self(edges))
    }

    /// UHI intensity edges: weak, moderate, strong, stronger, strongest
    pub fn uhi_default() -> Self {
        Self(vec![0.0, 0.005, 0.010, 0.015, 0.020])
    }

    pub fn edges(&self) -> &[f64] {
        &self.0
    }

    /// Highest class code (equal to the number of edges)
    pub fn max_class(&self) -> u8 {
        self.0.len() as u8
    }

    /// Class of `value`, `None` for NaN
    pub fn classify(&self, value: f64) -> Option<u8> {
        if value.is_nan() {
            return None;
        }
        Some(self.0.partition_point(|&edge| edge <= value) as u8)
    }
}

impl TryFrom<Vec<f64>> for BinEdges {
    type Error = Error;

    fn try_from(edges: Vec<f64>) -> Result<Self> {
        BinEdges::new(edges)
    }
}

impl From<BinEdges> for Vec<f64> {
    fn from(edges: BinEdges) -> Self {
        edges.0
    }
}
