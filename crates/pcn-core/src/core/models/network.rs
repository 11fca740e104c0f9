use super::residue::Residue;
use nalgebra::DMatrix;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// The atom (or pseudo-atom) whose position stands in for a whole residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Representative {
    /// The alpha carbon (`CA`).
    #[default]
    AlphaCarbon,
    /// The beta carbon (`CB`); glycine falls back to its alpha carbon.
    BetaCarbon,
    /// The centroid of all non-hydrogen atoms of the residue.
    Centroid,
}

impl Representative {
    /// The short tag used in file names (`CA`, `CB`, `centroid`).
    pub fn tag(&self) -> &'static str {
        match self {
            Representative::AlphaCarbon => "CA",
            Representative::BetaCarbon => "CB",
            Representative::Centroid => "centroid",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid representative atom type '{0}'. Expected 'CA', 'CB' or 'centroid'.")]
pub struct ParseRepresentativeError(pub String);

impl FromStr for Representative {
    type Err = ParseRepresentativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ca" | "alpha-carbons" | "alpha-carbon" | "alpha" => Ok(Representative::AlphaCarbon),
            "cb" | "beta-carbons" | "beta-carbon" | "beta" => Ok(Representative::BetaCarbon),
            "centroid" | "centroids" => Ok(Representative::Centroid),
            _ => Err(ParseRepresentativeError(s.to_string())),
        }
    }
}

impl fmt::Display for Representative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How a contact is recorded in the adjacency matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeWeighting {
    /// Every contact has weight 1.
    #[default]
    Binary,
    /// A contact at distance `d` has weight `1/d`.
    InverseDistance,
}

impl FromStr for EdgeWeighting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(EdgeWeighting::Binary),
            "inverse-distance" | "inverse_distance" => Ok(EdgeWeighting::InverseDistance),
            other => Err(format!(
                "Invalid edge weighting '{}'. Expected 'binary' or 'inverse-distance'.",
                other
            )),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BandError {
    #[error("Distance thresholds must be finite and non-negative (min: {min}, max: {max})")]
    NotFinite { min: f64, max: f64 },
    #[error("Minimum distance threshold {min} exceeds the maximum {max}")]
    Inverted { min: f64, max: f64 },
}

/// The two-sided distance band `min ≤ d ≤ max` (Å) that defines a contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBand {
    min: f64,
    max: f64,
}

impl ThresholdBand {
    pub fn new(min: f64, max: f64) -> Result<Self, BandError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(BandError::NotFinite { min, max });
        }
        if min > max {
            return Err(BandError::Inverted { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Both bounds are inclusive.
    #[inline]
    pub fn contains(&self, distance: f64) -> bool {
        self.min <= distance && distance <= self.max
    }
}

impl Default for ThresholdBand {
    fn default() -> Self {
        Self { min: 4.0, max: 8.0 }
    }
}

/// Renders a threshold the way matrix file names expect it: integral values keep one
/// decimal (`4.0`), others use the shortest exact representation (`8.5`).
pub fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Identity of a built network: one per (protein, representative, band).
#[derive(Debug, Clone)]
pub struct NetworkKey {
    pub protein: String,
    pub representative: Representative,
    pub band: ThresholdBand,
}

impl NetworkKey {
    pub fn new(protein: &str, representative: Representative, band: ThresholdBand) -> Self {
        Self {
            protein: protein.to_string(),
            representative,
            band,
        }
    }

    /// `<protein>_adj_<type>_<min>_<max>.txt`
    pub fn file_name(&self) -> String {
        format!(
            "{}_adj_{}_{}_{}.txt",
            self.protein,
            self.representative.tag(),
            format_threshold(self.band.min),
            format_threshold(self.band.max)
        )
    }
}

impl PartialEq for NetworkKey {
    fn eq(&self, other: &Self) -> bool {
        self.protein == other.protein
            && self.representative == other.representative
            && self.band.min.to_bits() == other.band.min.to_bits()
            && self.band.max.to_bits() == other.band.max.to_bits()
    }
}

impl Eq for NetworkKey {}

impl Hash for NetworkKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.protein.hash(state);
        self.representative.hash(state);
        self.band.min.to_bits().hash(state);
        self.band.max.to_bits().hash(state);
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum NetworkError {
    #[error("Adjacency matrix must be square (got {rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },
    #[error("Adjacency matrix has {matrix} rows but {residues} residues were provided")]
    SizeMismatch { matrix: usize, residues: usize },
    #[error("Adjacency matrix is not symmetric at ({row}, {col})")]
    NotSymmetric { row: usize, col: usize },
    #[error("Adjacency matrix holds an invalid weight at ({row}, {col}): {value}")]
    InvalidWeight { row: usize, col: usize, value: f64 },
}

/// A symmetric N×N contact matrix over an ordered residue list.
///
/// Row/column `i` corresponds to `residues()[i]`. The diagonal is always zero. The network
/// is immutable after construction; adjacency lists are derived once so graph algorithms
/// never rescan the dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactNetwork {
    residues: Vec<Residue>,
    adjacency: DMatrix<f64>,
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl ContactNetwork {
    /// Validates and wraps a matrix. The diagonal is cleared.
    pub fn new(residues: Vec<Residue>, mut adjacency: DMatrix<f64>) -> Result<Self, NetworkError> {
        let (rows, cols) = adjacency.shape();
        if rows != cols {
            return Err(NetworkError::NotSquare { rows, cols });
        }
        if rows != residues.len() {
            return Err(NetworkError::SizeMismatch {
                matrix: rows,
                residues: residues.len(),
            });
        }
        for i in 0..rows {
            adjacency[(i, i)] = 0.0;
            for j in (i + 1)..rows {
                for (row, col) in [(i, j), (j, i)] {
                    let value = adjacency[(row, col)];
                    if !value.is_finite() || value < 0.0 {
                        return Err(NetworkError::InvalidWeight { row, col, value });
                    }
                }
                let (a, b) = (adjacency[(i, j)], adjacency[(j, i)]);
                if (a - b).abs() > SYMMETRY_TOLERANCE {
                    return Err(NetworkError::NotSymmetric { row: i, col: j });
                }
            }
        }

        let neighbors = (0..rows)
            .map(|i| {
                (0..rows)
                    .filter(|&j| j != i && adjacency[(i, j)] != 0.0)
                    .map(|j| (j, adjacency[(i, j)]))
                    .collect()
            })
            .collect();

        Ok(Self {
            residues,
            adjacency,
            neighbors,
        })
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    /// Output identifiers (`ALA12A`) in node order.
    pub fn residue_ids(&self) -> Vec<String> {
        self.residues.iter().map(Residue::identifier).collect()
    }

    pub fn adjacency(&self) -> &DMatrix<f64> {
        &self.adjacency
    }

    #[inline]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.adjacency[(i, j)]
    }

    #[inline]
    pub fn has_contact(&self, i: usize, j: usize) -> bool {
        i != j && self.adjacency[(i, j)] != 0.0
    }

    /// `(neighbor, weight)` pairs of node `i`, ascending by neighbor index.
    #[inline]
    pub fn neighbors(&self, i: usize) -> &[(usize, f64)] {
        &self.neighbors[i]
    }

    /// Number of contacts of node `i`.
    #[inline]
    pub fn degree(&self, i: usize) -> usize {
        self.neighbors[i].len()
    }

    /// Sum of contact weights of node `i`.
    pub fn strength(&self, i: usize) -> f64 {
        self.neighbors[i].iter().map(|&(_, w)| w).sum()
    }

    /// Number of undirected contacts.
    pub fn contact_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Sum of all undirected contact weights.
    pub fn total_weight(&self) -> f64 {
        (0..self.len()).map(|i| self.strength(i)).sum::<f64>() / 2.0
    }

    /// Connected-component label per node, numbered by first appearance.
    pub fn components(&self) -> Vec<usize> {
        let n = self.len();
        let mut labels = vec![usize::MAX; n];
        let mut next = 0;
        let mut stack = Vec::new();
        for start in 0..n {
            if labels[start] != usize::MAX {
                continue;
            }
            labels[start] = next;
            stack.push(start);
            while let Some(node) = stack.pop() {
                for &(nb, _) in &self.neighbors[node] {
                    if labels[nb] == usize::MAX {
                        labels[nb] = next;
                        stack.push(nb);
                    }
                }
            }
            next += 1;
        }
        labels
    }

    pub fn is_connected(&self) -> bool {
        !self.is_empty() && self.components().iter().all(|&c| c == 0)
    }
}
