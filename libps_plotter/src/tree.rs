use ndarray::{Array1, Array2};

/// Scalar summary of a measurement, computed over its finite entries only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// A one-dimensional measurement (e.g. a threshold scan). NaN entries mark
/// invalid bins.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub values: Array1<f64>,
}

/// A two-dimensional measurement (e.g. a per-pixel noise map). The grid shape
/// is fixed for the lifetime of the measurement.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub values: Array2<f64>,
}

impl Series {
    pub fn stats(&self) -> Option<SummaryStats> {
        stats_over(self.values.iter().copied())
    }
}

impl Field {
    pub fn stats(&self) -> Option<SummaryStats> {
        stats_over(self.values.iter().copied())
    }

    /// (rows, columns) of the value grid
    pub fn shape(&self) -> (usize, usize) {
        let shape = self.values.dim();
        (shape.0, shape.1)
    }
}

/// A named array-valued leaf of the results tree. The kind is decided once
/// when the store is read; all downstream dispatch is an exhaustive match.
#[derive(Debug, Clone)]
pub enum Measurement {
    Series(Series),
    Field(Field),
}

impl Measurement {
    pub fn name(&self) -> &str {
        match self {
            Measurement::Series(s) => &s.name,
            Measurement::Field(f) => &f.name,
        }
    }

    pub fn stats(&self) -> Option<SummaryStats> {
        match self {
            Measurement::Series(s) => s.stats(),
            Measurement::Field(f) => f.stats(),
        }
    }
}

/// A node of the results tree: either a directory or a measurement leaf.
#[derive(Debug, Clone)]
pub enum TreeNode {
    Directory(DirectoryNode),
    Measurement(Measurement),
}

/// A named container of tree nodes. Children are kept in the store's native
/// enumeration order; no sorting is ever applied here.
#[derive(Debug, Clone, Default)]
pub struct DirectoryNode {
    pub name: String,
    pub children: Vec<TreeNode>,
}

impl DirectoryNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// All child directories whose name contains the given pattern, in
    /// discovery order.
    pub fn subdirectories(&self, pattern: &str) -> Vec<&DirectoryNode> {
        self.children
            .iter()
            .filter_map(|child| match child {
                TreeNode::Directory(dir) if dir.name.contains(pattern) => Some(dir),
                _ => None,
            })
            .collect()
    }

    /// All measurements directly owned by this directory, in discovery order.
    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        self.children.iter().filter_map(|child| match child {
            TreeNode::Measurement(m) => Some(m),
            _ => None,
        })
    }

    /// The numeric instance index encoded as the name suffix
    /// (e.g. "Hybrid_3" -> 3).
    pub fn unit_index(&self) -> Option<u32> {
        self.name.rsplit('_').next()?.parse().ok()
    }
}

fn stats_over(values: impl Iterator<Item = f64>) -> Option<SummaryStats> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count: usize = 0;
    for value in values.filter(|v| v.is_finite()) {
        min = min.min(value);
        max = max.max(value);
        sum += value;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(SummaryStats {
        min,
        max,
        mean: sum / count as f64,
    })
}
