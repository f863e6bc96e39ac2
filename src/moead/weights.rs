//! Decomposition weight vectors.
//!
//! One weight vector per subproblem. Vectors are non-negative, sum to 1,
//! and are pairwise distinct. They are built once before the loop starts
//! and never change.
//!
//! # Sources
//!
//! - [`WeightVectors::uniform`]: evenly spaced vectors for 2 objectives,
//!   simplex-lattice (Das & Dennis, 1998) for 3 or more.
//! - [`WeightVectors::from_table`] / [`WeightVectors::load`]: predefined
//!   tables in the whitespace-separated `W{m}D_{n}.dat` format used by the
//!   published MOEA/D weight files (Zhang, Liu & Li, 2009).
//!
//! # References
//!
//! - Das & Dennis (1998), "Normal-Boundary Intersection", *SIAM J. Optim.* 8(3)
//! - Zhang & Li (2007), "MOEA/D: A Multiobjective Evolutionary Algorithm
//!   Based on Decomposition", *IEEE TEVC* 11(6), 712-731

use super::error::ConfigError;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Allowed deviation of a loaded vector's sum from 1.
///
/// Published tables are rounded to six decimals.
const SUM_TOLERANCE: f64 = 1e-4;

/// An immutable set of decomposition weight vectors.
///
/// Serialized as a plain list of rows; deserialization runs the same
/// checks as [`from_vectors`](Self::from_vectors).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>"))]
pub struct WeightVectors {
    vectors: Vec<Vec<f64>>,
}

impl WeightVectors {
    /// Generates `count` evenly distributed weight vectors.
    ///
    /// - 2 objectives: `(i / (count - 1), 1 - i / (count - 1))`
    /// - 3+ objectives: the simplex lattice with `H` divisions, which has
    ///   `C(H + m - 1, m - 1)` points. `count` must match one of those sizes
    ///   exactly (e.g. 91 or 105 for 3 objectives).
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnsupportedWeightDimensions`] when no strategy covers
    /// the pair, e.g. 100 vectors for 3 objectives (load a table instead).
    ///
    /// # Example
    ///
    /// ```
    /// use u_moead::moead::WeightVectors;
    ///
    /// let w = WeightVectors::uniform(5, 2).unwrap();
    /// assert_eq!(w.get(0), &[0.0, 1.0]);
    /// assert_eq!(w.get(4), &[1.0, 0.0]);
    ///
    /// let w3 = WeightVectors::uniform(91, 3).unwrap(); // H = 12
    /// assert_eq!(w3.len(), 91);
    /// ```
    pub fn uniform(count: usize, n_objectives: usize) -> Result<Self, ConfigError> {
        let unsupported = |reason: &str| ConfigError::UnsupportedWeightDimensions {
            count,
            n_objectives,
            reason: reason.to_string(),
        };

        if n_objectives < 2 {
            return Err(unsupported("at least 2 objectives are required"));
        }
        if count < 2 {
            return Err(unsupported("at least 2 weight vectors are required"));
        }

        if n_objectives == 2 {
            let denom = (count - 1) as f64;
            let vectors = (0..count)
                .map(|i| {
                    let a = i as f64 / denom;
                    vec![a, 1.0 - a]
                })
                .collect();
            return Ok(Self { vectors });
        }

        let divisions = lattice_divisions(count, n_objectives).ok_or_else(|| {
            unsupported("count is not a simplex-lattice size; supply a weight table")
        })?;
        Ok(Self {
            vectors: simplex_lattice(n_objectives, divisions),
        })
    }

    /// Builds a set from explicit vectors, validating them.
    ///
    /// # Errors
    ///
    /// [`ConfigError::WeightTable`] if the set is empty, rows differ in
    /// length, any entry is negative or non-finite, a row does not sum to 1,
    /// or two rows are identical.
    pub fn from_vectors(vectors: Vec<Vec<f64>>) -> Result<Self, ConfigError> {
        let invalid = |msg: String| ConfigError::WeightTable(msg);

        let Some(first) = vectors.first() else {
            return Err(invalid("no weight vectors".into()));
        };
        let m = first.len();
        if m < 2 {
            return Err(invalid(format!("vectors need at least 2 components, got {m}")));
        }

        for (i, w) in vectors.iter().enumerate() {
            if w.len() != m {
                return Err(invalid(format!(
                    "vector {i} has {} components, expected {m}",
                    w.len()
                )));
            }
            if let Some(&bad) = w.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(invalid(format!("vector {i} has invalid component {bad}")));
            }
            let sum: f64 = w.iter().sum();
            if (sum - 1.0).abs() > SUM_TOLERANCE {
                return Err(invalid(format!("vector {i} sums to {sum}, expected 1")));
            }
        }

        for i in 0..vectors.len() {
            for j in (i + 1)..vectors.len() {
                if vectors[i] == vectors[j] {
                    return Err(invalid(format!("vectors {i} and {j} are identical")));
                }
            }
        }

        Ok(Self { vectors })
    }

    /// Parses a whitespace-separated table, one vector per line.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn from_table(text: &str) -> Result<Self, ConfigError> {
        let mut vectors = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<f64>().map_err(|e| {
                        ConfigError::WeightTable(format!(
                            "line {}: cannot parse `{tok}`: {e}",
                            line_no + 1
                        ))
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            vectors.push(row);
        }
        Self::from_vectors(vectors)
    }

    /// File name of the predefined table for `count` vectors in
    /// `n_objectives` dimensions, e.g. `W3D_300.dat`.
    pub fn table_file_name(count: usize, n_objectives: usize) -> String {
        format!("W{n_objectives}D_{count}.dat")
    }

    /// Loads `W{m}D_{n}.dat` from `dir`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::WeightFile`] when the file cannot be read;
    /// [`ConfigError::WeightTable`] when it is malformed or its shape does
    /// not match `(count, n_objectives)`.
    pub fn load(dir: &Path, count: usize, n_objectives: usize) -> Result<Self, ConfigError> {
        let path = dir.join(Self::table_file_name(count, n_objectives));
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::WeightFile {
            path: path.clone(),
            source,
        })?;
        let weights = Self::from_table(&text)?;
        weights.expect_shape(count, n_objectives)?;
        Ok(weights)
    }

    /// Writes the set in the table format read by [`from_table`](Self::from_table).
    ///
    /// Values use the shortest representation that parses back to the same
    /// `f64`, so a write/read cycle is exact.
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        for w in &self.vectors {
            let mut first = true;
            for v in w {
                if !first {
                    out.push(' ');
                }
                first = false;
                let _ = write!(out, "{v}");
            }
            out.push('\n');
        }
        out
    }

    /// Number of vectors (= number of subproblems).
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Always `false` for a validated set.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimension of each vector (= number of objectives).
    pub fn n_objectives(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }

    /// Weight vector of subproblem `i`.
    ///
    /// # Panics
    /// Panics if `i >= len()`.
    pub fn get(&self, i: usize) -> &[f64] {
        &self.vectors[i]
    }

    /// Iterates over the vectors in subproblem order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.vectors.iter().map(Vec::as_slice)
    }

    pub(crate) fn expect_shape(&self, count: usize, n_objectives: usize) -> Result<(), ConfigError> {
        if self.len() != count || self.n_objectives() != n_objectives {
            return Err(ConfigError::WeightTable(format!(
                "expected {count} vectors of dimension {n_objectives}, got {} of dimension {}",
                self.len(),
                self.n_objectives()
            )));
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<f64>>> for WeightVectors {
    type Error = ConfigError;

    fn try_from(vectors: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_vectors(vectors)
    }
}

impl From<WeightVectors> for Vec<Vec<f64>> {
    fn from(weights: WeightVectors) -> Self {
        weights.vectors
    }
}

/// Where the engine obtains its weight vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WeightSource {
    /// Generate with [`WeightVectors::uniform`].
    #[default]
    Uniform,
    /// Use the given set. Its shape must match the run.
    Table(WeightVectors),
    /// Load `W{m}D_{n}.dat` from this directory.
    Directory(PathBuf),
}

impl WeightSource {
    /// Produces `count` vectors of dimension `n_objectives`.
    pub fn resolve(&self, count: usize, n_objectives: usize) -> Result<WeightVectors, ConfigError> {
        match self {
            WeightSource::Uniform => WeightVectors::uniform(count, n_objectives),
            WeightSource::Table(weights) => {
                weights.expect_shape(count, n_objectives)?;
                Ok(weights.clone())
            }
            WeightSource::Directory(dir) => WeightVectors::load(dir, count, n_objectives),
        }
    }
}

/// Smallest `H` with `C(H + m - 1, m - 1) == count`, if any.
fn lattice_divisions(count: usize, m: usize) -> Option<usize> {
    let mut h = 1usize;
    loop {
        let size = binomial(h + m - 1, m - 1)?;
        if size == count {
            return Some(h);
        }
        if size > count {
            return None;
        }
        h += 1;
    }
}

/// `C(n, k)`, or `None` on overflow.
fn binomial(n: usize, k: usize) -> Option<usize> {
    let k = k.min(n - k);
    let mut acc: usize = 1;
    for i in 0..k {
        acc = acc.checked_mul(n - i)? / (i + 1);
    }
    Some(acc)
}

/// All points `k / h` on the `m`-dimensional unit simplex.
fn simplex_lattice(m: usize, h: usize) -> Vec<Vec<f64>> {
    fn fill(out: &mut Vec<Vec<f64>>, current: &mut [usize], index: usize, remaining: usize, h: usize) {
        if index == current.len() - 1 {
            current[index] = remaining;
            out.push(current.iter().map(|&c| c as f64 / h as f64).collect());
            return;
        }
        for k in 0..=remaining {
            current[index] = k;
            fill(out, current, index + 1, remaining - k, h);
        }
    }

    let mut out = Vec::new();
    let mut current = vec![0usize; m];
    fill(&mut out, &mut current, 0, h, h);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_on_simplex(w: &WeightVectors) {
        for v in w.iter() {
            assert!(v.iter().all(|&x| x >= 0.0));
            let sum: f64 = v.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum = {sum}");
        }
    }

    #[test]
    fn test_uniform_two_objectives() {
        let w = WeightVectors::uniform(100, 2).unwrap();
        assert_eq!(w.len(), 100);
        assert_eq!(w.n_objectives(), 2);
        assert_eq!(w.get(0), &[0.0, 1.0]);
        assert_eq!(w.get(99), &[1.0, 0.0]);
        assert_on_simplex(&w);
    }

    #[test]
    fn test_uniform_three_objectives_lattice() {
        // H = 12 → C(14, 2) = 91
        let w = WeightVectors::uniform(91, 3).unwrap();
        assert_eq!(w.len(), 91);
        assert_eq!(w.n_objectives(), 3);
        assert_on_simplex(&w);
        assert!(WeightVectors::from_vectors(w.iter().map(<[f64]>::to_vec).collect()).is_ok());
    }

    #[test]
    fn test_uniform_unsupported_count() {
        let err = WeightVectors::uniform(100, 3).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedWeightDimensions {
                count: 100,
                n_objectives: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_uniform_rejects_single_objective() {
        assert!(WeightVectors::uniform(10, 1).is_err());
        assert!(WeightVectors::uniform(1, 2).is_err());
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(14, 2), Some(91));
        assert_eq!(binomial(5, 0), Some(1));
        assert_eq!(binomial(6, 3), Some(20));
    }

    #[test]
    fn test_table_round_trip_exact() {
        let w = WeightVectors::uniform(91, 3).unwrap();
        let reloaded = WeightVectors::from_table(&w.to_table()).unwrap();
        assert_eq!(w, reloaded);
    }

    #[test]
    fn test_table_parse_rounded_values() {
        let text = "# three vectors\n0.000000 1.000000\n\n0.333333 0.666667\n1.0 0.0\n";
        let w = WeightVectors::from_table(text).unwrap();
        assert_eq!(w.len(), 3);
        assert_eq!(w.get(1), &[0.333333, 0.666667]);
    }

    #[test]
    fn test_table_parse_error_has_line() {
        let err = WeightVectors::from_table("0.5 0.5\n0.2 abc\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_from_vectors_rejects_invalid() {
        assert!(WeightVectors::from_vectors(vec![]).is_err());
        assert!(WeightVectors::from_vectors(vec![vec![0.5, 0.6]]).is_err());
        assert!(WeightVectors::from_vectors(vec![vec![-0.5, 1.5]]).is_err());
        assert!(WeightVectors::from_vectors(vec![vec![0.5, 0.5], vec![0.2, 0.3, 0.5]]).is_err());
        assert!(WeightVectors::from_vectors(vec![vec![0.5, 0.5], vec![0.5, 0.5]]).is_err());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = std::env::temp_dir().join(format!("u-moead-weights-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let w = WeightVectors::uniform(15, 3).unwrap(); // H = 4
        std::fs::write(dir.join("W3D_15.dat"), w.to_table()).unwrap();

        let loaded = WeightVectors::load(&dir, 15, 3).unwrap();
        assert_eq!(loaded, w);

        // Wrong shape requested → file name differs → IO error
        assert!(matches!(
            WeightVectors::load(&dir, 21, 3),
            Err(ConfigError::WeightFile { .. })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_source_table_shape_checked() {
        let w = WeightVectors::uniform(10, 2).unwrap();
        let source = WeightSource::Table(w.clone());
        assert_eq!(source.resolve(10, 2).unwrap(), w);
        assert!(source.resolve(11, 2).is_err());
        assert!(source.resolve(10, 3).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let w = WeightVectors::uniform(21, 3).unwrap(); // H = 5
        let json = serde_json::to_string(&w).unwrap();
        let back: WeightVectors = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_rejects_invalid_sets() {
        for json in [
            "[[0.5,0.5],[0.5,0.5]]",
            "[[2.0,-1.0],[0.0,1.0]]",
            "[[0.5,0.5],[0.1,0.2,0.7]]",
            "[[0.3,0.3],[0.0,1.0]]",
            "[]",
        ] {
            assert!(serde_json::from_str::<WeightVectors>(json).is_err(), "accepted {json}");
        }
    }

    #[test]
    fn test_try_from_validates() {
        assert!(WeightVectors::try_from(vec![vec![1.0, 0.0], vec![1.0, 0.0]]).is_err());
        let w = WeightVectors::try_from(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let rows: Vec<Vec<f64>> = w.into();
        assert_eq!(rows, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }
}
