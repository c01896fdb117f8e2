//! Random forest evaluation.

use super::descriptor::{ForestDescriptor, TreeDescriptor};
use crate::error::ModelLoadError;
use crate::features::{FeatureVector, FEATURE_COUNT};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// `feature[node]` value marking a leaf.
pub const LEAF: i64 = -2;

/// A binary decision tree as parallel arrays indexed by node id. Node 0 is
/// the root.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    /// `[negative, positive]` at leaves, `None` elsewhere.
    pub value: Vec<Option<[f64; 2]>>,
}

impl DecisionTree {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.feature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature.is_empty()
    }

    fn leaves(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.feature
            .iter()
            .zip(&self.value)
            .filter(|(f, _)| **f == LEAF)
            .filter_map(|(_, v)| *v)
    }

    /// Walk every node reachable from the root and return the deepest leaf
    /// depth. Fails on out-of-range ids, revisited nodes, or bad leaves.
    fn check_structure(&self) -> Result<usize, String> {
        let n = self.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }

        let mut seen = HashSet::new();
        let mut stack = vec![(0usize, 0usize)];
        let mut max_depth = 0;

        while let Some((node, depth)) = stack.pop() {
            if !seen.insert(node) {
                return Err(format!("node {node} is reachable twice"));
            }
            let feature = self.feature[node];
            if feature == LEAF {
                match self.value.get(node).copied().flatten() {
                    Some(v) if v.iter().all(|x| x.is_finite()) => {}
                    _ => return Err(format!("leaf {node} has no finite [negative, positive] value")),
                }
                max_depth = max_depth.max(depth);
                continue;
            }
            if !(0..FEATURE_COUNT as i64).contains(&feature) {
                return Err(format!("node {node} splits on unknown feature {feature}"));
            }
            let (Some(&left), Some(&right)) =
                (self.children_left.get(node), self.children_right.get(node))
            else {
                return Err(format!("node {node} is missing child links"));
            };
            for child in [left, right] {
                match usize::try_from(child) {
                    Ok(c) if c < n => stack.push((c, depth + 1)),
                    _ => return Err(format!("node {node} has invalid child {child}")),
                }
            }
        }

        Ok(max_depth)
    }
}

impl TryFrom<TreeDescriptor> for DecisionTree {
    type Error = String;

    fn try_from(desc: TreeDescriptor) -> Result<Self, String> {
        let n = desc.feature.len();
        let lengths = [
            desc.children_left.len(),
            desc.children_right.len(),
            desc.threshold.len(),
            desc.value.len(),
        ];
        if lengths.iter().any(|&l| l != n) {
            return Err(format!("node arrays disagree in length ({n} vs {lengths:?})"));
        }
        if let Some(declared) = desc.n_nodes {
            if declared != n {
                return Err(format!("n_nodes is {declared} but arrays hold {n}"));
            }
        }

        let mut value = Vec::with_capacity(n);
        for (node, (feature, v)) in desc.feature.iter().zip(desc.value).enumerate() {
            let pair = match v.as_deref() {
                Some([neg, pos]) => Some([*neg, *pos]),
                Some(other) if *feature == LEAF => {
                    return Err(format!(
                        "leaf {node} value has {} entries, expected 2",
                        other.len()
                    ))
                }
                _ => None,
            };
            value.push(pair);
        }

        let tree = DecisionTree {
            feature: desc.feature,
            threshold: desc.threshold,
            children_left: desc.children_left,
            children_right: desc.children_right,
            value,
        };
        tree.check_structure()?;
        Ok(tree)
    }
}

fn anomaly(node: i64, reason: &str) -> Option<[f64; 2]> {
    debug!(node, reason, "tree traversal did not reach a leaf");
    None
}

/// Walk one tree from the root to a leaf and return its `[negative, positive]`
/// pair.
///
/// `features[feature] <= threshold` goes left, otherwise right. Returns
/// `None` if the walk hits an invalid node, a leaf without a value, or runs
/// longer than the tree has nodes.
pub fn predict_tree(tree: &DecisionTree, features: &FeatureVector) -> Option<[f64; 2]> {
    let mut node: i64 = 0;

    for _ in 0..=tree.len() {
        let Ok(idx) = usize::try_from(node) else {
            return anomaly(node, "negative node id");
        };
        let Some(&feature) = tree.feature.get(idx) else {
            return anomaly(node, "node id out of bounds");
        };

        if feature == LEAF {
            return match tree.value.get(idx).copied().flatten() {
                Some(v) => Some(v),
                None => anomaly(node, "leaf without value"),
            };
        }

        let value = usize::try_from(feature).ok().and_then(|f| features.get(f));
        let (Some(value), Some(&threshold)) = (value, tree.threshold.get(idx)) else {
            return anomaly(node, "split on missing feature or threshold");
        };

        let next = if f64::from(value) <= threshold {
            tree.children_left.get(idx)
        } else {
            tree.children_right.get(idx)
        };
        match next {
            Some(&child) => node = child,
            None => return anomaly(node, "missing child"),
        }
    }

    anomaly(node, "walk longer than node count")
}

/// Structural overview of a loaded forest.
#[derive(Debug, Clone, Serialize)]
pub struct ForestSummary {
    pub n_estimators: usize,
    pub total_nodes: usize,
    /// Deepest leaf across all trees, `None` if any tree is malformed.
    pub max_depth: Option<usize>,
    pub leaves_are_fractions: bool,
    pub feature_names: Vec<String>,
}

/// An immutable ensemble of decision trees.
///
/// Read-only after construction, so one instance can be shared across
/// concurrent predictions without locking.
#[derive(Debug, Clone)]
pub struct Forest {
    n_estimators: usize,
    feature_names: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl Forest {
    /// Validate a descriptor and build the forest.
    pub fn from_descriptor(desc: ForestDescriptor) -> Result<Self, ModelLoadError> {
        if desc.n_estimators == 0 {
            return Err(ModelLoadError::Invalid("n_estimators must be at least 1".into()));
        }
        if desc.n_estimators != desc.trees.len() {
            return Err(ModelLoadError::Invalid(format!(
                "n_estimators is {} but {} trees are present",
                desc.n_estimators,
                desc.trees.len()
            )));
        }
        if desc.feature_names.len() != FEATURE_COUNT {
            return Err(ModelLoadError::Invalid(format!(
                "expected {FEATURE_COUNT} feature names, got {}",
                desc.feature_names.len()
            )));
        }

        let trees = desc
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| {
                DecisionTree::try_from(t).map_err(|e| ModelLoadError::Invalid(format!("tree {i}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let forest = Self {
            n_estimators: desc.n_estimators,
            feature_names: desc.feature_names,
            trees,
        };
        if !forest.leaves_are_fractions() {
            warn!("leaf values are raw class counts, scores may exceed 1.0");
        }
        Ok(forest)
    }

    /// Parse and validate a JSON model.
    pub fn from_json_str(json: &str) -> Result<Self, ModelLoadError> {
        let desc: ForestDescriptor = serde_json::from_str(json)?;
        Self::from_descriptor(desc)
    }

    /// Parse and validate a JSON model from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelLoadError> {
        let desc: ForestDescriptor = serde_json::from_reader(reader)?;
        Self::from_descriptor(desc)
    }

    /// Load and validate a JSON model file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let forest = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            n_estimators = forest.n_estimators,
            "loaded phishing model"
        );
        Ok(forest)
    }

    /// Build an in-memory forest without structural validation.
    ///
    /// Traversal still guards every step, so malformed trees vote zero
    /// instead of failing.
    pub fn from_trees(feature_names: Vec<String>, trees: Vec<DecisionTree>) -> Self {
        Self {
            n_estimators: trees.len(),
            feature_names,
            trees,
        }
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Labels for reporting only.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Phishing score: sum of each tree's positive leaf value over
    /// `n_estimators`.
    ///
    /// Trees that fail to reach a leaf still count in the denominator, so
    /// they pull the score down. No normalisation or clamping is applied,
    /// so count-valued leaves can produce scores above 1.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        if self.n_estimators == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .trees
            .iter()
            .filter_map(|tree| predict_tree(tree, features))
            .map(|[_, positive]| positive)
            .filter(|p| p.is_finite())
            .sum();
        sum / self.n_estimators as f64
    }

    /// Whether every leaf pair sums to 1, i.e. leaves hold class fractions
    /// rather than sample counts.
    pub fn leaves_are_fractions(&self) -> bool {
        self.trees
            .iter()
            .flat_map(DecisionTree::leaves)
            .all(|[neg, pos]| (neg + pos - 1.0).abs() < 1e-6)
    }

    pub fn summary(&self) -> ForestSummary {
        let depths: Option<Vec<usize>> = self
            .trees
            .iter()
            .map(|t| t.check_structure().ok())
            .collect();
        ForestSummary {
            n_estimators: self.n_estimators,
            total_nodes: self.trees.iter().map(DecisionTree::len).sum(),
            max_depth: depths.map(|d| d.into_iter().max().unwrap_or(0)),
            leaves_are_fractions: self.leaves_are_fractions(),
            feature_names: self.feature_names.clone(),
        }
    }
}
