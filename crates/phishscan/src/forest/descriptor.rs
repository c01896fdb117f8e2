//! On-disk model artifact.
//!
//! The JSON layout written by the training script: one object per tree,
//! holding the fitted tree's parallel node arrays as-is.

use serde::{Deserialize, Serialize};

/// Serialised forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestDescriptor {
    pub n_estimators: usize,
    pub feature_names: Vec<String>,
    pub trees: Vec<TreeDescriptor>,
}

/// Serialised decision tree as parallel arrays indexed by node id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_nodes: Option<usize>,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    /// Split feature per node, `-2` at leaves.
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// `[negative, positive]` per node. May be null at internal nodes.
    pub value: Vec<Option<Vec<f64>>>,
}
