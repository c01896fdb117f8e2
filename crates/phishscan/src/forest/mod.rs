//! Random forest model: artifact format, validation, and inference.
//!
//! A forest is loaded once from the training export and is read-only from
//! then on. Scores are the mean positive-class leaf value across trees.

pub mod descriptor;
pub mod model;

pub use descriptor::{ForestDescriptor, TreeDescriptor};
pub use model::{predict_tree, DecisionTree, Forest, ForestSummary, LEAF};
