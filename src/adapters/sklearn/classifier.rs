//! Fitted binary classifier loaded from `final_model.json`.
//!
//! Supports the two estimator families the model selection step exports:
//! logistic regression and random forest.

use serde::{Deserialize, Serialize};

use crate::ports::{Classifier, InferenceError};

use super::SUPPORTED_FORMAT_VERSION;

/// Serialized form of the fitted classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub format_version: u32,
    /// Class labels, negative class first.
    pub classes: Vec<i64>,
    pub n_features_in: usize,
    pub estimator: EstimatorArtifact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EstimatorArtifact {
    LogisticRegression { coef: Vec<f64>, intercept: f64 },
    RandomForest { trees: Vec<TreeArtifact> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    /// Node 0 is the root.
    pub nodes: Vec<NodeArtifact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeArtifact {
    /// Samples with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class sample counts (or weights) at the leaf.
    Leaf { value: Vec<f64> },
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { proba: [f64; 2] },
}

#[derive(Debug, Clone)]
enum Estimator {
    Logistic { coef: Vec<f64>, intercept: f64 },
    Forest { trees: Vec<Vec<Node>> },
}

/// A validated binary classifier.
#[derive(Debug, Clone)]
pub struct FittedClassifier {
    classes: [i64; 2],
    n_features_in: usize,
    estimator: Estimator,
}

impl FittedClassifier {
    /// Validate an artifact and build the evaluator.
    ///
    /// # Errors
    /// Returns a description of the first structural problem found.
    pub fn from_artifact(artifact: ClassifierArtifact) -> Result<Self, String> {
        if artifact.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(format!(
                "unsupported format_version {} (expected {SUPPORTED_FORMAT_VERSION})",
                artifact.format_version
            ));
        }
        if artifact.classes != [0, 1] {
            return Err(format!(
                "expected binary classes [0, 1], got {:?}",
                artifact.classes
            ));
        }
        let n = artifact.n_features_in;
        if n == 0 {
            return Err("n_features_in must be positive".into());
        }

        let estimator = match artifact.estimator {
            EstimatorArtifact::LogisticRegression { coef, intercept } => {
                if coef.len() != n {
                    return Err(format!(
                        "coefficient count {} does not match n_features_in {n}",
                        coef.len()
                    ));
                }
                if !intercept.is_finite() || coef.iter().any(|c| !c.is_finite()) {
                    return Err("non-finite logistic regression parameter".into());
                }
                Estimator::Logistic { coef, intercept }
            }
            EstimatorArtifact::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err("random forest has no trees".into());
                }
                let trees = trees
                    .into_iter()
                    .enumerate()
                    .map(|(t, tree)| build_tree(t, tree, n))
                    .collect::<Result<Vec<_>, _>>()?;
                Estimator::Forest { trees }
            }
        };

        Ok(Self {
            classes: [0, 1],
            n_features_in: n,
            estimator,
        })
    }

    /// Name of the estimator family, for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self.estimator {
            Estimator::Logistic { .. } => "logistic_regression",
            Estimator::Forest { .. } => "random_forest",
        }
    }

    fn check_width(&self, row: &[f64]) -> Result<(), InferenceError> {
        if row.len() != self.n_features_in {
            return Err(InferenceError::FeatureCount {
                got: row.len(),
                expected: self.n_features_in,
            });
        }
        Ok(())
    }

    fn decision_function(coef: &[f64], intercept: f64, row: &[f64]) -> f64 {
        coef.iter().zip(row).map(|(c, x)| c * x).sum::<f64>() + intercept
    }

    fn forest_proba(trees: &[Vec<Node>], row: &[f64]) -> [f64; 2] {
        let mut sum = [0.0, 0.0];
        for tree in trees {
            let leaf = walk(tree, row);
            sum[0] += leaf[0];
            sum[1] += leaf[1];
        }
        let n = trees.len() as f64;
        [sum[0] / n, sum[1] / n]
    }
}

fn build_tree(t: usize, tree: TreeArtifact, n_features: usize) -> Result<Vec<Node>, String> {
    if tree.nodes.is_empty() {
        return Err(format!("tree {t} has no nodes"));
    }
    let len = tree.nodes.len();

    tree.nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| match node {
            NodeArtifact::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if feature >= n_features {
                    return Err(format!("tree {t} node {i}: feature {feature} out of range"));
                }
                if !threshold.is_finite() {
                    return Err(format!("tree {t} node {i}: non-finite threshold"));
                }
                // Children after their parent keeps every walk finite.
                for child in [left, right] {
                    if child <= i || child >= len {
                        return Err(format!("tree {t} node {i}: invalid child index {child}"));
                    }
                }
                Ok(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                })
            }
            NodeArtifact::Leaf { value } => {
                if value.len() != 2 || value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(format!(
                        "tree {t} node {i}: leaf needs two non-negative class weights"
                    ));
                }
                let total = value[0] + value[1];
                if total <= 0.0 {
                    return Err(format!("tree {t} node {i}: leaf has zero weight"));
                }
                Ok(Node::Leaf {
                    proba: [value[0] / total, value[1] / total],
                })
            }
        })
        .collect()
}

fn walk(tree: &[Node], row: &[f64]) -> [f64; 2] {
    let mut index = 0;
    loop {
        match &tree[index] {
            Node::Leaf { proba } => return *proba,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                index = if row[*feature] <= *threshold {
                    *left
                } else {
                    *right
                };
            }
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier for FittedClassifier {
    fn n_features_in(&self) -> usize {
        self.n_features_in
    }

    fn predict(&self, row: &[f64]) -> Result<i64, InferenceError> {
        self.check_width(row)?;
        let positive = match &self.estimator {
            Estimator::Logistic { coef, intercept } => {
                Self::decision_function(coef, *intercept, row) > 0.0
            }
            Estimator::Forest { trees } => {
                let proba = Self::forest_proba(trees, row);
                // Ties go to the first class.
                proba[1] > proba[0]
            }
        };
        Ok(self.classes[usize::from(positive)])
    }

    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], InferenceError> {
        self.check_width(row)?;
        Ok(match &self.estimator {
            Estimator::Logistic { coef, intercept } => {
                let p1 = sigmoid(Self::decision_function(coef, *intercept, row));
                [1.0 - p1, p1]
            }
            Estimator::Forest { trees } => Self::forest_proba(trees, row),
        })
    }
}
