//! Fitted column transformer loaded from `preprocessor.json`.

use serde::{Deserialize, Serialize};

use crate::domain::{PatientRecord, FEATURE_NAMES};
use crate::ports::{InferenceError, Preprocessor};

use super::SUPPORTED_FORMAT_VERSION;

/// Two categories closer than this are treated as the same value.
const CATEGORY_TOLERANCE: f64 = 1e-9;

/// Serialized form of the fitted preprocessing transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformerArtifact {
    pub format_version: u32,
    /// Input column order the transform was fitted against.
    pub feature_names: Vec<String>,
    /// Output blocks, emitted in this order.
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub transform: ColumnTransform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnTransform {
    /// `(x - mean) / scale`
    StandardScaler { mean: f64, scale: f64 },
    /// One output slot per category; exactly one is set to 1.0.
    OneHot {
        categories: Vec<f64>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
    /// Value copied through unchanged.
    Passthrough,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

impl ColumnTransform {
    fn width(&self) -> usize {
        match self {
            Self::OneHot { categories, .. } => categories.len(),
            Self::StandardScaler { .. } | Self::Passthrough => 1,
        }
    }

    fn validate(&self, column: &str) -> Result<(), String> {
        match self {
            Self::StandardScaler { mean, scale } => {
                if !mean.is_finite() || !scale.is_finite() || *scale == 0.0 {
                    return Err(format!(
                        "column '{column}': scaler needs a finite mean and a finite non-zero scale"
                    ));
                }
            }
            Self::OneHot { categories, .. } => {
                if categories.is_empty() {
                    return Err(format!("column '{column}': one-hot encoder has no categories"));
                }
                if categories.iter().any(|c| !c.is_finite()) {
                    return Err(format!("column '{column}': non-finite category"));
                }
                for (i, a) in categories.iter().enumerate() {
                    if categories[i + 1..]
                        .iter()
                        .any(|b| (a - b).abs() < CATEGORY_TOLERANCE)
                    {
                        return Err(format!("column '{column}': duplicate category {a}"));
                    }
                }
            }
            Self::Passthrough => {}
        }
        Ok(())
    }

    fn apply(&self, feature: &str, value: f64, out: &mut Vec<f64>) -> Result<(), InferenceError> {
        match self {
            Self::StandardScaler { mean, scale } => out.push((value - mean) / scale),
            Self::Passthrough => out.push(value),
            Self::OneHot {
                categories,
                handle_unknown,
            } => {
                let hit = categories
                    .iter()
                    .position(|c| (c - value).abs() < CATEGORY_TOLERANCE);
                if hit.is_none() && *handle_unknown == HandleUnknown::Error {
                    return Err(InferenceError::UnknownCategory {
                        feature: feature.to_string(),
                        value,
                    });
                }
                out.extend((0..categories.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
            }
        }
        Ok(())
    }
}

/// A validated column transformer with each output block bound to its input column.
#[derive(Debug, Clone)]
pub struct FittedColumnTransformer {
    blocks: Vec<(usize, ColumnTransform)>,
    width: usize,
}

impl FittedColumnTransformer {
    /// Validate an artifact and bind its columns to record positions.
    ///
    /// # Errors
    /// Returns a description of the first structural problem found.
    pub fn from_artifact(artifact: ColumnTransformerArtifact) -> Result<Self, String> {
        if artifact.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(format!(
                "unsupported format_version {} (expected {SUPPORTED_FORMAT_VERSION})",
                artifact.format_version
            ));
        }

        if artifact.feature_names.len() != FEATURE_NAMES.len()
            || artifact
                .feature_names
                .iter()
                .zip(FEATURE_NAMES.iter())
                .any(|(a, b)| a != b)
        {
            return Err(format!(
                "fitted column order {:?} does not match expected order {:?}",
                artifact.feature_names, FEATURE_NAMES
            ));
        }

        if artifact.columns.is_empty() {
            return Err("transformer has no output columns".into());
        }

        let mut blocks = Vec::with_capacity(artifact.columns.len());
        for column in artifact.columns {
            let index = FEATURE_NAMES
                .iter()
                .position(|name| *name == column.name)
                .ok_or_else(|| format!("unknown column '{}'", column.name))?;
            column.transform.validate(&column.name)?;
            blocks.push((index, column.transform));
        }

        let width = blocks.iter().map(|(_, t)| t.width()).sum();
        Ok(Self { blocks, width })
    }
}

impl Preprocessor for FittedColumnTransformer {
    fn output_width(&self) -> usize {
        self.width
    }

    fn transform(&self, record: &PatientRecord) -> Result<Vec<f64>, InferenceError> {
        let row = record.to_row();
        let mut out = Vec::with_capacity(self.width);

        for (index, transform) in &self.blocks {
            let feature = FEATURE_NAMES[*index];
            let value = row[*index];
            if !value.is_finite() {
                return Err(InferenceError::NonFinite {
                    feature: feature.to_string(),
                });
            }
            transform.apply(feature, value, &mut out)?;
        }

        Ok(out)
    }
}
