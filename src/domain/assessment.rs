//! Risk assessment result types.
//!
//! Represents the interpreted output of the heart disease classifier.

/// Shown with every assessment.
pub const DISCLAIMER: &str = "This prediction is based on AI analysis and should not replace \
professional medical advice. Always consult with healthcare professionals for proper diagnosis \
and treatment.";

/// Binary risk classification for heart disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLabel {
    /// Class 0: no heart disease indicators
    Low,
    /// Class 1: heart disease indicators present
    High,
}

impl RiskLabel {
    /// Map a classifier label to a risk label.
    ///
    /// Returns `None` for anything other than 0 or 1.
    #[must_use]
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(Self::Low),
            1 => Some(Self::High),
            _ => None,
        }
    }

    /// The classifier label this risk label corresponds to.
    #[must_use]
    pub fn class(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }

    /// Result template headline.
    #[must_use]
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::High => "High Risk Alert",
        }
    }

    /// Result template summary line.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Low => "The patient shows low risk indicators for heart disease",
            Self::High => "The patient shows indicators of potential heart disease",
        }
    }

    /// Result template follow-up advice.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Low => "Continue maintaining a healthy lifestyle",
            Self::High => "Please consult with a cardiologist for further evaluation",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Outcome of a successful prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    /// Predicted risk label
    pub label: RiskLabel,

    /// Probability of the positive class (0.0 to 1.0)
    pub probability: f64,
}

impl Assessment {
    #[must_use]
    pub fn new(label: RiskLabel, probability: f64) -> Self {
        Self { label, probability }
    }

    /// Probability as shown in the result templates, e.g. `84.0%`.
    #[must_use]
    pub fn probability_percent(&self) -> String {
        format_percent(self.probability)
    }
}

/// Format a probability as a percentage with one decimal place.
#[must_use]
pub fn format_percent(probability: f64) -> String {
    // Adding 0.0 turns -0.0 into 0.0.
    format!("{:.1}%", probability * 100.0 + 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_label_from_class() {
        assert_eq!(RiskLabel::from_class(0), Some(RiskLabel::Low));
        assert_eq!(RiskLabel::from_class(1), Some(RiskLabel::High));
        assert_eq!(RiskLabel::from_class(2), None);
        assert_eq!(RiskLabel::from_class(-1), None);
        assert_eq!(RiskLabel::High.class(), 1);
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(format_percent(0.84), "84.0%");
        assert_eq!(format_percent(0.12), "12.0%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(1.0), "100.0%");
        assert_eq!(format_percent(0.4567), "45.7%");
        assert_eq!(format_percent(-0.0), "0.0%");
        assert_eq!(Assessment::new(RiskLabel::High, 0.84).probability_percent(), "84.0%");
    }

    proptest! {
        #[test]
        fn prop_percent_is_rounded_to_one_decimal(p in 0.0f64..=1.0) {
            let text = format_percent(p);
            prop_assert!(text.ends_with('%'));

            let number = text.trim_end_matches('%');
            let (_, decimals) = number.split_once('.').expect("one decimal place");
            prop_assert_eq!(decimals.len(), 1);

            let shown: f64 = number.parse().expect("numeric percentage");
            prop_assert!((shown - p * 100.0).abs() <= 0.05 + 1e-9);
        }
    }
}
