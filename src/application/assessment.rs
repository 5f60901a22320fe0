//! Risk assessment service: runs one record through the fitted artifacts.

use std::sync::Arc;

use crate::adapters::sklearn::{FittedClassifier, FittedColumnTransformer};
use crate::domain::{Assessment, PatientRecord, RiskLabel};
use crate::ports::{Classifier, InferenceError, Preprocessor};

/// Service backed by the artifacts shipped on disk.
pub type DefaultAssessmentService = RiskAssessmentService<FittedColumnTransformer, FittedClassifier>;

/// Service for predicting heart disease risk from a patient record.
///
/// Holds the two read-only collaborators loaded at startup; nothing is
/// mutated or persisted per request.
pub struct RiskAssessmentService<P, C>
where
    P: Preprocessor,
    C: Classifier,
{
    preprocessor: Arc<P>,
    classifier: Arc<C>,
}

impl<P, C> Clone for RiskAssessmentService<P, C>
where
    P: Preprocessor,
    C: Classifier,
{
    fn clone(&self) -> Self {
        Self {
            preprocessor: Arc::clone(&self.preprocessor),
            classifier: Arc::clone(&self.classifier),
        }
    }
}

impl<P, C> RiskAssessmentService<P, C>
where
    P: Preprocessor,
    C: Classifier,
{
    /// Create a new assessment service.
    pub fn new(preprocessor: Arc<P>, classifier: Arc<C>) -> Self {
        Self {
            preprocessor,
            classifier,
        }
    }

    /// Predict the risk label and positive-class probability for a record.
    ///
    /// Runs `transform`, then `predict` and `predict_proba` on the transformed
    /// row. Patient values are never logged.
    ///
    /// # Errors
    /// Returns `InferenceError` if the transform or classifier fails, if the
    /// label is not 0 or 1, or if the probability is outside `[0, 1]`.
    pub fn assess(&self, record: &PatientRecord) -> Result<Assessment, InferenceError> {
        let result = self.run(record);

        match &result {
            Ok(assessment) => tracing::debug!("Risk assessment complete: label={}", assessment.label),
            Err(e) => tracing::warn!("Risk assessment failed: kind={}", e.kind()),
        }

        result
    }

    fn run(&self, record: &PatientRecord) -> Result<Assessment, InferenceError> {
        let row = self.preprocessor.transform(record)?;

        let class = self.classifier.predict(&row)?;
        let proba = self.classifier.predict_proba(&row)?;

        let probability = proba[1];
        if !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError::InvalidProbability(probability));
        }

        let label = RiskLabel::from_class(class).ok_or(InferenceError::UnsupportedLabel(class))?;

        Ok(Assessment::new(label, probability))
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::*;
    use super::*;
    use crate::domain::strategies::valid_record;
    use proptest::prelude::*;

    fn cleveland_record() -> PatientRecord {
        PatientRecord {
            age: 63.0,
            sex: 1.0,
            cp: 3.0,
            trestbps: 145.0,
            chol: 233.0,
            fbs: 1.0,
            restecg: 0.0,
            thalach: 150.0,
            exang: 0.0,
            oldpeak: 2.3,
            slope: 0.0,
            ca: 0.0,
            thal: 1.0,
        }
    }

    #[test]
    fn test_high_risk_assessment() {
        let svc = service(MockPreprocessor::default(), 1, 0.84);
        let assessment = svc.assess(&cleveland_record()).expect("assess");
        assert_eq!(assessment.label, RiskLabel::High);
        assert!((assessment.probability - 0.84).abs() < f64::EPSILON);
        assert_eq!(assessment.probability_percent(), "84.0%");
    }

    #[test]
    fn test_low_risk_assessment() {
        let svc = service(MockPreprocessor::default(), 0, 0.12);
        let assessment = svc.assess(&cleveland_record()).expect("assess");
        assert_eq!(assessment.label, RiskLabel::Low);
        assert_eq!(assessment.probability_percent(), "12.0%");
    }

    #[test]
    fn test_transform_failure_is_returned_not_raised() {
        let svc = service(
            MockPreprocessor::failing(InferenceError::Failed("scaler exploded".into())),
            1,
            0.9,
        );
        let err = svc.assess(&cleveland_record()).unwrap_err();
        assert_eq!(err, InferenceError::Failed("scaler exploded".into()));

        // The service stays usable after a failure.
        assert!(svc.assess(&cleveland_record()).is_err());
        assert_eq!(
            svc.preprocessor.calls.load(std::sync::atomic::Ordering::SeqCst),
            2
        );
    }

    #[test]
    fn test_rejects_non_binary_label() {
        let svc = service(MockPreprocessor::default(), 2, 0.5);
        assert_eq!(
            svc.assess(&cleveland_record()).unwrap_err(),
            InferenceError::UnsupportedLabel(2)
        );
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let svc = service(MockPreprocessor::default(), 1, 1.5);
        assert!(matches!(
            svc.assess(&cleveland_record()),
            Err(InferenceError::InvalidProbability(_))
        ));

        let svc = service(MockPreprocessor::default(), 1, f64::NAN);
        assert!(matches!(
            svc.assess(&cleveland_record()),
            Err(InferenceError::InvalidProbability(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_label_selects_risk(
            label in 0i64..=1,
            p in 0.0f64..=1.0,
            record in valid_record(),
        ) {
            let preprocessor = Arc::new(MockPreprocessor::default());
            let svc = RiskAssessmentService::new(
                Arc::clone(&preprocessor),
                Arc::new(MockClassifier { label, probability: p }),
            );
            let assessment = svc.assess(&record).expect("assess");
            let seen = *preprocessor.last.lock().expect("lock");
            prop_assert_eq!(seen, Some(record));
            prop_assert_eq!(i64::from(assessment.label.class()), label);
            prop_assert!((assessment.probability - p).abs() < 1e-12);
        }
    }
}
