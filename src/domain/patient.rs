//! Patient record for heart disease risk prediction.
//!
//! Thirteen clinical features in the column order the fitted artifacts expect
//! (age, sex, cp, trestbps, chol, fbs, restecg, thalach, exang, oldpeak, slope,
//! ca, thal).

/// Feature names in artifact column order.
pub const FEATURE_NAMES: [&str; 13] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Declared input domain of a single field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Free numeric entry bounded by `min` and an optional `max`.
    Numeric {
        min: f64,
        max: Option<f64>,
        step: f64,
        decimals: usize,
        default: f64,
    },
    /// One of a fixed set of coded values with display labels.
    Choice {
        options: &'static [(u8, &'static str)],
    },
}

/// Input definition for one patient field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    /// Label used when the form is drawn one line per field.
    pub short: &'static str,
    pub hint: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Value the field starts with on a fresh form.
    #[must_use]
    pub fn default_value(&self) -> f64 {
        match self.kind {
            FieldKind::Numeric { default, .. } => default,
            FieldKind::Choice { options } => options.first().map_or(0.0, |(code, _)| f64::from(*code)),
        }
    }

    /// Check a value against the declared domain.
    ///
    /// # Errors
    /// Returns a user-facing message naming the field and its bounds.
    pub fn check(&self, value: f64) -> Result<(), String> {
        if !value.is_finite() {
            return Err(format!("{}: Invalid number", self.label));
        }

        match self.kind {
            FieldKind::Numeric { min, max, .. } => {
                let above_max = max.is_some_and(|m| value > m);
                if value < min || above_max {
                    return Err(match max {
                        Some(m) => format!("{}: Value must be between {} and {}", self.label, min, m),
                        None => format!("{}: Value must be at least {}", self.label, min),
                    });
                }
                Ok(())
            }
            FieldKind::Choice { options } => {
                if options.iter().any(|(code, _)| f64::from(*code) == value) {
                    Ok(())
                } else {
                    Err(format!("{}: {} is not a valid option", self.label, value))
                }
            }
        }
    }
}

const NO_YES: &[(u8, &str)] = &[(0, "No"), (1, "Yes")];

/// Field definitions in `FEATURE_NAMES` order.
pub const FIELD_SPECS: [FieldSpec; 13] = [
    FieldSpec {
        name: "age",
        label: "Age (years)",
        short: "Age",
        hint: "years (0-120)",
        kind: FieldKind::Numeric { min: 0.0, max: Some(120.0), step: 1.0, decimals: 0, default: 50.0 },
    },
    FieldSpec {
        name: "sex",
        label: "Sex",
        short: "Sex",
        hint: "0 = Female, 1 = Male",
        kind: FieldKind::Choice { options: &[(0, "Female"), (1, "Male")] },
    },
    FieldSpec {
        name: "cp",
        label: "Chest Pain Type",
        short: "Chest Pain",
        hint: "type of chest pain experienced",
        kind: FieldKind::Choice {
            options: &[
                (0, "Typical Angina"),
                (1, "Atypical Angina"),
                (2, "Non-Anginal Pain"),
                (3, "Asymptomatic"),
            ],
        },
    },
    FieldSpec {
        name: "trestbps",
        label: "Resting Blood Pressure (mm Hg)",
        short: "Resting BP",
        hint: "normal 90-140",
        kind: FieldKind::Numeric { min: 0.0, max: None, step: 1.0, decimals: 0, default: 120.0 },
    },
    FieldSpec {
        name: "chol",
        label: "Serum Cholesterol (mg/dl)",
        short: "Cholesterol",
        hint: "normal < 200",
        kind: FieldKind::Numeric { min: 0.0, max: None, step: 1.0, decimals: 0, default: 200.0 },
    },
    FieldSpec {
        name: "fbs",
        label: "Fasting Blood Sugar > 120 mg/dl",
        short: "Fasting BS",
        hint: "0 = No, 1 = Yes",
        kind: FieldKind::Choice { options: NO_YES },
    },
    FieldSpec {
        name: "restecg",
        label: "Resting ECG Results",
        short: "Resting ECG",
        hint: "resting electrocardiogram",
        kind: FieldKind::Choice {
            options: &[
                (0, "Normal"),
                (1, "ST-T Wave Abnormality"),
                (2, "Left Ventricular Hypertrophy"),
            ],
        },
    },
    FieldSpec {
        name: "thalach",
        label: "Maximum Heart Rate Achieved",
        short: "Max Heart Rate",
        hint: "typical 60-220 bpm",
        kind: FieldKind::Numeric { min: 0.0, max: None, step: 1.0, decimals: 0, default: 150.0 },
    },
    FieldSpec {
        name: "exang",
        label: "Exercise Induced Angina",
        short: "Ex. Angina",
        hint: "0 = No, 1 = Yes",
        kind: FieldKind::Choice { options: NO_YES },
    },
    FieldSpec {
        name: "oldpeak",
        label: "ST Depression (Oldpeak)",
        short: "ST Depression",
        hint: "usually 0-6",
        kind: FieldKind::Numeric { min: 0.0, max: None, step: 0.1, decimals: 1, default: 0.0 },
    },
    FieldSpec {
        name: "slope",
        label: "Slope of Peak Exercise ST Segment",
        short: "ST Slope",
        hint: "peak exercise ST slope",
        kind: FieldKind::Choice { options: &[(0, "Upsloping"), (1, "Flat"), (2, "Downsloping")] },
    },
    FieldSpec {
        name: "ca",
        label: "Number of Major Vessels (0-3)",
        short: "Major Vessels",
        hint: "colored by fluoroscopy",
        kind: FieldKind::Numeric { min: 0.0, max: Some(3.0), step: 1.0, decimals: 0, default: 0.0 },
    },
    FieldSpec {
        name: "thal",
        label: "Thalassemia",
        short: "Thalassemia",
        hint: "thalassemia test result",
        kind: FieldKind::Choice {
            options: &[
                (0, "Normal"),
                (1, "Fixed Defect"),
                (2, "Reversible Defect"),
                (3, "Not Described"),
            ],
        },
    },
];

/// A single patient's clinical measurements.
///
/// Built fresh from the form on every submission and dropped afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatientRecord {
    /// Age in years
    pub age: f64,
    /// 0 = female, 1 = male
    pub sex: f64,
    /// Chest pain type (0-3)
    pub cp: f64,
    /// Resting blood pressure in mm Hg
    pub trestbps: f64,
    /// Serum cholesterol in mg/dl
    pub chol: f64,
    /// Fasting blood sugar > 120 mg/dl (0/1)
    pub fbs: f64,
    /// Resting ECG result (0-2)
    pub restecg: f64,
    /// Maximum heart rate achieved
    pub thalach: f64,
    /// Exercise induced angina (0/1)
    pub exang: f64,
    /// ST depression induced by exercise relative to rest
    pub oldpeak: f64,
    /// Slope of the peak exercise ST segment (0-2)
    pub slope: f64,
    /// Number of major vessels colored by fluoroscopy (0-3)
    pub ca: f64,
    /// Thalassemia result (0-3)
    pub thal: f64,
}

impl PatientRecord {
    /// Number of features in a record.
    pub const FIELD_COUNT: usize = FEATURE_NAMES.len();

    /// Convert to a row in `FEATURE_NAMES` order.
    #[must_use]
    pub fn to_row(&self) -> [f64; Self::FIELD_COUNT] {
        [
            self.age,
            self.sex,
            self.cp,
            self.trestbps,
            self.chol,
            self.fbs,
            self.restecg,
            self.thalach,
            self.exang,
            self.oldpeak,
            self.slope,
            self.ca,
            self.thal,
        ]
    }

    /// Create a record from a row in `FEATURE_NAMES` order.
    #[must_use]
    pub fn from_row(v: [f64; Self::FIELD_COUNT]) -> Self {
        Self {
            age: v[0],
            sex: v[1],
            cp: v[2],
            trestbps: v[3],
            chol: v[4],
            fbs: v[5],
            restecg: v[6],
            thalach: v[7],
            exang: v[8],
            oldpeak: v[9],
            slope: v[10],
            ca: v[11],
            thal: v[12],
        }
    }
}

impl Default for PatientRecord {
    /// The values a fresh form starts with.
    fn default() -> Self {
        Self::from_row(FIELD_SPECS.map(|spec| spec.default_value()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PatientRecord {
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
    fn test_specs_follow_feature_order() {
        let names: Vec<&str> = FIELD_SPECS.iter().map(|s| s.name).collect();
        assert_eq!(names, FEATURE_NAMES);
    }

    #[test]
    fn test_row_order() {
        let row = sample().to_row();
        assert_eq!(row.len(), 13);
        assert!((row[0] - 63.0).abs() < f64::EPSILON);
        assert!((row[3] - 145.0).abs() < f64::EPSILON);
        assert!((row[9] - 2.3).abs() < f64::EPSILON);
        assert!((row[12] - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_row() {
        assert_eq!(PatientRecord::from_row(sample().to_row()), sample());
    }

    #[test]
    fn test_defaults_match_form_defaults() {
        let record = PatientRecord::default();
        assert!((record.age - 50.0).abs() < f64::EPSILON);
        assert!((record.trestbps - 120.0).abs() < f64::EPSILON);
        assert!((record.chol - 200.0).abs() < f64::EPSILON);
        assert!((record.thalach - 150.0).abs() < f64::EPSILON);
        assert!(record.sex.abs() < f64::EPSILON);
        assert!(record.oldpeak.abs() < f64::EPSILON);
    }

    #[test]
    fn test_field_domains() {
        let age = &FIELD_SPECS[0];
        assert!(age.check(0.0).is_ok());
        assert!(age.check(120.0).is_ok());
        assert!(age.check(121.0).is_err());
        assert!(age.check(-1.0).is_err());
        assert!(age.check(f64::NAN).is_err());

        let chol = &FIELD_SPECS[4];
        assert!(chol.check(600.0).is_ok());
        assert!(chol.check(-0.5).is_err());

        let cp = &FIELD_SPECS[2];
        assert!(cp.check(3.0).is_ok());
        assert!(cp.check(4.0).is_err());
        assert!(cp.check(1.5).is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_generated_records_are_in_domain(record in strategies::valid_record()) {
            for (spec, value) in FIELD_SPECS.iter().zip(record.to_row()) {
                proptest::prop_assert!(spec.check(value).is_ok(), "{} = {}", spec.name, value);
            }
        }
    }
}
