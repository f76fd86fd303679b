//! Named-field data contract shared by the loader, the trainer and the form.
//!
//! Positional feature rows are only ever produced by [`StudentFeatures::to_row`],
//! which walks [`Feature::ALL`]. Training and prediction therefore agree on column
//! order by construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of input features per student.
pub const FEATURE_COUNT: usize = 7;

/// CSV header of the classification target.
pub const PASS_FAIL_COLUMN: &str = "PassFail";
/// CSV header of the regression target.
pub const SEMESTER_PERCENTAGE_COLUMN: &str = "SemesterPercentage";

/// Input features, in training order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    Attendance,
    PreviousCgpa,
    StudyHours,
    Assignments,
    Mid1Marks,
    Mid2Marks,
    QuizScores,
}

impl Feature {
    /// Every feature in the order used to build model rows.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Attendance,
        Feature::PreviousCgpa,
        Feature::StudyHours,
        Feature::Assignments,
        Feature::Mid1Marks,
        Feature::Mid2Marks,
        Feature::QuizScores,
    ];

    /// Column header used in the training CSV.
    pub fn column_name(self) -> &'static str {
        match self {
            Feature::Attendance => "Attendance",
            Feature::PreviousCgpa => "PreviousCGPA",
            Feature::StudyHours => "StudyHours",
            Feature::Assignments => "Assignments",
            Feature::Mid1Marks => "Mid1Marks",
            Feature::Mid2Marks => "Mid2Marks",
            Feature::QuizScores => "QuizScores",
        }
    }

    /// Position of this feature inside a model row.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column headers in training order.
    pub fn column_names() -> Vec<String> {
        Self::ALL
            .iter()
            .map(|feature| feature.column_name().to_string())
            .collect()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One student's input features; doubles as the query vector for predictions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StudentFeatures {
    /// Attendance percentage, `0..=100`.
    pub attendance: f64,
    /// Previous CGPA, `0.0..=10.0`.
    pub previous_cgpa: f64,
    /// Weekly study hours.
    pub study_hours: f64,
    /// Assignment completion percentage, `0..=100`.
    pub assignments: f64,
    /// Sum of first mid-term marks over all subjects.
    pub mid1_marks: f64,
    /// Sum of second mid-term marks over all subjects.
    pub mid2_marks: f64,
    /// Quiz/test score out of 30.
    pub quiz_scores: f64,
}

impl StudentFeatures {
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Attendance => self.attendance,
            Feature::PreviousCgpa => self.previous_cgpa,
            Feature::StudyHours => self.study_hours,
            Feature::Assignments => self.assignments,
            Feature::Mid1Marks => self.mid1_marks,
            Feature::Mid2Marks => self.mid2_marks,
            Feature::QuizScores => self.quiz_scores,
        }
    }

    /// Model row in [`Feature::ALL`] order.
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        Feature::ALL.map(|feature| self.value(feature))
    }
}

/// Classification target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    Fail,
    Pass,
}

impl Outcome {
    /// Outcomes in class-index order.
    pub const ALL: [Outcome; 2] = [Outcome::Fail, Outcome::Pass];

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Fail => "Fail",
            Outcome::Pass => "Pass",
        }
    }

    /// Class index used by the classifier.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn is_pass(self) -> bool {
        self == Outcome::Pass
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returned when a label is neither `Pass` nor `Fail`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown outcome label {0:?} (expected \"Pass\" or \"Fail\")")]
pub struct UnknownOutcome(pub String);

impl FromStr for Outcome {
    type Err = UnknownOutcome;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Pass" => Ok(Outcome::Pass),
            "Fail" => Ok(Outcome::Fail),
            other => Err(UnknownOutcome(other.to_string())),
        }
    }
}

/// One historical observation: features plus both targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub features: StudentFeatures,
    pub outcome: Outcome,
    /// Regression target, `0.0..=100.0`.
    pub semester_percentage: f64,
}

/// Every header the training CSV must provide.
pub fn required_columns() -> Vec<&'static str> {
    Feature::ALL
        .iter()
        .map(|feature| feature.column_name())
        .chain([PASS_FAIL_COLUMN, SEMESTER_PERCENTAGE_COLUMN])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_places_each_named_field_at_its_feature_index() {
        let features = StudentFeatures {
            attendance: 1.0,
            previous_cgpa: 2.0,
            study_hours: 3.0,
            assignments: 4.0,
            mid1_marks: 5.0,
            mid2_marks: 6.0,
            quiz_scores: 7.0,
        };
        let row = features.to_row();
        for feature in Feature::ALL {
            assert_eq!(row[feature.index()], features.value(feature), "{feature}");
        }
        assert_eq!(row[Feature::Mid1Marks.index()], 5.0);
        assert_eq!(row[Feature::QuizScores.index()], 7.0);
    }

    #[test]
    fn training_order_matches_dataset_headers() {
        assert_eq!(
            Feature::column_names(),
            [
                "Attendance",
                "PreviousCGPA",
                "StudyHours",
                "Assignments",
                "Mid1Marks",
                "Mid2Marks",
                "QuizScores",
            ]
        );
        for (idx, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), idx);
        }
    }

    #[test]
    fn outcome_parses_known_labels_only() {
        assert_eq!("Pass".parse::<Outcome>().unwrap(), Outcome::Pass);
        assert_eq!(" Fail ".parse::<Outcome>().unwrap(), Outcome::Fail);
        assert_eq!(
            "pass".parse::<Outcome>().unwrap_err(),
            UnknownOutcome("pass".into())
        );
        for outcome in Outcome::ALL {
            assert_eq!(Outcome::from_index(outcome.index()), Some(outcome));
        }
    }

    #[test]
    fn required_columns_cover_features_and_targets() {
        let columns = required_columns();
        assert_eq!(columns.len(), FEATURE_COUNT + 2);
        assert_eq!(columns[7], PASS_FAIL_COLUMN);
        assert_eq!(columns[8], SEMESTER_PERCENTAGE_COLUMN);
    }
}
