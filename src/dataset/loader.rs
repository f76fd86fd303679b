//! CSV loader for the historical student dataset.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::schema::{
    FEATURE_COUNT, Feature, Outcome, PASS_FAIL_COLUMN, SEMESTER_PERCENTAGE_COLUMN, StudentFeatures,
    StudentRecord, required_columns,
};

/// Default dataset filename, resolved against the working directory.
pub const DEFAULT_DATASET_FILE: &str = "student_data.csv";

#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("dataset not found: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("io error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column {0:?}")]
    MissingColumn(String),
    #[error("line {line}: invalid number {value:?} in column {column}")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },
    #[error("line {line}: invalid PassFail value {value:?}")]
    InvalidLabel { line: u64, value: String },
    #[error("dataset has no rows")]
    Empty,
}

/// Content hash identifying one dataset snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetFingerprint([u8; 32]);

impl DatasetFingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl fmt::Display for DatasetFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex()[..16])
    }
}

/// Fully loaded dataset snapshot.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<StudentRecord>,
    fingerprint: DatasetFingerprint,
}

impl Dataset {
    /// Build an in-memory dataset, fingerprinting the records themselves.
    pub fn from_records(records: Vec<StudentRecord>) -> Self {
        let mut hasher = blake3::Hasher::new();
        for record in &records {
            for value in record.features.to_row() {
                hasher.update(&value.to_le_bytes());
            }
            hasher.update(&[record.outcome.index() as u8]);
            hasher.update(&record.semester_percentage.to_le_bytes());
        }
        Self {
            records,
            fingerprint: DatasetFingerprint(*hasher.finalize().as_bytes()),
        }
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn fingerprint(&self) -> DatasetFingerprint {
        self.fingerprint
    }

    /// Number of rows per outcome, in [`Outcome::ALL`] order.
    pub fn outcome_counts(&self) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for record in &self.records {
            counts[record.outcome.index()] += 1;
        }
        counts
    }
}

/// Load the training CSV at `path`.
///
/// A missing file is reported as [`DatasetLoadError::NotFound`] so callers can
/// halt before anything is served.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetLoadError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DatasetLoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DatasetLoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let records = parse_records(&bytes)?;
    if records.is_empty() {
        return Err(DatasetLoadError::Empty);
    }
    let dataset = Dataset {
        records,
        fingerprint: DatasetFingerprint::of_bytes(&bytes),
    };
    info!(
        rows = dataset.len(),
        fingerprint = %dataset.fingerprint(),
        "Loaded dataset from {}",
        path.display()
    );
    Ok(dataset)
}

fn parse_records(bytes: &[u8]) -> Result<Vec<StudentRecord>, DatasetLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let columns = ColumnIndex::from_headers(reader.headers()?)?;
    let mut out = Vec::new();
    for row in reader.records() {
        let row = row?;
        out.push(columns.parse_row(&row)?);
    }
    debug!(rows = out.len(), "Parsed dataset rows");
    Ok(out)
}

/// Header name to field position, resolved once per file.
struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, DatasetLoadError> {
        let mut positions = HashMap::new();
        for column in required_columns() {
            let position = headers
                .iter()
                .position(|header| header == column)
                .ok_or_else(|| DatasetLoadError::MissingColumn(column.to_string()))?;
            positions.insert(column, position);
        }
        Ok(Self { positions })
    }

    fn field<'r>(&self, row: &'r StringRecord, column: &'static str) -> &'r str {
        self.positions
            .get(column)
            .and_then(|&idx| row.get(idx))
            .unwrap_or("")
    }

    fn number(&self, row: &StringRecord, column: &'static str) -> Result<f64, DatasetLoadError> {
        let raw = self.field(row, column);
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| DatasetLoadError::InvalidNumber {
                line: line_of(row),
                column: column.to_string(),
                value: raw.to_string(),
            })
    }

    fn parse_row(&self, row: &StringRecord) -> Result<StudentRecord, DatasetLoadError> {
        let mut values = [0.0f64; FEATURE_COUNT];
        for feature in Feature::ALL {
            values[feature.index()] = self.number(row, feature.column_name())?;
        }
        let label = self.field(row, PASS_FAIL_COLUMN);
        let outcome = label
            .parse::<Outcome>()
            .map_err(|_| DatasetLoadError::InvalidLabel {
                line: line_of(row),
                value: label.to_string(),
            })?;
        Ok(StudentRecord {
            features: StudentFeatures {
                attendance: values[Feature::Attendance.index()],
                previous_cgpa: values[Feature::PreviousCgpa.index()],
                study_hours: values[Feature::StudyHours.index()],
                assignments: values[Feature::Assignments.index()],
                mid1_marks: values[Feature::Mid1Marks.index()],
                mid2_marks: values[Feature::Mid2Marks.index()],
                quiz_scores: values[Feature::QuizScores.index()],
            },
            outcome,
            semester_percentage: self.number(row, SEMESTER_PERCENTAGE_COLUMN)?,
        })
    }
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|pos| pos.line()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEADER: &str = "Attendance,PreviousCGPA,StudyHours,Assignments,Mid1Marks,Mid2Marks,QuizScores,PassFail,SemesterPercentage";

    #[test]
    fn loads_rows_by_header_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("student_data.csv");
        std::fs::write(
            &path,
            format!("{HEADER}\n85,8.2,10,90,125,140,25,Pass,78.5\n40,4.1,2,30,20,35,8,Fail,31\n"),
        )
        .unwrap();

        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        let first = dataset.records()[0];
        assert_eq!(first.features.attendance, 85.0);
        assert_eq!(first.features.previous_cgpa, 8.2);
        assert_eq!(first.features.mid1_marks, 125.0);
        assert_eq!(first.features.mid2_marks, 140.0);
        assert_eq!(first.features.quiz_scores, 25.0);
        assert_eq!(first.outcome, Outcome::Pass);
        assert_eq!(first.semester_percentage, 78.5);
        assert_eq!(dataset.outcome_counts(), [1, 1]);
    }

    #[test]
    fn reordered_and_extra_columns_are_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(
            &path,
            "Name,SemesterPercentage,PassFail,QuizScores,Mid2Marks,Mid1Marks,Assignments,StudyHours,PreviousCGPA,Attendance\n\
             ana,66,Pass,20,100,90,80,12,7.5,91\n",
        )
        .unwrap();

        let record = load_dataset(&path).unwrap().records()[0];
        assert_eq!(record.features.attendance, 91.0);
        assert_eq!(record.features.mid1_marks, 90.0);
        assert_eq!(record.features.mid2_marks, 100.0);
        assert_eq!(record.semester_percentage, 66.0);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        match load_dataset(&path) {
            Err(DatasetLoadError::NotFound { path: reported }) => assert_eq!(reported, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(
            &path,
            "Attendance,PreviousCGPA,StudyHours,Assignments,Mid1Marks,Mid2Marks,PassFail,SemesterPercentage\n\
             85,8.2,10,90,125,140,Pass,78.5\n",
        )
        .unwrap();
        match load_dataset(&path) {
            Err(DatasetLoadError::MissingColumn(column)) => assert_eq!(column, "QuizScores"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn bad_values_report_their_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, format!("{HEADER}\n85,8.2,10,90,125,140,25,Maybe,78.5\n")).unwrap();
        match load_dataset(&path) {
            Err(DatasetLoadError::InvalidLabel { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "Maybe");
            }
            other => panic!("expected InvalidLabel, got {other:?}"),
        }

        std::fs::write(&path, format!("{HEADER}\n85,eight,10,90,125,140,25,Pass,78.5\n")).unwrap();
        assert!(matches!(
            load_dataset(&path),
            Err(DatasetLoadError::InvalidNumber { ref column, .. }) if column == "PreviousCGPA"
        ));
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, format!("{HEADER}\n")).unwrap();
        assert!(matches!(load_dataset(&path), Err(DatasetLoadError::Empty)));
    }

    #[test]
    fn fingerprint_tracks_file_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, format!("{HEADER}\n85,8.2,10,90,125,140,25,Pass,78.5\n")).unwrap();
        let first = load_dataset(&path).unwrap().fingerprint();
        assert_eq!(load_dataset(&path).unwrap().fingerprint(), first);

        std::fs::write(&path, format!("{HEADER}\n85,8.2,10,90,125,140,25,Pass,78.6\n")).unwrap();
        assert_ne!(load_dataset(&path).unwrap().fingerprint(), first);
    }
}
