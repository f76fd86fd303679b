use std::path::Path;

use gradecast::dataset::{Dataset, Outcome, StudentFeatures, StudentRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const HEADER: [&str; 9] = [
    "Attendance",
    "PreviousCGPA",
    "StudyHours",
    "Assignments",
    "Mid1Marks",
    "Mid2Marks",
    "QuizScores",
    "PassFail",
    "SemesterPercentage",
];

/// `0.4 * attendance + 0.6 * (mid1 + mid2)`, clamped to `[0, 100]`.
pub fn semester_percentage(attendance: f64, mid1: f64, mid2: f64) -> f64 {
    (0.4 * attendance + 0.6 * (mid1 + mid2)).clamp(0.0, 100.0)
}

/// Synthetic students whose targets follow [`semester_percentage`].
pub fn synthetic_records(rows: usize, seed: u64) -> Vec<StudentRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..rows)
        .map(|_| {
            let attendance = f64::from(rng.random_range(50u32..=100));
            let mid1 = f64::from(rng.random_range(0u32..=30));
            let mid2 = f64::from(rng.random_range(0u32..=30));
            let features = StudentFeatures {
                attendance,
                previous_cgpa: f64::from(rng.random_range(40u32..=100)) / 10.0,
                study_hours: f64::from(rng.random_range(0u32..=60)),
                assignments: f64::from(rng.random_range(0u32..=100)),
                mid1_marks: mid1,
                mid2_marks: mid2,
                quiz_scores: f64::from(rng.random_range(0u32..=30)),
            };
            let percentage = semester_percentage(attendance, mid1, mid2);
            StudentRecord {
                features,
                outcome: if percentage >= 40.0 {
                    Outcome::Pass
                } else {
                    Outcome::Fail
                },
                semester_percentage: percentage,
            }
        })
        .collect()
}

pub fn synthetic_dataset(rows: usize, seed: u64) -> Dataset {
    Dataset::from_records(synthetic_records(rows, seed))
}

/// Write records as a student CSV with the standard header.
pub fn write_students_csv(path: &Path, records: &[StudentRecord]) {
    let mut writer = csv::Writer::from_path(path).expect("create csv");
    writer.write_record(HEADER).expect("write header");
    for record in records {
        let f = &record.features;
        let row = [
            f.attendance.to_string(),
            f.previous_cgpa.to_string(),
            f.study_hours.to_string(),
            f.assignments.to_string(),
            f.mid1_marks.to_string(),
            f.mid2_marks.to_string(),
            f.quiz_scores.to_string(),
            record.outcome.to_string(),
            record.semester_percentage.to_string(),
        ];
        writer.write_record(&row).expect("write row");
    }
    writer.flush().expect("flush csv");
}
