//! Form values collected from the user and their conversion into a query vector.
//!
//! Every setter clamps to the ranges the form allows, so the features handed to
//! the models are always in bounds.

use crate::dataset::StudentFeatures;

/// Maximum marks per subject in one mid-term exam.
pub const MAX_MID_MARKS: u32 = 30;
/// Maximum quiz/test score.
pub const MAX_QUIZ_SCORE: u32 = 30;
pub const MIN_SUBJECTS: usize = 1;
pub const MAX_SUBJECTS: usize = 10;
pub const MAX_STUDY_HOURS: u32 = 60;
pub const MAX_CGPA: f64 = 10.0;

const DEFAULT_SUBJECTS: usize = 5;
const DEFAULT_MID1: u32 = 25;
const DEFAULT_MID2: u32 = 28;

/// Mid-term marks of one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectMarks {
    pub mid1: u32,
    pub mid2: u32,
}

impl SubjectMarks {
    pub fn new(mid1: u32, mid2: u32) -> Self {
        Self {
            mid1: mid1.min(MAX_MID_MARKS),
            mid2: mid2.min(MAX_MID_MARKS),
        }
    }
}

impl Default for SubjectMarks {
    fn default() -> Self {
        Self::new(DEFAULT_MID1, DEFAULT_MID2)
    }
}

/// Raw form state.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentForm {
    /// Attendance percentage.
    pub attendance: u32,
    pub previous_cgpa: f64,
    /// Weekly study hours.
    pub study_hours: u32,
    /// Assignment completion percentage.
    pub assignments: u32,
    /// Quiz/test score out of 30.
    pub quiz: u32,
    subjects: Vec<SubjectMarks>,
}

impl Default for StudentForm {
    fn default() -> Self {
        Self {
            attendance: 85,
            previous_cgpa: 8.2,
            study_hours: 10,
            assignments: 90,
            quiz: 25,
            subjects: vec![SubjectMarks::default(); DEFAULT_SUBJECTS],
        }
    }
}

impl StudentForm {
    pub fn subjects(&self) -> &[SubjectMarks] {
        &self.subjects
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Resize the subject list, keeping existing marks; new subjects get defaults.
    pub fn set_subject_count(&mut self, count: usize) {
        let count = count.clamp(MIN_SUBJECTS, MAX_SUBJECTS);
        self.subjects.resize(count, SubjectMarks::default());
    }

    /// Set one subject's marks; out-of-range indices are ignored.
    pub fn set_subject(&mut self, index: usize, marks: SubjectMarks) {
        if let Some(slot) = self.subjects.get_mut(index) {
            *slot = SubjectMarks::new(marks.mid1, marks.mid2);
        }
    }

    pub fn total_mid1(&self) -> u32 {
        self.subjects.iter().map(|s| s.mid1.min(MAX_MID_MARKS)).sum()
    }

    pub fn total_mid2(&self) -> u32 {
        self.subjects.iter().map(|s| s.mid2.min(MAX_MID_MARKS)).sum()
    }

    /// Upper bound of either mid-term total, `30 * subjects`.
    pub fn max_total(&self) -> u32 {
        MAX_MID_MARKS * self.subjects.len() as u32
    }

    /// Build the query vector, clamping every field to its allowed range.
    pub fn to_features(&self) -> StudentFeatures {
        StudentFeatures {
            attendance: f64::from(self.attendance.min(100)),
            previous_cgpa: self.previous_cgpa.clamp(0.0, MAX_CGPA),
            study_hours: f64::from(self.study_hours.min(MAX_STUDY_HOURS)),
            assignments: f64::from(self.assignments.min(100)),
            mid1_marks: f64::from(self.total_mid1()),
            mid2_marks: f64::from(self.total_mid2()),
            quiz_scores: f64::from(self.quiz.min(MAX_QUIZ_SCORE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_form() {
        let form = StudentForm::default();
        assert_eq!(form.subject_count(), 5);
        assert_eq!(form.total_mid1(), 125);
        assert_eq!(form.total_mid2(), 140);
        assert_eq!(form.max_total(), 150);
        let features = form.to_features();
        assert_eq!(features.attendance, 85.0);
        assert_eq!(features.previous_cgpa, 8.2);
        assert_eq!(features.mid1_marks, 125.0);
        assert_eq!(features.mid2_marks, 140.0);
        assert_eq!(features.quiz_scores, 25.0);
    }

    #[test]
    fn mid_totals_stay_within_thirty_per_subject() {
        for count in MIN_SUBJECTS..=MAX_SUBJECTS {
            let mut form = StudentForm::default();
            form.set_subject_count(count);
            for idx in 0..count {
                form.set_subject(idx, SubjectMarks::new(u32::MAX, (idx as u32) * 7));
            }
            assert!(form.total_mid1() <= 30 * count as u32);
            assert!(form.total_mid2() <= 30 * count as u32);
            assert_eq!(form.total_mid1(), form.max_total());
        }

        let mut form = StudentForm::default();
        form.set_subject_count(3);
        for idx in 0..3 {
            form.set_subject(idx, SubjectMarks::new(0, 0));
        }
        assert_eq!(form.total_mid1(), 0);
        assert_eq!(form.total_mid2(), 0);
    }

    #[test]
    fn subject_count_is_clamped_and_keeps_marks() {
        let mut form = StudentForm::default();
        form.set_subject(0, SubjectMarks::new(10, 11));
        form.set_subject_count(0);
        assert_eq!(form.subject_count(), 1);
        assert_eq!(form.subjects()[0], SubjectMarks::new(10, 11));
        form.set_subject_count(25);
        assert_eq!(form.subject_count(), MAX_SUBJECTS);
        assert_eq!(form.subjects()[9], SubjectMarks::default());
        form.set_subject(42, SubjectMarks::new(1, 1));
        assert_eq!(form.subject_count(), MAX_SUBJECTS);
    }

    #[test]
    fn features_are_clamped_to_form_ranges() {
        let form = StudentForm {
            attendance: 140,
            previous_cgpa: 12.5,
            study_hours: 99,
            assignments: 101,
            quiz: 31,
            ..StudentForm::default()
        };
        let features = form.to_features();
        assert_eq!(features.attendance, 100.0);
        assert_eq!(features.previous_cgpa, 10.0);
        assert_eq!(features.study_hours, 60.0);
        assert_eq!(features.assignments, 100.0);
        assert_eq!(features.quiz_scores, 30.0);
    }
}
