//! Student records and the roster that holds them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// A subject mark with its derived letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub mark: u32,
    pub grade: Grade,
}

/// One student's row of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Roll identifier as written in the roster.
    pub roll: String,
    /// Full name of the student.
    pub name: String,
    pub father_name: String,
    pub mother_name: String,
    /// Subject scores in roster column order.
    pub subjects: IndexMap<String, SubjectScore>,
}

impl StudentRecord {
    /// Sum of all subject marks.
    pub fn total(&self) -> u64 {
        self.subjects.values().map(|s| u64::from(s.mark)).sum()
    }

    /// Score for one subject.
    pub fn score(&self, subject: &str) -> Option<&SubjectScore> {
        self.subjects.get(subject)
    }
}

/// An ordered, non-empty set of student records sharing one subject list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    /// Subject names in input column order.
    pub subjects: Vec<String>,
    /// Records in input row order.
    pub records: Vec<StudentRecord>,
}

impl Roster {
    /// Number of students.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the roster has no students. A validated roster never is.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &StudentRecord> {
        self.records.iter()
    }

    /// Find a record by roll identifier.
    pub fn find(&self, roll: &str) -> Option<&StudentRecord> {
        self.records.iter().find(|r| r.roll == roll)
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a StudentRecord;
    type IntoIter = std::slice::Iter<'a, StudentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::classify;

    fn record(marks: &[(&str, u32)]) -> StudentRecord {
        StudentRecord {
            roll: "1".to_string(),
            name: "Asha Rao".to_string(),
            father_name: "Vikram Rao".to_string(),
            mother_name: "Meena Rao".to_string(),
            subjects: marks
                .iter()
                .map(|(s, m)| {
                    (
                        s.to_string(),
                        SubjectScore {
                            mark: *m,
                            grade: classify(i64::from(*m)),
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_total_sums_all_subjects() {
        let r = record(&[("Maths", 95), ("English", 60)]);
        assert_eq!(r.total(), 155);
        assert_eq!(r.score("Maths").unwrap().grade, Grade::APlus);
        assert!(r.score("Art").is_none());
    }

    #[test]
    fn test_subjects_keep_insertion_order() {
        let r = record(&[("Zoology", 50), ("Art", 70), ("Maths", 80)]);
        let names: Vec<&str> = r.subjects.keys().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["Zoology", "Art", "Maths"]);
    }
}
