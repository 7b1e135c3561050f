//! Letter grade classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Letter grade awarded for a single subject mark.
///
/// Variants are declared lowest first, so the derived ordering matches
/// academic rank (`Grade::F < Grade::APlus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "F")]
    F,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

/// Inclusive lower bounds, highest first.
const THRESHOLDS: &[(i64, Grade)] = &[
    (90, Grade::APlus),
    (80, Grade::A),
    (70, Grade::BPlus),
    (60, Grade::B),
    (50, Grade::C),
    (40, Grade::D),
];

/// Map a mark to its letter grade.
///
/// Defined for every integer; anything below 40 (including negative marks)
/// is an `F`, anything from 90 up (including marks above 100) is an `A+`.
pub fn classify(mark: i64) -> Grade {
    THRESHOLDS
        .iter()
        .find(|(lower, _)| mark >= *lower)
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::F)
}

impl Grade {
    /// All grades, lowest first.
    pub const ALL: [Grade; 7] = [
        Grade::F,
        Grade::D,
        Grade::C,
        Grade::B,
        Grade::BPlus,
        Grade::A,
        Grade::APlus,
    ];

    /// The printed label for this grade.
    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::ALL
            .iter()
            .find(|g| g.label().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("Unknown grade: {}", s))
    }
}
