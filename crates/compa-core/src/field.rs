//! # Input Fields
//!
//! The seven columns of an employee record, in upload order. Used to name
//! the field in validation errors and to recognise header cells.

use serde::{Deserialize, Serialize};

/// A named employee input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    EmployeeCode,
    EmployeeName,
    JobTitle,
    YearsOfExperience,
    PerformanceRating,
    CurrentSalary,
    MidOfScale,
}

impl InputField {
    /// All fields in column order.
    pub const ALL: [InputField; 7] = [
        Self::EmployeeCode,
        Self::EmployeeName,
        Self::JobTitle,
        Self::YearsOfExperience,
        Self::PerformanceRating,
        Self::CurrentSalary,
        Self::MidOfScale,
    ];

    /// Canonical column header.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EmployeeCode => "Employee Code",
            Self::EmployeeName => "Employee Name",
            Self::JobTitle => "Job Title",
            Self::YearsOfExperience => "Years of Experience",
            Self::PerformanceRating => "Performance Rating",
            Self::CurrentSalary => "Current Salary",
            Self::MidOfScale => "Mid of Scale",
        }
    }

    /// Zero-based column position in an upload.
    pub fn column(&self) -> usize {
        match self {
            Self::EmployeeCode => 0,
            Self::EmployeeName => 1,
            Self::JobTitle => 2,
            Self::YearsOfExperience => 3,
            Self::PerformanceRating => 4,
            Self::CurrentSalary => 5,
            Self::MidOfScale => 6,
        }
    }

    /// Accepted alternative headers, already normalized.
    fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::EmployeeCode => &["emp code", "employee id"],
            Self::EmployeeName => &["name", "emp name"],
            Self::JobTitle => &["title", "position"],
            Self::YearsOfExperience => &["years experience", "experience years"],
            Self::PerformanceRating => &["rating", "perf rating"],
            Self::CurrentSalary => &["salary", "current pay"],
            Self::MidOfScale => &["mid scale", "midpoint", "mid point"],
        }
    }

    /// Whether a header cell names this field.
    ///
    /// Matching is case-insensitive with whitespace collapsed. The rating
    /// column also accepts decorated headers such as
    /// `"Performance Rating (1-5)"`.
    pub fn matches_header(&self, header: &str) -> bool {
        let normalized = normalize_header(header);
        if normalized == self.label().to_ascii_lowercase() {
            return true;
        }
        if self.synonyms().contains(&normalized.as_str()) {
            return true;
        }
        matches!(self, Self::PerformanceRating) && normalized.starts_with("performance rating")
    }
}

impl std::fmt::Display for InputField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercase and collapse runs of whitespace to a single space.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
