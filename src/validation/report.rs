//! Validation report generation.
//!
//! A [`ValidationReport`] collects one [`DayComparison`] per averaging day of a
//! benchmark case and renders it as Markdown, CSV or JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of comparing one day against its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    /// Maximum deviation within the tolerance
    Pass,
    /// Maximum deviation above the tolerance
    Fail,
    /// No reference available, only simulated values were produced
    NotCompared,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStatus::Pass => write!(f, "PASS"),
            ValidationStatus::Fail => write!(f, "FAIL"),
            ValidationStatus::NotCompared => write!(f, "N/A"),
        }
    }
}

/// Hourly means of one simulated day and, if available, its reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayComparison {
    /// Day of the horizon, starting at 1
    pub day: usize,
    /// Simulated hourly mean air temperatures (°C)
    pub simulated: Vec<f64>,
    /// Reference hourly mean air temperatures (°C)
    pub reference: Option<Vec<f64>>,
    /// Largest absolute hourly deviation (K)
    pub max_deviation: Option<f64>,
    pub status: ValidationStatus,
}

impl DayComparison {
    /// A day without reference values.
    pub fn simulated_only(day: usize, simulated: Vec<f64>) -> Self {
        DayComparison {
            day,
            simulated,
            reference: None,
            max_deviation: None,
            status: ValidationStatus::NotCompared,
        }
    }

    /// A day compared against its reference with a given deviation and tolerance.
    pub fn compared(
        day: usize,
        simulated: Vec<f64>,
        reference: Vec<f64>,
        max_deviation: f64,
        tolerance: f64,
    ) -> Self {
        let status = if max_deviation <= tolerance {
            ValidationStatus::Pass
        } else {
            ValidationStatus::Fail
        };
        DayComparison {
            day,
            simulated,
            reference: Some(reference),
            max_deviation: Some(max_deviation),
            status,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == ValidationStatus::Pass
    }

    pub fn failed(&self) -> bool {
        self.status == ValidationStatus::Fail
    }
}

/// Results of one benchmark case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub case_id: String,
    /// Acceptance tolerance on the hourly deviation (K)
    pub tolerance: f64,
    pub days: Vec<DayComparison>,
}

impl ValidationReport {
    pub fn new(case_id: impl Into<String>, tolerance: f64) -> Self {
        ValidationReport {
            case_id: case_id.into(),
            tolerance,
            days: Vec::new(),
        }
    }

    pub fn add_day(&mut self, day: DayComparison) {
        self.days.push(day);
    }

    /// Whether a reference was available for every day.
    pub fn is_compared(&self) -> bool {
        !self.days.is_empty()
            && self
                .days
                .iter()
                .all(|d| d.status != ValidationStatus::NotCompared)
    }

    /// True only if every day was compared and passed.
    pub fn passed(&self) -> bool {
        self.is_compared() && self.days.iter().all(DayComparison::passed)
    }

    pub fn fail_count(&self) -> usize {
        self.days.iter().filter(|d| d.failed()).count()
    }

    /// Worst deviation over all compared days (K).
    pub fn max_deviation(&self) -> Option<f64> {
        self.days
            .iter()
            .filter_map(|d| d.max_deviation)
            .reduce(f64::max)
    }

    pub fn status(&self) -> ValidationStatus {
        if !self.is_compared() {
            ValidationStatus::NotCompared
        } else if self.passed() {
            ValidationStatus::Pass
        } else {
            ValidationStatus::Fail
        }
    }

    /// Generates a Markdown report with a summary and hourly tables per day.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Validation Report: {}\n\n", self.case_id));

        output.push_str("## Summary\n\n");
        output.push_str("| Day | Max Deviation (K) | Status |\n");
        output.push_str("|-----|-------------------|--------|\n");
        for day in &self.days {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                day.day,
                format_optional(day.max_deviation, 3),
                day.status
            ));
        }
        output.push('\n');
        output.push_str(&format!("Tolerance: {:.3} K\n\n", self.tolerance));
        output.push_str(&format!("Overall: **{}**\n\n", self.status()));

        for day in &self.days {
            output.push_str(&format!("## Day {}\n\n", day.day));
            output.push_str("| Hour | Simulated (°C) | Reference (°C) | Deviation (K) |\n");
            output.push_str("|------|----------------|----------------|---------------|\n");
            for (hour, sim) in day.simulated.iter().enumerate() {
                let reference = day.reference.as_ref().and_then(|r| r.get(hour)).copied();
                output.push_str(&format!(
                    "| {} | {:.3} | {} | {} |\n",
                    hour + 1,
                    sim,
                    format_optional(reference, 3),
                    format_optional(reference.map(|r| sim - r), 3)
                ));
            }
            output.push('\n');
        }

        output
    }

    /// One row per day and hour.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("Case,Day,Hour,Simulated,Reference,Deviation,Status\n");
        for day in &self.days {
            for (hour, sim) in day.simulated.iter().enumerate() {
                let reference = day.reference.as_ref().and_then(|r| r.get(hour)).copied();
                csv.push_str(&format!(
                    "{},{},{},{:.4},{},{},{}\n",
                    self.case_id,
                    day.day,
                    hour + 1,
                    sim,
                    reference.map_or(String::new(), |r| format!("{:.4}", r)),
                    reference.map_or(String::new(), |r| format!("{:.4}", sim - r)),
                    day.status
                ));
            }
        }
        csv
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Prints a summary to stdout.
    pub fn print_summary(&self) {
        println!("Validation Report Summary: {}", self.case_id);
        for day in &self.days {
            println!(
                "  Day {}: max deviation {} K [{}]",
                day.day,
                format_optional(day.max_deviation, 4),
                day.status
            );
        }
        println!("  Tolerance: {:.3} K", self.tolerance);
        println!("  Overall: {}", self.status());
    }
}

fn format_optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}
