//! Console messages for a search run

use colored::*;
use std::path::Path;

use crate::bisect::{Outcome, Probe};

/// Header printed before each replacement pass, with 1-based bounds
pub fn format_probe(probe: &Probe, total_lines: usize) -> String {
    format!(
        "{} {} {}",
        "🔍 Replacing colors".bold(),
        format!("(L1={}, L2={})", probe.first + 1, probe.last + 1).white().bold(),
        format!("{} of {} lines", probe.len(), total_lines).dimmed()
    )
}

pub fn format_restored() -> String {
    "Backup restored.".dimmed().to_string()
}

pub fn format_interrupted() -> String {
    format!("\n{}", "Program terminated by user.".bold().yellow())
}

pub fn format_outcome(target: &Path, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Found { index, content } => {
            let mut output = format!(
                "{} {}:{}\n",
                "✅ The location is".bold().green(),
                target.display(),
                index + 1
            );
            output.push_str(&format!("L{}: {}", index + 1, content.trim().yellow()));
            output
        }
        Outcome::NotFound => "❌ Failure to find the right line!".bold().red().to_string(),
    }
}
