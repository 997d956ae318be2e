//! Report files written after a solve.
//!
//! Everything goes into one output directory, created on first write:
//!
//! | file               | contents                                     |
//! |--------------------|----------------------------------------------|
//! | `error.log`        | one validation issue per line                |
//! | `nuclides.json`    | the nuclide registry                         |
//! | `inventory.json`   | elapsed time, timestamp, initial and decayed |
//! | `inventory.tex`    | LaTeX table of initial and decayed counts    |
//! | `diagnostics.json` | every intermediate matrix of the solve       |

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use bateman_core::types::{Inventory, NuclideRegistry};
use bateman_core::validation::ValidationReport;
use bateman_decay::DecayDiagnostics;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::FileError;

pub const ERROR_LOG: &str = "error.log";
pub const NUCLIDES_JSON: &str = "nuclides.json";
pub const INVENTORY_JSON: &str = "inventory.json";
pub const INVENTORY_TEX: &str = "inventory.tex";
pub const DIAGNOSTICS_JSON: &str = "diagnostics.json";

/// Result of one decay run, as written to `inventory.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecayReport {
    pub elapsed_secs: f64,
    pub timestamp: DateTime<Utc>,
    pub initial: Inventory,
    pub decayed: Inventory,
}

impl DecayReport {
    /// A report stamped with the current time.
    pub fn new(elapsed_secs: f64, initial: Inventory, decayed: Inventory) -> Self {
        Self {
            elapsed_secs,
            timestamp: Utc::now(),
            initial,
            decayed,
        }
    }

    /// Every nuclide in either inventory: decayed order first, then any
    /// initial nuclide that no longer appears.
    pub fn nuclides(&self) -> Vec<&str> {
        let mut names = self.decayed.nuclides();
        for name in self.initial.nuclides() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// LaTeX `tabular` of nuclide, initial and decayed atom counts.
    pub fn to_latex(&self) -> String {
        let mut out = String::new();
        out.push_str("\\begin{tabular}{lrr}\n\\hline\n");
        let _ = writeln!(
            out,
            "Nuclide & Initial (atoms) & After {} s (atoms) \\\\",
            self.elapsed_secs
        );
        out.push_str("\\hline\n");
        for name in self.nuclides() {
            let _ = writeln!(
                out,
                "{} & {:.4e} & {:.4e} \\\\",
                name,
                self.initial.atoms(name),
                self.decayed.atoms(name)
            );
        }
        out.push_str("\\hline\n\\end{tabular}\n");
        out
    }
}

/// Writes report files into a single directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, contents: &[u8]) -> Result<PathBuf, FileError> {
        fs::create_dir_all(&self.dir).map_err(|e| FileError::io(&self.dir, e))?;
        let path = self.dir.join(name);
        fs::write(&path, contents).map_err(|e| FileError::io(&path, e))?;
        info!(path = %path.display(), bytes = contents.len(), "wrote output file");
        Ok(path)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, FileError> {
        let json = serde_json::to_vec_pretty(value)?;
        self.write(name, &json)
    }

    /// `error.log`, written even when there is nothing to report.
    pub fn write_errors(&self, issues: &ValidationReport) -> Result<PathBuf, FileError> {
        let text = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        self.write(ERROR_LOG, text.as_bytes())
    }

    pub fn write_nuclides(&self, registry: &NuclideRegistry) -> Result<PathBuf, FileError> {
        self.write_json(NUCLIDES_JSON, registry)
    }

    pub fn write_report(&self, report: &DecayReport) -> Result<PathBuf, FileError> {
        self.write_json(INVENTORY_JSON, report)
    }

    pub fn write_latex(&self, report: &DecayReport) -> Result<PathBuf, FileError> {
        self.write(INVENTORY_TEX, report.to_latex().as_bytes())
    }

    pub fn write_diagnostics(&self, diagnostics: &DecayDiagnostics) -> Result<PathBuf, FileError> {
        self.write_json(DIAGNOSTICS_JSON, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bateman_core::types::Nuclide;
    use bateman_core::validation::ValidationIssue;

    fn report() -> DecayReport {
        DecayReport::new(
            3600.0,
            [("Kr-85m", 1e6)].into_iter().collect(),
            [("Kr-85m", 8.6e5), ("Kr-85", 3.0e4)].into_iter().collect(),
        )
    }

    // --- report ---

    #[test]
    fn nuclides_cover_both_inventories() {
        let r = DecayReport::new(
            1.0,
            [("A", 1.0), ("B", 1.0)].into_iter().collect(),
            [("B", 0.5), ("C", 0.5)].into_iter().collect(),
        );
        assert_eq!(r.nuclides(), vec!["B", "C", "A"]);
    }

    #[test]
    fn latex_has_one_row_per_nuclide() {
        let tex = report().to_latex();
        assert!(tex.starts_with("\\begin{tabular}"));
        assert!(tex.trim_end().ends_with("\\end{tabular}"));
        assert!(tex.contains("Kr-85m & 1.0000e6 & 8.6000e5 \\\\"));
        assert!(tex.contains("Kr-85 & 0.0000e0 & 3.0000e4 \\\\"));
    }

    // --- files ---

    #[test]
    fn creates_output_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(tmp.path().join("nested").join("output"));
        let path = writer.write_errors(&ValidationReport::new()).unwrap();
        assert!(path.exists());
        assert_eq!(fs::read_to_string(path).unwrap(), "");
    }

    #[test]
    fn error_log_has_one_issue_per_line() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(tmp.path());
        let mut issues = ValidationReport::new();
        issues.push(ValidationIssue::UnknownInventoryNuclide {
            nuclide: "Xe-133".into(),
        });
        issues.push(ValidationIssue::Unreadable {
            line: 4,
            message: "bad".into(),
        });
        let path = writer.write_errors(&issues).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(text.lines().next(), Some("nuclide not found in data: Xe-133"));
    }

    #[test]
    fn inventory_json_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(tmp.path());
        let path = writer.write_report(&report()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(json["elapsed_secs"], 3600.0);
        assert!(json["timestamp"].is_string());
        assert_eq!(json["initial"][0]["nuclide"], "Kr-85m");
        assert_eq!(json["decayed"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn nuclides_json_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(tmp.path());
        let registry: NuclideRegistry = [
            Nuclide::new("Kr-85", 3912.0 * 86_400.0).with_daughter("Rb-85", 1.0),
            Nuclide::stable("Rb-85"),
        ]
        .into_iter()
        .collect();
        let path = writer.write_nuclides(&registry).unwrap();
        let back: NuclideRegistry = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(back, registry);
    }

    #[test]
    fn latex_file_written() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(tmp.path());
        let path = writer.write_latex(&report()).unwrap();
        assert_eq!(path.file_name().unwrap(), INVENTORY_TEX);
        assert!(fs::read_to_string(path).unwrap().contains("tabular"));
    }

    #[test]
    fn unwritable_directory_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let writer = OutputWriter::new(blocker.join("output"));
        let err = writer.write_errors(&ValidationReport::new()).unwrap_err();
        assert!(matches!(err, FileError::Io { .. }));
    }
}
