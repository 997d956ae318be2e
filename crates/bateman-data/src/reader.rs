//! CSV readers for nuclide tables and inventories.
//!
//! ## Nuclide table
//!
//! The first row is a header. Every other row is a chain of six-column
//! blocks, one per nuclide:
//!
//! ```text
//! name, branching fraction, half-life, decay mode, gamma energies, gamma intensities
//! ```
//!
//! The block after a nuclide describes its daughter, and that block's
//! branching fraction column is the parent → daughter fraction (empty means
//! 1). A name containing `(stable)` is stable and ends the chain.
//!
//! A row with an empty first column continues an earlier row: its first
//! non-empty column holds a further daughter of the nuclide six columns to
//! the left on the nearest row above that has that column filled in.
//!
//! Gamma energies are either a single energy paired with the intensity
//! column, or a comma-separated list of `energy*intensity` pairs.
//!
//! ## Inventory
//!
//! The first row is a header; then `nuclide, amount[, unit]` with unit
//! `atoms` (default) or `Bq`.
//!
//! Bad data never aborts a read. Every problem lands in the returned
//! [`ValidationReport`] and the offending value is skipped or zeroed.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bateman_core::constants::{DEFAULT_BRANCHING_FRACTION, NUCLIDE_BLOCK_WIDTH, STABLE_MARKER};
use bateman_core::error::DataError;
use bateman_core::types::{GammaLine, Inventory, InventoryEntry, Nuclide, NuclideRegistry};
use bateman_core::units::parse_half_life;
use bateman_core::validation::{
    compare_definitions, validate_registry, ValidationIssue, ValidationReport,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};

use crate::error::FileError;

/// A parsed nuclide table.
#[derive(Debug, Clone, Default)]
pub struct NuclideTable {
    pub registry: NuclideRegistry,
    /// Read problems followed by registry validation findings.
    pub issues: ValidationReport,
}

/// A parsed inventory.
#[derive(Debug, Clone, Default)]
pub struct InventoryTable {
    pub inventory: Inventory,
    pub issues: ValidationReport,
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input)
}

fn open(path: &Path) -> Result<File, FileError> {
    File::open(path).map_err(|e| FileError::io(path, e))
}

fn line_of(record: &StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

/// Column `idx`, or the empty string past the end of the record.
fn field(record: &[String], idx: usize) -> &str {
    record.get(idx).map_or("", String::as_str)
}

fn is_stable(name: &str) -> bool {
    name.contains(STABLE_MARKER)
}

/// Strip the stable marker and surrounding whitespace.
pub fn normalize_name(name: &str) -> String {
    name.replacen(STABLE_MARKER, "", 1).trim().to_string()
}

fn parse_number(value: &str, line: usize, column: usize) -> Result<f64, DataError> {
    value.parse().map_err(|_| DataError::InvalidNumber {
        line,
        column,
        value: value.to_string(),
    })
}

/// Parse the two gamma columns of a nuclide block.
pub fn parse_gammas(energies: &str, intensities: &str) -> Result<Vec<GammaLine>, DataError> {
    if energies.is_empty() {
        return Ok(Vec::new());
    }
    let number = |s: &str| -> Result<f64, DataError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(0.0);
        }
        s.parse().map_err(|_| DataError::MalformedRecord {
            line: 0,
            reason: format!("bad gamma value '{s}'"),
        })
    };
    if !energies.contains(',') {
        return Ok(vec![GammaLine {
            energy_kev: number(energies)?,
            intensity: number(intensities)?,
        }]);
    }
    energies
        .split(',')
        .map(|pair| {
            let (energy, intensity) = pair.split_once('*').ok_or_else(|| DataError::MalformedRecord {
                line: 0,
                reason: format!("gamma '{}' is not energy*intensity", pair.trim()),
            })?;
            Ok(GammaLine {
                energy_kev: number(energy)?,
                intensity: number(intensity)?,
            })
        })
        .collect()
}

/// Accumulates nuclides and issues across the records of one table.
#[derive(Default)]
struct TableBuilder {
    registry: NuclideRegistry,
    issues: ValidationReport,
}

impl TableBuilder {
    fn unreadable(&mut self, line: usize, err: impl ToString) {
        let message = err.to_string();
        warn!(line, %message, "skipping unreadable nuclide data");
        self.issues.push(ValidationIssue::Unreadable { line, message });
    }

    fn add_daughter(&mut self, parent: &str, daughter: &str, fraction: &str, line: usize, column: usize) {
        let parent = normalize_name(parent);
        let daughter = normalize_name(daughter);
        let fraction = if fraction.is_empty() {
            DEFAULT_BRANCHING_FRACTION
        } else {
            match parse_number(fraction, line, column + 1) {
                Ok(f) => f,
                Err(e) => return self.unreadable(line, e),
            }
        };
        let Some(entry) = self.registry.get_mut(&parent) else {
            return self.unreadable(line, format!("parent {parent} of {daughter} is not defined"));
        };
        debug!(%parent, %daughter, fraction, "adding daughter");
        entry.daughters.insert(daughter, fraction);
    }

    fn add_nuclide(&mut self, record: &[String], start: usize, line: usize) {
        let raw = field(record, start);
        let name = normalize_name(raw);
        let nuclide = if is_stable(raw) {
            Nuclide::stable(name.clone())
        } else {
            let half_life = parse_half_life(field(record, start + 2)).unwrap_or_else(|e| {
                self.unreadable(line, e);
                0.0
            });
            let mut nuclide = Nuclide::new(name.clone(), half_life);
            match parse_gammas(field(record, start + 4), field(record, start + 5)) {
                Ok(gammas) => nuclide.gammas = gammas,
                Err(e) => self.unreadable(line, e),
            }
            nuclide
        };

        match self.registry.get(&name) {
            Some(first) => {
                let issues = compare_definitions(first, &nuclide);
                self.issues.extend(issues);
            }
            None => {
                debug!(%name, "adding new nuclide");
                self.registry.insert(nuclide);
            }
        }
    }

    /// Walk a chain of blocks starting at column `start`.
    fn process(&mut self, record: &[String], mut start: usize, mut parent: Option<String>, line: usize) {
        loop {
            let name = field(record, start);
            if let Some(p) = parent.take() {
                // The parent must exist before the edge is attached.
                self.add_daughter(&p, name, field(record, start + 1), line, start);
            }
            self.add_nuclide(record, start, line);
            if is_stable(name) || field(record, start + NUCLIDE_BLOCK_WIDTH).is_empty() {
                return;
            }
            parent = Some(name.to_string());
            start += NUCLIDE_BLOCK_WIDTH;
        }
    }

    /// Attach a continuation row to the nuclide it branches from.
    fn continue_from(&mut self, rows: &[Vec<String>], current: &[String], line: usize) {
        let Some(start) = current.iter().position(|c| !c.is_empty()) else {
            return;
        };
        if start < NUCLIDE_BLOCK_WIDTH {
            return self.unreadable(line, "continuation row does not line up with a parent column");
        }
        let parent_col = start - NUCLIDE_BLOCK_WIDTH;
        let parent = rows
            .iter()
            .rev()
            .map(|row| field(row, parent_col))
            .find(|name| !name.is_empty());
        match parent {
            Some(parent) => self.process(current, start, Some(parent.to_string()), line),
            None => self.unreadable(line, format!("no parent found in column {}", parent_col + 1)),
        }
    }
}

/// Read a nuclide table.
pub fn read_nuclides<R: Read>(input: R) -> Result<NuclideTable, FileError> {
    let mut builder = TableBuilder::default();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for record in csv_reader(input).records() {
        let record = record?;
        let line = line_of(&record);
        let row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.iter().all(String::is_empty) {
            continue;
        }
        if row[0].is_empty() {
            builder.continue_from(&rows, &row, line);
        } else {
            builder.process(&row, 0, None, line);
        }
        rows.push(row);
    }

    let TableBuilder {
        registry,
        mut issues,
    } = builder;
    issues.extend(validate_registry(&registry));
    info!(nuclides = registry.len(), issues = issues.len(), "read nuclide table");
    Ok(NuclideTable { registry, issues })
}

pub fn read_nuclides_path(path: &Path) -> Result<NuclideTable, FileError> {
    info!(path = %path.display(), "reading nuclides");
    read_nuclides(open(path)?)
}

fn inventory_entry(
    registry: &NuclideRegistry,
    record: &StringRecord,
    line: usize,
) -> Result<InventoryEntry, ValidationIssue> {
    let unreadable = |e: DataError| ValidationIssue::Unreadable {
        line,
        message: e.to_string(),
    };
    let name = record.get(0).unwrap_or_default();
    let Some(nuclide) = registry.get(name) else {
        return Err(ValidationIssue::UnknownInventoryNuclide {
            nuclide: name.to_string(),
        });
    };
    let amount = parse_number(record.get(1).unwrap_or_default(), line, 2).map_err(unreadable)?;
    match record.get(2).unwrap_or_default() {
        "" => Ok(InventoryEntry::new(name, amount)),
        unit if unit.eq_ignore_ascii_case("atoms") => Ok(InventoryEntry::new(name, amount)),
        unit if unit.eq_ignore_ascii_case("bq") => {
            InventoryEntry::from_activity(name, amount, nuclide.decay_constant()).map_err(unreadable)
        }
        unit => Err(unreadable(DataError::UnknownUnit(unit.to_string()))),
    }
}

/// Read an inventory. Nuclides missing from `registry` are reported and skipped.
pub fn read_inventory<R: Read>(input: R, registry: &NuclideRegistry) -> Result<InventoryTable, FileError> {
    let mut table = InventoryTable::default();
    for record in csv_reader(input).records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = line_of(&record);
        match inventory_entry(registry, &record, line) {
            Ok(entry) => table.inventory.push(entry),
            Err(issue) => {
                warn!(line, %issue, "skipping inventory row");
                table.issues.push(issue);
            }
        }
    }
    info!(entries = table.inventory.len(), "read inventory");
    Ok(table)
}

pub fn read_inventory_path(path: &Path, registry: &NuclideRegistry) -> Result<InventoryTable, FileError> {
    info!(path = %path.display(), "reading inventory");
    read_inventory(open(path)?, registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,fraction,half-life,mode,energies,intensities,\
                          name,fraction,half-life,mode,energies,intensities,\
                          name,fraction,half-life,mode,energies,intensities\n";

    fn read(body: &str) -> NuclideTable {
        read_nuclides(format!("{HEADER}{body}").as_bytes()).unwrap()
    }

    fn krypton_table() -> NuclideTable {
        read(
            "Kr-85m,,4.48 h,B-,151.2,0.75,Kr-85,0.212,3912 d,B-,514,0.0043,Rb-85 (stable),,,,,\n\
             ,,,,,,Rb-85 (stable),0.788,,,,,,,,,,\n",
        )
    }

    // --- names and gammas ---

    #[test]
    fn stable_marker_is_stripped() {
        assert_eq!(normalize_name("Rb-85 (stable)"), "Rb-85");
        assert_eq!(normalize_name("  Kr-85 "), "Kr-85");
    }

    #[test]
    fn single_gamma_uses_intensity_column() {
        let g = parse_gammas("151.2", "0.75").unwrap();
        assert_eq!(g, vec![GammaLine { energy_kev: 151.2, intensity: 0.75 }]);
    }

    #[test]
    fn gamma_list_is_split() {
        let g = parse_gammas("151.2*0.75, 304.9*0.14", "").unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g[1].energy_kev, 304.9);
        assert_eq!(g[1].intensity, 0.14);
    }

    #[test]
    fn gamma_list_without_star_is_malformed() {
        assert!(parse_gammas("151.2, 304.9", "").is_err());
    }

    #[test]
    fn empty_gamma_columns() {
        assert!(parse_gammas("", "0.5").unwrap().is_empty());
    }

    // --- nuclide table ---

    #[test]
    fn chained_record_builds_chain() {
        let table = krypton_table();
        let reg = &table.registry;
        assert_eq!(reg.len(), 3);
        let kr85m = reg.get("Kr-85m").unwrap();
        assert_eq!(kr85m.half_life, 4.48 * 3600.0);
        assert_eq!(kr85m.branching_fraction("Kr-85"), 0.212);
        assert_eq!(kr85m.gammas.len(), 1);
        let kr85 = reg.get("Kr-85").unwrap();
        assert_eq!(kr85.half_life, 3912.0 * 86_400.0);
        assert_eq!(kr85.branching_fraction("Rb-85"), 1.0);
        assert!(reg.get("Rb-85").unwrap().stable);
    }

    #[test]
    fn continuation_row_attaches_to_parent_column() {
        let table = krypton_table();
        let kr85m = table.registry.get("Kr-85m").unwrap();
        assert_eq!(kr85m.branching_fraction("Rb-85"), 0.788);
        assert!(table.issues.is_clean(), "{:?}", table.issues);
    }

    #[test]
    fn continuation_skips_blank_parent_rows() {
        let table = read(
            "A,,1 s,,,,B,0.5,2 s,,,,\n\
             ,,,,,,C,0.25,,,,,\n\
             ,,,,,,D (stable),0.25,,,,,\n",
        );
        let a = table.registry.get("A").unwrap();
        assert_eq!(a.daughters.len(), 3);
        assert_eq!(a.branching_fraction("D"), 0.25);
    }

    #[test]
    fn continuation_deeper_in_chain() {
        let table = read(
            "A,,1 s,,,,B,,2 s,,,,C (stable),,,,,\n\
             ,,,,,,,,,,,,D (stable),0.1,,,,\n",
        );
        let b = table.registry.get("B").unwrap();
        assert_eq!(b.branching_fraction("D"), 0.1);
    }

    #[test]
    fn repeated_definition_is_compared() {
        let table = read(
            "X,,1 h,,,,Y (stable),,,,,\n\
             X,,2 h,,,,Y (stable),,,,,\n",
        );
        assert_eq!(table.registry.get("X").unwrap().half_life, 3600.0);
        assert!(table
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::InconsistentHalfLife { .. })));
    }

    #[test]
    fn bad_half_life_is_zeroed_and_reported() {
        let table = read("X,,12 fortnights,,,\n");
        assert_eq!(table.registry.get("X").unwrap().half_life, 0.0);
        assert!(table
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::Unreadable { .. })));
    }

    #[test]
    fn bad_fraction_is_reported() {
        let table = read("X,,1 h,,,,Y (stable),lots,,,,\n");
        assert!(table.registry.get("X").unwrap().daughters.is_empty());
        assert!(!table.issues.is_clean());
    }

    #[test]
    fn orphan_continuation_is_reported() {
        let table = read(",,,,,,Y (stable),0.5,,,,\n");
        assert!(table.registry.is_empty());
        assert_eq!(table.issues.len(), 1);
    }

    #[test]
    fn blank_rows_are_ignored() {
        let table = read("X,,1 h,,,\n,,,,,\n");
        assert_eq!(table.registry.len(), 1);
    }

    // --- inventory ---

    #[test]
    fn inventory_in_atoms_and_becquerel() {
        let reg = krypton_table().registry;
        let csv = "nuclide,amount,unit\nKr-85m,1e6,\nKr-85,100,Bq\n";
        let table = read_inventory(csv.as_bytes(), &reg).unwrap();
        assert!(table.issues.is_clean());
        assert_eq!(table.inventory.atoms("Kr-85m"), 1e6);
        let lambda = reg.get("Kr-85").unwrap().decay_constant();
        assert!((table.inventory.atoms("Kr-85") - 100.0 / lambda).abs() < 1e-3);
    }

    #[test]
    fn unknown_inventory_nuclide_is_skipped() {
        let reg = krypton_table().registry;
        let csv = "nuclide,amount\nXe-133,5\nKr-85,1\n";
        let table = read_inventory(csv.as_bytes(), &reg).unwrap();
        assert_eq!(table.inventory.len(), 1);
        assert_eq!(
            table.issues.iter().next(),
            Some(&ValidationIssue::UnknownInventoryNuclide {
                nuclide: "Xe-133".into()
            })
        );
    }

    #[test]
    fn becquerel_of_stable_nuclide_is_rejected() {
        let reg = krypton_table().registry;
        let csv = "nuclide,amount,unit\nRb-85,5,Bq\n";
        let table = read_inventory(csv.as_bytes(), &reg).unwrap();
        assert!(table.inventory.is_empty());
        assert_eq!(table.issues.len(), 1);
    }

    #[test]
    fn unknown_unit_is_reported() {
        let reg = krypton_table().registry;
        let csv = "nuclide,amount,unit\nKr-85,5,Ci\n";
        let table = read_inventory(csv.as_bytes(), &reg).unwrap();
        assert!(table.inventory.is_empty());
        assert!(table.issues.iter().next().unwrap().to_string().contains("Ci"));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nuclides.csv");
        std::fs::write(&path, format!("{HEADER}X,,1 h,,,\n")).unwrap();
        let table = read_nuclides_path(&path).unwrap();
        assert!(table.registry.contains("X"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_nuclides_path(Path::new("/nonexistent/nuclides.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/nuclides.csv"));
    }
}
