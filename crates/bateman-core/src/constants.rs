//! Physical and data-format constants. All times are in seconds.

/// Natural log of 2. `λ = LN_2 / half_life`.
pub const LN_2: f64 = std::f64::consts::LN_2;

/// Seconds per year, as used by the nuclide tables (365.05 days, rounded).
pub const SECONDS_PER_YEAR: f64 = 3.154e7;

/// Seconds per day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Marker appended to a nuclide name in the data tables to flag it as stable.
pub const STABLE_MARKER: &str = "(stable)";

/// Branching fraction assumed when the data tables leave the column empty.
pub const DEFAULT_BRANCHING_FRACTION: f64 = 1.0;

/// Upper bound on the sum of a nuclide's branching fractions.
pub const MAX_BRANCHING_SUM: f64 = 1.0;

/// Number of columns describing one nuclide in a chained data record:
/// name, branching fraction, half-life, decay mode, gamma energies, gamma intensities.
pub const NUCLIDE_BLOCK_WIDTH: usize = 6;

/// Default threshold below which resulting atom counts are elided.
///
/// `0.0` keeps every non-zero count and drops only exact zeros.
pub const DEFAULT_ELIDE_BELOW: f64 = 0.0;
