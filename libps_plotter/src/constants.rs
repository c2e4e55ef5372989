//! Naming conventions of the Ph2 ACF results tree and of the summary table.

/// Substring identifying an optical group (module) directory
pub const MODULE_PATTERN: &str = "OpticalGroup_";
/// Substring identifying a hybrid directory
pub const HYBRID_PATTERN: &str = "Hybrid_";
/// Substring identifying a strip-sensor chip directory
pub const STRIP_CHIP_PATTERN: &str = "SSA_";
/// Substring identifying a pixel chip directory
pub const PIXEL_CHIP_PATTERN: &str = "MPA_";

/// Name of the results store inside a run directory
pub const RESULTS_FILE_NAME: &str = "Results.h5";

/// The fixed run-identity prefix of the summary table. Hybrid columns follow
/// these and are kept sorted ascending by hybrid id.
pub const FIXED_SUMMARY_COLUMNS: [&str; 7] = [
    "RunNumber",
    "Date",
    "Temperature",
    "Noise Form",
    "Frequency",
    "Amplitude",
    "LV Power",
];
