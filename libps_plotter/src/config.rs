use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::RESULTS_FILE_NAME;
use super::error::ConfigError;

/// One entry of the plot-style table. A measurement whose name contains
/// `pattern` picks up these options; the table is scanned in insertion order
/// and the first matching entry wins. Insertion order is the documented
/// priority contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotStyle {
    pub pattern: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_label: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
    #[serde(default)]
    pub z_label: Option<String>,
}

/// Resolved rendering options for one measurement. All fields absent when no
/// pattern matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotOptions {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub z_label: Option<String>,
}

impl PlotStyle {
    fn options(&self) -> PlotOptions {
        PlotOptions {
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            z_label: self.z_label.clone(),
        }
    }
}

/// Physical layout and calibration constants of the PS module. These encode
/// detector assumptions that change between deployments, so they live in the
/// configuration instead of the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Hybrids carried by one optical group
    pub hybrids_per_module: usize,
    /// Pixel chips carried by one hybrid
    pub chips_per_hybrid: usize,
    /// Fixed ceiling of the shared noise color scale, in threshold DAC units
    pub noise_ceiling: f64,
    /// Substring marking the per-chip 2D noise field used for the mosaic
    pub noise_map_marker: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            hybrids_per_module: 2,
            chips_per_hybrid: 8,
            noise_ceiling: 6.0,
            noise_map_marker: String::from("2DPixelNoise"),
        }
    }
}

/// Settings of the summary table append. The trailing condition labels are
/// fixed test-stand conditions that are not discoverable from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Substring of the 1D measurement whose mean is extracted per hybrid
    pub measurement: String,
    /// Hybrid instance index that is always left out of the row
    pub excluded_hybrid: u32,
    pub temperature: String,
    pub noise_form: String,
    pub amplitude: String,
    pub lv_power: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            measurement: String::from("NoiseDistribution"),
            excluded_hybrid: 2,
            temperature: String::from("RT"),
            noise_form: String::from("Sine"),
            amplitude: String::from("100mV"),
            lv_power: String::from("1.25V"),
        }
    }
}

/// Structure representing the application configuration. Contains pathing,
/// detector layout, summary settings and the ordered plot-style table.
/// Configs are serializable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the per-run results (Run_<n>/Results.h5)
    pub results_path: PathBuf,
    /// Directory under which per-run plot trees are written
    pub plots_path: PathBuf,
    /// Path of the detector root inside the results store
    pub base_directory: String,
    pub layout: LayoutConfig,
    pub summary: SummaryConfig,
    pub plot_styles: Vec<PlotStyle>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from("Results"),
            plots_path: PathBuf::from("Plots"),
            base_directory: String::from("Detector/Board_0"),
            layout: LayoutConfig::default(),
            summary: SummaryConfig::default(),
            plot_styles: vec![PlotStyle {
                pattern: String::from("SCurve_Chip"),
                title: None,
                x_label: Some(String::from("Channel Number")),
                y_label: Some(String::from("Threshold")),
                z_label: None,
            }],
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Path of the results store of a run
    pub fn results_file(&self, run_number: i32) -> PathBuf {
        self.results_path
            .join(format!("Run_{run_number}"))
            .join(RESULTS_FILE_NAME)
    }

    /// Root of the plot tree written for a run
    pub fn output_directory(&self, run_number: i32) -> PathBuf {
        self.plots_path.join(format!("Run_{run_number}"))
    }

    /// Resolve the rendering options for a measurement name. Scans the style
    /// table in insertion order; the first pattern occurring in the name wins.
    /// Returns None when no pattern matches.
    pub fn resolve_style(&self, name: &str) -> Option<PlotOptions> {
        self.plot_styles
            .iter()
            .find(|style| name.contains(&style.pattern))
            .map(|style| style.options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(pattern: &str, title: &str) -> PlotStyle {
        PlotStyle {
            pattern: String::from(pattern),
            title: Some(String::from(title)),
            x_label: None,
            y_label: None,
            z_label: None,
        }
    }

    #[test]
    fn test_first_match_wins() {
        let mut config = Config::default();
        config.plot_styles = vec![style("Noise", "first"), style("2DPixelNoise", "second")];
        let options = config.resolve_style("D_B(0)_O(0)_2DPixelNoise_Chip(3)").unwrap();
        assert_eq!(options.title.as_deref(), Some("first"));
    }

    #[test]
    fn test_insertion_order_is_priority() {
        let mut config = Config::default();
        config.plot_styles = vec![style("2DPixelNoise", "specific"), style("Noise", "broad")];
        let options = config.resolve_style("2DPixelNoise_Chip(3)").unwrap();
        assert_eq!(options.title.as_deref(), Some("specific"));
        let options = config.resolve_style("NoiseDistribution").unwrap();
        assert_eq!(options.title.as_deref(), Some("broad"));
    }

    #[test]
    fn test_no_match_is_none() {
        let config = Config::default();
        assert!(config.resolve_style("PedestalMap").is_none());
    }

    #[test]
    fn test_default_roundtrips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.layout.chips_per_hybrid, 8);
        assert_eq!(back.summary.excluded_hybrid, 2);
        assert_eq!(back.plot_styles.len(), 1);
    }
}
