//! Visualization parameters per (dataset, variable).
//!
//! Rules are evaluated in declaration order; the first rule whose dataset
//! matches exactly and whose variable matcher accepts the band wins. When no
//! rule matches, a generic 0-100 range with a six-color palette is used.

use serde::{Deserialize, Serialize};

/// Display range, palette and optional gamma for one rendered band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationParameters {
    pub min: f64,
    pub max: f64,
    pub palette: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
}

impl VisualizationParameters {
    /// Gamma to forward to the renderer. Only meaningful without a palette.
    pub fn render_gamma(&self) -> Option<f64> {
        if self.palette.is_empty() {
            self.gamma
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum VariableMatch {
    Exact(&'static str),
    AnyOf(&'static [&'static str]),
    Contains(&'static str),
}

impl VariableMatch {
    fn matches(&self, variable: &str) -> bool {
        match self {
            VariableMatch::Exact(name) => variable == *name,
            VariableMatch::AnyOf(names) => names.contains(&variable),
            VariableMatch::Contains(fragment) => variable.contains(fragment),
        }
    }
}

#[derive(Debug)]
struct VisRule {
    dataset: &'static str,
    variable: VariableMatch,
    min: f64,
    max: f64,
    gamma: Option<f64>,
    palette: &'static [&'static str],
}

const TEMPERATURE_PALETTE: &[&str] = &["1621A2", "white", "cyan", "green", "yellow", "orange", "red"];
const WIND_PALETTE: &[&str] = &["blue", "cyan", "green", "yellow", "orange", "red"];
const GOES_PALETTE: &[&str] = &[
    "black", "blue", "purple", "cyan", "green", "yellow", "orange", "red", "white",
];

const DEFAULT_MIN: f64 = 0.0;
const DEFAULT_MAX: f64 = 100.0;
const DEFAULT_PALETTE: &[&str] = &["blue", "cyan", "green", "yellow", "orange", "red"];

const RULES: &[VisRule] = &[
    // DAYMET V4
    VisRule {
        dataset: "NASA/ORNL/DAYMET_V4",
        variable: VariableMatch::AnyOf(&["tmax", "tmin"]),
        min: -40.0,
        max: 30.0,
        gamma: None,
        palette: TEMPERATURE_PALETTE,
    },
    VisRule {
        dataset: "NASA/ORNL/DAYMET_V4",
        variable: VariableMatch::Exact("prcp"),
        min: 0.0,
        max: 50.0,
        gamma: None,
        palette: &["white", "blue", "purple", "cyan", "green", "yellow", "orange", "red"],
    },
    VisRule {
        dataset: "NASA/ORNL/DAYMET_V4",
        variable: VariableMatch::Exact("srad"),
        min: 0.0,
        max: 400.0,
        gamma: None,
        palette: &["black", "blue", "purple", "cyan", "green", "yellow", "orange", "red"],
    },
    VisRule {
        dataset: "NASA/ORNL/DAYMET_V4",
        variable: VariableMatch::Exact("vp"),
        min: 0.0,
        max: 3000.0,
        gamma: None,
        palette: &["white", "blue", "cyan", "green", "yellow", "orange", "red"],
    },
    VisRule {
        dataset: "NASA/ORNL/DAYMET_V4",
        variable: VariableMatch::Exact("swe"),
        min: 0.0,
        max: 1000.0,
        gamma: None,
        palette: &["white", "lightblue", "blue", "purple"],
    },
    VisRule {
        dataset: "NASA/ORNL/DAYMET_V4",
        variable: VariableMatch::Exact("dayl"),
        min: 0.0,
        max: 86400.0,
        gamma: None,
        palette: &["black", "blue", "cyan", "yellow", "orange", "red"],
    },
    // NOAA GFS
    VisRule {
        dataset: "NOAA/GFS0P25",
        variable: VariableMatch::Exact("temperature_2m_above_ground"),
        min: -40.0,
        max: 35.0,
        gamma: None,
        palette: &["blue", "purple", "cyan", "green", "yellow", "red"],
    },
    VisRule {
        dataset: "NOAA/GFS0P25",
        variable: VariableMatch::Contains("wind"),
        min: -30.0,
        max: 30.0,
        gamma: None,
        palette: WIND_PALETTE,
    },
    VisRule {
        dataset: "NOAA/GFS0P25",
        variable: VariableMatch::Exact("relative_humidity_2m_above_ground"),
        min: 0.0,
        max: 100.0,
        gamma: None,
        palette: &["red", "orange", "yellow", "green", "cyan", "blue"],
    },
    VisRule {
        dataset: "NOAA/GFS0P25",
        variable: VariableMatch::Exact("total_precipitation_surface"),
        min: 0.0,
        max: 50.0,
        gamma: None,
        palette: &["white", "blue", "cyan", "green", "yellow", "orange", "red"],
    },
    // CHIRPS
    VisRule {
        dataset: "UCSB-CHG/CHIRPS/DAILY",
        variable: VariableMatch::Exact("precipitation"),
        min: 1.0,
        max: 17.0,
        gamma: None,
        palette: &["001137", "0aab1e", "e7eb05", "ff4a2d", "e90000"],
    },
    // GOES-16
    VisRule {
        dataset: "NOAA/GOES/16/MCMIPC",
        variable: VariableMatch::AnyOf(&["CMI_C01", "CMI_C02", "CMI_C03", "CMI_C13"]),
        min: 0.0,
        max: 0.7,
        gamma: Some(1.3),
        palette: GOES_PALETTE,
    },
    // SRTM
    VisRule {
        dataset: "USGS/SRTMGL1_003",
        variable: VariableMatch::Exact("elevation"),
        min: 0.0,
        max: 5000.0,
        gamma: None,
        palette: &["006600", "002200", "fff700", "ab7634", "c4d0ff", "ffffff"],
    },
    // GTOPO30
    VisRule {
        dataset: "USGS/GTOPO30",
        variable: VariableMatch::Exact("elevation"),
        min: -10.0,
        max: 8000.0,
        gamma: Some(1.6),
        palette: &["0000ff", "00ffff", "00ff00", "ffff00", "ff0000", "ffffff"],
    },
];

/// Resolve the visualization parameters for a band of a dataset.
pub fn resolve(dataset_id: &str, variable_id: &str) -> VisualizationParameters {
    RULES
        .iter()
        .find(|rule| rule.dataset == dataset_id && rule.variable.matches(variable_id))
        .map(|rule| VisualizationParameters {
            min: rule.min,
            max: rule.max,
            palette: to_owned(rule.palette),
            gamma: rule.gamma,
        })
        .unwrap_or_else(|| VisualizationParameters {
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            palette: to_owned(DEFAULT_PALETTE),
            gamma: None,
        })
}

fn to_owned(palette: &[&str]) -> Vec<String> {
    palette.iter().map(|c| c.to_string()).collect()
}
