//! Color legend generation for rendered thumbnails.

use serde::Serialize;

use crate::vis::VisualizationParameters;

/// One swatch of a legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    /// CSS color for the swatch.
    pub color: String,
    /// Data value at this swatch.
    pub value: f64,
}

impl LegendEntry {
    /// Value formatted to one decimal place.
    pub fn label(&self) -> String {
        format!("{:.1}", self.value)
    }
}

/// Build one swatch per palette entry, with values spread linearly from
/// `min` to `max`. A single-color palette yields one swatch at `min`.
pub fn build_legend(vis: &VisualizationParameters) -> Vec<LegendEntry> {
    let steps = vis.palette.len();
    let range = vis.max - vis.min;

    vis.palette
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let value = if steps > 1 {
                vis.min + i as f64 * (range / (steps - 1) as f64)
            } else {
                vis.min
            };
            LegendEntry {
                color: css_color(color),
                value,
            }
        })
        .collect()
}

/// Normalize a palette token for CSS: bare hex codes get a leading `#`,
/// named colors pass through.
///
/// Prefixing every token would turn `red` into `#red`, which browsers
/// reject, so only hex codes are prefixed.
pub fn css_color(token: &str) -> String {
    let token = token.trim();
    if token.starts_with('#') || !is_hex_code(token) {
        token.to_string()
    } else {
        format!("#{}", token)
    }
}

fn is_hex_code(s: &str) -> bool {
    matches!(s.len(), 3 | 6 | 8) && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vis::resolve;

    #[test]
    fn test_labels_interpolate_linearly() {
        let vis = resolve("UCSB-CHG/CHIRPS/DAILY", "precipitation");
        let labels: Vec<String> = build_legend(&vis).iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["1.0", "5.0", "9.0", "13.0", "17.0"]);
    }

    #[test]
    fn test_single_color_palette_does_not_divide_by_zero() {
        let vis = VisualizationParameters {
            min: 3.0,
            max: 9.0,
            palette: vec!["red".to_string()],
            gamma: None,
        };
        let legend = build_legend(&vis);
        assert_eq!(legend.len(), 1);
        assert_eq!(legend[0].label(), "3.0");
    }

    #[test]
    fn test_empty_palette_has_no_swatches() {
        let vis = VisualizationParameters {
            min: 0.0,
            max: 1.0,
            palette: Vec::new(),
            gamma: Some(1.3),
        };
        assert!(build_legend(&vis).is_empty());
    }

    #[test]
    fn test_css_color() {
        assert_eq!(css_color("0000ff"), "#0000ff");
        assert_eq!(css_color("#0000ff"), "#0000ff");
        assert_eq!(css_color("1621A2"), "#1621A2");
        assert_eq!(css_color("white"), "white");
        assert_eq!(css_color("lightblue"), "lightblue");
    }
}
