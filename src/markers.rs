//! Bandwidth-transition markers drawn as dashed vertical lines

use crate::error::{AnalysisError, Result};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub time_s: f64,
    pub label: String,
    pub color: RGBColor,
}

impl Marker {
    pub fn new(time_s: f64, label: impl Into<String>, color: RGBColor) -> Self {
        Self {
            time_s,
            label: label.into(),
            color,
        }
    }
}

/// On-disk marker definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub time: f64,
    pub label: String,
    #[serde(default = "default_marker_color")]
    pub color: String,
}

fn default_marker_color() -> String {
    "gray".to_string()
}

impl TryFrom<MarkerSpec> for Marker {
    type Error = AnalysisError;

    fn try_from(spec: MarkerSpec) -> Result<Self> {
        if !spec.time.is_finite() {
            return Err(AnalysisError::InvalidMarkers(format!(
                "marker '{}' has a non-finite time",
                spec.label
            )));
        }
        let color = parse_color(&spec.color).ok_or_else(|| {
            AnalysisError::InvalidMarkers(format!("unknown color '{}'", spec.color))
        })?;
        Ok(Marker::new(spec.time, spec.label, color))
    }
}

pub const RED: RGBColor = RGBColor(255, 0, 0);
pub const GREEN: RGBColor = RGBColor(0, 128, 0);
pub const BLUE: RGBColor = RGBColor(0, 0, 255);
pub const PURPLE: RGBColor = RGBColor(128, 0, 128);
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const GRAY: RGBColor = RGBColor(128, 128, 128);

/// Named colors plus `#rrggbb`.
pub fn parse_color(name: &str) -> Option<RGBColor> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(RGBColor(channel(0)?, channel(2)?, channel(4)?));
    }

    match name.to_ascii_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "purple" => Some(PURPLE),
        "orange" => Some(ORANGE),
        "gray" | "grey" => Some(GRAY),
        "black" => Some(RGBColor(0, 0, 0)),
        "magenta" => Some(RGBColor(255, 0, 255)),
        "cyan" => Some(RGBColor(0, 255, 255)),
        _ => None,
    }
}

/// Built-in marker sets matching the shaping schedules of the test scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerPreset {
    /// 15Mbit -> 7Mbit -> 2Mbit -> 600kbit at 10/25/40 s
    Shaping,
    /// 10 s steps of the full bandwidth test
    Stepdown,
    /// Same steps as `Stepdown` compressed to 5 s, neutral colors
    Compact,
}

const STEPDOWN_LABELS: [&str; 4] = ["5Mbps→2Mbps", "2Mbps→1Mbps", "1Mbps→500kbps", "End of test"];

impl MarkerPreset {
    pub fn markers(self) -> Vec<Marker> {
        match self {
            MarkerPreset::Shaping => vec![
                Marker::new(10.0, "15Mbit → 7Mbit", RED),
                Marker::new(25.0, "7Mbit → 2Mbit", GREEN),
                Marker::new(40.0, "2Mbit → 600kbit", PURPLE),
            ],
            MarkerPreset::Stepdown => [10.0, 20.0, 30.0, 40.0]
                .into_iter()
                .zip(STEPDOWN_LABELS)
                .zip([RED, GREEN, PURPLE, ORANGE])
                .map(|((t, l), c)| Marker::new(t, l, c))
                .collect(),
            MarkerPreset::Compact => [5.0, 10.0, 15.0, 20.0]
                .into_iter()
                .zip(STEPDOWN_LABELS)
                .map(|(t, l)| Marker::new(t, l, GRAY))
                .collect(),
        }
    }
}

/// Parse a JSON array of marker definitions.
pub fn parse_markers(json: &str) -> Result<Vec<Marker>> {
    let specs: Vec<MarkerSpec> = serde_json::from_str(json)?;
    specs.into_iter().map(Marker::try_from).collect()
}

pub fn load_markers(path: &Path) -> Result<Vec<Marker>> {
    let json = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
    parse_markers(&json)
}

/// Resolve the marker set from command-line options.
pub fn select_markers(file: Option<&Path>, disabled: bool, preset: MarkerPreset) -> Result<Vec<Marker>> {
    if disabled {
        return Ok(Vec::new());
    }
    match file {
        Some(path) => load_markers(path),
        None => Ok(preset.markers()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let shaping = MarkerPreset::Shaping.markers();
        assert_eq!(shaping.iter().map(|m| m.time_s).collect::<Vec<_>>(), vec![10.0, 25.0, 40.0]);
        assert_eq!(shaping[2].color, PURPLE);

        let stepdown = MarkerPreset::Stepdown.markers();
        assert_eq!(stepdown.len(), 4);
        assert_eq!(stepdown[3].label, "End of test");
        assert_eq!(stepdown[3].color, ORANGE);

        let compact = MarkerPreset::Compact.markers();
        assert_eq!(compact.iter().map(|m| m.time_s).collect::<Vec<_>>(), vec![5.0, 10.0, 15.0, 20.0]);
        assert!(compact.iter().all(|m| m.color == GRAY));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("Red"), Some(RED));
        assert_eq!(parse_color("grey"), Some(GRAY));
        assert_eq!(parse_color("#0a0B0c"), Some(RGBColor(10, 11, 12)));
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("chartreuse"), None);
        // six bytes but not six hex digits
        assert_eq!(parse_color("#aéaaa"), None);
        assert_eq!(parse_color("#12345g"), None);
    }

    #[test]
    fn test_parse_markers() {
        let markers = parse_markers(r#"[{"time": 12.5, "label": "cut", "color": "blue"}, {"time": 30, "label": "restore"}]"#).unwrap();
        assert_eq!(markers[0], Marker::new(12.5, "cut", BLUE));
        assert_eq!(markers[1].color, GRAY);

        assert!(matches!(
            parse_markers(r#"[{"time": 1, "label": "x", "color": "nope"}]"#),
            Err(AnalysisError::InvalidMarkers(_))
        ));
        assert!(matches!(parse_markers("{}"), Err(AnalysisError::Json(_))));
        assert!(matches!(
            parse_markers(r##"[{"time": 1, "label": "x", "color": "#aéaaa"}]"##),
            Err(AnalysisError::InvalidMarkers(_))
        ));
    }

    #[test]
    fn test_select_markers() {
        assert!(select_markers(None, true, MarkerPreset::Shaping).unwrap().is_empty());
        assert_eq!(select_markers(None, false, MarkerPreset::Compact).unwrap().len(), 4);
        assert!(select_markers(Some(Path::new("/nonexistent/markers.json")), false, MarkerPreset::Compact).is_err());
    }
}
