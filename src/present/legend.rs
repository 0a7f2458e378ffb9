use serde::Serialize;

use crate::{scale::{ColorScale, Rgb}, types::Overlay};

use super::format::{format_currency, format_number};

/// Color key for the active overlay: the ordered swatches and the labels at
/// both ends of the domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    pub overlay: Overlay,
    pub title: &'static str,
    pub swatches: Vec<Rgb>,
    pub min_label: String,
    pub max_label: String,
}

impl Legend {
    /// `None` when the scale has no domain, i.e. no record had a value.
    pub fn new(overlay: Overlay, scale: &ColorScale) -> Option<Self> {
        let (min, max) = scale.domain()?;
        Some(Self {
            overlay,
            title: overlay.label(),
            swatches: scale.range(),
            min_label: format_value(overlay, min),
            max_label: format_value(overlay, max),
        })
    }

    pub fn render_text(&self) -> String {
        let swatches = self.swatches.iter().map(Rgb::to_hex).collect::<Vec<_>>().join(" ");
        format!("{}\n  {}  {}  {}\n", self.title, self.min_label, swatches, self.max_label)
    }
}

/// Label for a domain endpoint of the given overlay.
pub fn format_value(overlay: Overlay, value: f64) -> String {
    match overlay {
        Overlay::Income => format_currency(value),
        Overlay::Age => format!("{:.0}%", value * 100.0),
        Overlay::Density => format!("{value:.0}/mi²"),
        Overlay::Population => format_number(value.round()),
        Overlay::Election => {
            if value < 0.0 {
                format!("D +{:.0}", -value)
            } else if value > 0.0 {
                format!("R +{value:.0}")
            } else {
                "Even".to_string()
            }
        }
    }
}
