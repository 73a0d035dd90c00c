//! Editor-facing properties of the waterfall widget.

use anyhow::{Context as _, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_BREAKPOINTS, DEFAULT_COLUMNS, DEFAULT_GAP, LayoutConfig};
use crate::injector::WaterfallInjector;

/// Plain-value properties as a visual editor stores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WaterfallProps {
    /// Comma-separated breakpoint widths, e.g. `"1280, 800, 400"`
    pub breakpoints: String,
    /// Comma-separated column counts, e.g. `"3, 2, 1"`
    pub columns: String,
    /// Gap in pixels
    pub gap: f32,
    /// Whether the layout runs at all
    pub is_active: bool,
}

impl Default for WaterfallProps {
    fn default() -> Self {
        Self {
            breakpoints: "1280, 800, 400".to_owned(),
            columns: "3, 2, 1".to_owned(),
            gap: DEFAULT_GAP,
            is_active: true,
        }
    }
}

impl WaterfallProps {
    /// Deserialize properties from JSON; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns an error if `source` is not valid JSON for these properties.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("invalid waterfall properties")
    }

    /// Layout configuration for these properties.
    ///
    /// Unparseable lists fall back to the default breakpoints and columns,
    /// keeping the configured gap.
    pub fn to_config(&self) -> LayoutConfig {
        LayoutConfig::parse(&self.breakpoints, &self.columns, self.gap).unwrap_or_else(|err| {
            warn!("falling back to default breakpoints: {err:#}");
            LayoutConfig::new(&DEFAULT_BREAKPOINTS, &DEFAULT_COLUMNS, self.gap)
        })
    }

    /// An injector configured from these properties, not yet attached.
    pub fn build_injector(&self) -> WaterfallInjector {
        WaterfallInjector::new(self.to_config()).with_enabled(self.is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_default_config() {
        let props = WaterfallProps::default();
        assert_eq!(props.to_config(), LayoutConfig::default());
        assert!(props.build_injector().is_enabled());
    }

    #[test]
    fn json_fields_are_camel_case_with_defaults() {
        let props = WaterfallProps::from_json(r#"{"columns": "4, 2", "breakpoints": "900, 0", "isActive": false}"#)
            .ok()
            .unwrap_or_default();
        assert_eq!(props.columns, "4, 2");
        assert!(!props.is_active);
        assert!((props.gap - DEFAULT_GAP).abs() < f32::EPSILON);
        assert_eq!(props.to_config().resolve_columns(950.0), 4);
        assert!(!props.build_injector().is_enabled());
    }

    #[test]
    fn malformed_lists_fall_back_to_defaults() {
        let _ = env_logger::builder().is_test(true).try_init();
        let props = WaterfallProps {
            breakpoints: "big, small".to_owned(),
            gap: 6.0,
            ..WaterfallProps::default()
        };
        let config = props.to_config();
        assert_eq!(config.resolve_columns(900.0), 2);
        assert!((config.gap() - 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn enormous_column_count_lays_out_with_capped_columns() {
        let props = WaterfallProps::from_json(r#"{"breakpoints": "0", "columns": "18446744073709551615"}"#)
            .ok()
            .unwrap_or_default();
        let outcome = crate::layout_heights(500.0, &[10.0], &props.to_config());
        assert_eq!(outcome.column_count, crate::MAX_COLUMNS);
        assert_eq!(outcome.placements.len(), 1);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(WaterfallProps::from_json("{\"gap\": \"wide\"}").is_err());
        assert!(WaterfallProps::from_json("not json").is_err());
    }
}
