#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::layout::SensorLayout;
use crate::domain::ports::{ConfigProvider, PlotStyle, MAX_PANEL_SIZE, MIN_PANEL_SIZE};
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_range, Validate};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_ROOT: &str = "plots";

/// 執行時使用的完整設定：輸出目錄、感測器配置與圖表樣式
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    pub output_root: PathBuf,
    pub layout: SensorLayout,
    pub style: PlotStyle,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            layout: SensorLayout::glove(),
            style: PlotStyle::default(),
        }
    }
}

impl PlotSettings {
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }
}

impl ConfigProvider for PlotSettings {
    fn output_root(&self) -> &Path {
        &self.output_root
    }

    fn layout(&self) -> &SensorLayout {
        &self.layout
    }

    fn plot_style(&self) -> &PlotStyle {
        &self.style
    }
}

impl Validate for PlotSettings {
    fn validate(&self) -> Result<()> {
        validate_path("output.root", &self.output_root.to_string_lossy())?;
        validate_range("plot.panel_width", self.style.panel_width, MIN_PANEL_SIZE, MAX_PANEL_SIZE)?;
        validate_range("plot.panel_height", self.style.panel_height, MIN_PANEL_SIZE, MAX_PANEL_SIZE)?;
        validate_range("plot.line_width", self.style.line_width, 1, 10)?;
        validate_range("plot.title_font_size", self.style.title_font_size, 8, 96)?;
        self.layout.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = PlotSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.output_root(), Path::new("plots"));
    }

    #[test]
    fn test_tiny_panels_are_rejected() {
        let mut settings = PlotSettings::default().with_output_root("out");
        settings.style.panel_width = 10;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_huge_panels_are_rejected() {
        let mut settings = PlotSettings::default();
        settings.style.panel_width = 3_000_000_000;
        assert!(matches!(
            settings.validate(),
            Err(crate::utils::error::PlotError::InvalidConfigValueError { .. })
        ));

        settings.style.panel_width = MAX_PANEL_SIZE;
        assert!(settings.validate().is_ok());
    }
}
