use crate::domain::layout::SensorLayout;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Destination for rendered artifacts.
pub trait Storage {
    /// 寫入檔案並回傳完整路徑；同名檔案會被覆寫
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<PathBuf>;
}

/// 提供輸出根目錄、感測器配置與樣式；引擎以 `output_root` 解析所有輸出路徑
pub trait ConfigProvider {
    fn output_root(&self) -> &Path;
    fn layout(&self) -> &SensorLayout;
    fn plot_style(&self) -> &PlotStyle;
}

/// 單一子圖的像素上下限
pub const MIN_PANEL_SIZE: u32 = 100;
pub const MAX_PANEL_SIZE: u32 = 8000;

/// 圖表尺寸與線條樣式；整張圖的大小依子圖格數計算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    pub panel_width: u32,
    pub panel_height: u32,
    pub line_width: u32,
    pub title_font_size: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            panel_width: 1000,
            panel_height: 600,
            line_width: 2,
            title_font_size: 28,
        }
    }
}
