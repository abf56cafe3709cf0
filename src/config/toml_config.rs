use crate::config::{PlotSettings, DEFAULT_OUTPUT_ROOT};
use crate::domain::layout::SensorLayout;
use crate::domain::ports::PlotStyle;
use crate::utils::error::{PlotError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub plot: PlotStyle,
    /// 未設定時使用預設的六指手套配置
    pub layout: Option<SensorLayout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub root: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_OUTPUT_ROOT.to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PlotError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PlotError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static RE: OnceLock<regex::Regex> = OnceLock::new();
        let re = RE.get_or_init(|| regex::Regex::new(r"\$\{([^}]+)\}").expect("static pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn into_settings(self) -> PlotSettings {
        PlotSettings {
            output_root: PathBuf::from(self.output.root),
            layout: self.layout.unwrap_or_default(),
            style: self.plot,
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.clone().into_settings().validate()
    }
}
