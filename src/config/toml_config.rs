use crate::config::ServiceConfig;
use crate::utils::error::{AnalyzerError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // 使用正規表達式匹配 ${VAR_NAME} 格式
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalyzerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        let mut config: ServiceConfig =
            toml::from_str(&processed_content).map_err(|e| AnalyzerError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        config.database_url = config.database_url.filter(|v| is_resolved(v));
        config.anthropic_api_key = config.anthropic_api_key.filter(|v| is_resolved(v));

        Ok(config)
    }

    /// Loads the file when given, then lets the environment override it.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }
}

/// 替換環境變數 (例如 ${API_KEY})，未設定的變數保持原樣
fn substitute_env_vars(content: &str) -> String {
    env_var_pattern()
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}

fn is_resolved(value: &str) -> bool {
    !value.trim().is_empty() && !env_var_pattern().is_match(value)
}
