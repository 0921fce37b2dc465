//! 应用配置
//!
//! 后端地址在构建时通过 `CLASSHUB_API_URL` 环境变量注入。

const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
}

impl AppConfig {
    pub fn new(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 读取构建时配置
    pub fn from_build_env() -> Self {
        let url = option_env!("CLASSHUB_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_API_URL);
        Self::new(url.trim())
    }

    /// 拼接完整 URL
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base_url, path)
        } else {
            format!("{}/{}", self.api_base_url, path)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_build_env()
    }
}
