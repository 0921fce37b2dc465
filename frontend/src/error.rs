//! 前端错误类型

use classhub_shared::ErrorBody;

/// API 调用错误
///
/// `Display` 即展示给用户的错误文本。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// 请求未能到达服务器
    #[error("网络错误: {0}")]
    Network(String),

    /// 服务器返回非 2xx
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 响应体无法解析
    #[error("响应解析失败: {0}")]
    Decode(String),

    /// 请求体无法序列化
    #[error("请求构建失败: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// 从非 2xx 响应中得到错误文本
///
/// 优先级：固定文本 > 服务端 `{message}` > "兜底文本: 状态文本"。
pub fn failure_message(
    fixed: Option<&'static str>,
    fallback: &str,
    status_text: &str,
    body: &str,
) -> String {
    if let Some(fixed) = fixed {
        return fixed.to_string();
    }

    let server_message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());

    match server_message {
        Some(message) => message,
        None if status_text.is_empty() => fallback.to_string(),
        None => format!("{}: {}", fallback, status_text),
    }
}
