//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载扫描链路中的所有技术性错误来源。
//! 这些错误只会被写入日志；展示给用户的永远是编排器换算出的本地化文案。

/// 扫描链路统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("剪贴板错误：{0}")]
    Clipboard(String),

    #[error("平台错误：{0}")]
    Platform(String),
}

impl ScanError {
    /// 稳定的错误码，供日志检索与聚合。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::InvalidFormat(_) => "invalid_format",
            Self::ResourceLimit(_) => "resource_limit",
            Self::FileSystem(_) => "file_system",
            Self::Clipboard(_) => "clipboard",
            Self::Platform(_) => "platform",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_stable_per_variant() {
        assert_eq!(ScanError::Decode(String::new()).code(), "decode");
        assert_eq!(ScanError::ResourceLimit(String::new()).code(), "resource_limit");
        assert_eq!(ScanError::Platform("x".to_string()).to_string(), "平台错误：x");
    }
}
