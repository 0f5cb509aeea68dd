//! 进程级错误类型模块
//!
//! # 设计思路
//!
//! 扫描链路内部的技术性错误由 `scanner::ScanError` 承载，并且永远不会直接展示给用户。
//! `AppError` 只覆盖宿主进程自身的失败：命令行用法、配置文件、文件系统。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 实现 `Serialize` 将错误序列化为字符串，供 `--json` 输出使用。

use serde::Serialize;

/// 宿主进程统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 命令行参数错误
    #[error("参数错误: {0}")]
    Usage(String),

    /// 设置文件无法解析或取值越界
    #[error("配置错误: {0}")]
    Config(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// 进程退出码：用法错误为 2，其余为 1。
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Config(_) | Self::Io(_) => 1,
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
