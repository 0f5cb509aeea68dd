//! # 扫描模块（scanner）
//!
//! ## 设计思路
//!
//! 该模块将“上传候选 → 校验 → 解码 → 分类 → 状态机”按职责拆分为多个子模块：
//!
//! - `loader`：把文件路径 / Data URL / 剪贴板条目转换成 `UploadCandidate`
//! - `validator`：纯函数校验（格式白名单 + 50 MiB 上限）
//! - `pipeline`：字节解码、像素上限、降采样
//! - `decoder`：识别原语接缝与 `QrDecoder` 适配器
//! - `orchestrator`：超时赛跑、尝试编号、状态机
//! - `config/error/source/model`：配置、错误、中间数据、结果模型
//!
//! ## 调用链
//!
//! ```text
//! 上传（picker / drop / paste）
//!    ↓
//! loader.rs（构造候选，探测类型与大小）
//!    ↓
//! validator.rs（接受 → ValidatedImage / 拒绝 → Rejection）
//!    ↓
//! orchestrator.rs（begin → run，与 3000ms 计时器赛跑）
//!    └─ decoder.rs（spawn_blocking）
//!         └─ pipeline.rs（解码 + 像素限制 + 降采样 → RGBA）
//!    ↓
//! model.rs（ClassifiedResult：URL / 文本）
//! ```

mod config;
mod decoder;
mod error;
mod loader;
mod model;
mod orchestrator;
mod pipeline;
mod source;
mod validator;

pub use config::{
    DecodeOptions, InversionMode, ScanConfig, ScanSettings, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH,
    DEFAULT_SCAN_TIMEOUT_MS, DEFAULT_TOAST_DURATION_MS,
};
pub use decoder::{Decode, DecodePrimitive, QrDecoder, RqrrPrimitive};
pub use error::ScanError;
pub use loader::{
    candidate_from_clipboard, candidate_from_data_url, candidate_from_file, sniff_media_type, ClipboardItem,
    UNKNOWN_MEDIA_TYPE,
};
pub use model::{
    AttemptId, ClassifiedResult, DecodedPayload, FailureKind, Point, QrLocation, ResultKind, ScanFailure, ScanState,
};
pub use orchestrator::ScanOrchestrator;
pub use source::{PreparedPixels, UploadCandidate, UploadChannel, ValidatedImage};
pub use validator::{
    accept, validate, validate_parts, Rejection, RejectionKind, ValidationOutcome, MAX_FILE_SIZE, SUPPORTED_FORMATS,
};
