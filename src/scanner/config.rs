//! # 配置模块
//!
//! ## 设计思路
//!
//! 将扫描链路的可调参数集中到 `ScanConfig`，`Default` 即生产配置。
//! 外部设置文件通过 `ScanSettings`（所有字段可选）叠加到默认值之上，
//! 应用前统一做范围校验，非法值直接拒绝而不是静默修正。

use std::time::Duration;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use super::ScanError;

/// 单次扫描超时（毫秒）。
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 3_000;
/// 解码前允许的最大输出宽度（像素）。
pub const DEFAULT_MAX_WIDTH: u32 = 4_000;
/// 解码前允许的最大输出高度（像素）。
pub const DEFAULT_MAX_HEIGHT: u32 = 4_000;
/// 复制成功提示的显示时长（毫秒）。
pub const DEFAULT_TOAST_DURATION_MS: u64 = 2_000;

/// 极性尝试策略，对应“正常 / 反色”两种二值化方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InversionMode {
    /// 先正常，再反色。
    #[default]
    AttemptBoth,
    /// 只尝试正常极性。
    DontInvert,
    /// 只尝试反色。
    OnlyInvert,
    /// 先反色，再正常。
    InvertFirst,
}

impl InversionMode {
    /// 按尝试顺序返回每次是否反色。
    pub fn passes(self) -> &'static [bool] {
        match self {
            Self::AttemptBoth => &[false, true],
            Self::DontInvert => &[false],
            Self::OnlyInvert => &[true],
            Self::InvertFirst => &[true, false],
        }
    }
}

/// 解码适配器选项。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub inversion: InversionMode,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            inversion: InversionMode::AttemptBoth,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

/// 扫描配置。
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// 解码与超时计时器赛跑的时限（毫秒）。
    pub scan_timeout_ms: u64,
    /// 降采样与极性策略。
    pub decode: DecodeOptions,
    /// 完整解码前按图片头尺寸拦截的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 降采样滤镜。
    pub resize_filter: FilterType,
    /// 复制成功提示的显示时长（毫秒）。
    pub toast_duration_ms: u64,
    /// 单个 URL 结果时是否自动打开。
    pub auto_open: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_timeout_ms: DEFAULT_SCAN_TIMEOUT_MS,
            decode: DecodeOptions::default(),
            max_decoded_pixels: 16_384 * 16_384,
            resize_filter: FilterType::Triangle,
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
            auto_open: true,
        }
    }
}

impl ScanConfig {
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    /// 将外部设置叠加到当前配置。
    ///
    /// 任一字段越界则整体拒绝，当前配置保持不变。
    pub fn apply_settings(&mut self, settings: &ScanSettings) -> Result<(), ScanError> {
        let mut next = self.clone();

        if let Some(ms) = settings.scan_timeout_ms {
            if !(100..=60_000).contains(&ms) {
                return Err(ScanError::InvalidFormat(
                    "scan_timeout_ms 必须在 100~60000 毫秒之间".to_string(),
                ));
            }
            next.scan_timeout_ms = ms;
        }
        if let Some(width) = settings.max_width {
            if width == 0 {
                return Err(ScanError::InvalidFormat("max_width 不能为 0".to_string()));
            }
            next.decode.max_width = width;
        }
        if let Some(height) = settings.max_height {
            if height == 0 {
                return Err(ScanError::InvalidFormat("max_height 不能为 0".to_string()));
            }
            next.decode.max_height = height;
        }
        if let Some(inversion) = settings.inversion {
            next.decode.inversion = inversion;
        }
        if let Some(pixels) = settings.max_decoded_pixels {
            if pixels < 1_000_000 {
                return Err(ScanError::InvalidFormat(
                    "max_decoded_pixels 不能小于 1000000".to_string(),
                ));
            }
            next.max_decoded_pixels = pixels;
        }
        if let Some(filter) = settings.resize_filter.as_deref() {
            next.resize_filter = parse_filter(filter)?;
        }
        if let Some(auto_open) = settings.auto_open {
            next.auto_open = auto_open;
        }

        *self = next;
        Ok(())
    }
}

/// 设置文件结构（JSON），所有字段可选。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScanSettings {
    pub scan_timeout_ms: Option<u64>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub inversion: Option<InversionMode>,
    pub max_decoded_pixels: Option<u64>,
    pub resize_filter: Option<String>,
    pub auto_open: Option<bool>,
}

fn parse_filter(name: &str) -> Result<FilterType, ScanError> {
    match name.trim().to_lowercase().as_str() {
        "nearest" => Ok(FilterType::Nearest),
        "triangle" => Ok(FilterType::Triangle),
        "catmullrom" => Ok(FilterType::CatmullRom),
        "gaussian" => Ok(FilterType::Gaussian),
        "lanczos3" => Ok(FilterType::Lanczos3),
        other => Err(ScanError::InvalidFormat(format!(
            "未知降采样滤镜：{}（可选：nearest / triangle / catmullrom / gaussian / lanczos3）",
            other
        ))),
    }
}
