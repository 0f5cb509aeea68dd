//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `UploadCandidate` 表示一次上传（选择文件 / 拖放 / 粘贴）产生的候选图片
//! - `ValidatedImage` 表示已通过校验的候选，只能由校验器构造
//! - `PreparedPixels` 表示可直接交给识别原语的 RGBA 数据

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::validator::MAX_FILE_SIZE;
use super::ScanError;

/// 上传渠道。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadChannel {
    /// 文件选择器。
    Picker,
    /// 拖放。
    Drop,
    /// 剪贴板粘贴。
    Paste,
}

impl UploadChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Picker => "picker",
            Self::Drop => "drop",
            Self::Paste => "paste",
        }
    }
}

/// 候选图片的字节来源。
///
/// 文件来源延迟读取，与浏览器 `File` 一样，校验阶段只需要声明的类型与大小。
#[derive(Debug, Clone)]
pub enum Payload {
    Memory(Vec<u8>),
    File(PathBuf),
}

impl Payload {
    /// 取出全部字节（文件来源在此时读取）。
    ///
    /// 文件在校验后仍可能被改写，读取时再按大小上限截断检查一次。
    pub fn into_bytes(self) -> Result<Vec<u8>, ScanError> {
        match self {
            Self::Memory(bytes) => Ok(bytes),
            Self::File(path) => read_capped(&path, MAX_FILE_SIZE),
        }
    }
}

fn read_capped(path: &Path, limit: u64) -> Result<Vec<u8>, ScanError> {
    let file = File::open(path)
        .map_err(|e| ScanError::FileSystem(format!("无法读取图片文件 {}：{}", path.display(), e)))?;

    let mut bytes = Vec::new();
    file.take(limit + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| ScanError::FileSystem(format!("无法读取图片文件 {}：{}", path.display(), e)))?;

    if bytes.len() as u64 > limit {
        return Err(ScanError::ResourceLimit(format!(
            "图片文件 {} 超过大小上限 {} 字节",
            path.display(),
            limit
        )));
    }
    Ok(bytes)
}

/// 一次上传产生的候选图片，创建后不可变。
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    media_type: String,
    size: u64,
    channel: UploadChannel,
    name: Option<String>,
    payload: Payload,
}

impl UploadCandidate {
    /// 由内存字节构造，大小取字节长度。
    pub fn from_bytes(bytes: Vec<u8>, media_type: impl Into<String>, channel: UploadChannel) -> Self {
        Self {
            media_type: media_type.into(),
            size: bytes.len() as u64,
            channel,
            name: None,
            payload: Payload::Memory(bytes),
        }
    }

    /// 由文件路径构造；大小与类型由调用方（加载器）预先探测。
    pub fn from_file(
        path: &Path,
        media_type: impl Into<String>,
        size: u64,
        channel: UploadChannel,
    ) -> Self {
        Self {
            media_type: media_type.into(),
            size,
            channel,
            name: path.file_name().map(|n| n.to_string_lossy().to_string()),
            payload: Payload::File(path.to_path_buf()),
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn channel(&self) -> UploadChannel {
        self.channel
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn into_payload(self) -> Payload {
        self.payload
    }
}

/// 已通过校验的候选图片。
#[derive(Debug, Clone)]
pub struct ValidatedImage {
    pub(crate) media_type: String,
    pub(crate) size: u64,
    pub(crate) channel: UploadChannel,
    pub(crate) payload: Payload,
}

impl ValidatedImage {
    pub(crate) fn from_candidate(candidate: UploadCandidate) -> Self {
        Self {
            media_type: candidate.media_type.clone(),
            size: candidate.size,
            channel: candidate.channel,
            payload: candidate.into_payload(),
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn channel(&self) -> UploadChannel {
        self.channel
    }
}

/// 解码阶段输出：RGBA 像素数据（可能已降采样）。
#[derive(Debug, Clone)]
pub struct PreparedPixels {
    /// 图像宽度（像素）。
    pub width: u32,
    /// 图像高度（像素）。
    pub height: u32,
    /// RGBA 字节数组（`width * height * 4`）。
    pub rgba: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_with(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(bytes).expect("write temp file");
        file
    }

    #[test]
    fn file_within_limit_is_read_whole() {
        let file = temp_with(b"12345");
        assert_eq!(read_capped(file.path(), 5).expect("read"), b"12345".to_vec());
    }

    #[test]
    fn file_grown_past_limit_is_refused() {
        let file = temp_with(b"123456");
        let result = read_capped(file.path(), 5);
        assert!(matches!(result, Err(ScanError::ResourceLimit(_))));
    }

    #[test]
    fn missing_file_is_filesystem_error() {
        let payload = Payload::File(PathBuf::from("/no/such/image.png"));
        assert!(matches!(payload.into_bytes(), Err(ScanError::FileSystem(_))));
    }
}
