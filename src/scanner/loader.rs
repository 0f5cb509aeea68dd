//! # 候选图片加载模块
//!
//! ## 设计思路
//!
//! 把三种上传渠道的原始输入统一转换成 `UploadCandidate`，但**不做**任何接受/拒绝判断，
//! 那是校验器的职责。加载器只负责确定“声明的媒体类型”和“字节长度”：
//!
//! - 文件：metadata 取大小，读取文件头用 `infer` 探测签名得出类型，内容延迟读取。
//! - Data URL（拖放网页图片时常见）：类型取自 `data:<type>;base64,` 标签，正文 Base64 解码。
//! - 剪贴板条目：由平台层给出类型与字节，取第一个 `image/*` 条目。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};

use super::source::{UploadCandidate, UploadChannel};
use super::ScanError;

/// 签名探测读取的文件头字节数。
const SIGNATURE_PROBE_BYTES: usize = 8192;
/// 无法识别签名时使用的媒体类型（校验器会按格式拒绝）。
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// 剪贴板中的单个条目。
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ClipboardItem {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// 从本地路径构造候选图片。
pub fn candidate_from_file(path: &Path, channel: UploadChannel) -> Result<UploadCandidate, ScanError> {
    log::info!("📁 读取本地图片 - 渠道: {} 路径: {}", channel.as_str(), path.display());

    let metadata = std::fs::metadata(path)
        .map_err(|e| ScanError::FileSystem(format!("无法读取文件信息 {}：{}", path.display(), e)))?;
    if !metadata.is_file() {
        return Err(ScanError::FileSystem(format!("不是普通文件：{}", path.display())));
    }

    let mut header = Vec::with_capacity(SIGNATURE_PROBE_BYTES);
    File::open(path)
        .and_then(|file| file.take(SIGNATURE_PROBE_BYTES as u64).read_to_end(&mut header))
        .map_err(|e| ScanError::FileSystem(format!("无法读取文件头 {}：{}", path.display(), e)))?;

    let media_type = sniff_media_type(&header);
    log::debug!("🔎 签名探测结果 - {} ({} bytes)", media_type, metadata.len());

    Ok(UploadCandidate::from_file(path, media_type, metadata.len(), channel))
}

/// 从 Data URL 构造候选图片。
pub fn candidate_from_data_url(data_url: &str, channel: UploadChannel) -> Result<UploadCandidate, ScanError> {
    let normalized = data_url.trim();
    let rest = normalized
        .strip_prefix("data:")
        .ok_or_else(|| ScanError::InvalidFormat("不是 Data URL".to_string()))?;

    let (label, body) = rest
        .split_once(',')
        .ok_or_else(|| ScanError::InvalidFormat("Data URL 缺少数据段".to_string()))?;

    let mut parts = label.split(';');
    let media_type = parts.next().unwrap_or_default().to_string();
    if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(ScanError::InvalidFormat("缺少 base64 标记".to_string()));
    }

    let bytes = general_purpose::STANDARD
        .decode(body)
        .map_err(|e| ScanError::Decode(format!("Base64 解码失败：{}", e)))?;

    log::info!("📝 Data URL 图片 - 类型: {} 大小: {} bytes", media_type, bytes.len());

    Ok(UploadCandidate::from_bytes(bytes, media_type, channel))
}

/// 从剪贴板条目中挑出第一张图片；没有图片时返回 `None`。
pub fn candidate_from_clipboard(items: Vec<ClipboardItem>) -> Option<UploadCandidate> {
    items
        .into_iter()
        .find(ClipboardItem::is_image)
        .map(|item| UploadCandidate::from_bytes(item.bytes, item.media_type, UploadChannel::Paste))
}

/// 通过文件签名（magic bytes）推断媒体类型。
pub fn sniff_media_type(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or(UNKNOWN_MEDIA_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_SIGNATURE: [u8; 16] = [
        137, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13, 73, 72, 68, 82,
    ];

    #[test]
    fn sniff_recognizes_png_and_unknown() {
        assert_eq!(sniff_media_type(&PNG_SIGNATURE), "image/png");
        assert_eq!(sniff_media_type(b"GIF89a\x01\x00\x01\x00"), "image/gif");
        assert_eq!(sniff_media_type(b"plain text"), UNKNOWN_MEDIA_TYPE);
    }

    #[test]
    fn file_candidate_uses_metadata_size_and_signature() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(&PNG_SIGNATURE).expect("write signature");
        file.write_all(&[0u8; 100]).expect("write body");

        let candidate = candidate_from_file(file.path(), UploadChannel::Picker).expect("load candidate");

        assert_eq!(candidate.media_type(), "image/png");
        assert_eq!(candidate.size(), 116);
        assert_eq!(candidate.channel(), UploadChannel::Picker);
        assert!(candidate.name().is_some());
    }

    #[test]
    fn missing_file_is_a_file_system_error() {
        let result = candidate_from_file(Path::new("/definitely/not/here.png"), UploadChannel::Drop);
        assert!(matches!(result, Err(ScanError::FileSystem(_))));
    }

    #[test]
    fn data_url_keeps_declared_type() {
        let encoded = general_purpose::STANDARD.encode(PNG_SIGNATURE);
        let candidate = candidate_from_data_url(&format!("data:image/webp;base64,{}", encoded), UploadChannel::Drop)
            .expect("parse data url");

        assert_eq!(candidate.media_type(), "image/webp");
        assert_eq!(candidate.size(), PNG_SIGNATURE.len() as u64);
    }

    #[test]
    fn data_url_without_base64_marker_is_rejected() {
        let result = candidate_from_data_url("data:image/png,abc", UploadChannel::Drop);
        assert!(matches!(result, Err(ScanError::InvalidFormat(_))));

        let result = candidate_from_data_url("https://example.com/a.png", UploadChannel::Drop);
        assert!(matches!(result, Err(ScanError::InvalidFormat(_))));
    }

    #[test]
    fn clipboard_picks_first_image_item() {
        let items = vec![
            ClipboardItem::new("text/plain", b"hello".to_vec()),
            ClipboardItem::new("image/png", vec![1, 2]),
            ClipboardItem::new("image/jpeg", vec![3]),
        ];

        let candidate = candidate_from_clipboard(items).expect("image item present");
        assert_eq!(candidate.media_type(), "image/png");
        assert_eq!(candidate.channel(), UploadChannel::Paste);

        assert!(candidate_from_clipboard(vec![ClipboardItem::new("text/plain", vec![])]).is_none());
    }
}
