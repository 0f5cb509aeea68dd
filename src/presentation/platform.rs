//! # 平台能力模块
//!
//! ## 设计思路
//!
//! 展示层需要三种宿主能力：打开链接、写入文本剪贴板、读取剪贴板条目。
//! 统一抽象为 `Platform` trait，生产实现 `SystemPlatform` 基于 `arboard`
//! 与系统默认打开程序，测试中注入假实现即可覆盖自动打开与复制提示逻辑。

use std::borrow::Cow;
use std::io::Cursor;
use std::process::Command;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};

use crate::scanner::{ClipboardItem, ScanError};

/// 宿主平台能力。
pub trait Platform {
    /// 用系统默认程序打开链接。
    fn open_link(&self, url: &str) -> Result<(), ScanError>;

    /// 写入纯文本到剪贴板。
    fn write_text(&self, text: &str) -> Result<(), ScanError>;

    /// 读取剪贴板中的条目（图片在前）。
    fn read_clipboard(&self) -> Result<Vec<ClipboardItem>, ScanError>;
}

/// 基于操作系统的实现。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPlatform;

impl Platform for SystemPlatform {
    fn open_link(&self, url: &str) -> Result<(), ScanError> {
        log::info!("🔗 打开链接：{}", url);
        opener_command(url)
            .spawn()
            .map(|_| ())
            .map_err(|e| ScanError::Platform(format!("打开链接失败: {}", e)))
    }

    fn write_text(&self, text: &str) -> Result<(), ScanError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| ScanError::Clipboard(e.to_string()))?;

        clipboard
            .set_text(text.to_string())
            .map_err(|e| ScanError::Clipboard(e.to_string()))
    }

    fn read_clipboard(&self) -> Result<Vec<ClipboardItem>, ScanError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| ScanError::Clipboard(e.to_string()))?;

        let mut items = Vec::new();

        match clipboard.get_image() {
            Ok(image_data) => {
                let png = encode_clipboard_png(image_data.width, image_data.height, image_data.bytes)?;
                items.push(ClipboardItem::new("image/png", png));
            }
            Err(arboard::Error::ContentNotAvailable) => {}
            Err(err) => return Err(ScanError::Clipboard(err.to_string())),
        }

        if let Ok(text) = clipboard.get_text() {
            items.push(ClipboardItem::new("text/plain", text.into_bytes()));
        }

        log::debug!("📋 剪贴板条目数：{}", items.len());
        Ok(items)
    }
}

/// 剪贴板位图是原始 RGBA，重新编码为 PNG 后与其他渠道走同一条校验与解码路径。
fn encode_clipboard_png(width: usize, height: usize, bytes: Cow<'_, [u8]>) -> Result<Vec<u8>, ScanError> {
    let buffer = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(width as u32, height as u32, bytes.into_owned())
        .ok_or_else(|| ScanError::Clipboard("剪贴板图片缓冲长度异常".to_string()))?;

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(buffer)
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| ScanError::Clipboard(format!("剪贴板图片编码失败: {}", e)))?;

    Ok(cursor.into_inner())
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("rundll32");
    command.args(["url.dll,FileProtocolHandler", url]);
    command
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}
