//! # 解码与降采样流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 位图 → RGBA”的过程集中管理，并在完整解码前做一次尺寸检查，
//! 降低超大图片触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码
//! 4. 任一边超过上限时，按 `min(max_w / w, max_h / h)` 等比缩放并向下取整
//! 5. 转换 RGBA，并校验字节长度一致性

use fast_image_resize as fr;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageReader, Rgba};
use std::io::Cursor;

use super::config::{DecodeOptions, ScanConfig};
use super::source::PreparedPixels;
use super::{QrDecoder, ScanError};

impl<P> QrDecoder<P> {
    /// 将图片字节解码为（可能已降采样的）RGBA 数据。
    pub(crate) fn prepare_pixels(
        bytes: &[u8],
        config: &ScanConfig,
        options: &DecodeOptions,
    ) -> Result<PreparedPixels, ScanError> {
        image::guess_format(bytes)
            .map_err(|e| ScanError::InvalidFormat(format!("不支持的图片格式：{}", e)))?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ScanError::Decode(format!("图片解码失败：{}", e)))?;

        let (raw_width, raw_height) = decoded.dimensions();
        if raw_width == 0 || raw_height == 0 {
            return Err(ScanError::Decode("图片尺寸为 0".to_string()));
        }

        let (target_width, target_height) =
            target_dimensions(raw_width, raw_height, options.max_width, options.max_height);

        let output = if (target_width, target_height) == (raw_width, raw_height) {
            decoded
        } else {
            log::info!(
                "🧩 降采样：{}x{} -> {}x{}（filter={:?}）",
                raw_width,
                raw_height,
                target_width,
                target_height,
                config.resize_filter
            );
            Self::resize(decoded, target_width, target_height, config.resize_filter)
        };

        let (width, height) = output.dimensions();
        let rgba = output.to_rgba8().into_raw();

        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ScanError::ResourceLimit("图片尺寸导致内存溢出风险".to_string()))?;

        if rgba.len() != expected_len {
            return Err(ScanError::Decode("解码后像素数据长度异常".to_string()));
        }

        Ok(PreparedPixels { width, height, rgba })
    }

    /// 仅通过内存中的图片头信息读取宽高。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ScanError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ScanError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ScanError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    fn validate_pixel_limits(config: &ScanConfig, width: u32, height: u32) -> Result<(), ScanError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ScanError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(ScanError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn resize(
        image: DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: image::imageops::FilterType,
    ) -> DynamicImage {
        match Self::resize_with_fast_image_resize(&image, target_width, target_height, filter) {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 降采样失败，回退 image::resize_exact：{}", err);
                image.resize_exact(target_width, target_height, filter)
            }
        }
    }

    fn resize_with_fast_image_resize(
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: image::imageops::FilterType,
    ) -> Result<DynamicImage, ScanError> {
        let src = image.to_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| ScanError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ScanError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
            target_width,
            target_height,
            dst_image.into_vec(),
        )
        .ok_or_else(|| ScanError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))?;

        Ok(DynamicImage::ImageRgba8(rgba))
    }
}

/// 计算输出尺寸：不超限时原样返回，否则等比缩放并向下取整（每边至少 1 像素）。
pub(crate) fn target_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let ratio = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let target_width = ((width as f64 * ratio).floor() as u32).max(1);
    let target_height = ((height as f64 * ratio).floor() as u32).max(1);

    (target_width, target_height)
}

fn to_fast_filter(filter: image::imageops::FilterType) -> fr::FilterType {
    match filter {
        image::imageops::FilterType::Nearest => fr::FilterType::Box,
        image::imageops::FilterType::Triangle => fr::FilterType::Bilinear,
        image::imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
        image::imageops::FilterType::Gaussian => fr::FilterType::Mitchell,
        image::imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}
