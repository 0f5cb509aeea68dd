//! # 解码适配器
//!
//! ## 设计思路
//!
//! 二维码本身的识别算法（定位图案、透视校正、纠错、比特流解析）完全委托给识别原语，
//! 本模块只负责把一张已校验的图片变成原语能吃的 RGBA 缓冲，再把原语的输出整理成
//! `DecodedPayload` 序列。
//!
//! - `DecodePrimitive`：识别原语的接缝，输入 RGBA + 宽高 + 极性策略，输出 0 或 1 个结果。
//!   生产实现 `RqrrPrimitive` 基于 `rqrr`；测试可注入假实现。
//! - `Decode`：编排器看到的异步解码接口，`QrDecoder` 是其唯一生产实现。
//!
//! ## 实现思路
//!
//! 读取字节、解码、降采样、识别都是 CPU 密集或阻塞 I/O，统一放进
//! `tokio::task::spawn_blocking`，不阻塞 async 运行时。
//! “未找到二维码”返回空序列；读取/解码失败返回 `Err`，两者不混用。

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use super::config::{DecodeOptions, InversionMode, ScanConfig};
use super::model::{DecodedPayload, Point, QrLocation};
use super::source::ValidatedImage;
use super::ScanError;

/// 外部识别原语。
pub trait DecodePrimitive: Send + Sync + 'static {
    /// 在 RGBA 缓冲中查找二维码，按 `inversion` 指定的极性顺序尝试。
    fn detect(&self, rgba: &[u8], width: u32, height: u32, inversion: InversionMode) -> Option<DecodedPayload>;
}

/// 编排器使用的异步解码接口。
pub trait Decode: Send + Sync + 'static {
    fn decode(
        &self,
        image: ValidatedImage,
    ) -> impl Future<Output = Result<Vec<DecodedPayload>, ScanError>> + Send;
}

/// 基于 `rqrr` 的识别原语。
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrPrimitive;

impl DecodePrimitive for RqrrPrimitive {
    fn detect(&self, rgba: &[u8], width: u32, height: u32, inversion: InversionMode) -> Option<DecodedPayload> {
        let w = width as usize;
        let h = height as usize;
        if w == 0 || h == 0 || rgba.len() < w * h * 4 {
            return None;
        }

        let luma = luminance(rgba);

        for &invert in inversion.passes() {
            let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w, h, |x, y| {
                let value = luma[y * w + x];
                if invert { 255 - value } else { value }
            });

            for grid in prepared.detect_grids() {
                match grid.decode() {
                    Ok((_meta, content)) => {
                        let [tl, tr, br, bl] = grid.bounds;
                        return Some(DecodedPayload {
                            data: content,
                            location: Some(QrLocation {
                                top_left: Point { x: tl.x, y: tl.y },
                                top_right: Point { x: tr.x, y: tr.y },
                                bottom_right: Point { x: br.x, y: br.y },
                                bottom_left: Point { x: bl.x, y: bl.y },
                            }),
                        });
                    }
                    Err(err) => {
                        log::debug!("二维码网格解码失败（invert={}）：{:?}", invert, err);
                    }
                }
            }
        }

        None
    }
}

/// RGBA → 亮度（`0.2126 R + 0.7152 G + 0.0722 B`），忽略 alpha。
fn luminance(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .map(|px| {
            let value = 0.2126 * px[0] as f32 + 0.7152 * px[1] as f32 + 0.0722 * px[2] as f32;
            value.round().clamp(0.0, 255.0) as u8
        })
        .collect()
}

/// 解码适配器。
///
/// 持有识别原语与配置快照；可廉价克隆（原语在 `Arc` 中共享）。
#[derive(Debug)]
pub struct QrDecoder<P = RqrrPrimitive> {
    primitive: Arc<P>,
    config: ScanConfig,
}

impl<P> Clone for QrDecoder<P> {
    fn clone(&self) -> Self {
        Self {
            primitive: Arc::clone(&self.primitive),
            config: self.config.clone(),
        }
    }
}

impl QrDecoder<RqrrPrimitive> {
    /// 使用 `rqrr` 原语创建适配器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use qr_scanner::scanner::{QrDecoder, ScanConfig};
    ///
    /// let decoder = QrDecoder::new(ScanConfig::default());
    /// ```
    pub fn new(config: ScanConfig) -> Self {
        Self::with_primitive(RqrrPrimitive, config)
    }
}

impl<P: DecodePrimitive> QrDecoder<P> {
    pub fn with_primitive(primitive: P, config: ScanConfig) -> Self {
        Self {
            primitive: Arc::new(primitive),
            config,
        }
    }

    /// 使用指定选项解码。
    pub async fn decode_with_options(
        &self,
        image: ValidatedImage,
        options: DecodeOptions,
    ) -> Result<Vec<DecodedPayload>, ScanError> {
        let primitive = Arc::clone(&self.primitive);
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || Self::decode_blocking(primitive.as_ref(), image, &config, &options))
            .await
            .map_err(|e| ScanError::Decode(format!("解码任务异常终止：{}", e)))?
    }

    fn decode_blocking(
        primitive: &P,
        image: ValidatedImage,
        config: &ScanConfig,
        options: &DecodeOptions,
    ) -> Result<Vec<DecodedPayload>, ScanError> {
        let total_start = Instant::now();
        let channel = image.channel();
        let media_type = image.media_type().to_string();

        let load_start = Instant::now();
        let bytes = image.payload.into_bytes()?;
        let load_elapsed = load_start.elapsed();

        let decode_start = Instant::now();
        let pixels = Self::prepare_pixels(&bytes, config, options)?;
        let decode_elapsed = decode_start.elapsed();

        let detect_start = Instant::now();
        let found = primitive.detect(&pixels.rgba, pixels.width, pixels.height, options.inversion);
        let detect_elapsed = detect_start.elapsed();

        log::info!(
            "✅ 扫描完成 - 渠道: {} 类型: {} 尺寸: {}x{} 结果: {} load={}ms decode={}ms detect={}ms total={}ms",
            channel.as_str(),
            media_type,
            pixels.width,
            pixels.height,
            if found.is_some() { 1 } else { 0 },
            load_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            detect_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(found.into_iter().collect())
    }
}

impl<P: DecodePrimitive> Decode for QrDecoder<P> {
    fn decode(
        &self,
        image: ValidatedImage,
    ) -> impl Future<Output = Result<Vec<DecodedPayload>, ScanError>> + Send {
        let options = self.config.decode;
        let decoder = self.clone();
        async move { decoder.decode_with_options(image, options).await }
    }
}
