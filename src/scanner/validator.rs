//! # 上传校验模块
//!
//! ## 设计思路
//!
//! 校验是纯函数：只看声明的媒体类型与字节长度，不读取内容、不产生副作用。
//! 先查格式、再查大小，每次最多返回一个拒绝原因。
//!
//! 媒体类型按声明值严格匹配（区分大小写，不做子类型模糊匹配）。
//! 文件来源的声明类型由加载器通过文件签名探测得出，见 `loader`。

use crate::i18n::{t, Locale};

use super::source::{UploadCandidate, ValidatedImage};

/// 允许的媒体类型。
pub const SUPPORTED_FORMATS: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// 允许的最大字节数（50 MiB，含边界）。
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    UnsupportedFormat,
    TooLarge,
}

/// 拒绝原因：类别 + 本地化文案。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(Rejection),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// 按媒体类型与大小判定是否可接受。
pub fn validate_parts(media_type: &str, size: u64, locale: Locale) -> ValidationOutcome {
    if !SUPPORTED_FORMATS.contains(&media_type) {
        return ValidationOutcome::Rejected(Rejection {
            kind: RejectionKind::UnsupportedFormat,
            reason: t(locale, "validator.unsupportedFormat"),
        });
    }

    if size > MAX_FILE_SIZE {
        return ValidationOutcome::Rejected(Rejection {
            kind: RejectionKind::TooLarge,
            reason: t(locale, "validator.fileTooLarge"),
        });
    }

    ValidationOutcome::Accepted
}

/// 校验候选图片。
pub fn validate(candidate: &UploadCandidate, locale: Locale) -> ValidationOutcome {
    validate_parts(candidate.media_type(), candidate.size(), locale)
}

/// 校验并在通过时产出 `ValidatedImage`。
pub fn accept(candidate: UploadCandidate, locale: Locale) -> Result<ValidatedImage, Rejection> {
    match validate(&candidate, locale) {
        ValidationOutcome::Accepted => Ok(ValidatedImage::from_candidate(candidate)),
        ValidationOutcome::Rejected(rejection) => {
            log::info!(
                "🚫 上传被拒绝 - 渠道: {} 类型: {} 大小: {} bytes 原因: {:?}",
                candidate.channel().as_str(),
                candidate.media_type(),
                candidate.size(),
                rejection.kind
            );
            Err(rejection)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_supported_format() {
        for format in SUPPORTED_FORMATS {
            assert!(validate_parts(format, 1024, Locale::En).is_accepted(), "{}", format);
        }
    }

    #[test]
    fn boundary_is_inclusive() {
        assert!(validate_parts("image/png", MAX_FILE_SIZE, Locale::En).is_accepted());

        let over = validate_parts("image/png", MAX_FILE_SIZE + 1, Locale::En);
        assert_eq!(
            over,
            ValidationOutcome::Rejected(Rejection {
                kind: RejectionKind::TooLarge,
                reason: "File is too large (max 50MB)".to_string(),
            })
        );
    }

    #[test]
    fn format_is_checked_before_size() {
        let outcome = validate_parts("image/bmp", MAX_FILE_SIZE * 2, Locale::Ja);
        let ValidationOutcome::Rejected(rejection) = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.kind, RejectionKind::UnsupportedFormat);
        assert_eq!(rejection.reason, t(Locale::Ja, "validator.unsupportedFormat"));
    }

    #[test]
    fn media_type_match_is_exact() {
        assert!(!validate_parts("IMAGE/PNG", 10, Locale::En).is_accepted());
        assert!(!validate_parts("image/png; charset=binary", 10, Locale::En).is_accepted());
        assert!(!validate_parts("image/*", 10, Locale::En).is_accepted());
        assert!(!validate_parts("", 10, Locale::En).is_accepted());
    }

    #[test]
    fn accept_returns_validated_image() {
        let candidate = UploadCandidate::from_bytes(vec![1, 2, 3], "image/gif", crate::scanner::UploadChannel::Drop);
        let validated = accept(candidate, Locale::En).expect("gif should be accepted");
        assert_eq!(validated.media_type(), "image/gif");
        assert_eq!(validated.size(), 3);
    }
}
