//! # 多语言文案模块（i18n）
//!
//! ## 设计思路
//!
//! 所有面向用户的文案都是进程级静态配置，而不是可变状态。
//! 翻译表以 JSON 形式随二进制一起编译（`include_str!`），首次访问时解析一次，
//! 之后只读共享。
//!
//! ## 实现思路
//!
//! - `Locale` 枚举限定支持的语言，未知语言标签回退到默认语言（日语）。
//! - `t` 按点号路径（如 `scanner.errorTimeout`）逐级查找；
//!   找不到或叶子不是字符串时返回 key 本身，并记录 warn 日志。
//! - `t_with` 在 `t` 的基础上替换 `{name}` 占位符，用于带运行时数值的文案（如超时秒数）。
//! - 翻译表解析失败不会 panic：记录 error 日志并退化为空表（所有 key 原样返回）。

use once_cell::sync::Lazy;
use serde_json::Value;

const JA_TABLE: &str = include_str!("locales/ja.json");
const EN_TABLE: &str = include_str!("locales/en.json");

/// 支持的界面语言。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ja,
    En,
}

impl Locale {
    /// 从语言标签解析；未知标签回退到默认语言。
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "ja" => Self::Ja,
            "en" => Self::En,
            other => {
                log::warn!("未知语言标签 {:?}，回退到默认语言 {:?}", other, Self::default());
                Self::default()
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ja => "ja",
            Self::En => "en",
        }
    }
}

struct Tables {
    ja: Value,
    en: Value,
}

static TABLES: Lazy<Tables> = Lazy::new(|| Tables {
    ja: parse_table("ja", JA_TABLE),
    en: parse_table("en", EN_TABLE),
});

fn parse_table(name: &str, raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(err) => {
            log::error!("翻译表 {} 解析失败，将原样返回 key: {}", name, err);
            Value::Null
        }
    }
}

/// 获取指定语言的整张翻译表。
pub fn table(locale: Locale) -> &'static Value {
    match locale {
        Locale::Ja => &TABLES.ja,
        Locale::En => &TABLES.en,
    }
}

/// 按点号路径取翻译文案。
///
/// # 示例
/// ```rust
/// use qr_scanner::i18n::{t, Locale};
///
/// assert_eq!(t(Locale::En, "app.title"), "QR Code Scanner");
/// assert_eq!(t(Locale::En, "app.missing"), "app.missing");
/// ```
pub fn t(locale: Locale, key: &str) -> String {
    let mut value = table(locale);
    for segment in key.split('.') {
        match value.get(segment) {
            Some(next) => value = next,
            None => {
                log::warn!("翻译 key 不存在: {}", key);
                return key.to_string();
            }
        }
    }

    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string())
}

/// 取文案并替换 `{name}` 占位符；未出现的占位符保持原样。
pub fn t_with(locale: Locale, key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(locale, key), |text, (name, value)| {
        text.replace(&format!("{{{}}}", name), value)
    })
}

/// 根据语言偏好推断默认语言。
///
/// `accept_language` 为空时读取 `LANG` 环境变量；两者都没有时返回日语。
pub fn default_locale(accept_language: Option<&str>) -> Locale {
    let lang = match accept_language {
        Some(lang) => lang.to_string(),
        None => std::env::var("LANG").unwrap_or_else(|_| "ja".to_string()),
    };

    if lang.starts_with("ja") {
        Locale::Ja
    } else {
        Locale::En
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_key_resolves_per_locale() {
        assert_eq!(t(Locale::Ja, "app.title"), "QRコードスキャナー");
        assert_eq!(t(Locale::En, "scanner.clearButton"), "Clear");
    }

    #[test]
    fn unknown_key_returns_key() {
        assert_eq!(t(Locale::En, "nope.nothing"), "nope.nothing");
    }

    #[test]
    fn non_leaf_key_returns_key() {
        assert_eq!(t(Locale::Ja, "scanner"), "scanner");
    }

    #[test]
    fn placeholders_are_filled() {
        assert_eq!(
            t_with(Locale::En, "scanner.errorTimeout", &[("seconds", "3")]),
            "Scan timed out (3 seconds). The image might be too large."
        );
        assert!(t_with(Locale::Ja, "scanner.errorTimeout", &[("seconds", "1.5")]).contains("（1.5秒）"));
        assert_eq!(t_with(Locale::En, "app.title", &[("seconds", "3")]), "QR Code Scanner");
    }

    #[test]
    fn unknown_tag_falls_back_to_default() {
        assert_eq!(Locale::from_tag("fr"), Locale::Ja);
        assert_eq!(Locale::from_tag(" EN "), Locale::En);
    }

    #[test]
    fn default_locale_follows_language_prefix() {
        assert_eq!(default_locale(Some("ja-JP")), Locale::Ja);
        assert_eq!(default_locale(Some("en-US")), Locale::En);
        assert_eq!(default_locale(Some("de")), Locale::En);
    }

    #[test]
    fn both_tables_share_the_same_keys() {
        fn keys(prefix: &str, value: &Value, out: &mut Vec<String>) {
            if let Some(map) = value.as_object() {
                for (k, v) in map {
                    let path = if prefix.is_empty() { k.clone() } else { format!("{}.{}", prefix, k) };
                    keys(&path, v, out);
                }
            } else {
                out.push(prefix.to_string());
            }
        }

        let mut ja = Vec::new();
        let mut en = Vec::new();
        keys("", table(Locale::Ja), &mut ja);
        keys("", table(Locale::En), &mut en);
        ja.sort();
        en.sort();
        assert_eq!(ja, en);
    }
}
