//! URL 判定模块
//!
//! # 设计思路
//!
//! 解码结果需要分流到“打开链接”或“复制文本”两种动作，这里提供两个严格程度不同的判定：
//!
//! - [`is_valid_url`]：权威分类器。按 WHATWG URL 语法完整解析，
//!   仅接受 http/https 且主机名有效的绝对 URL。结果分类与自动打开都以它为准。
//! - [`is_qr_code_url`]：仅做前缀检查（`http://` / `https://`，不区分大小写）。
//!   用于命令行输出中给文本结果追加“疑似链接”提示，不参与分类。
//!
//! 两者不可互换：`is_qr_code_url("https://.")` 为真，而 `is_valid_url` 为假。
//!
//! # 实现思路
//!
//! - 解析委托 `url` crate，解析失败一律折叠为 `false`，函数永不 panic。
//! - 前缀正则通过 `once_cell::sync::Lazy` 首次使用时编译。

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static HTTP_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// 判断文本是否为有效的 HTTP/HTTPS 绝对 URL。
///
/// # 返回
/// - `true`：scheme 为 http/https（不区分大小写），主机名非空且不全是 `.`
/// - `false`：空串、纯空白、解析失败或不满足上述条件
pub fn is_valid_url(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }

    let Ok(parsed) = Url::parse(text) else {
        return false;
    };

    let scheme = parsed.scheme().to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return false;
    }

    let Some(host) = parsed.host_str() else {
        return false;
    };

    !host.is_empty() && !host.replace('.', "").is_empty()
}

/// 判断文本是否以 `http://` 或 `https://` 开头（不区分大小写）。
pub fn is_qr_code_url(text: &str) -> bool {
    HTTP_PREFIX.is_match(text)
}
