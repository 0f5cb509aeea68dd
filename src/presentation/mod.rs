//! # 展示层（presentation）
//!
//! ## 设计思路
//!
//! 展示层不绑定任何 GUI 框架：`ScannerView` 维护界面状态与一次性副作用
//! （自动打开、复制提示、粘贴提示），输出可序列化的 `ViewModel`；
//! 具体宿主（命令行、WebView 等）只负责渲染与转发用户操作。
//!
//! - `platform`：宿主能力接缝（打开链接 / 剪贴板）
//! - `view`：视图状态与视图模型

mod platform;
mod view;

pub use platform::{Platform, SystemPlatform};
pub use view::{PendingScan, ResultAction, ResultCard, ScannerView, UploaderHints, ViewModel};
