//! # 二维码扫描工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 宿主（cli / 其他 UI）                     │
//! │        上传：选择文件 · 拖放 · 粘贴  → 渲染 ViewModel     │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  presentation   ScannerView（自动打开 · 复制提示）        │
//! │       │              └─ Platform（打开链接 / 剪贴板）     │
//! │       ↓                                                  │
//! │  scanner        loader → validator → orchestrator        │
//! │                                   └─ decoder (rqrr)      │
//! │       ↓                                                  │
//! │  url_check      URL / 文本 分类                           │
//! │  i18n           ja / en 文案表                            │
//! │  error          AppError（宿主进程错误）                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`scanner`] | 候选加载、校验、解码、超时赛跑与状态机 |
//! | [`presentation`] | 上传渠道、自动打开守卫、复制提示、视图模型 |
//! | [`url_check`] | `is_valid_url`（权威分类）与 `is_qr_code_url`（前缀检查） |
//! | [`i18n`] | 不可变多语言文案表，点号路径查找 |
//! | [`cli`] | 命令行参数、设置文件、文本渲染 |
//! | [`error`] | 宿主进程错误类型 `AppError` |
//!
//! 所有处理都在本机内存中完成，不访问网络，也不保存任何扫描记录。

pub mod cli;
pub mod error;
pub mod i18n;
pub mod presentation;
pub mod scanner;
pub mod url_check;
