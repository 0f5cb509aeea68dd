//! # 扫描视图模块
//!
//! ## 设计思路
//!
//! `ScannerView` 是界面层的无头实现：接收三种上传渠道的输入，
//! 交给校验器与编排器处理，再把状态换算成可直接渲染的 `ViewModel`。
//!
//! ## 实现思路
//!
//! - 自动打开：状态为 `Succeeded` 且恰好一个 URL 结果时，`refresh()` 尝试打开一次。
//!   以尝试编号作为守卫，同一组结果无论刷新多少次都只打开一次。
//! - 打开被阻止只记 warn 日志并显示提示，手动 `open(index)` 仍可用。
//! - 复制成功后显示提示，`toast_duration` 到期后自动消失；失败只记日志。
//! - 粘贴时剪贴板没有图片：只显示提示，不动现有状态。
//! - 扫描分两段：`begin` 进入 `Loading`，`complete` 等待解码。宿主可以在两段之间渲染加载提示。

use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::i18n::{t, Locale};
use crate::scanner::{
    accept, candidate_from_clipboard, candidate_from_data_url, candidate_from_file, AttemptId, ClipboardItem,
    Decode, ResultKind, ScanConfig, ScanError, ScanOrchestrator, ScanState, UploadCandidate, UploadChannel,
    ValidatedImage,
};

use super::platform::Platform;

/// 结果卡片上的动作。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultAction {
    OpenLink,
    CopyText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultCard {
    pub kind_label: String,
    pub data: String,
    pub action: ResultAction,
    pub action_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploaderHints {
    pub select_file: String,
    pub drag_drop: String,
    pub paste_hint: String,
    pub supported_formats: String,
    pub max_file_size: String,
}

/// 渲染所需的全部文案与数据。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub title: String,
    pub description: String,
    pub uploader: UploaderHints,
    pub loading: Option<String>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub auto_open_blocked: Option<String>,
    pub results_header: Option<String>,
    pub results: Vec<ResultCard>,
    pub toast: Option<String>,
    pub clear_label: Option<String>,
}

/// 已进入 `Loading`、等待解码的一次扫描。
#[derive(Debug)]
pub struct PendingScan {
    attempt: AttemptId,
    image: ValidatedImage,
}

impl PendingScan {
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }
}

pub struct ScannerView<D, P> {
    orchestrator: ScanOrchestrator<D>,
    platform: P,
    locale: Locale,
    auto_open: bool,
    toast_duration: Duration,
    notice: Option<String>,
    auto_opened: Option<AttemptId>,
    auto_open_blocked: bool,
    toast_shown_at: Option<Instant>,
}

impl<D: Decode, P: Platform> ScannerView<D, P> {
    pub fn new(decoder: D, platform: P, config: &ScanConfig, locale: Locale) -> Self {
        Self {
            orchestrator: ScanOrchestrator::new(decoder, config, locale),
            platform,
            locale,
            auto_open: config.auto_open,
            toast_duration: config.toast_duration(),
            notice: None,
            auto_opened: None,
            auto_open_blocked: false,
            toast_shown_at: None,
        }
    }

    pub fn state(&self) -> ScanState {
        self.orchestrator.state()
    }

    pub fn orchestrator(&self) -> &ScanOrchestrator<D> {
        &self.orchestrator
    }

    /// 文件选择器渠道。
    pub async fn select_file(&mut self, path: &Path) -> ScanState {
        let candidate = candidate_from_file(path, UploadChannel::Picker);
        self.submit_loaded(candidate).await
    }

    /// 拖放本地文件。
    pub async fn drop_file(&mut self, path: &Path) -> ScanState {
        let candidate = candidate_from_file(path, UploadChannel::Drop);
        self.submit_loaded(candidate).await
    }

    /// 拖放网页图片（Data URL）。
    pub async fn drop_data_url(&mut self, data_url: &str) -> ScanState {
        let candidate = candidate_from_data_url(data_url, UploadChannel::Drop);
        self.submit_loaded(candidate).await
    }

    /// 粘贴渠道：取第一个 `image/*` 条目。
    pub async fn paste(&mut self, items: Vec<ClipboardItem>) -> ScanState {
        match candidate_from_clipboard(items) {
            Some(candidate) => self.submit(candidate).await,
            None => {
                log::info!("📋 剪贴板中没有图片");
                self.notice = Some(t(self.locale, "scanner.noImageInClipboard"));
                self.state()
            }
        }
    }

    /// 从系统剪贴板读取后粘贴。
    pub async fn paste_from_system(&mut self) -> ScanState {
        let items = match self.platform.read_clipboard() {
            Ok(items) => items,
            Err(err) => {
                log::warn!("⚠️ 读取剪贴板失败 [{}]：{}", err.code(), err);
                Vec::new()
            }
        };
        self.paste(items).await
    }

    /// 校验候选并执行扫描。
    pub async fn submit(&mut self, candidate: UploadCandidate) -> ScanState {
        self.submit_loaded(Ok(candidate)).await
    }

    async fn submit_loaded(&mut self, candidate: Result<UploadCandidate, ScanError>) -> ScanState {
        match self.begin(candidate) {
            Some(pending) => self.complete(pending).await,
            None => self.state(),
        }
    }

    /// 扫描的前半段：校验候选并进入 `Loading`。
    ///
    /// 加载失败或校验拒绝时直接落到 `Failed` 并返回 `None`。
    /// 返回 `Some` 时宿主可以先渲染加载中的视图，再调用 [`complete`](Self::complete)。
    pub fn begin(&mut self, candidate: Result<UploadCandidate, ScanError>) -> Option<PendingScan> {
        self.reset_transient();

        let candidate = match candidate {
            Ok(candidate) => candidate,
            Err(err) => {
                self.orchestrator.fail(err);
                return None;
            }
        };

        match accept(candidate, self.locale) {
            Ok(image) => Some(PendingScan {
                attempt: self.orchestrator.begin(),
                image,
            }),
            Err(rejection) => {
                self.orchestrator.reject(rejection);
                None
            }
        }
    }

    /// 扫描的后半段：解码、提交结果并检查自动打开。
    pub async fn complete(&mut self, pending: PendingScan) -> ScanState {
        let state = self.orchestrator.run(pending.attempt, pending.image).await;
        self.refresh();
        state
    }

    /// 检查是否需要自动打开；返回本次是否发起了打开。
    pub fn refresh(&mut self) -> bool {
        if !self.auto_open {
            return false;
        }

        let ScanState::Succeeded { attempt, results } = self.orchestrator.state() else {
            return false;
        };

        if results.len() != 1 || results[0].kind != ResultKind::Url {
            return false;
        }
        if self.auto_opened == Some(attempt) {
            return false;
        }

        self.auto_opened = Some(attempt);
        if let Err(err) = self.platform.open_link(&results[0].data) {
            log::warn!("⚠️ 自动打开链接被阻止 [{}]：{}", err.code(), err);
            self.auto_open_blocked = true;
        }
        true
    }

    /// 手动打开第 `index` 个结果（仅 URL 结果）。
    pub fn open(&self, index: usize) -> Result<(), ScanError> {
        let state = self.orchestrator.state();
        let result = state
            .results()
            .get(index)
            .ok_or_else(|| ScanError::Platform(format!("结果不存在：{}", index)))?;

        if !result.is_url() {
            return Err(ScanError::Platform("该结果不是链接".to_string()));
        }

        self.platform.open_link(&result.data)
    }

    /// 复制第 `index` 个结果；返回是否成功。
    pub fn copy(&mut self, index: usize) -> bool {
        self.copy_at(index, Instant::now())
    }

    fn copy_at(&mut self, index: usize, now: Instant) -> bool {
        let state = self.orchestrator.state();
        let Some(result) = state.results().get(index) else {
            log::warn!("⚠️ 复制失败：结果不存在（index={}）", index);
            return false;
        };

        match self.platform.write_text(&result.data) {
            Ok(()) => {
                self.toast_shown_at = Some(now);
                true
            }
            Err(err) => {
                log::warn!("⚠️ 复制到剪贴板失败 [{}]：{}", err.code(), err);
                false
            }
        }
    }

    /// 回到初始状态。
    pub fn clear(&mut self) {
        self.orchestrator.clear();
        self.reset_transient();
    }

    fn reset_transient(&mut self) {
        self.notice = None;
        self.auto_open_blocked = false;
        self.toast_shown_at = None;
    }

    pub fn view_model(&self) -> ViewModel {
        self.view_model_at(Instant::now())
    }

    /// 按给定时刻生成视图模型（决定复制提示是否仍可见）。
    pub fn view_model_at(&self, now: Instant) -> ViewModel {
        let locale = self.locale;
        let state = self.orchestrator.state();

        let results: Vec<ResultCard> = state
            .results()
            .iter()
            .map(|result| match result.kind {
                ResultKind::Url => ResultCard {
                    kind_label: t(locale, "results.kindUrl"),
                    data: result.data.clone(),
                    action: ResultAction::OpenLink,
                    action_label: t(locale, "results.openLink"),
                },
                ResultKind::Text => ResultCard {
                    kind_label: t(locale, "results.kindText"),
                    data: result.data.clone(),
                    action: ResultAction::CopyText,
                    action_label: t(locale, "results.copyText"),
                },
            })
            .collect();

        let results_header = (results.len() > 1)
            .then(|| format!("{} ({})", t(locale, "results.multipleResults"), results.len()));

        let toast_visible = self
            .toast_shown_at
            .is_some_and(|shown| now.saturating_duration_since(shown) < self.toast_duration);

        ViewModel {
            title: t(locale, "app.title"),
            description: t(locale, "app.description"),
            uploader: UploaderHints {
                select_file: t(locale, "uploader.selectFile"),
                drag_drop: t(locale, "uploader.dragDrop"),
                paste_hint: t(locale, "uploader.pasteHint"),
                supported_formats: t(locale, "uploader.supportedFormats"),
                max_file_size: t(locale, "uploader.maxFileSize"),
            },
            loading: state.is_loading().then(|| t(locale, "scanner.scanning")),
            error: state.failure().map(|failure| failure.message.clone()),
            notice: self.notice.clone(),
            auto_open_blocked: self.auto_open_blocked.then(|| t(locale, "results.autoOpenBlocked")),
            results_header,
            results,
            toast: toast_visible.then(|| t(locale, "results.copied")),
            clear_label: state.is_terminal().then(|| t(locale, "scanner.clearButton")),
        }
    }
}
