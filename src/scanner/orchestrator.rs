//! # 扫描编排模块
//!
//! ## 设计思路
//!
//! 编排器持有界面状态机 `Idle → Loading → {Succeeded | Failed} → Idle`，
//! 并且是唯一把技术性错误换算成展示文案的地方。
//!
//! 每次扫描都分配一个单调递增的 `AttemptId`。解码（或超时）完成时，
//! 只有当它的编号仍然等于当前编号才会写入状态；被新上传或 `clear()`
//! 取代的旧尝试直接丢弃。这样即使旧解码比新解码晚返回，也不会覆盖新结果。
//!
//! ## 实现思路
//!
//! - 解码与 `tokio::time::timeout` 赛跑；超时后解码 future 被丢弃，
//!   阻塞线程上的任务自然跑完，其结果无人接收。
//! - 状态放在 `Mutex` 中，所有方法只需 `&self`，可被多个并发扫描共享。
//! - 不做任何重试。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::i18n::{t, t_with, Locale};

use super::config::ScanConfig;
use super::decoder::Decode;
use super::error::ScanError;
use super::model::{AttemptId, ClassifiedResult, FailureKind, ScanFailure, ScanState};
use super::source::ValidatedImage;
use super::validator::Rejection;

pub struct ScanOrchestrator<D> {
    decoder: D,
    timeout: Duration,
    locale: Locale,
    next_attempt: AtomicU64,
    state: Mutex<ScanState>,
}

impl<D: Decode> ScanOrchestrator<D> {
    pub fn new(decoder: D, config: &ScanConfig, locale: Locale) -> Self {
        Self {
            decoder,
            timeout: config.scan_timeout(),
            locale,
            next_attempt: AtomicU64::new(1),
            state: Mutex::new(ScanState::Idle),
        }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// 当前状态快照。
    pub fn state(&self) -> ScanState {
        self.lock_state().clone()
    }

    /// 当前生效的尝试编号（`Idle` 时为 `None`）。
    pub fn current_attempt(&self) -> Option<AttemptId> {
        self.lock_state().attempt()
    }

    /// 开始新一轮扫描：清空旧结果与错误，进入 `Loading`。
    pub fn begin(&self) -> AttemptId {
        let attempt = self.allocate();
        *self.lock_state() = ScanState::Loading { attempt };
        log::debug!("🔄 开始扫描尝试 #{}", attempt);
        attempt
    }

    /// 对已开始的尝试执行解码，并与超时计时器赛跑。
    ///
    /// 返回调用结束时的状态快照；若该尝试已被取代，快照反映的是新尝试的状态。
    pub async fn run(&self, attempt: AttemptId, image: ValidatedImage) -> ScanState {
        let outcome = tokio::time::timeout(self.timeout, self.decoder.decode(image)).await;

        let next = match outcome {
            Ok(Ok(payloads)) if payloads.is_empty() => {
                self.failed(attempt, FailureKind::NoSymbol, t(self.locale, "scanner.errorNoQRCode"))
            }
            Ok(Ok(payloads)) => ScanState::Succeeded {
                attempt,
                results: payloads.into_iter().map(ClassifiedResult::classify).collect(),
            },
            Ok(Err(err)) => {
                log::error!("❌ 扫描尝试 #{} 解码失败 [{}]：{}", attempt, err.code(), err);
                self.failed(attempt, FailureKind::Generic, t(self.locale, "scanner.errorGeneric"))
            }
            Err(_) => {
                log::warn!("⏱️ 扫描尝试 #{} 超过 {}ms，放弃等待", attempt, self.timeout.as_millis());
                let message = timeout_message(self.locale, self.timeout);
                self.failed(attempt, FailureKind::Timeout, message)
            }
        };

        self.commit(attempt, next)
    }

    /// `begin` + `run` 的组合。
    pub async fn scan(&self, image: ValidatedImage) -> ScanState {
        let attempt = self.begin();
        self.run(attempt, image).await
    }

    /// 记录一次校验拒绝，取代任何进行中的尝试。
    pub fn reject(&self, rejection: Rejection) -> ScanState {
        let attempt = self.allocate();
        let state = ScanState::Failed {
            attempt,
            failure: ScanFailure {
                kind: FailureKind::Rejected,
                message: rejection.reason,
            },
        };
        *self.lock_state() = state.clone();
        state
    }

    /// 上传在进入校验前就失败（如文件不可读），按通用错误展示。
    pub fn fail(&self, error: ScanError) -> ScanState {
        let attempt = self.allocate();
        log::error!("❌ 上传失败 #{} [{}]：{}", attempt, error.code(), error);
        let state = self.failed(attempt, FailureKind::Generic, t(self.locale, "scanner.errorGeneric"));
        *self.lock_state() = state.clone();
        state
    }

    /// 回到 `Idle`，丢弃结果与错误，并使进行中的尝试失效。可重复调用。
    pub fn clear(&self) {
        self.allocate();
        *self.lock_state() = ScanState::Idle;
    }

    fn allocate(&self) -> AttemptId {
        self.next_attempt.fetch_add(1, Ordering::SeqCst)
    }

    fn failed(&self, attempt: AttemptId, kind: FailureKind, message: String) -> ScanState {
        ScanState::Failed {
            attempt,
            failure: ScanFailure { kind, message },
        }
    }

    fn commit(&self, attempt: AttemptId, next: ScanState) -> ScanState {
        let mut state = self.lock_state();
        let is_current = matches!(*state, ScanState::Loading { attempt: current } if current == attempt);

        if is_current {
            *state = next;
        } else {
            log::debug!("丢弃过期的扫描结果 #{}（当前：{:?}）", attempt, state.attempt());
        }

        state.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, ScanState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// 超时文案带上实际生效的超时秒数。
fn timeout_message(locale: Locale, timeout: Duration) -> String {
    let seconds = (timeout.as_millis() as f64 / 1000.0).to_string();
    t_with(locale, "scanner.errorTimeout", &[("seconds", seconds.as_str())])
}
