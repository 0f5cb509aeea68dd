//! 扫描结果与界面状态模型。

use serde::Serialize;

use crate::url_check::is_valid_url;

/// 扫描尝试编号，单调递增。
pub type AttemptId = u64;

/// 像素坐标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// 二维码外接四边形的四个角（降采样后的像素坐标系）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrLocation {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

/// 识别原语返回的单个解码结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedPayload {
    pub data: String,
    pub location: Option<QrLocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Url,
    Text,
}

/// 已分类的结果：`Url` 当且仅当文本通过 [`is_valid_url`]。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedResult {
    pub data: String,
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub location: Option<QrLocation>,
}

impl ClassifiedResult {
    pub fn classify(payload: DecodedPayload) -> Self {
        let kind = if is_valid_url(&payload.data) {
            ResultKind::Url
        } else {
            ResultKind::Text
        };

        Self {
            data: payload.data,
            kind,
            location: payload.location,
        }
    }

    pub fn is_url(&self) -> bool {
        self.kind == ResultKind::Url
    }
}

/// 失败类别，决定展示哪条文案。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// 校验未通过（格式或大小）。
    Rejected,
    /// 未检测到二维码。
    NoSymbol,
    /// 超过扫描时限。
    Timeout,
    /// 解码或其他技术性错误。
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// 界面有限状态，同一时刻只有一个生效。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ScanState {
    #[default]
    Idle,
    Loading {
        attempt: AttemptId,
    },
    Succeeded {
        attempt: AttemptId,
        results: Vec<ClassifiedResult>,
    },
    Failed {
        attempt: AttemptId,
        failure: ScanFailure,
    },
}

impl ScanState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    pub fn attempt(&self) -> Option<AttemptId> {
        match self {
            Self::Idle => None,
            Self::Loading { attempt }
            | Self::Succeeded { attempt, .. }
            | Self::Failed { attempt, .. } => Some(*attempt),
        }
    }

    pub fn results(&self) -> &[ClassifiedResult] {
        match self {
            Self::Succeeded { results, .. } => results,
            _ => &[],
        }
    }

    pub fn failure(&self) -> Option<&ScanFailure> {
        match self {
            Self::Failed { failure, .. } => Some(failure),
            _ => None,
        }
    }
}
