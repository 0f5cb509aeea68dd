//! # 命令行宿主
//!
//! ## 设计思路
//!
//! 命令行是 `ScannerView` 的一个最小宿主：每个图片参数都走“文件选择器”渠道，
//! `--paste` 走系统剪贴板渠道，扫描依次进行，每次结束后打印视图模型。
//! 文本模式下，解码期间的加载提示写到 stderr，不混入结果输出。
//!
//! ```text
//! qr-scanner [--lang ja|en] [--config FILE] [--no-open] [--copy] [--paste] [--json] [IMAGE...]
//! ```
//!
//! 退出码：全部成功为 0，任一扫描失败为 1，用法错误为 2。

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::i18n::{default_locale, t, Locale};
use crate::presentation::{Platform, ResultAction, ScannerView, SystemPlatform, ViewModel};
use crate::scanner::{candidate_from_file, Decode, QrDecoder, ScanConfig, ScanSettings, ScanState, UploadChannel};
use crate::url_check::is_qr_code_url;

/// 解析后的命令行参数。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub locale: Option<Locale>,
    pub config: Option<PathBuf>,
    pub no_open: bool,
    pub copy: bool,
    pub paste: bool,
    pub json: bool,
    pub help: bool,
    pub images: Vec<PathBuf>,
}

/// 解析参数（不含程序名）。
pub fn parse_args<I>(args: I) -> Result<CliArgs, AppError>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => parsed.help = true,
            "--no-open" => parsed.no_open = true,
            "--copy" => parsed.copy = true,
            "--paste" => parsed.paste = true,
            "--json" => parsed.json = true,
            "--lang" => {
                let value = iter
                    .next()
                    .ok_or_else(|| AppError::Usage("--lang 需要参数（ja 或 en）".to_string()))?;
                parsed.locale = Some(Locale::from_tag(&value));
            }
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| AppError::Usage("--config 需要文件路径".to_string()))?;
                parsed.config = Some(PathBuf::from(value));
            }
            flag if flag.starts_with("--") => {
                return Err(AppError::Usage(format!("未知参数：{}", flag)));
            }
            _ => parsed.images.push(PathBuf::from(arg)),
        }
    }

    if !parsed.help && parsed.images.is_empty() && !parsed.paste {
        return Err(AppError::Usage("至少需要一个图片路径或 --paste".to_string()));
    }

    Ok(parsed)
}

pub fn usage() -> &'static str {
    "Usage: qr-scanner [--lang ja|en] [--config FILE] [--no-open] [--copy] [--paste] [--json] [IMAGE...]\n\
     \n\
     Options:\n  \
       --lang ja|en    display language (default: from LANG, ja if unset or unknown)\n  \
       --config FILE   JSON settings applied over the defaults\n  \
       --no-open       never auto-open a single URL result\n  \
       --copy          copy every text result to the clipboard\n  \
       --paste         scan the image currently on the clipboard\n  \
       --json          print the view model as JSON\n  \
       -h, --help      show this help"
}

/// 读取设置文件并叠加到默认配置。
pub fn load_config(path: Option<&Path>) -> Result<ScanConfig, AppError> {
    let mut config = ScanConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let raw = std::fs::read_to_string(path)?;
    let settings: ScanSettings = serde_json::from_str(&raw)
        .map_err(|e| AppError::Config(format!("{}：{}", path.display(), e)))?;
    config
        .apply_settings(&settings)
        .map_err(|e| AppError::Config(e.to_string()))?;

    log::info!("⚙️ 已加载设置文件：{}", path.display());
    Ok(config)
}

/// 把视图模型渲染为纯文本。
pub fn render(model: &ViewModel, locale: Locale) -> String {
    let mut lines = vec![format!("== {} ==", model.title)];

    if let Some(loading) = &model.loading {
        lines.push(loading.clone());
    }
    if let Some(error) = &model.error {
        lines.push(format!("✖ {}", error));
    }
    if let Some(notice) = &model.notice {
        lines.push(format!("ℹ {}", notice));
    }
    if let Some(blocked) = &model.auto_open_blocked {
        lines.push(format!("⚠ {}", blocked));
    }
    if let Some(header) = &model.results_header {
        lines.push(header.clone());
    }

    for card in &model.results {
        let mut line = format!("[{}] {}", card.kind_label, card.data);
        if card.action == ResultAction::CopyText && is_qr_code_url(&card.data) {
            line.push(' ');
            line.push_str(&t(locale, "results.linkLikeHint"));
        }
        lines.push(line);
    }

    if let Some(toast) = &model.toast {
        lines.push(toast.clone());
    }

    lines.join("\n")
}

/// 执行全部扫描，返回退出码。
pub async fn run(args: CliArgs) -> Result<i32, AppError> {
    let locale = args.locale.unwrap_or_else(|| default_locale(None));
    let mut config = load_config(args.config.as_deref())?;
    if args.no_open {
        config.auto_open = false;
    }

    let decoder = QrDecoder::new(config.clone());
    let mut view = ScannerView::new(decoder, SystemPlatform, &config, locale);

    run_with_view(&mut view, &args, locale).await
}

/// 用给定视图执行扫描，打印每次结果。
pub async fn run_with_view<D: Decode, P: Platform>(
    view: &mut ScannerView<D, P>,
    args: &CliArgs,
    locale: Locale,
) -> Result<i32, AppError> {
    let mut all_succeeded = true;

    for image in &args.images {
        let state = match view.begin(candidate_from_file(image, UploadChannel::Picker)) {
            Some(pending) => {
                if !args.json {
                    if let Some(loading) = view.view_model().loading {
                        eprintln!("{} {}", loading, image.display());
                    }
                }
                view.complete(pending).await
            }
            None => view.state(),
        };
        all_succeeded &= finish_scan(view, &state, args, locale);
    }

    if args.paste {
        view.clear();
        let state = view.paste_from_system().await;
        let pasted = view.view_model().notice.is_none();
        all_succeeded &= finish_scan(view, &state, args, locale) && pasted;
    }

    Ok(if all_succeeded { 0 } else { 1 })
}

fn finish_scan<D: Decode, P: Platform>(
    view: &mut ScannerView<D, P>,
    state: &ScanState,
    args: &CliArgs,
    locale: Locale,
) -> bool {
    if args.copy {
        for (index, result) in state.results().iter().enumerate() {
            if !result.is_url() {
                view.copy(index);
            }
        }
    }

    let model = view.view_model();
    if args.json {
        match serde_json::to_string_pretty(&model) {
            Ok(json) => println!("{}", json),
            Err(err) => log::error!("视图模型序列化失败：{}", err),
        }
    } else {
        println!("{}", render(&model, locale));
    }

    matches!(state, ScanState::Succeeded { .. })
}
