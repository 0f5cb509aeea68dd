// End-to-end scan flow: real images, real decoder, fake platform
use std::future::Future;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, Rgba};
use qr_scanner::cli::{run_with_view, CliArgs};
use qr_scanner::i18n::{t, Locale};
use qr_scanner::presentation::{Platform, ResultAction, ScannerView};
use qr_scanner::scanner::{
    ClipboardItem, Decode, DecodedPayload, FailureKind, QrDecoder, ResultKind, ScanConfig, ScanError,
    ScanState, ValidatedImage,
};
use tempfile::NamedTempFile;

#[derive(Default, Clone)]
struct RecordingPlatform {
    opened: Arc<Mutex<Vec<String>>>,
    copied: Arc<Mutex<Vec<String>>>,
}

impl RecordingPlatform {
    fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    fn copied(&self) -> Vec<String> {
        self.copied.lock().unwrap().clone()
    }
}

impl Platform for RecordingPlatform {
    fn open_link(&self, url: &str) -> Result<(), ScanError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn write_text(&self, text: &str) -> Result<(), ScanError> {
        self.copied.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn read_clipboard(&self) -> Result<Vec<ClipboardItem>, ScanError> {
        Ok(Vec::new())
    }
}

/// Delays the wrapped decoder to force the timeout path.
struct SlowDecoder {
    inner: QrDecoder,
    delay: Duration,
}

impl Decode for SlowDecoder {
    fn decode(&self, image: ValidatedImage) -> impl Future<Output = Result<Vec<DecodedPayload>, ScanError>> + Send {
        let inner = self.inner.clone();
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            inner.decode(image).await
        }
    }
}

fn png_bytes(image: DynamicImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}

fn qr_png(text: &str) -> Vec<u8> {
    let code = qrcode::QrCode::new(text.as_bytes()).unwrap();
    let rendered = code.render::<Luma<u8>>().min_dimensions(240, 240).build();
    png_bytes(DynamicImage::ImageLuma8(rendered))
}

fn blank_png() -> Vec<u8> {
    png_bytes(DynamicImage::ImageRgba8(ImageBuffer::from_pixel(64, 64, Rgba([255u8, 255, 255, 255]))))
}

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file
}

fn real_view(config: &ScanConfig) -> ScannerView<QrDecoder, RecordingPlatform> {
    real_view_with(config, RecordingPlatform::default())
}

fn real_view_with(config: &ScanConfig, platform: RecordingPlatform) -> ScannerView<QrDecoder, RecordingPlatform> {
    ScannerView::new(QrDecoder::new(config.clone()), platform, config, Locale::En)
}

#[tokio::test]
async fn url_symbol_succeeds_and_auto_opens_once() {
    let file = write_temp(&qr_png("https://example.com"));
    let platform = RecordingPlatform::default();
    let mut view = real_view_with(&ScanConfig::default(), platform.clone());

    let state = view.select_file(file.path()).await;
    assert!(matches!(state, ScanState::Succeeded { .. }));
    assert_eq!(state.results().len(), 1);
    assert_eq!(state.results()[0].kind, ResultKind::Url);
    assert_eq!(state.results()[0].data, "https://example.com");

    view.refresh();
    view.refresh();
    assert_eq!(platform.opened(), vec!["https://example.com".to_string()]);

    let model = view.view_model();
    assert_eq!(model.results[0].action, ResultAction::OpenLink);
    assert!(model.error.is_none());
    assert!(model.loading.is_none());
    assert_eq!(model.clear_label.as_deref(), Some("Clear"));
}

#[tokio::test]
async fn each_result_set_auto_opens_once() {
    let file = write_temp(&qr_png("https://example.com/path"));
    let platform = RecordingPlatform::default();
    let mut view = real_view_with(&ScanConfig::default(), platform.clone());

    view.select_file(file.path()).await;
    view.refresh();
    assert_eq!(platform.opened().len(), 1);

    let model = serde_json::to_value(view.view_model()).unwrap();
    assert_eq!(model["results"][0]["data"], "https://example.com/path");

    view.drop_file(file.path()).await;
    view.refresh();
    assert_eq!(platform.opened().len(), 2);
}

#[tokio::test]
async fn disabled_auto_open_leaves_link_to_the_user() {
    let file = write_temp(&qr_png("https://example.com"));
    let config = ScanConfig {
        auto_open: false,
        ..ScanConfig::default()
    };
    let platform = RecordingPlatform::default();
    let mut view = real_view_with(&config, platform.clone());

    view.select_file(file.path()).await;
    assert!(platform.opened().is_empty());

    view.open(0).unwrap();
    assert_eq!(platform.opened().len(), 1);
}

#[tokio::test]
async fn text_symbol_offers_copy_with_toast() {
    let platform = RecordingPlatform::default();
    let mut view = real_view_with(&ScanConfig::default(), platform.clone());
    let data_url = format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(qr_png("hello world")));

    let state = view.drop_data_url(&data_url).await;
    assert_eq!(state.results()[0].kind, ResultKind::Text);

    assert!(view.copy(0));
    assert_eq!(platform.copied(), vec!["hello world".to_string()]);
    assert!(platform.opened().is_empty());
    let model = view.view_model();
    assert_eq!(model.results[0].action, ResultAction::CopyText);
    assert_eq!(model.toast.as_deref(), Some("Copied!"));
}

#[tokio::test]
async fn image_without_symbol_fails_with_no_qr_message() {
    let file = write_temp(&blank_png());
    let mut view = real_view(&ScanConfig::default());

    let state = view.select_file(file.path()).await;
    let failure = state.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::NoSymbol);
    assert_eq!(view.view_model().error, Some(t(Locale::En, "scanner.errorNoQRCode")));
}

#[tokio::test]
async fn slow_decode_times_out_and_late_result_is_ignored() {
    let config = ScanConfig {
        scan_timeout_ms: 100,
        ..ScanConfig::default()
    };
    let decoder = SlowDecoder {
        inner: QrDecoder::new(config.clone()),
        delay: Duration::from_millis(400),
    };
    let mut view = ScannerView::new(decoder, RecordingPlatform::default(), &config, Locale::En);
    let file = write_temp(&qr_png("https://late.example"));

    let state = view.select_file(file.path()).await;
    assert_eq!(state.failure().unwrap().kind, FailureKind::Timeout);
    assert_eq!(
        state.failure().unwrap().message,
        "Scan timed out (0.1 seconds). The image might be too large."
    );

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(view.state(), state);
    assert!(view.state().results().is_empty());
}

#[tokio::test]
async fn clear_returns_to_idle_from_every_terminal_state() {
    let mut view = real_view(&ScanConfig::default());

    let success = write_temp(&qr_png("text"));
    let blank = write_temp(&blank_png());
    let not_image = write_temp(b"plain text, not an image");

    for path in [success.path(), blank.path(), not_image.path()] {
        let state = view.select_file(path).await;
        assert!(state.is_terminal());

        view.clear();
        assert_eq!(view.state(), ScanState::Idle);
        let model = view.view_model();
        assert!(model.results.is_empty());
        assert!(model.error.is_none());

        view.clear();
        assert_eq!(view.state(), ScanState::Idle);
    }
}

#[tokio::test]
async fn unsupported_file_is_rejected_before_decode() {
    let file = write_temp(b"plain text, not an image");
    let mut view = real_view(&ScanConfig::default());

    let state = view.select_file(file.path()).await;
    let failure = state.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Rejected);
    assert_eq!(failure.message, t(Locale::En, "validator.unsupportedFormat"));
}

#[tokio::test]
async fn cli_exit_code_reflects_every_scan() {
    let good = write_temp(&qr_png("hello"));
    let blank = write_temp(&blank_png());

    let mut view = real_view(&ScanConfig::default());
    let args = CliArgs {
        images: vec![good.path().to_path_buf()],
        copy: true,
        ..CliArgs::default()
    };
    assert_eq!(run_with_view(&mut view, &args, Locale::En).await.unwrap(), 0);

    let mut view = real_view(&ScanConfig::default());
    let args = CliArgs {
        images: vec![good.path().to_path_buf(), blank.path().to_path_buf()],
        ..CliArgs::default()
    };
    assert_eq!(run_with_view(&mut view, &args, Locale::En).await.unwrap(), 1);

    let mut view = real_view(&ScanConfig::default());
    let args = CliArgs {
        paste: true,
        ..CliArgs::default()
    };
    assert_eq!(run_with_view(&mut view, &args, Locale::En).await.unwrap(), 1);
}
