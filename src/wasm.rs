//! Browser bindings.
//!
//! Implements the file-read and image-decode primitives on top of
//! `FileReader` and `HtmlImageElement`, and routes alerts to `window.alert`.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, File, FileReader, HtmlImageElement, HtmlInputElement};

use crate::config::AppConfig;
use crate::form::AlertSink;
use crate::validation::{
    ByteReader, DecodeError, FileLike, FileValidationPipeline, ImageDecoder, ReadError, ValidationOutcome,
};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let stored = AppConfig::load_from_local_storage();
    let config = stored.as_ref().ok().cloned().flatten().unwrap_or_default();
    if let Err(e) = console_log::init_with_level(config.preferences.log_level.to_level()) {
        web_sys::console::log_1(&format!("Logger setup failed: {}", e).into());
    }
    log::info!("📍 Placemark WASM started");

    match stored {
        Ok(Some(_)) => {}
        Ok(None) => {
            if let Err(e) = config.save_to_local_storage() {
                log::warn!("⚙️ Could not store default configuration: {}", e);
            }
        }
        Err(e) => log::warn!("⚙️ Using default configuration: {}", e),
    }
}

/// The stored configuration, or defaults when none is readable.
fn stored_config() -> AppConfig {
    AppConfig::load_from_local_storage().ok().flatten().unwrap_or_default()
}

/// A file picked through an `<input type="file">`.
#[derive(Debug, Clone)]
pub struct BrowserFile {
    file: File,
    name: String,
    mime_type: String,
}

impl BrowserFile {
    pub fn new(file: File) -> Self {
        Self {
            name: file.name(),
            mime_type: file.type_(),
            file,
        }
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

impl FileLike for BrowserFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.file.size() as u64
    }
}

/// Files currently selected in a file input, in selection order.
pub fn selected_files(input: &HtmlInputElement) -> Vec<BrowserFile> {
    let Some(files) = input.files() else {
        return Vec::new();
    };
    (0..files.length())
        .filter_map(|i| files.get(i))
        .map(BrowserFile::new)
        .collect()
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

type Callback = Closure<dyn FnMut(Event)>;

/// Resolves a oneshot from whichever of two callbacks fires first.
fn settle_once<T: 'static>(
    tx: oneshot::Sender<T>,
    on_success: impl Fn() -> T + 'static,
    on_failure: impl Fn() -> T + 'static,
) -> (Callback, Callback) {
    let tx = Rc::new(RefCell::new(Some(tx)));

    let success_tx = tx.clone();
    let success = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(on_success());
        }
    });
    let failure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(on_failure());
        }
    });
    (success, failure)
}

/// An in-flight `FileReader`. Dropping it detaches the callbacks and aborts the read.
struct PendingRead {
    reader: FileReader,
    _onload: Callback,
    _onerror: Callback,
}

impl Drop for PendingRead {
    fn drop(&mut self) {
        self.reader.set_onload(None);
        self.reader.set_onerror(None);
        self.reader.abort();
    }
}

/// Reads files with the browser's `FileReader`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserReader;

impl ByteReader for BrowserReader {
    type Blob = BrowserFile;

    async fn read_data_url(&self, blob: &BrowserFile) -> Result<String, ReadError> {
        let reader = FileReader::new().map_err(|e| ReadError::Reader(js_message(&e)))?;
        let (tx, rx) = oneshot::channel();

        let loaded = reader.clone();
        let failed = reader.clone();
        let (onload, onerror) = settle_once(
            tx,
            move || {
                loaded
                    .result()
                    .ok()
                    .and_then(|value| value.as_string())
                    .ok_or_else(|| ReadError::Reader("FileReader returned no data URL".to_string()))
            },
            move || {
                let message = failed
                    .error()
                    .map(|e| e.message())
                    .unwrap_or_else(|| "unknown read error".to_string());
                Err(ReadError::Reader(message))
            },
        );
        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        let pending = PendingRead {
            reader,
            _onload: onload,
            _onerror: onerror,
        };
        pending
            .reader
            .read_as_data_url(&blob.file)
            .map_err(|e| ReadError::Reader(js_message(&e)))?;

        let result = rx
            .await
            .unwrap_or_else(|_| Err(ReadError::Reader("read abandoned".to_string())));
        drop(pending);
        result
    }
}

/// An image element waiting to load. Dropping it detaches the callbacks.
struct PendingImage {
    image: HtmlImageElement,
    _onload: Callback,
    _onerror: Callback,
}

impl Drop for PendingImage {
    fn drop(&mut self) {
        self.image.set_onload(None);
        self.image.set_onerror(None);
    }
}

/// Decodes payloads by loading them into an `<img>` element.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserImageDecoder;

impl ImageDecoder for BrowserImageDecoder {
    async fn decode(&self, data_url: &str) -> Result<(u32, u32), DecodeError> {
        let image = HtmlImageElement::new().map_err(|e| DecodeError::Decoder(js_message(&e)))?;
        let (tx, rx) = oneshot::channel();

        let loaded = image.clone();
        let (onload, onerror) = settle_once(
            tx,
            move || Ok((loaded.natural_width(), loaded.natural_height())),
            || Err(DecodeError::Decoder("image failed to load".to_string())),
        );
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        let pending = PendingImage {
            image,
            _onload: onload,
            _onerror: onerror,
        };
        pending.image.set_src(data_url);

        let result = rx
            .await
            .unwrap_or_else(|_| Err(DecodeError::Decoder("decode abandoned".to_string())));
        drop(pending);
        result
    }
}

/// Shows alerts with `window.alert`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserAlerts;

impl AlertSink for BrowserAlerts {
    fn alert(&self, message: &str) {
        log::warn!("⚠️ {}", message);
        let shown = web_sys::window().map(|window| window.alert_with_message(message));
        if !matches!(shown, Some(Ok(()))) {
            log::error!("❌ Could not show alert: {}", message);
        }
    }
}

/// Validate the first file selected in `input` as a location logo.
///
/// Resolves to the encoded payload, or `null` after alerting the rejection.
#[wasm_bindgen(js_name = validateLogoInput)]
pub async fn validate_logo_input(input: HtmlInputElement) -> Result<JsValue, JsValue> {
    let config = stored_config();
    let mut pipeline = FileValidationPipeline::new(BrowserReader, BrowserImageDecoder).with_limits(config.logo);

    let Some(task) = pipeline.start(selected_files(&input)) else {
        return Ok(JsValue::NULL);
    };
    match task.await {
        Some(ValidationOutcome::Accepted { payload, .. }) => Ok(JsValue::from_str(payload.as_str())),
        Some(ValidationOutcome::Rejected { message, .. }) => {
            BrowserAlerts.alert(&message);
            Ok(JsValue::NULL)
        }
        None => Ok(JsValue::NULL),
    }
}
