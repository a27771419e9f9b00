//! Upload controller WASM bindings.
//!
//! `ImageUploader` wraps the core upload controller for a page that renders
//! its own markup. The page reads `preview`, `error` and `status` after each
//! call and re-renders; results are pushed to the `onImageChange` callback.
//!
//! # Example
//!
//! ```typescript
//! import { ImageUploader } from '@pixfit/wasm';
//!
//! const uploader = new ImageUploader(
//!   { label: 'Cover photo', maxSizeKB: 300, currentImage: saved ?? undefined },
//!   (image: string | null) => save(image),
//! );
//! uploader.attach_input(fileInput);
//!
//! fileInput.addEventListener('change', async () => {
//!   const file = fileInput.files?.[0];
//!   if (!file || !uploader.begin_selection(file.type)) return render();
//!   render(); // shows busy
//!   let bytes;
//!   try {
//!     bytes = new Uint8Array(await file.arrayBuffer());
//!   } catch (e) {
//!     uploader.fail_selection(String(e));
//!     return render();
//!   }
//!   uploader.complete_selection(bytes);
//!   render();
//! });
//! ```

use std::cell::RefCell;

use pixfit_core::upload::{UploadConfig, UploadController, UploadError, UploadHost};
use pixfit_core::EncodedImage;
use wasm_bindgen::prelude::*;
use web_sys::HtmlInputElement;

use crate::types::status_name;

/// Page-side collaborators. Image changes are queued and delivered to JS
/// once the controller is no longer borrowed.
#[derive(Default)]
struct PageHost {
    pending: Option<Option<String>>,
    input: Option<HtmlInputElement>,
}

impl UploadHost for PageHost {
    fn image_changed(&mut self, image: Option<&EncodedImage>) {
        self.pending = Some(image.map(|image| image.as_str().to_string()));
    }

    fn reset_file_selection(&mut self) {
        if let Some(input) = &self.input {
            input.set_value("");
        }
    }
}

/// Image picker state behind a single upload widget.
///
/// Methods take `&self` so `onImageChange` may read the getters, or start
/// another selection, while it runs.
#[wasm_bindgen]
pub struct ImageUploader {
    inner: RefCell<UploadController<PageHost>>,
    on_image_change: js_sys::Function,
}

#[wasm_bindgen]
impl ImageUploader {
    /// Create an uploader.
    ///
    /// # Arguments
    /// * `config` - `{ currentImage?, label?, maxSizeKB?, maxWidth? }`, or undefined
    /// * `on_image_change` - called with a data URI string, or `null` on removal
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, on_image_change: js_sys::Function) -> Result<ImageUploader, JsValue> {
        let config: UploadConfig = if config.is_undefined() || config.is_null() {
            UploadConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid uploader config: {}", e)))?
        };

        Ok(Self {
            inner: RefCell::new(UploadController::new(config, PageHost::default())),
            on_image_change,
        })
    }

    /// Remember the file input so `remove()` can clear it.
    pub fn attach_input(&self, input: HtmlInputElement) {
        self.inner.borrow_mut().host_mut().input = Some(input);
    }

    /// Validate, compress and publish a file in one call.
    ///
    /// Returns `true` when a new image was published. Failures are reflected
    /// in `error` and logged to the console; they never throw.
    pub fn select_file(&self, bytes: &[u8], mime_type: &str) -> bool {
        report(self.update(|inner| inner.select_file(bytes, mime_type)))
    }

    /// Check the file's declared type and go busy.
    ///
    /// Returns `false` if the type is not an image or another file is still
    /// being processed; in that case do not call `complete_selection`.
    pub fn begin_selection(&self, mime_type: &str) -> bool {
        report(self.update(|inner| inner.begin_selection(mime_type)))
    }

    /// Compress the bytes of the file passed to `begin_selection`.
    pub fn complete_selection(&self, bytes: &[u8]) -> bool {
        report(self.update(|inner| inner.complete_selection(bytes)))
    }

    /// Abandon a selection whose bytes could not be read.
    pub fn fail_selection(&self, reason: &str) {
        log_diagnostic(&format!("Could not read selected file: {}", reason));
        self.update(|inner| inner.fail_selection());
    }

    /// Clear the preview, report `null`, and reset the file input.
    pub fn remove(&self) {
        self.update(|inner| inner.remove());
    }

    /// Data URI of the current preview, if any.
    #[wasm_bindgen(getter)]
    pub fn preview(&self) -> Option<String> {
        self.inner
            .borrow()
            .preview()
            .map(|image| image.as_str().to_string())
    }

    /// User-facing error message, if the last action failed.
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.inner.borrow().error().map(str::to_string)
    }

    #[wasm_bindgen(getter)]
    pub fn is_busy(&self) -> bool {
        self.inner.borrow().is_busy()
    }

    /// `"idle"`, `"busy"` or `"error"`.
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        status_name(&self.inner.borrow().state().status).to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn label(&self) -> String {
        self.inner.borrow().config().label.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn max_size_kb(&self) -> u32 {
        self.inner.borrow().config().max_size_kb
    }

    #[wasm_bindgen(getter)]
    pub fn max_width(&self) -> u32 {
        self.inner.borrow().config().max_width
    }
}

impl ImageUploader {
    /// Run `action` on the controller, then deliver any queued image change
    /// after the borrow is released.
    fn update<T>(&self, action: impl FnOnce(&mut UploadController<PageHost>) -> T) -> T {
        let (result, pending) = {
            let mut inner = self.inner.borrow_mut();
            let result = action(&mut inner);
            (result, inner.host_mut().pending.take())
        };

        if let Some(image) = pending {
            let arg = image.map_or(JsValue::NULL, |uri| JsValue::from_str(&uri));
            if let Err(err) = self.on_image_change.call1(&JsValue::NULL, &arg) {
                web_sys::console::error_2(&JsValue::from_str("onImageChange threw:"), &err);
            }
        }

        result
    }
}

/// Log the diagnostic behind a failed action and collapse it to a flag.
fn report(result: Result<(), UploadError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err @ UploadError::Processing(_)) => {
            log_diagnostic(&err.to_string());
            false
        }
        Err(_) => false,
    }
}

fn log_diagnostic(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}
