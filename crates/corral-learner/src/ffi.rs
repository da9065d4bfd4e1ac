//! C ABI surface of the native online-learning engine.
//!
//! ALL engine entry-point declarations live in this module. The engine ships
//! as a platform shared module that is located and loaded at runtime (see
//! [`crate::loader`]); nothing here is linked at build time, so every entry
//! point is represented as a function pointer resolved through `libloading`.
//!
//! # Engine C API
//!
//! - Functions are prefixed `ole_` and return `0` on success.
//! - A failing call leaves a thread-local message readable through
//!   `ole_last_error_message` until the next engine call on that thread.
//! - Resource handles are opaque 64-bit tokens meaningful only to the engine.
//!
//! # Safety
//!
//! All engine calls are unsafe FFI. Callers must ensure:
//! - the handle passed was produced by `ole_initialize` and not yet closed
//! - pointer arguments outlive the call
//! - a `RawPrediction` filled by the engine is released with
//!   `ole_prediction_free` exactly once

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use libloading::Library;

use crate::error::{LearnerError, LearnerResult};

/// Opaque engine resource token.
///
/// Semantically a native pointer; the host never dereferences it.
pub type RawHandle = u64;

/// Raw prediction result filled by `ole_predict`.
///
/// The `tag` field repeats the handle's output-type discriminant; only the
/// slots meaningful for that tag are populated, every other pointer is null
/// with a zero length. Buffers are engine-owned and valid until
/// `ole_prediction_free`.
#[repr(C)]
#[derive(Debug)]
pub struct RawPrediction {
    /// Output-type discriminant (mirrors `ole_prediction_type`).
    pub tag: c_int,
    /// Scalar slot (scalar and probability outputs).
    pub scalar: f32,
    /// Single-label slot (multiclass outputs).
    pub label: u32,
    /// Float-array slot (scalar-array outputs).
    pub floats: *const f32,
    pub num_floats: usize,
    /// Label-array slot (multilabel outputs).
    pub labels: *const u32,
    pub num_labels: usize,
    /// Action ranking slot: parallel arrays of action ids and values
    /// (scores or probabilities depending on the tag).
    pub actions: *const u32,
    pub action_values: *const f32,
    pub num_actions: usize,
}

impl RawPrediction {
    /// An empty result for the engine to fill.
    pub fn zeroed() -> Self {
        Self {
            tag: 0,
            scalar: 0.0,
            label: 0,
            floats: std::ptr::null(),
            num_floats: 0,
            labels: std::ptr::null(),
            num_labels: 0,
            actions: std::ptr::null(),
            action_values: std::ptr::null(),
            num_actions: 0,
        }
    }
}

/// `ole_initialize(argc, argv, out_handle)`
///
/// argv is the full argument vector; the first token is a program-name
/// placeholder the engine ignores. On success writes the new handle to
/// `out_handle`.
pub type InitializeFn =
    unsafe extern "C" fn(argc: c_int, argv: *const *const c_char, out_handle: *mut RawHandle) -> c_int;

/// `ole_prediction_type(handle)`
///
/// Pure query returning the output-type discriminant for the handle.
/// Callable immediately after `ole_initialize`.
pub type PredictionTypeFn = unsafe extern "C" fn(handle: RawHandle) -> c_int;

/// `ole_predict(handle, lines, line_count, learn, multiline, out)`
///
/// Single entry point for learn and predict. `lines` holds `line_count`
/// example lines in the engine's textual format; `multiline` selects whether
/// they form one multi-line logical example. With `learn` non-zero the model
/// is updated before the prediction is produced.
pub type PredictFn = unsafe extern "C" fn(
    handle: RawHandle,
    lines: *const *const c_char,
    line_count: usize,
    learn: c_int,
    multiline: c_int,
    out: *mut RawPrediction,
) -> c_int;

/// `ole_close(handle)`
///
/// Destroys the native resource. NOT idempotent on the engine side; the host
/// wrapper gates it with an open flag.
pub type CloseFn = unsafe extern "C" fn(handle: RawHandle) -> c_int;

/// `ole_save_model(handle, path)`
pub type SaveModelFn = unsafe extern "C" fn(handle: RawHandle, path: *const c_char) -> c_int;

/// `ole_finish_passes(handle)`
///
/// Runs the remaining configured training passes over the cached examples.
pub type FinishPassesFn = unsafe extern "C" fn(handle: RawHandle) -> c_int;

/// `ole_prediction_free(pred)`
///
/// Releases the engine-owned buffers inside a filled [`RawPrediction`].
pub type PredictionFreeFn = unsafe extern "C" fn(pred: *mut RawPrediction);

/// `ole_last_error_message()`
///
/// Thread-local message for the most recent failing call on this thread, or
/// null when none is recorded.
pub type LastErrorFn = unsafe extern "C" fn() -> *const c_char;

/// Resolved entry-point table of a loaded engine module.
///
/// Function pointers stay valid for as long as the backing [`Library`] is
/// alive; the table owns the library, and the loader hands the table out with
/// a `'static` lifetime, so the module is never unloaded once resolved.
pub struct EngineApi {
    pub initialize: InitializeFn,
    pub prediction_type: PredictionTypeFn,
    pub predict: PredictFn,
    pub close: CloseFn,
    pub save_model: SaveModelFn,
    pub finish_passes: FinishPassesFn,
    pub prediction_free: PredictionFreeFn,
    pub last_error: LastErrorFn,
    _library: Option<Library>,
}

impl EngineApi {
    /// Resolve every `ole_*` entry point from a loaded module.
    ///
    /// # Errors
    ///
    /// Returns the `libloading` resolution error of the first missing symbol.
    pub fn from_library(library: Library) -> Result<Self, libloading::Error> {
        // SAFETY: each symbol is resolved against its declared signature; the
        // copied function pointers remain valid because the Library is stored
        // alongside them and never dropped separately.
        unsafe {
            let initialize = *library.get::<InitializeFn>(b"ole_initialize\0")?;
            let prediction_type = *library.get::<PredictionTypeFn>(b"ole_prediction_type\0")?;
            let predict = *library.get::<PredictFn>(b"ole_predict\0")?;
            let close = *library.get::<CloseFn>(b"ole_close\0")?;
            let save_model = *library.get::<SaveModelFn>(b"ole_save_model\0")?;
            let finish_passes = *library.get::<FinishPassesFn>(b"ole_finish_passes\0")?;
            let prediction_free = *library.get::<PredictionFreeFn>(b"ole_prediction_free\0")?;
            let last_error = *library.get::<LastErrorFn>(b"ole_last_error_message\0")?;
            Ok(Self {
                initialize,
                prediction_type,
                predict,
                close,
                save_model,
                finish_passes,
                prediction_free,
                last_error,
                _library: Some(library),
            })
        }
    }

    /// Build a table from bare function pointers, without a backing module.
    #[cfg(test)]
    pub(crate) fn from_parts(
        initialize: InitializeFn,
        prediction_type: PredictionTypeFn,
        predict: PredictFn,
        close: CloseFn,
        save_model: SaveModelFn,
        finish_passes: FinishPassesFn,
        prediction_free: PredictionFreeFn,
        last_error: LastErrorFn,
    ) -> Self {
        Self {
            initialize,
            prediction_type,
            predict,
            close,
            save_model,
            finish_passes,
            prediction_free,
            last_error,
            _library: None,
        }
    }

    /// Read the engine's thread-local error message for the current thread.
    pub fn last_error_message(&self) -> String {
        // SAFETY: the engine returns either null or a NUL-terminated string
        // valid until the next engine call on this thread; it is copied out
        // immediately.
        let ptr = unsafe { (self.last_error)() };
        if ptr.is_null() {
            return "unknown engine error".to_string();
        }
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }

    /// Check an engine status code, converting non-zero into
    /// [`LearnerError::Native`] carrying the engine's message.
    pub fn check(&self, code: c_int, operation: &str) -> LearnerResult<()> {
        if code == 0 {
            Ok(())
        } else {
            Err(LearnerError::Native {
                operation: operation.to_string(),
                message: format!("{} (status {})", self.last_error_message(), code),
            })
        }
    }
}

impl std::fmt::Debug for EngineApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineApi")
            .field("loaded_module", &self._library.is_some())
            .finish()
    }
}
