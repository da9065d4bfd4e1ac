//! In-process stand-in for the native engine, for unit tests only.
//!
//! Plain `extern "C"` functions with the engine's signatures, backed by
//! per-handle call counters, so the host-side lifecycle rules (close gating,
//! use-after-close rejection, the factory's orphan-close path) can be
//! exercised without a packaged native module.
//!
//! Behavior is steered through the argument vector handed to `initialize`:
//! `--kind <n>` fixes the reported output-type discriminant (default 6,
//! scalar) and `--fail` makes initialization fail.

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::ffi::{EngineApi, RawHandle, RawPrediction};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static LAST_HANDLE: std::cell::Cell<RawHandle> = const { std::cell::Cell::new(0) };
}
static TAGS: Mutex<Option<HashMap<RawHandle, c_int>>> = Mutex::new(None);
static CLOSES: Mutex<Option<HashMap<RawHandle, usize>>> = Mutex::new(None);
static PREDICTS: Mutex<Option<HashMap<RawHandle, usize>>> = Mutex::new(None);

const SCALAR: f32 = 0.5;
const LABEL: u32 = 3;
static FLOATS: [f32; 3] = [0.25, 0.5, 0.75];
static LABELS: [u32; 2] = [2, 4];
static ACTIONS: [u32; 3] = [1, 2, 3];
static ACTION_VALUES: [f32; 3] = [0.6, 0.3, 0.2];
static LAST_ERROR: &[u8] = b"stub engine: forced failure\0";

fn bump(map: &Mutex<Option<HashMap<RawHandle, usize>>>, handle: RawHandle) {
    map.lock()
        .get_or_insert_with(HashMap::new)
        .entry(handle)
        .and_modify(|count| *count += 1)
        .or_insert(1);
}

fn read(map: &Mutex<Option<HashMap<RawHandle, usize>>>, handle: RawHandle) -> usize {
    map.lock()
        .as_ref()
        .and_then(|counts| counts.get(&handle).copied())
        .unwrap_or(0)
}

/// Native close calls observed for `handle`.
pub(crate) fn close_count(handle: RawHandle) -> usize {
    read(&CLOSES, handle)
}

/// Native predict calls observed for `handle`.
pub(crate) fn predict_count(handle: RawHandle) -> usize {
    read(&PREDICTS, handle)
}

/// The handle most recently produced by `initialize` on this thread.
pub(crate) fn last_initialized_handle() -> RawHandle {
    LAST_HANDLE.with(|last| last.get())
}

unsafe extern "C" fn stub_initialize(
    argc: c_int,
    argv: *const *const c_char,
    out_handle: *mut RawHandle,
) -> c_int {
    let mut args = Vec::new();
    for i in 0..argc as isize {
        let arg = CStr::from_ptr(*argv.offset(i)).to_string_lossy().into_owned();
        args.push(arg);
    }
    if args.iter().any(|arg| arg == "--fail") {
        return 1;
    }
    let tag = args
        .iter()
        .position(|arg| arg == "--kind")
        .and_then(|at| args.get(at + 1))
        .and_then(|value| value.parse::<c_int>().ok())
        .unwrap_or(6);

    let handle = NEXT_HANDLE.fetch_add(1, Ordering::SeqCst);
    TAGS.lock().get_or_insert_with(HashMap::new).insert(handle, tag);
    LAST_HANDLE.with(|last| last.set(handle));
    *out_handle = handle;
    0
}

unsafe extern "C" fn stub_prediction_type(handle: RawHandle) -> c_int {
    TAGS.lock()
        .as_ref()
        .and_then(|tags| tags.get(&handle).copied())
        .unwrap_or(0)
}

unsafe extern "C" fn stub_predict(
    handle: RawHandle,
    _lines: *const *const c_char,
    _line_count: usize,
    _learn: c_int,
    _multiline: c_int,
    out: *mut RawPrediction,
) -> c_int {
    bump(&PREDICTS, handle);
    *out = RawPrediction {
        tag: stub_prediction_type(handle),
        scalar: SCALAR,
        label: LABEL,
        floats: FLOATS.as_ptr(),
        num_floats: FLOATS.len(),
        labels: LABELS.as_ptr(),
        num_labels: LABELS.len(),
        actions: ACTIONS.as_ptr(),
        action_values: ACTION_VALUES.as_ptr(),
        num_actions: ACTIONS.len(),
    };
    0
}

unsafe extern "C" fn stub_close(handle: RawHandle) -> c_int {
    bump(&CLOSES, handle);
    0
}

unsafe extern "C" fn stub_save_model(_handle: RawHandle, _path: *const c_char) -> c_int {
    0
}

unsafe extern "C" fn stub_finish_passes(_handle: RawHandle) -> c_int {
    0
}

unsafe extern "C" fn stub_prediction_free(_pred: *mut RawPrediction) {}

unsafe extern "C" fn stub_last_error() -> *const c_char {
    LAST_ERROR.as_ptr() as *const c_char
}

/// The shared stub entry-point table.
pub(crate) fn stub_api() -> &'static EngineApi {
    static API: OnceLock<EngineApi> = OnceLock::new();
    API.get_or_init(|| {
        EngineApi::from_parts(
            stub_initialize,
            stub_prediction_type,
            stub_predict,
            stub_close,
            stub_save_model,
            stub_finish_passes,
            stub_prediction_free,
            stub_last_error,
        )
    })
}

/// Call `initialize` through the table the way the factory does, panicking
/// on failure. Test setup helper.
pub(crate) fn initialize_for_test(engine: &'static EngineApi, args: &[&str]) -> RawHandle {
    let c_args: Vec<CString> = args
        .iter()
        .map(|arg| CString::new(*arg).unwrap())
        .collect();
    let ptrs: Vec<*const c_char> = c_args.iter().map(|arg| arg.as_ptr()).collect();
    let mut handle: RawHandle = 0;
    // SAFETY: ptrs outlives the call and handle is a writable out-parameter.
    let status = unsafe { (engine.initialize)(ptrs.len() as c_int, ptrs.as_ptr(), &mut handle) };
    assert_eq!(status, 0, "stub initialize failed");
    handle
}
