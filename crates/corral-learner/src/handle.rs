//! Ownership wrapper around one engine resource token.
//!
//! A [`LearnerHandle`] is the single host-side owner of one native
//! allocation. The raw token is never handed out; every engine call is
//! routed through the wrapper so the open/closed state is checked before the
//! token can reach native code.
//!
//! # Lifecycle
//!
//! `Open` (from construction) → `Closed` (from the first `close()`). Host
//! operations on a closed handle fail with [`LearnerError::Closed`] rather
//! than forwarding a dead token; a second `close()` is a no-op because the
//! engine's own close entry point is not idempotent.
//!
//! # Thread Safety
//!
//! A handle is `Send` but every mutating operation takes `&mut self`, so one
//! instance cannot be driven from two threads at once. Independent handles
//! are fully isolated host-side and may run on separate threads.

use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::path::Path;

use tracing::warn;

use crate::error::{LearnerError, LearnerResult};
use crate::ffi::{EngineApi, RawHandle, RawPrediction};
use crate::prediction::{PredictionData, PredictionType};

pub(crate) struct LearnerHandle {
    engine: &'static EngineApi,
    raw: RawHandle,
    open: bool,
}

impl LearnerHandle {
    /// Take ownership of a token produced by `ole_initialize`.
    pub(crate) fn new(engine: &'static EngineApi, raw: RawHandle) -> Self {
        Self {
            engine,
            raw,
            open: true,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> RawHandle {
        self.raw
    }

    fn ensure_open(&self) -> LearnerResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(LearnerError::Closed)
        }
    }

    /// Query the engine for this resource's output type.
    pub(crate) fn prediction_type(&self) -> LearnerResult<PredictionType> {
        self.ensure_open()?;
        // SAFETY: the handle is open, so the token is live.
        let tag = unsafe { (self.engine.prediction_type)(self.raw) };
        Ok(PredictionType::from_tag(tag))
    }

    /// Run one learn/predict call and return an owned copy of the result.
    pub(crate) fn predict_raw(
        &mut self,
        lines: &[&str],
        learn: bool,
        multiline: bool,
    ) -> LearnerResult<PredictionData> {
        self.ensure_open()?;
        if lines.is_empty() {
            return Err(LearnerError::InvalidArgument(
                "at least one example line is required".to_string(),
            ));
        }
        let c_lines = lines
            .iter()
            .map(|line| {
                CString::new(*line).map_err(|_| {
                    LearnerError::InvalidArgument(format!(
                        "example line contains an interior NUL byte: {line:?}"
                    ))
                })
            })
            .collect::<LearnerResult<Vec<_>>>()?;
        let line_ptrs: Vec<*const c_char> = c_lines.iter().map(|line| line.as_ptr()).collect();

        let mut raw = RawPrediction::zeroed();
        // SAFETY: the handle is open, line_ptrs outlives the call, and raw is
        // a writable out-parameter.
        let status = unsafe {
            (self.engine.predict)(
                self.raw,
                line_ptrs.as_ptr(),
                line_ptrs.len(),
                learn as c_int,
                multiline as c_int,
                &mut raw,
            )
        };
        self.engine
            .check(status, if learn { "learn" } else { "predict" })?;

        // SAFETY: the engine filled raw; its buffers stay valid until
        // ole_prediction_free below.
        let data = unsafe { PredictionData::copy_from_raw(&raw) };
        // SAFETY: raw was filled by exactly one successful ole_predict and is
        // freed exactly once.
        unsafe { (self.engine.prediction_free)(&mut raw) };
        Ok(data)
    }

    /// Write the current model state to `path`.
    pub(crate) fn save_model(&mut self, path: &Path) -> LearnerResult<()> {
        self.ensure_open()?;
        let c_path = CString::new(path.to_string_lossy().into_owned()).map_err(|_| {
            LearnerError::InvalidArgument(format!(
                "model path contains an interior NUL byte: {}",
                path.display()
            ))
        })?;
        // SAFETY: the handle is open and c_path outlives the call.
        let status = unsafe { (self.engine.save_model)(self.raw, c_path.as_ptr()) };
        self.engine.check(status, "save_model")
    }

    /// Run the remaining configured training passes.
    pub(crate) fn finish_passes(&mut self) -> LearnerResult<()> {
        self.ensure_open()?;
        // SAFETY: the handle is open.
        let status = unsafe { (self.engine.finish_passes)(self.raw) };
        self.engine.check(status, "finish_passes")
    }

    /// Release the native resource.
    ///
    /// Idempotent at the host level: only the first call reaches the engine,
    /// every later call returns `Ok(())` without native work.
    pub(crate) fn close(&mut self) -> LearnerResult<()> {
        if !self.open {
            return Ok(());
        }
        // Flip before the native call: even if the engine reports a close
        // failure, the token must never be passed to ole_close again.
        self.open = false;
        // SAFETY: the token was live until this first close.
        let status = unsafe { (self.engine.close)(self.raw) };
        self.engine.check(status, "close")
    }
}

impl Drop for LearnerHandle {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        if let Err(err) = self.close() {
            warn!("closing learner during drop failed: {err}");
        }
    }
}

impl std::fmt::Debug for LearnerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearnerHandle")
            .field("handle", &format_args!("{:#x}", self.raw))
            .field("open", &self.open)
            .finish()
    }
}
