//! One-time loading of the native engine module.
//!
//! The engine ships as a platform shared module packaged alongside the host
//! artifact. On first use this module resolves the platform-qualified file
//! name, copies the module into a private location under the system temp
//! directory, loads it, and resolves the entry-point table. Every later call
//! observes the already-loaded table without redoing any work, no matter how
//! many threads race the first call.
//!
//! Extracted copies are left on disk for the lifetime of the process. Each
//! copy gets a sibling `.lock` marker file; a best-effort sweep removes
//! leftover copies from dead processes that have no marker, so concurrent
//! processes extracting independently never delete each other's artifact.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::error::{LearnerError, LearnerResult};
use crate::ffi::EngineApi;

/// File stem of the packaged engine module.
const MODULE_STEM: &str = "libole";

/// Environment variable overriding the packaged resource directory.
const ENGINE_DIR_ENV: &str = "CORRAL_ENGINE_DIR";

/// Suffix of the per-artifact marker files the sweep respects.
const LOCK_SUFFIX: &str = ".lock";

/// One-time cell with an unsynchronized fast path and a lock-guarded slow
/// path that re-checks before acting.
///
/// The cell is populated only on success, so a failed load leaves the
/// process in the unloaded state and a later call retries.
pub(crate) struct LoadCell<T: 'static> {
    cell: OnceLock<T>,
    lock: Mutex<()>,
}

impl<T> LoadCell<T> {
    pub(crate) const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            lock: Mutex::new(()),
        }
    }

    /// Return the loaded value, running `load` at most once across all
    /// concurrent callers.
    pub(crate) fn get_or_try_load<E>(
        &self,
        load: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        // Fast path: already loaded.
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        let _guard = self.lock.lock();
        // Re-check under the lock: another thread may have loaded while we
        // were waiting.
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        let value = load()?;
        Ok(self.cell.get_or_init(|| value))
    }
}

static ENGINE: LoadCell<EngineApi> = LoadCell::new();

/// Load the engine module if this process has not done so yet, and return
/// the resolved entry-point table.
///
/// Safe under arbitrary concurrent first calls: exactly one thread performs
/// the extraction and load, all others block until it completes.
///
/// # Errors
///
/// - [`LearnerError::UnsupportedPlatform`] on an OS family or pointer width
///   with no packaged module
/// - [`LearnerError::ModuleNotFound`] when no packaged module is present
/// - [`LearnerError::Io`] when the extraction copy fails
/// - [`LearnerError::Load`] when the module cannot be loaded or is missing
///   entry points
///
/// A failure is reported to every concurrent caller and the process stays
/// unloaded; a later call retries the load.
pub fn ensure_loaded() -> LearnerResult<&'static EngineApi> {
    ENGINE.get_or_try_load(load_engine)
}

/// Whether a packaged engine module can be located on this platform.
///
/// Probe only: nothing is extracted or loaded. Integration tests use this to
/// skip gracefully on hosts without a packaged engine.
pub fn engine_available() -> bool {
    locate_module().is_ok()
}

fn load_engine() -> LearnerResult<EngineApi> {
    let source = locate_module()?;
    let extracted = extract_module(&source)?;
    info!(
        module = %source.display(),
        extracted = %extracted.display(),
        "loading native engine module"
    );
    // SAFETY: loading a shared module runs its initializers; the path was
    // resolved from the packaged resource locations above.
    let library = unsafe { libloading::Library::new(&extracted) }
        .map_err(|e| LearnerError::Load(format!("{}: {e}", extracted.display())))?;
    EngineApi::from_library(library).map_err(|e| LearnerError::Load(e.to_string()))
}

/// Resolve the platform qualifier used in packaged module names.
///
/// 64-bit hosts use the bare OS family (`Linux`, `Darwin`); 32-bit hosts get
/// a `.32` suffix.
fn platform_family() -> LearnerResult<String> {
    let family = match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Darwin",
        other => {
            return Err(LearnerError::UnsupportedPlatform {
                os: other.to_string(),
                pointer_width: usize::BITS,
            })
        }
    };
    match usize::BITS {
        64 => Ok(family.to_string()),
        32 => Ok(format!("{family}.32")),
        width => Err(LearnerError::UnsupportedPlatform {
            os: family.to_string(),
            pointer_width: width,
        }),
    }
}

fn module_suffix() -> &'static str {
    if cfg!(target_os = "macos") {
        ".dylib"
    } else {
        ".so"
    }
}

/// Directories searched for the packaged module, most specific first.
fn resource_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(dir) = std::env::var(ENGINE_DIR_ENV) {
        dirs.push(PathBuf::from(dir));
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            dirs.push(parent.to_path_buf());
            dirs.push(parent.join("lib"));
        }
    }
    dirs.push(PathBuf::from("lib"));
    dirs
}

/// Locate the packaged module, preferring the platform-qualified name and
/// falling back to the unqualified one.
fn locate_module() -> LearnerResult<PathBuf> {
    let family = platform_family()?;
    let suffix = module_suffix();
    let qualified = format!("{MODULE_STEM}.{family}{suffix}");
    let unqualified = format!("{MODULE_STEM}{suffix}");
    let dirs = resource_dirs();

    let mut searched = Vec::new();
    for name in [&qualified, &unqualified] {
        for dir in &dirs {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
            searched.push(candidate.display().to_string());
        }
    }
    Err(LearnerError::ModuleNotFound {
        searched: searched.join(", "),
    })
}

/// Copy the packaged module into a private file in the temp directory and
/// mark it with a `.lock` sibling.
fn extract_module(source: &Path) -> LearnerResult<PathBuf> {
    let temp_dir = std::env::temp_dir();

    let file = tempfile::Builder::new()
        .prefix(&format!("{MODULE_STEM}-"))
        .suffix(module_suffix())
        .tempfile_in(&temp_dir)?;
    std::fs::copy(source, file.path())?;
    let (file, path) = file.keep().map_err(|e| LearnerError::Io(e.error))?;
    drop(file);

    std::fs::File::create(lock_path(&path))?;
    sweep_stale_artifacts(&temp_dir);
    Ok(path)
}

fn lock_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_os_string();
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
}

/// Remove extracted copies whose `.lock` marker is gone.
///
/// Best effort: sweep failures are logged and never fail the load.
fn sweep_stale_artifacts(dir: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("cannot sweep stale engine artifacts in {}: {err}", dir.display());
            return;
        }
    };
    let prefix = format!("{MODULE_STEM}-");
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(&prefix) || name.ends_with(LOCK_SUFFIX) {
            continue;
        }
        if lock_path(&path).exists() {
            continue;
        }
        if let Err(err) = std::fs::remove_file(&path) {
            warn!("cannot remove stale engine artifact {}: {err}", path.display());
        }
    }
}
