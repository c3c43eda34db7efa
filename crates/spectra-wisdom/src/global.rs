//! Process-wide wisdom.
//!
//! One [`WisdomStore`] per process, behind a mutex. Every function here
//! takes the lock for the whole operation, so imports and exports from
//! different threads are serialised and no caller ever sees a half-merged
//! store. A poisoned lock is recovered: the store is only mutated after a
//! document has been fully parsed.
//!
//! Callback transports use hooks registered once per process with
//! [`set_export_sink`] and [`set_import_source`]. Callbacks run while the
//! store lock is held and must not call back into this module.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::config::WisdomConfig;
use crate::entry::WisdomEntry;
use crate::error::WisdomError;
use crate::store::WisdomStore;

type ExportSink = Box<dyn FnMut(u8) + Send>;
type ImportSource = Box<dyn FnMut() -> Option<u8> + Send>;

static STORE: OnceLock<Mutex<WisdomStore>> = OnceLock::new();
static EXPORT_SINK: OnceLock<Mutex<ExportSink>> = OnceLock::new();
static IMPORT_SOURCE: OnceLock<Mutex<ImportSource>> = OnceLock::new();

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn store() -> MutexGuard<'static, WisdomStore> {
    lock(STORE.get_or_init(|| Mutex::new(WisdomStore::new())))
}

// ── Hooks ───────────────────────────────────────────────────────

/// Register the byte sink used by [`export_via_callback`].
///
/// Binds once per process; a second call fails with
/// [`WisdomError::SinkAlreadyBound`] and leaves the first sink in place.
pub fn set_export_sink<F>(sink: F) -> Result<(), WisdomError>
where
    F: FnMut(u8) + Send + 'static,
{
    EXPORT_SINK
        .set(Mutex::new(Box::new(sink)))
        .map_err(|_| WisdomError::SinkAlreadyBound)
}

/// Register the byte source used by [`import_via_callback`].
///
/// The source returns `None` at end of input. Binds once per process; a
/// second call fails with [`WisdomError::SourceAlreadyBound`].
pub fn set_import_source<F>(source: F) -> Result<(), WisdomError>
where
    F: FnMut() -> Option<u8> + Send + 'static,
{
    IMPORT_SOURCE
        .set(Mutex::new(Box::new(source)))
        .map_err(|_| WisdomError::SourceAlreadyBound)
}

// ── Export ──────────────────────────────────────────────────────

/// Write the accumulated wisdom to `path`.
pub fn export_to_file(path: impl AsRef<Path>) -> Result<(), WisdomError> {
    store().export_to_file(path)
}

/// The accumulated wisdom as text.
pub fn export_to_string() -> String {
    store().export_to_string()
}

/// Stream the accumulated wisdom to the registered sink.
pub fn export_via_callback() -> Result<(), WisdomError> {
    let sink = EXPORT_SINK.get().ok_or(WisdomError::SinkUnbound)?;
    let store = store();
    let mut sink = lock(sink);
    store.export_with(&mut **sink);
    Ok(())
}

// ── Import ──────────────────────────────────────────────────────

/// Merge the platform default wisdom, located through
/// [`WisdomConfig::from_env`].
pub fn import_from_system_defaults() -> Result<usize, WisdomError> {
    store().import_from_system(&WisdomConfig::from_env())
}

/// Merge the wisdom in `path`.
pub fn import_from_file(path: impl AsRef<Path>) -> Result<usize, WisdomError> {
    store().import_from_file(path)
}

/// Merge wisdom from text.
pub fn import_from_string(text: &str) -> Result<usize, WisdomError> {
    store().import_from_string(text)
}

/// Merge one document pulled from the registered source.
pub fn import_via_callback() -> Result<usize, WisdomError> {
    let source = IMPORT_SOURCE.get().ok_or(WisdomError::SourceUnbound)?;
    let mut store = store();
    let mut source = lock(source);
    store.import_with(&mut **source)
}

// ── State ───────────────────────────────────────────────────────

/// Discard all accumulated wisdom.
pub fn reset() {
    store().forget();
}

/// Remember one planning decision.
pub fn record(entry: WisdomEntry) -> Option<WisdomEntry> {
    store().insert(entry)
}

/// Run `f` with read access to the accumulated wisdom.
pub fn with_store<R>(f: impl FnOnce(&WisdomStore) -> R) -> R {
    f(&store())
}
