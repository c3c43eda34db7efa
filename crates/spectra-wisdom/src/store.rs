//! The [`WisdomStore`]: accumulated planner knowledge and its transports.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::WisdomConfig;
use crate::entry::{format_document, parse_document, parse_str, ParseError, WisdomEntry, WisdomKey};
use crate::error::{ImportPath, WisdomError};

/// Accumulated wisdom.
///
/// Entries keep their first-insertion order. Every import parses its
/// whole document before touching the store, so a rejected import leaves
/// the store exactly as it was.
///
/// # Examples
///
/// ```
/// use spectra_wisdom::{WisdomEntry, WisdomStore};
///
/// let mut store = WisdomStore::new();
/// store.insert(WisdomEntry::new("dft_direct", 0x40, [1, 2, 3, 4]).unwrap());
/// let text = store.export_to_string();
///
/// let mut other = WisdomStore::new();
/// assert_eq!(other.import_from_string(&text).unwrap(), 1);
/// assert_eq!(other.export_to_string(), text);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WisdomStore {
    entries: IndexMap<WisdomKey, WisdomEntry>,
}

impl WisdomStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &WisdomEntry> {
        self.entries.values()
    }

    /// The entry for a problem/flags pair, if one is known.
    pub fn get(&self, key: &WisdomKey) -> Option<&WisdomEntry> {
        self.entries.get(key)
    }

    /// Remember one decision. Returns the entry it replaced, if any.
    pub fn insert(&mut self, entry: WisdomEntry) -> Option<WisdomEntry> {
        self.entries.insert(entry.key(), entry)
    }

    /// Discard everything.
    pub fn forget(&mut self) {
        debug!(entries = self.entries.len(), "wisdom forgotten");
        self.entries.clear();
    }

    fn merge(&mut self, entries: Vec<WisdomEntry>) -> usize {
        let n = entries.len();
        for entry in entries {
            self.insert(entry);
        }
        n
    }

    fn commit(
        &mut self,
        parsed: Result<Vec<WisdomEntry>, ParseError>,
        path: ImportPath,
    ) -> Result<usize, WisdomError> {
        match parsed {
            Ok(entries) => {
                let n = self.merge(entries);
                debug!(transport = %path, entries = n, total = self.len(), "wisdom imported");
                Ok(n)
            }
            Err(e) => {
                warn!(transport = %path, error = %e, "wisdom import rejected");
                Err(WisdomError::Import(path))
            }
        }
    }

    // ── Export ──────────────────────────────────────────────────

    /// The whole store in its printable form.
    pub fn export_to_string(&self) -> String {
        let text = format_document(self.entries.values());
        debug!(transport = "string", entries = self.len(), "wisdom exported");
        text
    }

    /// Write the whole store to `path`, replacing the file.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<(), WisdomError> {
        let path = path.as_ref();
        let io_err = |source| WisdomError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::create(path).map_err(io_err)?;
        file.write_all(format_document(self.entries.values()).as_bytes())
            .and_then(|()| file.flush())
            .map_err(io_err)?;
        debug!(transport = "file", path = %path.display(), entries = self.len(), "wisdom exported");
        Ok(())
    }

    /// Stream the whole store to `sink`, one byte per call, in document order.
    pub fn export_with(&self, sink: &mut dyn FnMut(u8)) {
        for b in format_document(self.entries.values()).bytes() {
            sink(b);
        }
        debug!(transport = "callback", entries = self.len(), "wisdom exported");
    }

    // ── Import ──────────────────────────────────────────────────

    /// Merge a document held in memory. Returns the number of entries read.
    pub fn import_from_string(&mut self, text: &str) -> Result<usize, WisdomError> {
        self.commit(parse_str(text), ImportPath::FromString)
    }

    /// Merge a document from a file.
    ///
    /// An unreadable or missing file is rejected like a malformed one.
    pub fn import_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize, WisdomError> {
        self.import_path(path.as_ref(), ImportPath::FromFile)
    }

    /// Merge the platform default wisdom named by `config`.
    pub fn import_from_system(&mut self, config: &WisdomConfig) -> Result<usize, WisdomError> {
        self.import_path(&config.system_path, ImportPath::FromSystem)
    }

    fn import_path(&mut self, path: &Path, kind: ImportPath) -> Result<usize, WisdomError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(transport = %kind, path = %path.display(), error = %e, "cannot read wisdom");
                return Err(WisdomError::Import(kind));
            }
        };
        let mut iter = bytes.into_iter();
        self.commit(parse_document(move || iter.next()), kind)
    }

    /// Merge a document pulled one byte at a time from `source`.
    ///
    /// `source` is called until the document closes; it returns `None`
    /// at end of input, which before the close rejects the import.
    pub fn import_with(&mut self, source: impl FnMut() -> Option<u8>) -> Result<usize, WisdomError> {
        self.commit(parse_document(source), ImportPath::Import)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectra_test_utils::{TempPath, SAMPLE_WISDOM, SAMPLE_WISDOM_CONFLICT};

    const EMPTY: &str = "(spectra-wisdom-1\n)\n";

    fn sample() -> WisdomStore {
        let mut store = WisdomStore::new();
        store.import_from_string(SAMPLE_WISDOM).unwrap();
        store
    }

    #[test]
    fn empty_store_exports_canonical_form() {
        let mut store = WisdomStore::new();
        assert_eq!(store.export_to_string(), EMPTY);
        assert_eq!(store.import_from_string(EMPTY).unwrap(), 0);
        assert_eq!(store.export_to_string(), EMPTY);
    }

    #[test]
    fn import_is_additive() {
        let mut store = sample();
        assert_eq!(store.len(), 3);
        store
            .import_from_string("(spectra-wisdom-1 (extra #x0 #x9 #x9 #x9 #x9))")
            .unwrap();
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn conflicting_entry_replaced_in_place() {
        let mut store = sample();
        assert_eq!(store.import_from_string(SAMPLE_WISDOM_CONFLICT).unwrap(), 2);
        let solvers: Vec<&str> = store.entries().map(WisdomEntry::solver).collect();
        assert_eq!(
            solvers,
            ["dft_r2hc_1", "rdft_vrank3_transpose", "dft_buffered", "dft_nop"]
        );
    }

    #[test]
    fn rejected_import_leaves_store_unchanged() {
        let mut store = sample();
        let before = store.clone();
        let err = store
            .import_from_string("(spectra-wisdom-1 (ok #x0 #x1 #x1 #x1 #x1) (broken")
            .unwrap_err();
        assert!(matches!(err, WisdomError::Import(ImportPath::FromString)));
        assert_eq!(store, before);
    }

    #[test]
    fn missing_file_is_from_file_error() {
        let mut store = sample();
        let before = store.clone();
        let err = store.import_from_file("/nonexistent/path").unwrap_err();
        assert!(matches!(err, WisdomError::Import(ImportPath::FromFile)));
        assert_eq!(store, before);
    }

    #[test]
    fn file_round_trip() {
        let path = TempPath::new("wisdom-store");
        let store = sample();
        store.export_to_file(&path).unwrap();

        let mut loaded = WisdomStore::new();
        assert_eq!(loaded.import_from_file(&path).unwrap(), 3);
        assert_eq!(loaded, store);
    }

    #[test]
    fn export_to_unwritable_path_is_io_error() {
        let err = sample()
            .export_to_file("/nonexistent/dir/wisdom")
            .unwrap_err();
        assert!(matches!(err, WisdomError::Io { .. }));
    }

    #[test]
    fn system_import_uses_config_path() {
        let path = TempPath::new("wisdom-system");
        std::fs::write(path.path(), SAMPLE_WISDOM).unwrap();
        let mut store = WisdomStore::new();
        assert_eq!(store.import_from_system(&WisdomConfig::new(path.path())).unwrap(), 3);

        let err = store
            .import_from_system(&WisdomConfig::new("/nonexistent/system/wisdom"))
            .unwrap_err();
        assert!(matches!(err, WisdomError::Import(ImportPath::FromSystem)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn callback_export_matches_string_export() {
        let store = sample();
        let mut bytes = Vec::new();
        store.export_with(&mut |b: u8| bytes.push(b));
        assert_eq!(String::from_utf8(bytes).unwrap(), store.export_to_string());
    }

    #[test]
    fn callback_import_stops_at_document_end() {
        let text = format!("{SAMPLE_WISDOM}(spectra-wisdom-1 )");
        let mut source = text.bytes();
        let mut store = WisdomStore::new();
        assert_eq!(store.import_with(|| source.next()).unwrap(), 3);
        let rest: String = source.map(char::from).collect();
        assert_eq!(rest, "\n(spectra-wisdom-1 )");
    }

    #[test]
    fn callback_import_rejects_early_end() {
        let mut source = "(spectra-wisdom-1 (a #x1".bytes();
        let mut store = sample();
        let err = store.import_with(|| source.next()).unwrap_err();
        assert!(matches!(err, WisdomError::Import(ImportPath::Import)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn forget_empties() {
        let mut store = sample();
        store.forget();
        assert!(store.is_empty());
        assert_eq!(store.export_to_string(), EMPTY);
    }

    #[test]
    fn get_by_key() {
        let store = sample();
        let key = WisdomKey {
            problem: [0x00c0ffee, 1, 2, 3],
            flags: 0,
        };
        assert_eq!(store.get(&key).map(WisdomEntry::solver), Some("rdft_rank_geq2"));
    }
}
