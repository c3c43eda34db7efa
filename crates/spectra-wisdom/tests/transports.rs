//! File and string transports of the process-wide store.

use std::sync::Mutex;

use spectra_test_utils::{TempPath, SAMPLE_WISDOM};
use spectra_wisdom::{global, ImportPath, WisdomConfig, WisdomError};

static SERIAL: Mutex<()> = Mutex::new(());

#[test]
fn file_export_then_import_restores_state() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let path = TempPath::new("wisdom-global");
    global::reset();
    global::import_from_string(SAMPLE_WISDOM).unwrap();
    let text = global::export_to_string();
    global::export_to_file(&path).unwrap();

    global::reset();
    assert_eq!(global::with_store(|s| s.len()), 0);
    assert_eq!(global::import_from_file(&path).unwrap(), 3);
    assert_eq!(global::export_to_string(), text);
    global::reset();
}

#[test]
fn nonexistent_file_leaves_state_unchanged() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    global::reset();
    global::import_from_string(SAMPLE_WISDOM).unwrap();
    let before = global::export_to_string();
    let err = global::import_from_file("/nonexistent/path").unwrap_err();
    assert!(matches!(err, WisdomError::Import(ImportPath::FromFile)));
    assert_eq!(err.to_string(), "wisdom import failed: from_file");
    assert_eq!(global::export_to_string(), before);
    global::reset();
}

#[test]
fn system_defaults_follow_environment() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let path = TempPath::new("wisdom-system-env");
    std::fs::write(path.path(), SAMPLE_WISDOM).unwrap();
    // Serialised by SERIAL; no other test here touches the environment.
    std::env::set_var(WisdomConfig::SYSTEM_PATH_ENV, path.path());
    assert_eq!(WisdomConfig::from_env().system_path, path.path());

    global::reset();
    assert_eq!(global::import_from_system_defaults().unwrap(), 3);

    std::fs::remove_file(path.path()).unwrap();
    let err = global::import_from_system_defaults().unwrap_err();
    assert!(matches!(err, WisdomError::Import(ImportPath::FromSystem)));
    assert_eq!(global::with_store(|s| s.len()), 3);

    std::env::remove_var(WisdomConfig::SYSTEM_PATH_ENV);
    global::reset();
}
