//! Callback transports through the process-wide hooks.
//!
//! Hooks bind once per process, so everything runs in one test.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use spectra_test_utils::{SAMPLE_WISDOM, SAMPLE_WISDOM_CONFLICT};
use spectra_wisdom::global;
use spectra_wisdom::{ImportPath, WisdomError};

#[test]
fn hooks_bind_once_and_carry_whole_documents() {
    global::reset();

    assert!(matches!(
        global::export_via_callback(),
        Err(WisdomError::SinkUnbound)
    ));
    assert!(matches!(
        global::import_via_callback(),
        Err(WisdomError::SourceUnbound)
    ));

    let exported = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&exported);
    global::set_export_sink(move |b| sink.lock().unwrap().push(b)).unwrap();
    assert!(matches!(
        global::set_export_sink(|_| {}),
        Err(WisdomError::SinkAlreadyBound)
    ));

    let pending = Arc::new(Mutex::new(VecDeque::new()));
    let source = Arc::clone(&pending);
    global::set_import_source(move || source.lock().unwrap().pop_front()).unwrap();
    assert!(matches!(
        global::set_import_source(|| None),
        Err(WisdomError::SourceAlreadyBound)
    ));

    // Two documents queued back to back: each import takes exactly one.
    pending
        .lock()
        .unwrap()
        .extend(SAMPLE_WISDOM.bytes().chain(SAMPLE_WISDOM_CONFLICT.bytes()));
    assert_eq!(global::import_via_callback().unwrap(), 3);
    assert_eq!(global::import_via_callback().unwrap(), 2);
    assert_eq!(global::with_store(|s| s.len()), 4);

    // Only whitespace left: the source runs dry before a document opens.
    let before = global::export_to_string();
    assert!(matches!(
        global::import_via_callback(),
        Err(WisdomError::Import(ImportPath::Import))
    ));
    assert_eq!(global::export_to_string(), before);

    global::export_via_callback().unwrap();
    let bytes = std::mem::take(&mut *exported.lock().unwrap());
    assert_eq!(String::from_utf8(bytes).unwrap(), before);

    global::reset();
    global::export_via_callback().unwrap();
    let bytes = std::mem::take(&mut *exported.lock().unwrap());
    assert_eq!(bytes, b"(spectra-wisdom-1\n)\n");
}
