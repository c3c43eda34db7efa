//! End-to-end encode/decode over every element kind and layout.

use std::fs::File;
use std::io::{BufReader, BufWriter};

use spectra_array::{ElementKind, Layout, NDArray};
use spectra_codec::{decode_array, decode_array_in, encode_array, ArrayReader, ArrayWriter};
use spectra_test_utils::{counting_arena, every_kind, patterned_array, TempPath};

#[test]
fn every_kind_round_trips_in_both_layouts() {
    for layout in [Layout::RowMajor, Layout::ColumnMajor] {
        for a in every_kind(layout, &[3, 1, 4]) {
            let mut buf = Vec::new();
            encode_array(&mut buf, &a).unwrap();
            let got = decode_array(&mut buf.as_slice()).unwrap();
            assert_eq!(got, a, "{} {layout}", a.kind());
        }
    }
}

#[test]
fn views_encode_their_own_extent() {
    let mut a = patterned_array(ElementKind::Float32, Layout::RowMajor, &[4, 8]);
    let row = a.slice_outer(2).unwrap();
    let mut buf = Vec::new();
    encode_array(&mut buf, &row).unwrap();
    assert_eq!(buf.len(), 12 + 32);

    let got = decode_array(&mut buf.as_slice()).unwrap();
    assert_eq!(got.dims(), &[8]);
    assert_eq!(got.as_bytes(), row.as_bytes());
    assert!(!got.is_shared());
    assert_eq!(row.refcount(), 2);
}

#[test]
fn decoded_array_owns_its_storage() {
    let (arena, alloc) = counting_arena();
    let a = patterned_array(ElementKind::Complex64, Layout::ColumnMajor, &[2, 2]);
    let mut buf = Vec::new();
    encode_array(&mut buf, &a).unwrap();

    let got = decode_array_in(&mut buf.as_slice(), &alloc).unwrap();
    assert_eq!(arena.stats().live_bytes, 64);
    assert_eq!(got.refcount(), 1);
    drop(got);
    assert_eq!(arena.stats().live_buffers, 0);
}

#[test]
fn framed_stream_through_a_file() {
    let path = TempPath::new("codec-stream");
    let arrays = every_kind(Layout::RowMajor, &[2, 5]);
    {
        let mut writer = ArrayWriter::new(BufWriter::new(File::create(path.path()).unwrap()));
        for a in &arrays {
            writer.write_array(a).unwrap();
        }
        writer.flush().unwrap();
    }

    let reader = ArrayReader::new(BufReader::new(File::open(path.path()).unwrap()));
    let got: Vec<NDArray> = reader.arrays().collect::<Result<_, _>>().unwrap();
    assert_eq!(got, arrays);
}
