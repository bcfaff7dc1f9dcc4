use std::fs;
use std::path::Path;

use qrferry_core::{
    CodecConfig, PipelineError, SymbolDecodeError, decode_directory, decode_directory_with,
    encode_file_with,
};

mod support;

use support::{RowCodec, config_with_chunk, sample_bytes, symbol_names, write_source};

/// Encode `len` sample bytes into symbols of 101 characters each.
fn encoded_dir(temp: &Path, len: usize) -> std::path::PathBuf {
    let source = write_source(temp, "data.bin", &sample_bytes(len));
    let symbols = temp.join("symbols");
    encode_file_with(&source, &symbols, &RowCodec, &config_with_chunk(101)).unwrap();
    symbols
}

fn expect_symbol_failures(err: PipelineError) -> Vec<SymbolDecodeError> {
    match err {
        PipelineError::Symbols(aggregate) => aggregate.failures,
        other => panic!("expected symbol failures, got: {other}"),
    }
}

#[test]
fn missing_middle_symbol_fails_without_output() {
    let temp = tempfile::tempdir().unwrap();
    let symbols = encoded_dir(temp.path(), 200);
    assert_eq!(symbol_names(&symbols).len(), 3);
    fs::remove_file(symbols.join("qrcode_2.png")).unwrap();

    let err =
        decode_directory_with(&symbols, Path::new("restored.bin"), &RowCodec, false).unwrap_err();
    let msg = err.to_string();
    let failures = expect_symbol_failures(err);
    assert_eq!(failures, vec![SymbolDecodeError::Missing { first: 2, last: 2 }]);
    assert!(msg.contains("2 missing"));
    assert!(!symbols.join("restored.bin").exists());
}

#[test]
fn undecodable_symbol_is_reported_by_index() {
    let temp = tempfile::tempdir().unwrap();
    let symbols = encoded_dir(temp.path(), 200);
    let blank = image::GrayImage::from_pixel(40, 40, image::Luma([255]));
    blank.save(symbols.join("qrcode_2.png")).unwrap();

    let err =
        decode_directory_with(&symbols, Path::new("restored.bin"), &RowCodec, false).unwrap_err();
    let failures = expect_symbol_failures(err);
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], SymbolDecodeError::NoPayload { index: 2, .. }));
    assert!(!symbols.join("restored.bin").exists());
}

#[test]
fn second_copy_of_an_index_is_a_duplicate() {
    let temp = tempfile::tempdir().unwrap();
    let symbols = encoded_dir(temp.path(), 200);
    fs::copy(symbols.join("qrcode_1.png"), symbols.join("qrcode_01.png")).unwrap();

    let err =
        decode_directory_with(&symbols, Path::new("restored.bin"), &RowCodec, false).unwrap_err();
    let failures = expect_symbol_failures(err);
    assert_eq!(
        failures,
        vec![SymbolDecodeError::Duplicate {
            index: 1,
            path: symbols.join("qrcode_1.png"),
        }]
    );
    assert!(!symbols.join("restored.bin").exists());
}

#[test]
fn unreadable_image_is_reported_by_index() {
    let temp = tempfile::tempdir().unwrap();
    let symbols = encoded_dir(temp.path(), 200);
    fs::write(symbols.join("qrcode_2.png"), b"\x89PNG truncated").unwrap();

    let err =
        decode_directory_with(&symbols, Path::new("restored.bin"), &RowCodec, false).unwrap_err();
    let failures = expect_symbol_failures(err);
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], SymbolDecodeError::Unreadable { index: 2, .. }));
}

#[test]
fn every_failure_is_collected_in_one_pass() {
    let temp = tempfile::tempdir().unwrap();
    let symbols = encoded_dir(temp.path(), 500);
    assert_eq!(symbol_names(&symbols).len(), 7);
    fs::remove_file(symbols.join("qrcode_2.png")).unwrap();
    fs::remove_file(symbols.join("qrcode_3.png")).unwrap();
    fs::write(symbols.join("qrcode_5.png"), b"garbage").unwrap();
    let blank = image::GrayImage::from_pixel(8, 8, image::Luma([0]));
    blank.save(symbols.join("qrcode_7.png")).unwrap();

    for parallel in [false, true] {
        let err = decode_directory_with(&symbols, Path::new("restored.bin"), &RowCodec, parallel)
            .unwrap_err();
        let failures = expect_symbol_failures(err);
        let indices: Vec<_> = failures.iter().map(SymbolDecodeError::index).collect();
        assert_eq!(indices, [2, 5, 7], "parallel = {parallel}");
        assert_eq!(failures[0], SymbolDecodeError::Missing { first: 2, last: 3 });
    }
    assert!(!symbols.join("restored.bin").exists());
}

#[test]
fn truncated_trailing_symbol_is_malformed_payload() {
    let temp = tempfile::tempdir().unwrap();
    let symbols = encoded_dir(temp.path(), 200);
    fs::remove_file(symbols.join("qrcode_3.png")).unwrap();

    let err =
        decode_directory_with(&symbols, Path::new("restored.bin"), &RowCodec, false).unwrap_err();
    assert!(matches!(err, PipelineError::Payload(_)));
    assert!(!symbols.join("restored.bin").exists());
}

#[test]
fn unpadded_names_past_nine_are_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let symbols = encoded_dir(temp.path(), 1000);
    let names = symbol_names(&symbols);
    assert_eq!(names.len(), 14);
    for name in names {
        let index: usize = name
            .trim_start_matches("qrcode_")
            .trim_end_matches(".png")
            .parse()
            .unwrap();
        fs::rename(symbols.join(&name), symbols.join(format!("qrcode_{index}.png"))).unwrap();
    }

    let err =
        decode_directory_with(&symbols, Path::new("restored.bin"), &RowCodec, false).unwrap_err();
    assert!(matches!(err, PipelineError::Misordered { .. }));
    assert!(err.to_string().contains("zero-padded"));
}

#[test]
fn empty_directory_reports_first_symbol_missing() {
    let temp = tempfile::tempdir().unwrap();
    let err = decode_directory_with(temp.path(), Path::new("restored.bin"), &RowCodec, false)
        .unwrap_err();
    let failures = expect_symbol_failures(err);
    assert_eq!(failures, vec![SymbolDecodeError::Missing { first: 1, last: 1 }]);
}

#[test]
fn missing_directory_is_reported() {
    let temp = tempfile::tempdir().unwrap();
    let err = decode_directory(
        &temp.path().join("absent"),
        Path::new("restored.bin"),
        &CodecConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::DirectoryNotFound(_)));
}
