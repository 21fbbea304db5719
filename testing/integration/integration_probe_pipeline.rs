//! Integration tests for the start PTS probe
//!
//! Builds synthetic HLS audio segments with ID3v2 tags and runs them through
//! the library pipeline and the `pts-probe` binary.

use pts_probe::{
    probe_file, probe_reader, FrameError, PayloadSection, ProbeError, TagError,
};
use std::process::Command;
use util::{remove_temp, write_temp, TagBuilder, ADTS_SILENCE};

const REFERENCE_BYTES: [u8; 8] = [0, 0, 0, 0, 0x82, 0x13, 0x9e, 0xf8];
const REFERENCE_PTS: i64 = 2_182_324_208;

fn run_probe(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pts-probe"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run pts-probe")
}

#[test]
fn test_probe_v24_segment() {
    let segment = TagBuilder::new(4)
        .unwrap()
        .apple_timestamp(REFERENCE_BYTES)
        .unwrap()
        .padding(32)
        .build_segment()
        .unwrap();
    assert_eq!(probe_reader(&mut &segment[..]).unwrap(), Some(REFERENCE_PTS));
}

#[test]
fn test_probe_v23_segment_with_other_frames() {
    let segment = TagBuilder::new(3)
        .unwrap()
        .text_frame("TIT2", "segment 0")
        .unwrap()
        .priv_frame("com.example.ad-insertion.marker.identifier", &[1, 2, 3, 4, 5, 6, 7, 8])
        .unwrap()
        .apple_timestamp([0, 0, 0, 1, 0x82, 0x13, 0x9e, 0xf8])
        .unwrap()
        .build_segment()
        .unwrap();
    assert_eq!(
        probe_reader(&mut &segment[..]).unwrap(),
        Some(REFERENCE_PTS + (1 << 31))
    );
}

#[test]
fn test_probe_segment_without_priv_frame() {
    let segment = TagBuilder::new(4)
        .unwrap()
        .text_frame("TIT2", "no timestamp here")
        .unwrap()
        .build_segment()
        .unwrap();
    assert_eq!(probe_reader(&mut &segment[..]).unwrap(), None);
}

#[test]
fn test_probe_short_foreign_priv_before_apple() {
    let segment = TagBuilder::new(4)
        .unwrap()
        .priv_frame("com.foo", &[1, 2, 3])
        .unwrap()
        .apple_timestamp(REFERENCE_BYTES)
        .unwrap()
        .build_segment()
        .unwrap();
    assert_eq!(probe_reader(&mut &segment[..]).unwrap(), Some(REFERENCE_PTS));
}

#[test]
fn test_probe_truncated_apple_frame() {
    let segment = TagBuilder::new(4)
        .unwrap()
        .priv_frame("com.apple.streaming.transportStreamTimestamp", &[0, 0, 0, 0, 0x82])
        .unwrap()
        .build_segment()
        .unwrap();
    match probe_reader(&mut &segment[..]) {
        Err(ProbeError::Frame(FrameError::MalformedFrame { section, expected, actual })) => {
            assert_eq!(section, PayloadSection::Timestamp);
            assert_eq!(expected, 8);
            assert_eq!(actual, 5);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_probe_untagged_stream() {
    let mut adts = Vec::new();
    for _ in 0..3 {
        adts.extend_from_slice(&ADTS_SILENCE);
    }
    match probe_reader(&mut &adts[..]) {
        Err(ProbeError::Tag(TagError::UnsupportedFormat(name))) => assert_eq!(name, "MPEG audio"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_probe_file() {
    let segment = TagBuilder::new(4)
        .unwrap()
        .apple_timestamp(REFERENCE_BYTES)
        .unwrap()
        .build_segment()
        .unwrap();
    let path = write_temp("segment.aac", &segment).unwrap();
    let result = probe_file(&path);
    remove_temp(&path);
    assert_eq!(result.unwrap(), Some(REFERENCE_PTS));
}

#[test]
fn test_cli_prints_start_pts() {
    let segment = TagBuilder::new(4)
        .unwrap()
        .apple_timestamp(REFERENCE_BYTES)
        .unwrap()
        .build_segment()
        .unwrap();
    let path = write_temp("cli.aac", &segment).unwrap();
    let output = run_probe(&["-filename", path.to_str().unwrap()]);
    remove_temp(&path);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "{ \"start_pts\":2182324208 }"
    );
    assert!(output.stderr.is_empty());
}

#[test]
fn test_cli_unrelated_owner_is_silent() {
    let segment = TagBuilder::new(4)
        .unwrap()
        .priv_frame("com.example.streaming.unrelatedPrivateFrame!", &[0xFF; 8])
        .unwrap()
        .build_segment()
        .unwrap();
    let path = write_temp("silent.aac", &segment).unwrap();
    let output = run_probe(&["-filename", path.to_str().unwrap()]);
    remove_temp(&path);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
}

#[test]
fn test_cli_verbose_logs_to_stderr() {
    let segment = TagBuilder::new(3)
        .unwrap()
        .apple_timestamp(REFERENCE_BYTES)
        .unwrap()
        .build_segment()
        .unwrap();
    let path = write_temp("verbose.aac", &segment).unwrap();
    let output = run_probe(&["-filename", path.to_str().unwrap(), "-v"]);
    remove_temp(&path);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Detected format: ID3v2.3"), "stderr: {}", stderr);
    assert!(stderr.contains("Uppermost bit: 0"), "stderr: {}", stderr);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "{ \"start_pts\":2182324208 }"
    );
}

#[test]
fn test_cli_malformed_frame_fails() {
    let segment = TagBuilder::new(4)
        .unwrap()
        .priv_frame("com.apple.streaming.transportStreamTimestamp", &[0, 0, 0])
        .unwrap()
        .build_segment()
        .unwrap();
    let path = write_temp("malformed.aac", &segment).unwrap();
    let output = run_probe(&["-filename", path.to_str().unwrap()]);
    remove_temp(&path);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Malformed frame"));
}

#[test]
fn test_cli_missing_file_and_usage() {
    let output = run_probe(&["-filename", "/nonexistent/pts-probe/none.aac"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("File not found"));

    let output = run_probe(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Missing required option -filename"));

    let output = run_probe(&["-h"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Usage: pts-probe"));
}
