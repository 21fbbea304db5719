//! Integration tests for JSON probe reports
//!
//! Only built with the "diagnostics" feature.

use pts_probe::ProbeReport;
use std::process::Command;
use util::{remove_temp, temp_path, write_temp, TagBuilder};

#[test]
fn test_cli_writes_report() {
    let segment = TagBuilder::new(4)
        .unwrap()
        .text_frame("TIT2", "segment 7")
        .unwrap()
        .priv_frame("com.example.ad-insertion.marker.identifier", &[9; 12])
        .unwrap()
        .apple_timestamp([0, 0, 0, 1, 0, 0, 0, 1])
        .unwrap()
        .build_segment()
        .unwrap();
    let input = write_temp("report.aac", &segment).unwrap();
    let report_path = temp_path("report.json");

    let output = Command::new(env!("CARGO_BIN_EXE_pts-probe"))
        .args(["-filename", input.to_str().unwrap(), "-report", report_path.to_str().unwrap()])
        .output()
        .expect("Failed to run pts-probe");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "{ \"start_pts\":2147483650 }"
    );

    let report = ProbeReport::load_from_file(&report_path).unwrap();
    remove_temp(&input);
    remove_temp(&report_path);

    assert_eq!(report.format, "ID3v2.4");
    assert_eq!(report.frame_ids, vec!["TIT2", "PRIV", "PRIV"]);
    assert_eq!(report.priv_frames.len(), 2);
    assert_eq!(report.priv_frames[0].owner, "com.example.ad-insertion.marker.identifier");
    let timestamp = report.timestamp.expect("timestamp recorded");
    assert_eq!(timestamp.priv_index, 1);
    assert_eq!(timestamp.bytes, vec![0, 0, 0, 1, 0, 0, 0, 1]);
    assert_eq!(timestamp.high_bit, 1);
    assert_eq!(timestamp.start_pts, 2_147_483_650);
}
