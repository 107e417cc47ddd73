#![cfg(feature = "cli")]

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn loadlink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_loadlink"))
        .args(["--log-level", "off", "--format", "json"])
        .args(args)
        .env_remove("LOADLINK_PORT")
        .env_remove("LOADLINK_SOCKET")
        .output()
        .expect("loadlink should run")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("every stdout line should be json"))
        .collect()
}

#[test]
fn decode_recovers_from_garbage() {
    let output = loadlink(&["decode", "--data", "50><AD11150>xx<AD08100>"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["code"], "AD11");
    assert_eq!(lines[0]["value"], 15.0);
    assert_eq!(lines[1]["code"], "AD08");
    assert_eq!(lines[1]["raw"], 100);

    let summary = &lines[2];
    assert_eq!(summary["kind"], "summary");
    assert_eq!(summary["frames"], 2);
    assert_eq!(summary["discarded_bytes"], 5);
    assert_eq!(summary["recoveries"], 1);
    assert_eq!(summary["snapshot"]["cab_angle"], 15.0);
    assert_eq!(summary["snapshot"]["tare_weight"], 100);
}

#[test]
fn decode_is_independent_of_chunking() {
    let data = "<AD08100><AD1550><AD0212>junk<AD13-25>";
    let whole = loadlink(&["decode", "--data", data]);
    let bytewise = loadlink(&["decode", "--data", data, "--chunk-size", "1"]);

    let strip = |lines: Vec<serde_json::Value>| -> Vec<serde_json::Value> {
        lines
            .into_iter()
            .map(|mut line| {
                if let Some(obj) = line.as_object_mut() {
                    obj.remove("timestamp");
                }
                line
            })
            .collect()
    };
    assert_eq!(strip(json_lines(&whole)), strip(json_lines(&bytewise)));
}

#[test]
fn decode_drops_oversized_frame_regardless_of_chunking() {
    let data = format!("<AD08{}><AD1550>", "1".repeat(30));
    let whole = loadlink(&["decode", "--data", &data, "--max-pending", "16"]);
    let chunked = loadlink(&[
        "decode",
        "--data",
        &data,
        "--max-pending",
        "16",
        "--chunk-size",
        "10",
    ]);

    assert!(whole.status.success());
    assert_eq!(whole.status.code(), chunked.status.code());
    for output in [&whole, &chunked] {
        let lines = json_lines(output);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["code"], "AD15");
        assert_eq!(lines[1]["frames"], 1);
    }
}

#[test]
fn decode_reports_fault_event() {
    let output = loadlink(&["decode", "--data", "<AD001>"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines[0]["kind"], "event");
    assert_eq!(lines[0]["event"], "fault");
    assert_eq!(lines[1]["kind"], "reading");
}

#[test]
fn decode_rejected_frame_exits_60() {
    let output = loadlink(&["decode", "--data", "<AD08abc><AD1550>"]);
    assert_eq!(output.status.code(), Some(60));

    let lines = json_lines(&output);
    assert_eq!(lines[0]["code"], "AD15");
    assert_eq!(lines.last().unwrap()["rejected"], 1);
}

#[test]
fn decode_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_loadlink"))
        .args(["--log-level", "off", "--format", "pretty", "decode"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("decode should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"<AD1550>")
        .expect("stdin should accept input");
    let output = child.wait_with_output().expect("decode should finish");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("AD15 LoadWeight = 5 (raw 50)"));
    assert!(stdout.contains("frames=1 rejected=0"));
}

#[test]
fn codes_lists_both_tables() {
    let output = loadlink(&["codes"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    let codes = &lines[0];
    assert_eq!(codes["receive"].as_array().map(Vec::len), Some(17));
    assert_eq!(codes["send"].as_array().map(Vec::len), Some(19));
    assert_eq!(codes["receive"][15]["code"], "AD15");
    assert_eq!(codes["receive"][15]["scale"], 0.1);
}

#[test]
fn codes_looks_up_a_single_code() {
    let output = loadlink(&["codes", "ad11"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines[0]["receive"][0]["code"], "AD11");
    assert_eq!(lines[0]["receive"][0]["name"], "CabAngle");
    assert_eq!(lines[0]["send"].as_array().map(Vec::len), Some(0));

    let unknown = loadlink(&["codes", "ZZ99"]);
    assert_eq!(unknown.status.code(), Some(64));
}

#[test]
fn version_reports_package_version() {
    let output = loadlink(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("loadlink {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn send_unknown_command_exits_64() {
    let output = loadlink(&["send", "--socket", "/tmp/unused.sock", "XXXX"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn send_without_target_exits_64() {
    let output = loadlink(&["send", "ClearWholeLoad"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--port or --socket"));
}
