#![cfg(all(unix, feature = "cli"))]

use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/loadlink-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn loadlink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_loadlink"))
        .args(["--log-level", "off", "--format", "json"])
        .args(args)
        .output()
        .expect("loadlink should run")
}

/// Simulated controller that records whatever the CLI sends.
fn spawn_recorder(listener: UnixListener) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("cli should connect");
        let mut received = Vec::new();
        stream
            .read_to_end(&mut received)
            .expect("read should succeed");
        received
    })
}

/// Simulated controller that writes `wire`, then holds the link open until
/// `release` fires (or closes right away when `hold` is false).
fn spawn_talker(
    listener: UnixListener,
    wire: &'static [u8],
    hold: bool,
) -> (thread::JoinHandle<()>, mpsc::Sender<()>) {
    let (release, wait) = mpsc::channel::<()>();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("cli should connect");
        stream.write_all(wire).expect("write should succeed");
        if hold {
            let _ = wait.recv_timeout(Duration::from_secs(10));
        }
    });
    (handle, release)
}

#[test]
fn send_writes_one_frame() {
    let dir = unique_temp_dir("send");
    let sock = dir.join("ctl.sock");
    let listener = UnixListener::bind(&sock).expect("bind should succeed");
    let recorder = spawn_recorder(listener);

    let sock_arg = sock.to_string_lossy().into_owned();
    let output = loadlink(&["send", "--socket", &sock_arg, "SetTareWeight", "--data", "100"]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"code\":\"ASTW\""));
    assert_eq!(recorder.join().unwrap(), b"<ASTW100>");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_illegal_payload_transmits_nothing() {
    let dir = unique_temp_dir("send-bad");
    let sock = dir.join("ctl.sock");
    let listener = UnixListener::bind(&sock).expect("bind should succeed");
    let recorder = spawn_recorder(listener);

    let sock_arg = sock.to_string_lossy().into_owned();
    let output = loadlink(&["send", "--socket", &sock_arg, "ASTW", "--data", "1>0"]);

    assert_eq!(output.status.code(), Some(60));
    assert!(recorder.join().unwrap().is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn monitor_prints_requested_number_of_readings() {
    let dir = unique_temp_dir("monitor");
    let sock = dir.join("ctl.sock");
    let listener = UnixListener::bind(&sock).expect("bind should succeed");
    let (talker, release) = spawn_talker(listener, b"<AD08100>xx<AD1550><AD11150>", true);

    let sock_arg = sock.to_string_lossy().into_owned();
    let output = loadlink(&["monitor", "--socket", &sock_arg, "--count", "2"]);
    let _ = release.send(());
    talker.join().unwrap();

    assert!(output.status.success(), "{output:?}");
    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["code"], "AD08");
    assert_eq!(lines[1]["code"], "AD15");
    assert_eq!(lines[1]["value"], 5.0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn monitor_count_cuts_events_with_their_readings() {
    let dir = unique_temp_dir("monitor-fault");
    let sock = dir.join("ctl.sock");
    let listener = UnixListener::bind(&sock).expect("bind should succeed");
    let (talker, release) = spawn_talker(listener, b"<AD001><AD1550><AD011>", true);

    let sock_arg = sock.to_string_lossy().into_owned();
    let output = loadlink(&["monitor", "--socket", &sock_arg, "--count", "2"]);
    let _ = release.send(());
    talker.join().unwrap();

    assert!(output.status.success(), "{output:?}");
    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["kind"], "event");
    assert_eq!(lines[0]["code"], "SystemStatus");
    assert_eq!(lines[1]["kind"], "reading");
    assert_eq!(lines[1]["code"], "AD00");
    assert_eq!(lines[2]["code"], "AD15");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn monitor_exits_1_when_link_drops() {
    let dir = unique_temp_dir("monitor-drop");
    let sock = dir.join("ctl.sock");
    let listener = UnixListener::bind(&sock).expect("bind should succeed");
    let (talker, _release) = spawn_talker(listener, b"<AD1550>", false);

    let sock_arg = sock.to_string_lossy().into_owned();
    let output = loadlink(&["monitor", "--socket", &sock_arg, "--snapshot"]);
    talker.join().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"code\":\"AD15\""));
    assert!(stdout.contains("\"load_weight\":5.0"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("link lost"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn monitor_idle_timeout_exits_124() {
    let dir = unique_temp_dir("monitor-idle");
    let sock = dir.join("ctl.sock");
    let listener = UnixListener::bind(&sock).expect("bind should succeed");
    let (talker, release) = spawn_talker(listener, b"", true);

    let sock_arg = sock.to_string_lossy().into_owned();
    let output = loadlink(&["monitor", "--socket", &sock_arg, "--idle-timeout", "300ms"]);
    let _ = release.send(());
    talker.join().unwrap();

    assert_eq!(output.status.code(), Some(124));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn monitor_missing_socket_exits_3() {
    let dir = unique_temp_dir("monitor-missing");
    let sock = dir.join("absent.sock");

    let sock_arg = sock.to_string_lossy().into_owned();
    let output = loadlink(&["monitor", "--socket", &sock_arg]);

    assert_eq!(output.status.code(), Some(3));

    let _ = std::fs::remove_dir_all(&dir);
}
