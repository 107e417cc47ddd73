use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use loadlink_frame::{DataRule, ReceiveCode, Reading, SendCommand};
use loadlink_telemetry::{StatusEvent, TelemetrySnapshot};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReadingOutput<'a> {
    kind: &'static str,
    code: &'a str,
    name: &'a str,
    raw: i32,
    value: f64,
    timestamp: String,
}

pub fn print_reading(reading: &Reading, format: OutputFormat) {
    let code = reading.code;
    match format {
        OutputFormat::Json => print_json(&ReadingOutput {
            kind: "reading",
            code: code.code(),
            name: code.name(),
            raw: reading.value.raw,
            value: reading.value.value(),
            timestamp: now_unix_seconds(),
        }),
        OutputFormat::Table => {
            let mut table = table(vec!["CODE", "NAME", "RAW", "VALUE"]);
            table.add_row(vec![
                code.code().to_string(),
                code.name().to_string(),
                reading.value.raw.to_string(),
                reading.value.value().to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} = {} (raw {})",
                code.code(),
                code.name(),
                reading.value.value(),
                reading.value.raw
            );
        }
        OutputFormat::Raw => {
            print_raw(format!("<{}{}>\n", code.code(), reading.value.raw).as_bytes());
        }
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    kind: &'static str,
    #[serde(flatten)]
    event: &'a StatusEvent,
    timestamp: String,
}

pub fn print_event(event: &StatusEvent, format: OutputFormat) {
    match (format, event) {
        (OutputFormat::Json, _) => print_json(&EventOutput {
            kind: "event",
            event,
            timestamp: now_unix_seconds(),
        }),
        (_, StatusEvent::Fault { code, flags }) => {
            let bits: Vec<String> = flags.set_bits().map(|b| b.to_string()).collect();
            println!(
                "FAULT {} {} flags=0x{:02x} bits=[{}]",
                code.code(),
                code.name(),
                flags.bits(),
                bits.join(",")
            );
        }
    }
}

pub fn print_snapshot(snapshot: &TelemetrySnapshot, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(snapshot),
        OutputFormat::Table => {
            let mut table = table(vec!["CODE", "FIELD", "VALUE"]);
            for (code, value) in snapshot_fields(snapshot) {
                table.add_row(vec![
                    code.code().to_string(),
                    code.name().to_string(),
                    value.to_string(),
                ]);
            }
            table.add_row(vec![
                "-".to_string(),
                "SystemErrors".to_string(),
                format!("{:?}", snapshot.system_errors.as_array()),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for (code, value) in snapshot_fields(snapshot) {
                println!("{}={}", code.name(), value);
            }
            println!("SystemErrors={:?}", snapshot.system_errors.as_array());
        }
    }
}

fn snapshot_fields(
    snapshot: &TelemetrySnapshot,
) -> impl Iterator<Item = (ReceiveCode, f64)> + '_ {
    ReceiveCode::ALL
        .into_iter()
        .filter_map(|code| snapshot.field(code).map(|value| (code, value)))
}

#[derive(Serialize)]
struct ReceiveCodeRow {
    code: &'static str,
    name: &'static str,
    scale: f64,
}

#[derive(Serialize)]
struct SendCommandRow {
    code: Option<&'static str>,
    name: &'static str,
    data: &'static str,
}

#[derive(Serialize)]
struct CodesOutput {
    receive: Vec<ReceiveCodeRow>,
    send: Vec<SendCommandRow>,
}

pub fn print_codes(receive: &[ReceiveCode], send: &[SendCommand], format: OutputFormat) {
    let out = CodesOutput {
        receive: receive
            .iter()
            .map(|code| ReceiveCodeRow {
                code: code.code(),
                name: code.name(),
                scale: code.scale().factor(),
            })
            .collect(),
        send: send
            .iter()
            .map(|cmd| SendCommandRow {
                code: cmd.code(),
                name: cmd.name(),
                data: match cmd.data_rule() {
                    DataRule::Optional => "optional",
                    DataRule::Required => "required",
                },
            })
            .collect(),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut receive = table(vec!["RECEIVE", "NAME", "SCALE"]);
            for row in &out.receive {
                receive.add_row(vec![
                    row.code.to_string(),
                    row.name.to_string(),
                    row.scale.to_string(),
                ]);
            }
            let mut send = table(vec!["SEND", "NAME", "DATA"]);
            for row in &out.send {
                send.add_row(vec![
                    row.code.unwrap_or("-").to_string(),
                    row.name.to_string(),
                    row.data.to_string(),
                ]);
            }
            println!("{receive}");
            println!("{send}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in &out.receive {
                println!("recv {} {} x{}", row.code, row.name, row.scale);
            }
            for row in &out.send {
                println!(
                    "send {} {} data={}",
                    row.code.unwrap_or("----"),
                    row.name,
                    row.data
                );
            }
        }
    }
}

#[derive(Serialize)]
struct SentOutput<'a> {
    kind: &'static str,
    command: &'a str,
    code: &'a str,
    data: &'a str,
    target: &'a str,
}

pub fn print_sent(command: SendCommand, data: &str, target: &str, format: OutputFormat) {
    let code = command.code().unwrap_or("");
    match format {
        OutputFormat::Json => print_json(&SentOutput {
            kind: "sent",
            command: command.name(),
            code,
            data,
            target,
        }),
        OutputFormat::Table => {
            let mut table = table(vec!["COMMAND", "CODE", "DATA", "TARGET"]);
            table.add_row(vec![command.name(), code, data, target]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("sent {} ({code}) data={data:?} to {target}", command.name());
        }
        OutputFormat::Raw => print_raw(format!("<{code}{data}>\n").as_bytes()),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
