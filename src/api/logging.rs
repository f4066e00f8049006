use chrono::Utc;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{IsTerminal, Write};

const DEFAULT_API_LOG_PATH: &str = "/tmp/dashchat-stream-debug.log";
const DEBUG_PAYLOAD_ENV: &str = "DASHCHAT_DEBUG_PAYLOAD";
const API_LOG_PATH_ENV: &str = "DASHCHAT_API_LOG_PATH";

pub fn debug_payload_enabled() -> bool {
    std::env::var(DEBUG_PAYLOAD_ENV)
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

pub fn emit_debug_payload(request_url: &str, payload: &Value) {
    let formatted_payload = serde_json::to_string_pretty(payload)
        .unwrap_or_else(|_| "<payload serialization error>".to_string());
    emit_log_message(&format!(
        "DASHCHAT DEBUG chat_request url={request_url}\npayload:\n{formatted_payload}\n"
    ));
}

/// One malformed frame is dropped, not fatal; record it so the bad payload
/// can be diagnosed later.
pub fn emit_frame_decode_error(payload: &str, parse_error: &serde_json::Error) {
    emit_log_message(&format!(
        "DASHCHAT ERROR frame_decode_failed error={parse_error}\npayload:\n{payload}\n"
    ));
}

pub fn emit_dispatch_failure(error: &anyhow::Error) {
    emit_log_message(&format!(
        "DASHCHAT WARN dispatch_failed falling back to local responder: {error:#}\n"
    ));
}

pub fn emit_stream_failure(request_id: u64, detail: &str) {
    emit_log_message(&format!(
        "DASHCHAT ERROR stream_failed request_id={request_id} detail={detail}\n"
    ));
}

fn emit_log_message(message: &str) {
    let stamped = format!("{} {message}", Utc::now().to_rfc3339());
    if let Some(path) = resolve_log_path() {
        if append_log_file(&path, &stamped).is_ok() {
            return;
        }
    }

    eprintln!("{stamped}");
}

fn resolve_log_path() -> Option<String> {
    std::env::var(API_LOG_PATH_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            if std::io::stderr().is_terminal() {
                Some(DEFAULT_API_LOG_PATH.to_string())
            } else {
                None
            }
        })
}

fn append_log_file(path: &str, message: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(message.as_bytes())
}
