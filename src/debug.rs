//! Debug trace of dashboard tool calls.
//!
//! Every entry goes through `tracing` at debug level. When debug mode is on,
//! entries are also appended to a timestamped trace file in the temp
//! directory.

use chrono::Local;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Trace file entries are cut at this many characters.
const TRACE_VALUE_LIMIT: usize = 1000;

struct TraceFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl TraceFile {
    fn create() -> std::io::Result<Self> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = std::env::temp_dir().join(format!("hotel_analytics_mcp_trace_{}.log", stamp));
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    fn append(&self, entry: &str) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "[{}] {}", stamp, entry).and_then(|_| file.flush());
        }
    }
}

/// Tool call tracer. Without a trace file it only emits `tracing` events.
pub struct DebugLogger {
    trace: Option<TraceFile>,
}

impl DebugLogger {
    pub fn new(enabled: bool) -> Self {
        let trace = enabled
            .then(TraceFile::create)
            .and_then(|created| match created {
                Ok(trace) => Some(trace),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to create trace file");
                    None
                }
            });
        Self { trace }
    }

    pub fn trace_path(&self) -> Option<&Path> {
        self.trace.as_ref().map(|trace| trace.path.as_path())
    }

    pub fn log(&self, message: &str) {
        tracing::debug!("{}", message);
        if let Some(trace) = &self.trace {
            trace.append(message);
        }
    }

    pub fn log_tool_call(&self, tool_name: &str, params: &serde_json::Value) {
        self.log(&format!(
            "TOOL CALL: {} | params: {}",
            tool_name,
            truncate_json(params, TRACE_VALUE_LIMIT)
        ));
    }

    pub fn log_tool_result(&self, tool_name: &str, result: &serde_json::Value) {
        self.log(&format!(
            "TOOL RESULT: {} | result: {}",
            tool_name,
            truncate_json(result, TRACE_VALUE_LIMIT)
        ));
    }

    pub fn log_error(&self, context: &str, error: &str) {
        self.log(&format!("ERROR [{}]: {}", context, error));
    }
}

impl std::fmt::Debug for DebugLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugLogger")
            .field("trace_path", &self.trace_path())
            .finish()
    }
}

fn truncate_json(value: &serde_json::Value, max_chars: usize) -> String {
    let s = value.to_string();
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...(truncated)", &s[..idx]),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_disabled_logger_has_no_trace_file() {
        let logger = DebugLogger::new(false);
        assert!(logger.trace_path().is_none());
        logger.log_tool_call("executive_dashboard", &json!({"from": "2024-01-01"}));
    }

    #[test]
    fn test_enabled_logger_writes_trace_lines() {
        let logger = DebugLogger::new(true);
        let path = logger.trace_path().map(Path::to_path_buf).expect("trace file");

        logger.log_tool_call("revenue_dashboard", &json!({"hotel_id": "5"}));
        logger.log_error("revenue_dashboard", "boom");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("TOOL CALL: revenue_dashboard"));
        assert!(content.contains("ERROR [revenue_dashboard]: boom"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_truncate_json() {
        let value = json!({"estado": "Cancelada"});
        assert_eq!(truncate_json(&value, 1000), value.to_string());
        assert!(truncate_json(&value, 5).ends_with("...(truncated)"));
    }
}
