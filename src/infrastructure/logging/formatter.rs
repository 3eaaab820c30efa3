//! Text and JSON line formatters

use chrono::{Local, SecondsFormat};
use serde_json::{Map, Value};

use crate::domain::models::{Fields, LogFormat, LogLevel};
use crate::domain::ports::Formatter;

/// Timestamp layout of the text format
pub const TEXT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `[<timestamp>] <LEVEL> <message> k=v k2=v2`
///
/// Fields are rendered in lexicographic key order. String values are written
/// bare, everything else in its JSON form.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

/// One JSON object per line with `timestamp`, `level`, `message` and every
/// field at the top level.
///
/// A field named `timestamp`, `level` or `message` replaces the reserved
/// value. Callers relying on those keys get what they passed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

/// Formatter selected by configuration
pub fn formatter_for(format: LogFormat) -> Box<dyn Formatter> {
    match format {
        LogFormat::Text => Box::new(TextFormatter),
        LogFormat::Json => Box::new(JsonFormatter),
    }
}

impl Formatter for TextFormatter {
    fn format(&self, level: LogLevel, message: &str, fields: &Fields) -> String {
        let timestamp = Local::now().format(TEXT_TIMESTAMP_FORMAT);
        let mut line = format!("[{timestamp}] {level} {message}");

        if !fields.is_empty() {
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort_unstable();
            for key in keys {
                line.push(' ');
                line.push_str(key);
                line.push('=');
                match &fields[key.as_str()] {
                    Value::String(s) => line.push_str(s),
                    other => line.push_str(&other.to_string()),
                }
            }
        }

        line.push('\n');
        line
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, level: LogLevel, message: &str, fields: &Fields) -> String {
        let mut entry = Map::with_capacity(fields.len() + 3);
        entry.insert(
            "timestamp".to_string(),
            Value::String(Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)),
        );
        entry.insert("level".to_string(), Value::String(level.to_string()));
        entry.insert("message".to_string(), Value::String(message.to_string()));
        for (key, value) in fields {
            entry.insert(key.clone(), value.clone());
        }

        let mut line = Value::Object(entry).to_string();
        line.push('\n');
        line
    }
}
