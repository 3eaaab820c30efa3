//! Line formatting port

use crate::domain::models::{Fields, LogLevel};

/// Port trait turning one record into one output line.
///
/// Implementations are pure: no state is kept between calls and nothing is
/// written anywhere. The timestamp is captured inside `format`, which the
/// logger calls while holding its lock, so timestamps follow the order in
/// which lines reach the sinks.
///
/// The returned line includes its trailing newline.
///
/// # Examples
///
/// ```
/// use rotolog::{fields, Formatter, LogLevel, TextFormatter};
///
/// let line = TextFormatter.format(LogLevel::Info, "started", &fields! { "v" => "1" });
/// assert!(line.contains("INFO started v=1"));
/// assert!(line.ends_with('\n'));
/// ```
pub trait Formatter: Send + Sync {
    /// Render a record as a single newline-terminated line
    fn format(&self, level: LogLevel, message: &str, fields: &Fields) -> String;
}
