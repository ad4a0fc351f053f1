use crate::utils::time::current_datetime_rfc9557;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// # Logrecord
///
/// A single log entry as written by `LoggerLocal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logrecord {
    /// The severity level (0 Silly, 1 Trace, 2 Debug, 3 Info, 4 Warn, 5 Error, 6 Fatal).
    pub loglevel: i64,
    /// Details about the message content.
    pub message: Message,
    /// Information about the application generating the log.
    pub app: App,
    /// Flexible JSON value for arbitrary tags or additional metadata.
    pub tags: Value,
    /// RFC 9557 formatted timestamp string.
    pub rfc9557: String,
}

impl Default for Logrecord {
    /// Creates an empty record stamped with the current UTC time.
    fn default() -> Self {
        Self {
            loglevel: 0,
            message: Message::default(),
            app: App::default(),
            tags: serde_json::json!([]),
            rfc9557: current_datetime_rfc9557(),
        }
    }
}

impl Logrecord {
    /// True when the record carries extra structured data.
    pub fn has_tags(&self) -> bool {
        self.tags != serde_json::json!([]) && !self.tags.is_null()
    }
}

/// # Message
///
/// Represents the textual content of a log entry, including its language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The language of the message (e.g., "en" for English).
    pub lang: String,
    /// The actual text content of the message.
    pub text: String,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            text: String::new(),
            lang: "en".to_string(),
        }
    }
}

/// # App
///
/// Contains information about the application that generated the log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    /// The process ID (PID) of the application.
    pub pid: i64,
    /// The name of the application.
    pub name: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            pid: std::process::id() as i64,
            name: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_has_no_tags() {
        let record = Logrecord::default();
        assert!(!record.has_tags());
        assert_eq!(record.message.lang, "en");
        assert_eq!(record.app.pid, std::process::id() as i64);
    }

    #[test]
    fn record_with_object_tags_reports_tags() {
        let mut record = Logrecord::default();
        record.tags = serde_json::json!({"root": "CC"});
        assert!(record.has_tags());
    }
}
