use super::logrecord::Logrecord;
use chrono::Local;
use colored::*;
use glob::glob;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Every level from Silly (0) to Fatal (6).
pub const ALL_LEVELS: [i64; 7] = [6, 5, 4, 3, 2, 1, 0];

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
/// # Logger Local Options
///
/// Configuration options for the `LoggerLocal` instance, controlling where and how
/// log messages are output.
pub struct LoggerLocalOptions {
    /// A list of log levels that should be printed to the TTY (console).
    pub use_tty: Option<Vec<i64>>,
    /// A list of log levels that should be written to a log file.
    pub use_file: Option<Vec<i64>>,
    /// The directory where log files should be stored. If `None`, defaults to `./logs`.
    pub log_dir: Option<PathBuf>,
}

impl LoggerLocalOptions {
    /// Keeps only levels at or above `min_level` for both outputs.
    pub fn with_min_level(mut self, min_level: i64) -> Self {
        let keep = |levels: Vec<i64>| levels.into_iter().filter(|l| *l >= min_level).collect();
        self.use_tty = self.use_tty.map(keep);
        self.use_file = self.use_file.map(keep);
        self
    }
}

/// Maps a level name as found in configuration to its numeric value.
pub fn level_from_name(name: &str) -> i64 {
    match name.to_lowercase().as_str() {
        "silly" => 0,
        "trace" => 1,
        "debug" => 2,
        "warn" => 4,
        "error" => 5,
        "fatal" => 6,
        _ => 3,
    }
}

pub struct LoggerLocal {
    /// The name of the application associated with this logger instance.
    app_name: String,
    /// Configuration options determining logging behavior.
    options: LoggerLocalOptions,
    /// Serializes appends so concurrent requests do not interleave lines.
    file_mutex: Arc<Mutex<()>>,
    /// The path to the currently active log file, if file logging is enabled.
    current_log_file: Option<PathBuf>,
}

impl LoggerLocal {
    /// Keeps only the newest `{app_name}-*.log` file in `log_dir`.
    fn rotate_logs(app_name: &str, log_dir: &Path) {
        let pattern = format!("{}/{}-*.log", log_dir.display(), app_name);
        let Ok(entries) = glob(&pattern) else {
            eprintln!("Invalid glob pattern for log rotation: {}", pattern);
            return;
        };

        let mut log_files: Vec<PathBuf> = entries.filter_map(Result::ok).collect();

        // Filenames carry a sortable timestamp, newest first.
        log_files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

        for old_file in log_files.iter().skip(1) {
            if let Err(e) = std::fs::remove_file(old_file) {
                eprintln!("Error deleting old log file {}: {}", old_file.display(), e);
            }
        }
    }

    /// Creates a new `LoggerLocal` instance.
    ///
    /// If file logging is enabled, it ensures the log directory exists,
    /// rotates old logs, and sets up the current log file path.
    ///
    /// # Arguments
    /// * `app_name` - The name of the application using this logger.
    /// * `options` - Optional `LoggerLocalOptions` to customize logging behavior.
    ///   If `None`, TTY and file logging are enabled for all levels.
    pub fn new(app_name: String, options: Option<LoggerLocalOptions>) -> Self {
        let default_options = LoggerLocalOptions {
            use_tty: Some(ALL_LEVELS.to_vec()),
            use_file: Some(ALL_LEVELS.to_vec()),
            log_dir: None,
        };
        let opts = options.unwrap_or(default_options);

        let mut logger = Self {
            app_name: app_name.clone(),
            options: opts,
            file_mutex: Arc::new(Mutex::new(())),
            current_log_file: None,
        };

        if logger.options.use_file.is_some() {
            let log_base_dir = logger
                .options
                .log_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("logs"));

            if let Err(e) = std::fs::create_dir_all(&log_base_dir) {
                eprintln!("Error creating log directory {}: {}", log_base_dir.display(), e);
            }

            LoggerLocal::rotate_logs(&app_name, &log_base_dir);

            let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
            let current_log_filename = format!("{}-{}.log", app_name, timestamp);
            logger.current_log_file = Some(log_base_dir.join(current_log_filename));
        }

        logger
    }

    /// A logger with every output disabled.
    pub fn silent(app_name: &str) -> Self {
        Self::new(app_name.to_string(), Some(LoggerLocalOptions::default()))
    }

    /// The file currently being appended to, if any.
    pub fn current_log_file(&self) -> Option<&Path> {
        self.current_log_file.as_deref()
    }

    /// Asynchronously logs a message with a specified level, handling TTY output
    /// and file writing based on the logger's configuration.
    ///
    /// # Arguments
    /// * `log_level` - The numeric log level (e.g., 0 for Silly, 6 for Fatal).
    /// * `log_message` - The main message string to be logged.
    /// * `log_extras` - An `Option<Value>` for additional structured data to include in the log.
    pub async fn log(&self, log_level: i64, log_message: &str, log_extras: Option<Value>) {
        let mut record = Logrecord::default();
        record.app.name = self.app_name.clone();
        record.loglevel = log_level;
        record.message.text = log_message.to_string();
        if let Some(extras) = log_extras {
            record.tags = extras;
        }

        if let Some(tty_levels) = &self.options.use_tty {
            if tty_levels.contains(&log_level) {
                self.print_tty(&record);
            }
        }

        if let Some(file_levels) = &self.options.use_file {
            if file_levels.contains(&log_level) {
                self.append_file(&record).await;
            }
        }
    }

    fn print_tty(&self, record: &Logrecord) {
        let ts = record.rfc9557.as_str().truecolor(128, 128, 128);
        let app_name_colored = format!("[{}]", self.app_name).truecolor(128, 128, 128);
        let text = record.message.text.as_str();

        let colored_message = match record.loglevel {
            6 => text.bright_white().on_bright_red(), // Fatal
            5 => text.bright_red(),                   // Error
            4 => text.bright_yellow(),                // Warn
            3 => text.bright_green(),                 // Info
            2 => text.bright_white(),                 // Debug
            1 => text.bright_cyan(),                  // Trace
            _ => text.blue(),                         // Silly
        };

        println!("{}{}\n{}", ts, app_name_colored, colored_message);
        if record.has_tags() {
            if let Ok(tags_str) = serde_json::to_string(&record.tags) {
                println!("{}{}{}", ts, app_name_colored, tags_str.truecolor(128, 128, 128));
            }
        }
    }

    async fn append_file(&self, record: &Logrecord) {
        let Some(log_file_path) = &self.current_log_file else {
            return;
        };

        let mut line = format!("{} [{}] {}\n", record.rfc9557, self.app_name, record.message.text);
        if record.has_tags() {
            if let Ok(tags_str) = serde_json::to_string(&record.tags) {
                line.push_str(&tags_str);
                line.push('\n');
            }
        }

        let _guard = self.file_mutex.lock().await;
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(e) = written {
            eprintln!("Error writing log file {}: {}", log_file_path.display(), e);
        }
    }

    /// Logs a message at the "Silly" (level 0) log level.
    pub async fn silly(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(0, log_message, log_extras).await;
    }

    /// Logs a message at the "Trace" (level 1) log level.
    pub async fn trace(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(1, log_message, log_extras).await;
    }

    /// Logs a message at the "Debug" (level 2) log level.
    pub async fn debug(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(2, log_message, log_extras).await;
    }

    /// Logs a message at the "Info" (level 3) log level.
    pub async fn info(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(3, log_message, log_extras).await;
    }

    /// Logs a message at the "Warn" (level 4) log level.
    pub async fn warn(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(4, log_message, log_extras).await;
    }

    /// Logs a message at the "Error" (level 5) log level.
    pub async fn error(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(5, log_message, log_extras).await;
    }

    /// Logs a message at the "Fatal" (level 6) log level.
    pub async fn fatal(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(6, log_message, log_extras).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn file_only(dir: &Path) -> LoggerLocalOptions {
        LoggerLocalOptions {
            use_tty: None,
            use_file: Some(ALL_LEVELS.to_vec()),
            log_dir: Some(dir.to_path_buf()),
        }
    }

    #[tokio::test]
    async fn test_loggerlocal_file_logging() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let logger = LoggerLocal::new("test_app".to_string(), Some(file_only(temp_dir.path())));

        logger.info("This is an info message", None).await;
        logger.warn("This is a warning message", Some(serde_json::json!({"code": 101}))).await;
        logger.error("This is an error message", None).await;

        let path = logger.current_log_file().expect("file logging enabled");
        let contents = fs::read_to_string(path).expect("Failed to read log file contents");

        assert!(contents.contains("This is an info message"));
        assert!(contents.contains("This is a warning message"));
        assert!(contents.contains(r#""code":101"#));
        assert!(contents.contains("[test_app]"));
    }

    #[tokio::test]
    async fn test_min_level_filters_file_output() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let options = file_only(temp_dir.path()).with_min_level(level_from_name("warn"));
        let logger = LoggerLocal::new("filtered".to_string(), Some(options));

        logger.debug("hidden debug", None).await;
        logger.warn("visible warn", None).await;

        let contents = fs::read_to_string(logger.current_log_file().unwrap()).unwrap();
        assert!(!contents.contains("hidden debug"));
        assert!(contents.contains("visible warn"));
    }

    #[test]
    fn test_rotation_keeps_newest_file() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let old = temp_dir.path().join("rot-20240101_000000.log");
        let new = temp_dir.path().join("rot-20250101_000000.log");
        fs::write(&old, "old").unwrap();
        fs::write(&new, "new").unwrap();

        LoggerLocal::rotate_logs("rot", temp_dir.path());

        assert!(!old.exists());
        assert!(new.exists());
    }

    #[tokio::test]
    async fn test_silent_logger_writes_nothing() {
        let logger = LoggerLocal::silent("quiet");
        assert!(logger.current_log_file().is_none());
        logger.fatal("nobody hears this", None).await;
    }

    #[test]
    fn test_level_from_name() {
        assert_eq!(level_from_name("ERROR"), 5);
        assert_eq!(level_from_name("info"), 3);
        assert_eq!(level_from_name("unknown"), 3);
    }
}
