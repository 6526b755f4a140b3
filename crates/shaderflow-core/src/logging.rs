//! Logging configuration
//!
//! Serializable settings for the host's tracing subscriber, plus the file
//! housekeeping the host runs before installing it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// File name prefix of date-stamped log files
const LOG_FILE_PREFIX: &str = "shaderflow_";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level (`trace`, `debug`, `info`, `warn`, `error`)
    pub level: String,
    /// Directory for log files
    pub log_path: PathBuf,
    /// Number of log files to keep
    pub max_files: usize,
    /// Log to stderr
    pub console_output: bool,
    /// Log to a date-stamped file under `log_path`
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_path: PathBuf::from("logs"),
            max_files: 5,
            console_output: true,
            file_output: false,
        }
    }
}

impl LogConfig {
    /// Parse `level`, falling back to INFO
    pub fn parse_level(&self) -> LevelFilter {
        self.level.trim().parse().unwrap_or(LevelFilter::INFO)
    }

    /// Create the log directory if file output is enabled
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        if self.file_output {
            fs::create_dir_all(&self.log_path)?;
        }
        Ok(())
    }

    /// Path of today's log file
    pub fn current_log_path(&self) -> PathBuf {
        let date = chrono::Local::now().format("%Y-%m-%d");
        self.log_path
            .join(format!("{}{}.log", LOG_FILE_PREFIX, date))
    }

    /// Delete the oldest log files so at most `max_files` remain.
    ///
    /// Only files named like ours are touched. Returns how many were removed.
    pub fn cleanup_old_logs(&self) -> io::Result<usize> {
        if !self.log_path.is_dir() {
            return Ok(0);
        }

        let mut logs: Vec<PathBuf> = fs::read_dir(&self.log_path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX) && n.ends_with(".log"))
            })
            .collect();

        if logs.len() <= self.max_files {
            return Ok(0);
        }

        // Date-stamped names sort chronologically
        logs.sort();
        let excess = logs.len() - self.max_files;
        for path in &logs[..excess] {
            fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.max_files, 5);
        assert!(config.console_output);
        assert!(!config.file_output);
    }

    #[test]
    fn test_parse_level() {
        let mut config = LogConfig::default();
        config.level = "debug".to_string();
        assert_eq!(config.parse_level(), LevelFilter::DEBUG);
        config.level = "nonsense".to_string();
        assert_eq!(config.parse_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_current_log_path_is_date_stamped() {
        let config = LogConfig::default();
        let path = config.current_log_path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("shaderflow_"));
        assert!(name.ends_with(".log"));
        assert!(path.starts_with("logs"));
    }

    #[test]
    fn test_ensure_log_directory() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig {
            log_path: dir.path().join("nested/logs"),
            file_output: true,
            ..Default::default()
        };
        config.ensure_log_directory().unwrap();
        assert!(config.log_path.is_dir());
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = TempDir::new().unwrap();
        for day in 1..=4 {
            fs::write(dir.path().join(format!("shaderflow_2024-01-0{}.log", day)), b"").unwrap();
        }
        fs::write(dir.path().join("unrelated.txt"), b"").unwrap();

        let config = LogConfig {
            log_path: dir.path().to_path_buf(),
            max_files: 2,
            ..Default::default()
        };
        assert_eq!(config.cleanup_old_logs().unwrap(), 2);

        assert!(!dir.path().join("shaderflow_2024-01-01.log").exists());
        assert!(!dir.path().join("shaderflow_2024-01-02.log").exists());
        assert!(dir.path().join("shaderflow_2024-01-03.log").exists());
        assert!(dir.path().join("shaderflow_2024-01-04.log").exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[test]
    fn test_cleanup_missing_directory() {
        let config = LogConfig {
            log_path: PathBuf::from("/nonexistent/shaderflow/logs"),
            ..Default::default()
        };
        assert_eq!(config.cleanup_old_logs().unwrap(), 0);
    }

    #[test]
    fn test_serialization() {
        let config = LogConfig::default();
        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let deserialized: LogConfig = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(config, deserialized);
    }
}
