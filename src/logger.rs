//! Structured, context-scoped logging for page objects, suites and the API client.
//!
//! A [`Logger`] is an ordinary value: whoever builds a page object or client
//! hands it one. Every accepted entry is kept in memory, echoed through
//! `tracing`, and optionally copied into an [`Annotations`] report.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the process-wide `tracing` subscriber.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("goodbudget_checks=debug,info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_test_writer();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl LogEntry {
    fn render(&self) -> String {
        match &self.metadata {
            Some(metadata) => format!(
                "{} [{}] {} {}",
                self.level, self.context, self.message, metadata
            ),
            None => format!("{} [{}] {}", self.level, self.context, self.message),
        }
    }
}

/// One line of a test report, typed by lowercase level name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub kind: String,
    pub description: String,
}

/// Shared report that several loggers can write into
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    inner: Arc<Mutex<Vec<Annotation>>>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best effort: a poisoned lock drops the annotation.
    fn push(&self, annotation: Annotation) {
        if let Ok(mut list) = self.inner.lock() {
            list.push(annotation);
        }
    }

    pub fn snapshot(&self) -> Vec<Annotation> {
        self.inner
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct Logger {
    context: String,
    level: LogLevel,
    console: bool,
    annotations: Option<Annotations>,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger {
    pub fn new(context: impl Into<String>, level: LogLevel) -> Self {
        Self {
            context: context.into(),
            level,
            console: true,
            annotations: None,
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn page(name: &str) -> Self {
        Self::new(format!("Page.{}", name), LogLevel::Info)
    }

    pub fn test(name: &str) -> Self {
        Self::new(format!("Test.{}", name), LogLevel::Info)
    }

    pub fn util(name: &str) -> Self {
        Self::new(format!("Util.{}", name), LogLevel::Info)
    }

    /// New logger scoped under this one, with its own entry list.
    pub fn child(&self, name: &str) -> Self {
        Self {
            context: format!("{}.{}", self.context, name),
            level: self.level,
            console: self.console,
            annotations: self.annotations.clone(),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = context.into();
    }

    pub fn set_console_logging(&mut self, enabled: bool) {
        self.console = enabled;
    }

    pub fn set_annotations(&mut self, annotations: Option<Annotations>) {
        self.annotations = annotations;
    }

    pub fn debug(&self, message: impl Into<String>, metadata: Option<Value>) {
        self.log(LogLevel::Debug, message.into(), metadata);
    }

    pub fn info(&self, message: impl Into<String>, metadata: Option<Value>) {
        self.log(LogLevel::Info, message.into(), metadata);
    }

    pub fn warn(&self, message: impl Into<String>, metadata: Option<Value>) {
        self.log(LogLevel::Warn, message.into(), metadata);
    }

    pub fn error(&self, message: impl Into<String>, metadata: Option<Value>) {
        self.log(LogLevel::Error, message.into(), metadata);
    }

    pub fn fatal(&self, message: impl Into<String>, metadata: Option<Value>) {
        self.log(LogLevel::Fatal, message.into(), metadata);
    }

    pub fn action_start(&self, action: &str, details: Option<Value>) {
        self.info(format!("🚀 Starting: {}", action), details);
    }

    pub fn action_success(&self, action: &str, details: Option<Value>) {
        self.info(format!("✅ Success: {}", action), details);
    }

    pub fn action_failure(&self, action: &str, error: &dyn fmt::Display, details: Option<Value>) {
        self.error(format!("❌ Failed: {} - {}", action, error), details);
    }

    pub fn page_navigation(&self, url: &str, page_name: Option<&str>) {
        self.info(
            format!("🔗 Navigating to {}: {}", page_name.unwrap_or("page"), url),
            None,
        );
    }

    pub fn element_interaction(&self, action: &str, element: &str, value: Option<&str>) {
        let value_text = value
            .filter(|v| !v.is_empty())
            .map(|v| format!(" with value: {}", v))
            .unwrap_or_default();
        self.info(
            format!("🎯 {} on element: {}{}", action, element, value_text),
            None,
        );
    }

    pub fn assertion(
        &self,
        description: &str,
        passed: bool,
        expected: Option<&str>,
        actual: Option<&str>,
    ) {
        if passed {
            self.info(format!("✅ Assertion passed: {}", description), None);
        } else {
            self.error(
                format!("❌ Assertion failed: {}", description),
                Some(serde_json::json!({ "expected": expected, "actual": actual })),
            );
        }
    }

    pub fn step(&self, step_name: &str, details: Option<Value>) {
        self.info(format!("📋 Step: {}", step_name), details);
    }

    fn log(&self, level: LogLevel, message: String, metadata: Option<Value>) {
        if level < self.level {
            return;
        }

        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message,
            context: self.context.clone(),
            metadata,
        };

        if self.console {
            emit_tracing(&entry);
        }

        if let Some(annotations) = &self.annotations {
            annotations.push(Annotation {
                kind: entry.level.as_str().to_lowercase(),
                description: entry.render(),
            });
        }

        self.lock_entries().push(entry);
    }

    fn lock_entries(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock_entries().clone()
    }

    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.lock_entries()
            .iter()
            .filter(|entry| entry.level == level)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&*self.lock_entries())
    }

    /// Dump the collected entries to `path` as a JSON array.
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let json = self.export_json().map_err(std::io::Error::other)?;
        match std::fs::write(path, json) {
            Ok(()) => {
                self.info(format!("Logs written to: {}", path.display()), None);
                Ok(())
            }
            Err(e) => {
                self.error(format!("Failed to write logs: {}", e), None);
                Err(e)
            }
        }
    }
}

fn emit_tracing(entry: &LogEntry) {
    let context = entry.context.as_str();
    let metadata = entry
        .metadata
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_default();

    match entry.level {
        LogLevel::Debug => tracing::debug!(context = %context, metadata = %metadata, "{}", entry.message),
        LogLevel::Info => tracing::info!(context = %context, metadata = %metadata, "{}", entry.message),
        LogLevel::Warn => tracing::warn!(context = %context, metadata = %metadata, "{}", entry.message),
        LogLevel::Error | LogLevel::Fatal => tracing::error!(
            context = %context,
            metadata = %metadata,
            severity = entry.level.as_str(),
            "{}",
            entry.message
        ),
    }
}
