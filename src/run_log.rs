use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Where a data-quality warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSource {
    Roster,
    Absences,
    Decisions,
    Batch,
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSource::Roster => write!(f, "roster"),
            LogSource::Absences => write!(f, "absences"),
            LogSource::Decisions => write!(f, "decisions"),
            LogSource::Batch => write!(f, "batch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub source: LogSource,
    /// 1-based line in the source file, when the entry refers to one.
    pub line: Option<usize>,
    pub employee_id: Option<String>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.source)?;
        if let Some(line) = self.line {
            write!(f, " line {}", line)?;
        }
        if let Some(id) = &self.employee_id {
            write!(f, " employee {}", id)?;
        }
        write!(f, "] {}", self.message)
    }
}

/// Data-quality warnings collected over a single processing run.
#[derive(Debug, Default)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn_line(&mut self, source: LogSource, line: usize, message: impl Into<String>) {
        self.push(LogEntry {
            source,
            line: Some(line),
            employee_id: None,
            message: message.into(),
        });
    }

    pub fn warn_employee(&mut self, source: LogSource, employee_id: &str, message: impl Into<String>) {
        self.push(LogEntry {
            source,
            line: None,
            employee_id: Some(employee_id.to_string()),
            message: message.into(),
        });
    }

    fn push(&mut self, entry: LogEntry) {
        warn!("{}", entry);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_from(&self, source: LogSource) -> usize {
        self.entries.iter().filter(|e| e.source == source).count()
    }
}
