use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// A single captured log entry.
pub struct LogEntry {
    pub level: log::Level,
    pub target: String,
    pub message: String,
    pub timestamp: Instant,
}

/// Ring buffer of captured log entries.
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_capacity: usize,
}

impl LogBuffer {
    pub fn new(max_capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_capacity.min(1024)),
            max_capacity,
        }
    }

    pub fn entries(&self) -> &VecDeque<LogEntry> {
        &self.entries
    }

    fn push(&mut self, entry: LogEntry) {
        if self.entries.len() >= self.max_capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Logger that forwards to `env_logger` and keeps a copy for the console panel.
struct LogCapture {
    inner: env_logger::Logger,
    buffer: Arc<Mutex<LogBuffer>>,
}

impl log::Log for LogCapture {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);

            let entry = LogEntry {
                level: record.level(),
                target: record.target().to_owned(),
                message: format!("{}", record.args()),
                timestamp: Instant::now(),
            };
            if let Ok(mut buf) = self.buffer.lock() {
                buf.push(entry);
            }
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the capturing logger and return its buffer.
///
/// If a logger is already installed the buffer stays empty.
pub fn install() -> Arc<Mutex<LogBuffer>> {
    let buffer = Arc::new(Mutex::new(LogBuffer::new(10_000)));

    let inner =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).build();
    let max_level = inner.filter();

    let logger = LogCapture {
        inner,
        buffer: Arc::clone(&buffer),
    };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(max_level);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            level: log::Level::Info,
            target: "editor".to_string(),
            message: message.to_string(),
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn oldest_entries_are_dropped() {
        let mut buffer = LogBuffer::new(2);
        buffer.push(entry("a"));
        buffer.push(entry("b"));
        buffer.push(entry("c"));
        let messages: Vec<_> = buffer.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["b", "c"]);
    }
}
