//! Log capture for asserting on experiment events in tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

static LOG_STORAGE: OnceLock<Arc<Mutex<LogStorage>>> = OnceLock::new();

#[derive(Default)]
pub struct LogStorage {
    entries: VecDeque<LogEntry>,
    max_entries: usize,
}

impl LogStorage {
    #[must_use]
    pub const fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }
}

/// A captured event: level, message and recorded fields.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub fn get_log_storage() -> Arc<Mutex<LogStorage>> {
    LOG_STORAGE
        .get_or_init(|| Arc::new(Mutex::new(LogStorage::new(1000))))
        .clone()
}

#[must_use]
pub fn get_logs() -> Vec<LogEntry> {
    get_log_storage()
        .lock()
        .map(|storage| storage.entries.iter().cloned().collect())
        .unwrap_or_default()
}

/// Entries at `level` whose message contains `message`.
#[must_use]
pub fn find_logs(level: Level, message: &str) -> Vec<LogEntry> {
    get_logs()
        .into_iter()
        .filter(|entry| entry.level == level && entry.message.contains(message))
        .collect()
}

struct TestLogLayer {
    storage: Arc<Mutex<LogStorage>>,
}

impl<S> tracing_subscriber::Layer<S> for TestLogLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        struct Visitor<'a> {
            message: &'a mut String,
            fields: &'a mut Vec<(String, String)>,
        }

        impl tracing::field::Visit for Visitor<'_> {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    *self.message = value.to_string();
                } else {
                    self.fields.push((field.name().to_string(), value.to_string()));
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                let value = format!("{value:?}");
                if field.name() == "message" {
                    *self.message = value;
                } else {
                    self.fields.push((field.name().to_string(), value));
                }
            }
        }

        let metadata = event.metadata();
        let mut message = String::new();
        let mut fields = Vec::new();
        event.record(&mut Visitor {
            message: &mut message,
            fields: &mut fields,
        });

        if let Ok(mut storage) = self.storage.lock() {
            storage.push(LogEntry {
                level: *metadata.level(),
                target: metadata.target().to_string(),
                message,
                fields,
            });
        }
    }
}

/// Install the capturing subscriber once per test binary.
///
/// Later calls keep the first filter; entries are shared across tests, so
/// assert with [`find_logs`] rather than on the full list.
pub fn init_test_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(filter).with(TestLogLayer {
        storage: get_log_storage(),
    });
    // Fails when already installed, which is fine.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
