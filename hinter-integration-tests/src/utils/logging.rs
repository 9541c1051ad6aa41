//! Testing utilities to work with logs.
//!
//! Actix runs request handlers on its own worker threads, so a thread-local
//! subscriber in the test would never see them. Instead one process-wide JSON
//! subscriber is installed, and every line it writes is copied to each live
//! [`LogWatcher`]. Tests running in parallel therefore see each other's logs,
//! and should look for values unique to themselves.

use hinter_settings::LoggingSettings;
use lazy_static::lazy_static;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::{
    collections::HashMap,
    io::Write,
    ops::Deref,
    sync::{Arc, Mutex, Once, Weak},
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// The buffer behind one [`LogWatcher`].
type SharedBuffer = Arc<Mutex<Vec<u8>>>;

lazy_static! {
    /// Buffers of every [`LogWatcher`] created so far. Dropped watchers leave
    /// a dead entry that is pruned on the next write.
    static ref WATCHER_BUFFERS: Mutex<Vec<Weak<Mutex<Vec<u8>>>>> = Mutex::new(Vec::new());
}

/// Guards the one-time installation of the global subscriber.
static INSTALL_SUBSCRIBER: Once = Once::new();

/// Install the process-wide subscriber that feeds every [`LogWatcher`].
///
/// Only the first call has an effect, so the log levels of the first test to
/// run apply to all of them.
pub fn install_global_subscriber(settings: &LoggingSettings) {
    INSTALL_SUBSCRIBER.call_once(|| {
        let env_filter: EnvFilter = (&settings.levels).into();
        let subscriber = tracing_subscriber::registry().with(env_filter).with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(BroadcastWriter::default),
        );
        tracing::subscriber::set_global_default(subscriber)
            .expect("Could not install the test subscriber");
    });
}

/// Helper to collect events emitted by Tracing and later make assertions about
/// the collected events.
pub struct LogWatcher {
    /// The raw bytes received from Tracing. Should represent new-line separated
    /// JSON objects.
    buf: SharedBuffer,

    /// Events parsed from [`buf`](Self::buf). As complete lines are parsed
    /// from `buf`, the corresponding bytes are removed from it.
    events: Vec<TracingJsonEvent>,
}

impl Default for LogWatcher {
    fn default() -> Self {
        let buf = SharedBuffer::default();
        WATCHER_BUFFERS
            .lock()
            .expect("mutex was poisoned")
            .push(Arc::downgrade(&buf));
        Self {
            buf,
            events: Vec::new(),
        }
    }
}

impl LogWatcher {
    /// Make a new LogWatcher with some events pre-populated. Primarily for
    /// testing LogWatcher itself.
    #[must_use]
    pub fn with_events(events: Vec<TracingJsonEvent>) -> Self {
        Self {
            events,
            buf: SharedBuffer::default(),
        }
    }

    /// Iterate over the events collected so far by this log watcher.
    pub fn events(&mut self) -> std::slice::Iter<TracingJsonEvent> {
        self.convert_events();
        self.events.iter()
    }

    /// Test if any event this logger received matches `predicate`.
    ///
    /// # Example
    ///
    /// ```
    /// # use hinter_integration_tests::{LogWatcher, TracingJsonEvent};
    /// # use tracing::Level;
    /// # let mut fields = std::collections::HashMap::new();
    /// # fields.insert("message".to_string(), serde_json::json!("Request success"));
    /// # let mut log_watcher = LogWatcher::with_events(vec![
    /// #     TracingJsonEvent {
    /// #         fields,
    /// #         level: Level::INFO,
    /// #         target: String::new(),
    /// #         timestamp: String::new(),
    /// #     }
    /// # ]);
    /// assert!(log_watcher.has(|event| event.field_contains("message", "success")));
    /// ```
    #[must_use = "LogWatcher::has does not make assertions alone, you probably want to wrap it in assert!()"]
    pub fn has<F>(&mut self, predicate: F) -> bool
    where
        F: FnMut(&TracingJsonEvent) -> bool,
    {
        self.events().any(predicate)
    }

    /// Move every complete line in `self.buf` into `self.events`. A trailing
    /// partial line stays in the buffer.
    fn convert_events(&mut self) {
        let mut buf = self.buf.lock().expect("mutex was poisoned");
        let complete = match buf.iter().rposition(|byte| *byte == b'\n') {
            Some(idx) => idx + 1,
            None => return,
        };
        let lines: Vec<u8> = buf.drain(..complete).collect();
        drop(buf);

        let text = String::from_utf8(lines).expect("bad utf8");
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let event: TracingJsonEvent = serde_json::from_str(line)
                .unwrap_or_else(|_| panic!("Bad JSON in log line: {}", line));
            self.events.push(event);
        }
    }
}

/// Writer given to Tracing that copies every write into the buffer of each
/// live [`LogWatcher`].
#[derive(Clone, Default)]
pub struct BroadcastWriter;

impl Write for BroadcastWriter {
    fn write(&mut self, new_bytes: &[u8]) -> std::io::Result<usize> {
        let mut buffers = WATCHER_BUFFERS
            .lock()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        buffers.retain(|weak| weak.strong_count() > 0);
        for buf in buffers.iter().filter_map(Weak::upgrade) {
            let mut buf = buf
                .lock()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            buf.extend_from_slice(new_bytes);
        }
        Ok(new_bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A deserialization of [`tracing_subscriber::fmt::format::Json`]'s output format.
#[derive(Debug, Deserialize)]
pub struct TracingJsonEvent {
    /// The key-value fields logged on the event, usually including `message`.
    pub fields: HashMap<String, Value>,
    /// The level the event was emitted at.
    #[serde(deserialize_with = "deserialize_level")]
    pub level: Level,
    /// The target of the event.
    pub target: String,
    /// The time the event was emitted.
    pub timestamp: String,
}

impl TracingJsonEvent {
    /// Test if the field named `field_name` is a string that contains `pat` as a
    /// substring.
    pub fn field_contains<'a, S>(&'a self, field_name: &'a str, pat: S) -> bool
    where
        S: Deref<Target = str>,
    {
        self.fields
            .get(field_name)
            .and_then(Value::as_str)
            .map_or(false, |value| value.contains(&*pat))
    }

    /// Test if the field named `field_name` is exactly `expected`.
    pub fn field_equals(&self, field_name: &str, expected: impl Into<Value>) -> bool {
        self.fields.get(field_name) == Some(&expected.into())
    }
}

/// Read a [`Level`] from its name, such as `"INFO"`.
fn deserialize_level<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::{BroadcastWriter, LogWatcher};
    use std::io::Write;
    use tracing::Level;

    #[test]
    fn broadcast_reaches_every_watcher() {
        let mut first = LogWatcher::default();
        let mut second = LogWatcher::default();

        BroadcastWriter
            .write_all(
                b"{\"timestamp\":\"now\",\"level\":\"WARN\",\"fields\":{\"message\":\"broadcast-marker\",\"count\":3},\"target\":\"t\"}\n",
            )
            .unwrap();

        for watcher in [&mut first, &mut second] {
            assert!(watcher.has(|e| e.level == Level::WARN
                && e.field_contains("message", "broadcast-marker")
                && e.field_equals("count", 3)));
        }
    }
}
