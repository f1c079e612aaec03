use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use igniter::task::{Listener, StatusChange, TaskEvent};
use igniter::types::TaskStatus;

/// Listener that keeps every event it receives.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<TaskEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self) -> Listener {
        let events = Arc::clone(&self.events);
        Arc::new(move |event: &TaskEvent| events.lock().unwrap().push(event.clone()))
    }

    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn status_changes(&self) -> Vec<StatusChange> {
        self.events()
            .iter()
            .filter_map(|e| e.status_change().cloned())
            .collect()
    }

    /// Every status `qualified_key` moved to, in order.
    pub fn statuses_of(&self, qualified_key: &str) -> Vec<TaskStatus> {
        self.status_changes()
            .into_iter()
            .filter(|c| c.qualified_key == qualified_key)
            .map(|c| c.to)
            .collect()
    }

    pub fn stalled_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, TaskEvent::Stalled { .. }))
            .count()
    }
}

/// In-memory writer for capturing reporter output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
