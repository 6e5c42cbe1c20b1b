use std::sync::{Arc, Mutex};

use pollwatch::engine::ChangeSink;
use pollwatch::errors::Result;
use pollwatch::watch::ChangeSet;

/// A sink that records every delivered change set instead of printing it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<ChangeSet>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded change sets.
    pub fn delivered(&self) -> Arc<Mutex<Vec<ChangeSet>>> {
        Arc::clone(&self.delivered)
    }
}

impl ChangeSink for RecordingSink {
    fn deliver(&mut self, changes: &ChangeSet) -> Result<()> {
        let mut guard = self.delivered.lock().unwrap();
        guard.push(changes.clone());
        Ok(())
    }
}
