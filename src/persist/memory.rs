use std::sync::{Arc, Mutex, MutexGuard};

use super::{ContactSink, PersistResult};

/// In-memory sink whose clones share one buffer.
///
/// Hand one clone to a store or runtime and keep another to inspect what was
/// written.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    bytes: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemorySink {
    /// Creates an empty sink; reads return `None` until the first write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink pre-filled with `bytes`.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::new(Mutex::new(Some(bytes.into()))),
        }
    }

    /// Returns a copy of the current contents.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vec<u8>>> {
        self.bytes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ContactSink for MemorySink {
    fn read_bytes(&self) -> PersistResult<Option<Vec<u8>>> {
        Ok(self.contents())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> PersistResult<()> {
        *self.lock() = Some(bytes.to_vec());
        Ok(())
    }
}
