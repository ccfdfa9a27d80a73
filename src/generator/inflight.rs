use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Set of wedding ids with a generation currently running.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the wedding; `None` if another generation holds it.
    pub fn try_acquire(&self, wedding_id: &str) -> Option<InFlightToken> {
        if !self.active.lock().insert(wedding_id.to_string()) {
            return None;
        }
        Some(InFlightToken {
            wedding_id: wedding_id.to_string(),
            active: Arc::clone(&self.active),
        })
    }
}

/// Released on drop.
#[derive(Debug)]
pub struct InFlightToken {
    wedding_id: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl Drop for InFlightToken {
    fn drop(&mut self) {
        self.active.lock().remove(&self.wedding_id);
    }
}
