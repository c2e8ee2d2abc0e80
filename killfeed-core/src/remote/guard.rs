use crate::remote::limit::ActiveCounts;

/// RAII guard for a single acquired host connection slot.
///
/// Invariants:
/// - A guard is created *only after* `HostLimiter::acquire` counted the slot
/// - The slot is released exactly once on Drop, on success and error paths alike
#[derive(Debug)]
pub struct ConnectionGuard {
    host: String,
    active: ActiveCounts,
}

impl ConnectionGuard {
    /// Create a guard for an already-acquired slot.
    pub(crate) fn new_acquired(host: String, active: ActiveCounts) -> Self {
        Self { host, active }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Some(mut count) = self.active.get_mut(&self.host) {
            *count = count.saturating_sub(1);
        }
        self.active.remove_if(&self.host, |_, count| *count == 0);
        tracing::trace!(host = %self.host, "connection slot released");
    }
}
