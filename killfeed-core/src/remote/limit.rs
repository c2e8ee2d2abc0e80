use crate::remote::error::TransportError;
use crate::remote::guard::ConnectionGuard;
use dashmap::DashMap;
use std::sync::Arc;

/// Open connections per host.
pub(crate) type ActiveCounts = Arc<DashMap<String, usize>>;

/// Per-host connection caps, shared by every concurrent server run.
///
/// Exhausting one host's slots fails that run fast with a retryable error and
/// never blocks runs against other hosts.
#[derive(Debug)]
pub struct HostLimiter {
    max_per_host: Option<usize>,
    active: ActiveCounts,
}

impl HostLimiter {
    pub fn new(max_per_host: Option<usize>) -> Self {
        Self {
            max_per_host,
            active: Arc::new(DashMap::new()),
        }
    }

    pub fn acquire(&self, host: &str) -> Result<ConnectionGuard, TransportError> {
        // The entry lock makes check-and-increment one step.
        let mut count = self.active.entry(host.to_string()).or_insert(0);
        if self.max_per_host.is_some_and(|max| *count >= max) {
            tracing::warn!(host, active = *count, "connection slots exhausted");
            return Err(TransportError::PoolExhausted {
                host: host.to_string(),
            });
        }
        *count += 1;
        drop(count);

        Ok(ConnectionGuard::new_acquired(host.to_string(), Arc::clone(&self.active)))
    }

    pub fn active(&self, host: &str) -> usize {
        self.active.get(host).map(|c| *c).unwrap_or(0)
    }
}
