use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

/// Bounds the number of concurrent requests against one RPC node. Clones share the
/// same budget, so every link relaying through the node draws from it.
#[derive(Clone, Debug)]
pub struct RequestBudget {
    permits: Arc<Semaphore>,
    limit: usize,
}

impl RequestBudget {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Waits for a free request slot. The semaphore is never closed.
    pub async fn acquire(&self) -> Option<SemaphorePermit<'_>> {
        self.permits.acquire().await.ok()
    }
}

impl Default for RequestBudget {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_permits() {
        let budget = RequestBudget::new(2);
        let other = budget.clone();
        let first = budget.acquire().await;
        assert!(first.is_some());
        assert_eq!(other.available(), 1);
        drop(first);
        assert_eq!(other.available(), 2);
        assert_eq!(RequestBudget::new(0).limit(), 1);
    }
}
