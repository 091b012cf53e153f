//! View lifetimes and per-record mutation guards

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use superadmin_core::{Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Lifetime of one mounted view
///
/// Work started through [`ViewScope::run`] resolves to [`Error::Cancelled`]
/// once the scope is torn down, so a late response can never update a view
/// that is no longer shown. Dropping the scope tears it down.
#[derive(Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    /// Create a live scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` unless the scope is torn down first
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the scope is torn down before or while
    /// `work` runs, otherwise whatever `work` returns.
    pub async fn run<F, T>(&self, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            biased;
            () = self.token.cancelled() => {
                debug!("View work cancelled");
                Err(Error::Cancelled)
            }
            result = work => {
                if self.token.is_cancelled() {
                    Err(Error::Cancelled)
                } else {
                    result
                }
            }
        }
    }

    /// Cancel everything running in this scope
    pub fn teardown(&self) {
        self.token.cancel();
    }

    /// Whether the scope has been torn down
    pub fn is_torn_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A handle that can tear the scope down from elsewhere
    pub fn handle(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Record ids with a mutation currently in progress
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<DashMap<i64, ()>>,
}

impl InFlight {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for the duration of the returned guard
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutationInFlight`] if `id` is already claimed.
    pub fn claim(&self, id: i64) -> Result<InFlightGuard> {
        match self.ids.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(Error::MutationInFlight { id }),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(());
                Ok(InFlightGuard {
                    ids: Arc::clone(&self.ids),
                    id,
                })
            }
        }
    }

    /// Whether a mutation for `id` is in progress
    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains_key(&id)
    }
}

/// Releases its record id when dropped
#[derive(Debug)]
pub struct InFlightGuard {
    ids: Arc<DashMap<i64, ()>>,
    id: i64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let scope = ViewScope::new();
        let value = scope.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_torn_down_scope_rejects_work() {
        let scope = ViewScope::new();
        scope.teardown();
        assert!(scope.is_torn_down());
        let result = scope.run(async { Ok(1) }).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_interrupts_running_work() {
        let scope = ViewScope::new();
        let handle = scope.handle();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });

        let result = scope
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_drop_cancels_handle() {
        let scope = ViewScope::new();
        let handle = scope.handle();
        drop(scope);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_in_flight_claims_are_exclusive() {
        let in_flight = InFlight::new();
        let guard = in_flight.claim(2).unwrap();
        assert!(in_flight.contains(2));
        assert!(matches!(
            in_flight.claim(2),
            Err(Error::MutationInFlight { id: 2 })
        ));
        assert!(in_flight.claim(3).is_ok());

        drop(guard);
        assert!(!in_flight.contains(2));
        assert!(in_flight.claim(2).is_ok());
    }
}
