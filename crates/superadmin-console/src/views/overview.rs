//! Dashboard overview statistics

use super::degrade_shape;
use crate::gateway::SuperAdminApi;
use crate::scope::ViewScope;
use parking_lot::RwLock;
use std::sync::Arc;
use superadmin_core::{Error, Result};
use tracing::{error, warn};

/// Headline numbers; `None` when that figure could not be fetched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverviewStats {
    /// Total hotels on the platform
    pub total_hotels: Option<u64>,
    /// Admins awaiting a decision
    pub pending_admins: Option<usize>,
    /// Approved admins
    pub approved_admins: Option<usize>,
    /// One message per figure that failed
    pub errors: Vec<String>,
}

/// The overview section
///
/// The three figures are fetched concurrently and independently; one
/// failing does not blank the others.
pub struct Overview {
    api: Arc<dyn SuperAdminApi>,
    scope: ViewScope,
    stats: RwLock<OverviewStats>,
}

impl std::fmt::Debug for Overview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overview")
            .field("stats", &*self.stats.read())
            .finish_non_exhaustive()
    }
}

impl Overview {
    /// Create the view; nothing is fetched until [`Self::load`]
    pub fn new(api: Arc<dyn SuperAdminApi>) -> Self {
        Self {
            api,
            scope: ViewScope::new(),
            stats: RwLock::new(OverviewStats::default()),
        }
    }

    /// Fetch all figures
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`], or an auth failure from any figure.
    /// Other failures are recorded per figure and do not fail the load.
    pub async fn load(&self) -> Result<()> {
        let (total, pending, approved) = self
            .scope
            .run(async {
                Ok(tokio::join!(
                    self.api.total_hotel_count(),
                    self.api.pending_admins(),
                    self.api.approved_admins(),
                ))
            })
            .await?;

        let mut stats = OverviewStats::default();
        let mut auth_failure = None;

        match total {
            Ok(count) => stats.total_hotels = Some(count),
            Err(Error::UnexpectedShape { endpoint, detail }) => {
                warn!(%endpoint, %detail, "Unrecognised hotel count, showing 0");
                stats.total_hotels = Some(0);
            }
            Err(e) => record(&mut stats.errors, &mut auth_failure, e, "fetch hotel count"),
        }

        match degrade_shape(pending) {
            Ok(admins) => stats.pending_admins = Some(admins.len()),
            Err(e) => record(&mut stats.errors, &mut auth_failure, e, "fetch pending requests"),
        }

        match degrade_shape(approved) {
            Ok(admins) => stats.approved_admins = Some(admins.len()),
            Err(e) => record(&mut stats.errors, &mut auth_failure, e, "fetch approved admins"),
        }

        *self.stats.write() = stats;
        auth_failure.map_or(Ok(()), Err)
    }

    /// A copy of the current figures
    pub fn stats(&self) -> OverviewStats {
        self.stats.read().clone()
    }

    /// Tear the view down, cancelling anything in flight
    pub fn teardown(&self) {
        self.scope.teardown();
    }

    pub(crate) fn scope(&self) -> &ViewScope {
        &self.scope
    }
}

fn record(errors: &mut Vec<String>, auth_failure: &mut Option<Error>, e: Error, action: &str) {
    error!("Failed to {action}: {e}");
    errors.push(e.user_message(action));
    if e.is_auth_failure() && auth_failure.is_none() {
        *auth_failure = Some(e);
    }
}
