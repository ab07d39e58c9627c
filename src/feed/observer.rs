//! Completion callbacks for feed refreshes.

use crate::github::error::FeedError;
use crate::github::models::Event;

use super::service::RefreshReport;

/// Receives the outcome of every started refresh.
///
/// Callbacks run on the refresh task. Implementations that drive a UI should
/// forward the data to their own context rather than render inline.
#[cfg_attr(test, mockall::automock)]
pub trait FeedObserver: Send + Sync {
    /// Called after a successful refresh with the full cache snapshot, even
    /// when nothing new arrived.
    fn events_updated(&self, snapshot: &[Event], report: &RefreshReport);

    /// Called when a refresh failed as a whole. The cache is unchanged.
    fn refresh_failed(&self, error: &FeedError);
}

/// Observer that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFeedObserver;

impl FeedObserver for NoopFeedObserver {
    fn events_updated(&self, _snapshot: &[Event], _report: &RefreshReport) {}

    fn refresh_failed(&self, _error: &FeedError) {}
}
