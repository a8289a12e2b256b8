//! Report persistence trait

use crate::report::TriageReport;
use crate::Result;
use async_trait::async_trait;

/// Destination for finalized reports.
///
/// The store assigns the persistent identifier and is responsible for
/// broadcasting the change to dashboards; the engine only knows session ids.
#[async_trait]
pub trait ReportStore: Send + Sync + 'static {
    /// Persist a report and return its identifier
    async fn store(&self, report: TriageReport) -> Result<String>;
}
