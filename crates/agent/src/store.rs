//! In-memory report store, for tests and the console channel

use async_trait::async_trait;
use parking_lot::RwLock;

use triage_core::{ReportStore, Result, TriageReport};

#[derive(Default)]
pub struct InMemoryReportStore {
    reports: RwLock<Vec<(String, TriageReport)>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<TriageReport> {
        self.reports
            .read()
            .iter()
            .find(|(report_id, _)| report_id == id)
            .map(|(_, report)| report.clone())
    }

    /// Stored reports, oldest first
    pub fn reports(&self) -> Vec<TriageReport> {
        self.reports.read().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn store(&self, report: TriageReport) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.reports.write().push((id.clone(), report));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{Classification, FactRecord, InputSource};

    #[tokio::test]
    async fn test_store_and_get() {
        let store = InMemoryReportStore::new();
        let report = TriageReport::new(
            InputSource::Text,
            FactRecord::default(),
            Classification::conservative_default(),
            "",
            "keyword_classifier",
        );
        let id = store.store(report.clone()).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id), Some(report));
        assert!(store.get("missing").is_none());
    }
}
