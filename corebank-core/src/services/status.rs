//! Status service - store-wide summary

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::Result;
use crate::ports::{Repository, StoreSummary};

pub struct StatusService {
    repository: Arc<dyn Repository>,
}

impl StatusService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    pub fn get_status(&self) -> Result<StatusSummary> {
        let summary = self.repository.summary()?;
        Ok(StatusSummary {
            unlocked_customers: summary.customers - summary.locked_customers,
            inactive_accounts: summary.accounts - summary.active_accounts,
            summary,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    #[serde(flatten)]
    pub summary: StoreSummary,
    pub unlocked_customers: i64,
    pub inactive_accounts: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRepository;

    #[test]
    fn test_empty_store() {
        let service = StatusService::new(Arc::new(InMemoryRepository::new()));
        let status = service.get_status().unwrap();
        assert_eq!(status.summary, StoreSummary::default());
        assert_eq!(status.unlocked_customers, 0);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["customers"], 0);
        assert_eq!(json["total_clear_balance"], "0");
    }
}
