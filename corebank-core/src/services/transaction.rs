//! Transaction service - the money movement log

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::result::{Error, Result};
use crate::domain::{
    CustomerKey, NewTransaction, Transaction, TransactionQuery, TransactionStatus,
};
use crate::ports::Repository;

pub struct TransactionService {
    repository: Arc<dyn Repository>,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Append a record to the log
    ///
    /// Records only; balances are not touched. The status defaults to
    /// `SUCCESS`.
    pub fn record(&self, mut new: NewTransaction) -> Result<Transaction> {
        new.validate()?;
        if self
            .repository
            .find_customer(&CustomerKey::Id(new.customer_id))?
            .is_none()
        {
            return Err(Error::not_found(format!("customer id {}", new.customer_id)));
        }

        let tx = self.repository.insert_transaction(&new)?;
        tracing::debug!(
            transaction_id = tx.id,
            kind = %tx.kind,
            status = %tx.status,
            "transaction recorded"
        );
        Ok(tx)
    }

    pub fn get(&self, id: i64) -> Result<Transaction> {
        self.repository
            .find_transaction(id)?
            .ok_or_else(|| Error::not_found(format!("transaction {}", id)))
    }

    /// History matching `query`, newest first
    pub fn query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        query.validate()?;
        self.repository.query_transactions(query)
    }

    /// Transactions of one customer within the last `days` days
    pub fn recent(&self, customer_id: i64, days: u32) -> Result<Vec<Transaction>> {
        let query = TransactionQuery {
            start: Some(Utc::now() - Duration::days(i64::from(days))),
            ..TransactionQuery::for_customer(customer_id)
        };
        self.query(&query)
    }

    /// Settle a pending transaction. Only `PENDING` records can move, and
    /// only once.
    pub fn update_status(&self, id: i64, status: TransactionStatus) -> Result<Transaction> {
        let tx = self
            .repository
            .update_transaction(id, &mut |tx| tx.transition(status))?
            .ok_or_else(|| Error::not_found(format!("transaction {}", id)))?;
        tracing::info!(transaction_id = id, status = %status, "transaction settled");
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRepository;
    use crate::domain::{NewCustomer, TransactionKind};
    use rust_decimal::Decimal;

    fn setup() -> (TransactionService, i64) {
        let repo = Arc::new(InMemoryRepository::new());
        let customer = repo
            .insert_customer(&NewCustomer {
                customer_name: "John Doe".to_string(),
                username: "johndoe".to_string(),
                email: "johndoe@example.com".to_string(),
                phone: "081234567890".to_string(),
                cif_number: "CIF999".to_string(),
            })
            .unwrap();
        (TransactionService::new(repo), customer.id)
    }

    fn withdrawal(customer_id: i64) -> NewTransaction {
        NewTransaction::new(customer_id, TransactionKind::Withdrawal, Decimal::new(250_000, 0))
            .from_account("1234567890")
    }

    #[test]
    fn test_record_defaults_to_success() {
        let (service, customer_id) = setup();
        let tx = service.record(withdrawal(customer_id)).unwrap();
        assert_eq!(tx.status, TransactionStatus::Success);
        assert_eq!(tx.amount.to_string(), "250000.00");
        assert_eq!(service.get(tx.id).unwrap(), tx);
    }

    #[test]
    fn test_record_requires_known_customer() {
        let (service, _) = setup();
        assert!(matches!(
            service.record(withdrawal(42)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_pending_settles_exactly_once() {
        let (service, customer_id) = setup();
        let tx = service
            .record(withdrawal(customer_id).with_status(TransactionStatus::Pending))
            .unwrap();

        let settled = service
            .update_status(tx.id, TransactionStatus::Failed)
            .unwrap();
        assert_eq!(settled.status, TransactionStatus::Failed);
        assert!(matches!(
            service.update_status(tx.id, TransactionStatus::Success),
            Err(Error::Conflict(_))
        ));
        assert_eq!(service.get(tx.id).unwrap().status, TransactionStatus::Failed);
    }

    #[test]
    fn test_pending_cannot_move_to_pending() {
        let (service, customer_id) = setup();
        let tx = service
            .record(withdrawal(customer_id).with_status(TransactionStatus::Pending))
            .unwrap();
        assert!(matches!(
            service.update_status(tx.id, TransactionStatus::Pending),
            Err(Error::Conflict(_))
        ));
        // still settleable afterwards
        service
            .update_status(tx.id, TransactionStatus::Success)
            .unwrap();
    }

    #[test]
    fn test_success_record_is_immutable() {
        let (service, customer_id) = setup();
        let tx = service.record(withdrawal(customer_id)).unwrap();
        assert!(matches!(
            service.update_status(tx.id, TransactionStatus::Failed),
            Err(Error::Conflict(_))
        ));
        assert!(matches!(
            service.update_status(999, TransactionStatus::Failed),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_recent_excludes_old_records() {
        let (service, customer_id) = setup();
        let mut old = withdrawal(customer_id);
        old.transaction_date = Some(Utc::now() - Duration::days(40));
        service.record(old).unwrap();
        service.record(withdrawal(customer_id)).unwrap();

        assert_eq!(service.recent(customer_id, 30).unwrap().len(), 1);
        assert_eq!(service.recent(customer_id, 60).unwrap().len(), 2);
    }

    #[test]
    fn test_query_rejects_inverted_range() {
        let (service, customer_id) = setup();
        let now = Utc::now();
        let query = TransactionQuery {
            start: Some(now),
            end: Some(now - Duration::days(1)),
            ..TransactionQuery::for_customer(customer_id)
        };
        assert!(matches!(service.query(&query), Err(Error::InvalidArgument(_))));
    }
}
