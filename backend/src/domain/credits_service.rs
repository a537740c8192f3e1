//! Read-only credit balance lookup.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::port_errors::map_ledger_error;
use crate::domain::ports::{CreditLedger, CreditsQuery};
use crate::domain::{CreditBalance, Error, UserId};

/// Credits service implementing [`CreditsQuery`].
pub struct CreditsService<L> {
    ledger: Arc<L>,
}

impl<L> CreditsService<L> {
    /// Create the service.
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl<L> CreditsQuery for CreditsService<L>
where
    L: CreditLedger,
{
    async fn balance(&self, user: &UserId) -> Result<CreditBalance, Error> {
        self.ledger.balance(user).await.map_err(map_ledger_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{CreditLedgerError, MockCreditLedger};

    #[tokio::test]
    async fn balance_is_read_from_the_ledger() {
        let mut ledger = MockCreditLedger::new();
        ledger
            .expect_balance()
            .times(1)
            .return_once(|_| Ok(CreditBalance::new(5)));

        let balance = CreditsService::new(Arc::new(ledger))
            .balance(&UserId::random())
            .await
            .expect("balance");
        assert_eq!(balance.get(), 5);
    }

    #[tokio::test]
    async fn unavailable_ledger_is_service_unavailable() {
        let mut ledger = MockCreditLedger::new();
        ledger
            .expect_balance()
            .return_once(|_| Err(CreditLedgerError::connection("pool timeout")));

        let err = CreditsService::new(Arc::new(ledger))
            .balance(&UserId::random())
            .await
            .expect_err("ledger down");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
