//! Account data deletion.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountCommand, AccountRepository, AccountRepositoryError, ImageStorage,
};
use crate::domain::{Error, UserId};

/// Account service implementing [`AccountCommand`].
pub struct AccountService<A, S> {
    repo: Arc<A>,
    storage: Arc<S>,
}

impl<A, S> AccountService<A, S> {
    /// Create the service.
    pub fn new(repo: Arc<A>, storage: Arc<S>) -> Self {
        Self { repo, storage }
    }
}

#[async_trait]
impl<A, S> AccountCommand for AccountService<A, S>
where
    A: AccountRepository,
    S: ImageStorage,
{
    async fn delete_account(&self, user: &UserId) -> Result<(), Error> {
        let deleted = self
            .repo
            .delete_account_data(user)
            .await
            .map_err(|err| match err {
                AccountRepositoryError::Connection { message } => {
                    Error::service_unavailable(format!("account repository unavailable: {message}"))
                }
                AccountRepositoryError::Query { message } => {
                    Error::internal(format!("account deletion failed: {message}"))
                }
            })?;

        let prefix = user.storage_prefix();
        let removed = match self.storage.remove_prefix(&prefix).await {
            Ok(removed) => removed,
            Err(err) => {
                warn!(user_id = %user, error = %err, "stored objects not removed");
                0
            }
        };
        info!(
            user_id = %user,
            cards = deleted.cards,
            grading_records = deleted.grading_records,
            objects = removed,
            "account data deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        DeletedAccountData, ImageStorageError, MockAccountRepository, MockImageStorage,
    };

    #[tokio::test]
    async fn deletes_rows_then_objects_under_the_user_prefix() {
        let user = UserId::random();
        let prefix = user.storage_prefix();
        let mut repo = MockAccountRepository::new();
        repo.expect_delete_account_data().times(1).return_once(|_| {
            Ok(DeletedAccountData {
                cards: 3,
                grading_records: 2,
            })
        });
        let mut storage = MockImageStorage::new();
        storage
            .expect_remove_prefix()
            .withf(move |p| p == prefix)
            .times(1)
            .return_once(|_| Ok(6));

        AccountService::new(Arc::new(repo), Arc::new(storage))
            .delete_account(&user)
            .await
            .expect("deleted");
    }

    #[tokio::test]
    async fn storage_failure_does_not_fail_deletion() {
        let mut repo = MockAccountRepository::new();
        repo.expect_delete_account_data()
            .return_once(|_| Ok(DeletedAccountData::default()));
        let mut storage = MockImageStorage::new();
        storage
            .expect_remove_prefix()
            .return_once(|_| Err(ImageStorageError::transport("reset")));

        AccountService::new(Arc::new(repo), Arc::new(storage))
            .delete_account(&UserId::random())
            .await
            .expect("deleted");
    }

    #[tokio::test]
    async fn row_deletion_failure_keeps_stored_objects() {
        let mut repo = MockAccountRepository::new();
        repo.expect_delete_account_data()
            .return_once(|_| Err(AccountRepositoryError::query("fk violation")));
        let mut storage = MockImageStorage::new();
        storage.expect_remove_prefix().times(0);

        let err = AccountService::new(Arc::new(repo), Arc::new(storage))
            .delete_account(&UserId::random())
            .await
            .expect_err("rolled back");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
