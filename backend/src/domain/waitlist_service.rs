//! Waitlist signups.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{WaitlistCommand, WaitlistRepository, WaitlistRepositoryError};
use crate::domain::{Error, WaitlistEmail, WaitlistSignup};

/// Waitlist service implementing [`WaitlistCommand`].
pub struct WaitlistService<W> {
    repo: Arc<W>,
    clock: Arc<dyn Clock>,
}

impl<W> WaitlistService<W> {
    /// Create the service.
    pub fn new(repo: Arc<W>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

#[async_trait]
impl<W> WaitlistCommand for WaitlistService<W>
where
    W: WaitlistRepository,
{
    async fn join(&self, email: WaitlistEmail) -> Result<WaitlistSignup, Error> {
        let outcome = self
            .repo
            .add(&email, self.clock.utc())
            .await
            .map_err(|err| match err {
                WaitlistRepositoryError::Connection { message } => {
                    Error::service_unavailable(format!("waitlist unavailable: {message}"))
                }
                WaitlistRepositoryError::Query { message } => {
                    Error::internal(format!("waitlist error: {message}"))
                }
            })?;
        info!(?outcome, "waitlist signup");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockWaitlistRepository;
    use mockable::DefaultClock;
    use rstest::rstest;

    #[rstest]
    #[case(WaitlistSignup::Added)]
    #[case(WaitlistSignup::AlreadyRegistered)]
    #[tokio::test]
    async fn repeat_signups_are_not_errors(#[case] outcome: WaitlistSignup) {
        let mut repo = MockWaitlistRepository::new();
        repo.expect_add()
            .withf(|email, _| email.as_ref() == "trainer@example.com")
            .return_once(move |_, _| Ok(outcome));

        let email = WaitlistEmail::new(" Trainer@Example.com ").expect("valid email");
        let result = WaitlistService::new(Arc::new(repo), Arc::new(DefaultClock))
            .join(email)
            .await
            .expect("joined");
        assert_eq!(result, outcome);
    }
}
