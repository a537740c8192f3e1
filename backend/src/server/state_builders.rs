//! Builders wiring HTTP state ports to real adapters or fixtures.
//!
//! A port gets its real service only when every adapter it needs is
//! configured: the database pool for all of them, object storage for
//! collection, grading and account deletion, and the grading API for grading
//! and identification. Anything else stays on its fixture.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use tcg_backend::domain::ports::{
    AccountCommand, CardGradingCommand, CardIdentificationQuery, CollectionCommand,
    CollectionQuery, CreditsQuery, FixtureAccountCommand, FixtureCardGradingCommand,
    FixtureCardIdentificationQuery, FixtureCollectionCommand, FixtureCollectionQuery,
    FixtureCreditsQuery, FixtureLoginService, FixtureProfileCommand, FixtureWaitlistCommand,
    LoginService, ProfileCommand, WaitlistCommand,
};
use tcg_backend::domain::{
    AccountService, CardGradingPorts, CardGradingService, CardIdentificationService,
    CollectionService, CreditsService, ProfileService, WaitlistService,
};
use tcg_backend::inbound::http::state::{HttpState, HttpStatePorts};
use tcg_backend::outbound::auth::PasswordGrantLoginService;
use tcg_backend::outbound::grading_api::GradingApiHttpClient;
use tcg_backend::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselCardRepository, DieselCreditLedger,
    DieselGradingRecordRepository, DieselProfileRepository, DieselWaitlistRepository,
};
use tcg_backend::outbound::storage::{HttpImageStorage, StorageConfig};

use super::ServerConfig;

/// Use `make` when `source` is available, otherwise the fixture.
fn port_or_fixture<S, T>(
    port: &'static str,
    source: Option<S>,
    make: impl FnOnce(S) -> Arc<T>,
    fixture: impl FnOnce() -> Arc<T>,
) -> Arc<T>
where
    T: ?Sized,
{
    match source {
        Some(source) => make(source),
        None => {
            warn!(port, "adapter settings incomplete; using fixture port");
            fixture()
        }
    }
}

fn build_storage(config: &ServerConfig) -> io::Result<Option<Arc<HttpImageStorage>>> {
    let Some(settings) = config.adapters.storage.as_ref() else {
        return Ok(None);
    };
    let storage = HttpImageStorage::new(StorageConfig {
        base_url: settings.url.clone(),
        bucket: settings.bucket.clone(),
        service_key: settings.service_key.clone(),
        timeout: config.adapters.timeout,
    })
    .map_err(|err| io::Error::other(format!("storage client: {err}")))?;
    Ok(Some(Arc::new(storage)))
}

fn build_provider(config: &ServerConfig) -> io::Result<Option<Arc<GradingApiHttpClient>>> {
    let Some(settings) = config.adapters.grading_api.as_ref() else {
        return Ok(None);
    };
    let client = GradingApiHttpClient::new(
        &settings.url,
        settings.token.clone(),
        config.adapters.timeout,
    )
    .map_err(|err| io::Error::other(format!("grading api client: {err}")))?;
    Ok(Some(Arc::new(client)))
}

fn build_login(config: &ServerConfig) -> io::Result<Arc<dyn LoginService>> {
    let Some(settings) = config.adapters.auth.as_ref() else {
        warn!("auth service not configured; fixture credentials accepted");
        return Ok(Arc::new(FixtureLoginService));
    };
    let login =
        PasswordGrantLoginService::new(&settings.url, settings.api_key.clone(), config.adapters.timeout)
            .map_err(|err| io::Error::other(format!("auth client: {err}")))?;
    Ok(Arc::new(login))
}

fn build_collection_pair(
    pool: Option<&DbPool>,
    storage: Option<&Arc<HttpImageStorage>>,
    clock: &Arc<dyn Clock>,
    max_upload_bytes: usize,
) -> (Arc<dyn CollectionCommand>, Arc<dyn CollectionQuery>) {
    match pool.zip(storage) {
        Some((pool, storage)) => {
            let service = Arc::new(CollectionService::new(
                Arc::new(DieselCardRepository::new(pool.clone())),
                Arc::new(DieselGradingRecordRepository::new(pool.clone())),
                storage.clone(),
                clock.clone(),
                max_upload_bytes,
            ));
            (
                service.clone() as Arc<dyn CollectionCommand>,
                service as Arc<dyn CollectionQuery>,
            )
        }
        None => {
            warn!(port = "collection", "adapter settings incomplete; using fixture port");
            (
                Arc::new(FixtureCollectionCommand),
                Arc::new(FixtureCollectionQuery),
            )
        }
    }
}

/// Build the shared HTTP state from configured adapters and fixture fallbacks.
pub(super) fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let pool = config.db_pool.as_ref();
    let storage = build_storage(config)?;
    let provider = build_provider(config)?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let login = build_login(config)?;
    let (collection, collection_query) =
        build_collection_pair(pool, storage.as_ref(), &clock, config.max_upload_bytes);

    let grading = port_or_fixture(
        "grading",
        pool.zip(storage.as_ref()).zip(provider.as_ref()),
        |((pool, storage), provider)| {
            Arc::new(CardGradingService::new(
                CardGradingPorts {
                    cards: Arc::new(DieselCardRepository::new(pool.clone())),
                    records: Arc::new(DieselGradingRecordRepository::new(pool.clone())),
                    ledger: Arc::new(DieselCreditLedger::new(pool.clone())),
                    storage: storage.clone(),
                    provider: provider.clone(),
                },
                clock.clone(),
            )) as Arc<dyn CardGradingCommand>
        },
        || Arc::new(FixtureCardGradingCommand),
    );

    let identification = port_or_fixture(
        "identification",
        pool.zip(provider.as_ref()),
        |(pool, provider)| {
            Arc::new(CardIdentificationService::new(
                provider.clone(),
                Arc::new(DieselCreditLedger::new(pool.clone())),
                config.identification_charging,
                config.max_upload_bytes,
            )) as Arc<dyn CardIdentificationQuery>
        },
        || Arc::new(FixtureCardIdentificationQuery),
    );

    let credits = port_or_fixture(
        "credits",
        pool,
        |pool| {
            Arc::new(CreditsService::new(Arc::new(DieselCreditLedger::new(
                pool.clone(),
            )))) as Arc<dyn CreditsQuery>
        },
        || Arc::new(FixtureCreditsQuery),
    );

    let profiles = port_or_fixture(
        "profiles",
        pool,
        |pool| {
            Arc::new(ProfileService::new(Arc::new(DieselProfileRepository::new(
                pool.clone(),
            )))) as Arc<dyn ProfileCommand>
        },
        || Arc::new(FixtureProfileCommand),
    );

    let waitlist = port_or_fixture(
        "waitlist",
        pool,
        |pool| {
            Arc::new(WaitlistService::new(
                Arc::new(DieselWaitlistRepository::new(pool.clone())),
                clock.clone(),
            )) as Arc<dyn WaitlistCommand>
        },
        || Arc::new(FixtureWaitlistCommand),
    );

    let accounts = port_or_fixture(
        "accounts",
        pool.zip(storage.as_ref()),
        |(pool, storage)| {
            Arc::new(AccountService::new(
                Arc::new(DieselAccountRepository::new(pool.clone())),
                storage.clone(),
            )) as Arc<dyn AccountCommand>
        },
        || Arc::new(FixtureAccountCommand),
    );

    Ok(web::Data::new(
        HttpState::new(HttpStatePorts {
            login,
            grading,
            identification,
            collection,
            collection_query,
            credits,
            profiles,
            waitlist,
            accounts,
        })
        .with_upload_limit(config.max_upload_bytes),
    ))
}
