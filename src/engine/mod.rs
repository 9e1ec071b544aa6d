//! Ingestion engine module
//!
//! Runs the ingestion steps against one tenant and collects the result.
//!
//! # Overview
//!
//! The engine module provides:
//! - `IngestionEngine` - Validates the integration, then runs every step
//! - `fetch_account`, `fetch_users`, `fetch_clients` - The steps themselves,
//!   generic over the collection traits so any source can drive them
//! - `STEPS` - Step metadata in dependency order

mod types;

pub use types::{
    execution_order, step, IngestStats, StepMetadata, DATA_ACCOUNT_ENTITY, STEPS,
    STEP_FETCH_ACCOUNT, STEP_FETCH_CLIENTS, STEP_FETCH_USERS,
};

use crate::config::{IngestConfig, REQUIRED_SCOPES};
use crate::error::{Error, Result};
use crate::graph::{
    account_entity, account_weblink, client_entity, direct_relationship, user_entity, Entity,
    RelationshipClass,
};
use crate::management::{Auth0Client, Auth0User, ManagementClient};
use crate::pagination::{
    EnumerationStats, EnumeratorConfig, ExhaustiveEnumerator, PagedCollection, PagedEnumerator,
    SearchableCollection,
};
use crate::state::JobState;
use std::time::Instant;
use tracing::info;

/// Drives one ingestion run
pub struct IngestionEngine {
    config: IngestConfig,
    client: ManagementClient,
    state: JobState,
}

impl IngestionEngine {
    /// Validate and normalize `config`, then build the API client for it
    pub fn new(mut config: IngestConfig) -> Result<Self> {
        config.validate()?;
        let client = ManagementClient::new(&config)?;
        Ok(Self::with_client(config, client))
    }

    /// Use an existing client. `config` is expected to be validated already.
    pub fn with_client(config: IngestConfig, client: ManagementClient) -> Self {
        Self {
            config,
            client,
            state: JobState::new(),
        }
    }

    /// Collect into `state` instead of a fresh one
    #[must_use]
    pub fn with_state(mut self, state: JobState) -> Self {
        self.state = state;
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn client(&self) -> &ManagementClient {
        &self.client
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Check the credentials work and carry the scopes the steps need
    pub async fn validate(&self) -> Result<()> {
        self.client.verify_authentication().await?;
        self.client.verify_scopes(&REQUIRED_SCOPES).await?;
        info!(domain = %self.client.domain(), "Integration validated");
        Ok(())
    }

    /// Validate, then run every step in dependency order
    pub async fn run(&self) -> Result<IngestStats> {
        let start = Instant::now();
        self.validate().await?;

        let mut stats = IngestStats::new();
        for step in execution_order(&STEPS)? {
            info!(step = step.id, name = step.name, "Starting step");
            self.run_step(step.id, &mut stats).await?;
            stats.complete_step(step.id);
            info!(step = step.id, "Finished step");
        }

        stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            users = stats.users,
            clients = stats.clients,
            relationships = stats.relationships,
            duration_ms = stats.duration_ms,
            "Ingestion complete"
        );
        Ok(stats)
    }

    /// Run a single step. Its dependencies must have run on the same state.
    pub async fn run_step(&self, id: &str, stats: &mut IngestStats) -> Result<()> {
        let weblink = account_weblink(&self.config.domain);
        match id {
            STEP_FETCH_ACCOUNT => {
                fetch_account(&self.state, &self.config.instance_id, &weblink).await?;
                stats.accounts += 1;
            }
            STEP_FETCH_USERS => {
                let enumeration = fetch_users(
                    &self.client,
                    self.config.users.enumerator()?,
                    &self.state,
                    &weblink,
                )
                .await?;
                stats.add_user_enumeration(&enumeration);
            }
            STEP_FETCH_CLIENTS => {
                let count = fetch_clients(
                    &self.client,
                    self.config.clients.page_size,
                    &self.state,
                    &weblink,
                )
                .await?;
                stats.add_clients(count);
            }
            other => return Err(Error::config(format!("Unknown step '{other}'"))),
        }
        Ok(())
    }
}

// ============================================================================
// Steps
// ============================================================================

/// Add the account entity and publish it for the other steps
pub async fn fetch_account(state: &JobState, instance_id: &str, weblink: &str) -> Result<Entity> {
    let account = account_entity(instance_id, weblink);
    state.add_entity(account.clone()).await?;
    state.set_data(DATA_ACCOUNT_ENTITY, &account).await?;
    Ok(account)
}

async fn stored_account(state: &JobState) -> Result<Entity> {
    state
        .get_data_as(DATA_ACCOUNT_ENTITY)
        .await?
        .ok_or_else(|| {
            Error::state(format!(
                "'{DATA_ACCOUNT_ENTITY}' not set, run {STEP_FETCH_ACCOUNT} first"
            ))
        })
}

/// Add every user and its link to the account
pub async fn fetch_users<S>(
    source: &S,
    config: EnumeratorConfig,
    state: &JobState,
    weblink: &str,
) -> Result<EnumerationStats>
where
    S: SearchableCollection<Auth0User> + ?Sized,
{
    let account = stored_account(state).await?;

    let stats = ExhaustiveEnumerator::new(source, config)
        .enumerate(|user: Auth0User| {
            let converted = user_entity(&user, weblink).map(|entity| {
                let relationship = direct_relationship(RelationshipClass::Has, &account, &entity);
                (entity, relationship)
            });
            let state = state.clone();
            async move {
                let (entity, relationship) = converted?;
                state.add_entity(entity).await?;
                state.add_relationship(relationship).await
            }
        })
        .await?;

    info!(
        users = stats.records,
        queries = stats.queries,
        pages = stats.pages,
        subdivisions = stats.subdivisions,
        "Fetched users"
    );
    Ok(stats)
}

/// Add every application and its link to the account
pub async fn fetch_clients<S>(
    source: &S,
    page_size: u32,
    state: &JobState,
    weblink: &str,
) -> Result<u64>
where
    S: PagedCollection<Auth0Client> + ?Sized,
{
    let account = stored_account(state).await?;

    let count = PagedEnumerator::new(source, page_size)
        .enumerate(|client: Auth0Client| {
            let converted = client_entity(&client, weblink).map(|entity| {
                let relationship = direct_relationship(RelationshipClass::Has, &account, &entity);
                (entity, relationship)
            });
            let state = state.clone();
            async move {
                let (entity, relationship) = converted?;
                state.add_entity(entity).await?;
                state.add_relationship(relationship).await
            }
        })
        .await?;

    info!(clients = count, "Fetched clients");
    Ok(count)
}
