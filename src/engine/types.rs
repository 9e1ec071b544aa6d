//! Engine types
//!
//! Step metadata and run statistics for the ingestion engine.

use crate::error::{Error, Result};
use crate::pagination::EnumerationStats;
use serde::Serialize;

/// Data key the account entity is stored under for later steps
pub const DATA_ACCOUNT_ENTITY: &str = "ACCOUNT_ENTITY";

pub const STEP_FETCH_ACCOUNT: &str = "fetch-account";
pub const STEP_FETCH_USERS: &str = "fetch-users";
pub const STEP_FETCH_CLIENTS: &str = "fetch-clients";

/// Static description of an ingestion step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub depends_on: &'static [&'static str],
    /// `_type`s of the entities the step produces
    pub entity_types: &'static [&'static str],
    /// `_type`s of the relationships the step produces
    pub relationship_types: &'static [&'static str],
}

/// Every step, in declaration order
pub const STEPS: [StepMetadata; 3] = [
    StepMetadata {
        id: STEP_FETCH_ACCOUNT,
        name: "Fetch Account Details",
        depends_on: &[],
        entity_types: &["auth0_account"],
        relationship_types: &[],
    },
    StepMetadata {
        id: STEP_FETCH_USERS,
        name: "Fetch Users",
        depends_on: &[STEP_FETCH_ACCOUNT],
        entity_types: &["auth0_user"],
        relationship_types: &["auth0_account_has_user"],
    },
    StepMetadata {
        id: STEP_FETCH_CLIENTS,
        name: "Fetch Clients",
        depends_on: &[STEP_FETCH_ACCOUNT],
        entity_types: &["auth0_client"],
        relationship_types: &["auth0_account_has_client"],
    },
];

/// Look up a step by id
pub fn step(id: &str) -> Option<&'static StepMetadata> {
    STEPS.iter().find(|s| s.id == id)
}

/// Order steps so that each one runs after everything it depends on.
///
/// Steps with no ordering constraint between them keep their relative
/// order. Fails on an unknown dependency or a cycle.
pub fn execution_order(steps: &[StepMetadata]) -> Result<Vec<StepMetadata>> {
    for s in steps {
        if let Some(missing) = s
            .depends_on
            .iter()
            .find(|dep| !steps.iter().any(|other| other.id == **dep))
        {
            return Err(Error::config(format!(
                "Step '{}' depends on unknown step '{missing}'",
                s.id
            )));
        }
    }

    let mut ordered: Vec<StepMetadata> = Vec::with_capacity(steps.len());
    let mut pending: Vec<StepMetadata> = steps.to_vec();

    while !pending.is_empty() {
        let ready = pending.iter().position(|s| {
            s.depends_on
                .iter()
                .all(|dep| ordered.iter().any(|done| done.id == *dep))
        });

        match ready {
            Some(idx) => ordered.push(pending.remove(idx)),
            None => {
                let stuck: Vec<&str> = pending.iter().map(|s| s.id).collect();
                return Err(Error::config(format!(
                    "Step dependencies form a cycle: {}",
                    stuck.join(", ")
                )));
            }
        }
    }

    Ok(ordered)
}

/// Statistics from an ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    /// Step ids, in the order they finished
    pub steps_completed: Vec<String>,
    pub accounts: u64,
    pub users: u64,
    pub clients: u64,
    pub relationships: u64,
    /// Queries issued by the user enumeration
    pub user_queries: u64,
    /// Pages fetched by the user enumeration
    pub user_pages: u64,
    /// Users the root query reported but the enumeration never reached
    pub user_shortfall: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete_step(&mut self, id: &str) {
        self.steps_completed.push(id.to_string());
    }

    /// Fold in the outcome of the user enumeration
    pub fn add_user_enumeration(&mut self, stats: &EnumerationStats) {
        self.users += stats.records;
        self.relationships += stats.records;
        self.user_queries += stats.queries;
        self.user_pages += stats.pages;
        self.user_shortfall += stats.shortfall();
    }

    pub fn add_clients(&mut self, count: u64) {
        self.clients += count;
        self.relationships += count;
    }

    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
