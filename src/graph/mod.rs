//! Graph model
//!
//! Entities and relationships emitted by the ingestion, the converters that
//! build them from management API records, and the dashboard links attached
//! to them.

mod converters;
mod types;
mod weblink;

pub use converters::{
    account_entity, client_entity, user_entity, ACCOUNT_ENTITY_TYPE, CLIENT_ENTITY_TYPE,
    USER_ENTITY_TYPE,
};
pub use types::{direct_relationship, Entity, RawData, Relationship, RelationshipClass};
pub use weblink::{account_weblink, client_weblink, user_weblink};
