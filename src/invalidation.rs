//! Eager cache invalidation driven by a static aggregate registry.
//!
//! Each cached aggregate declares which entity kinds affect it and how its
//! key is built from a month. Mutation sites call [invalidate_for] with the
//! entity kind they wrote and every month the write touches (both the old
//! and new month when a transaction's date moves across a month boundary);
//! the registry derives the full set of stale keys. Adding a new cached
//! aggregate means adding one registry entry, not editing every call site.
//!
//! Cache failures here are logged and swallowed: the store write already
//! succeeded, and TTL expiry bounds any staleness.

use crate::{
    cache::{Cache, budget_alerts_key, category_breakdown_key, dashboard_key, monthly_expenses_key},
    month::Month,
};

/// The kinds of entity whose writes can make cached aggregates stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A transaction create, update, or delete.
    Transaction,
    /// A budget create, update, or delete.
    Budget,
}

struct Aggregate {
    key_for: fn(Month) -> String,
    affected_by: &'static [Entity],
}

/// Every cached aggregate and the entity kinds that affect it.
const AGGREGATES: [Aggregate; 4] = [
    Aggregate {
        key_for: dashboard_key,
        affected_by: &[Entity::Transaction, Entity::Budget],
    },
    Aggregate {
        key_for: monthly_expenses_key,
        affected_by: &[Entity::Transaction],
    },
    Aggregate {
        key_for: category_breakdown_key,
        affected_by: &[Entity::Transaction],
    },
    Aggregate {
        key_for: budget_alerts_key,
        affected_by: &[Entity::Transaction, Entity::Budget],
    },
];

/// The cache keys that a write to `entity` in the given months makes stale.
pub fn stale_keys(entity: Entity, months: &[Month]) -> Vec<String> {
    let mut keys = Vec::new();

    for aggregate in AGGREGATES
        .iter()
        .filter(|aggregate| aggregate.affected_by.contains(&entity))
    {
        for &month in months {
            let key = (aggregate.key_for)(month);

            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    keys
}

/// Delete every cached aggregate that a write to `entity` in `months` could
/// have made stale.
pub fn invalidate_for(cache: &Cache, entity: Entity, months: &[Month]) {
    for key in stale_keys(entity, months) {
        if let Err(error) = cache.delete(&key) {
            tracing::warn!("could not invalidate cache key {key}: {error}");
        }
    }
}
