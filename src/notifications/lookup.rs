//! Reverse lookup providers.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::traits::{CallerIdentity, IdentityLookup, LookupError};

/// Provider that never knows anyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

#[async_trait]
impl IdentityLookup for NoLookup {
    async fn lookup(&self, _number: &str) -> Result<Option<CallerIdentity>, LookupError> {
        Ok(None)
    }
}

/// Fixed number-to-identity table.
///
/// Numbers are compared digits only, so "01 02 03 04 05" and "0102030405"
/// match the same entry.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: HashMap<String, CallerIdentity>,
}

impl StaticDirectory {
    pub fn new(entries: HashMap<String, CallerIdentity>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(number, identity)| (normalize(&number), identity))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(number: &str) -> String {
    number
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

#[async_trait]
impl IdentityLookup for StaticDirectory {
    async fn lookup(&self, number: &str) -> Result<Option<CallerIdentity>, LookupError> {
        Ok(self.entries.get(&normalize(number)).cloned())
    }
}
