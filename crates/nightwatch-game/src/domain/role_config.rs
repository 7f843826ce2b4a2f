//! Role pool configuration.

use std::collections::BTreeMap;

use nightwatch_core::error::DomainError;
use serde::Serialize;

/// Named role → number of slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleConfig {
    counts: BTreeMap<String, u32>,
}

impl RoleConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a `(name, count)` pair without changing anything.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for an empty name, a negative
    /// count, or a count that does not fit in a `u32`.
    pub fn validate(name: &str, count: i64) -> Result<u32, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidArgument(
                "role name must not be empty".to_owned(),
            ));
        }
        if count < 0 {
            return Err(DomainError::InvalidArgument(format!(
                "role count must be non-negative, got {count}"
            )));
        }
        u32::try_from(count)
            .map_err(|_| DomainError::InvalidArgument(format!("role count {count} is too large")))
    }

    /// Sets the slot count for `name`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// See [`RoleConfig::validate`]; on error the configuration is unchanged.
    pub fn set_role(&mut self, name: &str, count: i64) -> Result<(), DomainError> {
        let count = Self::validate(name, count)?;
        self.counts.insert(name.to_owned(), count);
        Ok(())
    }

    pub(crate) fn insert(&mut self, name: String, count: u32) {
        self.counts.insert(name, count);
    }

    /// Slot count configured for `name`.
    #[must_use]
    pub fn count(&self, name: &str) -> Option<u32> {
        self.counts.get(name).copied()
    }

    /// Sum of all configured counts.
    #[must_use]
    pub fn total_slots(&self) -> usize {
        self.counts.values().map(|&c| c as usize).sum()
    }

    /// Expands the configuration into its multiset of role names, in
    /// role-name order.
    #[must_use]
    pub fn pool(&self) -> Vec<String> {
        self.counts
            .iter()
            .flat_map(|(name, &count)| std::iter::repeat_n(name.clone(), count as usize))
            .collect()
    }

    /// Iterates `(role, count)` pairs in role-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(name, &count)| (name.as_str(), count))
    }
}
