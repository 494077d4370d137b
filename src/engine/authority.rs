//! Decision-authority collaborator.
//!
//! Answering "does this approver hold decision authority over that
//! employee" belongs to the surrounding identity system; the engine only
//! consumes the boolean. The MySQL-backed implementation lives with the
//! storage adapter; [`StaticAuthority`] serves tests and local runs.

use std::collections::HashSet;

use crate::store::StoreError;

#[allow(async_fn_in_trait)]
pub trait DecisionAuthority {
    async fn can_decide(&self, approver_id: u64, employee_id: u64) -> Result<bool, StoreError>;
}

/// Fixed in-memory authority relation.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthority {
    grants: HashSet<(u64, u64)>,
    allow_all: bool,
}

impl StaticAuthority {
    /// Grants every approver authority over every employee.
    pub fn allow_all() -> Self {
        Self {
            grants: HashSet::new(),
            allow_all: true,
        }
    }

    pub fn grant(mut self, approver_id: u64, employee_id: u64) -> Self {
        self.grants.insert((approver_id, employee_id));
        self
    }
}

impl DecisionAuthority for StaticAuthority {
    async fn can_decide(&self, approver_id: u64, employee_id: u64) -> Result<bool, StoreError> {
        Ok(self.allow_all || self.grants.contains(&(approver_id, employee_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn grants_are_directional() {
        let authority = StaticAuthority::default().grant(2000, 1000);
        assert!(authority.can_decide(2000, 1000).await.unwrap());
        assert!(!authority.can_decide(1000, 2000).await.unwrap());
    }

    #[tokio::test]
    async fn allow_all_covers_any_pair() {
        let authority = StaticAuthority::allow_all();
        assert!(authority.can_decide(1, 2).await.unwrap());
    }
}
