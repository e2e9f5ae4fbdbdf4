//! Identity of whoever performs a mutating operation
//!
//! Every settings update, payout transition, refund and dispute action is
//! stamped with the actor that requested it. The HTTP layer builds an `Actor`
//! from the bearer token; background tasks use `Actor::system`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Roles recognised by the settlement core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access, including rate settings
    Admin,
    /// Finance operators: payouts, refunds, disputes
    Finance,
    /// Internal jobs and bootstrap
    System,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "finance" => Some(Role::Finance),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

/// An authenticated actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn new(id: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            id: id.into(),
            roles,
        }
    }

    /// An internal actor, e.g. the startup bootstrap
    pub fn system(name: impl Into<String>) -> Self {
        Self::new(name, vec![Role::System])
    }

    /// Returns true if the actor holds `role`; admins and the system hold every role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles
            .iter()
            .any(|r| *r == role || matches!(r, Role::Admin | Role::System))
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_implies_finance() {
        let admin = Actor::new("ops-1", vec![Role::Admin]);
        assert!(admin.has_role(Role::Finance));

        let finance = Actor::new("fin-1", vec![Role::Finance]);
        assert!(finance.has_role(Role::Finance));
        assert!(!finance.has_role(Role::Admin));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("finance"), Some(Role::Finance));
        assert_eq!(Role::parse("guest"), None);
    }
}
