//! Authorization capability keyed by actor role and resource ownership.
//!
//! Every guarded operation goes through these two checks instead of
//! re-implementing its own role/ownership comparison inline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Account roles recognized by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Employer,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Employer => "employer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The authenticated principal behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn candidate(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            role: Role::Candidate,
        }
    }

    pub fn employer(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            role: Role::Employer,
        }
    }
}

/// Authorization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("only {0} accounts may perform this action")]
    RoleRequired(Role),
    #[error("you can only manage your own records")]
    NotOwner,
}

pub fn require_role(actor: &Actor, role: Role) -> Result<(), PolicyError> {
    if actor.role == role {
        Ok(())
    } else {
        Err(PolicyError::RoleRequired(role))
    }
}

pub fn require_owner(actor: &Actor, owner_id: &str) -> Result<(), PolicyError> {
    if actor.user_id == owner_id {
        Ok(())
    } else {
        Err(PolicyError::NotOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_check_rejects_other_roles() {
        let actor = Actor::candidate("usr-000001");
        assert_eq!(require_role(&actor, Role::Candidate), Ok(()));
        assert_eq!(
            require_role(&actor, Role::Employer),
            Err(PolicyError::RoleRequired(Role::Employer))
        );
    }

    #[test]
    fn ownership_check_compares_user_ids() {
        let actor = Actor::employer("usr-000002");
        assert_eq!(require_owner(&actor, "usr-000002"), Ok(()));
        assert_eq!(
            require_owner(&actor, "usr-000009"),
            Err(PolicyError::NotOwner)
        );
    }

    #[test]
    fn errors_render_actionable_messages() {
        assert_eq!(
            PolicyError::RoleRequired(Role::Employer).to_string(),
            "only employer accounts may perform this action"
        );
    }
}
