//! Actor - the authenticated caller of a service operation

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    #[default]
    User,
    Admin,
}

/// Verified identity attached to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Snowflake,
    pub role: ActorRole,
}

impl Actor {
    pub fn user(id: Snowflake) -> Self {
        Self {
            id,
            role: ActorRole::User,
        }
    }

    pub fn admin(id: Snowflake) -> Self {
        Self {
            id,
            role: ActorRole::Admin,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }

    /// True when the actor is `user_id` or an admin
    #[inline]
    pub fn acts_for(&self, user_id: Snowflake) -> bool {
        self.is_admin() || self.id == user_id
    }
}
