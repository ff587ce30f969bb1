// Caller trust classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Computed once per request, never revisited while it is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Guest,
    Forbidden,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Guest => write!(f, "guest"),
            Role::Forbidden => write!(f, "forbidden"),
        }
    }
}
