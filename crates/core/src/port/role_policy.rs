// Role classification port

use crate::domain::Role;
use serde_json::Value;
use std::net::IpAddr;

/// Derives the caller's trust level from its address and the request object.
pub trait RolePolicy: Send + Sync {
    fn classify(&self, request: &Value, remote: IpAddr) -> Role;
}

pub mod mocks {
    use super::*;

    /// Always answers with the same role
    pub struct FixedRole(pub Role);

    impl RolePolicy for FixedRole {
        fn classify(&self, _request: &Value, _remote: IpAddr) -> Role {
            self.0
        }
    }
}
