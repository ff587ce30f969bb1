//! Admin role classification

use ledger_rpc_core::domain::Role;
use ledger_rpc_core::port::RolePolicy;
use serde_json::Value;
use std::net::IpAddr;

/// Config-driven [`RolePolicy`].
///
/// Credentials are the `admin_user` / `admin_password` members of the request
/// object. Supplying wrong credentials, or supplying any from an address that
/// is not admin-allowed, is `Forbidden`. An admin-allowed address is `Admin`
/// when no credentials are configured or the right ones are supplied.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    pub admin_allow: Vec<IpAddr>,
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
}

impl AdminPolicy {
    pub fn new(admin_allow: Vec<IpAddr>) -> Self {
        Self {
            admin_allow,
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin_user = Some(user.into());
        self.admin_password = Some(password.into());
        self
    }

    fn password_required(&self) -> bool {
        self.admin_user.as_deref().is_some_and(|s| !s.is_empty())
            || self.admin_password.as_deref().is_some_and(|s| !s.is_empty())
    }

    fn is_admin_address(&self, remote: IpAddr) -> bool {
        self.admin_allow.iter().any(|ip| *ip == remote || canonical(*ip) == canonical(remote))
    }
}

// IPv4-mapped IPv6 addresses compare equal to their IPv4 form
fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    }
}

impl RolePolicy for AdminPolicy {
    fn classify(&self, request: &Value, remote: IpAddr) -> Role {
        let user = request.get("admin_user");
        let password = request.get("admin_password");
        let supplied = user.is_some() || password.is_some();
        let required = self.password_required();

        let wrong = supplied
            && (!required
                || user.and_then(Value::as_str).unwrap_or("")
                    != self.admin_user.as_deref().unwrap_or("")
                || password.and_then(Value::as_str).unwrap_or("")
                    != self.admin_password.as_deref().unwrap_or(""));
        let admin_address = self.is_admin_address(remote);

        if wrong || (supplied && !admin_address) {
            Role::Forbidden
        } else if admin_address && (!required || supplied) {
            Role::Admin
        } else {
            Role::Guest
        }
    }
}
