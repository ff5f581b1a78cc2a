use serde::{Deserialize, Serialize};

/// Role claim stored alongside the principal by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleClaim {
    Admin,
    Ops,
}

impl RoleClaim {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "ops" => Some(Self::Ops),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleClaim::Admin => "admin",
            RoleClaim::Ops => "ops",
        }
    }

    /// Landing page for a signed-in principal holding this claim.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            RoleClaim::Admin => "/admin/dashboard",
            RoleClaim::Ops => "/ops/dashboard",
        }
    }
}

/// Authenticated caller as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<RoleClaim>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Some(RoleClaim::Admin)
    }

    /// Protected views demand an exact claim match; ops cannot open admin pages.
    pub fn can_access(&self, required: Option<RoleClaim>) -> bool {
        match required {
            Some(required) => self.role == Some(required),
            None => true,
        }
    }
}

/// Sign-in state derived from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    SignedOut,
    SignedIn(Principal),
}

impl SessionState {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            SessionState::SignedIn(principal) => Some(principal),
            SessionState::Loading | SessionState::SignedOut => None,
        }
    }

    /// Where the caller should be sent, or `None` while sign-in is resolving.
    pub fn landing_path(&self) -> Option<&'static str> {
        match self {
            SessionState::Loading => None,
            SessionState::SignedOut => Some("/login"),
            SessionState::SignedIn(principal) => Some(
                principal
                    .role
                    .map(|role| role.dashboard_path())
                    .unwrap_or("/login"),
            ),
        }
    }
}

/// Read-only view of the current session.
pub trait SessionContext: Send + Sync {
    fn state(&self) -> SessionState;

    fn principal(&self) -> Option<Principal> {
        self.state().principal().cloned()
    }

    fn caller_is_admin(&self) -> bool {
        self.principal()
            .map(|principal| principal.is_admin())
            .unwrap_or(false)
    }
}

impl SessionContext for SessionState {
    fn state(&self) -> SessionState {
        self.clone()
    }
}
