//! Authentication handling for registry APIs.
//!
//! Docker Hub's tag listing is public. GHCR requires a bearer token even for
//! public images; an anonymous, short-lived token is issued by its token
//! endpoint for a `repository:<owner>/<repo>:pull` scope.

use serde::Deserialize;


/// Credentials attached to a registry request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication (anonymous access)
    Anonymous,

    /// Bearer token authentication
    Bearer {
        /// The bearer token
        token: String,
    },
}

impl Credentials {
    /// Creates Bearer token credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagpin::auth::Credentials;
    ///
    /// let creds = Credentials::bearer("token123");
    /// assert_eq!(creds.to_header_value().as_deref(), Some("Bearer token123"));
    /// ```
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Returns the Authorization header value for these credentials.
    pub fn to_header_value(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Bearer { token } => Some(format!("Bearer {}", token)),
        }
    }
}

/// Body returned by a registry token endpoint.
///
/// Registries disagree on the field name, so both `token` and
/// `access_token` are accepted.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    #[serde(alias = "access_token")]
    pub token: String,
}

impl TokenResponse {
    /// Converts the response into bearer credentials.
    pub fn into_credentials(self) -> Credentials {
        Credentials::bearer(self.token)
    }
}

/// Builds the pull scope for a repository.
///
/// # Examples
///
/// ```
/// assert_eq!(libtagpin::auth::pull_scope("acme", "widget"), "repository:acme/widget:pull");
/// ```
pub fn pull_scope(owner: &str, repository: &str) -> String {
    format!("repository:{}/{}:pull", owner, repository)
}
