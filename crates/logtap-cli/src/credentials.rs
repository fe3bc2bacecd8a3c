//! Flag- and environment-backed credential provider.

use logtap_client::CredentialProvider;

use crate::error::CliError;

/// Credentials resolved from flags or the environment.
///
/// Both the bearer token and the tenant scope are required before any
/// network call is made.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    token: String,
    tenant: String,
}

impl EnvCredentials {
    /// Builds credentials, rejecting missing values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the token or tenant is absent.
    pub fn new(token: Option<String>, tenant: Option<String>) -> Result<Self, CliError> {
        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            CliError::Config("missing bearer token: set --token or LOGTAP_TOKEN".to_string())
        })?;
        let tenant = tenant.filter(|t| !t.is_empty()).ok_or_else(|| {
            CliError::Config("missing tenant: set --tenant or LOGTAP_TENANT".to_string())
        })?;
        Ok(Self { token, tenant })
    }
}

impl CredentialProvider for EnvCredentials {
    fn current_token(&self) -> String {
        self.token.clone()
    }

    fn current_tenant(&self) -> String {
        self.tenant.clone()
    }
}
