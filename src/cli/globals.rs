use crate::{
    api::{ApiClient, ApiError, ClientConfig},
    reset::EmailPolicy,
};
use std::time::Duration;

/// Options shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    pub base_url: String,
    pub timeout: Duration,
    pub email_domain: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            timeout: crate::api::client::DEFAULT_TIMEOUT,
            email_domain: crate::reset::DEFAULT_EMAIL_DOMAIN.to_string(),
        }
    }

    /// Builds a fresh client (and cookie store) for one command run.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the base URL is not usable.
    pub fn client(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(&ClientConfig::new(&self.base_url).with_timeout(Some(self.timeout)))
    }

    #[must_use]
    pub fn email_policy(&self) -> EmailPolicy {
        EmailPolicy::new(&self.email_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new("http://localhost:8000".to_string());
        assert_eq!(args.base_url, "http://localhost:8000");
        assert_eq!(args.timeout, Duration::from_secs(10));
        assert_eq!(args.email_policy().suffix(), "@sch.ac.kr");
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let args = GlobalArgs::new("ftp://localhost".to_string());
        assert!(matches!(args.client(), Err(ApiError::Config(_))));
    }
}
