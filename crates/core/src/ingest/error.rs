use std::fmt;

/// Raised when the provider answers but not with something usable.
#[derive(Debug, Clone)]
pub struct ProviderHttpError {
    pub provider: &'static str,
    pub stage: &'static str,
    pub detail: String,
    pub raw_body: Option<String>,
}

impl fmt::Display for ProviderHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "data provider error (provider={}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for ProviderHttpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_provider_and_stage() {
        let err = ProviderHttpError {
            provider: "external_http_json",
            stage: "http",
            detail: "status=503 Service Unavailable".to_string(),
            raw_body: Some("busy".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "data provider error (provider=external_http_json, stage=http): status=503 Service Unavailable"
        );

        let wrapped: anyhow::Error = err.into();
        assert!(wrapped.downcast_ref::<ProviderHttpError>().is_some());
    }
}
