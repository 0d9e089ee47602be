/// Factory: build the identity resolver (and its backend client) from `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{IdentityResolver, TokenVerifier};
use crate::services::backend::{AuthBackend, BackendResult, GoTrueBackend};

pub fn build_backend(config: &Config) -> BackendResult<Arc<dyn AuthBackend>> {
    let backend = GoTrueBackend::new(
        &config.backend_url,
        config.backend_api_key.clone(),
        config.backend_timeout,
    )?;

    Ok(Arc::new(backend))
}

pub fn build_identity_resolver(
    config: &Config,
    backend: Arc<dyn AuthBackend>,
) -> Arc<IdentityResolver> {
    let verifier = TokenVerifier::new(config.jwt_secret.as_ref(), config.jwt_leeway_seconds);
    if !verifier.has_secret() {
        tracing::warn!("AUTH_JWT_SECRET not set; bearer tokens will be rejected");
    }

    Arc::new(IdentityResolver::new(backend, verifier))
}
