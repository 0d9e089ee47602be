/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Clone is cheap (everything heavy sits behind Arc)
 * - Built once at startup; nothing in here is mutated afterwards
 */
use std::sync::Arc;

use crate::config::{Config, CookieSettings};
use crate::services::auth::IdentityResolver;
use crate::services::backend::AuthBackend;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: Arc<IdentityResolver>,
}

impl AppState {
    pub fn new(config: Arc<Config>, resolver: Arc<IdentityResolver>) -> Self {
        Self { config, resolver }
    }

    pub fn backend(&self) -> &dyn AuthBackend {
        self.resolver.backend()
    }

    pub fn cookies(&self) -> &CookieSettings {
        &self.config.cookies
    }
}
