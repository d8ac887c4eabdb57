//! Shared application state handed to every handler through an `Extension`.

use crate::backend::client::BackendClient;
use crate::config::Config;
use crate::errors::ServiceResult;
use crate::services::search_debouncer::SearchDebouncer;
use crate::utils::jwt::JwtUtils;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: BackendClient,
    pub jwt: JwtUtils,
    pub search: SearchDebouncer,
}

impl AppState {
    pub fn new(config: Config) -> ServiceResult<Self> {
        let backend = BackendClient::new(
            &config.backend_url,
            Duration::from_secs(config.backend_timeout_seconds),
        )?;
        let jwt = JwtUtils::new(&config.jwt_secret);
        let search = SearchDebouncer::new(config.search_debounce());

        Ok(Self {
            config: Arc::new(config),
            backend,
            jwt,
            search,
        })
    }
}
