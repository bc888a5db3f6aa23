use std::sync::Arc;

use application::MessageRelay;
use cache::TokenCache;
use config::Config;
use infrastructure::feishu::{AppCredentials, ChatApi};

pub mod application;
pub mod cache;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod middleware;
pub mod models;
pub mod router;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_helpers;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub relay: Arc<MessageRelay>,
}

impl AppState {
    pub fn new(config: Config, api: Arc<dyn ChatApi>) -> Self {
        let credentials = AppCredentials {
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
        };
        let tokens = Arc::new(TokenCache::new(api.clone(), credentials));
        let relay = Arc::new(MessageRelay::new(
            api,
            tokens,
            config.open_chat_id.clone(),
        ));

        Self { config, relay }
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        self.relay.tokens()
    }
}
