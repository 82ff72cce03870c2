use crate::config::Config;
use crate::services::data_access::SalesRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repo: SalesRepository,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: SalesRepository, config: Config) -> Self {
        Self {
            repo,
            config: Arc::new(config),
        }
    }
}
