use std::{fmt, sync::Arc};

use vidora_core::application::AppUnitOfWork;

use crate::auth::token::TokenCodec;
use crate::infra::config::Config;
use crate::media::MediaStore;

#[derive(Clone)]
pub struct AppState {
    pub unit_of_work: Arc<AppUnitOfWork>,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenCodec>,
    pub media: Arc<dyn MediaStore>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// The token codec is derived from the secrets and expiries in `config`.
    pub fn new(
        unit_of_work: Arc<AppUnitOfWork>,
        config: Arc<Config>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let tokens = Arc::new(TokenCodec::from_config(&config));
        Self {
            unit_of_work,
            config,
            tokens,
            media,
        }
    }
}
