use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;

use crate::{config::Config, database::BoardDatabase};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<BoardDatabase>,
    pub config: Config,
    cookie_key: Key,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize database
        let db = BoardDatabase::new(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(config.database.acquire_timeout_secs),
        )
        .await?;
        db.init().await?;

        // The flash-cookie signing key comes from configuration when supplied
        // (rotated on deploy); otherwise it lives for this process only.
        let cookie_key = match &config.secret_key {
            Some(secret) => Key::derive_from(secret.as_bytes()),
            None => {
                let mut bytes = [0u8; 64];
                rand::rng().fill_bytes(&mut bytes);
                Key::from(&bytes)
            }
        };

        Ok(Self {
            db: Arc::new(db),
            config,
            cookie_key,
        })
    }
}

// Lets SignedCookieJar extract its key straight from application state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}
