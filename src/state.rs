use crate::config::AppConfig;
use crate::handlers::auth::TokenAuthority;
use crate::handlers::directory::{CredentialDirectory, StaticDirectory};
use crate::handlers::error::ApiError;
use crate::handlers::mock_feed::FeedSettings;
use crate::handlers::policy::AccessPolicy;
use actix_web::web;
use anyhow::Result;
use chrono::Duration;
use log::{info, warn};
use std::sync::Arc;

/// Shared, read-only application data handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub tokens: web::Data<TokenAuthority>,
    pub policy: web::Data<AccessPolicy>,
    pub directory: web::Data<dyn CredentialDirectory>,
    pub feed: web::Data<FeedSettings>,
}

impl AppState {
    pub fn new(
        tokens: TokenAuthority,
        policy: AccessPolicy,
        directory: Arc<dyn CredentialDirectory>,
        feed: FeedSettings,
    ) -> Self {
        AppState {
            tokens: web::Data::new(tokens),
            policy: web::Data::new(policy),
            directory: web::Data::from(directory),
            feed: web::Data::new(feed),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let tokens = TokenAuthority::new(
            config.token.secret.as_bytes(),
            config.token.algorithm,
            Duration::seconds(config.token.ttl_secs),
        );
        info!(
            "Tokens signed with {:?}, valid for {}s",
            config.token.algorithm,
            tokens.ttl().num_seconds()
        );

        let policy = match &config.access_policy {
            Some(overrides) => AccessPolicy::default().with_overrides(overrides)?,
            None => AccessPolicy::default(),
        };

        let directory = match &config.user_directory_path {
            Some(path) => StaticDirectory::from_json_file(path)?,
            None => {
                warn!("USER_DIRECTORY_PATH not set, using the built-in demo accounts");
                StaticDirectory::demo()
            }
        };

        Ok(AppState::new(tokens, policy, Arc::new(directory), config.feed))
    }

    /// Registers shared data and the query error handler on an app or scope.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.tokens.clone())
            .app_data(self.policy.clone())
            .app_data(self.directory.clone())
            .app_data(self.feed.clone())
            .app_data(
                web::QueryConfig::default()
                    .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
            );
    }
}
