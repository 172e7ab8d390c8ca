//! Shared application state.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::JwtKeys;
use crate::config::ServerConfig;
use crate::repository::{
    InsightRepository, SeaOrmInsightRepository, SeaOrmSubmissionRepository,
    SeaOrmSurveyRepository, SeaOrmUserRepository, SubmissionRepository, SurveyRepository,
    UserRepository,
};

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub keys: JwtKeys,
    pub surveys: Arc<dyn SurveyRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub insights: Arc<dyn InsightRepository>,
}

impl AppState {
    /// Wires the sea-orm repositories onto one connection pool.
    pub fn new(db: DatabaseConnection, config: ServerConfig) -> Self {
        Self {
            keys: JwtKeys::new(&config.jwt_secret, config.token_ttl_hours),
            surveys: Arc::new(SeaOrmSurveyRepository::new(db.clone())),
            submissions: Arc::new(SeaOrmSubmissionRepository::new(db.clone())),
            users: Arc::new(SeaOrmUserRepository::new(db.clone())),
            insights: Arc::new(SeaOrmInsightRepository::new(db)),
            config,
        }
    }
}
