//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and
//! the REST API. Core services are generic over repository and generator
//! traits; AppState pins them to the infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use aula_core::chat::manager::ChatMemoryManager;
use aula_core::chat::repository::{ChatRepository, TopicRepository, UserRepository};
use aula_core::chat::service::ChatService;
use aula_core::llm::box_generator::BoxResponseGenerator;
use aula_core::llm::echo::EchoGenerator;
use aula_core::llm::fallback::{KeywordResponder, WithFallback};
use aula_infra::config::load_config;
use aula_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use aula_infra::llm::huggingface::HuggingFaceGenerator;
use aula_infra::sqlite::chat::SqliteChatRepository;
use aula_infra::sqlite::pool::{DatabasePool, database_url};
use aula_infra::sqlite::topic::SqliteTopicRepository;
use aula_infra::sqlite::user::SqliteUserRepository;
use aula_types::chat::ChatStats;
use aula_types::config::{AulaConfig, InferenceConfig};
use aula_types::error::RepositoryError;
use secrecy::SecretString;

/// Environment variable holding the HuggingFace API token.
pub const TOKEN_ENV: &str = "HUGGINGFACE_TOKEN";

pub type ConcreteMemoryManager = ChatMemoryManager<SqliteChatRepository, SqliteTopicRepository>;

pub type ConcreteChatService =
    ChatService<SqliteChatRepository, SqliteTopicRepository, BoxResponseGenerator>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub topic_repo: SqliteTopicRepository,
    pub user_repo: SqliteUserRepository,
    pub config: Arc<AulaConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire
    /// services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;
        let generator = build_generator(&config.inference);

        Ok(Self::from_parts(db_pool, data_dir, config, generator))
    }

    /// Wire services over an open pool.
    pub fn from_parts(
        db_pool: DatabasePool,
        data_dir: PathBuf,
        config: AulaConfig,
        generator: BoxResponseGenerator,
    ) -> Self {
        let memory = ChatMemoryManager::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqliteTopicRepository::new(db_pool.clone()),
            config.memory.clone(),
        );
        let chat_service = ChatService::new(Arc::new(memory), generator);

        Self {
            chat_service: Arc::new(chat_service),
            topic_repo: SqliteTopicRepository::new(db_pool.clone()),
            user_repo: SqliteUserRepository::new(db_pool.clone()),
            config: Arc::new(config),
            data_dir,
            db_pool,
        }
    }

    /// The shared conversation cache.
    pub fn memory(&self) -> &Arc<ConcreteMemoryManager> {
        self.chat_service.memory()
    }

    /// Durable-store totals.
    pub async fn chat_stats(&self) -> Result<ChatStats, RepositoryError> {
        Ok(ChatStats {
            total_turns: self.memory().chat_repo().count_turns().await?,
            total_users: self.user_repo.count_users().await?,
            total_topics: self.topic_repo.count_topics().await?,
        })
    }
}

/// Pick the response generator for this process.
///
/// - `dummy = true`: echo generator, no model involved.
/// - token set: HuggingFace with keyword fallback on transient failures.
/// - otherwise: keyword responder only.
pub fn build_generator(config: &InferenceConfig) -> BoxResponseGenerator {
    if config.dummy {
        tracing::info!("Inference disabled, using echo generator");
        return BoxResponseGenerator::new(EchoGenerator);
    }

    let token = std::env::var(TOKEN_ENV)
        .ok()
        .filter(|token| !token.trim().is_empty());

    let Some(token) = token else {
        tracing::warn!("{TOKEN_ENV} not set, answering with keyword fallback only");
        return BoxResponseGenerator::new(KeywordResponder);
    };

    match HuggingFaceGenerator::new(SecretString::from(token), config.clone()) {
        Ok(generator) => {
            tracing::info!(endpoint = generator.endpoint(), "Using HuggingFace inference");
            BoxResponseGenerator::new(WithFallback::new(generator, KeywordResponder))
        }
        Err(e) => {
            tracing::warn!(error = %e, "HuggingFace client unavailable, using keyword fallback");
            BoxResponseGenerator::new(KeywordResponder)
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// State over a fresh temp database with the echo generator.
    pub async fn test_state() -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);

        let pool = DatabasePool::new(&database_url(&data_dir)).await.unwrap();
        AppState::from_parts(
            pool,
            data_dir,
            AulaConfig::default(),
            BoxResponseGenerator::new(EchoGenerator),
        )
    }
}
