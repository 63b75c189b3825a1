#![allow(dead_code)]

use axum_test::TestServer;
use sqlx::PgPool;
use std::sync::Arc;
use tinylink::application::services::LinkService;
use tinylink::domain::CodeReusePolicy;
use tinylink::infrastructure::persistence::{InMemoryLinkRepository, PgLinkRepository};
use tinylink::routes::router;
use tinylink::state::AppState;
use tinylink::utils::code_generator::{CodeGenerator, RandomCodeGenerator};

pub const BASE_URL: &str = "https://s.example.com";

/// Always hands out the same code, for exercising collision handling.
pub struct FixedCodeGenerator(pub &'static str);

impl CodeGenerator for FixedCodeGenerator {
    fn generate(&self, _length: usize) -> String {
        self.0.to_string()
    }
}

pub fn create_test_state() -> AppState {
    create_test_state_with_generator(Arc::new(RandomCodeGenerator))
}

pub fn create_test_state_with_generator(code_generator: Arc<dyn CodeGenerator>) -> AppState {
    let link_repo = Arc::new(InMemoryLinkRepository::new());
    let link_service = Arc::new(LinkService::new(link_repo, code_generator));

    AppState::new(link_service, BASE_URL)
}

pub fn create_pg_state(pool: PgPool, reuse_policy: CodeReusePolicy) -> AppState {
    let link_repo =
        Arc::new(PgLinkRepository::new(Arc::new(pool)).with_reuse_policy(reuse_policy));
    let link_service = Arc::new(LinkService::new(link_repo, Arc::new(RandomCodeGenerator)));

    AppState::new(link_service, BASE_URL)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(router(state)).unwrap()
}

pub async fn create_test_link(state: &AppState, code: &str, target: &str) {
    state
        .link_service
        .create(target, Some(code))
        .await
        .unwrap();
}

pub async fn create_deleted_link(state: &AppState, code: &str, target: &str) {
    create_test_link(state, code, target).await;
    state.link_service.remove(code).await.unwrap();
}
