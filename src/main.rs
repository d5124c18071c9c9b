use axum::Router;
use todo_item_api::{
    application::todo_item_service::TodoItemServiceImpl,
    config::AppConfig,
    domain::repository::TodoItemRepository,
    http::routing::{self, todo_items},
    infrastructure::{
        memory_repo::InMemoryTodoItemRepository, sqlite_repo::SqliteTodoItemRepository,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let router = if config.uses_memory_store() {
        build_app(InMemoryTodoItemRepository::new(), &config).await?
    } else {
        build_app(SqliteTodoItemRepository::connect(&config.database_url).await?, &config).await?
    };

    tracing::info!(addr = %config.bind_addr, sort_policy = ?config.sort_policy, "listening");
    axum::serve(tokio::net::TcpListener::bind(config.bind_addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn build_app<R: TodoItemRepository + Clone>(
    repo: R,
    config: &AppConfig,
) -> anyhow::Result<Router> {
    if config.init_schema {
        repo.init().await?;
    } else if !repo.is_available().await {
        tracing::warn!(
            "todo_items table missing and TODO_INIT_SCHEMA=false; reads will report not found"
        );
    }
    let service = TodoItemServiceImpl::with_sort_policy(repo, config.sort_policy);
    Ok(routing::app(todo_items::router(todo_items::AppState { service })))
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
