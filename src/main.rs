//! Adhikaar HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use adhikaar::answer::{AnswerComposer, WebSearchFallback};
use adhikaar::assistant::Assistant;
use adhikaar::classifier::Classifier;
use adhikaar::config::Config;
use adhikaar::constants::{DEFAULT_EMBEDDING_DIM, validate_embedding_dim};
use adhikaar::embedding::{EncoderConfig, QueryEncoder, Reranker, RerankerConfig, TextEmbedder};
use adhikaar::gateway::{HandlerState, create_router_with_state};
use adhikaar::llm::{GeminiSearch, OpenAiCompatibleChat};
use adhikaar::prompts::PromptSet;
use adhikaar::retrieval::RetrievalPipeline;
use adhikaar::vectordb::{QdrantClient, VectorDbClient};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        classifier_model = %config.classifier_model,
        answer_model = %config.answer_model,
        search_model = %config.search_model,
        "Adhikaar starting"
    );

    let prompts = Arc::new(PromptSet::load(config.prompts_dir.as_deref())?);

    let encoder = QueryEncoder::load(
        EncoderConfig::new(config.embedding_model.clone())
            .with_query_prefix(config.query_prefix.clone()),
    )?;
    if let Err(e) = validate_embedding_dim(encoder.dimension(), DEFAULT_EMBEDDING_DIM) {
        tracing::warn!(error = %e, "Query encoder dimension differs from the default index layout");
    }
    let reranker = Reranker::load(RerankerConfig::new(config.reranker_model.clone()))?;

    let vectordb = Arc::new(QdrantClient::new(
        &config.vector_url,
        Some(config.vector_api_key.as_str()),
    )?);
    match vectordb.collection_exists(&config.vector_index).await {
        Ok(true) => tracing::info!(collection = %config.vector_index, "Vector index found"),
        Ok(false) => tracing::warn!(
            collection = %config.vector_index,
            "Vector index does not exist yet; legal queries will use web search"
        ),
        Err(e) => tracing::warn!(error = %e, "Vector store unreachable at start-up"),
    }

    let classifier_model = Arc::new(OpenAiCompatibleChat::new(
        &config.chat_api_base,
        config.chat_api_key.clone(),
        config.classifier_model.clone(),
        config.llm_timeout,
    )?);
    let answer_model = Arc::new(OpenAiCompatibleChat::new(
        &config.chat_api_base,
        config.chat_api_key.clone(),
        config.answer_model.clone(),
        config.llm_timeout,
    )?);
    let search_model = Arc::new(GeminiSearch::new(
        &config.search_api_base,
        config.search_api_key.clone(),
        config.search_model.clone(),
        config.llm_timeout,
    )?);

    let retrieval = RetrievalPipeline::new(
        Arc::new(encoder),
        Arc::new(reranker),
        vectordb,
        config.vector_index.clone(),
    );
    let fallback = WebSearchFallback::new(search_model, prompts.clone(), &config.trusted_domains);
    let composer = AnswerComposer::new(answer_model, fallback, prompts.clone())
        .with_threshold(config.relevance_threshold);
    let classifier = Classifier::new(classifier_model, prompts);

    let assistant = Assistant::new(classifier, retrieval, composer)
        .with_retrieval_failure(config.retrieval_failure);

    let app = create_router_with_state(HandlerState::new(assistant));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Adhikaar shutdown complete");
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/health", port);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    {
        Ok(client) => client,
        Err(_) => return 1,
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
