//! Test server harness.

use adhikaar::answer::{AnswerComposer, WebSearchFallback};
use adhikaar::assistant::Assistant;
use adhikaar::classifier::Classifier;
use adhikaar::config::{DEFAULT_TRUSTED_DOMAINS, RetrievalFailurePolicy};
use adhikaar::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_RELEVANCE_THRESHOLD};
use adhikaar::embedding::{MockPassageScorer, QueryEncoder};
use adhikaar::gateway::{HandlerState, create_router_with_state};
use adhikaar::llm::{ChatModel, MockChatModel, MockWebSearch, WebSearchModel};
use adhikaar::prompts::PromptSet;
use adhikaar::retrieval::RetrievalPipeline;
use adhikaar::vectordb::{MockVectorDbClient, VectorDbClient, VectorPoint};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;
pub const TEST_COLLECTION_NAME: &str = "adhikaar_test_corpus";

/// One indexed passage and the similarity the mock store reports for it.
#[derive(Debug, Clone)]
pub struct SeedChunk {
    pub text: String,
    pub document: String,
    pub article: String,
    pub similarity: f32,
}

impl SeedChunk {
    pub fn new(text: &str, document: &str, article: &str, similarity: f32) -> Self {
        Self {
            text: text.to_string(),
            document: document.to_string(),
            article: article.to_string(),
            similarity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub chunks: Vec<SeedChunk>,
    pub create_collection: bool,
    pub relevance_threshold: f32,
    pub retrieval_failure: RetrievalFailurePolicy,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            chunks: Vec::new(),
            create_collection: true,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            retrieval_failure: RetrievalFailurePolicy::Fallback,
        }
    }
}

impl TestServerConfig {
    pub fn with_chunks(mut self, chunks: Vec<SeedChunk>) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn without_collection(mut self) -> Self {
        self.create_collection = false;
        self
    }

    pub fn with_retrieval_failure(mut self, policy: RetrievalFailurePolicy) -> Self {
        self.retrieval_failure = policy;
        self
    }
}

/// Upstream model handles wired into a server.
pub struct Upstreams {
    pub classifier: Arc<dyn ChatModel>,
    pub answer: Arc<dyn ChatModel>,
    pub search: Arc<dyn WebSearchModel>,
}

/// Scripted mocks shared with the running server.
#[derive(Clone)]
pub struct MockUpstreams {
    pub classifier: Arc<MockChatModel>,
    pub answer: Arc<MockChatModel>,
    pub search: Arc<MockWebSearch>,
}

impl MockUpstreams {
    pub fn new() -> Self {
        Self {
            classifier: Arc::new(MockChatModel::new()),
            answer: Arc::new(MockChatModel::new()),
            search: Arc::new(MockWebSearch::new()),
        }
    }

    pub fn upstreams(&self) -> Upstreams {
        Upstreams {
            classifier: self.classifier.clone(),
            answer: self.answer.clone(),
            search: self.search.clone(),
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub vectordb: Arc<MockVectorDbClient>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

async fn seed_store(config: &TestServerConfig) -> Result<Arc<MockVectorDbClient>, ServerStartupError> {
    let vectordb = Arc::new(MockVectorDbClient::new());
    if !config.create_collection {
        return Ok(vectordb);
    }

    vectordb
        .ensure_collection(TEST_COLLECTION_NAME, DEFAULT_EMBEDDING_DIM as u64)
        .await
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let points = config
        .chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            VectorPoint::new(i as u64 + 1, vec![0.05; DEFAULT_EMBEDDING_DIM])
                .with_field("text", chunk.text.clone())
                .with_field("document", chunk.document.clone())
                .with_field("article", chunk.article.clone())
        })
        .collect();
    vectordb
        .upsert_points(TEST_COLLECTION_NAME, points)
        .await
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    for (i, chunk) in config.chunks.iter().enumerate() {
        vectordb.set_fixed_score(i as u64 + 1, chunk.similarity);
    }

    Ok(vectordb)
}

/// Spawns the real router on an ephemeral port.
///
/// The vector store is the in-memory mock, the encoder runs in stub mode and
/// passages are reranked by a constant-score mock, so ranking falls back to
/// point id order. Model calls go to whatever `upstreams` holds: scripted
/// mocks, or real clients pointed at local stub servers.
pub async fn spawn_server(
    config: TestServerConfig,
    upstreams: Upstreams,
) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let vectordb = seed_store(&config).await?;
    let prompts = Arc::new(PromptSet::builtin());

    let encoder =
        QueryEncoder::stub().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let retrieval = RetrievalPipeline::new(
        Arc::new(encoder),
        Arc::new(MockPassageScorer::with_default_score(0.5)),
        vectordb.clone(),
        TEST_COLLECTION_NAME,
    );

    let trusted: Vec<String> = DEFAULT_TRUSTED_DOMAINS.iter().map(|d| d.to_string()).collect();
    let fallback = WebSearchFallback::new(upstreams.search, prompts.clone(), &trusted);
    let composer = AnswerComposer::new(upstreams.answer, fallback, prompts.clone())
        .with_threshold(config.relevance_threshold);
    let classifier = Classifier::new(upstreams.classifier, prompts);
    let assistant = Assistant::new(classifier, retrieval, composer)
        .with_retrieval_failure(config.retrieval_failure);

    let app = create_router_with_state(HandlerState::new(assistant));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        vectordb,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

/// Spawns a fully-mocked test server and returns the mocks for scripting.
pub async fn spawn_test_server(
    config: TestServerConfig,
) -> Result<(TestServer, MockUpstreams), ServerStartupError> {
    let mocks = MockUpstreams::new();
    let server = spawn_server(config, mocks.upstreams()).await?;
    Ok((server, mocks))
}
