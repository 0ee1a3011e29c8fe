//! # Server Configuration
//!
//! Server setup for the triage board API: shared application state, the
//! Axum router with its middleware layers, and the OpenAPI document.

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::ai::client::{ChatClient, ChatClientConfig};
use crate::ai::orchestrator::Orchestrator;
use crate::board::{BoardService, lock_board};
use crate::config::AppConfig;
use crate::dataset;
use crate::handlers;
use crate::telemetry::{TraceContext, with_trace_context};
use crate::trackers::{IssueTrackerClient, TicketSystemClient, TrackerClient};
use crate::transitions::{PipelineCapacities, TransitionModel};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Single logical writer for all mutable board state.
    pub board: Arc<Mutex<BoardService>>,
    pub orchestrator: Arc<Orchestrator>,
    pub issue_tracker: Arc<dyn TrackerClient>,
    pub ticket_system: Arc<dyn TrackerClient>,
    pub config: Arc<AppConfig>,
    /// Cancels in-flight AI batches on shutdown.
    pub cancel: CancellationToken,
}

impl AppState {
    /// Builds the full state from configuration with real outbound clients.
    pub fn from_config(config: AppConfig) -> Self {
        let transitions = TransitionModel::new(PipelineCapacities {
            manual: config.manual_capacity,
            automatic: config.automatic_capacity,
        });
        let orchestrator = Orchestrator::new(ChatClient::new(ChatClientConfig {
            api_base: config.ai.api_base.clone(),
            api_key: config.ai.api_key.clone(),
            model: config.ai.model.clone(),
            temperature: config.ai.temperature,
        }));
        Self {
            board: Arc::new(Mutex::new(BoardService::new(transitions))),
            orchestrator: Arc::new(orchestrator),
            issue_tracker: Arc::new(IssueTrackerClient::new(config.issue_tracker_base.clone())),
            ticket_system: Arc::new(TicketSystemClient::new(config.ticket_system_base.clone())),
            config: Arc::new(config),
            cancel: CancellationToken::new(),
        }
    }
}

/// Assigns each request a trace id, held in task-local storage so error
/// responses can echo it back.
async fn trace_context_middleware(request: Request, next: Next) -> Response {
    let context = TraceContext {
        trace_id: uuid::Uuid::new_v4().to_string(),
    };
    with_trace_context(context, next.run(request)).await
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/board", get(handlers::board::get_board))
        .route("/items/{id}", get(handlers::board::get_item))
        .route(
            "/items/{id}/activity",
            get(handlers::board::get_item_activity),
        )
        .route("/activity", get(handlers::board::get_activity))
        .route("/items/{id}/move", post(handlers::items::move_item))
        .route("/items/{id}/reopen", post(handlers::items::reopen_item))
        .route("/items/{id}/resolve", post(handlers::items::resolve_item))
        .route("/items/{id}/priority", post(handlers::items::set_priority))
        .route("/items/{id}/assign", post(handlers::items::assign_team))
        .route("/items/{id}/comments", post(handlers::items::add_comment))
        .route("/items/{id}/tickets", post(handlers::tickets::create_ticket))
        .route("/selection", post(handlers::items::update_selection))
        .route(
            "/channels/{channel}/load",
            post(handlers::channels::load_channel),
        )
        .route(
            "/channels/{channel}",
            delete(handlers::channels::unload_channel),
        )
        .route("/process/classify", post(handlers::process::classify))
        .route(
            "/process/requirements",
            post(handlers::process::analyze_requirements),
        )
        .route("/reset", post(handlers::reset))
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::from_config(config.clone());

    // Seed the board from the configured dataset before accepting traffic.
    if let Some(path) = &config.dataset_path {
        let file = dataset::load_dataset(std::path::Path::new(path)).await?;
        let imported = lock_board(&state.board).import_dataset(&file.feedback);
        info!(path, imported, "dataset loaded");
    }

    let cancel = state.cancel.clone();
    let app = create_app(state);

    // Resolve the configured bind address
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, profile = %config.profile, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            cancel.cancel();
        })
        .await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::reset,
        crate::handlers::board::get_board,
        crate::handlers::board::get_item,
        crate::handlers::board::get_item_activity,
        crate::handlers::board::get_activity,
        crate::handlers::items::move_item,
        crate::handlers::items::reopen_item,
        crate::handlers::items::resolve_item,
        crate::handlers::items::set_priority,
        crate::handlers::items::assign_team,
        crate::handlers::items::add_comment,
        crate::handlers::items::update_selection,
        crate::handlers::channels::load_channel,
        crate::handlers::channels::unload_channel,
        crate::handlers::process::classify,
        crate::handlers::process::analyze_requirements,
        crate::handlers::tickets::create_ticket,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::FeedbackItem,
            crate::models::FeedbackStatus,
            crate::models::Channel,
            crate::models::Company,
            crate::models::Priority,
            crate::models::Resolver,
            crate::models::ActivityEvent,
            crate::models::ActivityKind,
            crate::models::Actor,
            crate::models::AnalysisResult,
            crate::models::Classification,
            crate::models::Pipeline,
            crate::models::Sentiment,
            crate::models::TicketDraft,
            crate::sla::SlaInfo,
            crate::sla::SlaStatus,
            crate::handlers::types::ItemView,
            crate::handlers::types::SelectionView,
            crate::handlers::board::BoardResponse,
            crate::handlers::board::ColumnView,
            crate::handlers::items::MoveRequest,
            crate::handlers::items::ResolveRequest,
            crate::handlers::items::PriorityRequest,
            crate::handlers::items::AssignRequest,
            crate::handlers::items::CommentRequest,
            crate::handlers::items::SelectionRequest,
            crate::handlers::channels::LoadChannelRequest,
            crate::handlers::channels::LoadChannelResponse,
            crate::handlers::channels::UnloadChannelResponse,
            crate::handlers::process::ProcessRequest,
            crate::handlers::process::ProcessResponse,
            crate::handlers::tickets::TicketKind,
            crate::handlers::tickets::CreateTicketRequest,
        )
    ),
    info(
        title = "Triage Board API",
        description = "Product-feedback triage board: normalized item store, \
                       status pipeline, AI batch processing and tracker integrations",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
