//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, GoogleOAuth, OpenAiChatAdapter},
    config::Config,
    error::ApiError,
    web::{
        auth::{
            google_callback_handler, google_login_handler, login_handler, logout_handler,
            me_handler, signup_handler,
        },
        chat::{
            chat_handler, chat_history_handler, delete_chat_handler, get_messages_handler,
            save_message_handler, start_chat_handler,
        },
        documents::{
            delete_document_handler, download_document_handler, generate_document_handler,
            get_document_handler, list_documents_handler, update_document_handler,
        },
        middleware::require_auth,
        profile::{get_profile_handler, update_profile_handler, upload_avatar_handler},
        state::AppState,
        ApiDoc,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);
    let chat_adapter = Arc::new(OpenAiChatAdapter::new(
        openai_client,
        config.chat_model.clone(),
    ));

    let google_oauth = match &config.google_oauth {
        Some(google_config) => Some(Arc::new(GoogleOAuth::new(
            google_config.clone(),
            db_adapter.clone(),
        )?)),
        None => {
            warn!("Google OAuth credentials not configured; Google login disabled");
            None
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        chat_adapter,
        google_oauth,
    });

    // --- 5. Configure CORS ---
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|e| {
                ApiError::Internal(format!("Invalid origin '{}': {}", origin, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/auth/google", get(google_login_handler))
        .route("/auth/google/callback", get(google_callback_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/me", get(me_handler))
        .route("/getProfile", get(get_profile_handler))
        .route("/updateProfile", put(update_profile_handler))
        .route("/uploadProfileImage", post(upload_avatar_handler))
        .route("/generate-document", post(generate_document_handler))
        .route("/documents", get(list_documents_handler))
        .route(
            "/documents/{id}",
            get(get_document_handler)
                .put(update_document_handler)
                .delete(delete_document_handler),
        )
        .route("/download-document/{id}", get(download_document_handler))
        .route("/startChat", post(start_chat_handler))
        .route("/chat", post(chat_handler))
        .route("/saveMessage", post(save_message_handler))
        .route("/getMessages/{id}", get(get_messages_handler))
        .route("/chatHistory", get(chat_history_handler))
        .route("/deleteChat/{id}", delete(delete_chat_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
