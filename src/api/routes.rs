//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{parse_timestamp, AccountProfile, ChatEntry, ChatRole, MealEntry, ProfileSeed, WeightLogEntry};
use crate::analysis::MealImage;
use crate::domain::{OperationContext, Period, ProfileChanges};
use crate::error::AppError;
use crate::handlers::{
    AppendChatMessageCommand, AppendMealCommand, AppendWeightLogCommand, CreateAccountCommand,
    CreateAccountHandler, JournalHandler, LoginCommand, LoginHandler, UpdateProfileCommand,
    UpdateProfileHandler,
};
use crate::metrics::{self, DashboardReport, DatedWeight};

use super::middleware::{
    auth_middleware, context_middleware, logging_middleware, CurrentAccount, SessionToken,
};
use super::state::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    #[serde(default, alias = "nome")]
    pub display_name: Option<String>,
    #[serde(default, alias = "objetivo")]
    pub objective: Option<String>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub initial_weight: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeightLogRequest {
    pub weight: f64,
    /// ISO-8601; defaults to now
    #[serde(default)]
    pub recorded_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    pub role: ChatRole,
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "imageUrl", alias = "image_url", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MealRequest {
    #[serde(alias = "analise")]
    pub analysis_text: String,
    #[serde(default, alias = "imagem_nome")]
    pub image_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeImageRequest {
    pub image_base64: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeImageResponse {
    pub username: String,
    pub analysis: String,
}

fn parse_optional_timestamp(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<DateTime<FixedOffset>>, AppError> {
    raw.map(|value| {
        parse_timestamp(value).ok_or_else(|| {
            AppError::InvalidRequest(format!("{} is not an ISO-8601 timestamp: {}", field, value))
        })
    })
    .transpose()
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router, mounted under `/api`
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/user/signup", post(signup))
        .route("/user/login", post(login));

    let protected = Router::new()
        .route(
            "/user/me",
            get(get_profile).patch(update_profile).put(update_profile),
        )
        .route("/user/logout", post(logout))
        .route("/weight-logs", get(list_weight_logs).post(append_weight_log))
        .route("/dashboard/metrics", get(dashboard_metrics))
        .route("/chat-history", get(get_chat_history))
        .route("/chat-history/save", post(save_chat_message))
        .route("/meal/save", post(save_meal))
        .route("/meal/history", get(get_meal_history))
        .route("/image/analyze", post(analyze_image))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Layers run outermost-last: context is attached before logging reads it
    Router::new()
        .nest("/api", public.merge(protected))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(context_middleware))
        .with_state(state)
}

// =========================================================================
// POST /user/signup
// =========================================================================

async fn signup(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let handler = CreateAccountHandler::new(state.accounts.clone(), state.hasher);

    let command = CreateAccountCommand::new(request.username, request.password).with_profile(
        ProfileSeed {
            display_name: request.display_name,
            objective: request.objective,
            height_cm: request.height_cm,
            initial_weight: request.initial_weight,
        },
    );

    handler.execute(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            msg: "User created successfully".to_string(),
        }),
    ))
}

// =========================================================================
// POST /user/login
// =========================================================================

async fn login(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let handler = LoginHandler::new(state.accounts.clone(), state.hasher, state.sessions.clone());

    let issued = handler
        .execute(LoginCommand::new(request.username, request.password), &context)
        .await?;

    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "bearer".to_string(),
        expires_at: issued.expires_at,
    }))
}

// =========================================================================
// POST /user/logout
// =========================================================================

async fn logout(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<StatusCode, AppError> {
    state.sessions.revoke(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// GET, PATCH, PUT /user/me
// =========================================================================

async fn get_profile(
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> Json<AccountProfile> {
    Json(account.profile())
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Extension(context): Extension<OperationContext>,
    Json(changes): Json<ProfileChanges>,
) -> Result<Json<AccountProfile>, AppError> {
    let handler = UpdateProfileHandler::new(state.accounts.clone());

    let profile = handler
        .execute(
            UpdateProfileCommand::new(account.username().to_string(), changes),
            &context,
        )
        .await?;

    Ok(Json(profile))
}

// =========================================================================
// GET, POST /weight-logs
// =========================================================================

async fn append_weight_log(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<WeightLogRequest>,
) -> Result<(StatusCode, Json<WeightLogEntry>), AppError> {
    let recorded_at = parse_optional_timestamp(request.recorded_at.as_deref(), "recorded_at")?;

    let mut command = AppendWeightLogCommand::new(account.username().to_string(), request.weight);
    if let Some(recorded_at) = recorded_at {
        command = command.recorded_at(recorded_at);
    }

    let entry = JournalHandler::new(state.accounts.clone())
        .append_weight_log(command, &context)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

async fn list_weight_logs(
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<DatedWeight>>, AppError> {
    let period = Period::parse(query.period.as_deref())?;
    Ok(Json(metrics::chronological(
        account.weight_logs(),
        period,
        Utc::now(),
    )))
}

// =========================================================================
// GET /dashboard/metrics
// =========================================================================

async fn dashboard_metrics(
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<DashboardReport>, AppError> {
    let period = Period::parse(query.period.as_deref())?;
    tracing::debug!(username = %account.username(), period = ?period, "Building dashboard");
    Ok(Json(metrics::dashboard(&account, period, Utc::now())))
}

// =========================================================================
// Chat history
// =========================================================================

async fn get_chat_history(
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> Json<Vec<ChatEntry>> {
    Json(account.chat_history().to_vec())
}

async fn save_chat_message(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<ChatMessageRequest>,
) -> Result<(StatusCode, Json<ChatEntry>), AppError> {
    let created_at = parse_optional_timestamp(request.created_at.as_deref(), "created_at")?;

    let mut command =
        AppendChatMessageCommand::new(account.username().to_string(), request.role, request.text);
    command.kind = request.kind;
    command.image_url = request.image_url;
    command.created_at = created_at.map(|at| at.with_timezone(&Utc));

    let entry = JournalHandler::new(state.accounts.clone())
        .append_chat_message(command, &context)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// =========================================================================
// Meals
// =========================================================================

async fn save_meal(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<MealRequest>,
) -> Result<(StatusCode, Json<MealEntry>), AppError> {
    let mut command = AppendMealCommand::new(account.username().to_string(), request.analysis_text);
    if let Some(image_name) = request.image_name {
        command = command.with_image_name(image_name);
    }

    let entry = JournalHandler::new(state.accounts.clone())
        .append_meal(command, &context)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

async fn get_meal_history(
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> Json<Vec<MealEntry>> {
    Json(account.meals().to_vec())
}

// =========================================================================
// POST /image/analyze
// =========================================================================

async fn analyze_image(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Json(request): Json<AnalyzeImageRequest>,
) -> Result<Json<AnalyzeImageResponse>, AppError> {
    if request.image_base64.trim().is_empty() {
        return Err(AppError::InvalidRequest("image_base64 must not be empty".to_string()));
    }

    let image = MealImage::new(request.image_base64, request.content_type);
    let analysis = state.analyzer.analyze(&image).await?;

    Ok(Json(AnalyzeImageResponse {
        username: account.username().to_string(),
        analysis,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_accepts_legacy_names() {
        let json = r#"{
            "username": "alice",
            "password": "secret1",
            "nome": "Alice",
            "objetivo": "lose weight",
            "height_cm": 175
        }"#;

        let request: SignupRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.display_name.as_deref(), Some("Alice"));
        assert_eq!(request.objective.as_deref(), Some("lose weight"));
        assert_eq!(request.height_cm, Some(175.0));
        assert!(request.initial_weight.is_none());
    }

    #[test]
    fn test_meal_request_deserialize() {
        let request: MealRequest =
            serde_json::from_str(r#"{"analise": "rice and beans", "imagem_nome": "lunch.jpg"}"#)
                .unwrap();
        assert_eq!(request.analysis_text, "rice and beans");
        assert_eq!(request.image_name.as_deref(), Some("lunch.jpg"));

        let request: MealRequest = serde_json::from_str(r#"{"analysis_text": "salad"}"#).unwrap();
        assert!(request.image_name.is_none());
    }

    #[test]
    fn test_chat_message_request_deserialize() {
        let json = r#"{"role": "bot", "text": "hi", "type": "image", "imageUrl": "blob:1"}"#;

        let request: ChatMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.role, ChatRole::Bot);
        assert_eq!(request.kind.as_deref(), Some("image"));
        assert_eq!(request.image_url.as_deref(), Some("blob:1"));
        assert!(request.created_at.is_none());
    }

    #[test]
    fn test_period_query_defaults() {
        let query: PeriodQuery = serde_json::from_str("{}").unwrap();
        assert!(query.period.is_none());
    }

    #[test]
    fn test_parse_optional_timestamp() {
        assert!(parse_optional_timestamp(None, "recorded_at").unwrap().is_none());
        assert!(parse_optional_timestamp(Some("2024-01-03"), "recorded_at")
            .unwrap()
            .is_some());
        assert!(matches!(
            parse_optional_timestamp(Some("soon"), "recorded_at"),
            Err(AppError::InvalidRequest(_))
        ));
    }
}
