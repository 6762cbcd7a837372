//! Route table and handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use gepn_auth::{
    AuthError, CitizenRegistrationRequest, CreateAdminRequest, ModuleInfo,
    OfficerRegistrationRequest, SetActiveRequest, UpdatePermissionsRequest,
    flow::{
        AdminLogin, AdminLoginRequest, AdminLoginResponse, CitizenAuthResponse, CitizenLogin,
        CitizenLoginRequest, OfficerLogin, OfficerLoginRequest, OfficerLoginResponse, PatrolLogin,
        PatrolLoginRequest, PatrolLoginResponse,
    },
    modules,
};
use gepn_primitives::{
    AdminProfile, CapabilitySet, Identity, IdentityId, IdentityKind, IdentityProfile,
    OfficerProfile,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{ApiError, AppState, Authenticated, AuthenticatedAdmin, JsonBody, health::health};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Builds the API router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        // officers
        .route("/api/policial/login", post(officer_login))
        .route("/api/policial/finalizar-guardia", post(finalize_duty))
        .route("/api/patrullaje/login", post(patrol_login))
        // administrators
        .route("/api/master/login", post(admin_login))
        .route("/api/master/verificar", get(admin_verify))
        .route("/api/master/usuarios", get(list_admins).post(create_admin))
        .route("/api/master/usuarios/{id}/permisos", put(update_permissions))
        .route("/api/master/usuarios/{id}/estado", put(set_admin_active))
        .route("/api/master/modulos", get(list_modules))
        .route("/api/rrhh/oficiales", post(register_officer))
        // citizens
        .route("/api/ciudadano/registro", post(register_citizen))
        .route("/api/ciudadano/login", post(citizen_login))
        // any session
        .route("/api/sesion", get(session_info))
        .route("/api/sesion/cerrar", post(end_session))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    success: bool,
    mensaje: &'static str,
}

impl MessageResponse {
    const fn ok(mensaje: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            mensaje,
        })
    }
}

fn parse_id(raw: &str) -> Result<IdentityId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::from(AuthError::malformed("Identificador inválido")))
}

async fn officer_login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<OfficerLoginRequest>,
) -> ApiResult<OfficerLoginResponse> {
    Ok(Json(state.auth.login(&OfficerLogin, request).await?))
}

async fn finalize_duty(
    State(state): State<AppState>,
    Authenticated(session): Authenticated,
) -> ApiResult<MessageResponse> {
    state.auth.finalize_duty(&session).await?;
    Ok(MessageResponse::ok("Guardia finalizada correctamente"))
}

async fn patrol_login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<PatrolLoginRequest>,
) -> ApiResult<PatrolLoginResponse> {
    Ok(Json(state.auth.login(&PatrolLogin, request).await?))
}

async fn admin_login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AdminLoginRequest>,
) -> ApiResult<AdminLoginResponse> {
    Ok(Json(state.auth.login(&AdminLogin, request).await?))
}

#[derive(Debug, Serialize)]
struct AdminVerifyResponse {
    success: bool,
    /// Absent in degraded mode.
    master: Option<AdminProfile>,
    permisos: CapabilitySet,
    degradado: bool,
}

async fn admin_verify(AuthenticatedAdmin(session): AuthenticatedAdmin) -> ApiResult<AdminVerifyResponse> {
    let master = match &session.identity {
        Some(Identity::Administrator(record)) => Some(AdminProfile::from(record)),
        _ => None,
    };
    Ok(Json(AdminVerifyResponse {
        success: true,
        master,
        permisos: session.principal.permissions,
        degradado: session.degraded,
    }))
}

async fn list_admins(
    State(state): State<AppState>,
    AuthenticatedAdmin(session): AuthenticatedAdmin,
) -> ApiResult<Vec<AdminProfile>> {
    Ok(Json(state.auth.list_admins(&session).await?))
}

#[derive(Debug, Serialize)]
struct AdminCreatedResponse {
    success: bool,
    mensaje: &'static str,
    master: AdminProfile,
}

async fn create_admin(
    State(state): State<AppState>,
    AuthenticatedAdmin(session): AuthenticatedAdmin,
    JsonBody(request): JsonBody<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminCreatedResponse>), ApiError> {
    let master = state.auth.create_admin(&session, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(AdminCreatedResponse {
            success: true,
            mensaje: "Usuario master creado correctamente",
            master,
        }),
    ))
}

async fn update_permissions(
    State(state): State<AppState>,
    AuthenticatedAdmin(session): AuthenticatedAdmin,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdatePermissionsRequest>,
) -> ApiResult<AdminProfile> {
    let id = parse_id(&id)?;
    Ok(Json(state.auth.update_permissions(&session, id, request).await?))
}

async fn set_admin_active(
    State(state): State<AppState>,
    AuthenticatedAdmin(session): AuthenticatedAdmin,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<SetActiveRequest>,
) -> ApiResult<AdminProfile> {
    let id = parse_id(&id)?;
    Ok(Json(state.auth.set_admin_active(&session, id, request).await?))
}

async fn list_modules(AuthenticatedAdmin(_): AuthenticatedAdmin) -> Json<Vec<ModuleInfo>> {
    Json(modules())
}

#[derive(Debug, Serialize)]
struct OfficerCreatedResponse {
    success: bool,
    mensaje: &'static str,
    funcionario: OfficerProfile,
}

async fn register_officer(
    State(state): State<AppState>,
    AuthenticatedAdmin(session): AuthenticatedAdmin,
    JsonBody(request): JsonBody<OfficerRegistrationRequest>,
) -> Result<(StatusCode, Json<OfficerCreatedResponse>), ApiError> {
    let funcionario = state.auth.register_officer(&session, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(OfficerCreatedResponse {
            success: true,
            mensaje: "Funcionario registrado correctamente",
            funcionario,
        }),
    ))
}

async fn register_citizen(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CitizenRegistrationRequest>,
) -> Result<(StatusCode, Json<CitizenAuthResponse>), ApiError> {
    let response = state.auth.register_citizen(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn citizen_login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CitizenLoginRequest>,
) -> ApiResult<CitizenAuthResponse> {
    Ok(Json(state.auth.login(&CitizenLogin, request).await?))
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    tipo: IdentityKind,
    /// Absent in degraded mode.
    identidad: Option<IdentityProfile>,
    expira: DateTime<Utc>,
    degradado: bool,
}

async fn session_info(Authenticated(session): Authenticated) -> ApiResult<SessionResponse> {
    Ok(Json(SessionResponse {
        tipo: session.kind(),
        identidad: session.identity.as_ref().map(IdentityProfile::from),
        expira: session.expires_at,
        degradado: session.degraded,
    }))
}

async fn end_session(
    State(state): State<AppState>,
    Authenticated(session): Authenticated,
) -> Json<MessageResponse> {
    state.auth.logout(&session);
    MessageResponse::ok("Sesión finalizada")
}
