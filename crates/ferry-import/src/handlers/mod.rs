//! HTTP handlers for importer operations

pub mod types;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ferry_core::problemdetails::Problem;
use ferry_core::{AccessToken, ImportRequest, ImportSource};
use ferry_import_types::{ImportedProject, ProjectImporter, RemoteProject, RemoteUser};
use std::sync::Arc;
use tracing::debug;
use utoipa::OpenApi;

use crate::auth::{AuthContext, RequireAuth};
use crate::services::{ImportServiceError, Submission};
use types::{
    AppState, AuthUrlResponse, AuthorizeRequest, AuthorizeResponse, ImportAcceptedResponse,
    ImportProjectRequest, ListProjectsRequest, ListUsersRequest,
};

/// Configure routes for the importer API
pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/importers/{source}/auth-url", get(auth_url))
        .route("/importers/{source}/authorize", post(authorize))
        .route("/importers/{source}/list-users", post(list_users))
        .route("/importers/{source}/list-projects", post(list_projects))
        .route("/importers/{source}/import-project", post(import_project))
}

fn importer_for(
    state: &AppState,
    source: ImportSource,
    auth: &AuthContext,
    token: Option<String>,
) -> Result<Box<dyn ProjectImporter>, ImportServiceError> {
    let provider = state
        .registry
        .provider(source)
        .map_err(|e| ImportServiceError::from_remote(source, e))?;
    let token = AccessToken::new(token.unwrap_or_default());
    Ok(provider.importer(&auth.user, &token))
}

/// Authorization URL for a source
#[utoipa::path(
    get,
    path = "/importers/{source}/auth-url",
    tag = "Importers",
    params(
        ("source" = ImportSource, Path, description = "External service")
    ),
    responses(
        (status = 200, description = "URL to start the OAuth flow", body = AuthUrlResponse),
        (status = 400, description = "Source not available"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []))
)]
async fn auth_url(
    RequireAuth(_auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(source): Path<ImportSource>,
) -> Result<impl IntoResponse, Problem> {
    let url = state
        .registry
        .provider(source)
        .and_then(|provider| provider.auth_url())
        .map_err(|e| ImportServiceError::from_remote(source, e))?;

    Ok(Json(AuthUrlResponse { url }))
}

/// Exchange an authorization code for an access token
#[utoipa::path(
    post,
    path = "/importers/{source}/authorize",
    tag = "Importers",
    params(
        ("source" = ImportSource, Path, description = "External service")
    ),
    request_body = AuthorizeRequest,
    responses(
        (status = 200, description = "Access token", body = AuthorizeResponse),
        (status = 400, description = "Missing or rejected code"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []))
)]
async fn authorize(
    RequireAuth(_auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(source): Path<ImportSource>,
    Json(request): Json<AuthorizeRequest>,
) -> Result<impl IntoResponse, Problem> {
    let code = request
        .code
        .filter(|code| !code.is_empty())
        .ok_or(ImportServiceError::MissingParameter("Code"))?;

    let provider = state
        .registry
        .provider(source)
        .map_err(|e| ImportServiceError::from_remote(source, e))?;
    let token = provider
        .access_token(&code)
        .await
        .map_err(|e| ImportServiceError::from_remote(source, e))?;

    Ok(Json(AuthorizeResponse {
        token: token.expose().to_string(),
    }))
}

/// Members of a remote project
#[utoipa::path(
    post,
    path = "/importers/{source}/list-users",
    tag = "Importers",
    params(
        ("source" = ImportSource, Path, description = "External service")
    ),
    request_body = ListUsersRequest,
    responses(
        (status = 200, description = "Remote users", body = Vec<RemoteUser>),
        (status = 400, description = "Missing project or remote error"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []))
)]
async fn list_users(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(source): Path<ImportSource>,
    Json(request): Json<ListUsersRequest>,
) -> Result<impl IntoResponse, Problem> {
    let project = request
        .project
        .ok_or(ImportServiceError::MissingParameter("Project"))?;

    let importer = importer_for(&state, source, &auth, request.token)?;
    let users = importer
        .list_users(&project)
        .await
        .map_err(|e| ImportServiceError::from_remote(source, e))?;

    Ok(Json(users))
}

/// Projects visible to the token
#[utoipa::path(
    post,
    path = "/importers/{source}/list-projects",
    tag = "Importers",
    params(
        ("source" = ImportSource, Path, description = "External service")
    ),
    request_body = ListProjectsRequest,
    responses(
        (status = 200, description = "Remote projects", body = Vec<RemoteProject>),
        (status = 400, description = "Remote error"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []))
)]
async fn list_projects(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(source): Path<ImportSource>,
    Json(request): Json<ListProjectsRequest>,
) -> Result<impl IntoResponse, Problem> {
    let importer = importer_for(&state, source, &auth, request.token)?;
    let projects = importer
        .list_projects()
        .await
        .map_err(|e| ImportServiceError::from_remote(source, e))?;

    Ok(Json(projects))
}

/// Import a remote project for the authenticated user
///
/// Answers 202 with the job id when imports are queued, or 200 with the
/// created project when they run inline. Either way the user also gets an
/// email with the outcome.
#[utoipa::path(
    post,
    path = "/importers/{source}/import-project",
    tag = "Importers",
    params(
        ("source" = ImportSource, Path, description = "External service")
    ),
    request_body = ImportProjectRequest,
    responses(
        (status = 200, description = "Project imported", body = ImportedProject),
        (status = 202, description = "Import queued", body = ImportAcceptedResponse),
        (status = 400, description = "Missing project or import failed"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Import could not be queued"),
    ),
    security(("bearer_auth" = []))
)]
async fn import_project(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(source): Path<ImportSource>,
    Json(request): Json<ImportProjectRequest>,
) -> Result<Response, Problem> {
    let project = request
        .project
        .ok_or(ImportServiceError::MissingParameter("Project"))?;

    let import_request = ImportRequest {
        source,
        requesting_user: auth.user,
        access_token: AccessToken::new(request.token.unwrap_or_default()),
        external_project_id: project,
        options: request.options,
    };

    let submission = state
        .executor
        .submit(import_request)
        .await
        .map_err(ImportServiceError::from)?;

    match submission {
        Submission::Enqueued { job_id } => {
            debug!(job_id = %job_id, "Import accepted for background processing");
            Ok((
                StatusCode::ACCEPTED,
                Json(ImportAcceptedResponse {
                    import_id: job_id,
                    source,
                }),
            )
                .into_response())
        }
        Submission::Completed(outcome) => {
            let success = outcome.into_result().map_err(ImportServiceError::from)?;
            Ok(Json(success.local_project).into_response())
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(auth_url, authorize, list_users, list_projects, import_project),
    components(schemas(
        ImportSource,
        ImportedProject,
        RemoteUser,
        RemoteProject,
        ferry_core::UserRef,
        ferry_core::ImportOptions,
        types::AuthUrlResponse,
        types::AuthorizeRequest,
        types::AuthorizeResponse,
        types::ListUsersRequest,
        types::ListProjectsRequest,
        types::ImportProjectRequest,
        types::ImportAcceptedResponse,
    )),
    tags(
        (name = "Importers", description = "Import projects from external services")
    )
)]
pub struct ImportApiDoc;
