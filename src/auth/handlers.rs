use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{error, info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, ProfileEditRequest, ProfileResponse, RegisterRequest, TokenResponse},
        jwt::{AuthUser, JwtKeys},
        repo_types::User,
        services::Avatar,
    },
    error::{ServiceError, ServiceResult},
    extract::JsonBody,
    state::AppState,
    storage::ext_from_mime,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(profile))
        .route(
            "/auth/edit",
            put(edit_profile).layer(DefaultBodyLimit::max(5 * 1024 * 1024)), // 5MB
        )
}

fn issue_token(state: &AppState, user: &User) -> ServiceResult<Json<TokenResponse>> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign(user).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ServiceError::Dependency(e.context("sign access token"))
    })?;
    Ok(Json(TokenResponse { access_token }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ServiceResult<Json<TokenResponse>> {
    let new_user = payload.into_valid()?;
    let user = state.auth.register(new_user).await?;
    issue_token(&state, &user)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ServiceResult<Json<TokenResponse>> {
    let payload = payload.into_valid()?;
    let user = state.auth.login(&payload.email, &payload.password).await?;
    issue_token(&state, &user)
}

#[instrument(skip(state, auth), fields(user_id = %auth.user_id()))]
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> ServiceResult<StatusCode> {
    state.auth.logout(&auth.token).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state, auth), fields(user_id = %auth.user_id()))]
pub async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ServiceResult<Json<ProfileResponse>> {
    let user = state.auth.profile(auth.user_id()).await?;
    Ok(Json(user.into()))
}

fn is_valid_image_name(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    [".jpg", ".jpeg", ".png"].iter().any(|ext| lower.ends_with(ext))
}

/// PUT /auth/edit (multipart)
/// Text parts: first_name, last_name, country_code, phone_number. Optional file part: avatar.
#[instrument(skip(state, auth, mp), fields(user_id = %auth.user_id()))]
pub async fn edit_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    mut mp: Multipart,
) -> ServiceResult<StatusCode> {
    let mut request = ProfileEditRequest::default();
    let mut avatar = None;

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ServiceError::validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "avatar" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            if !is_valid_image_name(&filename) || ext_from_mime(&content_type).is_none() {
                return Err(ServiceError::validation("Invalid file format."));
            }
            let body = field
                .bytes()
                .await
                .map_err(|e| ServiceError::validation(e.body_text()))?;
            avatar = Some(Avatar { body, content_type });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ServiceError::validation(e.body_text()))?;
            request.set(&name, value);
        }
    }

    let edit = request.into_valid()?;
    state.auth.edit_profile(auth.user_id(), edit, avatar).await?;
    info!("profile edited");
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{read_json, test_app};
    use axum::{body::Body, http::Request};
    use serde_json::json;
    use tower::ServiceExt;

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn register_body(email: &str) -> serde_json::Value {
        json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "country_code": "+90",
            "phone_number": "5551234567",
            "email": email,
            "password": "Engine42x"
        })
    }

    #[test]
    fn image_names() {
        assert!(is_valid_image_name("me.PNG"));
        assert!(is_valid_image_name("me.jpeg"));
        assert!(!is_valid_image_name("me.gif"));
        assert!(!is_valid_image_name(""));
    }

    #[tokio::test]
    async fn register_login_profile_logout_flow() {
        let (app, _) = test_app();

        let res = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/auth/register", register_body("ada@example.com")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                json!({ "email": "ada@example.com", "password": "Engine42x" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let token: TokenResponse = serde_json::from_value(read_json(res).await).unwrap();

        let authed = |method: &str, uri: &str| {
            Request::builder()
                .method(method)
                .uri(uri)
                .header("authorization", format!("Bearer {}", token.access_token))
                .body(Body::empty())
                .unwrap()
        };

        let res = app.clone().oneshot(authed("GET", "/api/v1/auth/profile")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = read_json(res).await;
        assert_eq!(body["email"], "ada@example.com");
        assert!(body.get("password_hash").is_none());

        let res = app.clone().oneshot(authed("POST", "/api/v1/auth/logout")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.clone().oneshot(authed("GET", "/api/v1/auth/profile")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(read_json(res).await["error"][0], "Token is blacklisted");
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let (app, _) = test_app();
        for expected in [StatusCode::OK, StatusCode::CONFLICT] {
            let res = app
                .clone()
                .oneshot(json_request("POST", "/api/v1/auth/register", register_body("ada@example.com")))
                .await
                .unwrap();
            assert_eq!(res.status(), expected);
        }
    }

    #[tokio::test]
    async fn invalid_registration_lists_errors() {
        let (app, _) = test_app();
        let mut body = register_body("not-an-email");
        body["password"] = json!("short");
        let res = app
            .oneshot(json_request("POST", "/api/v1/auth/register", body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let errors = read_json(res).await["error"].as_array().unwrap().len();
        assert_eq!(errors, 2);
    }

    #[tokio::test]
    async fn incomplete_registration_body_uses_error_envelope() {
        let (app, deps) = test_app();
        let res = app
            .oneshot(json_request("POST", "/api/v1/auth/register", json!({ "email": "a@b.co" })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.headers()["content-type"], "application/json");
        let body = read_json(res).await;
        let errors = body["error"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].as_str().unwrap().contains("first_name"));
        assert_eq!(deps.users.create_calls(), 0);
    }

    #[tokio::test]
    async fn malformed_login_json_uses_error_envelope() {
        let (app, _) = test_app();
        let res = app
            .oneshot(
                Request::post("/api/v1/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"email\":"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(read_json(res).await["error"][0].is_string());
    }

    #[tokio::test]
    async fn profile_requires_bearer_token() {
        let (app, _) = test_app();
        let res = app
            .clone()
            .oneshot(Request::get("/api/v1/auth/profile").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app
            .oneshot(
                Request::get("/api/v1/auth/profile")
                    .header("authorization", "Bearer garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(read_json(res).await["error"][0], "Invalid token");
    }
}
