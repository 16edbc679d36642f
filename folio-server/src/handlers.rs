use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::error::InternalError;
use actix_web::{web, HttpRequest, HttpResponse};
use folio::auth::SESSION_COOKIE;
use folio::{ContactForm, ErrorKind, FolioError, Language, SessionMarker};
use serde::Deserialize;

use crate::AppState;

const LANGUAGE_COOKIE: &str = "language";
const LANGUAGE_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 365;

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let body = serde_json::json!({ "message": format!("Invalid request body: {err}") });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    }))
    .service(
        web::scope("/api")
            // Content
            .route("/data", web::get().to(get_data))
            // Admin
            .route("/admin/login", web::post().to(login))
            .route("/admin/logout", web::post().to(logout))
            .route("/admin/user", web::get().to(current_user))
            .route("/admin/update", web::post().to(update_content))
            // Visitors
            .route("/visitor", web::get().to(visitor_count))
            .route("/visitor", web::post().to(visitor_increment))
            // Contact
            .route("/contact", web::post().to(contact))
            // Preferences
            .route("/language", web::get().to(get_language))
            .route("/language", web::post().to(set_language))
            .route("/ip-address", web::get().to(ip_address)),
    );
}

// ── Helpers ─────────────────────────────────────────────────────────

fn message(status: actix_web::http::StatusCode, text: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "message": text }))
}

/// Map an error to its response. `failure` is the body message for 500s.
fn err_response(e: FolioError, failure: &str) -> HttpResponse {
    use actix_web::http::StatusCode;

    let detail = match &e {
        FolioError::Validation(m) | FolioError::Auth(m) => m.clone(),
        other => other.to_string(),
    };
    match e.kind() {
        ErrorKind::Validation => message(StatusCode::BAD_REQUEST, &detail),
        ErrorKind::Auth => message(StatusCode::UNAUTHORIZED, &detail),
        ErrorKind::NotFound => message(StatusCode::NOT_FOUND, &detail),
        ErrorKind::ExternalService => {
            log::error!("External service error: {e}");
            message(StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
        ErrorKind::Storage | ErrorKind::Internal => {
            log::error!("Internal error: {e}");
            message(StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
    }
}

fn session_cookie(marker: &SessionMarker, secure: bool) -> Cookie<'static> {
    Cookie::build(marker.name, marker.value.clone())
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(marker.max_age_secs))
        .finish()
}

fn session_marker(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE).map(|c| c.value().to_string())
}

fn require_auth(state: &AppState, req: &HttpRequest) -> Result<(), HttpResponse> {
    state
        .gate
        .require(session_marker(req).as_deref())
        .map_err(|e| err_response(e, "Authentication required"))
}

// ── Content ─────────────────────────────────────────────────────────

async fn get_data(state: web::Data<AppState>) -> HttpResponse {
    match state.store.read().and_then(|db| db.redacted()) {
        Ok(v) => HttpResponse::Ok().json(v),
        Err(e) => err_response(e, "Failed to fetch data"),
    }
}

// ── Admin ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> HttpResponse {
    match state.gate.login(&state.store, &body.username, &body.password) {
        Ok(admin) => {
            let marker = state.gate.create_session();
            HttpResponse::Ok()
                .cookie(session_cookie(&marker, state.secure_cookies))
                .json(serde_json::json!({ "username": admin.username }))
        }
        Err(e) => err_response(e, "Internal server error"),
    }
}

async fn logout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(session_cookie(&SessionMarker::cleared(), state.secure_cookies))
        .json(serde_json::json!({ "message": "Logged out" }))
}

async fn current_user(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    if let Err(resp) = require_auth(&state, &req) {
        return resp;
    }
    match state.store.read() {
        Ok(db) => HttpResponse::Ok().json(serde_json::json!({ "username": db.admin.username })),
        Err(e) => err_response(e, "Internal server error"),
    }
}

/// The body is parsed only after the session check, so an anonymous caller
/// gets 401 whatever it sends.
async fn update_content(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    if let Err(resp) = require_auth(&state, &req) {
        return resp;
    }
    let partial: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return message(
                actix_web::http::StatusCode::BAD_REQUEST,
                &format!("Invalid request body: {e}"),
            )
        }
    };
    match state.store.merge(partial).and_then(|db| db.redacted()) {
        Ok(v) => HttpResponse::Ok().json(v),
        Err(e) => err_response(e, "Failed to update database"),
    }
}

// ── Visitors ────────────────────────────────────────────────────────

async fn visitor_count(state: web::Data<AppState>) -> HttpResponse {
    let count = state.store.visitors().count();
    HttpResponse::Ok().json(serde_json::json!({ "count": count }))
}

async fn visitor_increment(state: web::Data<AppState>) -> HttpResponse {
    match state.store.visitors().increment() {
        Ok(count) => HttpResponse::Ok().json(serde_json::json!({ "count": count })),
        Err(e) => err_response(e, "Failed to increment visitor count"),
    }
}

// ── Contact ─────────────────────────────────────────────────────────

async fn contact(state: web::Data<AppState>, body: web::Json<ContactForm>) -> HttpResponse {
    let form = body.into_inner();
    if let Err(e) = form.validate() {
        return err_response(e, "Failed to send message");
    }
    match state.mailer.send(&form).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "message": "Message sent successfully" })),
        Err(e) => err_response(e, "Failed to send message"),
    }
}

// ── Preferences ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LanguageRequest {
    #[serde(default)]
    language: String,
}

async fn get_language(req: HttpRequest) -> HttpResponse {
    let language = req
        .cookie(LANGUAGE_COOKIE)
        .and_then(|c| c.value().parse::<Language>().ok())
        .unwrap_or_default();
    HttpResponse::Ok().json(serde_json::json!({ "language": language }))
}

async fn set_language(
    state: web::Data<AppState>,
    body: web::Json<LanguageRequest>,
) -> HttpResponse {
    let language = match body.language.parse::<Language>() {
        Ok(language) => language,
        Err(e) => return err_response(e, "Failed to set language"),
    };
    let cookie = Cookie::build(LANGUAGE_COOKIE, language.as_str())
        .path("/")
        .http_only(true)
        .secure(state.secure_cookies)
        .max_age(Duration::seconds(LANGUAGE_MAX_AGE_SECS))
        .finish();
    HttpResponse::Ok()
        .cookie(cookie)
        .json(serde_json::json!({ "message": "Language set successfully" }))
}

async fn ip_address(req: HttpRequest) -> HttpResponse {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let ip = forwarded
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "Unknown".to_string());
    HttpResponse::Ok().json(serde_json::json!({ "ip": ip }))
}
