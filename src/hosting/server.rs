use super::*;
use crate::API_VERSION;
use crate::ApiError;
use crate::NAME_MAX;
use crate::NAME_MIN;
use crate::client::ClientInfo;
use crate::hub::Core;
use crate::records::Library;
use crate::transport::Grant;
use crate::transport::Profile;
use crate::transport::Sessions;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct Credentials {
    name: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SocketQuery {
    token: String,
}

/// Everything a request handler needs.
pub struct Hosting {
    core: Arc<Core>,
    sessions: Arc<Sessions>,
    library: Library,
}

pub struct Server;

impl Server {
    pub async fn run(core: Arc<Core>, sessions: Arc<Sessions>) -> Result<(), std::io::Error> {
        let bind = core.config().bind.clone();
        let library = Library::new(core.storage().clone(), core.catalogue().clone());
        let state = web::Data::new(Hosting {
            core,
            sessions,
            library,
        });
        log::info!("starting hosting server on {}", bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(state.clone())
                .route("/v1/users", web::post().to(register))
                .route("/v1/login", web::post().to(login))
                .route("/v1/logout", web::post().to(logout))
                .route("/v1/profile", web::get().to(profile))
                .route("/socket", web::get().to(socket))
        })
        .workers(4)
        .bind(bind)?
        .run()
        .await
    }
}

fn refuse(error: ApiError) -> HttpResponse {
    let body = serde_json::json!({ "error": error.code(), "detail": error.to_string() });
    match error {
        ApiError::Validation { .. } => HttpResponse::BadRequest().json(body),
        ApiError::Storage(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::Unauthorized().json(body),
    }
}

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn register(state: web::Data<Hosting>, body: web::Json<Credentials>) -> impl Responder {
    let Credentials { name, password } = body.into_inner();
    let name = name.trim();
    if !(NAME_MIN..=NAME_MAX).contains(&name.chars().count()) {
        return refuse(ApiError::param("name"));
    }
    if password.is_empty() {
        return refuse(ApiError::param("password"));
    }
    let storage = state.core.storage();
    match storage.find_user_by_name(name).await {
        Ok(Some(_)) => return refuse(ApiError::param("name")),
        Ok(None) => {}
        Err(e) => return refuse(e.into()),
    }
    match storage.create_user(name, Some(&password)).await {
        Ok(user) => HttpResponse::Ok().json(Profile {
            id: user.id,
            name: user.name,
        }),
        Err(e) => refuse(e.into()),
    }
}

async fn login(state: web::Data<Hosting>, body: web::Json<Credentials>) -> impl Responder {
    let Credentials { name, password } = body.into_inner();
    match state.core.storage().verify_password(&name, &password).await {
        Ok(Some(user)) => HttpResponse::Ok().json(Grant {
            token: state.sessions.issue(user.id).await,
            api_version: API_VERSION,
        }),
        Ok(None) => refuse(ApiError::Unauthorized),
        Err(e) => refuse(e.into()),
    }
}

async fn logout(state: web::Data<Hosting>, req: HttpRequest) -> impl Responder {
    match bearer(&req) {
        Some(token) if state.sessions.revoke(token).await => {
            HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
        }
        _ => refuse(ApiError::Unauthorized),
    }
}

async fn profile(state: web::Data<Hosting>, req: HttpRequest) -> impl Responder {
    match authenticate(&state, bearer(&req)).await {
        Ok(info) => HttpResponse::Ok().json(Profile {
            id: info.id,
            name: info.name,
        }),
        Err(e) => refuse(e),
    }
}

async fn socket(
    state: web::Data<Hosting>,
    query: web::Query<SocketQuery>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let info = match authenticate(&state, Some(&query.token)).await {
        Ok(info) => info,
        Err(e) => return refuse(e),
    };
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            bridge(
                state.core.clone(),
                state.library.clone(),
                info,
                session,
                stream,
            );
            response
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

async fn authenticate(state: &Hosting, token: Option<&str>) -> Result<ClientInfo, ApiError> {
    let id = match token {
        Some(token) => state.sessions.resolve(token).await,
        None => None,
    }
    .ok_or(ApiError::Unauthorized)?;
    state
        .core
        .storage()
        .find_user(id)
        .await?
        .map(|u| ClientInfo {
            id: u.id,
            name: u.name,
        })
        .ok_or(ApiError::ProfileInvalid)
}
