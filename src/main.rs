// src/main.rs

mod aggregate;
mod app_state;
mod auth;
mod calendar;
mod chat;
mod chat_server;
mod config;
mod dashboard;
mod employee;
mod models;
mod posts;
mod storage;
mod store;
mod tasking;
mod web_socket_server;

use std::env;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http,
    middleware::Logger,
    web, App, Error, HttpMessage, HttpResponse, HttpServer,
};
use env_logger::Env;
use futures::future::{ok, Ready};

use crate::app_state::AppState;
use crate::auth::{login, session, signup, AuthenticatedUser};
use crate::chat::{get_messages, send_message};
use crate::dashboard::get_dashboard;
use crate::employee::{
    create_employee, get_employee, get_employees_overview, list_employees, update_employee,
};
use crate::posts::list_posts;
use crate::storage::{get_employee_image, upload_employee_image};
use crate::tasking::{create_taskings, list_taskings, update_tasking};
use crate::web_socket_server::ws_index;

#[derive(Debug)]
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = AuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddleware { service })
    }
}

pub struct AuthMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Extract "Bearer <token>" from the Authorization header if present
        if let Some(auth_header) = req.headers().get(http::header::AUTHORIZATION) {
            if let Ok(auth_str) = auth_header.to_str() {
                if auth_str.starts_with("Bearer ") {
                    let token = auth_str.trim_start_matches("Bearer ").trim().to_string();
                    match verify_token(&token) {
                        Ok(user) => {
                            req.extensions_mut().insert(user);
                        }
                        Err(e) => {
                            let (req_parts, _payload) = req.into_parts();
                            let resp = HttpResponse::Unauthorized()
                                .body(format!("Invalid token: {}", e))
                                .map_into_boxed_body();
                            let srv_resp = ServiceResponse::new(req_parts, resp);
                            return Box::pin(async move { Ok(srv_resp) });
                        }
                    }
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_boxed_body())
        })
    }
}

fn verify_token(token: &str) -> Result<AuthenticatedUser, String> {
    let secret = env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());
    match auth::validate_jwt(token, &secret) {
        Ok(claims) => Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
        }),
        Err(e) => Err(format!("Token decode error: {}", e)),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = config::Config::from_env();
    let mongodb = Arc::new(store::MongoDB::init(&config.mongo_uri, &config.database_name).await);
    let chat_server = chat_server::ChatServer::new(mongodb.clone()).start();

    let bind_addr = config.bind_addr.clone();
    let frontend_origin = config.frontend_origin.clone();

    println!("Server running at http://{}", bind_addr);
    println!("Allowed CORS Origin: {}", frontend_origin);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                http::header::CONTENT_TYPE,
                http::header::ACCEPT,
                http::header::AUTHORIZATION,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(Authentication)
            .app_data(web::Data::new(AppState {
                chat_server: chat_server.clone(),
                mongodb: mongodb.clone(),
                config: config.clone(),
            }))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(signup))
                    .route("/login", web::post().to(login))
                    .route("/session", web::get().to(session)),
            )
            // EMPLOYEES
            .service(
                web::scope("/employees")
                    .route("", web::get().to(list_employees))
                    .route("", web::post().to(create_employee))
                    .route("/overview", web::get().to(get_employees_overview))
                    .route("/{id}", web::get().to(get_employee))
                    .route("/{id}", web::put().to(update_employee)),
            )
            // TASKINGS
            .service(
                web::scope("/taskings")
                    .route("", web::get().to(list_taskings))
                    .route("", web::post().to(create_taskings))
                    .route("/{id}", web::put().to(update_tasking)),
            )
            // DASHBOARD
            .service(web::scope("/dashboard").route("", web::get().to(get_dashboard)))
            // MESSAGES
            .service(
                web::scope("/messages")
                    .route("", web::get().to(get_messages))
                    .route("", web::post().to(send_message)),
            )
            // POSTS (fetched, never interpreted)
            .service(web::scope("/posts").route("", web::get().to(list_posts)))
            // IMAGE STORAGE
            .service(
                web::scope("/storage").service(
                    web::resource("/employee_images/{file_name}")
                        .route(web::put().to(upload_employee_image))
                        .route(web::get().to(get_employee_image)),
                ),
            )
            // WEBSOCKET route for the live chat feed
            .service(web::resource("/ws").route(web::get().to(ws_index)))
    })
    .bind(bind_addr.as_str())?
    .run()
    .await
}
