// src/web_socket_server.rs

use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::warn;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{self, AuthenticatedUser};
use crate::chat_server::{ChatServer, Connect, Disconnect, FeedSnapshot, PostMessage};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct IncomingMessage {
    message: String,
}

#[derive(Deserialize)]
pub struct WsQuery {
    /// Browsers cannot set headers on websocket upgrades, so the bearer token
    /// may arrive as a query parameter instead.
    pub token: Option<String>,
}

/// One websocket subscription to the chat feed. Registers with the chat
/// server on start and always deregisters on teardown.
pub struct WebSocketConnection {
    session_id: String,
    user: AuthenticatedUser,
    hb: Instant,
    addr: Addr<ChatServer>,
}

impl WebSocketConnection {
    pub fn new(user: AuthenticatedUser, addr: Addr<ChatServer>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            user,
            hb: Instant::now(),
            addr,
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                warn!("WebSocket client heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WebSocketConnection {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);
        self.addr.do_send(Connect {
            session_id: self.session_id.clone(),
            addr: ctx.address().recipient(),
        });
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        self.addr.do_send(Disconnect {
            session_id: self.session_id.clone(),
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WebSocketConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<IncomingMessage>(&text) {
                Ok(incoming) => {
                    if incoming.message.trim().is_empty() {
                        return;
                    }
                    self.addr.do_send(PostMessage {
                        email: self.user.email.clone(),
                        message: incoming.message,
                    });
                }
                Err(e) => {
                    warn!("Failed to parse websocket message: {}", e);
                }
            },
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                warn!("WebSocket error: {}", e);
                ctx.stop();
            }
            _ => {}
        }
    }
}

impl Handler<FeedSnapshot> for WebSocketConnection {
    type Result = ();

    fn handle(&mut self, msg: FeedSnapshot, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.text(msg.0);
    }
}

/// GET /ws
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let user = match auth::current_user(&req) {
        Some(user) => user,
        None => {
            let token = query.token.clone().unwrap_or_default();
            match auth::validate_jwt(&token, &data.config.jwt_secret) {
                Ok(claims) => AuthenticatedUser {
                    user_id: claims.sub,
                    email: claims.email,
                },
                Err(_) => return Err(actix_web::error::ErrorUnauthorized("Unauthorized")),
            }
        }
    };

    ws::start(
        WebSocketConnection::new(user, data.chat_server.clone()),
        &req,
        stream,
    )
}
