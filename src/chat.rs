// src/chat.rs

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::error;
use mongodb::bson::doc;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::auth;
use crate::chat_server::Refresh;
use crate::models::ChatMessage;
use crate::store;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// GET /messages
///
/// The whole feed, oldest first.
pub async fn get_messages(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    if auth::current_user(&req).is_none() {
        return HttpResponse::Unauthorized().body("Unauthorized");
    }

    match data
        .mongodb
        .list_sorted::<ChatMessage>(store::MESSAGES, doc! { "timestamp": 1 })
        .await
    {
        Ok(messages) => HttpResponse::Ok().json(messages),
        Err(e) => {
            error!("Error fetching messages: {}", e);
            HttpResponse::InternalServerError().body("Error fetching messages")
        }
    }
}

/// POST /messages
///
/// Writes with a server-assigned timestamp, then nudges the chat server so
/// every live subscription gets a fresh snapshot. There is no optimistic
/// local insert; the sender's own view updates when the snapshot arrives.
pub async fn send_message(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<SendMessageRequest>,
) -> impl Responder {
    let user = match auth::current_user(&req) {
        Some(user) => user,
        None => return HttpResponse::Unauthorized().body("Unauthorized"),
    };
    if payload.message.trim().is_empty() {
        return HttpResponse::BadRequest().body("Message is empty");
    }

    let new_message = ChatMessage::new(user.email, payload.message.clone());
    match data.mongodb.create(store::MESSAGES, &new_message).await {
        Ok(_) => {
            data.chat_server.do_send(Refresh);
            HttpResponse::Ok().json(new_message)
        }
        Err(e) => {
            error!("Error sending message: {}", e);
            HttpResponse::InternalServerError().body("Error sending message")
        }
    }
}
