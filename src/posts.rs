// src/posts.rs

use actix_web::{web, HttpResponse, Responder};
use futures_util::StreamExt;
use log::error;
use mongodb::bson::{doc, Document};

use crate::app_state::AppState;
use crate::store;

/// GET /posts
///
/// Raw documents, passed through untouched. Nothing in the application
/// interprets them; the collection is fetched because clients do.
pub async fn list_posts(data: web::Data<AppState>) -> impl Responder {
    let posts_collection = data.mongodb.collection::<Document>(store::POSTS);
    let mut cursor = match posts_collection.find(doc! {}).await {
        Ok(cursor) => cursor,
        Err(e) => {
            error!("Error fetching posts: {}", e);
            return HttpResponse::InternalServerError().body("Error fetching posts");
        }
    };

    let mut posts = Vec::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(post) => posts.push(post),
            Err(e) => {
                error!("Error reading posts: {}", e);
                return HttpResponse::InternalServerError().body("Error reading posts");
            }
        }
    }
    HttpResponse::Ok().json(posts)
}
