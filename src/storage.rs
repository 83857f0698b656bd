// src/storage.rs
//
// Blob storage for employee images. Objects are keyed by their original
// filename under the employee_images/ prefix, so a same-named upload
// overwrites the previous object, matching the store's upsert semantics.

use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use log::{error, info};
use mongodb::bson::{doc, spec::BinarySubtype, Binary};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::auth;
use crate::store;

const IMAGE_PREFIX: &str = "employee_images";

/// One stored object, keyed by its path.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    #[serde(rename = "_id")]
    pub path: String,
    pub content_type: String,
    pub data: Binary,
    pub uploaded_at: DateTime<Utc>,
}

fn storage_key(file_name: &str) -> Option<String> {
    let file_name = file_name.trim();
    if file_name.is_empty() || file_name.contains('/') || file_name == "." || file_name == ".." {
        return None;
    }
    Some(format!("{}/{}", IMAGE_PREFIX, file_name))
}

fn download_url(public_base_url: &str, key: &str) -> String {
    format!("{}/storage/{}", public_base_url.trim_end_matches('/'), key)
}

/// PUT /storage/employee_images/{file_name}
///
/// Stores the raw request body and returns the public download reference the
/// employee record should carry.
pub async fn upload_employee_image(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    if auth::current_user(&req).is_none() {
        return HttpResponse::Unauthorized().body("Unauthorized");
    }

    let key = match storage_key(&path.into_inner()) {
        Some(key) => key,
        None => return HttpResponse::BadRequest().body("Invalid file name"),
    };
    if body.is_empty() {
        return HttpResponse::BadRequest().body("Empty upload");
    }

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let stored = StoredImage {
        path: key.clone(),
        content_type,
        data: Binary {
            subtype: BinarySubtype::Generic,
            bytes: body.to_vec(),
        },
        uploaded_at: Utc::now(),
    };

    let images = data.mongodb.collection::<StoredImage>(store::EMPLOYEE_IMAGES);
    match images
        .replace_one(doc! { "_id": &key }, &stored)
        .upsert(true)
        .await
    {
        Ok(_) => {
            info!("Stored image at {}", key);
            HttpResponse::Ok().json(serde_json::json!({
                "url": download_url(&data.config.public_base_url, &key),
            }))
        }
        Err(e) => {
            error!("Error storing image {}: {}", key, e);
            HttpResponse::InternalServerError().body("Error storing image")
        }
    }
}

/// GET /storage/employee_images/{file_name}
pub async fn get_employee_image(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let key = match storage_key(&path.into_inner()) {
        Some(key) => key,
        None => return HttpResponse::BadRequest().body("Invalid file name"),
    };

    let images = data.mongodb.collection::<StoredImage>(store::EMPLOYEE_IMAGES);
    match images.find_one(doc! { "_id": &key }).await {
        Ok(Some(image)) => HttpResponse::Ok()
            .content_type(image.content_type)
            .body(image.data.bytes),
        Ok(None) => HttpResponse::NotFound().body("Image not found"),
        Err(e) => {
            error!("Error fetching image {}: {}", key, e);
            HttpResponse::InternalServerError().body("Error fetching image")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_prefixed_with_the_image_folder() {
        assert_eq!(
            storage_key("photo.jpg").as_deref(),
            Some("employee_images/photo.jpg")
        );
    }

    #[test]
    fn same_file_name_maps_to_the_same_key() {
        assert_eq!(storage_key("photo.jpg"), storage_key("photo.jpg"));
    }

    #[test]
    fn rejects_traversal_and_empty_names() {
        assert!(storage_key("").is_none());
        assert!(storage_key("  ").is_none());
        assert!(storage_key("..").is_none());
        assert!(storage_key("a/b.jpg").is_none());
    }

    #[test]
    fn download_url_joins_cleanly() {
        assert_eq!(
            download_url("http://localhost:8080/", "employee_images/photo.jpg"),
            "http://localhost:8080/storage/employee_images/photo.jpg"
        );
    }
}
