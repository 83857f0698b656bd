// src/tasking.rs

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{error, info};
use mongodb::bson::Document;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth;
use crate::models::{Tasking, PROGRESS_ASSIGNED, TASK_HOUR_OPTIONS};
use crate::store;

/// One submission may assign the same description, hours and due date to
/// several employees at once.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskingRequest {
    pub employee_ids: Vec<String>,
    pub task_description: String,
    pub task_hours: i64,
    pub date_due: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskingRequest {
    pub task_progress: String,
}

fn validate_create(payload: &CreateTaskingRequest) -> Result<(), &'static str> {
    if payload.employee_ids.is_empty() || payload.task_description.trim().is_empty() {
        return Err(
            "Please select employees, task hours, provide a task description, and set a due date",
        );
    }
    if payload.employee_ids.iter().any(|id| id.trim().is_empty()) {
        return Err("Invalid employee IDs provided");
    }
    if !TASK_HOUR_OPTIONS.contains(&payload.task_hours) {
        return Err("Task hours must be one of 1, 2, 4, 8, 16, 24, 48 or 96");
    }
    Ok(())
}

/// One tasking record per selected employee, sharing the submission's fields
/// and timestamp but carrying distinct identifiers.
fn expand_assignments(payload: &CreateTaskingRequest) -> Vec<Tasking> {
    let date_tasked = Utc::now();
    payload
        .employee_ids
        .iter()
        .map(|employee_id| Tasking {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.clone(),
            task_description: payload.task_description.clone(),
            task_hours: payload.task_hours,
            date_tasked,
            date_due: Some(payload.date_due),
            task_progress: PROGRESS_ASSIGNED.to_string(),
        })
        .collect()
}

/// GET /taskings
pub async fn list_taskings(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    if auth::current_user(&req).is_none() {
        return HttpResponse::Unauthorized().body("Unauthorized");
    }

    match data.mongodb.list::<Tasking>(store::TASKINGS).await {
        Ok(taskings) => HttpResponse::Ok().json(taskings),
        Err(e) => {
            error!("Error fetching taskings: {}", e);
            HttpResponse::InternalServerError().body("Error fetching taskings")
        }
    }
}

/// POST /taskings
///
/// The per-employee writes are issued concurrently and awaited together.
/// There is no atomicity across them: on partial failure the records that did
/// land stay in the store and the submission reports an error.
pub async fn create_taskings(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<CreateTaskingRequest>,
) -> impl Responder {
    if auth::current_user(&req).is_none() {
        return HttpResponse::Unauthorized().body("Unauthorized");
    }

    if let Err(msg) = validate_create(&payload) {
        return HttpResponse::BadRequest().body(msg);
    }

    let new_taskings = expand_assignments(&payload);
    let coll = data.mongodb.collection::<Tasking>(store::TASKINGS);
    let results = join_all(new_taskings.iter().map(|tasking| {
        let coll = coll.clone();
        async move { coll.insert_one(tasking).await }
    }))
    .await;

    let mut failures = 0;
    for result in &results {
        if let Err(e) = result {
            error!("Error creating tasking: {}", e);
            failures += 1;
        }
    }
    if failures > 0 {
        return HttpResponse::InternalServerError().body("Error creating taskings");
    }

    info!(
        "Created {} tasking(s): {}",
        new_taskings.len(),
        payload.task_description
    );
    HttpResponse::Ok().json(new_taskings)
}

/// PUT /taskings/{id}
///
/// Progress transition, e.g. marking a tasking completed so it drops out of
/// totals and the calendar.
pub async fn update_tasking(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskingRequest>,
) -> impl Responder {
    if auth::current_user(&req).is_none() {
        return HttpResponse::Unauthorized().body("Unauthorized");
    }

    let id = path.into_inner();
    if payload.task_progress.trim().is_empty() {
        return HttpResponse::BadRequest().body("No fields to update");
    }

    let mut update_doc = Document::new();
    update_doc.insert("taskProgress", &payload.task_progress);

    match data.mongodb.update(store::TASKINGS, &id, update_doc).await {
        Ok(true) => HttpResponse::Ok().body("Tasking updated successfully"),
        Ok(false) => HttpResponse::NotFound().body("Tasking not found"),
        Err(e) => {
            error!("Error updating tasking {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error updating tasking")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(employee_ids: &[&str], hours: i64) -> CreateTaskingRequest {
        CreateTaskingRequest {
            employee_ids: employee_ids.iter().map(|id| id.to_string()).collect(),
            task_description: "Audit".to_string(),
            task_hours: hours,
            date_due: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn rejects_empty_selection_and_description() {
        assert!(validate_create(&request(&[], 8)).is_err());

        let mut blank_description = request(&["e1"], 8);
        blank_description.task_description = " ".to_string();
        assert!(validate_create(&blank_description).is_err());
    }

    #[test]
    fn rejects_hours_outside_the_fixed_set() {
        assert!(validate_create(&request(&["e1"], 3)).is_err());
        assert!(validate_create(&request(&["e1"], 0)).is_err());
        for hours in TASK_HOUR_OPTIONS {
            assert!(validate_create(&request(&["e1"], hours)).is_ok());
        }
    }

    #[test]
    fn one_record_per_selected_employee() {
        let payload = request(&["e1", "e2"], 16);
        let taskings = expand_assignments(&payload);

        assert_eq!(taskings.len(), 2);
        assert_eq!(taskings[0].employee_id, "e1");
        assert_eq!(taskings[1].employee_id, "e2");
        assert_ne!(taskings[0].id, taskings[1].id);
        for t in &taskings {
            assert_eq!(t.task_description, "Audit");
            assert_eq!(t.task_hours, 16);
            assert_eq!(t.date_due, Some(payload.date_due));
            assert_eq!(t.task_progress, PROGRESS_ASSIGNED);
        }
    }
}
