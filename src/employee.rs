// src/employee.rs

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use mongodb::bson::{to_bson, Document};
use serde::Deserialize;

use crate::aggregate::join_employees_with_tasks;
use crate::app_state::AppState;
use crate::auth;
use crate::models::{Employee, Tasking};
use crate::store;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub skills: String,
    /// Set when the client uploaded an image before submitting the record.
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub skills: Option<String>,
    /// A fresh upload replaces the stored reference; omitting the field keeps it.
    pub image_url: Option<String>,
    pub date_joined: Option<chrono::DateTime<chrono::Utc>>,
}

fn validate_create(payload: &CreateEmployeeRequest) -> Result<(), &'static str> {
    if payload.name.trim().is_empty() {
        return Err("Please provide an employee name");
    }
    if payload.skills.trim().is_empty() {
        return Err("Please provide the employee's skills");
    }
    Ok(())
}

/// GET /employees
pub async fn list_employees(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    if auth::current_user(&req).is_none() {
        return HttpResponse::Unauthorized().body("Unauthorized");
    }

    match data.mongodb.list::<Employee>(store::EMPLOYEES).await {
        Ok(employees) => HttpResponse::Ok().json(employees),
        Err(e) => {
            error!("Error fetching employees: {}", e);
            HttpResponse::InternalServerError().body("Error fetching employees")
        }
    }
}

/// GET /employees/overview
///
/// The roster joined with outstanding taskings, as the task-assignment view
/// consumes it.
pub async fn get_employees_overview(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    if auth::current_user(&req).is_none() {
        return HttpResponse::Unauthorized().body("Unauthorized");
    }

    let employees: Vec<Employee> = match data.mongodb.list(store::EMPLOYEES).await {
        Ok(employees) => employees,
        Err(e) => {
            error!("Error fetching employees: {}", e);
            return HttpResponse::InternalServerError().body("Error fetching employees");
        }
    };
    let taskings: Vec<Tasking> = match data.mongodb.list(store::TASKINGS).await {
        Ok(taskings) => taskings,
        Err(e) => {
            error!("Error fetching taskings: {}", e);
            return HttpResponse::InternalServerError().body("Error fetching taskings");
        }
    };
    HttpResponse::Ok().json(join_employees_with_tasks(&employees, &taskings))
}

/// GET /employees/{id}
pub async fn get_employee(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    if auth::current_user(&req).is_none() {
        return HttpResponse::Unauthorized().body("Unauthorized");
    }

    let id = path.into_inner();
    match data.mongodb.get::<Employee>(store::EMPLOYEES, &id).await {
        Ok(Some(employee)) => HttpResponse::Ok().json(employee),
        Ok(None) => HttpResponse::NotFound().body("Employee not found"),
        Err(e) => {
            error!("Error fetching employee {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error fetching employee")
        }
    }
}

/// POST /employees
pub async fn create_employee(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<CreateEmployeeRequest>,
) -> impl Responder {
    if auth::current_user(&req).is_none() {
        return HttpResponse::Unauthorized().body("Unauthorized");
    }

    if let Err(msg) = validate_create(&payload) {
        return HttpResponse::BadRequest().body(msg);
    }

    let payload = payload.into_inner();
    let image_url = payload.image_url.filter(|url| !url.trim().is_empty());
    let new_employee = Employee::new(payload.name.trim().to_string(), payload.skills, image_url);

    match data.mongodb.create(store::EMPLOYEES, &new_employee).await {
        Ok(id) => {
            info!("Employee created: {}", id);
            HttpResponse::Ok().json(new_employee)
        }
        Err(e) => {
            error!("Error creating employee: {}", e);
            HttpResponse::InternalServerError().body("Error creating employee")
        }
    }
}

/// PUT /employees/{id}
pub async fn update_employee(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateEmployeeRequest>,
) -> impl Responder {
    if auth::current_user(&req).is_none() {
        return HttpResponse::Unauthorized().body("Unauthorized");
    }

    let id = path.into_inner();

    let mut update_doc = Document::new();
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return HttpResponse::BadRequest().body("Please provide an employee name");
        }
        update_doc.insert("name", name.trim());
    }
    if let Some(skills) = &payload.skills {
        update_doc.insert("skills", skills);
    }
    if let Some(image_url) = &payload.image_url {
        update_doc.insert("imageUrl", image_url);
    }
    if let Some(date_joined) = &payload.date_joined {
        match to_bson(date_joined) {
            Ok(value) => {
                update_doc.insert("dateJoined", value);
            }
            Err(e) => {
                error!("Error encoding dateJoined: {}", e);
                return HttpResponse::InternalServerError().body("Error updating employee");
            }
        }
    }

    if update_doc.is_empty() {
        return HttpResponse::BadRequest().body("No fields to update");
    }

    match data.mongodb.update(store::EMPLOYEES, &id, update_doc).await {
        Ok(true) => HttpResponse::Ok().body("Employee updated successfully"),
        Ok(false) => HttpResponse::NotFound().body("Employee not found"),
        Err(e) => {
            error!("Error updating employee {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error updating employee")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_name_and_skills() {
        let missing_name = CreateEmployeeRequest {
            name: "  ".to_string(),
            skills: "welding".to_string(),
            image_url: None,
        };
        assert!(validate_create(&missing_name).is_err());

        let missing_skills = CreateEmployeeRequest {
            name: "Ann".to_string(),
            skills: String::new(),
            image_url: None,
        };
        assert!(validate_create(&missing_skills).is_err());

        let complete = CreateEmployeeRequest {
            name: "Ann".to_string(),
            skills: "welding".to_string(),
            image_url: Some("http://localhost:8080/storage/employee_images/ann.jpg".to_string()),
        };
        assert!(validate_create(&complete).is_ok());
    }
}
