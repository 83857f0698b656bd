use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Responder};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::error;
use mongodb::bson::doc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::store;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

/// Account record in the `users` collection.
#[derive(Serialize, Deserialize, Debug)]
pub struct User {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub email: String,
    pub password: String,
    pub created_at: chrono::DateTime<Utc>,
}

/// The session identity the token middleware attaches to a request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct SignupInfo {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginInfo {
    pub email: String,
    pub password: String,
}

pub fn create_jwt(user_id: &str, email: &str, secret: &str) -> String {
    let expiration = Utc::now() + Duration::hours(24);
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: expiration.timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref())).unwrap()
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Pull the identity the token middleware stashed in the request, if any.
pub fn current_user(req: &HttpRequest) -> Option<AuthenticatedUser> {
    req.extensions().get::<AuthenticatedUser>().cloned()
}

// Signup Endpoint
pub async fn signup(
    data: web::Data<AppState>,
    signup_info: web::Json<SignupInfo>,
) -> impl Responder {
    let email = signup_info.email.trim().to_lowercase();
    let email_re = Regex::new(EMAIL_PATTERN).expect("email pattern is valid");
    if !email_re.is_match(&email) {
        return HttpResponse::BadRequest().body("Invalid email address");
    }
    if signup_info.password.len() < MIN_PASSWORD_LEN {
        return HttpResponse::BadRequest().body("Password should be at least 6 characters");
    }

    let users_collection = data.mongodb.collection::<User>(store::USERS);
    match users_collection.find_one(doc! { "email": &email }).await {
        Ok(Some(_)) => return HttpResponse::BadRequest().body("Email already in use"),
        Ok(None) => {}
        Err(e) => {
            error!("Error checking existing user: {}", e);
            return HttpResponse::InternalServerError().body("Error creating user");
        }
    }

    let hashed_password = match hash(&signup_info.password, DEFAULT_COST) {
        Ok(h) => h,
        Err(_) => return HttpResponse::InternalServerError().body("Error hashing password"),
    };

    let new_user = User {
        user_id: Uuid::new_v4().to_string(),
        email,
        password: hashed_password,
        created_at: Utc::now(),
    };

    match users_collection.insert_one(&new_user).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "status": "User created" })),
        Err(e) => {
            error!("Error inserting user: {}", e);
            HttpResponse::InternalServerError().body("Error creating user")
        }
    }
}

// Login Endpoint
pub async fn login(
    data: web::Data<AppState>,
    login_info: web::Json<LoginInfo>,
) -> impl Responder {
    let email = login_info.email.trim().to_lowercase();
    let users_collection = data.mongodb.collection::<User>(store::USERS);
    let user_doc = users_collection.find_one(doc! { "email": &email }).await;

    match user_doc {
        Ok(Some(user)) => {
            if verify(&login_info.password, &user.password).unwrap_or(false) {
                let token = create_jwt(&user.user_id, &user.email, &data.config.jwt_secret);
                HttpResponse::Ok().json(serde_json::json!({
                    "token": token,
                    "userId": user.user_id,
                    "email": user.email,
                }))
            } else {
                HttpResponse::Unauthorized().body("Invalid credentials")
            }
        }
        Ok(None) => HttpResponse::Unauthorized().body("Invalid credentials"),
        Err(e) => {
            error!("Error logging in: {}", e);
            HttpResponse::InternalServerError().body("Error logging in")
        }
    }
}

/// GET /auth/session
///
/// The route guard's probe: 200 with the identity when the bearer token is
/// valid, 401 otherwise.
pub async fn session(req: HttpRequest) -> impl Responder {
    match current_user(&req) {
        Some(user) => HttpResponse::Ok().json(serde_json::json!({
            "userId": user.user_id,
            "email": user.email,
        })),
        None => HttpResponse::Unauthorized().body("Unauthorized"),
    }
}
