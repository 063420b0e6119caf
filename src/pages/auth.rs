use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::Local;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{auth::Authority, entity::{prelude::*, sea_orm_active_enums::RoleType, user}, error::ApiError};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(login)
        .service(register)
        .service(whoami);
}

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    username: String,
    password: String,
}

fn hash_credentials(password: &str, username: &str) -> Vec<u8> {
    Sha256::digest(format!("{password}:{username}")).to_vec()
}

#[post("/login")]
async fn login(db: web::Data<DatabaseConnection>, authority: web::Data<Authority>, credentials: web::Json<Login>) -> impl Responder {
    let hashed_password = hash_credentials(&credentials.password, &credentials.username);

    let Some(user) = User::find()
        .filter(user::Column::Username.eq(&credentials.username))
        .filter(user::Column::Password.eq(hashed_password))
        .one(db.get_ref()).await
        .map_err(ApiError::Database)?
    else {
        return Err(actix_web::error::ErrorForbidden("invalid credentials"));
    };

    Ok::<_, actix_web::Error>(
        authority.issue_for(&user)
    )
}

#[derive(Debug, Serialize, Deserialize)]
struct Register {
    username: String,
    password: String,
}

/// Self-service signup. New accounts always get the unprivileged `staff`
/// role; elevated roles are granted out of band.
#[post("/register")]
async fn register(db: web::Data<DatabaseConnection>, payload: web::Json<Register>) -> Result<HttpResponse, ApiError> {
    let existing = User::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(db.get_ref()).await?;

    if existing.is_some() {
        return Err(ApiError::Duplicate(format!("username {:?} is already taken", payload.username)));
    }

    let model = user::ActiveModel {
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        username: Set(payload.username.clone()),
        password: Set(hash_credentials(&payload.password, &payload.username)),
        role: Set(RoleType::Staff),
        ..Default::default()
    };

    let user = User::insert(model)
        .exec_with_returning(db.get_ref()).await?;

    Ok(HttpResponse::Created().json(web::Json(user)))
}

#[get("")]
async fn whoami(user: user::Model) -> impl Responder {
    web::Json(user)
}

#[cfg(test)]
mod tests {
    use actix_web::{body::MessageBody, http::{Method, StatusCode}, test, App};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::*;

    #[actix_web::test]
    async fn test_login() {
        let secret = b"secret";

        let user_password = "secret";
        let user = user::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            username: "Bob".to_string(),
            password: hash_credentials(user_password, "Bob"),
            role: RoleType::Staff,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ ],
                vec![ user.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(login)
        ).await;

        {
            let forbidden_req = test::TestRequest::default()
                .uri("/login")
                .method(Method::POST)
                .set_json(Login {
                    username: "username".to_owned(),
                    password: "password".to_owned(),
                })
                .to_request();

            let response = test::call_service(&app, forbidden_req).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        {
            let success_req = test::TestRequest::default()
                .uri("/login")
                .method(Method::POST)
                .set_json(Login {
                    username: user.username.clone(),
                    password: user_password.to_owned(),
                })
                .to_request();

            let response = test::call_service(&app, success_req).await;
            assert_eq!(response.status(), StatusCode::OK);

            let body = response.into_body().try_into_bytes().unwrap();
            let returned_user = Authority::new(secret).authorize(String::from_utf8_lossy(&body)).unwrap();
            assert_eq!(returned_user, user);
        }
    }

    #[actix_web::test]
    async fn test_register() {
        let created = user::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            username: "Alice".to_string(),
            password: hash_credentials("hunter2", "Alice"),
            role: RoleType::Staff,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ ],                  // no duplicate username
                vec![ created.clone() ],  // insert returning
                vec![ created.clone() ],  // second registration finds the duplicate
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db.into_connection()))
                .service(register)
        ).await;

        {
            let req = test::TestRequest::default()
                .uri("/register")
                .method(Method::POST)
                .set_json(Register {
                    username: "Alice".to_owned(),
                    password: "hunter2".to_owned(),
                })
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        {
            let req = test::TestRequest::default()
                .uri("/register")
                .method(Method::POST)
                .set_json(Register {
                    username: "Alice".to_owned(),
                    password: "hunter2".to_owned(),
                })
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::CONFLICT);
        }
    }
}
