use std::str::FromStr;

use actix_web::{delete, dev, get, post, put, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use futures_util::future::LocalBoxFuture;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::Admin, entity::{department, prelude::*, user}, error::ApiError, pay::{calc, normalize::RawAmount}, pages::Listing};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(get_department_by_code)
        .service(get_departments)
        .service(create_department)
        .service(get_department)
        .service(update_department)
        .service(delete_department);
}

impl FromRequest for department::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let department_id = req.match_info().get("department_id").expect("This extractor must be used under `department_id` path");
            let Ok(department_id) = Uuid::from_str(department_id) else {
                return Err(actix_web::error::ErrorBadRequest("invalid `department_id`"))
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let Some(department) = Department::find_by_id(department_id)
                .one(db.as_ref()).await
                .map_err(ApiError::Database)?
            else {
                return Err(ApiError::NotFound("department").into())
            };

            Ok(department)
        })
    }
}

/// The wire shape: the stored row plus the derived net, which is never
/// persisted.
#[derive(Debug, Serialize)]
struct DepartmentView {
    #[serde(flatten)]
    department: department::Model,
    net_salary: Decimal,
}

impl From<department::Model> for DepartmentView {
    fn from(department: department::Model) -> Self {
        let net_salary = calc::simple_net(department.gross_salary, department.total_deduction);
        Self { department, net_salary }
    }
}

#[get("")]
async fn get_departments(db: web::Data<DatabaseConnection>, _user: user::Model) -> Result<HttpResponse, ApiError> {
    let departments = Department::find().all(db.as_ref()).await?
        .into_iter()
        .map(DepartmentView::from)
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(web::Json(Listing::from(departments))))
}

#[get("/code/{code}")]
async fn get_department_by_code(db: web::Data<DatabaseConnection>, _user: user::Model, code: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let Some(department) = Department::find()
        .filter(department::Column::Code.eq(code.as_str()))
        .one(db.as_ref()).await?
    else {
        return Err(ApiError::NotFound("department"))
    };

    Ok(HttpResponse::Ok().json(web::Json(DepartmentView::from(department))))
}

#[derive(Debug, Deserialize)]
struct CreateDepartment {
    code: String,
    name: String,
    #[serde(default)]
    gross_salary: RawAmount,
    #[serde(default)]
    total_deduction: RawAmount,
}

#[post("")]
async fn create_department(db: web::Data<DatabaseConnection>, _admin: Admin, payload: web::Json<CreateDepartment>) -> Result<HttpResponse, ApiError> {
    let gross_salary = payload.gross_salary.required("gross salary")?;
    let total_deduction = payload.total_deduction.optional("total deduction")?;

    let existing = Department::find()
        .filter(department::Column::Code.eq(&payload.code))
        .one(db.as_ref()).await?;

    if existing.is_some() {
        return Err(ApiError::Duplicate(format!("department code {:?} already exists", payload.code)));
    }

    let model = department::ActiveModel {
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        code: Set(payload.code.clone()),
        name: Set(payload.name.clone()),
        gross_salary: Set(gross_salary),
        total_deduction: Set(total_deduction),
        ..Default::default()
    };

    let department = Department::insert(model)
        .exec_with_returning(db.as_ref()).await?;

    Ok(HttpResponse::Created().json(web::Json(DepartmentView::from(department))))
}

#[get("/{department_id}")]
async fn get_department(department: department::Model) -> impl Responder {
    web::Json(DepartmentView::from(department))
}

#[derive(Debug, Deserialize, Default)]
struct UpdateDepartment {
    code: Option<String>,
    name: Option<String>,
    #[serde(default)]
    gross_salary: RawAmount,
    #[serde(default)]
    total_deduction: RawAmount,
}

#[put("/{department_id}")]
async fn update_department(db: web::Data<DatabaseConnection>, _admin: Admin, department: department::Model, payload: web::Json<UpdateDepartment>) -> Result<HttpResponse, ApiError> {
    let mut model = department::ActiveModel {
        id: Unchanged(department.id),
        updated_at: Set(Local::now().fixed_offset()),
        ..Default::default()
    };

    if let Some(code) = &payload.code {
        model.code = Set(code.clone());
    }
    if let Some(name) = &payload.name {
        model.name = Set(name.clone());
    }
    if !matches!(payload.gross_salary, RawAmount::Missing) {
        model.gross_salary = Set(payload.gross_salary.required("gross salary")?);
    }
    if !matches!(payload.total_deduction, RawAmount::Missing) {
        model.total_deduction = Set(payload.total_deduction.optional("total deduction")?);
    }

    let department = Department::update(model).exec(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(DepartmentView::from(department))))
}

#[delete("/{department_id}")]
async fn delete_department(db: web::Data<DatabaseConnection>, _admin: Admin, department: department::Model) -> Result<HttpResponse, ApiError> {
    Department::delete_by_id(department.id).exec(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(DepartmentView::from(department))))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::{auth::Authority, entity::sea_orm_active_enums::RoleType};

    use super::*;

    #[actix_web::test]
    async fn test_department_view_embeds_derived_net() {
        #[derive(Debug, Deserialize)]
        struct Returned {
            code: String,
            net_salary: Decimal,
        }

        let secret = b"secret";

        let user = user::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            username: "Bob".to_string(),
            password: Vec::new(),
            role: RoleType::Staff,
        };

        let department = department::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            code: "FIN".to_string(),
            name: "Finance".to_string(),
            gross_salary: dec!(1000),
            total_deduction: dec!(1200),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ department.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(get_department)
        ).await;

        let token = Authority::new(secret).issue_for(&user);

        let req = test::TestRequest::get()
            .uri(&format!("/{}", department.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let returned: Returned = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned.code, "FIN");
        // Negative nets are carried through, never rejected.
        assert_eq!(returned.net_salary, dec!(-200));
    }

    #[actix_web::test]
    async fn test_create_department_requires_gross_salary() {
        let secret = b"secret";

        let admin = user::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            username: "admin".to_string(),
            password: Vec::new(),
            role: RoleType::Admin,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/").service(create_department))
        ).await;

        let token = Authority::new(secret).issue_for(&admin);

        let req = test::TestRequest::post()
            .uri("/")
            .insert_header(("Authorization", format!("JWT {token}")))
            .set_json(serde_json::json!({
                "code": "FIN",
                "name": "Finance",
            }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
