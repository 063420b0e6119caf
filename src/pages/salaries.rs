use std::str::FromStr;

use actix_web::{delete, dev, get, post, put, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use futures_util::future::LocalBoxFuture;
use sea_orm::{ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::{Admin, Operator}, entity::{employee, prelude::*, salary_record, user}, error::ApiError, pay::{calc, normalize::RawAmount}, pages::Listing};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(get_employee_salaries)
        .service(get_salaries)
        .service(create_salary)
        .service(get_salary)
        .service(update_salary)
        .service(delete_salary);
}

impl FromRequest for salary_record::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let salary_id = req.match_info().get("salary_id").expect("This extractor must be used under `salary_id` path");
            let Ok(salary_id) = Uuid::from_str(salary_id) else {
                return Err(actix_web::error::ErrorBadRequest("invalid `salary_id`"))
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let Some(salary) = SalaryRecord::find_by_id(salary_id)
                .one(db.as_ref()).await
                .map_err(ApiError::Database)?
            else {
                return Err(ApiError::NotFound("salary record").into())
            };

            Ok(salary)
        })
    }
}

#[get("")]
async fn get_salaries(db: web::Data<DatabaseConnection>, _user: user::Model) -> Result<HttpResponse, ApiError> {
    let salaries = SalaryRecord::find().all(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(Listing::from(salaries))))
}

#[get("/employee/{employee_number}")]
async fn get_employee_salaries(db: web::Data<DatabaseConnection>, _user: user::Model, employee_number: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let salaries = SalaryRecord::find()
        .filter(salary_record::Column::EmployeeNumber.eq(employee_number.as_str()))
        .all(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(Listing::from(salaries))))
}

#[derive(Debug, Deserialize)]
struct CreateSalary {
    employee_number: String,
    month: String,
    #[serde(default)]
    gross_salary: RawAmount,
    #[serde(default)]
    total_deduction: RawAmount,
}

#[post("")]
async fn create_salary(db: web::Data<DatabaseConnection>, _operator: Operator, payload: web::Json<CreateSalary>) -> Result<HttpResponse, ApiError> {
    let gross_salary = payload.gross_salary.required("gross salary")?;
    let total_deduction = payload.total_deduction.required("total deduction")?;

    let employee = Employee::find()
        .filter(employee::Column::EmployeeNumber.eq(&payload.employee_number))
        .one(db.as_ref()).await?;

    if employee.is_none() {
        return Err(ApiError::NotFound("employee"));
    }

    // Create-time uniqueness only; concurrent creations can still race past
    // this pre-check, the unique index is the backstop.
    let existing = SalaryRecord::find()
        .filter(salary_record::Column::EmployeeNumber.eq(&payload.employee_number))
        .filter(salary_record::Column::Month.eq(&payload.month))
        .one(db.as_ref()).await?;

    if existing.is_some() {
        return Err(ApiError::Duplicate(format!(
            "salary record already exists for employee {:?} in month {:?}",
            payload.employee_number, payload.month
        )));
    }

    let model = salary_record::ActiveModel {
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        employee_number: Set(payload.employee_number.clone()),
        month: Set(payload.month.clone()),
        gross_salary: Set(gross_salary),
        total_deduction: Set(total_deduction),
        net_salary: Set(calc::simple_net(gross_salary, total_deduction)),
        ..Default::default()
    };

    let salary = SalaryRecord::insert(model)
        .exec_with_returning(db.as_ref()).await?;

    Ok(HttpResponse::Created().json(web::Json(salary)))
}

#[get("/{salary_id}")]
async fn get_salary(salary: salary_record::Model) -> impl Responder {
    web::Json(salary)
}

#[derive(Debug, Deserialize, Default)]
struct UpdateSalary {
    month: Option<String>,
    #[serde(default)]
    gross_salary: RawAmount,
    #[serde(default)]
    total_deduction: RawAmount,
}

/// No state guard here: unlike payrolls, salary records stay editable
/// forever. The net is re-derived from the merged components on every
/// update.
#[put("/{salary_id}")]
async fn update_salary(db: web::Data<DatabaseConnection>, _operator: Operator, salary: salary_record::Model, payload: web::Json<UpdateSalary>) -> Result<HttpResponse, ApiError> {
    let gross_salary = match &payload.gross_salary {
        RawAmount::Missing => salary.gross_salary,
        provided => provided.required("gross salary")?,
    };
    let total_deduction = match &payload.total_deduction {
        RawAmount::Missing => salary.total_deduction,
        provided => provided.required("total deduction")?,
    };

    let model = salary_record::ActiveModel {
        id: Unchanged(salary.id),
        updated_at: Set(Local::now().fixed_offset()),
        month: payload.month.as_ref().map(|month| Set(month.clone())).unwrap_or(Unchanged(salary.month)),
        gross_salary: Set(gross_salary),
        total_deduction: Set(total_deduction),
        net_salary: Set(calc::simple_net(gross_salary, total_deduction)),
        ..Default::default()
    };

    let salary = SalaryRecord::update(model).exec(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(salary)))
}

#[delete("/{salary_id}")]
async fn delete_salary(db: web::Data<DatabaseConnection>, _admin: Admin, salary: salary_record::Model) -> Result<HttpResponse, ApiError> {
    SalaryRecord::delete_by_id(salary.id).exec(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(salary)))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::entity::sea_orm_active_enums::{GenderType, RoleType};
    use crate::auth::Authority;

    use super::*;

    fn operator() -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            username: "accountant".to_string(),
            password: Vec::new(),
            role: RoleType::Accountant,
        }
    }

    fn employee_fixture() -> employee::Model {
        employee::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            employee_number: "EMP001".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            position: "Engineer".to_string(),
            address: None,
            telephone: None,
            gender: Some(GenderType::Female),
            hired_date: Local::now().into(),
            department_code: "ENG".to_string(),
        }
    }

    #[actix_web::test]
    async fn test_create_salary_recomputes_net_even_when_negative() {
        let secret = b"secret";

        let created = salary_record::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            employee_number: "EMP001".to_string(),
            month: "3".to_string(),
            gross_salary: dec!(1000),
            total_deduction: dec!(1200),
            net_salary: dec!(-200),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ employee_fixture() ],
            ])
            .append_query_results([
                Vec::<salary_record::Model>::new(),  // no duplicate
                vec![ created.clone() ],             // insert returning
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/").service(create_salary))
        ).await;

        let token = Authority::new(secret).issue_for(&operator());

        let req = test::TestRequest::post()
            .uri("/")
            .insert_header(("Authorization", format!("JWT {token}")))
            .set_json(serde_json::json!({
                "employee_number": "EMP001",
                "month": "3",
                // String-typed amounts, straight off a form.
                "gross_salary": "1000",
                "total_deduction": "1200",
            }))
            .to_request();

        let returned: salary_record::Model = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned.net_salary, dec!(-200));
    }

    #[actix_web::test]
    async fn test_create_salary_for_unknown_employee_is_not_found() {
        let secret = b"secret";

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                Vec::<employee::Model>::new(),
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/").service(create_salary))
        ).await;

        let token = Authority::new(secret).issue_for(&operator());

        let req = test::TestRequest::post()
            .uri("/")
            .insert_header(("Authorization", format!("JWT {token}")))
            .set_json(serde_json::json!({
                "employee_number": "GHOST",
                "month": "3",
                "gross_salary": 1000,
                "total_deduction": 0,
            }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_create_salary_duplicate_month_conflicts() {
        let secret = b"secret";

        let existing = salary_record::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            employee_number: "EMP001".to_string(),
            month: "3".to_string(),
            gross_salary: dec!(1000),
            total_deduction: dec!(0),
            net_salary: dec!(1000),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ employee_fixture() ],
            ])
            .append_query_results([
                vec![ existing ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/").service(create_salary))
        ).await;

        let token = Authority::new(secret).issue_for(&operator());

        let req = test::TestRequest::post()
            .uri("/")
            .insert_header(("Authorization", format!("JWT {token}")))
            .set_json(serde_json::json!({
                "employee_number": "EMP001",
                "month": "3",
                "gross_salary": 1000,
                "total_deduction": 0,
            }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
