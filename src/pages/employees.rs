use std::str::FromStr;

use actix_web::{delete, dev, get, post, put, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use futures_util::future::LocalBoxFuture;
use sea_orm::{prelude::DateTimeWithTimeZone, ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::{Admin, Operator}, entity::{employee, prelude::*, sea_orm_active_enums::GenderType, user}, error::ApiError, pages::Listing};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(get_employees_by_position)
        .service(get_employees)
        .service(create_employee)
        .service(get_employee)
        .service(update_employee)
        .service(delete_employee);
}

impl FromRequest for employee::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let employee_id = req.match_info().get("employee_id").expect("This extractor must be used under `employee_id` path");
            let Ok(employee_id) = Uuid::from_str(employee_id) else {
                return Err(actix_web::error::ErrorBadRequest("invalid `employee_id`"))
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let Some(employee) = Employee::find_by_id(employee_id)
                .one(db.as_ref()).await
                .map_err(ApiError::Database)?
            else {
                return Err(ApiError::NotFound("employee").into())
            };

            Ok(employee)
        })
    }
}

#[derive(Debug, Deserialize)]
struct ListEmployees {
    department: Option<String>,
}

#[get("")]
async fn get_employees(db: web::Data<DatabaseConnection>, _user: user::Model, query: web::Query<ListEmployees>) -> Result<HttpResponse, ApiError> {
    let mut find = Employee::find();

    if let Some(department) = &query.department {
        find = find.filter(employee::Column::DepartmentCode.eq(department));
    }

    let employees = find.all(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(Listing::from(employees))))
}

#[get("/position/{position}")]
async fn get_employees_by_position(db: web::Data<DatabaseConnection>, _user: user::Model, position: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let employees = Employee::find()
        .filter(employee::Column::Position.eq(position.as_str()))
        .all(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(Listing::from(employees))))
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateEmployee {
    employee_number: String,
    first_name: String,
    last_name: String,
    position: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    telephone: Option<String>,
    #[serde(default)]
    gender: Option<GenderType>,
    #[serde(default)]
    hired_date: Option<DateTimeWithTimeZone>,
    department_code: String,
}

#[post("")]
async fn create_employee(db: web::Data<DatabaseConnection>, _operator: Operator, payload: web::Json<CreateEmployee>) -> Result<HttpResponse, ApiError> {
    let existing = Employee::find()
        .filter(employee::Column::EmployeeNumber.eq(&payload.employee_number))
        .one(db.as_ref()).await?;

    if existing.is_some() {
        return Err(ApiError::Duplicate(format!("employee number {:?} already exists", payload.employee_number)));
    }

    let model = employee::ActiveModel {
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        employee_number: Set(payload.employee_number.clone()),
        first_name: Set(payload.first_name.clone()),
        last_name: Set(payload.last_name.clone()),
        position: Set(payload.position.clone()),
        address: Set(payload.address.clone()),
        telephone: Set(payload.telephone.clone()),
        gender: Set(payload.gender.clone()),
        hired_date: Set(payload.hired_date.unwrap_or_else(|| Local::now().fixed_offset())),
        department_code: Set(payload.department_code.clone()),
        ..Default::default()
    };

    let employee = Employee::insert(model)
        .exec_with_returning(db.as_ref()).await?;

    Ok(HttpResponse::Created().json(web::Json(employee)))
}

#[get("/{employee_id}")]
async fn get_employee(employee: employee::Model) -> impl Responder {
    web::Json(employee)
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct UpdateEmployee {
    employee_number: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    position: Option<String>,
    address: Option<String>,
    telephone: Option<String>,
    gender: Option<GenderType>,
    hired_date: Option<DateTimeWithTimeZone>,
    department_code: Option<String>,
}

#[put("/{employee_id}")]
async fn update_employee(db: web::Data<DatabaseConnection>, _operator: Operator, employee: employee::Model, payload: web::Json<UpdateEmployee>) -> Result<HttpResponse, ApiError> {
    // The employee number is the business key everything else references.
    if payload.employee_number.as_ref().is_some_and(|number| *number != employee.employee_number) {
        return Err(ApiError::Validation("employee number is immutable".to_string()));
    }

    let mut model = employee::ActiveModel {
        id: Unchanged(employee.id),
        updated_at: Set(Local::now().fixed_offset()),
        ..Default::default()
    };

    if let Some(first_name) = &payload.first_name {
        model.first_name = Set(first_name.clone());
    }
    if let Some(last_name) = &payload.last_name {
        model.last_name = Set(last_name.clone());
    }
    if let Some(position) = &payload.position {
        model.position = Set(position.clone());
    }
    if let Some(address) = &payload.address {
        model.address = Set(Some(address.clone()));
    }
    if let Some(telephone) = &payload.telephone {
        model.telephone = Set(Some(telephone.clone()));
    }
    if let Some(gender) = &payload.gender {
        model.gender = Set(Some(gender.clone()));
    }
    if let Some(hired_date) = payload.hired_date {
        model.hired_date = Set(hired_date);
    }
    if let Some(department_code) = &payload.department_code {
        model.department_code = Set(department_code.clone());
    }

    let employee = Employee::update(model).exec(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(employee)))
}

/// Deletion is unconditional: salary and payroll rows referencing the
/// employee stay behind as orphans, same as the record-keeping always
/// worked.
#[delete("/{employee_id}")]
async fn delete_employee(db: web::Data<DatabaseConnection>, _admin: Admin, employee: employee::Model) -> Result<HttpResponse, ApiError> {
    Employee::delete_by_id(employee.id).exec(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(employee)))
}
