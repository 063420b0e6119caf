use std::collections::HashMap;

use actix_web::{get, web, HttpResponse};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::{entity::{payroll_record, prelude::*, user}, error::ApiError, pay::aggregate::{self, PayLine, TOP_POSITIONS}};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(dashboard)
        .service(payrolls_monthly)
        .service(payrolls_by_department)
        .service(top_positions)
        .service(salaries_monthly);
}

#[derive(Debug, Serialize)]
struct Dashboard {
    employees: u64,
    departments: u64,
    salaries: u64,
    payrolls: u64,
}

#[get("/dashboard")]
async fn dashboard(db: web::Data<DatabaseConnection>, _user: user::Model) -> Result<HttpResponse, ApiError> {
    let stats = Dashboard {
        employees: Employee::find().count(db.as_ref()).await?,
        departments: Department::find().count(db.as_ref()).await?,
        salaries: SalaryRecord::find().count(db.as_ref()).await?,
        payrolls: PayrollRecord::find().count(db.as_ref()).await?,
    };

    Ok(HttpResponse::Ok().json(web::Json(stats)))
}

#[derive(Debug, Deserialize)]
struct MonthlyQuery {
    year: Option<i32>,
}

#[get("/payrolls/monthly")]
async fn payrolls_monthly(db: web::Data<DatabaseConnection>, _user: user::Model, query: web::Query<MonthlyQuery>) -> Result<HttpResponse, ApiError> {
    let mut find = PayrollRecord::find();

    if let Some(year) = query.year {
        find = find.filter(payroll_record::Column::Year.eq(year));
    }

    let lines = find.all(db.as_ref()).await?
        .iter()
        .map(PayLine::from)
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(web::Json(aggregate::by_month(&lines))))
}

#[get("/payrolls/departments")]
async fn payrolls_by_department(db: web::Data<DatabaseConnection>, _user: user::Model) -> Result<HttpResponse, ApiError> {
    let payrolls = PayrollRecord::find().all(db.as_ref()).await?;

    // Payroll rows reference the employee; the department code must be
    // resolved through the employee roster.
    let departments_by_employee = Employee::find().all(db.as_ref()).await?
        .into_iter()
        .map(|employee| (employee.id, employee.department_code))
        .collect::<HashMap<_, _>>();

    let lines = payrolls
        .iter()
        .map(|payroll| {
            let mut line = PayLine::from(payroll);
            line.department = departments_by_employee.get(&payroll.employee_id).cloned();
            line
        })
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(web::Json(aggregate::by_department(&lines))))
}

#[get("/employees/positions")]
async fn top_positions(db: web::Data<DatabaseConnection>, _user: user::Model) -> Result<HttpResponse, ApiError> {
    let lines = Employee::find().all(db.as_ref()).await?
        .iter()
        .map(PayLine::from)
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(web::Json(aggregate::top_positions(&lines, TOP_POSITIONS))))
}

#[get("/salaries/monthly")]
async fn salaries_monthly(db: web::Data<DatabaseConnection>, _user: user::Model) -> Result<HttpResponse, ApiError> {
    let lines = SalaryRecord::find().all(db.as_ref()).await?
        .iter()
        .map(PayLine::from)
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(web::Json(aggregate::by_month(&lines))))
}
