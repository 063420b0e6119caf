use std::str::FromStr;

use actix_web::{delete, dev, get, post, put, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use futures_util::future::LocalBoxFuture;
use sea_orm::{prelude::DateTimeWithTimeZone, ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::{Admin, Operator}, entity::{employee, payroll_record, prelude::*, sea_orm_active_enums::{PaymentMethod, PayrollStatus}, user}, error::ApiError, pay::{calc::{self, Allowances, Deductions}, guard, normalize::RawAmount}, pages::Listing};

use model::*;

mod extractor;
mod model;

use extractor::MutablePayroll;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(get_payrolls)
        .service(create_payroll)
        .service(get_payroll)
        .service(update_payroll)
        .service(delete_payroll);
}

#[derive(Debug, Deserialize)]
struct ListPayrolls {
    department: Option<String>,
}

#[get("")]
async fn get_payrolls(db: web::Data<DatabaseConnection>, _user: user::Model, query: web::Query<ListPayrolls>) -> Result<HttpResponse, ApiError> {
    let payrolls = match &query.department {
        // The department filter goes through the employees of that
        // department; payroll rows only know their employee.
        Some(department) => {
            let employee_ids = Employee::find()
                .filter(employee::Column::DepartmentCode.eq(department))
                .all(db.as_ref()).await?
                .into_iter()
                .map(|employee| employee.id)
                .collect::<Vec<_>>();

            PayrollRecord::find()
                .filter(payroll_record::Column::EmployeeId.is_in(employee_ids))
                .all(db.as_ref()).await?
        }
        None => PayrollRecord::find().all(db.as_ref()).await?,
    };

    Ok(HttpResponse::Ok().json(web::Json(Listing::from(payrolls))))
}

#[post("")]
async fn create_payroll(db: web::Data<DatabaseConnection>, operator: Operator, payload: web::Json<CreatePayroll>) -> Result<HttpResponse, ApiError> {
    if !(1..=12).contains(&payload.month) {
        return Err(ApiError::Validation("month must be between 1 and 12".to_string()));
    }

    let basic_salary = payload.basic_salary.required("basic salary")?;
    let allowances = payload.allowances.normalize()?;
    let deductions = payload.deductions.normalize()?;

    let Some(employee) = Employee::find_by_id(payload.employee)
        .one(db.as_ref()).await?
    else {
        return Err(ApiError::NotFound("employee"));
    };

    // Create-time uniqueness only; the unique index backstops the race.
    let existing = PayrollRecord::find()
        .filter(payroll_record::Column::EmployeeId.eq(employee.id))
        .filter(payroll_record::Column::Month.eq(payload.month))
        .filter(payroll_record::Column::Year.eq(payload.year))
        .one(db.as_ref()).await?;

    if existing.is_some() {
        return Err(ApiError::Duplicate(format!(
            "payroll already exists for this employee for {}/{}",
            payload.month, payload.year
        )));
    }

    let model = payroll_record::ActiveModel {
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        employee_id: Set(employee.id),
        month: Set(payload.month),
        year: Set(payload.year),
        basic_salary: Set(basic_salary),
        allowance_overtime: Set(allowances.overtime),
        allowance_medical: Set(allowances.medical),
        allowance_transportation: Set(allowances.transportation),
        allowance_other: Set(allowances.other),
        deduction_tax: Set(deductions.tax),
        deduction_insurance: Set(deductions.insurance),
        deduction_loan: Set(deductions.loan),
        deduction_other: Set(deductions.other),
        net_salary: Set(calc::net_salary(basic_salary, &allowances, &deductions)),
        status: Set(payload.status.unwrap_or(PayrollStatus::Pending)),
        payment_date: Set(payload.payment_date),
        payment_method: Set(payload.payment_method.unwrap_or(PaymentMethod::BankTransfer)),
        comments: Set(payload.comments.clone()),
        created_by: Set(Some(operator.id)),
        ..Default::default()
    };

    let payroll = PayrollRecord::insert(model)
        .exec_with_returning(db.as_ref()).await?;

    Ok(HttpResponse::Created().json(web::Json(payroll)))
}

#[get("/{payroll_id}")]
async fn get_payroll(payroll: payroll_record::Model) -> impl Responder {
    web::Json(payroll)
}

#[put("/{payroll_id}")]
async fn update_payroll(db: web::Data<DatabaseConnection>, _operator: Operator, payroll: MutablePayroll, payload: web::Json<UpdatePayroll>) -> Result<HttpResponse, ApiError> {
    let payroll = payroll.0;

    let month = payload.month.unwrap_or(payroll.month);
    if !(1..=12).contains(&month) {
        return Err(ApiError::Validation("month must be between 1 and 12".to_string()));
    }

    let basic_salary = match &payload.basic_salary {
        RawAmount::Missing => payroll.basic_salary,
        provided => provided.required("basic salary")?,
    };

    // A provided group replaces the whole group, absent components falling
    // back to zero, like a document-style nested update.
    let allowances = match &payload.allowances {
        Some(input) => input.normalize()?,
        None => Allowances {
            overtime: payroll.allowance_overtime,
            medical: payroll.allowance_medical,
            transportation: payroll.allowance_transportation,
            other: payroll.allowance_other,
        },
    };
    let deductions = match &payload.deductions {
        Some(input) => input.normalize()?,
        None => Deductions {
            tax: payroll.deduction_tax,
            insurance: payroll.deduction_insurance,
            loan: payroll.deduction_loan,
            other: payroll.deduction_other,
        },
    };

    let model = payroll_record::ActiveModel {
        id: Unchanged(payroll.id),
        updated_at: Set(Local::now().fixed_offset()),
        month: Set(month),
        year: Set(payload.year.unwrap_or(payroll.year)),
        basic_salary: Set(basic_salary),
        allowance_overtime: Set(allowances.overtime),
        allowance_medical: Set(allowances.medical),
        allowance_transportation: Set(allowances.transportation),
        allowance_other: Set(allowances.other),
        deduction_tax: Set(deductions.tax),
        deduction_insurance: Set(deductions.insurance),
        deduction_loan: Set(deductions.loan),
        deduction_other: Set(deductions.other),
        net_salary: Set(calc::net_salary(basic_salary, &allowances, &deductions)),
        status: Set(payload.status.unwrap_or(payroll.status)),
        payment_date: Set(payload.payment_date.or(payroll.payment_date)),
        payment_method: Set(payload.payment_method.unwrap_or(payroll.payment_method)),
        comments: Set(payload.comments.clone().or(payroll.comments)),
        ..Default::default()
    };

    let payroll = PayrollRecord::update(model).exec(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(payroll)))
}

#[delete("/{payroll_id}")]
async fn delete_payroll(db: web::Data<DatabaseConnection>, _admin: Admin, payroll: MutablePayroll) -> Result<HttpResponse, ApiError> {
    PayrollRecord::delete_by_id(payroll.id).exec(db.as_ref()).await?;

    Ok(HttpResponse::Ok().json(web::Json(payroll.0)))
}
