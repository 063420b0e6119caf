use actix_web::web;
use serde::Serialize;

mod auth;
mod departments;
mod employees;
mod payrolls;
mod reports;
mod salaries;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::scope("/auth")
            .configure(auth::config))
        .service(web::scope("/employees")
            .configure(employees::config))
        .service(web::scope("/departments")
            .configure(departments::config))
        .service(web::scope("/salaries")
            .configure(salaries::config))
        .service(web::scope("/payrolls")
            .configure(payrolls::config))
        .service(web::scope("/reports")
            .configure(reports::config));
}

/// List envelope: `{ count, data }`, the shape every collection endpoint
/// returns.
#[derive(Debug, Serialize)]
pub(crate) struct Listing<T> {
    pub(crate) count: usize,
    pub(crate) data: Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(data: Vec<T>) -> Self {
        Self { count: data.len(), data }
    }
}
