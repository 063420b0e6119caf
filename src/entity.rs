pub mod prelude;

pub mod department;
pub mod employee;
pub mod payroll_record;
pub mod salary_record;
pub mod sea_orm_active_enums;
pub mod user;
