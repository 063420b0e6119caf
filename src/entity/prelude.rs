pub use super::department::Entity as Department;
pub use super::employee::Entity as Employee;
pub use super::payroll_record::Entity as PayrollRecord;
pub use super::salary_record::Entity as SalaryRecord;
pub use super::user::Entity as User;
