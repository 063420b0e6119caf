use crate::{entity::{payroll_record, sea_orm_active_enums::PayrollStatus}, error::ApiError};

/// "paid" is terminal: the record can no longer be updated or deleted.
/// Salary records and employees deliberately carry no such gate.
pub fn can_mutate(record: &payroll_record::Model) -> bool {
    record.status != PayrollStatus::Paid
}

pub fn ensure_mutable(record: &payroll_record::Model) -> Result<(), ApiError> {
    if can_mutate(record) {
        Ok(())
    } else {
        Err(ApiError::Conflict("cannot modify a paid payroll".to_string()))
    }
}
