use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PaymentMethod, PayrollStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payroll_record")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub employee_id: Uuid,
    pub month: i16,
    pub year: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub basic_salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub allowance_overtime: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub allowance_medical: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub allowance_transportation: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub allowance_other: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub deduction_tax: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub deduction_insurance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub deduction_loan: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub deduction_other: Decimal,
    /// Cache of the derived net, refreshed on every write. Readers must
    /// recompute from the component columns rather than trust this one.
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub net_salary: Decimal,
    pub status: PayrollStatus,
    pub payment_date: Option<DateTimeWithTimeZone>,
    pub payment_method: PaymentMethod,
    pub comments: Option<String>,
    pub created_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
