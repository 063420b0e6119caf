use sea_orm_migration::{prelude::{extension::postgres::TypeDropStatement, *}, sea_orm::{ActiveEnum, DbBackend, DeriveActiveEnum, EnumIter, Schema}};

use crate::util::{default_table_statement, money_column, DefaultColumn};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(DbBackend::Postgres);

        manager
            .create_type(
                schema.create_enum_from_active_enum::<RoleType>()
            ).await.unwrap();

        manager
            .create_type(
                schema.create_enum_from_active_enum::<GenderType>()
            ).await.unwrap();

        manager
            .create_type(
                schema.create_enum_from_active_enum::<PayrollStatus>()
            ).await.unwrap();

        manager
            .create_type(
                schema.create_enum_from_active_enum::<PaymentMethod>()
            ).await.unwrap();

        manager
            .create_table(default_table_statement()
                .table(User::Table)
                .col(ColumnDef::new(User::Username)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(User::Password)
                    .binary()
                    .not_null()) // Password should be in a hashed format
                .col(ColumnDef::new(User::Role)
                    .custom(RoleType::name())
                    .not_null())
                .take()
            ).await.unwrap();

        manager
            .create_table(default_table_statement()
                .table(Department::Table)
                .col(ColumnDef::new(Department::Code)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Department::Name)
                    .text()
                    .not_null())
                .col(money_column(Department::GrossSalary)
                    .not_null())
                .col(money_column(Department::TotalDeduction)
                    .not_null()
                    .default(0))
                .take()
            ).await.unwrap();

        manager
            .create_table(default_table_statement()
                .table(Employee::Table)
                .col(ColumnDef::new(Employee::EmployeeNumber)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Employee::FirstName)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Employee::LastName)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Employee::Position)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Employee::Address)
                    .text())
                .col(ColumnDef::new(Employee::Telephone)
                    .text())
                .col(ColumnDef::new(Employee::Gender)
                    .custom(GenderType::name()))
                .col(ColumnDef::new(Employee::HiredDate)
                    .timestamp_with_time_zone()
                    .not_null())
                // Business key into department.code, deliberately not a FK so
                // employees can be imported before their department exists
                .col(ColumnDef::new(Employee::DepartmentCode)
                    .text()
                    .not_null())
                .take()
            ).await.unwrap();

        manager
            .create_table(default_table_statement()
                .table(SalaryRecord::Table)
                .col(ColumnDef::new(SalaryRecord::EmployeeNumber)
                    .text()
                    .not_null())
                .col(ColumnDef::new(SalaryRecord::Month)
                    .text()
                    .not_null())
                .col(money_column(SalaryRecord::GrossSalary)
                    .not_null())
                .col(money_column(SalaryRecord::TotalDeduction)
                    .not_null())
                .col(money_column(SalaryRecord::NetSalary)
                    .not_null())
                .take()
            ).await.unwrap();

        manager
            .create_index(IndexCreateStatement::new()
                .name("idx-salary_record-employee_number-month")
                .table(SalaryRecord::Table)
                .col(SalaryRecord::EmployeeNumber)
                .col(SalaryRecord::Month)
                .unique()
                .take()
            ).await.unwrap();

        manager
            .create_table(default_table_statement()
                .table(PayrollRecord::Table)
                .col(ColumnDef::new(PayrollRecord::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(PayrollRecord::Month)
                    .small_integer()
                    .not_null())
                .col(ColumnDef::new(PayrollRecord::Year)
                    .integer()
                    .not_null())
                .col(money_column(PayrollRecord::BasicSalary)
                    .not_null())
                .col(money_column(PayrollRecord::AllowanceOvertime)
                    .not_null()
                    .default(0))
                .col(money_column(PayrollRecord::AllowanceMedical)
                    .not_null()
                    .default(0))
                .col(money_column(PayrollRecord::AllowanceTransportation)
                    .not_null()
                    .default(0))
                .col(money_column(PayrollRecord::AllowanceOther)
                    .not_null()
                    .default(0))
                .col(money_column(PayrollRecord::DeductionTax)
                    .not_null()
                    .default(0))
                .col(money_column(PayrollRecord::DeductionInsurance)
                    .not_null()
                    .default(0))
                .col(money_column(PayrollRecord::DeductionLoan)
                    .not_null()
                    .default(0))
                .col(money_column(PayrollRecord::DeductionOther)
                    .not_null()
                    .default(0))
                .col(money_column(PayrollRecord::NetSalary)
                    .not_null())
                .col(ColumnDef::new(PayrollRecord::Status)
                    .custom(PayrollStatus::name())
                    .not_null())
                .col(ColumnDef::new(PayrollRecord::PaymentDate)
                    .timestamp_with_time_zone())
                .col(ColumnDef::new(PayrollRecord::PaymentMethod)
                    .custom(PaymentMethod::name())
                    .not_null())
                .col(ColumnDef::new(PayrollRecord::Comments)
                    .text())
                .col(ColumnDef::new(PayrollRecord::CreatedBy)
                    .uuid())
                .take()
            ).await.unwrap();

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(PayrollRecord::Table, PayrollRecord::EmployeeId)
            .to(Employee::Table, DefaultColumn::Id)
            .take()
        ).await.unwrap();

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(PayrollRecord::Table, PayrollRecord::CreatedBy)
            .to(User::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::SetNull)
            .on_update(ForeignKeyAction::Cascade)
            .take()
        ).await.unwrap();

        // Backstop for the duplicate pre-check done in the create handler
        manager
            .create_index(IndexCreateStatement::new()
                .name("idx-payroll_record-employee_id-month-year")
                .table(PayrollRecord::Table)
                .col(PayrollRecord::EmployeeId)
                .col(PayrollRecord::Month)
                .col(PayrollRecord::Year)
                .unique()
                .take()
            ).await.unwrap();

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(
            TableDropStatement::new()
                .table(PayrollRecord::Table)
                .take()
        ).await.unwrap();

        manager.drop_table(
            TableDropStatement::new()
                .table(SalaryRecord::Table)
                .take()
        ).await.unwrap();

        manager.drop_table(
            TableDropStatement::new()
                .table(Employee::Table)
                .take()
        ).await.unwrap();

        manager.drop_table(
            TableDropStatement::new()
                .table(Department::Table)
                .take()
        ).await.unwrap();

        manager.drop_table(
            TableDropStatement::new()
                .table(User::Table)
                .take()
        ).await.unwrap();

        manager.drop_type(
            TypeDropStatement::new()
                .name(PaymentMethod::name())
                .to_owned()
        ).await.unwrap();

        manager.drop_type(
            TypeDropStatement::new()
                .name(PayrollStatus::name())
                .to_owned()
        ).await.unwrap();

        manager.drop_type(
            TypeDropStatement::new()
                .name(GenderType::name())
                .to_owned()
        ).await.unwrap();

        manager.drop_type(
            TypeDropStatement::new()
                .name(RoleType::name())
                .to_owned()
        ).await.unwrap();

        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum User {
    Table,
    Username,
    Password,
    Role,
}

#[derive(Iden)]
enum Department {
    Table,
    Code,
    Name,
    GrossSalary,
    TotalDeduction,
}

#[derive(Iden)]
enum Employee {
    Table,
    EmployeeNumber,
    FirstName,
    LastName,
    Position,
    Address,
    Telephone,
    Gender,
    HiredDate,
    DepartmentCode,
}

#[derive(Iden)]
enum SalaryRecord {
    Table,
    EmployeeNumber,
    Month,
    GrossSalary,
    TotalDeduction,
    NetSalary,
}

#[derive(Iden)]
enum PayrollRecord {
    Table,
    EmployeeId,
    Month,
    Year,
    BasicSalary,
    AllowanceOvertime,
    AllowanceMedical,
    AllowanceTransportation,
    AllowanceOther,
    DeductionTax,
    DeductionInsurance,
    DeductionLoan,
    DeductionOther,
    NetSalary,
    Status,
    PaymentDate,
    PaymentMethod,
    Comments,
    CreatedBy,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
enum RoleType {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "hr")]
    Hr,
    #[sea_orm(string_value = "accountant")]
    Accountant,
    #[sea_orm(string_value = "staff")]
    Staff,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "gender_type")]
enum GenderType {
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payroll_status")]
enum PayrollStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "processed")]
    Processed,
    #[sea_orm(string_value = "paid")]
    Paid,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
enum PaymentMethod {
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "check")]
    Check,
}
