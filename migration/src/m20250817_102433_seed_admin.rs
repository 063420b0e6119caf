use sea_orm_migration::prelude::*;
use sha2::Digest as _;

use crate::m20250816_073512_init::User;

const ADMIN_ID: u128 = 1;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let time = Expr::val("2025-08-17T10:24:33.000Z").cast_as("timestamptz");

        // Bootstrap account, rotate the password after the first login
        let hashed_password = &sha2::Sha256::digest("admin:admin")[..];

        manager
            .exec_stmt(Query::insert()
                .into_table(User::Table)
                .columns(["id", "created_at", "updated_at", "username", "password", "role"])
                .values_panic([Expr::val(format!("{:032x}", ADMIN_ID)).cast_as("uuid"), time.clone(), time.clone(), "admin".into(), hashed_password.into(), Expr::val("admin").cast_as("role_type")])
                .to_owned()
        ).await.unwrap();

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete()
                .from_table(User::Table)
                .and_where(Expr::col("id").eq(Expr::val(format!("{:032x}", ADMIN_ID)).cast_as("uuid")))
                .to_owned()
        ).await.unwrap();

        Ok(())
    }
}
