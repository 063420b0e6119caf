pub use sea_orm_migration::prelude::*;

mod util;
mod m20250816_073512_init;
mod m20250817_102433_seed_admin;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250816_073512_init::Migration),
            Box::new(m20250817_102433_seed_admin::Migration),
        ]
    }
}
