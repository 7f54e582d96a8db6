pub use sea_orm_migration::prelude::*;

mod m20250612_000001_create_users;
mod m20250612_000002_create_drivers;
mod m20250612_000003_create_promo_codes;
mod m20250612_000004_create_rides;
mod m20250612_000005_create_orders;
mod m20250612_000006_create_messages;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250612_000001_create_users::Migration),
            Box::new(m20250612_000002_create_drivers::Migration),
            Box::new(m20250612_000003_create_promo_codes::Migration),
            Box::new(m20250612_000004_create_rides::Migration),
            Box::new(m20250612_000005_create_orders::Migration),
            Box::new(m20250612_000006_create_messages::Migration),
        ]
    }
}
