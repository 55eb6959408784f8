//! database migrations for gavel.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_listings;
mod m20260301_000002_create_settlements;
mod m20260301_000003_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_listings::Migration),
            Box::new(m20260301_000002_create_settlements::Migration),
            Box::new(m20260301_000003_create_notifications::Migration),
        ]
    }
}
