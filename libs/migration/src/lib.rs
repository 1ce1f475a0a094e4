pub use sea_orm_migration::prelude::*;

mod m20250901_000000_create_identity;
mod m20250901_000001_create_notes;
mod m20250901_000002_seed_roles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000000_create_identity::Migration),
            Box::new(m20250901_000001_create_notes::Migration),
            Box::new(m20250901_000002_seed_roles::Migration),
        ]
    }
}
