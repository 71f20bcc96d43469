pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_campuses_careers_users;
mod m20250301_000002_create_students_payments;
mod m20250302_000001_create_staff_expenses;
mod m20250305_000001_create_deletion_requests;
mod m20250310_000001_create_subjects;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_campuses_careers_users::Migration),
            Box::new(m20250301_000002_create_students_payments::Migration),
            Box::new(m20250302_000001_create_staff_expenses::Migration),
            Box::new(m20250305_000001_create_deletion_requests::Migration),
            Box::new(m20250310_000001_create_subjects::Migration),
        ]
    }
}
