//! Database migrations for Atrium
//!
//! The schema runs on both PostgreSQL and SQLite. Foreign keys are declared inside
//! `create_table` because SQLite cannot add them afterwards.

pub use sea_orm_migration::prelude::*;

mod migration;
pub use migration::Migrator;
