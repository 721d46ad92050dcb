// Relational schema for the employee table, applied by `Database::run_migrations`.

pub const EMPLOYEES_SCHEMA: &str = include_str!("../../migrations/001_employees.sql");
