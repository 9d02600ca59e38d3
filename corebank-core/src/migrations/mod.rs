//! Database migrations - embedded SQL files
//!
//! Each entry is `(file name, sql)`. Names sort in application order and are
//! recorded in `sys_migrations` once applied.

/// Name of the bookkeeping migration that creates `sys_migrations`
pub const BOOTSTRAP: &str = "000_migrations.sql";

/// All migrations, embedded at compile time
///
/// When adding a migration, create `NNN_description.sql` next to this file
/// and append it here.
pub const MIGRATIONS: &[(&str, &str)] = &[
    (BOOTSTRAP, include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
