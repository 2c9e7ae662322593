//! Concrete adapter implementations for ports.

pub mod console_adapter;
pub mod csv_adapter;
pub mod csv_table_adapter;
pub mod file_config_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
#[cfg(feature = "telegram")]
pub mod telegram_adapter;
