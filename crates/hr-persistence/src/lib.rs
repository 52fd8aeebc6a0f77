//! Persistencia Diesel para el repositorio de empleados y almacén local de
//! documentos.
//! Este archivo expone el módulo `schema`, la configuración leída del
//! entorno y reexporta las implementaciones de `EmployeeRepository` y
//! `DocumentStore`. La implementación detallada está en
//! `employee_persistence.rs` y `file_store.rs`.

pub mod config;
mod employee_persistence;
mod file_store;
pub mod schema;

pub use config::{ConfigError, PersistenceConfig};
#[cfg(not(feature = "pg"))]
pub use employee_persistence::new_sqlite_for_test;
pub use employee_persistence::{new_from_config, new_from_env, DieselEmployeeRepository, MIGRATIONS};
pub use file_store::LocalDocumentStore;
