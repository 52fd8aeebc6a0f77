// errors.rs
use crate::UniqueKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error de validación asociado a un campo concreto del registro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub field: String,
  pub message: String,
}

impl FieldError {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { field: field.into(), message: message.into() }
  }
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.field, self.message)
  }
}

fn join_field_errors(errors: &[FieldError]) -> String {
  errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
  #[error("Error de validación: {}", join_field_errors(.0))]
  Validation(Vec<FieldError>),
  #[error("Valor duplicado en {field}: {value}")]
  DuplicateKey { field: UniqueKey, value: String },
  #[error("Empleado no encontrado: {0}")]
  NotFound(String),
  #[error("Error de almacenamiento: {0}")]
  Storage(String),
}

impl DomainError {
  /// Atajo para un único error de campo.
  pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Validation(vec![FieldError::new(field, message)])
  }

  pub fn not_found_id(id: i64) -> Self {
    Self::NotFound(format!("id {}", id))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound(_))
  }
}

impl From<std::io::Error> for DomainError {
  fn from(e: std::io::Error) -> Self {
    Self::Storage(e.to_string())
  }
}
