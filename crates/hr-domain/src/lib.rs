//! Crate `hr-domain`: modelo y reglas del ciclo de vida de empleados.
//!
//! Define el registro `Employee`, la validación de campos, la taxonomía de
//! errores, el contrato del almacén (`EmployeeRepository`) con una
//! implementación en memoria, el generador de códigos, el validador de
//! unicidad y el servicio `EmployeeService` que orquesta altas,
//! actualizaciones, bajas y documentos.
//!
//! ```rust
//! use hr_domain::{EmployeeService, EmployeeStubs, InMemoryEmployeeRepository};
//! use std::sync::Arc;
//! let service = EmployeeService::new(Arc::new(InMemoryEmployeeRepository::new()));
//! let created = service.create(EmployeeStubs::sample_input(1)).unwrap();
//! assert_eq!(created.employee_code, "EMP0001");
//! ```
pub mod code;
pub mod documents;
mod domain_repository;
mod employee;
mod employee_stubs;
mod errors;
pub mod service;
pub mod uniqueness;
pub mod validation;

pub use code::{format_code, parse_code, CodeGenerator};
pub use documents::{DocumentKind, DocumentPatch, DocumentStore, DocumentUploadService, InMemoryDocumentStore,
                    StoredDocument, UploadOutcome};
pub use domain_repository::{EmployeeRepository, InMemoryEmployeeRepository};
pub use employee::{Employee, EmployeeId, EmployeeInput, EmployeeStatus, UniqueKey};
pub use employee_stubs::EmployeeStubs;
pub use errors::{DomainError, FieldError};
pub use service::EmployeeService;
