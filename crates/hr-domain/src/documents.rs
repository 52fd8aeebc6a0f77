// documents.rs
use crate::domain_repository::EmployeeRepository;
use crate::service::EmployeeService;
use crate::{DomainError, Employee, EmployeeId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Límite por defecto de tamaño de subida (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Las cuatro ranuras de documentos de un empleado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
  Aadhaar,
  Pan,
  Photo,
  Other,
}

impl DocumentKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Aadhaar => "aadhaar",
      Self::Pan => "pan",
      Self::Photo => "photo",
      Self::Other => "other",
    }
  }

  /// Parche que sólo toca la ranura de este tipo.
  pub fn patch(&self, path: impl Into<String>) -> DocumentPatch {
    let path = Some(path.into());
    match self {
      Self::Aadhaar => DocumentPatch { aadhaar_document: path, ..Default::default() },
      Self::Pan => DocumentPatch { pan_document: path, ..Default::default() },
      Self::Photo => DocumentPatch { photo: path, ..Default::default() },
      Self::Other => DocumentPatch { other_documents: path, ..Default::default() },
    }
  }

  pub fn slot<'a>(&self, employee: &'a Employee) -> Option<&'a str> {
    match self {
      Self::Aadhaar => employee.aadhaar_document.as_deref(),
      Self::Pan => employee.pan_document.as_deref(),
      Self::Photo => employee.photo.as_deref(),
      Self::Other => employee.other_documents.as_deref(),
    }
  }
}

impl fmt::Display for DocumentKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DocumentKind {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "aadhaar" => Ok(Self::Aadhaar),
      "pan" => Ok(Self::Pan),
      "photo" => Ok(Self::Photo),
      "other" => Ok(Self::Other),
      _ => Err(DomainError::invalid("documentType", format!("tipo de documento inválido: {}", s))),
    }
  }
}

/// Nuevos valores para las ranuras de documentos. `None` deja la ranura
/// intacta; no hay forma de vaciar una ranura con un parche.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
  pub aadhaar_document: Option<String>,
  pub pan_document: Option<String>,
  pub photo: Option<String>,
  pub other_documents: Option<String>,
}

impl DocumentPatch {
  pub fn is_empty(&self) -> bool {
    self.aadhaar_document.is_none() && self.pan_document.is_none() && self.photo.is_none()
    && self.other_documents.is_none()
  }

  pub fn apply(&self, employee: &mut Employee) {
    if let Some(v) = &self.aadhaar_document {
      employee.aadhaar_document = Some(v.clone());
    }
    if let Some(v) = &self.pan_document {
      employee.pan_document = Some(v.clone());
    }
    if let Some(v) = &self.photo {
      employee.photo = Some(v.clone());
    }
    if let Some(v) = &self.other_documents {
      employee.other_documents = Some(v.clone());
    }
  }
}

/// Resultado de guardar un fichero en el almacén de documentos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
  /// Ruta relativa `categoria/nombre`, la que se guarda en el registro.
  pub path: String,
  pub size: u64,
  pub sha256: String,
}

/// Almacén físico de ficheros. No es transaccional con el almacén de
/// registros.
pub trait DocumentStore: Send + Sync {
  /// Guarda los bytes bajo `category` con un nombre nuevo y devuelve la ruta
  /// relativa.
  fn store(&self, bytes: &[u8], original_name: &str, category: &str) -> Result<StoredDocument, DomainError>;

  /// Borra el fichero; `false` si no existía.
  fn delete(&self, path: &str) -> Result<bool, DomainError>;

  /// Ruta absoluta (o equivalente) de un fichero guardado.
  fn resolve(&self, path: &str) -> Result<PathBuf, DomainError>;
}

/// Nombre único para un fichero subido, conservando la extensión original.
pub fn unique_file_name(original_name: &str) -> String {
  let ext = Path::new(original_name).extension()
                                    .and_then(|e| e.to_str())
                                    .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));
  match ext {
    Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_lowercase()),
    None => Uuid::new_v4().to_string(),
  }
}

pub fn checksum(bytes: &[u8]) -> String {
  format!("{:x}", Sha256::digest(bytes))
}

/// Acepta sólo rutas relativas sin `..`; evita salir del directorio base.
pub fn check_relative_path(path: &str) -> Result<&Path, DomainError> {
  let p = Path::new(path);
  if path.trim().is_empty() || !p.components().all(|c| matches!(c, Component::Normal(_))) {
    return Err(DomainError::invalid("filePath", format!("ruta de documento inválida: {}", path)));
  }
  Ok(p)
}

/// Categoría de almacenamiento de los documentos de un empleado.
pub fn employee_category(id: EmployeeId) -> String {
  format!("employee-{}", id)
}

/// Almacén de documentos en memoria para tests y demos.
#[derive(Default)]
pub struct InMemoryDocumentStore {
  files: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryDocumentStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn contains(&self, path: &str) -> bool {
    self.files.lock().unwrap_or_else(|e| e.into_inner()).contains_key(path)
  }

  pub fn len(&self) -> usize {
    self.files.lock().unwrap_or_else(|e| e.into_inner()).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl DocumentStore for InMemoryDocumentStore {
  fn store(&self, bytes: &[u8], original_name: &str, category: &str) -> Result<StoredDocument, DomainError> {
    check_relative_path(category)?;
    let path = format!("{}/{}", category, unique_file_name(original_name));
    self.files.lock().unwrap_or_else(|e| e.into_inner()).insert(path.clone(), bytes.to_vec());
    Ok(StoredDocument { path, size: bytes.len() as u64, sha256: checksum(bytes) })
  }

  fn delete(&self, path: &str) -> Result<bool, DomainError> {
    check_relative_path(path)?;
    Ok(self.files.lock().unwrap_or_else(|e| e.into_inner()).remove(path).is_some())
  }

  fn resolve(&self, path: &str) -> Result<PathBuf, DomainError> {
    Ok(PathBuf::from("memory").join(check_relative_path(path)?))
  }
}

/// Resultado de una subida asociada a un empleado.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
  pub employee: Employee,
  pub document: StoredDocument,
  pub kind: DocumentKind,
}

/// Orquesta la subida de un documento: guarda el fichero y después asocia su
/// ruta al registro.
///
/// Los dos almacenes no comparten transacción. Para reducir ficheros
/// huérfanos se comprueba que el empleado exista antes de escribir, se borra
/// el fichero nuevo si la asociación falla y se borra el fichero reemplazado
/// cuando la asociación tiene éxito. Los borrados son de mejor esfuerzo: si
/// fallan sólo se registra un aviso.
pub struct DocumentUploadService<R, S>
  where R: EmployeeRepository,
        S: DocumentStore
{
  employees: Arc<EmployeeService<R>>,
  store: Arc<S>,
  max_bytes: u64,
}

impl<R, S> DocumentUploadService<R, S>
  where R: EmployeeRepository,
        S: DocumentStore
{
  pub fn new(employees: Arc<EmployeeService<R>>, store: Arc<S>) -> Self {
    Self { employees, store, max_bytes: DEFAULT_MAX_UPLOAD_BYTES }
  }

  pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
    self.max_bytes = max_bytes;
    self
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  pub fn upload(&self,
                id: EmployeeId,
                kind: DocumentKind,
                original_name: &str,
                bytes: &[u8])
                -> Result<UploadOutcome, DomainError> {
    if bytes.is_empty() {
      return Err(DomainError::invalid("file", "el fichero está vacío"));
    }
    if bytes.len() as u64 > self.max_bytes {
      return Err(DomainError::invalid("file", format!("el fichero supera el límite de {} bytes", self.max_bytes)));
    }
    // sin empleado no se escribe ningún fichero
    self.employees.get_by_id(id)?;

    let document = self.store.store(bytes, original_name, &employee_category(id))?;
    log::debug!("documento {} guardado en {} ({} bytes)", kind, document.path, document.size);

    let (employee, replaced) = match self.employees.replace_document(id, kind, &document.path) {
      Ok(done) => done,
      Err(err) => {
        self.discard(&document.path);
        return Err(err);
      }
    };

    if let Some(old) = replaced.filter(|old| *old != document.path) {
      self.discard(&old);
    }
    Ok(UploadOutcome { employee, document, kind })
  }

  /// Ruta absoluta del documento de tipo `kind` de un empleado.
  pub fn resolve(&self, id: EmployeeId, kind: DocumentKind) -> Result<PathBuf, DomainError> {
    let employee = self.employees.get_by_id(id)?;
    let path = kind.slot(&employee)
                   .ok_or_else(|| DomainError::NotFound(format!("documento {} del empleado {}", kind, id)))?;
    self.store.resolve(path)
  }

  fn discard(&self, path: &str) {
    match self.store.delete(path) {
      Ok(true) => log::debug!("documento {} eliminado", path),
      Ok(false) => log::warn!("documento {} no existía al limpiar", path),
      Err(e) => log::warn!("no se pudo eliminar el documento {}: {}", path, e),
    }
  }
}
