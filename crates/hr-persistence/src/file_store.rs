// file_store.rs
use hr_domain::documents::{check_relative_path, checksum, unique_file_name};
use hr_domain::{DocumentStore, DomainError, StoredDocument};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Almacén de documentos sobre el sistema de ficheros local.
///
/// Cada documento se guarda en `base_dir/categoria/<uuid>.<ext>` y el
/// registro sólo conserva la ruta relativa `categoria/<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
  base_dir: PathBuf,
}

impl LocalDocumentStore {
  /// Crea el directorio base si no existe.
  pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
    let base_dir = base_dir.into();
    fs::create_dir_all(&base_dir)?;
    Ok(Self { base_dir })
  }

  pub fn base_dir(&self) -> &Path {
    &self.base_dir
  }
}

impl DocumentStore for LocalDocumentStore {
  fn store(&self, bytes: &[u8], original_name: &str, category: &str) -> Result<StoredDocument, DomainError> {
    let dir = self.base_dir.join(check_relative_path(category)?);
    fs::create_dir_all(&dir)?;
    let name = unique_file_name(original_name);
    fs::write(dir.join(&name), bytes)?;
    log::debug!("fichero {} escrito en {}", name, dir.display());
    Ok(StoredDocument { path: format!("{}/{}", category, name), size: bytes.len() as u64, sha256: checksum(bytes) })
  }

  fn delete(&self, path: &str) -> Result<bool, DomainError> {
    let full = self.base_dir.join(check_relative_path(path)?);
    match fs::remove_file(full) {
      Ok(()) => Ok(true),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e.into()),
    }
  }

  fn resolve(&self, path: &str) -> Result<PathBuf, DomainError> {
    Ok(self.base_dir.join(check_relative_path(path)?))
  }
}
