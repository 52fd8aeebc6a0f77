// config.rs
use hr_domain::documents::DEFAULT_MAX_UPLOAD_BYTES;
use hr_domain::DomainError;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_DB_URL: &str = "file:hrms?mode=memory&cache=shared";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads/documents";
pub const DEFAULT_POOL_SIZE: u32 = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("Variable {var} inválida: {value}")]
  Invalid { var: &'static str, value: String },
}

impl From<ConfigError> for DomainError {
  fn from(e: ConfigError) -> Self {
    DomainError::Storage(e.to_string())
  }
}

/// Configuración de almacenamiento leída del entorno (y de `.env`).
///
/// - `HRMS_DB_URL` (o `DATABASE_URL`): URL de la base de datos.
/// - `HRMS_DB_POOL_SIZE`: conexiones máximas del pool.
/// - `HRMS_UPLOAD_DIR`: directorio base de documentos.
/// - `HRMS_MAX_UPLOAD_BYTES`: tamaño máximo de un documento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
  pub database_url: String,
  pub pool_size: u32,
  pub upload_dir: PathBuf,
  pub max_upload_bytes: u64,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self { database_url: DEFAULT_DB_URL.to_string(),
           pool_size: DEFAULT_POOL_SIZE,
           upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
           max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES }
  }
}

impl PersistenceConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|var| std::env::var(var).ok())
  }

  /// Igual que `from_env` pero con una fuente de variables arbitraria.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where F: Fn(&str) -> Option<String>
  {
    let defaults = Self::default();
    let database_url = lookup("HRMS_DB_URL").or_else(|| lookup("DATABASE_URL"))
                                            .filter(|v| !v.trim().is_empty())
                                            .unwrap_or(defaults.database_url);
    let pool_size = match lookup("HRMS_DB_POOL_SIZE") {
      Some(v) => parse_positive("HRMS_DB_POOL_SIZE", &v)?,
      None => defaults.pool_size,
    };
    let upload_dir = lookup("HRMS_UPLOAD_DIR").filter(|v| !v.trim().is_empty())
                                              .map(PathBuf::from)
                                              .unwrap_or(defaults.upload_dir);
    let max_upload_bytes = match lookup("HRMS_MAX_UPLOAD_BYTES") {
      Some(v) => parse_positive("HRMS_MAX_UPLOAD_BYTES", &v)?,
      None => defaults.max_upload_bytes,
    };
    Ok(Self { database_url, pool_size, upload_dir, max_upload_bytes })
  }
}

fn parse_positive<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
  where T: std::str::FromStr + PartialOrd + Default
{
  match value.trim().parse::<T>() {
    Ok(n) if n > T::default() => Ok(n),
    _ => Err(ConfigError::Invalid { var, value: value.to_string() }),
  }
}
