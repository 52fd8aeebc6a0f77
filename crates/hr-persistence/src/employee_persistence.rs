use crate::config::PersistenceConfig;
use crate::schema::employee_sequence::dsl as seq_dsl;
use crate::schema::employees;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
#[cfg(not(feature = "pg"))]
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
#[cfg(not(feature = "pg"))]
use diesel::r2d2::CustomizeConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Text;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use hr_domain::{DomainError, Employee, EmployeeId, EmployeeRepository, EmployeeStatus, UniqueKey};
use std::sync::Arc;
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");
#[cfg(feature = "pg")]
type DbConn = PgConnection;
#[cfg(not(feature = "pg"))]
type DbConn = SqliteConnection;
#[cfg(feature = "pg")]
type DbBackend = diesel::pg::Pg;
#[cfg(not(feature = "pg"))]
type DbBackend = diesel::sqlite::Sqlite;
type DbPool = Pool<ConnectionManager<DbConn>>;
/// Fila de `employee_sequence` que alimenta los ids de empleados.
const EMPLOYEE_SEQUENCE: &str = "employee";
diesel::define_sql_function!(fn lower(x: Text) -> Text);
/// Repo Diesel que implementa `EmployeeRepository`.
///
/// Las restricciones UNIQUE de la tabla son la garantía final de unicidad:
/// una violación se traduce a `DomainError::DuplicateKey` con el campo
/// afectado.
pub struct DieselEmployeeRepository {
  pool: Arc<DbPool>,
}
// Cada conexión nueva del pool espera a los bloqueos en lugar de fallar al
// instante; la escritura concurrente en SQLite depende de ello. `lower` se
// reemplaza por una versión Unicode: la nativa de SQLite sólo pliega ASCII.
#[cfg(not(feature = "pg"))]
#[derive(Debug)]
struct SqlitePragmas;
#[cfg(not(feature = "pg"))]
impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
  fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
    conn.batch_execute("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
        .map_err(diesel::r2d2::Error::QueryError)?;
    lower_utils::register_impl(conn, |x: String| x.to_lowercase()).map_err(diesel::r2d2::Error::QueryError)
  }
}
/// URL de SQLite en memoria. Cada conexión privada sería otra base y la caché
/// compartida bloquea por tabla sin respetar `busy_timeout`, así que estas
/// URLs se sirven con una única conexión que no caduca.
pub fn is_in_memory_url(database_url: &str) -> bool {
  let l = database_url.to_lowercase();
  l == ":memory:" || l.contains("mode=memory")
}
impl DieselEmployeeRepository {
  pub fn new(database_url: &str) -> Result<Self, DomainError> {
    Self::with_pool_size(database_url, crate::config::DEFAULT_POOL_SIZE)
  }
  pub fn with_pool_size(database_url: &str, pool_size: u32) -> Result<Self, DomainError> {
    let manager = ConnectionManager::<DbConn>::new(database_url);
    let in_memory = is_in_memory_url(database_url);
    let pool_size = if in_memory { 1 } else { pool_size };
    let mut builder = Pool::builder().max_size(pool_size);
    if in_memory {
      builder = builder.max_lifetime(None).idle_timeout(None);
    }
    #[cfg(not(feature = "pg"))]
    let builder = builder.connection_customizer(Box::new(SqlitePragmas));
    let pool = builder.build(manager)
                      .map_err(|e| DomainError::Storage(format!("no se pudo crear el pool de conexiones: {}", e)))?;
    let repo = DieselEmployeeRepository { pool: Arc::new(pool) };
    let mut c = repo.conn()?;
    c.run_pending_migrations(MIGRATIONS).map_err(|e| DomainError::Storage(format!("migraciones: {}", e)))?;
    log::debug!("repositorio de empleados listo (pool de {})", pool_size);
    Ok(repo)
  }
  fn conn_raw(&self) -> std::result::Result<PooledConnection<ConnectionManager<DbConn>>, r2d2::Error> {
    self.pool.get()
  }
  fn conn(&self) -> Result<PooledConnection<ConnectionManager<DbConn>>, DomainError> {
    self.conn_raw().map_err(|e| DomainError::Storage(format!("pool: {}", e)))
  }
}
// Fila Diesel de la tabla employees, en el orden de las columnas.
#[derive(Debug, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = employees)]
#[diesel(primary_key(employee_id))]
#[diesel(treat_none_as_null = true)]
struct EmployeeRow {
  pub employee_id: i64,
  pub employee_code: String,
  pub first_name: String,
  pub last_name: String,
  pub mobile_no: String,
  pub email: Option<String>,
  pub aadhaar_no: String,
  pub pan_no: String,
  pub account_no: String,
  pub ifsc_code: String,
  pub bank_name: String,
  pub uan_no: Option<String>,
  pub pf_no: Option<String>,
  pub qualification: Option<String>,
  pub dob: NaiveDate,
  pub address: String,
  pub status: String,
  pub date_of_joining: NaiveDate,
  pub date_of_leaving: Option<NaiveDate>,
  pub aadhaar_document: Option<String>,
  pub pan_document: Option<String>,
  pub photo: Option<String>,
  pub other_documents: Option<String>,
  pub created_at: NaiveDateTime,
  pub updated_at: NaiveDateTime,
}
impl From<&Employee> for EmployeeRow {
  fn from(e: &Employee) -> Self {
    EmployeeRow { employee_id: e.id,
                  employee_code: e.employee_code.clone(),
                  first_name: e.first_name.clone(),
                  last_name: e.last_name.clone(),
                  mobile_no: e.mobile_no.clone(),
                  email: e.email.clone(),
                  aadhaar_no: e.aadhaar_no.clone(),
                  pan_no: e.pan_no.clone(),
                  account_no: e.account_no.clone(),
                  ifsc_code: e.ifsc_code.clone(),
                  bank_name: e.bank_name.clone(),
                  uan_no: e.uan_no.clone(),
                  pf_no: e.pf_no.clone(),
                  qualification: e.qualification.clone(),
                  dob: e.dob,
                  address: e.address.clone(),
                  status: e.status.as_str().to_string(),
                  date_of_joining: e.date_of_joining,
                  date_of_leaving: e.date_of_leaving,
                  aadhaar_document: e.aadhaar_document.clone(),
                  pan_document: e.pan_document.clone(),
                  photo: e.photo.clone(),
                  other_documents: e.other_documents.clone(),
                  created_at: e.created_at.naive_utc(),
                  updated_at: e.updated_at.naive_utc() }
  }
}
impl EmployeeRow {
  fn into_employee(self) -> Result<Employee, DomainError> {
    Ok(Employee { id: self.employee_id,
                  employee_code: self.employee_code,
                  first_name: self.first_name,
                  last_name: self.last_name,
                  mobile_no: self.mobile_no,
                  email: self.email,
                  aadhaar_no: self.aadhaar_no,
                  pan_no: self.pan_no,
                  account_no: self.account_no,
                  ifsc_code: self.ifsc_code,
                  bank_name: self.bank_name,
                  uan_no: self.uan_no,
                  pf_no: self.pf_no,
                  qualification: self.qualification,
                  dob: self.dob,
                  address: self.address,
                  status: self.status.parse::<EmployeeStatus>()?,
                  date_of_joining: self.date_of_joining,
                  date_of_leaving: self.date_of_leaving,
                  aadhaar_document: self.aadhaar_document,
                  pan_document: self.pan_document,
                  photo: self.photo,
                  other_documents: self.other_documents,
                  created_at: DateTime::from_naive_utc_and_offset(self.created_at, Utc),
                  updated_at: DateTime::from_naive_utc_and_offset(self.updated_at, Utc) })
  }
}
fn map_db_err<T>(res: std::result::Result<T, DieselError>) -> Result<T, DomainError> {
  res.map_err(|e| DomainError::Storage(format!("db: {}", e)))
}
/// Traduce una violación UNIQUE a `DuplicateKey` localizando la columna en el
/// nombre de la restricción o en el mensaje del motor.
fn map_save_err(err: DieselError, employee: &Employee) -> DomainError {
  if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &err {
    let hint = format!("{} {}", info.constraint_name().unwrap_or_default(), info.message());
    if let Some(key) = UniqueKey::ALL.into_iter().find(|k| hint.contains(k.column())) {
      let value = key.value_of(employee).unwrap_or_default().to_string();
      return DomainError::DuplicateKey { field: key, value };
    }
  }
  DomainError::Storage(format!("db: {}", err))
}
fn rows_to_employees(rows: Vec<EmployeeRow>) -> Result<Vec<Employee>, DomainError> {
  rows.into_iter().map(EmployeeRow::into_employee).collect()
}
fn filter_by_key<'a>(key: UniqueKey, value: &'a str) -> employees::BoxedQuery<'a, DbBackend> {
  let query = employees::table.into_boxed();
  match key {
    UniqueKey::EmployeeCode => query.filter(employees::employee_code.eq(value)),
    UniqueKey::MobileNo => query.filter(employees::mobile_no.eq(value)),
    UniqueKey::Email => query.filter(employees::email.eq(value)),
    UniqueKey::AadhaarNo => query.filter(employees::aadhaar_no.eq(value)),
    UniqueKey::PanNo => query.filter(employees::pan_no.eq(value)),
    UniqueKey::AccountNo => query.filter(employees::account_no.eq(value)),
    UniqueKey::UanNo => query.filter(employees::uan_no.eq(value)),
  }
}
/// Patrón LIKE que busca `keyword` literalmente, en minúsculas.
fn like_pattern(keyword: &str) -> String {
  let mut pattern = String::from("%");
  for c in keyword.to_lowercase().chars() {
    if matches!(c, '\\' | '%' | '_') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}
// Transacción de escritura. En SQLite se toma el bloqueo de escritura al
// empezar para que dos escritores no choquen al promocionar un bloqueo de
// lectura.
fn write_tx<T, F>(conn: &mut DbConn, f: F) -> Result<T, DieselError>
  where F: FnOnce(&mut DbConn) -> Result<T, DieselError>
{
  #[cfg(not(feature = "pg"))]
  {
    conn.immediate_transaction(f)
  }
  #[cfg(feature = "pg")]
  {
    conn.transaction(f)
  }
}
impl EmployeeRepository for DieselEmployeeRepository {
  fn get_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, DomainError> {
    let mut conn = self.conn()?;
    let opt = map_db_err(employees::table.find(id).first::<EmployeeRow>(&mut conn).optional())?;
    opt.map(EmployeeRow::into_employee).transpose()
  }
  fn get_by_unique_key(&self, key: UniqueKey, value: &str) -> Result<Option<Employee>, DomainError> {
    let mut conn = self.conn()?;
    let opt = map_db_err(filter_by_key(key, value).first::<EmployeeRow>(&mut conn).optional())?;
    opt.map(EmployeeRow::into_employee).transpose()
  }
  fn exists_by_unique_key(&self,
                          key: UniqueKey,
                          value: &str,
                          exclude_id: Option<EmployeeId>)
                          -> Result<bool, DomainError> {
    let mut conn = self.conn()?;
    let mut query = filter_by_key(key, value);
    if let Some(id) = exclude_id {
      query = query.filter(employees::employee_id.ne(id));
    }
    let found = map_db_err(query.select(employees::employee_id).first::<i64>(&mut conn).optional())?;
    Ok(found.is_some())
  }
  fn list_by_status(&self, status: EmployeeStatus) -> Result<Vec<Employee>, DomainError> {
    let mut conn = self.conn()?;
    let rows = map_db_err(employees::table.filter(employees::status.eq(status.as_str()))
                                          .order(employees::employee_id.asc())
                                          .load::<EmployeeRow>(&mut conn))?;
    rows_to_employees(rows)
  }
  fn list_all(&self) -> Result<Vec<Employee>, DomainError> {
    let mut conn = self.conn()?;
    let rows = map_db_err(employees::table.order(employees::employee_id.asc()).load::<EmployeeRow>(&mut conn))?;
    rows_to_employees(rows)
  }
  fn search(&self, keyword: &str) -> Result<Vec<Employee>, DomainError> {
    let mut conn = self.conn()?;
    let pattern = like_pattern(keyword);
    let p = pattern.as_str();
    let matches = lower(employees::first_name).like(p)
                                              .escape('\\')
                                              .or(lower(employees::last_name).like(p).escape('\\'))
                                              .or(lower(employees::employee_code).like(p).escape('\\'));
    let rows = map_db_err(employees::table.filter(matches)
                                          .order(employees::employee_id.asc())
                                          .load::<EmployeeRow>(&mut conn))?;
    rows_to_employees(rows)
  }
  fn max_assigned_id(&self) -> Result<Option<EmployeeId>, DomainError> {
    let mut conn = self.conn()?;
    let value = map_db_err(seq_dsl::employee_sequence.find(EMPLOYEE_SEQUENCE)
                                                     .select(seq_dsl::value)
                                                     .first::<i64>(&mut conn)
                                                     .optional())?;
    Ok(value.filter(|v| *v > 0))
  }
  fn next_id(&self) -> Result<EmployeeId, DomainError> {
    let mut conn = self.conn()?;
    map_db_err(write_tx(&mut conn, |c| {
                 diesel::update(seq_dsl::employee_sequence.find(EMPLOYEE_SEQUENCE)).set(seq_dsl::value
                                                                                          .eq(seq_dsl::value + 1))
                                                                                     .execute(c)?;
                 seq_dsl::employee_sequence.find(EMPLOYEE_SEQUENCE).select(seq_dsl::value).first::<i64>(c)
               }))
  }
  fn save(&self, employee: Employee) -> Result<Employee, DomainError> {
    let mut conn = self.conn()?;
    let row = EmployeeRow::from(&employee);
    let res = write_tx(&mut conn, |c| {
      let exists = employees::table.find(row.employee_id)
                                   .select(employees::employee_id)
                                   .first::<i64>(c)
                                   .optional()?
                                   .is_some();
      if exists {
        diesel::update(employees::table.find(row.employee_id)).set(&row).execute(c)?;
      } else {
        diesel::insert_into(employees::table).values(&row).execute(c)?;
        // ids dados a mano también avanzan la secuencia para no reutilizarse
        diesel::update(seq_dsl::employee_sequence.find(EMPLOYEE_SEQUENCE)
                                                 .filter(seq_dsl::value.lt(row.employee_id))).set(seq_dsl::value
                                                                                                   .eq(row.employee_id))
                                                                                              .execute(c)?;
      }
      Ok(())
    });
    match res {
      Ok(()) => Ok(employee),
      Err(e) => Err(map_save_err(e, &employee)),
    }
  }
  fn delete_by_id(&self, id: EmployeeId) -> Result<bool, DomainError> {
    let mut conn = self.conn()?;
    let n = map_db_err(diesel::delete(employees::table.find(id)).execute(&mut conn))?;
    Ok(n > 0)
  }
  fn exists_by_id(&self, id: EmployeeId) -> Result<bool, DomainError> {
    let mut conn = self.conn()?;
    let found =
      map_db_err(employees::table.find(id).select(employees::employee_id).first::<i64>(&mut conn).optional())?;
    Ok(found.is_some())
  }
}
/// Crear repo desde una configuración ya resuelta.
pub fn new_from_config(config: &PersistenceConfig) -> Result<DieselEmployeeRepository, DomainError> {
  let url = config.database_url.as_str();
  let l = url.to_lowercase();
  let looks_pg = l.starts_with("postgres://") || l.starts_with("postgresql://");
  if cfg!(feature = "pg") && !looks_pg {
    return Err(DomainError::Storage("HRMS_DB_URL / DATABASE_URL does not look like Postgres URL".into()));
  }
  if !cfg!(feature = "pg") && looks_pg {
    return Err(DomainError::Storage("hr-persistence was compiled without 'pg' feature; enable the 'pg' feature to use \
                                     Postgres"
                                              .into()));
  }
  DieselEmployeeRepository::with_pool_size(url, config.pool_size)
}
/// Crear repo desde las variables de entorno (SQLite en memoria por defecto).
pub fn new_from_env() -> Result<DieselEmployeeRepository, DomainError> {
  let config = PersistenceConfig::from_env()?;
  new_from_config(&config)
}
// Test helper: construye el repo sobre SQLite sin pasar por el entorno.
#[cfg(not(feature = "pg"))]
pub fn new_sqlite_for_test(database_url: &str) -> Result<DieselEmployeeRepository, DomainError> {
  DieselEmployeeRepository::new(database_url)
}
#[cfg(test)]
mod tests {
  use super::*;
  #[test]
  fn memory_urls_are_detected() {
    assert!(is_in_memory_url("file:hrms?mode=memory&cache=shared"));
    assert!(is_in_memory_url(":memory:"));
    assert!(!is_in_memory_url("hrms.db"));
    assert!(!is_in_memory_url("postgres://u@localhost/hrms"));
  }
  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("Ann"), "%ann%");
    assert_eq!(like_pattern("50%_x"), "%50\\%\\_x%");
    assert_eq!(like_pattern(""), "%%");
  }
  #[test]
  fn row_conversion_keeps_every_field() {
    let mut e = hr_domain::EmployeeStubs::sample_employee(7, 7);
    e.status = EmployeeStatus::Resigned;
    e.photo = Some("employee-7/p.png".into());
    let back = EmployeeRow::from(&e).into_employee().unwrap();
    assert_eq!(back, e);
  }
  #[test]
  fn unknown_status_in_row_is_an_error() {
    let mut row = EmployeeRow::from(&hr_domain::EmployeeStubs::sample_employee(1, 1));
    row.status = "ON_LEAVE".into();
    assert!(row.into_employee().is_err());
  }
}
