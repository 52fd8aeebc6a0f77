// Archivo: service.rs
// Propósito: implementar `EmployeeService`, la capa que gobierna el ciclo de
// vida de los registros (alta, actualización, bajas lógica y física,
// asociación de documentos). Debe invocarse desde handlers HTTP, la CLI o
// cualquier otra capa de entrada.
use crate::code::CodeGenerator;
use crate::documents::{DocumentKind, DocumentPatch};
use crate::domain_repository::EmployeeRepository;
use crate::uniqueness::ensure_unique;
use crate::validation::{normalize, validate_input};
use crate::{DomainError, Employee, EmployeeId, EmployeeInput, EmployeeStatus, UniqueKey};
use chrono::{Local, NaiveDate, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

/// Reintentos ante una colisión de código detectada por el almacén.
pub const MAX_CODE_ATTEMPTS: usize = 3;

/// Servicio de alto nivel sobre los registros de empleados.
///
/// Las operaciones que escriben se serializan con un cerrojo propio para que
/// validar y persistir no se intercalen dentro del mismo proceso. Entre
/// procesos la garantía la dan las restricciones del almacén.
pub struct EmployeeService<R> where R: EmployeeRepository
{
  repo: Arc<R>,
  write_lock: Mutex<()>,
}

impl<R> EmployeeService<R> where R: EmployeeRepository
{
  pub fn new(repo: Arc<R>) -> Self {
    Self { repo, write_lock: Mutex::new(()) }
  }

  pub fn repository(&self) -> &Arc<R> {
    &self.repo
  }

  fn today() -> NaiveDate {
    Local::now().date_naive()
  }

  fn write_guard(&self) -> Result<MutexGuard<'_, ()>, DomainError> {
    self.write_lock
        .lock()
        .map_err(|e| DomainError::Storage(format!("Mutex 'write_lock' poisoned: {}", e)))
  }

  /// Alta de un empleado. Valida campos y unicidad, asigna código y persiste.
  /// Si algo falla antes de `save` el almacén queda intacto.
  pub fn create(&self, input: EmployeeInput) -> Result<Employee, DomainError> {
    let input = normalize(input);
    validate_input(&input, Self::today())?;

    let _guard = self.write_guard()?;
    ensure_unique(self.repo.as_ref(), &input, None)?;

    let now = Utc::now();
    let mut attempt = 1;
    loop {
      let (id, code) = CodeGenerator::next(self.repo.as_ref())?;
      match self.repo.save(Employee::new(id, code, input.clone(), now)) {
        Ok(saved) => {
          log::info!("empleado creado: {} (id {})", saved.employee_code, saved.id);
          return Ok(saved);
        }
        Err(DomainError::DuplicateKey { field: UniqueKey::EmployeeCode, value }) if attempt < MAX_CODE_ATTEMPTS => {
          log::warn!("código {} ya en uso, reintentando ({}/{})", value, attempt, MAX_CODE_ATTEMPTS);
          attempt += 1;
        }
        Err(e) => return Err(e),
      }
    }
  }

  /// Sobrescribe todos los campos mutables. Si la fecha de baja es hoy o
  /// anterior el estado pasa a `RESIGNED` sea cual sea el recibido.
  pub fn update(&self, id: EmployeeId, input: EmployeeInput) -> Result<Employee, DomainError> {
    let input = normalize(input);
    let _guard = self.write_guard()?;
    let mut existing = self.get_by_id(id)?;

    let today = Self::today();
    validate_input(&input, today)?;
    ensure_unique(self.repo.as_ref(), &input, Some(id))?;

    existing.overwrite_with(input);
    if existing.date_of_leaving.is_some_and(|d| d <= today) {
      existing.status = EmployeeStatus::Resigned;
    }
    existing.updated_at = Utc::now();

    let saved = self.repo.save(existing)?;
    log::info!("empleado actualizado: {} ({})", saved.employee_code, saved.status);
    Ok(saved)
  }

  pub fn get_by_id(&self, id: EmployeeId) -> Result<Employee, DomainError> {
    self.repo.get_by_id(id)?.ok_or_else(|| DomainError::not_found_id(id))
  }

  pub fn get_by_code(&self, code: &str) -> Result<Employee, DomainError> {
    self.repo
        .get_by_unique_key(UniqueKey::EmployeeCode, code)?
        .ok_or_else(|| DomainError::NotFound(format!("código {}", code)))
  }

  pub fn list_all(&self) -> Result<Vec<Employee>, DomainError> {
    self.repo.list_all()
  }

  pub fn list_active(&self) -> Result<Vec<Employee>, DomainError> {
    self.repo.list_by_status(EmployeeStatus::Active)
  }

  pub fn list_by_status(&self, status: EmployeeStatus) -> Result<Vec<Employee>, DomainError> {
    self.repo.list_by_status(status)
  }

  pub fn search(&self, keyword: &str) -> Result<Vec<Employee>, DomainError> {
    self.repo.search(keyword)
  }

  /// Baja lógica: `RESIGNED` con fecha de baja hoy. Repetirla es inocuo.
  pub fn soft_delete(&self, id: EmployeeId) -> Result<Employee, DomainError> {
    let _guard = self.write_guard()?;
    let mut employee = self.get_by_id(id)?;
    employee.status = EmployeeStatus::Resigned;
    employee.date_of_leaving = Some(Self::today());
    employee.updated_at = Utc::now();
    let saved = self.repo.save(employee)?;
    log::info!("empleado dado de baja: {}", saved.employee_code);
    Ok(saved)
  }

  /// Baja física e irreversible.
  pub fn hard_delete(&self, id: EmployeeId) -> Result<(), DomainError> {
    let _guard = self.write_guard()?;
    if !self.repo.exists_by_id(id)? {
      return Err(DomainError::not_found_id(id));
    }
    self.repo.delete_by_id(id)?;
    log::info!("empleado {} eliminado definitivamente", id);
    Ok(())
  }

  /// Actualiza sólo las ranuras de documentos informadas en el parche.
  pub fn update_documents(&self, id: EmployeeId, patch: DocumentPatch) -> Result<Employee, DomainError> {
    let _guard = self.write_guard()?;
    let mut employee = self.get_by_id(id)?;
    patch.apply(&mut employee);
    employee.updated_at = Utc::now();
    self.repo.save(employee)
  }

  /// Sustituye la ranura `kind` por `path` y devuelve la ruta que ocupaba.
  /// La lectura del valor anterior y la escritura ocurren bajo el mismo
  /// cerrojo, así que dos sustituciones seguidas nunca devuelven la misma ruta.
  pub fn replace_document(&self,
                          id: EmployeeId,
                          kind: DocumentKind,
                          path: &str)
                          -> Result<(Employee, Option<String>), DomainError> {
    let _guard = self.write_guard()?;
    let mut employee = self.get_by_id(id)?;
    let previous = kind.slot(&employee).map(str::to_string);
    kind.patch(path).apply(&mut employee);
    employee.updated_at = Utc::now();
    let saved = self.repo.save(employee)?;
    Ok((saved, previous))
  }
}
