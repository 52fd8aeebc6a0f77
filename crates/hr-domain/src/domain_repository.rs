use crate::{DomainError, Employee, EmployeeId, EmployeeStatus, UniqueKey};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Contrato del almacén de registros de empleados.
///
/// Las implementaciones deben hacer cumplir la unicidad de todas las claves
/// de `UniqueKey` en `save`, aunque el servicio ya las haya comprobado: la
/// validación previa sólo sirve para dar mensajes claros, el almacén es la
/// garantía final frente a escrituras concurrentes.
pub trait EmployeeRepository: Send + Sync {
    /// Recupera un empleado por id.
    fn get_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, DomainError>;

    /// Recupera un empleado por el valor de una clave única.
    fn get_by_unique_key(&self, key: UniqueKey, value: &str) -> Result<Option<Employee>, DomainError>;

    /// Indica si algún registro (distinto de `exclude_id`, si se da) ocupa
    /// ese valor de la clave.
    fn exists_by_unique_key(&self,
                            key: UniqueKey,
                            value: &str,
                            exclude_id: Option<EmployeeId>)
                            -> Result<bool, DomainError>;

    /// Lista empleados con el estado indicado, ordenados por id.
    fn list_by_status(&self, status: EmployeeStatus) -> Result<Vec<Employee>, DomainError>;

    /// Lista todos los empleados, ordenados por id.
    fn list_all(&self) -> Result<Vec<Employee>, DomainError>;

    /// Búsqueda libre por nombre, apellido o código, sin distinguir mayúsculas.
    fn search(&self, keyword: &str) -> Result<Vec<Employee>, DomainError>;

    /// Mayor id asignado alguna vez por la secuencia (no baja al borrar).
    fn max_assigned_id(&self) -> Result<Option<EmployeeId>, DomainError>;

    /// Reserva de forma atómica el siguiente id de la secuencia. Un id
    /// reservado nunca se vuelve a entregar.
    fn next_id(&self) -> Result<EmployeeId, DomainError>;

    /// Inserta o reemplaza el registro con `employee.id`. Devuelve
    /// `DuplicateKey` si viola una restricción de unicidad.
    fn save(&self, employee: Employee) -> Result<Employee, DomainError>;

    /// Elimina el registro; `false` si no existía.
    fn delete_by_id(&self, id: EmployeeId) -> Result<bool, DomainError>;

    fn exists_by_id(&self, id: EmployeeId) -> Result<bool, DomainError>;
}

#[derive(Default)]
struct Table {
    rows: BTreeMap<EmployeeId, Employee>,
    sequence: EmployeeId,
}

impl Table {
    fn conflict(&self, key: UniqueKey, value: &str, exclude_id: Option<EmployeeId>) -> Option<&Employee> {
        self.rows
            .values()
            .filter(|e| Some(e.id) != exclude_id)
            .find(|e| key.value_of(e) == Some(value))
    }
}

/// Implementación en memoria para tests y desarrollo.
pub struct InMemoryEmployeeRepository {
    table: Arc<Mutex<Table>>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self { table: Arc::new(Mutex::new(Table::default())) }
    }

    // Helper to map poisoned mutex errors into DomainError
    fn lock(&self) -> Result<MutexGuard<'_, Table>, DomainError> {
        self.table
            .lock()
            .map_err(|e| DomainError::Storage(format!("Mutex 'employees' poisoned: {}", e)))
    }
}

impl EmployeeRepository for InMemoryEmployeeRepository {
    fn get_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, DomainError> {
        let table = self.lock()?;
        Ok(table.rows.get(&id).cloned())
    }

    fn get_by_unique_key(&self, key: UniqueKey, value: &str) -> Result<Option<Employee>, DomainError> {
        let table = self.lock()?;
        Ok(table.conflict(key, value, None).cloned())
    }

    fn exists_by_unique_key(&self,
                            key: UniqueKey,
                            value: &str,
                            exclude_id: Option<EmployeeId>)
                            -> Result<bool, DomainError> {
        let table = self.lock()?;
        Ok(table.conflict(key, value, exclude_id).is_some())
    }

    fn list_by_status(&self, status: EmployeeStatus) -> Result<Vec<Employee>, DomainError> {
        let table = self.lock()?;
        Ok(table.rows.values().filter(|e| e.status == status).cloned().collect())
    }

    fn list_all(&self) -> Result<Vec<Employee>, DomainError> {
        let table = self.lock()?;
        Ok(table.rows.values().cloned().collect())
    }

    fn search(&self, keyword: &str) -> Result<Vec<Employee>, DomainError> {
        let table = self.lock()?;
        Ok(table.rows.values().filter(|e| e.matches_keyword(keyword)).cloned().collect())
    }

    fn max_assigned_id(&self) -> Result<Option<EmployeeId>, DomainError> {
        let table = self.lock()?;
        Ok(if table.sequence == 0 { None } else { Some(table.sequence) })
    }

    fn next_id(&self) -> Result<EmployeeId, DomainError> {
        let mut table = self.lock()?;
        table.sequence += 1;
        Ok(table.sequence)
    }

    fn save(&self, employee: Employee) -> Result<Employee, DomainError> {
        let mut table = self.lock()?;
        for key in UniqueKey::ALL {
            if let Some(value) = key.value_of(&employee) {
                if table.conflict(key, value, Some(employee.id)).is_some() {
                    return Err(DomainError::DuplicateKey { field: key, value: value.to_string() });
                }
            }
        }
        // ids given by hand still advance the sequence so they are never reissued
        if employee.id > table.sequence {
            table.sequence = employee.id;
        }
        table.rows.insert(employee.id, employee.clone());
        Ok(employee)
    }

    fn delete_by_id(&self, id: EmployeeId) -> Result<bool, DomainError> {
        let mut table = self.lock()?;
        Ok(table.rows.remove(&id).is_some())
    }

    fn exists_by_id(&self, id: EmployeeId) -> Result<bool, DomainError> {
        let table = self.lock()?;
        Ok(table.rows.contains_key(&id))
    }
}

impl Default for InMemoryEmployeeRepository {
    fn default() -> Self {
        Self::new()
    }
}
