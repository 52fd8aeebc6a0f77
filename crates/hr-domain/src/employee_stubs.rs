use crate::domain_repository::{EmployeeRepository, InMemoryEmployeeRepository};
use crate::{DomainError, Employee, EmployeeId, EmployeeInput};
use chrono::{NaiveDate, Utc};

const FIRST_NAMES: [&str; 5] = ["Asha", "Ravi", "Meera", "Arjun", "Kavya"];
const LAST_NAMES: [&str; 5] = ["Verma", "Kumar", "Iyer", "Singh", "Nair"];

pub struct EmployeeStubs;

impl EmployeeStubs {
    /// Entrada válida cuyos campos únicos dependen de `n`, de modo que dos
    /// `n` distintos nunca colisionan.
    pub fn sample_input(n: u32) -> EmployeeInput {
        let i = n as usize;
        EmployeeInput { first_name: FIRST_NAMES[i % FIRST_NAMES.len()].to_string(),
                        last_name: LAST_NAMES[i % LAST_NAMES.len()].to_string(),
                        mobile_no: format!("9{:09}", n),
                        email: Some(format!("employee{}@example.com", n)),
                        aadhaar_no: format!("1{:011}", n),
                        pan_no: format!("ABCDE{:04}F", n % 10_000),
                        account_no: format!("ACC{}", n),
                        ifsc_code: "SBIN0001234".to_string(),
                        bank_name: "State Bank of India".to_string(),
                        uan_no: None,
                        pf_no: None,
                        qualification: Some("B.Sc".to_string()),
                        dob: NaiveDate::from_ymd_opt(1990, 1, 1 + n % 28).unwrap_or_default(),
                        address: format!("{} MG Road, Pune", n),
                        status: None,
                        date_of_joining: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap_or_default(),
                        date_of_leaving: None }
    }

    /// Registro ya formado (id y código derivados de `id`).
    pub fn sample_employee(id: EmployeeId, n: u32) -> Employee {
        Employee::new(id, crate::code::format_code(id), Self::sample_input(n), Utc::now())
    }

    /// Primer `n` de `sample_input` que no choca con lo ya cargado: los
    /// ejemplos anteriores usaron como mucho el id más alto asignado.
    pub fn next_seed<R: EmployeeRepository + ?Sized>(repo: &R) -> Result<u32, DomainError> {
        let max = repo.max_assigned_id()?.unwrap_or(0);
        u32::try_from(max + 1).map_err(|_| DomainError::Storage(format!("id fuera de rango: {}", max)))
    }

    /// Repositorio en memoria con tres empleados activos.
    pub fn sample_repo() -> InMemoryEmployeeRepository {
        let repo = InMemoryEmployeeRepository::new();
        for n in 1..=3 {
            if let Ok(id) = repo.next_id() {
                let _ = repo.save(Self::sample_employee(id, n));
            }
        }
        repo
    }
}
