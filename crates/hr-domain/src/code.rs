// code.rs
use crate::domain_repository::EmployeeRepository;
use crate::{DomainError, EmployeeId};

pub const CODE_PREFIX: &str = "EMP";

/// `EMP` + secuencia con al menos cuatro dígitos (`EMP0001`, `EMP12345`).
pub fn format_code(seq: EmployeeId) -> String {
  format!("{}{:04}", CODE_PREFIX, seq)
}

/// Inverso de `format_code`. `None` si el texto no tiene la forma esperada.
pub fn parse_code(code: &str) -> Option<EmployeeId> {
  let digits = code.strip_prefix(CODE_PREFIX)?;
  if digits.len() < 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  digits.parse().ok()
}

/// Generador de códigos de empleado.
///
/// El código se deriva de un id reservado atómicamente en la secuencia del
/// almacén, así que dos altas concurrentes nunca leen el mismo valor y un
/// código no se reutiliza aunque se borre el registro que lo tenía.
pub struct CodeGenerator;

impl CodeGenerator {
  /// Reserva el siguiente id y devuelve `(id, código)`.
  pub fn next<R>(repo: &R) -> Result<(EmployeeId, String), DomainError>
    where R: EmployeeRepository + ?Sized
  {
    let id = repo.next_id()?;
    Ok((id, format_code(id)))
  }

  /// Código que recibiría la próxima alta, sin reservarlo.
  pub fn preview<R>(repo: &R) -> Result<String, DomainError>
    where R: EmployeeRepository + ?Sized
  {
    let next = repo.max_assigned_id()?.unwrap_or(0) + 1;
    Ok(format_code(next))
  }
}
