// uniqueness.rs
use crate::domain_repository::EmployeeRepository;
use crate::{DomainError, EmployeeId, EmployeeInput};

/// Comprueba que ningún otro registro ocupe las claves únicas de la entrada.
///
/// `exclude_id` se usa en actualizaciones para que un registro no choque
/// consigo mismo. Email y UAN sólo se comprueban si vienen informados. La
/// primera colisión corta la comprobación.
pub fn ensure_unique<R>(repo: &R, input: &EmployeeInput, exclude_id: Option<EmployeeId>) -> Result<(), DomainError>
  where R: EmployeeRepository + ?Sized
{
  for (key, value) in input.unique_values() {
    if repo.exists_by_unique_key(key, value, exclude_id)? {
      log::debug!("clave duplicada {}={} (excluyendo {:?})", key, value, exclude_id);
      return Err(DomainError::DuplicateKey { field: key, value: value.to_string() });
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{EmployeeStubs, InMemoryEmployeeRepository, UniqueKey};

  fn seeded() -> InMemoryEmployeeRepository {
    let repo = InMemoryEmployeeRepository::new();
    let id = repo.next_id().unwrap();
    let mut e = EmployeeStubs::sample_employee(id, 1);
    e.uan_no = Some("UAN-1".into());
    repo.save(e).unwrap();
    repo
  }

  fn duplicate_field(res: Result<(), DomainError>) -> UniqueKey {
    match res {
      Err(DomainError::DuplicateKey { field, .. }) => field,
      other => panic!("expected DuplicateKey, got {:?}", other),
    }
  }

  #[test]
  fn fresh_input_passes() {
    let repo = seeded();
    assert!(ensure_unique(&repo, &EmployeeStubs::sample_input(2), None).is_ok());
  }

  #[test]
  fn each_required_key_is_checked() {
    let repo = seeded();
    let taken = EmployeeStubs::sample_input(1);

    let mut i = EmployeeStubs::sample_input(2);
    i.mobile_no = taken.mobile_no.clone();
    assert_eq!(duplicate_field(ensure_unique(&repo, &i, None)), UniqueKey::MobileNo);

    let mut i = EmployeeStubs::sample_input(2);
    i.aadhaar_no = taken.aadhaar_no.clone();
    assert_eq!(duplicate_field(ensure_unique(&repo, &i, None)), UniqueKey::AadhaarNo);

    let mut i = EmployeeStubs::sample_input(2);
    i.pan_no = taken.pan_no.clone();
    assert_eq!(duplicate_field(ensure_unique(&repo, &i, None)), UniqueKey::PanNo);

    let mut i = EmployeeStubs::sample_input(2);
    i.account_no = taken.account_no.clone();
    assert_eq!(duplicate_field(ensure_unique(&repo, &i, None)), UniqueKey::AccountNo);
  }

  #[test]
  fn optional_keys_only_when_present() {
    let repo = seeded();
    let mut i = EmployeeStubs::sample_input(2);
    i.email = Some(EmployeeStubs::sample_input(1).email.unwrap());
    assert_eq!(duplicate_field(ensure_unique(&repo, &i, None)), UniqueKey::Email);

    let mut i = EmployeeStubs::sample_input(2);
    i.uan_no = Some("UAN-1".into());
    assert_eq!(duplicate_field(ensure_unique(&repo, &i, None)), UniqueKey::UanNo);

    let mut i = EmployeeStubs::sample_input(2);
    i.email = None;
    i.uan_no = None;
    assert!(ensure_unique(&repo, &i, None).is_ok());
  }

  #[test]
  fn excluded_record_does_not_collide_with_itself() {
    let repo = seeded();
    assert!(ensure_unique(&repo, &EmployeeStubs::sample_input(1), Some(1)).is_ok());
    assert!(ensure_unique(&repo, &EmployeeStubs::sample_input(1), Some(99)).is_err());
  }

  #[test]
  fn reports_value_of_the_collision() {
    let repo = seeded();
    let mut i = EmployeeStubs::sample_input(2);
    i.mobile_no = "9000000001".into();
    assert_eq!(ensure_unique(&repo, &i, None),
               Err(DomainError::DuplicateKey { field: UniqueKey::MobileNo, value: "9000000001".into() }));
  }
}
