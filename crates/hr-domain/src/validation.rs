// validation.rs
use crate::{DomainError, EmployeeInput, FieldError};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

const REQUIRED: &str = "required";

pub(crate) static MOBILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("mobile regex"));
pub(crate) static AADHAAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{12}$").expect("aadhaar regex"));
pub(crate) static PAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("PAN regex"));
pub(crate) static IFSC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("IFSC regex"));

// Orden en el que se informan los errores: campo Rust y nombre público.
const FIELD_ORDER: [(&str, &str); 10] = [("first_name", "firstName"),
                                         ("last_name", "lastName"),
                                         ("mobile_no", "mobileNo"),
                                         ("email", "email"),
                                         ("aadhaar_no", "aadhaarNo"),
                                         ("pan_no", "panNo"),
                                         ("account_no", "accountNo"),
                                         ("ifsc_code", "ifscCode"),
                                         ("bank_name", "bankName"),
                                         ("address", "address")];

/// Valida todos los campos de la entrada y devuelve la lista completa de
/// errores, no sólo el primero. Se ejecuta antes de tocar el almacén.
///
/// Las reglas por campo viven en el `#[derive(Validate)]` de
/// `EmployeeInput`; aquí se ordenan, se deja un error por campo (un campo en
/// blanco sólo informa "es obligatorio") y se añade la regla de la fecha de
/// nacimiento, que depende de `today`.
pub fn validate_input(input: &EmployeeInput, today: NaiveDate) -> Result<(), DomainError> {
  let mut errors = Vec::new();

  if let Err(report) = input.validate() {
    let by_field = report.field_errors();
    for (field, name) in FIELD_ORDER {
      let Some(errs) = by_field.get(field).or_else(|| by_field.get(name)) else { continue };
      if let Some(err) = errs.iter().find(|e| e.code == REQUIRED).or_else(|| errs.first()) {
        errors.push(FieldError::new(name, message_of(err)));
      }
    }
  }

  if input.dob >= today {
    errors.push(FieldError::new("dob", "la fecha de nacimiento debe estar en el pasado"));
  }

  if errors.is_empty() {
    Ok(())
  } else {
    Err(DomainError::Validation(errors))
  }
}

/// Convierte en `None` los campos opcionales que llegan en blanco, para que
/// un texto vacío no ocupe una clave única.
pub fn normalize(mut input: EmployeeInput) -> EmployeeInput {
  fn blank_to_none(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
  }
  input.email = blank_to_none(input.email);
  input.uan_no = blank_to_none(input.uan_no);
  input.pf_no = blank_to_none(input.pf_no);
  input.qualification = blank_to_none(input.qualification);
  input
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::new(REQUIRED).with_message(Cow::Borrowed("es obligatorio")));
  }
  Ok(())
}

fn message_of(err: &ValidationError) -> String {
  err.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| err.code.to_string())
}

/// `[A-Z]{5}[0-9]{4}[A-Z]`
pub fn is_pan(value: &str) -> bool {
  PAN_RE.is_match(value)
}

/// `[A-Z]{4}0[A-Z0-9]{6}`
pub fn is_ifsc(value: &str) -> bool {
  IFSC_RE.is_match(value)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
  }

  fn valid() -> EmployeeInput {
    EmployeeInput { first_name: "Ravi".into(),
                    last_name: "Kumar".into(),
                    mobile_no: "9876543210".into(),
                    email: Some("ravi.kumar@example.in".into()),
                    aadhaar_no: "123412341234".into(),
                    pan_no: "ABCDE1234F".into(),
                    account_no: "001122334455".into(),
                    ifsc_code: "HDFC0ABC123".into(),
                    bank_name: "HDFC Bank".into(),
                    uan_no: Some("100200300400".into()),
                    pf_no: None,
                    qualification: Some("B.Com".into()),
                    dob: NaiveDate::from_ymd_opt(1992, 3, 14).unwrap(),
                    address: "12 MG Road, Bengaluru".into(),
                    status: None,
                    date_of_joining: NaiveDate::from_ymd_opt(2019, 7, 1).unwrap(),
                    date_of_leaving: None }
  }

  fn fields(err: DomainError) -> Vec<String> {
    match err {
      DomainError::Validation(errs) => errs.into_iter().map(|e| e.field).collect(),
      other => panic!("expected Validation, got {:?}", other),
    }
  }

  #[test]
  fn accepts_valid_input() {
    assert!(validate_input(&valid(), today()).is_ok());
  }

  #[test]
  fn reports_every_broken_field() {
    let mut i = valid();
    i.first_name = "R".into();
    i.mobile_no = "98765".into();
    i.aadhaar_no = "12341234123X".into();
    i.pan_no = "abcde1234f".into();
    i.ifsc_code = "HDFC1ABC123".into();
    i.bank_name = "  ".into();
    let got = fields(validate_input(&i, today()).unwrap_err());
    assert_eq!(got, vec!["firstName", "mobileNo", "aadhaarNo", "panNo", "ifscCode", "bankName"]);
  }

  #[test]
  fn blank_name_is_required_not_length() {
    let mut i = valid();
    i.last_name = "   ".into();
    match validate_input(&i, today()) {
      Err(DomainError::Validation(errs)) => {
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].message, "es obligatorio");
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn name_length_counts_characters() {
    let mut i = valid();
    i.first_name = "Ñá".into();
    i.last_name = "x".repeat(51);
    assert_eq!(fields(validate_input(&i, today()).unwrap_err()), vec!["lastName"]);
  }

  #[test]
  fn dob_must_be_strictly_past() {
    let mut i = valid();
    i.dob = today();
    assert_eq!(fields(validate_input(&i, today()).unwrap_err()), vec!["dob"]);
  }

  #[test]
  fn normalize_drops_blank_optionals() {
    let mut i = valid();
    i.email = Some("   ".into());
    i.uan_no = Some(String::new());
    i.pf_no = Some("PF/12".into());
    let n = normalize(i);
    assert_eq!(n.email, None);
    assert_eq!(n.uan_no, None);
    assert_eq!(n.pf_no.as_deref(), Some("PF/12"));
  }

  #[test]
  fn email_shape() {
    use validator::ValidateEmail;
    assert!("a@b.co".validate_email());
    assert!(!"a@".validate_email());
    assert!(!"@b.co".validate_email());
    assert!(!"a b@c.d".validate_email());
    assert!(!"a@@b.co".validate_email());
    assert!(!"plain".validate_email());

    let mut i = valid();
    i.email = Some("ravi@@example.in".into());
    match validate_input(&i, today()) {
      Err(DomainError::Validation(errs)) => {
        assert_eq!(errs, vec![FieldError::new("email", "formato de email inválido")]);
      }
      other => panic!("unexpected {:?}", other),
    }
    i.email = None;
    assert!(validate_input(&i, today()).is_ok());
  }

  #[test]
  fn blank_required_fields_report_one_error_each() {
    let mut i = valid();
    i.first_name = String::new();
    i.mobile_no = " ".into();
    i.pan_no = String::new();
    i.address = "\t".into();
    match validate_input(&i, today()) {
      Err(DomainError::Validation(errs)) => {
        let got: Vec<_> = errs.iter().map(|e| (e.field.as_str(), e.message.as_str())).collect();
        assert_eq!(got,
                   vec![("firstName", "es obligatorio"),
                        ("mobileNo", "es obligatorio"),
                        ("panNo", "es obligatorio"),
                        ("address", "es obligatorio")]);
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn format_messages_are_kept() {
    let mut i = valid();
    i.mobile_no = "98765x3210".into();
    i.last_name = "K".into();
    match validate_input(&i, today()) {
      Err(DomainError::Validation(errs)) => {
        assert_eq!(errs,
                   vec![FieldError::new("lastName", "debe tener entre 2 y 50 caracteres"),
                        FieldError::new("mobileNo", "debe tener exactamente 10 dígitos")]);
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn pan_and_ifsc_patterns() {
    assert!(is_pan("ABCDE1234F"));
    assert!(!is_pan("ABCD12345F"));
    assert!(!is_pan("ABCDE1234"));
    assert!(is_ifsc("SBIN0001234"));
    assert!(is_ifsc("ICIC0ABCDEF"));
    assert!(!is_ifsc("SBIN1001234"));
    assert!(!is_ifsc("SBIN000123"));
  }
}
