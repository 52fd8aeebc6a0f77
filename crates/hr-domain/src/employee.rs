// employee.rs
use crate::validation::{not_blank, AADHAAR_RE, IFSC_RE, MOBILE_RE, PAN_RE};
use crate::DomainError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Identificador numérico asignado por el almacén.
pub type EmployeeId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
  #[default]
  Active,
  Resigned,
}

impl EmployeeStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Active => "ACTIVE",
      Self::Resigned => "RESIGNED",
    }
  }
}

impl fmt::Display for EmployeeStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for EmployeeStatus {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "ACTIVE" => Ok(Self::Active),
      "RESIGNED" => Ok(Self::Resigned),
      other => Err(DomainError::invalid("status", format!("estado desconocido: {}", other))),
    }
  }
}

/// Campos con restricción de unicidad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UniqueKey {
  EmployeeCode,
  MobileNo,
  Email,
  AadhaarNo,
  PanNo,
  AccountNo,
  UanNo,
}

impl UniqueKey {
  pub const ALL: [UniqueKey; 7] = [Self::EmployeeCode,
                                   Self::MobileNo,
                                   Self::Email,
                                   Self::AadhaarNo,
                                   Self::PanNo,
                                   Self::AccountNo,
                                   Self::UanNo];

  /// Nombre del campo tal como lo ve el llamador (camelCase).
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::EmployeeCode => "employeeCode",
      Self::MobileNo => "mobileNo",
      Self::Email => "email",
      Self::AadhaarNo => "aadhaarNo",
      Self::PanNo => "panNo",
      Self::AccountNo => "accountNo",
      Self::UanNo => "uanNo",
    }
  }

  /// Nombre de la columna en el almacén relacional.
  pub fn column(&self) -> &'static str {
    match self {
      Self::EmployeeCode => "employee_code",
      Self::MobileNo => "mobile_no",
      Self::Email => "email",
      Self::AadhaarNo => "aadhaar_no",
      Self::PanNo => "pan_no",
      Self::AccountNo => "account_no",
      Self::UanNo => "uan_no",
    }
  }

  /// Valor que ocupa este campo en un registro; `None` para opcionales vacíos.
  pub fn value_of<'a>(&self, employee: &'a Employee) -> Option<&'a str> {
    match self {
      Self::EmployeeCode => Some(employee.employee_code.as_str()),
      Self::MobileNo => Some(employee.mobile_no.as_str()),
      Self::Email => employee.email.as_deref(),
      Self::AadhaarNo => Some(employee.aadhaar_no.as_str()),
      Self::PanNo => Some(employee.pan_no.as_str()),
      Self::AccountNo => Some(employee.account_no.as_str()),
      Self::UanNo => employee.uan_no.as_deref(),
    }
  }
}

impl fmt::Display for UniqueKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Datos mutables de un empleado, usados tanto al crear como al actualizar.
///
/// `status` es opcional: en alta se usa `ACTIVE` por defecto y en
/// actualización `None` conserva el estado actual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
  #[validate(custom(function = "not_blank"),
             length(min = 2, max = 50, message = "debe tener entre 2 y 50 caracteres"))]
  pub first_name: String,
  #[validate(custom(function = "not_blank"),
             length(min = 2, max = 50, message = "debe tener entre 2 y 50 caracteres"))]
  pub last_name: String,
  #[validate(custom(function = "not_blank"),
             regex(path = *MOBILE_RE, message = "debe tener exactamente 10 dígitos"))]
  pub mobile_no: String,
  #[serde(default)]
  #[validate(email(message = "formato de email inválido"))]
  pub email: Option<String>,
  #[validate(custom(function = "not_blank"),
             regex(path = *AADHAAR_RE, message = "debe tener exactamente 12 dígitos"))]
  pub aadhaar_no: String,
  #[validate(custom(function = "not_blank"), regex(path = *PAN_RE, message = "formato PAN inválido"))]
  pub pan_no: String,
  #[validate(custom(function = "not_blank"))]
  pub account_no: String,
  #[validate(custom(function = "not_blank"), regex(path = *IFSC_RE, message = "formato IFSC inválido"))]
  pub ifsc_code: String,
  #[validate(custom(function = "not_blank"))]
  pub bank_name: String,
  #[serde(default)]
  pub uan_no: Option<String>,
  #[serde(default)]
  pub pf_no: Option<String>,
  #[serde(default)]
  pub qualification: Option<String>,
  pub dob: NaiveDate,
  #[validate(custom(function = "not_blank"))]
  pub address: String,
  #[serde(default)]
  pub status: Option<EmployeeStatus>,
  pub date_of_joining: NaiveDate,
  #[serde(default)]
  pub date_of_leaving: Option<NaiveDate>,
}

impl EmployeeInput {
  /// Valores de las claves únicas presentes en la entrada, en el orden en que
  /// se validan. El código de empleado nunca viene del llamador.
  pub fn unique_values(&self) -> Vec<(UniqueKey, &str)> {
    let mut out = vec![(UniqueKey::MobileNo, self.mobile_no.as_str())];
    if let Some(email) = self.email.as_deref() {
      out.push((UniqueKey::Email, email));
    }
    out.push((UniqueKey::AadhaarNo, self.aadhaar_no.as_str()));
    out.push((UniqueKey::PanNo, self.pan_no.as_str()));
    out.push((UniqueKey::AccountNo, self.account_no.as_str()));
    if let Some(uan) = self.uan_no.as_deref() {
      out.push((UniqueKey::UanNo, uan));
    }
    out
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  pub id: EmployeeId,
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
  pub status: EmployeeStatus,
  pub date_of_joining: NaiveDate,
  pub date_of_leaving: Option<NaiveDate>,
  pub aadhaar_document: Option<String>,
  pub pan_document: Option<String>,
  pub photo: Option<String>,
  pub other_documents: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Employee {
  /// Construye un registro nuevo a partir de la entrada. El id y el código
  /// los decide el generador; los documentos empiezan vacíos.
  pub fn new(id: EmployeeId, employee_code: String, input: EmployeeInput, now: DateTime<Utc>) -> Self {
    Self { id,
           employee_code,
           first_name: input.first_name,
           last_name: input.last_name,
           mobile_no: input.mobile_no,
           email: input.email,
           aadhaar_no: input.aadhaar_no,
           pan_no: input.pan_no,
           account_no: input.account_no,
           ifsc_code: input.ifsc_code,
           bank_name: input.bank_name,
           uan_no: input.uan_no,
           pf_no: input.pf_no,
           qualification: input.qualification,
           dob: input.dob,
           address: input.address,
           status: input.status.unwrap_or_default(),
           date_of_joining: input.date_of_joining,
           date_of_leaving: input.date_of_leaving,
           aadhaar_document: None,
           pan_document: None,
           photo: None,
           other_documents: None,
           created_at: now,
           updated_at: now }
  }

  /// Sobrescribe todos los campos mutables. No toca id, código, documentos
  /// ni `created_at`.
  pub fn overwrite_with(&mut self, input: EmployeeInput) {
    self.first_name = input.first_name;
    self.last_name = input.last_name;
    self.mobile_no = input.mobile_no;
    self.email = input.email;
    self.aadhaar_no = input.aadhaar_no;
    self.pan_no = input.pan_no;
    self.account_no = input.account_no;
    self.ifsc_code = input.ifsc_code;
    self.bank_name = input.bank_name;
    self.uan_no = input.uan_no;
    self.pf_no = input.pf_no;
    self.qualification = input.qualification;
    self.dob = input.dob;
    self.address = input.address;
    if let Some(status) = input.status {
      self.status = status;
    }
    self.date_of_joining = input.date_of_joining;
    self.date_of_leaving = input.date_of_leaving;
  }

  /// Entrada equivalente al estado actual; base para una actualización que
  /// sólo cambia algunos campos.
  pub fn to_input(&self) -> EmployeeInput {
    EmployeeInput { first_name: self.first_name.clone(),
                    last_name: self.last_name.clone(),
                    mobile_no: self.mobile_no.clone(),
                    email: self.email.clone(),
                    aadhaar_no: self.aadhaar_no.clone(),
                    pan_no: self.pan_no.clone(),
                    account_no: self.account_no.clone(),
                    ifsc_code: self.ifsc_code.clone(),
                    bank_name: self.bank_name.clone(),
                    uan_no: self.uan_no.clone(),
                    pf_no: self.pf_no.clone(),
                    qualification: self.qualification.clone(),
                    dob: self.dob,
                    address: self.address.clone(),
                    status: Some(self.status),
                    date_of_joining: self.date_of_joining,
                    date_of_leaving: self.date_of_leaving }
  }

  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  pub fn is_active(&self) -> bool {
    self.status == EmployeeStatus::Active
  }

  /// Coincidencia usada por la búsqueda libre: nombre, apellido o código,
  /// sin distinguir mayúsculas.
  pub fn matches_keyword(&self, keyword: &str) -> bool {
    let needle = keyword.to_lowercase();
    self.first_name.to_lowercase().contains(&needle)
    || self.last_name.to_lowercase().contains(&needle)
    || self.employee_code.to_lowercase().contains(&needle)
  }
}

impl fmt::Display for Employee {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Employee({}, {}, {})", self.employee_code, self.full_name(), self.status)
  }
}
