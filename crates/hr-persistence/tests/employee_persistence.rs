#![cfg(not(feature = "pg"))]
use hr_domain::{DomainError, EmployeeRepository, EmployeeService, EmployeeStatus, EmployeeStubs, UniqueKey};
use hr_persistence::{new_from_config, new_sqlite_for_test, DieselEmployeeRepository, PersistenceConfig};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

// Temporary file-backed SQLite DB, removed on drop.
struct TempDb {
  path: PathBuf,
}

impl TempDb {
  fn new() -> Self {
    Self { path: std::env::temp_dir().join(format!("hrms_test_{}.db", Uuid::new_v4())) }
  }

  fn repo(&self) -> DieselEmployeeRepository {
    new_sqlite_for_test(self.path.to_str().unwrap()).expect("failed to create repo")
  }
}

impl Drop for TempDb {
  fn drop(&mut self) {
    let _ = std::fs::remove_file(&self.path);
    let _ = std::fs::remove_file(self.path.with_extension("db-wal"));
    let _ = std::fs::remove_file(self.path.with_extension("db-shm"));
  }
}

#[test]
fn diesel_employee_round_trip() {
  let db = TempDb::new();
  let repo = db.repo();
  assert_eq!(repo.max_assigned_id().unwrap(), None);

  let id = repo.next_id().unwrap();
  assert_eq!(id, 1);
  let mut e = EmployeeStubs::sample_employee(id, 1);
  e.uan_no = Some("UAN001".into());
  e.photo = Some("employee-1/me.png".into());
  repo.save(e.clone()).expect("save");

  let got = repo.get_by_id(id).unwrap().expect("row");
  assert_eq!(got.employee_code, e.employee_code);
  assert_eq!(got.email, e.email);
  assert_eq!(got.uan_no.as_deref(), Some("UAN001"));
  assert_eq!(got.dob, e.dob);
  assert_eq!(got.status, EmployeeStatus::Active);
  assert_eq!(got.photo.as_deref(), Some("employee-1/me.png"));
  assert_eq!(got.created_at.timestamp(), e.created_at.timestamp());

  let by_pan = repo.get_by_unique_key(UniqueKey::PanNo, &e.pan_no).unwrap();
  assert_eq!(by_pan.map(|x| x.id), Some(id));
  assert!(repo.exists_by_unique_key(UniqueKey::MobileNo, &e.mobile_no, None).unwrap());
  assert!(!repo.exists_by_unique_key(UniqueKey::MobileNo, &e.mobile_no, Some(id)).unwrap());
  assert!(!repo.exists_by_unique_key(UniqueKey::UanNo, "UAN999", None).unwrap());
}

#[test]
fn save_replaces_and_clears_optionals() {
  let db = TempDb::new();
  let repo = db.repo();
  let id = repo.next_id().unwrap();
  let mut e = repo.save(EmployeeStubs::sample_employee(id, 1)).unwrap();
  e.email = None;
  e.status = EmployeeStatus::Resigned;
  e.address = "Moved".into();
  repo.save(e.clone()).unwrap();

  let got = repo.get_by_id(id).unwrap().unwrap();
  assert_eq!(got.email, None);
  assert_eq!(got.status, EmployeeStatus::Resigned);
  assert_eq!(got.address, "Moved");
  assert_eq!(repo.list_all().unwrap().len(), 1);
}

#[test]
fn unique_constraints_map_to_duplicate_key() {
  let db = TempDb::new();
  let repo = db.repo();
  let first = repo.save(EmployeeStubs::sample_employee(repo.next_id().unwrap(), 1)).unwrap();

  let mut second = EmployeeStubs::sample_employee(repo.next_id().unwrap(), 2);
  second.aadhaar_no = first.aadhaar_no.clone();
  match repo.save(second) {
    Err(DomainError::DuplicateKey { field, value }) => {
      assert_eq!(field, UniqueKey::AadhaarNo);
      assert_eq!(value, first.aadhaar_no);
    }
    other => panic!("expected DuplicateKey, got: {:?}", other),
  }

  let mut third = EmployeeStubs::sample_employee(repo.next_id().unwrap(), 3);
  third.employee_code = first.employee_code.clone();
  match repo.save(third) {
    Err(DomainError::DuplicateKey { field: UniqueKey::EmployeeCode, .. }) => {}
    other => panic!("expected code collision, got: {:?}", other),
  }
  assert_eq!(repo.list_all().unwrap().len(), 1);
}

#[test]
fn absent_optionals_do_not_collide() {
  let db = TempDb::new();
  let repo = db.repo();
  for n in 1..=3 {
    let mut e = EmployeeStubs::sample_employee(repo.next_id().unwrap(), n);
    e.email = None;
    e.uan_no = None;
    repo.save(e).expect("nulls never collide");
  }
  assert_eq!(repo.list_all().unwrap().len(), 3);
}

#[test]
fn sequence_is_monotonic_across_deletes() {
  let db = TempDb::new();
  let repo = db.repo();
  let a = repo.next_id().unwrap();
  let b = repo.next_id().unwrap();
  repo.save(EmployeeStubs::sample_employee(a, 1)).unwrap();
  repo.save(EmployeeStubs::sample_employee(b, 2)).unwrap();
  assert!(repo.delete_by_id(b).unwrap());
  assert!(!repo.delete_by_id(b).unwrap());
  assert!(!repo.exists_by_id(b).unwrap());
  assert_eq!(repo.max_assigned_id().unwrap(), Some(b));
  assert_eq!(repo.next_id().unwrap(), b + 1);

  repo.save(EmployeeStubs::sample_employee(40, 40)).unwrap();
  assert_eq!(repo.next_id().unwrap(), 41);
}

#[test]
fn listing_and_search() {
  let db = TempDb::new();
  let repo = db.repo();
  let mut ids = Vec::new();
  for n in 1..=3 {
    let mut e = EmployeeStubs::sample_employee(repo.next_id().unwrap(), n);
    if n == 2 {
      e.first_name = "Zoë_Ann".into();
      e.status = EmployeeStatus::Resigned;
    }
    if n == 3 {
      e.last_name = "ÉLODIE".into();
    }
    ids.push(repo.save(e).unwrap().id);
  }

  let active: Vec<_> = repo.list_by_status(EmployeeStatus::Active).unwrap().into_iter().map(|e| e.id).collect();
  assert_eq!(active, vec![ids[0], ids[2]]);
  let resigned = repo.list_by_status(EmployeeStatus::Resigned).unwrap();
  assert_eq!(resigned.len(), 1);

  let hits = repo.search("_ANN").unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].id, ids[1]);
  assert!(repo.search("%").unwrap().is_empty());
  assert_eq!(repo.search("emp000").unwrap().len(), 3);
  assert_eq!(repo.search("").unwrap().len(), 3);

  // accented capitals fold like the in-memory store does
  let hits = repo.search("élodie").unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].id, ids[2]);
  assert!(hits[0].matches_keyword("élodie"));
  assert_eq!(repo.search("zoË").unwrap().len(), 1);
}

#[test]
fn service_over_sqlite_never_reuses_codes() {
  let db = TempDb::new();
  let svc = EmployeeService::new(Arc::new(db.repo()));
  let a = svc.create(EmployeeStubs::sample_input(1)).unwrap();
  let b = svc.create(EmployeeStubs::sample_input(2)).unwrap();
  assert_eq!((a.employee_code.as_str(), b.employee_code.as_str()), ("EMP0001", "EMP0002"));

  svc.hard_delete(b.id).unwrap();
  let c = svc.create(EmployeeStubs::sample_input(3)).unwrap();
  assert_eq!(c.employee_code, "EMP0003");

  let soft = svc.soft_delete(a.id).unwrap();
  assert_eq!(soft.status, EmployeeStatus::Resigned);
  assert_eq!(svc.get_by_code("EMP0001").unwrap().status, EmployeeStatus::Resigned);
  assert!(svc.get_by_code("EMP0002").unwrap_err().is_not_found());
}

#[test]
fn concurrent_creates_get_distinct_codes() {
  let db = TempDb::new();
  let svc = Arc::new(EmployeeService::new(Arc::new(db.repo())));
  let handles: Vec<_> = (1..=8).map(|n| {
                                 let svc = svc.clone();
                                 std::thread::spawn(move || svc.create(EmployeeStubs::sample_input(n)))
                               })
                               .collect();
  let mut codes: Vec<String> =
    handles.into_iter().map(|h| h.join().unwrap().expect("create").employee_code).collect();
  codes.sort();
  codes.dedup();
  assert_eq!(codes.len(), 8);
}

#[test]
fn reopening_the_database_keeps_sequence() {
  let db = TempDb::new();
  {
    let repo = db.repo();
    let id = repo.next_id().unwrap();
    repo.save(EmployeeStubs::sample_employee(id, 1)).unwrap();
    repo.delete_by_id(id).unwrap();
  }
  let repo = db.repo();
  assert_eq!(repo.max_assigned_id().unwrap(), Some(1));
  assert_eq!(repo.next_id().unwrap(), 2);
}

fn memory_config() -> PersistenceConfig {
  PersistenceConfig { database_url: format!("file:hrms_{}?mode=memory&cache=shared", Uuid::new_v4()),
                      ..PersistenceConfig::default() }
}

#[test]
fn default_config_survives_concurrent_reads_and_writes() {
  let repo = new_from_config(&PersistenceConfig::default()).expect("default repo");
  let svc = Arc::new(EmployeeService::new(Arc::new(repo)));
  let first = EmployeeStubs::next_seed(svc.repository().as_ref()).unwrap();

  let writer = {
    let svc = svc.clone();
    std::thread::spawn(move || {
      (first..first + 10).map(|n| svc.create(EmployeeStubs::sample_input(n)).map(|_| ())).collect::<Vec<_>>()
    })
  };
  let readers: Vec<_> = (0..3).map(|_| {
                                let svc = svc.clone();
                                std::thread::spawn(move || {
                                  (0..20).map(|_| svc.search("emp").map(|_| ())).collect::<Vec<_>>()
                                })
                              })
                              .collect();

  for res in writer.join().unwrap() {
    res.expect("create while others read");
  }
  for reader in readers {
    for res in reader.join().unwrap() {
      res.expect("search while another thread writes");
    }
  }
  assert!(svc.list_all().unwrap().len() >= 10);
}

#[test]
fn memory_database_outlives_idle_connections() {
  let config = memory_config();
  let repo = new_from_config(&config).expect("memory repo");
  let id = repo.next_id().unwrap();
  repo.save(EmployeeStubs::sample_employee(id, 1)).unwrap();

  // the pool keeps a single connection, so every call sees the same data
  for _ in 0..5 {
    assert_eq!(repo.list_all().unwrap().len(), 1);
    assert_eq!(repo.max_assigned_id().unwrap(), Some(id));
  }
  let svc = EmployeeService::new(Arc::new(repo));
  let created = svc.create(EmployeeStubs::sample_input(2)).unwrap();
  assert_eq!(created.id, id + 1);
}
