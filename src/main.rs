use chrono::NaiveDate;
use hr_domain::{DocumentKind, DocumentUploadService, DomainError, Employee, EmployeeInput, EmployeeService,
                EmployeeStatus, EmployeeStubs};
use hr_persistence::{DieselEmployeeRepository, LocalDocumentStore, PersistenceConfig};
use std::error::Error;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

mod logging;

type Service = EmployeeService<DieselEmployeeRepository>;
type Uploader = DocumentUploadService<DieselEmployeeRepository, LocalDocumentStore>;

/// Pequeño menú interactivo para administrar empleados usando el
/// repositorio proporcionado por `hr-persistence`.
///
/// Opciones soportadas:
/// 1) Ver empleados activos
/// 2) Ver todos los empleados
/// 3) Alta de empleado
/// 4) Buscar por nombre o código
/// 5) Ver ficha por código
/// 6) Actualizar empleado
/// 7) Baja lógica
/// 8) Eliminar definitivamente
/// 9) Subir documento
/// 10) Cargar empleados de ejemplo
/// 11) Salir
fn main() -> Result<(), Box<dyn Error>> {
    logging::init_logger();

    // Inicializar repo (aplica migraciones embebidas si procede)
    let config = PersistenceConfig::from_env()?;
    let repo = hr_persistence::new_from_config(&config)?;
    let service = Arc::new(EmployeeService::new(Arc::new(repo)));
    let store = Arc::new(LocalDocumentStore::new(&config.upload_dir)?);
    let uploader = DocumentUploadService::new(service.clone(), store).with_max_bytes(config.max_upload_bytes);
    tracing::info!(db = %config.database_url, uploads = %config.upload_dir.display(), "hrms listo");

    loop {
        println!("\n== HRMS menu ==");
        println!("1) Ver empleados activos");
        println!("2) Ver todos los empleados");
        println!("3) Alta de empleado");
        println!("4) Buscar por nombre o código");
        println!("5) Ver ficha por código");
        println!("6) Actualizar empleado");
        println!("7) Baja lógica");
        println!("8) Eliminar definitivamente");
        println!("9) Subir documento");
        println!("10) Cargar empleados de ejemplo");
        println!("11) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        if io::stdin().read_line(&mut choice)? == 0 {
            break;
        }
        match choice.trim() {
            "1" => match service.list_active() {
                Ok(list) => print_table(&list),
                Err(e) => eprintln!("Error listando empleados: {}", e),
            },
            "2" => match service.list_all() {
                Ok(list) => print_table(&list),
                Err(e) => eprintln!("Error listando empleados: {}", e),
            },
            "3" => {
                let Some(input) = read_input(None)? else { continue };
                match service.create(input) {
                    Ok(e) => println!("Empleado creado: {} ({})", e.employee_code, e.full_name()),
                    Err(e) => report(&e),
                }
            }
            "4" => {
                let keyword = prompt("Texto a buscar: ")?;
                match service.search(keyword.trim()) {
                    Ok(list) => print_table(&list),
                    Err(e) => eprintln!("Error buscando: {}", e),
                }
            }
            "5" => {
                let Some(employee) = find_by_code(&service)? else { continue };
                println!("{}", serde_json::to_string_pretty(&employee)?);
            }
            "6" => {
                let Some(current) = find_by_code(&service)? else { continue };
                println!("Enter conserva el valor actual; '-' vacía un campo opcional.");
                let Some(input) = read_input(Some(&current))? else { continue };
                match service.update(current.id, input) {
                    Ok(e) => println!("Empleado actualizado: {} ({})", e.employee_code, e.status),
                    Err(e) => report(&e),
                }
            }
            "7" => {
                let Some(employee) = find_by_code(&service)? else { continue };
                match service.soft_delete(employee.id) {
                    Ok(e) => println!("Baja registrada: {} con fecha {}", e.employee_code, fmt_date(e.date_of_leaving)),
                    Err(e) => report(&e),
                }
            }
            "8" => {
                let Some(employee) = find_by_code(&service)? else { continue };
                let confirm = prompt(&format!("Confirma borrado de {}? escribir 'yes' para confirmar: ",
                                              employee.employee_code))?;
                if confirm.trim().to_lowercase() == "yes" {
                    match service.hard_delete(employee.id) {
                        Ok(()) => println!("Empleado eliminado: {}", employee.employee_code),
                        Err(e) => report(&e),
                    }
                } else {
                    println!("Borrado cancelado");
                }
            }
            "9" => upload_document(&service, &uploader)?,
            "10" => {
                let how_many = prompt("Cuántos empleados de ejemplo (1-50): ")?;
                let n: u32 = match how_many.trim().parse() {
                    Ok(n) if (1..=50).contains(&n) => n,
                    _ => { eprintln!("Número inválido"); continue; }
                };
                let start = match EmployeeStubs::next_seed(service.repository().as_ref()) {
                    Ok(s) => s,
                    Err(e) => { report(&e); continue; }
                };
                for i in start..start + n {
                    match service.create(EmployeeStubs::sample_input(i)) {
                        Ok(e) => println!("  {} {}", e.employee_code, e.full_name()),
                        Err(e) => eprintln!("  ejemplo {}: {}", i, e),
                    }
                }
            }
            "11" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

fn upload_document(service: &Service, uploader: &Uploader) -> Result<(), Box<dyn Error>> {
    let Some(employee) = find_by_code(service)? else { return Ok(()) };
    let kind_s = prompt("Tipo (aadhaar/pan/photo/other): ")?;
    let kind: DocumentKind = match kind_s.parse() {
        Ok(k) => k,
        Err(e) => { report(&e); return Ok(()); }
    };
    let path_s = prompt("Ruta del fichero: ")?;
    let path = Path::new(path_s.trim());
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => { eprintln!("No se pudo leer {}: {}", path.display(), e); return Ok(()); }
    };
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("documento");
    match uploader.upload(employee.id, kind, name, &bytes) {
        Ok(out) => println!("Documento {} guardado en {} (sha256 {})", out.kind, out.document.path, out.document.sha256),
        Err(e) => report(&e),
    }
    Ok(())
}

fn find_by_code(service: &Service) -> io::Result<Option<Employee>> {
    let code = prompt("Código de empleado (ej: EMP0001): ")?;
    match service.get_by_code(code.trim().to_uppercase().as_str()) {
        Ok(e) => Ok(Some(e)),
        Err(e) => {
            report(&e);
            Ok(None)
        }
    }
}

fn print_table(list: &[Employee]) {
    if list.is_empty() {
        println!("(sin resultados)");
        return;
    }
    println!("\nCÓDIGO   | NOMBRE                         | MÓVIL      | ESTADO   | ALTA       | BAJA");
    println!("-------------------------------------------------------------------------------------------");
    for e in list {
        println!("{:<8} | {:<30} | {:<10} | {:<8} | {} | {}",
                 e.employee_code,
                 e.full_name(),
                 e.mobile_no,
                 e.status,
                 e.date_of_joining,
                 fmt_date(e.date_of_leaving));
    }
}

fn fmt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}

fn report(err: &DomainError) {
    match err {
        DomainError::Validation(fields) => {
            eprintln!("Datos inválidos:");
            for f in fields {
                eprintln!("  - {}", f);
            }
        }
        other => eprintln!("Error: {}", other),
    }
}

/// Pide todos los campos de un empleado. Con `current` cada campo ofrece su
/// valor actual. Devuelve `None` si alguna fecha o estado no se entiende.
fn read_input(current: Option<&Employee>) -> io::Result<Option<EmployeeInput>> {
    let base = current.map(Employee::to_input);
    let b = base.as_ref();

    let first_name = ask("Nombre", b.map(|i| i.first_name.as_str()))?;
    let last_name = ask("Apellido", b.map(|i| i.last_name.as_str()))?;
    let mobile_no = ask("Móvil (10 dígitos)", b.map(|i| i.mobile_no.as_str()))?;
    let email = ask_optional("Email", b.and_then(|i| i.email.as_deref()))?;
    let aadhaar_no = ask("Aadhaar (12 dígitos)", b.map(|i| i.aadhaar_no.as_str()))?;
    let pan_no = ask("PAN", b.map(|i| i.pan_no.as_str()))?;
    let account_no = ask("Cuenta bancaria", b.map(|i| i.account_no.as_str()))?;
    let ifsc_code = ask("IFSC", b.map(|i| i.ifsc_code.as_str()))?;
    let bank_name = ask("Banco", b.map(|i| i.bank_name.as_str()))?;
    let uan_no = ask_optional("UAN", b.and_then(|i| i.uan_no.as_deref()))?;
    let pf_no = ask_optional("PF", b.and_then(|i| i.pf_no.as_deref()))?;
    let qualification = ask_optional("Titulación", b.and_then(|i| i.qualification.as_deref()))?;
    let Some(dob) = ask_date("Fecha de nacimiento (AAAA-MM-DD)", b.map(|i| i.dob))? else { return Ok(None) };
    let address = ask("Dirección", b.map(|i| i.address.as_str()))?;
    let status_s = ask_optional("Estado (ACTIVE/RESIGNED)", b.and_then(|i| i.status).map(|s| s.as_str()))?;
    let status = match status_s.map(|s| s.parse::<EmployeeStatus>()).transpose() {
        Ok(s) => s,
        Err(e) => {
            report(&e);
            return Ok(None);
        }
    };
    let Some(date_of_joining) = ask_date("Fecha de alta (AAAA-MM-DD)", b.map(|i| i.date_of_joining))? else {
        return Ok(None);
    };
    let leaving_s = ask_optional("Fecha de baja (AAAA-MM-DD)",
                                 b.and_then(|i| i.date_of_leaving).map(|d| d.to_string()).as_deref())?;
    let date_of_leaving = match leaving_s.map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d")).transpose() {
        Ok(d) => d,
        Err(_) => {
            eprintln!("Fecha inválida");
            return Ok(None);
        }
    };

    Ok(Some(EmployeeInput { first_name,
                            last_name,
                            mobile_no,
                            email,
                            aadhaar_no,
                            pan_no,
                            account_no,
                            ifsc_code,
                            bank_name,
                            uan_no,
                            pf_no,
                            qualification,
                            dob,
                            address,
                            status,
                            date_of_joining,
                            date_of_leaving }))
}

fn ask(label: &str, current: Option<&str>) -> io::Result<String> {
    let answer = match current {
        Some(c) => prompt(&format!("{} [{}]: ", label, c))?,
        None => prompt(&format!("{}: ", label))?,
    };
    let answer = answer.trim();
    Ok(if answer.is_empty() { current.unwrap_or_default().to_string() } else { answer.to_string() })
}

fn ask_optional(label: &str, current: Option<&str>) -> io::Result<Option<String>> {
    let answer = ask(&format!("{} (opcional)", label), current)?;
    Ok(match answer.as_str() {
        "" | "-" => None,
        _ => Some(answer),
    })
}

fn ask_date(label: &str, current: Option<NaiveDate>) -> io::Result<Option<NaiveDate>> {
    let current_s = current.map(|d| d.to_string());
    let answer = ask(label, current_s.as_deref())?;
    match NaiveDate::parse_from_str(&answer, "%Y-%m-%d") {
        Ok(d) => Ok(Some(d)),
        Err(_) => {
            eprintln!("Fecha inválida: {}", answer);
            Ok(None)
        }
    }
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}
