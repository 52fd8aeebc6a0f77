//! Inicialización de logs para el binario.
//!
//! Las crates de librería emiten con la fachada `log`; el subscriber de
//! `tracing` los recoge junto con los eventos propios del binario.

use tracing_subscriber::EnvFilter;

/// Nivel por defecto cuando `RUST_LOG` no está definido.
const DEFAULT_FILTER: &str = "info,diesel=warn";

pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Err(e) = subscriber.try_init() {
        eprintln!("no se pudo inicializar el logger: {}", e);
    }
}
