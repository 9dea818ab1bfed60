// stderr tracing for the CLI.
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub const LOG_ENV: &str = "WASM_SCHEMA_GEN_LOG";

const CRATE_ROOT: &str = "wasm_schema_gen";

/// Filter directive for a `-v` count and the `WASM_SCHEMA_GEN_LOG` value.
/// Any `-v` wins over the environment.
pub fn filter_spec(verbosity: u8, env: Option<&str>) -> String {
    let level = match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    };
    match (level, env) {
        (Some(level), _) => format!("{CRATE_ROOT}={level}"),
        // plain level ("debug") or a full spec ("wasm_schema_gen=trace,rayon=warn")
        (None, Some(level)) if is_plain_level(level) => format!("{CRATE_ROOT}={level}"),
        (None, Some(spec)) if !spec.trim().is_empty() => spec.to_string(),
        (None, _) => format!("{CRATE_ROOT}=warn"),
    }
}

pub fn init_tracing(verbosity: u8) {
    let env = std::env::var(LOG_ENV).ok();
    let filter = filter_spec(verbosity, env.as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
