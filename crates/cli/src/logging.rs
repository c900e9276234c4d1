use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable holding a level or a full filter spec.
pub const LOG_ENV: &str = "APIBIND_LOG";

pub fn init_tracing() {
    // APIBIND_LOG: "trace", "debug", "info", "warn", "error"
    // or a full tracing filter spec like "apibind=debug,apibind_defs=trace"
    let filter = filter_spec(std::env::var(LOG_ENV).ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// Plain levels apply to every apibind crate; anything else is a filter spec.
fn filter_spec(value: Option<&str>) -> String {
    match value {
        Some(level) if is_plain_level(level) => {
            let level = level.to_ascii_lowercase();
            format!("apibind={level},apibind_runtime={level},apibind_codegen={level},apibind_defs={level}")
        }
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => "apibind=info,apibind_runtime=warn,apibind_codegen=warn,apibind_defs=info".to_string(),
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
