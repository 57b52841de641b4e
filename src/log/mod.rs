use serde::Serialize;
use serde_json::to_string_pretty;
use std::io::Write;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr subscriber. `RUST_LOG` wins over `debug`.
pub fn init(debug: bool) {
    let fallback = if debug { "promptcron=debug" } else { "promptcron=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests, embedding) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub fn print_json_debug<T: Serialize>(stage: &str, value: &T) -> anyhow::Result<()> {
    let json = to_string_pretty(value)?;
    eprintln!("\n===== DEBUG [{stage}] =====\n{}\n", json);
    std::io::stderr().flush().ok();
    Ok(())
}
