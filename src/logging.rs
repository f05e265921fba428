use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable that overrides `--log-level`
pub const LOG_ENV: &str = "EBOOK_MCP_LOG";

/// Install the global subscriber. Output goes to stderr; stdout carries
/// protocol frames only.
pub fn init(level: &str) {
    let directive = filter_directive(level, std::env::var(LOG_ENV).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}

fn filter_directive(level: &str, env: Option<String>) -> String {
    env.filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| level.to_string())
}
