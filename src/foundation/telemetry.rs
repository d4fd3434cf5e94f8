use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Installs the global tracing subscriber for a binary.
///
/// Diagnostics go to stderr so they never interleave with the menus and
/// reports printed on stdout. `RUST_LOG` overrides `default_filter`.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_subscriber(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let _ = Registry::default()
        .with(env_filter)
        .with(formatting_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_subscriber_twice() {
        init_subscriber("debug");
        init_subscriber("warn");
        tracing::debug!("subscriber initialised");
    }
}
