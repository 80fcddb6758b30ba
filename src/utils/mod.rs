use std::{env, path::PathBuf};

use dirs::home_dir;
use once_cell::sync::OnceCell;

const DEFAULT_DIR_NAME: &str = ".hearth_core";

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("hearth_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Returns the application data directory, defaulting to `~/.hearth_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("HEARTH_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
