//! Runtime bootstrap (C13, spec section 4.13... section 4 component list):
//! resolves paths, opens the store, constructs services, owns lifetimes.

use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::domain::Clock;
use crate::error::CoreError;
use crate::reporting::FormatterRegistry;
use crate::storage::Repository;

/// Installs the global `tracing` subscriber from `RUST_LOG`, defaulting
/// to `info`. Idempotent: a second call is a harmless no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub struct Runtime {
    pub config: AppConfig,
    pub repository: Repository,
    pub formatters: FormatterRegistry,
    pub clock: Clock,
}

impl Runtime {
    /// Resolves `bundle_root` and `db_path`, validates the bundle,
    /// builds the formatter registry from its declared pairs, and opens
    /// the store. `clock` lets tests and `TT_TODAY` override "now"
    /// (spec section 4.1).
    pub fn bootstrap(bundle_root: &Path, db_path: &Path, clock: Clock) -> Result<Self, CoreError> {
        let config = AppConfig::load(bundle_root)?;
        let formatters = FormatterRegistry::from_declared(&config.declared_formatters);
        let repository = Repository::open(db_path)?;

        info!(bundle_root = %bundle_root.display(), db_path = %db_path.display(), "runtime bootstrapped");

        Ok(Self { config, repository, formatters, clock })
    }

    #[must_use]
    pub fn default_bundle_root() -> PathBuf {
        std::env::current_dir().unwrap_or_default().join("bundle")
    }

    #[must_use]
    pub fn default_db_path() -> PathBuf {
        std::env::current_dir().unwrap_or_default().join("time-tracker.sqlite3")
    }
}
