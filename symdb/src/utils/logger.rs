// FICHIER : symdb/src/utils/logger.rs

use std::path::PathBuf;
use std::sync::Once;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Sécurité pour éviter la double initialisation (crash fréquent en tests)
static INIT: Once = Once::new();

/// Options du logger. Sans `log_dir`, seule la console est active.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub log_dir: Option<PathBuf>,
    /// Filtre par défaut si `RUST_LOG` est absent.
    pub default_filter: Option<String>,
}

impl LogOptions {
    pub fn from_config(cfg: &crate::utils::config::DbConfig) -> Self {
        Self {
            log_dir: cfg.log_dir.clone(),
            default_filter: None,
        }
    }
}

pub fn init_logging(options: LogOptions) {
    INIT.call_once(|| {
        let default_filter = options
            .default_filter
            .clone()
            .unwrap_or_else(|| "warn".to_string());

        // =========================================================================
        // LAYER 1 : FICHIER JSON (optionnel)
        // =========================================================================
        let file_layer = options.log_dir.as_ref().and_then(|dir| {
            std::fs::create_dir_all(dir).ok()?;
            let appender = rolling::daily(dir, "symdb.log");
            Some(
                fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
        });

        // =========================================================================
        // LAYER 2 : CONSOLE
        // =========================================================================
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

        let console_layer = fmt::layer()
            .compact()
            .with_target(false)
            .with_filter(env_filter);

        let registry = tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer);

        if registry.try_init().is_err() {
            tracing::warn!("[Logger] Ré-initialisation ignorée (subscriber global déjà actif).");
            return;
        }

        tracing::info!(log_dir = ?options.log_dir, "Logger initialisé");
    });
}
