//! Puits d'erreurs global et niveau de journalisation

use super::error::HeavyError;
use log::LevelFilter;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Niveaux de journalisation reconnus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    /// Tout afficher, y compris les traces
    All,
}

impl LogLevel {
    /// Filtre `log` correspondant à la sévérité minimale
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::All => LevelFilter::Trace,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::All => "all",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = HeavyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "all" => Ok(LogLevel::All),
            other => Err(HeavyError::InvalidConfig(format!(
                "niveau de log inconnu: {}",
                other
            ))),
        }
    }
}

/// Observateur appelé à chaque erreur enregistrée
pub type ErrorHandler = Arc<dyn Fn(&HeavyError) + Send + Sync>;

/// Dernière erreur connue et observateur optionnel
pub struct ErrorSink {
    last_error: Mutex<Option<HeavyError>>,
    handler: Mutex<Option<ErrorHandler>>,
}

impl ErrorSink {
    pub const fn new() -> Self {
        Self {
            last_error: parking_lot::const_mutex(None),
            handler: parking_lot::const_mutex(None),
        }
    }

    /// Enregistre une erreur, écrase la précédente et notifie l'observateur
    pub fn record(&self, err: &HeavyError) {
        *self.last_error.lock() = Some(err.clone());

        // L'observateur est appelé hors verrou: il peut relire last_error()
        let handler = self.handler.lock().clone();
        if let Some(handler) = handler {
            handler(err);
        }
    }

    pub fn last_error(&self) -> Option<HeavyError> {
        self.last_error.lock().clone()
    }

    pub fn set_handler(&self, handler: ErrorHandler) {
        *self.handler.lock() = Some(handler);
    }

    pub fn clear_handler(&self) {
        *self.handler.lock() = None;
    }
}

impl Default for ErrorSink {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_SINK: ErrorSink = ErrorSink::new();

/// Puits partagé par tout le processus
pub fn global_sink() -> &'static ErrorSink {
    &GLOBAL_SINK
}

/// Journalise l'erreur et l'enregistre comme dernière erreur globale
pub fn report(err: &HeavyError) {
    log::error!("{}", err);
    GLOBAL_SINK.record(err);
}

/// Dernière erreur enregistrée, si elle existe
pub fn get_last_error() -> Option<HeavyError> {
    GLOBAL_SINK.last_error()
}

/// Remplace l'observateur d'erreurs (la dernière inscription l'emporte)
pub fn set_error_handler<F>(handler: F)
where
    F: Fn(&HeavyError) + Send + Sync + 'static,
{
    GLOBAL_SINK.set_handler(Arc::new(handler));
}

pub fn clear_error_handler() {
    GLOBAL_SINK.clear_handler();
}

/// Change la sévérité minimale affichée
pub fn set_log_level(level: LogLevel) {
    log::set_max_level(level.filter());
}
