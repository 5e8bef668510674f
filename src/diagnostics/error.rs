//! Erreurs du constructeur de shaders et du pipeline de rendu

use thiserror::Error;

/// Champ manquant dans une expression au moment de sa construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Type,
    Value,
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingField::Type => write!(f, "TYPE"),
            MissingField::Value => write!(f, "VALUE"),
        }
    }
}

/// Détail d'un échec de compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationDetail {
    /// Le compilateur a rejeté le texte (message du front-end ou du backend)
    Diagnostic(String),

    /// Le module a compilé mais aucun pipeline exploitable n'a été produit
    PipelineCreation { shader_source: String },
}

impl std::fmt::Display for CompilationDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompilationDetail::Diagnostic(message) => write!(f, "{}", message),
            CompilationDetail::PipelineCreation { shader_source } => {
                write!(f, "impossible de créer le pipeline pour la source:\n{}", shader_source)
            }
        }
    }
}

/// Erreurs remontées au puits d'erreurs global
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeavyError {
    #[error("Échec de compilation du shader: {0}")]
    CompilationFailure(CompilationDetail),

    #[error("Expression malformée: {missing} invalide ou absent pour la variable '{name}'")]
    MalformedExpression { name: String, missing: MissingField },

    #[error("Configuration invalide: {0}")]
    InvalidConfig(String),

    #[error("Contexte graphique indisponible: {0}")]
    ContextUnavailable(String),
}

impl HeavyError {
    pub fn diagnostic(message: impl Into<String>) -> Self {
        HeavyError::CompilationFailure(CompilationDetail::Diagnostic(message.into()))
    }

    pub fn pipeline_creation(shader_source: impl Into<String>) -> Self {
        HeavyError::CompilationFailure(CompilationDetail::PipelineCreation {
            shader_source: shader_source.into(),
        })
    }

    pub fn malformed(name: impl Into<String>, missing: MissingField) -> Self {
        HeavyError::MalformedExpression {
            name: name.into(),
            missing,
        }
    }

    /// Vrai pour toute la famille des échecs de compilation
    pub fn is_compilation_failure(&self) -> bool {
        matches!(self, HeavyError::CompilationFailure(_))
    }
}
