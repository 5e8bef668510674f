//! Assemblage de shaders de fragment
//!
//! Le programme est construit par appels chaînés plutôt qu'écrit à la main :
//! - `ExpressionBuilder` décrit une valeur nommée et ses instructions d'appui
//! - `ShaderBuilder` accumule en-têtes et instructions dans l'ordre d'appel
//! - `finalize` produit un `ShaderProgram` immuable en WGSL

pub mod ast;
pub mod builder;
pub mod expression;
pub mod templates;

use std::sync::Arc;

pub use ast::*;
pub use builder::*;
pub use expression::*;
pub use templates::*;

/// Types scalaires et vectoriels manipulés par les expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Float,
    Float2,
    Float3,
    Float4,
}

impl ShaderType {
    /// Nom du type dans le langage cible
    pub fn wgsl_name(self) -> &'static str {
        match self {
            ShaderType::Float => "f32",
            ShaderType::Float2 => "vec2<f32>",
            ShaderType::Float3 => "vec3<f32>",
            ShaderType::Float4 => "vec4<f32>",
        }
    }

    /// Nombre de composantes
    pub fn components(self) -> usize {
        match self {
            ShaderType::Float => 1,
            ShaderType::Float2 => 2,
            ShaderType::Float3 => 3,
            ShaderType::Float4 => 4,
        }
    }
}

impl std::fmt::Display for ShaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wgsl_name())
    }
}

/// Programme de fragment finalisé, partageable entre plusieurs pipelines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    source: Arc<str>,
}

impl ShaderProgram {
    pub(crate) fn new(source: String) -> Self {
        Self {
            source: Arc::from(source),
        }
    }

    /// Texte source du programme
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source complète soumise au compilateur (préambule de vertex inclus)
    pub fn module_source(&self) -> String {
        let mut full = String::with_capacity(VERTEX_PREAMBLE.len() + self.source.len() + 1);
        full.push_str(VERTEX_PREAMBLE);
        full.push('\n');
        full.push_str(&self.source);
        full
    }
}

impl std::fmt::Display for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Point d'entrée: nouvel assembleur vide
pub fn shader_builder() -> ShaderBuilder {
    ShaderBuilder::new()
}

/// Littéral flottant toujours muni d'un point ou d'un exposant
///
/// WGSL n'a pas de littéral pour NaN ni l'infini: ils deviennent `0.0`.
pub(crate) fn float_literal(value: f32) -> String {
    if value.is_finite() {
        format!("{:?}", value)
    } else {
        log::warn!("Valeur non finie {} dans une expression, remplacée par 0.0", value);
        "0.0".to_string()
    }
}
