//! Assembleur de shaders par appels chaînés

use super::ast::{AssignOp, FragmentFunction, Statement};
use super::expression::{ExpressionBuilder, Gensym};
use super::{ShaderProgram, ShaderType};
use crate::diagnostics::{self, HeavyError};
use log::debug;

/// Accumule en-têtes et instructions, puis produit un `ShaderProgram`
///
/// Les instructions sont émises exactement dans l'ordre des appels. Une
/// expression malformée n'interrompt pas la chaîne mais fait échouer
/// `finalize`.
#[derive(Debug, Default)]
pub struct ShaderBuilder {
    headers: Vec<String>,
    body: Vec<Statement>,
    gensym: Gensym,
    failure: Option<HeavyError>,
}

impl ShaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute du code brut au corps de la fonction de fragment
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.body.push(Statement::Raw(code.into()));
        self
    }

    /// Déclare une nouvelle variable typée
    pub fn declare(mut self, ty: ShaderType, mut expression: ExpressionBuilder) -> Self {
        expression.set_type(ty);
        let built = expression.build(&mut self.gensym);
        self.append(built)
    }

    /// Affecte une nouvelle valeur à une variable existante (`=`)
    pub fn assign(self, expression: ExpressionBuilder) -> Self {
        self.assignment(AssignOp::Set, expression)
    }

    /// Incrémente une variable existante (`+=`)
    pub fn increment(self, expression: ExpressionBuilder) -> Self {
        self.assignment(AssignOp::Add, expression)
    }

    /// Décrémente une variable existante (`-=`)
    pub fn decrement(self, expression: ExpressionBuilder) -> Self {
        self.assignment(AssignOp::Sub, expression)
    }

    /// Code placé avant la fonction de fragment (constantes, structures, fonctions)
    pub fn header(mut self, code: impl Into<String>) -> Self {
        self.headers.push(code.into());
        self
    }

    pub fn float(self, expression: ExpressionBuilder) -> Self {
        self.declare(ShaderType::Float, expression)
    }

    pub fn float2(self, expression: ExpressionBuilder) -> Self {
        self.declare(ShaderType::Float2, expression)
    }

    pub fn float3(self, expression: ExpressionBuilder) -> Self {
        self.declare(ShaderType::Float3, expression)
    }

    pub fn float4(self, expression: ExpressionBuilder) -> Self {
        self.declare(ShaderType::Float4, expression)
    }

    /// Finalise le programme autour de l'expression de couleur (4 composantes)
    pub fn finalize(self, color: impl Into<String>) -> Result<ShaderProgram, HeavyError> {
        let color = color.into();
        self.finish(color)
    }

    /// Finalise avec une expression nommée comme couleur
    pub fn finalize_with(mut self, expression: ExpressionBuilder) -> Result<ShaderProgram, HeavyError> {
        match expression.build_value(&mut self.gensym) {
            Ok((helpers, color)) => {
                self.body.extend(helpers);
                self.finish(color)
            }
            Err(err) => {
                let err = self.failure.take().unwrap_or(err);
                diagnostics::report(&err);
                Err(err)
            }
        }
    }

    fn assignment(mut self, op: AssignOp, expression: ExpressionBuilder) -> Self {
        let built = expression.build_assignment(op, &mut self.gensym);
        self.append(built)
    }

    fn append(mut self, built: Result<Vec<Statement>, HeavyError>) -> Self {
        match built {
            Ok(statements) => self.body.extend(statements),
            Err(err) => {
                // Seule la première erreur est conservée
                if self.failure.is_none() {
                    self.failure = Some(err);
                }
            }
        }
        self
    }

    fn finish(self, color: String) -> Result<ShaderProgram, HeavyError> {
        if let Some(err) = self.failure {
            diagnostics::report(&err);
            return Err(err);
        }

        let function = FragmentFunction {
            headers: self.headers,
            body: self.body,
            color,
        };
        let source = function.render();
        debug!("Fonction de fragment générée:\n{}", source);
        Ok(ShaderProgram::new(source))
    }
}
