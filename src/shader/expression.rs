//! Expressions nommées et leurs instructions d'appui

use super::ast::{AssignOp, Statement};
use super::{float_literal, ShaderType};
use crate::diagnostics::{HeavyError, MissingField};
use glam::Vec2;
use log::warn;

/// Préfixe des noms d'hygiène générés
pub const HYGIENE_PREFIX: &str = "_tmp";

/// Fréquence par défaut des ondes
pub const DEFAULT_WAVE_FREQUENCY: f32 = 10.0;

/// Vitesse par défaut des ondes
pub const DEFAULT_WAVE_SPEED: f32 = 1.0;

/// Échelle par défaut du bruit
pub const DEFAULT_NOISE_SCALE: f32 = 10.0;

/// Largeur du bord adouci d'un cercle
const CIRCLE_EDGE: f32 = 0.01;

/// Générateur de noms d'hygiène, monotone et propre à un assembleur
#[derive(Debug, Default, Clone)]
pub struct Gensym {
    next: usize,
}

impl Gensym {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nom jamais émis auparavant par ce générateur
    pub fn fresh(&mut self) -> String {
        let name = format!("{}{}", HYGIENE_PREFIX, self.next);
        self.next += 1;
        name
    }

    /// Nombre de noms déjà émis
    pub fn issued(&self) -> usize {
        self.next
    }
}

/// Morceau d'expression: texte brut ou référence à une variable d'appui locale
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fragment {
    Text(String),
    Helper(usize),
}

/// Expression dont les variables d'appui ne sont nommées qu'à l'assemblage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expr {
    parts: Vec<Fragment>,
}

impl Expr {
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Fragment::Text(text.into())],
        }
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Fragment::Text(text.into()));
        self
    }

    fn helper(mut self, local: usize) -> Self {
        self.parts.push(Fragment::Helper(local));
        self
    }

    /// Remplace chaque référence locale par le nom attribué
    fn resolve(&self, names: &[String]) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Helper(local) => out.push_str(&names[*local]),
            }
        }
        out
    }
}

/// Variable d'appui déclarée avant l'instruction principale
#[derive(Debug, Clone, PartialEq, Eq)]
struct HelperDecl {
    ty: ShaderType,
    value: Expr,
}

/// Constructeur d'une valeur nommée
///
/// ```ignore
/// let glow = ExpressionBuilder::named("glow").wave_along_x(12.0, 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionBuilder {
    name: String,
    ty: Option<ShaderType>,
    value: Option<Expr>,
    helpers: Vec<HelperDecl>,
}

impl ExpressionBuilder {
    /// Nouvelle expression liée au nom donné
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            value: None,
            helpers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> Option<ShaderType> {
        self.ty
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub(crate) fn set_type(&mut self, ty: ShaderType) {
        self.ty = Some(ty);
    }

    /// Fixe le type déclaré
    pub fn typed(mut self, ty: ShaderType) -> Self {
        self.set_type(ty);
        self
    }

    /// Valeur brute, non validée
    pub fn expression(mut self, expression: impl Into<String>) -> Self {
        self.value = Some(Expr::raw(expression));
        self
    }

    /// Disque centré en `center`: 1.0 à l'intérieur, 0.0 à l'extérieur
    pub fn circle_at(mut self, center: Vec2, radius: f32, smooth_edge: bool) -> Self {
        let distance = self.add_helper(
            ShaderType::Float,
            Expr::raw(format!(
                "distance(uv, vec2<f32>({}, {}))",
                float_literal(center.x),
                float_literal(center.y)
            )),
        );

        let value = if smooth_edge {
            Expr::raw(format!(
                "1.0 - smoothstep({}, {}, ",
                float_literal(radius - CIRCLE_EDGE),
                float_literal(radius)
            ))
        } else {
            Expr::raw(format!("1.0 - step({}, ", float_literal(radius)))
        };
        self.value = Some(value.helper(distance).text(")"));
        self
    }

    /// Onde sinusoïdale le long de l'axe X
    pub fn wave_along_x(mut self, frequency: f32, speed: f32) -> Self {
        self.value = Some(Expr::raw(wave("x", frequency, speed)));
        self
    }

    /// Onde sinusoïdale le long de l'axe Y
    pub fn wave_along_y(mut self, frequency: f32, speed: f32) -> Self {
        self.value = Some(Expr::raw(wave("y", frequency, speed)));
        self
    }

    /// Bruit pseudo-aléatoire par hachage des coordonnées
    pub fn hash_noise(mut self, scale: f32) -> Self {
        let hash = self.add_helper(
            ShaderType::Float,
            Expr::raw(format!(
                "sin(dot(uv * {}, vec2<f32>(12.9898, 78.233))) * 43758.5453",
                float_literal(scale)
            )),
        );
        self.value = Some(Expr::raw("fract(").helper(hash).text(")"));
        self
    }

    fn add_helper(&mut self, ty: ShaderType, value: Expr) -> usize {
        self.helpers.push(HelperDecl { ty, value });
        self.helpers.len() - 1
    }

    /// Nomme les variables d'appui et renvoie leurs déclarations
    fn lower_helpers(&self, gensym: &mut Gensym) -> (Vec<String>, Vec<Statement>) {
        let mut names = Vec::with_capacity(self.helpers.len());
        let mut statements = Vec::with_capacity(self.helpers.len());

        for helper in &self.helpers {
            let name = gensym.fresh();
            // Une variable d'appui ne peut référencer que les précédentes
            let value = helper.value.resolve(&names);
            statements.push(Statement::Helper {
                name: name.clone(),
                ty: helper.ty,
                value,
            });
            names.push(name);
        }

        (names, statements)
    }

    fn require_value(&self) -> Result<&Expr, HeavyError> {
        self.value.as_ref().ok_or_else(|| {
            warn!(
                "ExpressionBuilder: VALUE invalide ou absente pour la variable '{}'",
                self.name
            );
            HeavyError::malformed(&self.name, MissingField::Value)
        })
    }

    /// Déclaration typée, précédée de ses variables d'appui
    pub fn build(&self, gensym: &mut Gensym) -> Result<Vec<Statement>, HeavyError> {
        let ty = self.ty.ok_or_else(|| {
            warn!(
                "ExpressionBuilder: TYPE invalide ou absent pour la variable '{}'",
                self.name
            );
            HeavyError::malformed(&self.name, MissingField::Type)
        })?;
        let value = self.require_value()?;

        let (names, mut statements) = self.lower_helpers(gensym);
        statements.push(Statement::Declare {
            name: self.name.clone(),
            ty,
            value: value.resolve(&names),
        });
        Ok(statements)
    }

    /// Affectation d'une variable existante (`=`, `+=` ou `-=`)
    pub fn build_assignment(
        &self,
        op: AssignOp,
        gensym: &mut Gensym,
    ) -> Result<Vec<Statement>, HeavyError> {
        let value = self.require_value()?;

        let (names, mut statements) = self.lower_helpers(gensym);
        statements.push(Statement::Assign {
            name: self.name.clone(),
            op,
            value: value.resolve(&names),
        });
        Ok(statements)
    }

    /// Variables d'appui et expression de valeur, pour servir de couleur finale
    pub(crate) fn build_value(
        &self,
        gensym: &mut Gensym,
    ) -> Result<(Vec<Statement>, String), HeavyError> {
        let value = self.require_value()?;
        let (names, statements) = self.lower_helpers(gensym);
        Ok((statements, value.resolve(&names)))
    }
}

fn wave(axis: &str, frequency: f32, speed: f32) -> String {
    format!(
        "sin(uv.{} * {} + time * {})",
        axis,
        float_literal(frequency),
        float_literal(speed)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_declaration() {
        let mut gensym = Gensym::new();
        let statements = ExpressionBuilder::named("x")
            .typed(ShaderType::Float)
            .expression("1.0 + 2.0")
            .build(&mut gensym)
            .unwrap();

        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].to_string(), "var x: f32 = f32(1.0 + 2.0);");
        assert_eq!(gensym.issued(), 0);
    }

    #[test]
    fn test_build_requires_type_then_value() {
        let mut gensym = Gensym::new();

        let err = ExpressionBuilder::named("a")
            .expression("1.0")
            .build(&mut gensym)
            .unwrap_err();
        assert_eq!(err, HeavyError::malformed("a", MissingField::Type));

        let err = ExpressionBuilder::named("b")
            .typed(ShaderType::Float2)
            .build(&mut gensym)
            .unwrap_err();
        assert_eq!(err, HeavyError::malformed("b", MissingField::Value));
    }

    #[test]
    fn test_assignment_only_needs_value() {
        let mut gensym = Gensym::new();
        let node = ExpressionBuilder::named("checker").expression("checker % 2.0");

        let set = node.build_assignment(AssignOp::Set, &mut gensym).unwrap();
        let sub = node.build_assignment(AssignOp::Sub, &mut gensym).unwrap();
        assert_eq!(set[0].to_string(), "checker = checker % 2.0;");
        assert_eq!(sub[0].to_string(), "checker -= checker % 2.0;");

        let err = ExpressionBuilder::named("y")
            .build_assignment(AssignOp::Add, &mut gensym)
            .unwrap_err();
        assert_eq!(err, HeavyError::malformed("y", MissingField::Value));
    }

    #[test]
    fn test_circle_uses_generated_helper() {
        let mut gensym = Gensym::new();
        let statements = ExpressionBuilder::named("disk")
            .typed(ShaderType::Float)
            .circle_at(Vec2::new(0.5, 0.5), 0.25, true)
            .build(&mut gensym)
            .unwrap();

        assert_eq!(
            statements[0].to_string(),
            "let _tmp0: f32 = distance(uv, vec2<f32>(0.5, 0.5));"
        );
        assert_eq!(
            statements[1].to_string(),
            "var disk: f32 = f32(1.0 - smoothstep(0.24, 0.25, _tmp0));"
        );
    }

    #[test]
    fn test_non_finite_arguments_render_as_zero() {
        let mut gensym = Gensym::new();
        let statements = ExpressionBuilder::named("disk")
            .typed(ShaderType::Float)
            .circle_at(Vec2::new(f32::NAN, 0.5), f32::INFINITY, false)
            .build(&mut gensym)
            .unwrap();

        assert_eq!(
            statements[0].to_string(),
            "let _tmp0: f32 = distance(uv, vec2<f32>(0.0, 0.5));"
        );
        assert_eq!(
            statements[1].to_string(),
            "var disk: f32 = f32(1.0 - step(0.0, _tmp0));"
        );
    }

    #[test]
    fn test_hard_edge_circle() {
        let mut gensym = Gensym::new();
        let statements = ExpressionBuilder::named("disk")
            .typed(ShaderType::Float)
            .circle_at(Vec2::new(0.0, 1.0), 0.5, false)
            .build(&mut gensym)
            .unwrap();

        assert_eq!(
            statements[1].to_string(),
            "var disk: f32 = f32(1.0 - step(0.5, _tmp0));"
        );
    }

    #[test]
    fn test_waves_render_float_literals() {
        let mut gensym = Gensym::new();
        let x = ExpressionBuilder::named("wx")
            .wave_along_x(DEFAULT_WAVE_FREQUENCY, DEFAULT_WAVE_SPEED)
            .build_assignment(AssignOp::Set, &mut gensym)
            .unwrap();
        let y = ExpressionBuilder::named("wy")
            .wave_along_y(4.0, 0.5)
            .build_assignment(AssignOp::Set, &mut gensym)
            .unwrap();

        assert_eq!(x[0].to_string(), "wx = sin(uv.x * 10.0 + time * 1.0);");
        assert_eq!(y[0].to_string(), "wy = sin(uv.y * 4.0 + time * 0.5);");
    }

    #[test]
    fn test_noise_names_are_assigned_at_build_time() {
        let mut gensym = Gensym::new();
        let a = ExpressionBuilder::named("a")
            .typed(ShaderType::Float)
            .hash_noise(DEFAULT_NOISE_SCALE)
            .build(&mut gensym)
            .unwrap();
        let b = ExpressionBuilder::named("b")
            .typed(ShaderType::Float)
            .hash_noise(3.0)
            .build(&mut gensym)
            .unwrap();

        assert!(a[0].to_string().starts_with("let _tmp0: f32 = sin(dot(uv * 10.0"));
        assert_eq!(a[1].to_string(), "var a: f32 = f32(fract(_tmp0));");
        assert!(b[0].to_string().starts_with("let _tmp1: f32 = sin(dot(uv * 3.0"));
        assert_eq!(b[1].to_string(), "var b: f32 = f32(fract(_tmp1));");
    }

    #[test]
    fn test_helpers_keep_insertion_order() {
        let mut gensym = Gensym::new();
        let statements = ExpressionBuilder::named("mix")
            .typed(ShaderType::Float)
            .hash_noise(2.0)
            .circle_at(Vec2::ZERO, 1.0, true)
            .build(&mut gensym)
            .unwrap();

        assert_eq!(statements.len(), 3);
        assert!(statements[0].to_string().starts_with("let _tmp0: f32 = sin("));
        assert!(statements[1].to_string().starts_with("let _tmp1: f32 = distance("));
        assert!(statements[2].to_string().contains("_tmp1"));
    }
}
