//! Arbre d'instructions typé et son unique passe d'écriture en WGSL

use super::templates::{FRAGMENT_CLOSING, FRAGMENT_PREAMBLE};
use super::ShaderType;
use std::fmt::{self, Write};

/// Indentation des instructions du corps
const INDENT: &str = "    ";

/// Opérateurs d'affectation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
        }
    }
}

/// Instruction du corps de la fonction de fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Variable d'appui générée (nom d'hygiène)
    Helper {
        name: String,
        ty: ShaderType,
        value: String,
    },

    /// Déclaration `var <name>: <type> = <type>(<value>);`
    Declare {
        name: String,
        ty: ShaderType,
        value: String,
    },

    /// Affectation `<name> <op> <value>;`
    Assign {
        name: String,
        op: AssignOp,
        value: String,
    },

    /// Code brut recopié tel quel
    Raw(String),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Helper { name, ty, value } => {
                write!(f, "let {}: {} = {};", name, ty, value)
            }
            Statement::Declare { name, ty, value } => {
                write!(f, "var {}: {} = {}({});", name, ty, ty, value)
            }
            Statement::Assign { name, op, value } => {
                write!(f, "{} {} {};", name, op.symbol(), value)
            }
            Statement::Raw(code) => f.write_str(code),
        }
    }
}

/// Programme de fragment complet avant écriture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentFunction {
    pub headers: Vec<String>,
    pub body: Vec<Statement>,
    pub color: String,
}

impl FragmentFunction {
    /// Écrit, dans l'ordre: en-têtes, préambule, corps, retour, fermeture
    pub fn render(&self) -> String {
        let mut out = String::new();

        if !self.headers.is_empty() {
            out.push_str(&self.headers.join("\n"));
            out.push_str("\n\n");
        }

        out.push_str(FRAGMENT_PREAMBLE);
        out.push('\n');

        for statement in &self.body {
            // Le code brut peut s'étendre sur plusieurs lignes
            for line in statement.to_string().lines() {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "{}{}", INDENT, line);
                }
            }
        }

        let _ = writeln!(out, "{}return vec4<f32>({});", INDENT, self.color);
        out.push_str(FRAGMENT_CLOSING);
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_forms() {
        let declare = Statement::Declare {
            name: "x".into(),
            ty: ShaderType::Float,
            value: "1.0 + 2.0".into(),
        };
        assert_eq!(declare.to_string(), "var x: f32 = f32(1.0 + 2.0);");

        let helper = Statement::Helper {
            name: "_tmp0".into(),
            ty: ShaderType::Float,
            value: "distance(uv, vec2<f32>(0.5, 0.5))".into(),
        };
        assert_eq!(
            helper.to_string(),
            "let _tmp0: f32 = distance(uv, vec2<f32>(0.5, 0.5));"
        );

        let inc = Statement::Assign {
            name: "uv2.y".into(),
            op: AssignOp::Add,
            value: "time * 0.3".into(),
        };
        assert_eq!(inc.to_string(), "uv2.y += time * 0.3;");
    }

    #[test]
    fn test_render_empty_function() {
        let function = FragmentFunction {
            color: "0.0, 0.0, 0.0, 1.0".into(),
            ..Default::default()
        };
        let text = function.render();

        assert!(text.starts_with(FRAGMENT_PREAMBLE));
        let after_preamble = &text[FRAGMENT_PREAMBLE.len()..];
        assert_eq!(
            after_preamble,
            "\n    return vec4<f32>(0.0, 0.0, 0.0, 1.0);\n}\n"
        );
    }

    #[test]
    fn test_headers_precede_preamble() {
        let function = FragmentFunction {
            headers: vec!["const A: f32 = 1.0;".into(), "const B: f32 = 2.0;".into()],
            body: vec![Statement::Raw("let c = A + B;".into())],
            color: "c, c, c, 1.0".into(),
        };
        let text = function.render();

        let a = text.find("const A").unwrap();
        let b = text.find("const B").unwrap();
        let preamble = text.find("@fragment").unwrap();
        let body = text.find("let c = A + B;").unwrap();
        assert!(a < b && b < preamble && preamble < body);
    }
}
