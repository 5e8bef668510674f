//! Validation WGSL hors GPU avec naga

use crate::diagnostics::HeavyError;
use crate::shader::{ShaderProgram, FRAGMENT_ENTRY_POINT, VERTEX_ENTRY_POINT};

/// Analyse et valide un module WGSL complet
///
/// Renvoie le module naga en cas de succès, sinon un
/// `HeavyError::CompilationFailure` portant un diagnostic lisible.
pub fn validate_wgsl(source: &str) -> Result<naga::Module, HeavyError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| HeavyError::diagnostic(format_diagnostic(source, &e.emit_to_string(source))))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| HeavyError::diagnostic(format_diagnostic(source, &format!("{e:?}"))))?;

    for entry in [VERTEX_ENTRY_POINT, FRAGMENT_ENTRY_POINT] {
        if !module.entry_points.iter().any(|ep| ep.name == entry) {
            return Err(HeavyError::diagnostic(format!(
                "point d'entrée '{}' introuvable",
                entry
            )));
        }
    }

    Ok(module)
}

/// Valide un programme tel qu'il sera soumis au pipeline
pub fn validate_program(program: &ShaderProgram) -> Result<naga::Module, HeavyError> {
    validate_wgsl(&program.module_source())
}

/// Message d'erreur suivi de la source numérotée
fn format_diagnostic(source: &str, message: &str) -> String {
    let mut output = String::new();
    output.push_str(message.trim_end());
    output.push_str("\n\nWGSL généré:\n---\n");
    for (line_num, line) in source.lines().enumerate() {
        output.push_str(&format!("{:4} | {}\n", line_num + 1, line));
    }
    output.push_str("---\n");
    output
}
