// src/core/compiler.rs

use super::builder;
use super::parser::{self, DeclarationError, ParsedDeclaration};
use crate::models::{CommandSpec, ParamKind, Parameter, SubstitutionOp};

/// Una aparición de un marcador dentro de un texto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerMatch<'m> {
    pub start: usize,
    pub marker: &'m str,
}

/// Busca los marcadores de izquierda a derecha sin solapamientos. Si varios
/// empiezan en la misma posición gana el más largo (`MESSAGES` antes que `MESSAGE`).
pub fn scan_markers<'m>(text: &str, markers: &[&'m str]) -> Vec<MarkerMatch<'m>> {
    let mut by_length: Vec<&'m str> = markers.iter().copied().filter(|m| !m.is_empty()).collect();
    by_length.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut matches = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        let rest = &text[pos..];
        match by_length.iter().find(|m| rest.starts_with(**m)) {
            Some(marker) => {
                matches.push(MarkerMatch { start: pos, marker });
                pos += marker.len();
            }
            None => pos += rest.chars().next().map_or(1, char::len_utf8),
        }
    }
    matches
}

/// Reemplaza en una sola pasada cada marcador por su valor. El texto insertado
/// nunca se vuelve a examinar.
pub fn substitute(text: &str, replacements: &[(&str, String)]) -> String {
    let markers: Vec<&str> = replacements.iter().map(|(m, _)| *m).collect();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for found in scan_markers(text, &markers) {
        out.push_str(&text[last..found.start]);
        if let Some((_, value)) = replacements.iter().find(|(m, _)| *m == found.marker) {
            out.push_str(value);
        }
        last = found.start + found.marker.len();
    }
    out.push_str(&text[last..]);
    out
}

/// Analiza, construye y compila en un paso.
pub fn compile_declaration(template: &str, declaration: &str) -> Result<CommandSpec, DeclarationError> {
    let parsed = parser::parse_declaration(declaration)?;
    compile(template, parsed)
}

/// Enlaza la declaración analizada con la plantilla y produce la especificación.
pub fn compile(template: &str, parsed: ParsedDeclaration) -> Result<CommandSpec, DeclarationError> {
    let template = template.trim();
    if template.is_empty() {
        return Err(DeclarationError::MalformedAnnotation {
            fragment: parsed.command_name(),
            reason: "el comando a envolver está vacío".to_string(),
        });
    }

    let command_name = parsed.command_name();
    let parameters = builder::build_parameters(parsed.annotations)?;

    // Todos los marcadores que compiten por el texto de la plantilla.
    let inline_markers: Vec<&str> = parameters
        .iter()
        .filter(|p| matches!(p.kind, ParamKind::PositionalReplace | ParamKind::OptionReplace { .. } | ParamKind::Varargs))
        .map(|p| p.marker.as_str())
        .collect();
    let found = scan_markers(template, &inline_markers);
    let is_present = |marker: &str| found.iter().any(|m| m.marker == marker);

    let plan = parameters
        .iter()
        .map(|p| plan_step(p, template, &is_present))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("Plan de sustitución para '{}': {:?}", command_name, plan);
    Ok(CommandSpec {
        command_name,
        template: template.to_string(),
        parameters,
        plan,
    })
}

fn plan_step(
    param: &Parameter,
    template: &str,
    is_present: &impl Fn(&str) -> bool,
) -> Result<SubstitutionOp, DeclarationError> {
    match &param.kind {
        ParamKind::PositionalReplace | ParamKind::OptionReplace { .. } => {
            if !is_present(&param.marker) {
                return Err(DeclarationError::UnresolvedMarker {
                    marker: param.marker.clone(),
                    name: param.name.clone(),
                    template: template.to_string(),
                });
            }
            Ok(SubstitutionOp::Replace {
                marker: param.marker.clone(),
                param: param.name.clone(),
            })
        }
        ParamKind::OptionAliasAppend { .. } => Ok(SubstitutionOp::AppendFlag {
            flag: param.marker.clone(),
            param: param.name.clone(),
        }),
        ParamKind::Varargs => Ok(SubstitutionOp::CaptureRemaining {
            marker: Some(param.marker.clone()).filter(|m| is_present(m)),
            param: param.name.clone(),
        }),
    }
}
