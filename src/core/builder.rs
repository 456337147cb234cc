// src/core/builder.rs

use super::parser::{Annotation, DeclarationError};
use super::values;
use crate::models::{ParamKind, Parameter, TypeKind, Value};
use std::collections::HashSet;

/// Nombre de reserva para un variádico sin marcador (`[...]`).
const DEFAULT_VARARGS_NAME: &str = "args";

/// Convierte las anotaciones en la lista final de parámetros.
///
/// Asigna nombres a las anotaciones que no lo traen, convierte los valores por
/// defecto a su tipo y reordena: obligatorios primero, opcionales después, cada
/// grupo en su orden original, y el variádico siempre al final.
pub fn build_parameters(annotations: Vec<Annotation>) -> Result<Vec<Parameter>, DeclarationError> {
    let mut parameters = Vec::with_capacity(annotations.len());
    let mut names = HashSet::new();
    let mut flags = HashSet::new();
    let mut markers = HashSet::new();

    for annotation in annotations {
        let name = match &annotation.name {
            Some(name) => name.clone(),
            None => derive_name(&annotation)?,
        };
        if !names.insert(name.clone()) {
            return Err(DeclarationError::DuplicateParameterName { name });
        }

        // Dos parámetros no pueden sustituir el mismo texto.
        let substitutes_marker = !matches!(annotation.kind, ParamKind::OptionAliasAppend { .. });
        if substitutes_marker
            && !annotation.marker.is_empty()
            && !markers.insert(annotation.marker.clone())
        {
            return Err(DeclarationError::MalformedAnnotation {
                fragment: annotation.fragment,
                reason: format!("el marcador '{}' ya está declarado", annotation.marker),
            });
        }

        let default = match &annotation.default {
            Some(raw) => Some(values::convert(annotation.type_kind, raw).map_err(|source| {
                DeclarationError::InvalidDefault {
                    name: name.clone(),
                    source,
                }
            })?),
            None => None,
        };

        let kind = annotation.kind;
        // Las opciones booleanas sin valor por defecto son `false`.
        let default = match (&kind, default) {
            (ParamKind::OptionReplace { .. } | ParamKind::OptionAliasAppend { .. }, None)
                if annotation.type_kind == TypeKind::Bool =>
            {
                Some(Value::Bool(false))
            }
            (_, default) => default,
        };

        if let ParamKind::OptionReplace { flags: f } | ParamKind::OptionAliasAppend { flags: f } = &kind {
            for flag in f.iter() {
                if !flags.insert(flag.to_string()) {
                    return Err(DeclarationError::DuplicateParameterName {
                        name: flag.to_string(),
                    });
                }
            }
        }

        parameters.push(Parameter {
            name,
            marker: annotation.marker,
            type_kind: annotation.type_kind,
            default,
            help: annotation.help,
            kind,
        });
    }

    let ordered = reorder(parameters);
    log::debug!(
        "Orden final de parámetros: {:?}",
        ordered
            .iter()
            .map(|p| format!("{} ({})", p.name, p.kind.label()))
            .collect::<Vec<_>>()
    );
    Ok(ordered)
}

/// Partición estable: obligatorios, opcionales y por último el variádico.
pub fn reorder(parameters: Vec<Parameter>) -> Vec<Parameter> {
    let (varargs, rest): (Vec<_>, Vec<_>) = parameters.into_iter().partition(|p| p.is_varargs());
    let (required, optional): (Vec<_>, Vec<_>) = rest.into_iter().partition(|p| p.is_required());
    required.into_iter().chain(optional).chain(varargs).collect()
}

fn derive_name(annotation: &Annotation) -> Result<String, DeclarationError> {
    let source = match &annotation.kind {
        ParamKind::OptionReplace { flags } | ParamKind::OptionAliasAppend { flags } => {
            flags.bare_name()
        }
        ParamKind::Varargs if annotation.marker.is_empty() => DEFAULT_VARARGS_NAME,
        ParamKind::PositionalReplace | ParamKind::Varargs => annotation.marker.as_str(),
    };

    sanitize_name(source).ok_or_else(|| DeclarationError::MalformedAnnotation {
        fragment: annotation.fragment.clone(),
        reason: format!("no se puede derivar un nombre de '{}'; indíquelo explícitamente", source),
    })
}

/// Pasa a minúsculas, cambia lo que no sea alfanumérico por `_`, colapsa los `_`
/// repetidos y antepone `num_` si empieza por un dígito.
pub fn sanitize_name(raw: &str) -> Option<String> {
    let mut sanitized = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            sanitized.push(c.to_ascii_lowercase());
        } else if !sanitized.ends_with('_') {
            sanitized.push('_');
        }
    }
    let sanitized = sanitized.trim_matches('_');

    if sanitized.is_empty() {
        return None;
    }
    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        return Some(format!("num_{}", sanitized));
    }
    Some(sanitized.to_string())
}
