// src/core/usage.rs

use crate::constants::ROOT_COMMAND;
use crate::models::{CommandSpec, ParamKind, Parameter, SubstitutionOp, TypeKind};

/// Texto de ayuda de una extensión: sinopsis, parámetros y plan de sustitución.
pub fn render_usage(spec: &CommandSpec) -> String {
    let mut lines = vec![format!("Uso: {}", synopsis(spec)), String::new()];
    lines.push("Comando:".to_string());
    lines.push(format!("  {}", spec.template));

    let (options, positionals): (Vec<&Parameter>, Vec<&Parameter>) =
        spec.parameters.iter().partition(|p| p.flags().is_some());

    if !positionals.is_empty() {
        lines.push(String::new());
        lines.push("Argumentos:".to_string());
        lines.extend(describe_rows(positionals.iter().map(|p| (argument_label(p), *p))));
    }
    if !options.is_empty() {
        lines.push(String::new());
        lines.push("Opciones:".to_string());
        lines.extend(describe_rows(options.iter().map(|p| (option_label(p), *p))));
    }
    if !spec.plan.is_empty() {
        lines.push(String::new());
        lines.push("Plan:".to_string());
        for (i, op) in spec.plan.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, describe_op(op)));
        }
    }
    lines.join("\n")
}

/// `just docker ip [OPCIONES] <container_id> [args...]`
pub fn synopsis(spec: &CommandSpec) -> String {
    let mut parts = vec![ROOT_COMMAND.to_string(), spec.command_name.clone()];
    if spec.parameters.iter().any(|p| p.flags().is_some()) {
        parts.push("[OPCIONES]".to_string());
    }
    parts.extend(
        spec.parameters
            .iter()
            .filter(|p| p.flags().is_none())
            .map(argument_label),
    );
    parts.join(" ")
}

fn argument_label(param: &Parameter) -> String {
    match param.kind {
        ParamKind::Varargs => format!("[{}...]", param.name),
        _ if param.is_required() => format!("<{}>", param.name),
        _ => format!("[{}]", param.name),
    }
}

fn option_label(param: &Parameter) -> String {
    let flags = param.flags().map(ToString::to_string).unwrap_or_default();
    if param.type_kind == TypeKind::Bool {
        flags
    } else {
        format!("{} <{}>", flags, param.name)
    }
}

/// Alinea las columnas: etiqueta, tipo, defecto y ayuda.
fn describe_rows<'p>(rows: impl Iterator<Item = (String, &'p Parameter)>) -> Vec<String> {
    let rows: Vec<(String, &Parameter)> = rows.collect();
    let width = rows.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);

    rows.into_iter()
        .map(|(label, param)| {
            let mut line = format!("  {:<width$}  {:<5}", label, param.type_kind.as_str(), width = width);
            if let Some(default) = &param.default {
                line.push_str(&format!("  (defecto: {})", default));
            }
            if let Some(help) = &param.help {
                line.push_str("  ");
                line.push_str(help);
            }
            line.trim_end().to_string()
        })
        .collect()
}

fn describe_op(op: &SubstitutionOp) -> String {
    match op {
        SubstitutionOp::Replace { marker, param } => format!("reemplazar '{}' por {}", marker, param),
        SubstitutionOp::AppendFlag { flag, param } => format!("añadir '{}' con {}", flag, param),
        SubstitutionOp::CaptureRemaining { marker: Some(marker), param } => {
            format!("volcar {} en '{}'", param, marker)
        }
        SubstitutionOp::CaptureRemaining { marker: None, param } => {
            format!("añadir {} al final", param)
        }
    }
}
