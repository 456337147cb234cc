// src/core/binder.rs

use super::engine::InvocationError;
use crate::models::{CommandSpec, ParamKind, Parameter, TypeKind};
use std::collections::BTreeMap;

/// Valores en texto tal como llegan de la línea de comandos, aún sin convertir.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArguments {
    pub values: BTreeMap<String, String>,
    pub leftovers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Arguments(RawArguments),
    /// El usuario pidió la ayuda de la extensión (`-h`/`--help`).
    Help,
}

/// Reparte los argumentos de una invocación entre los parámetros declarados.
///
/// Los posicionales se asignan en orden; las opciones admiten `--flag valor`,
/// `--flag=valor` y `-f valor`, y las booleanas no consumen valor. Lo que no se
/// reconoce va a la lista de sobrantes si hay un variádico, y si no es un error.
pub fn bind(spec: &CommandSpec, args: &[String]) -> Result<Binding, InvocationError> {
    let positionals: Vec<&Parameter> = spec
        .parameters
        .iter()
        .filter(|p| p.kind == ParamKind::PositionalReplace)
        .collect();
    let collects_leftovers = spec.varargs().is_some();

    let mut raw = RawArguments::default();
    let mut next_positional = 0;
    let mut options_done = false;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        i += 1;

        if !options_done && arg == "--" {
            options_done = true;
            continue;
        }

        if !options_done && arg.len() > 1 && arg.starts_with('-') {
            let (flag, inline_value) = match arg.split_once('=') {
                Some((flag, value)) if arg.starts_with("--") => (flag, Some(value)),
                _ => (arg.as_str(), None),
            };

            // Las opciones declaradas van primero: `-1/--one` es una flag, no un número.
            if let Some(param) = find_option(spec, flag) {
                let value = match (param.type_kind, inline_value) {
                    (_, Some(value)) => value.to_string(),
                    (TypeKind::Bool, None) => "true".to_string(),
                    (_, None) => {
                        let value = args.get(i).ok_or_else(|| InvocationError::MissingOptionValue {
                            flag: flag.to_string(),
                        })?;
                        i += 1;
                        value.clone()
                    }
                };
                raw.values.insert(param.name.clone(), value);
                continue;
            }

            if !is_negative_number(arg) {
                if flag == "-h" || flag == "--help" {
                    return Ok(Binding::Help);
                }
                if collects_leftovers {
                    raw.leftovers.push(arg.clone());
                    continue;
                }
                return Err(InvocationError::UnknownOption {
                    flag: flag.to_string(),
                });
            }
        }

        if let Some(param) = positionals.get(next_positional) {
            raw.values.insert(param.name.clone(), arg.clone());
            next_positional += 1;
        } else if collects_leftovers {
            raw.leftovers.push(arg.clone());
        } else {
            return Err(InvocationError::UnexpectedArgument { value: arg.clone() });
        }
    }

    log::debug!("Argumentos enlazados para '{}': {:?}", spec.command_name, raw);
    Ok(Binding::Arguments(raw))
}

/// `-5`, `-0.25` o `-.5`. `-inf` y `-nan` no cuentan: se tratan como flags.
fn is_negative_number(arg: &str) -> bool {
    arg.strip_prefix('-')
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit() || c == '.'))
        && arg.parse::<f64>().is_ok()
}

fn find_option<'a>(spec: &'a CommandSpec, flag: &str) -> Option<&'a Parameter> {
    spec.parameters
        .iter()
        .find(|p| p.flags().is_some_and(|f| f.matches(flag)))
}
