// src/core/engine.rs

use super::binder::RawArguments;
use super::compiler;
use super::values::{self, TypeConversionError};
use crate::models::{CommandSpec, InvocationContext, Parameter, SubstitutionOp, Value};
use thiserror::Error;

/// Errores al validar los argumentos de una invocación. El comando no se ejecuta.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvocationError {
    #[error("Argumento '{name}' inválido: {source}")]
    TypeConversion {
        name: String,
        #[source]
        source: TypeConversionError,
    },
    #[error("Falta el argumento obligatorio '{name}'.")]
    MissingArgument { name: String },
    #[error("La opción '{flag}' necesita un valor.")]
    MissingOptionValue { flag: String },
    #[error("Opción desconocida '{flag}'.")]
    UnknownOption { flag: String },
    #[error("Argumento inesperado '{value}'.")]
    UnexpectedArgument { value: String },
}

/// Convierte los valores en texto a sus tipos y comprueba los obligatorios.
pub fn resolve_context(
    spec: &CommandSpec,
    raw: RawArguments,
) -> Result<InvocationContext, InvocationError> {
    let mut context = InvocationContext::default().with_leftovers(raw.leftovers);

    for param in spec.parameters.iter().filter(|p| !p.is_varargs()) {
        match raw.values.get(&param.name) {
            Some(text) => {
                let value = values::convert(param.type_kind, text).map_err(|source| {
                    InvocationError::TypeConversion {
                        name: param.name.clone(),
                        source,
                    }
                })?;
                context = context.with_value(&param.name, value);
            }
            None if param.is_required() => {
                return Err(InvocationError::MissingArgument {
                    name: param.name.clone(),
                });
            }
            None => {}
        }
    }

    Ok(context)
}

/// Aplica el plan de sustitución de una especificación a un contexto concreto.
pub struct Interpolator<'a> {
    spec: &'a CommandSpec,
    context: &'a InvocationContext,
}

impl<'a> Interpolator<'a> {
    pub fn new(spec: &'a CommandSpec, context: &'a InvocationContext) -> Self {
        Self { spec, context }
    }

    /// Devuelve la línea de comando final. No escapa nada: los valores se insertan tal cual.
    pub fn interpolate(&self) -> Result<String, InvocationError> {
        if self.spec.is_static_alias() {
            return Ok(self.spec.template.clone());
        }
        let pass1 = self.interpolate_markers()?;
        let pass2 = self.append_flags(pass1)?;
        Ok(self.append_remaining(pass2))
    }

    /// Reemplazos en la plantilla original, incluido el variádico en línea.
    fn interpolate_markers(&self) -> Result<String, InvocationError> {
        let mut replacements: Vec<(&str, String)> = Vec::new();
        for op in &self.spec.plan {
            match op {
                SubstitutionOp::Replace { marker, param } => {
                    let value = self.value_of(param)?;
                    replacements.push((marker.as_str(), value.to_string()));
                }
                SubstitutionOp::CaptureRemaining {
                    marker: Some(marker),
                    ..
                } => replacements.push((marker.as_str(), self.context.leftovers.join(" "))),
                _ => {}
            }
        }
        Ok(compiler::substitute(&self.spec.template, &replacements))
    }

    fn append_flags(&self, mut command: String) -> Result<String, InvocationError> {
        for op in &self.spec.plan {
            if let SubstitutionOp::AppendFlag { flag, param } = op {
                match self.value_of(param)? {
                    Value::Bool(false) => {}
                    Value::Bool(true) => {
                        command.push(' ');
                        command.push_str(flag);
                    }
                    value => {
                        command.push(' ');
                        command.push_str(flag);
                        command.push(' ');
                        command.push_str(&value.to_string());
                    }
                }
            }
        }
        Ok(command)
    }

    fn append_remaining(&self, mut command: String) -> String {
        let appends = self
            .spec
            .plan
            .iter()
            .any(|op| matches!(op, SubstitutionOp::CaptureRemaining { marker: None, .. }));
        if appends && !self.context.leftovers.is_empty() {
            command.push(' ');
            command.push_str(&self.context.leftovers.join(" "));
        }
        command
    }

    /// El valor recibido o el de por defecto, siempre del tipo declarado.
    fn value_of(&self, name: &str) -> Result<Value, InvocationError> {
        let param = self.parameter(name)?;
        let value = self
            .context
            .values
            .get(name)
            .or(param.default.as_ref())
            .ok_or_else(|| InvocationError::MissingArgument {
                name: name.to_string(),
            })?;

        if value.kind() != param.type_kind {
            return Err(InvocationError::TypeConversion {
                name: name.to_string(),
                source: TypeConversionError {
                    value: value.to_string(),
                    kind: param.type_kind,
                },
            });
        }
        Ok(value.clone())
    }

    fn parameter(&self, name: &str) -> Result<&'a Parameter, InvocationError> {
        self.spec
            .parameter(name)
            .ok_or_else(|| InvocationError::MissingArgument {
                name: name.to_string(),
            })
    }
}

/// Convierte, valida y sustituye: de los argumentos en texto al comando final.
pub fn build_command(spec: &CommandSpec, raw: RawArguments) -> Result<String, InvocationError> {
    let context = resolve_context(spec, raw)?;
    let command = Interpolator::new(spec, &context).interpolate()?;
    log::debug!("Comando final para '{}': {}", spec.command_name, command);
    Ok(command)
}
