// src/core/values.rs

use crate::models::{TypeKind, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("No se pudo convertir '{value}' al tipo {kind}.")]
pub struct TypeConversionError {
    pub value: String,
    pub kind: TypeKind,
}

/// Convierte el texto recibido al tipo declarado. Nunca hace coerciones silenciosas.
pub fn convert(kind: TypeKind, raw: &str) -> Result<Value, TypeConversionError> {
    let fail = || TypeConversionError {
        value: raw.to_string(),
        kind,
    };

    match kind {
        TypeKind::Str => Ok(Value::Str(raw.to_string())),
        TypeKind::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| fail()),
        TypeKind::Float => raw.parse::<f64>().map(Value::Float).map_err(|_| fail()),
        TypeKind::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(fail),
    }
}

/// `true|yes|1` y `false|no|0`, sin distinguir mayúsculas.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
