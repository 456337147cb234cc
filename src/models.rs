// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// --- TIPOS Y VALORES DE LOS PARÁMETROS ---

/// Tipo declarado de un parámetro (`:str`, `:int`, `:float`, `:bool`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Str,
    Int,
    Float,
    Bool,
}

impl TypeKind {
    /// Traduce el nombre usado en la anotación. Devuelve `None` si no se reconoce.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "str" => Some(TypeKind::Str),
            "int" => Some(TypeKind::Int),
            "float" => Some(TypeKind::Float),
            "bool" => Some(TypeKind::Bool),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Str => "str",
            TypeKind::Int => "int",
            TypeKind::Float => "float",
            TypeKind::Bool => "bool",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Un valor ya convertido a su tipo declarado.
/// Usa `untagged` para que el TOML guarde el valor nativo (`3`, `true`, `"hola"`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> TypeKind {
        match self {
            Value::Bool(_) => TypeKind::Bool,
            Value::Int(_) => TypeKind::Int,
            Value::Float(_) => TypeKind::Float,
            Value::Str(_) => TypeKind::Str,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            // `2.0` se muestra como `2.0`, no como `2`.
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

// --- MODELOS DE PARÁMETROS ---

/// Par de flags con las que el usuario final pasa una opción (`-m/--messages`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
}

impl OptionFlags {
    pub fn long(name: &str) -> Self {
        Self {
            short: None,
            long: Some(format!("--{}", name)),
        }
    }

    /// Indica si `flag` (con sus guiones) corresponde a esta opción.
    pub fn matches(&self, flag: &str) -> bool {
        self.short.as_deref() == Some(flag) || self.long.as_deref() == Some(flag)
    }

    /// La flag que se muestra y se añade al comando: la larga si existe.
    pub fn primary(&self) -> &str {
        self.long
            .as_deref()
            .or(self.short.as_deref())
            .unwrap_or_default()
    }

    /// Nombre sin guiones, usado para derivar el nombre de la variable.
    pub fn bare_name(&self) -> &str {
        self.primary().trim_start_matches('-')
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.short.as_deref().into_iter().chain(self.long.as_deref())
    }
}

impl fmt::Display for OptionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.short, &self.long) {
            (Some(s), Some(l)) => write!(f, "{}/{}", s, l),
            (Some(s), None) => f.write_str(s),
            (None, Some(l)) => f.write_str(l),
            (None, None) => Ok(()),
        }
    }
}

/// Las variantes de sintaxis de una anotación. Cada una tiene exactamente una
/// operación de sustitución asociada en el plan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum ParamKind {
    /// `MARCADOR[nombre]`: argumento posicional que reemplaza el marcador.
    PositionalReplace,
    /// `-m/--messages MARCADOR[nombre]`: opción cuyo valor reemplaza el marcador.
    OptionReplace { flags: OptionFlags },
    /// `--original[-u/--usuario]`: opción que añade `--original valor` al final.
    OptionAliasAppend { flags: OptionFlags },
    /// `ARGS[...]`: captura todo lo que no se reconoce.
    Varargs,
}

impl ParamKind {
    pub fn label(&self) -> &'static str {
        match self {
            ParamKind::PositionalReplace => "positional_replace",
            ParamKind::OptionReplace { .. } => "option_replace",
            ParamKind::OptionAliasAppend { .. } => "option_alias_append",
            ParamKind::Varargs => "varargs",
        }
    }
}

/// Un parámetro declarado con `[nombre:tipo=defecto#ayuda]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Texto literal a sustituir o, para `OptionAliasAppend`, la flag original a añadir.
    pub marker: String,
    #[serde(rename = "type", default)]
    pub type_kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    pub kind: ParamKind,
}

impl Parameter {
    /// Un parámetro es obligatorio si no tiene valor por defecto. Los variádicos nunca lo son.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.is_varargs()
    }

    pub fn is_varargs(&self) -> bool {
        matches!(self.kind, ParamKind::Varargs)
    }

    /// Flags de la superficie CLI, si el parámetro es una opción.
    pub fn flags(&self) -> Option<&OptionFlags> {
        match &self.kind {
            ParamKind::OptionReplace { flags } | ParamKind::OptionAliasAppend { flags } => {
                Some(flags)
            }
            _ => None,
        }
    }
}

// --- ESPECIFICACIÓN COMPILADA ---

/// Una operación del plan de sustitución, en el orden en que se aplica.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SubstitutionOp {
    /// Reemplaza cada aparición de `marker` en la plantilla original por el valor.
    Replace { marker: String, param: String },
    /// Añade ` flag valor` al final (solo ` flag` si el valor es un booleano verdadero).
    AppendFlag { flag: String, param: String },
    /// Vuelca los argumentos sobrantes en el marcador o, si no hay, al final.
    CaptureRemaining {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        marker: Option<String>,
        param: String,
    },
}

/// El resultado inmutable de compilar una declaración.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommandSpec {
    /// Nombre jerárquico, palabras separadas por un espacio (`docker ip`).
    pub command_name: String,
    /// El comando de shell original, con los marcadores intactos.
    pub template: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub plan: Vec<SubstitutionOp>,
}

impl CommandSpec {
    pub fn path(&self) -> Vec<&str> {
        self.command_name.split_whitespace().collect()
    }

    /// Un alias estático no declara ningún parámetro: se ejecuta la plantilla tal cual.
    pub fn is_static_alias(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn varargs(&self) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.is_varargs())
    }
}

// --- MODELOS EN TIEMPO DE INVOCACIÓN ---

/// Valores tipados de una única ejecución, más los argumentos sobrantes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationContext {
    pub values: BTreeMap<String, Value>,
    pub leftovers: Vec<String>,
}

impl InvocationContext {
    pub fn with_value(mut self, name: &str, value: Value) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn with_leftovers<I, S>(mut self, leftovers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leftovers.extend(leftovers.into_iter().map(Into::into));
        self
    }
}

// --- MODELO DEL ALMACÉN DE EXTENSIONES (`extensions.toml`) ---

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ExtensionIndex {
    #[serde(default)]
    pub extensions: BTreeMap<String, CommandSpec>,
}
