// src/core/parser.rs

use super::tokenizer::{self, Token};
use crate::constants::ROOT_COMMAND;
use crate::core::values::TypeConversionError;
use crate::models::{OptionFlags, ParamKind, TypeKind};
use thiserror::Error;

/// Errores detectados al crear una extensión. Todos abortan la operación
/// antes de guardar nada.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeclarationError {
    #[error("Anotación mal formada en '{fragment}': {reason}.")]
    MalformedAnnotation { fragment: String, reason: String },
    #[error("Tipo '{type_name}' desconocido en '{fragment}'. Tipos válidos: str, int, float, bool.")]
    InvalidType { type_name: String, fragment: String },
    #[error("Solo se admite un parámetro variádico (...) por declaración; '{fragment}' sería el segundo.")]
    DuplicateVarargs { fragment: String },
    #[error("El nombre de parámetro '{name}' está repetido en la declaración.")]
    DuplicateParameterName { name: String },
    #[error("El marcador '{marker}' del parámetro '{name}' no aparece en el comando '{template}'.")]
    UnresolvedMarker {
        marker: String,
        name: String,
        template: String,
    },
    #[error("Valor por defecto inválido para '{name}': {source}")]
    InvalidDefault {
        name: String,
        #[source]
        source: TypeConversionError,
    },
}

fn malformed(fragment: &str, reason: &str) -> DeclarationError {
    DeclarationError::MalformedAnnotation {
        fragment: fragment.to_string(),
        reason: reason.to_string(),
    }
}

/// Una anotación leída de la declaración, antes de asignarle nombre y ordenarla.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub marker: String,
    pub name: Option<String>,
    pub type_kind: TypeKind,
    /// Texto crudo del valor por defecto, ya sin comillas.
    pub default: Option<String>,
    pub help: Option<String>,
    pub kind: ParamKind,
    /// La palabra completa de la que procede.
    pub fragment: String,
}

/// Resultado del análisis: la ruta del comando y las anotaciones en orden de aparición.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDeclaration {
    pub command_path: Vec<String>,
    pub annotations: Vec<Annotation>,
}

impl ParsedDeclaration {
    pub fn command_name(&self) -> String {
        self.command_path.join(" ")
    }
}

/// Analiza una declaración completa, p. ej.
/// `just docker ip -f/--format FORMAT[fmt="{{.Id}}"] f523e75ca4ef[container_id#Contenedor]`.
///
/// Las palabras sin anotación del principio forman el nombre del comando (un `just`
/// inicial se ignora). Una flag suelta (`-m/--messages`) convierte la anotación que
/// le sigue en una opción.
pub fn parse_declaration(declaration: &str) -> Result<ParsedDeclaration, DeclarationError> {
    let mut tokens = tokenizer::tokenize(declaration)?;
    if tokens
        .first()
        .is_some_and(|t| t.is_bare() && t.marker == ROOT_COMMAND)
    {
        tokens.remove(0);
    }

    let mut command_path = Vec::new();
    let mut annotations: Vec<Annotation> = Vec::new();
    let mut pending_flags: Option<(OptionFlags, String)> = None;

    for token in tokens {
        if token.is_bare() {
            if token.marker.starts_with('-') {
                if let Some((_, raw)) = pending_flags {
                    return Err(malformed(&raw, "la opción no va seguida de un marcador anotado"));
                }
                let flags = parse_flag_spec(&token.marker)
                    .ok_or_else(|| malformed(&token.raw, "flag inválida"))?;
                pending_flags = Some((flags, token.raw));
            } else if annotations.is_empty() && pending_flags.is_none() {
                validate_command_word(&token)?;
                command_path.push(token.marker);
            } else {
                return Err(malformed(
                    &token.raw,
                    "palabra sin anotación después de los parámetros",
                ));
            }
            continue;
        }

        let annotation = parse_annotated_token(&token, pending_flags.take())?;
        if annotation.kind == ParamKind::Varargs && annotations.iter().any(|a| a.kind == ParamKind::Varargs) {
            return Err(DeclarationError::DuplicateVarargs {
                fragment: token.raw,
            });
        }
        annotations.push(annotation);
    }

    if let Some((_, raw)) = pending_flags {
        return Err(malformed(&raw, "la opción no va seguida de un marcador anotado"));
    }
    if command_path.is_empty() {
        return Err(malformed(declaration.trim(), "falta el nombre del comando"));
    }

    log::debug!(
        "Declaración '{}' analizada: {} anotación(es).",
        command_path.join(" "),
        annotations.len()
    );
    Ok(ParsedDeclaration {
        command_path,
        annotations,
    })
}

fn validate_command_word(token: &Token) -> Result<(), DeclarationError> {
    let valid = token
        .marker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(malformed(
            &token.raw,
            "el nombre del comando solo admite letras, dígitos, '_' y '-'",
        ))
    }
}

/// Clasifica una palabra anotada en una de las variantes de sintaxis.
fn parse_annotated_token(
    token: &Token,
    pending_flags: Option<(OptionFlags, String)>,
) -> Result<Annotation, DeclarationError> {
    let body = token.annotation.as_deref().unwrap_or_default();

    // Variádico: `ARGS[...]` o `[...#ayuda]`.
    if let Some(rest) = body.strip_prefix("...") {
        if pending_flags.is_some() {
            return Err(malformed(&token.raw, "una opción no puede ser variádica"));
        }
        let help = match rest {
            "" => None,
            r if r.starts_with('#') => Some(r[1..].to_string()),
            _ => return Err(malformed(&token.raw, "tras '...' solo puede ir '#ayuda'")),
        };
        return Ok(Annotation {
            marker: token.marker.clone(),
            name: None,
            type_kind: TypeKind::Str,
            default: None,
            help,
            kind: ParamKind::Varargs,
            fragment: token.raw.clone(),
        });
    }

    let parts = split_body(body, &token.raw)?;

    // Alias de opción: el marcador es una flag del comando original.
    if token.marker.starts_with('-') {
        if pending_flags.is_some() {
            return Err(malformed(&token.raw, "una flag no puede ser el marcador de otra opción"));
        }
        let original = parse_flag_spec(&token.marker)
            .ok_or_else(|| malformed(&token.raw, "flag original inválida"))?;

        let (name, flags) = if parts.head.starts_with('-') {
            let flags = parse_flag_spec(&parts.head)
                .ok_or_else(|| malformed(&token.raw, "flag de usuario inválida"))?;
            (None, flags)
        } else if parts.head.is_empty() {
            (None, original.clone())
        } else {
            validate_name(&parts.head, &token.raw)?;
            (Some(parts.head.clone()), OptionFlags::long(&parts.head))
        };

        return Ok(Annotation {
            marker: original.primary().to_string(),
            name,
            type_kind: parts.type_kind,
            default: parts.default,
            help: parts.help,
            kind: ParamKind::OptionAliasAppend { flags },
            fragment: token.raw.clone(),
        });
    }

    if token.marker.is_empty() {
        return Err(malformed(&token.raw, "falta el marcador a la izquierda de '['"));
    }

    let name = if parts.head.is_empty() {
        None
    } else {
        validate_name(&parts.head, &token.raw)?;
        Some(parts.head.clone())
    };

    let kind = match pending_flags {
        Some((flags, _)) => ParamKind::OptionReplace { flags },
        None => ParamKind::PositionalReplace,
    };

    Ok(Annotation {
        marker: token.marker.clone(),
        name,
        type_kind: parts.type_kind,
        default: parts.default,
        help: parts.help,
        kind,
        fragment: token.raw.clone(),
    })
}

fn validate_name(name: &str, fragment: &str) -> Result<(), DeclarationError> {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(malformed(
            fragment,
            &format!("'{}' no es un nombre válido (solo letras, dígitos y '_')", name),
        ))
    }
}

/// Los campos de `cabeza:tipo=defecto#ayuda`.
#[derive(Debug, Default, PartialEq)]
struct BodyParts {
    head: String,
    type_kind: TypeKind,
    default: Option<String>,
    help: Option<String>,
}

fn split_body(body: &str, fragment: &str) -> Result<BodyParts, DeclarationError> {
    let mut parts = BodyParts::default();

    let head_end = body.find([':', '=', '#']).unwrap_or(body.len());
    parts.head = body[..head_end].to_string();
    let mut rest = &body[head_end..];

    if let Some(after) = rest.strip_prefix(':') {
        let end = after.find(['=', '#']).unwrap_or(after.len());
        let type_name = &after[..end];
        if type_name.is_empty() {
            return Err(malformed(fragment, "':' sin tipo"));
        }
        parts.type_kind =
            TypeKind::from_name(type_name).ok_or_else(|| DeclarationError::InvalidType {
                type_name: type_name.to_string(),
                fragment: fragment.to_string(),
            })?;
        rest = &after[end..];
    }

    if let Some(after) = rest.strip_prefix('=') {
        let (value, remaining) = split_default(after, fragment)?;
        parts.default = Some(value);
        rest = remaining;
    }

    if let Some(help) = rest.strip_prefix('#') {
        if help.contains('=') {
            return Err(malformed(fragment, "'=' después de '#'"));
        }
        parts.help = Some(help.to_string());
        rest = "";
    }

    if !rest.is_empty() {
        return Err(malformed(fragment, &format!("texto inesperado '{}'", rest)));
    }
    Ok(parts)
}

/// Separa el valor por defecto del resto del cuerpo. Devuelve el valor ya sin comillas.
fn split_default<'a>(after: &'a str, fragment: &str) -> Result<(String, &'a str), DeclarationError> {
    let mut chars = after.chars();
    match chars.next() {
        Some(q @ ('"' | '\'')) => {
            let inner = &after[1..];
            let close = inner
                .find(q)
                .ok_or_else(|| malformed(fragment, "comillas sin cerrar en el valor por defecto"))?;
            let remaining = &inner[close + 1..];
            if !remaining.is_empty() && !remaining.starts_with('#') {
                return Err(malformed(fragment, "texto tras el valor entrecomillado"));
            }
            Ok((inner[..close].to_string(), remaining))
        }
        _ => {
            let end = after.find('#').unwrap_or(after.len());
            let value = &after[..end];
            if value.chars().any(char::is_whitespace) {
                return Err(malformed(
                    fragment,
                    "un valor por defecto con espacios debe ir entre comillas",
                ));
            }
            Ok((value.to_string(), &after[end..]))
        }
    }
}

/// Interpreta `-m`, `--messages` o `-m/--messages`.
pub fn parse_flag_spec(spec: &str) -> Option<OptionFlags> {
    let mut flags = OptionFlags::default();
    for part in spec.split('/') {
        if let Some(long) = part.strip_prefix("--") {
            if flags.long.is_some() || !is_flag_name(long) {
                return None;
            }
            flags.long = Some(part.to_string());
        } else if let Some(short) = part.strip_prefix('-') {
            if flags.short.is_some() || !is_flag_name(short) {
                return None;
            }
            flags.short = Some(part.to_string());
        } else {
            return None;
        }
    }
    Some(flags)
}

fn is_flag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(declaration: &str) -> Annotation {
        let mut parsed = parse_declaration(declaration).unwrap();
        assert_eq!(parsed.annotations.len(), 1, "{}", declaration);
        parsed.annotations.remove(0)
    }

    fn is_malformed(declaration: &str) -> bool {
        matches!(
            parse_declaration(declaration),
            Err(DeclarationError::MalformedAnnotation { .. })
        )
    }

    #[test]
    fn static_alias_has_no_annotations() {
        let parsed = parse_declaration("just test1").unwrap();
        assert_eq!(parsed.command_path, vec!["test1"]);
        assert!(parsed.annotations.is_empty());
    }

    #[test]
    fn leading_just_is_optional() {
        let parsed = parse_declaration("docker ip f523e75ca4ef[container_id]").unwrap();
        assert_eq!(parsed.command_name(), "docker ip");
    }

    #[test]
    fn positional_with_full_annotation() {
        let a = single(r##"just test2 MESSAGE[msg:str="Hello World"#Message to display]"##);
        assert_eq!(a.marker, "MESSAGE");
        assert_eq!(a.name.as_deref(), Some("msg"));
        assert_eq!(a.type_kind, TypeKind::Str);
        assert_eq!(a.default.as_deref(), Some("Hello World"));
        assert_eq!(a.help.as_deref(), Some("Message to display"));
        assert_eq!(a.kind, ParamKind::PositionalReplace);
    }

    #[test]
    fn all_fields_are_optional() {
        let a = single("just t MARK[]");
        assert_eq!(a.name, None);
        assert_eq!(a.type_kind, TypeKind::Str);
        assert_eq!(a.default, None);
        assert_eq!(a.help, None);

        let a = single("just t MARK[:int]");
        assert_eq!(a.type_kind, TypeKind::Int);

        let a = single("just t MARK[#solo ayuda]");
        assert_eq!(a.help.as_deref(), Some("solo ayuda"));
    }

    #[test]
    fn unquoted_and_single_quoted_defaults() {
        assert_eq!(
            single("just dnslog new --domain log.dnslog.myfw.us[domain:str=log.dnslog.myfw.us#subdomain for DNS logging]")
                .default
                .as_deref(),
            Some("log.dnslog.myfw.us")
        );
        assert_eq!(
            single("just t X[x='  dos espacios '#h]").default.as_deref(),
            Some("  dos espacios ")
        );
    }

    #[test]
    fn option_replace_takes_the_preceding_flag_pair() {
        let parsed =
            parse_declaration("just test3 -m/--messages MESSAGE[msg] TEXT[text=Messages:]").unwrap();
        assert_eq!(parsed.annotations.len(), 2);
        assert_eq!(
            parsed.annotations[0].kind,
            ParamKind::OptionReplace {
                flags: OptionFlags {
                    short: Some("-m".into()),
                    long: Some("--messages".into()),
                }
            }
        );
        assert_eq!(parsed.annotations[1].kind, ParamKind::PositionalReplace);
        assert_eq!(parsed.annotations[1].default.as_deref(), Some("Messages:"));
    }

    #[test]
    fn a_single_bare_flag_also_makes_an_option() {
        let a = single("just docker ipv4 --container f523e75ca4ef[container_id:str#docker container id or name]");
        assert_eq!(a.marker, "f523e75ca4ef");
        assert_eq!(
            a.kind,
            ParamKind::OptionReplace {
                flags: OptionFlags::long("container")
            }
        );
    }

    #[test]
    fn option_alias_append_with_user_facing_flags() {
        let a = single(r##"just test6 --text[-m/--messages:str="Hello World"#Text to display]"##);
        assert_eq!(a.marker, "--text");
        assert_eq!(a.name, None);
        assert_eq!(
            a.kind,
            ParamKind::OptionAliasAppend {
                flags: OptionFlags {
                    short: Some("-m".into()),
                    long: Some("--messages".into()),
                }
            }
        );
        assert_eq!(a.default.as_deref(), Some("Hello World"));
    }

    #[test]
    fn flag_marker_with_a_plain_name() {
        let a = single("just util process -v[verbose:bool#Enable verbose output]");
        assert_eq!(a.marker, "-v");
        assert_eq!(a.name.as_deref(), Some("verbose"));
        assert_eq!(a.type_kind, TypeKind::Bool);
        assert_eq!(
            a.kind,
            ParamKind::OptionAliasAppend {
                flags: OptionFlags::long("verbose")
            }
        );
    }

    #[test]
    fn varargs_with_and_without_marker() {
        let a = single("just test5 ARGS[...#Message to display]");
        assert_eq!(a.kind, ParamKind::Varargs);
        assert_eq!(a.marker, "ARGS");
        assert_eq!(a.help.as_deref(), Some("Message to display"));

        let a = single("just t [...]");
        assert_eq!(a.kind, ParamKind::Varargs);
        assert_eq!(a.marker, "");
    }

    #[test]
    fn second_varargs_is_rejected() {
        assert!(matches!(
            parse_declaration("just t A[...] B[...]"),
            Err(DeclarationError::DuplicateVarargs { fragment }) if fragment == "B[...]"
        ));
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(matches!(
            parse_declaration("just t X[x:list]"),
            Err(DeclarationError::InvalidType { type_name, .. }) if type_name == "list"
        ));
    }

    #[test]
    fn malformed_bodies() {
        assert!(is_malformed("just t MESSAGE[msg:str=Hello"));
        assert!(is_malformed("just t X[x:=3]"));
        assert!(is_malformed("just t X[x:#ayuda]"));
        assert!(is_malformed("just t X[x#ayuda=3]"));
        assert!(is_malformed("just t X[x=dos palabras]"));
        assert!(is_malformed(r#"just t X[x="a"b]"#));
        assert!(is_malformed("just t X[nombre-raro]"));
        assert!(is_malformed("just t X[...extra]"));
        assert!(is_malformed("just t [x]"));
    }

    #[test]
    fn structural_errors() {
        // Sin nombre de comando.
        assert!(is_malformed("just MARK[x]"));
        assert!(is_malformed(""));
        // Opción sin marcador.
        assert!(is_malformed("just t -m/--messages"));
        assert!(is_malformed("just t -m -n X[x]"));
        // Una opción no puede ser variádica.
        assert!(is_malformed("just t -a ARGS[...]"));
        // Palabra suelta tras los parámetros.
        assert!(is_malformed("just t X[x] suelta"));
        // Nombre de comando inválido.
        assert!(is_malformed("just do/cker X[x]"));
    }

    #[test]
    fn flag_specs() {
        assert_eq!(
            parse_flag_spec("-x/--long"),
            Some(OptionFlags {
                short: Some("-x".into()),
                long: Some("--long".into()),
            })
        );
        assert_eq!(parse_flag_spec("--dry-run"), Some(OptionFlags::long("dry-run")));
        assert_eq!(parse_flag_spec("-x/-y"), None);
        assert_eq!(parse_flag_spec("---x"), None);
        assert_eq!(parse_flag_spec("x"), None);
        assert_eq!(parse_flag_spec("-"), None);
    }
}
