// src/core/tokenizer.rs

use super::parser::DeclarationError;

/// Una palabra de la declaración, con su anotación separada si la tiene.
///
/// `f523e75ca4ef[container_id:str#id del contenedor]` produce
/// `marker = "f523e75ca4ef"` y `annotation = Some("container_id:str#id del contenedor")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub marker: String,
    pub annotation: Option<String>,
    /// La palabra tal cual aparece, para los mensajes de error.
    pub raw: String,
}

impl Token {
    pub fn is_bare(&self) -> bool {
        self.annotation.is_none()
    }
}

/// Estado del token que se está leyendo.
#[derive(Default)]
struct Pending {
    raw: String,
    marker: String,
    body: Option<String>,
    open: bool,
    quote: Option<char>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn finish(self) -> Result<Token, DeclarationError> {
        if self.quote.is_some() {
            return Err(malformed(&self.raw, "comillas sin cerrar en el valor por defecto"));
        }
        if self.open {
            return Err(malformed(&self.raw, "falta el ']' de cierre"));
        }
        Ok(Token {
            marker: self.marker,
            annotation: self.body,
            raw: self.raw,
        })
    }
}

fn malformed(fragment: &str, reason: &str) -> DeclarationError {
    DeclarationError::MalformedAnnotation {
        fragment: fragment.to_string(),
        reason: reason.to_string(),
    }
}

/// Divide una declaración en palabras, respetando los espacios dentro de `[...]`.
///
/// Los corchetes deben estar balanceados, sin anidar, y cada palabra admite a lo
/// sumo una anotación situada al final.
pub fn tokenize(declaration: &str) -> Result<Vec<Token>, DeclarationError> {
    let mut tokens = Vec::new();
    let mut current = Pending::default();

    for c in declaration.chars() {
        if let Some(q) = current.quote {
            current.raw.push(c);
            if let Some(body) = current.body.as_mut() {
                body.push(c);
            }
            if c == q {
                current.quote = None;
            }
            continue;
        }

        if current.open {
            current.raw.push(c);
            match c {
                ']' => current.open = false,
                '[' => return Err(malformed(&current.raw, "corchetes anidados")),
                '"' | '\'' => {
                    let body = current.body.get_or_insert_with(String::new);
                    // Solo un valor por defecto puede ir entre comillas.
                    if body.ends_with('=') {
                        current.quote = Some(c);
                    }
                    body.push(c);
                }
                _ => current.body.get_or_insert_with(String::new).push(c),
            }
            continue;
        }

        match c {
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current).finish()?);
                }
            }
            '[' => {
                current.raw.push(c);
                if current.body.is_some() {
                    return Err(malformed(&current.raw, "más de una anotación en la misma palabra"));
                }
                current.open = true;
                current.body = Some(String::new());
            }
            ']' => {
                current.raw.push(c);
                return Err(malformed(&current.raw, "']' sin '[' de apertura"));
            }
            _ => {
                current.raw.push(c);
                if current.body.is_some() {
                    return Err(malformed(&current.raw, "texto tras el cierre de la anotación"));
                }
                current.marker.push(c);
            }
        }
    }

    if !current.is_empty() {
        tokens.push(current.finish()?);
    }

    log::debug!("Tokens de la declaración: {:?}", tokens);
    Ok(tokens)
}
