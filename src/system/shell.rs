// src/system/shell.rs

use crate::config::Settings;

/// Programa y argumento con los que se lanza una línea de comando.
/// En Windows, `cmd /C`; en el resto, `sh -c`, salvo que `config.toml` diga otra cosa.
pub fn resolve_shell(settings: &Settings) -> (String, String) {
    let (shell, arg) = if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };
    (
        settings.shell.clone().unwrap_or_else(|| shell.to_string()),
        settings.shell_arg.clone().unwrap_or_else(|| arg.to_string()),
    )
}

/// Une palabras sueltas en una línea de shell, citando las que lo necesitan.
pub fn join_words<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| quote_word(w.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Comillas simples POSIX: `it's` pasa a `'it'"'"'s'`.
pub fn quote_word(word: &str) -> String {
    if word.is_empty() {
        return "''".to_string();
    }
    let safe = word
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', r#"'"'"'"#))
}
