// src/system/io.rs

use dialoguer::{Confirm, Input, theme::ColorfulTheme};

/// Pide la declaración de una extensión cuando no se pasó con `-d`.
pub fn prompt_declaration(template: &str) -> Result<String, dialoguer::Error> {
    println!("\nComando a envolver:\n  {}", template);
    let declaration = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Declaración de la extensión (ej: just docker ip ID[id#Contenedor])")
        .interact_text()?;
    Ok(declaration.trim().to_string())
}

/// Pregunta antes de una acción destructiva. Por defecto, no.
pub fn confirm(message: &str) -> Result<bool, dialoguer::Error> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .default(false)
        .interact()
}
