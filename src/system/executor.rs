// src/system/executor.rs

use super::shell;
use crate::config::Settings;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("El comando '{0}' no se pudo ejecutar: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("El comando '{0}' finalizó con un código de error: {1:?}")]
    NonZeroExitStatus(String, Option<i32>),
}

/// Ejecuta la línea de comando final en la shell configurada, en el directorio actual.
/// La salida del proceso hijo va directamente a la terminal.
pub fn execute_command(command_line: &str, settings: &Settings) -> Result<(), ExecutionError> {
    let (shell, arg) = shell::resolve_shell(settings);
    log::info!("Ejecutando comando: '{}' con {} {}", command_line, shell, arg);

    let status = StdCommand::new(&shell)
        .arg(&arg)
        .arg(command_line)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| ExecutionError::CommandFailed(command_line.to_string(), e))?;

    if !status.success() {
        log::warn!("'{}' terminó con {:?}", command_line, status.code());
        return Err(ExecutionError::NonZeroExitStatus(
            command_line.to_string(),
            status.code(),
        ));
    }

    Ok(())
}
