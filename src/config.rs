// src/config.rs

use crate::constants::{APP_DIR, EXTENSIONS_FILENAME, HOME_ENV_VAR, SETTINGS_FILENAME};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("No se pudo encontrar el directorio de configuración del sistema.")]
    ConfigDirNotFound,
    #[error("No se pudo crear el directorio de configuración en {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Error de rutas: {0}")]
    Path(#[from] PathError),
    #[error("Error de Ficheros: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error al parsear TOML en '{path}': {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Error al serializar a formato TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Devuelve la ruta al directorio de configuración de la aplicación.
/// Lo crea si no existe. `JUST_EXT_HOME` tiene prioridad sobre el directorio del sistema.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let config_path = match env::var_os(HOME_ENV_VAR) {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => dirs::config_dir()
            .ok_or(PathError::ConfigDirNotFound)?
            .join(APP_DIR),
    };
    log::debug!("Directorio de config: {:?}", config_path);

    if !config_path.exists() {
        fs::create_dir_all(&config_path).map_err(|source| PathError::CreateDir {
            path: config_path.clone(),
            source,
        })?;
    }
    Ok(config_path)
}

/// Devuelve la ruta al archivo extensions.toml.
pub fn get_extensions_path() -> Result<PathBuf, PathError> {
    get_config_dir().map(|dir| dir.join(EXTENSIONS_FILENAME))
}

/// Devuelve la ruta al archivo config.toml.
pub fn get_settings_path() -> Result<PathBuf, PathError> {
    get_config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}

// --- AJUSTES (`config.toml`) ---

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Programa con el que se ejecutan los comandos. Por defecto `sh` (`cmd` en Windows).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    /// Argumento que precede al comando. Por defecto `-c` (`/C` en Windows).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell_arg: Option<String>,
    /// Mostrar `> comando` antes de ejecutarlo.
    pub echo_commands: bool,
    /// Pedir confirmación antes de borrar una extensión.
    pub confirm_remove: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shell: None,
            shell_arg: None,
            echo_commands: true,
            confirm_remove: true,
        }
    }
}

/// Carga los ajustes. Si el archivo no existe, devuelve los valores por defecto.
pub fn load_settings() -> Result<Settings, SettingsError> {
    load_settings_from(&get_settings_path()?)
}

pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        log::debug!("No existe {:?}; se usan los ajustes por defecto.", path);
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| SettingsError::TomlParse {
        path: path.display().to_string(),
        source,
    })
}

/// Escribe los ajustes por defecto si el archivo aún no existe. Devuelve su ruta.
pub fn write_default_settings() -> Result<PathBuf, SettingsError> {
    let path = get_settings_path()?;
    if path.exists() {
        log::warn!("{:?} ya existe; no se sobrescribe.", path);
        return Ok(path);
    }
    let toml_string = toml::to_string_pretty(&Settings::default())?;
    fs::write(&path, toml_string)?;
    log::info!("Ajustes por defecto escritos en {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.echo_commands);
    }

    #[test]
    fn partial_files_keep_the_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "shell = \"bash\"\necho_commands = false\n").unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.shell.as_deref(), Some("bash"));
        assert!(!settings.echo_commands);
        assert!(settings.confirm_remove);
    }

    #[test]
    fn broken_files_report_their_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "echo_commands = \"quizá\"").unwrap();
        match load_settings_from(&path).unwrap_err() {
            SettingsError::TomlParse { path: p, .. } => assert!(p.ends_with("config.toml")),
            other => panic!("error inesperado: {:?}", other),
        }
    }
}
