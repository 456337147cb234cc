// src/constants.rs

/// El nombre del directorio de configuración de la aplicación (dentro de ~/.config/).
pub const APP_DIR: &str = "just-ext";

/// Variable de entorno que, si está definida, sustituye al directorio de configuración.
pub const HOME_ENV_VAR: &str = "JUST_EXT_HOME";

/// El nombre del archivo donde se guardan todas las extensiones compiladas.
pub const EXTENSIONS_FILENAME: &str = "extensions.toml";

/// El nombre del archivo de ajustes de la aplicación.
pub const SETTINGS_FILENAME: &str = "config.toml";

/// La palabra con la que el usuario invoca la herramienta. Se ignora al inicio de una declaración.
pub const ROOT_COMMAND: &str = "just";

/// Acciones integradas que ninguna extensión puede ocupar.
pub const RESERVED_ACTIONS: &[&str] = &["ext"];
