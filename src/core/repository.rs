// src/core/repository.rs

use crate::config::{self, PathError};
use crate::constants::RESERVED_ACTIONS;
use crate::models::{CommandSpec, ExtensionIndex};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
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
    #[error("Error de rutas: {0}")]
    Path(#[from] PathError),
    #[error("La extensión '{name}' ya existe. Usa --force para reemplazarla.")]
    AlreadyExists { name: String },
    #[error("La extensión '{name}' choca con la ya registrada '{existing}'.")]
    PathConflict { name: String, existing: String },
    #[error("'{word}' es una acción integrada y no puede iniciar el nombre de una extensión.")]
    ReservedName { word: String },
    #[error("No existe ninguna extensión llamada '{name}'.")]
    NotFound { name: String },
}

type RepositoryResult<T> = Result<T, RepositoryError>;

/// Dónde viven las especificaciones compiladas. El núcleo no sabe nada de ficheros.
pub trait ExtensionRepository {
    fn load(&self, name: &str) -> RepositoryResult<CommandSpec>;
    fn save(&mut self, spec: CommandSpec, overwrite: bool) -> RepositoryResult<()>;
    fn remove(&mut self, name: &str) -> RepositoryResult<CommandSpec>;
    fn list(&self) -> RepositoryResult<Vec<CommandSpec>>;

    /// Busca la extensión cuyo nombre es el prefijo más largo de `words`.
    /// Devuelve la especificación y las palabras restantes (sus argumentos).
    fn resolve<'w>(&self, words: &'w [String]) -> RepositoryResult<Option<(CommandSpec, &'w [String])>> {
        let specs = self.list()?;
        let best = specs
            .into_iter()
            .filter_map(|spec| {
                let path = spec.path().iter().map(|s| s.to_string()).collect::<Vec<_>>();
                words.starts_with(&path).then_some((path.len(), spec))
            })
            .max_by_key(|(len, _)| *len);
        Ok(best.map(|(len, spec)| (spec, &words[len..])))
    }
}

/// Guarda todas las extensiones en un único `extensions.toml`.
pub struct TomlRepository {
    path: PathBuf,
}

impl TomlRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// El repositorio en el directorio de configuración de la aplicación.
    pub fn open_default() -> RepositoryResult<Self> {
        Ok(Self::new(config::get_extensions_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_index(&self) -> RepositoryResult<ExtensionIndex> {
        if !self.path.exists() {
            return Ok(ExtensionIndex::default());
        }
        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|source| RepositoryError::TomlParse {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn write_index(&self, index: &ExtensionIndex) -> RepositoryResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.exists()
        {
            fs::create_dir_all(dir)?;
        }
        let toml_string = toml::to_string_pretty(index)?;
        fs::write(&self.path, toml_string)?;
        Ok(())
    }
}

impl ExtensionRepository for TomlRepository {
    fn load(&self, name: &str) -> RepositoryResult<CommandSpec> {
        let mut index = self.read_index()?;
        index
            .extensions
            .remove(&normalize(name))
            .ok_or_else(|| RepositoryError::NotFound {
                name: name.to_string(),
            })
    }

    fn save(&mut self, spec: CommandSpec, overwrite: bool) -> RepositoryResult<()> {
        let mut index = self.read_index()?;
        check_new_entry(&index, &spec, overwrite)?;
        log::info!(
            "Guardando la extensión '{}' en {:?}",
            spec.command_name,
            self.path
        );
        index.extensions.insert(spec.command_name.clone(), spec);
        self.write_index(&index)
    }

    fn remove(&mut self, name: &str) -> RepositoryResult<CommandSpec> {
        let mut index = self.read_index()?;
        let removed = index
            .extensions
            .remove(&normalize(name))
            .ok_or_else(|| RepositoryError::NotFound {
                name: name.to_string(),
            })?;
        self.write_index(&index)?;
        log::info!("Extensión '{}' eliminada.", removed.command_name);
        Ok(removed)
    }

    fn list(&self) -> RepositoryResult<Vec<CommandSpec>> {
        Ok(self.read_index()?.extensions.into_values().collect())
    }
}

/// `"docker   ip"` y `"docker ip"` son la misma extensión.
fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Valida que una nueva extensión pueda convivir con las existentes.
fn check_new_entry(index: &ExtensionIndex, spec: &CommandSpec, overwrite: bool) -> RepositoryResult<()> {
    let path = spec.path();
    if let Some(first) = path.first()
        && RESERVED_ACTIONS.contains(first)
    {
        return Err(RepositoryError::ReservedName {
            word: first.to_string(),
        });
    }

    for existing in index.extensions.values() {
        let other = existing.path();
        if other == path {
            if overwrite {
                continue;
            }
            return Err(RepositoryError::AlreadyExists {
                name: spec.command_name.clone(),
            });
        }
        // `docker` y `docker ip` no pueden coexistir: `just docker ip` sería ambiguo.
        if other.starts_with(&path) || path.starts_with(&other) {
            return Err(RepositoryError::PathConflict {
                name: spec.command_name.clone(),
                existing: existing.command_name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compiler::compile_declaration;

    fn repo() -> (tempfile::TempDir, TomlRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = TomlRepository::new(dir.path().join("nested").join("extensions.toml"));
        (dir, repo)
    }

    fn spec(template: &str, declaration: &str) -> CommandSpec {
        compile_declaration(template, declaration).unwrap()
    }

    #[test]
    fn saves_and_loads_specs() {
        let (_dir, mut repo) = repo();
        let original = spec(
            "docker inspect -f '{{range .NetworkSettings.Networks}}{{.IPAddress}}{{end}}' f523e75ca4ef",
            "just docker ip f523e75ca4ef[container_id:str#docker container id or name]",
        );
        repo.save(original.clone(), false).unwrap();

        assert!(repo.path().exists());
        assert_eq!(repo.load("docker ip").unwrap(), original);
        assert_eq!(repo.load("docker  ip").unwrap(), original);
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let (_dir, mut repo) = repo();
        repo.save(spec("echo a", "just e"), false).unwrap();
        assert!(matches!(
            repo.save(spec("echo b", "just e"), false),
            Err(RepositoryError::AlreadyExists { .. })
        ));
        repo.save(spec("echo b", "just e"), true).unwrap();
        assert_eq!(repo.load("e").unwrap().template, "echo b");
    }

    #[test]
    fn prefixes_conflict() {
        let (_dir, mut repo) = repo();
        repo.save(spec("docker ps", "just docker"), false).unwrap();
        assert!(matches!(
            repo.save(spec("docker ps -a", "just docker all"), false),
            Err(RepositoryError::PathConflict { existing, .. }) if existing == "docker"
        ));
    }

    #[test]
    fn reserved_words_are_rejected() {
        let (_dir, mut repo) = repo();
        assert!(matches!(
            repo.save(spec("echo", "just ext foo"), false),
            Err(RepositoryError::ReservedName { word }) if word == "ext"
        ));
    }

    #[test]
    fn remove_deletes_and_reports_unknown_names() {
        let (_dir, mut repo) = repo();
        repo.save(spec("echo a", "just a"), false).unwrap();
        assert_eq!(repo.remove("a").unwrap().command_name, "a");
        assert!(matches!(
            repo.remove("a"),
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(
            repo.load("a"),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn resolve_uses_the_longest_prefix() {
        let (_dir, mut repo) = repo();
        repo.save(spec("docker inspect ID", "just docker ip ID[id]"), false).unwrap();
        repo.save(spec("git status", "just git st"), false).unwrap();

        let words: Vec<String> = ["docker", "ip", "abc"].iter().map(|s| s.to_string()).collect();
        let (found, rest) = repo.resolve(&words).unwrap().unwrap();
        assert_eq!(found.command_name, "docker ip");
        assert_eq!(rest, &["abc".to_string()]);

        let words = vec!["docker".to_string()];
        assert!(repo.resolve(&words).unwrap().is_none());
    }

    #[test]
    fn corrupt_files_report_their_path() {
        let (dir, _) = repo();
        let path = dir.path().join("extensions.toml");
        fs::write(&path, "extensions = 3").unwrap();
        let repo = TomlRepository::new(&path);
        assert!(matches!(repo.list(), Err(RepositoryError::TomlParse { .. })));
    }
}
