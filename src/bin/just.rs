// src/bin/just.rs

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::fs;

use just_ext::cli::Cli;
use just_ext::config;
use just_ext::constants::ROOT_COMMAND;
use just_ext::core::binder::{self, Binding};
use just_ext::core::repository::{ExtensionRepository, TomlRepository};
use just_ext::core::{compiler, engine, graph_display, usage};
use just_ext::system::executor::{self, ExecutionError};
use just_ext::system::{io, shell};

/// El punto de entrada principal de la aplicación.
fn main() {
    // Para ver los logs, ejecuta con `RUST_LOG=debug just ...`
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        // El código de salida del comando envuelto se respeta tal cual.
        if let Some(ExecutionError::NonZeroExitStatus(_, Some(code))) = e.downcast_ref::<ExecutionError>() {
            std::process::exit(*code);
        }
        eprintln!("\nError: {:?}", e);
        std::process::exit(1);
    }
}

/// El despachador principal de la aplicación.
fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    match cli.args.first().map(String::as_str) {
        None => handle_list(),
        Some("ext") => handle_ext(cli.args[1..].to_vec(), cli.dry_run),
        Some(_) => handle_invoke(&cli.args, cli.dry_run),
    }
}

/// `just ext <subacción> ...`
fn handle_ext(args: Vec<String>, dry_run: bool) -> Result<()> {
    let mut args = args.into_iter();
    let sub = args.next();
    let rest: Vec<String> = args.collect();

    match sub.as_deref() {
        None | Some("list") | Some("ls") => handle_list(),
        Some("add") => handle_add(rest, dry_run),
        Some("show") => handle_show(&rest),
        Some("remove") | Some("rm") => handle_remove(rest),
        Some("edit") => handle_edit(),
        Some("config") => handle_config(),
        Some(unknown) => Err(anyhow!(
            "Acción desconocida 'ext {}'. Usa: add, list, show, remove, edit o config.",
            unknown
        )),
    }
}

// --- MANEJADORES DE ACCIONES ---

/// Compila una declaración contra el comando a envolver y la guarda.
fn handle_add(args: Vec<String>, dry_run: bool) -> Result<()> {
    let mut force = false;
    let mut declaration: Option<String> = None;
    let mut words = args.into_iter().peekable();

    // Nuestras opciones solo se reconocen antes del comando: `ext add ls -la` no es ambiguo.
    while let Some(arg) = words.peek().cloned() {
        match arg.as_str() {
            "-f" | "--force" => {
                force = true;
                words.next();
            }
            "-d" | "--declaration" => {
                words.next();
                let value = words
                    .next()
                    .ok_or_else(|| anyhow!("La opción '-d' necesita una declaración."))?;
                declaration = Some(value);
            }
            flag if flag.starts_with("--declaration=") => {
                declaration = flag.strip_prefix("--declaration=").map(str::to_string);
                words.next();
            }
            "--" => {
                words.next();
                break;
            }
            _ => break,
        }
    }

    let template_words: Vec<String> = words.collect();
    let template = match template_words.as_slice() {
        [] => return Err(anyhow!("El comando 'ext add' requiere el comando a envolver.")),
        [single] => single.clone(),
        many => shell::join_words(many),
    };

    let declaration = match declaration {
        Some(d) => d,
        None => io::prompt_declaration(&template).context("No se pudo leer la declaración.")?,
    };

    let spec = compiler::compile_declaration(&template, &declaration)
        .with_context(|| format!("Declaración inválida: '{}'", declaration))?;

    if dry_run {
        println!("{}", toml::to_string_pretty(&spec)?);
        return Ok(());
    }

    let mut repository = TomlRepository::open_default()?;
    repository
        .save(spec.clone(), force)
        .with_context(|| format!("No se pudo guardar la extensión '{}'.", spec.command_name))?;

    println!("\n✔ Extensión '{}' guardada.", spec.command_name);
    println!("  {}", usage::synopsis(&spec));
    Ok(())
}

/// Muestra el árbol de extensiones registradas.
fn handle_list() -> Result<()> {
    let repository = TomlRepository::open_default()?;
    graph_display::display_extension_tree(&repository.list()?);
    Ok(())
}

fn handle_show(name: &[String]) -> Result<()> {
    if name.is_empty() {
        return Err(anyhow!("El comando 'ext show' requiere el nombre de una extensión."));
    }
    let repository = TomlRepository::open_default()?;
    let spec = repository.load(&name.join(" "))?;
    println!("{}", usage::render_usage(&spec));
    Ok(())
}

fn handle_remove(args: Vec<String>) -> Result<()> {
    let (flags, name): (Vec<String>, Vec<String>) =
        args.into_iter().partition(|a| a == "-y" || a == "--yes");
    if name.is_empty() {
        return Err(anyhow!("El comando 'ext remove' requiere el nombre de una extensión."));
    }
    let name = name.join(" ");

    let settings = config::load_settings()?;
    let mut repository = TomlRepository::open_default()?;
    let spec = repository.load(&name)?;

    if settings.confirm_remove && flags.is_empty() {
        let message = format!("¿Eliminar la extensión '{}' ({})?", spec.command_name, spec.template);
        if !io::confirm(&message).context("No se pudo leer la confirmación.")? {
            println!("Operación cancelada.");
            return Ok(());
        }
    }

    repository.remove(&name)?;
    println!("\n✔ Extensión '{}' eliminada.", spec.command_name);
    Ok(())
}

/// Abre `extensions.toml` con la aplicación por defecto del sistema.
fn handle_edit() -> Result<()> {
    let repository = TomlRepository::open_default()?;
    let path = repository.path();
    if !path.exists() {
        fs::write(path, "")
            .with_context(|| format!("No se pudo crear {}", path.display()))?;
    }
    println!("Abriendo {}...", path.display());
    opener::open(path).with_context(|| format!("No se pudo abrir {}", path.display()))
}

/// Escribe `config.toml` con los valores por defecto.
fn handle_config() -> Result<()> {
    let path = config::write_default_settings()?;
    println!("Ajustes en: {}", path.display());
    Ok(())
}

/// `just <nombre...> [argumentos...]`: el prefijo registrado más largo es la extensión.
fn handle_invoke(words: &[String], dry_run: bool) -> Result<()> {
    let repository = TomlRepository::open_default()?;
    let (spec, args) = repository.resolve(words)?.ok_or_else(|| {
        anyhow!(
            "No existe ninguna extensión para '{}'. Usa '{} ext list' para ver las registradas.",
            words.join(" "),
            ROOT_COMMAND
        )
    })?;
    log::info!("Extensión '{}' resuelta con argumentos {:?}", spec.command_name, args);

    let synopsis = usage::synopsis(&spec);
    let binding = binder::bind(&spec, args).with_context(|| format!("Uso: {}", synopsis))?;
    let raw = match binding {
        Binding::Help => {
            println!("{}", usage::render_usage(&spec));
            return Ok(());
        }
        Binding::Arguments(raw) => raw,
    };

    let command_line = engine::build_command(&spec, raw)
        .with_context(|| format!("Uso: {}", synopsis))?;

    if dry_run {
        println!("{}", command_line);
        return Ok(());
    }

    let settings = config::load_settings()?;
    if settings.echo_commands {
        println!("\n> {}", command_line);
    }
    executor::execute_command(&command_line, &settings)?;
    Ok(())
}
