// src/cli.rs

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "just: convierte cualquier comando de shell en un subcomando tipado.", long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Muestra el comando final en lugar de ejecutarlo.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Acción de gestión ('ext ...') o nombre de una extensión seguido de sus argumentos.
    /// A partir de la primera palabra todo se pasa tal cual: las flags pertenecen a la extensión.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
