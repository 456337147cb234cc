// src/core/graph_display.rs

use crate::models::CommandSpec;
use std::collections::BTreeMap;

/// Un nivel del árbol de nombres: `docker` agrupa a `docker ip` y `docker ps`.
#[derive(Default)]
struct Node<'a> {
    spec: Option<&'a CommandSpec>,
    children: BTreeMap<&'a str, Node<'a>>,
}

/// Muestra un árbol ASCII de todas las extensiones registradas.
pub fn display_extension_tree(specs: &[CommandSpec]) {
    if specs.is_empty() {
        println!("\nNo hay extensiones registradas. Usa 'just ext add' para empezar.");
        return;
    }
    println!("\nExtensiones Registradas:");
    println!("{}", render_tree(specs));
}

/// Construye el árbol. Los hijos salen en orden alfabético para una salida estable.
pub fn render_tree(specs: &[CommandSpec]) -> String {
    let mut root = Node::default();
    for spec in specs {
        let mut node = &mut root;
        for word in spec.path() {
            node = node.children.entry(word).or_default();
        }
        node.spec = Some(spec);
    }

    let mut lines = Vec::new();
    let count = root.children.len();
    for (i, (word, child)) in root.children.iter().enumerate() {
        print_node(word, child, "", i == count - 1, &mut lines);
    }
    lines.join("\n")
}

/// Función recursiva para pintar un nodo y sus descendientes.
fn print_node(word: &str, node: &Node, prefix: &str, is_last: bool, lines: &mut Vec<String>) {
    let connector = if is_last { "└─" } else { "├─" };
    match node.spec {
        Some(spec) => lines.push(format!("{}{}{} [{}]", prefix, connector, word, spec.template)),
        None => lines.push(format!("{}{}{}", prefix, connector, word)),
    }

    let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
    let count = node.children.len();
    for (i, (child_word, child)) in node.children.iter().enumerate() {
        print_node(child_word, child, &child_prefix, i == count - 1, lines);
    }
}
