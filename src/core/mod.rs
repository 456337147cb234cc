// src/core/mod.rs

pub mod binder;
pub mod builder;
pub mod compiler;
pub mod engine;
pub mod graph_display;
pub mod parser;
pub mod repository;
pub mod tokenizer;
pub mod usage;
pub mod values;
