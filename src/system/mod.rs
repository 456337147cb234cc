// src/system/mod.rs

pub mod executor;
pub mod io;
pub mod shell;
