// src/core/mod.rs

pub mod address;
pub mod arg_parser;
pub mod introspector;
