pub mod interpreter;

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod object;
pub mod evaluator;
pub mod builtin;
pub mod environment;
pub mod library;
pub mod linker;
pub mod config;
pub mod error;
