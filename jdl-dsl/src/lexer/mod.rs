//! Lexer module for JDL

pub mod scanner;
pub mod token;

pub use scanner::*;
pub use token::*;
