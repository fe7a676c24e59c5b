//! Parser for circuit descriptions.
//!
//! This module provides a SPICE-flavoured text format for describing lamp
//! circuits. The format is line-oriented and human-editable.
//!
//! # Grammar Overview
//!
//! ```text
//! circuit     = { line }
//! line        = comment | directive | component | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = ".node" node | ".param" assignment { assignment }
//! component   = (prefixed_name | keyword name) node+ [value] { assignment | state }
//! assignment  = identifier '=' value
//! state       = "open" | "closed"
//!
//! value       = number [unit_suffix]
//! number      = ['-'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! unit_suffix = 'm' | 'k' | 'M'
//! ```
//!
//! # Component Types
//!
//! | Prefix | Keyword | Description | Syntax |
//! |--------|---------|-------------|--------|
//! | BAT | BATTERY | Battery | `BAT<name> <n+> <n-> <volts>` |
//! | SW | SWITCH | Switch (open by default) | `SW<name> <n1> <n2> [open\|closed\|0\|1]` |
//! | POT | POTENTIOMETER | Potentiometer | `POT<name> <a> <b> <c> <ohms> [fixed=<ohms>]` |
//! | LED, LAMP | LAMP, LED | Lamp | `LED<name> <n+> <n->` |
//! | W | WIRE | Wire | `W<name> <n1> <n2>` |
//!
//! # Example
//!
//! ```text
//! # Dimmable lamp
//! .param max_intensity=100
//!
//! BAT1  p    n    9
//! SW1   p    a    closed
//! POT1  a    b    c    220
//! LED1  b    n
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a circuit description string into an AST.
pub fn parse(input: &str) -> Result<CircuitAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a circuit description file.
pub fn parse_file(path: &std::path::Path) -> Result<CircuitAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::LumenError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
