//! Error types for the Lumen circuit engine.
//!
//! This module provides a unified error type [`LumenError`] that covers
//! all error conditions that can occur while parsing a circuit description
//! and while registering components with the engine.
//!
//! Electrical faults (short circuits, over-current) are *not* errors: they are
//! reported through the lamp condition and never abort a recompute pass.

use thiserror::Error;

/// Result type alias using [`LumenError`].
pub type Result<T> = std::result::Result<T, LumenError>;

/// Unified error type for all Lumen operations.
#[derive(Error, Debug)]
pub enum LumenError {
    // ============ Description Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    /// Invalid parameter value or unknown parameter key
    #[error("Invalid parameter '{param}' for '{component}': {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    // ============ Registration Errors ============
    /// Node not found in the graph
    #[error("Node '{node}' not found in circuit")]
    NodeNotFound { node: String },

    /// Component not found in the engine
    #[error("Component '{name}' not found in circuit")]
    ComponentNotFound { name: String },

    /// Wire not found in the engine
    #[error("Wire '{name}' not found in circuit")]
    WireNotFound { name: String },

    /// Duplicate component name in a circuit description
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    /// A terminal refers to a node that is not part of the graph
    #[error("Component '{component}' has no valid '{terminal}' terminal")]
    MissingTerminal { component: String, terminal: String },

    /// The same node was assigned to two terminals of one component
    #[error("Component '{component}' uses node {node} for more than one terminal")]
    DuplicateTerminal { component: String, node: String },

    // ============ I/O Errors ============
    /// Error reading a circuit description file
    #[error("Failed to read circuit file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl LumenError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        component: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            component: component.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a missing terminal error
    pub fn missing_terminal(component: impl Into<String>, terminal: impl Into<String>) -> Self {
        Self::MissingTerminal {
            component: component.into(),
            terminal: terminal.into(),
        }
    }
}
