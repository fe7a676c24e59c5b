//! Parser for the circuit description language.

use std::collections::{HashMap, HashSet};

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{LumenError, Result};

/// Parser for circuit descriptions.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire circuit description.
    pub fn parse(&mut self) -> Result<CircuitAst> {
        let mut ast = CircuitAst::new();
        let mut names = HashSet::new();

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    if !names.insert(component.name.clone()) {
                        return Err(LumenError::DuplicateComponent {
                            name: component.name,
                        });
                    }
                    for node in &component.nodes {
                        ast.declare_node(node);
                    }
                    ast.components.push(component);
                }
                _ => {
                    return Err(LumenError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            match self.current.kind {
                TokenKind::Newline => self.advance()?,
                TokenKind::Eof => {}
                _ => {
                    return Err(LumenError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(LumenError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    /// Node names may be plain identifiers or bare numbers.
    fn expect_node(&mut self) -> Result<String> {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Number => {
                let text = self.current.text.clone();
                self.advance()?;
                Ok(text)
            }
            _ => Err(LumenError::parse(
                self.current.line,
                format!("expected node name, got {:?}", self.current.kind),
            )),
        }
    }

    fn parse_directive(&mut self, ast: &mut CircuitAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".node" => {
                let node = self.expect_node()?;
                ast.declare_node(&node);
            }
            ".param" => {
                let mut any = false;
                while self.current.kind == TokenKind::Identifier {
                    let (name, value) = self.parse_assignment(line)?;
                    ast.params.push(ParamDef { name, value, line });
                    any = true;
                }
                if !any {
                    return Err(LumenError::parse(line, ".param expects key=value pairs"));
                }
            }
            _ => {
                return Err(LumenError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    /// Parse `key=value`, starting at the key.
    fn parse_assignment(&mut self, line: usize) -> Result<(String, f64)> {
        let key = self.expect(TokenKind::Identifier)?.text.to_lowercase();
        self.expect(TokenKind::Equals)?;
        let value = self.parse_number(line)?;
        Ok((key, value))
    }

    fn parse_number(&mut self, line: usize) -> Result<f64> {
        match self.current.kind {
            TokenKind::Number | TokenKind::Identifier => {
                let text = self.current.text.clone();
                self.advance()?;
                parse_value(&text).ok_or_else(|| LumenError::parse(line, format!("invalid number: {}", text)))
            }
            _ => Err(LumenError::parse(line, "expected a value")),
        }
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let first_token = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        // Keywords first, so "LAMP kitchen ..." is not read as a lamp named LAMP.
        let (component_type, name) = if let Some(ct) = ComponentType::from_keyword(&first_token) {
            let actual_name = self.expect(TokenKind::Identifier)?.text;
            (ct, actual_name)
        } else {
            let ct = ComponentType::from_prefix(&first_token).ok_or_else(|| {
                LumenError::UnknownComponentType {
                    component_type: first_token.clone(),
                    line,
                }
            })?;
            (ct, first_token)
        };

        let expected_nodes = component_type.expected_node_count();
        let mut nodes = Vec::with_capacity(expected_nodes);
        while nodes.len() < expected_nodes {
            if matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof) {
                return Err(LumenError::invalid_component(
                    &name,
                    line,
                    format!("expected {} nodes, got {}", expected_nodes, nodes.len()),
                ));
            }
            nodes.push(self.expect_node()?);
        }

        let mut value = None;
        let mut params = HashMap::new();

        while !matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof) {
            match self.current.kind {
                TokenKind::Number => {
                    let number = self.parse_number(line)?;
                    if value.replace(number).is_some() {
                        return Err(LumenError::invalid_component(&name, line, "more than one value given"));
                    }
                }
                TokenKind::Identifier => {
                    let word = self.current.text.to_lowercase();
                    match (component_type, word.as_str()) {
                        (ComponentType::Switch, "open") => {
                            self.advance()?;
                            params.insert("state".to_string(), 0.0);
                        }
                        (ComponentType::Switch, "closed") => {
                            self.advance()?;
                            params.insert("state".to_string(), 1.0);
                        }
                        _ => {
                            let (key, v) = self.parse_assignment(line)?;
                            params.insert(key, v);
                        }
                    }
                }
                _ => {
                    return Err(LumenError::parse(
                        line,
                        format!("unexpected token in component '{}': {:?}", name, self.current.text),
                    ));
                }
            }
        }

        Ok(ComponentDef {
            component_type,
            name,
            nodes,
            value,
            params,
            line,
        })
    }
}
