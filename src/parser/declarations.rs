//! Declaration productions
//!
//! ```text
//! declaration      := decl-specifiers "*"? init-declarator-list? ";"
//! decl-specifiers  := (TYPE_SPECIFIER | TYPE_QUALIFIER)+
//! init-declarator  := IDENTIFIER ("=" assignment)?
//! ```
//!
//! Specifiers and qualifiers are gathered as two sets; duplicates are
//! diagnosed but parsing continues, and the final specifier set is mapped to
//! a numeric type through the lattice table. `const` is the only qualifier.
//! A single `*` turns the declared type (and cast type-names) into the
//! pointer layer of the lattice.

use std::collections::BTreeSet;

use crate::parser::ast::Stmt;
use crate::parser::parse::{ParseResult, Parser};
use crate::parser::token::TokenKind;
use crate::types::{numeric_type_from_specifiers, NumericKind, Type};

impl<'a> Parser<'a> {
    /// declaration := decl-specifiers "*"? init-declarator-list? ";"
    ///
    /// The leading specifier/qualifier token has not been consumed yet.
    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Stmt> {
        let (kind, is_const) = self.parse_declaration_specifiers()?;
        let ty = self.parse_pointer_suffix(kind)?;

        let mut declarators = Vec::new();
        loop {
            let name = self.consume(TokenKind::Identifier, "Expect variable name")?;
            let initialiser = if self.match_kind(TokenKind::Equal) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarators.push((name, initialiser));

            if self.is_at_end() || !self.match_kind(TokenKind::Comma) {
                break;
            }
        }

        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration",
        )?;

        Ok(Stmt::VarDeclaration {
            ty,
            is_const,
            declarators,
        })
    }

    /// type-name := decl-specifiers "*"?  (used by cast expressions)
    pub(crate) fn parse_type_name(&mut self) -> ParseResult<(Type, bool)> {
        let (kind, is_const) = self.parse_declaration_specifiers()?;
        let ty = self.parse_pointer_suffix(kind)?;
        Ok((ty, is_const))
    }

    /// Gather specifier and qualifier lexemes, diagnosing duplicates, and
    /// map the specifier set to a numeric type.
    fn parse_declaration_specifiers(&mut self) -> ParseResult<(NumericKind, bool)> {
        let mut specifiers: BTreeSet<String> = BTreeSet::new();
        let mut qualifiers: BTreeSet<String> = BTreeSet::new();

        loop {
            if self.match_kind(TokenKind::TypeQualifier) {
                let token = self.previous().clone();
                if !qualifiers.insert(token.lexeme.clone()) {
                    // Report and carry on; the set is unchanged
                    let _ = self.error_at(&token, "duplicate type qualifier");
                }
            } else if self.match_kind(TokenKind::TypeSpecifier) {
                let token = self.previous().clone();
                if !specifiers.insert(token.lexeme.clone()) {
                    let _ = self.error_at(&token, "duplicate type specifier");
                }
            } else {
                break;
            }
        }

        let specifier_refs: BTreeSet<&str> = specifiers.iter().map(String::as_str).collect();
        let kind = match numeric_type_from_specifiers(&specifier_refs) {
            Some(kind) => kind,
            None => return Err(self.error_at_current("Unknown type specifier")),
        };

        // const is the only recognised qualifier
        Ok((kind, !qualifiers.is_empty()))
    }

    /// Optional `*` after the specifiers. The lattice has a single pointer
    /// layer, so a second `*` is diagnosed.
    fn parse_pointer_suffix(&mut self, kind: NumericKind) -> ParseResult<Type> {
        if self.match_kind(TokenKind::Star) {
            if self.check(TokenKind::Star) {
                return Err(
                    self.error_at_current("Only a single level of pointer is supported")
                );
            }
            Ok(Type::Pointer(kind))
        } else {
            Ok(Type::Numeric(kind))
        }
    }
}
