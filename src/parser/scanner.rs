//! Scanner: source text → token stream
//!
//! Walks the source a character at a time with one character of lookahead,
//! matching operators greedily (`<` / `<=` / `<<` / `<<=`) and reclassifying
//! identifiers against the keyword table. Whitespace and `//` comments are
//! discarded; newlines advance the 1-based line counter.
//!
//! Numeric literals cover decimal and hexadecimal integers with `u`/`l`
//! suffixes, decimal floats with optional exponent, and hexadecimal floats
//! with a required binary exponent. Octal literals are rejected. Problems are
//! reported to the [`ErrorHandler`] and scanning continues, so one pass can
//! surface several diagnostics.

use crate::diagnostics::ErrorHandler;
use crate::parser::token::{LiteralValue, Token, TokenKind};

/// Scan `source` into a token vector terminated by an `EndOfFile` token.
pub fn scan(source: &str, errors: &mut dyn ErrorHandler) -> Vec<Token> {
    let mut scanner = Scanner::new(source, errors);
    scanner.run()
}

fn keyword_kind(identifier: &str) -> Option<TokenKind> {
    match identifier {
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "for" => Some(TokenKind::For),
        "while" => Some(TokenKind::While),
        "do" => Some(TokenKind::Do),
        "switch" => Some(TokenKind::Switch),
        "case" => Some(TokenKind::Case),
        "default" => Some(TokenKind::Default),
        "break" => Some(TokenKind::Break),
        "continue" => Some(TokenKind::Continue),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "print" => Some(TokenKind::Print),
        "char" | "short" | "int" | "long" | "float" | "double" | "signed" | "unsigned"
        | "bool" => Some(TokenKind::TypeSpecifier),
        "const" => Some(TokenKind::TypeQualifier),
        _ => None,
    }
}

struct Scanner<'a> {
    chars: Vec<char>,
    start: usize,
    current: usize,
    line: usize,
    tokens: Vec<Token>,
    errors: &'a mut dyn ErrorHandler,
}

impl<'a> Scanner<'a> {
    fn new(source: &str, errors: &'a mut dyn ErrorHandler) -> Self {
        Scanner {
            chars: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            tokens: Vec::new(),
            errors,
        }
    }

    fn run(&mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens
            .push(Token::new(TokenKind::EndOfFile, "", self.line));
        std::mem::take(&mut self.tokens)
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.push(TokenKind::LeftParen),
            ')' => self.push(TokenKind::RightParen),
            '{' => self.push(TokenKind::LeftBrace),
            '}' => self.push(TokenKind::RightBrace),
            '[' => self.push(TokenKind::LeftBracket),
            ']' => self.push(TokenKind::RightBracket),
            ',' => self.push(TokenKind::Comma),
            '.' => self.push(TokenKind::Dot),
            ';' => self.push(TokenKind::Semicolon),
            ':' => self.push(TokenKind::Colon),
            '?' => self.push(TokenKind::Question),
            '~' => self.push(TokenKind::Tilde),

            '!' => {
                let kind = if self.match_char('=') {
                    TokenKind::NotEqual
                } else {
                    TokenKind::Not
                };
                self.push(kind);
            }
            '=' => {
                let kind = if self.match_char('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.push(kind);
            }
            '<' => {
                let kind = if self.match_char('=') {
                    TokenKind::LessEqual
                } else if self.match_char('<') {
                    if self.match_char('=') {
                        TokenKind::ShiftLeftEqual
                    } else {
                        TokenKind::ShiftLeft
                    }
                } else {
                    TokenKind::Less
                };
                self.push(kind);
            }
            '>' => {
                let kind = if self.match_char('=') {
                    TokenKind::GreaterEqual
                } else if self.match_char('>') {
                    if self.match_char('=') {
                        TokenKind::ShiftRightEqual
                    } else {
                        TokenKind::ShiftRight
                    }
                } else {
                    TokenKind::Greater
                };
                self.push(kind);
            }
            '+' => {
                let kind = if self.match_char('=') {
                    TokenKind::PlusEqual
                } else if self.match_char('+') {
                    TokenKind::PlusPlus
                } else {
                    TokenKind::Plus
                };
                self.push(kind);
            }
            '-' => {
                let kind = if self.match_char('=') {
                    TokenKind::MinusEqual
                } else if self.match_char('-') {
                    TokenKind::MinusMinus
                } else {
                    TokenKind::Minus
                };
                self.push(kind);
            }
            '*' => {
                let kind = if self.match_char('=') {
                    TokenKind::StarEqual
                } else {
                    TokenKind::Star
                };
                self.push(kind);
            }
            '%' => {
                let kind = if self.match_char('=') {
                    TokenKind::PercentEqual
                } else {
                    TokenKind::Percent
                };
                self.push(kind);
            }
            '^' => {
                let kind = if self.match_char('=') {
                    TokenKind::CaretEqual
                } else {
                    TokenKind::Caret
                };
                self.push(kind);
            }
            '&' => {
                let kind = if self.match_char('=') {
                    TokenKind::AmpersandEqual
                } else if self.match_char('&') {
                    TokenKind::AmpersandAmpersand
                } else {
                    TokenKind::Ampersand
                };
                self.push(kind);
            }
            '|' => {
                let kind = if self.match_char('=') {
                    TokenKind::PipeEqual
                } else if self.match_char('|') {
                    TokenKind::PipePipe
                } else {
                    TokenKind::Pipe
                };
                self.push(kind);
            }
            '/' => {
                if self.match_char('/') {
                    // Line comment
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.match_char('=') {
                    self.push(TokenKind::SlashEqual);
                } else {
                    self.push(TokenKind::Slash);
                }
            }

            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            _ => {
                if c.is_ascii_digit() {
                    self.scan_number(c);
                } else if c.is_ascii_alphabetic() || c == '_' {
                    self.scan_identifier();
                } else {
                    self.errors.error(self.line, "Unexpected character.");
                }
            }
        }
    }

    fn scan_identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let lexeme = self.lexeme();
        match keyword_kind(&lexeme) {
            Some(kind) => self.push(kind),
            None => self.push(TokenKind::Identifier),
        }
    }

    fn scan_number(&mut self, first: char) {
        if first == '0' && (self.match_char('x') || self.match_char('X')) {
            self.scan_hex_number();
        } else if first == '0' && self.peek().is_digit(8) {
            self.errors.error(self.line, "Octal literals unsupported.");
            // Swallow the remaining digits so they don't rescan as a number
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        } else {
            self.scan_decimal_number(first);
        }
    }

    fn scan_decimal_number(&mut self, first: char) {
        let mut text = String::from(first);
        while self.peek().is_ascii_digit() {
            text.push(self.advance());
        }

        let mut is_float = false;
        if self.match_char('.') {
            is_float = true;
            text.push('.');
            while self.peek().is_ascii_digit() {
                text.push(self.advance());
            }
        }

        if self.peek() == 'e' || self.peek() == 'E' {
            is_float = true;
            text.push(self.advance());
            if self.peek() == '-' || self.peek() == '+' {
                text.push(self.advance());
            }
            while self.peek().is_ascii_digit() {
                text.push(self.advance());
            }
        }

        if is_float {
            self.finish_float_literal(&text);
        } else {
            let unsigned = self.scan_integer_suffix();
            self.finish_integer_literal(&text, 10, unsigned);
        }
    }

    fn scan_hex_number(&mut self) {
        let mut integer_digits = String::new();
        while self.peek().is_ascii_hexdigit() {
            integer_digits.push(self.advance());
        }

        let mut fraction_digits = String::new();
        let has_point = self.match_char('.');
        if has_point {
            while self.peek().is_ascii_hexdigit() {
                fraction_digits.push(self.advance());
            }
        }

        // A binary exponent makes the literal floating whether or not it has
        // a decimal point; a point without an exponent is malformed.
        if self.peek() == 'p' || self.peek() == 'P' {
            self.advance();
            let negative = match self.peek() {
                '-' => {
                    self.advance();
                    true
                }
                '+' => {
                    self.advance();
                    false
                }
                _ => false,
            };

            let mut exponent_digits = String::new();
            while self.peek().is_ascii_digit() {
                exponent_digits.push(self.advance());
            }
            if exponent_digits.is_empty() {
                self.errors
                    .error(self.line, "Hexadecimal floating point literal missing exponent.");
                return;
            }

            let exponent = match exponent_digits.parse::<i32>() {
                Ok(e) if !negative => e,
                Ok(e) => -e,
                Err(_) => {
                    self.errors.error(self.line, "Malformed numeric literal.");
                    return;
                }
            };

            let value = hex_float_value(&integer_digits, &fraction_digits, exponent);
            if self.peek() == 'f' || self.peek() == 'F' {
                self.advance();
                self.push_literal(LiteralValue::Float(value as f32));
            } else {
                self.push_literal(LiteralValue::Double(value));
            }
        } else if has_point {
            self.errors
                .error(self.line, "Hexadecimal floating point literal missing exponent.");
        } else if integer_digits.is_empty() {
            self.errors.error(self.line, "Malformed numeric literal.");
        } else {
            let unsigned = self.scan_integer_suffix();
            self.finish_integer_literal(&integer_digits, 16, unsigned);
        }
    }

    /// Consume a `u`/`l` suffix in any order and multiplicity; only the
    /// presence of `u` narrows the literal.
    fn scan_integer_suffix(&mut self) -> bool {
        let mut unsigned = false;
        loop {
            match self.peek() {
                'u' | 'U' => {
                    unsigned = true;
                    self.advance();
                }
                'l' | 'L' => {
                    self.advance();
                }
                _ => break,
            }
        }
        unsigned
    }

    fn finish_integer_literal(&mut self, digits: &str, radix: u32, unsigned: bool) {
        if unsigned {
            match u32::from_str_radix(digits, radix) {
                Ok(value) => self.push_literal(LiteralValue::Uint32(value)),
                Err(_) => self.errors.error(self.line, "Malformed numeric literal."),
            }
        } else {
            match i32::from_str_radix(digits, radix) {
                Ok(value) => self.push_literal(LiteralValue::Int32(value)),
                Err(_) => self.errors.error(self.line, "Malformed numeric literal."),
            }
        }
    }

    fn finish_float_literal(&mut self, text: &str) {
        // `1.` and `1.e5` are valid source but not valid Rust float syntax
        let normalised = text.replace(".e", ".0e");
        let normalised = if normalised.ends_with('.') {
            format!("{normalised}0")
        } else {
            normalised
        };

        if self.peek() == 'f' || self.peek() == 'F' {
            self.advance();
            match normalised.parse::<f32>() {
                Ok(value) => self.push_literal(LiteralValue::Float(value)),
                Err(_) => self.errors.error(self.line, "Malformed numeric literal."),
            }
        } else {
            match normalised.parse::<f64>() {
                Ok(value) => self.push_literal(LiteralValue::Double(value)),
                Err(_) => self.errors.error(self.line, "Malformed numeric literal."),
            }
        }
    }

    // ===== Cursor helpers =====

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.current]
        }
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn push(&mut self, kind: TokenKind) {
        let token = Token::new(kind, self.lexeme(), self.line);
        self.tokens.push(token);
    }

    fn push_literal(&mut self, literal: LiteralValue) {
        let token = Token::with_literal(TokenKind::Number, self.lexeme(), self.line, literal);
        self.tokens.push(token);
    }
}

/// Value of a hexadecimal float mantissa scaled by a binary exponent.
fn hex_float_value(integer_digits: &str, fraction_digits: &str, exponent: i32) -> f64 {
    let mut value = 0.0;
    for digit in integer_digits.chars() {
        value = value * 16.0 + digit.to_digit(16).unwrap_or(0) as f64;
    }

    let mut scale = 1.0 / 16.0;
    for digit in fraction_digits.chars() {
        value += digit.to_digit(16).unwrap_or(0) as f64 * scale;
        scale /= 16.0;
    }

    value * 2.0_f64.powi(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::BufferedErrorHandler;

    fn scan_ok(source: &str) -> Vec<Token> {
        let mut errors = BufferedErrorHandler::new();
        let tokens = scan(source, &mut errors);
        assert!(
            !errors.has_error(),
            "unexpected scan errors: {:?}",
            errors.diagnostics()
        );
        tokens
    }

    fn first_literal(source: &str) -> LiteralValue {
        let tokens = scan_ok(source);
        assert_eq!(tokens[0].kind, TokenKind::Number);
        tokens[0].literal
    }

    #[test]
    fn test_tokens_end_with_eof_and_nonempty_lexemes() {
        let source = "const int x = 12; x += 4;";
        let tokens = scan_ok(source);

        assert_eq!(tokens.last().unwrap().kind, TokenKind::EndOfFile);
        for token in &tokens[..tokens.len() - 1] {
            assert!(!token.lexeme.is_empty());
            assert!(source.contains(&token.lexeme), "lexeme {:?}", token.lexeme);
        }
    }

    #[test]
    fn test_operator_greedy_matching() {
        let kinds: Vec<TokenKind> = scan_ok("= == < <= << <<= & && &= | || |= >>=")
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::ShiftLeft,
                TokenKind::ShiftLeftEqual,
                TokenKind::Ampersand,
                TokenKind::AmpersandAmpersand,
                TokenKind::AmpersandEqual,
                TokenKind::Pipe,
                TokenKind::PipePipe,
                TokenKind::PipeEqual,
                TokenKind::ShiftRightEqual,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_keywords_and_specifiers() {
        let tokens = scan_ok("while unsigned int const trueish true");
        assert_eq!(tokens[0].kind, TokenKind::While);
        assert_eq!(tokens[1].kind, TokenKind::TypeSpecifier);
        assert_eq!(tokens[2].kind, TokenKind::TypeSpecifier);
        assert_eq!(tokens[3].kind, TokenKind::TypeQualifier);
        assert_eq!(tokens[4].kind, TokenKind::Identifier);
        assert_eq!(tokens[5].kind, TokenKind::True);
    }

    #[test]
    fn test_line_counting_and_comments() {
        let tokens = scan_ok("x; // trailing comment\ny;\nz;");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[4].line, 3);
        // Comment text produces no tokens
        assert_eq!(tokens.len(), 7);
    }

    #[test]
    fn test_decimal_integer_literals() {
        assert_eq!(first_literal("42"), LiteralValue::Int32(42));
        assert_eq!(first_literal("42u"), LiteralValue::Uint32(42));
        assert_eq!(first_literal("42U"), LiteralValue::Uint32(42));
        assert_eq!(first_literal("42ul"), LiteralValue::Uint32(42));
        assert_eq!(first_literal("42lu"), LiteralValue::Uint32(42));
        assert_eq!(first_literal("42l"), LiteralValue::Int32(42));
    }

    #[test]
    fn test_decimal_float_literals() {
        assert_eq!(first_literal("0.5"), LiteralValue::Double(0.5));
        assert_eq!(first_literal("0.5f"), LiteralValue::Float(0.5));
        assert_eq!(first_literal("1.5e3"), LiteralValue::Double(1500.0));
        assert_eq!(first_literal("1e3"), LiteralValue::Double(1000.0));
        assert_eq!(first_literal("2.5E-1"), LiteralValue::Double(0.25));
        assert_eq!(first_literal("1."), LiteralValue::Double(1.0));
    }

    #[test]
    fn test_hex_integer_literals() {
        assert_eq!(first_literal("0xff"), LiteralValue::Int32(255));
        assert_eq!(first_literal("0XFFu"), LiteralValue::Uint32(255));
    }

    #[test]
    fn test_hex_float_literals() {
        assert_eq!(first_literal("0x1p0f"), LiteralValue::Float(1.0));
        assert_eq!(first_literal("0x1.8p1"), LiteralValue::Double(3.0));
        assert_eq!(first_literal("0x1.8p-1"), LiteralValue::Double(0.75));
        assert_eq!(first_literal("0xap0"), LiteralValue::Double(10.0));
    }

    #[test]
    fn test_hex_float_missing_exponent_is_error() {
        let mut errors = BufferedErrorHandler::new();
        scan("0x1.8", &mut errors);
        assert!(errors.contains("missing exponent"));
    }

    #[test]
    fn test_octal_rejected() {
        let mut errors = BufferedErrorHandler::new();
        let tokens = scan("0755;", &mut errors);
        assert!(errors.contains("Octal"));
        // The bad literal is skipped; the semicolon still scans
        assert_eq!(tokens[0].kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_unexpected_character_reports_and_continues() {
        let mut errors = BufferedErrorHandler::new();
        let tokens = scan("x @ y", &mut errors);
        assert!(errors.contains("Unexpected character."));
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }
}
