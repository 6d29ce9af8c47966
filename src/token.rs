use std::collections::HashMap;
use std::fmt;
use std::fmt::Formatter;

#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Clone, Copy)]
pub enum TokenType {
    ILLEGAL,
    EOF,

    IDENT,
    INTEGER,
    REAL,
    CHARACTER,
    STRING,

    // declared types
    INT, // int
    FLOAT, // float
    CHAR, // char
    BOOL, // bool
    VOID, // void
    CLASS, // library class names

    ASSIGN,
    PlusAssign, // +=
    MinusAssign, // -=
    AsteriskAssign, // *=
    SlashAssign, // /=
    PLUS,
    MINUS,
    BANG, // !
    ASTERISK,
    SLASH,
    INCREMENT, // ++
    DECREMENT, // --
    DOT,

    LT,
    GT,
    EQ,
    NotEq,

    COMMA,
    SEMICOLON,
    COLON,
    SHARP, // #

    LPAREN, // (
    RPAREN, // )
    LBRACE, // {
    RBRACE, // }
    LBRACKET, // [
    RBRACKET, // ]

    // keywords
    TRUE, // true
    FALSE, // false
    IF, // if
    ELSE, // else
    RETURN, // return
    BREAK, // break
    FOR, // for
    WHILE, // while
    INCLUDE, // include
}

impl TokenType {
    pub fn is_data_type(&self) -> bool {
        matches!(self,
            TokenType::INT | TokenType::FLOAT | TokenType::CHAR |
            TokenType::BOOL | TokenType::VOID | TokenType::CLASS)
    }

    pub fn is_assign(&self) -> bool {
        matches!(self,
            TokenType::ASSIGN | TokenType::PlusAssign | TokenType::MinusAssign |
            TokenType::AsteriskAssign | TokenType::SlashAssign)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}",
            match &self {
                TokenType::ILLEGAL => "ILLEGAL",
                TokenType::EOF => "EOF",
                TokenType::IDENT => "IDENT",
                TokenType::INTEGER => "INTEGER",
                TokenType::REAL => "REAL",
                TokenType::CHARACTER => "CHARACTER",
                TokenType::STRING => "STRING",
                TokenType::INT => "INT",
                TokenType::FLOAT => "FLOAT",
                TokenType::CHAR => "CHAR",
                TokenType::BOOL => "BOOL",
                TokenType::VOID => "VOID",
                TokenType::CLASS => "CLASS",
                TokenType::ASSIGN => "ASSIGN",
                TokenType::PlusAssign => "PlusAssign",
                TokenType::MinusAssign => "MinusAssign",
                TokenType::AsteriskAssign => "AsteriskAssign",
                TokenType::SlashAssign => "SlashAssign",
                TokenType::PLUS => "PLUS",
                TokenType::MINUS => "MINUS",
                TokenType::BANG => "BANG",
                TokenType::ASTERISK => "ASTERISK",
                TokenType::SLASH => "SLASH",
                TokenType::INCREMENT => "INCREMENT",
                TokenType::DECREMENT => "DECREMENT",
                TokenType::DOT => "DOT",
                TokenType::LT => "LT",
                TokenType::GT => "GT",
                TokenType::EQ => "EQ",
                TokenType::NotEq => "NotEq",
                TokenType::COMMA => "COMMA",
                TokenType::SEMICOLON => "SEMICOLON",
                TokenType::COLON => "COLON",
                TokenType::SHARP => "SHARP",
                TokenType::LPAREN => "LPAREN",
                TokenType::RPAREN => "RPAREN",
                TokenType::LBRACE => "LBRACE",
                TokenType::RBRACE => "RBRACE",
                TokenType::LBRACKET => "LBRACKET",
                TokenType::RBRACKET => "RBRACKET",
                TokenType::TRUE => "TRUE",
                TokenType::FALSE => "FALSE",
                TokenType::IF => "IF",
                TokenType::ELSE => "ELSE",
                TokenType::RETURN => "RETURN",
                TokenType::BREAK => "BREAK",
                TokenType::FOR => "FOR",
                TokenType::WHILE => "WHILE",
                TokenType::INCLUDE => "INCLUDE",
            }
        )
    }
}

#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String
}

impl Token {
    pub fn new(token_type: TokenType, literal: impl Into<String>) -> Self {
        Token { token_type, literal: literal.into() }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}: {}}}", self.token_type, self.literal)
    }
}

/// Spelling-to-kind table consulted by the lexer for every identifier.
///
/// Linking a library adds its class names as [`TokenType::CLASS`] keywords.
/// Entries are only ever added, never removed.
#[derive(Debug, Clone)]
pub struct Keywords {
    table: HashMap<String, TokenType>,
}

impl Default for Keywords {
    fn default() -> Self {
        let table = [
            ("int", TokenType::INT),
            ("float", TokenType::FLOAT),
            ("char", TokenType::CHAR),
            ("bool", TokenType::BOOL),
            ("void", TokenType::VOID),
            ("true", TokenType::TRUE),
            ("false", TokenType::FALSE),
            ("if", TokenType::IF),
            ("else", TokenType::ELSE),
            ("return", TokenType::RETURN),
            ("for", TokenType::FOR),
            ("while", TokenType::WHILE),
            ("break", TokenType::BREAK),
            ("include", TokenType::INCLUDE),
        ]
        .into_iter()
        .map(|(spelling, t)| (spelling.to_string(), t))
        .collect();

        Keywords { table }
    }
}

impl Keywords {
    pub fn look_up_ident(&self, ident: &str) -> TokenType {
        self.table.get(ident).copied().unwrap_or(TokenType::IDENT)
    }

    /// Returns false if the spelling was already a keyword.
    pub fn add_class(&mut self, name: &str) -> bool {
        if self.table.contains_key(name) {
            return false;
        }
        self.table.insert(name.to_string(), TokenType::CLASS);
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::token::{Keywords, TokenType};

    #[test]
    fn test_look_up_ident() {
        let keywords = Keywords::default();
        assert_eq!(keywords.look_up_ident("int"), TokenType::INT);
        assert_eq!(keywords.look_up_ident("while"), TokenType::WHILE);
        assert_eq!(keywords.look_up_ident("include"), TokenType::INCLUDE);
        assert_eq!(keywords.look_up_ident("LedControl"), TokenType::IDENT);
    }

    #[test]
    fn test_add_class() {
        let mut keywords = Keywords::default();
        assert!(keywords.add_class("LedControl"));
        assert!(!keywords.add_class("LedControl"));
        assert_eq!(keywords.look_up_ident("LedControl"), TokenType::CLASS);

        // existing keywords are never replaced
        assert!(!keywords.add_class("int"));
        assert_eq!(keywords.look_up_ident("int"), TokenType::INT);
    }
}
