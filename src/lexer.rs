use super::token::{Keywords, Token, TokenType};

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    read_position: usize,
    ch: char,
    exhausted: bool,
    keywords: Keywords,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::with_keywords(input, Keywords::default())
    }

    pub fn with_keywords(input: &str, keywords: Keywords) -> Self {
        let mut l = Lexer {
            input: input.chars().collect(),
            position: 0,
            read_position: 0,
            ch: char::from(0),
            exhausted: false,
            keywords,
        };
        l.read_char();
        l
    }

    /// True once the read head has moved past the last input character.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn keywords_mut(&mut self) -> &mut Keywords {
        &mut self.keywords
    }

    pub fn into_keywords(self) -> Keywords {
        self.keywords
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_white_space();

        let tok = match self.ch {
            '=' => self.either('=', TokenType::EQ, TokenType::ASSIGN),
            '!' => self.either('=', TokenType::NotEq, TokenType::BANG),
            '*' => self.either('=', TokenType::AsteriskAssign, TokenType::ASTERISK),
            '/' => self.either('=', TokenType::SlashAssign, TokenType::SLASH),
            '+' => match self.peek_char() {
                '+' => self.two_char_token(TokenType::INCREMENT),
                '=' => self.two_char_token(TokenType::PlusAssign),
                _ => new_token(TokenType::PLUS, self.ch),
            },
            '-' => match self.peek_char() {
                '-' => self.two_char_token(TokenType::DECREMENT),
                '=' => self.two_char_token(TokenType::MinusAssign),
                _ => new_token(TokenType::MINUS, self.ch),
            },
            '<' => new_token(TokenType::LT, self.ch),
            '>' => new_token(TokenType::GT, self.ch),
            '.' => new_token(TokenType::DOT, self.ch),
            '#' => new_token(TokenType::SHARP, self.ch),
            ';' => new_token(TokenType::SEMICOLON, self.ch),
            ':' => new_token(TokenType::COLON, self.ch),
            ',' => new_token(TokenType::COMMA, self.ch),
            '{' => new_token(TokenType::LBRACE, self.ch),
            '}' => new_token(TokenType::RBRACE, self.ch),
            '(' => new_token(TokenType::LPAREN, self.ch),
            ')' => new_token(TokenType::RPAREN, self.ch),
            '[' => new_token(TokenType::LBRACKET, self.ch),
            ']' => new_token(TokenType::RBRACKET, self.ch),
            '"' => Token::new(TokenType::STRING, self.read_quoted('"')),
            '\'' => Token::new(TokenType::CHARACTER, self.read_quoted('\'')),
            '\0' if self.exhausted => Token::new(TokenType::EOF, ""),
            _ => if is_letter(self.ch) {
                let literal = self.read_identifier();
                return Token {
                    token_type: self.keywords.look_up_ident(&literal),
                    literal,
                }
            } else if is_digit(self.ch) {
                let (token_type, literal) = self.read_number();
                return Token { token_type, literal }
            } else {
                new_token(TokenType::ILLEGAL, self.ch)
            },
        };
        self.read_char();

        tok
    }

    fn either(&mut self, second: char, paired: TokenType, single: TokenType) -> Token {
        if self.peek_char() == second {
            self.two_char_token(paired)
        } else {
            new_token(single, self.ch)
        }
    }

    fn two_char_token(&mut self, token_type: TokenType) -> Token {
        let first = self.ch;
        self.read_char();
        Token::new(token_type, format!("{}{}", first, self.ch))
    }

    fn skip_white_space(&mut self) {
        while self.ch == ' ' || self.ch == '\t' || self.ch == '\n' || self.ch == '\r' {
            self.read_char();
        }
    }

    fn read_char(&mut self) {
        self.ch = match self.input.get(self.read_position) {
            Some(ch) => *ch,
            None => {
                self.exhausted = true;
                char::from(0)
            }
        };
        self.position = self.read_position;
        self.read_position += 1;
    }

    fn peek_char(&self) -> char {
        self.input.get(self.read_position).copied().unwrap_or(char::from(0))
    }

    fn read_identifier(&mut self) -> String {
        let position = self.position;
        while is_letter(self.ch) || is_digit(self.ch) {
            self.read_char();
        }
        self.slice(position)
    }

    fn read_number(&mut self) -> (TokenType, String) {
        let position = self.position;
        let mut token_type = TokenType::INTEGER;
        while is_digit(self.ch) || self.ch == '.' {
            if self.ch == '.' {
                token_type = TokenType::REAL;
            }
            self.read_char();
        }
        (token_type, self.slice(position))
    }

    // unterminated literals run to the end of input
    fn read_quoted(&mut self, quote: char) -> String {
        let position = self.position + 1;
        loop {
            self.read_char();
            if self.ch == quote || self.exhausted {
                break;
            }
        }
        self.slice(position)
    }

    fn slice(&self, start: usize) -> String {
        let end = self.position.min(self.input.len());
        self.input[start.min(end)..end].iter().collect()
    }
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn new_token(token_type: TokenType, ch: char) -> Token {
    Token {
        token_type,
        literal: ch.to_string(),
    }
}
