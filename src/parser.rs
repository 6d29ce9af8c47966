use crate::ast::{DataType, Expression, Parameter, Program, Statement};
use crate::lexer::Lexer;
use crate::linker::Linker;
use crate::token::{Keywords, Token, TokenType};

#[derive(Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
enum Precedence {
    LOWEST,
    EQUALS, // ==
    LessGreater, // > <
    SUM, // +, -
    PRODUCT, // *, /
    PREFIX, // -X, !X, ++X
    CALL, // f(x), a.b, x++
    INDEX
}

fn get_precedence(token: TokenType) -> Option<Precedence> {
    match token {
        TokenType::EQ | TokenType::NotEq => Some(Precedence::EQUALS),
        TokenType::LT | TokenType::GT => Some(Precedence::LessGreater),
        TokenType::PLUS | TokenType::MINUS => Some(Precedence::SUM),
        TokenType::ASTERISK | TokenType::SLASH => Some(Precedence::PRODUCT),
        TokenType::LPAREN | TokenType::DOT |
            TokenType::INCREMENT | TokenType::DECREMENT => Some(Precedence::CALL),
        TokenType::LBRACKET => Some(Precedence::INDEX),
        _ => None
    }
}

/// Maps a declaration keyword to the type it declares.
fn data_type_of(token: &Token) -> Option<DataType> {
    match token.token_type {
        TokenType::INT => Some(DataType::Int),
        TokenType::FLOAT => Some(DataType::Float),
        TokenType::CHAR => Some(DataType::Char),
        TokenType::BOOL => Some(DataType::Bool),
        TokenType::VOID => Some(DataType::Void),
        TokenType::CLASS => Some(DataType::Class(token.literal.clone())),
        _ => None,
    }
}

type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> Option<Expression>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, Expression) -> Option<Expression>;

/// Pratt parser. Diagnostics are collected in [`Parser::errors`]; a failed
/// statement is dropped and parsing resumes with the next one.
///
/// `#include` directives are linked as soon as they are parsed, so names a
/// library exports lex as keywords from the very next token on.
pub struct Parser<'a> {
    l: Lexer,
    linker: Option<&'a mut Linker>,
    errors: Vec<String>,

    cur_token: Token,
    peek_token: Token,
}

impl<'a> Parser<'a> {

    pub fn new(l: Lexer) -> Self {
        Self::build(l, None)
    }

    pub fn with_linker(l: Lexer, linker: &'a mut Linker) -> Self {
        Self::build(l, Some(linker))
    }

    fn build(l: Lexer, linker: Option<&'a mut Linker>) -> Self {
        let mut p = Parser {
            l,
            linker,
            errors: Vec::new(),

            cur_token: Token::new(TokenType::EOF, ""),
            peek_token: Token::new(TokenType::EOF, ""),
        };

        // filling the cur_token
        p.next_token();
        p.next_token();

        p
    }

    /// Hands back the keyword table, including classes linked during the parse.
    pub fn into_keywords(self) -> Keywords {
        self.l.into_keywords()
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.l.next_token());
    }

    fn cur_token_is(&self, t: TokenType) -> bool {
        self.cur_token.token_type == t
    }

    fn peek_token_is(&self, t: TokenType) -> bool {
        self.peek_token.token_type == t
    }

    fn expect_peek(&mut self, t: TokenType) -> bool {
        if self.peek_token_is(t) {
            self.next_token();
            true
        } else {
            self.peek_error(t);
            false
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.clone()
    }

    fn peek_error(&mut self, t: TokenType) {
        self.errors.push(format!("expected next token to be {}, got {}",
            t, self.peek_token.token_type))
    }

    fn no_prefix_fn_error(&mut self, t: TokenType) {
        self.errors.push(format!("no prefix parse function for {} found", t))
    }

    pub fn parse_program(&mut self) -> Program {
        let mut p = Program{
            statements: Vec::new(),
        };

        while !self.cur_token_is(TokenType::EOF) {
            if let Some(s) = self.parse_statement() {
                p.statements.push(s)
            }
            self.next_token();
        }
        p
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.token_type {
            // a bare class name is a constructor reference, not a declaration
            TokenType::CLASS if !self.peek_token_is(TokenType::IDENT) => self.parse_expression_statement(),
            t if t.is_data_type() => self.parse_init_statement(),
            TokenType::RETURN => self.parse_return_statement(),
            TokenType::BREAK => self.parse_break_statement(),
            TokenType::SHARP => {
                self.parse_include_directive();
                None
            },
            TokenType::IDENT if self.peek_token.token_type.is_assign() => self.parse_assign_statement(),
            _ => self.parse_expression_statement()
        }
    }

    fn parse_init_statement(&mut self) -> Option<Statement> {
        let data_type = data_type_of(&self.cur_token)?;
        if !self.expect_peek(TokenType::IDENT) {
            return None;
        }
        let name = self.cur_token.literal.clone();

        let value = if self.peek_token_is(TokenType::LPAREN) {
            self.next_token();
            Some(self.parse_function_literal(data_type.clone())?)
        } else if self.peek_token_is(TokenType::ASSIGN) {
            self.next_token();
            self.next_token();
            Some(self.parse_expression(Precedence::LOWEST)?)
        } else if self.peek_token_is(TokenType::SEMICOLON) || self.peek_token_is(TokenType::EOF) ||
            self.peek_token_is(TokenType::RBRACE) {
            None
        } else {
            self.peek_error(TokenType::ASSIGN);
            return None;
        };

        if self.peek_token_is(TokenType::SEMICOLON) {
            self.next_token();
        }
        Some(Statement::InitStatement { data_type, name, value })
    }

    fn parse_assign_statement(&mut self) -> Option<Statement> {
        let name = self.cur_token.literal.clone();
        self.next_token();
        let operation = self.cur_token.literal.clone();
        self.next_token();

        let value = self.parse_expression(Precedence::LOWEST)?;
        if self.peek_token_is(TokenType::SEMICOLON) {
            self.next_token();
        }
        Some(Statement::AssignStatement { name, operation, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        if self.peek_token_is(TokenType::SEMICOLON) {
            self.next_token();
            return Some(Statement::ReturnStatement(None));
        }
        if self.peek_token_is(TokenType::RBRACE) || self.peek_token_is(TokenType::EOF) {
            return Some(Statement::ReturnStatement(None));
        }

        self.next_token();
        let ret_val = self.parse_expression(Precedence::LOWEST)?;
        if self.peek_token_is(TokenType::SEMICOLON) {
            self.next_token();
        }
        Some(Statement::ReturnStatement(Some(ret_val)))
    }

    fn parse_break_statement(&mut self) -> Option<Statement> {
        if self.peek_token_is(TokenType::SEMICOLON) {
            self.next_token();
        }
        Some(Statement::BreakStatement)
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::LOWEST)?;

        if self.peek_token_is(TokenType::SEMICOLON) {
            self.next_token();
        }
        Some(Statement::ExpressionStatement(expression))
    }

    /// `#include <Name.h>`. Produces no node; link failures become diagnostics.
    fn parse_include_directive(&mut self) {
        if !self.expect_peek(TokenType::INCLUDE) || !self.expect_peek(TokenType::LT) {
            return;
        }
        if !self.expect_library_part() {
            return;
        }
        let mut name = self.cur_token.literal.clone();
        while self.peek_token_is(TokenType::DOT) {
            self.next_token();
            if !self.expect_library_part() {
                return;
            }
            name.push('.');
            name.push_str(&self.cur_token.literal);
        }

        match self.linker.as_deref_mut() {
            Some(linker) => {
                if let Err(err) = linker.link_library(&name, self.l.keywords_mut()) {
                    self.errors.push(err.to_string());
                }
            },
            None => self.errors.push(format!("cannot link library {}: no linker attached", name)),
        }

        self.expect_peek(TokenType::GT);
    }

    // already linked class names lex as CLASS
    fn expect_library_part(&mut self) -> bool {
        if self.peek_token_is(TokenType::CLASS) {
            self.next_token();
            return true;
        }
        self.expect_peek(TokenType::IDENT)
    }

    fn prefix_parse_fn(t: TokenType) -> Option<PrefixParseFn<'a>> {
        let f: PrefixParseFn<'a> = match t {
            TokenType::IDENT | TokenType::CLASS => Self::parse_identifier,
            TokenType::INTEGER => Self::parse_integer_literal,
            TokenType::REAL => Self::parse_real_literal,
            TokenType::CHARACTER => Self::parse_character_literal,
            TokenType::STRING => Self::parse_string_literal,
            TokenType::TRUE | TokenType::FALSE => Self::parse_boolean,
            TokenType::MINUS | TokenType::BANG |
                TokenType::INCREMENT | TokenType::DECREMENT => Self::parse_prefix_expression,
            TokenType::LPAREN => Self::parse_grouped_expression,
            TokenType::LBRACKET => Self::parse_array_literal,
            TokenType::LBRACE => Self::parse_hash_literal,
            TokenType::IF => Self::parse_if_expression,
            TokenType::FOR => Self::parse_for_expression,
            TokenType::WHILE => Self::parse_while_expression,
            _ => return None,
        };
        Some(f)
    }

    fn infix_parse_fn(t: TokenType) -> Option<InfixParseFn<'a>> {
        let f: InfixParseFn<'a> = match t {
            TokenType::PLUS | TokenType::MINUS | TokenType::ASTERISK | TokenType::SLASH |
                TokenType::EQ | TokenType::NotEq | TokenType::LT | TokenType::GT |
                TokenType::DOT => Self::parse_infix_expression,
            TokenType::INCREMENT | TokenType::DECREMENT => Self::parse_postfix_expression,
            TokenType::LPAREN => Self::parse_call_expression,
            TokenType::LBRACKET => Self::parse_index_expression,
            _ => return None,
        };
        Some(f)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let prefix = match Self::prefix_parse_fn(self.cur_token.token_type) {
            Some(prefix) => prefix,
            None => {
                self.no_prefix_fn_error(self.cur_token.token_type);
                return None;
            }
        };
        let mut left_exp = prefix(self)?;

        while !self.peek_token_is(TokenType::SEMICOLON) && precedence < self.peek_precedence() {
            let infix = match Self::infix_parse_fn(self.peek_token.token_type) {
                Some(infix) => infix,
                None => return Some(left_exp),
            };
            self.next_token();
            left_exp = infix(self, left_exp)?;
        }
        Some(left_exp)
    }

    fn peek_precedence(&self) -> Precedence {
        get_precedence(self.peek_token.token_type).unwrap_or(Precedence::LOWEST)
    }

    fn cur_precedence(&self) -> Precedence {
        get_precedence(self.cur_token.token_type).unwrap_or(Precedence::LOWEST)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(self.cur_token.literal.clone()))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.cur_token.literal.parse() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(_) => {
                self.errors.push(format!("could not parse {} as integer", self.cur_token.literal));
                None
            }
        }
    }

    fn parse_real_literal(&mut self) -> Option<Expression> {
        match self.cur_token.literal.parse() {
            Ok(value) => Some(Expression::Real(value)),
            Err(_) => {
                self.errors.push(format!("could not parse {} as float", self.cur_token.literal));
                None
            }
        }
    }

    fn parse_character_literal(&mut self) -> Option<Expression> {
        let mut chars = self.cur_token.literal.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(Expression::Character(ch)),
            _ => {
                self.errors.push(format!("could not parse '{}' as char", self.cur_token.literal));
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        Some(Expression::String(self.cur_token.literal.clone()))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::Boolean(self.cur_token_is(TokenType::TRUE)))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let op = self.cur_token.literal.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::PREFIX)?;
        Some(Expression::PrefixExpression {
            operation: op,
            right: Box::new(right)
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let op = self.cur_token.literal.clone();

        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::InfixExpression {
            operation: op,
            left: Box::new(left),
            right: Box::new(right)
        })
    }

    fn parse_postfix_expression(&mut self, left: Expression) -> Option<Expression> {
        Some(Expression::PostfixExpression {
            operation: self.cur_token.literal.clone(),
            left: Box::new(left),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let exp = self.parse_expression(Precedence::LOWEST)?;
        if !self.expect_peek(TokenType::RPAREN) {
            return None;
        }
        Some(exp)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenType::LPAREN) {
            return None;
        }

        self.next_token();
        let condition = self.parse_expression(Precedence::LOWEST)?;
        if !self.expect_peek(TokenType::RPAREN) {
            return None;
        }
        if !self.expect_peek(TokenType::LBRACE) {
            return None;
        }

        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_token_is(TokenType::ELSE) {
            self.next_token();
            if !self.expect_peek(TokenType::LBRACE) {
                return None;
            }
            Some(Box::new(self.parse_block_statement()?))
        } else {
            None
        };
        Some(Expression::IfExpression {
            condition: Box::new(condition),
            consequence: Box::new(consequence),
            alternative,
        })
    }

    /// `for (init; condition; step) { body }`; every clause may be empty.
    fn parse_for_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenType::LPAREN) {
            return None;
        }
        self.next_token();

        let init = if self.cur_token_is(TokenType::SEMICOLON) {
            None
        } else {
            let stmt = self.parse_statement()?;
            if !self.cur_token_is(TokenType::SEMICOLON) && !self.expect_peek(TokenType::SEMICOLON) {
                return None;
            }
            Some(Box::new(stmt))
        };
        self.next_token();

        let condition = if self.cur_token_is(TokenType::SEMICOLON) {
            None
        } else {
            let condition = self.parse_expression(Precedence::LOWEST)?;
            if !self.expect_peek(TokenType::SEMICOLON) {
                return None;
            }
            Some(Box::new(condition))
        };

        let step = if self.peek_token_is(TokenType::RPAREN) {
            None
        } else {
            self.next_token();
            Some(Box::new(self.parse_expression(Precedence::LOWEST)?))
        };

        if !self.expect_peek(TokenType::RPAREN) || !self.expect_peek(TokenType::LBRACE) {
            return None;
        }
        let body = self.parse_block_statement()?;

        Some(Expression::IterationExpression { init, condition, step, body: Box::new(body) })
    }

    fn parse_while_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenType::LPAREN) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::LOWEST)?;
        if !self.expect_peek(TokenType::RPAREN) || !self.expect_peek(TokenType::LBRACE) {
            return None;
        }
        let body = self.parse_block_statement()?;

        Some(Expression::IterationExpression {
            init: None,
            condition: Some(Box::new(condition)),
            step: None,
            body: Box::new(body),
        })
    }

    fn parse_block_statement(&mut self) -> Option<Statement> {
        let mut stmts = Vec::<Statement>::new();
        self.next_token();
        while !self.cur_token_is(TokenType::RBRACE) && !self.cur_token_is(TokenType::EOF) {
            if let Some(st) = self.parse_statement() {
                stmts.push(st);
            }
            self.next_token();
        }
        Some(Statement::BlockStatement(stmts))
    }

    // cur_token is the opening paren
    fn parse_function_literal(&mut self, return_type: DataType) -> Option<Expression> {
        let params = self.parse_function_parameters()?;

        if !self.expect_peek(TokenType::LBRACE) {
            return None;
        }

        let body = self.parse_block_statement()?;

        Some(Expression::Function {
            parameters: params,
            return_type,
            body: Box::new(body)
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Parameter>> {
        let mut params = Vec::new();
        if self.peek_token_is(TokenType::RPAREN) {
            self.next_token();
            return Some(params);
        }
        self.next_token();
        params.push(self.parse_parameter()?);

        while self.peek_token_is(TokenType::COMMA) {
            self.next_token();
            self.next_token();
            params.push(self.parse_parameter()?);
        }

        if !self.expect_peek(TokenType::RPAREN) {
            return None;
        }
        Some(params)
    }

    fn parse_parameter(&mut self) -> Option<Parameter> {
        let data_type = match data_type_of(&self.cur_token) {
            Some(data_type) => data_type,
            None => {
                self.errors.push(format!("expected parameter type, got {}", self.cur_token.token_type));
                return None;
            }
        };
        if !self.expect_peek(TokenType::IDENT) {
            return None;
        }
        Some(Parameter { name: self.cur_token.literal.clone(), data_type })
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let args = self.parse_expression_list(TokenType::RPAREN)?;
        Some(Expression::CallExpression { function: Box::new(function), arguments: args })
    }

    fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_token_is(end) {
            self.next_token();
            return Some(list)
        }
        self.next_token();
        list.push(self.parse_expression(Precedence::LOWEST)?);

        while self.peek_token_is(TokenType::COMMA) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::LOWEST)?);
        }
        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let elements = self.parse_expression_list(TokenType::RBRACKET)?;
        Some(Expression::Array(elements))
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::LOWEST)?;

        if !self.expect_peek(TokenType::RBRACKET) {
            return None;
        }

        Some(Expression::IndexExpression { left: Box::new(left), index: Box::new(index) })
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();

        while !self.peek_token_is(TokenType::RBRACE) {
            self.next_token();
            let key = self.parse_expression(Precedence::LOWEST)?;
            if !self.expect_peek(TokenType::COLON) {
                return None;
            }

            self.next_token();

            let value = self.parse_expression(Precedence::LOWEST)?;
            if !self.peek_token_is(TokenType::RBRACE) && !self.expect_peek(TokenType::COMMA) {
                return None;
            }

            pairs.push((key, value));
        }

        if !self.expect_peek(TokenType::RBRACE) {
            return None;
        }
        Some(Expression::Hash(pairs))
    }
}
