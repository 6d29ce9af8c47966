use std::string::String;
use std::fmt;
use std::fmt::Formatter;
use crate::object::ObjectType;

pub enum Node<'a> {
    Program(&'a Program),
    Statement(&'a Statement),
    Expression(&'a Expression),
}

/// Type keyword a binding or function was declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Int,
    Float,
    Char,
    Bool,
    Void,
    /// A library class, by its exported constructor name.
    Class(String),
}

impl DataType {
    pub fn object_type(&self) -> ObjectType {
        match self {
            DataType::Int => ObjectType::INTEGER_OBJ,
            DataType::Float => ObjectType::REAL_NUMBER_OBJ,
            DataType::Char => ObjectType::CHARACTER_OBJ,
            DataType::Bool => ObjectType::BOOLEAN_OBJ,
            DataType::Void => ObjectType::VOID_OBJ,
            DataType::Class(_) => ObjectType::CLASS_OBJ,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "int"),
            DataType::Float => write!(f, "float"),
            DataType::Char => write!(f, "char"),
            DataType::Bool => write!(f, "bool"),
            DataType::Void => write!(f, "void"),
            DataType::Class(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub data_type: DataType,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.data_type, self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for stmt in self.statements.iter() {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    InitStatement{data_type: DataType, name: String, value: Option<Expression>},
    /// `operation` is the assignment token itself: `=`, `+=`, `-=`, `*=` or `/=`.
    AssignStatement{name: String, operation: String, value: Expression},
    ReturnStatement(Option<Expression>),
    BreakStatement,
    ExpressionStatement(Expression),
    BlockStatement(Vec<Statement>)
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Statement::InitStatement { data_type, name, value } => match value {
                Some(Expression::Function { parameters, body, .. }) => {
                    write!(f, "{} {}({}) {{{}}}", data_type, name, join(parameters), body)?
                },
                Some(value) => write!(f, "{} {} = {}", data_type, name, value)?,
                None => write!(f, "{} {}", data_type, name)?,
            },
            Statement::AssignStatement { name, operation, value } => {
                write!(f, "{} {} {}", name, operation, value)?
            },
            Statement::ReturnStatement(ret) => match ret {
                Some(ret) => write!(f, "return {}", ret)?,
                None => write!(f, "return")?,
            },
            Statement::BreakStatement => write!(f, "break")?,
            Statement::ExpressionStatement(exp) => {
                write!(f, "{}", exp)?
            },
            Statement::BlockStatement(block) => {
                for stmt in block.iter() {
                    write!(f, "{}", stmt)?
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    Boolean(bool),
    Integer(i64),
    Real(f32),
    Character(char),
    String(String),
    Array(Vec<Expression>),
    Hash(Vec<(Expression, Expression)>),
    PrefixExpression{
        operation: String,
        right: Box<Expression>
    },
    InfixExpression {
        operation: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    PostfixExpression {
        operation: String,
        left: Box<Expression>,
    },
    IfExpression{
        condition: Box<Expression>,
        consequence: Box<Statement>,
        alternative: Option<Box<Statement>>,
    },
    /// `for` fills every clause; `while` leaves `init` and `step` empty.
    IterationExpression{
        init: Option<Box<Statement>>,
        condition: Option<Box<Expression>>,
        step: Option<Box<Expression>>,
        body: Box<Statement>,
    },
    Function{
        parameters: Vec<Parameter>,
        return_type: DataType,
        body: Box<Statement>,
    },
    CallExpression{
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    IndexExpression{
        left: Box<Expression>,
        index: Box<Expression>,
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => {write!(f, "{}", ident)},
            Expression::Boolean(b) => {write!(f, "{}", b)},
            Expression::Integer(int) => {write!(f, "{}", int)},
            Expression::Real(real) => {write!(f, "{}", real)},
            Expression::Character(ch) => {write!(f, "'{}'", ch)},
            Expression::String(st) => {write!(f, "{}", st)},
            Expression::Array(exps) => {
                write!(f, "[{}]", join(exps))
            },
            Expression::Hash(pairs) => {
                write!(f, "{{{}}}", pairs.iter().
                    map(|(k, v)| format!("{}: {}", k, v)).
                    collect::<Vec<_>>().join(", "))
            },
            Expression::PrefixExpression { operation, right } => {
                write!(f, "({}{})", operation, right)
            },
            Expression::InfixExpression { operation, left, right } => {
                if operation == "." {
                    write!(f, "{}.{}", left, right)
                } else {
                    write!(f, "({} {} {})", left, operation, right)
                }
            },
            Expression::PostfixExpression { operation, left } => {
                write!(f, "({}{})", left, operation)
            },
            Expression::IfExpression { condition, consequence, alternative } => {
                write!(f, "if {} {{{}}}{}", condition, consequence,
                       match alternative {
                           None => {
                               "".to_string()
                           },
                           Some(alt) => {
                               format!(" else {{{}}}", alt)
                           }
                       })
            },
            Expression::IterationExpression { init, condition, step, body } => {
                let clause = |c: Option<String>| c.unwrap_or_default();
                write!(f, "for ({}; {}; {}) {{{}}}",
                    clause(init.as_ref().map(|s| s.to_string())),
                    clause(condition.as_ref().map(|c| c.to_string())),
                    clause(step.as_ref().map(|s| s.to_string())),
                    body
                )
            },
            Expression::Function { parameters, return_type, body } => {
                write!(f, "{} ({}) {{{}}}", return_type, join(parameters), body)
            },
            Expression::CallExpression { function, arguments } => {
                write!(f, "{}({})", function, join(arguments))
            }
            Expression::IndexExpression { left, index} => {
                write!(f, "({}[{}])", left, index)
            }
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod test {
    use crate::ast::{DataType, Expression, Parameter, Program, Statement};

    #[test]
    fn test_ast() {
        let program = Program {
            statements: vec![
                Statement::InitStatement {
                    data_type: DataType::Int,
                    name: "a".to_string(),
                    value: Some(Expression::Integer(12)),
                }
            ],
        };

        let out = format!("{}", program);
        assert_eq!(out, "int a = 12")
    }

    #[test]
    fn test_assign_statement_display() {
        let stmt = Statement::AssignStatement {
            name: "x".to_string(),
            operation: "+=".to_string(),
            value: Expression::InfixExpression {
                operation: "*".to_string(),
                left: Box::new(Expression::Identifier("a".to_string())),
                right: Box::new(Expression::Integer(2)),
            },
        };
        assert_eq!(stmt.to_string(), "x += (a * 2)");
    }

    #[test]
    fn test_function_declaration_display() {
        let stmt = Statement::InitStatement {
            data_type: DataType::Int,
            name: "add".to_string(),
            value: Some(Expression::Function {
                parameters: vec![
                    Parameter { name: "a".to_string(), data_type: DataType::Int },
                    Parameter { name: "b".to_string(), data_type: DataType::Float },
                ],
                return_type: DataType::Int,
                body: Box::new(Statement::BlockStatement(vec![
                    Statement::ReturnStatement(Some(Expression::Identifier("a".to_string()))),
                ])),
            }),
        };
        assert_eq!(stmt.to_string(), "int add(int a, float b) {return a}");
    }
}
