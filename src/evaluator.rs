use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, warn};
use crate::ast::{DataType, Expression, Node, Parameter, Program, Statement};
use crate::builtin::Builtins;
use crate::config::Config;
use crate::environment::{coerce, Env, Environment};
use crate::error::EvalError;
use crate::object::{Function, HashKey, HashPair, Object, ObjectType};

/// Tree-walking evaluator. Every outcome, including failure, is an [`Object`];
/// `ReturnValue`, `Break` and `Error` travel outward as ordinary values.
pub struct Evaluator {
    builtins: Rc<RefCell<Builtins>>,
    max_iterations: usize,
    max_call_depth: usize,
    depth: usize,
}

impl Evaluator {
    pub fn new(builtins: Rc<RefCell<Builtins>>) -> Self {
        Self::with_config(builtins, &Config::default())
    }

    pub fn with_config(builtins: Rc<RefCell<Builtins>>, config: &Config) -> Self {
        Evaluator {
            builtins,
            max_iterations: config.max_iterations,
            max_call_depth: config.max_call_depth,
            depth: 0,
        }
    }

    pub fn eval(&mut self, node: Node, env: &Env) -> Object {
        match node {
            Node::Program(program) => self.eval_program(program, env),
            Node::Statement(stmt) => match stmt {
                Statement::BlockStatement(b) => self.eval_block_statement(b, env),
                Statement::ExpressionStatement(exp) => self.eval(Node::Expression(exp), env),
                Statement::ReturnStatement(r) => {
                    let val = match r {
                        Some(r) => self.eval(Node::Expression(r), env),
                        None => Object::Null,
                    };
                    if val.is_error() {
                        return val;
                    }
                    Object::ReturnValue(Box::new(val))
                },
                Statement::BreakStatement => Object::Break,
                Statement::InitStatement { data_type, name, value } => {
                    self.eval_init_statement(data_type, name, value.as_ref(), env)
                },
                Statement::AssignStatement { name, operation, value } => {
                    self.eval_assign_statement(name, operation, value, env)
                },
            },
            Node::Expression(exp) => match exp {
                Expression::Integer(i) => Object::Integer(*i),
                Expression::Real(r) => Object::RealNumber(*r),
                Expression::Character(c) => Object::Character(*c),
                Expression::String(s) => Object::String(s.clone()),
                Expression::Boolean(b) => Object::Boolean(*b),
                Expression::Identifier(s) => self.eval_identifier(s, env),
                Expression::PrefixExpression { operation, right } => {
                    if operation == "++" || operation == "--" {
                        return self.eval_increment(operation, right, true, env);
                    }
                    let right = self.eval(Node::Expression(right), env);
                    if right.is_error() {
                        return right;
                    }
                    eval_prefix_expression(operation, right)
                },
                Expression::PostfixExpression { operation, left } => {
                    self.eval_increment(operation, left, false, env)
                },
                Expression::InfixExpression { operation, left, right } => {
                    let left = self.eval(Node::Expression(left), env);
                    if left.is_error() {
                        return left;
                    }
                    if operation == "." {
                        return eval_member_access(left, right);
                    }
                    let right = self.eval(Node::Expression(right), env);
                    if right.is_error() {
                        return right;
                    }
                    eval_infix_expression(operation, left, right)
                },
                Expression::IfExpression { condition, consequence, alternative } => {
                    self.eval_if_expression(condition, consequence, alternative.as_deref(), env)
                },
                Expression::IterationExpression { init, condition, step, body } => {
                    self.eval_iteration_expression(
                        init.as_deref(), condition.as_deref(), step.as_deref(), body, env)
                },
                Expression::Function { parameters, return_type, body } => {
                    Object::Function(Rc::new(Function {
                        parameters: parameters.clone(),
                        return_type: return_type.clone(),
                        body: (**body).clone(),
                        env: Rc::clone(env),
                    }))
                },
                Expression::CallExpression { function, arguments } => {
                    let function = self.eval(Node::Expression(function), env);
                    if function.is_error() {
                        return function;
                    }
                    match self.eval_expressions(arguments, env) {
                        Ok(args) => self.apply_function(function, args),
                        Err(err) => err,
                    }
                },
                Expression::Array(exps) => match self.eval_expressions(exps, env) {
                    Ok(elements) => Object::Array(elements),
                    Err(err) => err,
                },
                Expression::IndexExpression { left, index } => {
                    let left = self.eval(Node::Expression(left), env);
                    if left.is_error() {
                        return left;
                    }
                    let index = self.eval(Node::Expression(index), env);
                    if index.is_error() {
                        return index;
                    }
                    eval_index_expression(left, index)
                },
                Expression::Hash(pairs) => self.eval_hash_literal(pairs, env),
            },
        }
    }

    fn eval_program(&mut self, program: &Program, env: &Env) -> Object {
        let mut result = Object::Null;

        for stmt in program.statements.iter() {
            result = self.eval(Node::Statement(stmt), env);

            match result {
                Object::ReturnValue(ret) => return *ret,
                Object::Error(_) => return result,
                // a stray break ends the program
                Object::Break => return Object::Null,
                _ => {}
            }
        }
        result
    }

    fn eval_block_statement(&mut self, block: &[Statement], env: &Env) -> Object {
        let mut result = Object::Null;

        for stmt in block {
            result = self.eval(Node::Statement(stmt), env);

            match result {
                Object::ReturnValue(_) | Object::Error(_) | Object::Break => return result,
                _ => {},
            }
        }

        result
    }

    fn eval_init_statement(&mut self, data_type: &DataType, name: &str, value: Option<&Expression>, env: &Env) -> Object {
        let declared = match value {
            None => env.borrow_mut().declare_default(name, data_type.clone()),
            Some(value) => {
                let val = self.eval(Node::Expression(value), env);
                if val.is_error() {
                    return val;
                }
                env.borrow_mut().declare(name, val, data_type.clone())
            },
        };
        declared.unwrap_or_else(Object::from)
    }

    fn eval_assign_statement(&mut self, name: &str, operation: &str, value: &Expression, env: &Env) -> Object {
        let val = self.eval(Node::Expression(value), env);
        if val.is_error() {
            return val;
        }

        let val = match operation.strip_suffix('=').filter(|op| !op.is_empty()) {
            None => val,
            Some(op) => {
                let current = match env.borrow().get(name) {
                    Some(current) => current,
                    None => return EvalError::NotDeclared(name.to_string()).into(),
                };
                let combined = eval_compound(op, current, val);
                if combined.is_error() {
                    return combined;
                }
                combined
            },
        };

        // bind before matching so the borrow ends here
        let result = env.borrow_mut().set(name, val);
        result.unwrap_or_else(Object::from)
    }

    fn eval_identifier(&self, identifier: &str, env: &Env) -> Object {
        if let Some(obj) = env.borrow().get(identifier) {
            return obj;
        }
        match self.builtins.borrow().look_up(identifier) {
            Some(builtin) => builtin,
            None => EvalError::IdentifierNotFound(identifier.to_string()).into(),
        }
    }

    /// Prefix and postfix `++`/`--`. The operand must name a numeric binding;
    /// prefix yields the stored result, postfix the value before the update.
    fn eval_increment(&mut self, operation: &str, operand: &Expression, prefix: bool, env: &Env) -> Object {
        let unknown = |obj: &Object| -> Object {
            if prefix {
                EvalError::UnknownPrefixOperator { operation: operation.to_string(), right: obj.object_type() }.into()
            } else {
                EvalError::UnknownPostfixOperator { left: obj.object_type(), operation: operation.to_string() }.into()
            }
        };

        let current = self.eval(Node::Expression(operand), env);
        if current.is_error() {
            return current;
        }
        let name = match operand {
            Expression::Identifier(name) => name,
            _ => return unknown(&current),
        };
        let delta = if operation == "++" { 1 } else { -1 };
        let updated = match &current {
            Object::Integer(i) => match i.checked_add(delta) {
                Some(i) => Object::Integer(i),
                // past the i64 range the binding's coercion saturates
                None => Object::RealNumber(*i as f32 + delta as f32),
            },
            Object::RealNumber(_) | Object::Character(_) | Object::Boolean(_) => match current.as_f32() {
                Some(v) => Object::RealNumber(v + delta as f32),
                None => return unknown(&current),
            },
            _ => return unknown(&current),
        };

        let stored = env.borrow_mut().set(name, updated);
        match stored {
            Ok(stored) if prefix => stored,
            Ok(_) => current,
            Err(err) => err.into(),
        }
    }

    fn eval_if_expression(
        &mut self,
        condition: &Expression,
        consequence: &Statement,
        alternative: Option<&Statement>,
        outer: &Env,
    ) -> Object {
        let env = Environment::new_enclosed(outer);
        let condition = self.eval(Node::Expression(condition), &env);
        if condition.is_error() {
            return condition;
        }

        if is_truthy(&condition) {
            self.eval(Node::Statement(consequence), &env)
        } else {
            match alternative {
                None => Object::Null,
                Some(st) => self.eval(Node::Statement(st), &env)
            }
        }
    }

    /// Runs `for` and `while`. Each pass checks the condition, then the step,
    /// then runs the body in a fresh scope under the loop scope.
    fn eval_iteration_expression(
        &mut self,
        init: Option<&Statement>,
        condition: Option<&Expression>,
        step: Option<&Expression>,
        body: &Statement,
        outer: &Env,
    ) -> Object {
        let env = Environment::new_enclosed(outer);
        if let Some(init) = init {
            let init = self.eval(Node::Statement(init), &env);
            if init.is_error() {
                return init;
            }
        }

        let mut count = 0;
        loop {
            if let Some(condition) = condition {
                let condition = self.eval(Node::Expression(condition), &env);
                if condition.is_error() {
                    return condition;
                }
                if !is_truthy(&condition) {
                    break;
                }
            }

            count += 1;
            if count > self.max_iterations {
                warn!("loop aborted after {} iterations", self.max_iterations);
                return EvalError::IterationLimit(self.max_iterations).into();
            }

            if let Some(step) = step {
                let stepped = self.eval(Node::Expression(step), &env);
                if stepped.is_error() {
                    return stepped;
                }
            }

            let scope = Environment::new_enclosed(&env);
            match self.eval(Node::Statement(body), &scope) {
                Object::Break => break,
                result @ (Object::Error(_) | Object::ReturnValue(_)) => return result,
                _ => {},
            }
        }
        Object::Null
    }

    fn eval_expressions(&mut self, exps: &[Expression], env: &Env) -> Result<Vec<Object>, Object> {
        let mut result = Vec::with_capacity(exps.len());

        for exp in exps {
            let evaluated = self.eval(Node::Expression(exp), env);
            if evaluated.is_error() {
                return Err(evaluated);
            }
            result.push(evaluated);
        }
        Ok(result)
    }

    fn eval_hash_literal(&mut self, kv: &[(Expression, Expression)], env: &Env) -> Object {
        let mut pairs = BTreeMap::<HashKey, HashPair>::new();
        for (key, value) in kv {
            let key = self.eval(Node::Expression(key), env);
            if key.is_error() {
                return key;
            }
            let hashed_key = match HashKey::get_key(&key) {
                Some(hashed_key) => hashed_key,
                None => return EvalError::UnusableHashKey(key.object_type()).into(),
            };

            let value = self.eval(Node::Expression(value), env);
            if value.is_error() {
                return value;
            }

            pairs.insert(hashed_key, HashPair { key, value });
        }
        Object::Hash(pairs)
    }

    fn apply_function(&mut self, function: Object, args: Vec<Object>) -> Object {
        match function {
            Object::Function(func) => {
                if args.len() != func.parameters.len() {
                    return EvalError::WrongArgumentCount { got: args.len(), want: func.parameters.len() }.into();
                }
                if self.depth >= self.max_call_depth {
                    warn!("call aborted at depth {}", self.depth);
                    return EvalError::CallDepthLimit(self.max_call_depth).into();
                }

                let env = match extend_function_env(&func.parameters, &func.env, args) {
                    Ok(env) => env,
                    Err(err) => return err.into(),
                };

                self.depth += 1;
                debug!(depth = self.depth, "calling {} function", func.return_type);
                let result = self.eval(Node::Statement(&func.body), &env);
                self.depth -= 1;

                match result {
                    Object::ReturnValue(ret) if func.return_type != DataType::Void => {
                        coerce(*ret, &func.return_type).unwrap_or_else(Object::from)
                    },
                    Object::ReturnValue(ret) => *ret,
                    Object::Break => Object::Null,
                    other => other,
                }
            },
            Object::HostFunction(hf) => hf.call(args),
            other => EvalError::NotAFunction(other.object_type()).into(),
        }
    }
}

fn extend_function_env(parameters: &[Parameter], outer: &Env, args: Vec<Object>) -> Result<Env, EvalError> {
    let env = Environment::new_enclosed(outer);
    for (param, arg) in parameters.iter().zip(args) {
        env.borrow_mut().declare(&param.name, arg, param.data_type.clone())?;
    }
    Ok(env)
}

fn is_truthy(obj: &Object) -> bool {
    match obj {
        Object::Null => false,
        Object::Boolean(b) => *b,
        _ => true,
    }
}

/// Operands of arithmetic and comparison operators.
fn is_numeric(obj: &Object) -> bool {
    matches!(obj, Object::Integer(_) | Object::RealNumber(_) | Object::Character(_))
}

fn eval_prefix_expression(operation: &str, right: Object) -> Object {
    match operation {
        "!" => eval_bang_expression(right),
        "-" => eval_minus_prefix_expression(right),
        _ => EvalError::UnknownPrefixOperator { operation: operation.to_string(), right: right.object_type() }.into(),
    }
}

fn eval_bang_expression(right: Object) -> Object {
    match right {
        Object::Boolean(b) => Object::Boolean(!b),
        Object::Null => Object::Boolean(true),
        _ => Object::Boolean(false)
    }
}

fn eval_minus_prefix_expression(right: Object) -> Object {
    match right.as_f32() {
        Some(v) => Object::RealNumber(-v),
        _ => EvalError::UnknownPrefixOperator { operation: "-".to_string(), right: right.object_type() }.into(),
    }
}

fn eval_infix_expression(operation: &str, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::String(l), Object::String(r)) => eval_string_infix_expression(operation, l, r),
        (l, r) if is_numeric(l) && is_numeric(r) => match (l.as_f32(), r.as_f32()) {
            (Some(l), Some(r)) => eval_numeric_infix_expression(operation, l, r),
            _ => unknown_infix(operation, &left, &right),
        },
        _ => match operation {
            "==" => Object::Boolean(left == right),
            "!=" => Object::Boolean(left != right),
            _ if left.object_type() != right.object_type() => EvalError::TypeMismatch {
                left: left.object_type(),
                operation: operation.to_string(),
                right: right.object_type(),
            }.into(),
            _ => unknown_infix(operation, &left, &right),
        },
    }
}

fn unknown_infix(operation: &str, left: &Object, right: &Object) -> Object {
    EvalError::UnknownInfixOperator {
        left: left.object_type(),
        operation: operation.to_string(),
        right: right.object_type().to_string(),
    }.into()
}

fn eval_numeric_infix_expression(operation: &str, left: f32, right: f32) -> Object {
    match operation {
        "+" => Object::RealNumber(left + right),
        "-" => Object::RealNumber(left - right),
        "*" => Object::RealNumber(left * right),
        "/" => Object::RealNumber(left / right),
        "<" => Object::Boolean(left < right),
        ">" => Object::Boolean(left > right),
        "==" => Object::Boolean(left == right),
        "!=" => Object::Boolean(left != right),
        _ => EvalError::UnknownInfixOperator {
            left: ObjectType::REAL_NUMBER_OBJ,
            operation: operation.to_string(),
            right: ObjectType::REAL_NUMBER_OBJ.to_string(),
        }.into(),
    }
}

fn eval_string_infix_expression(operation: &str, left: &str, right: &str) -> Object {
    match operation {
        "+" => Object::String(format!("{}{}", left, right)),
        _ => EvalError::UnknownInfixOperator {
            left: ObjectType::STRING_OBJ,
            operation: operation.to_string(),
            right: ObjectType::STRING_OBJ.to_string(),
        }.into(),
    }
}

/// `+=` and friends: booleans count as 0/1 here, strings only concatenate.
fn eval_compound(operation: &str, current: Object, value: Object) -> Object {
    if let (Object::String(l), Object::String(r)) = (&current, &value) {
        return eval_string_infix_expression(operation, l, r);
    }
    match (current.as_f32(), value.as_f32()) {
        (Some(l), Some(r)) => eval_numeric_infix_expression(operation, l, r),
        _ => EvalError::TypeMismatch {
            left: current.object_type(),
            operation: format!("{}=", operation),
            right: value.object_type(),
        }.into(),
    }
}

fn eval_member_access(left: Object, right: &Expression) -> Object {
    match (&left, right) {
        (Object::Class(class), Expression::Identifier(member)) => {
            let found = class.env.borrow().get(member);
            found.unwrap_or_else(|| EvalError::IdentifierNotFound(member.to_string()).into())
        },
        _ => EvalError::UnknownInfixOperator {
            left: left.object_type(),
            operation: ".".to_string(),
            right: right.to_string(),
        }.into(),
    }
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (&left, &index) {
        (Object::Array(arr), Object::Integer(i)) => eval_array_index(arr, *i),
        (Object::Hash(hash), _) => eval_hash_index(hash, &index),
        _ => EvalError::IndexNotSupported(left.object_type()).into(),
    }
}

fn eval_array_index(arr: &[Object], index: i64) -> Object {
    usize::try_from(index)
        .ok()
        .and_then(|i| arr.get(i))
        .cloned()
        .unwrap_or(Object::Null)
}

fn eval_hash_index(hash: &BTreeMap<HashKey, HashPair>, index: &Object) -> Object {
    match HashKey::get_key(index) {
        Some(key) => hash.get(&key).map(|pair| pair.value.clone()).unwrap_or(Object::Null),
        None => EvalError::UnusableHashKey(index.object_type()).into(),
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;
    use crate::ast::Node;
    use crate::builtin::Builtins;
    use crate::config::Config;
    use crate::environment::Environment;
    use crate::evaluator::Evaluator;
    use crate::lexer::Lexer;
    use crate::object::Object;
    use crate::parser::Parser;

    #[test]
    fn test_eval_number() {
        struct Test<'a> {
            input: &'a str,
            expected: f32,
        }
        let tests = vec![
            Test{input: "5", expected: 5.0},
            Test{input: "2.5", expected: 2.5},
            Test{input: "-5", expected: -5.0},
            Test{input: "5 + 5 + 5 + 5 - 10", expected: 10.0},
            Test{input: "2 * (5 + 10)", expected: 30.0},
            Test{input: "5 + 5*5", expected: 30.0},
            Test{input: "(5 + 10 * 2 + 15 / 3) * 2 + -10", expected: 50.0},
            Test{input: "7 / 2", expected: 3.5},
            Test{input: "'a' + 1", expected: 98.0},
            Test{input: "-true", expected: -1.0},
            Test{input: "bool b = true; -b", expected: -1.0},
            Test{input: "-'a'", expected: -97.0},
        ];

        for tt in tests {
            test_number(tt.input, tt.expected);
        }
    }

    #[test]
    fn test_literals_keep_their_type() {
        assert_eq!(test_eval("5"), Object::Integer(5));
        assert_eq!(test_eval("2.5"), Object::RealNumber(2.5));
        assert_eq!(test_eval("'x'"), Object::Character('x'));
        assert_eq!(test_eval("1 + 1"), Object::RealNumber(2.0));
    }

    #[test]
    fn test_eval_bool() {
        struct Test<'a> {
            input: &'a str,
            expected: bool,
        }
        let tests = vec![
            Test{input: "true", expected: true},
            Test{input: "false", expected: false},
            Test{input: "1 < 2", expected: true},
            Test{input: "1 > 2", expected: false},
            Test{input: "1 == 1", expected: true},
            Test{input: "1 != 1", expected: false},
            Test{input: "1 == 1.0", expected: true},
            Test{input: "'a' < 'b'", expected: true},
            Test{input: "true == true", expected: true},
            Test{input: "true != false", expected: true},
            Test{input: "(1 < 2) == true", expected: true},
            Test{input: "5 == true", expected: false},
            Test{input: "[1, 2] == [1, 2]", expected: true},
        ];

        for tt in tests {
            assert_eq!(test_eval(tt.input), Object::Boolean(tt.expected), "{}", tt.input);
        }
    }

    #[test]
    fn test_eval_bang_op() {
        struct Test<'a> {
            input: &'a str,
            expected: bool,
        }
        let tests = vec![
            Test{input: "!true", expected: false},
            Test{input: "!false", expected: true},
            Test{input: "!5", expected: false},
            Test{input: "!0", expected: false},
            Test{input: "!!true", expected: true},
            Test{input: "!!5", expected: true},
        ];

        for tt in tests {
            assert_eq!(test_eval(tt.input), Object::Boolean(tt.expected), "{}", tt.input);
        }
    }

    #[test]
    fn test_eval_if_expression() {
        struct Test<'a> {
            input: &'a str,
            expected: Object,
        }
        let tests = vec![
            Test{input: "if (true) { 10 }", expected: Object::Integer(10)},
            Test{input: "if (false) { 10 }", expected: Object::Null},
            Test{input: "if (1) { 10 }", expected: Object::Integer(10)},
            Test{input: "if (0) { 10 }", expected: Object::Integer(10)},
            Test{input: "if (1 < 2) { 10 }", expected: Object::Integer(10)},
            Test{input: "if (1 > 2) { 10 } else { 20 }", expected: Object::Integer(20)},
        ];

        for tt in tests {
            assert_eq!(test_eval(tt.input), tt.expected, "{}", tt.input);
        }
    }

    #[test]
    fn test_eval_return_statement() {
        struct Test<'a> {
            input: &'a str,
            expected: Object,
        }
        let tests = vec![
            Test{input: "return 10;", expected: Object::Integer(10)},
            Test{input: "return 10; 9;", expected: Object::Integer(10)},
            Test{input: "9; return 10; 9;", expected: Object::Integer(10)},
            Test{input: "if (10 > 1) { if (10 > 1) { return 10; } return 1; }", expected: Object::Integer(10)},
            Test{input: "return;", expected: Object::Null},
            Test{input: "break; 5", expected: Object::Null},
        ];

        for tt in tests {
            assert_eq!(test_eval(tt.input), tt.expected, "{}", tt.input);
        }
    }

    #[test]
    fn test_error_handling() {
        struct Test<'a> {
            input: &'a str,
            expected: &'a str,
        }
        let tests = vec![
            Test{input: "5 + true;", expected: "type mismatch: INTEGER_OBJ + BOOLEAN_OBJ"},
            Test{input: "5 + true; 5;", expected: "type mismatch: INTEGER_OBJ + BOOLEAN_OBJ"},
            Test{input: r#"-"a""#, expected: "unknown operator: -STRING_OBJ"},
            Test{input: "true + false;", expected: "unknown operator: BOOLEAN_OBJ + BOOLEAN_OBJ"},
            Test{input: "if (10 > 1) { true + false; }", expected: "unknown operator: BOOLEAN_OBJ + BOOLEAN_OBJ"},
            Test{input: "foobar", expected: "identifier not found: foobar"},
            Test{input: r#""Hello" - "World""#, expected: "unknown operator: STRING_OBJ - STRING_OBJ"},
            Test{input: r#""a" == "a""#, expected: "unknown operator: STRING_OBJ == STRING_OBJ"},
            Test{input: "{[1]: 2}", expected: "unusable as hash key: ARRAY_OBJ"},
            Test{input: "int x = 1; int x = 2;", expected: "'x' was already declared in this scope"},
            Test{input: "y = 3;", expected: "'y' was not declared in this scope"},
            Test{input: "y += 3;", expected: "'y' was not declared in this scope"},
            Test{input: r#"int x = "a";"#, expected: "invalid conversion from 'STRING_OBJ' to 'INTEGER_OBJ'"},
            Test{input: r#"int x = 1; x += "a";"#, expected: "type mismatch: INTEGER_OBJ += STRING_OBJ"},
            Test{input: "5(1)", expected: "not a function: INTEGER_OBJ"},
            Test{input: "1[0]", expected: "index operator not supported: INTEGER_OBJ"},
            Test{input: "int f(int a) { a } f(1, 2)", expected: "wrong number of arguments. got=2, want=1"},
            Test{input: "int a = 1; a.foo", expected: "unknown operator: INTEGER_OBJ . foo"},
            Test{input: "x++", expected: "identifier not found: x"},
            Test{input: r#""a"++"#, expected: "unknown operator: STRING_OBJ++"},
            Test{input: "++true", expected: "unknown operator: ++BOOLEAN_OBJ"},
            Test{input: "while (true) { }", expected: "stack overflow: iteration limit of 100 exceeded"},
            Test{input: "int f(int n) { return f(n + 1); } f(0)", expected: "stack overflow: call depth limit of 64 exceeded"},
        ];

        for tt in tests {
            match test_eval(tt.input) {
                Object::Error(msg) => assert_eq!(msg, tt.expected, "{}", tt.input),
                other => panic!("{}: no error object returned, got {}", tt.input, other),
            }
        }
    }

    #[test]
    fn test_declarations_coerce() {
        struct Test<'a> {
            input: &'a str,
            expected: Object,
        }
        let tests = vec![
            Test{input: "int x = 5; x += 1; x;", expected: Object::Integer(6)},
            Test{input: "float f = 1; f", expected: Object::RealNumber(1.0)},
            Test{input: "int i = 3.9; i", expected: Object::Integer(3)},
            Test{input: "char c = 66; c", expected: Object::Character('B')},
            Test{input: "int i = -1; char c = i; c", expected: Object::Character('\u{ffff}')},
            Test{input: "char c = 55296; c", expected: Object::Character(char::REPLACEMENT_CHARACTER)},
            Test{input: "bool b = 2; b", expected: Object::Boolean(true)},
            Test{input: "int x; x", expected: Object::Integer(0)},
            Test{input: "int x = 5; x = 2.7; x", expected: Object::Integer(2)},
            Test{input: "int x = 10; x /= 4; x", expected: Object::Integer(2)},
            Test{input: "float y = 10; y /= 4; y", expected: Object::RealNumber(2.5)},
            Test{input: "int x = 1; x *= true; x", expected: Object::Integer(1)},
            Test{input: "int x = 3; x -= 5; x", expected: Object::Integer(-2)},
            Test{input: "int x = 5;", expected: Object::Integer(5)},
        ];

        for tt in tests {
            assert_eq!(test_eval(tt.input), tt.expected, "{}", tt.input);
        }
    }

    #[test]
    fn test_scopes() {
        struct Test<'a> {
            input: &'a str,
            expected: Object,
        }
        let tests = vec![
            Test{input: "int x = 1; if (true) { int x = 2; x += 5; } x", expected: Object::Integer(1)},
            Test{input: "int x = 1; if (true) { x = 2; } x", expected: Object::Integer(2)},
            Test{input: "if (true) { int inner = 2; } inner", expected: Object::Error("identifier not found: inner".to_string())},
            Test{input: "for (int i = 0; i < 3; i++) { } i", expected: Object::Error("identifier not found: i".to_string())},
        ];

        for tt in tests {
            assert_eq!(test_eval(tt.input), tt.expected, "{}", tt.input);
        }
    }

    #[test]
    fn test_increment_decrement() {
        struct Test<'a> {
            input: &'a str,
            expected: Object,
        }
        let tests = vec![
            Test{input: "int i = 5; i++", expected: Object::Integer(5)},
            Test{input: "int i = 5; i++; i", expected: Object::Integer(6)},
            Test{input: "int i = 5; ++i", expected: Object::Integer(6)},
            Test{input: "int i = 5; --i; i--; i", expected: Object::Integer(3)},
            Test{input: "float f = 0.5; ++f", expected: Object::RealNumber(1.5)},
            Test{input: "char c = 'a'; c++; c", expected: Object::Character('b')},
            Test{input: "int x = 9223372036854775807; x++; x", expected: Object::Integer(i64::MAX)},
            Test{input: "int x = 9223372036854775807; ++x", expected: Object::Integer(i64::MAX)},
        ];

        for tt in tests {
            assert_eq!(test_eval(tt.input), tt.expected, "{}", tt.input);
        }
    }

    #[test]
    fn test_functions() {
        struct Test<'a> {
            input: &'a str,
            expected: Object,
        }
        let tests = vec![
            Test{input: "int add(int a, int b) { return a + b; } add(2, 3)", expected: Object::Integer(5)},
            Test{input: "float half(int a) { return a / 2; } half(5)", expected: Object::RealNumber(2.5)},
            Test{input: "int half(int a) { return a / 2; } half(5)", expected: Object::Integer(2)},
            Test{input: "int id(int a) { a * 1 } id(3)", expected: Object::RealNumber(3.0)},
            Test{input: "int trunc(int a) { a } trunc(3.7)", expected: Object::Integer(3)},
            Test{input: "void nothing() { return; } nothing()", expected: Object::Null},
            Test{input: "int fact(int n) { if (n < 2) { return 1; } return n * fact(n - 1); } fact(5)", expected: Object::Integer(120)},
            Test{input: "int first() { for (;;) { return 7; } } first()", expected: Object::Integer(7)},
            Test{input: "int x = 10; int getX() { return x; } x = 20; getX()", expected: Object::Integer(20)},
        ];

        for tt in tests {
            assert_eq!(test_eval(tt.input), tt.expected, "{}", tt.input);
        }
    }

    #[test]
    fn test_function_type_conversion() {
        match test_eval("int f() { return 1; } float g = f;") {
            Object::Error(msg) => assert_eq!(msg, "invalid return type: function returns 'int', expected 'float'"),
            other => panic!("no error object returned, got {}", other),
        }
    }

    #[test]
    fn test_loops() {
        struct Test<'a> {
            input: &'a str,
            expected: Object,
        }
        let tests = vec![
            // the step runs before each body
            Test{input: "int sum = 0; for (int i = 0; i < 3; i++) { sum += i; } sum", expected: Object::Integer(6)},
            Test{input: "int n = 0; while (n < 5) { n++; } n", expected: Object::Integer(5)},
            Test{input: "int n = 0; while (true) { n++; if (n == 3) { break; } } n", expected: Object::Integer(3)},
            Test{input: "int n = 0; for (;;) { n += 2; if (n > 7) { break; } } n", expected: Object::Integer(8)},
            Test{input: "while (false) { }", expected: Object::Null},
            Test{input: "int n = 0; while (n < 100) { n++; } n", expected: Object::Integer(100)},
            Test{input: "int n = 0; while (true) { int local = n; n++; if (local == 4) { break; } } n", expected: Object::Integer(5)},
        ];

        for tt in tests {
            assert_eq!(test_eval(tt.input), tt.expected, "{}", tt.input);
        }
    }

    #[test]
    fn test_iteration_limit_is_configurable() {
        let config = Config { max_iterations: 3, ..Config::default() };
        let got = eval_with("int n = 0; while (n < 10) { n++; }", &config);
        assert_eq!(got, Object::Error("stack overflow: iteration limit of 3 exceeded".to_string()));

        let got = eval_with("int n = 0; while (n < 3) { n++; } n", &config);
        assert_eq!(got, Object::Integer(3));
    }

    #[test]
    fn test_eval_string() {
        assert_eq!(test_eval(r#""Hello" + " " + "World""#), Object::String("Hello World".to_string()));
        assert_eq!(test_eval(r#"len("four")"#), Object::Integer(4));
    }

    #[test]
    fn test_array_literal() {
        assert_eq!(
            test_eval("[1, 2 * 2, 3 + 3]"),
            Object::Array(vec![Object::Integer(1), Object::RealNumber(4.0), Object::RealNumber(6.0)])
        );
    }

    #[test]
    fn test_eval_index() {
        struct Test<'a> {
            input: &'a str,
            expected: Object,
        }
        let tests = vec![
            Test{input: "[1, 2, 3][0]", expected: Object::Integer(1)},
            Test{input: "[1, 2, 3][2]", expected: Object::Integer(3)},
            Test{input: "[1, 2, 3][3]", expected: Object::Null},
            Test{input: "[1, 2, 3][-1]", expected: Object::Null},
            Test{input: r#"{"one": 1, "two": 2}["two"]"#, expected: Object::Integer(2)},
            Test{input: r#"{"one": 1}["three"]"#, expected: Object::Null},
            Test{input: "{1: 'a', true: 'b'}[true]", expected: Object::Character('b')},
            Test{input: "{}[5]", expected: Object::Null},
        ];

        for tt in tests {
            assert_eq!(test_eval(tt.input), tt.expected, "{}", tt.input);
        }
    }

    #[test]
    fn test_eval_builtin_function() {
        struct Test<'a> {
            input: &'a str,
            expected: Object,
        }
        let tests = vec![
            Test{input: r#"len("")"#, expected: Object::Integer(0)},
            Test{input: r#"len("four")"#, expected: Object::Integer(4)},
            Test{input: "len(1)", expected: Object::Error("argument to `len` not supported, got INTEGER_OBJ".to_string())},
            Test{input: r#"len("one", "two")"#, expected: Object::Error("wrong number of arguments. got=2, want=1".to_string())},
            Test{input: "len([1, 2, 3])", expected: Object::Integer(3)},
            Test{input: "first([1, 2, 3])", expected: Object::Integer(1)},
            Test{input: "last([1, 2, 3])", expected: Object::Integer(3)},
            Test{input: "rest([1, 2, 3])", expected: Object::Array(vec![Object::Integer(2), Object::Integer(3)])},
            Test{input: "push([], 1)", expected: Object::Array(vec![Object::Integer(1)])},
        ];

        for tt in tests {
            assert_eq!(test_eval(tt.input), tt.expected, "{}", tt.input);
        }
    }

    //utils
    fn eval_with(input: &str, config: &Config) -> Object {
        let l = Lexer::new(input);
        let mut p = Parser::new(l);
        let program = p.parse_program();
        assert!(p.errors().is_empty(), "{}: {:?}", input, p.errors());

        let mut eval = Evaluator::with_config(Rc::new(RefCell::new(Builtins::new())), config);
        let env = Environment::new();
        eval.eval(Node::Program(&program), &env)
    }

    fn test_eval(input: &str) -> Object {
        eval_with(input, &Config::default())
    }

    fn test_number(input: &str, expected: f32) {
        match test_eval(input) {
            Object::Integer(val) => assert_eq!(val as f32, expected, "{}", input),
            Object::RealNumber(val) => assert_eq!(val, expected, "{}", input),
            obj => panic!("returned object is not a number, got {}", obj),
        }
    }
}
