use std::collections::HashMap;
use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;
use crate::error::EvalError;
use crate::library::Exports;
use crate::object::{Object, ObjectType};

pub type HostFn = Rc<dyn Fn(Vec<Object>) -> Object>;

/// Native callback exposed to scripts as a callable value.
#[derive(Clone)]
pub struct HostFunction {
    name: String,
    func: HostFn,
}

impl fmt::Display for HostFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "HostFunction({})", self.name)
    }
}

impl PartialEq for HostFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.func, &other.func)
    }
}

impl HostFunction {
    pub fn new(name: &str, func: impl Fn(Vec<Object>) -> Object + 'static) -> Self {
        HostFunction { name: name.to_string(), func: Rc::new(func) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: Vec<Object>) -> Object {
        (self.func)(args)
    }
}

/// Global names resolved after the environment chain misses: the built-in
/// functions, library fields, and library class constructors.
pub struct Builtins {
    functions: HashMap<String, Object>,
    classes: HashMap<String, Object>,
}

impl Default for Builtins {
    fn default() -> Self {
        let mut functions = HashMap::new();
        for (name, func) in [
            ("len", len as fn(Vec<Object>) -> Object),
            ("first", first),
            ("last", last),
            ("rest", rest),
            ("push", push),
            ("puts", puts),
        ] {
            functions.insert(name.to_string(), Object::HostFunction(HostFunction::new(name, func)));
        }
        Builtins { functions, classes: HashMap::new() }
    }
}

impl Builtins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn look_up(&self, name: &str) -> Option<Object> {
        self.functions.get(name).or_else(|| self.classes.get(name)).cloned()
    }

    pub fn add_library(&mut self, exports: Exports) {
        self.functions.extend(exports.fields);
        for (name, constructor) in exports.classes {
            self.classes.insert(name, Object::HostFunction(constructor));
        }
    }
}

/// Arity check shared by every host function.
pub fn check_arity(args: &[Object], want: usize) -> Result<(), Object> {
    if args.len() != want {
        return Err(EvalError::WrongArgumentCount { got: args.len(), want }.into());
    }
    Ok(())
}

fn unsupported(function: &str, arg: &Object) -> Object {
    EvalError::UnsupportedArgument { function: function.to_string(), got: arg.object_type() }.into()
}

fn len(args: Vec<Object>) -> Object {
    if let Err(err) = check_arity(&args, 1) {
        return err;
    }
    match &args[0] {
        Object::Array(v) => Object::Integer(v.len() as i64),
        Object::String(s) => Object::Integer(s.chars().count() as i64),
        other => unsupported("len", other),
    }
}

fn first(args: Vec<Object>) -> Object {
    if let Err(err) = check_arity(&args, 1) {
        return err;
    }
    match &args[0] {
        Object::Array(v) => v.first().cloned().unwrap_or(Object::Null),
        other => unsupported("first", other),
    }
}

fn last(args: Vec<Object>) -> Object {
    if let Err(err) = check_arity(&args, 1) {
        return err;
    }
    match &args[0] {
        Object::Array(v) => v.last().cloned().unwrap_or(Object::Null),
        other => unsupported("last", other),
    }
}

fn rest(args: Vec<Object>) -> Object {
    if let Err(err) = check_arity(&args, 1) {
        return err;
    }
    match &args[0] {
        Object::Array(v) if v.is_empty() => Object::Null,
        Object::Array(v) => Object::Array(v[1..].to_vec()),
        other => unsupported("rest", other),
    }
}

fn push(args: Vec<Object>) -> Object {
    if let Err(err) = check_arity(&args, 2) {
        return err;
    }
    match &args[0] {
        Object::Array(v) => {
            let mut elements = v.clone();
            elements.push(args[1].clone());
            Object::Array(elements)
        },
        other => unsupported("push", other),
    }
}

fn puts(args: Vec<Object>) -> Object {
    for arg in args {
        println!("{}", arg)
    }
    Object::Null
}

/// Reads an integer argument, as host functions commonly need.
pub fn integer_arg(function: &str, arg: &Object) -> Result<i64, Object> {
    match arg {
        Object::Integer(i) => Ok(*i),
        other => Err(Object::Error(format!(
            "wrong type of arguments to `{}`. got {}, want {}",
            function,
            other.object_type(),
            ObjectType::INTEGER_OBJ
        ))),
    }
}
