use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;
use crate::ast::{DataType, Parameter, Statement};
use crate::builtin::HostFunction;
use crate::environment::Env;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum ObjectType {
    INTEGER_OBJ,
    REAL_NUMBER_OBJ,
    CHARACTER_OBJ,
    BOOLEAN_OBJ,
    STRING_OBJ,
    NULL_OBJ,
    ARRAY_OBJ,
    HASH_OBJ,
    FUNCTION_OBJ,
    HOST_FUNCTION_OBJ,
    CLASS_OBJ,
    RETURN_VALUE_OBJ,
    BREAK_OBJ,
    ERROR_OBJ,
    VOID_OBJ,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum HashKey {
    Integer(i64),
    Real(u32),
    Character(char),
    Boolean(bool),
    String(String),
}

impl HashKey {
    /// `None` for objects that cannot key a hash.
    pub fn get_key(obj: &Object) -> Option<Self> {
        match obj {
            Object::Integer(i) => Some(HashKey::Integer(*i)),
            Object::RealNumber(r) => Some(HashKey::Real(r.to_bits())),
            Object::Character(c) => Some(HashKey::Character(*c)),
            Object::Boolean(b) => Some(HashKey::Boolean(*b)),
            Object::String(st) => Some(HashKey::String(st.to_string())),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// A user-defined function together with the scope it was declared in.
pub struct Function {
    pub parameters: Vec<Parameter>,
    pub return_type: DataType,
    pub body: Statement,
    pub env: Env,
}

// the captured scope usually holds the function itself
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("return_type", &self.return_type)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Instance of a library class; its members live in `env`.
#[derive(Clone, Debug)]
pub struct ClassInstance {
    pub name: String,
    pub env: Env,
}

#[derive(Clone, Debug)]
pub enum Object {
    Integer(i64),
    RealNumber(f32),
    Character(char),
    Boolean(bool),
    String(String),
    Null,
    Array(Vec<Object>),
    Hash(BTreeMap<HashKey, HashPair>),
    Function(Rc<Function>),
    HostFunction(HostFunction),
    Class(ClassInstance),
    ReturnValue(Box<Object>),
    Break,
    Error(String),
}

impl Object {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::INTEGER_OBJ,
            Object::RealNumber(_) => ObjectType::REAL_NUMBER_OBJ,
            Object::Character(_) => ObjectType::CHARACTER_OBJ,
            Object::Boolean(_) => ObjectType::BOOLEAN_OBJ,
            Object::String(_) => ObjectType::STRING_OBJ,
            Object::Null => ObjectType::NULL_OBJ,
            Object::Array(_) => ObjectType::ARRAY_OBJ,
            Object::Hash(_) => ObjectType::HASH_OBJ,
            Object::Function(_) => ObjectType::FUNCTION_OBJ,
            Object::HostFunction(_) => ObjectType::HOST_FUNCTION_OBJ,
            Object::Class(_) => ObjectType::CLASS_OBJ,
            Object::ReturnValue(_) => ObjectType::RETURN_VALUE_OBJ,
            Object::Break => ObjectType::BREAK_OBJ,
            Object::Error(_) => ObjectType::ERROR_OBJ,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Numeric view shared by arithmetic and compound assignment.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Object::Integer(i) => Some(*i as f32),
            Object::RealNumber(r) => Some(*r),
            Object::Character(c) => Some(*c as u32 as f32),
            Object::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::RealNumber(a), Object::RealNumber(b)) => a == b,
            (Object::Character(a), Object::Character(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Break, Object::Break) => true,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::HostFunction(a), Object::HostFunction(b)) => a == b,
            (Object::Class(a), Object::Class(b)) => Rc::ptr_eq(&a.env, &b.env),
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(i) => write!(f, "{}", i),
            Object::RealNumber(r) => write!(f, "{}", r),
            Object::Character(c) => write!(f, "{}", c),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::String(s) => write!(f, "{}", s),
            Object::Null => write!(f, "null"),
            Object::Array(arr) => write!(f, "[{}]",
                arr.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")),
            Object::Hash(hash) => write!(f, "{{{}}}",
                hash.values().map(|kv| format!("{}: {}", kv.key, kv.value)).collect::<Vec<_>>().join(", ")),
            Object::Function(func) => write!(f, "{} function({}) {{{}}}",
                func.return_type,
                func.parameters.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", "),
                func.body),
            Object::HostFunction(hf) => write!(f, "builtin function {}", hf),
            Object::Class(class) => write!(f, "class {}", class.name),
            Object::ReturnValue(obj) => write!(f, "{}", obj),
            Object::Break => write!(f, "break;"),
            Object::Error(msg) => write!(f, "ERROR: {}", msg),
        }
    }
}
