use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;
use crate::ast::DataType;
use crate::error::EvalError;
use crate::object::Object;

pub type Env = Rc<RefCell<Environment>>;

struct Binding {
    value: Object,
    data_type: DataType,
}

/// One lexical scope. Lookups and writes that miss fall through to `outer`.
#[derive(Default)]
pub struct Environment {
    store: HashMap<String, Binding>,
    outer: Option<Env>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.store.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

impl Environment {
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub fn new_enclosed(outer: &Env) -> Env {
        Rc::new(RefCell::new(Environment { store: HashMap::new(), outer: Some(Rc::clone(outer)) }))
    }

    pub fn get(&self, key: &str) -> Option<Object> {
        match self.store.get(key) {
            Some(binding) => Some(binding.value.clone()),
            None => match &self.outer {
                Some(env) => env.borrow().get(key),
                None => None,
            },
        }
    }

    /// Binds `name` in this scope only, coercing `value` to `data_type`.
    /// Outer scopes are not consulted, so shadowing is allowed.
    pub fn declare(&mut self, name: &str, value: Object, data_type: DataType) -> Result<Object, EvalError> {
        if self.store.contains_key(name) {
            return Err(EvalError::AlreadyDeclared(name.to_string()));
        }
        let value = coerce(value, &data_type)?;
        self.store.insert(name.to_string(), Binding { value: value.clone(), data_type });
        Ok(value)
    }

    /// Like [`Environment::declare`] but stores the type's zero value without coercion.
    pub fn declare_default(&mut self, name: &str, data_type: DataType) -> Result<Object, EvalError> {
        if self.store.contains_key(name) {
            return Err(EvalError::AlreadyDeclared(name.to_string()));
        }
        let value = zero_value(&data_type);
        self.store.insert(name.to_string(), Binding { value: value.clone(), data_type });
        Ok(value)
    }

    /// Rewrites an existing binding in the scope where it was found,
    /// coercing to the type it was declared with.
    pub fn set(&mut self, name: &str, value: Object) -> Result<Object, EvalError> {
        if let Some(binding) = self.store.get_mut(name) {
            let value = coerce(value, &binding.data_type)?;
            binding.value = value.clone();
            return Ok(value);
        }
        match &self.outer {
            Some(outer) => outer.borrow_mut().set(name, value),
            None => Err(EvalError::NotDeclared(name.to_string())),
        }
    }
}

pub fn zero_value(data_type: &DataType) -> Object {
    match data_type {
        DataType::Int => Object::Integer(0),
        DataType::Float => Object::RealNumber(0.0),
        DataType::Char => Object::Character('\0'),
        DataType::Bool => Object::Boolean(false),
        DataType::Void | DataType::Class(_) => Object::Null,
    }
}

/// Converts `value` to the runtime representation of `target`.
///
/// Functions convert when their declared return type is `target`; host
/// functions carry no return type and always pass. `void` accepts anything.
pub fn coerce(value: Object, target: &DataType) -> Result<Object, EvalError> {
    let invalid = |value: &Object| EvalError::InvalidConversion {
        from: value.object_type(),
        to: target.object_type(),
    };

    match (target, value) {
        (DataType::Void, value) => Ok(value),
        (_, Object::Function(func)) => {
            if func.return_type == *target {
                Ok(Object::Function(func))
            } else {
                Err(EvalError::InvalidReturnType {
                    got: func.return_type.to_string(),
                    expected: target.to_string(),
                })
            }
        },
        (_, value @ Object::HostFunction(_)) => Ok(value),

        (DataType::Int, value @ Object::Integer(_)) => Ok(value),
        (DataType::Int, Object::RealNumber(r)) => Ok(Object::Integer(r.trunc() as i64)),
        (DataType::Int, Object::Boolean(b)) => Ok(Object::Integer(if b { 1 } else { 0 })),
        (DataType::Int, Object::Character(c)) => Ok(Object::Integer(c as i64)),

        (DataType::Float, Object::Integer(i)) => Ok(Object::RealNumber(i as f32)),
        (DataType::Float, value @ Object::RealNumber(_)) => Ok(value),
        (DataType::Float, Object::Boolean(b)) => Ok(Object::RealNumber(if b { 1.0 } else { 0.0 })),
        (DataType::Float, Object::Character(c)) => Ok(Object::RealNumber(c as u32 as f32)),

        (DataType::Char, Object::Integer(i)) => Ok(Object::Character(narrow_to_char(i))),
        (DataType::Char, Object::RealNumber(r)) => Ok(Object::Character(narrow_to_char(r.trunc() as i64))),
        (DataType::Char, Object::Boolean(b)) => Ok(Object::Character(if b { '\u{1}' } else { '\0' })),
        (DataType::Char, value @ Object::Character(_)) => Ok(value),

        (DataType::Bool, Object::Integer(i)) => Ok(Object::Boolean(i != 0)),
        (DataType::Bool, Object::RealNumber(r)) => Ok(Object::Boolean(r != 0.0)),
        (DataType::Bool, value @ Object::Boolean(_)) => Ok(value),
        (DataType::Bool, Object::Character(c)) => Ok(Object::Boolean(c != '\0')),

        (DataType::Class(name), Object::Class(class)) if class.name == *name => Ok(Object::Class(class)),

        (_, value) => Err(invalid(&value)),
    }
}

/// Keeps the low 16 bits, as a C `char` conversion would. Surrogate code
/// units have no `char` and become U+FFFD.
fn narrow_to_char(i: i64) -> char {
    char::from_u32(u32::from(i as u16)).unwrap_or(char::REPLACEMENT_CHARACTER)
}
