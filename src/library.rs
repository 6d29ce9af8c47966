use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;
use std::thread;
use std::time::Duration;
use tracing::info;
use crate::ast::DataType;
use crate::builtin::{check_arity, integer_arg, HostFunction};
use crate::environment::Environment;
use crate::error::EvalError;
use crate::object::{ClassInstance, Object};

pub type SharedBoard = Rc<RefCell<Board>>;

/// What a provider hands to the linker once initialized.
#[derive(Default)]
pub struct Exports {
    /// Constructor-style host functions; their names become class keywords.
    pub classes: BTreeMap<String, HostFunction>,
    /// Constants and free host functions.
    pub fields: BTreeMap<String, Object>,
}

impl Exports {
    fn field(&mut self, name: &str, value: Object) {
        self.fields.insert(name.to_string(), value);
    }

    fn function(&mut self, name: &str, func: impl Fn(Vec<Object>) -> Object + 'static) {
        self.field(name, Object::HostFunction(HostFunction::new(name, func)));
    }
}

pub trait Library {
    fn initialize(&self, board: &SharedBoard) -> Exports;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    InputPullup,
    Output,
}

impl PinMode {
    fn from_i64(mode: i64) -> Option<Self> {
        match mode {
            0 => Some(PinMode::Input),
            1 => Some(PinMode::InputPullup),
            2 => Some(PinMode::Output),
            _ => None,
        }
    }
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PinMode::Input => write!(f, "INPUT"),
            PinMode::InputPullup => write!(f, "INPUT_PULLUP"),
            PinMode::Output => write!(f, "OUTPUT"),
        }
    }
}

pub const LOW: i64 = 0;
pub const HIGH: i64 = 1;

/// Simulated hardware state shared by every provider linked into a session.
#[derive(Debug, Default)]
pub struct Board {
    realtime: bool,
    pin_modes: BTreeMap<i64, PinMode>,
    pin_levels: BTreeMap<i64, i64>,
    delayed_ms: u64,
    displays: Vec<Vec<[u8; 8]>>,
}

impl Board {
    pub fn new(realtime: bool) -> Self {
        Board { realtime, ..Default::default() }
    }

    pub fn pin_mode(&self, pin: i64) -> Option<PinMode> {
        self.pin_modes.get(&pin).copied()
    }

    /// Unwritten pins read `LOW`, except `INPUT_PULLUP` pins which idle `HIGH`.
    pub fn pin_level(&self, pin: i64) -> i64 {
        match self.pin_levels.get(&pin) {
            Some(level) => *level,
            None if self.pin_mode(pin) == Some(PinMode::InputPullup) => HIGH,
            None => LOW,
        }
    }

    pub fn delayed_ms(&self) -> u64 {
        self.delayed_ms
    }

    pub fn display_count(&self) -> usize {
        self.displays.len()
    }

    /// Row bytes of one device of one `LedControl` instance.
    pub fn display_rows(&self, display: usize, addr: usize) -> Option<[u8; 8]> {
        self.displays.get(display).and_then(|devices| devices.get(addr)).copied()
    }

    fn attach_display(&mut self, devices: usize) -> usize {
        self.displays.push(vec![[0; 8]; devices]);
        self.displays.len() - 1
    }

    fn display_mut(&mut self, display: usize, addr: i64) -> Option<&mut [u8; 8]> {
        let addr = usize::try_from(addr).ok()?;
        self.displays.get_mut(display).and_then(|devices| devices.get_mut(addr))
    }
}

/// `Arduino.h`: pin constants and the digital I/O and timing functions.
pub struct Arduino;

impl Library for Arduino {
    fn initialize(&self, board: &SharedBoard) -> Exports {
        let mut exports = Exports::default();
        exports.field("INPUT", Object::Integer(0));
        exports.field("INPUT_PULLUP", Object::Integer(1));
        exports.field("OUTPUT", Object::Integer(2));
        exports.field("LOW", Object::Integer(LOW));
        exports.field("HIGH", Object::Integer(HIGH));

        let b = Rc::clone(board);
        exports.function("pinMode", move |args| {
            let (pin, mode) = match two_integers("pinMode", &args) {
                Ok(pair) => pair,
                Err(err) => return err,
            };
            let mode = match PinMode::from_i64(mode) {
                Some(mode) => mode,
                None => return Object::Error(format!("invalid pin mode: {}", mode)),
            };
            info!("pin {} is set to {}", pin, mode);
            b.borrow_mut().pin_modes.insert(pin, mode);
            Object::Null
        });

        let b = Rc::clone(board);
        exports.function("digitalWrite", move |args| {
            let (pin, level) = match two_integers("digitalWrite", &args) {
                Ok(pair) => pair,
                Err(err) => return err,
            };
            let level = if level == LOW { LOW } else { HIGH };
            info!("pin {} is written {}", pin, if level == HIGH { "HIGH" } else { "LOW" });
            b.borrow_mut().pin_levels.insert(pin, level);
            Object::Null
        });

        let b = Rc::clone(board);
        exports.function("digitalRead", move |args| {
            if let Err(err) = check_arity(&args, 1) {
                return err;
            }
            match integer_arg("digitalRead", &args[0]) {
                Ok(pin) => Object::Integer(b.borrow().pin_level(pin)),
                Err(err) => err,
            }
        });

        let b = Rc::clone(board);
        exports.function("delay", move |args| {
            if let Err(err) = check_arity(&args, 1) {
                return err;
            }
            let ms = match integer_arg("delay", &args[0]) {
                Ok(ms) => u64::try_from(ms).unwrap_or(0),
                Err(err) => return err,
            };
            let realtime = {
                let mut board = b.borrow_mut();
                board.delayed_ms = board.delayed_ms.saturating_add(ms);
                board.realtime
            };
            if realtime {
                thread::sleep(sleep_duration(ms));
            }
            info!("delayed {} milliseconds", ms);
            Object::Null
        });

        exports
    }
}

/// `LedControl.h`: MAX7219-style 8x8 LED matrix driver.
pub struct LedControl;

const MAX_DEVICES: i64 = 8;

impl Library for LedControl {
    fn initialize(&self, board: &SharedBoard) -> Exports {
        let mut exports = Exports::default();
        let b = Rc::clone(board);
        exports.classes.insert(
            "LedControl".to_string(),
            HostFunction::new("LedControl", move |args| new_led_control(&b, args)),
        );
        exports
    }
}

fn new_led_control(board: &SharedBoard, args: Vec<Object>) -> Object {
    if args.len() < 4 {
        return EvalError::WrongArgumentCount { got: args.len(), want: 4 }.into();
    }
    let mut pins = [0; 4];
    for (pin, arg) in pins.iter_mut().zip(args.iter()) {
        match integer_arg("LedControl", arg) {
            Ok(i) => *pin = i,
            Err(err) => return err,
        }
    }
    let devices = if pins[3] <= 0 || pins[3] > MAX_DEVICES { MAX_DEVICES } else { pins[3] };
    let display = board.borrow_mut().attach_display(devices as usize);
    info!("LedControl(data={}, clk={}, cs={}) drives {} devices", pins[0], pins[1], pins[2], devices);

    let env = Environment::new();
    let members = [
        HostFunction::new("setRow", led_member(board, display, 3, |board, display, a| {
            let row = usize::try_from(a[1]).ok().filter(|r| *r < 8);
            if let (Some(rows), Some(row)) = (board.display_mut(display, a[0]), row) {
                rows[row] = a[2] as u8;
                info!("device {} row {} = {:08b}", a[0], row, rows[row]);
            }
            Object::Null
        })),
        HostFunction::new("setLed", led_member(board, display, 4, |board, display, a| {
            let row = usize::try_from(a[1]).ok().filter(|r| *r < 8);
            let col = u32::try_from(a[2]).ok().filter(|c| *c < 8);
            if let (Some(rows), Some(row), Some(col)) = (board.display_mut(display, a[0]), row, col) {
                let mask = 0x80u8 >> col;
                if a[3] != 0 { rows[row] |= mask } else { rows[row] &= !mask }
                info!("device {} row {} = {:08b}", a[0], row, rows[row]);
            }
            Object::Null
        })),
        HostFunction::new("clearDisplay", led_member(board, display, 1, |board, display, a| {
            if let Some(rows) = board.display_mut(display, a[0]) {
                *rows = [0; 8];
                info!("device {} cleared", a[0]);
            }
            Object::Null
        })),
        HostFunction::new("getRow", led_member(board, display, 2, |board, display, a| {
            let row = usize::try_from(a[1]).ok().filter(|r| *r < 8);
            match (board.display_mut(display, a[0]), row) {
                (Some(rows), Some(row)) => Object::Integer(rows[row] as i64),
                _ => Object::Null,
            }
        })),
    ];
    for member in members {
        let name = member.name().to_string();
        if let Err(err) = env.borrow_mut().declare(&name, Object::HostFunction(member), DataType::Void) {
            return err.into();
        }
    }

    Object::Class(ClassInstance { name: "LedControl".to_string(), env })
}

/// Wraps a member body with arity and integer checks. Booleans are accepted
/// as 0/1 so `setLed(0, 1, 1, true)` works. Out-of-range addresses are ignored.
fn led_member(
    board: &SharedBoard,
    display: usize,
    arity: usize,
    body: impl Fn(&mut Board, usize, &[i64]) -> Object + 'static,
) -> impl Fn(Vec<Object>) -> Object + 'static {
    let board = Rc::clone(board);
    move |args| {
        if let Err(err) = check_arity(&args, arity) {
            return err;
        }
        let mut ints = Vec::with_capacity(arity);
        for arg in &args {
            match arg {
                Object::Boolean(b) => ints.push(*b as i64),
                other => match integer_arg("LedControl", other) {
                    Ok(i) => ints.push(i),
                    Err(err) => return err,
                },
            }
        }
        body(&mut board.borrow_mut(), display, &ints)
    }
}

/// Longest a single `delay` blocks in realtime mode.
const MAX_SLEEP_MS: u64 = 10_000;

fn sleep_duration(ms: u64) -> Duration {
    Duration::from_millis(ms.min(MAX_SLEEP_MS))
}

fn two_integers(function: &str, args: &[Object]) -> Result<(i64, i64), Object> {
    check_arity(args, 2)?;
    Ok((integer_arg(function, &args[0])?, integer_arg(function, &args[1])?))
}
