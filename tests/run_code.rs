use proptest::prelude::*;
use sketch_interpreter::config::Config;
use sketch_interpreter::interpreter::Interpreter;
use sketch_interpreter::library::PinMode;

fn session() -> Interpreter {
    Interpreter::with_config(&Config { realtime_delay: false, ..Config::default() })
}

#[test]
fn blink_sketch() {
    let mut interpreter = session();
    let input = r#"
#include <Arduino.h>
int led = 13;
void blink(int pin, int times) {
    for (int i = 0; i < times; i++) {
        digitalWrite(pin, HIGH);
        delay(250);
        digitalWrite(pin, LOW);
        delay(250);
    }
}
pinMode(led, OUTPUT);
blink(led, 3);
digitalWrite(led, HIGH);
digitalRead(led)
"#;
    let result = interpreter.run_code(input);
    assert!(result.parse_errors.is_empty(), "{:?}", result.parse_errors);
    assert_eq!(result.result_text, "1");

    let board = interpreter.board();
    let board = board.borrow();
    assert_eq!(board.pin_mode(13), Some(PinMode::Output));
    assert_eq!(board.pin_level(13), 1);
    assert_eq!(board.delayed_ms(), 1500);
}

#[test]
fn led_matrix_sketch() {
    let mut interpreter = session();
    let input = r#"
#include <LedControl.h>
LedControl lc = LedControl(12, 11, 10, 2);
void smile = [60, 66, 165, 129, 165, 153, 66, 60];
int row = 0;
while (row < 8) {
    lc.setRow(1, row, smile[row]);
    row++;
}
lc.setLed(0, 3, 0, true);
lc.getRow(1, 2)
"#;
    let result = interpreter.run_code(input);
    assert!(result.parse_errors.is_empty(), "{:?}", result.parse_errors);
    assert_eq!(result.result_text, "165");

    let board = interpreter.board();
    let board = board.borrow();
    assert_eq!(board.display_count(), 1);
    assert_eq!(board.display_rows(0, 1), Some([60, 66, 165, 129, 165, 153, 66, 60]));
    assert_eq!(board.display_rows(0, 0), Some([0, 0, 0, 128, 0, 0, 0, 0]));
}

#[test]
fn session_builds_up_over_runs() {
    let mut interpreter = session();
    let steps = [
        ("int counter = 0;", "0"),
        ("void tick() { counter++; } tick(); tick(); counter", "2"),
        ("float ratio = counter / 4;", "0.5"),
        ("void label = \"ticks: \"; label + \"two\"", "ticks: two"),
    ];
    for (input, expected) in steps {
        let result = interpreter.run_code(input);
        assert_eq!(result.result_text, expected, "input: {}", input);
        assert!(!result.is_error, "input: {}", input);
    }
}

#[test]
fn runaway_code_is_stopped() {
    let mut interpreter = Interpreter::with_config(&Config {
        max_iterations: 10,
        max_call_depth: 8,
        realtime_delay: false,
    });

    let result = interpreter.run_code("int n = 0; while (true) { n++; }");
    assert!(result.is_error);
    assert_eq!(result.result_text, "ERROR: stack overflow: iteration limit of 10 exceeded");

    let result = interpreter.run_code("int down(int n) { return down(n + 1); } down(0)");
    assert!(result.is_error);
    assert_eq!(result.result_text, "ERROR: stack overflow: call depth limit of 8 exceeded");

    let result = interpreter.run_code("n");
    assert_eq!(result.result_text, "10");
}

#[test]
fn class_value_does_not_fit_typed_binding() {
    let mut interpreter = session();
    let result = interpreter.run_code("#include <LedControl.h>\nint x = 5; x = LedControl(1, 2, 3, 1);");
    assert!(result.parse_errors.is_empty(), "{:?}", result.parse_errors);
    assert!(result.is_error);
    assert_eq!(result.result_text, "ERROR: invalid conversion from 'CLASS_OBJ' to 'INTEGER_OBJ'");

    assert_eq!(interpreter.run_code("x").result_text, "5");
}

#[test]
fn unknown_library_is_reported() {
    let mut interpreter = session();
    let result = interpreter.run_code("#include <Servo.h>\n3 * 3");
    assert_eq!(result.parse_errors, vec!["library not found: Servo.h".to_string()]);
    assert_eq!(result.result_text, "9");
}

proptest! {
    #[test]
    fn integer_literals_evaluate_to_themselves(n in 0i64..i64::MAX) {
        let mut interpreter = session();
        let result = interpreter.run_code(&n.to_string());
        prop_assert!(!result.is_error);
        prop_assert_eq!(result.result_text, n.to_string());
    }

    #[test]
    fn real_literals_evaluate_to_themselves(r in 0.0f32..1000.0) {
        let mut interpreter = session();
        let result = interpreter.run_code(&r.to_string());
        prop_assert!(!result.is_error);
        prop_assert_eq!(result.result_text, r.to_string());
    }
}
