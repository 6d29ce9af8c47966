use std::cell::RefCell;
use std::io::{BufRead, BufReader, Read, Write};
use std::mem;
use std::rc::Rc;
use tracing::{debug, warn};
use crate::ast::Node;
use crate::builtin::Builtins;
use crate::config::Config;
use crate::environment::{Env, Environment};
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::library::{Board, SharedBoard};
use crate::linker::Linker;
use crate::parser::Parser;
use crate::token::Keywords;

const PROMPT: &str = ">> ";

/// Outcome of one `run_code` call as the front end shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub result_text: String,
    pub is_error: bool,
    /// Reported but never fatal; whatever did parse still runs.
    pub parse_errors: Vec<String>,
}

/// One scripting session: keyword table, linked libraries, simulated board
/// and the persistent top-level environment.
pub struct Interpreter {
    keywords: Keywords,
    linker: Linker,
    board: SharedBoard,
    evaluator: Evaluator,
    env: Env,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::with_config(&Config::default())
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &Config) -> Self {
        let builtins = Rc::new(RefCell::new(Builtins::new()));
        let board = Rc::new(RefCell::new(Board::new(config.realtime_delay)));
        Interpreter {
            keywords: Keywords::default(),
            linker: Linker::new(Rc::clone(&builtins), Rc::clone(&board)),
            board,
            evaluator: Evaluator::with_config(builtins, config),
            env: Environment::new(),
        }
    }

    pub fn board(&self) -> SharedBoard {
        Rc::clone(&self.board)
    }

    /// Runs `input` against the session environment, so declarations persist.
    pub fn run_code(&mut self, input: &str) -> RunResult {
        let env = Rc::clone(&self.env);
        self.run(input, &env)
    }

    /// Runs `input` against a new environment. Linked libraries stay linked.
    pub fn run_code_fresh(&mut self, input: &str) -> RunResult {
        self.run(input, &Environment::new())
    }

    fn run(&mut self, input: &str, env: &Env) -> RunResult {
        if input.trim().is_empty() {
            return RunResult { result_text: "empty code".to_string(), is_error: false, parse_errors: Vec::new() };
        }

        let l = Lexer::with_keywords(input, mem::take(&mut self.keywords));
        let mut p = Parser::with_linker(l, &mut self.linker);
        let program = p.parse_program();
        let parse_errors = p.errors();
        self.keywords = p.into_keywords();

        for msg in parse_errors.iter() {
            warn!("parse error: {}", msg);
        }
        debug!("evaluating {} statements", program.statements.len());

        let evaluated = self.evaluator.eval(Node::Program(&program), env);
        RunResult {
            result_text: evaluated.to_string(),
            is_error: evaluated.is_error(),
            parse_errors,
        }
    }
}

/// Line REPL over one session. Returns when `reader` is exhausted.
pub fn start<R: Read, W: Write>(reader: R, mut writer: W, config: &Config) -> std::io::Result<()> {
    let mut interpreter = Interpreter::with_config(config);
    let mut reader = BufReader::new(reader);
    loop {
        write!(writer, "{}", PROMPT)?;
        writer.flush()?;
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }

        let result = interpreter.run_code(&line);
        if !result.parse_errors.is_empty() {
            print_parser_errors(&mut writer, &result.parse_errors)?;
        }
        writeln!(writer, "{}", result.result_text)?;
    }
}

fn print_parser_errors<W: Write>(mut writer: W, errs: &[String]) -> std::io::Result<()> {
    writeln!(writer, " parser errors:")?;
    for msg in errs {
        writeln!(writer, "    {}", msg)?;
    }
    writer.flush()
}
