use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{info, warn};
use crate::builtin::Builtins;
use crate::error::LinkError;
use crate::library::{Arduino, LedControl, Library, SharedBoard};
use crate::token::Keywords;

/// Resolves `#include` names to providers and wires their exports into the
/// keyword table and the global builtin table.
pub struct Linker {
    builtins: Rc<RefCell<Builtins>>,
    board: SharedBoard,
    linked: HashSet<String>,
}

impl Linker {
    pub fn new(builtins: Rc<RefCell<Builtins>>, board: SharedBoard) -> Self {
        Linker { builtins, board, linked: HashSet::new() }
    }

    pub fn link_library(&mut self, name: &str, keywords: &mut Keywords) -> Result<(), LinkError> {
        if self.linked.contains(name) {
            return Ok(());
        }
        let library = match get_library(name) {
            Some(library) => library,
            None => {
                warn!("cannot link {}: library not found", name);
                return Err(LinkError::UnknownLibrary(name.to_string()));
            }
        };

        let exports = library.initialize(&self.board);
        for class in exports.classes.keys() {
            keywords.add_class(class);
        }
        self.builtins.borrow_mut().add_library(exports);
        self.linked.insert(name.to_string());
        info!("linked {}", name);
        Ok(())
    }
}

fn get_library(name: &str) -> Option<Box<dyn Library>> {
    match name {
        "Arduino.h" => Some(Box::new(Arduino)),
        "LedControl.h" => Some(Box::new(LedControl)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use crate::builtin::Builtins;
    use crate::error::LinkError;
    use crate::library::Board;
    use crate::linker::Linker;
    use crate::token::{Keywords, TokenType};

    fn linker() -> (Linker, Rc<RefCell<Builtins>>) {
        let builtins = Rc::new(RefCell::new(Builtins::new()));
        let board = Rc::new(RefCell::new(Board::new(false)));
        (Linker::new(Rc::clone(&builtins), board), builtins)
    }

    #[test]
    fn test_link_registers_fields_and_classes() {
        let (mut linker, builtins) = linker();
        let mut keywords = Keywords::default();

        assert_eq!(linker.link_library("Arduino.h", &mut keywords), Ok(()));
        assert!(builtins.borrow().look_up("pinMode").is_some());
        assert!(builtins.borrow().look_up("HIGH").is_some());

        assert_eq!(linker.link_library("LedControl.h", &mut keywords), Ok(()));
        assert_eq!(keywords.look_up_ident("LedControl"), TokenType::CLASS);
        assert!(builtins.borrow().look_up("LedControl").is_some());
    }

    #[test]
    fn test_unknown_library_has_no_side_effects() {
        let (mut linker, builtins) = linker();
        let mut keywords = Keywords::default();

        assert_eq!(
            linker.link_library("Servo.h", &mut keywords),
            Err(LinkError::UnknownLibrary("Servo.h".to_string()))
        );
        assert_eq!(keywords.look_up_ident("Servo"), TokenType::IDENT);
        assert!(builtins.borrow().look_up("pinMode").is_none());
    }

    #[test]
    fn test_relink_is_noop() {
        let (mut linker, _) = linker();
        let mut keywords = Keywords::default();
        assert!(linker.link_library("Arduino.h", &mut keywords).is_ok());
        assert!(linker.link_library("Arduino.h", &mut keywords).is_ok());
    }
}
