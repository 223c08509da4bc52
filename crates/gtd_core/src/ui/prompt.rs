//! Confirmation dialogs.

use std::cell::{Cell, RefCell};

pub trait Prompter {
    /// Asks a yes/no question; `true` means confirmed.
    fn confirm(&self, message: &str) -> bool;
}

/// Answers every question the same way and remembers what was asked.
#[derive(Debug, Default)]
pub struct FixedPrompter {
    answer: Cell<bool>,
    asked: RefCell<Vec<String>>,
}

impl FixedPrompter {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: Cell::new(answer),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn set_answer(&self, answer: bool) {
        self.answer.set(answer);
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl Prompter for FixedPrompter {
    fn confirm(&self, message: &str) -> bool {
        self.asked.borrow_mut().push(message.to_string());
        self.answer.get()
    }
}
