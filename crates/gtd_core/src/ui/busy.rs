//! Reference-counted loading overlay.
//!
//! # Invariants
//! - The overlay is visible iff at least one `show` is unmatched.
//! - The count never drops below zero; extra `hide` calls are ignored.

use crate::ui::layout::{LOADING, LOADING_MESSAGE};
use crate::ui::surface::Surface;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

pub struct BusyIndicator {
    surface: Rc<RefCell<Surface>>,
    count: Cell<u32>,
    loading: Cell<bool>,
}

impl BusyIndicator {
    pub fn new(surface: Rc<RefCell<Surface>>) -> Self {
        Self {
            surface,
            count: Cell::new(0),
            loading: Cell::new(false),
        }
    }

    pub fn show(&self) {
        self.count.set(self.count.get().saturating_add(1));
        if self.loading.get() {
            return;
        }
        self.loading.set(true);
        let mut surface = self.surface.borrow_mut();
        if surface.contains(LOADING) {
            surface.set_attr(LOADING, "aria-hidden", "false");
            surface.set_attr(LOADING, "role", "dialog");
            surface.set_attr(LOADING, "aria-label", "로딩 중");
        }
    }

    pub fn hide(&self) {
        self.count.set(self.count.get().saturating_sub(1));
        if self.count.get() > 0 || !self.loading.get() {
            return;
        }
        self.loading.set(false);
        let mut surface = self.surface.borrow_mut();
        if surface.contains(LOADING) {
            surface.set_attr(LOADING, "aria-hidden", "true");
            surface.remove_attr(LOADING, "role");
            surface.remove_attr(LOADING, "aria-label");
        }
    }

    /// Drops every outstanding `show`.
    pub fn force_hide(&self) {
        self.count.set(0);
        self.hide();
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }

    pub fn message(&self) -> Option<String> {
        self.surface
            .borrow()
            .element(LOADING_MESSAGE)
            .map(|element| element.text.clone())
            .filter(|text| !text.is_empty())
    }

    /// Keeps the overlay up while `future` runs, on every exit path.
    pub async fn wrap<F: Future>(&self, future: F, message: Option<&str>) -> F::Output {
        let _guard = BusyGuard::enter(self, message);
        future.await
    }

    fn set_message(&self, message: &str) {
        let mut surface = self.surface.borrow_mut();
        if surface.contains(LOADING_MESSAGE) {
            surface.set_text(LOADING_MESSAGE, message);
        }
    }
}

struct BusyGuard<'a> {
    busy: &'a BusyIndicator,
    has_message: bool,
}

impl<'a> BusyGuard<'a> {
    fn enter(busy: &'a BusyIndicator, message: Option<&str>) -> Self {
        busy.show();
        if let Some(message) = message {
            busy.set_message(message);
        }
        Self {
            busy,
            has_message: message.is_some(),
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.hide();
        if self.has_message {
            self.busy.set_message("");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BusyIndicator;
    use crate::ui::surface::Surface;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn busy() -> BusyIndicator {
        BusyIndicator::new(Rc::new(RefCell::new(Surface::with_default_layout())))
    }

    #[test]
    fn overlapping_operations_keep_overlay_until_last_ends() {
        let busy = busy();
        busy.show();
        busy.show();
        busy.hide();
        assert!(busy.is_loading());
        busy.hide();
        assert!(!busy.is_loading());
        busy.hide();
        assert_eq!(busy.count(), 0);
    }

    #[test]
    fn force_hide_clears_every_show() {
        let busy = busy();
        busy.show();
        busy.show();
        busy.show();
        busy.force_hide();
        assert!(!busy.is_loading());
        assert_eq!(busy.count(), 0);
    }
}
