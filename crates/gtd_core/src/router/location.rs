//! Address-bar model: the current fragment plus back/forward history.

#[derive(Debug, Clone, Default)]
pub struct Location {
    hash: String,
    back_stack: Vec<String>,
    forward_stack: Vec<String>,
    pending: bool,
}

impl Location {
    pub fn new(initial: &str) -> Self {
        Self {
            hash: normalize(initial).to_string(),
            ..Self::default()
        }
    }

    /// Current fragment without the leading `#`.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Writes a new fragment, pushing the old one onto the back stack.
    /// Returns `false` (and records nothing) when the fragment is unchanged.
    pub fn set_hash(&mut self, hash: &str) -> bool {
        let hash = normalize(hash);
        if hash == self.hash {
            return false;
        }
        let previous = std::mem::replace(&mut self.hash, hash.to_string());
        self.back_stack.push(previous);
        self.forward_stack.clear();
        self.pending = true;
        true
    }

    pub fn back(&mut self) -> bool {
        let Some(previous) = self.back_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.hash, previous);
        self.forward_stack.push(current);
        self.pending = true;
        true
    }

    pub fn forward(&mut self) -> bool {
        let Some(next) = self.forward_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.hash, next);
        self.back_stack.push(current);
        self.pending = true;
        true
    }

    pub fn can_go_back(&self) -> bool {
        !self.back_stack.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward_stack.is_empty()
    }

    /// Returns the fragment once per change, like a `hashchange` event.
    pub fn take_change(&mut self) -> Option<String> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(self.hash.clone())
    }
}

fn normalize(hash: &str) -> &str {
    hash.strip_prefix('#').unwrap_or(hash)
}
