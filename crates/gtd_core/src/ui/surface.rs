//! Headless document model.
//!
//! # Responsibility
//! - Hold the element tree the screens render into, addressed by id.
//! - Track focus, input values and event listener registrations.
//! - Dispatch events with bubbling and collect the handlers' intents.
//!
//! # Invariants
//! - Element ids are unique; a child always names an existing parent.
//! - A removed listener is never invoked again.
//! - Clicks on disabled elements are dropped, as browsers drop them.

use crate::ui::html::{Html, Node};
use crate::ui::intent::Intent;
use log::warn;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
    Input,
    KeyDown,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
            Self::Input => "input",
            Self::KeyDown => "keydown",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "click" => Some(Self::Click),
            "submit" => Some(Self::Submit),
            "input" => Some(Self::Input),
            "keydown" => Some(Self::KeyDown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Parses chords such as `ctrl+1`, `cmd+n`, `shift+Enter` or `Space`.
    pub fn parse(chord: &str) -> Option<Self> {
        let mut press = KeyPress::default();
        let mut key = None;
        for part in chord.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => press.ctrl = true,
                "cmd" | "meta" => press.meta = true,
                "shift" => press.shift = true,
                "alt" | "option" => press.alt = true,
                "space" => key = Some(" ".to_string()),
                "" => return None,
                _ => key = Some(part.to_string()),
            }
        }
        press.key = key?;
        Some(press)
    }

    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// An event as seen by handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    /// Element the event is dispatched on.
    pub target: String,
    /// Classes of the node that originated the event.
    pub classes: Vec<String>,
    /// `data-*` values of the originating node.
    pub dataset: BTreeMap<String, String>,
    pub key: Option<KeyPress>,
}

impl DomEvent {
    pub fn new(kind: EventKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            classes: Vec::new(),
            dataset: BTreeMap::new(),
            key: None,
        }
    }

    pub fn key_down(target: impl Into<String>, key: KeyPress) -> Self {
        let mut event = Self::new(EventKind::KeyDown, target);
        event.key = Some(key);
        event
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|existing| existing == class)
    }

    pub fn data(&self, name: &str) -> Option<&str> {
        self.dataset.get(name).map(String::as_str)
    }

    pub fn data_id(&self, name: &str) -> Option<i64> {
        self.data(name)?.trim().parse().ok()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Remove the listener after its first invocation.
    pub once: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

pub type Handler = Rc<dyn Fn(&DomEvent) -> Option<Intent>>;

struct Listener {
    id: ListenerId,
    target: String,
    kind: EventKind,
    options: ListenerOptions,
    handler: Handler,
}

/// One addressable element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: String,
    pub tag: String,
    pub hidden: bool,
    pub classes: BTreeSet<String>,
    pub attrs: BTreeMap<String, String>,
    pub dataset: BTreeMap<String, String>,
    pub text: String,
    pub content: Vec<Node>,
    pub value: String,
    pub focusable: bool,
    pub disabled: bool,
    pub required: bool,
    pub max_length: Option<usize>,
    /// Form field name; fields without one are not submitted.
    pub name: Option<String>,
    parent: Option<String>,
    children: Vec<String>,
}

impl Element {
    pub fn new(id: &str, tag: &str) -> Self {
        let focusable = matches!(tag, "button" | "input" | "textarea" | "select" | "a");
        Self {
            id: id.to_string(),
            tag: tag.to_string(),
            hidden: false,
            classes: BTreeSet::new(),
            attrs: BTreeMap::new(),
            dataset: BTreeMap::new(),
            text: String::new(),
            content: Vec::new(),
            value: String::new(),
            focusable,
            disabled: false,
            required: false,
            max_length: None,
            name: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes
            .extend(class.split_whitespace().map(str::to_string));
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn data(mut self, name: &str, value: &str) -> Self {
        self.dataset.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// Own text followed by rendered content.
    pub fn inner_html(&self) -> Html {
        let text = Node::text(self.text.clone());
        Html::concat(std::iter::once(&text).chain(self.content.iter()))
    }
}

#[derive(Default)]
pub struct Surface {
    elements: BTreeMap<String, Element>,
    roots: Vec<String>,
    listeners: Vec<Listener>,
    next_listener: u64,
    focused: Option<String>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `element` under `parent` (or as a root).
    pub fn append(&mut self, parent: Option<&str>, mut element: Element) -> bool {
        if self.elements.contains_key(&element.id) {
            warn!("event=surface_append module=ui status=duplicate id={}", element.id);
            return false;
        }
        match parent {
            Some(parent_id) => {
                let Some(parent) = self.elements.get_mut(parent_id) else {
                    warn!("event=surface_append module=ui status=missing_parent parent={parent_id}");
                    return false;
                };
                parent.children.push(element.id.clone());
                element.parent = Some(parent_id.to_string());
            }
            None => self.roots.push(element.id.clone()),
        }
        self.elements.insert(element.id.clone(), element);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    fn with_element(&mut self, id: &str, op: &str, apply: impl FnOnce(&mut Element)) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                apply(element);
                true
            }
            None => {
                warn!("event=surface_{op} module=ui status=missing_element id={id}");
                false
            }
        }
    }

    /// True when `id` is `ancestor` or sits below it.
    pub fn is_within(&self, id: &str, ancestor: &str) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.elements.get(current).and_then(Element::parent);
        }
        false
    }

    /// Descendant ids of `root` in document order, excluding `root`.
    pub fn descendants(&self, root: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<&str> = self
            .elements
            .get(root)
            .map(|element| element.children.iter().rev().map(String::as_str).collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id.to_string());
            if let Some(element) = self.elements.get(id) {
                stack.extend(element.children.iter().rev().map(String::as_str));
            }
        }
        out
    }

    pub fn find_by_class(&self, root: &str, class: &str) -> Vec<String> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.elements.get(id).is_some_and(|el| el.has_class(class)))
            .collect()
    }

    pub fn find_by_data(&self, root: &str, name: &str, value: &str) -> Option<String> {
        self.descendants(root).into_iter().find(|id| {
            self.elements
                .get(id)
                .and_then(|el| el.dataset.get(name))
                .is_some_and(|found| found == value)
        })
    }

    /// Visible when neither the element nor any ancestor is hidden.
    pub fn is_displayed(&self, id: &str) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.elements.get(current) {
                Some(element) if element.hidden => return false,
                Some(element) => cursor = element.parent(),
                None => return false,
            }
        }
        true
    }

    pub fn set_hidden(&mut self, id: &str, hidden: bool) -> bool {
        self.with_element(id, "set_hidden", |element| element.hidden = hidden)
    }

    pub fn set_text(&mut self, id: &str, text: &str) -> bool {
        self.with_element(id, "set_text", |element| element.text = text.to_string())
    }

    pub fn set_content(&mut self, id: &str, content: Vec<Node>) -> bool {
        self.with_element(id, "set_content", |element| element.content = content)
    }

    pub fn set_value(&mut self, id: &str, value: &str) -> bool {
        self.with_element(id, "set_value", |element| element.value = value.to_string())
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|element| element.value.as_str())
    }

    pub fn add_class(&mut self, id: &str, class: &str) -> bool {
        self.with_element(id, "add_class", |element| {
            element.classes.insert(class.to_string());
        })
    }

    pub fn remove_class(&mut self, id: &str, class: &str) -> bool {
        self.with_element(id, "remove_class", |element| {
            element.classes.remove(class);
        })
    }

    pub fn set_attr(&mut self, id: &str, name: &str, value: &str) -> bool {
        self.with_element(id, "set_attr", |element| {
            element.attrs.insert(name.to_string(), value.to_string());
        })
    }

    pub fn remove_attr(&mut self, id: &str, name: &str) -> bool {
        self.with_element(id, "remove_attr", |element| {
            element.attrs.remove(name);
        })
    }

    pub fn set_disabled(&mut self, id: &str, disabled: bool) -> bool {
        self.with_element(id, "set_disabled", |element| element.disabled = disabled)
    }

    pub fn focus(&mut self, id: &str) -> bool {
        let focusable = self
            .elements
            .get(id)
            .is_some_and(|element| element.focusable && !element.disabled);
        if focusable {
            self.focused = Some(id.to_string());
        }
        focusable
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn focusable_descendants(&self, root: &str) -> Vec<String> {
        self.descendants(root)
            .into_iter()
            .filter(|id| {
                self.elements
                    .get(id)
                    .is_some_and(|element| element.focusable && !element.disabled)
            })
            .collect()
    }

    /// Rendered nodes inside `container` carrying `class`, in document order.
    pub fn query(&self, container: &str, class: &str) -> Vec<Node> {
        let mut found = Vec::new();
        if let Some(element) = self.elements.get(container) {
            for node in &element.content {
                node.walk(&mut |candidate| {
                    if candidate.has_class(class) {
                        found.push(candidate.clone());
                    }
                });
            }
        }
        found
    }

    /// Builds an event originating from the element `id` itself.
    pub fn event_for(&self, kind: EventKind, id: &str) -> Option<DomEvent> {
        let element = self.elements.get(id)?;
        let mut event = DomEvent::new(kind, id);
        event.classes = element.classes.iter().cloned().collect();
        event.dataset = element.dataset.clone();
        Some(event)
    }

    /// Builds an event originating from the `index`-th rendered node with
    /// `class` inside `container`; it is dispatched on the container.
    pub fn event_for_rendered(
        &self,
        kind: EventKind,
        container: &str,
        class: &str,
        index: usize,
    ) -> Option<DomEvent> {
        let node = self.query(container, class).into_iter().nth(index)?;
        let mut event = DomEvent::new(kind, container);
        event.classes = node.classes();
        event.dataset = node.dataset();
        Some(event)
    }

    pub fn add_listener(
        &mut self,
        target: &str,
        kind: EventKind,
        options: ListenerOptions,
        handler: Handler,
    ) -> Option<ListenerId> {
        if !self.elements.contains_key(target) {
            warn!(
                "event=listener_add module=ui status=missing_element id={target} kind={}",
                kind.as_str()
            );
            return None;
        }
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(Listener {
            id,
            target: target.to_string(),
            kind,
            options,
            handler,
        });
        Some(id)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listeners_on(&self, target: &str) -> usize {
        self.listeners
            .iter()
            .filter(|listener| listener.target == target)
            .count()
    }

    /// Runs matching listeners on the target and then on each ancestor,
    /// returning the intents they produced in invocation order.
    pub fn dispatch(&mut self, event: &DomEvent) -> Vec<Intent> {
        let Some(target) = self.elements.get(&event.target) else {
            warn!("event=dispatch module=ui status=missing_element id={}", event.target);
            return Vec::new();
        };
        if event.kind == EventKind::Click && target.disabled {
            return Vec::new();
        }

        let mut path = vec![event.target.clone()];
        let mut cursor = target.parent.clone();
        while let Some(id) = cursor {
            cursor = self.elements.get(&id).and_then(|el| el.parent.clone());
            path.push(id);
        }

        let mut matched: Vec<(ListenerId, bool, Handler)> = Vec::new();
        for node in &path {
            matched.extend(
                self.listeners
                    .iter()
                    .filter(|listener| &listener.target == node && listener.kind == event.kind)
                    .map(|listener| (listener.id, listener.options.once, Rc::clone(&listener.handler))),
            );
        }

        let mut intents = Vec::new();
        for (id, once, handler) in matched {
            if once {
                self.remove_listener(id);
            }
            intents.extend(handler(event));
        }
        intents
    }
}

impl Surface {
    /// Element `id` with its subtree and rendered content as a markup node.
    pub fn to_node(&self, id: &str) -> Option<Node> {
        let element = self.elements.get(id)?;
        let mut node = Node::el(&element.tag).attr("id", element.id.as_str());
        if !element.classes.is_empty() {
            let classes: Vec<&str> = element.classes.iter().map(String::as_str).collect();
            node = node.class(&classes.join(" "));
        }
        for (name, value) in &element.attrs {
            node = node.attr(name, value.as_str());
        }
        for (name, value) in &element.dataset {
            node = node.data(name, value.as_str());
        }
        if element.hidden {
            node = node.attr("hidden", "");
        }
        if element.disabled {
            node = node.attr("disabled", "");
        }
        if !element.value.is_empty() {
            node = node.attr("value", element.value.as_str());
        }
        if !element.text.is_empty() {
            node = node.with_text(element.text.as_str());
        }
        node = node.children(element.children.iter().filter_map(|child| self.to_node(child)));
        Some(node.children(element.content.iter().cloned()))
    }

    pub fn render(&self, id: &str) -> Option<Html> {
        self.to_node(id).map(|node| node.render())
    }
}
