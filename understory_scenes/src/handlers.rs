// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small input helpers scenes install while they are showing.
//!
//! ## Minimal example
//!
//! ```
//! use understory_scenes::handlers::{EscHandler, HoverEvent, HoverHandler};
//!
//! let mut closed = false;
//! let mut esc = EscHandler::new(|| closed = true);
//! assert!(!esc.handle_key("Enter"));
//! assert!(esc.handle_key("Escape"));
//!
//! let mut events = Vec::new();
//! let mut hover = HoverHandler::new(|e| events.push(e));
//! hover.pointer_enter();
//! hover.pointer_enter();
//! hover.pointer_leave();
//! drop(hover);
//! assert_eq!(events, [HoverEvent::Enter, HoverEvent::Leave]);
//! # drop(esc);
//! # assert!(closed);
//! ```
//!
//! The [`web`](crate::adapters) adapter wires these to DOM listeners and
//! hands back a [`Teardown`](crate::scene::Teardown) that detaches them.

use core::fmt;

/// Key value reported for the Escape key.
pub const ESCAPE: &str = "Escape";

/// Invokes a callback when Escape is pressed and ignores every other key.
pub struct EscHandler<F> {
    callback: F,
}

impl<F: FnMut()> EscHandler<F> {
    /// Create a handler around `callback`.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }

    /// Feed a key value (e.g. `KeyboardEvent.key`). Returns `true` if the
    /// callback ran.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if key != ESCAPE {
            return false;
        }
        (self.callback)();
        true
    }
}

impl<F> fmt::Debug for EscHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EscHandler").finish_non_exhaustive()
    }
}

/// Hover transition reported by [`HoverHandler`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HoverEvent {
    /// The pointer entered the element.
    Enter,
    /// The pointer left the element.
    Leave,
}

/// Tracks whether the pointer is over an element and reports transitions.
///
/// Repeated enters (or leaves) without the opposite event in between are
/// swallowed, so callbacks always see strictly alternating events.
pub struct HoverHandler<F> {
    callback: F,
    hovered: bool,
}

impl<F: FnMut(HoverEvent)> HoverHandler<F> {
    /// Create a handler around `callback`, starting outside the element.
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            hovered: false,
        }
    }

    /// The pointer entered. Returns the reported event, if any.
    pub fn pointer_enter(&mut self) -> Option<HoverEvent> {
        self.transition(true)
    }

    /// The pointer left. Returns the reported event, if any.
    pub fn pointer_leave(&mut self) -> Option<HoverEvent> {
        self.transition(false)
    }

    /// Whether the pointer is currently over the element.
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    fn transition(&mut self, hovered: bool) -> Option<HoverEvent> {
        if self.hovered == hovered {
            return None;
        }
        self.hovered = hovered;
        let event = if hovered {
            HoverEvent::Enter
        } else {
            HoverEvent::Leave
        };
        (self.callback)(event);
        Some(event)
    }
}

impl<F> fmt::Debug for HoverHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoverHandler")
            .field("hovered", &self.hovered)
            .finish_non_exhaustive()
    }
}
