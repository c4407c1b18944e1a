// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the router: host and history seams, listener flags, and
//! transition phases.
//!
//! ## Overview
//!
//! The router never touches a real document. It talks to the element it
//! renders into through [`Host`] and to browser history through [`History`].
//! Toolkits implement these for their own element handle; the
//! [`web`](crate::adapters) adapter implements them for `web-sys`.

use alloc::string::String;

/// The element scenes render into.
///
/// The router borrows it for class-list, child and inline-style manipulation.
/// Scene creators receive it through
/// [`SceneContext::host_mut`](crate::scene::SceneContext::host_mut) and build
/// their content inside it.
pub trait Host {
    /// Add a class to the element's class list.
    fn add_class(&mut self, class: &str);
    /// Remove a class from the element's class list. Missing classes are ignored.
    fn remove_class(&mut self, class: &str);
    /// Remove every child of the element.
    fn clear_children(&mut self);
    /// Set an inline style property, or remove it when `value` is `None`.
    fn set_style(&mut self, property: &str, value: Option<&str>);
}

/// State object stored with each pushed history entry.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct HistoryState {
    /// Path of the scene that was shown when the entry was pushed.
    pub path: String,
}

impl HistoryState {
    /// Create a state for `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Browser history seam.
///
/// Used by [`Scenes::show`](crate::router::Scenes::show) to push an entry
/// once a transition completes.
pub trait History {
    /// Path part of the current page URL (without fragment).
    fn pathname(&self) -> String;
    /// Push a new entry carrying `state` with the given `url`.
    fn push_state(&mut self, state: &HistoryState, url: &str);
}

/// A history that records nothing.
///
/// The default when the router runs outside a browser or URL sync is unwanted.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoHistory;

impl History for NoHistory {
    #[inline]
    fn pathname(&self) -> String {
        String::new()
    }

    #[inline]
    fn push_state(&mut self, _state: &HistoryState, _url: &str) {}
}

bitflags::bitflags! {
    /// Viewport and history listeners the router is attached to.
    ///
    /// All are attached by [`Scenes::new`](crate::router::Scenes::new) and
    /// detached by [`Scenes::destroy`](crate::router::Scenes::destroy).
    /// Events for detached listeners are ignored.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Listeners: u8 {
        /// Viewport `resize` (throttled).
        const RESIZE             = 0b0000_0001;
        /// Device `orientationchange` (not throttled).
        const ORIENTATION_CHANGE = 0b0000_0010;
        /// History `popstate`.
        const POP_STATE          = 0b0000_0100;
    }
}

/// Where the router is within a scene transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransitionPhase {
    /// No transition in flight; requests start immediately.
    Idle,
    /// The outgoing scene is fading; it is torn down when the settle delay elapses.
    TransitioningOut,
    /// The incoming scene is installed; the transition class is removed when the settle delay elapses.
    TransitioningIn,
}

/// Whether a scene is showing.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveStatus {
    /// No scene has been shown yet.
    NeverShown,
    /// A scene is installed in the host.
    Showing,
    /// A scene was shown and has since been torn down without replacement.
    Closed,
}
