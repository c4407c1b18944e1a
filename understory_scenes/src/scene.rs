// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene definitions and the creator/teardown contract.
//!
//! ## Overview
//!
//! A scene is registered with a creator callback. Each time the scene is
//! shown the router calls the creator with a [`SceneContext`], and the creator
//! builds its content in the host and returns a [`Teardown`] that undoes
//! every side effect it caused. The router runs that teardown exactly once
//! before the scene is discarded.
//!
//! ## Persistent state
//!
//! [`SceneContext::state`] hands out a shared, typed cell that survives hide
//! and show cycles of the same scene, e.g. whether blinds are open:
//!
//! ```
//! use understory_scenes::scene::{SceneConfig, Teardown};
//! # use understory_scenes::types::Host;
//! # struct El;
//! # impl Host for El {
//! #     fn add_class(&mut self, _: &str) {}
//! #     fn remove_class(&mut self, _: &str) {}
//! #     fn clear_children(&mut self) {}
//! #     fn set_style(&mut self, _: &str, _: Option<&str>) {}
//! # }
//!
//! #[derive(Default)]
//! struct Blinds {
//!     open: bool,
//! }
//!
//! let config: SceneConfig<El> = SceneConfig::new(|ctx| {
//!     let state = ctx.state::<Blinds>();
//!     let mut blinds = state.borrow_mut();
//!     blinds.open = !blinds.open;
//!     Teardown::noop()
//! })
//! .with_path("/room");
//! # let _ = config;
//! ```
//!
//! ## Navigation from inside a scene
//!
//! Listeners installed by a scene outlive the creator call, so they cannot
//! borrow the router. They hold a [`Navigator`] instead and request a scene
//! change through it; the router executes the request on its next
//! [`poll`](crate::router::Scenes::poll).

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use core::any::Any;
use core::cell::RefCell;
use core::fmt;

use crate::error::TeardownError;

type Release = Box<dyn FnOnce() -> Result<(), TeardownError>>;

/// Release callback returned by a scene creator.
///
/// Runs at most once: either explicitly through [`Teardown::run`] or, if it
/// was never run, when dropped. Failures reported by a fallible teardown are
/// logged at `warn` level when the guard is dropped.
#[must_use = "dropping a Teardown runs it immediately"]
pub struct Teardown {
    release: Option<Release>,
}

impl Teardown {
    /// Wrap an infallible release callback.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(move || {
                release();
                Ok(())
            })),
        }
    }

    /// Wrap a release callback that can fail.
    pub fn fallible<E: fmt::Display>(release: impl FnOnce() -> Result<(), E> + 'static) -> Self {
        Self {
            release: Some(Box::new(move || {
                release().map_err(|e| TeardownError(e.to_string()))
            })),
        }
    }

    /// A teardown with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Combine several teardowns; they run in order.
    pub fn all(parts: impl IntoIterator<Item = Self>) -> Self {
        let parts: alloc::vec::Vec<Self> = parts.into_iter().collect();
        Self {
            release: Some(Box::new(move || {
                let mut first_err = None;
                for part in parts {
                    if let Err(e) = part.run() {
                        first_err.get_or_insert(e);
                    }
                }
                first_err.map_or(Ok(()), Err)
            })),
        }
    }

    /// Whether the release callback has yet to run.
    pub fn is_armed(&self) -> bool {
        self.release.is_some()
    }

    /// Run the release callback now.
    pub fn run(mut self) -> Result<(), TeardownError> {
        self.release.take().map_or(Ok(()), |release| release())
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        if let Some(release) = self.release.take()
            && let Err(e) = release()
        {
            log::warn!("{e}");
        }
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown")
            .field("armed", &self.is_armed())
            .finish_non_exhaustive()
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::noop()
    }
}

/// Opaque per-scene state slot, retained for the lifetime of the registry.
///
/// The router allocates one per registered scene and never looks inside.
#[derive(Default)]
pub struct SceneState {
    slot: Option<Rc<dyn Any>>,
}

impl SceneState {
    /// Return the shared state of type `T`, creating it with `T::default()`
    /// on first use. A slot holding a different type is replaced.
    pub fn get_or_default<T: Default + 'static>(&mut self) -> Rc<RefCell<T>> {
        if let Some(existing) = self.slot.clone()
            && let Ok(state) = existing.downcast::<RefCell<T>>()
        {
            return state;
        }
        let fresh = Rc::new(RefCell::new(T::default()));
        self.slot = Some(fresh.clone() as Rc<dyn Any>);
        fresh
    }

    /// Whether no state has been created yet.
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

impl fmt::Debug for SceneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneState")
            .field("empty", &self.is_empty())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct NavigatorInner {
    request: Option<String>,
    waker: Option<Rc<dyn Fn()>>,
    closed: bool,
}

/// Cloneable handle for requesting a scene change from outside the router's
/// borrow, e.g. from an Escape key listener installed by a scene.
///
/// Requests collapse to the latest one. They are executed by
/// [`Scenes::poll`](crate::router::Scenes::poll) like an external
/// [`show`](crate::router::Scenes::show); unknown identifiers are logged and
/// dropped. Once the router is destroyed the navigator is closed and further
/// requests are ignored.
#[derive(Clone, Default)]
pub struct Navigator {
    inner: Rc<RefCell<NavigatorInner>>,
}

impl Navigator {
    /// Create a navigator with no pending request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that `identifier` be shown.
    ///
    /// Invokes the waker, if any, after the request is recorded. Does nothing
    /// once closed.
    pub fn show(&self, identifier: impl Into<String>) {
        let waker = {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                return;
            }
            inner.request = Some(identifier.into());
            inner.waker.clone()
        };
        if let Some(wake) = waker {
            wake();
        }
    }

    /// Install a callback invoked whenever a request is recorded.
    pub fn set_waker(&self, waker: Option<Rc<dyn Fn()>>) {
        self.inner.borrow_mut().waker = waker;
    }

    /// The pending request, if any.
    pub fn pending(&self) -> Option<String> {
        self.inner.borrow().request.clone()
    }

    /// Whether the owning router has been destroyed.
    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    pub(crate) fn take(&self) -> Option<String> {
        self.inner.borrow_mut().request.take()
    }

    pub(crate) fn clear(&self) {
        self.inner.borrow_mut().request = None;
    }

    // Drop the pending request and the waker; later requests are ignored.
    pub(crate) fn close(&self) {
        let waker = {
            let mut inner = self.inner.borrow_mut();
            inner.closed = true;
            inner.request = None;
            inner.waker.take()
        };
        drop(waker);
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("pending", &self.inner.borrow().request)
            .finish_non_exhaustive()
    }
}

/// What a scene creator gets to work with.
pub struct SceneContext<'a, H: ?Sized> {
    host: &'a mut H,
    name: &'a str,
    path: &'a str,
    state: &'a mut SceneState,
    navigator: &'a Navigator,
}

impl<H: ?Sized> fmt::Debug for SceneContext<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneContext")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<'a, H: ?Sized> SceneContext<'a, H> {
    pub(crate) fn new(
        host: &'a mut H,
        name: &'a str,
        path: &'a str,
        state: &'a mut SceneState,
        navigator: &'a Navigator,
    ) -> Self {
        Self {
            host,
            name,
            path,
            state,
            navigator,
        }
    }

    /// The element to render into.
    pub fn host(&self) -> &H {
        &*self.host
    }

    /// The element to render into, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut *self.host
    }

    /// Name of the scene being created.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Path of the scene being created.
    pub fn path(&self) -> &str {
        self.path
    }

    /// Shared state of type `T` for this scene. See [`SceneState::get_or_default`].
    pub fn state<T: Default + 'static>(&mut self) -> Rc<RefCell<T>> {
        self.state.get_or_default()
    }

    /// A navigator for requesting scene changes later.
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }
}

/// Creator callback: build the scene and return its teardown.
pub type SceneCreator<H> = Box<dyn FnMut(&mut SceneContext<'_, H>) -> Teardown>;

/// Registration record passed to [`Scenes::add`](crate::router::Scenes::add).
pub struct SceneConfig<H: ?Sized> {
    pub(crate) creator: SceneCreator<H>,
    pub(crate) path: Option<String>,
}

impl<H: ?Sized> SceneConfig<H> {
    /// A scene built by `creator`. Without [`with_path`](Self::with_path), the
    /// scene's name doubles as its path.
    pub fn new(creator: impl FnMut(&mut SceneContext<'_, H>) -> Teardown + 'static) -> Self {
        Self {
            creator: Box::new(creator),
            path: None,
        }
    }

    /// Set the URL fragment path of the scene.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl<H: ?Sized> fmt::Debug for SceneConfig<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneConfig")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// A registered scene.
pub struct Scene<H: ?Sized> {
    name: String,
    path: String,
    creator: SceneCreator<H>,
    state: SceneState,
}

impl<H: ?Sized> Scene<H> {
    pub(crate) fn new(name: String, config: SceneConfig<H>) -> Self {
        let path = config.path.unwrap_or_else(|| name.clone());
        Self {
            name,
            path,
            creator: config.creator,
            state: SceneState::default(),
        }
    }

    /// Unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unique path, used as URL fragment.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn render(&mut self, host: &mut H, navigator: &Navigator) -> Teardown {
        let mut ctx = SceneContext::new(host, &self.name, &self.path, &mut self.state, navigator);
        (self.creator)(&mut ctx)
    }
}

impl<H: ?Sized> fmt::Debug for Scene<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
