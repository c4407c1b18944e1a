// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser adapter: `web-sys` implementations of the router seams, plus a
//! driver that owns the DOM listeners and the poll timer.
//!
//! ## Usage
//!
//! ```no_run
//! use understory_scenes::adapters::web::{WebScenes, esc_handler};
//! use understory_scenes::scene::{SceneConfig, Teardown};
//! use wasm_bindgen::JsCast;
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let host: web_sys::HtmlElement = web_sys::window()
//!     .and_then(|w| w.document())
//!     .and_then(|d| d.get_element_by_id("scenes"))
//!     .ok_or("missing #scenes")?
//!     .dyn_into()
//!     .map_err(|_| "#scenes is not an HTML element")?;
//!
//! let scenes = WebScenes::new(host, "16:9".parse()?)?;
//! scenes
//!     .add("room", SceneConfig::new(|_| Teardown::noop()).with_path("/room"))?
//!     .add(
//!         "drawer",
//!         SceneConfig::new(|ctx| {
//!             let nav = ctx.navigator();
//!             esc_handler(move || nav.show("room")).unwrap_or_default()
//!         })
//!         .with_path("/drawer"),
//!     )?;
//! scenes.show_initial("room")?;
//! # Ok(())
//! # }
//! ```

use alloc::collections::BTreeSet;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::time::Duration;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use js_sys::{Object, Reflect};
use kurbo::Size;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, EventTarget, HtmlElement, KeyboardEvent, PopStateEvent, Window};

use crate::error::SceneError;
use crate::handlers::{EscHandler, HoverEvent, HoverHandler};
use crate::options::SceneOptions;
use crate::proportions::AspectRatio;
use crate::router::{Scenes, fragment_identifier};
use crate::scene::{Navigator, SceneConfig, Teardown};
use crate::types::{History, HistoryState, Host};

/// The browser environment is missing something the adapter needs.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum WebError {
    /// No global `window` (e.g. running in a worker).
    #[error("no global window")]
    NoWindow,
    /// The window has no document.
    #[error("window has no document")]
    NoDocument,
}

impl Host for HtmlElement {
    fn add_class(&mut self, class: &str) {
        if let Err(e) = self.class_list().add_1(class) {
            log::warn!("scenes: failed to add class {class:?}: {e:?}");
        }
    }

    fn remove_class(&mut self, class: &str) {
        if let Err(e) = self.class_list().remove_1(class) {
            log::warn!("scenes: failed to remove class {class:?}: {e:?}");
        }
    }

    fn clear_children(&mut self) {
        self.set_inner_html("");
    }

    fn set_style(&mut self, property: &str, value: Option<&str>) {
        let style = self.style();
        let result = match value {
            Some(value) => style.set_property(property, value),
            None => style.remove_property(property).map(drop),
        };
        if let Err(e) = result {
            log::warn!("scenes: failed to set style {property:?}: {e:?}");
        }
    }
}

/// [`History`] over `window.history` and `window.location`.
#[derive(Clone, Debug)]
pub struct BrowserHistory {
    window: Window,
}

impl BrowserHistory {
    /// Bind to the global window.
    pub fn new() -> Result<Self, WebError> {
        web_sys::window()
            .map(|window| Self { window })
            .ok_or(WebError::NoWindow)
    }
}

impl History for BrowserHistory {
    fn pathname(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn push_state(&mut self, state: &HistoryState, url: &str) {
        let history = match self.window.history() {
            Ok(history) => history,
            Err(e) => {
                log::warn!("scenes: history unavailable: {e:?}");
                return;
            }
        };
        let data = Object::new();
        if let Err(e) = Reflect::set(&data, &JsValue::from_str("path"), &JsValue::from_str(&state.path)) {
            log::warn!("scenes: failed to build history state: {e:?}");
            return;
        }
        if let Err(e) = history.push_state_with_url(&data, "", Some(url)) {
            log::warn!("scenes: pushState to {url:?} failed: {e:?}");
        }
    }
}

/// Read the `path` of a `popstate` event's state object, if any.
pub fn history_state_of(event: &PopStateEvent) -> Option<HistoryState> {
    let state = event.state();
    if state.is_null() || state.is_undefined() {
        return None;
    }
    Reflect::get(&state, &JsValue::from_str("path"))
        .ok()
        .and_then(|path| path.as_string())
        .map(HistoryState::new)
}

/// Inner size of `window`, in CSS pixels.
pub fn viewport_of(window: &Window) -> Size {
    let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Size::new(
        dimension(window.inner_width()),
        dimension(window.inner_height()),
    )
}

fn now_of(window: &Window) -> Duration {
    let millis = window
        .performance()
        .map_or_else(js_sys::Date::now, |p| p.now());
    Duration::from_secs_f64(millis.max(0.0) / 1000.0)
}

// Rounds up so a timer never fires before the deadline it was armed for.
fn delay_millis(delay: Duration) -> u32 {
    u32::try_from(delay.as_micros().div_ceil(1000)).unwrap_or(u32::MAX)
}

// Check a request that cannot reach the router yet because it is borrowed.
fn check_deferred(
    known: &BTreeSet<String>,
    closed: bool,
    identifier: &str,
) -> Result<(), SceneError> {
    if closed {
        return Err(SceneError::Destroyed);
    }
    if !known.contains(identifier) {
        return Err(SceneError::SceneNotFound {
            identifier: identifier.into(),
        });
    }
    Ok(())
}

struct Inner {
    window: Window,
    scenes: RefCell<Scenes<HtmlElement, BrowserHistory>>,
    navigator: Navigator,
    // Names and paths, readable while `scenes` is borrowed.
    known: RefCell<BTreeSet<String>>,
    timer: RefCell<Option<Timeout>>,
    // The timeout whose callback is running; released on the next fire.
    spent: RefCell<Option<Timeout>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl Inner {
    fn now(&self) -> Duration {
        now_of(&self.window)
    }

    fn arm(this: &Rc<Self>, delay: u32) {
        let weak = Rc::downgrade(this);
        let timeout = Timeout::new(delay, move || {
            if let Some(inner) = weak.upgrade() {
                Self::fire(&inner);
            }
        });
        // Replacing a pending timeout cancels it.
        this.timer.borrow_mut().replace(timeout);
    }

    fn fire(this: &Rc<Self>) {
        // The firing timeout must outlive its own callback.
        let fired = this.timer.borrow_mut().take();
        this.spent.replace(fired);
        let now = this.now();
        this.scenes.borrow_mut().poll(now);
        Self::reschedule(this, now);
    }

    fn reschedule(this: &Rc<Self>, now: Duration) {
        let delay = {
            let scenes = this.scenes.borrow();
            if this.navigator.pending().is_some() {
                Some(Duration::ZERO)
            } else {
                scenes.next_deadline().map(|at| at.saturating_sub(now))
            }
        };
        match delay {
            Some(delay) => Self::arm(this, delay_millis(delay)),
            None => {
                this.timer.borrow_mut().take();
            }
        }
    }

    fn refresh_known(&self) {
        let scenes = self.scenes.borrow();
        let mut known = self.known.borrow_mut();
        known.clear();
        for scene in scenes.iter() {
            known.insert(scene.name().into());
            known.insert(scene.path().into());
        }
    }

    fn attach(this: &Rc<Self>) {
        let mut listeners = this.listeners.borrow_mut();

        let weak = Rc::downgrade(this);
        listeners.push(EventListener::new(&this.window, "resize", move |_: &Event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let now = inner.now();
            let viewport = viewport_of(&inner.window);
            inner.scenes.borrow_mut().resize(viewport, now);
            Self::reschedule(&inner, now);
        }));

        let weak = Rc::downgrade(this);
        listeners.push(EventListener::new(
            &this.window,
            "orientationchange",
            move |_: &Event| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let viewport = viewport_of(&inner.window);
                inner.scenes.borrow_mut().orientation_change(viewport);
            },
        ));

        let weak = Rc::downgrade(this);
        listeners.push(EventListener::new(&this.window, "popstate", move |event: &Event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let state = event.dyn_ref::<PopStateEvent>().and_then(history_state_of);
            let now = inner.now();
            inner.scenes.borrow_mut().pop_state(state.as_ref(), now);
            Self::reschedule(&inner, now);
        }));
    }
}

/// A [`Scenes`] router wired to the live browser window.
///
/// Owns the `resize`, `orientationchange` and `popstate` listeners and a
/// single timeout that polls the router at its next deadline. Dropping the
/// handle, or calling [`destroy`](Self::destroy), detaches everything.
///
/// Scene creators run while the router is borrowed; they navigate through
/// [`SceneContext::navigator`](crate::scene::SceneContext::navigator).
pub struct WebScenes {
    inner: Rc<Inner>,
}

impl fmt::Debug for WebScenes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebScenes")
            .field("scenes", &self.inner.scenes)
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

impl WebScenes {
    /// Create a router over `host` with default options.
    pub fn new(host: HtmlElement, aspect_ratio: AspectRatio) -> Result<Self, WebError> {
        Self::with_options(host, aspect_ratio, SceneOptions::default())
    }

    /// Create a router over `host`.
    ///
    /// Sizes `host` to the current window and attaches listeners.
    pub fn with_options(
        host: HtmlElement,
        aspect_ratio: AspectRatio,
        options: SceneOptions,
    ) -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let history = BrowserHistory {
            window: window.clone(),
        };
        let scenes = Scenes::with_options(
            host,
            history,
            aspect_ratio,
            options,
            viewport_of(&window),
        );
        let navigator = scenes.navigator();
        let inner = Rc::new(Inner {
            window,
            scenes: RefCell::new(scenes),
            navigator,
            known: RefCell::new(BTreeSet::new()),
            timer: RefCell::new(None),
            spent: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });

        let weak: Weak<Inner> = Rc::downgrade(&inner);
        inner.navigator.set_waker(Some(Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Inner::arm(&inner, 0);
                }
            })));
        Inner::attach(&inner);
        Ok(Self { inner })
    }

    /// Register a scene. See [`Scenes::add`].
    pub fn add(
        &self,
        name: impl Into<String>,
        config: SceneConfig<HtmlElement>,
    ) -> Result<&Self, SceneError> {
        self.inner.scenes.borrow_mut().add(name, config)?;
        self.inner.refresh_known();
        Ok(self)
    }

    /// Whether `identifier` names a registered scene or path.
    pub fn has(&self, identifier: &str) -> bool {
        self.inner.scenes.borrow().has(identifier)
    }

    /// Show a scene. See [`Scenes::show`].
    ///
    /// Called re-entrantly from inside a scene creator, the identifier is
    /// still validated and errors are returned as usual; `Ok` then means the
    /// request was handed to the navigator and runs on the next poll.
    pub fn show(&self, identifier: &str) -> Result<(), SceneError> {
        let now = self.inner.now();
        let Ok(mut scenes) = self.inner.scenes.try_borrow_mut() else {
            check_deferred(
                &self.inner.known.borrow(),
                self.inner.navigator.is_closed(),
                identifier,
            )?;
            self.inner.navigator.show(identifier);
            return Ok(());
        };
        scenes.show(identifier, now)?;
        drop(scenes);
        Inner::reschedule(&self.inner, now);
        Ok(())
    }

    /// Show the scene named by the URL fragment, or `fallback` when the
    /// fragment is empty or unknown.
    pub fn show_initial(&self, fallback: &str) -> Result<(), SceneError> {
        let hash = self.inner.window.location().hash().unwrap_or_default();
        let identifier = fragment_identifier(&hash);
        let target = if self.has(identifier) {
            identifier
        } else {
            fallback
        };
        self.show(target)
    }

    /// A navigator for requesting scene changes from listeners.
    pub fn navigator(&self) -> Navigator {
        self.inner.navigator.clone()
    }

    /// Run `f` with the router borrowed mutably.
    ///
    /// Polls afterwards so timers reflect whatever `f` did.
    pub fn with_scenes<R>(&self, f: impl FnOnce(&mut Scenes<HtmlElement, BrowserHistory>) -> R) -> R {
        let now = self.inner.now();
        let result = f(&mut self.inner.scenes.borrow_mut());
        self.inner.refresh_known();
        Inner::reschedule(&self.inner, now);
        result
    }

    /// Detach listeners, cancel the timer and destroy the router.
    ///
    /// Closes the navigator and drops its waker, so requests from surviving
    /// navigator clones no longer arm timers.
    pub fn destroy(&self) {
        self.inner.listeners.borrow_mut().clear();
        self.inner.navigator.set_waker(None);
        self.inner.timer.borrow_mut().take();
        self.inner.scenes.borrow_mut().destroy();
    }
}

/// Call `callback` whenever Escape is pressed anywhere in the document.
///
/// The returned teardown removes the listener.
pub fn esc_handler(callback: impl FnMut() + 'static) -> Result<Teardown, WebError> {
    let document = web_sys::window()
        .ok_or(WebError::NoWindow)?
        .document()
        .ok_or(WebError::NoDocument)?;
    let mut handler = EscHandler::new(callback);
    let listener = EventListener::new(&document, "keydown", move |event: &Event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        handler.handle_key(&event.key());
    });
    Ok(Teardown::new(move || drop(listener)))
}

/// Report pointer enter and leave on `target`.
///
/// The returned teardown removes both listeners.
pub fn hover_handler(
    target: &EventTarget,
    callback: impl FnMut(HoverEvent) + 'static,
) -> Teardown {
    let handler = Rc::new(RefCell::new(HoverHandler::new(callback)));

    let enter = Rc::clone(&handler);
    let on_enter = EventListener::new(target, "mouseenter", move |_: &Event| {
        enter.borrow_mut().pointer_enter();
    });
    let on_leave = EventListener::new(target, "mouseleave", move |_: &Event| {
        handler.borrow_mut().pointer_leave();
    });
    Teardown::new(move || drop((on_enter, on_leave)))
}
