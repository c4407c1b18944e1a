// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! History sync, back navigation, and navigation requested from inside a scene.
//!
//! The "drawer" scene keeps a navigator and uses it like an Escape key
//! listener would, to go back to the room. A recorded history stands in for
//! `window.history`.
//!
//! Run:
//! - `cargo run -p understory_scenes_demos --example scenes_history`

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use kurbo::Size;
use understory_scenes::handlers::EscHandler;
use understory_scenes::proportions::AspectRatio;
use understory_scenes::router::{Scenes, fragment_identifier};
use understory_scenes::scene::{Navigator, SceneConfig, Teardown};
use understory_scenes::types::{History, HistoryState, Host};

#[derive(Default)]
struct Stage;

impl Host for Stage {
    fn add_class(&mut self, _class: &str) {}
    fn remove_class(&mut self, _class: &str) {}
    fn clear_children(&mut self) {}
    fn set_style(&mut self, _property: &str, _value: Option<&str>) {}
}

#[derive(Default)]
struct Recorded {
    entries: Vec<HistoryState>,
}

impl History for Recorded {
    fn pathname(&self) -> String {
        "/index.html".into()
    }
    fn push_state(&mut self, state: &HistoryState, url: &str) {
        println!("  pushState({:?}, {url:?})", state.path);
        self.entries.push(state.clone());
    }
}

#[derive(Default)]
struct Drawer {
    visits: u32,
}

fn main() {
    let ms = Duration::from_millis;
    let mut scenes = Scenes::with_history(
        Stage,
        Recorded::default(),
        AspectRatio::new(1, 1).unwrap(),
        Size::new(800.0, 600.0),
    );

    // Stands in for a keydown listener the drawer installs.
    let esc: Rc<RefCell<Option<EscHandler<Box<dyn FnMut()>>>>> = Rc::default();

    let esc_slot = Rc::clone(&esc);
    scenes
        .add("room", SceneConfig::new(|_| Teardown::noop()).with_path("/room"))
        .unwrap()
        .add(
            "drawer",
            SceneConfig::new(move |ctx| {
                let visits = ctx.state::<Drawer>();
                visits.borrow_mut().visits += 1;
                println!("  drawer opened {} time(s)", visits.borrow().visits);

                let nav: Navigator = ctx.navigator();
                let back: Box<dyn FnMut()> = Box::new(move || nav.show("room"));
                *esc_slot.borrow_mut() = Some(EscHandler::new(back));
                let esc_slot = Rc::clone(&esc_slot);
                Teardown::new(move || {
                    esc_slot.borrow_mut().take();
                })
            })
            .with_path("/drawer"),
        )
        .unwrap();

    println!("== Deep link #/drawer ==");
    scenes
        .show_or(fragment_identifier("#/drawer"), "room", ms(0))
        .unwrap();
    scenes.poll(ms(80));

    println!("== Escape ==");
    if let Some(handler) = esc.borrow_mut().as_mut() {
        handler.handle_key("Escape");
    }
    scenes.poll(ms(100));
    scenes.poll(ms(260));
    println!("  current: {:?}", scenes.current().map(|s| s.name()));
    assert!(esc.borrow().is_none(), "drawer teardown removes its key handler");

    println!("== Back button ==");
    let back = scenes.history().entries[0].clone();
    scenes.pop_state(Some(&back), ms(300));
    scenes.poll(ms(460));
    println!("  current: {:?}", scenes.current().map(|s| s.name()));
    assert_eq!(scenes.history().entries.len(), 2);
}
