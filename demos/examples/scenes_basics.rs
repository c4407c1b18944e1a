// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Register two scenes, switch between them, and watch the host element.
//!
//! This example drives the router with a simulated clock and prints the
//! host's classes and children at each step of a transition.
//!
//! Run:
//! - `cargo run -p understory_scenes_demos --example scenes_basics`

use std::time::Duration;

use kurbo::Size;
use understory_scenes::router::Scenes;
use understory_scenes::scene::{SceneConfig, SceneContext, Teardown};
use understory_scenes::types::{Host, TransitionPhase};

#[derive(Debug, Default)]
struct Stage {
    classes: Vec<String>,
    children: Vec<String>,
    width: String,
    height: String,
}

impl Host for Stage {
    fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }
    fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }
    fn clear_children(&mut self) {
        self.children.clear();
    }
    fn set_style(&mut self, property: &str, value: Option<&str>) {
        let value = value.unwrap_or_default().to_string();
        match property {
            "width" => self.width = value,
            "height" => self.height = value,
            _ => {}
        }
    }
}

fn dump(label: &str, scenes: &Scenes<Stage>) {
    let host = scenes.host();
    println!(
        "{label:>10}: phase={:?} classes={:?} children={:?}",
        scenes.phase(),
        host.classes,
        host.children
    );
}

fn main() {
    let ms = Duration::from_millis;
    let mut scenes = Scenes::new(
        Stage::default(),
        "16:9".parse().unwrap(),
        Size::new(1280.0, 1024.0),
    );
    println!("== Sizing ==\n  {} x {}", scenes.host().width, scenes.host().height);

    scenes
        .add(
            "room",
            SceneConfig::new(|ctx: &mut SceneContext<'_, Stage>| {
                ctx.host_mut().children.push("tv".into());
                ctx.host_mut().children.push("drawer-handle".into());
                Teardown::new(|| println!("  room: tween killed"))
            })
            .with_path("/room"),
        )
        .unwrap()
        .add(
            "drawer",
            SceneConfig::new(|ctx: &mut SceneContext<'_, Stage>| {
                ctx.host_mut().children.push("letters".into());
                Teardown::noop()
            })
            .with_path("/drawer"),
        )
        .unwrap();

    println!("== Show room ==");
    scenes.show("room", ms(0)).unwrap();
    dump("t=0", &scenes);
    scenes.poll(ms(80));
    dump("t=80", &scenes);

    println!("== Show /drawer ==");
    scenes.show("/drawer", ms(100)).unwrap();
    dump("t=100", &scenes);
    scenes.poll(ms(180));
    dump("t=180", &scenes);
    scenes.poll(ms(260));
    dump("t=260", &scenes);
    assert_eq!(scenes.phase(), TransitionPhase::Idle);
    assert_eq!(scenes.host().children, ["letters"]);

    println!("== Unknown scene ==");
    if let Err(e) = scenes.show("attic", ms(300)) {
        println!("  {e}");
    }

    println!("== Resize burst ==");
    for (t, w) in [(400, 1000.0), (420, 1100.0), (450, 1200.0)] {
        scenes.resize(Size::new(w, 2000.0), ms(t));
        println!("  t={t}: width={}", scenes.host().width);
    }
    scenes.poll(ms(500));
    println!("  t=500: width={}", scenes.host().width);
    assert_eq!(scenes.host().width, "1200px");

    scenes.destroy();
    dump("destroyed", &scenes);
}
