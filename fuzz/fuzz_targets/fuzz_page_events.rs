#![no_main]

//! Arbitrary input sequences against the stock portfolio page.
//!
//! Checked after every step:
//! - each modal's `active` class matches `aria-hidden="false"`;
//! - the scroll lock is held iff a modal is open;
//! - the viewport stays within the document.

use arbitrary::Arbitrary;
use folio_core::{
    ElementSpec, Event, KeyCode, KeyEvent, MemoryTree, Modifiers, NodeId, PageConfig, UiTree,
};
use folio_runtime::{Driver, Page};
use libfuzzer_sys::fuzz_target;

const MAX_SCROLL: f64 = 3000.0;

#[derive(Debug, Arbitrary)]
enum Key {
    Enter,
    Space,
    Escape,
    Tab,
    ShiftTab,
    Other(char),
}

#[derive(Debug, Arbitrary)]
enum Step {
    Click(u8),
    Key(Key),
    Focus(u8),
    Advance(u16),
    Frames(u8),
    UserScroll(u16),
}

struct Fixture {
    driver: Driver<MemoryTree>,
    nodes: Vec<NodeId>,
    modals: Vec<NodeId>,
}

fn fixture() -> Option<Fixture> {
    let mut tree = MemoryTree::new().with_max_scroll(MAX_SCROLL);
    let body = tree.root();
    let mut nodes = vec![body];
    let trigger = tree.append(body, ElementSpec::new("a").class("scroll-button").attr("href", "#projects"));
    nodes.push(trigger);
    nodes.push(tree.append(trigger, ElementSpec::new("span")));
    nodes.push(tree.append(body, ElementSpec::new("div").class("scroll-indicator")));
    let section = tree.append(body, ElementSpec::new("section").id("projects").top(1400.0));
    nodes.push(section);

    let mut modals = Vec::new();
    for id in ["alpha", "beta", "missing"] {
        let card = tree.append(
            section,
            ElementSpec::new("div").class("project-card").attr("data-modal", id),
        );
        nodes.push(card);
        nodes.push(tree.append(card, ElementSpec::new("a").class("youtube-link").attr("href", "#v")));
    }
    for id in ["alpha", "beta"] {
        let modal = tree.append(body, ElementSpec::new("div").class("modal").id(id));
        nodes.push(modal);
        nodes.push(tree.append(modal, ElementSpec::new("button").class("close-modal")));
        nodes.push(tree.append(modal, ElementSpec::new("input")));
        nodes.push(tree.append(modal, ElementSpec::new("a").attr("href", "#")));
        modals.push(modal);
    }

    let page = Page::new(tree, &PageConfig::default()).ok()?;
    Some(Fixture {
        driver: Driver::new(page),
        nodes,
        modals,
    })
}

fn key_event(key: Key) -> KeyEvent {
    match key {
        Key::Enter => KeyEvent::new(KeyCode::Enter),
        Key::Space => KeyEvent::new(KeyCode::Char(' ')),
        Key::Escape => KeyEvent::new(KeyCode::Escape),
        Key::Tab => KeyEvent::new(KeyCode::Tab),
        Key::ShiftTab => KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT),
        Key::Other(c) => KeyEvent::new(KeyCode::Char(c)),
    }
}

fuzz_target!(|steps: Vec<Step>| {
    let Some(mut f) = fixture() else { return };

    for step in steps.into_iter().take(256) {
        match step {
            Step::Click(i) => {
                let target = f.nodes[usize::from(i) % f.nodes.len()];
                f.driver.dispatch(Event::click(target));
            }
            Step::Key(key) => {
                f.driver.dispatch(Event::Key(key_event(key)));
            }
            Step::Focus(i) => {
                let target = f.nodes[usize::from(i) % f.nodes.len()];
                f.driver.tree_mut().focus(target);
            }
            Step::Advance(ms) => {
                f.driver.advance(f64::from(ms));
            }
            Step::Frames(n) => {
                f.driver.run_frames(usize::from(n % 32));
            }
            Step::UserScroll(y) => {
                f.driver.tree_mut().set_scroll_y(f64::from(y));
                f.driver.dispatch(Event::Scroll);
            }
        }

        let tree = f.driver.tree();
        let mut open = 0;
        for &modal in &f.modals {
            let active = tree.has_class(modal, "active");
            let hidden = tree.attribute(modal, "aria-hidden");
            assert_eq!(active, hidden.as_deref() == Some("false"));
            open += usize::from(active);
        }
        assert_eq!(open, f.driver.page().modals().open_count());
        assert_eq!(tree.is_scroll_locked(), open > 0);
        let y = tree.scroll_y();
        assert!((0.0..=MAX_SCROLL).contains(&y));
    }

    f.driver.run_until_idle();
    assert!(f.driver.is_idle());
});
