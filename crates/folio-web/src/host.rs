#![forbid(unsafe_code)]

//! Browser host: DOM listeners in, `requestAnimationFrame` / `setTimeout`
//! out.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, Outcome, PageConfig};
use folio_runtime::{Cmd, Msg, Page};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, KeyboardEvent, MouseEvent, Window};

use crate::dom::DomTree;
use crate::error::DomError;

/// `<body>` attribute holding a JSON [`PageConfig`].
pub const CONFIG_ATTRIBUTE: &str = "data-folio-config";

/// `<body>` attribute holding the console log level (`info` by default).
pub const LOG_ATTRIBUTE: &str = "data-folio-log";

pub(crate) struct Host {
    window: Window,
    page: RefCell<Page<DomTree>>,
}

/// Read the page configuration from `body`, falling back to defaults.
pub(crate) fn read_config(body: &Element) -> PageConfig {
    let config = match body.get_attribute(CONFIG_ATTRIBUTE) {
        Some(raw) => PageConfig::from_json_str(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "ignoring invalid page configuration");
            PageConfig::default()
        }),
        None => PageConfig::default(),
    };
    if let Ok(effective) = config.to_json_string() {
        debug!(config = %effective, "page configuration");
    }
    config
}

/// Bind `document`, install listeners, and run the page's startup commands.
pub(crate) fn start(window: Window, document: Document, config: &PageConfig) -> Result<Rc<Host>, DomError> {
    let tree = DomTree::new(window.clone(), document.clone());
    let page = Page::new(tree, config)?;
    let host = Rc::new(Host {
        window: window.clone(),
        page: RefCell::new(page),
    });

    let init = host.page.borrow_mut().init();
    execute(&host, init);

    listen_clicks(&host, &document)?;
    listen_keys(&host, &document)?;
    listen_scroll(&host, &window)?;
    info!("folio page attached");
    Ok(host)
}

/// Run `msg` through the page and schedule whatever it asks for.
fn send(host: &Rc<Host>, msg: Msg) -> Outcome {
    let update = match host.page.try_borrow_mut() {
        Ok(mut page) => page.update(msg),
        Err(_) => {
            warn!(?msg, "re-entrant page update dropped");
            return Outcome::Ignored;
        }
    };
    execute(host, update.cmd);
    update.outcome
}

fn execute(host: &Rc<Host>, cmd: Cmd) {
    for cmd in cmd.into_vec() {
        if let Err(err) = schedule(host, cmd) {
            warn!(error = %err, "failed to schedule page callback");
        }
    }
}

fn schedule(host: &Rc<Host>, cmd: Cmd) -> Result<(), DomError> {
    match cmd {
        Cmd::RequestFrame(token) => {
            let h = Rc::clone(host);
            let callback = Closure::once_into_js(move |now_ms: f64| {
                send(&h, Msg::Frame { token, now_ms });
            });
            host.window
                .request_animation_frame(callback.unchecked_ref())
                .map_err(|e| DomError::js(&e))?;
        }
        Cmd::SetTimeout { delay_ms, task } => {
            let h = Rc::clone(host);
            let callback = Closure::once_into_js(move || {
                send(&h, Msg::Timer(task));
            });
            let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
            host.window
                .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
                .map_err(|e| DomError::js(&e))?;
        }
        Cmd::None | Cmd::Batch(_) => {}
    }
    Ok(())
}

fn listen_clicks(host: &Rc<Host>, document: &Document) -> Result<(), DomError> {
    let h = Rc::clone(host);
    let on_click = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(node) = h.page.try_borrow().map(|page| page.tree().intern(&target)) else {
            return;
        };
        if send(&h, Msg::Input(Event::click(node))).is_consumed() {
            event.prevent_default();
        }
    });
    document
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .map_err(|e| DomError::js(&e))?;
    // Listeners live as long as the page.
    on_click.forget();
    Ok(())
}

fn listen_keys(host: &Rc<Host>, document: &Document) -> Result<(), DomError> {
    let h = Rc::clone(host);
    let on_key = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        if send(&h, Msg::Input(Event::Key(key_event(&event)))).is_consumed() {
            event.prevent_default();
        }
    });
    document
        .add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())
        .map_err(|e| DomError::js(&e))?;
    on_key.forget();
    Ok(())
}

fn listen_scroll(host: &Rc<Host>, window: &Window) -> Result<(), DomError> {
    let h = Rc::clone(host);
    let on_scroll = Closure::<dyn FnMut()>::new(move || {
        send(&h, Msg::Input(Event::Scroll));
    });
    window
        .add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())
        .map_err(|e| DomError::js(&e))?;
    on_scroll.forget();
    Ok(())
}

/// Translate a DOM `keydown` event.
pub(crate) fn key_event(event: &KeyboardEvent) -> KeyEvent {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, event.shift_key());
    modifiers.set(Modifiers::ALT, event.alt_key());
    modifiers.set(Modifiers::CTRL, event.ctrl_key());
    modifiers.set(Modifiers::SUPER, event.meta_key());
    let kind = if event.repeat() {
        KeyEventKind::Repeat
    } else {
        KeyEventKind::Press
    };
    KeyEvent::new(KeyCode::from_dom_key(&event.key()))
        .with_modifiers(modifiers)
        .with_kind(kind)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::{KeyboardEventInit, MouseEventInit};

    wasm_bindgen_test_configure!(run_in_browser);

    fn window() -> Window {
        web_sys::window().unwrap()
    }

    fn document() -> Document {
        window().document().unwrap()
    }

    fn body() -> Element {
        document().body().unwrap().into()
    }

    fn by_id(id: &str) -> Element {
        document().get_element_by_id(id).unwrap()
    }

    fn keydown(init: &KeyboardEventInit) -> KeyboardEvent {
        KeyboardEvent::new_with_keyboard_event_init_dict("keydown", init).unwrap()
    }

    #[wasm_bindgen_test]
    fn config_attribute_is_read() {
        let body = body();
        body.set_attribute(CONFIG_ATTRIBUTE, r#"{"timing": {"focus_trap_delay_ms": 80}}"#)
            .unwrap();
        let config = read_config(&body);
        assert_eq!(config.timing.focus_trap_delay_ms, 80);
        assert_eq!(config.selectors.modal, ".modal");
        body.remove_attribute(CONFIG_ATTRIBUTE).unwrap();
    }

    #[wasm_bindgen_test]
    fn invalid_config_falls_back_to_defaults() {
        let body = body();
        for raw in ["{not json", r##"{"selectors": {"scroll_target": "#1projects"}}"##] {
            body.set_attribute(CONFIG_ATTRIBUTE, raw).unwrap();
            assert_eq!(read_config(&body), PageConfig::default(), "{raw}");
        }
        body.remove_attribute(CONFIG_ATTRIBUTE).unwrap();
    }

    #[wasm_bindgen_test]
    fn missing_config_uses_defaults() {
        let body = body();
        body.remove_attribute(CONFIG_ATTRIBUTE).unwrap();
        assert_eq!(read_config(&body), PageConfig::default());
    }

    #[wasm_bindgen_test]
    fn shift_tab_translates_modifiers() {
        let init = KeyboardEventInit::new();
        init.set_key("Tab");
        init.set_shift_key(true);
        let key = key_event(&keydown(&init));
        assert_eq!(key.code, KeyCode::Tab);
        assert!(key.modifiers.contains(Modifiers::SHIFT));
        assert!(!key.modifiers.contains(Modifiers::CTRL));
        assert_eq!(key.kind, KeyEventKind::Press);
        assert!(key.is_back_tab());
    }

    #[wasm_bindgen_test]
    fn held_key_is_a_repeat() {
        let init = KeyboardEventInit::new();
        init.set_key("Escape");
        init.set_repeat(true);
        init.set_ctrl_key(true);
        init.set_meta_key(true);
        let key = key_event(&keydown(&init));
        assert_eq!(key.code, KeyCode::Escape);
        assert_eq!(key.kind, KeyEventKind::Repeat);
        assert!(key.modifiers.contains(Modifiers::CTRL | Modifiers::SUPER));
        assert!(key.is_down());
    }

    #[wasm_bindgen_test]
    fn listeners_prevent_default_only_when_consumed() {
        document().body().unwrap().set_inner_html(
            r##"
            <a id="trigger" class="scroll-button" href="#projects">Projects</a>
            <section id="projects">
              <div id="card" class="project-card" data-modal="modal-1">card</div>
            </section>
            <div id="modal-1" class="modal"><button class="close-modal">x</button></div>
            "##,
        );
        let _host = start(window(), document(), &PageConfig::default()).unwrap();

        let click = || {
            let init = MouseEventInit::new();
            init.set_bubbles(true);
            init.set_cancelable(true);
            MouseEvent::new_with_mouse_event_init_dict("click", &init).unwrap()
        };

        // Card clicks open the modal but keep the browser default.
        let event = click();
        by_id("card").dispatch_event(&event).unwrap();
        assert!(!event.default_prevented());
        assert!(by_id("modal-1").class_list().contains("active"));

        // Escape closes it and is not consumed either.
        let init = KeyboardEventInit::new();
        init.set_key("Escape");
        init.set_bubbles(true);
        init.set_cancelable(true);
        let escape = keydown(&init);
        document().dispatch_event(&escape).unwrap();
        assert!(!escape.default_prevented());
        assert!(!by_id("modal-1").class_list().contains("active"));

        // The scroll trigger's navigation is replaced by the animation.
        let event = click();
        by_id("trigger").dispatch_event(&event).unwrap();
        assert!(event.default_prevented());

        // Enter on a focused card activates it.
        let card: web_sys::HtmlElement = by_id("card").dyn_into().unwrap();
        card.focus().unwrap();
        let init = KeyboardEventInit::new();
        init.set_key("Enter");
        init.set_bubbles(true);
        init.set_cancelable(true);
        let enter = keydown(&init);
        card.dispatch_event(&enter).unwrap();
        assert!(enter.default_prevented());
        assert!(by_id("modal-1").class_list().contains("active"));
    }
}
