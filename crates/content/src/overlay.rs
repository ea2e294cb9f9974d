//! Floating controls, page listeners and notifications.
//!
//! Listeners never touch the session. They translate DOM events into
//! [`Command`]s and push them onto the session's channel; the command loop
//! applies them one at a time. Detaching drops the listener closures, which is
//! safe because no closure ever runs the command that detaches it.

use crate::dom::{ElementRef, ElementRegistry};
use engine::config::HiderConfig;
use engine::overlay::{HistoryState, Notification, Overlay};
use engine::session::Command;
use engine::shortcut::Shortcut;
use futures::channel::mpsc::UnboundedSender;
use gloo_timers::future::TimeoutFuture;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, KeyboardEvent};

pub type CommandSender = UnboundedSender<Command<ElementRef>>;

const NOTIFICATION_CLASS: &str = "element-hider-notification";
const NOTIFICATION_SHOW_DELAY_MS: u32 = 10;
const NOTIFICATION_FADE_MS: u32 = 300;

fn send(commands: &CommandSender, command: Command<ElementRef>) {
    if commands.unbounded_send(command).is_err() {
        log::error!("Hiding session is gone, dropping command");
    }
}

/// Buttons of the floating control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceButton {
    Undo,
    Redo,
    Accept,
    Cancel,
    Reset,
}

impl SurfaceButton {
    fn all() -> [SurfaceButton; 5] {
        [
            SurfaceButton::Undo,
            SurfaceButton::Redo,
            SurfaceButton::Accept,
            SurfaceButton::Cancel,
            SurfaceButton::Reset,
        ]
    }

    fn id(&self) -> &'static str {
        match self {
            SurfaceButton::Undo => "fab-undo",
            SurfaceButton::Redo => "fab-redo",
            SurfaceButton::Accept => "fab-accept",
            SurfaceButton::Cancel => "fab-cancel",
            SurfaceButton::Reset => "fab-reset",
        }
    }

    fn class_name(&self) -> &'static str {
        match self {
            SurfaceButton::Accept => "fab-button fab-accept",
            SurfaceButton::Cancel => "fab-button fab-cancel",
            SurfaceButton::Reset => "fab-button fab-reset",
            _ => "fab-button",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            SurfaceButton::Undo => "Undo (Ctrl+Z)",
            SurfaceButton::Redo => "Redo (Ctrl+Y)",
            SurfaceButton::Accept => "Accept Changes",
            SurfaceButton::Cancel => "Cancel & Restore All (Esc)",
            SurfaceButton::Reset => "Reset All Rules For This Site",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            SurfaceButton::Undo => {
                r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M3 7v6h6"></path><path d="M21 17a9 9 0 00-9-9 9 9 0 00-6 2.3L3 13"></path></svg>"#
            }
            SurfaceButton::Redo => {
                r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M21 7v6h-6"></path><path d="M3 17a9 9 0 019-9 9 9 0 016 2.3l3 2.7"></path></svg>"#
            }
            SurfaceButton::Accept => {
                r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><polyline points="20 6 9 17 4 12"></polyline></svg>"#
            }
            SurfaceButton::Cancel => {
                r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><line x1="18" y1="6" x2="6" y2="18"></line><line x1="6" y1="6" x2="18" y2="18"></line></svg>"#
            }
            SurfaceButton::Reset => {
                r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><polyline points="1 4 1 10 7 10"></polyline><path d="M3.51 15a9 9 0 102.13-9.36L1 10"></path></svg>"#
            }
        }
    }

    fn command(&self) -> Command<ElementRef> {
        match self {
            SurfaceButton::Undo => Command::Undo,
            SurfaceButton::Redo => Command::Redo,
            SurfaceButton::Accept => Command::Accept,
            SurfaceButton::Cancel => Command::Cancel,
            SurfaceButton::Reset => Command::Reset,
        }
    }
}

/// The mounted control surface. Dropping it unmounts it.
struct Surface {
    container: Element,
    buttons: Vec<(SurfaceButton, Element, Closure<dyn FnMut(Event)>)>,
}

impl Surface {
    fn refresh(&self, state: HistoryState) {
        for (button, element, _) in &self.buttons {
            let enabled = match button {
                SurfaceButton::Undo => state.can_undo,
                SurfaceButton::Redo => state.can_redo,
                _ => continue,
            };
            let _ = element
                .class_list()
                .toggle_with_force("disabled", !enabled);
        }
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.container.remove();
    }
}

/// Capture-phase listeners on the document. Dropping them unregisters them.
struct PageListeners {
    document: Document,
    handlers: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl PageListeners {
    fn new(document: Document) -> Self {
        Self {
            document,
            handlers: Vec::new(),
        }
    }

    fn add<F>(&mut self, event: &'static str, handler: F)
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        if self
            .document
            .add_event_listener_with_callback_and_bool(event, closure.as_ref().unchecked_ref(), true)
            .is_err()
        {
            log::warn!("Could not listen for `{}`", event);
        }
        self.handlers.push((event, closure));
    }
}

impl Drop for PageListeners {
    fn drop(&mut self) {
        for (event, closure) in &self.handlers {
            let _ = self.document.remove_event_listener_with_callback_and_bool(
                event,
                closure.as_ref().unchecked_ref(),
                true,
            );
        }
    }
}

/// Event target, unless it lies inside the control surface
fn page_target(event: &Event, surface_selector: &str) -> Option<Element> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    match target.closest(surface_selector) {
        Ok(Some(_)) => None,
        _ => Some(target),
    }
}

pub struct WebOverlay {
    document: Document,
    registry: Rc<ElementRegistry>,
    config: HiderConfig,
    commands: CommandSender,
    surface: Option<Surface>,
    listeners: Option<PageListeners>,
}

impl WebOverlay {
    pub fn new(
        document: Document,
        registry: Rc<ElementRegistry>,
        config: HiderConfig,
        commands: CommandSender,
    ) -> Self {
        Self {
            document,
            registry,
            config,
            commands,
            surface: None,
            listeners: None,
        }
    }

    fn mount_surface(&self) -> Option<Surface> {
        let body = self.document.body()?;
        let container = self.document.create_element("div").ok()?;
        container.set_id(&self.config.surface.container_id);

        let mut buttons = Vec::new();
        for button in SurfaceButton::all() {
            let element = self.document.create_element("div").ok()?;
            element.set_id(button.id());
            element.set_class_name(button.class_name());
            let _ = element.set_attribute("title", button.title());
            element.set_inner_html(button.icon());

            let commands = self.commands.clone();
            let on_click = Closure::wrap(Box::new(move |event: Event| {
                event.prevent_default();
                event.stop_propagation();
                send(&commands, button.command());
            }) as Box<dyn FnMut(Event)>);
            let _ = element
                .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());

            container.append_child(&element).ok()?;
            buttons.push((button, element, on_click));
        }

        body.append_child(&container).ok()?;
        Some(Surface { container, buttons })
    }

    fn install_listeners(&self) -> PageListeners {
        let mut listeners = PageListeners::new(self.document.clone());
        let surface_selector = format!("#{}", self.config.surface.container_id);

        {
            let commands = self.commands.clone();
            let registry = self.registry.clone();
            let surface_selector = surface_selector.clone();
            listeners.add("click", move |event| {
                let Some(target) = page_target(&event, &surface_selector) else {
                    return;
                };
                event.prevent_default();
                event.stop_propagation();
                send(&commands, Command::Hide(registry.handle(target)));
            });
        }

        {
            let commands = self.commands.clone();
            let registry = self.registry.clone();
            let surface_selector = surface_selector.clone();
            listeners.add("mouseover", move |event| {
                if let Some(target) = page_target(&event, &surface_selector) {
                    send(&commands, Command::HoverIn(registry.handle(target)));
                }
            });
        }

        {
            let commands = self.commands.clone();
            let registry = self.registry.clone();
            listeners.add("mouseout", move |event| {
                if let Some(target) = page_target(&event, &surface_selector) {
                    send(&commands, Command::HoverOut(registry.handle(target)));
                }
            });
        }

        {
            let commands = self.commands.clone();
            listeners.add("keydown", move |event| {
                let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let modifier = key_event.ctrl_key() || key_event.meta_key();
                if let Some(shortcut) =
                    Shortcut::from_key(&key_event.key(), modifier, key_event.shift_key())
                {
                    event.prevent_default();
                    send(&commands, shortcut.command());
                }
            });
        }

        listeners
    }
}

impl Overlay for WebOverlay {
    fn attach(&mut self) {
        if self.surface.is_none() {
            self.surface = self.mount_surface();
            if self.surface.is_none() {
                log::warn!("Could not mount the control surface");
            }
        }
        if self.listeners.is_none() {
            self.listeners = Some(self.install_listeners());
        }
    }

    fn detach(&mut self) {
        self.listeners = None;
        self.surface = None;
    }

    fn refresh(&mut self, state: HistoryState) {
        if let Some(surface) = &self.surface {
            surface.refresh(state);
        }
    }

    fn notify(&self, notification: &Notification) {
        show_notification(
            &self.document,
            &notification.message(),
            notification.is_error(),
            self.config.notification.duration_ms,
        );
    }
}

/// Shows a transient message that fades out on its own
fn show_notification(document: &Document, message: &str, is_error: bool, duration_ms: u32) {
    let Some(body) = document.body() else {
        return;
    };
    let Ok(node) = document.create_element("div") else {
        return;
    };
    node.set_class_name(NOTIFICATION_CLASS);
    if is_error {
        let _ = node.class_list().add_1("error");
    }
    node.set_text_content(Some(message));
    if body.append_child(&node).is_err() {
        return;
    }

    spawn_local(async move {
        TimeoutFuture::new(NOTIFICATION_SHOW_DELAY_MS).await;
        let _ = node.class_list().add_1("show");
        TimeoutFuture::new(duration_ms).await;
        let _ = node.class_list().remove_1("show");
        TimeoutFuture::new(NOTIFICATION_FADE_MS).await;
        node.remove();
    });
}
