/// DOM side of the floating button: rendering, pointer/touch listeners,
/// placement persistence and re-creation after host-page mutations

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::Utc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    AddEventListenerOptions, Document, Event, EventTarget, HtmlElement, MouseEvent, MutationObserver,
    MutationObserverInit, Node, TouchEvent, Window,
};

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::messages::{self, MessageRequest};
use crate::overlay::drag::{fit_to_viewport, DragEffect, DragMachine, Point, Rect, Viewport};
use crate::overlay::lifecycle::{Lifecycle, Reconcile};
use crate::overlay::status::{ButtonStatus, StatusTracker, DRAGGING_CLASS, SNAPPING_CLASS, TOOLTIP_SHOW_CLASS};
use crate::record::{ButtonPosition, CapturePayload, Settings};
use crate::storage::{ChromeStore, TrackerStore};

type Listener = Closure<dyn FnMut(Event)>;
type ObserverCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// Set on <html> by the first injection so repeated injections bail out
const INJECTED_ATTR: &str = "data-airdrop-tracker";

thread_local! {
    /// The page's controller. Listeners only hold weak references to it.
    static ACTIVE: RefCell<Option<Rc<OverlayController>>> = const { RefCell::new(None) };
}

fn keep_alive(controller: Rc<OverlayController>) {
    ACTIVE.with(|slot| *slot.borrow_mut() = Some(controller));
}

struct OverlayState {
    lifecycle: Lifecycle,
    drag: DragMachine,
    status: StatusTracker,
    position: ButtonPosition,
    button: Option<HtmlElement>,
    tooltip: Option<HtmlElement>,
    // Dropped together with the element they were attached to
    button_listeners: Vec<Listener>,
}

/// Owns the one floating button of this page and its drag session
pub struct OverlayController {
    config: TrackerConfig,
    window: Window,
    document: Document,
    state: RefCell<OverlayState>,
    // Registered on the window in the capture phase
    page_listeners: RefCell<Vec<(&'static str, Listener)>>,
    observer: RefCell<Option<(MutationObserver, ObserverCallback)>>,
}

impl OverlayController {
    pub fn new(config: TrackerConfig, position: ButtonPosition, window: Window, document: Document) -> Rc<Self> {
        let drag = DragMachine::new(config.drag_threshold_px);
        Rc::new(OverlayController {
            config,
            window,
            document,
            state: RefCell::new(OverlayState {
                lifecycle: Lifecycle::default(),
                drag,
                status: StatusTracker::default(),
                position,
                button: None,
                tooltip: None,
                button_listeners: Vec::new(),
            }),
            page_listeners: RefCell::new(Vec::new()),
            observer: RefCell::new(None),
        })
    }

    /// Create the button, listen for drags on the page and watch for removal
    pub fn install(self: &Rc<Self>) -> std::result::Result<(), JsValue> {
        self.create_button()?;
        self.attach_page_listeners()?;
        self.observe_body()?;
        Ok(())
    }

    fn is_present(&self) -> bool {
        self.document.get_element_by_id(&self.config.button_id).is_some()
    }

    fn create_button(self: &Rc<Self>) -> std::result::Result<(), JsValue> {
        let present = self.is_present();
        if !self.state.borrow_mut().lifecycle.try_begin_create(present) {
            return Ok(());
        }

        if let Err(e) = self.build_button() {
            self.state.borrow_mut().lifecycle.abort_create();
            return Err(e);
        }
        Ok(())
    }

    fn build_button(self: &Rc<Self>) -> std::result::Result<(), JsValue> {
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        let button: HtmlElement = self.document.create_element("button")?.dyn_into()?;
        button.set_id(&self.config.button_id);
        button.set_class_name(&self.config.button_class());
        button.set_title(&self.config.tooltip_text());
        button.set_attribute("type", "button")?;

        let tooltip: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        tooltip.set_class_name(&self.config.tooltip_class());
        tooltip.set_text_content(Some(&self.config.tooltip_text()));
        button.append_child(&tooltip)?;

        let style = button.style();
        style.set_property("position", "fixed")?;
        style.set_property("z-index", "2147483647")?;
        style.set_property("touch-action", "none")?;

        let listeners = self.attach_button_listeners(&button, &tooltip)?;

        {
            let mut state = self.state.borrow_mut();
            apply_position(&button, &state.position)?;
            state.button = Some(button.clone());
            state.tooltip = Some(tooltip);
            state.button_listeners = listeners;
        }
        self.render_status();

        body.append_child(&button)?;
        self.fit_into_viewport(&button)?;
        log::debug!("Floating button created");
        Ok(())
    }

    /// A placement saved on a larger window may start off-screen
    fn fit_into_viewport(&self, button: &HtmlElement) -> std::result::Result<(), JsValue> {
        let bounds = button.get_bounding_client_rect();
        let rect = Rect::new(bounds.left(), bounds.top(), bounds.width(), bounds.height());
        let viewport = self.viewport();

        let mut state = self.state.borrow_mut();
        if let Some(fitted) = fit_to_viewport(&state.position, rect, viewport) {
            log::debug!("Moving restored button back into view at {}", fitted.top);
            apply_position(button, &fitted)?;
            state.position = fitted;
        }
        Ok(())
    }

    fn attach_button_listeners(
        self: &Rc<Self>,
        button: &HtmlElement,
        tooltip: &HtmlElement,
    ) -> std::result::Result<Vec<Listener>, JsValue> {
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(self);
        listeners.push(listen(button, "mousedown", false, false, move |event| {
            with(&weak, |this| this.on_mouse_down(&event));
        })?);

        let weak = Rc::downgrade(self);
        listeners.push(listen(button, "touchstart", false, false, move |event| {
            with(&weak, |this| this.on_touch_start(&event));
        })?);

        let weak = Rc::downgrade(self);
        listeners.push(listen(button, "click", false, false, move |event| {
            with(&weak, |this| this.on_click(&event));
        })?);

        let tip = tooltip.clone();
        listeners.push(listen(button, "mouseenter", true, false, move |_| {
            let _ = tip.class_list().add_1(TOOLTIP_SHOW_CLASS);
        })?);

        let tip = tooltip.clone();
        listeners.push(listen(button, "mouseleave", true, false, move |_| {
            let _ = tip.class_list().remove_1(TOOLTIP_SHOW_CLASS);
        })?);

        Ok(listeners)
    }

    fn attach_page_listeners(self: &Rc<Self>) -> std::result::Result<(), JsValue> {
        // Capture phase so a page stopping propagation cannot hide a release from us
        let target: &EventTarget = self.window.as_ref();
        let mut listeners = self.page_listeners.borrow_mut();

        let weak = Rc::downgrade(self);
        listeners.push(("mousemove", listen(target, "mousemove", false, true, move |event| {
            with(&weak, |this| {
                if let Some(point) = mouse_point(&event) {
                    this.on_move(&event, point);
                }
            });
        })?));

        let weak = Rc::downgrade(self);
        listeners.push(("touchmove", listen(target, "touchmove", false, true, move |event| {
            with(&weak, |this| {
                if let Some(point) = touch_point(&event) {
                    this.on_move(&event, point);
                }
            });
        })?));

        for name in ["mouseup", "touchend"] {
            let weak = Rc::downgrade(self);
            listeners.push((name, listen(target, name, false, true, move |event| {
                with(&weak, |this| this.on_release(&event));
            })?));
        }

        let weak = Rc::downgrade(self);
        listeners.push(("touchcancel", listen(target, "touchcancel", true, true, move |_| {
            with(&weak, |this| this.on_cancel());
        })?));

        Ok(())
    }

    fn observe_body(self: &Rc<Self>) -> std::result::Result<(), JsValue> {
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        let weak = Rc::downgrade(self);
        let callback: ObserverCallback = Closure::new(move |_records: js_sys::Array, _observer: MutationObserver| {
            with(&weak, |this| this.reconcile());
        });

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer.observe_with_options(&body, &init)?;

        *self.observer.borrow_mut() = Some((observer, callback));
        Ok(())
    }

    /// Recreate the button if the page removed it and no drag holds it
    fn reconcile(self: &Rc<Self>) {
        let present = self.is_present();
        let decision = {
            let mut state = self.state.borrow_mut();
            let drag_active = state.drag.is_active();
            state.lifecycle.reconcile(present, drag_active)
        };

        if decision == Reconcile::Recreate {
            log::debug!("Floating button removed by the page, recreating");
            {
                let mut state = self.state.borrow_mut();
                state.button = None;
                state.tooltip = None;
                state.button_listeners.clear();
            }
            if let Err(e) = self.create_button() {
                log::warn!("Could not recreate floating button: {:?}", e);
            }
        }
    }

    /// Area `position: fixed` offsets are measured in, scrollbars excluded
    fn viewport(&self) -> Viewport {
        if let Some(root) = self.document.document_element() {
            return Viewport::new(root.client_width() as f64, root.client_height() as f64);
        }
        let width = self.window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = self.window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport::new(width, height)
    }

    fn button_rect(&self) -> Option<Rect> {
        let state = self.state.borrow();
        let rect = state.button.as_ref()?.get_bounding_client_rect();
        Some(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()))
    }

    fn is_on_tooltip(&self, event: &Event) -> bool {
        let state = self.state.borrow();
        let Some(tooltip) = state.tooltip.as_ref() else {
            return false;
        };
        event
            .target()
            .and_then(|t| t.dyn_into::<Node>().ok())
            .is_some_and(|node| tooltip.contains(Some(&node)))
    }

    fn on_mouse_down(&self, event: &Event) {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        if mouse.button() != 0 {
            return;
        }
        if let Some(point) = mouse_point(event) {
            if self.press(event, point) {
                // keeps the page from selecting text under the drag
                event.prevent_default();
            }
        }
    }

    fn on_touch_start(&self, event: &Event) {
        if let Some(point) = touch_point(event) {
            if self.press(event, point) {
                // suppresses the emulated mouse events and click
                event.prevent_default();
            }
        }
    }

    fn press(&self, event: &Event, point: Point) -> bool {
        if self.is_on_tooltip(event) {
            return false;
        }
        let Some(rect) = self.button_rect() else {
            return false;
        };
        self.state.borrow_mut().drag.press(point, rect)
    }

    fn on_move(self: &Rc<Self>, event: &Event, point: Point) {
        // no primary button held: the release happened where we could not see it
        let released = event
            .dyn_ref::<MouseEvent>()
            .is_some_and(|mouse| mouse.buttons() & 1 == 0);
        if released && self.state.borrow().drag.is_active() {
            log::debug!("Pointer released outside the page, ending drag");
            self.on_cancel();
            return;
        }

        let viewport = self.viewport();
        let effect = self.state.borrow_mut().drag.motion(point, viewport);

        if let DragEffect::Moved { position, began } = effect {
            event.prevent_default();
            let state = self.state.borrow();
            if let Some(button) = state.button.as_ref() {
                if began {
                    let _ = button.class_list().add_1(DRAGGING_CLASS);
                }
                if let Err(e) = apply_position(button, &position) {
                    log::warn!("Could not move floating button: {:?}", e);
                }
            }
        }
    }

    fn on_release(self: &Rc<Self>, event: &Event) {
        let viewport = self.viewport();
        let effect = self.state.borrow_mut().drag.release(viewport);

        match effect {
            DragEffect::Click => {
                event.prevent_default();
                self.capture();
            }
            DragEffect::Snapped { edge, position } => {
                event.prevent_default();
                log::debug!("Snapping floating button to {:?} edge", edge);
                self.show_snap(&position);
            }
            DragEffect::Moved { .. } | DragEffect::None => {}
        }

        // the page may have removed the button mid-drag
        self.reconcile();
    }

    fn on_cancel(self: &Rc<Self>) {
        let viewport = self.viewport();
        let effect = self.state.borrow_mut().drag.cancel(viewport);
        if let DragEffect::Snapped { position, .. } = effect {
            self.show_snap(&position);
        }
        self.reconcile();
    }

    /// Mouse clicks are handled on release; only keyboard activation lands here
    fn on_click(self: &Rc<Self>, event: &Event) {
        event.prevent_default();
        event.stop_propagation();

        let keyboard = event.dyn_ref::<MouseEvent>().is_some_and(|mouse| mouse.detail() == 0);
        if keyboard {
            self.capture();
        }
    }

    fn show_snap(self: &Rc<Self>, position: &ButtonPosition) {
        {
            // a button recreated before the snap settles starts here too
            let mut state = self.state.borrow_mut();
            state.position = position.clone();
            if let Some(button) = state.button.as_ref() {
                let _ = button.class_list().remove_1(DRAGGING_CLASS);
                let _ = button.class_list().add_1(SNAPPING_CLASS);
                if let Err(e) = apply_position(button, position) {
                    log::warn!("Could not snap floating button: {:?}", e);
                }
            }
        }

        let weak = Rc::downgrade(self);
        self.schedule(self.config.snap_feedback_ms, move || {
            with(&weak, |this| this.finish_snap());
        });
    }

    fn finish_snap(&self) {
        let persisted = {
            let mut state = self.state.borrow_mut();
            if let Some(button) = state.button.as_ref() {
                let _ = button.class_list().remove_1(SNAPPING_CLASS);
            }
            state.drag.settle()
        };

        if let Some(position) = persisted {
            spawn_local(async move {
                let store = TrackerStore::new(ChromeStore);
                if let Err(e) = store.save_button_position(&position).await {
                    log::warn!("Could not save button position: {}", e);
                }
            });
        }
    }

    /// Save the current page through the background worker
    fn capture(self: &Rc<Self>) {
        if !self.state.borrow().status.status().accepts_click() {
            return;
        }
        self.set_status(ButtonStatus::Loading);

        let this = Rc::clone(self);
        spawn_local(async move {
            match this.save_current_page().await {
                Ok(message) => {
                    log::info!("{}", message);
                    this.set_status(ButtonStatus::Success);
                }
                Err(e) => {
                    log::error!("Airdrop Tracker Error: {}", e);
                    this.set_status(ButtonStatus::Error);
                }
            }
        });
    }

    async fn save_current_page(&self) -> Result<String> {
        let url = self.window.location().href().map_err(TrackerError::dom)?;
        let title = self.document.title();

        let payload = CapturePayload::from_page(&url, &title, Utc::now())?;
        let response = messages::send(&MessageRequest::SaveUrl { data: payload }).await?;
        response.into_result()
    }

    fn set_status(self: &Rc<Self>, status: ButtonStatus) {
        let generation = self.state.borrow_mut().status.set(status);
        self.render_status();

        if let Some(ms) = status.revert_after_ms(&self.config) {
            let weak = Rc::downgrade(self);
            self.schedule(ms, move || {
                with(&weak, |this| {
                    if this.state.borrow_mut().status.revert(generation) {
                        this.render_status();
                    }
                });
            });
        }
    }

    fn render_status(&self) {
        let state = self.state.borrow();
        let status = state.status.status();

        if let Some(button) = state.button.as_ref() {
            let classes = button.class_list();
            for class in ButtonStatus::ALL_CLASSES {
                let _ = classes.remove_1(class);
            }
            if let Some(class) = status.class() {
                let _ = classes.add_1(class);
            }
        }
        if let Some(tooltip) = state.tooltip.as_ref() {
            tooltip.set_text_content(Some(&status.tooltip(&self.config)));
        }
    }

    fn schedule(&self, ms: i32, f: impl FnOnce() + 'static) {
        let callback = Closure::once_into_js(f);
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), ms)
        {
            log::warn!("setTimeout failed: {:?}", e);
        }
    }
}

impl Drop for OverlayController {
    fn drop(&mut self) {
        for (name, listener) in self.page_listeners.get_mut().drain(..) {
            let _ = self
                .window
                .remove_event_listener_with_callback_and_bool(name, listener.as_ref().unchecked_ref(), true);
        }
        if let Some((observer, _callback)) = self.observer.get_mut().take() {
            observer.disconnect();
        }
        if let Some(button) = self.state.get_mut().button.take() {
            button.remove();
        }
    }
}

fn with(weak: &Weak<OverlayController>, f: impl FnOnce(&Rc<OverlayController>)) {
    if let Some(this) = weak.upgrade() {
        f(&this);
    }
}

fn listen(
    target: &EventTarget,
    event: &str,
    passive: bool,
    capture: bool,
    handler: impl FnMut(Event) + 'static,
) -> std::result::Result<Listener, JsValue> {
    let closure: Listener = Closure::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    options.set_capture(capture);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    Ok(closure)
}

fn mouse_point(event: &Event) -> Option<Point> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(Point::new(mouse.client_x() as f64, mouse.client_y() as f64))
}

fn touch_point(event: &Event) -> Option<Point> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some(Point::new(touch.client_x() as f64, touch.client_y() as f64))
}

fn apply_position(button: &HtmlElement, position: &ButtonPosition) -> std::result::Result<(), JsValue> {
    let style = button.style();
    style.set_property("top", &position.top)?;
    style.set_property("right", &position.right)?;
    style.set_property("bottom", &position.bottom)?;
    style.set_property("left", &position.left)?;
    let transform = if position.is_centered() { "translateY(-50%)" } else { "none" };
    style.set_property("transform", transform)?;
    Ok(())
}

/// Content script entry: load settings and placement, then install the button
pub async fn start(config: TrackerConfig) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| TrackerError::Dom { reason: "no window".to_string() })?;
    let document = window
        .document()
        .ok_or_else(|| TrackerError::Dom { reason: "no document".to_string() })?;

    // Claimed before the first await so a second injection racing this one bails out
    let root = document
        .document_element()
        .ok_or_else(|| TrackerError::Dom { reason: "no document element".to_string() })?;
    if root.has_attribute(INJECTED_ATTR) || document.get_element_by_id(&config.button_id).is_some() {
        log::debug!("Floating button already injected");
        return Ok(());
    }
    root.set_attribute(INJECTED_ATTR, "").map_err(TrackerError::dom)?;

    let store = TrackerStore::new(ChromeStore);
    let settings = store.load_settings().await.unwrap_or_else(|e| {
        log::warn!("Using default settings: {}", e);
        Settings::default()
    });
    if !settings.enabled {
        log::info!("Airdrop Tracker disabled, not showing the button");
        return Ok(());
    }

    let position = match store.load_button_position().await {
        Ok(position) => position.unwrap_or_default(),
        Err(e) => {
            log::warn!("Using default button position: {}", e);
            ButtonPosition::default()
        }
    };

    let controller = OverlayController::new(config, position, window, document.clone());

    if document.body().is_some() {
        controller.install().map_err(TrackerError::dom)?;
    } else {
        let pending = Rc::clone(&controller);
        let on_ready = Closure::once_into_js(move || {
            if let Err(e) = pending.install() {
                log::error!("Could not install floating button: {:?}", e);
            }
        });
        document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
            .map_err(TrackerError::dom)?;
    }

    keep_alive(controller);
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::MouseEventInit;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn controller_at(button_id: &str, position: ButtonPosition) -> Rc<OverlayController> {
        let config = TrackerConfig {
            button_id: button_id.to_string(),
            ..TrackerConfig::default()
        };
        OverlayController::new(config, position, web_sys::window().unwrap(), document())
    }

    fn controller() -> Rc<OverlayController> {
        let window = web_sys::window().unwrap();
        OverlayController::new(TrackerConfig::default(), ButtonPosition::default(), window, document())
    }

    fn button_by_id(id: &str) -> HtmlElement {
        document().get_element_by_id(id).unwrap().dyn_into().unwrap()
    }

    fn center(button: &HtmlElement) -> (f64, f64) {
        let rect = button.get_bounding_client_rect();
        (rect.left() + rect.width() / 2.0, rect.top() + rect.height() / 2.0)
    }

    fn mouse(kind: &str, x: f64, y: f64, buttons: u16) -> MouseEvent {
        let init = MouseEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        init.set_client_x(x as i32);
        init.set_client_y(y as i32);
        init.set_buttons(buttons);
        MouseEvent::new_with_mouse_event_init_dict(kind, &init).unwrap()
    }

    fn dispatch(target: &EventTarget, event: MouseEvent) {
        target.dispatch_event(&event).unwrap();
    }

    #[wasm_bindgen_test]
    fn test_button_lifecycle_in_document() {
        let controller = controller();
        controller.install().unwrap();

        // second creation is a no-op
        controller.create_button().unwrap();
        let first: Node = document().get_element_by_id("airdrop-tracker-button").unwrap().into();
        assert!(controller.state.borrow().button.as_ref().unwrap().is_same_node(Some(&first)));

        let button: HtmlElement = first.dyn_into().unwrap();
        assert_eq!(button.style().get_property_value("right").unwrap(), "0px");
        assert_eq!(button.style().get_property_value("transform").unwrap(), "translateY(-50%)");

        controller.set_status(ButtonStatus::Error);
        assert!(button.class_list().contains("error"));
        assert_eq!(
            controller.state.borrow().tooltip.as_ref().unwrap().text_content().unwrap(),
            "Failed to save"
        );

        button.remove();
        controller.reconcile();
        let recreated = document().get_element_by_id("airdrop-tracker-button").unwrap();
        assert!(recreated.class_list().contains("error"));
    }

    #[wasm_bindgen_test]
    fn test_move_without_button_held_ends_press() {
        let id = "airdrop-tracker-lost-release";
        let controller = controller_at(id, ButtonPosition::default());
        controller.install().unwrap();
        let button = button_by_id(id);
        let body = document().body().unwrap();
        let (x, y) = center(&button);

        dispatch(&button, mouse("mousedown", x, y, 1));
        assert!(controller.state.borrow().drag.is_active());

        // the mouseup went somewhere we never saw
        dispatch(&body, mouse("mousemove", x - 200.0, y, 0));

        assert!(!controller.state.borrow().drag.is_active());
        assert!(!button.class_list().contains(DRAGGING_CLASS));
        assert_eq!(button.style().get_property_value("right").unwrap(), "0px");

        dispatch(&button, mouse("mousedown", x, y, 1));
        assert!(controller.state.borrow().drag.is_active());
    }

    #[wasm_bindgen_test]
    fn test_release_seen_when_page_stops_propagation() {
        let id = "airdrop-tracker-stopped-mouseup";
        let controller = controller_at(id, ButtonPosition::default());
        controller.install().unwrap();
        let button = button_by_id(id);
        let body = document().body().unwrap();
        let (x, y) = center(&button);

        let stopper: Listener = Closure::new(|event: Event| event.stop_propagation());
        body.add_event_listener_with_callback("mouseup", stopper.as_ref().unchecked_ref())
            .unwrap();

        dispatch(&button, mouse("mousedown", x, y, 1));
        dispatch(&body, mouse("mousemove", x - 200.0, y, 1));
        assert!(button.class_list().contains(DRAGGING_CLASS));

        dispatch(&body, mouse("mouseup", x - 200.0, y, 0));

        assert!(!controller.state.borrow().drag.is_active());
        assert!(button.class_list().contains(SNAPPING_CLASS));

        body.remove_event_listener_with_callback("mouseup", stopper.as_ref().unchecked_ref())
            .unwrap();
    }

    #[wasm_bindgen_test]
    fn test_button_removed_mid_drag_comes_back_snapped() {
        let id = "airdrop-tracker-removed-mid-drag";
        let controller = controller_at(id, ButtonPosition::default());
        controller.install().unwrap();
        let button = button_by_id(id);
        let body = document().body().unwrap();
        let (x, y) = center(&button);

        dispatch(&button, mouse("mousedown", x, y, 1));
        dispatch(&body, mouse("mousemove", 5.0, y, 1));
        button.remove();
        dispatch(&body, mouse("mouseup", 5.0, y, 0));

        let recreated = button_by_id(id);
        assert!(!recreated.is_same_node(Some(&button)));
        assert_eq!(recreated.style().get_property_value("left").unwrap(), "0px");
        assert_eq!(recreated.style().get_property_value("right").unwrap(), "auto");
        assert_eq!(controller.state.borrow().position.left, "0px");
    }

    #[wasm_bindgen_test]
    fn test_viewport_excludes_scrollbars() {
        let controller = controller_at("airdrop-tracker-viewport", ButtonPosition::default());
        let root = document().document_element().unwrap();

        let viewport = controller.viewport();

        assert_eq!(viewport, Viewport::new(root.client_width() as f64, root.client_height() as f64));
        assert!(viewport.width <= controller.window.inner_width().unwrap().as_f64().unwrap());
    }

    #[wasm_bindgen_test]
    fn test_saved_position_below_window_is_pulled_into_view() {
        let id = "airdrop-tracker-offscreen";
        let saved = ButtonPosition {
            top: "100000px".to_string(),
            right: "0px".to_string(),
            left: "auto".to_string(),
            bottom: "auto".to_string(),
        };
        let controller = controller_at(id, saved);
        controller.install().unwrap();
        let button = button_by_id(id);

        let rect = button.get_bounding_client_rect();
        assert!(rect.bottom() <= controller.viewport().height + 0.5);
        assert_eq!(button.style().get_property_value("right").unwrap(), "0px");
        assert_ne!(controller.state.borrow().position.top, "100000px");
    }

    #[wasm_bindgen_test]
    fn test_kept_controller_lives_until_released() {
        let controller = controller_at("airdrop-tracker-kept", ButtonPosition::default());
        let weak = Rc::downgrade(&controller);

        keep_alive(controller);
        assert!(weak.upgrade().is_some());

        ACTIVE.with(|slot| slot.borrow_mut().take());
        assert!(weak.upgrade().is_none());
    }
}
