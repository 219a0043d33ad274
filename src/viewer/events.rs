//! Pointer and keyboard handlers for `GridView`.
//!
//! Handlers translate DOM coordinates into grid positions and forward to the
//! [`GridController`](crate::GridController). While a drag or resize is in
//! progress, `mousemove`/`mouseup` are also watched on the window so the
//! gesture ends even when the button is released outside the grid.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, KeyboardEvent, MouseEvent, Window};

use super::{Shared, SharedState};
use crate::grid::KeyOutcome;
use crate::render::fill_handle_rect;
use crate::types::{KeyInput, Position};

/// Width of the grab area at a header cell's right edge.
const RESIZE_HANDLE_SIZE: f32 = 8.0;

/// Window listeners installed for the duration of one gesture.
///
/// Dropping the guard removes them. The guard must not be dropped from
/// inside one of its own callbacks; `end_gesture` defers the drop to a
/// microtask for that reason.
pub(crate) struct WindowListeners {
    window: Window,
    mouse_move: Closure<dyn FnMut(MouseEvent)>,
    mouse_up: Closure<dyn FnMut(MouseEvent)>,
}

impl WindowListeners {
    fn install(shared: &Shared) -> Option<Self> {
        let window = web_sys::window()?;

        let mouse_move = {
            let shared = shared.clone();
            Closure::wrap(Box::new(move |event: MouseEvent| {
                let x = client_x(&shared, &event);
                shared.update(|s| {
                    if s.grid.is_resizing() {
                        s.grid.resize_to(x - s.resize_anchor_x);
                    } else {
                        s.grid.pointer_moved(event.buttons());
                    }
                });
                if !shared.state.borrow().gesture_active() {
                    end_gesture(&shared);
                }
            }) as Box<dyn FnMut(MouseEvent)>)
        };
        let mouse_up = {
            let shared = shared.clone();
            Closure::wrap(Box::new(move |_event: MouseEvent| {
                shared.update(|s| {
                    s.grid.mouse_up();
                    s.grid.end_resize();
                });
                end_gesture(&shared);
            }) as Box<dyn FnMut(MouseEvent)>)
        };

        window
            .add_event_listener_with_callback("mousemove", mouse_move.as_ref().unchecked_ref())
            .ok();
        window
            .add_event_listener_with_callback("mouseup", mouse_up.as_ref().unchecked_ref())
            .ok();
        Some(Self {
            window,
            mouse_move,
            mouse_up,
        })
    }
}

impl Drop for WindowListeners {
    fn drop(&mut self) {
        self.window
            .remove_event_listener_with_callback(
                "mousemove",
                self.mouse_move.as_ref().unchecked_ref(),
            )
            .ok();
        self.window
            .remove_event_listener_with_callback("mouseup", self.mouse_up.as_ref().unchecked_ref())
            .ok();
    }
}

fn begin_gesture(shared: &Shared) {
    if shared.state.borrow().window_listeners.is_some() {
        return;
    }
    let guard = WindowListeners::install(shared);
    shared.state.borrow_mut().window_listeners = guard;
}

fn end_gesture(shared: &Shared) {
    let guard = shared.state.borrow_mut().window_listeners.take();
    if let Some(guard) = guard {
        wasm_bindgen_futures::spawn_local(async move {
            drop(guard);
        });
    }
}

#[allow(clippy::cast_possible_truncation)]
fn client_x(shared: &Shared, event: &MouseEvent) -> f32 {
    let rect = shared.container.get_bounding_client_rect();
    event.client_x() as f32 - rect.left() as f32
}

/// Pointer position relative to the grid's top-left corner.
#[allow(clippy::cast_possible_truncation)]
fn local_point(container: &HtmlElement, event: &MouseEvent) -> (f32, f32) {
    let rect = container.get_bounding_client_rect();
    (
        event.client_x() as f32 - rect.left() as f32,
        event.client_y() as f32 - rect.top() as f32,
    )
}

/// Flat row index as a position on the group-row cell.
fn group_position(s: &SharedState, y: f32) -> Option<Position> {
    let row = s.grid.row_at_y(y)?;
    if !s.grid.row_model().is_group_row(row) {
        return None;
    }
    Some(Position::new(-1, isize::try_from(row).ok()?))
}

fn on_fill_handle(s: &SharedState, x: f32, y: f32) -> bool {
    fill_handle_rect(&s.grid).is_some_and(|r| x >= r.x && x < r.right() && y >= r.y && y < r.bottom())
}

fn mouse_down(shared: &Shared, event: &MouseEvent) {
    let (x, y) = local_point(&shared.container, event);
    let buttons = event.buttons();
    shared.update(|s| {
        let config = s.grid.config();
        if y < config.header_row_height() {
            let Some(idx) = s.grid.layout().column_at_x(x, s.grid.viewport().scroll_left) else {
                return;
            };
            let right = s
                .grid
                .layout()
                .rect_left(idx, s.grid.viewport().scroll_left)
                .zip(s.grid.layout().get(idx))
                .map(|(left, c)| left + c.width);
            let on_handle = right.is_some_and(|r| x >= r - RESIZE_HANDLE_SIZE);
            if on_handle && s.grid.begin_resize(idx) {
                s.resize_anchor_x = x;
            } else {
                s.grid.sort_column(idx);
            }
            return;
        }
        if y < config.total_header_height() {
            return;
        }
        if on_fill_handle(s, x, y) {
            s.grid.fill_handle_mouse_down(buttons);
            return;
        }
        if let Some(pos) = group_position(s, y) {
            s.grid.select_cell(pos, false);
            return;
        }
        if let Some(pos) = s.grid.position_at(x, y) {
            s.grid.cell_mouse_down(pos, buttons);
        }
    });
    if shared.state.borrow().gesture_active() {
        begin_gesture(shared);
    }
}

fn mouse_move(shared: &Shared, event: &MouseEvent) {
    if event.buttons() != 1 || !shared.state.borrow().grid.is_dragging() {
        return;
    }
    let (x, y) = local_point(&shared.container, event);
    shared.update(|s| {
        if let Some(pos) = s.grid.position_at(x, y) {
            s.grid.cell_mouse_enter(pos, event.buttons());
        }
    });
}

fn click(shared: &Shared, event: &MouseEvent) {
    let (x, y) = local_point(&shared.container, event);
    shared.update(|s| {
        if y < s.grid.config().total_header_height() {
            return;
        }
        if let Some(pos) = group_position(s, y) {
            let group_id = pos
                .row()
                .and_then(|r| s.grid.row_model().get(r))
                .and_then(|r| r.as_group())
                .map(|g| g.id.clone());
            if let Some(id) = group_id {
                s.grid.toggle_group(&id);
            }
            return;
        }
        if let Some(pos) = s.grid.position_at(x, y) {
            s.grid.cell_click(pos);
        }
    });
}

fn double_click(shared: &Shared, event: &MouseEvent) {
    let (x, y) = local_point(&shared.container, event);
    shared.update(|s| {
        if y < s.grid.config().total_header_height() {
            return;
        }
        if on_fill_handle(s, x, y) {
            s.grid.fill_handle_double_click();
        } else if let Some(pos) = s.grid.position_at(x, y) {
            s.grid.cell_double_click(pos);
        }
    });
}

fn key_down(shared: &Shared, event: &KeyboardEvent) {
    let input = KeyInput {
        key: event.key(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
        shift: event.shift_key(),
        alt: event.alt_key(),
    };
    let outcome = shared.update(|s| s.grid.handle_key_down(&input));
    match outcome {
        KeyOutcome::Handled => event.prevent_default(),
        KeyOutcome::ReadClipboard => {
            event.prevent_default();
            read_clipboard_and_paste(shared);
        }
        KeyOutcome::Ignored | KeyOutcome::ExitGrid => {}
    }
}

fn read_clipboard_and_paste(shared: &Shared) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let promise = window.navigator().clipboard().read_text();
    let shared = shared.clone();
    wasm_bindgen_futures::spawn_local(async move {
        match wasm_bindgen_futures::JsFuture::from(promise).await {
            Ok(value) => {
                if let Some(text) = value.as_string() {
                    shared.update(|s| s.grid.paste(&text));
                }
            }
            Err(e) => tracing::warn!(error = ?e, "clipboard read failed"),
        }
    });
}

/// Listeners attached to the grid container for the lifetime of the view.
pub(crate) struct ContainerListeners {
    target: HtmlElement,
    mouse: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
    key: Closure<dyn FnMut(KeyboardEvent)>,
    scroll: Closure<dyn FnMut(web_sys::Event)>,
}

impl ContainerListeners {
    pub(crate) fn install(shared: &Shared) -> Self {
        let target = shared.container.clone();
        let handlers: [(&'static str, fn(&Shared, &MouseEvent)); 4] = [
            ("mousedown", mouse_down),
            ("mousemove", mouse_move),
            ("click", click),
            ("dblclick", double_click),
        ];
        let mut mouse = Vec::with_capacity(handlers.len());
        for (name, handler) in handlers {
            let shared = shared.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                handler(&shared, &event);
            }) as Box<dyn FnMut(MouseEvent)>);
            target
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
                .ok();
            mouse.push((name, closure));
        }

        let key = {
            let shared = shared.clone();
            Closure::wrap(Box::new(move |event: KeyboardEvent| {
                key_down(&shared, &event);
            }) as Box<dyn FnMut(KeyboardEvent)>)
        };
        target
            .add_event_listener_with_callback("keydown", key.as_ref().unchecked_ref())
            .ok();

        let scroll = {
            let shared = shared.clone();
            Closure::wrap(Box::new(move |_event: web_sys::Event| {
                let (top, left) = (shared.container.scroll_top(), shared.container.scroll_left());
                #[allow(clippy::cast_precision_loss)]
                shared.update(|s| s.grid.handle_scroll(top as f32, left as f32));
            }) as Box<dyn FnMut(web_sys::Event)>)
        };
        target
            .add_event_listener_with_callback("scroll", scroll.as_ref().unchecked_ref())
            .ok();

        Self {
            target,
            mouse,
            key,
            scroll,
        }
    }
}

impl Drop for ContainerListeners {
    fn drop(&mut self) {
        for (name, closure) in &self.mouse {
            self.target
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
                .ok();
        }
        self.target
            .remove_event_listener_with_callback("keydown", self.key.as_ref().unchecked_ref())
            .ok();
        self.target
            .remove_event_listener_with_callback("scroll", self.scroll.as_ref().unchecked_ref())
            .ok();
    }
}
