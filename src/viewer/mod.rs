//! `GridView`, the JavaScript entry point.
//!
//! Wraps a [`GridController`] over JSON records and wires it to a scroll
//! container and a canvas:
//! - Mouse, keyboard and scroll listeners are registered on construction
//! - Window listeners live only for the duration of a drag or resize
//! - A `ResizeObserver` keeps the viewport size in sync with the container
//! - Notifications are delivered to handlers registered with `on(name, fn)`
//!
//! Handlers run after the grid state is released, so they may call back into
//! the view (typically `setRows` from a `rowsChange` handler).

mod events;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use js_sys::Function;
use serde::Deserialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlElement, ResizeObserver};

use crate::config::GridConfig;
use crate::error::GridError;
use crate::fill::copy_source_value;
use crate::grid::{GridCallbacks, GridController};
use crate::layout::GroupByCell;
use crate::render::{paint, CanvasSurface};
use crate::types::{Column, ColumnSpec, FillEvent, GridRow, Position, Record, SortColumn};

use events::{ContainerListeners, WindowListeners};

/// Options accepted by the constructor, on top of [`GridConfig`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GridViewOptions {
    #[serde(flatten)]
    config: GridConfig,
    /// Column whose text identifies a row. Needed for copy and row selection.
    row_key: Option<String>,
    group_by: Vec<String>,
}

/// Notification waiting to be delivered to JavaScript.
enum Outgoing {
    Event(&'static str, JsValue),
    Clipboard(String),
}

type Outbox = Rc<RefCell<Vec<Outgoing>>>;
type Handlers = Rc<RefCell<HashMap<String, Function>>>;

pub(crate) struct SharedState {
    grid: GridController<Record>,
    surface: CanvasSurface,
    spacer: Option<HtmlElement>,
    window_listeners: Option<WindowListeners>,
    /// Pointer x when the current column resize started.
    resize_anchor_x: f32,
}

impl SharedState {
    fn gesture_active(&self) -> bool {
        self.grid.is_dragging() || self.grid.is_resizing()
    }
}

/// Handles shared by every listener.
#[derive(Clone)]
pub(crate) struct Shared {
    state: Rc<RefCell<SharedState>>,
    container: HtmlElement,
    outbox: Outbox,
    handlers: Handlers,
}

impl Shared {
    /// Run `f` against the grid, then sync the DOM, repaint and deliver
    /// queued notifications.
    fn update<T>(&self, f: impl FnOnce(&mut SharedState) -> T) -> T {
        let out = {
            let mut s = self.state.borrow_mut();
            let out = f(&mut s);
            self.sync(&mut s);
            out
        };
        self.flush();
        out
    }

    #[allow(clippy::cast_possible_truncation)]
    fn sync(&self, s: &mut SharedState) {
        if let Some(request) = s.grid.take_scroll_request() {
            self.container
                .set_scroll_top(request.scroll_top.round() as i32);
            self.container
                .set_scroll_left(request.scroll_left.round() as i32);
        }
        if let Some(spacer) = &s.spacer {
            let style = spacer.style();
            let height = s.grid.total_rows_height()
                + s.grid.config().total_header_height()
                + s.grid.config().summary_rows_height();
            let _ = style.set_property("width", &format!("{}px", s.grid.layout().total_width));
            let _ = style.set_property("height", &format!("{height}px"));
        }
        let SharedState { grid, surface, .. } = s;
        paint(grid, surface);
    }

    fn flush(&self) {
        let pending: Vec<Outgoing> = self.outbox.borrow_mut().drain(..).collect();
        for item in pending {
            match item {
                Outgoing::Event(name, payload) => {
                    let handler = self.handlers.borrow().get(name).cloned();
                    if let Some(handler) = handler {
                        if let Err(e) = handler.call1(&JsValue::NULL, &payload) {
                            tracing::warn!(event = name, error = ?e, "handler threw");
                        }
                    }
                }
                Outgoing::Clipboard(text) => {
                    if let Some(window) = web_sys::window() {
                        let _ = window.navigator().clipboard().write_text(&text);
                    }
                }
            }
        }
    }
}

fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, GridError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| GridError::Serialization(e.to_string()))
}

fn parse_columns(columns: JsValue) -> Result<Vec<Column<Record>>, GridError> {
    let specs: Vec<ColumnSpec> = from_js(columns)?;
    Ok(specs.into_iter().map(ColumnSpec::into_column).collect())
}

/// Callbacks that queue notifications for JavaScript.
fn js_callbacks(outbox: &Outbox, handlers: &Handlers, row_key: Option<String>) -> GridCallbacks<Record> {
    let queue = |name: &'static str| {
        let outbox = Rc::clone(outbox);
        move |payload: JsValue| outbox.borrow_mut().push(Outgoing::Event(name, payload))
    };

    let mut callbacks = GridCallbacks::new()
        .row_grouper(GroupByCell)
        .on_rows_change({
            let push = queue("rowsChange");
            move |event| push(to_js(&event))
        })
        .on_paste({
            let push = queue("paste");
            move |event| push(to_js(event))
        })
        .on_selected_cell_change({
            let push = queue("selectedCellChange");
            move |pos| push(to_js(&pos))
        })
        .on_column_resize({
            let push = queue("columnResize");
            move |idx, width| push(to_js(&(idx, width)))
        })
        .on_scroll({
            let push = queue("scroll");
            move |event| push(to_js(event))
        })
        .on_sort({
            let push = queue("sort");
            move |sort| push(to_js(sort))
        })
        .on_filters_change({
            let push = queue("filtersChange");
            move |filters| push(to_js(filters))
        })
        .on_expanded_group_ids_change({
            let push = queue("expandedGroupIdsChange");
            move |ids| push(to_js(ids))
        })
        .on_selected_rows_change({
            let push = queue("selectedRowsChange");
            move |ids| push(to_js(ids))
        })
        .on_row_click({
            let push = queue("rowClick");
            move |idx, row, key| push(to_js(&(idx, row, key)))
        })
        .clipboard({
            let outbox = Rc::clone(outbox);
            move |text| outbox.borrow_mut().push(Outgoing::Clipboard(text.to_string()))
        })
        .on_fill({
            let handlers = Rc::clone(handlers);
            move |event: &FillEvent<'_, Record>| js_fill(&handlers, event)
        });
    if let Some(key) = row_key {
        callbacks = callbacks.row_key(move |row: &Record| row.cell_text(&key).to_string());
    }
    callbacks
}

/// Ask the `fill` handler for filled rows, falling back to copying the
/// source value. The handler runs synchronously and must not call back into
/// the view.
fn js_fill(handlers: &Handlers, event: &FillEvent<'_, Record>) -> Vec<Record> {
    let handler = handlers.borrow().get("fill").cloned();
    let Some(handler) = handler else {
        return copy_source_value(event);
    };
    match handler.call1(&JsValue::NULL, &to_js(event)) {
        Ok(rows) => from_js(rows).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "fill handler returned invalid rows");
            copy_source_value(event)
        }),
        Err(e) => {
            tracing::warn!(error = ?e, "fill handler threw");
            copy_source_value(event)
        }
    }
}

/// Virtualized grid bound to a scroll container and a canvas.
#[wasm_bindgen]
pub struct GridView {
    shared: Shared,
    #[allow(dead_code)]
    listeners: ContainerListeners,
    resize_observer: Option<ResizeObserver>,
    #[allow(dead_code)]
    resize_closure: Option<Closure<dyn FnMut(js_sys::Array)>>,
}

#[wasm_bindgen]
impl GridView {
    /// Create a grid inside `container` (a scrollable element) drawing to
    /// `canvas`.
    ///
    /// `columns` is an array of column declarations, `rows` an array of
    /// records keyed by column key, `options` a grid configuration object
    /// that may also carry `rowKey` and `groupBy`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: HtmlElement,
        canvas: HtmlCanvasElement,
        columns: JsValue,
        rows: JsValue,
        options: JsValue,
        dpr: f32,
    ) -> Result<GridView, JsValue> {
        console_error_panic_hook::set_once();

        let options: GridViewOptions = if options.is_undefined() || options.is_null() {
            GridViewOptions::default()
        } else {
            from_js(options)?
        };
        let columns = parse_columns(columns)?;
        let rows: Vec<Record> = from_js(rows)?;

        let outbox: Outbox = Rc::new(RefCell::new(Vec::new()));
        let handlers: Handlers = Rc::new(RefCell::new(HashMap::new()));
        let mut grid = GridController::new(columns, rows, options.config)
            .with_callbacks(js_callbacks(&outbox, &handlers, options.row_key));
        if !options.group_by.is_empty() {
            grid.set_group_by(options.group_by)?;
        }
        #[allow(clippy::cast_precision_loss)]
        grid.set_viewport_size(
            container.client_width() as f32,
            container.client_height() as f32,
        );

        let spacer = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.create_element("div").ok())
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if let Some(spacer) = &spacer {
            let _ = spacer.style().set_property("pointer-events", "none");
            let _ = container.append_child(spacer);
        }
        let _ = container.set_attribute("tabindex", "0");

        let state = Rc::new(RefCell::new(SharedState {
            grid,
            surface: CanvasSurface::new(canvas, dpr)?,
            spacer,
            window_listeners: None,
            resize_anchor_x: 0.0,
        }));
        let shared = Shared {
            state,
            container,
            outbox,
            handlers,
        };
        let listeners = ContainerListeners::install(&shared);
        let (resize_observer, resize_closure) = Self::observe_resize(&shared);
        shared.update(|_| ());

        Ok(GridView {
            shared,
            listeners,
            resize_observer,
            resize_closure,
        })
    }

    fn observe_resize(
        shared: &Shared,
    ) -> (Option<ResizeObserver>, Option<Closure<dyn FnMut(js_sys::Array)>>) {
        let closure = {
            let shared = shared.clone();
            Closure::wrap(Box::new(move |_entries: js_sys::Array| {
                #[allow(clippy::cast_precision_loss)]
                let (width, height) = (
                    shared.container.client_width() as f32,
                    shared.container.client_height() as f32,
                );
                shared.update(|s| {
                    s.grid.set_viewport_size(width, height);
                });
            }) as Box<dyn FnMut(js_sys::Array)>)
        };
        let Ok(observer) = ResizeObserver::new(closure.as_ref().unchecked_ref()) else {
            return (None, None);
        };
        observer.observe(&shared.container);
        (Some(observer), Some(closure))
    }

    /// Register a handler for a notification: `rowsChange`, `fill`, `paste`,
    /// `selectedCellChange`, `columnResize`, `scroll`, `sort`,
    /// `filtersChange`, `expandedGroupIdsChange`, `selectedRowsChange`,
    /// `rowClick`.
    pub fn on(&self, event: &str, handler: Function) {
        self.shared
            .handlers
            .borrow_mut()
            .insert(event.to_string(), handler);
    }

    /// Remove the handler for a notification.
    pub fn off(&self, event: &str) {
        self.shared.handlers.borrow_mut().remove(event);
    }

    #[wasm_bindgen(js_name = "setRows")]
    pub fn set_rows(&self, rows: JsValue) -> Result<(), JsValue> {
        let rows: Vec<Record> = from_js(rows)?;
        self.shared.update(|s| s.grid.set_rows(rows));
        Ok(())
    }

    #[wasm_bindgen(js_name = "setColumns")]
    pub fn set_columns(&self, columns: JsValue) -> Result<(), JsValue> {
        let columns = parse_columns(columns)?;
        self.shared.update(|s| s.grid.set_columns(columns));
        Ok(())
    }

    #[wasm_bindgen(js_name = "setGroupBy")]
    pub fn set_group_by(&self, keys: JsValue) -> Result<(), JsValue> {
        let keys: Vec<String> = from_js(keys)?;
        self.shared.update(|s| s.grid.set_group_by(keys))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = "setExpandedGroupIds")]
    pub fn set_expanded_group_ids(&self, ids: JsValue) -> Result<(), JsValue> {
        let ids: HashSet<String> = from_js(ids)?;
        self.shared.update(|s| s.grid.set_expanded_group_ids(ids));
        Ok(())
    }

    #[wasm_bindgen(js_name = "setSort")]
    pub fn set_sort(&self, sort: JsValue) -> Result<(), JsValue> {
        let sort: Option<SortColumn> = from_js(sort)?;
        self.shared.update(|s| s.grid.set_sort(sort));
        Ok(())
    }

    #[wasm_bindgen(js_name = "setFilters")]
    pub fn set_filters(&self, filters: JsValue) -> Result<(), JsValue> {
        let filters: BTreeMap<String, String> = from_js(filters)?;
        self.shared.update(|s| s.grid.set_filters(filters));
        Ok(())
    }

    /// Report an edit of one filter input.
    #[wasm_bindgen(js_name = "setFilter")]
    pub fn set_filter(&self, key: &str, value: &str) {
        self.shared.update(|s| s.grid.set_filter(key, value));
    }

    #[wasm_bindgen(js_name = "setSelectedRows")]
    pub fn set_selected_rows(&self, ids: JsValue) -> Result<(), JsValue> {
        let ids: HashSet<String> = from_js(ids)?;
        self.shared.update(|s| s.grid.set_selected_rows(ids));
        Ok(())
    }

    #[wasm_bindgen(js_name = "selectRow")]
    pub fn select_row(&self, row_idx: usize, checked: bool, shift: bool) -> Result<(), JsValue> {
        self.shared
            .update(|s| s.grid.select_row(row_idx, checked, shift))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = "selectAllRows")]
    pub fn select_all_rows(&self, checked: bool) -> Result<(), JsValue> {
        self.shared.update(|s| s.grid.select_all_rows(checked))?;
        Ok(())
    }

    /// Select a cell. Returns `false` when it is out of bounds.
    #[wasm_bindgen(js_name = "selectCell")]
    pub fn select_cell(&self, idx: i32, row_idx: i32, open_editor: bool) -> bool {
        let pos = Position::new(idx as isize, row_idx as isize);
        self.shared.update(|s| s.grid.select_cell(pos, open_editor))
    }

    #[wasm_bindgen(js_name = "selectedCell")]
    pub fn selected_cell(&self) -> JsValue {
        to_js(&self.shared.state.borrow().grid.selected_position())
    }

    #[wasm_bindgen(js_name = "scrollToColumn")]
    pub fn scroll_to_column(&self, idx: usize) {
        self.shared.update(|s| s.grid.scroll_to_column(idx));
    }

    #[wasm_bindgen(js_name = "scrollToRow")]
    pub fn scroll_to_row(&self, row_idx: usize) {
        self.shared.update(|s| s.grid.scroll_to_row(row_idx));
    }

    /// Copy the selected range. Returns the copied text.
    pub fn copy(&self) -> Result<Option<String>, JsValue> {
        Ok(self.shared.update(|s| s.grid.copy())?)
    }

    /// Paste text at the selected cell. Returns whether rows changed.
    pub fn paste(&self, text: &str) -> bool {
        self.shared.update(|s| s.grid.paste(text))
    }

    /// Text the open editor should show, if any.
    #[wasm_bindgen(js_name = "editorText")]
    pub fn editor_text(&self) -> Option<String> {
        self.shared.state.borrow().grid.editor_text()
    }

    /// Text typed into the host's editor input.
    #[wasm_bindgen(js_name = "editorInput")]
    pub fn editor_input(&self, text: &str) -> Result<(), JsValue> {
        self.shared.update(|s| s.grid.editor_input(text))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = "closeEditor")]
    pub fn close_editor(&self, commit: bool) {
        self.shared.update(|s| s.grid.close_editor(commit));
    }

    /// Repaint, e.g. after the device pixel ratio changed.
    pub fn render(&self, dpr: f32) {
        self.shared.update(|s| s.surface.set_dpr(dpr));
    }
}

impl Drop for GridView {
    fn drop(&mut self) {
        if let Some(observer) = &self.resize_observer {
            observer.disconnect();
        }
        if let Some(spacer) = &self.shared.state.borrow().spacer {
            spacer.remove();
        }
    }
}
