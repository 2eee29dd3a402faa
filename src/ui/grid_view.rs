// Virtualized image grid
// The scrolled viewport's adjustment and content width feed the column
// resolver, partitioner and windower; only rows inside the resulting window
// exist as widgets, so widget count stays bounded by the window size.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use gtk4::prelude::*;
use gtk4::{Box as GtkBox, Fixed, Orientation, PolicyType, ScrolledWindow};
use tracing::{debug, warn};

use crate::config::Config;
use crate::grid::{compute_window, resolve_columns, row_count, row_span, ViewportState, WindowPlan};
use crate::models::{CollectionView, RowModel, ViewKind};
use crate::ui::card::{build_card, CardActions};

const CARD_SPACING: i32 = 8;
const RELAYOUT_DEBOUNCE_MS: u64 = 60;

pub struct GridView {
    self_weak: RefCell<Weak<GridView>>,
    scroller: ScrolledWindow,
    canvas: Fixed,
    view: RefCell<CollectionView>,
    realized: RefCell<HashMap<usize, gtk4::Widget>>,
    columns: Cell<usize>,
    last_width: Cell<i32>,
    relayout_pending: Cell<bool>,
    estimated_row_height: f64,
    overscan: usize,
    actions: RefCell<Option<CardActions>>,
}

impl GridView {
    pub fn new(config: &Config) -> Rc<Self> {
        let canvas = Fixed::new();
        canvas.set_hexpand(true);
        canvas.set_vexpand(true);
        canvas.add_css_class("grid-canvas");

        let scroller = ScrolledWindow::builder()
            .hscrollbar_policy(PolicyType::Never)
            .vscrollbar_policy(PolicyType::Automatic)
            .kinetic_scrolling(true)
            .child(&canvas)
            .build();

        let grid = Rc::new(Self {
            self_weak: RefCell::new(Weak::new()),
            scroller: scroller.clone(),
            canvas,
            view: RefCell::new(CollectionView::empty(ViewKind::Feed)),
            realized: RefCell::new(HashMap::new()),
            columns: Cell::new(resolve_columns(0.0)),
            last_width: Cell::new(0),
            relayout_pending: Cell::new(false),
            estimated_row_height: config.estimated_row_height,
            overscan: config.overscan,
            actions: RefCell::new(None),
        });
        *grid.self_weak.borrow_mut() = Rc::downgrade(&grid);

        // Scroll reaction: recompute the window only.
        let grid_weak = Rc::downgrade(&grid);
        scroller.vadjustment().connect_value_changed(move |_| {
            if let Some(grid) = grid_weak.upgrade() {
                grid.refresh_window();
            }
        });

        // Width watcher: the column count and row widths depend on the
        // allocated content width, which GTK settles a few frames after
        // mapping, so poll it per frame and relayout on change.
        let grid_weak = Rc::downgrade(&grid);
        grid.scroller.add_tick_callback(move |_widget, _clock| {
            let Some(grid) = grid_weak.upgrade() else {
                return glib::ControlFlow::Break;
            };
            let width = grid.content_width().round() as i32;
            if width > 0 && (width - grid.last_width.get()).abs() >= 1 {
                grid.last_width.set(width);
                grid.schedule_relayout();
            }
            glib::ControlFlow::Continue
        });

        grid
    }

    pub fn widget(&self) -> &ScrolledWindow {
        &self.scroller
    }

    pub fn set_actions(&self, actions: CardActions) {
        *self.actions.borrow_mut() = Some(actions);
    }

    /// Swaps in a freshly derived view and rebuilds from scratch; realized
    /// cards may carry stale item state (favorite flags, positions).
    pub fn set_view(&self, view: CollectionView) {
        *self.view.borrow_mut() = view;
        self.rebuild();
    }

    /// Content width available to rows, excluding the vertical scrollbar.
    fn content_width(&self) -> f64 {
        let width = self.scroller.width() as f64;
        if width <= 0.0 {
            return 0.0;
        }
        let vscrollbar = self.scroller.vscrollbar();
        if vscrollbar.is_visible() {
            (width - vscrollbar.width() as f64).max(0.0)
        } else {
            width
        }
    }

    fn schedule_relayout(&self) {
        if self.relayout_pending.replace(true) {
            return;
        }
        let grid_weak = self.self_weak.borrow().clone();
        glib::timeout_add_local(Duration::from_millis(RELAYOUT_DEBOUNCE_MS), move || {
            if let Some(grid) = grid_weak.upgrade() {
                grid.relayout_pending.set(false);
                grid.rebuild();
            }
            glib::ControlFlow::Break
        });
    }

    /// Full rebuild: re-resolve columns for the current width and drop every
    /// realized row, so stale row shapes and offsets are never reused.
    fn rebuild(&self) {
        let width = self.content_width();
        let columns = resolve_columns(width);
        if columns != self.columns.get() {
            debug!(width, columns, "Column count changed");
        }
        self.columns.set(columns);

        let mut realized = self.realized.borrow_mut();
        for (_, widget) in realized.drain() {
            self.canvas.remove(&widget);
        }
        drop(realized);

        self.refresh_window();
    }

    /// Incremental pass for the current scroll position: realize rows
    /// entering the window, drop rows leaving it.
    fn refresh_window(&self) {
        let view = self.view.borrow().clone();
        let columns = self.columns.get();

        let plan = match self.plan_window(view.len(), columns) {
            Some(plan) => plan,
            None => return,
        };

        self.canvas.set_size_request(-1, plan.total_height as i32);

        let width = self.content_width();
        let mut realized = self.realized.borrow_mut();
        realized.retain(|row_index, widget| {
            if plan.rows.contains(row_index) {
                true
            } else {
                self.canvas.remove(widget);
                false
            }
        });

        for (row_index, offset) in plan.offsets() {
            if realized.contains_key(&row_index) {
                continue;
            }
            let row = match row_span(row_index, view.len(), columns) {
                Ok(row) => row,
                Err(err) => {
                    warn!(error = %err, "Skipping row with invalid configuration");
                    continue;
                }
            };
            let widget = self.build_row(&view, &row, columns, width);
            self.canvas.put(&widget, 0.0, offset);
            realized.insert(row_index, widget);
        }
    }

    fn plan_window(&self, item_count: usize, columns: usize) -> Option<WindowPlan> {
        let rows = match row_count(item_count, columns) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "Invalid grid configuration");
                return None;
            }
        };
        let vadj = self.scroller.vadjustment();
        let viewport = ViewportState {
            scroll_offset: vadj.value(),
            viewport_height: vadj.page_size(),
        };
        match compute_window(rows, self.estimated_row_height, self.overscan, viewport) {
            Ok(plan) => Some(plan),
            Err(err) => {
                warn!(error = %err, "Invalid window configuration");
                None
            }
        }
    }

    fn build_row(
        &self,
        view: &CollectionView,
        row: &RowModel,
        columns: usize,
        width: f64,
    ) -> gtk4::Widget {
        let container = GtkBox::new(Orientation::Horizontal, CARD_SPACING);
        container.add_css_class("grid-row");
        let row_height = self.estimated_row_height as i32 - CARD_SPACING;
        container.set_size_request(width as i32, row_height);

        // A short last row keeps full-row card widths.
        let card_width = Self::card_width(width, columns);

        let actions = self.actions.borrow();
        for flat_index in row.positions() {
            let Some(item) = view.get(flat_index) else {
                continue;
            };
            let Some(actions) = actions.as_ref() else {
                continue;
            };
            let card = build_card(item, flat_index, actions);
            card.set_size_request(card_width, row_height);
            container.append(&card);
        }

        container.upcast()
    }

    /// Width of one card so `columns` cards plus their gaps fill the row, or
    /// -1 (natural size) before the viewport has a usable width.
    fn card_width(row_width: f64, columns: usize) -> i32 {
        if columns == 0 || !(row_width > 0.0) {
            return -1;
        }
        ((row_width - (CARD_SPACING * (columns as i32 - 1)) as f64) / columns as f64) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_width_fills_the_row() {
        let width = GridView::card_width(1000.0, 5);
        assert_eq!(width, 193);
        // 5 cards plus 4 gaps cover the row within rounding.
        let covered = width * 5 + CARD_SPACING * 4;
        assert!(covered <= 1000 && covered > 1000 - 5);
    }

    #[test]
    fn test_card_width_single_column_has_no_gap() {
        assert_eq!(GridView::card_width(500.0, 1), 500);
    }

    #[test]
    fn test_card_width_unallocated_viewport_is_natural() {
        assert_eq!(GridView::card_width(0.0, 5), -1);
        assert_eq!(GridView::card_width(-10.0, 5), -1);
        assert_eq!(GridView::card_width(f64::NAN, 5), -1);
        assert_eq!(GridView::card_width(1000.0, 0), -1);
    }
}
