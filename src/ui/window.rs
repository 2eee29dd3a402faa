// Main window for the feedgrid image client
// GTK4 ApplicationWindow hosting the virtualized grid, sources sidebar and
// full-screen viewer, and orchestrating the aggregator service calls.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use anyhow::{Context, Result};
use gdk4::Display;
use gtk4::prelude::*;
use gtk4::{
    Align, Application, ApplicationWindow, Box as GtkBox, Button, CheckButton, CssProvider, Entry,
    Label, Orientation, Paned, ScrolledWindow, Stack, StackTransitionType, Window,
    STYLE_PROVIDER_PRIORITY_APPLICATION,
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{CollectionView, ImageCollection, ImageItem, Source, ViewKind};
use crate::service::{self, ApiClient, ApiError, ScrapeOutcome, ScrapeRequest, SyncOutcome};
use crate::ui::card::CardActions;
use crate::ui::grid_view::GridView;
use crate::ui::navigator::ModalNavigator;
use crate::ui::viewer::ImageViewer;

const DIALOG_MARGIN: i32 = 12;
const SIDEBAR_WIDTH_PX: i32 = 260;

/// Completions of service calls, delivered back to the main loop.
enum AppEvent {
    InitialData {
        sources: Vec<Source>,
        images: Vec<ImageItem>,
    },
    InitialFailed {
        error: String,
    },
    FavoriteSaved {
        image_id: i64,
        favorite: bool,
        error: Option<String>,
    },
    ScrapeFinished(Result<ScrapeOutcome, ApiError>),
    SourceRemoved {
        source_id: i64,
        error: Option<String>,
    },
    SyncFinished {
        source_id: i64,
        result: Result<SyncOutcome, ApiError>,
    },
    DownloadFinished(Result<PathBuf, ApiError>),
}

/// CSS for the dark card aesthetic - embedded
const APP_CSS: &str = r#"
window {
    background-color: #0e0e10;
    color: #e0e0e0;
}

.header-title {
    font-size: 20px;
    font-weight: bold;
}

.header-subtitle {
    font-size: 11px;
    color: #8a8a8a;
}

.tab-button {
    background-color: transparent;
    border: none;
    border-bottom: 2px solid transparent;
    color: #8a8a8a;
    padding: 6px 14px;
}

.tab-button.active {
    color: #e0e0e0;
    border-bottom-color: #4f8cff;
}

.sources-title {
    font-weight: bold;
    color: #8a8a8a;
}

.source-row {
    padding: 4px 0;
}

.image-card {
    background-color: #1a1a1e;
    border-radius: 6px;
}

.card-info {
    background-color: rgba(0, 0, 0, 0.55);
    padding: 6px 8px;
}

.card-source {
    font-size: 12px;
    font-weight: bold;
}

.card-author {
    font-size: 11px;
    color: #b0b0b0;
}

.card-button, .source-button, .viewer-button {
    background-color: rgba(0, 0, 0, 0.45);
    border: none;
    color: #e0e0e0;
    padding: 2px 8px;
}

.card-button.favorited, .viewer-button.favorited {
    color: #ff5577;
}

.viewer {
    background-color: rgba(0, 0, 0, 0.92);
}

.viewer-nav, .viewer-close {
    background-color: transparent;
    border: none;
    color: #e0e0e0;
    font-size: 24px;
    padding: 12px;
}

.empty-message {
    color: #8a8a8a;
    font-size: 14px;
}

.status-bar {
    padding: 4px 8px;
    font-size: 11px;
    color: #8a8a8a;
}
"#;

/// Load and apply the application stylesheet.
fn load_css() {
    let provider = CssProvider::new();
    provider.load_from_data(APP_CSS);
    if let Some(display) = Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}

/// Main window: owns the collection, the active view and the navigator, and
/// translates card/viewer interactions into service calls.
pub struct MainWindow {
    self_weak: RefCell<Weak<MainWindow>>,
    window: ApplicationWindow,
    outer_stack: Stack,
    content_stack: Stack,
    empty_label: Label,
    status_label: Label,
    feed_button: Button,
    favorites_button: Button,
    sources_list: GtkBox,
    grid: Rc<GridView>,
    viewer: Rc<ImageViewer>,
    collection: Rc<ImageCollection>,
    view_kind: Cell<ViewKind>,
    current_view: RefCell<CollectionView>,
    navigator: RefCell<ModalNavigator>,
    syncing: RefCell<HashSet<i64>>,
    initial_loading: Cell<bool>,
    api: ApiClient,
    runtime: tokio::runtime::Runtime,
    events_tx: async_channel::Sender<AppEvent>,
}

impl MainWindow {
    pub fn new(app: &Application, config: &Config) -> Result<Rc<Self>> {
        load_css();

        let api = ApiClient::new(config.api_url.clone())
            .context("failed to build the service client")?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("failed to start the async runtime")?;
        let (events_tx, events_rx) = async_channel::unbounded::<AppEvent>();

        // Header: title, add-link button, view tabs
        let title = Label::new(Some("Image Feed"));
        title.add_css_class("header-title");
        title.set_halign(Align::Start);
        let subtitle = Label::new(Some("Your web image aggregator"));
        subtitle.add_css_class("header-subtitle");
        subtitle.set_halign(Align::Start);
        let title_box = GtkBox::new(Orientation::Vertical, 2);
        title_box.append(&title);
        title_box.append(&subtitle);
        title_box.set_hexpand(true);

        let add_button = Button::with_label("+");
        add_button.add_css_class("add-link-button");
        add_button.set_valign(Align::Center);

        let top_row = GtkBox::new(Orientation::Horizontal, 8);
        top_row.append(&title_box);
        top_row.append(&add_button);

        let feed_button = Button::with_label("Feed");
        feed_button.add_css_class("tab-button");
        feed_button.add_css_class("active");
        let favorites_button = Button::with_label("Favorites");
        favorites_button.add_css_class("tab-button");
        let tabs = GtkBox::new(Orientation::Horizontal, 0);
        tabs.append(&feed_button);
        tabs.append(&favorites_button);

        let header = GtkBox::new(Orientation::Vertical, 8);
        header.add_css_class("app-header");
        header.set_margin_top(12);
        header.set_margin_start(12);
        header.set_margin_end(12);
        header.append(&top_row);
        header.append(&tabs);

        // Sidebar: tracked sources with sync/remove actions
        let sources_title = Label::new(Some("Sources"));
        sources_title.add_css_class("sources-title");
        sources_title.set_halign(Align::Start);
        let sources_list = GtkBox::new(Orientation::Vertical, 4);
        let sidebar = GtkBox::new(Orientation::Vertical, 8);
        sidebar.set_margin_top(8);
        sidebar.set_margin_start(12);
        sidebar.set_margin_end(8);
        sidebar.append(&sources_title);
        sidebar.append(&sources_list);
        let sidebar_scroller = ScrolledWindow::builder()
            .hscrollbar_policy(gtk4::PolicyType::Never)
            .child(&sidebar)
            .build();

        // Content: loading / welcome / empty / grid
        let grid = GridView::new(config);

        let loading_label = Label::new(Some("Loading\u{2026}"));
        loading_label.add_css_class("empty-message");

        let welcome_title = Label::new(Some("Welcome to your Image Feed!"));
        welcome_title.add_css_class("header-title");
        let welcome_body = Label::new(Some(
            "To get started, add a link with the '+' button above to fetch images.",
        ));
        welcome_body.add_css_class("empty-message");
        welcome_body.set_wrap(true);
        let welcome = GtkBox::new(Orientation::Vertical, 8);
        welcome.set_valign(Align::Center);
        welcome.set_halign(Align::Center);
        welcome.append(&welcome_title);
        welcome.append(&welcome_body);

        let empty_label = Label::new(None);
        empty_label.add_css_class("empty-message");
        empty_label.set_wrap(true);

        let content_stack = Stack::new();
        content_stack.set_transition_type(StackTransitionType::Crossfade);
        content_stack.add_named(&loading_label, Some("loading"));
        content_stack.add_named(&welcome, Some("welcome"));
        content_stack.add_named(&empty_label, Some("empty"));
        content_stack.add_named(grid.widget(), Some("grid"));
        content_stack.set_visible_child_name("loading");

        let body_paned = Paned::new(Orientation::Horizontal);
        body_paned.set_start_child(Some(&sidebar_scroller));
        body_paned.set_end_child(Some(&content_stack));
        body_paned.set_position(SIDEBAR_WIDTH_PX);
        body_paned.set_resize_start_child(false);
        body_paned.set_shrink_start_child(false);

        let status_label = Label::new(Some("> Ready"));
        status_label.set_halign(Align::Start);
        status_label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        let status_bar = GtkBox::new(Orientation::Horizontal, 0);
        status_bar.add_css_class("status-bar");
        status_bar.append(&status_label);

        let browse_page = GtkBox::new(Orientation::Vertical, 8);
        browse_page.append(&header);
        browse_page.append(&body_paned);
        browse_page.append(&status_bar);
        body_paned.set_vexpand(true);

        let viewer = ImageViewer::new();

        let outer_stack = Stack::new();
        outer_stack.set_transition_type(StackTransitionType::Crossfade);
        outer_stack.add_named(&browse_page, Some("browse"));
        outer_stack.add_named(viewer.widget(), Some("viewer"));
        outer_stack.set_visible_child_name("browse");

        let window = ApplicationWindow::builder()
            .application(app)
            .title("feedgrid")
            .default_width(1280)
            .default_height(860)
            .build();
        window.set_child(Some(&outer_stack));

        let main_window = Rc::new(Self {
            self_weak: RefCell::new(Weak::new()),
            window,
            outer_stack,
            content_stack,
            empty_label,
            status_label,
            feed_button: feed_button.clone(),
            favorites_button: favorites_button.clone(),
            sources_list,
            grid: grid.clone(),
            viewer: viewer.clone(),
            collection: Rc::new(ImageCollection::new()),
            view_kind: Cell::new(ViewKind::Feed),
            current_view: RefCell::new(CollectionView::empty(ViewKind::Feed)),
            navigator: RefCell::new(ModalNavigator::new()),
            syncing: RefCell::new(HashSet::new()),
            initial_loading: Cell::new(true),
            api,
            runtime,
            events_tx,
        });
        *main_window.self_weak.borrow_mut() = Rc::downgrade(&main_window);

        // Service completions drain on the main loop.
        let window_weak = Rc::downgrade(&main_window);
        glib::spawn_future_local(async move {
            while let Ok(event) = events_rx.recv().await {
                match window_weak.upgrade() {
                    Some(window) => window.handle_event(event),
                    None => break,
                }
            }
        });

        // The collection publishes snapshots; every mutation re-derives the
        // active view, the grid rows and the navigator bounds.
        let window_weak = Rc::downgrade(&main_window);
        main_window.collection.connect_changed(move || {
            if let Some(window) = window_weak.upgrade() {
                window.refresh_views(true);
            }
        });

        let window_weak = Rc::downgrade(&main_window);
        let window_weak_fav = window_weak.clone();
        let window_weak_dl = window_weak.clone();
        grid.set_actions(CardActions {
            on_open: Rc::new(move |flat_index| {
                if let Some(window) = window_weak.upgrade() {
                    window.open_viewer(flat_index);
                }
            }),
            on_toggle_favorite: Rc::new(move |image_id, favorite| {
                if let Some(window) = window_weak_fav.upgrade() {
                    window.toggle_favorite(image_id, favorite);
                }
            }),
            on_download: Rc::new(move |item| {
                if let Some(window) = window_weak_dl.upgrade() {
                    window.start_download(item);
                }
            }),
        });

        let window_weak = Rc::downgrade(&main_window);
        viewer.connect_close(move || {
            if let Some(window) = window_weak.upgrade() {
                window.close_viewer();
            }
        });
        let window_weak = Rc::downgrade(&main_window);
        viewer.connect_next(move || {
            if let Some(window) = window_weak.upgrade() {
                window.navigate(1);
            }
        });
        let window_weak = Rc::downgrade(&main_window);
        viewer.connect_prev(move || {
            if let Some(window) = window_weak.upgrade() {
                window.navigate(-1);
            }
        });
        let window_weak = Rc::downgrade(&main_window);
        viewer.connect_toggle_favorite(move |image_id, favorite| {
            if let Some(window) = window_weak.upgrade() {
                window.toggle_favorite(image_id, favorite);
            }
        });
        let window_weak = Rc::downgrade(&main_window);
        viewer.connect_download(move |item| {
            if let Some(window) = window_weak.upgrade() {
                window.start_download(item);
            }
        });

        let window_weak = Rc::downgrade(&main_window);
        feed_button.connect_clicked(move |_| {
            if let Some(window) = window_weak.upgrade() {
                window.set_view_kind(ViewKind::Feed);
            }
        });
        let window_weak = Rc::downgrade(&main_window);
        favorites_button.connect_clicked(move |_| {
            if let Some(window) = window_weak.upgrade() {
                window.set_view_kind(ViewKind::Favorites);
            }
        });

        let window_weak = Rc::downgrade(&main_window);
        add_button.connect_clicked(move |_| {
            if let Some(window) = window_weak.upgrade() {
                window.open_add_link_dialog();
            }
        });

        main_window.load_initial_data();

        Ok(main_window)
    }

    pub fn present(&self) {
        self.window.present();
    }

    fn set_status(&self, text: &str) {
        self.status_label.set_text(text);
    }

    fn spawn<F>(&self, future: F)
    where
        F: std::future::Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let event = future.await;
            let _ = tx.send(event).await;
        });
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    /// Re-derives the active view from the latest snapshot and pushes it into
    /// the grid, the sidebar, the navigator and the viewer.
    ///
    /// `follow_referent` keeps the open modal anchored to the same item when
    /// background merges shift positions (prepends); view switches pass
    /// `false` so only the shrink rule applies.
    fn refresh_views(&self, follow_referent: bool) {
        let new_view = CollectionView::derive(self.collection.images(), self.view_kind.get());

        let mut navigator = self.navigator.borrow_mut();
        if follow_referent {
            if let Some(open_index) = navigator.open_index() {
                let anchor = self
                    .current_view
                    .borrow()
                    .get(open_index)
                    .map(|item| item.id);
                let new_index =
                    anchor.and_then(|id| new_view.iter().position(|item| item.id == id));
                navigator.sync_len(new_view.len());
                if let Some(index) = new_index {
                    navigator.open(index);
                }
            } else {
                navigator.sync_len(new_view.len());
            }
        } else {
            navigator.sync_len(new_view.len());
        }
        let open_index = navigator.open_index();
        drop(navigator);

        *self.current_view.borrow_mut() = new_view.clone();
        self.grid.set_view(new_view.clone());
        self.rebuild_sources();
        self.update_content_stack(&new_view);

        match open_index {
            Some(index) => {
                if let Some(item) = new_view.get(index) {
                    self.viewer.show_item(item);
                }
            }
            None => self.leave_viewer(),
        }
    }

    fn set_view_kind(&self, kind: ViewKind) {
        if self.view_kind.get() == kind {
            return;
        }
        debug!(?kind, "Switching view");
        self.view_kind.set(kind);
        self.update_tab_styles();
        self.refresh_views(false);
    }

    fn update_tab_styles(&self) {
        let feed_active = self.view_kind.get() == ViewKind::Feed;
        if feed_active {
            self.feed_button.add_css_class("active");
            self.favorites_button.remove_css_class("active");
        } else {
            self.feed_button.remove_css_class("active");
            self.favorites_button.add_css_class("active");
        }
    }

    fn update_content_stack(&self, view: &CollectionView) {
        let name = if self.initial_loading.get() {
            "loading"
        } else if self.collection.sources().is_empty() && self.collection.images().is_empty() {
            "welcome"
        } else if view.is_empty() {
            self.empty_label.set_text(match view.kind() {
                ViewKind::Feed => "Your feed is empty. Add a new link to see more images.",
                ViewKind::Favorites => "You haven't favorited any images yet.",
            });
            "empty"
        } else {
            "grid"
        };
        self.content_stack.set_visible_child_name(name);
    }

    fn rebuild_sources(&self) {
        while let Some(child) = self.sources_list.first_child() {
            self.sources_list.remove(&child);
        }

        let sources = self.collection.sources();
        if sources.is_empty() {
            let empty = Label::new(Some("No sources added."));
            empty.add_css_class("empty-message");
            empty.set_halign(Align::Start);
            self.sources_list.append(&empty);
            return;
        }

        let syncing = self.syncing.borrow();
        for source in sources.iter() {
            let row = GtkBox::new(Orientation::Horizontal, 6);
            row.add_css_class("source-row");

            let name = Label::new(Some(&source.name));
            name.set_halign(Align::Start);
            name.set_hexpand(true);
            name.set_ellipsize(gtk4::pango::EllipsizeMode::End);
            row.append(&name);

            let sync_button = Button::with_label("\u{21bb}");
            sync_button.add_css_class("source-button");
            sync_button.set_sensitive(!syncing.contains(&source.id));
            let window_weak = self.self_weak.borrow().clone();
            let source_id = source.id;
            sync_button.connect_clicked(move |_| {
                if let Some(window) = window_weak.upgrade() {
                    window.start_sync(source_id);
                }
            });
            row.append(&sync_button);

            let remove_button = Button::with_label("\u{2715}");
            remove_button.add_css_class("source-button");
            let window_weak = self.self_weak.borrow().clone();
            remove_button.connect_clicked(move |_| {
                if let Some(window) = window_weak.upgrade() {
                    window.start_remove(source_id);
                }
            });
            row.append(&remove_button);

            self.sources_list.append(&row);
        }
    }

    // =========================================================================
    // Viewer
    // =========================================================================

    fn open_viewer(&self, flat_index: usize) {
        let opened = self.navigator.borrow_mut().open(flat_index);
        if !opened {
            warn!(flat_index, "Ignoring activation outside the active view");
            return;
        }
        debug!(flat_index, "Opening viewer");
        if let Some(item) = self.current_view.borrow().get(flat_index) {
            self.viewer.show_item(item);
        }
        self.outer_stack.set_visible_child_name("viewer");
        self.viewer.install_keys(&self.window);
    }

    fn navigate(&self, direction: i32) {
        let moved = {
            let mut navigator = self.navigator.borrow_mut();
            if direction >= 0 {
                navigator.next()
            } else {
                navigator.prev()
            }
        };
        if let Some(index) = moved {
            if let Some(item) = self.current_view.borrow().get(index) {
                self.viewer.show_item(item);
            }
        }
    }

    fn close_viewer(&self) {
        self.navigator.borrow_mut().close();
        self.leave_viewer();
    }

    fn leave_viewer(&self) {
        self.outer_stack.set_visible_child_name("browse");
        self.viewer.release_keys(&self.window);
    }

    // =========================================================================
    // Service calls
    // =========================================================================

    fn load_initial_data(&self) {
        self.initial_loading.set(true);
        self.content_stack.set_visible_child_name("loading");
        self.set_status("> Loading\u{2026}");

        let api = self.api.clone();
        self.spawn(async move {
            let (sources, images) = tokio::join!(api.fetch_sources(), api.fetch_images());
            match (sources, images) {
                (Ok(sources), Ok(images)) => AppEvent::InitialData { sources, images },
                (Err(err), _) | (_, Err(err)) => AppEvent::InitialFailed {
                    error: err.to_string(),
                },
            }
        });
    }

    /// Favorite toggles apply to the store before the next render; the
    /// service call trails behind and is reverted if it fails.
    fn toggle_favorite(&self, image_id: i64, favorite: bool) {
        if !self.collection.set_favorite(image_id, favorite) {
            return;
        }
        let api = self.api.clone();
        self.spawn(async move {
            let error = api
                .set_favorite(image_id, favorite)
                .await
                .err()
                .map(|err| err.to_string());
            AppEvent::FavoriteSaved {
                image_id,
                favorite,
                error,
            }
        });
    }

    fn start_scrape(&self, request: ScrapeRequest) {
        self.set_status("> Fetching images\u{2026}");
        let api = self.api.clone();
        self.spawn(async move { AppEvent::ScrapeFinished(api.scrape(&request).await) });
    }

    fn start_sync(&self, source_id: i64) {
        let newly_started = self.syncing.borrow_mut().insert(source_id);
        if !newly_started {
            return;
        }
        self.rebuild_sources();
        self.set_status("> Syncing source\u{2026}");
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.sync_source(source_id).await;
            AppEvent::SyncFinished { source_id, result }
        });
    }

    fn start_remove(&self, source_id: i64) {
        self.set_status("> Removing source\u{2026}");
        let api = self.api.clone();
        self.spawn(async move {
            let error = api
                .remove_source(source_id)
                .await
                .err()
                .map(|err| err.to_string());
            AppEvent::SourceRemoved { source_id, error }
        });
    }

    fn start_download(&self, item: ImageItem) {
        let Some(dir) = service::default_download_dir() else {
            self.set_status("> No download directory available");
            return;
        };
        self.set_status("> Downloading\u{2026}");
        let api = self.api.clone();
        self.spawn(async move { AppEvent::DownloadFinished(api.download(&item.src, &dir).await) });
    }

    fn handle_event(&self, event: AppEvent) {
        match event {
            AppEvent::InitialData { sources, images } => {
                info!(sources = sources.len(), images = images.len(), "Initial data loaded");
                self.initial_loading.set(false);
                self.set_status(&format!(
                    "> {} images from {} sources",
                    images.len(),
                    sources.len()
                ));
                self.collection.replace_all(sources, images);
            }
            AppEvent::InitialFailed { error } => {
                warn!(%error, "Initial load failed");
                self.initial_loading.set(false);
                self.set_status(&format!("> Failed to load: {error}"));
                self.refresh_views(true);
            }
            AppEvent::FavoriteSaved {
                image_id,
                favorite,
                error,
            } => {
                if let Some(error) = error {
                    warn!(image_id, %error, "Favorite update failed, reverting");
                    self.set_status("> Could not update favorite");
                    self.collection.set_favorite(image_id, !favorite);
                }
            }
            AppEvent::ScrapeFinished(result) => match result {
                Ok(outcome) => {
                    let count = outcome.new_images.len();
                    self.set_status(&format!("> Added {} with {count} images", outcome.new_source.name));
                    self.collection
                        .merge_scrape(outcome.new_source, outcome.new_images);
                    self.set_view_kind(ViewKind::Feed);
                }
                Err(err) => {
                    warn!(error = %err, "Scrape failed");
                    self.set_status(&format!("> Scrape failed: {err}"));
                }
            },
            AppEvent::SourceRemoved { source_id, error } => match error {
                None => {
                    self.collection.remove_source(source_id);
                    self.set_status("> Source removed");
                }
                Some(error) => {
                    warn!(source_id, %error, "Source removal failed");
                    self.set_status(&format!("> Could not remove source: {error}"));
                }
            },
            AppEvent::SyncFinished { source_id, result } => {
                self.syncing.borrow_mut().remove(&source_id);
                self.rebuild_sources();
                match result {
                    // A sync can finish after its source was removed; the
                    // stale result is dropped instead of resurrecting items.
                    Ok(outcome) if self.collection.has_source(source_id) => {
                        self.set_status(&format!(
                            "> Sync found {} new images",
                            outcome.new_images.len()
                        ));
                        self.collection.prepend_images(outcome.new_images);
                    }
                    Ok(_) => {
                        debug!(source_id, "Dropping sync result for removed source");
                    }
                    Err(err) => {
                        warn!(source_id, error = %err, "Sync failed");
                        self.set_status(&format!("> Sync failed: {err}"));
                    }
                }
            }
            AppEvent::DownloadFinished(result) => match result {
                Ok(path) => self.set_status(&format!("> Saved to {}", path.display())),
                Err(err) => {
                    warn!(error = %err, "Download failed");
                    self.set_status(&format!("> Download failed: {err}"));
                }
            },
        }
    }

    // =========================================================================
    // Add-link dialog
    // =========================================================================

    fn open_add_link_dialog(self: &Rc<Self>) {
        let dialog = Window::builder()
            .title("Add link")
            .transient_for(&self.window)
            .modal(true)
            .resizable(false)
            .default_width(440)
            .build();

        let content = GtkBox::new(Orientation::Vertical, 12);
        content.set_margin_top(DIALOG_MARGIN);
        content.set_margin_bottom(DIALOG_MARGIN);
        content.set_margin_start(DIALOG_MARGIN);
        content.set_margin_end(DIALOG_MARGIN);

        let single_toggle = CheckButton::with_label("Single URL");
        let paged_toggle = CheckButton::with_label("Multiple pages");
        paged_toggle.set_group(Some(&single_toggle));
        single_toggle.set_active(true);
        let mode_row = GtkBox::new(Orientation::Horizontal, 12);
        mode_row.append(&single_toggle);
        mode_row.append(&paged_toggle);
        content.append(&mode_row);

        let url_entry = Entry::new();
        url_entry.set_placeholder_text(Some("https://\u{2026}"));
        let single_hint = Label::new(Some("Paste a link to fetch images from."));
        single_hint.set_halign(Align::Start);
        let single_box = GtkBox::new(Orientation::Vertical, 6);
        single_box.append(&single_hint);
        single_box.append(&url_entry);
        content.append(&single_box);

        let pattern_entry = Entry::new();
        pattern_entry.set_placeholder_text(Some("https://example.com/images?p={page}"));
        let paged_hint = Label::new(Some("Use {page} where the page number goes."));
        paged_hint.set_halign(Align::Start);
        let start_entry = Entry::new();
        start_entry.set_text("1");
        let end_entry = Entry::new();
        end_entry.set_text("10");
        let range_row = GtkBox::new(Orientation::Horizontal, 6);
        range_row.append(&start_entry);
        range_row.append(&Label::new(Some("to")));
        range_row.append(&end_entry);
        let paged_box = GtkBox::new(Orientation::Vertical, 6);
        paged_box.append(&paged_hint);
        paged_box.append(&pattern_entry);
        paged_box.append(&range_row);
        paged_box.set_visible(false);
        content.append(&paged_box);

        {
            let single_box = single_box.clone();
            let paged_box = paged_box.clone();
            single_toggle.connect_toggled(move |toggle| {
                single_box.set_visible(toggle.is_active());
                paged_box.set_visible(!toggle.is_active());
            });
        }

        let submit = Button::with_label("Fetch images");
        content.append(&submit);

        let window_weak = Rc::downgrade(self);
        let dialog_handle = dialog.clone();
        submit.connect_clicked(move |_| {
            let request = if single_toggle.is_active() {
                let url = url_entry.text().trim().to_string();
                if url.is_empty() {
                    return;
                }
                ScrapeRequest::Single { url }
            } else {
                let url_pattern = pattern_entry.text().trim().to_string();
                if url_pattern.is_empty() || !url_pattern.contains("{page}") {
                    return;
                }
                let start_page: u32 = start_entry.text().trim().parse().unwrap_or(1);
                let end_page: u32 = end_entry.text().trim().parse().unwrap_or(start_page);
                ScrapeRequest::Paged {
                    url_pattern,
                    start_page,
                    end_page: end_page.max(start_page),
                }
            };
            dialog_handle.close();
            if let Some(window) = window_weak.upgrade() {
                window.start_scrape(request);
            }
        });

        dialog.set_child(Some(&content));
        dialog.present();
    }
}
