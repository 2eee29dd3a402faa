// Full-screen viewer for the open item
// Presentation only: which item is open lives in the ModalNavigator.
// While shown, a capture-phase key controller on the host window consumes
// Escape/Left/Right; the controller is removed on every close path.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gdk4::Key;
use gtk4::prelude::*;
use gtk4::{
    Align, ApplicationWindow, Box as GtkBox, Button, ContentFit, EventControllerKey, Label,
    Orientation, Overlay, Picture, PropagationPhase,
};

use crate::models::ImageItem;
use crate::ui::card::placeholder_texture;
use crate::ui::loader::{texture_loader, LoadKind};

type Callback = Rc<RefCell<Option<Box<dyn Fn()>>>>;
type FavoriteCallback = Rc<RefCell<Option<Box<dyn Fn(i64, bool)>>>>;
type DownloadCallback = Rc<RefCell<Option<Box<dyn Fn(ImageItem)>>>>;

pub struct ImageViewer {
    root: Overlay,
    picture: Picture,
    caption: Label,
    favorite_button: Button,
    key_controller: EventControllerKey,
    keys_installed: Cell<bool>,
    current: RefCell<Option<ImageItem>>,
    load_token: Rc<Cell<u64>>,
    on_close: Callback,
    on_next: Callback,
    on_prev: Callback,
    on_toggle_favorite: FavoriteCallback,
    on_download: DownloadCallback,
}

impl ImageViewer {
    pub fn new() -> Rc<Self> {
        let picture = Picture::new();
        picture.set_can_shrink(true);
        picture.set_content_fit(ContentFit::Contain);
        picture.set_hexpand(true);
        picture.set_vexpand(true);

        let root = Overlay::new();
        root.set_child(Some(&picture));
        root.add_css_class("viewer");

        let close_button = Button::with_label("\u{00d7}");
        close_button.add_css_class("viewer-close");
        close_button.set_halign(Align::End);
        close_button.set_valign(Align::Start);
        root.add_overlay(&close_button);

        let prev_button = Button::with_label("\u{276e}");
        prev_button.add_css_class("viewer-nav");
        prev_button.set_halign(Align::Start);
        prev_button.set_valign(Align::Center);
        root.add_overlay(&prev_button);

        let next_button = Button::with_label("\u{276f}");
        next_button.add_css_class("viewer-nav");
        next_button.set_halign(Align::End);
        next_button.set_valign(Align::Center);
        root.add_overlay(&next_button);

        let bottom_bar = GtkBox::new(Orientation::Horizontal, 8);
        bottom_bar.set_halign(Align::Center);
        bottom_bar.set_valign(Align::End);
        bottom_bar.add_css_class("viewer-actions");
        let favorite_button = Button::with_label("\u{2661}");
        favorite_button.add_css_class("viewer-button");
        let download_button = Button::with_label("\u{2193}");
        download_button.add_css_class("viewer-button");
        let caption = Label::new(None);
        caption.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        caption.add_css_class("viewer-caption");
        bottom_bar.append(&favorite_button);
        bottom_bar.append(&download_button);
        bottom_bar.append(&caption);
        root.add_overlay(&bottom_bar);

        let key_controller = EventControllerKey::new();
        key_controller.set_propagation_phase(PropagationPhase::Capture);

        let viewer = Rc::new(Self {
            root,
            picture,
            caption,
            favorite_button: favorite_button.clone(),
            key_controller: key_controller.clone(),
            keys_installed: Cell::new(false),
            current: RefCell::new(None),
            load_token: Rc::new(Cell::new(0)),
            on_close: Rc::new(RefCell::new(None)),
            on_next: Rc::new(RefCell::new(None)),
            on_prev: Rc::new(RefCell::new(None)),
            on_toggle_favorite: Rc::new(RefCell::new(None)),
            on_download: Rc::new(RefCell::new(None)),
        });

        let on_close = viewer.on_close.clone();
        close_button.connect_clicked(move |_| {
            if let Some(ref callback) = *on_close.borrow() {
                callback();
            }
        });

        let on_prev = viewer.on_prev.clone();
        prev_button.connect_clicked(move |_| {
            if let Some(ref callback) = *on_prev.borrow() {
                callback();
            }
        });

        let on_next = viewer.on_next.clone();
        next_button.connect_clicked(move |_| {
            if let Some(ref callback) = *on_next.borrow() {
                callback();
            }
        });

        let viewer_weak = Rc::downgrade(&viewer);
        favorite_button.connect_clicked(move |_| {
            if let Some(viewer) = viewer_weak.upgrade() {
                let current = viewer.current.borrow().clone();
                if let Some(item) = current {
                    if let Some(ref callback) = *viewer.on_toggle_favorite.borrow() {
                        callback(item.id, !item.is_favorited);
                    }
                }
            }
        });

        let viewer_weak = Rc::downgrade(&viewer);
        download_button.connect_clicked(move |_| {
            if let Some(viewer) = viewer_weak.upgrade() {
                let current = viewer.current.borrow().clone();
                if let Some(item) = current {
                    if let Some(ref callback) = *viewer.on_download.borrow() {
                        callback(item);
                    }
                }
            }
        });

        let on_close = viewer.on_close.clone();
        let on_next = viewer.on_next.clone();
        let on_prev = viewer.on_prev.clone();
        key_controller.connect_key_pressed(move |_, keyval, _keycode, _state| {
            let handler = match keyval {
                Key::Escape => &on_close,
                Key::Right => &on_next,
                Key::Left => &on_prev,
                _ => return glib::Propagation::Proceed,
            };
            if let Some(ref callback) = *handler.borrow() {
                callback();
            }
            glib::Propagation::Stop
        });

        viewer
    }

    pub fn widget(&self) -> &Overlay {
        &self.root
    }

    pub fn connect_close<F: Fn() + 'static>(&self, callback: F) {
        *self.on_close.borrow_mut() = Some(Box::new(callback));
    }

    pub fn connect_next<F: Fn() + 'static>(&self, callback: F) {
        *self.on_next.borrow_mut() = Some(Box::new(callback));
    }

    pub fn connect_prev<F: Fn() + 'static>(&self, callback: F) {
        *self.on_prev.borrow_mut() = Some(Box::new(callback));
    }

    pub fn connect_toggle_favorite<F: Fn(i64, bool) + 'static>(&self, callback: F) {
        *self.on_toggle_favorite.borrow_mut() = Some(Box::new(callback));
    }

    pub fn connect_download<F: Fn(ImageItem) + 'static>(&self, callback: F) {
        *self.on_download.borrow_mut() = Some(Box::new(callback));
    }

    /// Starts intercepting Escape/Left/Right on the host window.
    pub fn install_keys(&self, window: &ApplicationWindow) {
        if !self.keys_installed.replace(true) {
            window.add_controller(self.key_controller.clone());
        }
    }

    /// Releases the key interception; called on every close path.
    pub fn release_keys(&self, window: &ApplicationWindow) {
        if self.keys_installed.replace(false) {
            window.remove_controller(&self.key_controller);
        }
    }

    /// Shows an item. Decode happens off the main thread; a result arriving
    /// after the viewer has moved on is dropped by the token check.
    pub fn show_item(&self, item: &ImageItem) {
        let token = self.load_token.get().wrapping_add(1);
        self.load_token.set(token);

        let same_src = self
            .current
            .borrow()
            .as_ref()
            .is_some_and(|current| current.src == item.src);
        *self.current.borrow_mut() = Some(item.clone());

        self.caption.set_text(&caption_for(item));
        self.favorite_button
            .set_label(if item.is_favorited { "\u{2665}" } else { "\u{2661}" });
        if item.is_favorited {
            self.favorite_button.add_css_class("favorited");
        } else {
            self.favorite_button.remove_css_class("favorited");
        }

        if same_src {
            return;
        }
        self.picture.set_paintable(Some(placeholder_texture()));

        let picture_weak = self.picture.downgrade();
        let token_cell = self.load_token.clone();
        texture_loader().request(&item.src, LoadKind::Full, move |texture| {
            if token_cell.get() != token {
                return;
            }
            if let (Some(picture), Some(texture)) = (picture_weak.upgrade(), texture) {
                picture.set_paintable(Some(texture));
            }
        });
    }
}

fn caption_for(item: &ImageItem) -> String {
    if item.author.is_empty() {
        item.source.clone()
    } else {
        format!("{} \u{2014} by {}", item.source, item.author)
    }
}
