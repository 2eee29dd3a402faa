// A single image card in the grid
// Picture with hover info, favorite/download actions, and a click gesture
// reporting the card's flat position in the active view

use std::rc::Rc;
use std::sync::OnceLock;

use gdk4::Texture;
use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, ContentFit, GestureClick, Label, Orientation, Overlay, Picture};

use crate::models::ImageItem;
use crate::ui::loader::{texture_loader, LoadKind};

/// Upward card events, handled by the orchestrator.
#[derive(Clone)]
pub struct CardActions {
    /// A card was clicked; carries its flat position in the active view.
    pub on_open: Rc<dyn Fn(usize)>,
    /// `(image_id, desired_state)`.
    pub on_toggle_favorite: Rc<dyn Fn(i64, bool)>,
    pub on_download: Rc<dyn Fn(ImageItem)>,
}

// Placeholder texture - generated once and reused
pub(super) fn placeholder_texture() -> &'static Texture {
    static PLACEHOLDER: OnceLock<Texture> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        let width = 64usize;
        let height = 64usize;
        let mut pixels = vec![0u8; width * height * 4];

        // Dark gray (#1a1a1a) RGBA
        for chunk in pixels.chunks_exact_mut(4) {
            chunk[0] = 0x1a;
            chunk[1] = 0x1a;
            chunk[2] = 0x1a;
            chunk[3] = 0xff;
        }

        let bytes = glib::Bytes::from_owned(pixels);
        gdk4::MemoryTexture::new(
            width as i32,
            height as i32,
            gdk4::MemoryFormat::R8g8b8a8,
            &bytes,
            width * 4,
        )
        .upcast()
    })
}

/// Builds one card widget for an item at a flat view position.
///
/// Cards are created when their row enters the window and dropped when it
/// leaves; the async texture callback holds only a weak picture reference,
/// so an unrealized card simply misses its delivery.
pub fn build_card(item: &ImageItem, flat_index: usize, actions: &CardActions) -> gtk4::Widget {
    let picture = Picture::new();
    picture.set_can_shrink(true);
    picture.set_content_fit(ContentFit::Cover);
    picture.set_hexpand(true);
    picture.set_vexpand(true);
    picture.set_paintable(Some(placeholder_texture()));
    if !item.alt.is_empty() {
        picture.set_alternative_text(Some(&item.alt));
    }

    let overlay = Overlay::new();
    overlay.set_child(Some(&picture));
    overlay.add_css_class("image-card");
    overlay.set_overflow(gtk4::Overflow::Hidden);

    // Source/author caption along the bottom edge
    let info = GtkBox::new(Orientation::Vertical, 0);
    info.set_valign(Align::End);
    info.set_halign(Align::Fill);
    info.add_css_class("card-info");
    let source_label = Label::new(Some(&item.source));
    source_label.set_halign(Align::Start);
    source_label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
    source_label.add_css_class("card-source");
    info.append(&source_label);
    if !item.author.is_empty() {
        let author_label = Label::new(Some(&format!("by {}", item.author)));
        author_label.set_halign(Align::Start);
        author_label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        author_label.add_css_class("card-author");
        info.append(&author_label);
    }
    overlay.add_overlay(&info);

    // Favorite/download actions in the top-right corner. GTK buttons claim
    // their own click sequence, so pressing one never also opens the viewer.
    let action_bar = GtkBox::new(Orientation::Horizontal, 4);
    action_bar.set_halign(Align::End);
    action_bar.set_valign(Align::Start);
    action_bar.add_css_class("card-actions");

    let favorite_button = Button::with_label(if item.is_favorited { "\u{2665}" } else { "\u{2661}" });
    favorite_button.add_css_class("card-button");
    if item.is_favorited {
        favorite_button.add_css_class("favorited");
    }
    {
        let on_toggle = actions.on_toggle_favorite.clone();
        let image_id = item.id;
        let desired = !item.is_favorited;
        favorite_button.connect_clicked(move |_| on_toggle(image_id, desired));
    }
    action_bar.append(&favorite_button);

    let download_button = Button::with_label("\u{2193}");
    download_button.add_css_class("card-button");
    {
        let on_download = actions.on_download.clone();
        let item = item.clone();
        download_button.connect_clicked(move |_| on_download(item.clone()));
    }
    action_bar.append(&download_button);
    overlay.add_overlay(&action_bar);

    let click = GestureClick::new();
    click.set_button(1);
    {
        let on_open = actions.on_open.clone();
        click.connect_pressed(move |_, _n, _x, _y| on_open(flat_index));
    }
    overlay.add_controller(click);

    let picture_weak = picture.downgrade();
    texture_loader().request(&item.src, LoadKind::Preview, move |texture| {
        if let (Some(picture), Some(texture)) = (picture_weak.upgrade(), texture) {
            picture.set_paintable(Some(texture));
        }
    });

    overlay.upcast()
}
