//! The single owned store for everything the client displays.
//!
//! All mutation goes through the explicit entry points below; each one swaps
//! in a fresh immutable snapshot and then notifies registered observers, so a
//! reader can never observe a partially-updated collection.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::models::{ImageItem, Source};

type ChangeCallback = Box<dyn Fn()>;

/// In-memory store of sources and images, published as immutable snapshots.
///
/// Single-threaded by design: every mutation and every observer callback runs
/// on the GTK main loop. Data arrives from the aggregator service through the
/// orchestrator, which owns the only mutable handle.
#[derive(Default)]
pub struct ImageCollection {
    images: RefCell<Rc<[ImageItem]>>,
    sources: RefCell<Rc<[Source]>>,
    observers: RefCell<Vec<ChangeCallback>>,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current image snapshot. Cheap to clone and safe to hold across
    /// mutations; it simply goes stale.
    pub fn images(&self) -> Rc<[ImageItem]> {
        self.images.borrow().clone()
    }

    pub fn sources(&self) -> Rc<[Source]> {
        self.sources.borrow().clone()
    }

    /// Registers a callback invoked after every mutation.
    pub fn connect_changed<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.observers.borrow_mut().push(Box::new(callback));
    }

    /// Replaces the whole collection, e.g. after the initial fetch.
    pub fn replace_all(&self, sources: Vec<Source>, images: Vec<ImageItem>) {
        debug!(sources = sources.len(), images = images.len(), "Replacing collection");
        *self.sources.borrow_mut() = sources.into();
        *self.images.borrow_mut() = images.into();
        self.notify();
    }

    /// Prepends freshly scraped or synced images, newest first, matching the
    /// service's ordering for later full fetches.
    pub fn prepend_images(&self, new_images: Vec<ImageItem>) {
        if new_images.is_empty() {
            return;
        }
        debug!(count = new_images.len(), "Prepending images");
        {
            let mut images = self.images.borrow_mut();
            let mut merged = Vec::with_capacity(new_images.len() + images.len());
            merged.extend(new_images);
            merged.extend(images.iter().cloned());
            *images = merged.into();
        }
        self.notify();
    }

    /// Applies a completed scrape: the new source joins the sidebar list and
    /// its images are prepended, in one notification.
    pub fn merge_scrape(&self, source: Source, new_images: Vec<ImageItem>) {
        debug!(source = %source.name, images = new_images.len(), "Merging scrape result");
        {
            let mut sources = self.sources.borrow_mut();
            let mut merged: Vec<Source> = sources.iter().cloned().collect();
            merged.push(source);
            *sources = merged.into();
        }
        {
            let mut images = self.images.borrow_mut();
            let mut merged = Vec::with_capacity(new_images.len() + images.len());
            merged.extend(new_images);
            merged.extend(images.iter().cloned());
            *images = merged.into();
        }
        self.notify();
    }

    /// Flips the favorite flag on one image. Returns `false` when the id is
    /// unknown (e.g. the item was removed while the request was in flight).
    pub fn set_favorite(&self, image_id: i64, favorite: bool) -> bool {
        let changed = {
            let mut images = self.images.borrow_mut();
            let Some(pos) = images.iter().position(|item| item.id == image_id) else {
                return false;
            };
            if images[pos].is_favorited == favorite {
                false
            } else {
                let mut updated: Vec<ImageItem> = images.iter().cloned().collect();
                updated[pos].is_favorited = favorite;
                *images = updated.into();
                true
            }
        };
        if changed {
            self.notify();
        }
        true
    }

    /// Drops a source and every image attached to it.
    pub fn remove_source(&self, source_id: i64) {
        debug!(source_id, "Removing source");
        {
            let mut sources = self.sources.borrow_mut();
            let kept: Vec<Source> = sources
                .iter()
                .filter(|s| s.id != source_id)
                .cloned()
                .collect();
            *sources = kept.into();
        }
        {
            let mut images = self.images.borrow_mut();
            let kept: Vec<ImageItem> = images
                .iter()
                .filter(|item| !item.belongs_to(source_id))
                .cloned()
                .collect();
            *images = kept.into();
        }
        self.notify();
    }

    pub fn has_source(&self, source_id: i64) -> bool {
        self.sources.borrow().iter().any(|s| s.id == source_id)
    }

    fn notify(&self) {
        // Snapshot borrows are released before callbacks run; observers may
        // re-read the collection freely.
        for callback in self.observers.borrow().iter() {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn item(id: i64, source_id: Option<i64>, favorited: bool) -> ImageItem {
        ImageItem {
            id,
            src: format!("https://cdn.example.com/{id}.jpg"),
            alt: String::new(),
            source: "example.com".into(),
            author: String::new(),
            source_id,
            is_favorited: favorited,
        }
    }

    fn source(id: i64) -> Source {
        Source {
            id,
            name: format!("source-{id}"),
            url: String::new(),
        }
    }

    #[test]
    fn test_replace_and_snapshot() {
        let store = ImageCollection::new();
        store.replace_all(vec![source(1)], vec![item(1, Some(1), false)]);

        let before = store.images();
        store.prepend_images(vec![item(2, Some(1), false)]);

        // Old snapshot is unaffected by later mutations.
        assert_eq!(before.len(), 1);
        assert_eq!(store.images().len(), 2);
        assert_eq!(store.images()[0].id, 2);
    }

    #[test]
    fn test_set_favorite() {
        let store = ImageCollection::new();
        store.replace_all(vec![], vec![item(1, None, false)]);

        assert!(store.set_favorite(1, true));
        assert!(store.images()[0].is_favorited);
        assert!(!store.set_favorite(99, true));
    }

    #[test]
    fn test_remove_source_drops_its_images() {
        let store = ImageCollection::new();
        store.replace_all(
            vec![source(1), source(2)],
            vec![item(1, Some(1), false), item(2, Some(2), true), item(3, None, true)],
        );

        store.remove_source(1);

        assert!(!store.has_source(1));
        assert!(store.has_source(2));
        let ids: Vec<i64> = store.images().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_merge_scrape_is_one_notification() {
        let store = ImageCollection::new();
        let fired = Rc::new(Cell::new(0u32));
        let fired_in = fired.clone();
        store.connect_changed(move || fired_in.set(fired_in.get() + 1));

        store.merge_scrape(source(1), vec![item(1, Some(1), false), item(2, Some(1), false)]);
        assert_eq!(fired.get(), 1);
        assert!(store.has_source(1));
        assert_eq!(store.images().len(), 2);
    }

    #[test]
    fn test_observers_fire_once_per_mutation() {
        let store = ImageCollection::new();
        let fired = Rc::new(Cell::new(0u32));
        let fired_in = fired.clone();
        store.connect_changed(move || fired_in.set(fired_in.get() + 1));

        store.replace_all(vec![], vec![item(1, None, false)]);
        store.set_favorite(1, true);
        // No-op toggle does not notify.
        store.set_favorite(1, true);
        assert_eq!(fired.get(), 2);
    }
}
