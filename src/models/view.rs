use std::rc::Rc;

use crate::models::ImageItem;

/// Which filtered view of the collection is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Images attached to a tracked source.
    Feed,
    /// Favorited images, including sourceless ones.
    Favorites,
}

impl ViewKind {
    pub fn accepts(&self, item: &ImageItem) -> bool {
        match self {
            ViewKind::Feed => item.source_id.is_some(),
            ViewKind::Favorites => item.is_favorited,
        }
    }
}

/// A derived, read-only ordered list over one collection snapshot.
///
/// Positions are stable: deriving twice from the same snapshot and kind yields
/// the same sequence, so an open modal index stays meaningful across renders.
/// Malformed items are silently dropped here rather than at render time.
#[derive(Clone)]
pub struct CollectionView {
    snapshot: Rc<[ImageItem]>,
    indices: Rc<[usize]>,
    kind: ViewKind,
}

impl CollectionView {
    pub fn derive(snapshot: Rc<[ImageItem]>, kind: ViewKind) -> Self {
        let indices: Rc<[usize]> = snapshot
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_well_formed() && kind.accepts(item))
            .map(|(i, _)| i)
            .collect();
        Self {
            snapshot,
            indices,
            kind,
        }
    }

    pub fn empty(kind: ViewKind) -> Self {
        Self {
            snapshot: Vec::new().into(),
            indices: Vec::new().into(),
            kind,
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Item at a flat view position.
    pub fn get(&self, position: usize) -> Option<&ImageItem> {
        self.indices
            .get(position)
            .and_then(|&i| self.snapshot.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageItem> {
        self.indices.iter().map(move |&i| &self.snapshot[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, source_id: Option<i64>, favorited: bool) -> ImageItem {
        ImageItem {
            id,
            src: format!("https://cdn.example.com/{id}.jpg"),
            alt: String::new(),
            source: String::new(),
            author: String::new(),
            source_id,
            is_favorited: favorited,
        }
    }

    fn snapshot(items: Vec<ImageItem>) -> Rc<[ImageItem]> {
        items.into()
    }

    #[test]
    fn test_feed_excludes_sourceless() {
        let snap = snapshot(vec![
            item(1, Some(1), false),
            item(2, None, true),
            item(3, Some(2), true),
        ]);
        let feed = CollectionView::derive(snap.clone(), ViewKind::Feed);
        let ids: Vec<i64> = feed.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_sourceless_favorite_appears_in_favorites_only() {
        let snap = snapshot(vec![item(1, None, true)]);
        assert_eq!(CollectionView::derive(snap.clone(), ViewKind::Feed).len(), 0);
        let favorites = CollectionView::derive(snap, ViewKind::Favorites);
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites.get(0).unwrap().id, 1);
    }

    #[test]
    fn test_order_is_stable_across_rederivation() {
        let snap = snapshot((0..20).map(|i| item(i, Some(1), i % 3 == 0)).collect());
        let a: Vec<i64> = CollectionView::derive(snap.clone(), ViewKind::Favorites)
            .iter()
            .map(|i| i.id)
            .collect();
        let b: Vec<i64> = CollectionView::derive(snap, ViewKind::Favorites)
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_malformed_items_dropped() {
        let mut bad = item(2, Some(1), false);
        bad.src = String::new();
        let snap = snapshot(vec![item(1, Some(1), false), bad, item(3, Some(1), false)]);
        let feed = CollectionView::derive(snap, ViewKind::Feed);
        let ids: Vec<i64> = feed.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_out_of_range_get() {
        let view = CollectionView::derive(snapshot(vec![item(1, Some(1), false)]), ViewKind::Feed);
        assert!(view.get(0).is_some());
        assert!(view.get(1).is_none());
    }
}
