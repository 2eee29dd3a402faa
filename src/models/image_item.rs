use serde::{Deserialize, Serialize};

/// A single image in the aggregated collection.
///
/// Items are owned by the [`ImageCollection`](crate::models::ImageCollection);
/// the grid and viewer only ever see them through immutable snapshots. The
/// field names mirror the aggregator service's JSON payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageItem {
    pub id: i64,
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub author: String,
    /// `None` for images no longer attached to any tracked source.
    #[serde(rename = "sourceId", default)]
    pub source_id: Option<i64>,
    #[serde(rename = "isFavorited", default)]
    pub is_favorited: bool,
}

impl ImageItem {
    /// Minimum shape required to render a card. Items failing this are
    /// dropped from derived views instead of aborting the render.
    pub fn is_well_formed(&self) -> bool {
        !self.src.is_empty()
    }

    pub fn belongs_to(&self, source_id: i64) -> bool {
        self.source_id == Some(source_id)
    }
}

/// A tracked scrape source, listed in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_service_payload() {
        let json = r#"{
            "id": 42,
            "src": "https://cdn.example.com/a.jpg",
            "alt": "a",
            "source": "example.com",
            "author": "someone",
            "sourceId": 7,
            "isFavorited": true
        }"#;
        let item: ImageItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 42);
        assert_eq!(item.source_id, Some(7));
        assert!(item.is_favorited);
        assert!(item.is_well_formed());
    }

    #[test]
    fn test_missing_optional_fields() {
        let item: ImageItem =
            serde_json::from_str(r#"{"id": 1, "src": "https://x/y.png"}"#).unwrap();
        assert_eq!(item.source_id, None);
        assert!(!item.is_favorited);
        assert!(item.alt.is_empty());
    }

    #[test]
    fn test_malformed_item_detected() {
        let item: ImageItem = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert!(!item.is_well_formed());
    }
}
