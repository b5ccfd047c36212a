use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::error::CatalogError;

pub const DEFAULT_PUZZLE_ID: &str = "local-default";
pub const DEFAULT_PUZZLE_TITLE: &str = "Featured Home";
pub const DEFAULT_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1502005229762-cf1b2da7c52f?q=70&w=1200&auto=format&fit=crop";
pub const DEFAULT_CTA_URL: &str = "https://www.igethouse.ng/";

/// Midnight UTC, 2025-01-01. Week zero of the rotation.
pub const ROTATION_EPOCH_MS: f64 = 1_735_689_600_000.0;
pub const MS_PER_WEEK: f64 = 7.0 * 24.0 * 60.0 * 60.0 * 1000.0;

pub const IMAGE_OPTIMIZE_WIDTH: &str = "1200";
pub const IMAGE_OPTIMIZE_QUALITY: &str = "70";

/// Query parameters forced onto every puzzle image URL.
pub const IMAGE_URL_PARAMS: [(&str, &str); 4] = [
    ("w", IMAGE_OPTIMIZE_WIDTH),
    ("q", IMAGE_OPTIMIZE_QUALITY),
    ("auto", "format"),
    ("fit", "crop"),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleDescriptor {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "imageUrl", default = "default_image_url")]
    pub image_url: String,
}

fn default_image_url() -> String {
    DEFAULT_IMAGE_URL.to_string()
}

impl Default for PuzzleDescriptor {
    fn default() -> Self {
        Self {
            id: DEFAULT_PUZZLE_ID.to_string(),
            title: DEFAULT_PUZZLE_TITLE.to_string(),
            image_url: default_image_url(),
        }
    }
}

impl PuzzleDescriptor {
    /// Image URL with the sizing parameters applied.
    pub fn optimized_image_url(&self) -> String {
        let src = if self.image_url.trim().is_empty() {
            DEFAULT_IMAGE_URL
        } else {
            self.image_url.as_str()
        };
        optimize_image_url(src)
    }
}

#[derive(Deserialize)]
struct CatalogDoc {
    #[serde(default)]
    puzzles: Vec<PuzzleDescriptor>,
}

/// Ordered puzzle list. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PuzzleCatalog {
    puzzles: Vec<PuzzleDescriptor>,
}

impl Default for PuzzleCatalog {
    fn default() -> Self {
        Self {
            puzzles: vec![PuzzleDescriptor::default()],
        }
    }
}

impl PuzzleCatalog {
    pub fn new(puzzles: Vec<PuzzleDescriptor>) -> Result<Self, CatalogError> {
        if puzzles.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { puzzles })
    }

    /// Parses `{"puzzles": [{"id", "title", "imageUrl"}]}`.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDoc = serde_json::from_str(raw.trim())?;
        Self::new(doc.puzzles)
    }

    /// Missing, malformed or empty catalogs fall back to the single
    /// built-in puzzle.
    pub fn from_json_or_default(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(%err, "using built-in puzzle catalog");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    pub fn puzzles(&self) -> &[PuzzleDescriptor] {
        &self.puzzles
    }

    pub fn get(&self, index: usize) -> Option<&PuzzleDescriptor> {
        self.puzzles.get(index)
    }

    /// Entry at `index` modulo the catalog length.
    pub fn wrapped(&self, index: usize) -> &PuzzleDescriptor {
        &self.puzzles[index % self.puzzles.len()]
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.puzzles.iter().position(|puzzle| puzzle.id == id)
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.puzzles.len()
    }

    pub fn prev_index(&self, index: usize) -> usize {
        let len = self.puzzles.len();
        (index % len + len - 1) % len
    }

    /// Weekly rotation: whole weeks since [`ROTATION_EPOCH_MS`], wrapped
    /// into the catalog. Times before the epoch wrap backwards.
    pub fn week_index(&self, now_ms: f64) -> usize {
        let weeks = ((now_ms - ROTATION_EPOCH_MS) / MS_PER_WEEK).floor() as i64;
        weeks.rem_euclid(self.puzzles.len() as i64) as usize
    }
}

/// Widget settings read from the host page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(rename = "ctaUrl", default = "default_cta_url")]
    pub cta_url: String,
}

fn default_cta_url() -> String {
    DEFAULT_CTA_URL.to_string()
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            cta_url: default_cta_url(),
        }
    }
}

impl WidgetConfig {
    pub fn from_json_or_default(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<WidgetConfig>(raw.trim()) {
            Ok(config) if !config.cta_url.trim().is_empty() => config,
            Ok(_) => Self::default(),
            Err(err) => {
                warn!(%err, "ignoring malformed widget config");
                Self::default()
            }
        }
    }
}

/// Forces the [`IMAGE_URL_PARAMS`] onto an absolute URL, replacing existing
/// values in place. Anything that does not parse is returned unchanged.
pub fn optimize_image_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in url.query_pairs() {
        let forced = IMAGE_URL_PARAMS.iter().find(|(name, _)| *name == key);
        match forced {
            Some((name, forced_value)) => {
                if !pairs.iter().any(|(existing, _)| existing == name) {
                    pairs.push((name.to_string(), forced_value.to_string()));
                }
            }
            None => pairs.push((key.into_owned(), value.into_owned())),
        }
    }
    for (name, value) in IMAGE_URL_PARAMS {
        if !pairs.iter().any(|(existing, _)| existing == name) {
            pairs.push((name.to_string(), value.to_string()));
        }
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inline_catalog() {
        let catalog = PuzzleCatalog::from_json(
            r#"{"puzzles":[{"id":"a","title":"Lagos Loft","imageUrl":"https://x.test/a.jpg"},{"id":"b","title":"B"}]}"#,
        )
        .expect("catalog");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.wrapped(3).id, "b");
        assert_eq!(catalog.get(1).map(|p| p.image_url.as_str()), Some(DEFAULT_IMAGE_URL));
    }

    #[test]
    fn broken_or_empty_catalog_uses_builtin() {
        assert!(matches!(
            PuzzleCatalog::from_json(r#"{"puzzles":[]}"#),
            Err(CatalogError::Empty)
        ));
        assert!(matches!(PuzzleCatalog::from_json("{"), Err(CatalogError::Json(_))));
        let fallback = PuzzleCatalog::from_json_or_default(Some("not json"));
        assert_eq!(fallback.len(), 1);
        assert_eq!(fallback.wrapped(0).id, DEFAULT_PUZZLE_ID);
        assert_eq!(PuzzleCatalog::from_json_or_default(None), PuzzleCatalog::default());
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let catalog = PuzzleCatalog::new(vec![
            PuzzleDescriptor::default(),
            PuzzleDescriptor::default(),
            PuzzleDescriptor::default(),
        ])
        .expect("catalog");
        assert_eq!(catalog.next_index(2), 0);
        assert_eq!(catalog.prev_index(0), 2);
        assert_eq!(catalog.prev_index(1), 0);
    }

    #[test]
    fn week_rotation_counts_from_epoch() {
        let catalog = PuzzleCatalog::new(vec![PuzzleDescriptor::default(); 3]).expect("catalog");
        assert_eq!(catalog.week_index(ROTATION_EPOCH_MS), 0);
        assert_eq!(catalog.week_index(ROTATION_EPOCH_MS + MS_PER_WEEK * 4.5), 1);
        assert_eq!(catalog.week_index(ROTATION_EPOCH_MS - 1.0), 2);
    }

    #[test]
    fn config_falls_back_to_default_cta() {
        assert_eq!(
            WidgetConfig::from_json_or_default(Some(r#"{"ctaUrl":"https://agency.test/"}"#)).cta_url,
            "https://agency.test/"
        );
        assert_eq!(WidgetConfig::from_json_or_default(Some("{}")).cta_url, DEFAULT_CTA_URL);
        assert_eq!(WidgetConfig::from_json_or_default(Some("[")), WidgetConfig::default());
    }

    #[test]
    fn image_url_gets_sizing_params() {
        assert_eq!(
            optimize_image_url("https://cdn.test/p.jpg?w=4000&id=7"),
            "https://cdn.test/p.jpg?w=1200&id=7&q=70&auto=format&fit=crop"
        );
        assert_eq!(optimize_image_url("puzzles/local.jpg"), "puzzles/local.jpg");
    }
}
