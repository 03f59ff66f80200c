//! Error presentation
//!
//! `ErrorPresenter` is the seam between evaluation and whatever draws the
//! form. `RegionPresenter` keeps an in-memory model of each field's error
//! region: the highlight mark, visibility and rendered message spans.

use rustc_hash::FxHashMap;

/// Renders and clears a field's error state
///
/// Both operations replace state wholesale so repeated calls never
/// accumulate entries.
pub trait ErrorPresenter {
    /// Mark `field` as errored and render every message into its region
    fn show(&mut self, field: &str, messages: &[String]);

    /// Clear the mark and empty/hide the region
    fn hide(&mut self, field: &str);
}

/// Error region of one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    /// `<error_prefix><field>`
    pub id: String,
    /// Field (and its container) carry the highlight class
    pub highlighted: bool,
    pub visible: bool,
    /// One span per message, in order
    pub spans: Vec<String>,
}

/// In-memory error regions keyed by field name
#[derive(Debug, Clone)]
pub struct RegionPresenter {
    error_prefix: String,
    highlight_class: String,
    regions: FxHashMap<String, Region>,
}

impl RegionPresenter {
    pub fn new(error_prefix: impl Into<String>, highlight_class: impl Into<String>) -> Self {
        Self {
            error_prefix: error_prefix.into(),
            highlight_class: highlight_class.into(),
            regions: FxHashMap::default(),
        }
    }

    pub fn region(&self, field: &str) -> Option<&Region> {
        self.regions.get(field)
    }

    /// Region id addressing `field`'s messages
    pub fn region_id(&self, field: &str) -> String {
        format!("{}{}", self.error_prefix, field)
    }

    pub fn highlight_class(&self) -> &str {
        &self.highlight_class
    }

    /// Whether `field` currently shows an error
    pub fn is_highlighted(&self, field: &str) -> bool {
        self.regions.get(field).is_some_and(|r| r.highlighted)
    }

    /// Fields with a visible error region, sorted by name
    pub fn visible_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .regions
            .iter()
            .filter(|(_, r)| r.visible)
            .map(|(name, _)| name.as_str())
            .collect();
        fields.sort_unstable();
        fields
    }

    fn region_mut(&mut self, field: &str) -> &mut Region {
        let id = self.region_id(field);
        self.regions
            .entry(field.to_string())
            .or_insert_with(|| Region {
                id,
                ..Default::default()
            })
    }
}

impl Default for RegionPresenter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ERROR_PREFIX, crate::config::DEFAULT_HIGHLIGHT_CLASS)
    }
}

impl ErrorPresenter for RegionPresenter {
    fn show(&mut self, field: &str, messages: &[String]) {
        let region = self.region_mut(field);
        region.highlighted = true;
        region.spans.clear();
        region.spans.extend(messages.iter().cloned());
        region.visible = true;
    }

    fn hide(&mut self, field: &str) {
        let region = self.region_mut(field);
        region.highlighted = false;
        region.visible = false;
        region.spans.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msgs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn show_renders_every_message() {
        let mut p = RegionPresenter::default();
        p.show("from", &msgs(&["first", "second"]));

        let region = p.region("from").unwrap();
        assert_eq!(region.id, "error-from");
        assert!(region.highlighted);
        assert!(region.visible);
        assert_eq!(region.spans, msgs(&["first", "second"]));
    }

    #[test]
    fn show_twice_does_not_accumulate() {
        let mut p = RegionPresenter::default();
        p.show("from", &msgs(&["first"]));
        p.show("from", &msgs(&["first"]));
        assert_eq!(p.region("from").unwrap().spans.len(), 1);
    }

    #[test]
    fn hide_is_idempotent() {
        let mut p = RegionPresenter::default();
        p.hide("to");
        let once = p.region("to").cloned();
        p.hide("to");
        assert_eq!(p.region("to").cloned(), once);

        p.show("to", &msgs(&["x"]));
        p.hide("to");
        let region = p.region("to").unwrap();
        assert!(!region.highlighted);
        assert!(!region.visible);
        assert!(region.spans.is_empty());
    }

    #[test]
    fn custom_prefix() {
        let p = RegionPresenter::new("err_", "bad");
        assert_eq!(p.region_id("from"), "err_from");
        assert_eq!(p.highlight_class(), "bad");
    }

    #[test]
    fn visible_fields_sorted() {
        let mut p = RegionPresenter::default();
        p.show("b", &msgs(&["x"]));
        p.show("a", &msgs(&["y"]));
        p.hide("c");
        assert_eq!(p.visible_fields(), vec!["a", "b"]);
    }
}
