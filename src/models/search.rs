use serde::{Deserialize, Serialize};

use super::serde_helpers::{opt_string_or_number, string_or_number};

/// A single hit from the search endpoint.
///
/// The shape depends on which catalog level matched; only `id` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default, rename = "type", deserialize_with = "opt_string_or_number")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub subtype: Option<String>,

    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub submodel: Option<String>,

    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub year: Option<String>,

    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub name: Option<String>,
}

impl SearchResultItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            subtype: None,
            submodel: None,
            year: None,
            name: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn with_submodel(mut self, submodel: impl Into<String>) -> Self {
        self.submodel = Some(submodel.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Context prefix shown before the label, e.g. "Car - Sedan - LX - 2020"
    pub fn breadcrumb(&self) -> String {
        [&self.kind, &self.subtype, &self.submodel, &self.year]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" - ")
    }

    /// Text shown in the dropdown: the name, else "type subtype", else the id
    pub fn label(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        let composed = [self.kind.as_deref(), self.subtype.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if composed.is_empty() {
            self.id.clone()
        } else {
            composed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prefers_name() {
        let item = SearchResultItem::new("1")
            .with_kind("Car")
            .with_subtype("Sedan")
            .with_name("Civic LX");
        assert_eq!(item.label(), "Civic LX");
    }

    #[test]
    fn test_label_composes_type_and_subtype() {
        let item = SearchResultItem::new("1").with_kind("Car").with_subtype("Sedan");
        assert_eq!(item.label(), "Car Sedan");

        let blank_name = SearchResultItem::new("1").with_kind("Truck").with_name("  ");
        assert_eq!(blank_name.label(), "Truck");
    }

    #[test]
    fn test_breadcrumb_skips_missing_levels() {
        let item = SearchResultItem::new("9")
            .with_kind("Car")
            .with_submodel("LX")
            .with_year("2020");
        assert_eq!(item.breadcrumb(), "Car - LX - 2020");
        assert_eq!(SearchResultItem::new("9").breadcrumb(), "");
    }

    #[test]
    fn test_label_falls_back_to_id() {
        assert_eq!(SearchResultItem::new("2020").label(), "2020");
    }

    #[test]
    fn test_heterogeneous_decoding() {
        let item: SearchResultItem = serde_json::from_str(
            r#"{"id": 2020, "type": "Car", "subtype": "Sedan 4-Door", "submodel": "LX", "year": 2020, "score": 0.8}"#,
        )
        .unwrap();
        assert_eq!(item.id, "2020");
        assert_eq!(item.kind.as_deref(), Some("Car"));
        assert_eq!(item.year.as_deref(), Some("2020"));
        assert_eq!(item.name, None);
    }
}
