use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::serde_helpers::{opt_string_or_number, string_or_number};

/// Top level of the catalog hierarchy (car, truck, motorcycle...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogType {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub image: Option<String>,
}

/// A model belonging to a catalog type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    pub name: String,

    #[serde(
        default,
        rename = "typeId",
        deserialize_with = "opt_string_or_number"
    )]
    pub type_id: Option<String>,

    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submodel {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Storage id some endpoints expose alongside `id`
    #[serde(default, rename = "_id", deserialize_with = "opt_string_or_number")]
    pub storage_id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelYear {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default, rename = "_id", deserialize_with = "opt_string_or_number")]
    pub storage_id: Option<String>,

    /// Usually the year itself; the API sends it as a number or a string
    #[serde(deserialize_with = "string_or_number")]
    pub name: String,

    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub image: Option<String>,
}

/// A part listed for a model year, optionally narrowed by version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub dimensions: Option<String>,

    #[serde(default)]
    pub points: Option<f64>,

    /// Vendor-specific attributes are kept verbatim
    #[serde(flatten)]
    pub attributes: HashMap<String, serde_json::Value>,
}

/// Entities rendered by the detail-list views share an id, a name and an image
pub trait CatalogEntry {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn image(&self) -> Option<&str>;
}

macro_rules! impl_catalog_entry {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CatalogEntry for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn name(&self) -> &str {
                    &self.name
                }

                fn image(&self) -> Option<&str> {
                    self.image.as_deref()
                }
            }
        )*
    };
}

impl_catalog_entry!(CatalogType, Model, Submodel, ModelYear, Version, Part);
