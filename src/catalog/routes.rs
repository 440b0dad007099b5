//! Navigation paths for the Type → Model → Submodel → Year → Version → Parts hierarchy.
//!
//! Every dynamic segment is percent-encoded.

use crate::models::SearchResultItem;

/// Percent-encode one path segment the way browsers' `encodeURIComponent`
/// does: `! ' ( ) *` stay literal.
pub fn encode_component(segment: &str) -> String {
    urlencoding::encode(segment)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

fn enc(segment: &str) -> String {
    encode_component(segment)
}

pub fn type_path(type_id: &str) -> String {
    format!("/types/{}", enc(type_id))
}

pub fn model_path(type_id: &str, model_id: &str) -> String {
    format!("{}/models/{}", type_path(type_id), enc(model_id))
}

pub fn submodel_path(type_id: &str, model_id: &str, submodel_id: &str) -> String {
    format!(
        "{}/submodels/{}",
        model_path(type_id, model_id),
        enc(submodel_id)
    )
}

pub fn year_path(type_id: &str, model_id: &str, submodel_id: &str, year_id: &str) -> String {
    format!(
        "{}/years/{}",
        submodel_path(type_id, model_id, submodel_id),
        enc(year_id)
    )
}

/// Parts listing for a model year, regardless of version
pub fn parts_path(type_id: &str, model_id: &str, submodel_id: &str, year_id: &str) -> String {
    format!("{}/parts", year_path(type_id, model_id, submodel_id, year_id))
}

/// Parts listing narrowed to one version of a model year
pub fn version_parts_path(
    type_id: &str,
    model_id: &str,
    submodel_id: &str,
    year_id: &str,
    version_id: &str,
) -> String {
    format!(
        "{}/versions/{}/parts",
        year_path(type_id, model_id, submodel_id, year_id),
        enc(version_id)
    )
}

/// Detail link for a search hit.
///
/// Hits carry `type`, `subtype` (the model) and `submodel`; the hit id
/// addresses the year. Returns `None` when any of those levels is missing.
pub fn search_result_path(item: &SearchResultItem) -> Option<String> {
    let type_id = item.kind.as_deref()?;
    let model_id = item.subtype.as_deref()?;
    let submodel_id = item.submodel.as_deref()?;

    Some(parts_path(type_id, model_id, submodel_id, &item.id))
}
