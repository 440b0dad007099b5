use serde::{Deserialize, Serialize};

/// Laravel-style page envelope returned by paginated listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,

    #[serde(default)]
    pub links: Vec<PaginationLink>,

    #[serde(default)]
    pub meta: Option<PaginationMeta>,
}

impl<T> Paginated<T> {
    /// Whether a page after the current one exists
    pub fn has_next_page(&self) -> bool {
        self.meta
            .as_ref()
            .map(|m| m.current_page < m.last_page)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// One entry of the pager control ("« Previous", "1", "2", "Next »")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationLink {
    pub url: Option<String>,
    pub label: String,
    #[serde(default)]
    pub active: bool,
}

impl PaginationLink {
    /// The page number this link navigates to, `None` for disabled links
    pub fn page_number(&self) -> Option<u32> {
        let url = self.url.as_deref()?;

        let from_query = reqwest::Url::parse(url).ok().and_then(|parsed| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.parse().ok())
        });

        from_query.or_else(|| self.label.trim().parse().ok())
    }

    /// Label with HTML entities used by the API replaced
    pub fn display_label(&self) -> String {
        self.label.replace("&laquo;", "«").replace("&raquo;", "»")
    }
}
