//! Query parameters, pagination and display helpers for the invoice list

use serde::{Deserialize, Serialize};

/// Rows shown per invoice list page
pub const ITEMS_PER_PAGE: usize = 6;

/// Query parameters of the invoice list
///
/// # Example
/// ```rust,ignore
/// // GET /dashboard/invoices?query=lee&page=2
/// pub async fn list_invoices(Query(params): Query<InvoiceListParams>) { ... }
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct InvoiceListParams {
    /// Free-text search term
    pub query: Option<String>,

    /// Page number (starts at 1)
    pub page: Option<usize>,
}

impl InvoiceListParams {
    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or("").trim()
    }
}

/// One entry of a pagination bar
///
/// Serializes as the page number, or `"..."` for an ellipsis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl Serialize for PageItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageItem::Page(n) => serializer.serialize_u64(*n as u64),
            PageItem::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Pages shown in the pagination bar
///
/// Up to seven pages are listed in full. Otherwise the first and last pages
/// are always present and an ellipsis stands in for the skipped run.
pub fn generate_pagination(current: usize, total: usize) -> Vec<PageItem> {
    use PageItem::{Ellipsis, Page};

    if total <= 7 {
        return (1..=total).map(Page).collect();
    }

    if current <= 3 {
        return vec![Page(1), Page(2), Page(3), Ellipsis, Page(total - 1), Page(total)];
    }

    if current >= total - 2 {
        return vec![
            Page(1),
            Page(2),
            Ellipsis,
            Page(total - 2),
            Page(total - 1),
            Page(total),
        ];
    }

    vec![
        Page(1),
        Ellipsis,
        Page(current - 1),
        Page(current),
        Page(current + 1),
        Ellipsis,
        Page(total),
    ]
}

/// Total pages for `total` rows
pub fn page_count(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1))
}

/// Format cents as US dollars, e.g. `123456 -> "$1,234.56"`
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}${}.{:02}", sign, grouped, abs % 100)
}

/// Paginated invoice list response
#[derive(Debug, Serialize)]
pub struct InvoicePage<T> {
    pub rows: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub pagination: Vec<PageItem>,
}
