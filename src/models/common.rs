// src/models/common.rs
// DOCUMENTATION: Shared response envelopes, pagination and helpers
// PURPOSE: Keep every endpoint on the same `{ success, data }` JSON shape

use serde::{Deserialize, Serialize};

/// Implements `as_str`, `FromStr` and `Display` for enums stored as TEXT columns
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $name {
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// Pages beyond this are clamped so OFFSET arithmetic cannot overflow
pub const MAX_PAGE: i64 = 1_000_000;

/// Page/limit pair shared by all list endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Results per page (max 100)
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// Paginated list response
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total_count: i64, paging: PageQuery) -> Self {
        let page = paging.page();
        let limit = paging.limit();
        Self {
            data,
            total_count,
            page,
            limit,
            has_more: total_count > page.saturating_mul(limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            limit: self.limit,
            has_more: self.has_more,
        }
    }
}

/// URL-safe slug: lowercase ascii alphanumerics separated by single dashes
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("item");
    }
    slug
}

/// Slug with a short random suffix, used when the plain slug is taken
pub fn slug_with_suffix(base: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", base, &suffix[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Bantu Korban Banjir 2024!"), "bantu-korban-banjir-2024");
        assert_eq!(slugify("  --Hello   World-- "), "hello-world");
        assert_eq!(slugify("!!!"), "item");
    }

    #[test]
    fn test_slug_with_suffix() {
        let slug = slug_with_suffix("sedekah");
        assert!(slug.starts_with("sedekah-"));
        assert_eq!(slug.len(), "sedekah-".len() + 6);
    }

    #[test]
    fn test_page_query_bounds() {
        let q = PageQuery::new(Some(0), Some(500));
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 0);

        let q = PageQuery::new(Some(3), Some(10));
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn test_paginated_has_more() {
        let page = Paginated::new(vec![1, 2], 5, PageQuery::new(Some(1), Some(2)));
        assert!(page.has_more);

        let page = Paginated::new(vec![5], 5, PageQuery::new(Some(3), Some(2)));
        assert!(!page.has_more);
        assert_eq!(page.map(|n| n * 10).data, vec![50]);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let q = PageQuery::new(Some(i64::MAX), Some(100));
        assert_eq!(q.page(), MAX_PAGE);
        assert_eq!(q.offset(), (MAX_PAGE - 1) * 100);

        let page: Paginated<i64> = Paginated::new(vec![], 10, q);
        assert!(!page.has_more);
    }

    #[test]
    fn test_paginated_holds_non_serializable_rows() {
        struct Row(i64);
        let page = Paginated::new(vec![Row(1), Row(2)], 2, PageQuery::default());
        assert_eq!(page.map(|r| r.0).data, vec![1, 2]);
    }
}
