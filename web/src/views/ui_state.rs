//! View-scoped UI state with typed actions.
//!
//! The sidebar's collapsed flag lives in a plain (non HTTP-only) cookie; the
//! home page search filters live in the query string. Both are changed only
//! through `reduce`.

use crate::auth::session::read_cookie;
use crate::backend::models::{PropertyQuery, PropertyType};
use crate::utils::local_url;
use axum::http::{HeaderMap, HeaderValue};
use serde::Deserialize;

pub const SIDEBAR_COOKIE: &str = "sidebar-collapsed";
pub const HOME_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SidebarState {
    pub collapsed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidebarAction {
    Toggle,
    Collapse,
    Expand,
}

impl SidebarState {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            collapsed: read_cookie(headers, SIDEBAR_COOKIE) == Some("true"),
        }
    }

    pub fn reduce(self, action: SidebarAction) -> Self {
        match action {
            SidebarAction::Toggle => Self {
                collapsed: !self.collapsed,
            },
            SidebarAction::Collapse => Self { collapsed: true },
            SidebarAction::Expand => Self { collapsed: false },
        }
    }

    pub fn to_cookie(&self) -> HeaderValue {
        HeaderValue::from_static(if self.collapsed {
            "sidebar-collapsed=true; Path=/; SameSite=Lax; Max-Age=31536000"
        } else {
            "sidebar-collapsed=false; Path=/; SameSite=Lax; Max-Age=31536000"
        })
    }
}

/// Raw home page query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeFilters {
    pub search: Option<String>,
    pub property_type: Option<PropertyType>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterAction {
    SetSearch(String),
    SetType(Option<PropertyType>),
    SetPriceRange(Option<u64>, Option<u64>),
    SetPage(u32),
    Reset,
}

impl HomeFilters {
    /// Builds filters from the query string, dropping blank or unparsable values.
    pub fn from_query(query: &HomeQuery) -> Self {
        let number = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .and_then(|v| v.parse::<u64>().ok())
        };

        let filters = HomeFilters::default()
            .reduce(FilterAction::SetSearch(
                query.search.clone().unwrap_or_default(),
            ))
            .reduce(FilterAction::SetType(
                query
                    .property_type
                    .as_deref()
                    .and_then(|t| t.parse::<PropertyType>().ok()),
            ))
            .reduce(FilterAction::SetPriceRange(
                number(&query.min_price),
                number(&query.max_price),
            ));

        filters.reduce(FilterAction::SetPage(query.page.unwrap_or(1)))
    }

    /// Any filter change sends the visitor back to the first page.
    pub fn reduce(self, action: FilterAction) -> Self {
        match action {
            FilterAction::SetSearch(search) => {
                let search = search.trim();
                Self {
                    search: (!search.is_empty()).then(|| search.to_string()),
                    page: 1,
                    ..self
                }
            }
            FilterAction::SetType(property_type) => Self {
                property_type,
                page: 1,
                ..self
            },
            FilterAction::SetPriceRange(min, max) => {
                // A reversed range is swapped rather than rejected.
                let (min_price, max_price) = match (min, max) {
                    (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
                    other => other,
                };
                Self {
                    min_price,
                    max_price,
                    page: 1,
                    ..self
                }
            }
            FilterAction::SetPage(page) => Self {
                page: page.max(1),
                ..self
            },
            FilterAction::Reset => Self {
                page: 1,
                ..Self::default()
            },
        }
    }

    pub fn is_active(&self) -> bool {
        self.search.is_some()
            || self.property_type.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
    }

    pub fn to_property_query(&self) -> PropertyQuery {
        PropertyQuery {
            page: self.page,
            limit: HOME_PAGE_SIZE,
            search: self.search.clone(),
            property_type: self.property_type,
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }

    /// Canonical `/?...` URL for these filters.
    pub fn to_url(&self, path: &str) -> String {
        let min = self.min_price.map(|v| v.to_string());
        let max = self.max_price.map(|v| v.to_string());
        let page = self.page.to_string();

        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(search) = &self.search {
            params.push(("search", search.as_str()));
        }
        if let Some(property_type) = &self.property_type {
            params.push(("type", property_type.as_str()));
        }
        if let Some(min) = &min {
            params.push(("min_price", min.as_str()));
        }
        if let Some(max) = &max {
            params.push(("max_price", max.as_str()));
        }
        if self.page > 1 {
            params.push(("page", page.as_str()));
        }
        local_url(path, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn test_sidebar_actions() {
        let state = SidebarState::default();
        assert!(state.reduce(SidebarAction::Toggle).collapsed);
        assert!(!state.reduce(SidebarAction::Toggle).reduce(SidebarAction::Toggle).collapsed);
        assert!(state.reduce(SidebarAction::Collapse).collapsed);
        assert!(!state.reduce(SidebarAction::Collapse).reduce(SidebarAction::Expand).collapsed);
    }

    #[test]
    fn test_sidebar_reads_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("sidebar-collapsed=true"));
        assert!(SidebarState::from_headers(&headers).collapsed);
        assert!(!SidebarState::from_headers(&HeaderMap::new()).collapsed);
    }

    #[test]
    fn test_filters_from_query_drop_junk() {
        let query = HomeQuery {
            search: Some("  lekki ".to_string()),
            property_type: Some("castle".to_string()),
            min_price: Some("".to_string()),
            max_price: Some("abc".to_string()),
            page: Some(3),
        };
        let filters = HomeFilters::from_query(&query);
        assert_eq!(filters.search.as_deref(), Some("lekki"));
        assert_eq!(filters.property_type, None);
        assert_eq!(filters.min_price, None);
        assert_eq!(filters.max_price, None);
        assert_eq!(filters.page, 3);
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let filters = HomeFilters::default().reduce(FilterAction::SetPage(4));
        assert_eq!(filters.page, 4);
        let filters = filters.reduce(FilterAction::SetType(Some(PropertyType::LongStay)));
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn test_reversed_price_range_is_swapped() {
        let filters =
            HomeFilters::default().reduce(FilterAction::SetPriceRange(Some(500), Some(100)));
        assert_eq!((filters.min_price, filters.max_price), (Some(100), Some(500)));
    }

    #[test]
    fn test_reset_and_url() {
        let filters = HomeFilters::default()
            .reduce(FilterAction::SetSearch("Ikoyi flat".to_string()))
            .reduce(FilterAction::SetType(Some(PropertyType::ShortLet)))
            .reduce(FilterAction::SetPage(2));
        assert_eq!(filters.to_url("/"), "/?search=Ikoyi+flat&type=Short-let&page=2");
        assert!(filters.is_active());

        let reset = filters.reduce(FilterAction::Reset);
        assert!(!reset.is_active());
        assert_eq!(reset.to_url("/"), "/");
    }
}
