//! Server-side HTML rendering.
//!
//! Pages are assembled from small string-building helpers, in the same way the
//! email templates of a typical backend are: one layout, a handful of reusable
//! fragments, all user-provided text escaped on the way in.

pub mod components;
pub mod forms;
pub mod icons;
pub mod pagination;
pub mod ui_state;

use crate::utils::escape_html;
use axum::response::Html;
use icons::Icon;
use serde::Deserialize;
use ui_state::SidebarState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

impl FlashLevel {
    fn class(&self) -> &'static str {
        match self {
            FlashLevel::Success => "alert alert-success",
            FlashLevel::Error => "alert alert-error",
            FlashLevel::Info => "alert alert-info",
        }
    }
}

/// A one-off notification shown at the top of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }
}

/// `?notice=...&level=...` carried across a post-mutation redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlashQuery {
    pub notice: Option<String>,
    pub level: Option<String>,
}

impl FlashQuery {
    pub fn flash(&self) -> Option<Flash> {
        let message = self.notice.as_deref().filter(|m| !m.is_empty())?;
        Some(match self.level.as_deref() {
            Some("error") => Flash::error(message),
            Some("info") => Flash::info(message),
            _ => Flash::success(message),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Public { signed_in: bool },
    Dashboard { name: String, sidebar: SidebarState },
    Admin { name: String, sidebar: SidebarState },
}

const DASHBOARD_NAV: &[(&str, &str, &str)] = &[
    ("Overview", "/dashboard", "dashboard"),
    ("Properties", "/dashboard/properties", "properties"),
    ("Bookings", "/dashboard/bookings", "bookings"),
    ("Transactions", "/dashboard/transactions", "transactions"),
    ("Credits", "/dashboard/credits", "credits"),
    ("Notifications", "/dashboard/notifications", "notifications"),
    ("Profile", "/dashboard/profile", "profile"),
];

const ADMIN_NAV: &[(&str, &str, &str)] = &[
    ("Overview", "/admin", "dashboard"),
    ("Properties", "/admin/properties", "properties"),
    ("Bookings", "/admin/bookings", "bookings"),
    ("Transactions", "/admin/transactions", "transactions"),
];

pub struct Page {
    title: String,
    layout: Layout,
    current_path: String,
    body: String,
    flashes: Vec<Flash>,
    refresh_seconds: Option<u64>,
    replace_url: Option<String>,
}

impl Page {
    pub fn new(title: impl Into<String>, layout: Layout, current_path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            layout,
            current_path: current_path.into(),
            body: String::new(),
            flashes: Vec::new(),
            refresh_seconds: None,
            replace_url: None,
        }
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn flash(mut self, flash: Option<Flash>) -> Self {
        self.flashes.extend(flash);
        self
    }

    /// Reloads the page after the given number of seconds.
    pub fn refresh_every(mut self, seconds: u64) -> Self {
        self.refresh_seconds = Some(seconds);
        self
    }

    /// Address the browser should show instead of the requested one, for
    /// one-shot query signals. Applied by `app.js` with `history.replaceState`.
    pub fn replace_url(mut self, url: impl Into<String>) -> Self {
        self.replace_url = Some(url.into());
        self
    }

    pub fn render(self) -> Html<String> {
        let refresh = self
            .refresh_seconds
            .map(|s| format!(r#"<meta http-equiv="refresh" content="{}">"#, s))
            .unwrap_or_default();

        let flashes: String = self
            .flashes
            .iter()
            .map(|f| {
                format!(
                    r#"<div class="{}" role="status">{}</div>"#,
                    f.level.class(),
                    escape_html(&f.message)
                )
            })
            .collect();

        let chrome = match &self.layout {
            Layout::Public { signed_in } => format!(
                r#"{}<main class="container">{}{}</main>"#,
                public_header(*signed_in),
                flashes,
                self.body
            ),
            Layout::Dashboard { name, sidebar } => format!(
                r#"<div class="shell">{}<main class="content">{}{}</main></div>"#,
                sidebar_html(DASHBOARD_NAV, name, *sidebar, &self.current_path, "/auth/logout"),
                flashes,
                self.body
            ),
            Layout::Admin { name, sidebar } => format!(
                r#"<div class="shell admin">{}<main class="content">{}{}</main></div>"#,
                sidebar_html(ADMIN_NAV, name, *sidebar, &self.current_path, "/auth/admin/logout"),
                flashes,
                self.body
            ),
        };

        Html(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    {}
    <title>{} | EdgeHomes</title>
    <link rel="stylesheet" href="/static/app.css">
    <script src="/static/app.js" defer></script>
</head>
<body{}>
{}
</body>
</html>"#,
            refresh,
            escape_html(&self.title),
            self.replace_url
                .map(|url| format!(r#" data-replace-url="{}""#, escape_html(&url)))
                .unwrap_or_default(),
            chrome
        ))
    }
}

fn public_header(signed_in: bool) -> String {
    let account = if signed_in {
        r#"<a href="/dashboard">Dashboard</a>"#
    } else {
        r#"<a href="/auth/sign-in">Sign in</a> <a class="button" href="/auth/register">List your property</a>"#
    };
    format!(
        r#"<header class="topbar"><a class="brand" href="/">EdgeHomes</a><nav>{}</nav></header>"#,
        account
    )
}

fn sidebar_html(
    nav: &[(&str, &str, &str)],
    name: &str,
    sidebar: SidebarState,
    current_path: &str,
    logout_path: &str,
) -> String {
    let items: String = nav
        .iter()
        .map(|(label, href, icon)| {
            let active = current_path == *href
                || (href.len() > 1
                    && current_path.starts_with(href)
                    && !matches!(*href, "/admin" | "/dashboard"));
            format!(
                r#"<li><a class="{}" href="{}">{}<span class="label">{}</span></a></li>"#,
                if active { "nav-link active" } else { "nav-link" },
                href,
                Icon::from_key(icon).render(),
                label
            )
        })
        .collect();

    format!(
        r#"<aside class="{}">
    <a class="brand" href="/">EdgeHomes</a>
    <form method="post" action="/ui/sidebar"><input type="hidden" name="action" value="toggle"><input type="hidden" name="back" value="{}"><button class="collapse-toggle" type="submit" aria-label="Toggle sidebar">&#9776;</button></form>
    <p class="whoami">{}</p>
    <ul class="nav">{}</ul>
    <form method="post" action="{}"><button class="link" type="submit">Log out</button></form>
</aside>"#,
        if sidebar.collapsed { "sidebar collapsed" } else { "sidebar" },
        escape_html(current_path),
        escape_html(name),
        items,
        logout_path
    )
}

/// Inline list of validation or submission errors.
pub fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", escape_html(e)))
        .collect();
    format!(r#"<ul class="form-errors" role="alert">{}</ul>"#, items)
}

/// Dashboard statistic tile.
pub fn stat_card(label: &str, value: &str, icon: Icon) -> String {
    format!(
        r#"<div class="stat-card">{}<span class="stat-label">{}</span><strong class="stat-value">{}</strong></div>"#,
        icon.render(),
        escape_html(label),
        escape_html(value)
    )
}

/// Centered message for empty lists and unavailable data.
pub fn empty_state(message: &str) -> String {
    format!(r#"<p class="empty-state">{}</p>"#, escape_html(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_query() {
        let query = FlashQuery {
            notice: Some("Booking confirmed".to_string()),
            level: None,
        };
        assert_eq!(query.flash(), Some(Flash::success("Booking confirmed")));

        let query = FlashQuery {
            notice: Some("Nope".to_string()),
            level: Some("error".to_string()),
        };
        assert_eq!(query.flash().map(|f| f.level), Some(FlashLevel::Error));
        assert_eq!(FlashQuery::default().flash(), None);
    }

    #[test]
    fn test_page_escapes_title_and_flash() {
        let Html(html) = Page::new("<Admin>", Layout::Public { signed_in: false }, "/")
            .flash(Some(Flash::error("<script>")))
            .render();
        assert!(html.contains("<title>&lt;Admin&gt; | EdgeHomes</title>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_refresh_meta_and_active_nav() {
        let Html(html) = Page::new(
            "Bookings",
            Layout::Admin {
                name: "Root".to_string(),
                sidebar: SidebarState { collapsed: true },
            },
            "/admin/bookings",
        )
        .refresh_every(5)
        .render();

        assert!(html.contains(r#"<meta http-equiv="refresh" content="5">"#));
        assert!(html.contains(r#"<a class="nav-link active" href="/admin/bookings">"#));
        assert!(html.contains(r#"<a class="nav-link" href="/admin">"#));
        assert!(html.contains(r#"<aside class="sidebar collapsed">"#));
        assert!(html.contains(r#"action="/auth/admin/logout""#));
    }

    #[test]
    fn test_error_list() {
        assert!(error_list(&[]).is_empty());
        assert_eq!(
            error_list(&["email: Email is invalid".to_string()]),
            r#"<ul class="form-errors" role="alert"><li>email: Email is invalid</li></ul>"#
        );
    }
}
