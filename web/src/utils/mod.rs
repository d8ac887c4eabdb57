//! Collection of general utility functions.
//!
//! Small helpers for HTML escaping and for building and sanitizing the local
//! URLs the pages redirect to.

use reqwest::Url;

pub mod jwt;

// Any absolute URL works as a base; only path and query are kept.
const LOCAL_BASE: &str = "http://edgehomes.local";

/// Escapes text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Accepts a post-login destination only if it stays on this site.
pub fn sanitize_redirect(target: Option<&str>, fallback: &str) -> String {
    match target {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path.to_string()
        }
        _ => fallback.to_string(),
    }
}

/// Builds `path?key=value&...` with the values percent-encoded.
pub fn local_url(path: &str, params: &[(&str, &str)]) -> String {
    let mut url = match Url::parse(LOCAL_BASE).and_then(|base| base.join(path)) {
        Ok(url) => url,
        Err(_) => return path.to_string(),
    };

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter());
    }

    path_and_query(&url)
}

/// Returns `path_and_query` with `key` set to `value`, replacing any existing
/// occurrence and keeping every other parameter.
pub fn with_query_param(path_and_query: &str, key: &str, value: &str) -> String {
    rewrite_query(path_and_query, key, Some(value))
}

/// Returns `path_and_query` without `key`. Used for one-shot UI signals such as
/// `?add-property=true`.
pub fn strip_query_param(path_and_query: &str, key: &str) -> String {
    rewrite_query(path_and_query, key, None)
}

fn rewrite_query(target: &str, key: &str, value: Option<&str>) -> String {
    let mut url = match Url::parse(LOCAL_BASE).and_then(|base| base.join(target)) {
        Ok(url) => url,
        Err(_) => return target.to_string(),
    };

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if let Some(value) = value {
        pairs.push((key.to_string(), value.to_string()));
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    path_and_query(&url)
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Formats a minor-unit-free amount with thousands separators, e.g. `₦ 150,000`.
pub fn format_money(currency: &str, amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if whole < 0 { "-" } else { "" };
    let symbol = match currency.to_uppercase().as_str() {
        "NGN" => "₦",
        "USD" => "$",
        "GBP" => "£",
        "EUR" => "€",
        _ => currency,
    };
    format!("{}{} {}", sign, symbol, grouped)
}
