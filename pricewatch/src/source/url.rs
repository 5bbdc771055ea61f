//! Listing URL normalization and classification.

use std::sync::OnceLock;

use regex::Regex;

use super::types::FetchStrategy;

const SCHEMES: [&str; 2] = ["https://", "http://"];

/// Canonical form of a listing URL.
///
/// Drops anything from a second, accidentally pasted scheme prefix onwards,
/// then the fragment and the query string.
pub fn normalize_url(raw: &str) -> String {
    let mut url = raw.trim();

    let body_start = SCHEMES
        .iter()
        .find(|s| url.starts_with(*s))
        .map(|s| s.len())
        .unwrap_or(0);
    if let Some(pos) = SCHEMES
        .iter()
        .filter_map(|s| url[body_start..].find(s))
        .min()
    {
        url = &url[..body_start + pos];
    }

    if let Some(pos) = url.find('#') {
        url = &url[..pos];
    }
    if let Some(pos) = url.find('?') {
        url = &url[..pos];
    }

    url.trim().to_string()
}

/// Pick the fetch strategy by host suffix.
///
/// Hosts equal to, or subdomains of, one of `authenticated_domains` use the
/// official API. Unparseable URLs go to the scraper.
pub fn classify(url: &str, authenticated_domains: &[String]) -> FetchStrategy {
    let Ok(parsed) = url::Url::parse(url) else {
        return FetchStrategy::Scraper;
    };
    let Some(host) = parsed.host_str() else {
        return FetchStrategy::Scraper;
    };
    let host = host.to_ascii_lowercase();

    let matches = authenticated_domains.iter().any(|domain| {
        let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
        !domain.is_empty()
            && (host == domain
                || host
                    .strip_suffix(&domain)
                    .is_some_and(|prefix| prefix.ends_with('.')))
    });

    if matches {
        FetchStrategy::Authenticated
    } else {
        FetchStrategy::Scraper
    }
}

fn catalog_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/p/(ML[A-Z]\d+)").unwrap())
}

fn listing_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(ML[A-Z])-?(\d+)").unwrap())
}

/// Canonical upstream item id, e.g. `MLB123456`.
///
/// Tries the catalog path form (`/p/MLB123`) first, then a site prefix followed
/// by digits with an optional hyphen (`MLB-123`, `MLB123`).
pub fn extract_item_id(url: &str) -> Option<String> {
    if let Some(caps) = catalog_pattern().captures(url) {
        return Some(caps[1].to_string());
    }
    listing_pattern()
        .captures(url)
        .map(|caps| format!("{}{}", &caps[1], &caps[2]))
}

/// Human readable name from the last path segment, used until the first fetch.
pub fn name_from_slug(url: &str) -> String {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    let slug = path
        .trim_end_matches('/')
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or("");
    let slug = slug.strip_suffix("_JM").unwrap_or(slug);
    let cleaned = listing_pattern().replace(slug, "");
    let words: Vec<&str> = cleaned
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return "Pending item".to_string();
    }

    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("https://x.com/p?utm=1"), "https://x.com/p");
        assert_eq!(normalize_url("https://x.com/p#frag"), "https://x.com/p");
        assert_eq!(normalize_url("https://x.com/phttps://x.com/p"), "https://x.com/p");
        assert_eq!(normalize_url("  https://x.com/p?a=1#b  "), "https://x.com/p");
        assert_eq!(normalize_url("https://x.com/p"), "https://x.com/p");
        assert_eq!(normalize_url("http://x.com/phttp://x.com/p"), "http://x.com/p");
    }

    #[test]
    fn test_classify_by_host_suffix() {
        let domains = vec![
            "mercadolivre.com.br".to_string(),
            "mercadolibre.com".to_string(),
        ];
        assert_eq!(
            classify("https://produto.mercadolivre.com.br/MLB-123-x", &domains),
            FetchStrategy::Authenticated
        );
        assert_eq!(
            classify("https://mercadolibre.com/p/MLA1", &domains),
            FetchStrategy::Authenticated
        );
        assert_eq!(
            classify("https://notmercadolibre.com/p/MLA1", &domains),
            FetchStrategy::Scraper
        );
        assert_eq!(classify("https://shop.example.com/p", &domains), FetchStrategy::Scraper);
        assert_eq!(classify("not a url", &domains), FetchStrategy::Scraper);
    }

    #[test]
    fn test_extract_item_id() {
        assert_eq!(
            extract_item_id("https://www.mercadolivre.com.br/tenis/p/MLB19615223").as_deref(),
            Some("MLB19615223")
        );
        assert_eq!(
            extract_item_id("https://produto.mercadolivre.com.br/MLB-3412345678-tenis-_JM").as_deref(),
            Some("MLB3412345678")
        );
        assert_eq!(
            extract_item_id("https://articulo.mercadolibre.com.ar/MLA123456").as_deref(),
            Some("MLA123456")
        );
        assert_eq!(extract_item_id("https://shop.example.com/item/42"), None);
    }

    #[test]
    fn test_name_from_slug() {
        assert_eq!(
            name_from_slug("https://produto.mercadolivre.com.br/MLB-3412345678-tenis-corrida-_JM"),
            "Tenis Corrida"
        );
        assert_eq!(name_from_slug("https://shop.example.com/blue-widget"), "Blue Widget");
        assert_eq!(name_from_slug("https://shop.example.com/"), "Pending item");
    }
}
