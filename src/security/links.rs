//! Outbound link classification against the public site URL.

use url::Url;

/// `rel` value for links that leave the site.
pub const EXTERNAL_REL: &str = "noopener noreferrer";

/// True for absolute http(s) links pointing at a host other than the site's.
/// Relative paths, fragments, `mailto:` and `tel:` links are internal.
pub fn is_external_url(href: &str, site_url: &str) -> bool {
    let Ok(target) = Url::parse(href.trim()) else {
        return false;
    };
    if !matches!(target.scheme(), "http" | "https") {
        return false;
    }

    let site_host = Url::parse(site_url)
        .ok()
        .and_then(|u| u.host_str().map(normalize_host));

    match (target.host_str().map(normalize_host), site_host) {
        (Some(target), Some(site)) => target != site,
        (Some(_), None) => true,
        _ => false,
    }
}

/// The `rel` attribute a link should carry, if any.
pub fn secure_link_rel(href: &str, site_url: &str) -> Option<&'static str> {
    is_external_url(href, site_url).then_some(EXTERNAL_REL)
}

fn normalize_host(host: &str) -> String {
    host.trim_start_matches("www.").to_ascii_lowercase()
}
