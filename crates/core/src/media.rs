//! Image URL resolution.
//!
//! Carrots store image paths relative to the image host; avatars may be
//! absent. These helpers turn them into URLs a renderer can display.

use url::Url;

/// Avatar shown for users without an icon.
pub const DEFAULT_ICON: &str = "/images/default_icon.webp";

/// Widths up to this many pixels render the mobile layout.
pub const MOBILE_MAX_WIDTH: u32 = 600;

/// Display class used to pick a thumbnail size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewport {
    Mobile,
    #[default]
    Desktop,
}

impl Viewport {
    /// Classify a viewport by its width in pixels.
    #[must_use]
    pub const fn from_width(width: u32) -> Self {
        if width <= MOBILE_MAX_WIDTH {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    /// Requested edge length of image thumbnails.
    #[must_use]
    pub const fn max_edge(self) -> u32 {
        match self {
            Self::Mobile => 400,
            Self::Desktop => 600,
        }
    }
}

/// Resolve an image path against the image host.
///
/// Absolute `http(s)` URLs are kept, as is everything when no base is
/// configured. Returns `None` for an empty path.
#[must_use]
pub fn resolve_image_url(path: &str, base: Option<&str>) -> Option<String> {
    if path.is_empty() {
        return None;
    }

    let lower = path.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(path.to_owned());
    }

    let base = base.map(|b| b.trim_end_matches('/')).unwrap_or_default();
    if base.is_empty() {
        return Some(path.to_owned());
    }

    if path.starts_with('/') {
        Some(format!("{base}{path}"))
    } else {
        Some(format!("{base}/{path}"))
    }
}

/// Resolve an image path and request a thumbnail sized for `viewport`.
///
/// Sets (or replaces) the `width` and `height` query parameters. Returns
/// `None` when the path is empty or does not resolve to an absolute URL.
#[must_use]
pub fn thumbnail_url(path: &str, base: Option<&str>, viewport: Viewport) -> Option<Url> {
    let resolved = resolve_image_url(path, base)?;
    let mut url = Url::parse(&resolved).ok()?;

    let edge = viewport.max_edge().to_string();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "width" && k != "height")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("width", &edge)
        .append_pair("height", &edge);

    Some(url)
}

/// Avatar URL for an optional icon path.
#[must_use]
pub fn icon_or_default(icon_path: Option<&str>) -> &str {
    icon_path.filter(|p| !p.is_empty()).unwrap_or(DEFAULT_ICON)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BASE: Option<&str> = Some("https://img.example/");

    #[test]
    fn test_resolve_relative_and_rooted_paths() {
        assert_eq!(
            resolve_image_url("a.webp", BASE).as_deref(),
            Some("https://img.example/a.webp")
        );
        assert_eq!(
            resolve_image_url("/u/a.webp", BASE).as_deref(),
            Some("https://img.example/u/a.webp")
        );
    }

    #[test]
    fn test_resolve_keeps_absolute_and_handles_missing_base() {
        assert_eq!(
            resolve_image_url("HTTPS://cdn.example/x.png", BASE).as_deref(),
            Some("HTTPS://cdn.example/x.png")
        );
        assert_eq!(resolve_image_url("x.png", None).as_deref(), Some("x.png"));
        assert_eq!(resolve_image_url("", BASE), None);
    }

    #[test]
    fn test_thumbnail_sizes() {
        let mobile = thumbnail_url("a.webp", BASE, Viewport::from_width(390)).unwrap();
        assert_eq!(
            mobile.as_str(),
            "https://img.example/a.webp?width=400&height=400"
        );

        let desktop = thumbnail_url("a.webp?v=2&width=10", BASE, Viewport::Desktop).unwrap();
        assert_eq!(
            desktop.as_str(),
            "https://img.example/a.webp?v=2&width=600&height=600"
        );
    }

    #[test]
    fn test_thumbnail_requires_absolute_url() {
        assert!(thumbnail_url("a.webp", None, Viewport::Desktop).is_none());
    }

    #[test]
    fn test_icon_default() {
        assert_eq!(icon_or_default(None), DEFAULT_ICON);
        assert_eq!(icon_or_default(Some("")), DEFAULT_ICON);
        assert_eq!(icon_or_default(Some("/i/me.webp")), "/i/me.webp");
    }
}
