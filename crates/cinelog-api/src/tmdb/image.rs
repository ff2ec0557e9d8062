//! Image URL composition.

/// Default TMDB image CDN base.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Image size segment understood by the TMDB image CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// 185px wide (profile pictures).
    W185,
    /// 500px wide (posters, cards).
    W500,
    /// Original upload size (backdrops).
    Original,
}

impl ImageSize {
    /// Returns the URL segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::W185 => "w185",
            Self::W500 => "w500",
            Self::Original => "original",
        }
    }
}

/// Builds a full image URL from a relative path fragment.
///
/// Returns `None` when the path is missing or empty.
#[must_use]
pub fn image_url(base: &str, size: ImageSize, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    Some(format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        size.as_str(),
        path.trim_start_matches('/')
    ))
}
