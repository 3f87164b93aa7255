//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// URL of a fingerprinted static asset.
///
/// `main.css` and `app.js` resolve to their hashed copies under
/// `/static/derived/`; anything else, or an asset the build could not hash,
/// is linked from `/static/` as-is.
///
/// Usage in templates: `{{ "main.css"|asset }}`
#[askama::filter_fn]
pub fn asset(name: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(asset_url(&name.to_string()))
}

fn asset_url(name: &str) -> String {
    let hashed = match name {
        "main.css" => Some(("main", env!("CSS_HASH"), "css", "css/main.css")),
        "app.js" => Some(("app", env!("JS_HASH"), "js", "js/app.js")),
        _ => None,
    };
    match hashed {
        Some((stem, hash, ext, _)) if !hash.is_empty() => {
            format!("/static/derived/{stem}.{hash}.{ext}")
        }
        Some((_, _, _, plain)) => format!("/static/{plain}"),
        None => format!("/static/{name}"),
    }
}

/// Renders a rating as five filled or empty stars.
///
/// Usage in templates: `{{ product.rating_stars()|stars }}`
#[askama::filter_fn]
pub fn stars(rating: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let rating = rating.to_string().parse::<u8>().unwrap_or(0);
    Ok(nikola_core::review::stars(rating))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_url_uses_build_hash() {
        let css = asset_url("main.css");
        assert!(css.starts_with("/static/"));
        assert!(css.ends_with(".css"));
        assert!(css.contains(env!("CSS_HASH")));
        assert!(asset_url("app.js").ends_with(".js"));
    }

    #[test]
    fn test_asset_url_passes_other_files_through() {
        assert_eq!(asset_url("img/logo.png"), "/static/img/logo.png");
    }
}
