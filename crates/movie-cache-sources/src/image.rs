use reqwest::Url;
use tracing::debug;

/// `base + "/t/p/" + size + path`. No I/O.
pub fn compose_image_url(base: &str, path: Option<&str>, size: &str) -> Option<Url> {
    let path = path?;
    let raw = format!("{}/t/p/{}{}", base.trim_end_matches('/'), size, path);
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!("Could not build image URL from {}: {}", raw, e);
            None
        }
    }
}
