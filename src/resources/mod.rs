//! Loading of remote and local assets.
//!
//! [`load_binary`] fetches raw bytes: `data:` URIs are decoded in place,
//! `http(s)` locations go through reqwest on every platform, anything else
//! is read from the `assets/` directory natively or requested relative to
//! the page origin on the web. The glTF loader and its decoder plugins live
//! in [`loader`].

use anyhow::Context as _;

pub mod loader;
pub mod texture;

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolve `uri` found inside a document loaded from `base`.
///
/// Absolute and `data:` URIs are returned unchanged. Relative ones are joined
/// to the base URL, or to the base's directory for local asset paths.
pub fn resolve_uri(base: &str, uri: &str) -> anyhow::Result<String> {
    if uri.starts_with("data:") || uri.contains("://") {
        return Ok(uri.to_string());
    }
    if is_remote(base) {
        let base_url = reqwest::Url::parse(base).with_context(|| format!("Invalid base URL {}", base))?;
        let joined = base_url
            .join(uri)
            .with_context(|| format!("Cannot resolve {} against {}", uri, base))?;
        return Ok(joined.to_string());
    }
    Ok(match base.rfind('/') {
        Some(idx) => format!("{}{}", &base[..=idx], uri),
        None => uri.to_string(),
    })
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("No browser window available")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("Cannot read page origin: {:?}", e))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

async fn fetch(url: &str) -> anyhow::Result<Vec<u8>> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Request to {} failed", url))?
        .error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

pub async fn load_binary(location: &str) -> anyhow::Result<Vec<u8>> {
    if let Some(data) = loader::decode_data_uri(location) {
        return data;
    }
    if is_remote(location) {
        return fetch(location).await;
    }
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(location)?;
        fetch(url.as_str()).await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(location);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?
    };

    Ok(data)
}
