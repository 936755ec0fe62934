//! Loading of external files and creation of the small GPU resources the
//! scenes build themselves (samplers, procedural textures).
//!
//! Paths are relative to the `assets` directory: `./assets` next to the
//! working directory on native targets, `<origin>/assets` on the web.

use std::collections::HashMap;

use anyhow::Context as _;
use image::RgbaImage;

pub mod procedural;
pub mod sampler;

/// Images a scene needs before it can start, as `(name, path)` pairs.
pub type AssetRequest = &'static [(&'static str, &'static str)];

/// Decoded images, keyed by the name they were requested under.
#[derive(Debug, Default)]
pub struct Assets {
    images: HashMap<&'static str, RgbaImage>,
}

impl Assets {
    pub fn image(&self, name: &str) -> anyhow::Result<&RgbaImage> {
        self.images
            .get(name)
            .with_context(|| format!("asset '{name}' was not loaded"))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no browser window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("cannot read the page origin: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{origin}/assets/"))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?
    };

    Ok(data)
}

pub async fn load_image(file_name: &str) -> anyhow::Result<RgbaImage> {
    let data = load_binary(file_name).await?;
    let image = image::load_from_memory(&data)
        .with_context(|| format!("cannot decode {file_name}"))?;
    Ok(image.to_rgba8())
}

/// Fetch and decode every image in `request` concurrently.
pub async fn load_assets(request: AssetRequest) -> anyhow::Result<Assets> {
    let images = futures::future::try_join_all(request.iter().map(|(name, path)| async move {
        let image = load_image(path).await?;
        log::debug!("Loaded {path} as '{name}' ({}x{})", image.width(), image.height());
        anyhow::Ok((*name, image))
    }))
    .await?;
    Ok(Assets {
        images: images.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_images_decode() {
        let request: AssetRequest = &[("grid", "images/color-grid.png"), ("fog", "images/fog.png")];
        let assets = futures::executor::block_on(load_assets(request)).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets.image("grid").unwrap().dimensions(), (256, 256));
        assert!(assets.image("metal").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let request: AssetRequest = &[("nope", "images/does-not-exist.png")];
        let err = futures::executor::block_on(load_assets(request)).unwrap_err();
        assert!(format!("{err:#}").contains("does-not-exist"));
    }
}
