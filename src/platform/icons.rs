use std::io::Cursor;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use image::{DynamicImage, ImageFormat};

use super::AppCatalog;

/// Re-encodes any decoded bitmap as an RGBA PNG and base64s it.
pub fn encode_png_base64(icon: &DynamicImage) -> Result<String> {
    let rgba = DynamicImage::ImageRgba8(icon.to_rgba8());
    let mut png = Cursor::new(Vec::new());
    rgba.write_to(&mut png, ImageFormat::Png)
        .context("failed to encode icon as PNG")?;
    Ok(B64.encode(png.into_inner()))
}

/// Icon for `package_name`, or an empty string when it cannot be produced.
pub fn icon_base64<C>(catalog: &C, package_name: &str) -> String
where
    C: AppCatalog + ?Sized,
{
    let encoded = catalog
        .app_icon(package_name)
        .and_then(|icon| encode_png_base64(&icon));

    match encoded {
        Ok(data) => data,
        Err(err) => {
            log::debug!("No icon for {}: {err:#}", package_name);
            String::new()
        }
    }
}
