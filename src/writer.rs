use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};
use log::info;
use thiserror::Error;

use crate::capture::PixelBuffer;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// 编码为 8-bit RGBA PNG 字节
pub fn encode_png(buf: &PixelBuffer) -> Result<Vec<u8>, WriteError> {
    let mut data = Vec::new();
    let encoder = PngEncoder::new(&mut data);
    encoder.write_image(
        buf.as_raw(),
        buf.width(),
        buf.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(data)
}

/// 写出 PNG 文件（覆盖已有文件）。先完成编码再创建文件，编码失败不会留下残缺文件。
pub fn write_png(path: &Path, buf: &PixelBuffer) -> Result<(), WriteError> {
    let data = encode_png(buf)?;
    fs::write(path, &data).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "wrote {} ({}x{}, {} bytes)",
        path.display(),
        buf.width(),
        buf.height(),
        data.len()
    );
    Ok(())
}
