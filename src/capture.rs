use log::{debug, info};
use thiserror::Error;

use crate::geometry::Rect;
use crate::platform::{CaptureBackend, PlatformError};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to query screen size: {0}")]
    ScreenMetrics(#[source] PlatformError),

    #[error("failed to get screen device context: {0}")]
    ScreenSurface(#[source] PlatformError),

    #[error("failed to create compatible bitmap: {0}")]
    Bitmap(#[source] PlatformError),

    #[error("failed to copy screen content: {0}")]
    Blit(#[source] PlatformError),

    #[error("failed to get bitmap data: {0}")]
    Readback(#[source] PlatformError),

    #[error("invalid region dimensions: width={width}, height={height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("bitmap data is empty")]
    EmptyReadback,

    #[error("bitmap data too short: expected {expected} bytes, got {actual}")]
    ShortReadback { expected: usize, actual: usize },
}

/// 自上而下、RGBA 顺序、alpha 恒为 255 的像素缓冲
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// `data` 长度必须恰好为 width * height * 4
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = &self.data[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }
}

fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
}

/// 区域截图；`region` 为 None 时截取整个主显示器（尺寸实时查询）。
///
/// 所有句柄在任何返回路径上都会释放；失败不重试，也不返回部分图像。
pub fn capture_region<B: CaptureBackend>(
    backend: &B,
    region: Option<Rect>,
) -> Result<PixelBuffer, CaptureError> {
    let region = match region {
        Some(rect) => rect,
        None => {
            let (w, h) = backend.screen_size().map_err(CaptureError::ScreenMetrics)?;
            Rect::new(0, 0, w, h)
        }
    };
    let region = region
        .validate()
        .map_err(|e| CaptureError::InvalidDimensions {
            width: e.width,
            height: e.height,
        })?;
    let (width, height) = (region.width(), region.height());
    let expected = byte_len(width as u32, height as u32)
        .ok_or(CaptureError::InvalidDimensions { width, height })?;

    let screen = backend
        .acquire_screen()
        .map_err(CaptureError::ScreenSurface)?;
    let bitmap = backend
        .create_bitmap(&screen, width, height)
        .map_err(CaptureError::Bitmap)?;
    backend
        .blit(&screen, &bitmap, region.origin())
        .map_err(CaptureError::Blit)?;
    let raw = backend
        .read_pixels(&screen, &bitmap)
        .map_err(CaptureError::Readback)?;
    drop(bitmap);
    drop(screen);
    debug!("read back {} bytes for {region}", raw.len());

    if raw.is_empty() {
        return Err(CaptureError::EmptyReadback);
    }
    if raw.len() < expected {
        return Err(CaptureError::ShortReadback {
            expected,
            actual: raw.len(),
        });
    }
    let rgba = bgra_to_rgba_opaque(&raw[..expected]);
    info!("captured {width}x{height} at ({}, {})", region.left, region.top);
    PixelBuffer::from_rgba(width as u32, height as u32, rgba)
        .ok_or(CaptureError::ShortReadback {
            expected,
            actual: raw.len(),
        })
}

/// BGRA -> RGBA，alpha 强制为 255（GDI 位图的 alpha 字节无意义）
fn bgra_to_rgba_opaque(bgra: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bgra.len());
    for chunk in bgra.chunks_exact(4) {
        out.push(chunk[2]); // R
        out.push(chunk[1]); // G
        out.push(chunk[0]); // B
        out.push(255);
    }
    out
}
