//! 选区 -> 截图 -> PNG，遇到第一个错误即停止

use std::fmt;
use std::io::Write;

use log::{info, warn};
use thiserror::Error;

use crate::capture::{capture_region, CaptureError};
use crate::config::Config;
use crate::geometry::Rect;
use crate::overlay::{select_region, SelectError};
use crate::platform::{CaptureBackend, OverlayBackend};
use crate::writer::{write_png, WriteError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error selecting region: {0}")]
    Select(#[from] SelectError),

    #[error("Error capturing region: {0}")]
    Capture(#[from] CaptureError),

    #[error("Error saving screenshot: {0}")]
    Write(#[from] WriteError),

    #[error("unsupported platform: {0}")]
    Unsupported(&'static str),
}

impl AppError {
    /// 进程退出码：每一类失败对应一个固定值
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Unsupported(_) => 1,
            AppError::Select(SelectError::Setup(_) | SelectError::EventLoop(_)) => 2,
            AppError::Select(SelectError::InvalidRegion { .. } | SelectError::Cancelled) => 3,
            AppError::Capture(_) => 4,
            AppError::Write(_) => 5,
        }
    }
}

/// 运行一次完整流程，向 `out` 打印提示、选区坐标与保存结果。
pub fn run<B, W>(backend: &mut B, config: &Config, out: &mut W) -> Result<Rect, AppError>
where
    B: OverlayBackend + CaptureBackend,
    W: Write,
{
    say(out, format_args!("Select a region to capture..."));

    let region = select_region(backend)?;
    say(out, format_args!("Selected region: {region}"));

    let pixels = capture_region(backend, Some(region))?;
    write_png(&config.output, &pixels)?;
    say(
        out,
        format_args!("Screenshot saved as {}", config.output.display()),
    );
    info!("done: {region} -> {}", config.output.display());
    Ok(region)
}

/// 输出一行提示并立即刷新；控制台写失败只告警，不影响截图结果
fn say<W: Write>(out: &mut W, line: fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        warn!("console output failed: {e}");
    }
}
