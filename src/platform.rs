//! 平台能力接口
//!
//! 截图侧：屏幕表面、离屏位图、像素拷贝、像素回读。
//! 覆盖层侧：全屏覆盖窗口、阻塞式输入泵、反色选框绘制。所有句柄类型在 `Drop` 中释放系统资源。

use std::fmt;

use thiserror::Error;

use crate::geometry::{Point, Rect};

#[cfg(test)]
pub mod fake;
#[cfg(target_os = "windows")]
pub mod win32;

/// 平台调用失败，`call` 为失败的调用名
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{call} failed: {detail}")]
pub struct PlatformError {
    pub call: &'static str,
    pub detail: String,
}

impl PlatformError {
    pub fn new(call: &'static str, detail: impl fmt::Display) -> Self {
        Self {
            call,
            detail: detail.to_string(),
        }
    }

    /// 取当前线程最近一次系统错误
    pub fn last_os(call: &'static str) -> Self {
        Self::new(call, std::io::Error::last_os_error())
    }
}

/// 覆盖层输入，已由原始窗口消息翻译而来
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    PrimaryDown(Point),
    PointerMoved { pos: Point, primary_held: bool },
    PrimaryUp(Point),
    /// Esc、右键或关闭请求
    Dismissed,
}

pub trait CaptureBackend {
    /// 指向整个屏幕的绘图表面
    type Screen;
    /// 与 `Screen` 兼容的离屏位图
    type Bitmap;

    /// 主显示器尺寸（像素）
    fn screen_size(&self) -> Result<(i32, i32), PlatformError>;
    fn acquire_screen(&self) -> Result<Self::Screen, PlatformError>;
    fn create_bitmap(
        &self,
        screen: &Self::Screen,
        width: i32,
        height: i32,
    ) -> Result<Self::Bitmap, PlatformError>;
    /// 从 `origin` 开始直接拷贝屏幕像素填满位图（不缩放、不混合）
    fn blit(
        &self,
        screen: &Self::Screen,
        bitmap: &Self::Bitmap,
        origin: Point,
    ) -> Result<(), PlatformError>;
    /// 位图原始像素：自上而下、32bpp BGRA
    fn read_pixels(
        &self,
        screen: &Self::Screen,
        bitmap: &Self::Bitmap,
    ) -> Result<Vec<u8>, PlatformError>;
}

pub trait OverlayBackend {
    type Window: OverlaySurface;

    /// 创建并显示置顶、半透明的全屏覆盖层
    fn create_overlay(&mut self) -> Result<Self::Window, PlatformError>;
}

pub trait OverlaySurface {
    /// 阻塞直到下一个输入事件；事件源关闭（例如消息循环收到退出）后返回 `Ok(None)`
    fn next_event(&mut self) -> Result<Option<InputEvent>, PlatformError>;

    /// 先反色 `erase`（若有）再反色 `draw` 的边框，同一矩形画两次即还原底图。
    /// 返回错误时画面保持不变（两个框都没有画）
    fn redraw_outline(&mut self, erase: Option<Rect>, draw: Rect) -> Result<(), PlatformError>;
}
