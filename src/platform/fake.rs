//! 测试用内存平台：合成屏幕、脚本化覆盖层输入、截图各步骤的故障注入与存活句柄计数

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::geometry::{Point, Rect};
use crate::overlay::drawing::xor_outline;
use crate::platform::{
    CaptureBackend, InputEvent, OverlayBackend, OverlaySurface, PlatformError,
};

pub const OUTLINE_COLOR: u32 = 0x00FF_FFFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailAt {
    ScreenSize,
    AcquireScreen,
    CreateBitmap,
    Blit,
    ReadPixels,
    EmptyReadback,
    ShortReadback,
}

/// 合成屏幕在某位置的 BGRA 像素；alpha 为 0，截图路径必须把它强制为不透明
pub fn screen_pixel(x: i32, y: i32) -> [u8; 4] {
    [x as u8, y as u8, (x + y) as u8, 0]
}

#[derive(Debug, Default)]
pub struct OverlayLog {
    pub created: usize,
    pub open: bool,
    pub redraws: usize,
    /// 当前可见的选框（反色语义：画两次即消失）
    pub outlined: Vec<Rect>,
    /// 覆盖层像素，初始为 `background` 的拷贝
    pub frame: Vec<u32>,
    pub background: Vec<u32>,
    pub remaining_events: usize,
}

pub struct FakeHandle {
    live: Rc<Cell<i32>>,
}

impl FakeHandle {
    fn new(live: &Rc<Cell<i32>>) -> Self {
        live.set(live.get() + 1);
        Self { live: live.clone() }
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

pub struct FakeBitmap {
    _handle: FakeHandle,
    width: i32,
    height: i32,
    pixels: RefCell<Vec<u8>>,
}

pub struct FakePlatform {
    width: i32,
    height: i32,
    fail_at: Option<FailAt>,
    overlay_refused: bool,
    pen_broken: bool,
    failing_redraw: Option<usize>,
    events: VecDeque<InputEvent>,
    live: Rc<Cell<i32>>,
    calls: Cell<usize>,
    overlay: Rc<RefCell<OverlayLog>>,
}

impl FakePlatform {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            fail_at: None,
            overlay_refused: false,
            pen_broken: false,
            failing_redraw: None,
            events: VecDeque::new(),
            live: Rc::new(Cell::new(0)),
            calls: Cell::new(0),
            overlay: Rc::new(RefCell::new(OverlayLog::default())),
        }
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = InputEvent>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn failing_at(mut self, step: FailAt) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub fn refusing_overlay(mut self) -> Self {
        self.overlay_refused = true;
        self
    }

    pub fn with_broken_pen(mut self) -> Self {
        self.pen_broken = true;
        self
    }

    /// 第 `nth` 次（从 1 起）重绘失败，且不改动画面
    pub fn failing_redraw(mut self, nth: usize) -> Self {
        self.failing_redraw = Some(nth);
        self
    }

    pub fn live_handles(&self) -> i32 {
        self.live.get()
    }

    pub fn platform_calls(&self) -> usize {
        self.calls.get()
    }

    pub fn overlay_log(&self) -> Rc<RefCell<OverlayLog>> {
        self.overlay.clone()
    }

    fn call(&self, step: FailAt, name: &'static str) -> Result<(), PlatformError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail_at == Some(step) {
            return Err(PlatformError::new(name, "injected failure"));
        }
        Ok(())
    }
}

impl CaptureBackend for FakePlatform {
    type Screen = FakeHandle;
    type Bitmap = FakeBitmap;

    fn screen_size(&self) -> Result<(i32, i32), PlatformError> {
        self.call(FailAt::ScreenSize, "screen_size")?;
        Ok((self.width, self.height))
    }

    fn acquire_screen(&self) -> Result<FakeHandle, PlatformError> {
        self.call(FailAt::AcquireScreen, "acquire_screen")?;
        Ok(FakeHandle::new(&self.live))
    }

    fn create_bitmap(
        &self,
        _screen: &FakeHandle,
        width: i32,
        height: i32,
    ) -> Result<FakeBitmap, PlatformError> {
        self.call(FailAt::CreateBitmap, "create_bitmap")?;
        Ok(FakeBitmap {
            _handle: FakeHandle::new(&self.live),
            width,
            height,
            pixels: RefCell::new(vec![0; (width * height * 4) as usize]),
        })
    }

    fn blit(
        &self,
        _screen: &FakeHandle,
        bitmap: &FakeBitmap,
        origin: Point,
    ) -> Result<(), PlatformError> {
        self.call(FailAt::Blit, "blit")?;
        let mut pixels = bitmap.pixels.borrow_mut();
        for row in 0..bitmap.height {
            for col in 0..bitmap.width {
                let (sx, sy) = (origin.x + col, origin.y + row);
                let px = if sx >= 0 && sy >= 0 && sx < self.width && sy < self.height {
                    screen_pixel(sx, sy)
                } else {
                    [0; 4]
                };
                let i = ((row * bitmap.width + col) * 4) as usize;
                pixels[i..i + 4].copy_from_slice(&px);
            }
        }
        Ok(())
    }

    fn read_pixels(
        &self,
        _screen: &FakeHandle,
        bitmap: &FakeBitmap,
    ) -> Result<Vec<u8>, PlatformError> {
        self.call(FailAt::ReadPixels, "read_pixels")?;
        let pixels = bitmap.pixels.borrow();
        match self.fail_at {
            Some(FailAt::EmptyReadback) => Ok(Vec::new()),
            Some(FailAt::ShortReadback) => Ok(pixels[..pixels.len() / 2].to_vec()),
            _ => Ok(pixels.clone()),
        }
    }
}

pub struct FakeOverlay {
    events: VecDeque<InputEvent>,
    log: Rc<RefCell<OverlayLog>>,
    pen_broken: bool,
    failing_redraw: Option<usize>,
    width: u32,
    height: u32,
}

impl OverlayBackend for FakePlatform {
    type Window = FakeOverlay;

    fn create_overlay(&mut self) -> Result<FakeOverlay, PlatformError> {
        if self.overlay_refused {
            return Err(PlatformError::new("create_overlay", "window class refused"));
        }
        let (width, height) = (self.width.max(1) as u32, self.height.max(1) as u32);
        {
            let mut log = self.overlay.borrow_mut();
            log.created += 1;
            log.open = true;
            log.background = (0..width * height).map(|i| i.wrapping_mul(40_503)).collect();
            log.frame = log.background.clone();
        }
        Ok(FakeOverlay {
            events: std::mem::take(&mut self.events),
            log: self.overlay.clone(),
            pen_broken: self.pen_broken,
            failing_redraw: self.failing_redraw,
            width,
            height,
        })
    }
}

impl FakeOverlay {
    fn invert(&self, log: &mut OverlayLog, rect: Rect) {
        xor_outline(&mut log.frame, self.width, self.height, rect, 1, OUTLINE_COLOR);
        if let Some(i) = log.outlined.iter().position(|r| *r == rect) {
            log.outlined.remove(i);
        } else {
            log.outlined.push(rect);
        }
    }
}

impl OverlaySurface for FakeOverlay {
    fn next_event(&mut self) -> Result<Option<InputEvent>, PlatformError> {
        Ok(self.events.pop_front())
    }

    fn redraw_outline(&mut self, erase: Option<Rect>, draw: Rect) -> Result<(), PlatformError> {
        let log = self.log.clone();
        let mut log = log.borrow_mut();
        log.redraws += 1;
        if self.pen_broken {
            return Err(PlatformError::new("redraw_outline", "no drawing surface"));
        }
        if self.failing_redraw == Some(log.redraws) {
            return Err(PlatformError::new("redraw_outline", "device context unavailable"));
        }
        if let Some(old) = erase {
            self.invert(&mut log, old);
        }
        self.invert(&mut log, draw);
        Ok(())
    }
}

impl Drop for FakeOverlay {
    fn drop(&mut self) {
        let mut log = self.log.borrow_mut();
        log.open = false;
        log.remaining_events = self.events.len();
    }
}
