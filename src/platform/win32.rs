//! 平台接口的 Win32 / GDI 实现
//!
//! 覆盖层是位于 (0, 0)、覆盖主显示器的分层置顶弹出窗口，
//! 因此 `GetCursorPos` 的屏幕坐标可直接当作绘制选框的客户区坐标。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::c_void;
use std::mem;

use log::debug;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, CreatePen, DeleteDC,
    DeleteObject, EndPaint, GetDC, GetDIBits, GetStockObject, LineTo, MoveToEx, ReleaseDC,
    SelectObject, SetROP2, UpdateWindow, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, BLACK_BRUSH,
    DIB_RGB_COLORS, HBITMAP, HBRUSH, HDC, HGDIOBJ, HPEN, PAINTSTRUCT, PS_SOLID, R2_XORPEN,
    SRCCOPY,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture, VK_ESCAPE};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetCursorPos, GetMessageW,
    GetSystemMetrics, GetWindowLongPtrW, LoadCursorW, RegisterClassExW, SetCursor,
    SetForegroundWindow, SetLayeredWindowAttributes, SetWindowLongPtrW, ShowWindow,
    TranslateMessage, UnregisterClassW, GWLP_USERDATA, IDC_CROSS, LWA_ALPHA, MSG, SM_CXSCREEN,
    SM_CYSCREEN, SW_SHOW, WM_CLOSE, WM_KEYDOWN, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE,
    WM_PAINT, WM_RBUTTONDOWN, WM_SETCURSOR, WNDCLASSEXW, WS_EX_LAYERED, WS_EX_TOOLWINDOW,
    WS_EX_TOPMOST, WS_POPUP,
};

use crate::config::Config;
use crate::geometry::{Point, Rect};
use crate::overlay::drawing::outline_path;
use crate::platform::{
    CaptureBackend, InputEvent, OverlayBackend, OverlaySurface, PlatformError,
};

// WM_MOUSEMOVE 的 wParam 中表示左键按下的标志位
const MK_LBUTTON: usize = 0x0001;

type EventQueue = RefCell<VecDeque<InputEvent>>;

fn class_name() -> PCWSTR {
    w!("RegionShotOverlay")
}

/// `0xRRGGBB` -> GDI `COLORREF`（`0x00BBGGRR`）
fn colorref(rgb: u32) -> COLORREF {
    let r = (rgb >> 16) & 0xFF;
    let g = (rgb >> 8) & 0xFF;
    let b = rgb & 0xFF;
    COLORREF(r | (g << 8) | (b << 16))
}

pub struct GdiPlatform {
    overlay_alpha: u8,
    pen_width: i32,
    pen_color: COLORREF,
}

impl GdiPlatform {
    pub fn new(config: &Config) -> Self {
        Self {
            overlay_alpha: config.overlay_alpha,
            pen_width: config.pen_width.max(1),
            pen_color: colorref(config.pen_color),
        }
    }
}

// ---- 作用域内的 GDI 句柄 ----

/// `GetDC(NULL)` 得到的整屏 DC
pub struct ScreenDc(HDC);

impl Drop for ScreenDc {
    fn drop(&mut self) {
        unsafe {
            let _ = ReleaseDC(None, self.0);
        }
    }
}

struct WindowDc {
    hwnd: HWND,
    dc: HDC,
}

impl WindowDc {
    fn get(hwnd: HWND) -> Result<Self, PlatformError> {
        let dc = unsafe { GetDC(Some(hwnd)) };
        if dc.0.is_null() {
            return Err(PlatformError::last_os("GetDC"));
        }
        Ok(Self { hwnd, dc })
    }
}

impl Drop for WindowDc {
    fn drop(&mut self) {
        unsafe {
            let _ = ReleaseDC(Some(self.hwnd), self.dc);
        }
    }
}

struct MemoryDc(HDC);

impl Drop for MemoryDc {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteDC(self.0);
        }
    }
}

struct GdiObject<T>(T)
where
    T: Copy + Into<HGDIOBJ>;

impl<T> Drop for GdiObject<T>
where
    T: Copy + Into<HGDIOBJ>,
{
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(self.0.into());
        }
    }
}

/// 把对象选入 DC，drop 时恢复原对象
struct Selected {
    dc: HDC,
    previous: HGDIOBJ,
}

impl Selected {
    fn new(dc: HDC, object: HGDIOBJ) -> Result<Self, PlatformError> {
        let previous = unsafe { SelectObject(dc, object) };
        if previous.0.is_null() {
            return Err(PlatformError::last_os("SelectObject"));
        }
        Ok(Self { dc, previous })
    }
}

impl Drop for Selected {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.dc, self.previous);
        }
    }
}

/// 内存 DC 与屏幕兼容位图；位图只在拷贝期间选入 DC
pub struct MemoryBitmap {
    bitmap: GdiObject<HBITMAP>,
    dc: MemoryDc,
    width: i32,
    height: i32,
}

// ---- 截图 ----

impl CaptureBackend for GdiPlatform {
    type Screen = ScreenDc;
    type Bitmap = MemoryBitmap;

    fn screen_size(&self) -> Result<(i32, i32), PlatformError> {
        let (w, h) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        if w <= 0 || h <= 0 {
            return Err(PlatformError::new(
                "GetSystemMetrics",
                format!("reported {w}x{h}"),
            ));
        }
        Ok((w, h))
    }

    fn acquire_screen(&self) -> Result<ScreenDc, PlatformError> {
        let dc = unsafe { GetDC(None) };
        if dc.0.is_null() {
            return Err(PlatformError::last_os("GetDC"));
        }
        debug!("acquired screen dc");
        Ok(ScreenDc(dc))
    }

    fn create_bitmap(
        &self,
        screen: &ScreenDc,
        width: i32,
        height: i32,
    ) -> Result<MemoryBitmap, PlatformError> {
        let dc = unsafe { CreateCompatibleDC(Some(screen.0)) };
        if dc.0.is_null() {
            return Err(PlatformError::last_os("CreateCompatibleDC"));
        }
        let dc = MemoryDc(dc);
        let bitmap = unsafe { CreateCompatibleBitmap(screen.0, width, height) };
        if bitmap.0.is_null() {
            return Err(PlatformError::last_os("CreateCompatibleBitmap"));
        }
        debug!("created {width}x{height} compatible bitmap");
        Ok(MemoryBitmap {
            bitmap: GdiObject(bitmap),
            dc,
            width,
            height,
        })
    }

    fn blit(
        &self,
        screen: &ScreenDc,
        bitmap: &MemoryBitmap,
        origin: Point,
    ) -> Result<(), PlatformError> {
        let _selected = Selected::new(bitmap.dc.0, bitmap.bitmap.0.into())?;
        unsafe {
            BitBlt(
                bitmap.dc.0,
                0,
                0,
                bitmap.width,
                bitmap.height,
                Some(screen.0),
                origin.x,
                origin.y,
                SRCCOPY,
            )
        }
        .map_err(|e| PlatformError::new("BitBlt", e))
    }

    fn read_pixels(
        &self,
        _screen: &ScreenDc,
        bitmap: &MemoryBitmap,
    ) -> Result<Vec<u8>, PlatformError> {
        let mut info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: bitmap.width,
                // 负高度 = 自上而下
                biHeight: -bitmap.height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let row_bytes = bitmap.width as usize * 4;
        let mut buf = vec![0u8; row_bytes * bitmap.height as usize];
        let lines = unsafe {
            GetDIBits(
                bitmap.dc.0,
                bitmap.bitmap.0,
                0,
                bitmap.height as u32,
                Some(buf.as_mut_ptr() as *mut c_void),
                &mut info,
                DIB_RGB_COLORS,
            )
        };
        if lines <= 0 {
            return Err(PlatformError::last_os("GetDIBits"));
        }
        buf.truncate(lines as usize * row_bytes);
        Ok(buf)
    }
}

// ---- 覆盖层 ----

struct WindowClass {
    instance: HINSTANCE,
}

impl WindowClass {
    fn register(instance: HINSTANCE) -> Result<Self, PlatformError> {
        let cursor = unsafe { LoadCursorW(None, IDC_CROSS) }.unwrap_or_default();
        let wc = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(overlay_wndproc),
            hInstance: instance,
            hCursor: cursor,
            hbrBackground: HBRUSH(unsafe { GetStockObject(BLACK_BRUSH) }.0),
            lpszClassName: class_name(),
            ..Default::default()
        };
        if unsafe { RegisterClassExW(&wc) } == 0 {
            return Err(PlatformError::last_os("RegisterClassExW"));
        }
        Ok(Self { instance })
    }
}

impl Drop for WindowClass {
    fn drop(&mut self) {
        unsafe {
            let _ = UnregisterClassW(class_name(), Some(self.instance));
        }
    }
}

pub struct OverlayWindow {
    hwnd: HWND,
    // 窗口过程通过 GWLP_USERDATA 访问该队列
    queue: Box<EventQueue>,
    pen_width: i32,
    pen_color: COLORREF,
    _class: WindowClass,
}

impl Drop for OverlayWindow {
    fn drop(&mut self) {
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            let _ = DestroyWindow(self.hwnd);
        }
        debug!("overlay destroyed");
    }
}

impl OverlayBackend for GdiPlatform {
    type Window = OverlayWindow;

    fn create_overlay(&mut self) -> Result<OverlayWindow, PlatformError> {
        let (width, height) = self.screen_size()?;
        let instance: HINSTANCE = unsafe { GetModuleHandleW(None) }
            .map_err(|e| PlatformError::new("GetModuleHandleW", e))?
            .into();
        let class = WindowClass::register(instance)?;
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_LAYERED | WS_EX_TOOLWINDOW,
                class_name(),
                w!("region-shot"),
                WS_POPUP,
                0,
                0,
                width,
                height,
                None,
                None,
                Some(instance),
                None,
            )
        }
        .map_err(|e| PlatformError::new("CreateWindowExW", e))?;

        let window = OverlayWindow {
            hwnd,
            queue: Box::new(RefCell::new(VecDeque::new())),
            pen_width: self.pen_width,
            pen_color: self.pen_color,
            _class: class,
        };
        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, &*window.queue as *const EventQueue as isize);
            SetLayeredWindowAttributes(hwnd, COLORREF(0), self.overlay_alpha, LWA_ALPHA)
        }
        .map_err(|e| PlatformError::new("SetLayeredWindowAttributes", e))?;
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);
            let _ = SetForegroundWindow(hwnd);
        }
        debug!("overlay created {width}x{height}, alpha {}", self.overlay_alpha);
        Ok(window)
    }
}

impl OverlaySurface for OverlayWindow {
    fn next_event(&mut self) -> Result<Option<InputEvent>, PlatformError> {
        loop {
            if let Some(event) = self.queue.borrow_mut().pop_front() {
                return Ok(Some(event));
            }
            let mut msg = MSG::default();
            match unsafe { GetMessageW(&mut msg, None, 0, 0) }.0 {
                -1 => return Err(PlatformError::last_os("GetMessageW")),
                0 => return Ok(None),
                _ => {}
            }
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn redraw_outline(&mut self, erase: Option<Rect>, draw: Rect) -> Result<(), PlatformError> {
        let dc = WindowDc::get(self.hwnd)?;
        let pen: GdiObject<HPEN> = GdiObject(unsafe { CreatePen(PS_SOLID, self.pen_width, self.pen_color) });
        if pen.0 .0.is_null() {
            return Err(PlatformError::last_os("CreatePen"));
        }
        let _selected = Selected::new(dc.dc, pen.0.into())?;
        unsafe {
            SetROP2(dc.dc, R2_XORPEN);
        }
        if let Some(old) = erase {
            stroke(dc.dc, old);
        }
        stroke(dc.dc, draw);
        Ok(())
    }
}

fn stroke(dc: HDC, rect: Rect) {
    let path = outline_path(rect);
    unsafe {
        let _ = MoveToEx(dc, path[0].x, path[0].y, None);
        for p in &path[1..] {
            let _ = LineTo(dc, p.x, p.y);
        }
    }
}

fn cursor_position(lparam: LPARAM) -> Point {
    let mut pt = POINT::default();
    if unsafe { GetCursorPos(&mut pt) }.is_ok() {
        return Point::new(pt.x, pt.y);
    }
    Point::new(
        (lparam.0 & 0xffff) as i16 as i32,
        ((lparam.0 >> 16) & 0xffff) as i16 as i32,
    )
}

unsafe extern "system" fn overlay_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let queue = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const EventQueue;
    let push = |event: InputEvent| {
        if !queue.is_null() {
            // 创建后设置、DestroyWindow 前清除；Box 的生命周期长于窗口
            unsafe { (*queue).borrow_mut().push_back(event) };
        }
    };
    match msg {
        WM_SETCURSOR => {
            if let Ok(cursor) = unsafe { LoadCursorW(None, IDC_CROSS) } {
                unsafe {
                    SetCursor(Some(cursor));
                }
            }
            LRESULT(1)
        }
        WM_LBUTTONDOWN => {
            unsafe {
                SetCapture(hwnd);
            }
            push(InputEvent::PrimaryDown(cursor_position(lparam)));
            LRESULT(0)
        }
        WM_MOUSEMOVE => {
            push(InputEvent::PointerMoved {
                pos: cursor_position(lparam),
                primary_held: wparam.0 & MK_LBUTTON != 0,
            });
            LRESULT(0)
        }
        WM_LBUTTONUP => {
            unsafe {
                let _ = ReleaseCapture();
            }
            push(InputEvent::PrimaryUp(cursor_position(lparam)));
            LRESULT(0)
        }
        WM_RBUTTONDOWN | WM_CLOSE => {
            push(InputEvent::Dismissed);
            LRESULT(0)
        }
        WM_KEYDOWN if wparam.0 == VK_ESCAPE.0 as usize => {
            push(InputEvent::Dismissed);
            LRESULT(0)
        }
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            unsafe {
                BeginPaint(hwnd, &mut ps);
                let _ = EndPaint(hwnd, &ps);
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}
