use crate::overlay::placement::Size;
#[cfg(windows)]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(windows)]
use std::sync::{Arc, Mutex};

/// Maximum overlay width in pixels; longer lines wrap.
pub const MAX_OVERLAY_WIDTH: i32 = 350;

const PADDING: i32 = 6;
const LINE_HEIGHT: i32 = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayContent {
    Translating {
        original: String,
    },
    Result {
        original: String,
        translated: String,
    },
    Error {
        original: String,
        reason: String,
    },
}

impl OverlayContent {
    pub fn display_text(&self) -> String {
        match self {
            OverlayContent::Translating { original } => {
                format!("{original}\n\n[translating...]")
            }
            OverlayContent::Result {
                original,
                translated,
            } => format!("{original}\n\n{translated}"),
            OverlayContent::Error { original, .. } => {
                format!("{original}\n\n[translation failed]")
            }
        }
    }
}

/// Rendering surface the controller drives.
///
/// Implementations are expected to use transparent, always-on-top windows so
/// the text can be drawn over existing applications without stealing focus.
pub trait DisplaySink: Send {
    fn show(&mut self, content: &OverlayContent);
    fn size(&self) -> Size;
    fn move_to(&mut self, x: i32, y: i32);
    fn hide(&mut self);
    fn shutdown(&mut self) {}
}

// Advance widths for the default overlay font; CJK glyphs are roughly twice
// as wide as Latin ones. Estimated metrics keep sizing a pure function.
fn char_advance(c: char) -> i32 {
    if (c as u32) < 0x2000 {
        7
    } else {
        14
    }
}

fn line_advance(line: &str) -> i32 {
    line.chars().map(char_advance).sum()
}

pub fn wrap_lines(text: &str) -> Vec<String> {
    let limit = MAX_OVERLAY_WIDTH - 2 * PADDING;
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        let mut width = 0;
        for c in raw.chars() {
            let adv = char_advance(c);
            if width + adv > limit && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                width = 0;
            }
            current.push(c);
            width += adv;
        }
        lines.push(current);
    }
    lines
}

fn size_for_lines(lines: &[String]) -> Size {
    let widest = lines.iter().map(|line| line_advance(line)).max().unwrap_or(0);
    Size {
        w: widest + 2 * PADDING,
        h: lines.len() as i32 * LINE_HEIGHT + 2 * PADDING,
    }
}

pub fn estimate_text_size(text: &str) -> Size {
    size_for_lines(&wrap_lines(text))
}

/// Sink for platforms without an overlay backend; remembers enough state for
/// placement to stay meaningful.
#[derive(Debug)]
pub struct NoopDisplaySink {
    size: Size,
    visible: bool,
}

impl NoopDisplaySink {
    pub fn new() -> Self {
        Self {
            size: Size { w: 0, h: 0 },
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for NoopDisplaySink {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for NoopDisplaySink {
    fn show(&mut self, content: &OverlayContent) {
        self.size = estimate_text_size(&content.display_text());
        self.visible = true;
    }

    fn size(&self) -> Size {
        self.size
    }

    fn move_to(&mut self, _x: i32, _y: i32) {}

    fn hide(&mut self) {
        self.visible = false;
    }
}

#[cfg(windows)]
#[derive(Debug, Clone, PartialEq)]
struct OverlaySnapshot {
    lines: Vec<String>,
    visible: bool,
    pos: (i32, i32),
    size: Size,
}

#[cfg(windows)]
impl OverlaySnapshot {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            visible: false,
            pos: (0, 0),
            size: Size { w: 0, h: 0 },
        }
    }
}

#[cfg(windows)]
struct SnapshotBuffer {
    snapshot: Mutex<OverlaySnapshot>,
    version: AtomicU64,
}

#[cfg(windows)]
impl SnapshotBuffer {
    fn new() -> Self {
        Self {
            snapshot: Mutex::new(OverlaySnapshot::new()),
            version: AtomicU64::new(0),
        }
    }

    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut OverlaySnapshot),
    {
        if let Ok(mut snapshot) = self.snapshot.lock() {
            f(&mut snapshot);
            self.version.fetch_add(1, Ordering::Release);
        }
    }

    fn snapshot(&self) -> Option<OverlaySnapshot> {
        self.snapshot.lock().ok().map(|snapshot| snapshot.clone())
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

/// Borderless always-on-top GDI window that mirrors the snapshot buffer.
/// The controller thread only mutates the snapshot; a dedicated window
/// thread owns the HWND and repaints on a timer when the version moves.
#[cfg(windows)]
pub struct GdiOverlaySink {
    buffer: Arc<SnapshotBuffer>,
    hwnd: Arc<Mutex<Option<isize>>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(windows)]
struct OverlayThreadState {
    buffer: Arc<SnapshotBuffer>,
    last_applied_version: AtomicU64,
}

#[cfg(windows)]
const REFRESH_TIMER_MS: u32 = 50;

#[cfg(windows)]
impl GdiOverlaySink {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(SnapshotBuffer::new()),
            hwnd: Arc::new(Mutex::new(None)),
            thread: None,
        }
    }

    fn ensure_thread(&mut self) {
        if self.thread.is_some() {
            return;
        }
        let thread_state = Arc::new(OverlayThreadState {
            buffer: Arc::clone(&self.buffer),
            last_applied_version: AtomicU64::new(0),
        });
        let hwnd_store = Arc::clone(&self.hwnd);
        let handle = std::thread::spawn(move || {
            use windows::core::{w, PCWSTR};
            use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, RECT, WPARAM};
            use windows::Win32::Graphics::Gdi::{
                BeginPaint, CreateSolidBrush, DeleteObject, EndPaint, FillRect, RedrawWindow,
                SetBkMode, SetTextColor, TextOutW, PAINTSTRUCT, RDW_INVALIDATE, TRANSPARENT,
            };
            use windows::Win32::System::LibraryLoader::GetModuleHandleW;
            use windows::Win32::UI::WindowsAndMessaging::{
                CreateWindowExW, DefWindowProcW, DispatchMessageW, GetMessageW,
                GetWindowLongPtrW, KillTimer, PostQuitMessage, RegisterClassW,
                SetLayeredWindowAttributes, SetTimer, SetWindowLongPtrW, SetWindowPos,
                TranslateMessage, CS_HREDRAW, CS_VREDRAW, GWLP_USERDATA, HMENU, HWND_TOPMOST,
                LWA_ALPHA, MSG, SWP_HIDEWINDOW, SWP_NOACTIVATE, SWP_SHOWWINDOW, WM_DESTROY,
                WM_PAINT, WM_TIMER, WNDCLASSW, WS_EX_LAYERED, WS_EX_NOACTIVATE,
                WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
            };

            const BACKGROUND: u32 = 0x001e1e1e;
            const FOREGROUND: u32 = 0x00ffffff;

            unsafe extern "system" fn wndproc(
                hwnd: HWND,
                msg: u32,
                wparam: WPARAM,
                lparam: LPARAM,
            ) -> LRESULT {
                let state_ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA);
                if state_ptr != 0 {
                    let state = &*(state_ptr as *const OverlayThreadState);
                    if msg == WM_TIMER {
                        let version = state.buffer.version();
                        if version != state.last_applied_version.load(Ordering::Relaxed) {
                            state
                                .last_applied_version
                                .store(version, Ordering::Relaxed);
                            if let Some(snapshot) = state.buffer.snapshot() {
                                let flags = SWP_NOACTIVATE
                                    | if snapshot.visible {
                                        SWP_SHOWWINDOW
                                    } else {
                                        SWP_HIDEWINDOW
                                    };
                                let _ = SetWindowPos(
                                    hwnd,
                                    HWND_TOPMOST,
                                    snapshot.pos.0,
                                    snapshot.pos.1,
                                    snapshot.size.w,
                                    snapshot.size.h,
                                    flags,
                                );
                                let _ = RedrawWindow(hwnd, None, None, RDW_INVALIDATE);
                            }
                        }
                        return LRESULT(0);
                    }
                    if msg == WM_PAINT {
                        let mut paint = PAINTSTRUCT::default();
                        let hdc = BeginPaint(hwnd, &mut paint);
                        let mut rect = RECT::default();
                        rect.right = paint.rcPaint.right;
                        rect.bottom = paint.rcPaint.bottom;
                        let brush = CreateSolidBrush(COLORREF(BACKGROUND));
                        FillRect(hdc, &rect, brush);
                        let _ = DeleteObject(brush);
                        if let Some(snapshot) = state.buffer.snapshot() {
                            if snapshot.visible {
                                SetBkMode(hdc, TRANSPARENT);
                                SetTextColor(hdc, COLORREF(FOREGROUND));
                                for (i, line) in snapshot.lines.iter().enumerate() {
                                    let wide: Vec<u16> = line.encode_utf16().collect();
                                    let _ = TextOutW(
                                        hdc,
                                        PADDING,
                                        PADDING + i as i32 * LINE_HEIGHT,
                                        &wide,
                                    );
                                }
                            }
                        }
                        let _ = EndPaint(hwnd, &paint);
                        return LRESULT(0);
                    }
                }
                if msg == WM_DESTROY {
                    let _ = KillTimer(hwnd, 1);
                    PostQuitMessage(0);
                }
                DefWindowProcW(hwnd, msg, wparam, lparam)
            }

            unsafe {
                let class_name = w!("HoverTranslatorOverlay");
                let hinstance = GetModuleHandleW(None).unwrap_or_default();
                let wc = WNDCLASSW {
                    style: CS_HREDRAW | CS_VREDRAW,
                    lpfnWndProc: Some(wndproc),
                    hInstance: hinstance.into(),
                    lpszClassName: class_name,
                    ..Default::default()
                };
                let _ = RegisterClassW(&wc);
                let hwnd = CreateWindowExW(
                    WS_EX_LAYERED
                        | WS_EX_TRANSPARENT
                        | WS_EX_TOPMOST
                        | WS_EX_TOOLWINDOW
                        | WS_EX_NOACTIVATE,
                    wc.lpszClassName,
                    PCWSTR::null(),
                    WS_POPUP,
                    0,
                    0,
                    0,
                    0,
                    None,
                    HMENU::default(),
                    hinstance,
                    None,
                )
                .ok();
                if let Some(hwnd) = hwnd {
                    if hwnd.0 != std::ptr::null_mut() {
                        SetWindowLongPtrW(
                            hwnd,
                            GWLP_USERDATA,
                            &*thread_state as *const _ as isize,
                        );
                        let _ = SetLayeredWindowAttributes(hwnd, COLORREF(0), 235, LWA_ALPHA);
                        let _ = SetTimer(hwnd, 1, REFRESH_TIMER_MS, None);
                        if let Ok(mut store) = hwnd_store.lock() {
                            *store = Some(hwnd.0 as isize);
                        }
                    }
                }

                let mut msg = MSG::default();
                while GetMessageW(&mut msg, None, 0, 0).into() {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        });
        self.thread = Some(handle);
    }
}

#[cfg(windows)]
impl Default for GdiOverlaySink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(windows)]
impl DisplaySink for GdiOverlaySink {
    fn show(&mut self, content: &OverlayContent) {
        self.ensure_thread();
        let lines = wrap_lines(&content.display_text());
        let size = size_for_lines(&lines);
        self.buffer.update(|snapshot| {
            snapshot.lines = lines;
            snapshot.size = size;
            snapshot.visible = true;
        });
    }

    fn size(&self) -> Size {
        self.buffer
            .snapshot()
            .map(|snapshot| snapshot.size)
            .unwrap_or(Size { w: 0, h: 0 })
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.ensure_thread();
        self.buffer.update(|snapshot| snapshot.pos = (x, y));
    }

    fn hide(&mut self) {
        self.buffer.update(|snapshot| snapshot.visible = false);
    }

    fn shutdown(&mut self) {
        if let Ok(store) = self.hwnd.lock() {
            if let Some(hwnd) = *store {
                unsafe {
                    let _ = windows::Win32::UI::WindowsAndMessaging::PostMessageW(
                        windows::Win32::Foundation::HWND(hwnd as *mut _),
                        windows::Win32::UI::WindowsAndMessaging::WM_CLOSE,
                        windows::Win32::Foundation::WPARAM(0),
                        windows::Win32::Foundation::LPARAM(0),
                    );
                }
            }
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

pub fn default_sink() -> Box<dyn DisplaySink> {
    #[cfg(windows)]
    {
        Box::new(GdiOverlaySink::new())
    }
    #[cfg(not(windows))]
    {
        Box::new(NoopDisplaySink::new())
    }
}
