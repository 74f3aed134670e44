//! Display-change watcher: a hidden window with its own message pump
//! receives system display-change broadcasts and forwards refresh ticks
//! to a worker that re-runs snapshot synthesis.

use std::sync::Arc;
use std::thread;

use anyhow::Result;
use crossbeam_channel::{unbounded, Sender};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};
use windows::core::w;
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DispatchMessageW, GetMessageW, RegisterClassW, ShowWindow,
    TranslateMessage, CW_USEDEFAULT, MSG, SW_HIDE, WINDOW_EX_STYLE, WM_DISPLAYCHANGE, WNDCLASSW,
    WS_OVERLAPPEDWINDOW,
};

use crate::bridge::DisplayBridge;

/// Tick channel bridging the window procedure to the refresh worker.
static REFRESH_TX: OnceCell<Sender<()>> = OnceCell::new();

/// Spawn the watcher threads. Called once at startup; a second call fails
/// rather than double-registering the window class.
pub fn spawn(bridge: Arc<DisplayBridge>) -> Result<()> {
    let (tx, rx) = unbounded::<()>();
    REFRESH_TX
        .set(tx)
        .map_err(|_| anyhow::anyhow!("display watcher already running"))?;

    thread::Builder::new()
        .name("display-refresh".into())
        .spawn(move || {
            while rx.recv().is_ok() {
                debug!("display change notification");
                bridge.refresh();
            }
        })?;

    thread::Builder::new()
        .name("display-watch".into())
        .spawn(|| {
            if let Err(err) = run_message_pump() {
                warn!(%err, "display watcher exited");
            }
        })?;

    Ok(())
}

fn run_message_pump() -> Result<()> {
    unsafe {
        let class_name = w!("LumaBridgeDisplayWatch");
        let hinstance = GetModuleHandleW(None)?;

        let wc = WNDCLASSW {
            lpfnWndProc: Some(watch_proc),
            hInstance: hinstance.into(),
            lpszClassName: class_name,
            ..Default::default()
        };
        RegisterClassW(&wc);

        // Display-change broadcasts only reach top-level windows, so this
        // cannot be a message-only window. It stays hidden.
        let hwnd = CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            class_name,
            w!(""),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            None,
            None,
            Some(HINSTANCE(hinstance.0)),
            None,
        )?;
        let _ = ShowWindow(hwnd, SW_HIDE);

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
    Ok(())
}

unsafe extern "system" fn watch_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_DISPLAYCHANGE {
        if let Some(tx) = REFRESH_TX.get() {
            let _ = tx.send(());
        }
        return LRESULT(0);
    }
    DefWindowProcW(hwnd, msg, wparam, lparam)
}
