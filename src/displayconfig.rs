//! Live Windows implementation of the OS facade: display-configuration
//! queries, monitor resolution, and the two generations of advanced-color
//! get/set requests.

use once_cell::sync::Lazy;
use tracing::debug;
use windows::Win32::Devices::Display::{
    DisplayConfigGetDeviceInfo, DisplayConfigSetDeviceInfo, GetDisplayConfigBufferSizes,
    QueryDisplayConfig, DISPLAYCONFIG_ADVANCED_COLOR_MODE_HDR, DISPLAYCONFIG_DEVICE_INFO_GET_ADVANCED_COLOR_INFO,
    DISPLAYCONFIG_DEVICE_INFO_GET_ADVANCED_COLOR_INFO_2, DISPLAYCONFIG_DEVICE_INFO_GET_SOURCE_NAME,
    DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME, DISPLAYCONFIG_DEVICE_INFO_HEADER,
    DISPLAYCONFIG_DEVICE_INFO_SET_ADVANCED_COLOR_STATE, DISPLAYCONFIG_DEVICE_INFO_SET_HDR_STATE,
    DISPLAYCONFIG_DEVICE_INFO_TYPE, DISPLAYCONFIG_GET_ADVANCED_COLOR_INFO,
    DISPLAYCONFIG_GET_ADVANCED_COLOR_INFO_2, DISPLAYCONFIG_MODE_INFO,
    DISPLAYCONFIG_MODE_INFO_TYPE_SOURCE, DISPLAYCONFIG_MODE_INFO_TYPE_TARGET,
    DISPLAYCONFIG_OUTPUT_TECHNOLOGY_DISPLAYPORT_EMBEDDED,
    DISPLAYCONFIG_OUTPUT_TECHNOLOGY_DISPLAYPORT_EXTERNAL, DISPLAYCONFIG_OUTPUT_TECHNOLOGY_DVI,
    DISPLAYCONFIG_OUTPUT_TECHNOLOGY_HDMI, DISPLAYCONFIG_OUTPUT_TECHNOLOGY_INTERNAL,
    DISPLAYCONFIG_PATH_INFO, DISPLAYCONFIG_SET_ADVANCED_COLOR_STATE, DISPLAYCONFIG_SET_HDR_STATE,
    DISPLAYCONFIG_SOURCE_DEVICE_NAME, DISPLAYCONFIG_TARGET_DEVICE_NAME,
    DISPLAYCONFIG_VIDEO_OUTPUT_TECHNOLOGY, QDC_ONLY_ACTIVE_PATHS,
};
use windows::Win32::Foundation::{ERROR_SUCCESS, HWND, LUID, RECT};
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MonitorFromRect, MonitorFromWindow, HMONITOR, MONITORINFO, MONITORINFOEXW,
    MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::System::SystemInformation::{
    VerSetConditionMask, VerifyVersionInfoW, OSVERSIONINFOEXW, VER_BUILDNUMBER, VER_EQUAL,
    VER_GREATER_EQUAL, VER_MAJORVERSION, VER_MINORVERSION,
};

use crate::api::{DisplayApi, MonitorHandle, WindowHandle};
use crate::error::{BridgeError, Result};
use crate::model::{
    AdapterId, DeviceId, DisplayPath, DisplayTopology, ModeKind, ModeRecord, OutputColorDescriptor,
    OutputTechnology, RawColorInfo, Rational, Rect,
};
use crate::monitor;

// DISPLAYCONFIG_GET_ADVANCED_COLOR_INFO bitfield layout.
const AC_SUPPORTED: u32 = 1 << 0;
const AC_ENABLED: u32 = 1 << 1;
const AC_WIDE_COLOR_ENFORCED: u32 = 1 << 2;

// DISPLAYCONFIG_GET_ADVANCED_COLOR_INFO_2 bitfield layout.
const AC2_HDR_SUPPORTED: u32 = 1 << 4;

/// The `advanced color info 2` / `set HDR state` request pair exists from
/// Windows 11 24H2 (build 26100) on. Probed once, thread-safe.
static HAS_COLOR_INFO_2: Lazy<bool> = Lazy::new(|| {
    let v2 = is_build_or_greater(10, 0, 26100);
    debug!(v2, "advanced color API generation probed");
    v2
});

fn is_build_or_greater(major: u32, minor: u32, build: u32) -> bool {
    let mut osvi = OSVERSIONINFOEXW {
        dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOEXW>() as u32,
        dwMajorVersion: major,
        dwMinorVersion: minor,
        dwBuildNumber: build,
        ..Default::default()
    };
    unsafe {
        let mask = VerSetConditionMask(
            VerSetConditionMask(
                VerSetConditionMask(0, VER_MAJORVERSION, VER_EQUAL),
                VER_MINORVERSION,
                VER_EQUAL,
            ),
            VER_BUILDNUMBER,
            VER_GREATER_EQUAL,
        );
        VerifyVersionInfoW(
            &mut osvi,
            VER_MAJORVERSION | VER_MINORVERSION | VER_BUILDNUMBER,
            mask,
        )
        .as_bool()
    }
}

fn luid(adapter: AdapterId) -> LUID {
    LUID {
        LowPart: adapter.low,
        HighPart: adapter.high,
    }
}

fn adapter_id(luid: LUID) -> AdapterId {
    AdapterId {
        high: luid.HighPart,
        low: luid.LowPart,
    }
}

fn info_header(
    ty: DISPLAYCONFIG_DEVICE_INFO_TYPE,
    size: usize,
    device: DeviceId,
) -> DISPLAYCONFIG_DEVICE_INFO_HEADER {
    DISPLAYCONFIG_DEVICE_INFO_HEADER {
        r#type: ty,
        size: size as u32,
        adapterId: luid(device.adapter),
        id: device.id,
    }
}

fn get_device_info(call: &'static str, header: *mut DISPLAYCONFIG_DEVICE_INFO_HEADER) -> Result<()> {
    let code = unsafe { DisplayConfigGetDeviceInfo(header) };
    if code == ERROR_SUCCESS.0 as i32 {
        Ok(())
    } else {
        Err(BridgeError::OsCallFailed { call, code })
    }
}

fn set_device_info(call: &'static str, header: *mut DISPLAYCONFIG_DEVICE_INFO_HEADER) -> Result<()> {
    let code = unsafe { DisplayConfigSetDeviceInfo(header) };
    if code == ERROR_SUCCESS.0 as i32 {
        Ok(())
    } else {
        Err(BridgeError::OsCallFailed { call, code })
    }
}

fn utf16_str(units: &[u16]) -> String {
    let len = units.iter().position(|&c| c == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..len])
}

fn technology_tag(tech: DISPLAYCONFIG_VIDEO_OUTPUT_TECHNOLOGY) -> OutputTechnology {
    match tech {
        DISPLAYCONFIG_OUTPUT_TECHNOLOGY_HDMI => OutputTechnology::Hdmi,
        DISPLAYCONFIG_OUTPUT_TECHNOLOGY_DISPLAYPORT_EXTERNAL => OutputTechnology::DisplayPort,
        DISPLAYCONFIG_OUTPUT_TECHNOLOGY_DISPLAYPORT_EMBEDDED => OutputTechnology::EmbeddedDisplayPort,
        DISPLAYCONFIG_OUTPUT_TECHNOLOGY_DVI => OutputTechnology::Dvi,
        DISPLAYCONFIG_OUTPUT_TECHNOLOGY_INTERNAL => OutputTechnology::Internal,
        _ => OutputTechnology::Unknown,
    }
}

/// Stateless facade over the live OS. Safe to share across threads; every
/// call re-queries the system.
#[derive(Debug, Default)]
pub struct WindowsDisplayApi;

impl WindowsDisplayApi {
    pub fn new() -> Self {
        Self
    }
}

impl DisplayApi for WindowsDisplayApi {
    fn query_topology(&self) -> Result<DisplayTopology> {
        let mut path_count = 0u32;
        let mut mode_count = 0u32;
        let code = unsafe {
            GetDisplayConfigBufferSizes(QDC_ONLY_ACTIVE_PATHS, &mut path_count, &mut mode_count)
        };
        if code != ERROR_SUCCESS {
            return Err(BridgeError::OsCallFailed {
                call: "GetDisplayConfigBufferSizes",
                code: code.0 as i32,
            });
        }

        let mut paths = vec![DISPLAYCONFIG_PATH_INFO::default(); path_count as usize];
        let mut modes = vec![DISPLAYCONFIG_MODE_INFO::default(); mode_count as usize];
        let code = unsafe {
            QueryDisplayConfig(
                QDC_ONLY_ACTIVE_PATHS,
                &mut path_count,
                paths.as_mut_ptr(),
                &mut mode_count,
                modes.as_mut_ptr(),
                None,
            )
        };
        if code != ERROR_SUCCESS {
            return Err(BridgeError::OsCallFailed {
                call: "QueryDisplayConfig",
                code: code.0 as i32,
            });
        }

        // The query may report fewer entries than the sizing call.
        paths.truncate(path_count as usize);
        modes.truncate(mode_count as usize);

        let paths = paths
            .iter()
            .map(|p| DisplayPath {
                source: DeviceId {
                    adapter: adapter_id(p.sourceInfo.adapterId),
                    id: p.sourceInfo.id,
                },
                target: DeviceId {
                    adapter: adapter_id(p.targetInfo.adapterId),
                    id: p.targetInfo.id,
                },
                refresh: Rational {
                    num: p.targetInfo.refreshRate.Numerator,
                    den: p.targetInfo.refreshRate.Denominator,
                },
                technology: technology_tag(p.targetInfo.outputTechnology),
            })
            .collect();

        let modes = modes
            .iter()
            .filter_map(|m| {
                let device = DeviceId {
                    adapter: adapter_id(m.adapterId),
                    id: m.id,
                };
                match m.infoType {
                    DISPLAYCONFIG_MODE_INFO_TYPE_SOURCE => {
                        let src = unsafe { m.Anonymous.sourceMode };
                        Some(ModeRecord {
                            device,
                            kind: ModeKind::Source(Rect {
                                x: src.position.x,
                                y: src.position.y,
                                width: src.width,
                                height: src.height,
                            }),
                        })
                    }
                    DISPLAYCONFIG_MODE_INFO_TYPE_TARGET => Some(ModeRecord {
                        device,
                        kind: ModeKind::Target,
                    }),
                    _ => None,
                }
            })
            .collect();

        Ok(DisplayTopology { paths, modes })
    }

    fn source_device_name(&self, source: DeviceId) -> Result<String> {
        let mut name = DISPLAYCONFIG_SOURCE_DEVICE_NAME {
            header: info_header(
                DISPLAYCONFIG_DEVICE_INFO_GET_SOURCE_NAME,
                std::mem::size_of::<DISPLAYCONFIG_SOURCE_DEVICE_NAME>(),
                source,
            ),
            ..Default::default()
        };
        get_device_info("DisplayConfigGetDeviceInfo(source name)", &mut name.header)?;
        Ok(utf16_str(&name.viewGdiDeviceName))
    }

    fn target_friendly_name(&self, target: DeviceId) -> Result<String> {
        let mut name = DISPLAYCONFIG_TARGET_DEVICE_NAME {
            header: info_header(
                DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME,
                std::mem::size_of::<DISPLAYCONFIG_TARGET_DEVICE_NAME>(),
                target,
            ),
            ..Default::default()
        };
        get_device_info("DisplayConfigGetDeviceInfo(target name)", &mut name.header)?;
        Ok(utf16_str(&name.monitorFriendlyDeviceName))
    }

    fn color_info(&self, target: DeviceId) -> Result<RawColorInfo> {
        if *HAS_COLOR_INFO_2 {
            let mut info = DISPLAYCONFIG_GET_ADVANCED_COLOR_INFO_2 {
                header: info_header(
                    DISPLAYCONFIG_DEVICE_INFO_GET_ADVANCED_COLOR_INFO_2,
                    std::mem::size_of::<DISPLAYCONFIG_GET_ADVANCED_COLOR_INFO_2>(),
                    target,
                ),
                ..Default::default()
            };
            get_device_info(
                "DisplayConfigGetDeviceInfo(advanced color info 2)",
                &mut info.header,
            )?;
            let flags = unsafe { info.Anonymous.value };
            Ok(RawColorInfo::V2 {
                hdr_supported: flags & AC2_HDR_SUPPORTED != 0,
                active_mode_hdr: info.activeColorMode == DISPLAYCONFIG_ADVANCED_COLOR_MODE_HDR,
                bits_per_channel: info.bitsPerColorChannel,
            })
        } else {
            let mut info = DISPLAYCONFIG_GET_ADVANCED_COLOR_INFO {
                header: info_header(
                    DISPLAYCONFIG_DEVICE_INFO_GET_ADVANCED_COLOR_INFO,
                    std::mem::size_of::<DISPLAYCONFIG_GET_ADVANCED_COLOR_INFO>(),
                    target,
                ),
                ..Default::default()
            };
            get_device_info(
                "DisplayConfigGetDeviceInfo(advanced color info)",
                &mut info.header,
            )?;
            let flags = unsafe { info.Anonymous.value };
            Ok(RawColorInfo::V1 {
                advanced_color_supported: flags & AC_SUPPORTED != 0,
                advanced_color_enabled: flags & AC_ENABLED != 0,
                wide_color_enforced: flags & AC_WIDE_COLOR_ENFORCED != 0,
                bits_per_channel: info.bitsPerColorChannel,
            })
        }
    }

    fn set_color_state(&self, target: DeviceId, enable: bool) -> Result<()> {
        if *HAS_COLOR_INFO_2 {
            let mut state = DISPLAYCONFIG_SET_HDR_STATE {
                header: info_header(
                    DISPLAYCONFIG_DEVICE_INFO_SET_HDR_STATE,
                    std::mem::size_of::<DISPLAYCONFIG_SET_HDR_STATE>(),
                    target,
                ),
                ..Default::default()
            };
            state.Anonymous.value = u32::from(enable);
            set_device_info("DisplayConfigSetDeviceInfo(HDR state)", &mut state.header)
        } else {
            let mut state = DISPLAYCONFIG_SET_ADVANCED_COLOR_STATE {
                header: info_header(
                    DISPLAYCONFIG_DEVICE_INFO_SET_ADVANCED_COLOR_STATE,
                    std::mem::size_of::<DISPLAYCONFIG_SET_ADVANCED_COLOR_STATE>(),
                    target,
                ),
                ..Default::default()
            };
            state.Anonymous.value = u32::from(enable);
            set_device_info(
                "DisplayConfigSetDeviceInfo(advanced color state)",
                &mut state.header,
            )
        }
    }

    fn monitor_from_window(&self, window: WindowHandle) -> MonitorHandle {
        let hwnd = HWND(window.0 as *mut core::ffi::c_void);
        let monitor = unsafe { MonitorFromWindow(hwnd, MONITOR_DEFAULTTONEAREST) };
        MonitorHandle(monitor.0 as isize)
    }

    fn monitor_from_rect(&self, rect: Rect) -> MonitorHandle {
        let rect = RECT {
            left: rect.x,
            top: rect.y,
            right: rect.x + rect.width as i32,
            bottom: rect.y + rect.height as i32,
        };
        let monitor = unsafe { MonitorFromRect(&rect, MONITOR_DEFAULTTONEAREST) };
        MonitorHandle(monitor.0 as isize)
    }

    fn monitor_device_name(&self, monitor: MonitorHandle) -> Result<String> {
        let mut info = MONITORINFOEXW::default();
        info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;
        let ok = unsafe {
            GetMonitorInfoW(
                HMONITOR(monitor.0 as *mut core::ffi::c_void),
                &mut info as *mut MONITORINFOEXW as *mut MONITORINFO,
            )
        };
        if !ok.as_bool() {
            return Err(BridgeError::OsCallFailed {
                call: "GetMonitorInfoW",
                code: 0,
            });
        }
        Ok(utf16_str(&info.szDevice))
    }

    fn output_descriptor(&self, monitor: MonitorHandle) -> Result<OutputColorDescriptor> {
        monitor::output_descriptor(monitor)
    }
}
