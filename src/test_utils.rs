//! Scripted OS facade and recording host shared by the engine tests.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::api::{DisplayApi, MonitorHandle, WindowHandle};
use crate::error::{BridgeError, Result};
use crate::host::HostSink;
use crate::model::{
    AdapterId, DeviceId, DisplayPath, DisplayRecord, DisplayTopology, HdrStatus, ModeKind,
    ModeRecord, OutputColorDescriptor, OutputTechnology, RawColorInfo, Rational, Rect,
};

pub(crate) fn device(adapter: u32, id: u32) -> DeviceId {
    DeviceId {
        adapter: AdapterId {
            high: 0,
            low: adapter,
        },
        id,
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MockColorState {
    pub supported: bool,
    pub enabled: bool,
    pub bits: u32,
}

/// Everything is scripted up front; the mutexes exist because the trait
/// hands out `&self` while toggle tests mutate color state.
#[derive(Default)]
pub(crate) struct MockDisplayApi {
    pub topology: DisplayTopology,
    pub source_names: HashMap<DeviceId, String>,
    pub target_names: HashMap<DeviceId, String>,
    pub color: Mutex<HashMap<DeviceId, MockColorState>>,
    pub window_monitor: HashMap<isize, isize>,
    pub monitor_names: HashMap<isize, String>,
    pub rect_monitors: Vec<(Rect, isize)>,
    pub descriptors: HashMap<isize, OutputColorDescriptor>,
    pub set_calls: Mutex<Vec<(DeviceId, bool)>>,
    pub transitions: Mutex<u32>,
    pub fail_set: bool,
    /// Accept the set call but never move hardware state.
    pub ignore_set: bool,
    pub fail_topology: bool,
}

impl DisplayApi for MockDisplayApi {
    fn query_topology(&self) -> Result<DisplayTopology> {
        if self.fail_topology {
            return Err(BridgeError::OsCallFailed {
                call: "mock topology query",
                code: 31,
            });
        }
        Ok(self.topology.clone())
    }

    fn source_device_name(&self, source: DeviceId) -> Result<String> {
        self.source_names
            .get(&source)
            .cloned()
            .ok_or(BridgeError::OsCallFailed {
                call: "mock source name",
                code: 87,
            })
    }

    fn target_friendly_name(&self, target: DeviceId) -> Result<String> {
        self.target_names
            .get(&target)
            .cloned()
            .ok_or(BridgeError::OsCallFailed {
                call: "mock target name",
                code: 87,
            })
    }

    fn color_info(&self, target: DeviceId) -> Result<RawColorInfo> {
        let color = self.color.lock();
        let state = color.get(&target).ok_or(BridgeError::OsCallFailed {
            call: "mock color query",
            code: 87,
        })?;
        Ok(RawColorInfo::V2 {
            hdr_supported: state.supported,
            active_mode_hdr: state.enabled,
            bits_per_channel: state.bits,
        })
    }

    fn set_color_state(&self, target: DeviceId, enable: bool) -> Result<()> {
        if self.fail_set {
            return Err(BridgeError::OsCallFailed {
                call: "mock set state",
                code: 31,
            });
        }
        self.set_calls.lock().push((target, enable));
        if self.ignore_set {
            return Ok(());
        }
        let mut color = self.color.lock();
        let state = color.get_mut(&target).ok_or(BridgeError::OsCallFailed {
            call: "mock set state",
            code: 87,
        })?;
        if state.enabled != enable {
            state.enabled = enable;
            *self.transitions.lock() += 1;
        }
        Ok(())
    }

    fn monitor_from_window(&self, window: WindowHandle) -> MonitorHandle {
        MonitorHandle(self.window_monitor.get(&window.0).copied().unwrap_or(0))
    }

    fn monitor_from_rect(&self, rect: Rect) -> MonitorHandle {
        MonitorHandle(
            self.rect_monitors
                .iter()
                .find(|(r, _)| *r == rect)
                .map(|(_, m)| *m)
                .unwrap_or(0),
        )
    }

    fn monitor_device_name(&self, monitor: MonitorHandle) -> Result<String> {
        self.monitor_names
            .get(&monitor.0)
            .cloned()
            .ok_or(BridgeError::NotFound)
    }

    fn output_descriptor(&self, monitor: MonitorHandle) -> Result<OutputColorDescriptor> {
        self.descriptors
            .get(&monitor.0)
            .copied()
            .ok_or(BridgeError::NotFound)
    }
}

/// The worked two-display scenario: a DisplayPort 4K HDR panel carrying
/// the player window and an HDMI FHD panel without HDR.
pub(crate) fn dual_display_api() -> MockDisplayApi {
    let hdr_source = device(0, 0);
    let hdr_target = device(0, 100);
    let sdr_source = device(0, 1);
    let sdr_target = device(0, 101);

    let hdr_rect = Rect {
        x: 0,
        y: 0,
        width: 3840,
        height: 2160,
    };
    let sdr_rect = Rect {
        x: 3840,
        y: 0,
        width: 1920,
        height: 1080,
    };

    let mut api = MockDisplayApi {
        topology: DisplayTopology {
            paths: vec![
                DisplayPath {
                    source: hdr_source,
                    target: hdr_target,
                    refresh: Rational {
                        num: 120000,
                        den: 1000,
                    },
                    technology: OutputTechnology::DisplayPort,
                },
                DisplayPath {
                    source: sdr_source,
                    target: sdr_target,
                    refresh: Rational { num: 60, den: 1 },
                    technology: OutputTechnology::Hdmi,
                },
            ],
            modes: vec![
                ModeRecord {
                    device: hdr_source,
                    kind: ModeKind::Source(hdr_rect),
                },
                ModeRecord {
                    device: hdr_target,
                    kind: ModeKind::Target,
                },
                ModeRecord {
                    device: sdr_source,
                    kind: ModeKind::Source(sdr_rect),
                },
                ModeRecord {
                    device: sdr_target,
                    kind: ModeKind::Target,
                },
            ],
        },
        ..Default::default()
    };

    api.source_names
        .insert(hdr_source, "\\\\.\\DISPLAY1".to_string());
    api.source_names
        .insert(sdr_source, "\\\\.\\DISPLAY2".to_string());
    api.target_names.insert(hdr_target, "DELL U2723QE".to_string());
    api.target_names.insert(sdr_target, "LG FHD".to_string());

    api.color.lock().insert(
        hdr_target,
        MockColorState {
            supported: true,
            enabled: true,
            bits: 10,
        },
    );
    api.color.lock().insert(
        sdr_target,
        MockColorState {
            supported: false,
            enabled: false,
            bits: 8,
        },
    );

    api.window_monitor.insert(7, 200);
    api.monitor_names.insert(200, "\\\\.\\DISPLAY1".to_string());
    api.rect_monitors.push((hdr_rect, 200));
    api.rect_monitors.push((sdr_rect, 201));

    api.descriptors.insert(
        200,
        OutputColorDescriptor {
            max_luminance: 1015.0,
            min_luminance: 0.01,
            max_full_frame_luminance: 603.0,
            primaries: "BT.2020",
            transfer: "PQ",
        },
    );
    api.descriptors.insert(
        201,
        OutputColorDescriptor {
            max_luminance: 270.0,
            min_luminance: 0.1,
            max_full_frame_luminance: 270.0,
            primaries: "BT.709",
            transfer: "sRGB",
        },
    );

    api
}

/// Minimal distinct record for size-ceiling tests.
pub(crate) fn synthetic_record(i: u32) -> DisplayRecord {
    DisplayRecord {
        name: format!("Display {i}"),
        uid: i.to_string(),
        is_current: false,
        hdr_supported: false,
        hdr_status: HdrStatus::Unsupported,
        width: 1920,
        height: 1080,
        refresh_rate: 60.0,
        bit_depth: 8,
        primaries: "Unknown".to_string(),
        transfer: "Unknown".to_string(),
        max_luminance: 0.0,
        min_luminance: 0.0,
        max_full_frame_luminance: 0.0,
        technology: "HDMI".to_string(),
    }
}

/// Records everything the bridge publishes.
#[derive(Default)]
pub(crate) struct RecordingHost {
    pub props: Mutex<HashMap<String, String>>,
    pub lines: Mutex<Vec<String>>,
}

impl HostSink for RecordingHost {
    fn set_property(&self, name: &str, value: &str) {
        self.props.lock().insert(name.to_string(), value.to_string());
    }

    fn print_text(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
