//! Reconciles the three descriptions of one monitor: the window-manager
//! handle, the active path/mode records, and the graphics-output handle.
//! Device-name and rectangle matching are best effort; ties go to the
//! first match in OS enumeration order.

use tracing::{debug, warn};

use crate::api::{DisplayApi, MonitorHandle, WindowHandle};
use crate::model::{DeviceId, DisplayPath, DisplayTopology, ModeKind, ModeRecord, Rect};

/// An active path whose target mode record is confirmed present.
#[derive(Debug, Clone, Copy)]
pub struct CorrelatedPath {
    pub path: DisplayPath,
    pub target: DeviceId,
}

/// Strip trailing NULs and fold ASCII case before comparing device names.
pub fn normalize_device_name(name: &str) -> String {
    name.trim_end_matches('\0').to_ascii_uppercase()
}

pub fn names_match(a: &str, b: &str) -> bool {
    normalize_device_name(a) == normalize_device_name(b)
}

/// Target-typed mode record matching a path's target identity.
pub fn target_mode(modes: &[ModeRecord], target: DeviceId) -> Option<&ModeRecord> {
    modes
        .iter()
        .find(|m| matches!(m.kind, ModeKind::Target) && m.device == target)
}

/// Rendered-surface rectangle of a path's source identity.
pub fn source_rect(modes: &[ModeRecord], source: DeviceId) -> Option<Rect> {
    modes.iter().find_map(|m| match m.kind {
        ModeKind::Source(rect) if m.device == source => Some(rect),
        _ => None,
    })
}

/// Resolve the active path under the tracked window.
///
/// The window resolves to a monitor with nearest-monitor semantics, the
/// monitor to its device name, and the name to the path whose source
/// reports the same view name. `None` means "no display to report";
/// OS query failures along the way are logged and count as no match.
pub fn current_path(api: &dyn DisplayApi, window: WindowHandle) -> Option<CorrelatedPath> {
    let monitor = api.monitor_from_window(window);
    let device = match api.monitor_device_name(monitor) {
        Ok(name) => name,
        Err(err) => {
            debug!(%err, "monitor info query failed");
            return None;
        }
    };

    let topology = match api.query_topology() {
        Ok(t) => t,
        Err(err) => {
            warn!(%err, "active path query failed");
            return None;
        }
    };

    path_for_device_name(api, &topology, &device)
}

/// Scan paths for the one whose source view name equals `device`, then
/// confirm its target mode record exists.
pub fn path_for_device_name(
    api: &dyn DisplayApi,
    topology: &DisplayTopology,
    device: &str,
) -> Option<CorrelatedPath> {
    for path in &topology.paths {
        let view = match api.source_device_name(path.source) {
            Ok(v) => v,
            Err(err) => {
                debug!(%err, "source name query failed");
                continue;
            }
        };
        if !names_match(&view, device) {
            continue;
        }
        if target_mode(&topology.modes, path.target).is_some() {
            return Some(CorrelatedPath {
                path: *path,
                target: path.target,
            });
        }
    }
    None
}

/// Geometry-based correlation of a path to a graphics-output handle: the
/// source mode's rectangle resolves to the monitor occupying it.
pub fn output_handle(
    api: &dyn DisplayApi,
    topology: &DisplayTopology,
    path: &DisplayPath,
) -> Option<MonitorHandle> {
    source_rect(&topology.modes, path.source).map(|rect| api.monitor_from_rect(rect))
}
