use crate::error::Result;
use crate::model::{DeviceId, DisplayTopology, OutputColorDescriptor, RawColorInfo, Rect};

/// Window-manager window handle, stored as an opaque integer so it can
/// cross threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle(pub isize);

/// OS monitor handle, stored as an opaque integer so it can cross threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorHandle(pub isize);

/// Everything the engine needs from the operating system.
///
/// The live implementation wraps the Windows display-configuration,
/// monitor, and graphics-output APIs; tests drive the engine through a
/// scripted mock. All calls are synchronous and unbounded by timeouts.
pub trait DisplayApi: Send + Sync {
    /// Active paths and their mode records, in OS enumeration order.
    fn query_topology(&self) -> Result<DisplayTopology>;

    /// View device name of a path's source endpoint.
    fn source_device_name(&self, source: DeviceId) -> Result<String>;

    /// Friendly monitor name of a path's target endpoint.
    fn target_friendly_name(&self, target: DeviceId) -> Result<String>;

    /// Raw advanced-color state of a target mode identity.
    fn color_info(&self, target: DeviceId) -> Result<RawColorInfo>;

    /// Request the HDR/advanced-color state of a target. Success of the
    /// call is not proof of the resulting state; callers re-query.
    fn set_color_state(&self, target: DeviceId, enable: bool) -> Result<()>;

    /// Nearest-monitor resolution for a window. Never fails.
    fn monitor_from_window(&self, window: WindowHandle) -> MonitorHandle;

    /// Nearest-monitor resolution for a virtual-screen rectangle.
    fn monitor_from_rect(&self, rect: Rect) -> MonitorHandle;

    /// View device name of a monitor handle.
    fn monitor_device_name(&self, monitor: MonitorHandle) -> Result<String>;

    /// Extended luminance/color-space descriptor of the graphics output
    /// attached to `monitor`.
    fn output_descriptor(&self, monitor: MonitorHandle) -> Result<OutputColorDescriptor>;
}
