//! Reports and controls the HDR/color state of the display a media-player
//! window occupies, and publishes a canonical list of all active displays
//! with their color capabilities to the host's property store.
//!
//! Three loosely-coupled OS descriptions of the same monitor (window
//! handle, active path/mode records, graphics-output handle) are
//! reconciled per pass; nothing but the tracked window handle outlives
//! one pass.

pub mod api;
pub mod bridge;
pub mod correlate;
pub mod diag;
pub mod error;
pub mod hdr;
pub mod host;
pub mod model;
pub mod snapshot;

#[cfg(windows)]
pub mod displayconfig;
#[cfg(windows)]
pub mod monitor;
#[cfg(windows)]
pub mod watcher;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::{DisplayApi, MonitorHandle, WindowHandle};
pub use bridge::DisplayBridge;
pub use error::BridgeError;
pub use hdr::{HdrRequest, HdrTransition};
pub use host::{HostEvent, HostSink};
pub use model::{ColorCapability, DisplayRecord, HdrStatus, OutputColorDescriptor};
pub use snapshot::{RenderedSnapshot, Snapshot, SNAPSHOT_LIMIT};

#[cfg(windows)]
pub use displayconfig::WindowsDisplayApi;
