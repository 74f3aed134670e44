//! Boundary to the hosting media player: the property store and text
//! channel the bridge publishes into, and the notifications it receives.

/// Property names published to the host property store. All values are
/// strings at this boundary.
pub mod props {
    pub const DISPLAY_LIST_FULL: &str = "display-list/full";
    pub const DISPLAY_LIST_CURRENT: &str = "display-list/current";

    pub const INFO_NAME: &str = "display-info/name";
    pub const INFO_UID: &str = "display-info/uid";
    pub const INFO_HDR_SUPPORTED: &str = "display-info/hdr-supported";
    pub const INFO_HDR_STATUS: &str = "display-info/hdr-status";
    pub const INFO_BIT_DEPTH: &str = "display-info/bit-depth";
    pub const INFO_REFRESH_RATE: &str = "display-info/refresh-rate";
    pub const INFO_MAX_LUMINANCE: &str = "display-info/max-luminance";
    pub const INFO_MIN_LUMINANCE: &str = "display-info/min-luminance";
    pub const INFO_MAX_FULL_FRAME_LUMINANCE: &str = "display-info/max-full-frame-luminance";
    pub const INFO_PRIMARIES: &str = "display-info/primaries";
    pub const INFO_TRANSFER: &str = "display-info/transfer";
}

/// Host-side sinks. The host owns the transport; the bridge only writes.
pub trait HostSink: Send + Sync {
    /// Store a string-valued property.
    fn set_property(&self, name: &str, value: &str);

    /// Print a line on the host's user-visible text channel.
    fn print_text(&self, line: &str);
}

/// Notifications the host dispatcher forwards to the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The tracked media-player window handle changed.
    WindowChanged(i64),
    /// The set of active displays changed.
    DisplaysChanged,
    /// A multi-argument command message addressed to the bridge.
    ClientMessage(Vec<String>),
}
