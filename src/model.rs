use serde::{Deserialize, Serialize};

/// Adapter identity split into the two halves the OS reports it as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdapterId {
    pub high: i32,
    pub low: u32,
}

/// Identity of one path endpoint or mode record: adapter pair plus the
/// per-adapter source/target id. There is no other cross-API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId {
    pub adapter: AdapterId,
    pub id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    pub fn as_hz(&self) -> f32 {
        if self.den == 0 {
            0.0
        } else {
            self.num as f32 / self.den as f32
        }
    }
}

/// Position and size in virtual-screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Physical connector type of a path's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTechnology {
    Hdmi,
    DisplayPort,
    EmbeddedDisplayPort,
    Dvi,
    Internal,
    Unknown,
}

impl OutputTechnology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hdmi => "HDMI",
            Self::DisplayPort => "DisplayPort",
            Self::EmbeddedDisplayPort => "eDP",
            Self::Dvi => "DVI",
            Self::Internal => "Internal",
            Self::Unknown => "Unknown",
        }
    }
}

/// One active output path: a rendering source wired to a physical target.
/// Read-only snapshot, valid for a single enumeration pass.
#[derive(Debug, Clone, Copy)]
pub struct DisplayPath {
    pub source: DeviceId,
    pub target: DeviceId,
    pub refresh: Rational,
    pub technology: OutputTechnology,
}

/// Mode-record payload. Source modes describe the rendered surface,
/// target modes the physical output timing.
#[derive(Debug, Clone, Copy)]
pub enum ModeKind {
    Source(Rect),
    Target,
}

#[derive(Debug, Clone, Copy)]
pub struct ModeRecord {
    pub device: DeviceId,
    pub kind: ModeKind,
}

/// Result of one active-path query: paths and mode records in OS
/// enumeration order.
#[derive(Debug, Clone, Default)]
pub struct DisplayTopology {
    pub paths: Vec<DisplayPath>,
    pub modes: Vec<ModeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HdrStatus {
    Unsupported,
    Off,
    On,
}

impl HdrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::Off => "off",
            Self::On => "on",
        }
    }
}

/// Raw result of the advanced-color query, kept per API generation so the
/// differing on/off semantics stay explicit.
#[derive(Debug, Clone, Copy)]
pub enum RawColorInfo {
    V2 {
        hdr_supported: bool,
        active_mode_hdr: bool,
        bits_per_channel: u32,
    },
    V1 {
        advanced_color_supported: bool,
        advanced_color_enabled: bool,
        wide_color_enforced: bool,
        bits_per_channel: u32,
    },
}

/// Resolved HDR capability of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCapability {
    pub supported: bool,
    pub status: HdrStatus,
    pub bit_depth: u32,
}

impl ColorCapability {
    /// Documented fallback when the query itself fails, not a measured value.
    pub const FALLBACK_BIT_DEPTH: u32 = 8;

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            status: HdrStatus::Unsupported,
            bit_depth: Self::FALLBACK_BIT_DEPTH,
        }
    }

    /// Map a raw query result to the resolved capability.
    ///
    /// The newer generation reports HDR directly; the older one counts as
    /// "on" only while advanced color is enabled and wide color is not
    /// being enforced. Bit depth always comes from the query result.
    pub fn from_raw(raw: RawColorInfo) -> Self {
        match raw {
            RawColorInfo::V2 {
                hdr_supported,
                active_mode_hdr,
                bits_per_channel,
            } => {
                let status = if !hdr_supported {
                    HdrStatus::Unsupported
                } else if active_mode_hdr {
                    HdrStatus::On
                } else {
                    HdrStatus::Off
                };
                Self {
                    supported: hdr_supported,
                    status,
                    bit_depth: bits_per_channel,
                }
            }
            RawColorInfo::V1 {
                advanced_color_supported,
                advanced_color_enabled,
                wide_color_enforced,
                bits_per_channel,
            } => {
                let status = if !advanced_color_supported {
                    HdrStatus::Unsupported
                } else if advanced_color_enabled && !wide_color_enforced {
                    HdrStatus::On
                } else {
                    HdrStatus::Off
                };
                Self {
                    supported: advanced_color_supported,
                    status,
                    bit_depth: bits_per_channel,
                }
            }
        }
    }
}

/// Graphics-subsystem color-space tag, numerically identical to the OS
/// enumeration it is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSpace(pub i32);

impl ColorSpace {
    pub const RGB_FULL_G22_P709: Self = Self(0);
    pub const RGB_FULL_G10_P709: Self = Self(1);
    pub const RGB_STUDIO_G22_P709: Self = Self(2);
    pub const RGB_STUDIO_G22_P2020: Self = Self(3);
    pub const RGB_FULL_G2084_P2020: Self = Self(12);
    pub const RGB_STUDIO_G2084_P2020: Self = Self(14);
    pub const RGB_FULL_G22_P2020: Self = Self(17);

    /// Fixed primaries/transfer label table. Unmapped spaces yield
    /// ("Unknown", "Unknown") and never abort record assembly.
    pub fn labels(self) -> (&'static str, &'static str) {
        match self {
            Self::RGB_FULL_G22_P709 | Self::RGB_STUDIO_G22_P709 => ("BT.709", "sRGB"),
            Self::RGB_FULL_G10_P709 => ("BT.709", "Linear"),
            Self::RGB_FULL_G2084_P2020 | Self::RGB_STUDIO_G2084_P2020 => ("BT.2020", "PQ"),
            Self::RGB_STUDIO_G22_P2020 | Self::RGB_FULL_G22_P2020 => ("BT.2020", "sRGB"),
            _ => ("Unknown", "Unknown"),
        }
    }
}

/// Luminance range and color-space labels read from the graphics
/// subsystem's extended output descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputColorDescriptor {
    pub max_luminance: f32,
    pub min_luminance: f32,
    pub max_full_frame_luminance: f32,
    pub primaries: &'static str,
    pub transfer: &'static str,
}

impl Default for OutputColorDescriptor {
    fn default() -> Self {
        Self {
            max_luminance: 0.0,
            min_luminance: 0.0,
            max_full_frame_luminance: 0.0,
            primaries: "Unknown",
            transfer: "Unknown",
        }
    }
}

/// The canonical reconciled description of one physical display.
///
/// Field order is the serialized field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub name: String,
    /// Target id rendered as a decimal string, the only stable
    /// cross-call key.
    pub uid: String,
    #[serde(rename = "current")]
    pub is_current: bool,
    pub hdr_supported: bool,
    pub hdr_status: HdrStatus,
    pub width: u32,
    pub height: u32,
    pub refresh_rate: f32,
    pub bit_depth: u32,
    pub primaries: String,
    pub transfer: String,
    pub max_luminance: f32,
    pub min_luminance: f32,
    pub max_full_frame_luminance: f32,
    pub technology: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v2_maps_hdr_support_and_active_mode() {
        let cap = ColorCapability::from_raw(RawColorInfo::V2 {
            hdr_supported: true,
            active_mode_hdr: true,
            bits_per_channel: 10,
        });
        assert_eq!(
            cap,
            ColorCapability {
                supported: true,
                status: HdrStatus::On,
                bit_depth: 10
            }
        );

        let cap = ColorCapability::from_raw(RawColorInfo::V2 {
            hdr_supported: true,
            active_mode_hdr: false,
            bits_per_channel: 10,
        });
        assert_eq!(cap.status, HdrStatus::Off);
        assert!(cap.supported);
    }

    #[test]
    fn v2_unsupported_keeps_queried_bit_depth() {
        let cap = ColorCapability::from_raw(RawColorInfo::V2 {
            hdr_supported: false,
            active_mode_hdr: false,
            bits_per_channel: 8,
        });
        assert_eq!(cap.status, HdrStatus::Unsupported);
        assert!(!cap.supported);
        assert_eq!(cap.bit_depth, 8);
    }

    #[test]
    fn v1_wide_color_enforcement_reads_as_off() {
        let on = ColorCapability::from_raw(RawColorInfo::V1 {
            advanced_color_supported: true,
            advanced_color_enabled: true,
            wide_color_enforced: false,
            bits_per_channel: 10,
        });
        assert_eq!(on.status, HdrStatus::On);

        let enforced = ColorCapability::from_raw(RawColorInfo::V1 {
            advanced_color_supported: true,
            advanced_color_enabled: true,
            wide_color_enforced: true,
            bits_per_channel: 10,
        });
        assert_eq!(enforced.status, HdrStatus::Off);
        assert!(enforced.supported);
    }

    #[test]
    fn fallback_capability_is_eight_bit_unsupported() {
        let cap = ColorCapability::unsupported();
        assert!(!cap.supported);
        assert_eq!(cap.status, HdrStatus::Unsupported);
        assert_eq!(cap.bit_depth, 8);
    }

    #[test]
    fn color_space_label_table() {
        assert_eq!(ColorSpace::RGB_FULL_G22_P709.labels(), ("BT.709", "sRGB"));
        assert_eq!(ColorSpace::RGB_STUDIO_G22_P709.labels(), ("BT.709", "sRGB"));
        assert_eq!(ColorSpace::RGB_FULL_G10_P709.labels(), ("BT.709", "Linear"));
        assert_eq!(ColorSpace::RGB_FULL_G2084_P2020.labels(), ("BT.2020", "PQ"));
        assert_eq!(ColorSpace::RGB_STUDIO_G2084_P2020.labels(), ("BT.2020", "PQ"));
        assert_eq!(ColorSpace::RGB_FULL_G22_P2020.labels(), ("BT.2020", "sRGB"));
    }

    #[test]
    fn unmapped_color_space_is_unknown() {
        assert_eq!(ColorSpace(9).labels(), ("Unknown", "Unknown"));
        assert_eq!(ColorSpace(-1).labels(), ("Unknown", "Unknown"));
    }

    #[test]
    fn refresh_rate_handles_zero_denominator() {
        assert_eq!(Rational { num: 60000, den: 0 }.as_hz(), 0.0);
        assert_eq!(Rational { num: 120000, den: 1000 }.as_hz(), 120.0);
    }

    #[test]
    fn hdr_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&HdrStatus::On).unwrap(), "\"on\"");
        assert_eq!(serde_json::to_string(&HdrStatus::Off).unwrap(), "\"off\"");
        assert_eq!(
            serde_json::to_string(&HdrStatus::Unsupported).unwrap(),
            "\"unsupported\""
        );
    }
}
