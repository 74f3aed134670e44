//! Runs the full correlation pipeline over every active path and renders
//! the result into the bounded serialized form handed to the host.

use tracing::{debug, warn};

use crate::api::{DisplayApi, WindowHandle};
use crate::correlate;
use crate::error::BridgeError;
use crate::hdr;
use crate::model::DisplayRecord;

/// Hard ceiling for the serialized full display list, in bytes.
pub const SNAPSHOT_LIMIT: usize = 8192;

/// One synthesis pass: every canonical record in OS path order, plus the
/// singled-out record for the display under the tracked window.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub records: Vec<DisplayRecord>,
    pub current: Option<DisplayRecord>,
}

/// Serialized snapshot. `truncated` reports that the record list was cut
/// at the size ceiling; publishing still proceeds.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSnapshot {
    pub full: String,
    pub current: String,
    pub truncated: bool,
}

/// Build a snapshot from scratch. Per-path failures degrade that record
/// to placeholder data; only a failed topology query empties the pass.
pub fn synthesize(api: &dyn DisplayApi, window: Option<WindowHandle>) -> Snapshot {
    let topology = match api.query_topology() {
        Ok(t) => t,
        Err(err) => {
            warn!(%err, "active path query failed");
            return Snapshot::default();
        }
    };

    // Device name of the monitor under the tracked window, if any.
    let current_device = window.and_then(|w| {
        let monitor = api.monitor_from_window(w);
        match api.monitor_device_name(monitor) {
            Ok(name) => Some(name),
            Err(err) => {
                debug!(%err, "monitor info query failed");
                None
            }
        }
    });

    let mut records = Vec::with_capacity(topology.paths.len());
    let mut current: Option<DisplayRecord> = None;

    for path in &topology.paths {
        if correlate::target_mode(&topology.modes, path.target).is_none() {
            debug!(target_id = path.target.id, "active path without target mode, skipped");
            continue;
        }

        let name = match api.target_friendly_name(path.target) {
            Ok(n) if !n.is_empty() => n,
            Ok(_) => "Unknown".to_string(),
            Err(err) => {
                debug!(%err, "target name query failed");
                "Unknown".to_string()
            }
        };

        let capability = hdr::resolve_capability(api, path.target);

        let (width, height, refresh_rate) =
            match correlate::source_rect(&topology.modes, path.source) {
                Some(rect) => (rect.width, rect.height, path.refresh.as_hz()),
                None => (0, 0, 0.0),
            };

        let descriptor = correlate::output_handle(api, &topology, path)
            .and_then(|monitor| match api.output_descriptor(monitor) {
                Ok(d) => Some(d),
                Err(err) => {
                    debug!(%err, "output descriptor query failed");
                    None
                }
            })
            .unwrap_or_default();

        let is_current = current.is_none() && is_path_current(api, path, &current_device);

        let record = DisplayRecord {
            name,
            uid: path.target.id.to_string(),
            is_current,
            hdr_supported: capability.supported,
            hdr_status: capability.status,
            width,
            height,
            refresh_rate,
            bit_depth: capability.bit_depth,
            primaries: descriptor.primaries.to_string(),
            transfer: descriptor.transfer.to_string(),
            max_luminance: descriptor.max_luminance,
            min_luminance: descriptor.min_luminance,
            max_full_frame_luminance: descriptor.max_full_frame_luminance,
            technology: path.technology.as_str().to_string(),
        };

        if is_current {
            current = Some(record.clone());
        }
        records.push(record);
    }

    Snapshot { records, current }
}

fn is_path_current(
    api: &dyn DisplayApi,
    path: &crate::model::DisplayPath,
    current_device: &Option<String>,
) -> bool {
    let Some(device) = current_device.as_deref() else {
        return false;
    };
    match api.source_device_name(path.source) {
        Ok(view) => correlate::names_match(&view, device),
        Err(err) => {
            debug!(%err, "source name query failed");
            false
        }
    }
}

/// Append-only JSON array builder with a hard byte ceiling. A record that
/// would not fit is dropped whole together with everything after it, so a
/// dangling open record is never emitted.
struct BoundedListWriter {
    buf: String,
    limit: usize,
}

impl BoundedListWriter {
    fn new(limit: usize) -> Self {
        Self {
            buf: String::from("["),
            limit,
        }
    }

    fn push(&mut self, record: &str) -> Result<(), BridgeError> {
        let sep = usize::from(self.buf.len() > 1);
        // One byte stays reserved for the closing bracket.
        if self.buf.len() + sep + record.len() + 1 > self.limit {
            return Err(BridgeError::BufferExceeded { limit: self.limit });
        }
        if sep == 1 {
            self.buf.push(',');
        }
        self.buf.push_str(record);
        Ok(())
    }

    fn finish(mut self) -> String {
        self.buf.push(']');
        self.buf
    }
}

impl Snapshot {
    /// Serialize the record list under `limit` bytes, plus the standalone
    /// current record ("{}" when none matched).
    pub fn render(&self, limit: usize) -> RenderedSnapshot {
        let mut writer = BoundedListWriter::new(limit);
        let mut truncated = false;

        for record in &self.records {
            let json = match serde_json::to_string(record) {
                Ok(j) => j,
                Err(err) => {
                    warn!(%err, "record serialization failed");
                    continue;
                }
            };
            if let Err(err) = writer.push(&json) {
                warn!(%err, "display list truncated");
                truncated = true;
                break;
            }
        }

        let current = self
            .current
            .as_ref()
            .and_then(|r| serde_json::to_string(r).ok())
            .unwrap_or_else(|| "{}".to_string());

        RenderedSnapshot {
            full: writer.finish(),
            current,
            truncated,
        }
    }
}
