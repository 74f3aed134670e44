//! Long-lived engine context tying the OS facade to the host: event
//! dispatch, snapshot publication, and the toggle command path.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::api::{DisplayApi, WindowHandle};
use crate::correlate;
use crate::error::BridgeError;
use crate::hdr::{self, HdrRequest};
use crate::host::{props, HostEvent, HostSink};
use crate::model::HdrStatus;
use crate::snapshot::{self, Snapshot, SNAPSHOT_LIMIT};

const COMMAND: &str = "toggle-hdr-display";
const USER_PREFIX: &str = "[display-info]";

/// The only long-lived state: the OS facade, the host sinks, and the
/// tracked window handle. Every snapshot is rebuilt from scratch.
pub struct DisplayBridge {
    api: Arc<dyn DisplayApi>,
    host: Arc<dyn HostSink>,
    // Written by the host dispatcher, read by the display watcher.
    window: Mutex<Option<WindowHandle>>,
}

impl DisplayBridge {
    pub fn new(api: Arc<dyn DisplayApi>, host: Arc<dyn HostSink>) -> Self {
        Self {
            api,
            host,
            window: Mutex::new(None),
        }
    }

    /// Thin dispatcher for host-delivered notifications. Each call runs
    /// to completion before the host dequeues the next one.
    pub fn handle_event(&self, event: HostEvent) {
        match event {
            HostEvent::WindowChanged(wid) if wid > 0 => {
                *self.window.lock() = Some(WindowHandle(wid as isize));
                debug!(wid, "tracked window updated");
                self.refresh();
            }
            HostEvent::WindowChanged(_) => {}
            HostEvent::DisplaysChanged => {
                debug!("display set changed");
                self.refresh();
            }
            HostEvent::ClientMessage(args) => self.handle_message(&args),
        }
    }

    pub fn tracked_window(&self) -> Option<WindowHandle> {
        *self.window.lock()
    }

    /// Re-run the full synthesis pass and publish the result.
    pub fn refresh(&self) {
        let snapshot = snapshot::synthesize(self.api.as_ref(), self.tracked_window());
        self.publish(&snapshot);
    }

    fn publish(&self, snapshot: &Snapshot) {
        let rendered = snapshot.render(SNAPSHOT_LIMIT);
        self.host.set_property(props::DISPLAY_LIST_FULL, &rendered.full);
        self.host
            .set_property(props::DISPLAY_LIST_CURRENT, &rendered.current);

        if let Some(record) = snapshot.current.as_ref() {
            let set = |name, value: &str| self.host.set_property(name, value);
            set(props::INFO_NAME, &record.name);
            set(props::INFO_UID, &record.uid);
            set(
                props::INFO_HDR_SUPPORTED,
                if record.hdr_supported { "true" } else { "false" },
            );
            set(props::INFO_HDR_STATUS, record.hdr_status.as_str());
            set(props::INFO_BIT_DEPTH, &record.bit_depth.to_string());
            set(props::INFO_REFRESH_RATE, &format!("{:.2}", record.refresh_rate));
            set(
                props::INFO_MAX_LUMINANCE,
                &format!("{:.2}", record.max_luminance),
            );
            set(
                props::INFO_MIN_LUMINANCE,
                &format!("{:.2}", record.min_luminance),
            );
            set(
                props::INFO_MAX_FULL_FRAME_LUMINANCE,
                &format!("{:.2}", record.max_full_frame_luminance),
            );
            set(props::INFO_PRIMARIES, &record.primaries);
            set(props::INFO_TRANSFER, &record.transfer);

            self.diag(&format!(
                "Display: {}, HDR: {}",
                record.name,
                record.hdr_status.as_str()
            ));
        }

        if rendered.truncated {
            self.diag("display list truncated at size ceiling");
        }
    }

    fn handle_message(&self, args: &[String]) {
        let Some(cmd) = args.first() else { return };
        if cmd != COMMAND {
            return;
        }

        match HdrRequest::parse(args.get(1).map(String::as_str)) {
            Some(request) => self.toggle(request),
            None => self.user("Invalid argument. Use: toggle-hdr-display [on|off]"),
        }
    }

    /// Correlate the current display, drive the transition, then rebuild
    /// the snapshot so observers never see pre-toggle state reported as
    /// the command's outcome.
    pub fn toggle(&self, request: HdrRequest) {
        let correlated = self
            .tracked_window()
            .and_then(|window| correlate::current_path(self.api.as_ref(), window));
        let Some(correlated) = correlated else {
            self.user("Failed to get display mode for toggle");
            return;
        };

        match hdr::request_transition(self.api.as_ref(), correlated.target, request) {
            Ok(transition) => {
                self.refresh();
                let state = if transition.current == HdrStatus::On {
                    "enabled"
                } else {
                    "disabled"
                };
                self.user(&format!("HDR {state}"));
            }
            Err(BridgeError::HdrUnsupported) => {
                self.user("HDR unsupported, cannot toggle");
            }
            Err(err) => {
                warn!(%err, "HDR state change failed");
                self.user("Failed to change HDR status");
            }
        }
    }

    fn user(&self, line: &str) {
        self.host.print_text(&format!("{USER_PREFIX} {line}"));
    }

    /// Diagnostics reach the host text channel only in debug builds; the
    /// tracing event is emitted either way.
    fn diag(&self, line: &str) {
        debug!("{line}");
        if cfg!(debug_assertions) {
            self.host.print_text(&format!("{USER_PREFIX} {line}"));
        }
    }
}
