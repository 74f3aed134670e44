//! HDR capability resolution and the enable/disable/toggle sequence.

use tracing::debug;

use crate::api::DisplayApi;
use crate::error::BridgeError;
use crate::model::{ColorCapability, DeviceId, HdrStatus};

/// A requested state change for the current display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HdrRequest {
    On,
    Off,
    Toggle,
}

impl HdrRequest {
    /// Parse the optional command argument; no argument means toggle,
    /// anything besides "on"/"off" is rejected.
    pub fn parse(arg: Option<&str>) -> Option<Self> {
        match arg {
            None => Some(Self::Toggle),
            Some("on") => Some(Self::On),
            Some("off") => Some(Self::Off),
            Some(_) => None,
        }
    }
}

/// Outcome of one state-change request, both sides re-read from the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HdrTransition {
    pub previous: HdrStatus,
    pub current: HdrStatus,
}

impl HdrTransition {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Resolve the capability of a target mode identity. A failed query
/// degrades to the unsupported fallback instead of propagating.
pub fn resolve_capability(api: &dyn DisplayApi, target: DeviceId) -> ColorCapability {
    match api.color_info(target) {
        Ok(raw) => ColorCapability::from_raw(raw),
        Err(err) => {
            debug!(%err, "advanced color query failed");
            ColorCapability::unsupported()
        }
    }
}

/// Drive one request through the set-state call.
///
/// An unsupported display fails before any mutation. After a successful
/// set call the capability is re-resolved and that re-read, not the call's
/// return code, is the authoritative new state.
pub fn request_transition(
    api: &dyn DisplayApi,
    target: DeviceId,
    request: HdrRequest,
) -> Result<HdrTransition, BridgeError> {
    let before = resolve_capability(api, target);
    if before.status == HdrStatus::Unsupported {
        return Err(BridgeError::HdrUnsupported);
    }

    let enable = match request {
        HdrRequest::On => true,
        HdrRequest::Off => false,
        HdrRequest::Toggle => before.status != HdrStatus::On,
    };

    debug!(enable, "setting HDR state");
    api.set_color_state(target, enable)?;

    let after = resolve_capability(api, target);
    Ok(HdrTransition {
        previous: before.status,
        current: after.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{device, dual_display_api};

    const HDR_TARGET: u32 = 100;
    const SDR_TARGET: u32 = 101;

    #[test]
    fn command_argument_parsing() {
        assert_eq!(HdrRequest::parse(None), Some(HdrRequest::Toggle));
        assert_eq!(HdrRequest::parse(Some("on")), Some(HdrRequest::On));
        assert_eq!(HdrRequest::parse(Some("off")), Some(HdrRequest::Off));
        assert_eq!(HdrRequest::parse(Some("auto")), None);
    }

    #[test]
    fn unsupported_display_is_rejected_without_mutation() {
        let api = dual_display_api();
        let err = request_transition(&api, device(0, SDR_TARGET), HdrRequest::On).unwrap_err();
        assert!(matches!(err, BridgeError::HdrUnsupported));
        assert!(api.set_calls.lock().is_empty());
    }

    #[test]
    fn toggle_flips_the_active_state() {
        let api = dual_display_api();

        // The HDR display starts with the mode active.
        let transition =
            request_transition(&api, device(0, HDR_TARGET), HdrRequest::Toggle).unwrap();
        assert_eq!(transition.previous, HdrStatus::On);
        assert_eq!(transition.current, HdrStatus::Off);
        assert!(transition.changed());
        assert_eq!(*api.set_calls.lock(), vec![(device(0, HDR_TARGET), false)]);

        let transition =
            request_transition(&api, device(0, HDR_TARGET), HdrRequest::Toggle).unwrap();
        assert_eq!(transition.current, HdrStatus::On);
    }

    #[test]
    fn repeated_enable_settles_without_a_second_transition() {
        let api = dual_display_api();
        api.color.lock().get_mut(&device(0, HDR_TARGET)).unwrap().enabled = false;

        let first = request_transition(&api, device(0, HDR_TARGET), HdrRequest::On).unwrap();
        assert_eq!(first.current, HdrStatus::On);
        assert!(first.changed());

        let second = request_transition(&api, device(0, HDR_TARGET), HdrRequest::On).unwrap();
        assert_eq!(second.current, HdrStatus::On);
        assert!(!second.changed());

        // Both requests reached the OS, only the first moved hardware state.
        assert_eq!(api.set_calls.lock().len(), 2);
        assert_eq!(*api.transitions.lock(), 1);
    }

    #[test]
    fn failed_set_call_leaves_state_untouched() {
        let mut api = dual_display_api();
        api.fail_set = true;

        let err = request_transition(&api, device(0, HDR_TARGET), HdrRequest::Off).unwrap_err();
        assert!(matches!(err, BridgeError::OsCallFailed { .. }));
        assert_eq!(*api.transitions.lock(), 0);
        assert_eq!(
            resolve_capability(&api, device(0, HDR_TARGET)).status,
            HdrStatus::On
        );
    }

    #[test]
    fn accepted_set_call_is_not_trusted_over_the_requery() {
        let mut api = dual_display_api();
        api.ignore_set = true;

        // The set call reports success but the display never leaves HDR.
        let transition =
            request_transition(&api, device(0, HDR_TARGET), HdrRequest::Off).unwrap();
        assert_eq!(transition.previous, HdrStatus::On);
        assert_eq!(transition.current, HdrStatus::On);
        assert!(!transition.changed());
    }

    #[test]
    fn query_failure_degrades_to_unsupported() {
        let api = dual_display_api();
        let cap = resolve_capability(&api, device(9, 9));
        assert_eq!(cap, ColorCapability::unsupported());
    }
}
