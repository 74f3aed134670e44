//! Graphics-subsystem output augmentation: walks every adapter's outputs
//! to the one attached to a monitor handle and reads its extended
//! luminance/color-space descriptor.

use tracing::debug;
use windows::core::Interface;
use windows::Win32::Graphics::Dxgi::{CreateDXGIFactory1, IDXGIFactory1, IDXGIOutput6};

use crate::api::MonitorHandle;
use crate::error::{BridgeError, Result};
use crate::model::{ColorSpace, OutputColorDescriptor};

/// Find the output whose OS monitor handle equals `monitor` and read its
/// extended descriptor. Any miss along the way is `NotFound`; callers
/// substitute zeroed luminance and Unknown labels.
pub fn output_descriptor(monitor: MonitorHandle) -> Result<OutputColorDescriptor> {
    let factory: IDXGIFactory1 = unsafe { CreateDXGIFactory1() }.map_err(|e| {
        BridgeError::OsCallFailed {
            call: "CreateDXGIFactory1",
            code: e.code().0,
        }
    })?;

    let mut adapter_index = 0u32;
    while let Ok(adapter) = unsafe { factory.EnumAdapters1(adapter_index) } {
        adapter_index += 1;

        let mut output_index = 0u32;
        while let Ok(output) = unsafe { adapter.EnumOutputs(output_index) } {
            output_index += 1;

            let desc = match unsafe { output.GetDesc() } {
                Ok(d) => d,
                Err(err) => {
                    debug!(%err, "output description query failed");
                    continue;
                }
            };
            if desc.Monitor.0 as isize != monitor.0 {
                continue;
            }

            // The extended interface is not available on every output.
            let output6: IDXGIOutput6 = output.cast().map_err(|err| {
                debug!(%err, "extended output interface unavailable");
                BridgeError::NotFound
            })?;
            let desc1 = unsafe { output6.GetDesc1() }.map_err(|e| BridgeError::OsCallFailed {
                call: "IDXGIOutput6::GetDesc1",
                code: e.code().0,
            })?;

            let (primaries, transfer) = ColorSpace(desc1.ColorSpace.0).labels();
            return Ok(OutputColorDescriptor {
                max_luminance: desc1.MaxLuminance,
                min_luminance: desc1.MinLuminance,
                max_full_frame_luminance: desc1.MaxFullFrameLuminance,
                primaries,
                transfer,
            });
        }
    }

    Err(BridgeError::NotFound)
}
