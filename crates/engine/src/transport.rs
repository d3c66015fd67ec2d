//! USB transport: discovery, interface claiming, bulk endpoint I/O
//!
//! Runs entirely on the USB worker thread. Discovery walks every attached
//! device, opens what it can, and claims the first interface presenting
//! both a bulk IN and a bulk OUT endpoint; per-device and per-interface
//! failures are logged and skipped, and only an exhausted bus surfaces as
//! an error. On success exactly one device/interface/endpoint pair is left
//! open and claimed; every other path releases what it touched.

use common::UsbFault;
use protocol::DeviceSummary;
use rusb::{Context, DeviceHandle, Direction, TransferType, UsbContext};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A claimed MTP-capable device with its selected bulk endpoint pair
pub struct MtpTransport {
    handle: DeviceHandle<Context>,
    interface: u8,
    endpoint_in: u8,
    endpoint_out: u8,
    summary: DeviceSummary,
}

impl MtpTransport {
    /// Summary of the claimed device
    pub fn summary(&self) -> &DeviceSummary {
        &self.summary
    }

    /// Write one buffer to the bulk OUT endpoint
    pub fn write(&self, data: &[u8], timeout: Duration) -> Result<usize, UsbFault> {
        self.handle
            .write_bulk(self.endpoint_out, data, timeout)
            .map_err(map_rusb_fault)
    }

    /// Read into a fixed-capacity buffer from the bulk IN endpoint
    ///
    /// Returns however many bytes the device produced, truncated to the
    /// transferred length; short reads are a caller-level concern (the
    /// compatibility layer interprets them).
    pub fn read(&self, capacity: usize, timeout: Duration) -> Result<Vec<u8>, UsbFault> {
        let mut buffer = vec![0u8; capacity];
        let len = self
            .handle
            .read_bulk(self.endpoint_in, &mut buffer, timeout)
            .map_err(map_rusb_fault)?;
        buffer.truncate(len);
        Ok(buffer)
    }
}

impl Drop for MtpTransport {
    fn drop(&mut self) {
        match self.handle.release_interface(self.interface) {
            Ok(()) => debug!("released interface {}", self.interface),
            Err(e) => warn!("failed to release interface {}: {}", self.interface, e),
        }
    }
}

/// Scan the bus and claim the first device with a bulk endpoint pair
///
/// `filters` optionally narrows the scan to `"vid:pid"` hex pairs; an empty
/// list considers every attached device.
pub fn discover_and_claim(filters: &[String]) -> Result<MtpTransport, UsbFault> {
    let context = Context::new().map_err(map_rusb_fault)?;
    let devices = context.devices().map_err(map_rusb_fault)?;

    for device in devices.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(d) => d,
            Err(e) => {
                debug!("skipping device without descriptor: {}", e);
                continue;
            }
        };
        let vid = descriptor.vendor_id();
        let pid = descriptor.product_id();

        if !matches_filter(vid, pid, filters) {
            debug!("device {:04x}:{:04x} excluded by filter", vid, pid);
            continue;
        }

        let handle = match device.open() {
            Ok(h) => h,
            Err(e) => {
                debug!("cannot open device {:04x}:{:04x}: {}", vid, pid, e);
                continue;
            }
        };

        let config = match device.active_config_descriptor() {
            Ok(c) => c,
            Err(e) => {
                debug!("no active config for {:04x}:{:04x}: {}", vid, pid, e);
                continue;
            }
        };

        for interface in config.interfaces() {
            let number = interface.number();

            if let Err(e) = handle.claim_interface(number) {
                debug!("cannot claim interface {} on {:04x}:{:04x}: {}", number, vid, pid, e);
                continue;
            }

            if let Some((endpoint_in, endpoint_out)) = find_bulk_pair(&interface) {
                let name = read_device_name(&handle, &descriptor)
                    .unwrap_or_else(|| format!("MTP Device ({:04x}:{:04x})", vid, pid));
                info!(
                    "claimed {:?} ({:04x}:{:04x}) interface {}, endpoints in={:#04x} out={:#04x}",
                    name, vid, pid, number, endpoint_in, endpoint_out
                );

                return Ok(MtpTransport {
                    handle,
                    interface: number,
                    endpoint_in,
                    endpoint_out,
                    summary: DeviceSummary {
                        name,
                        vendor_id: vid,
                        product_id: pid,
                    },
                });
            }

            // No bulk pair on this interface; give the claim back before
            // trying the next one
            if let Err(e) = handle.release_interface(number) {
                debug!("failed to release unmatched interface {}: {}", number, e);
            }
        }

        // Handle drops here, closing the device before the next candidate
        debug!("device {:04x}:{:04x} has no bulk endpoint pair", vid, pid);
    }

    Err(UsbFault::NotFound)
}

/// First bulk IN and bulk OUT endpoint addresses on an interface
fn find_bulk_pair(interface: &rusb::Interface<'_>) -> Option<(u8, u8)> {
    for descriptor in interface.descriptors() {
        let mut endpoint_in = None;
        let mut endpoint_out = None;

        for endpoint in descriptor.endpoint_descriptors() {
            if endpoint.transfer_type() != TransferType::Bulk {
                continue;
            }
            match endpoint.direction() {
                Direction::In if endpoint_in.is_none() => endpoint_in = Some(endpoint.address()),
                Direction::Out if endpoint_out.is_none() => endpoint_out = Some(endpoint.address()),
                _ => {}
            }
        }

        if let (Some(ep_in), Some(ep_out)) = (endpoint_in, endpoint_out) {
            return Some((ep_in, ep_out));
        }
    }
    None
}

/// Best-effort product string descriptor read
fn read_device_name(
    handle: &DeviceHandle<Context>,
    descriptor: &rusb::DeviceDescriptor,
) -> Option<String> {
    descriptor
        .product_string_index()
        .and_then(|idx| handle.read_string_descriptor_ascii(idx).ok())
        .filter(|name| !name.trim().is_empty())
}

/// Check a VID/PID pair against `"vid:pid"` hex filters
///
/// No filters means every device is a candidate. Malformed filter entries
/// never match.
fn matches_filter(vid: u16, pid: u16, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }

    filters.iter().any(|filter| {
        let Some((filter_vid, filter_pid)) = filter.split_once(':') else {
            return false;
        };
        u16::from_str_radix(filter_vid.trim_start_matches("0x"), 16) == Ok(vid)
            && u16::from_str_radix(filter_pid.trim_start_matches("0x"), 16) == Ok(pid)
    })
}

/// Map rusb errors to channel-crossing fault kinds
pub fn map_rusb_fault(err: rusb::Error) -> UsbFault {
    match err {
        rusb::Error::Timeout => UsbFault::Timeout,
        rusb::Error::NoDevice => UsbFault::NoDevice,
        rusb::Error::NotFound => UsbFault::NotFound,
        rusb::Error::Access => UsbFault::Access,
        rusb::Error::Pipe => UsbFault::Pipe,
        other => UsbFault::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_rusb_fault() {
        assert_eq!(map_rusb_fault(rusb::Error::Timeout), UsbFault::Timeout);
        assert_eq!(map_rusb_fault(rusb::Error::NoDevice), UsbFault::NoDevice);
        assert_eq!(map_rusb_fault(rusb::Error::Access), UsbFault::Access);
        assert!(matches!(
            map_rusb_fault(rusb::Error::Busy),
            UsbFault::Other(_)
        ));
    }

    #[test]
    fn test_filter_matching() {
        let filters = vec!["057e:2000".to_string(), "0x1234:0xabcd".to_string()];

        assert!(matches_filter(0x057e, 0x2000, &filters));
        assert!(matches_filter(0x1234, 0xabcd, &filters));
        assert!(!matches_filter(0x057e, 0x2001, &filters));
        assert!(matches_filter(0xffff, 0xffff, &[]));
    }

    #[test]
    fn test_malformed_filter_never_matches() {
        let filters = vec!["garbage".to_string(), "1:2:3".to_string()];
        assert!(!matches_filter(0x0001, 0x0002, &filters));
    }
}
