//! Control-IP liveness check.
//!
//! The server only binds once the configured control address is assigned to
//! a local interface that is administratively up.

use std::net::{IpAddr, Ipv4Addr};

use anyhow::{Context, Result};
use nix::ifaddrs::getifaddrs;
use nix::net::if_::InterfaceFlags;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlIpState {
    /// Assigned to this interface, which is up.
    Up(String),
    /// Assigned to this interface, which is down.
    Down(String),
    /// Not assigned to any local interface.
    Absent,
}

/// Look up `ip` among the local interface addresses.
///
/// Unspecified addresses (`0.0.0.0`, `::`) always count as up.
pub fn control_ip_state(ip: IpAddr) -> Result<ControlIpState> {
    if ip.is_unspecified() {
        return Ok(ControlIpState::Up("*".to_string()));
    }

    let addrs = getifaddrs().context("getifaddrs failed")?;
    let entries = addrs.map(|ifa| {
        let addr = ifa.address.as_ref().and_then(|a| {
            if let Some(sin) = a.as_sockaddr_in() {
                Some(IpAddr::V4(Ipv4Addr::from(sin.ip())))
            } else {
                a.as_sockaddr_in6().map(|sin6| IpAddr::V6(sin6.ip()))
            }
        });
        (
            ifa.interface_name,
            ifa.flags.contains(InterfaceFlags::IFF_UP),
            addr,
        )
    });

    Ok(match_interface(ip, entries))
}

fn match_interface<I>(ip: IpAddr, entries: I) -> ControlIpState
where
    I: IntoIterator<Item = (String, bool, Option<IpAddr>)>,
{
    entries
        .into_iter()
        .find(|(_, _, addr)| *addr == Some(ip))
        .map(|(name, up, _)| {
            if up {
                ControlIpState::Up(name)
            } else {
                ControlIpState::Down(name)
            }
        })
        .unwrap_or(ControlIpState::Absent)
}
