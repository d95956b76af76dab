use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Best-effort local address for building shareable URLs.
///
/// Connecting a UDP socket to a public address makes the OS pick the
/// outbound interface without sending a packet; the socket's local address
/// is then the one other devices on the network can reach. Falls back to
/// loopback when the machine has no route.
pub fn local_ip() -> IpAddr {
    routable_ip().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn routable_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    Some(socket.local_addr().ok()?.ip())
}
