//! UDP datagram sender: one datagram per mutation, to a fixed host:port.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use crate::error::Result;
use crate::universe::DmxUniverse;

/// Default overlay UDP port (§6).
pub const DEFAULT_PORT: u16 = 19001;
/// Default overlay host (§6).
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Sends one [`DmxUniverse`] datagram per mutation over UDP.
pub struct DmxClient {
    socket: UdpSocket,
    target: SocketAddr,
    max_devices: usize,
}

impl DmxClient {
    /// Bind an ephemeral local socket and target `host:port`.
    pub fn connect(host: &str, port: u16, max_devices: usize) -> Result<Self> {
        let target = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no address for DMX target"))?;
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        tracing::info!(%target, "DMX overlay client connected");
        Ok(Self { socket, target, max_devices })
    }

    /// Send the current universe state as one datagram.
    pub fn send_universe(&self, universe: &DmxUniverse) -> Result<()> {
        let bytes = universe.encode();
        self.socket.send_to(&bytes, self.target)?;
        Ok(())
    }

    /// Register known overlays in deactivated state, then send the
    /// deactivated-all frame (§4.9 `start`).
    pub fn start(&self, universe: &mut DmxUniverse) -> Result<()> {
        universe.deactivate_all();
        self.send_universe(universe)
    }

    /// Send a single "clear" frame, blanking the universe (§4.9 `stop`).
    pub fn stop(&self) -> Result<()> {
        let bytes = DmxUniverse::clear_frame(self.max_devices);
        self.socket.send_to(&bytes, self.target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket as StdUdpSocket;

    #[test]
    fn start_sends_a_deactivated_frame() {
        let receiver = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(std::time::Duration::from_millis(500))).unwrap();
        let port = receiver.local_addr().unwrap().port();

        let client = DmxClient::connect("127.0.0.1", port, 20).unwrap();
        let mut universe = DmxUniverse::new(20);
        let idx = universe.register(0, 50).unwrap();
        universe.activate(idx).unwrap();

        client.start(&mut universe).unwrap();

        let mut buf = vec![0u8; 4096];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(len, universe.encoded_len());
        assert!(!universe.overlays()[idx].is_active());
    }

    #[test]
    fn stop_sends_clear_frame_of_exact_length() {
        let receiver = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(std::time::Duration::from_millis(500))).unwrap();
        let port = receiver.local_addr().unwrap().port();

        let client = DmxClient::connect("127.0.0.1", port, 20).unwrap();
        client.stop().unwrap();

        let mut buf = vec![0u8; 4096];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(len, crate::universe::encoded_len(20));
    }
}
