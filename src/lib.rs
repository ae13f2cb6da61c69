//! Layer 2 (non IP) Wake-on-LAN.
//!
//! Builds the magic packet for a target hardware address and broadcasts it in an
//! Ethernet II frame with EtherType `0x0842` on a raw link-layer socket.

pub mod common;
pub mod config;
pub mod error;
pub mod layer2;
pub mod magic;

pub use pnet::datalink::NetworkInterface;
pub use pnet::util::MacAddr;

pub use error::{Error, Result};
pub use layer2::{FrameSource, LinkSocket, PnetTransport, Sender, Transport};
pub use magic::{build_magic_packet, MagicPacket};

/// Sends a magic packet waking `target` on `iface`.
pub fn wake_on_lan(target: MacAddr, iface: &NetworkInterface) -> Result<()> {
    Sender::default().send(&build_magic_packet(target), iface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_interface_fails_to_open() {
        let iface = NetworkInterface {
            name: "eth9".to_owned(),
            description: String::new(),
            index: 9,
            mac: Some(MacAddr::new(0x02, 0x00, 0x00, 0x00, 0x00, 0x09)),
            ips: Vec::new(),
            flags: 0,
        };

        match wake_on_lan(MacAddr::new(0x01, 0x02, 0x03, 0x04, 0x05, 0x06), &iface) {
            Err(Error::SocketOpen { iface, source }) => {
                assert_eq!(iface, "eth9");
                assert_eq!(source.kind(), std::io::ErrorKind::NotConnected);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
