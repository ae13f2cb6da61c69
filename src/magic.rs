//! Magic packet payload: the sync stream followed by 16 copies of the target address.

use pnet::util::MacAddr;

use crate::common::{self, MAC_LEN, MAGIC_PACKET_LEN, SYNC_STREAM};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicPacket {
    target: MacAddr,
    payload: [u8; MAGIC_PACKET_LEN],
}

impl MagicPacket {
    pub fn new(target: MacAddr) -> Self {
        let mut payload = [0u8; MAGIC_PACKET_LEN];
        payload[..MAC_LEN].copy_from_slice(&SYNC_STREAM);

        let octets = target.octets();
        for block in payload[MAC_LEN..].chunks_exact_mut(MAC_LEN) {
            block.copy_from_slice(&octets);
        }

        Self { target, payload }
    }

    /// Builds a packet from an untyped address, rejecting anything that is not exactly 6 bytes.
    pub fn from_address_bytes(addr: &[u8]) -> Result<Self> {
        let octets: [u8; MAC_LEN] = addr
            .try_into()
            .map_err(|_| Error::InvalidAddress(addr.len()))?;
        Ok(Self::new(MacAddr::new(octets[0], octets[1], octets[2], octets[3], octets[4], octets[5])))
    }

    /// Recognizes an existing magic packet payload, e.g. one taken off the wire.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        if !common::check_wol_payload(payload) { return None; }
        Some(Self::new(common::wol_payload_get_target_mac(payload)))
    }

    pub fn target(&self) -> MacAddr {
        self.target
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

pub fn build_magic_packet(target: MacAddr) -> MagicPacket {
    MagicPacket::new(target)
}
