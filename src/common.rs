use pnet::util::MacAddr;

pub const BROADCAST_MAC: [u8; 6] = [ 0xff, 0xff, 0xff, 0xff, 0xff, 0xff ];

/// Synchronization stream every magic packet starts with.
pub const SYNC_STREAM: [u8; 6] = BROADCAST_MAC;

pub const ETHERTYPE_WOL: u16 = 0x0842;

/// Locally administered source used for outgoing frames. Wake filters match on the
/// payload, so this does not need to be the sending interface's address.
pub const SENTINEL_SOURCE: MacAddr = MacAddr(0xde, 0xad, 0xbe, 0xef, 0xde, 0xad);

pub const MAC_LEN: usize = 6;
pub const TARGET_REPEAT: usize = 16;
pub const MAGIC_PACKET_LEN: usize = MAC_LEN + TARGET_REPEAT * MAC_LEN;

pub const ETH_HDR_LEN: usize = 14;

pub fn check_wol_payload(payload: &[u8]) -> bool {
    if payload.len() < MAGIC_PACKET_LEN { return false; }

    let blocks: Vec<&[u8]> = payload[..MAGIC_PACKET_LEN].chunks(MAC_LEN).collect();
    if blocks[0] != SYNC_STREAM {
        return false;
    }

    blocks[2..].iter().all(|b| *b == blocks[1])
}

/// Returns the target of a payload that already passed [`check_wol_payload`].
pub fn wol_payload_get_target_mac(payload: &[u8]) -> MacAddr {
    let t = &payload[MAC_LEN..2 * MAC_LEN];
    MacAddr::new(t[0], t[1], t[2], t[3], t[4], t[5])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_for(target: [u8; 6]) -> Vec<u8> {
        let mut buf = SYNC_STREAM.to_vec();
        for _ in 0..TARGET_REPEAT {
            buf.extend_from_slice(&target);
        }
        buf
    }

    #[test]
    fn accepts_well_formed_payload() {
        let payload = payload_for([0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(payload.len(), 102);
        assert!(check_wol_payload(&payload));
        assert_eq!(wol_payload_get_target_mac(&payload), MacAddr::new(1, 2, 3, 4, 5, 6));
    }

    #[test]
    fn rejects_short_payload() {
        let payload = payload_for([0xaa; 6]);
        assert!(!check_wol_payload(&payload[..101]));
        assert!(!check_wol_payload(&[]));
    }

    #[test]
    fn rejects_bad_sync_stream() {
        let mut payload = payload_for([0xaa; 6]);
        payload[3] = 0x00;
        assert!(!check_wol_payload(&payload));
    }

    #[test]
    fn rejects_inconsistent_repetition() {
        let mut payload = payload_for([0x10, 0x20, 0x30, 0x40, 0x50, 0x60]);
        payload[100] ^= 0x01;
        assert!(!check_wol_payload(&payload));
    }

    #[test]
    fn ignores_trailing_padding() {
        let mut payload = payload_for([0x10, 0x20, 0x30, 0x40, 0x50, 0x60]);
        payload.extend_from_slice(&[0u8; 4]);
        assert!(check_wol_payload(&payload));
    }

    #[test]
    fn sizes() {
        assert_eq!(MAGIC_PACKET_LEN, 102);
        assert_eq!(SENTINEL_SOURCE.octets(), [0xde, 0xad, 0xbe, 0xef, 0xde, 0xad]);
    }
}
