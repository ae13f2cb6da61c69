use std::io::{self, ErrorKind};
use std::str::FromStr;
use std::time::Duration;

use pnet::datalink::{
    self,
    Channel,
    ChannelType,
    Config,
    DataLinkSender,
    NetworkInterface
};
use pnet::packet::ethernet::{EtherType, MutableEthernetPacket};
use pnet::util::MacAddr;

use crate::common::{ETHERTYPE_WOL, ETH_HDR_LEN, SENTINEL_SOURCE};
use crate::error::{Error, Result};
use crate::magic::MagicPacket;

/// An open link-layer socket. Dropping it releases the underlying resource.
pub trait LinkSocket {
    /// Writes one complete Ethernet frame. Addressing is taken from the frame header.
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;
}

/// Opens link-layer sockets bound to a single interface.
///
/// `ethertype` names the frames the socket is opened for; implementations are not required
/// to install a kernel-side filter for it.
pub trait Transport {
    type Socket: LinkSocket;

    fn open(&self, iface: &NetworkInterface, ethertype: EtherType) -> io::Result<Self::Socket>;
}

#[derive(Clone, Copy)]
pub struct PnetTransport {
    cfg: Config,
}

impl Default for PnetTransport {
    fn default() -> Self {
        let mut cfg = Config::default();
        cfg.channel_type = ChannelType::Layer2;
        cfg.write_timeout = Some(Duration::from_millis(500));
        cfg.read_timeout = Some(Duration::from_millis(50));
        cfg.promiscuous = false;

        Self { cfg }
    }
}

impl Transport for PnetTransport {
    type Socket = PnetSocket;

    fn open(&self, iface: &NetworkInterface, ethertype: EtherType) -> io::Result<PnetSocket> {
        if !iface.is_up() {
            return Err(io::Error::new(
                ErrorKind::NotConnected,
                format!("interface '{}' is down", iface.name),
            ));
        }

        /*
         * The receive half is dropped right away: nothing is ever read from this socket, so there is
         * no point in filtering incoming frames for `ethertype`. The file descriptor lives on in `tx`.
         */
        let tx = match datalink::channel(iface, self.cfg)? {
            Channel::Ethernet(tx, _rx) => tx,
            _ => return Err(io::Error::new(ErrorKind::Unsupported, "unsupported datalink channel type")),
        };
        log::trace!("[socket][{}] opened for ethertype {}", iface.name, ethertype);

        Ok(PnetSocket { iface: iface.name.clone(), tx })
    }
}

pub struct PnetSocket {
    iface: String,
    tx: Box<dyn DataLinkSender>,
}

impl LinkSocket for PnetSocket {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        match self.tx.send_to(frame, None) {
            Some(res) => res,
            None => Err(io::Error::new(ErrorKind::Other, "datalink sender did not accept the frame")),
        }
    }
}

impl Drop for PnetSocket {
    fn drop(&mut self) {
        log::trace!("[socket][{}] closed", self.iface);
    }
}

/// Serializes an Ethernet II frame to the broadcast address carrying `payload`.
/// No FCS is appended; that is left to the NIC.
pub fn encode_frame(source: MacAddr, payload: &[u8]) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; ETH_HDR_LEN + payload.len()];
    {
        let mut eth = MutableEthernetPacket::new(&mut buffer[..])
            .ok_or_else(|| Error::FrameEncode(format!("buffer of {} bytes cannot hold a frame", ETH_HDR_LEN + payload.len())))?;
        eth.set_destination(MacAddr::broadcast());
        eth.set_source(source);
        eth.set_ethertype(EtherType::new(ETHERTYPE_WOL));
        eth.set_payload(payload);
    }
    Ok(buffer)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSource {
    Fixed(MacAddr),
    /// The sending interface's own address, falling back to [`SENTINEL_SOURCE`] if it has none.
    Interface,
}

impl Default for FrameSource {
    fn default() -> Self {
        FrameSource::Fixed(SENTINEL_SOURCE)
    }
}

impl FromStr for FrameSource {
    type Err = String;

    /// Accepts either a hardware address or the word `interface`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("interface") {
            return Ok(FrameSource::Interface);
        }
        s.parse::<MacAddr>()
            .map(FrameSource::Fixed)
            .map_err(|e| format!("invalid frame source '{}': {}", s, e))
    }
}

impl FrameSource {
    fn resolve(&self, iface: &NetworkInterface) -> MacAddr {
        match self {
            FrameSource::Fixed(mac) => *mac,
            FrameSource::Interface => match iface.mac {
                Some(mac) if !mac.is_zero() => mac,
                _ => {
                    log::debug!("interface '{}' has no hardware address, using {}", iface.name, SENTINEL_SOURCE);
                    SENTINEL_SOURCE
                }
            },
        }
    }
}

pub struct Sender<T: Transport = PnetTransport> {
    transport: T,
    source: FrameSource,
}

impl Default for Sender<PnetTransport> {
    fn default() -> Self {
        Self::new(PnetTransport::default())
    }
}

impl<T: Transport> Sender<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, source: FrameSource::default() }
    }

    pub fn with_source(mut self, source: FrameSource) -> Self {
        self.source = source;
        self
    }

    /// Frame bytes as they would be written on `iface`, without touching any socket.
    pub fn frame_for(&self, pkt: &MagicPacket, iface: &NetworkInterface) -> Result<Vec<u8>> {
        encode_frame(self.source.resolve(iface), pkt.payload())
    }

    /// Broadcasts `pkt` once on `iface`. The socket is opened for this call only and is
    /// released before returning, whatever the outcome.
    pub fn send(&self, pkt: &MagicPacket, iface: &NetworkInterface) -> Result<()> {
        let mut socket = self.transport
            .open(iface, EtherType::new(ETHERTYPE_WOL))
            .map_err(|source| Error::SocketOpen { iface: iface.name.clone(), source })?;

        let frame = self.frame_for(pkt, iface)?;
        log::debug!("[sender][{}] {} byte frame for {}", iface.name, frame.len(), pkt.target());

        socket.send(&frame).map_err(Error::Transmit)?;

        log::info!("sent WakeOnLan packet for {} on interface '{}'", pkt.target(), iface.name);
        Ok(())
    }
}

pub fn find_interface(name: &str) -> Result<NetworkInterface> {
    datalink::interfaces()
        .into_iter()
        .find(|iface| iface.name == name)
        .ok_or_else(|| Error::InterfaceNotFound(name.to_owned()))
}

pub fn default_interface() -> Result<NetworkInterface> {
    select_default_interface(datalink::interfaces())
}

fn select_default_interface<I>(interfaces: I) -> Result<NetworkInterface>
where
    I: IntoIterator<Item = NetworkInterface>,
{
    interfaces
        .into_iter()
        .find(|iface| {
            iface.is_up() && !iface.is_loopback() && iface.mac.map_or(false, |mac| !mac.is_zero())
        })
        .ok_or(Error::NoSuitableInterface)
}
