use std::io;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid hardware address: expected 6 bytes, got {0}")]
    InvalidAddress(usize),
    #[error("Could not open ethernet socket on interface `{iface}`: {source}")]
    SocketOpen {
        iface: String,
        #[source]
        source: io::Error,
    },
    #[error("Could not encode ethernet frame: {0}")]
    FrameEncode(String),
    #[error("Could not write to ethernet socket: {0}")]
    Transmit(#[source] io::Error),
    #[error("No network interface named `{0}`")]
    InterfaceNotFound(String),
    #[error("No suitable network interface available")]
    NoSuitableInterface,
}

pub type Result<T> = std::result::Result<T, Error>;
