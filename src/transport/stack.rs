//! Network-stack interface consumed by the frame transport.
//!
//! The transport never talks to an OS directly; it goes through [`NetStack`]
//! to enumerate interfaces and create [`PacketEndpoint`]s.
//!
//! The only implementation in this crate is the in-process
//! [`MemoryStack`](super::MemoryStack). An OS packet-socket backend
//! implements these traits out of tree and is handed to
//! [`L2Packet::open`](super::L2Packet::open) as an `Arc<dyn NetStack>`.

use std::fmt;
use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{IfIndex, MacAddr};

/// Identifier of an open endpoint, unique within one stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId(pub u64);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ep#{}", self.0)
    }
}

/// Framing mode of a packet endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketKind {
    /// Frames carry the link-layer header, written and read as-is.
    Raw,
    /// The stack adds and strips the link-layer header.
    Datagram,
}

impl SocketKind {
    /// Pick the mode for a binding.
    pub fn for_link_header(include_link_header: bool) -> Self {
        if include_link_header {
            SocketKind::Raw
        } else {
            SocketKind::Datagram
        }
    }
}

/// Link-layer addressing metadata attached to a bind, send, or receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkAddr {
    /// Interface the frame belongs to.
    pub ifindex: IfIndex,
    /// Protocol number (ethertype), host byte order.
    pub protocol: u16,
    /// Peer hardware address (destination on send, source on receive).
    pub addr: MacAddr,
}

impl LinkAddr {
    /// Address used to bind an endpoint: interface and protocol only.
    pub fn bind(ifindex: IfIndex, protocol: u16) -> Self {
        Self {
            ifindex,
            protocol,
            addr: MacAddr::ZERO,
        }
    }
}

/// Kernel-side packet filters the engine may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketFilter {
    /// Only pass neighbor-discovery frames.
    Ndisc,
    /// Drop frames not addressed to this host.
    PktType,
}

/// A network interface as reported by the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetInterface {
    /// Interface index.
    pub index: IfIndex,
    /// Interface name.
    pub name: String,
    /// Hardware address.
    pub hw_addr: MacAddr,
    /// Configured unicast IPv4 addresses, in configuration order.
    pub ipv4: Vec<Ipv4Addr>,
    /// Administrative/operational state.
    pub up: bool,
}

impl NetInterface {
    /// Create an interface description that is up and has no addresses.
    pub fn new(index: IfIndex, name: impl Into<String>, hw_addr: MacAddr) -> Self {
        Self {
            index,
            name: name.into(),
            hw_addr,
            ipv4: Vec::new(),
            up: true,
        }
    }

    /// Add a unicast IPv4 address.
    pub fn with_ipv4(mut self, addr: Ipv4Addr) -> Self {
        self.ipv4.push(addr);
        self
    }
}

/// Interface enumeration and endpoint creation.
pub trait NetStack: Send + Sync {
    /// Enumerate every interface currently known to the stack.
    fn interfaces(&self) -> Vec<NetInterface>;

    /// Look up an interface by name.
    fn interface_by_name(&self, name: &str) -> Option<NetInterface> {
        self.interfaces().into_iter().find(|iface| iface.name == name)
    }

    /// Look up an interface by index.
    fn interface_by_index(&self, index: IfIndex) -> Option<NetInterface> {
        self.interfaces().into_iter().find(|iface| iface.index == index)
    }

    /// Open an unbound packet endpoint matching `protocol`.
    fn open_packet(&self, kind: SocketKind, protocol: u16) -> io::Result<Arc<dyn PacketEndpoint>>;
}

/// An open packet endpoint.
///
/// Send and receive calls never block: `try_recv_from` returns
/// [`io::ErrorKind::WouldBlock`] when no frame is queued, and
/// [`readable`](PacketEndpoint::readable) waits until one is.
#[async_trait]
pub trait PacketEndpoint: Send + Sync + fmt::Debug {
    /// Endpoint identifier.
    fn id(&self) -> EndpointId;

    /// Framing mode.
    fn kind(&self) -> SocketKind;

    /// Bind to an interface and protocol.
    fn bind(&self, addr: &LinkAddr) -> io::Result<()>;

    /// Write a complete frame to the bound interface.
    fn send(&self, frame: &[u8]) -> io::Result<usize>;

    /// Write a frame body with out-of-band destination addressing.
    fn send_to(&self, payload: &[u8], dest: &LinkAddr) -> io::Result<usize>;

    /// Read one queued frame and its source addressing.
    fn try_recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, LinkAddr)>;

    /// Wait until a frame can be read.
    async fn readable(&self) -> io::Result<()>;

    /// Install a kernel-side filter.
    fn set_filter(&self, filter: PacketFilter) -> io::Result<()> {
        let _ = filter;
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }

    /// Release the endpoint. Further I/O fails.
    fn close(&self);
}
