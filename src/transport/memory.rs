//! In-process network stack.
//!
//! [`MemoryStack`] implements [`NetStack`] without touching the OS: frames
//! written by endpoints are captured as [`SentFrame`]s, inbound frames are
//! injected with [`MemoryStack::inject`]. It backs the test suite and dry runs
//! of the supplicant glue. It is the only [`NetStack`] shipped here; OS packet
//! sockets are provided by an out-of-tree backend.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::core::{ETH_ALEN, ETH_HLEN, ETH_P_ALL, IfIndex, MacAddr};

use super::stack::{
    EndpointId, LinkAddr, NetInterface, NetStack, PacketEndpoint, PacketFilter, SocketKind,
};

/// A frame written by an endpoint of a [`MemoryStack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFrame {
    /// Endpoint that wrote the frame.
    pub endpoint: EndpointId,
    /// Outgoing interface.
    pub ifindex: IfIndex,
    /// Destination hardware address.
    pub dest: MacAddr,
    /// Protocol number.
    pub protocol: u16,
    /// Bytes as written (including the link header for raw endpoints).
    pub frame: Vec<u8>,
}

#[derive(Debug, Default)]
struct StackState {
    interfaces: Vec<NetInterface>,
    endpoints: HashMap<EndpointId, Weak<MemoryEndpoint>>,
    next_endpoint: u64,
    sent: Vec<SentFrame>,
    open_failure: Option<io::ErrorKind>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<StackState>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, StackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-process [`NetStack`]. Clones share the same interfaces and endpoints.
#[derive(Debug, Clone, Default)]
pub struct MemoryStack {
    shared: Arc<Shared>,
}

impl MemoryStack {
    /// Create a stack with no interfaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace, by index) an interface.
    pub fn add_interface(&self, iface: NetInterface) {
        let mut state = self.shared.state();
        state.interfaces.retain(|existing| existing.index != iface.index);
        state.interfaces.push(iface);
    }

    /// Bring an interface up or down. Returns `false` if it does not exist.
    pub fn set_link_up(&self, name: &str, up: bool) -> bool {
        let mut state = self.shared.state();
        match state.interfaces.iter_mut().find(|iface| iface.name == name) {
            Some(iface) => {
                iface.up = up;
                true
            }
            None => false,
        }
    }

    /// Replace the IPv4 addresses of an interface.
    pub fn set_ipv4(&self, name: &str, addrs: Vec<Ipv4Addr>) -> bool {
        let mut state = self.shared.state();
        match state.interfaces.iter_mut().find(|iface| iface.name == name) {
            Some(iface) => {
                iface.ipv4 = addrs;
                true
            }
            None => false,
        }
    }

    /// Make the next [`open_packet`](NetStack::open_packet) call fail.
    pub fn fail_next_open(&self, kind: io::ErrorKind) {
        self.shared.state().open_failure = Some(kind);
    }

    /// Deliver an inbound frame from `src` to every endpoint bound to
    /// `ifindex` and `protocol`. Returns the number of endpoints reached.
    pub fn inject(&self, ifindex: IfIndex, src: MacAddr, protocol: u16, payload: &[u8]) -> usize {
        let (own_addr, endpoints) = {
            let state = self.shared.state();
            let own_addr = state
                .interfaces
                .iter()
                .find(|iface| iface.index == ifindex)
                .map(|iface| iface.hw_addr)
                .unwrap_or(MacAddr::ZERO);
            (own_addr, live_endpoints(&state))
        };

        let from = LinkAddr {
            ifindex,
            protocol,
            addr: src,
        };
        let mut delivered = 0;
        for endpoint in endpoints {
            if !endpoint.accepts(ifindex, protocol) {
                continue;
            }
            let data = match endpoint.kind {
                SocketKind::Raw => {
                    let mut frame = ethernet_header(own_addr, src, protocol).to_vec();
                    frame.extend_from_slice(payload);
                    frame
                }
                SocketKind::Datagram => payload.to_vec(),
            };
            endpoint.enqueue(Queued::Frame { data, from });
            delivered += 1;
        }
        delivered
    }

    /// Make the next read on every endpoint bound to `ifindex` fail.
    pub fn inject_error(&self, ifindex: IfIndex, kind: io::ErrorKind) -> usize {
        let endpoints = live_endpoints(&self.shared.state());
        let mut reached = 0;
        for endpoint in endpoints {
            if endpoint.bound_ifindex() == Some(ifindex) {
                endpoint.enqueue(Queued::Error(kind));
                reached += 1;
            }
        }
        reached
    }

    /// Frames written so far.
    pub fn sent_frames(&self) -> Vec<SentFrame> {
        self.shared.state().sent.clone()
    }

    /// Drain the captured frames.
    pub fn take_sent(&self) -> Vec<SentFrame> {
        std::mem::take(&mut self.shared.state().sent)
    }

    /// Number of endpoints opened and not yet closed.
    pub fn open_endpoints(&self) -> usize {
        live_endpoints(&self.shared.state()).len()
    }
}

impl NetStack for MemoryStack {
    fn interfaces(&self) -> Vec<NetInterface> {
        self.shared.state().interfaces.clone()
    }

    fn open_packet(&self, kind: SocketKind, protocol: u16) -> io::Result<Arc<dyn PacketEndpoint>> {
        let mut state = self.shared.state();
        if let Some(kind) = state.open_failure.take() {
            return Err(io::Error::from(kind));
        }

        state.next_endpoint += 1;
        let id = EndpointId(state.next_endpoint);
        let endpoint = Arc::new(MemoryEndpoint {
            id,
            kind,
            protocol,
            shared: Arc::downgrade(&self.shared),
            state: Mutex::new(EndpointState::default()),
            readable: Notify::new(),
        });
        state.endpoints.insert(id, Arc::downgrade(&endpoint));
        Ok(endpoint)
    }
}

fn live_endpoints(state: &StackState) -> Vec<Arc<MemoryEndpoint>> {
    state
        .endpoints
        .values()
        .filter_map(Weak::upgrade)
        .filter(|endpoint| !endpoint.is_closed())
        .collect()
}

fn ethernet_header(dst: MacAddr, src: MacAddr, protocol: u16) -> [u8; ETH_HLEN] {
    let mut header = [0u8; ETH_HLEN];
    header[..ETH_ALEN].copy_from_slice(dst.as_bytes());
    header[ETH_ALEN..2 * ETH_ALEN].copy_from_slice(src.as_bytes());
    header[2 * ETH_ALEN..].copy_from_slice(&protocol.to_be_bytes());
    header
}

#[derive(Debug)]
enum Queued {
    Frame { data: Vec<u8>, from: LinkAddr },
    Error(io::ErrorKind),
}

#[derive(Debug, Default)]
struct EndpointState {
    bound: Option<LinkAddr>,
    queue: VecDeque<Queued>,
    filters: Vec<PacketFilter>,
    closed: bool,
}

/// Endpoint created by a [`MemoryStack`].
#[derive(Debug)]
pub struct MemoryEndpoint {
    id: EndpointId,
    kind: SocketKind,
    protocol: u16,
    shared: Weak<Shared>,
    state: Mutex<EndpointState>,
    readable: Notify,
}

impl MemoryEndpoint {
    fn state(&self) -> MutexGuard<'_, EndpointState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_closed(&self) -> bool {
        self.state().closed
    }

    fn bound_ifindex(&self) -> Option<IfIndex> {
        self.state().bound.map(|addr| addr.ifindex)
    }

    fn accepts(&self, ifindex: IfIndex, protocol: u16) -> bool {
        match self.state().bound {
            Some(bound) => {
                bound.ifindex == ifindex && (bound.protocol == protocol || bound.protocol == ETH_P_ALL)
            }
            None => false,
        }
    }

    fn enqueue(&self, item: Queued) {
        self.state().queue.push_back(item);
        self.readable.notify_one();
    }

    fn interface(&self, ifindex: IfIndex) -> io::Result<NetInterface> {
        let shared = self
            .shared
            .upgrade()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))?;
        let state = shared.state();
        let iface = state
            .interfaces
            .iter()
            .find(|iface| iface.index == ifindex)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such device"))?;
        if !iface.up {
            return Err(io::Error::new(io::ErrorKind::NetworkDown, "network is down"));
        }
        Ok(iface)
    }

    fn record(&self, frame: SentFrame) {
        if let Some(shared) = self.shared.upgrade() {
            shared.state().sent.push(frame);
        }
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.is_closed() {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "endpoint closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl PacketEndpoint for MemoryEndpoint {
    fn id(&self) -> EndpointId {
        self.id
    }

    fn kind(&self) -> SocketKind {
        self.kind
    }

    fn bind(&self, addr: &LinkAddr) -> io::Result<()> {
        self.ensure_open()?;
        self.interface(addr.ifindex)?;
        self.state().bound = Some(LinkAddr::bind(addr.ifindex, addr.protocol));
        Ok(())
    }

    fn send(&self, frame: &[u8]) -> io::Result<usize> {
        self.ensure_open()?;
        let bound = self
            .state()
            .bound
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "endpoint not bound"))?;
        if frame.len() < ETH_HLEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "frame shorter than link header",
            ));
        }
        self.interface(bound.ifindex)?;

        let dest = MacAddr::from_slice(&frame[..ETH_ALEN]).unwrap_or(MacAddr::ZERO);
        let protocol = u16::from_be_bytes([frame[2 * ETH_ALEN], frame[2 * ETH_ALEN + 1]]);
        self.record(SentFrame {
            endpoint: self.id,
            ifindex: bound.ifindex,
            dest,
            protocol,
            frame: frame.to_vec(),
        });
        Ok(frame.len())
    }

    fn send_to(&self, payload: &[u8], dest: &LinkAddr) -> io::Result<usize> {
        self.ensure_open()?;
        self.interface(dest.ifindex)?;
        self.record(SentFrame {
            endpoint: self.id,
            ifindex: dest.ifindex,
            dest: dest.addr,
            protocol: dest.protocol,
            frame: payload.to_vec(),
        });
        Ok(payload.len())
    }

    fn try_recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, LinkAddr)> {
        let mut state = self.state();
        if state.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "endpoint closed"));
        }
        match state.queue.pop_front() {
            Some(Queued::Frame { data, from }) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok((len, from))
            }
            Some(Queued::Error(kind)) => Err(io::Error::from(kind)),
            None => Err(io::Error::from(io::ErrorKind::WouldBlock)),
        }
    }

    async fn readable(&self) -> io::Result<()> {
        loop {
            {
                let state = self.state();
                if state.closed {
                    return Err(io::Error::new(io::ErrorKind::NotConnected, "endpoint closed"));
                }
                if !state.queue.is_empty() {
                    return Ok(());
                }
            }
            self.readable.notified().await;
        }
    }

    fn set_filter(&self, filter: PacketFilter) -> io::Result<()> {
        match filter {
            PacketFilter::PktType => {
                self.state().filters.push(filter);
                Ok(())
            }
            PacketFilter::Ndisc => Err(io::Error::from(io::ErrorKind::Unsupported)),
        }
    }

    fn close(&self) {
        {
            let mut state = self.state();
            if state.closed {
                return;
            }
            state.closed = true;
            state.queue.clear();
        }
        if let Some(shared) = self.shared.upgrade() {
            shared.state().endpoints.remove(&self.id);
        }
        self.readable.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WLAN0: IfIndex = IfIndex(2);
    const OWN: MacAddr = MacAddr::new([0x02, 0, 0, 0, 0, 0x01]);
    const PEER: MacAddr = MacAddr::new([0x02, 0, 0, 0, 0, 0x99]);

    fn stack() -> MemoryStack {
        let stack = MemoryStack::new();
        stack.add_interface(NetInterface::new(WLAN0, "wlan0", OWN));
        stack
    }

    #[test]
    fn test_raw_endpoint_receives_link_header() {
        let stack = stack();
        let endpoint = stack.open_packet(SocketKind::Raw, 0x888e).unwrap();
        endpoint.bind(&LinkAddr::bind(WLAN0, 0x888e)).unwrap();

        assert_eq!(stack.inject(WLAN0, PEER, 0x888e, &[0xaa, 0xbb]), 1);

        let mut buf = [0u8; 64];
        let (len, from) = endpoint.try_recv_from(&mut buf).unwrap();
        assert_eq!(len, ETH_HLEN + 2);
        assert_eq!(&buf[..ETH_ALEN], OWN.as_bytes());
        assert_eq!(&buf[ETH_ALEN..2 * ETH_ALEN], PEER.as_bytes());
        assert_eq!(&buf[12..14], &[0x88, 0x8e]);
        assert_eq!(from.addr, PEER);
    }

    #[test]
    fn test_protocol_filtering() {
        let stack = stack();
        let eapol = stack.open_packet(SocketKind::Datagram, 0x888e).unwrap();
        eapol.bind(&LinkAddr::bind(WLAN0, 0x888e)).unwrap();
        let all = stack.open_packet(SocketKind::Datagram, ETH_P_ALL).unwrap();
        all.bind(&LinkAddr::bind(WLAN0, ETH_P_ALL)).unwrap();

        assert_eq!(stack.inject(WLAN0, PEER, 0x0800, b"ip"), 1);
        assert_eq!(stack.inject(WLAN0, PEER, 0x888e, b"eapol"), 2);

        let mut buf = [0u8; 16];
        let (len, _) = eapol.try_recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"eapol");
        assert_eq!(
            eapol.try_recv_from(&mut buf).unwrap_err().kind(),
            io::ErrorKind::WouldBlock
        );

        let (len, _) = all.try_recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"ip");
    }

    #[test]
    fn test_bind_fails_when_link_down() {
        let stack = stack();
        stack.set_link_up("wlan0", false);
        let endpoint = stack.open_packet(SocketKind::Raw, 0x888e).unwrap();

        let err = endpoint.bind(&LinkAddr::bind(WLAN0, 0x888e)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NetworkDown);
    }

    #[test]
    fn test_close_releases_endpoint() {
        let stack = stack();
        let endpoint = stack.open_packet(SocketKind::Raw, 0x888e).unwrap();
        assert_eq!(stack.open_endpoints(), 1);

        endpoint.close();
        endpoint.close();
        assert_eq!(stack.open_endpoints(), 0);
        assert!(endpoint.send(&[0u8; 20]).is_err());
    }

    #[test]
    fn test_forced_open_failure_is_one_shot() {
        let stack = stack();
        stack.fail_next_open(io::ErrorKind::PermissionDenied);

        let err = stack.open_packet(SocketKind::Raw, 0x888e).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(stack.open_packet(SocketKind::Raw, 0x888e).is_ok());
    }
}
