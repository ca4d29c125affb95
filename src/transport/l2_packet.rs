//! Layer-2 packet binding used by the supplicant engine.
//!
//! An [`L2Packet`] owns one packet endpoint bound to a named interface and
//! protocol. Inbound frames are handed to the receive callback on the event
//! loop's dispatch task; outbound frames go straight to the endpoint.

use std::fmt;
use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use crate::core::{ETH_P_EAPOL, IFNAME_MAX_LEN, IfIndex, L2_RECV_BUFFER_SIZE, MacAddr};

use super::eloop::{EventLoop, ReadHandler};
use super::error::{TransportError, TransportResult};
use super::stack::{
    EndpointId, LinkAddr, NetInterface, NetStack, PacketEndpoint, PacketFilter, SocketKind,
};

/// Receive callback: source hardware address and frame bytes.
///
/// The slice is only valid for the duration of the call.
pub type RxCallback = Arc<dyn Fn(MacAddr, &[u8]) + Send + Sync>;

/// Parameters for opening an [`L2Packet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L2PacketConfig {
    /// Interface name, 1 to 16 characters.
    pub ifname: String,
    /// Protocol number (ethertype) to bind to.
    pub protocol: u16,
    /// Whether frames carry the link-layer header.
    pub include_link_header: bool,
    /// Address to report when the interface has no hardware address.
    pub own_addr: Option<MacAddr>,
    /// Per-frame receive buffer; longer frames are truncated.
    pub recv_buffer_size: usize,
}

impl L2PacketConfig {
    /// Configuration for `ifname`/`protocol` with defaults for the rest.
    pub fn new(ifname: impl Into<String>, protocol: u16) -> Self {
        Self {
            ifname: ifname.into(),
            protocol,
            include_link_header: false,
            own_addr: None,
            recv_buffer_size: L2_RECV_BUFFER_SIZE,
        }
    }

    /// Start a builder.
    pub fn builder(ifname: impl Into<String>) -> L2PacketConfigBuilder {
        L2PacketConfigBuilder::new(ifname)
    }
}

/// Builder for [`L2PacketConfig`].
#[derive(Debug, Clone)]
pub struct L2PacketConfigBuilder {
    config: L2PacketConfig,
}

impl L2PacketConfigBuilder {
    /// Create a builder bound to EAPOL on `ifname`.
    pub fn new(ifname: impl Into<String>) -> Self {
        Self {
            config: L2PacketConfig::new(ifname, ETH_P_EAPOL),
        }
    }

    /// Set the protocol number.
    pub fn protocol(mut self, protocol: u16) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// Send and receive complete link-layer frames.
    pub fn include_link_header(mut self, include: bool) -> Self {
        self.config.include_link_header = include;
        self
    }

    /// Fallback own address.
    pub fn own_addr(mut self, addr: MacAddr) -> Self {
        self.config.own_addr = Some(addr);
        self
    }

    /// Set the receive buffer size.
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.config.recv_buffer_size = size;
        self
    }

    /// Finish building.
    pub fn build(self) -> L2PacketConfig {
        self.config
    }

    /// Build and open in one step.
    pub fn open(
        self,
        stack: Arc<dyn NetStack>,
        eloop: &EventLoop,
        rx: Option<RxCallback>,
    ) -> TransportResult<L2Packet> {
        L2Packet::open(stack, eloop, self.config, rx)
    }
}

/// A packet endpoint bound to one interface and protocol.
///
/// Dropping the binding closes it.
pub struct L2Packet {
    stack: Arc<dyn NetStack>,
    ifname: String,
    ifindex: IfIndex,
    own_addr: MacAddr,
    protocol: u16,
    include_link_header: bool,
    endpoint: Option<Arc<dyn PacketEndpoint>>,
    /// Set while a receive handler is registered.
    eloop: Option<EventLoop>,
}

impl L2Packet {
    /// Open a binding on `config.ifname`.
    ///
    /// The hardware address is resolved before the endpoint is usable. When
    /// `rx` is given, it is registered with `eloop` and runs once per
    /// received frame.
    pub fn open(
        stack: Arc<dyn NetStack>,
        eloop: &EventLoop,
        config: L2PacketConfig,
        rx: Option<RxCallback>,
    ) -> TransportResult<Self> {
        validate_ifname(&config.ifname)?;
        let iface = resolve_interface(stack.as_ref(), &config.ifname)?;

        let own_addr = match (iface.hw_addr.is_zero(), config.own_addr) {
            (true, Some(fallback)) => fallback,
            _ => iface.hw_addr,
        };

        let kind = SocketKind::for_link_header(config.include_link_header);
        let endpoint = stack.open_packet(kind, config.protocol).map_err(|source| {
            error!(ifname = %config.ifname, protocol = config.protocol, error = %source, "failed to open packet endpoint");
            TransportError::OpenFailed {
                ifname: config.ifname.clone(),
                protocol: config.protocol,
                source,
            }
        })?;

        if let Err(source) = endpoint.bind(&LinkAddr::bind(iface.index, config.protocol)) {
            endpoint.close();
            error!(ifname = %config.ifname, ifindex = %iface.index, error = %source, "failed to bind packet endpoint");
            return Err(TransportError::BindFailed {
                ifname: config.ifname,
                ifindex: iface.index,
                source,
            });
        }

        let mut binding = Self {
            stack,
            ifname: config.ifname,
            ifindex: iface.index,
            own_addr,
            protocol: config.protocol,
            include_link_header: config.include_link_header,
            endpoint: Some(endpoint.clone()),
            eloop: None,
        };

        if let Some(rx) = rx {
            let handler = receive_handler(
                endpoint.clone(),
                rx,
                config.recv_buffer_size,
                binding.ifname.clone(),
            );
            eloop.register_read(endpoint, handler)?;
            binding.eloop = Some(eloop.clone());
        }

        info!(
            ifname = %binding.ifname,
            ifindex = %binding.ifindex,
            own_addr = %binding.own_addr,
            protocol = binding.protocol,
            "l2 packet binding opened"
        );
        Ok(binding)
    }

    /// Open on the bridge interface `br_ifname` instead of `config.ifname`.
    pub fn open_bridge(
        stack: Arc<dyn NetStack>,
        eloop: &EventLoop,
        br_ifname: &str,
        mut config: L2PacketConfig,
        rx: Option<RxCallback>,
    ) -> TransportResult<Self> {
        debug!(bridge = br_ifname, ifname = %config.ifname, "opening on bridge interface");
        config.ifname = br_ifname.to_owned();
        Self::open(stack, eloop, config, rx)
    }

    /// Send one frame.
    ///
    /// With the link header included, `payload` is written unmodified and
    /// `dest`/`protocol` are ignored. Otherwise the stack builds the header
    /// from `dest` and `protocol`.
    pub fn send(&self, dest: MacAddr, protocol: u16, payload: &[u8]) -> TransportResult<usize> {
        let endpoint = self.endpoint.as_ref().ok_or(TransportError::Closed)?;
        let result = if self.include_link_header {
            endpoint.send(payload)
        } else {
            let to = LinkAddr {
                ifindex: self.ifindex,
                protocol,
                addr: dest,
            };
            endpoint.send_to(payload, &to)
        };

        result.map_err(|e| {
            error!(ifname = %self.ifname, dest = %dest, len = payload.len(), error = %e, "frame send failed");
            TransportError::SendFailed(e)
        })
    }

    /// Hardware address resolved at open.
    pub fn own_addr(&self) -> MacAddr {
        self.own_addr
    }

    /// First unicast IPv4 address configured on the interface.
    pub fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.stack
            .interface_by_index(self.ifindex)
            .and_then(|iface| iface.ipv4.first().copied())
    }

    /// Ask for a kernel-side filter. Unsupported filters are accepted
    /// without effect.
    pub fn set_packet_filter(&self, filter: PacketFilter) -> TransportResult<()> {
        let endpoint = self.endpoint.as_ref().ok_or(TransportError::Closed)?;
        match endpoint.set_filter(filter) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::Unsupported => {
                debug!(ifname = %self.ifname, ?filter, "packet filter not supported, ignoring");
                Ok(())
            }
            Err(e) => Err(TransportError::FilterFailed(e)),
        }
    }

    /// Unregister and release the endpoint. Safe to call more than once.
    pub fn close(&mut self) {
        let Some(endpoint) = self.endpoint.take() else {
            return;
        };
        if let Some(eloop) = self.eloop.take() {
            eloop.unregister_read(endpoint.id());
        }
        endpoint.close();
        info!(ifname = %self.ifname, "l2 packet binding closed");
    }

    /// Check whether the binding is still open.
    pub fn is_open(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Interface name.
    pub fn ifname(&self) -> &str {
        &self.ifname
    }

    /// Interface index resolved at open.
    pub fn ifindex(&self) -> IfIndex {
        self.ifindex
    }

    /// Bound protocol number.
    pub fn protocol(&self) -> u16 {
        self.protocol
    }

    /// Identifier of the underlying endpoint, if still open.
    pub fn endpoint_id(&self) -> Option<EndpointId> {
        self.endpoint.as_ref().map(|endpoint| endpoint.id())
    }
}

impl Drop for L2Packet {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for L2Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("L2Packet")
            .field("ifname", &self.ifname)
            .field("ifindex", &self.ifindex)
            .field("own_addr", &self.own_addr)
            .field("protocol", &format_args!("{:#06x}", self.protocol))
            .field("include_link_header", &self.include_link_header)
            .field("endpoint", &self.endpoint_id())
            .finish()
    }
}

fn validate_ifname(ifname: &str) -> TransportResult<()> {
    if ifname.is_empty() || ifname.len() > IFNAME_MAX_LEN {
        return Err(TransportError::InvalidInterfaceName(ifname.to_owned()));
    }
    Ok(())
}

fn resolve_interface(stack: &dyn NetStack, ifname: &str) -> TransportResult<NetInterface> {
    stack.interface_by_name(ifname).ok_or_else(|| {
        error!(ifname, "interface not found");
        TransportError::InterfaceNotFound(ifname.to_owned())
    })
}

fn receive_handler(
    endpoint: Arc<dyn PacketEndpoint>,
    rx: RxCallback,
    capacity: usize,
    ifname: String,
) -> ReadHandler {
    let mut buf = vec![0u8; capacity];
    Box::new(move || match endpoint.try_recv_from(&mut buf) {
        Ok((len, from)) => {
            trace!(ifname = %ifname, src = %from.addr, len, "frame received");
            rx(from.addr, &buf[..len]);
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
        Err(e) => {
            let err = TransportError::RecvFailed(e);
            warn!(ifname = %ifname, error = %err, "dropping frame");
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use proptest::prelude::*;
    use tokio::sync::mpsc;

    use super::*;
    use crate::core::{ETH_P_ALL, ErrorKind};
    use crate::transport::memory::MemoryStack;

    const WLAN0: IfIndex = IfIndex(2);
    const BR0: IfIndex = IfIndex(5);
    const OWN: MacAddr = MacAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
    const AP: MacAddr = MacAddr::new([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);

    fn stack() -> MemoryStack {
        let stack = MemoryStack::new();
        stack.add_interface(NetInterface::new(WLAN0, "wlan0", OWN));
        stack.add_interface(NetInterface::new(
            BR0,
            "br0",
            MacAddr::new([0x02, 0, 0, 0, 0, 0x0b]),
        ));
        stack
    }

    fn channel_rx() -> (RxCallback, mpsc::UnboundedReceiver<(MacAddr, Vec<u8>)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback: RxCallback = Arc::new(move |src, frame: &[u8]| {
            let _ = tx.send((src, frame.to_vec()));
        });
        (callback, rx)
    }

    async fn next_frame(rx: &mut mpsc::UnboundedReceiver<(MacAddr, Vec<u8>)>) -> (MacAddr, Vec<u8>) {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("frame not delivered")
            .expect("callback dropped")
    }

    #[tokio::test]
    async fn test_open_resolves_interface() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();

        let l2 = L2Packet::open(
            Arc::new(stack.clone()),
            &eloop,
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            None,
        )
        .unwrap();

        assert!(l2.is_open());
        assert_eq!(l2.ifindex(), WLAN0);
        assert_eq!(l2.own_addr(), OWN);
        assert_eq!(l2.protocol(), ETH_P_EAPOL);
        assert_eq!(stack.open_endpoints(), 1);
        assert_eq!(eloop.registered_count(), 0);
    }

    #[tokio::test]
    async fn test_open_rejects_bad_names() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();

        for name in ["", "abcdefghijklmnopq"] {
            let err = L2Packet::open(
                Arc::new(stack.clone()),
                &eloop,
                L2PacketConfig::new(name, ETH_P_EAPOL),
                None,
            )
            .unwrap_err();
            assert!(matches!(err, TransportError::InvalidInterfaceName(_)));
            assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        }
        assert_eq!(stack.open_endpoints(), 0);
    }

    #[tokio::test]
    async fn test_sixteen_char_name_accepted_for_lookup() {
        let stack = stack();
        stack.add_interface(NetInterface::new(IfIndex(9), "abcdefghijklmnop", OWN));
        let (eloop, _task) = EventLoop::start();

        let l2 = L2Packet::open(
            Arc::new(stack),
            &eloop,
            L2PacketConfig::new("abcdefghijklmnop", ETH_P_EAPOL),
            None,
        )
        .unwrap();
        assert_eq!(l2.ifindex(), IfIndex(9));
    }

    #[tokio::test]
    async fn test_open_unknown_interface() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();

        let err = L2Packet::open(
            Arc::new(stack.clone()),
            &eloop,
            L2PacketConfig::new("wlan9", ETH_P_EAPOL),
            None,
        )
        .unwrap_err();

        assert!(matches!(err, TransportError::InterfaceNotFound(ref name) if name == "wlan9"));
        assert!(err.is_fatal());
        assert_eq!(stack.open_endpoints(), 0);
    }

    #[tokio::test]
    async fn test_open_failure_reported() {
        let stack = stack();
        stack.fail_next_open(io::ErrorKind::PermissionDenied);
        let (eloop, _task) = EventLoop::start();

        let err = L2Packet::open(
            Arc::new(stack.clone()),
            &eloop,
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            None,
        )
        .unwrap_err();

        assert!(matches!(err, TransportError::OpenFailed { protocol: ETH_P_EAPOL, .. }));
        assert_eq!(stack.open_endpoints(), 0);
    }

    #[tokio::test]
    async fn test_bind_failure_releases_endpoint() {
        let stack = stack();
        stack.set_link_up("wlan0", false);
        let (eloop, _task) = EventLoop::start();
        let (rx, _frames) = channel_rx();

        let err = L2Packet::open(
            Arc::new(stack.clone()),
            &eloop,
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            Some(rx),
        )
        .unwrap_err();

        assert!(matches!(err, TransportError::BindFailed { ifindex: WLAN0, .. }));
        assert_eq!(stack.open_endpoints(), 0);
        assert_eq!(eloop.registered_count(), 0);
    }

    #[tokio::test]
    async fn test_close_leaves_no_registration() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();
        let (rx, _frames) = channel_rx();

        let mut l2 = L2Packet::open(
            Arc::new(stack.clone()),
            &eloop,
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            Some(rx),
        )
        .unwrap();
        let id = l2.endpoint_id().unwrap();
        assert!(eloop.is_registered(id));

        l2.close();
        assert!(!l2.is_open());
        assert!(!eloop.is_registered(id));
        assert_eq!(stack.open_endpoints(), 0);

        l2.close();
        assert!(matches!(
            l2.send(AP, ETH_P_EAPOL, b"x").unwrap_err(),
            TransportError::Closed
        ));
    }

    #[tokio::test]
    async fn test_drop_closes_binding() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();
        let (rx, _frames) = channel_rx();

        let l2 = L2Packet::open(
            Arc::new(stack.clone()),
            &eloop,
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            Some(rx),
        )
        .unwrap();
        drop(l2);

        assert_eq!(eloop.registered_count(), 0);
        assert_eq!(stack.open_endpoints(), 0);
    }

    #[tokio::test]
    async fn test_receive_delivers_source_and_payload() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();
        let (rx, mut frames) = channel_rx();

        let _l2 = L2Packet::open(
            Arc::new(stack.clone()),
            &eloop,
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            Some(rx),
        )
        .unwrap();

        // EAPOL-Key, truncated.
        let eapol = hex::decode("0203005f02008a00100000000000000001").unwrap();
        assert_eq!(stack.inject(WLAN0, AP, ETH_P_EAPOL, &eapol), 1);

        let (src, frame) = next_frame(&mut frames).await;
        assert_eq!(src, AP);
        assert_eq!(frame, eapol);
    }

    #[tokio::test]
    async fn test_receive_error_drops_frame() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();
        let (rx, mut frames) = channel_rx();

        let _l2 = L2Packet::open(
            Arc::new(stack.clone()),
            &eloop,
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            Some(rx),
        )
        .unwrap();

        stack.inject_error(WLAN0, io::ErrorKind::ConnectionReset);
        stack.inject(WLAN0, AP, ETH_P_EAPOL, b"after");

        let (_, frame) = next_frame(&mut frames).await;
        assert_eq!(frame, b"after");
    }

    #[tokio::test]
    async fn test_receive_truncates_to_buffer() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();
        let (rx, mut frames) = channel_rx();

        let config = L2PacketConfig::builder("wlan0").recv_buffer_size(4).build();
        let _l2 = L2Packet::open(Arc::new(stack.clone()), &eloop, config, Some(rx)).unwrap();

        stack.inject(WLAN0, AP, ETH_P_EAPOL, b"0123456789");
        let (_, frame) = next_frame(&mut frames).await;
        assert_eq!(frame, b"0123");
    }

    #[tokio::test]
    async fn test_send_datagram_uses_dest_and_protocol() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();

        let l2 = L2Packet::open(
            Arc::new(stack.clone()),
            &eloop,
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            None,
        )
        .unwrap();

        assert_eq!(l2.send(AP, ETH_P_EAPOL, b"\x02\x01\x00\x00").unwrap(), 4);
        let sent = stack.take_sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].ifindex, WLAN0);
        assert_eq!(sent[0].dest, AP);
        assert_eq!(sent[0].protocol, ETH_P_EAPOL);
        assert_eq!(sent[0].frame, b"\x02\x01\x00\x00");
    }

    #[tokio::test]
    async fn test_send_raw_writes_frame_unmodified() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();

        let l2 = L2PacketConfig::builder("wlan0")
            .protocol(ETH_P_ALL)
            .include_link_header(true)
            .open(Arc::new(stack.clone()), &eloop, None)
            .unwrap();

        // EAPOL-Start to the PAE group address.
        let frame = hex::decode("0180c2000003020000000001888e01010000").unwrap();
        assert_eq!(l2.send(MacAddr::ZERO, 0, &frame).unwrap(), frame.len());

        let sent = stack.take_sent();
        assert_eq!(sent[0].dest, MacAddr::new([0x01, 0x80, 0xc2, 0x00, 0x00, 0x03]));
        assert_eq!(sent[0].protocol, ETH_P_EAPOL);
        assert_eq!(sent[0].frame, frame);
    }

    #[tokio::test]
    async fn test_send_failure_returned() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();

        let l2 = L2Packet::open(
            Arc::new(stack.clone()),
            &eloop,
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            None,
        )
        .unwrap();
        stack.set_link_up("wlan0", false);

        let err = l2.send(AP, ETH_P_EAPOL, b"x").unwrap_err();
        assert!(matches!(err, TransportError::SendFailed(_)));
        assert!(!err.is_fatal());
        assert!(stack.sent_frames().is_empty());
    }

    #[tokio::test]
    async fn test_ip_addr_is_first_unicast() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();

        let l2 = L2Packet::open(
            Arc::new(stack.clone()),
            &eloop,
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            None,
        )
        .unwrap();
        assert_eq!(l2.ip_addr(), None);

        stack.set_ipv4(
            "wlan0",
            vec![Ipv4Addr::new(192, 168, 1, 20), Ipv4Addr::new(10, 0, 0, 2)],
        );
        assert_eq!(l2.ip_addr(), Some(Ipv4Addr::new(192, 168, 1, 20)));
    }

    #[tokio::test]
    async fn test_own_addr_fallback_for_zero_hw_addr() {
        let stack = stack();
        stack.add_interface(NetInterface::new(IfIndex(7), "tun0", MacAddr::ZERO));
        let (eloop, _task) = EventLoop::start();

        let l2 = L2PacketConfig::builder("tun0")
            .own_addr(OWN)
            .open(Arc::new(stack.clone()), &eloop, None)
            .unwrap();
        assert_eq!(l2.own_addr(), OWN);

        // A real hardware address wins over the fallback.
        let l2 = L2PacketConfig::builder("br0")
            .own_addr(OWN)
            .open(Arc::new(stack), &eloop, None)
            .unwrap();
        assert_ne!(l2.own_addr(), OWN);
    }

    #[tokio::test]
    async fn test_packet_filter_unsupported_is_ok() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();

        let l2 = L2Packet::open(
            Arc::new(stack),
            &eloop,
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            None,
        )
        .unwrap();

        assert!(l2.set_packet_filter(PacketFilter::Ndisc).is_ok());
        assert!(l2.set_packet_filter(PacketFilter::PktType).is_ok());
    }

    #[tokio::test]
    async fn test_open_bridge_binds_bridge_interface() {
        let stack = stack();
        let (eloop, _task) = EventLoop::start();
        let (rx, mut frames) = channel_rx();

        let l2 = L2Packet::open_bridge(
            Arc::new(stack.clone()),
            &eloop,
            "br0",
            L2PacketConfig::new("wlan0", ETH_P_EAPOL),
            Some(rx),
        )
        .unwrap();
        assert_eq!(l2.ifname(), "br0");
        assert_eq!(l2.ifindex(), BR0);

        assert_eq!(stack.inject(WLAN0, AP, ETH_P_EAPOL, b"wlan"), 0);
        stack.inject(BR0, AP, ETH_P_EAPOL, b"bridge");
        let (_, frame) = next_frame(&mut frames).await;
        assert_eq!(frame, b"bridge");
    }

    #[test]
    fn test_builder_defaults() {
        let config = L2PacketConfig::builder("wlan0").build();
        assert_eq!(config.protocol, ETH_P_EAPOL);
        assert!(!config.include_link_header);
        assert_eq!(config.own_addr, None);
        assert_eq!(config.recv_buffer_size, L2_RECV_BUFFER_SIZE);
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
    }

    proptest! {
        #[test]
        fn prop_close_leaves_nothing_registered(
            ifname in "[a-z][a-z0-9]{0,15}",
            protocol in any::<u16>(),
            raw in any::<bool>(),
        ) {
            let rt = runtime();
            let _guard = rt.enter();
            let stack = MemoryStack::new();
            stack.add_interface(NetInterface::new(IfIndex(7), ifname.as_str(), OWN));
            let (eloop, _task) = EventLoop::start();
            let (rx, _frames) = channel_rx();

            let mut l2 = L2PacketConfig::builder(ifname.as_str())
                .protocol(protocol)
                .include_link_header(raw)
                .open(Arc::new(stack.clone()), &eloop, Some(rx))
                .unwrap();
            prop_assert_eq!(eloop.registered_count(), 1);
            prop_assert_eq!(stack.open_endpoints(), 1);

            l2.close();
            prop_assert_eq!(eloop.registered_count(), 0);
            prop_assert_eq!(stack.open_endpoints(), 0);

            l2.close();
            prop_assert!(!l2.is_open());
            prop_assert_eq!(eloop.registered_count(), 0);
            prop_assert_eq!(stack.open_endpoints(), 0);
        }
    }
}
