use std::thread;
use std::time::{Duration, Instant};
use log::{debug, info, warn};
use crate::drivers::codec::FRAME_BYTES;
use crate::drivers::error::{AcquireError, ConnectError};
use crate::drivers::excitation::Variant;
use crate::drivers::transport::{SerialBackend, SystemSerial, Transport};
pub const BAUD_RATE: u32 = 115_200;
#[derive(Clone, Copy, Debug)]
pub struct LinkTimings {
    /// Pause after opening a port before the first flush.
    pub settle: Duration,
    /// Upper bound on one `request_frame`; also the worst-case stall of an acquisition tick.
    pub acquire_timeout: Duration,
    pub probe_timeout: Duration,
    /// Read timeout handed to the port; how often the deadline is rechecked.
    pub poll_interval: Duration,
}
impl Default for LinkTimings {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(100),
            acquire_timeout: Duration::from_millis(500),
            probe_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_millis(10),
        }
    }
}
/// One complete device answer, exactly [`FRAME_BYTES`] long.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame(Vec<u8>);
impl RawFrame {
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}
struct Connection<P> {
    name: String,
    port: P,
}
/// Serial connection to the curve tracer.
pub struct DeviceLink<B: SerialBackend = SystemSerial> {
    backend: B,
    timings: LinkTimings,
    conn: Option<Connection<B::Port>>,
}
impl DeviceLink<SystemSerial> {
    pub fn system() -> Self {
        Self::new(SystemSerial, LinkTimings::default())
    }
}
impl<B: SerialBackend> DeviceLink<B> {
    pub fn new(backend: B, timings: LinkTimings) -> Self {
        Self {
            backend,
            timings,
            conn: None,
        }
    }
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }
    pub fn port_name(&self) -> Option<&str> {
        self.conn.as_ref().map(|c| c.name.as_str())
    }
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            info!("closed {}", conn.name);
        }
    }
    /// Open `port_name`, settle, and drop stale input. Replaces any previous connection.
    pub fn connect(&mut self, port_name: &str) -> Result<(), ConnectError> {
        self.disconnect();
        let port = self.open_settled(port_name)?;
        info!("connected to {port_name} at {BAUD_RATE} baud");
        self.conn = Some(Connection {
            name: port_name.to_owned(),
            port,
        });
        Ok(())
    }
    /// Look for a tracer on every host port: the first one that answers a
    /// strong-excitation command with a full frame within the probe timeout wins.
    pub fn probe(&self) -> Option<String> {
        let ports = match self.backend.available_ports() {
            Ok(ports) => ports,
            Err(e) => {
                warn!("could not enumerate serial ports: {e}");
                return None;
            }
        };
        for name in ports {
            let mut port = match self.open_settled(&name) {
                Ok(port) => port,
                Err(e) => {
                    debug!("probe skipped {name}: {e}");
                    continue;
                }
            };
            let answered = port
                .send(&[Variant::Strong.command()])
                .map_err(AcquireError::from)
                .and_then(|_| collect_frame(&mut port, self.timings.probe_timeout));
            match answered {
                Ok(_) => {
                    info!("curve tracer detected on {name}");
                    return Some(name);
                }
                Err(e) => debug!("probe skipped {name}: {e}"),
            }
        }
        None
    }
    /// Send one acquisition command and wait for the full answer.
    ///
    /// Blocks for at most `acquire_timeout`. No retry: a failed request is
    /// simply repeated on the next tick.
    pub fn request_frame(&mut self, variant: Variant) -> Result<RawFrame, AcquireError> {
        let conn = self.conn.as_mut().ok_or(AcquireError::NotConnected)?;
        conn.port.clear_input()?;
        conn.port.send(&[variant.command()])?;
        collect_frame(&mut conn.port, self.timings.acquire_timeout).map(RawFrame)
    }
    fn open_settled(&self, port_name: &str) -> Result<B::Port, ConnectError> {
        let mut port = self
            .backend
            .open(port_name, BAUD_RATE, self.timings.poll_interval)
            .map_err(|source| ConnectError::Open {
                port: port_name.to_owned(),
                source,
            })?;
        thread::sleep(self.timings.settle);
        port.clear_input().map_err(|source| ConnectError::Io {
            port: port_name.to_owned(),
            source,
        })?;
        Ok(port)
    }
}
/// Accumulate bytes until exactly one frame is in hand or `timeout` elapses.
fn collect_frame<T: Transport>(port: &mut T, timeout: Duration) -> Result<Vec<u8>, AcquireError> {
    let deadline = Instant::now() + timeout;
    let mut data = Vec::with_capacity(FRAME_BYTES);
    let mut chunk = [0u8; FRAME_BYTES];
    while data.len() < FRAME_BYTES {
        if Instant::now() >= deadline {
            return Err(AcquireError::Timeout {
                received: data.len(),
                expected: FRAME_BYTES,
            });
        }
        let want = FRAME_BYTES - data.len();
        let n = port.read_chunk(&mut chunk[..want])?;
        data.extend_from_slice(&chunk[..n]);
    }
    Ok(data)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::transport::fake::{FakeBackend, FakePort};
    fn fast() -> LinkTimings {
        LinkTimings {
            settle: Duration::ZERO,
            acquire_timeout: Duration::from_millis(50),
            probe_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(1),
        }
    }
    fn frame(fill: u8) -> Vec<u8> {
        vec![fill; FRAME_BYTES]
    }
    #[test]
    fn request_collects_a_chunked_answer() {
        let port = FakePort::answering(b'T', frame(7)).in_chunks(100);
        let sent = port.sent.clone();
        let backend = FakeBackend::default().with_port("/dev/ttyACM0", Some(port));
        let mut link = DeviceLink::new(backend, fast());
        link.connect("/dev/ttyACM0").unwrap();
        let raw = link.request_frame(Variant::Strong).unwrap();
        assert_eq!(raw.bytes(), frame(7).as_slice());
        assert_eq!(sent.borrow().as_slice(), b"T");
    }
    #[test]
    fn request_discards_stale_input_first() {
        let port = FakePort::answering(b'W', frame(1)).with_stale_input(&[0xAA; 10]);
        let backend = FakeBackend::default().with_port("COM3", Some(port));
        let mut link = DeviceLink::new(backend, fast());
        link.connect("COM3").unwrap();
        let raw = link.request_frame(Variant::Weak).unwrap();
        assert!(raw.bytes().iter().all(|b| *b == 1));
    }
    #[test]
    fn short_answer_times_out() {
        let port = FakePort::answering(b'T', vec![0u8; FRAME_BYTES - 16]);
        let backend = FakeBackend::default().with_port("COM3", Some(port));
        let mut link = DeviceLink::new(backend, fast());
        link.connect("COM3").unwrap();
        match link.request_frame(Variant::Strong) {
            Err(AcquireError::Timeout { received, expected }) => {
                assert_eq!(received, FRAME_BYTES - 16);
                assert_eq!(expected, FRAME_BYTES);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        // The weak command gets no answer at all.
        assert!(matches!(
            link.request_frame(Variant::Weak),
            Err(AcquireError::Timeout { received: 0, .. })
        ));
    }
    #[test]
    fn transport_fault_surfaces_as_io() {
        let backend = FakeBackend::default().with_port("COM3", Some(FakePort::faulty()));
        let mut link = DeviceLink::new(backend, fast());
        link.connect("COM3").unwrap();
        assert!(matches!(
            link.request_frame(Variant::Strong),
            Err(AcquireError::Io(_))
        ));
    }
    #[test]
    fn request_without_connection_fails() {
        let mut link = DeviceLink::new(FakeBackend::default(), fast());
        assert!(matches!(
            link.request_frame(Variant::Strong),
            Err(AcquireError::NotConnected)
        ));
    }
    #[test]
    fn connect_to_missing_port_fails() {
        let mut link = DeviceLink::new(FakeBackend::default().with_port("COM1", None), fast());
        let err = link.connect("COM1").unwrap_err();
        assert!(matches!(err, ConnectError::Open { ref port, .. } if port == "COM1"));
        assert!(!link.is_connected());
    }
    #[test]
    fn probe_picks_first_port_with_full_frame() {
        let backend = FakeBackend::default()
            .with_port("COM1", None)
            .with_port("COM2", Some(FakePort::silent()))
            .with_port("COM5", Some(FakePort::answering(b'T', frame(0))))
            .with_port("COM6", Some(FakePort::answering(b'T', frame(0))));
        let link = DeviceLink::new(backend, fast());
        assert_eq!(link.probe().as_deref(), Some("COM5"));
        assert_eq!(
            link.backend.opened.borrow().as_slice(),
            ["COM1", "COM2", "COM5"]
        );
        assert!(!link.is_connected());
    }
    #[test]
    fn probe_ignores_ports_with_short_answers() {
        let backend = FakeBackend::default()
            .with_port("COM2", Some(FakePort::answering(b'T', vec![0; 100])))
            .with_port("COM3", Some(FakePort::answering(b'W', frame(0))));
        let link = DeviceLink::new(backend, fast());
        assert_eq!(link.probe(), None);
    }
}
