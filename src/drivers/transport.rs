use std::io::{self, Read, Write};
use std::time::Duration;
use serialport::{ClearBuffer, DataBits, Parity, SerialPort, StopBits};
/// Byte-level access to an open serial endpoint.
pub trait Transport {
    /// Drop anything the device sent before our next command.
    fn clear_input(&mut self) -> io::Result<()>;
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;
    /// Read what is available, waiting at most one poll interval.
    /// Returns `Ok(0)` when nothing arrived in that interval.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}
/// Something that can enumerate and open serial endpoints.
pub trait SerialBackend {
    type Port: Transport;
    fn available_ports(&self) -> io::Result<Vec<String>>;
    fn open(&self, name: &str, baud_rate: u32, poll_interval: Duration) -> io::Result<Self::Port>;
}
impl Transport for Box<dyn SerialPort> {
    fn clear_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(io::Error::from)
    }
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)?;
        self.flush()
    }
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}
/// Host serial ports through the `serialport` crate, 8N1.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemSerial;
impl SerialBackend for SystemSerial {
    type Port = Box<dyn SerialPort>;
    fn available_ports(&self) -> io::Result<Vec<String>> {
        Ok(serialport::available_ports()?
            .into_iter()
            .map(|info| info.port_name)
            .collect())
    }
    fn open(&self, name: &str, baud_rate: u32, poll_interval: Duration) -> io::Result<Self::Port> {
        serialport::new(name, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(poll_interval)
            .open()
            .map_err(io::Error::from)
    }
}
