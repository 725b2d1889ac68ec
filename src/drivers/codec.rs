use crate::drivers::error::DecodeError;
/// Size of one device answer on the wire.
pub const FRAME_BYTES: usize = 2016;
pub const FRAME_WORDS: usize = FRAME_BYTES / 2;
/// Points per stream after de-interleaving.
pub const POINTS_PER_FRAME: usize = FRAME_WORDS / 3;
/// The ADC is 12 bits wide; the upper nibble of each word is noise.
pub const SAMPLE_MASK: u16 = 0x0FFF;
/// One decoded sweep: the three interleaved streams plus derived currents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Triplet {
    pub drive_voltage: Vec<i32>,
    pub ch1_raw: Vec<i32>,
    pub ch2_raw: Vec<i32>,
    pub ch1_current: Vec<i32>,
    pub ch2_current: Vec<i32>,
}
/// Probe channel on the front panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Ch1,
    Ch2,
}
impl Triplet {
    pub fn from_streams(drive_voltage: Vec<i32>, ch1_raw: Vec<i32>, ch2_raw: Vec<i32>) -> Self {
        let ch1_current = currents(&drive_voltage, &ch1_raw);
        let ch2_current = currents(&drive_voltage, &ch2_raw);
        Self {
            drive_voltage,
            ch1_raw,
            ch2_raw,
            ch1_current,
            ch2_current,
        }
    }
    pub fn len(&self) -> usize {
        self.drive_voltage.len()
    }
    pub fn is_empty(&self) -> bool {
        self.drive_voltage.is_empty()
    }
    /// (voltage, current) pairs for one channel, in acquisition order.
    pub fn points(&self, channel: Channel) -> impl Iterator<Item = (f64, f64)> + '_ {
        let (voltage, current) = match channel {
            Channel::Ch1 => (&self.ch1_raw, &self.ch1_current),
            Channel::Ch2 => (&self.ch2_raw, &self.ch2_current),
        };
        voltage
            .iter()
            .zip(current)
            .map(|(v, i)| (*v as f64, *i as f64))
    }
}
fn currents(drive_voltage: &[i32], raw: &[i32]) -> Vec<i32> {
    drive_voltage.iter().zip(raw).map(|(d, r)| d - r).collect()
}
/// Decode a raw device answer into a [`Triplet`].
///
/// Words are little-endian and masked to 12 bits, then split by index modulo
/// three into drive voltage, channel 1 and channel 2.
pub fn decode(bytes: &[u8]) -> Result<Triplet, DecodeError> {
    if bytes.len() != FRAME_BYTES {
        return Err(DecodeError::FrameLength {
            expected: FRAME_BYTES,
            actual: bytes.len(),
        });
    }
    let words: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]) & SAMPLE_MASK)
        .collect();
    if words.len() != FRAME_WORDS {
        return Err(DecodeError::FrameCount {
            expected: FRAME_WORDS,
            actual: words.len(),
        });
    }
    let mut drive_voltage = Vec::with_capacity(POINTS_PER_FRAME);
    let mut ch1_raw = Vec::with_capacity(POINTS_PER_FRAME);
    let mut ch2_raw = Vec::with_capacity(POINTS_PER_FRAME);
    for (idx, word) in words.into_iter().enumerate() {
        let value = i32::from(word);
        match idx % 3 {
            0 => drive_voltage.push(value),
            1 => ch1_raw.push(value),
            _ => ch2_raw.push(value),
        }
    }
    Ok(Triplet::from_streams(drive_voltage, ch1_raw, ch2_raw))
}
/// Build a wire frame from 1008 words; the inverse of [`decode`] before masking.
#[cfg(test)]
pub fn encode_words(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}
