//! Record codec for the event log
//!
//! Splits a raw byte stream into fixed-size `InputEvent` records.

use bytes::BytesMut;

use super::{InputEvent, RECORD_SIZE};

/// Decodes records from a growing byte buffer
pub struct RecordDecoder {
    buf: BytesMut,
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(RECORD_SIZE * 64),
        }
    }

    /// Buffer that reads should append into
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Attempt to decode one record.
    /// Returns None if more data is needed
    pub fn decode(&mut self) -> Option<InputEvent> {
        if self.buf.len() < RECORD_SIZE {
            return None;
        }

        let record = self.buf.split_to(RECORD_SIZE);
        InputEvent::from_bytes(&record)
    }

    /// Bytes buffered that do not yet form a complete record
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a sequence of events into log bytes
#[cfg(test)]
pub(crate) fn encode_records<'a, I>(events: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a InputEvent>,
{
    events
        .into_iter()
        .flat_map(|event| event.to_bytes())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use bytes::BufMut;

    fn key(sec: i64, usec: i64, value: i32) -> InputEvent {
        InputEvent::new(EventTime::new(sec, usec), 1, 30, value)
    }

    #[test]
    fn test_decode_waits_for_full_record() {
        let mut decoder = RecordDecoder::new();
        let bytes = key(1, 2, 1).to_bytes();

        decoder.buffer_mut().put_slice(&bytes[..10]);
        assert!(decoder.decode().is_none());

        decoder.buffer_mut().put_slice(&bytes[10..]);
        assert_eq!(decoder.decode(), Some(key(1, 2, 1)));
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_multiple_records() {
        let events = vec![key(1, 0, 1), key(1, 50_000, 0), key(1, 120_000, 1)];
        let mut decoder = RecordDecoder::new();
        decoder.buffer_mut().put_slice(&encode_records(&events));

        for expected in &events {
            assert_eq!(decoder.decode().as_ref(), Some(expected));
        }
        assert!(decoder.decode().is_none());
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_trailing_bytes_are_left_pending() {
        let mut data = encode_records(&[key(0, 0, 1)]);
        data.extend_from_slice(&[0xAA; 5]);

        let mut decoder = RecordDecoder::new();
        decoder.buffer_mut().put_slice(&data);

        assert!(decoder.decode().is_some());
        assert!(decoder.decode().is_none());
        assert_eq!(decoder.pending(), 5);
    }
}
