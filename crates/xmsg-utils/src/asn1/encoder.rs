//! DER output buffer.
//!
//! A thin, append-only layer over the header codec in this module:
//! every write goes through [`write_header`](super::write_header), so
//! the emitted bytes always agree with what `count_header` predicts
//! for two-pass emitters.

use super::{tags, time, tlv, Class};

/// An append-only buffer producing DER-encoded values.
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// The encoded bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Append already-encoded bytes verbatim.
    pub fn write_raw(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    /// Append a complete TLV.  `tag` is a single identifier octet,
    /// which covers every tag this library emits.
    pub fn write_tlv(&mut self, tag: u8, value: &[u8]) -> &mut Self {
        debug_assert!(tag & 0x1F != 0x1F, "high tag numbers take the long form");
        tlv::write_header(
            &mut self.buf,
            Class::from_identifier(tag),
            (tag & 0x1F) as u32,
            tag & tags::CONSTRUCTED != 0,
            value.len(),
        );
        self.write_raw(value)
    }

    /// Append an INTEGER, inserting a sign octet when the value would
    /// otherwise read as negative.
    pub fn write_integer(&mut self, value: &[u8]) -> &mut Self {
        let sign = value.first().is_some_and(|b| b & 0x80 != 0) as usize;
        tlv::write_header(&mut self.buf, Class::Universal, 2, false, value.len() + sign);
        if sign != 0 {
            self.buf.push(0x00);
        }
        self.write_raw(value)
    }

    /// Append an OID from raw encoded value bytes.
    pub fn write_oid(&mut self, oid_bytes: &[u8]) -> &mut Self {
        self.write_tlv(tags::OID, oid_bytes)
    }

    /// Append a NULL.
    pub fn write_null(&mut self) -> &mut Self {
        self.write_tlv(tags::NULL, &[])
    }

    /// Append an OCTET STRING.
    pub fn write_octet_string(&mut self, value: &[u8]) -> &mut Self {
        self.write_tlv(tags::OCTET_STRING, value)
    }

    /// Append a BIT STRING carrying `value` after an unused-bits octet.
    pub fn write_bit_string(&mut self, unused_bits: u8, value: &[u8]) -> &mut Self {
        tlv::write_header(&mut self.buf, Class::Universal, 3, false, value.len() + 1);
        self.buf.push(unused_bits);
        self.write_raw(value)
    }

    /// Append a UTF8String.
    pub fn write_utf8_string(&mut self, s: &str) -> &mut Self {
        self.write_tlv(tags::UTF8_STRING, s.as_bytes())
    }

    /// Append a UTCTime from a UNIX timestamp.
    pub fn write_utc_time(&mut self, timestamp: i64) -> &mut Self {
        let s = time::unix_to_utc_time(timestamp);
        self.write_tlv(tags::UTC_TIME, s.as_bytes())
    }

    /// Append a GeneralizedTime from a UNIX timestamp.
    pub fn write_generalized_time(&mut self, timestamp: i64) -> &mut Self {
        let s = time::unix_to_generalized_time(timestamp);
        self.write_tlv(tags::GENERALIZED_TIME, s.as_bytes())
    }

    /// Append a SEQUENCE around already-encoded contents.
    pub fn write_sequence(&mut self, contents: &[u8]) -> &mut Self {
        self.write_tlv(tags::SEQUENCE, contents)
    }

    /// Append a SET around already-encoded contents.
    pub fn write_set(&mut self, contents: &[u8]) -> &mut Self {
        self.write_tlv(tags::SET, contents)
    }

    /// Append a context-specific tagged value.
    pub fn write_context_specific(
        &mut self,
        tag_num: u8,
        constructed: bool,
        content: &[u8],
    ) -> &mut Self {
        tlv::write_header(
            &mut self.buf,
            Class::Context,
            tag_num as u32,
            constructed,
            content.len(),
        );
        self.write_raw(content)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn1::{count_header, read_header, BerReader, Decoder};

    #[test]
    fn test_write_utf8_string() {
        let mut enc = Encoder::new();
        enc.write_utf8_string("Hello");
        assert_eq!(enc.finish(), &[0x0C, 5, b'H', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_write_integer_pads_high_bit() {
        let mut enc = Encoder::new();
        enc.write_integer(&[0x80]);
        assert_eq!(enc.finish(), &[0x02, 0x02, 0x00, 0x80]);
    }

    #[test]
    fn test_write_null_and_bit_string() {
        let mut enc = Encoder::new();
        enc.write_null();
        enc.write_bit_string(0, &[0xAB]);
        assert_eq!(enc.finish(), &[0x05, 0x00, 0x03, 0x02, 0x00, 0xAB]);
    }

    #[test]
    fn test_write_long_length() {
        let mut enc = Encoder::new();
        enc.write_octet_string(&[0u8; 200]);
        let der = enc.finish();
        assert_eq!(&der[..3], &[0x04, 0x81, 200]);
        assert_eq!(der.len(), 203);
    }

    #[test]
    fn test_write_context_specific() {
        let mut inner = Encoder::new();
        inner.write_integer(&[0x02]);
        let inner_der = inner.finish();
        let mut enc = Encoder::new();
        enc.write_context_specific(0, true, &inner_der);
        assert_eq!(enc.finish(), &[0xA0, 3, 0x02, 1, 0x02]);
    }

    #[test]
    fn test_output_agrees_with_header_codec() {
        // Whatever the encoder emits must parse back through the
        // streaming header reader with a matching count_header
        let mut enc = Encoder::new();
        enc.write_set(&[0u8; 300]);
        let der = enc.finish();

        let mut reader = BerReader::from_bytes(&der);
        let ti = read_header(&mut reader).unwrap();
        assert_eq!(ti.class, Class::Universal);
        assert_eq!(ti.tag, 0x11);
        assert!(ti.constructed);
        assert_eq!(ti.length, 300);
        assert_eq!(
            ti.header_len(),
            count_header(Class::Universal, 0x11, true, 300)
        );
    }

    #[test]
    fn test_write_time_roundtrip() {
        let ts = 1_736_942_400i64; // 2025-01-15 12:00:00 UTC
        let mut enc = Encoder::new();
        enc.write_utc_time(ts);
        enc.write_generalized_time(ts);
        let der = enc.finish();
        let mut dec = Decoder::new(&der);
        assert_eq!(dec.read_time().unwrap(), ts);
        assert_eq!(dec.read_time().unwrap(), ts);
    }
}
