//! Reading and writing of single tag-length headers.
//!
//! The reading side accepts BER, including the indefinite-length form
//! for constructed values.  The writing side emits DER only: definite
//! lengths in their shortest form.

use std::io::Read;

use xmsg_types::Error;

use super::reader::BerReader;
use super::{Class, TagInfo};

/// Read one tag-length header from the stream.
///
/// End of input at the first identifier octet is reported as
/// `ObjectTooShort`.  A length octet of `0xff` is rejected as bad BER,
/// and the indefinite form is only accepted for constructed values.
pub fn read_header<R: Read>(reader: &mut BerReader<R>) -> Result<TagInfo, Error> {
    let mut header = Vec::with_capacity(6);

    let first = match reader.read_byte()? {
        Some(b) => b,
        None => return Err(Error::ObjectTooShort),
    };
    header.push(first);

    let class = Class::from_identifier(first);
    let constructed = (first & 0x20) != 0;

    let mut tag = (first & 0x1F) as u32;
    if tag == 0x1F {
        // High tag numbers continue base-128 in the following octets
        tag = 0;
        loop {
            let b = reader.read_byte()?.ok_or(Error::ObjectTooShort)?;
            header.push(b);
            if tag > u32::MAX >> 7 {
                return Err(Error::Ber);
            }
            tag = tag << 7 | (b & 0x7F) as u32;
            if (b & 0x80) == 0 {
                break;
            }
        }
    }

    let lenbyte = reader.read_byte()?.ok_or(Error::ObjectTooShort)?;
    header.push(lenbyte);

    let mut length = 0usize;
    let mut indefinite = false;
    if lenbyte == 0xFF {
        return Err(Error::Ber);
    } else if lenbyte == 0x80 {
        if !constructed {
            return Err(Error::Ber);
        }
        indefinite = true;
    } else if lenbyte & 0x80 != 0 {
        let count = (lenbyte & 0x7F) as usize;
        if count > std::mem::size_of::<usize>() {
            return Err(Error::ObjectTooLarge);
        }
        for _ in 0..count {
            let b = reader.read_byte()?.ok_or(Error::ObjectTooShort)?;
            header.push(b);
            length = (length << 8) | b as usize;
        }
    } else {
        length = lenbyte as usize;
    }

    Ok(TagInfo {
        class,
        tag,
        constructed,
        length,
        indefinite,
        header,
    })
}

fn tag_octets(tag: u32) -> usize {
    if tag < 0x1F {
        1
    } else {
        let mut n = 2;
        let mut t = tag >> 7;
        while t > 0 {
            n += 1;
            t >>= 7;
        }
        n
    }
}

fn length_octets(length: usize) -> usize {
    if length < 0x80 {
        1
    } else {
        let mut n = 2;
        let mut l = length >> 8;
        while l > 0 {
            n += 1;
            l >>= 8;
        }
        n
    }
}

/// Append the DER header for a value of `length` content bytes.
pub fn write_header(buf: &mut Vec<u8>, class: Class, tag: u32, constructed: bool, length: usize) {
    let lead = class.bits() | if constructed { 0x20 } else { 0x00 };

    if tag < 0x1F {
        buf.push(lead | tag as u8);
    } else {
        buf.push(lead | 0x1F);
        let octets = tag_octets(tag) - 1;
        for i in (0..octets).rev() {
            let b = ((tag >> (7 * i)) & 0x7F) as u8;
            buf.push(if i > 0 { b | 0x80 } else { b });
        }
    }

    if length < 0x80 {
        buf.push(length as u8);
    } else {
        let octets = length_octets(length) - 1;
        buf.push(0x80 | octets as u8);
        for i in (0..octets).rev() {
            buf.push((length >> (8 * i)) as u8);
        }
    }
}

/// Number of header octets [`write_header`] would emit.
///
/// Used for the two-pass length computation when emitting nested DER
/// structures.
pub fn count_header(class: Class, tag: u32, constructed: bool, length: usize) -> usize {
    let _ = (class, constructed);
    tag_octets(tag) + length_octets(length)
}
