//! RFC 2253 rendering of distinguished names.

use std::fmt::Write as _;

use xmsg_types::Error;
use xmsg_utils::asn1::{string_value, Decoder, Node};
use xmsg_utils::oid::Oid;

/// Map well-known attribute type OIDs to their RFC 2253 short names.
fn attr_short_name(oid: &Oid) -> Option<&'static str> {
    match oid.arcs() {
        [2, 5, 4, 3] => Some("CN"),
        [2, 5, 4, 6] => Some("C"),
        [2, 5, 4, 7] => Some("L"),
        [2, 5, 4, 8] => Some("ST"),
        [2, 5, 4, 9] => Some("STREET"),
        [2, 5, 4, 10] => Some("O"),
        [2, 5, 4, 11] => Some("OU"),
        [0, 9, 2342, 19200300, 100, 1, 25] => Some("DC"),
        [0, 9, 2342, 19200300, 100, 1, 1] => Some("UID"),
        _ => None,
    }
}

/// Append a string value with RFC 2253 escaping.
fn push_escaped(out: &mut String, s: &str) {
    let last = s.chars().count().saturating_sub(1);
    for (i, ch) in s.chars().enumerate() {
        match ch {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' => {
                out.push('\\');
                out.push(ch);
            }
            '#' | ' ' if i == 0 => {
                out.push('\\');
                out.push(ch);
            }
            ' ' if i == last => {
                out.push('\\');
                out.push(ch);
            }
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
}

/// Append the `#hexstring` form of a raw BER value.
fn push_hex(out: &mut String, tlv: &[u8]) {
    out.push('#');
    for b in tlv {
        let _ = write!(out, "{b:02X}");
    }
}

/// Render a decoded `RDNSequence` node as an RFC 2253 string: RDNs in
/// reverse order, multi-valued RDNs joined with `+`.
pub(crate) fn dn_to_string(image: &[u8], rdn_sequence: &Node) -> Result<String, Error> {
    let mut out = String::new();
    for (i, rdn) in rdn_sequence.children.iter().rev().enumerate() {
        if i > 0 {
            out.push(',');
        }
        for (j, atv) in rdn.children.iter().enumerate() {
            if j > 0 {
                out.push('+');
            }
            render_atv(image, atv, &mut out)?;
        }
    }
    Ok(out)
}

fn render_atv(image: &[u8], atv: &Node, out: &mut String) -> Result<(), Error> {
    let [ty, value] = atv.children.as_slice() else {
        return Err(Error::InvalidObject);
    };
    let oid_bytes = ty.content(image).ok_or(Error::InvalidObject)?;
    let oid = Oid::from_der_value(oid_bytes)?;
    let value_tlv = value.tlv_span(image).ok_or(Error::InvalidObject)?;

    match attr_short_name(&oid) {
        Some(name) => {
            out.push_str(name);
            out.push('=');
            let tlv = Decoder::new(value_tlv).read_tlv()?;
            match string_value(tlv.tag, tlv.value) {
                Ok(s) => push_escaped(out, &s),
                // Not a string type: fall back to the hex form
                Err(_) => push_hex(out, value_tlv),
            }
        }
        None => {
            out.push_str(&oid.to_dot_string());
            out.push('=');
            push_hex(out, value_tlv);
        }
    }
    Ok(())
}
