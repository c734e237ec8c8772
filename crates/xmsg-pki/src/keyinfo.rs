//! Conversion between DER key material and canonical s-expressions.
//!
//! Reads `SubjectPublicKeyInfo`, signature values and encrypted key
//! values into the symbolic form used by the cryptographic runtime,
//! and emits DER from the symbolic form again.  A hand-written TLV
//! walk is used instead of the schema decoder: the structures are
//! small, fixed, and need exact offset bookkeeping.

use xmsg_types::Error;
use xmsg_utils::asn1::{count_header, write_header, Class, Decoder};
use xmsg_utils::oid::oid_to_string;
use xmsg_utils::sexp::{Sexp, SexpBuilder, SexpParser};

use crate::algo::{self, PkAlgo, Support, ENC_ALGO_TABLE, PK_ALGO_TABLE, SIG_ALGO_TABLE};

const OID_ECDSA_WITH_SPECIFIED: &str = "1.2.840.10045.4.3";
const OID_MGF1: &str = "1.2.840.113549.1.1.8";
const PSS_DEFAULT_SALT_LEN: u32 = 20;

// ── strict TLV cursor ────────────────────────────────────────────────

/// Byte cursor with the strict length rules for key-info material:
/// the indefinite form is not DER, a `0xff` length octet is bad BER,
/// and truncation is an invalid key info.
struct Cur<'a> {
    der: &'a [u8],
    pos: usize,
}

impl<'a> Cur<'a> {
    fn new(der: &'a [u8]) -> Self {
        Self { der, pos: 0 }
    }

    fn remaining_len(&self) -> usize {
        self.der.len() - self.pos
    }

    fn byte(&mut self) -> Result<u8, Error> {
        if self.pos >= self.der.len() {
            return Err(Error::InvalidKeyInfo);
        }
        let b = self.der[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if n > self.remaining_len() {
            return Err(Error::InvalidKeyInfo);
        }
        let out = &self.der[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Read a length field; the result never exceeds the remaining
    /// input.
    fn tlv_len(&mut self) -> Result<usize, Error> {
        let c = self.byte()?;
        if c == 0x80 {
            return Err(Error::NotDerEncoded);
        }
        if c == 0xFF {
            return Err(Error::Ber);
        }
        let len = if c & 0x80 == 0 {
            c as usize
        } else {
            let count = (c & 0x7F) as usize;
            if count > std::mem::size_of::<usize>() {
                return Err(Error::ObjectTooLarge);
            }
            let mut len = 0usize;
            for _ in 0..count {
                if self.pos >= self.der.len() {
                    return Err(Error::Ber);
                }
                len = (len << 8) | self.der[self.pos] as usize;
                self.pos += 1;
            }
            len
        };
        if len > self.remaining_len() {
            return Err(Error::InvalidKeyInfo);
        }
        Ok(len)
    }
}

// ── algorithm identifier ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParmType {
    OctetString,
    ObjectId,
    Sequence,
}

#[derive(Debug)]
struct AlgorithmInfo {
    /// Bytes consumed; with `with_string`, points at the content of
    /// the trailing BIT/OCTET STRING (past the header).
    nread: usize,
    oid_off: usize,
    oid_len: usize,
    /// Offset, length and shape of the parameters, when captured.
    /// For a SEQUENCE the range covers the whole TLV including its
    /// header.
    parm: Option<(usize, usize, ParmType)>,
    is_bit_string: bool,
}

/// Parse `SEQUENCE { OID, parameters OPTIONAL }`, optionally followed
/// by a BIT STRING or OCTET STRING header (`with_string`).
fn get_algorithm(with_string: bool, der: &[u8]) -> Result<AlgorithmInfo, Error> {
    let mut cur = Cur::new(der);

    let c = cur.byte()?;
    if c != 0x30 {
        return Err(Error::UnexpectedTag);
    }
    let seqlen = cur.tlv_len()?;
    let seq_start = cur.pos;

    let c = cur.byte()?;
    if c != 0x06 {
        return Err(Error::UnexpectedTag);
    }
    let oid_len = cur.tlv_len()?;
    let oid_off = cur.pos;
    cur.take(oid_len)?;

    let mut seqlen = seqlen
        .checked_sub(cur.pos - seq_start)
        .ok_or(Error::InvalidKeyInfo)?;
    let mut parm = None;

    if seqlen > 0 {
        let parm_start = cur.pos;
        let c = cur.byte()?;
        if c == 0x05 {
            // NULL parameters must be empty
            if cur.byte()? != 0 {
                return Err(Error::Ber);
            }
        } else {
            let len = cur.tlv_len()?;
            match c {
                0x04 => parm = Some((cur.pos, len, ParmType::OctetString)),
                0x06 => parm = Some((cur.pos, len, ParmType::ObjectId)),
                0x30 => parm = Some((parm_start, len + (cur.pos - parm_start), ParmType::Sequence)),
                _ => {} // unknown parameter shape, skipped
            }
            cur.take(len)?;
        }
        seqlen = seqlen
            .checked_sub(cur.pos - parm_start)
            .ok_or(Error::InvalidKeyInfo)?;
    }

    if seqlen != 0 {
        return Err(Error::InvalidKeyInfo);
    }

    let mut is_bit_string = false;
    if with_string {
        let c = cur.byte()?;
        if c == 0x03 {
            is_bit_string = true;
        } else if c != 0x04 {
            return Err(Error::UnexpectedTag);
        }
        cur.tlv_len()?;
    }

    Ok(AlgorithmInfo {
        nread: cur.pos,
        oid_off,
        oid_len,
        parm,
        is_bit_string,
    })
}

/// Parse an `AlgorithmIdentifier` and return the bytes consumed and
/// the dotted OID string.
pub fn parse_algorithm_identifier(der: &[u8]) -> Result<(usize, String), Error> {
    let (nread, oid, _) = parse_algorithm_identifier_params(der)?;
    Ok((nread, oid))
}

/// Like [`parse_algorithm_identifier`] but also returns a copy of the
/// parameter bytes, when present.
pub fn parse_algorithm_identifier_params(
    der: &[u8],
) -> Result<(usize, String, Option<Vec<u8>>), Error> {
    let info = get_algorithm(false, der)?;
    let oid = oid_to_string(&der[info.oid_off..info.oid_off + info.oid_len])?;

    // ecdsa-with-specified carries the effective algorithm inside its
    // parameter sequence.
    if let Some((off, len, ParmType::Sequence)) = info.parm {
        if oid == OID_ECDSA_WITH_SPECIFIED {
            let sub = &der[off..off + len];
            let inner = get_algorithm(false, sub)?;
            let oid = oid_to_string(&sub[inner.oid_off..inner.oid_off + inner.oid_len])?;
            return Ok((info.nread, oid, None));
        }
    }

    let parm = info
        .parm
        .map(|(off, len, _)| der[off..off + len].to_vec());
    Ok((info.nread, oid, parm))
}

// ── RSASSA-PSS parameters ────────────────────────────────────────────

/// Parse RSASSA-PSS parameters (RFC 4055) and return the hash OID and
/// the salt length.  Only MGF1 with a matching inner hash is accepted;
/// anything else resembling valid ASN.1 but not these parameters is
/// `InvalidObject`.
pub fn get_pss_info(der: &[u8]) -> Result<(String, u32), Error> {
    fn inv(_: Error) -> Error {
        Error::InvalidObject
    }

    let mut seq = Decoder::new(der).read_sequence().map_err(inv)?;

    // [0] hash algorithm
    let t0 = seq.read_context_specific(0, true).map_err(inv)?;
    let mut hseq = Decoder::new(t0.value).read_sequence().map_err(inv)?;
    let hash_oid = oid_to_string(hseq.read_oid().map_err(inv)?).map_err(inv)?;

    // [1] mask generation function
    let t1 = seq.read_context_specific(1, true).map_err(inv)?;
    let mut mseq = Decoder::new(t1.value).read_sequence().map_err(inv)?;
    let mgf_oid = oid_to_string(mseq.read_oid().map_err(inv)?).map_err(inv)?;
    if mgf_oid != OID_MGF1 {
        return Err(Error::InvalidObject);
    }
    let mut mgf_hash_seq = mseq.read_sequence().map_err(inv)?;
    let mgf_hash = oid_to_string(mgf_hash_seq.read_oid().map_err(inv)?).map_err(inv)?;
    if mgf_hash != hash_oid {
        return Err(Error::InvalidObject);
    }

    // [2] salt length, defaulting when absent
    let salt_len = match seq.try_read_context_specific(2, true).map_err(inv)? {
        None => PSS_DEFAULT_SALT_LEN,
        Some(t2) => {
            let v = Decoder::new(t2.value).read_integer().map_err(inv)?;
            if v.len() > 4 {
                return Err(Error::InvalidObject);
            }
            let mut n: u32 = 0;
            for &b in v {
                n = (n << 8) | b as u32;
            }
            n
        }
    };

    Ok((hash_oid, salt_len))
}

// ── DER → s-expression ───────────────────────────────────────────────

/// Walk an element description against TLV-framed values, emitting
/// `(<letter> <raw-bytes>)` for every named integer.
fn walk_elements(
    sb: &mut SexpBuilder,
    der: &[u8],
    elems: &str,
    tags: &[u8],
) -> Result<(), Error> {
    let mut cur = Cur::new(der);
    let elems = elems.as_bytes();
    for (i, &elem) in elems.iter().enumerate() {
        let ctrl = tags[i];
        let (is_int, len) = if ctrl & 0x80 != 0 && i + 1 == elems.len() {
            // Raw remainder without TLV framing
            (true, cur.remaining_len())
        } else {
            let c = cur.byte()?;
            if c != ctrl {
                return Err(Error::UnexpectedTag);
            }
            (c == 0x02, cur.tlv_len()?)
        };
        if is_int && elem != b'-' {
            let value = cur.take(len)?;
            sb.raw("(");
            sb.atom(&[elem]);
            sb.atom(value);
            sb.raw(")");
        }
    }
    Ok(())
}

/// Skip the unused-bits octet of a BIT STRING body.
fn skip_unused_bits(der: &[u8]) -> Result<&[u8], Error> {
    if der.is_empty() {
        return Err(Error::InvalidKeyInfo);
    }
    if der[0] != 0 {
        log::warn!("number of unused bits is not zero");
    }
    Ok(&der[1..])
}

/// Convert a DER `SubjectPublicKeyInfo` to the symbolic
/// `(public-key (<algo> ...))` form.
pub fn keyinfo_to_sexp(der: &[u8]) -> Result<Sexp, Error> {
    let mut cur = Cur::new(der);
    let c = cur.byte()?;
    if c != 0x30 {
        return Err(Error::UnexpectedTag);
    }
    cur.tlv_len()?;
    let sub = &der[cur.pos..];

    let info = get_algorithm(true, sub)?;
    let oid_der = &sub[info.oid_off..info.oid_off + info.oid_len];
    let entry = algo::find_by_oid_der(PK_ALGO_TABLE, oid_der).ok_or(Error::UnknownAlgorithm)?;
    if entry.supported == Support::No {
        return Err(Error::UnsupportedAlgorithm);
    }

    let mut parm_oid = None;
    let mut parm_der = None;
    match info.parm {
        Some((off, len, ParmType::ObjectId)) => {
            parm_oid = Some(oid_to_string(&sub[off..off + len])?);
        }
        Some((off, len, _)) => parm_der = Some(&sub[off..off + len]),
        None => {}
    }

    let mut body = &sub[info.nread..];
    if info.is_bit_string {
        body = skip_unused_bits(body)?;
    }

    let mut sb = SexpBuilder::new();
    sb.raw("(10:public-key(");
    sb.atom_str(entry.algo);

    if entry.pkalgo == PkAlgo::Ecc {
        if let Some(curve) = &parm_oid {
            sb.raw("(").atom_str("curve").atom_str(curve).raw(")");
        }
    }

    if let Some(pd) = parm_der {
        if !entry.parm_elems.is_empty() {
            walk_elements(&mut sb, pd, entry.parm_elems, entry.parm_tags)?;
        }
    }

    walk_elements(&mut sb, body, entry.elems, entry.tags)?;
    sb.raw("))");
    Ok(sb.finish())
}

enum CryptMode<'a> {
    Sig,
    Enc,
    /// ECDH key agreement: the encrypted key and the key-encryption /
    /// key-wrap algorithm OIDs travel alongside the ephemeral key.
    Ecdh {
        encr_algo: &'a str,
        wrap_algo: &'a str,
        enc_key: &'a [u8],
    },
}

fn cryptval_to_sexp(mode: CryptMode, der: &[u8]) -> Result<Sexp, Error> {
    let table = match mode {
        CryptMode::Sig => SIG_ALGO_TABLE,
        _ => ENC_ALGO_TABLE,
    };

    let info = get_algorithm(true, der)?;
    let oid_der = &der[info.oid_off..info.oid_off + info.oid_len];
    let entry = algo::find_by_oid_der(table, oid_der).ok_or(Error::UnknownAlgorithm)?;
    if entry.supported == Support::No {
        return Err(Error::UnsupportedAlgorithm);
    }

    // RSASSA-PSS parameters, when the table marks them and a sequence
    // is present.  Parameters that merely fail the PSS constraints are
    // ignored.
    let mut pss = None;
    if entry.supported == Support::RsaPss {
        if let Some((off, len, ParmType::Sequence)) = info.parm {
            match get_pss_info(&der[off..off + len]) {
                Ok(v) => pss = Some(v),
                Err(Error::InvalidObject) => {}
                Err(e) => return Err(e),
            }
        }
    }

    let mut body = &der[info.nread..];
    if info.is_bit_string {
        body = skip_unused_bits(body)?;
    }

    let mut sb = SexpBuilder::new();
    sb.raw(match mode {
        CryptMode::Sig => "(7:sig-val(",
        _ => "(7:enc-val(",
    });
    sb.atom_str(entry.algo);
    walk_elements(&mut sb, body, entry.elems, entry.tags)?;
    if let CryptMode::Ecdh { enc_key, .. } = mode {
        sb.raw("(1:s").atom(enc_key).raw(")");
    }
    sb.raw(")");

    if matches!(mode, CryptMode::Sig) {
        if let Some(digest) = entry.digest {
            sb.raw("(4:hash").atom_str(digest).raw(")");
        }
        if let Some((hash_oid, salt_len)) = pss {
            sb.raw("(5:flags3:pss)");
            sb.raw("(9:hash-algo").atom_str(&hash_oid).raw(")");
            sb.raw("(11:salt-length").atom_uint(salt_len as u64).raw(")");
        }
    }
    if let CryptMode::Ecdh {
        encr_algo,
        wrap_algo,
        ..
    } = mode
    {
        sb.raw("(9:encr-algo").atom_str(encr_algo).raw(")");
        sb.raw("(9:wrap-algo").atom_str(wrap_algo).raw(")");
    }
    sb.raw(")");
    Ok(sb.finish())
}

/// Convert `AlgorithmIdentifier` + BIT STRING (or OCTET STRING) to a
/// `(sig-val ...)` s-expression.
pub fn sigval_to_sexp(der: &[u8]) -> Result<Sexp, Error> {
    cryptval_to_sexp(CryptMode::Sig, der)
}

/// Convert `AlgorithmIdentifier` + OCTET STRING (or BIT STRING) to an
/// `(enc-val ...)` s-expression.
pub fn encval_to_sexp(der: &[u8]) -> Result<Sexp, Error> {
    cryptval_to_sexp(CryptMode::Enc, der)
}

/// Convert a `[1]`-wrapped originator key plus an already-extracted
/// encrypted key into the ECDH `(enc-val (ecdh ...))` form.
pub fn encval_ecdh_to_sexp(
    der: &[u8],
    encr_algo: &str,
    wrap_algo: &str,
    enc_key: &[u8],
) -> Result<Sexp, Error> {
    let mut cur = Cur::new(der);
    let c = cur.byte().map_err(|_| Error::InvalidObject)?;
    if c & 0xE0 != 0xA0 || c & 0x1F != 1 {
        return Err(Error::InvalidObject);
    }
    cur.tlv_len()?;
    cryptval_to_sexp(
        CryptMode::Ecdh {
            encr_algo,
            wrap_algo,
            enc_key,
        },
        &der[cur.pos..],
    )
}

// ── s-expression → DER ───────────────────────────────────────────────

/// Parameters collected from a key s-expression.
struct SexpKey<'a> {
    oid_der: &'a [u8],
    pkalgo: PkAlgo,
    parms: Vec<(&'a [u8], &'a [u8])>,
}

/// Parse `(<label> (<algo> (<name> <value>)...) [optional...])`,
/// looking the algorithm up in the given tables.
fn parse_key_sexp<'a>(
    sexp: &'a [u8],
    labels: &[&str],
    with_sig: bool,
) -> Result<SexpKey<'a>, Error> {
    if sexp.is_empty() {
        return Err(Error::InvalidValue);
    }
    let mut p = SexpParser::new(sexp);
    p.expect_open()?;
    let label = p.atom()?;
    if !labels.iter().any(|l| l.as_bytes() == label) {
        return Err(Error::UnknownSexp);
    }
    if !p.at_open() {
        return Err(if p.at_digit() {
            Error::UnknownSexp
        } else {
            Error::InvalidSexp
        });
    }
    p.expect_open()?;

    let algo_name = p.atom()?;
    let entry = if with_sig {
        algo::find_by_name(SIG_ALGO_TABLE, algo_name)
            .or_else(|| algo::find_by_name(PK_ALGO_TABLE, algo_name))
    } else {
        algo::find_by_name(PK_ALGO_TABLE, algo_name)
    };
    let entry = entry.ok_or(Error::UnsupportedAlgorithm)?;

    let mut parms = Vec::new();
    while !p.at_close() {
        if parms.len() >= 10 {
            return Err(Error::General("too many key parameters".into()));
        }
        if !p.at_open() {
            return Err(if p.at_digit() {
                Error::UnknownSexp
            } else {
                Error::InvalidSexp
            });
        }
        p.expect_open()?;
        let name = p.atom()?;
        if !p.at_digit() {
            return Err(Error::UnknownSexp);
        }
        let value = p.atom()?;
        if !p.at_close() {
            return Err(Error::UnknownSexp);
        }
        p.expect_close()?;
        parms.push((name, value));
    }
    p.expect_close()?;

    // Optional trailing lists such as (hash ...) or (flags ...)
    while p.at_open() {
        p.skip_expr()?;
    }
    if !p.at_close() {
        return Err(Error::InvalidSexp);
    }

    Ok(SexpKey {
        oid_der: entry.oid_der,
        pkalgo: entry.pkalgo,
        parms,
    })
}

/// Order the collected parameters according to a description string;
/// `C` selects the `curve` parameter.
fn build_index<'a>(
    desc: &str,
    parms: &[(&'a [u8], &'a [u8])],
) -> Result<Vec<&'a [u8]>, Error> {
    let mut out = Vec::with_capacity(desc.len());
    for d in desc.bytes() {
        let wanted: &[u8] = if d == b'C' { b"curve" } else { std::slice::from_ref(&d) };
        let found = parms.iter().find(|(name, _)| *name == wanted);
        match found {
            Some((_, value)) => out.push(*value),
            None => return Err(Error::UnknownSexp),
        }
    }
    Ok(out)
}

fn lookup_parm<'a>(parms: &[(&'a [u8], &'a [u8])], name: &[u8]) -> Option<&'a [u8]> {
    parms.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

/// Emit `INTEGER` TLVs for the given values into `buf`.
fn write_integers(buf: &mut Vec<u8>, values: &[&[u8]]) {
    for v in values {
        write_header(buf, Class::Universal, 2, false, v.len());
        buf.extend_from_slice(v);
    }
}

fn integers_len(values: &[&[u8]]) -> usize {
    values
        .iter()
        .map(|v| count_header(Class::Universal, 2, false, v.len()) + v.len())
        .sum()
}

/// Emit the `AlgorithmIdentifier` SEQUENCE for the resolved algorithm.
fn write_algorithm_identifier(
    buf: &mut Vec<u8>,
    oid_der: &[u8],
    algoparm_seq: Option<&[u8]>,
    curve_oid: Option<&[u8]>,
    pkalgo: PkAlgo,
) {
    let mut n = count_header(Class::Universal, 6, false, oid_der.len()) + oid_der.len();
    if let Some(seq) = algoparm_seq {
        n += seq.len();
    } else if let Some(curve) = curve_oid {
        n += count_header(Class::Universal, 6, false, curve.len()) + curve.len();
    } else if pkalgo == PkAlgo::Rsa {
        n += count_header(Class::Universal, 5, false, 0);
    }

    write_header(buf, Class::Universal, 16, true, n);
    write_header(buf, Class::Universal, 6, false, oid_der.len());
    buf.extend_from_slice(oid_der);
    if let Some(seq) = algoparm_seq {
        buf.extend_from_slice(seq);
    } else if let Some(curve) = curve_oid {
        write_header(buf, Class::Universal, 6, false, curve.len());
        buf.extend_from_slice(curve);
    } else if pkalgo == PkAlgo::Rsa {
        write_header(buf, Class::Universal, 5, false, 0);
    }
}

/// Resolve the per-algorithm parameter layout; ECC keys naming an
/// EdDSA curve are reassigned to the matching algorithm.
fn key_layout<'a>(
    key: &mut SexpKey<'a>,
) -> Result<(&'static str, Option<&'static str>), Error> {
    Ok(match key.pkalgo {
        PkAlgo::Rsa => ("ne", None),
        PkAlgo::Dsa => ("y", Some("pqg")),
        PkAlgo::Ecc => {
            let mut desc = "Cq";
            if let Some(curve) = lookup_parm(&key.parms, b"curve") {
                let reassign = if curve == b"Ed25519" {
                    Some((PkAlgo::Ed25519, "1.3.101.112"))
                } else if curve == b"Ed448" {
                    Some((PkAlgo::Ed448, "1.3.101.113"))
                } else {
                    None
                };
                if let Some((pkalgo, oid)) = reassign {
                    let entry = PK_ALGO_TABLE
                        .iter()
                        .find(|e| e.oid == oid)
                        .ok_or(Error::UnknownAlgorithm)?;
                    key.pkalgo = pkalgo;
                    key.oid_der = entry.oid_der;
                    desc = "q";
                }
            }
            (desc, None)
        }
        _ => return Err(Error::UnknownAlgorithm),
    })
}

/// Build a DER `SubjectPublicKeyInfo` from a `(public-key ...)`
/// s-expression.
pub fn keyinfo_from_sexp(sexp: &[u8]) -> Result<Vec<u8>, Error> {
    let mut key = parse_key_sexp(sexp, &["public-key"], false)?;
    let (parmdesc, algoparmdesc) = key_layout(&mut key)?;
    let values = build_index(parmdesc, &key.parms)?;

    let curve_oid = if key.pkalgo == PkAlgo::Ecc {
        Some(algo::curve_oid_der(values[0]).ok_or(Error::UnknownSexp)?)
    } else {
        None
    };

    // Step 1: the public key value wrapped in a BIT STRING.
    let mut bitstr = Vec::new();
    match key.pkalgo {
        PkAlgo::Ecc => {
            let q = values[1];
            write_header(&mut bitstr, Class::Universal, 3, false, q.len() + 1);
            bitstr.push(0);
            bitstr.extend_from_slice(q);
        }
        PkAlgo::Ed25519 | PkAlgo::Ed448 => {
            let q = values[0];
            write_header(&mut bitstr, Class::Universal, 3, false, q.len() + 1);
            bitstr.push(0);
            bitstr.extend_from_slice(q);
        }
        _ => {
            // RSA and DSA: integers, wrapped in a SEQUENCE when there
            // is more than one.
            let n = integers_len(&values);
            let mut n1 = 1 + n;
            if values.len() > 1 {
                n1 += count_header(Class::Universal, 16, true, n);
            }
            write_header(&mut bitstr, Class::Universal, 3, false, n1);
            bitstr.push(0);
            if values.len() > 1 {
                write_header(&mut bitstr, Class::Universal, 16, true, n);
            }
            write_integers(&mut bitstr, &values);
        }
    }

    // Algorithm parameters carried as a SEQUENCE of integers (DSA).
    let algoparm_seq = match algoparmdesc {
        Some(desc) => {
            let parm_values = build_index(desc, &key.parms)?;
            let n = integers_len(&parm_values);
            let mut seq = Vec::new();
            write_header(&mut seq, Class::Universal, 16, true, n);
            write_integers(&mut seq, &parm_values);
            Some(seq)
        }
        None => None,
    };

    // Step 2: the outer SubjectPublicKeyInfo sequence.
    let mut algoid = Vec::new();
    write_algorithm_identifier(
        &mut algoid,
        key.oid_der,
        algoparm_seq.as_deref(),
        curve_oid.as_deref(),
        key.pkalgo,
    );

    let mut out = Vec::new();
    write_header(
        &mut out,
        Class::Universal,
        16,
        true,
        algoid.len() + bitstr.len(),
    );
    out.extend_from_slice(&algoid);
    out.extend_from_slice(&bitstr);
    Ok(out)
}

/// Build a DER `AlgorithmIdentifier` from a `(sig-val ...)` or
/// `(public-key ...)` s-expression.
pub fn algoinfo_from_sexp(sexp: &[u8]) -> Result<Vec<u8>, Error> {
    let mut key = parse_key_sexp(sexp, &["sig-val", "public-key"], true)?;

    let (parmdesc, algoparmdesc): (&str, Option<&str>) = match key.pkalgo {
        PkAlgo::Rsa => ("", None),
        PkAlgo::Dsa => ("", Some("pqg")),
        PkAlgo::Ecc => ("C", None),
        _ => return Err(Error::UnknownAlgorithm),
    };
    let values = build_index(parmdesc, &key.parms)?;

    let curve_oid = if key.pkalgo == PkAlgo::Ecc {
        Some(algo::curve_oid_der(values[0]).ok_or(Error::UnknownSexp)?)
    } else {
        None
    };

    let algoparm_seq = match algoparmdesc {
        Some(desc) => {
            let parm_values = build_index(desc, &key.parms)?;
            let n = integers_len(&parm_values);
            let mut seq = Vec::new();
            write_header(&mut seq, Class::Universal, 16, true, n);
            write_integers(&mut seq, &parm_values);
            Some(seq)
        }
        None => None,
    };

    let mut out = Vec::new();
    write_algorithm_identifier(
        &mut out,
        key.oid_der,
        algoparm_seq.as_deref(),
        curve_oid.as_deref(),
        key.pkalgo,
    );
    Ok(out)
}
