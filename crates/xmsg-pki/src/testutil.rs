//! Shared builders for hand-made DER test objects.

use xmsg_utils::asn1::Encoder;

pub(crate) const SERIAL: u8 = 0x42;
pub(crate) const OID_RSA: &[u8] = b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01";
pub(crate) const OID_SHA256_RSA: &[u8] = b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b";
pub(crate) const OID_SHA256: &[u8] = b"\x60\x86\x48\x01\x65\x03\x04\x02\x01";

/// `AlgorithmIdentifier` with NULL parameters.
pub(crate) fn algo_id_null(oid: &[u8]) -> Vec<u8> {
    let mut inner = Encoder::new();
    inner.write_oid(oid);
    inner.write_null();
    let inner = inner.finish();
    let mut enc = Encoder::new();
    enc.write_sequence(&inner);
    enc.finish()
}

/// A single-RDN name, e.g. `CN=<value>`.
pub(crate) fn name_cn(cn: &str) -> Vec<u8> {
    name(&[(&[0x55, 0x04, 0x03], cn)])
}

/// A name with one UTF8String attribute per RDN.
pub(crate) fn name(attrs: &[(&[u8], &str)]) -> Vec<u8> {
    let mut rdns = Encoder::new();
    for (oid, value) in attrs {
        let mut atv = Encoder::new();
        atv.write_oid(oid);
        atv.write_utf8_string(value);
        let atv = atv.finish();
        let mut seq = Encoder::new();
        seq.write_sequence(&atv);
        let seq = seq.finish();
        let mut set = Encoder::new();
        set.write_set(&seq);
        rdns.write_raw(&set.finish());
    }
    let rdns = rdns.finish();
    let mut enc = Encoder::new();
    enc.write_sequence(&rdns);
    enc.finish()
}

/// A small RSA `SubjectPublicKeyInfo`.
pub(crate) fn rsa_spki_der() -> Vec<u8> {
    let mut n = vec![0x00, 0xC1];
    n.extend_from_slice(&[0x6D; 62]);
    let mut ints = Encoder::new();
    ints.write_tlv(0x02, &n);
    ints.write_tlv(0x02, &[0x01, 0x00, 0x01]);
    let ints = ints.finish();
    let mut keyseq = Encoder::new();
    keyseq.write_sequence(&ints);
    let keyseq = keyseq.finish();

    let mut body = Encoder::new();
    body.write_raw(&algo_id_null(OID_RSA));
    body.write_bit_string(0, &keyseq);
    let body = body.finish();
    let mut enc = Encoder::new();
    enc.write_sequence(&body);
    enc.finish()
}

/// A complete, internally consistent certificate (the signature bytes
/// are filler, not a real signature).
pub(crate) fn test_cert_der() -> Vec<u8> {
    let mut tbs_body = Encoder::new();

    // version [0] EXPLICIT INTEGER 2
    let mut version = Encoder::new();
    version.write_integer(&[0x02]);
    let version = version.finish();
    tbs_body.write_context_specific(0, true, &version);

    // serialNumber
    tbs_body.write_integer(&[SERIAL]);

    // signature (inner) AlgorithmIdentifier
    tbs_body.write_raw(&algo_id_null(OID_SHA256_RSA));

    // issuer
    tbs_body.write_raw(&name_cn("Test CA"));

    // validity
    let mut validity = Encoder::new();
    validity.write_tlv(0x17, b"250101000000Z");
    validity.write_tlv(0x17, b"350101000000Z");
    let validity = validity.finish();
    tbs_body.write_sequence(&validity);

    // subject
    tbs_body.write_raw(&name(&[
        (&[0x55, 0x04, 0x0A], "Example Org"),
        (&[0x55, 0x04, 0x03], "Leaf"),
    ]));

    // subjectPublicKeyInfo
    tbs_body.write_raw(&rsa_spki_der());

    // extensions [3] EXPLICIT { basicConstraints }
    let mut ext = Encoder::new();
    ext.write_oid(&[0x55, 0x1D, 0x13]);
    ext.write_octet_string(&[0x30, 0x00]);
    let ext = ext.finish();
    let mut ext_seq = Encoder::new();
    ext_seq.write_sequence(&ext);
    let ext_seq = ext_seq.finish();
    let mut exts = Encoder::new();
    exts.write_sequence(&ext_seq);
    let exts = exts.finish();
    tbs_body.write_context_specific(3, true, &exts);

    let tbs_body = tbs_body.finish();
    let mut tbs = Encoder::new();
    tbs.write_sequence(&tbs_body);
    let tbs = tbs.finish();

    let mut cert_body = Encoder::new();
    cert_body.write_raw(&tbs);
    cert_body.write_raw(&algo_id_null(OID_SHA256_RSA));
    cert_body.write_bit_string(0, &[0x5C; 64]);
    let cert_body = cert_body.finish();
    let mut enc = Encoder::new();
    enc.write_sequence(&cert_body);
    enc.finish()
}
