//! Static algorithm and curve tables.
//!
//! The tables drive the key-info codec: each entry describes how the
//! value following an algorithm identifier is laid out and which
//! symbolic names its elements map to.

use xmsg_utils::oid::{self, strip_oid_prefix};

/// Public-key algorithm classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PkAlgo {
    Rsa,
    Dsa,
    Ecc,
    X25519,
    X448,
    Ed25519,
    Ed448,
}

/// Whether an algorithm is handled; `RsaPss` marks the entry whose
/// parameters carry RSASSA-PSS information and need their own parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    No,
    Yes,
    RsaPss,
}

/// One algorithm table row.
///
/// `elems` names one symbolic element per character, `-` meaning the
/// element is consumed but not emitted.  `tags[i]` is the expected tag
/// byte for element `i`; a value with bit 7 set on the final element
/// takes the raw remainder without TLV framing.  `parm_elems`/
/// `parm_tags` describe the algorithm parameters the same way.
pub struct AlgoEntry {
    pub oid: &'static str,
    pub oid_der: &'static [u8],
    pub supported: Support,
    pub pkalgo: PkAlgo,
    pub algo: &'static str,
    pub elems: &'static str,
    pub tags: &'static [u8],
    pub parm_elems: &'static str,
    pub parm_tags: &'static [u8],
    pub digest: Option<&'static str>,
}

pub static PK_ALGO_TABLE: &[AlgoEntry] = &[
    AlgoEntry {
        oid: "1.2.840.113549.1.1.1", // rsaEncryption (RSAES-PKCS1-v1.5)
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01",
        supported: Support::Yes,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "-ne",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.2.840.113549.1.1.7", // RSAES-OAEP
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x07",
        supported: Support::No,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "-ne",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.2.840.113549.1.1.10", // rsaPSS
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0a",
        supported: Support::RsaPss,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "-ne",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "2.5.8.1.1", // rsa (ambiguous, no padding rules)
        oid_der: b"\x55\x08\x01\x01",
        supported: Support::Yes,
        pkalgo: PkAlgo::Rsa,
        algo: "ambiguous-rsa",
        elems: "-ne",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.2.840.10040.4.1", // dsa
        oid_der: b"\x2a\x86\x48\xce\x38\x04\x01",
        supported: Support::Yes,
        pkalgo: PkAlgo::Dsa,
        algo: "dsa",
        elems: "y",
        tags: &[0x02],
        parm_elems: "-pqg",
        parm_tags: &[0x30, 0x02, 0x02, 0x02],
        digest: None,
    },
    AlgoEntry {
        oid: "1.2.840.10045.2.1", // ecPublicKey
        oid_der: b"\x2a\x86\x48\xce\x3d\x02\x01",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ecc,
        algo: "ecc",
        elems: "q",
        tags: &[0x80],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.3.101.110", // X25519
        oid_der: b"\x2b\x65\x6e",
        supported: Support::Yes,
        pkalgo: PkAlgo::X25519,
        algo: "ecc",
        elems: "q",
        tags: &[0x80],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.3.101.111", // X448
        oid_der: b"\x2b\x65\x6f",
        supported: Support::Yes,
        pkalgo: PkAlgo::X448,
        algo: "ecc",
        elems: "q",
        tags: &[0x80],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.3.101.112", // Ed25519
        oid_der: b"\x2b\x65\x70",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ed25519,
        algo: "ecc",
        elems: "q",
        tags: &[0x80],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.3.101.113", // Ed448
        oid_der: b"\x2b\x65\x71",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ed448,
        algo: "ecc",
        elems: "q",
        tags: &[0x80],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
];

pub static SIG_ALGO_TABLE: &[AlgoEntry] = &[
    AlgoEntry {
        oid: "1.2.840.113549.1.1.5", // sha1WithRSAEncryption
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x05",
        supported: Support::Yes,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "s",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha1"),
    },
    AlgoEntry {
        oid: "1.2.840.113549.1.1.4", // md5WithRSAEncryption
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x04",
        supported: Support::Yes,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "s",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("md5"),
    },
    AlgoEntry {
        oid: "1.2.840.113549.1.1.2", // md2WithRSAEncryption
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x02",
        supported: Support::No,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "s",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("md2"),
    },
    AlgoEntry {
        oid: "1.2.840.10040.4.1", // dsa
        oid_der: b"\x2a\x86\x48\xce\x38\x04\x01",
        supported: Support::Yes,
        pkalgo: PkAlgo::Dsa,
        algo: "dsa",
        elems: "-rs",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.2.840.10040.4.3", // dsaWithSha1
        oid_der: b"\x2a\x86\x48\xce\x38\x04\x03",
        supported: Support::Yes,
        pkalgo: PkAlgo::Dsa,
        algo: "dsa",
        elems: "-rs",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha1"),
    },
    AlgoEntry {
        oid: "1.3.36.8.5.1.2.2", // dsaWithRIPEMD160
        oid_der: b"\x2b\x24\x08\x05\x01\x02\x02",
        supported: Support::Yes,
        pkalgo: PkAlgo::Dsa,
        algo: "dsa",
        elems: "-rs",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("rmd160"),
    },
    AlgoEntry {
        oid: "2.16.840.1.101.3.4.3.1", // dsaWithSha224
        oid_der: b"\x60\x86\x48\x01\x65\x03\x04\x03\x01",
        supported: Support::Yes,
        pkalgo: PkAlgo::Dsa,
        algo: "dsa",
        elems: "-rs",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha224"),
    },
    AlgoEntry {
        oid: "2.16.840.1.101.3.4.3.2", // dsaWithSha256
        oid_der: b"\x60\x86\x48\x01\x65\x03\x04\x03\x02",
        supported: Support::Yes,
        pkalgo: PkAlgo::Dsa,
        algo: "dsa",
        elems: "-rs",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha256"),
    },
    AlgoEntry {
        oid: "1.2.840.10045.4.1", // ecdsa-with-sha1
        oid_der: b"\x2a\x86\x48\xce\x3d\x04\x01",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ecc,
        algo: "ecdsa",
        elems: "-rs",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha1"),
    },
    AlgoEntry {
        // The digest algorithm is given by the parameter.
        oid: "1.2.840.10045.4.3", // ecdsa-with-specified
        oid_der: b"\x2a\x86\x48\xce\x3d\x04\x03",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ecc,
        algo: "ecdsa",
        elems: "-rs",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.2.840.10045.4.3.1", // ecdsa-with-sha224
        oid_der: b"\x2a\x86\x48\xce\x3d\x04\x03\x01",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ecc,
        algo: "ecdsa",
        elems: "-rs",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha224"),
    },
    AlgoEntry {
        oid: "1.2.840.10045.4.3.2", // ecdsa-with-sha256
        oid_der: b"\x2a\x86\x48\xce\x3d\x04\x03\x02",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ecc,
        algo: "ecdsa",
        elems: "-rs",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha256"),
    },
    AlgoEntry {
        oid: "1.2.840.10045.4.3.3", // ecdsa-with-sha384
        oid_der: b"\x2a\x86\x48\xce\x3d\x04\x03\x03",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ecc,
        algo: "ecdsa",
        elems: "-rs",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha384"),
    },
    AlgoEntry {
        oid: "1.2.840.10045.4.3.4", // ecdsa-with-sha512
        oid_der: b"\x2a\x86\x48\xce\x3d\x04\x03\x04",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ecc,
        algo: "ecdsa",
        elems: "-rs",
        tags: &[0x30, 0x02, 0x02],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha512"),
    },
    AlgoEntry {
        oid: "1.2.840.113549.1.1.1", // rsaEncryption used without hash algo
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01",
        supported: Support::Yes,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "s",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.3.14.3.2.26", // sha1 (a pure hash OID)
        oid_der: b"\x2b\x0e\x03\x02\x1a",
        supported: Support::No,
        pkalgo: PkAlgo::Rsa,
        algo: "sha-1",
        elems: "",
        tags: &[],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha1"),
    },
    AlgoEntry {
        oid: "1.3.36.3.3.1.2", // rsaSignatureWithripemd160
        oid_der: b"\x2b\x24\x03\x03\x01\x02",
        supported: Support::Yes,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "s",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("rmd160"),
    },
    AlgoEntry {
        oid: "1.3.14.3.2.29", // sha-1WithRSAEncryption (OIW)
        oid_der: b"\x2b\x0e\x03\x02\x1d",
        supported: Support::Yes,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "s",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha1"),
    },
    AlgoEntry {
        oid: "1.2.840.113549.1.1.11", // sha256WithRSAEncryption
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b",
        supported: Support::Yes,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "s",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha256"),
    },
    AlgoEntry {
        oid: "1.2.840.113549.1.1.12", // sha384WithRSAEncryption
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0c",
        supported: Support::Yes,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "s",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha384"),
    },
    AlgoEntry {
        oid: "1.2.840.113549.1.1.13", // sha512WithRSAEncryption
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0d",
        supported: Support::Yes,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "s",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("sha512"),
    },
    AlgoEntry {
        oid: "1.2.840.113549.1.1.10", // rsaPSS
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0a",
        supported: Support::RsaPss,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "s",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.3.36.3.4.3.2.2", // sigS_ISO9796-2rndWithrsa_ripemd160
        oid_der: b"\x2b\x24\x03\x04\x03\x02\x02",
        supported: Support::No,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "s",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: Some("rmd160"),
    },
    AlgoEntry {
        // The bit string carries the concatenated signature without
        // inner TLV framing.
        oid: "1.3.101.112", // Ed25519
        oid_der: b"\x2b\x65\x70",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ed25519,
        algo: "eddsa",
        elems: "s",
        tags: &[0x80],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.3.101.113", // Ed448
        oid_der: b"\x2b\x65\x71",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ed448,
        algo: "eddsa",
        elems: "s",
        tags: &[0x80],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
];

pub static ENC_ALGO_TABLE: &[AlgoEntry] = &[
    AlgoEntry {
        oid: "1.2.840.113549.1.1.1", // rsaEncryption (RSAES-PKCS1-v1.5)
        oid_der: b"\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01",
        supported: Support::Yes,
        pkalgo: PkAlgo::Rsa,
        algo: "rsa",
        elems: "a",
        tags: &[0x82],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
    AlgoEntry {
        oid: "1.2.840.10045.2.1", // ecPublicKey
        oid_der: b"\x2a\x86\x48\xce\x3d\x02\x01",
        supported: Support::Yes,
        pkalgo: PkAlgo::Ecc,
        algo: "ecdh",
        elems: "e",
        tags: &[0x80],
        parm_elems: "",
        parm_tags: &[],
        digest: None,
    },
];

/// ECC curve names and their OIDs, as understood by common
/// cryptographic runtimes.
pub static CURVE_NAMES: &[(&str, &str)] = &[
    ("1.3.6.1.4.1.3029.1.5.1", "Curve25519"),
    ("1.3.6.1.4.1.11591.15.1", "Ed25519"),
    ("1.2.840.10045.3.1.1", "NIST P-192"),
    ("1.2.840.10045.3.1.1", "nistp192"),
    ("1.2.840.10045.3.1.1", "prime192v1"),
    ("1.2.840.10045.3.1.1", "secp192r1"),
    ("1.3.132.0.33", "NIST P-224"),
    ("1.3.132.0.33", "nistp224"),
    ("1.3.132.0.33", "secp224r1"),
    ("1.2.840.10045.3.1.7", "NIST P-256"),
    ("1.2.840.10045.3.1.7", "nistp256"),
    ("1.2.840.10045.3.1.7", "prime256v1"),
    ("1.2.840.10045.3.1.7", "secp256r1"),
    ("1.3.132.0.34", "NIST P-384"),
    ("1.3.132.0.34", "nistp384"),
    ("1.3.132.0.34", "secp384r1"),
    ("1.3.132.0.35", "NIST P-521"),
    ("1.3.132.0.35", "nistp521"),
    ("1.3.132.0.35", "secp521r1"),
    ("1.3.36.3.3.2.8.1.1.1", "brainpoolP160r1"),
    ("1.3.36.3.3.2.8.1.1.3", "brainpoolP192r1"),
    ("1.3.36.3.3.2.8.1.1.5", "brainpoolP224r1"),
    ("1.3.36.3.3.2.8.1.1.7", "brainpoolP256r1"),
    ("1.3.36.3.3.2.8.1.1.9", "brainpoolP320r1"),
    ("1.3.36.3.3.2.8.1.1.11", "brainpoolP384r1"),
    ("1.3.36.3.3.2.8.1.1.13", "brainpoolP512r1"),
    ("1.2.643.2.2.35.1", "GOST2001-CryptoPro-A"),
    ("1.2.643.2.2.35.2", "GOST2001-CryptoPro-B"),
    ("1.2.643.2.2.35.3", "GOST2001-CryptoPro-C"),
    ("1.2.643.7.1.2.1.2.1", "GOST2012-tc26-A"),
    ("1.2.643.7.1.2.1.2.2", "GOST2012-tc26-B"),
    ("1.3.132.0.10", "secp256k1"),
];

/// Find a table entry by the DER value bytes of its OID.
pub fn find_by_oid_der<'t>(table: &'t [AlgoEntry], oid_der: &[u8]) -> Option<&'t AlgoEntry> {
    table.iter().find(|e| e.oid_der == oid_der)
}

/// Find a supported entry by dotted OID string or symbolic algorithm
/// name; an "oid."/"OID." prefix is ignored.
pub fn find_by_name<'t>(table: &'t [AlgoEntry], name: &[u8]) -> Option<&'t AlgoEntry> {
    let name = match std::str::from_utf8(name) {
        Ok(s) => strip_oid_prefix(s),
        Err(_) => return None,
    };
    table
        .iter()
        .filter(|e| e.supported != Support::No)
        .find(|e| e.oid == name || e.algo == name)
}

/// Resolve a curve name or dotted OID to the DER value bytes of the
/// curve OID.  Strings that do not look like an OID are mapped through
/// the name table.
pub fn curve_oid_der(name: &[u8]) -> Option<Vec<u8>> {
    let s = std::str::from_utf8(name).ok()?;
    let s = strip_oid_prefix(s);
    let dotted = if s.starts_with(|c: char| c.is_ascii_digit()) {
        s
    } else {
        CURVE_NAMES.iter().find(|(_, n)| *n == s)?.0
    };
    oid::oid_from_string(dotted).ok()
}
