//! Streaming parser for CMS outer structures (RFC 5652).
//!
//! The outer framing of ContentInfo, SignedData and EnvelopedData is
//! parsed by hand: these structures use indefinite-length constructed
//! encodings and can be arbitrarily large, so they cannot be buffered
//! whole.  Bounded sub-objects (certificates, SignerInfos,
//! RecipientInfos) are handed to the schema decoder.

use std::io::Read;

use xmsg_types::Error;
use xmsg_utils::asn1::{cms_schema, read_header, BerDecoder, BerReader, Class, DecodedTree};

use crate::cert::Certificate;
use crate::keyinfo;

const TAG_SEQUENCE: u32 = 16;
const TAG_SET: u32 = 17;
const TAG_INTEGER: u32 = 2;
const TAG_OID: u32 = 6;

/// Largest OID / algorithm identifier accepted at the outer level.
const MAX_OUTER_TLV: usize = 500;

/// CMS content types understood at the outer level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmsContentType {
    Data,
    SignedData,
    EnvelopedData,
    DigestedData,
    EncryptedData,
    AuthData,
}

impl CmsContentType {
    pub fn from_oid(oid: &str) -> Option<Self> {
        match oid {
            "1.2.840.113549.1.7.1" => Some(CmsContentType::Data),
            "1.2.840.113549.1.7.2" => Some(CmsContentType::SignedData),
            "1.2.840.113549.1.7.3" => Some(CmsContentType::EnvelopedData),
            "1.2.840.113549.1.7.5" => Some(CmsContentType::DigestedData),
            "1.2.840.113549.1.7.6" => Some(CmsContentType::EncryptedData),
            "1.2.840.113549.1.9.16.1.2" => Some(CmsContentType::AuthData),
            _ => None,
        }
    }

    pub fn oid(self) -> &'static str {
        match self {
            CmsContentType::Data => "1.2.840.113549.1.7.1",
            CmsContentType::SignedData => "1.2.840.113549.1.7.2",
            CmsContentType::EnvelopedData => "1.2.840.113549.1.7.3",
            CmsContentType::DigestedData => "1.2.840.113549.1.7.5",
            CmsContentType::EncryptedData => "1.2.840.113549.1.7.6",
            CmsContentType::AuthData => "1.2.840.113549.1.9.16.1.2",
        }
    }
}

/// Incremental CMS parser state.
///
/// The parse methods are called in protocol order; each one leaves
/// the reader positioned where the next layer (or the caller, for
/// content octets) picks up.
pub struct CmsParser<R> {
    reader: BerReader<R>,

    /// Outer content type, after [`CmsParser::parse_content_info`].
    pub content_oid: Option<String>,
    /// Remaining outer content length, when definite.
    pub content_len: Option<usize>,
    pub content_indefinite: bool,

    pub cms_version: Option<u8>,
    /// Digest algorithm OIDs; each parsed identifier is prepended.
    pub digest_algos: Vec<String>,
    pub inner_content_oid: Option<String>,
    pub inner_content_len: Option<usize>,
    pub inner_content_indefinite: bool,
    /// Set when the encapsulated content is absent.
    pub detached_data: bool,

    pub encr_algo_oid: Option<String>,
    pub encr_iv: Option<Vec<u8>>,

    pub cert_list: Vec<Certificate>,
    pub signer_infos: Option<DecodedTree>,
    pub recipient_infos: Option<DecodedTree>,
}

impl<R: Read> CmsParser<R> {
    pub fn new(reader: BerReader<R>) -> Self {
        Self {
            reader,
            content_oid: None,
            content_len: None,
            content_indefinite: false,
            cms_version: None,
            digest_algos: Vec::new(),
            inner_content_oid: None,
            inner_content_len: None,
            inner_content_indefinite: false,
            detached_data: false,
            encr_algo_oid: None,
            encr_iv: None,
            cert_list: Vec::new(),
            signer_infos: None,
            recipient_infos: None,
        }
    }

    /// Access the underlying reader, e.g. to stream content octets
    /// between the parse phases.
    pub fn reader_mut(&mut self) -> &mut BerReader<R> {
        &mut self.reader
    }

    /// The outer content type, when recognised.
    pub fn content_type(&self) -> Option<CmsContentType> {
        CmsContentType::from_oid(self.content_oid.as_deref()?)
    }

    /// Parse the outermost `ContentInfo`.
    ///
    /// Structural errors at this boundary are rewritten to
    /// `NoCmsObject` so that feeding arbitrary data yields a clear
    /// diagnosis instead of a bare BER error.
    pub fn parse_content_info(&mut self) -> Result<(), Error> {
        let info = match parse_content_info(&mut self.reader) {
            Ok(info) => info,
            Err(Error::Ber | Error::InvalidCmsObject | Error::ObjectTooShort) => {
                return Err(Error::NoCmsObject)
            }
            Err(e) => return Err(e),
        };
        if !info.has_content {
            // The content is not optional at the outermost level
            return Err(Error::NoCmsObject);
        }
        self.content_len = (!info.indefinite).then_some(info.len);
        self.content_indefinite = info.indefinite;
        self.content_oid = Some(info.oid);
        Ok(())
    }

    /// Parse a `SignedData` up to (and including) the encapsulated
    /// content info header, so the caller can stream the content
    /// through a hash.
    pub fn parse_signed_data_part_1(&mut self) -> Result<(), Error> {
        let (version, mut sd_len, sd_ndef) = parse_cms_version(&mut self.reader)?;
        self.cms_version = Some(version);

        // SET OF AlgorithmIdentifier
        let ti = read_header(&mut self.reader)?;
        if !(ti.is(Class::Universal, TAG_SET) && ti.constructed) {
            return Err(Error::InvalidCmsObject);
        }
        if !sd_ndef {
            sd_len = sd_len.checked_sub(ti.header_len()).ok_or(Error::Ber)?;
            if !ti.indefinite {
                sd_len = sd_len.checked_sub(ti.length).ok_or(Error::Ber)?;
            }
        }
        if ti.indefinite {
            return Err(Error::UnsupportedEncoding);
        }

        let mut buf = vec![0u8; ti.length];
        self.reader.read_exact(&mut buf)?;
        let mut pos = 0;
        while pos < buf.len() {
            let (nread, oid) = keyinfo::parse_algorithm_identifier(&buf[pos..])?;
            pos += nread;
            self.digest_algos.insert(0, oid);
        }

        // EncapsulatedContentInfo
        let off = self.reader.tell();
        let info = parse_content_info(&mut self.reader)?;
        self.inner_content_oid = Some(info.oid);
        self.inner_content_len = (!info.indefinite).then_some(info.len);
        self.inner_content_indefinite = info.indefinite;
        self.detached_data = !info.has_content;
        if !sd_ndef {
            let used = (self.reader.tell() - off) as usize;
            sd_len = sd_len.checked_sub(used).ok_or(Error::Ber)?;
            if !info.indefinite && sd_len < info.len {
                return Err(Error::Ber);
            }
        }

        // Stop here so the caller can set up hashing of the content
        Ok(())
    }

    /// Continue a `SignedData` parse at the certificates tag:
    /// optional certificate set, then the SET OF signerInfos.
    pub fn parse_signed_data_part_2(&mut self) -> Result<(), Error> {
        let mut ti = read_header(&mut self.reader)?;

        if ti.is(Class::Context, 0) && ti.constructed {
            // Implicit CertificateSet; every obsolete CHOICE except a
            // plain Certificate is ignored by reading SEQUENCEs only.
            if ti.indefinite {
                return Err(Error::UnsupportedEncoding);
            }
            loop {
                ti = read_header(&mut self.reader)?;
                if !(ti.is(Class::Universal, TAG_SEQUENCE) && ti.constructed) {
                    break;
                }
                // The certificate reader wants to see the full TLV
                self.reader.unread(&ti.header);
                let mut cert = Certificate::new();
                cert.read_der(&mut self.reader)?;
                self.cert_list.push(cert);
            }
        }

        if ti.is(Class::Context, 1) && ti.constructed {
            log::debug!("certificate revocation lists in SignedData are not handled");
            return Err(Error::UnsupportedCmsObject);
        }

        if !(ti.is(Class::Universal, TAG_SET) && ti.constructed) {
            return Err(Error::InvalidCmsObject);
        }
        self.reader.unread(&ti.header);
        let schema = cms_schema()?;
        let tree = BerDecoder::new(schema, &mut self.reader)
            .decode("CryptographicMessageSyntax.SignerInfos")?;
        self.signer_infos = Some(tree);
        Ok(())
    }

    /// Parse an `EnvelopedData` up to the encrypted content octets:
    /// recipient infos, then the encrypted-content-info header with
    /// the content-encryption algorithm and IV.
    pub fn parse_enveloped_data_part_1(&mut self) -> Result<(), Error> {
        let (version, mut env_len, env_ndef) = parse_cms_version(&mut self.reader)?;
        self.cms_version = Some(version);

        let ti = read_header(&mut self.reader)?;
        if ti.is(Class::Context, 0) && ti.constructed {
            // originatorInfo
            return Err(Error::UnsupportedCmsObject);
        }
        if !(ti.is(Class::Universal, TAG_SET) && ti.constructed) {
            return Err(Error::InvalidCmsObject);
        }
        self.reader.unread(&ti.header);
        let schema = cms_schema()?;
        let tree = BerDecoder::new(schema, &mut self.reader)
            .decode("CryptographicMessageSyntax.RecipientInfos")?;
        self.recipient_infos = Some(tree);

        let off = self.reader.tell();
        let info = parse_encrypted_content_info(&mut self.reader)?;
        self.inner_content_oid = Some(info.content_oid);
        self.inner_content_len = (!info.indefinite).then_some(info.len);
        self.inner_content_indefinite = info.indefinite;
        self.detached_data = !info.has_content;
        self.encr_algo_oid = Some(info.algo_oid);
        self.encr_iv = info.algo_parm;
        if !env_ndef {
            let used = (self.reader.tell() - off) as usize;
            env_len = env_len.checked_sub(used).ok_or(Error::Ber)?;
            if !info.indefinite && env_len < info.len {
                return Err(Error::Ber);
            }
        }
        Ok(())
    }
}

// ── outer-structure helpers ──────────────────────────────────────────

struct ContentInfoRaw {
    /// Remaining content length after the parsed headers, when the
    /// enclosing sequence is definite.
    len: usize,
    indefinite: bool,
    oid: String,
    has_content: bool,
}

/// Core of ContentInfo / EncapsulatedContentInfo parsing:
/// `SEQUENCE { OID, [0] EXPLICIT content OPTIONAL }`.  The read
/// position ends up at the content octets.
fn parse_content_info<R: Read>(reader: &mut BerReader<R>) -> Result<ContentInfoRaw, Error> {
    let ti = read_header(reader)?;
    if !(ti.is(Class::Universal, TAG_SEQUENCE) && ti.constructed) {
        return Err(Error::InvalidCmsObject);
    }
    let indefinite = ti.indefinite;
    let mut len = ti.length;
    if !indefinite && len < 3 {
        // Too short to even hold an OID
        return Err(Error::ObjectTooShort);
    }

    let ti = read_header(reader)?;
    if !(ti.is(Class::Universal, TAG_OID) && !ti.constructed && ti.length > 0) {
        return Err(Error::InvalidCmsObject);
    }
    if !indefinite {
        len = len.checked_sub(ti.header_len()).ok_or(Error::Ber)?;
        len = len.checked_sub(ti.length).ok_or(Error::Ber)?;
    }
    if ti.length >= MAX_OUTER_TLV {
        return Err(Error::ObjectTooLarge);
    }
    let mut oidbuf = vec![0u8; ti.length];
    reader.read_exact(&mut oidbuf)?;
    let oid = xmsg_utils::oid::oid_to_string(&oidbuf)?;

    let mut has_content = false;
    if indefinite || len > 0 {
        // The [0] EXPLICIT wrapper is optional
        let ti = read_header(reader)?;
        if ti.is(Class::Context, 0) && ti.constructed {
            has_content = true;
        } else if ti.is(Class::Universal, 0) && !ti.constructed {
            has_content = false;
        } else {
            return Err(Error::InvalidCmsObject);
        }
        if !indefinite {
            len = len.checked_sub(ti.header_len()).ok_or(Error::Ber)?;
            if !ti.indefinite && len < ti.length {
                return Err(Error::Ber);
            }
        }
    }

    Ok(ContentInfoRaw {
        len,
        indefinite,
        oid,
        has_content,
    })
}

/// Parse `SEQUENCE { version INTEGER, ... }` up to and including the
/// version; returns the version and the remaining length info.
fn parse_cms_version<R: Read>(reader: &mut BerReader<R>) -> Result<(u8, usize, bool), Error> {
    let ti = read_header(reader)?;
    if !(ti.is(Class::Universal, TAG_SEQUENCE) && ti.constructed) {
        return Err(Error::InvalidCmsObject);
    }
    let indefinite = ti.indefinite;
    let mut len = ti.length;
    if !indefinite && len < 3 {
        return Err(Error::ObjectTooShort);
    }

    let ti = read_header(reader)?;
    if !(ti.is(Class::Universal, TAG_INTEGER) && !ti.constructed && ti.length > 0) {
        return Err(Error::InvalidCmsObject);
    }
    if !indefinite {
        len = len.checked_sub(ti.header_len()).ok_or(Error::Ber)?;
        len = len.checked_sub(ti.length).ok_or(Error::Ber)?;
    }
    if ti.length != 1 {
        return Err(Error::UnsupportedCmsVersion);
    }
    let version = reader
        .read_byte()?
        .ok_or_else(|| Error::Read(std::io::ErrorKind::UnexpectedEof.into()))?;
    if version > 4 {
        return Err(Error::UnsupportedCmsVersion);
    }
    Ok((version, len, indefinite))
}

struct EncryptedContentInfoRaw {
    len: usize,
    indefinite: bool,
    content_oid: String,
    algo_oid: String,
    algo_parm: Option<Vec<u8>>,
    has_content: bool,
}

/// `EncryptedContentInfo ::= SEQUENCE { contentType OID,
/// contentEncryptionAlgorithm AlgorithmIdentifier,
/// encryptedContent [0] IMPLICIT OCTET STRING OPTIONAL }`.
/// Leaves the read position at the encrypted content octets (or, when
/// absent, pushes the non-matching header back).
fn parse_encrypted_content_info<R: Read>(
    reader: &mut BerReader<R>,
) -> Result<EncryptedContentInfoRaw, Error> {
    let ti = read_header(reader)?;
    if !(ti.is(Class::Universal, TAG_SEQUENCE) && ti.constructed) {
        return Err(Error::InvalidCmsObject);
    }
    let indefinite = ti.indefinite;
    let mut len = ti.length;
    if !indefinite && len < 3 {
        return Err(Error::ObjectTooShort);
    }

    // contentType
    let ti = read_header(reader)?;
    if !(ti.is(Class::Universal, TAG_OID) && !ti.constructed && ti.length > 0) {
        return Err(Error::InvalidCmsObject);
    }
    if !indefinite {
        len = len.checked_sub(ti.header_len()).ok_or(Error::Ber)?;
        len = len.checked_sub(ti.length).ok_or(Error::Ber)?;
    }
    if ti.length >= MAX_OUTER_TLV {
        return Err(Error::ObjectTooLarge);
    }
    let mut oidbuf = vec![0u8; ti.length];
    reader.read_exact(&mut oidbuf)?;
    let content_oid = xmsg_utils::oid::oid_to_string(&oidbuf)?;

    // contentEncryptionAlgorithm, re-read in memory for the OID and
    // the parameter bytes (the IV)
    let ti = read_header(reader)?;
    if !(ti.is(Class::Universal, TAG_SEQUENCE) && ti.constructed) {
        return Err(Error::InvalidCmsObject);
    }
    if !indefinite {
        len = len.checked_sub(ti.header_len()).ok_or(Error::Ber)?;
        len = len.checked_sub(ti.length).ok_or(Error::Ber)?;
    }
    if ti.header_len() + ti.length >= MAX_OUTER_TLV {
        return Err(Error::ObjectTooLarge);
    }
    let mut algobuf = Vec::with_capacity(ti.header_len() + ti.length);
    algobuf.extend_from_slice(&ti.header);
    let start = algobuf.len();
    algobuf.resize(start + ti.length, 0);
    reader.read_exact(&mut algobuf[start..])?;
    let (nread, algo_oid, algo_parm) = keyinfo::parse_algorithm_identifier_params(&algobuf)?;
    if nread < algobuf.len() {
        return Err(Error::ObjectTooShort);
    }

    // encryptedContent [0] IMPLICIT OPTIONAL
    let mut has_content = false;
    if indefinite || len > 0 {
        let ti = read_header(reader)?;
        if ti.class == Class::Context && ti.tag == 0 {
            has_content = true;
            if !indefinite {
                len = len.checked_sub(ti.header_len()).ok_or(Error::Ber)?;
                if !ti.indefinite && len < ti.length {
                    return Err(Error::Ber);
                }
            }
        } else {
            // Not ours; hand it back for a follow-on parser
            reader.unread(&ti.header);
        }
    }

    Ok(EncryptedContentInfoRaw {
        len,
        indefinite,
        content_oid,
        algo_oid,
        algo_parm,
        has_content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{self, algo_id_null, name_cn, OID_RSA, OID_SHA256};
    use xmsg_utils::asn1::Encoder;

    const OID_DATA: &[u8] = b"\x2a\x86\x48\x86\xf7\x0d\x01\x07\x01";
    const OID_SIGNED_DATA: &[u8] = b"\x2a\x86\x48\x86\xf7\x0d\x01\x07\x02";
    const OID_ENVELOPED_DATA: &[u8] = b"\x2a\x86\x48\x86\xf7\x0d\x01\x07\x03";
    const OID_AES128_CBC: &[u8] = b"\x60\x86\x48\x01\x65\x03\x04\x01\x02";

    fn parser(data: &[u8]) -> CmsParser<&[u8]> {
        CmsParser::new(BerReader::from_bytes(data))
    }

    fn content_info(content_oid: &[u8], inner: &[u8]) -> Vec<u8> {
        let mut body = Encoder::new();
        body.write_oid(content_oid);
        body.write_context_specific(0, true, inner);
        let body = body.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&body);
        enc.finish()
    }

    fn issuer_and_serial() -> Vec<u8> {
        let mut body = Encoder::new();
        body.write_raw(&name_cn("Test CA"));
        body.write_integer(&[testutil::SERIAL]);
        let body = body.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&body);
        enc.finish()
    }

    fn signer_info() -> Vec<u8> {
        let mut body = Encoder::new();
        body.write_integer(&[0x01]);
        body.write_raw(&issuer_and_serial());
        body.write_raw(&algo_id_null(OID_SHA256));
        body.write_raw(&algo_id_null(OID_RSA));
        body.write_octet_string(&[0xA5; 64]);
        let body = body.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&body);
        enc.finish()
    }

    fn signed_data() -> Vec<u8> {
        let mut body = Encoder::new();
        body.write_integer(&[0x01]);

        // digestAlgorithms SET
        let mut set = Encoder::new();
        set.write_raw(&algo_id_null(OID_SHA256));
        let set = set.finish();
        body.write_set(&set);

        // encapContentInfo with attached content
        let mut inner = Encoder::new();
        inner.write_octet_string(b"hello world");
        let inner = inner.finish();
        body.write_raw(&content_info(OID_DATA, &inner));

        // [0] IMPLICIT certificates
        body.write_context_specific(0, true, &testutil::test_cert_der());

        // signerInfos
        let mut infos = Encoder::new();
        infos.write_raw(&signer_info());
        let infos = infos.finish();
        body.write_set(&infos);

        let body = body.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&body);
        enc.finish()
    }

    #[test]
    fn test_random_bytes_is_no_cms_object() {
        let mut p = parser(&[0x13, 0x37, 0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(matches!(
            p.parse_content_info(),
            Err(Error::NoCmsObject)
        ));

        let mut p = parser(&[]);
        assert!(matches!(
            p.parse_content_info(),
            Err(Error::NoCmsObject)
        ));
    }

    #[test]
    fn test_content_info_definite() {
        let der = content_info(OID_SIGNED_DATA, &[0x30, 0x00]);
        let mut p = parser(&der);
        p.parse_content_info().unwrap();
        assert_eq!(p.content_oid.as_deref(), Some("1.2.840.113549.1.7.2"));
        assert_eq!(p.content_type(), Some(CmsContentType::SignedData));
        assert!(!p.content_indefinite);
    }

    #[test]
    fn test_content_info_indefinite() {
        // SEQUENCE (indefinite) { OID signed-data, [0] (indefinite) ...
        let mut der = vec![0x30, 0x80];
        der.extend_from_slice(&[0x06, 0x09]);
        der.extend_from_slice(OID_SIGNED_DATA);
        der.extend_from_slice(&[0xA0, 0x80]);
        let mut p = parser(&der);
        p.parse_content_info().unwrap();
        assert!(p.content_indefinite);
        assert_eq!(p.content_type(), Some(CmsContentType::SignedData));
    }

    #[test]
    fn test_signed_data_parts() {
        let sd = signed_data();
        let der = content_info(OID_SIGNED_DATA, &sd);
        let mut p = parser(&der);
        p.parse_content_info().unwrap();
        p.parse_signed_data_part_1().unwrap();

        assert_eq!(p.cms_version, Some(1));
        assert_eq!(p.digest_algos, vec!["2.16.840.1.101.3.4.2.1".to_string()]);
        assert_eq!(p.inner_content_oid.as_deref(), Some("1.2.840.113549.1.7.1"));
        assert!(!p.detached_data);

        // The caller consumes the content octets between the parts
        let ti = read_header(p.reader_mut()).unwrap();
        assert_eq!(ti.tag, 4);
        let mut content = vec![0u8; ti.length];
        p.reader_mut().read_exact(&mut content).unwrap();
        assert_eq!(&content, b"hello world");

        p.parse_signed_data_part_2().unwrap();
        assert_eq!(p.cert_list.len(), 1);
        let serial = p.cert_list[0].serial().unwrap();
        assert_eq!(serial, vec![0, 0, 0, 1, testutil::SERIAL]);

        let infos = p.signer_infos.as_ref().unwrap();
        let root = &infos.root;
        assert_eq!(root.name, "SignerInfos");
        assert_eq!(root.children.len(), 1);
        let si = &root.children[0];
        assert_eq!(
            si.find("SignerInfo.version")
                .unwrap()
                .content(infos.image())
                .unwrap(),
            &[0x01]
        );
        // signedAttrs was absent: placeholder node
        assert!(si
            .find("SignerInfo.signedAttrs")
            .unwrap()
            .extent
            .is_none());
    }

    #[test]
    fn test_signed_data_detached() {
        // encapContentInfo without the [0] wrapper
        let mut body = Encoder::new();
        body.write_integer(&[0x01]);
        let mut set = Encoder::new();
        set.write_raw(&algo_id_null(OID_SHA256));
        let set = set.finish();
        body.write_set(&set);
        let mut eci = Encoder::new();
        eci.write_oid(OID_DATA);
        let eci = eci.finish();
        let mut eci_seq = Encoder::new();
        eci_seq.write_sequence(&eci);
        body.write_raw(&eci_seq.finish());
        let mut infos = Encoder::new();
        infos.write_raw(&signer_info());
        let infos = infos.finish();
        body.write_set(&infos);
        let body = body.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&body);
        let sd = enc.finish();

        let mut p = parser(&sd);
        p.parse_signed_data_part_1().unwrap();
        assert!(p.detached_data);
        p.parse_signed_data_part_2().unwrap();
        assert!(p.cert_list.is_empty());
        assert!(p.signer_infos.is_some());
    }

    #[test]
    fn test_indefinite_digest_algo_set_rejected() {
        let mut sd = vec![0x30, 0x80];
        sd.extend_from_slice(&[0x02, 0x01, 0x01]); // version
        sd.extend_from_slice(&[0x31, 0x80]); // SET, indefinite
        let mut p = parser(&sd);
        assert!(matches!(
            p.parse_signed_data_part_1(),
            Err(Error::UnsupportedEncoding)
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut body = Encoder::new();
        body.write_integer(&[0x09]);
        let body = body.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&body);
        let sd = enc.finish();
        let mut p = parser(&sd);
        assert!(matches!(
            p.parse_signed_data_part_1(),
            Err(Error::UnsupportedCmsVersion)
        ));
    }

    #[test]
    fn test_crls_rejected() {
        // SignedData body resuming at a [1] IMPLICIT crls tag
        let mut der = Encoder::new();
        der.write_context_specific(1, true, &[0x30, 0x00]);
        let der = der.finish();
        let mut p = parser(&der);
        assert!(matches!(
            p.parse_signed_data_part_2(),
            Err(Error::UnsupportedCmsObject)
        ));
    }

    fn recipient_infos() -> Vec<u8> {
        let mut ktri = Encoder::new();
        ktri.write_integer(&[0x00]);
        ktri.write_raw(&issuer_and_serial());
        ktri.write_raw(&algo_id_null(OID_RSA));
        ktri.write_octet_string(&[0xEE; 128]);
        let ktri = ktri.finish();
        let mut seq = Encoder::new();
        seq.write_sequence(&ktri);
        let seq = seq.finish();
        let mut set = Encoder::new();
        set.write_set(&seq);
        set.finish()
    }

    fn enveloped_data(iv: &[u8]) -> Vec<u8> {
        let mut body = Encoder::new();
        body.write_integer(&[0x00]);
        body.write_raw(&recipient_infos());

        // EncryptedContentInfo
        let mut algo = Encoder::new();
        algo.write_oid(OID_AES128_CBC);
        algo.write_octet_string(iv);
        let algo = algo.finish();
        let mut eci = Encoder::new();
        eci.write_oid(OID_DATA);
        eci.write_sequence(&algo);
        eci.write_context_specific(0, false, &[0xC7; 32]);
        let eci = eci.finish();
        let mut eci_seq = Encoder::new();
        eci_seq.write_sequence(&eci);
        body.write_raw(&eci_seq.finish());

        let body = body.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&body);
        enc.finish()
    }

    #[test]
    fn test_enveloped_data_part_1() {
        let iv = [0x1Fu8; 16];
        let ed = enveloped_data(&iv);
        let der = content_info(OID_ENVELOPED_DATA, &ed);
        let mut p = parser(&der);
        p.parse_content_info().unwrap();
        assert_eq!(p.content_type(), Some(CmsContentType::EnvelopedData));
        p.parse_enveloped_data_part_1().unwrap();

        assert_eq!(p.cms_version, Some(0));
        assert_eq!(p.encr_algo_oid.as_deref(), Some("2.16.840.1.101.3.4.1.2"));
        assert_eq!(p.encr_iv.as_deref(), Some(&iv[..]));
        assert_eq!(p.inner_content_oid.as_deref(), Some("1.2.840.113549.1.7.1"));
        assert!(!p.detached_data);

        // The recipient info tree carries the encrypted key
        let ri = p.recipient_infos.as_ref().unwrap();
        assert_eq!(ri.root.name, "RecipientInfos");
        let ktri = &ri.root.children[0].children[0];
        assert_eq!(ktri.name, "ktri");
        let key = ktri
            .find("ktri.encryptedKey")
            .unwrap()
            .content(ri.image())
            .unwrap();
        assert_eq!(key, &[0xEE; 128]);

        // The reader is at the encrypted content octets
        let mut content = vec![0u8; 32];
        p.reader_mut().read_exact(&mut content).unwrap();
        assert_eq!(content, vec![0xC7; 32]);
    }

    #[test]
    fn test_enveloped_data_originator_info_rejected() {
        let mut body = Encoder::new();
        body.write_integer(&[0x00]);
        body.write_context_specific(0, true, &[]);
        let body = body.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&body);
        let ed = enc.finish();
        let mut p = parser(&ed);
        assert!(matches!(
            p.parse_enveloped_data_part_1(),
            Err(Error::UnsupportedCmsObject)
        ));
    }
}
