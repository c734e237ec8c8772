//! X.509 certificate facade.
//!
//! Applies the schema decoder to a certificate stream and exposes the
//! fields the cryptographic runtime needs: hash regions, serial,
//! names, validity, and the public key / signature value in symbolic
//! form.

use std::io::Read;

use xmsg_types::Error;
use xmsg_utils::asn1::{time, x509_schema, BerDecoder, BerReader, DecodedTree, Node, NodeType};
use xmsg_utils::sexp::Sexp;

use crate::algo::{self, SIG_ALGO_TABLE};
use crate::dn;
use crate::keyinfo;

/// Which TLV of the certificate a hash covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScope {
    /// The whole `Certificate`.
    Whole,
    /// Only the `tbsCertificate`.
    Tbs,
}

/// Which validity bound to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityKind {
    NotBefore,
    NotAfter,
}

/// A parsed certificate: the decoded node tree plus the captured
/// image it references.
#[derive(Default)]
pub struct Certificate {
    tree: Option<DecodedTree>,
}

impl Certificate {
    /// Create an empty certificate object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse the next certificate from the reader.  A
    /// populated object cannot be re-read.
    pub fn read_der<R: Read>(&mut self, reader: &mut BerReader<R>) -> Result<(), Error> {
        if self.tree.is_some() {
            return Err(Error::Conflict);
        }
        let schema = x509_schema()?;
        let tree = BerDecoder::new(schema, reader).decode("TMTTv2.Certificate")?;
        self.tree = Some(tree);
        Ok(())
    }

    /// Parse a certificate from an in-memory DER buffer.
    pub fn from_bytes(data: &[u8]) -> Result<Certificate, Error> {
        let mut cert = Certificate::new();
        let mut reader = BerReader::from_bytes(data);
        cert.read_der(&mut reader)?;
        Ok(cert)
    }

    fn tree(&self) -> Result<&DecodedTree, Error> {
        self.tree.as_ref().ok_or(Error::NoData)
    }

    fn node(&self, path: &str) -> Result<&Node, Error> {
        self.tree()?.find(path).ok_or(Error::NoValue)
    }

    /// The captured DER encoding.
    pub fn image(&self) -> Result<&[u8], Error> {
        Ok(self.tree()?.image())
    }

    /// Feed the byte range of the chosen TLV to `sink`, exactly as it
    /// appears in the image.
    pub fn hash<F: FnMut(&[u8])>(&self, scope: HashScope, mut sink: F) -> Result<(), Error> {
        let tree = self.tree()?;
        let path = match scope {
            HashScope::Whole => "Certificate",
            HashScope::Tbs => "Certificate.tbsCertificate",
        };
        let node = tree.find(path).ok_or(Error::NoValue)?;
        let span = node.tlv_span(tree.image()).ok_or(Error::NoValue)?;
        sink(span);
        Ok(())
    }

    /// Digest algorithm named by the signature algorithm OID.
    pub fn digest_algo(&self) -> Result<&'static str, Error> {
        let tree = self.tree()?;
        let node = self
            .node("Certificate.signatureAlgorithm.algorithm")?;
        let oid = node.content(tree.image()).ok_or(Error::NoValue)?;
        let entry =
            algo::find_by_oid_der(SIG_ALGO_TABLE, oid).ok_or(Error::UnknownAlgorithm)?;
        entry.digest.ok_or(Error::UnknownAlgorithm)
    }

    /// Serial number: a 4-byte big-endian length, then the raw DER
    /// integer content bytes.
    pub fn serial(&self) -> Result<Vec<u8>, Error> {
        let tree = self.tree()?;
        let node = self.node("Certificate.tbsCertificate.serialNumber")?;
        let content = node.content(tree.image()).ok_or(Error::NoValue)?;
        let mut out = Vec::with_capacity(content.len() + 4);
        out.extend_from_slice(&(content.len() as u32).to_be_bytes());
        out.extend_from_slice(content);
        Ok(out)
    }

    fn name_at(&self, path: &str) -> Result<String, Error> {
        let tree = self.tree()?;
        let node = self.node(path)?;
        // Dereference the CHOICE to the realised RDNSequence
        let rdns = node.children.first().ok_or(Error::NoValue)?;
        if rdns.extent.is_none() {
            return Err(Error::NoValue);
        }
        dn::dn_to_string(tree.image(), rdns)
    }

    /// Issuer DN in RFC 2253 form.
    pub fn issuer(&self) -> Result<String, Error> {
        self.name_at("Certificate.tbsCertificate.issuer")
    }

    /// Subject DN in RFC 2253 form.
    pub fn subject(&self) -> Result<String, Error> {
        self.name_at("Certificate.tbsCertificate.subject")
    }

    /// Validity bound as seconds since the epoch; `None` when the
    /// value is absent or does not parse as a time.
    pub fn validity(&self, which: ValidityKind) -> Result<Option<i64>, Error> {
        let tree = self.tree()?;
        let path = match which {
            ValidityKind::NotBefore => "Certificate.tbsCertificate.validity.notBefore",
            ValidityKind::NotAfter => "Certificate.tbsCertificate.validity.notAfter",
        };
        let node = match tree.find(path) {
            Some(n) => n,
            None => return Ok(None),
        };
        // The realised alternative under the Time CHOICE
        let alt = match node.children.iter().find(|c| c.extent.is_some()) {
            Some(n) => n,
            None => return Ok(None),
        };
        let content = match alt.content(tree.image()) {
            Some(c) => c,
            None => return Ok(None),
        };
        let text = match std::str::from_utf8(content) {
            Ok(t) => t,
            Err(_) => return Ok(None),
        };
        let parsed = match alt.node_type {
            NodeType::UtcTime => time::utc_time_to_epoch(text),
            NodeType::GeneralizedTime => time::generalized_time_to_epoch(text),
            _ => return Ok(None),
        };
        Ok(parsed.ok())
    }

    /// Public key in symbolic `(public-key ...)` form.
    pub fn public_key(&self) -> Result<Sexp, Error> {
        let tree = self.tree()?;
        let node = self.node("Certificate.tbsCertificate.subjectPublicKeyInfo")?;
        let span = node.tlv_span(tree.image()).ok_or(Error::NoValue)?;
        keyinfo::keyinfo_to_sexp(span)
    }

    /// Signature in symbolic `(sig-val ...)` form, built from the
    /// signature algorithm and the adjacent signature BIT STRING.
    pub fn sig_val(&self) -> Result<Sexp, Error> {
        let tree = self.tree()?;
        let algo_node = self.node("Certificate.signatureAlgorithm")?;
        let sig_node = self.node("Certificate.signature")?;
        let a = algo_node.extent.ok_or(Error::NoValue)?;
        let s = sig_node.extent.ok_or(Error::NoValue)?;
        let span = tree
            .image()
            .get(a.off..s.off + s.nhdr + s.len)
            .ok_or(Error::NoValue)?;
        keyinfo::sigval_to_sexp(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn test_parse_and_image() {
        let der = testutil::test_cert_der();
        let cert = Certificate::from_bytes(&der).unwrap();
        assert_eq!(cert.image().unwrap(), &der[..]);
    }

    #[test]
    fn test_uninitialized_and_conflict() {
        let cert = Certificate::new();
        assert!(matches!(cert.image(), Err(Error::NoData)));
        assert!(matches!(cert.serial(), Err(Error::NoData)));

        let der = testutil::test_cert_der();
        let mut cert = Certificate::from_bytes(&der).unwrap();
        let mut reader = BerReader::from_bytes(&der);
        assert!(matches!(
            cert.read_der(&mut reader),
            Err(Error::Conflict)
        ));
    }

    #[test]
    fn test_serial_format() {
        let der = testutil::test_cert_der();
        let cert = Certificate::from_bytes(&der).unwrap();
        let serial = cert.serial().unwrap();
        assert_eq!(serial, vec![0, 0, 0, 1, testutil::SERIAL]);
    }

    #[test]
    fn test_names() {
        let der = testutil::test_cert_der();
        let cert = Certificate::from_bytes(&der).unwrap();
        assert_eq!(cert.issuer().unwrap(), "CN=Test CA");
        assert_eq!(cert.subject().unwrap(), "CN=Leaf,O=Example Org");
    }

    #[test]
    fn test_validity() {
        let der = testutil::test_cert_der();
        let cert = Certificate::from_bytes(&der).unwrap();
        let nb = cert.validity(ValidityKind::NotBefore).unwrap().unwrap();
        let na = cert.validity(ValidityKind::NotAfter).unwrap().unwrap();
        assert_eq!(nb, time::datetime_to_unix(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(na, time::datetime_to_unix(2035, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_digest_algo() {
        let der = testutil::test_cert_der();
        let cert = Certificate::from_bytes(&der).unwrap();
        assert_eq!(cert.digest_algo().unwrap(), "sha256");
    }

    #[test]
    fn test_hash_regions() {
        let der = testutil::test_cert_der();
        let cert = Certificate::from_bytes(&der).unwrap();

        let mut whole = Vec::new();
        cert.hash(HashScope::Whole, |b| whole.extend_from_slice(b))
            .unwrap();
        assert_eq!(whole, der);

        let mut tbs = Vec::new();
        cert.hash(HashScope::Tbs, |b| tbs.extend_from_slice(b))
            .unwrap();
        // The TBS region starts right after the outer header
        let body_len = {
            let mut dec = xmsg_utils::asn1::Decoder::new(&der);
            dec.read_tlv().unwrap().value.len()
        };
        let hdr_len = der.len() - body_len;
        assert_eq!(&der[hdr_len..hdr_len + tbs.len()], &tbs[..]);
        assert_eq!(tbs[0], 0x30);
    }

    #[test]
    fn test_public_key_sexp() {
        let der = testutil::test_cert_der();
        let cert = Certificate::from_bytes(&der).unwrap();
        let key = cert.public_key().unwrap();
        assert!(key.as_bytes().starts_with(b"(10:public-key(3:rsa(1:n"));
        let back = keyinfo::keyinfo_from_sexp(key.as_bytes()).unwrap();
        assert_eq!(back, testutil::rsa_spki_der());
    }

    #[test]
    fn test_sig_val_sexp() {
        let der = testutil::test_cert_der();
        let cert = Certificate::from_bytes(&der).unwrap();
        let sig = cert.sig_val().unwrap();
        let text = sig.as_bytes();
        assert!(text.starts_with(b"(7:sig-val(3:rsa(1:s"));
        assert!(text.ends_with(b"(4:hash6:sha256))"));
    }

    #[test]
    fn test_truncated_certificate_rejected() {
        let der = testutil::test_cert_der();
        assert!(Certificate::from_bytes(&der[..der.len() - 3]).is_err());
    }
}
