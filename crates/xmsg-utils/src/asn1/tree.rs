//! Schema-driven BER decoding into a navigable node tree.
//!
//! The decoder walks a grammar from [`Schema`] over a byte stream,
//! captures every byte it reads into an image buffer, and builds a
//! tree of nodes that reference the image by offset.  Definite and
//! indefinite length forms are both accepted; strict length accounting
//! rejects any child that extends past its parent.

use std::io::Read;

use xmsg_types::Error;

use super::reader::BerReader;
use super::schema::{Schema, SchemaNode, SchemaType, TagSpec};
use super::tlv;
use super::{Class, TagInfo};

/// Node classification mirroring the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectId,
    Enumerated,
    Utf8String,
    NumericString,
    PrintableString,
    T61String,
    Ia5String,
    UtcTime,
    GeneralizedTime,
    UniversalString,
    BmpString,
    Sequence,
    SequenceOf,
    Set,
    SetOf,
    Choice,
    Any,
}

/// Byte extent of a realised node: `(offset, header_len, content_len)`
/// into the captured image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub off: usize,
    pub nhdr: usize,
    pub len: usize,
}

/// One node of a decoded tree.
///
/// `extent` is `None` for schema placeholders that are not realised in
/// the image, such as an absent OPTIONAL field.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub node_type: NodeType,
    pub extent: Option<Extent>,
    pub children: Vec<Node>,
}

impl Node {
    fn placeholder(name: String, node_type: NodeType) -> Node {
        Node {
            name,
            node_type,
            extent: None,
            children: Vec::new(),
        }
    }

    /// Descend by dotted path, e.g. `"Certificate.tbsCertificate.serialNumber"`.
    /// The first component names this node; at each level the first
    /// matching child wins.
    pub fn find(&self, path: &str) -> Option<&Node> {
        let mut comps = path.split('.');
        if comps.next()? != self.name {
            return None;
        }
        let mut cur = self;
        'outer: for comp in comps {
            for child in &cur.children {
                if child.name == comp {
                    cur = child;
                    continue 'outer;
                }
            }
            return None;
        }
        Some(cur)
    }

    /// Content octets of this node within `image`.
    pub fn content<'a>(&self, image: &'a [u8]) -> Option<&'a [u8]> {
        let e = self.extent?;
        image.get(e.off + e.nhdr..e.off + e.nhdr + e.len)
    }

    /// The full TLV span (header plus content) within `image`.
    pub fn tlv_span<'a>(&self, image: &'a [u8]) -> Option<&'a [u8]> {
        let e = self.extent?;
        image.get(e.off..e.off + e.nhdr + e.len)
    }
}

/// A decoded node tree together with the image it references.
pub struct DecodedTree {
    pub root: Node,
    pub image: Vec<u8>,
}

impl DecodedTree {
    pub fn find(&self, path: &str) -> Option<&Node> {
        self.root.find(path)
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }
}

/// Schema-driven streaming BER decoder.
pub struct BerDecoder<'a, R> {
    schema: &'a Schema,
    reader: &'a mut BerReader<R>,
    image: Vec<u8>,
    /// A header read ahead of time: `(header, offset in image)`.
    pending: Option<(TagInfo, usize)>,
    /// Absolute image offset the current definite-length body must not
    /// cross.
    limit: Option<usize>,
}

impl<'a, R: Read> BerDecoder<'a, R> {
    pub fn new(schema: &'a Schema, reader: &'a mut BerReader<R>) -> Self {
        Self {
            schema,
            reader,
            image: Vec::new(),
            pending: None,
            limit: None,
        }
    }

    /// Decode one value of the named type from the stream.
    pub fn decode(mut self, type_name: &str) -> Result<DecodedTree, Error> {
        let def = self
            .schema
            .get(type_name)
            .ok_or_else(|| Error::General(format!("schema: unknown type {type_name}")))?;
        let mut root = self.decode_node(def)?;
        if let Some(short) = type_name.rsplit('.').next() {
            root.name = short.to_string();
        }
        if self.pending.is_some() {
            return Err(Error::Ber);
        }
        Ok(DecodedTree {
            root,
            image: self.image,
        })
    }

    // ── header and value plumbing ────────────────────────────────────

    fn peek_header(&mut self) -> Result<&TagInfo, Error> {
        if self.pending.is_none() {
            let off = self.image.len();
            let ti = tlv::read_header(self.reader)?;
            self.image.extend_from_slice(&ti.header);
            if let Some(l) = self.limit {
                if self.image.len() > l {
                    return Err(Error::Ber);
                }
            }
            self.pending = Some((ti, off));
        }
        Ok(&self.pending.as_ref().unwrap().0)
    }

    fn take_header(&mut self) -> Result<(TagInfo, usize), Error> {
        self.peek_header()?;
        Ok(self.pending.take().unwrap())
    }

    /// Read `len` content octets into the image.
    fn read_value(&mut self, len: usize) -> Result<(), Error> {
        if let Some(l) = self.limit {
            if self.image.len() + len > l {
                return Err(Error::Ber);
            }
        }
        let mut left = len;
        while left > 0 {
            let n = left.min(32 * 1024);
            let start = self.image.len();
            self.image.resize(start + n, 0);
            self.reader.read_exact(&mut self.image[start..])?;
            left -= n;
        }
        Ok(())
    }

    /// Enter a definite-length body ending `len` bytes from here.
    fn enter_definite(&mut self, len: usize) -> Result<Option<usize>, Error> {
        let end = self.image.len().checked_add(len).ok_or(Error::ObjectTooLarge)?;
        if let Some(l) = self.limit {
            if end > l {
                return Err(Error::Ber);
            }
        }
        Ok(std::mem::replace(&mut self.limit, Some(end)))
    }

    /// Leave a definite-length body, requiring it to be fully consumed.
    fn exit_definite(&mut self, saved: Option<usize>) -> Result<(), Error> {
        if let Some(end) = self.limit {
            if self.image.len() != end || self.pending.is_some() {
                return Err(Error::Ber);
            }
        }
        self.limit = saved;
        Ok(())
    }

    /// Consume the end-of-contents marker of an indefinite body.
    fn expect_eoc(&mut self) -> Result<(), Error> {
        let (ti, _) = self.take_header()?;
        if !ti.is_eoc() {
            return Err(Error::Ber);
        }
        Ok(())
    }

    // ── schema plumbing ──────────────────────────────────────────────

    /// Follow type references; returns the defining node and the
    /// effective tag (an outer tag wins over one on the target).
    fn resolve(&self, mut def: &'a SchemaNode) -> Result<(&'a SchemaNode, Option<TagSpec>), Error> {
        let mut tag = def.tag;
        let mut depth = 0;
        while let SchemaType::Reference(name) = &def.ty {
            def = self
                .schema
                .get(name)
                .ok_or_else(|| Error::General(format!("schema: unknown type {name}")))?;
            if tag.is_none() {
                tag = def.tag;
            }
            depth += 1;
            if depth > 32 {
                return Err(Error::General("schema: reference cycle".into()));
            }
        }
        Ok((def, tag))
    }

    /// Would a header with this class/tag start the given schema node?
    fn matches_tag(&self, def: &'a SchemaNode, class: Class, tag: u32) -> Result<bool, Error> {
        let (base, spec) = self.resolve(def)?;
        if let Some(t) = spec {
            return Ok(class == t.class && tag == t.number);
        }
        match &base.ty {
            SchemaType::Any => Ok(true),
            SchemaType::Choice(alts) => {
                for alt in alts {
                    if self.matches_tag(alt, class, tag)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ty => Ok(class == Class::Universal && Some(tag) == ty.universal_tag()),
        }
    }

    fn placeholder_for(&self, def: &'a SchemaNode) -> Result<Node, Error> {
        let (base, _) = self.resolve(def)?;
        Ok(Node::placeholder(def.name.clone(), node_type_of(&base.ty)))
    }

    // ── decoding proper ──────────────────────────────────────────────

    fn decode_node(&mut self, def: &'a SchemaNode) -> Result<Node, Error> {
        let (base, tag) = self.resolve(def)?;
        let name = if def.name.is_empty() {
            base.name.clone()
        } else {
            def.name.clone()
        };

        match tag {
            Some(t) if t.explicit => {
                // Consume the outer tag, then the inner value.
                let (ti, hdr_off) = self.take_header()?;
                if !(ti.class == t.class && ti.tag == t.number && ti.constructed) {
                    return Err(Error::UnexpectedTag);
                }
                let saved = if ti.indefinite {
                    None
                } else {
                    Some(self.enter_definite(ti.length)?)
                };
                let inner = self.decode_base(base.name.clone(), base, None)?;
                let mut eoc = 0;
                if ti.indefinite {
                    self.expect_eoc()?;
                    eoc = 2;
                } else if let Some(saved) = saved {
                    self.exit_definite(saved)?;
                }
                let len = self.image.len() - hdr_off - ti.header_len() - eoc;
                Ok(Node {
                    name,
                    node_type: inner.node_type,
                    extent: Some(Extent {
                        off: hdr_off,
                        nhdr: ti.header_len(),
                        len,
                    }),
                    children: vec![inner],
                })
            }
            Some(t) => self.decode_base(name, base, Some(t)),
            None => self.decode_base(name, base, None),
        }
    }

    /// Decode a value whose outer tag is either the type's universal
    /// tag or an implicit override.
    fn decode_base(
        &mut self,
        name: String,
        base: &'a SchemaNode,
        implicit: Option<TagSpec>,
    ) -> Result<Node, Error> {
        match &base.ty {
            SchemaType::Choice(alts) => {
                let (class, tag) = {
                    let ti = self.peek_header()?;
                    (ti.class, ti.tag)
                };
                for alt in alts {
                    if self.matches_tag(alt, class, tag)? {
                        let child = self.decode_node(alt)?;
                        return Ok(Node {
                            name,
                            node_type: NodeType::Choice,
                            extent: child.extent,
                            children: vec![child],
                        });
                    }
                }
                Err(Error::UnexpectedTag)
            }
            SchemaType::Any => self.decode_any(name),
            SchemaType::Sequence(fields) | SchemaType::Set(fields) => {
                let node_type = node_type_of(&base.ty);
                let (ti, hdr_off) = self.take_constructed(&base.ty, implicit)?;
                let (children, eoc) = if ti.indefinite {
                    self.decode_fields_indefinite(fields)?
                } else {
                    let saved = self.enter_definite(ti.length)?;
                    let children = self.decode_fields_definite(fields)?;
                    self.exit_definite(saved)?;
                    (children, 0)
                };
                let len = self.image.len() - hdr_off - ti.header_len() - eoc;
                Ok(Node {
                    name,
                    node_type,
                    extent: Some(Extent {
                        off: hdr_off,
                        nhdr: ti.header_len(),
                        len,
                    }),
                    children,
                })
            }
            SchemaType::SequenceOf(elem) | SchemaType::SetOf(elem) => {
                let node_type = node_type_of(&base.ty);
                let (ti, hdr_off) = self.take_constructed(&base.ty, implicit)?;
                let mut children = Vec::new();
                let mut eoc = 0;
                if ti.indefinite {
                    loop {
                        if self.peek_header()?.is_eoc() {
                            self.take_header()?;
                            eoc = 2;
                            break;
                        }
                        children.push(self.decode_node(elem)?);
                    }
                } else {
                    let saved = self.enter_definite(ti.length)?;
                    let end = self.limit.unwrap_or(0);
                    while self.image.len() < end {
                        children.push(self.decode_node(elem)?);
                    }
                    self.exit_definite(saved)?;
                }
                let len = self.image.len() - hdr_off - ti.header_len() - eoc;
                Ok(Node {
                    name,
                    node_type,
                    extent: Some(Extent {
                        off: hdr_off,
                        nhdr: ti.header_len(),
                        len,
                    }),
                    children,
                })
            }
            SchemaType::Reference(_) => unreachable!("references are resolved"),
            primitive => {
                let (ti, hdr_off) = self.take_header()?;
                let ok = match implicit {
                    Some(t) => ti.class == t.class && ti.tag == t.number,
                    None => {
                        ti.class == Class::Universal && Some(ti.tag) == primitive.universal_tag()
                    }
                };
                if !ok || ti.constructed {
                    return Err(Error::UnexpectedTag);
                }
                if matches!(primitive, SchemaType::Null) && ti.length != 0 {
                    return Err(Error::Ber);
                }
                self.read_value(ti.length)?;
                Ok(Node {
                    name,
                    node_type: node_type_of(primitive),
                    extent: Some(Extent {
                        off: hdr_off,
                        nhdr: ti.header_len(),
                        len: ti.length,
                    }),
                    children: Vec::new(),
                })
            }
        }
    }

    /// Take the header of a constructed value, checking tag and form.
    fn take_constructed(
        &mut self,
        ty: &SchemaType,
        implicit: Option<TagSpec>,
    ) -> Result<(TagInfo, usize), Error> {
        let (ti, hdr_off) = self.take_header()?;
        let ok = match implicit {
            Some(t) => ti.class == t.class && ti.tag == t.number,
            None => ti.class == Class::Universal && Some(ti.tag) == ty.universal_tag(),
        };
        if !ok || !ti.constructed {
            return Err(Error::UnexpectedTag);
        }
        Ok((ti, hdr_off))
    }

    fn decode_fields_definite(&mut self, fields: &'a [SchemaNode]) -> Result<Vec<Node>, Error> {
        let end = self.limit.unwrap_or(0);
        let mut children = Vec::with_capacity(fields.len());
        for field in fields {
            if self.image.len() >= end && self.pending.is_none() {
                if !field.optional {
                    return Err(Error::ObjectTooShort);
                }
                children.push(self.placeholder_for(field)?);
                continue;
            }
            let (class, tag) = {
                let ti = self.peek_header()?;
                (ti.class, ti.tag)
            };
            if self.matches_tag(field, class, tag)? {
                children.push(self.decode_node(field)?);
            } else if field.optional {
                children.push(self.placeholder_for(field)?);
            } else {
                return Err(Error::UnexpectedTag);
            }
        }
        Ok(children)
    }

    fn decode_fields_indefinite(
        &mut self,
        fields: &'a [SchemaNode],
    ) -> Result<(Vec<Node>, usize), Error> {
        let mut children = Vec::with_capacity(fields.len());
        let mut ended = false;
        for field in fields {
            if !ended && self.peek_header()?.is_eoc() {
                self.take_header()?;
                ended = true;
            }
            if ended {
                if !field.optional {
                    return Err(Error::ObjectTooShort);
                }
                children.push(self.placeholder_for(field)?);
                continue;
            }
            let (class, tag) = {
                let ti = self.peek_header()?;
                (ti.class, ti.tag)
            };
            if self.matches_tag(field, class, tag)? {
                children.push(self.decode_node(field)?);
            } else if field.optional {
                children.push(self.placeholder_for(field)?);
            } else {
                return Err(Error::UnexpectedTag);
            }
        }
        if !ended {
            self.expect_eoc()?;
        }
        Ok((children, 2))
    }

    /// Capture a raw TLV, constructed or not, as an opaque leaf.
    fn decode_any(&mut self, name: String) -> Result<Node, Error> {
        self.peek_header()?;
        let hdr_off = self.pending.as_ref().unwrap().1;
        let nhdr = self.pending.as_ref().unwrap().0.header_len();
        let eoc = self.skip_tlv()?;
        let len = self.image.len() - hdr_off - nhdr - eoc;
        Ok(Node {
            name,
            node_type: NodeType::Any,
            extent: Some(Extent {
                off: hdr_off,
                nhdr,
                len,
            }),
            children: Vec::new(),
        })
    }

    /// Consume one complete TLV without interpreting it.  Returns the
    /// number of trailing end-of-contents octets swallowed (0 or 2).
    fn skip_tlv(&mut self) -> Result<usize, Error> {
        let (ti, _) = self.take_header()?;
        if ti.indefinite {
            loop {
                if self.peek_header()?.is_eoc() {
                    self.take_header()?;
                    return Ok(2);
                }
                self.skip_tlv()?;
            }
        } else {
            self.read_value(ti.length)?;
            Ok(0)
        }
    }
}

fn node_type_of(ty: &SchemaType) -> NodeType {
    match ty {
        SchemaType::Boolean => NodeType::Boolean,
        SchemaType::Integer => NodeType::Integer,
        SchemaType::BitString => NodeType::BitString,
        SchemaType::OctetString => NodeType::OctetString,
        SchemaType::Null => NodeType::Null,
        SchemaType::ObjectId => NodeType::ObjectId,
        SchemaType::Enumerated => NodeType::Enumerated,
        SchemaType::Utf8String => NodeType::Utf8String,
        SchemaType::NumericString => NodeType::NumericString,
        SchemaType::PrintableString => NodeType::PrintableString,
        SchemaType::T61String => NodeType::T61String,
        SchemaType::Ia5String => NodeType::Ia5String,
        SchemaType::UtcTime => NodeType::UtcTime,
        SchemaType::GeneralizedTime => NodeType::GeneralizedTime,
        SchemaType::UniversalString => NodeType::UniversalString,
        SchemaType::BmpString => NodeType::BmpString,
        SchemaType::Sequence(_) => NodeType::Sequence,
        SchemaType::SequenceOf(_) => NodeType::SequenceOf,
        SchemaType::Set(_) => NodeType::Set,
        SchemaType::SetOf(_) => NodeType::SetOf,
        SchemaType::Choice(_) => NodeType::Choice,
        SchemaType::Any | SchemaType::Reference(_) => NodeType::Any,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn1::Encoder;

    const MODULE: &str = r#"
        Test DEFINITIONS EXPLICIT TAGS ::=
        BEGIN
        Pair ::= SEQUENCE {
            left    INTEGER,
            right   INTEGER
        }
        Record ::= SEQUENCE {
            version  [0] EXPLICIT INTEGER OPTIONAL,
            id       OBJECT IDENTIFIER,
            note     [1] IMPLICIT OCTET STRING OPTIONAL,
            body     Pair
        }
        Pairs ::= SET OF Pair
        Value ::= CHOICE {
            num     INTEGER,
            text    UTF8String
        }
        Wrapped ::= SEQUENCE {
            item    ANY
        }
        END
    "#;

    fn schema() -> Schema {
        Schema::parse(MODULE).unwrap()
    }

    fn decode(schema: &Schema, ty: &str, data: &[u8]) -> Result<DecodedTree, Error> {
        let mut reader = BerReader::from_bytes(data);
        BerDecoder::new(schema, &mut reader).decode(ty)
    }

    fn pair_der(left: &[u8], right: &[u8]) -> Vec<u8> {
        let mut inner = Encoder::new();
        inner.write_integer(left);
        inner.write_integer(right);
        let inner = inner.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&inner);
        enc.finish()
    }

    #[test]
    fn test_decode_sequence() {
        let s = schema();
        let der = pair_der(&[0x05], &[0x07]);
        let tree = decode(&s, "Test.Pair", &der).unwrap();
        assert_eq!(tree.image(), &der[..]);
        let left = tree.find("Pair.left").unwrap();
        assert_eq!(left.content(tree.image()).unwrap(), &[0x05]);
        let right = tree.find("Pair.right").unwrap();
        assert_eq!(right.content(tree.image()).unwrap(), &[0x07]);
    }

    #[test]
    fn test_header_arithmetic_invariant() {
        let s = schema();
        let der = pair_der(&[0x05], &[0x07]);
        let tree = decode(&s, "Pair", &der).unwrap();
        let root = &tree.root;
        let e = root.extent.unwrap();
        let sum: usize = root
            .children
            .iter()
            .filter_map(|c| c.extent)
            .map(|e| e.nhdr + e.len)
            .sum();
        assert_eq!(sum, e.len);
    }

    #[test]
    fn test_optional_fields_absent() {
        let s = schema();
        // Record { id, body } with version and note absent
        let mut enc = Encoder::new();
        enc.write_oid(&[0x2B, 0x65, 0x70]);
        enc.write_raw(&pair_der(&[0x01], &[0x02]));
        let body = enc.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&body);
        let der = enc.finish();

        let tree = decode(&s, "Record", &der).unwrap();
        let version = tree.find("Record.version").unwrap();
        assert!(version.extent.is_none(), "placeholder expected");
        let id = tree.find("Record.id").unwrap();
        assert_eq!(id.content(tree.image()).unwrap(), &[0x2B, 0x65, 0x70]);
        assert!(tree.find("Record.body.left").is_some());
    }

    #[test]
    fn test_optional_fields_present() {
        let s = schema();
        let mut body = Encoder::new();
        let mut ver = Encoder::new();
        ver.write_integer(&[0x02]);
        let ver = ver.finish();
        body.write_context_specific(0, true, &ver);
        body.write_oid(&[0x2A, 0x03]);
        body.write_context_specific(1, false, b"hi");
        body.write_raw(&pair_der(&[0x01], &[0x02]));
        let body = body.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&body);
        let der = enc.finish();

        let tree = decode(&s, "Record", &der).unwrap();
        let version = tree.find("Record.version").unwrap();
        // Explicit tag: extent covers the [0] wrapper, child is the INTEGER
        let e = version.extent.unwrap();
        assert_eq!(e.len, 3);
        assert_eq!(version.children.len(), 1);
        assert_eq!(
            version.children[0].content(tree.image()).unwrap(),
            &[0x02]
        );
        let note = tree.find("Record.note").unwrap();
        assert_eq!(note.content(tree.image()).unwrap(), b"hi");
        assert_eq!(note.node_type, NodeType::OctetString);
    }

    #[test]
    fn test_set_of() {
        let s = schema();
        let mut body = Encoder::new();
        body.write_raw(&pair_der(&[0x01], &[0x02]));
        body.write_raw(&pair_der(&[0x03], &[0x04]));
        let body = body.finish();
        let mut enc = Encoder::new();
        enc.write_set(&body);
        let der = enc.finish();

        let tree = decode(&s, "Pairs", &der).unwrap();
        assert_eq!(tree.root.children.len(), 2);
        assert_eq!(tree.root.children[0].name, "Pair");
        assert_eq!(
            tree.root.children[1].children[1]
                .content(tree.image())
                .unwrap(),
            &[0x04]
        );
    }

    #[test]
    fn test_choice_wrapper() {
        let s = schema();
        let mut enc = Encoder::new();
        enc.write_utf8_string("ok");
        let der = enc.finish();
        let tree = decode(&s, "Value", &der).unwrap();
        assert_eq!(tree.root.node_type, NodeType::Choice);
        assert_eq!(tree.root.children.len(), 1);
        let alt = &tree.root.children[0];
        assert_eq!(alt.name, "text");
        assert_eq!(alt.content(tree.image()).unwrap(), b"ok");
    }

    #[test]
    fn test_choice_no_match() {
        let s = schema();
        let der = [0x04, 0x01, 0xAA]; // OCTET STRING is not an alternative
        assert!(matches!(
            decode(&s, "Value", &der),
            Err(Error::UnexpectedTag)
        ));
    }

    #[test]
    fn test_any_captures_raw_tlv() {
        let s = schema();
        let mut body = Encoder::new();
        body.write_raw(&pair_der(&[0x09], &[0x08]));
        let body = body.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&body);
        let der = enc.finish();

        let tree = decode(&s, "Wrapped", &der).unwrap();
        let item = tree.find("Wrapped.item").unwrap();
        assert_eq!(item.node_type, NodeType::Any);
        assert!(item.children.is_empty());
        assert_eq!(item.tlv_span(tree.image()).unwrap(), &pair_der(&[0x09], &[0x08])[..]);
    }

    #[test]
    fn test_indefinite_length_body() {
        let s = schema();
        // Pair in indefinite form: 30 80 <left> <right> 00 00
        let mut der = vec![0x30, 0x80];
        der.extend_from_slice(&[0x02, 0x01, 0x05]);
        der.extend_from_slice(&[0x02, 0x01, 0x07]);
        der.extend_from_slice(&[0x00, 0x00]);

        let tree = decode(&s, "Pair", &der).unwrap();
        // The EOC octets are captured but belong to no node
        assert_eq!(tree.image(), &der[..]);
        let e = tree.root.extent.unwrap();
        assert_eq!(e.nhdr, 2);
        assert_eq!(e.len, 6);
        assert_eq!(
            tree.find("Pair.right")
                .unwrap()
                .content(tree.image())
                .unwrap(),
            &[0x07]
        );
    }

    #[test]
    fn test_child_larger_than_parent() {
        let s = schema();
        // SEQUENCE declares 4 content bytes but the inner INTEGER wants 5
        let der = [0x30, 0x04, 0x02, 0x05, 0x01, 0x02];
        assert!(matches!(decode(&s, "Pair", &der), Err(Error::Ber)));
    }

    #[test]
    fn test_trailing_garbage_in_sequence() {
        let s = schema();
        // Pair with an extra INTEGER inside
        let mut inner = Encoder::new();
        inner.write_integer(&[1]);
        inner.write_integer(&[2]);
        inner.write_integer(&[3]);
        let inner = inner.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&inner);
        let der = enc.finish();
        assert!(matches!(decode(&s, "Pair", &der), Err(Error::Ber)));
    }

    #[test]
    fn test_truncated_input() {
        let s = schema();
        let der = pair_der(&[0x05], &[0x07]);
        assert!(matches!(
            decode(&s, "Pair", &der[..der.len() - 2]),
            Err(Error::ObjectTooShort)
        ));
    }

    #[test]
    fn test_unexpected_tag() {
        let s = schema();
        let mut inner = Encoder::new();
        inner.write_octet_string(&[1]);
        inner.write_integer(&[2]);
        let inner = inner.finish();
        let mut enc = Encoder::new();
        enc.write_sequence(&inner);
        let der = enc.finish();
        assert!(matches!(
            decode(&s, "Pair", &der),
            Err(Error::UnexpectedTag)
        ));
    }
}
