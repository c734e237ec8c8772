//! Textual ASN.1 module parser.
//!
//! Turns an ASN.1 module definition into a grammar tree the BER
//! decoder can drive.  The accepted language covers what the bundled
//! X.509 and CMS modules need: type assignments, SEQUENCE / SET
//! (possibly OF), CHOICE, context tags with IMPLICIT/EXPLICIT modes,
//! OPTIONAL/DEFAULT markers, the universal primitive types, ANY and
//! type references.  Value constraints and named-number lists are
//! accepted and ignored.

use std::collections::HashMap;

use xmsg_types::Error;

use super::Class;

/// A parsed ASN.1 module.
pub struct Schema {
    module: String,
    types: HashMap<String, SchemaNode>,
}

/// One type position in the grammar: a field, a CHOICE alternative, a
/// SET OF element or a top-level type.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Field name, or the type name for top-level assignments.
    pub name: String,
    pub ty: SchemaType,
    pub tag: Option<TagSpec>,
    /// OPTIONAL or DEFAULT in the source module.
    pub optional: bool,
}

/// A context (or application/private) tag on a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpec {
    pub class: Class,
    pub number: u32,
    pub explicit: bool,
}

#[derive(Debug, Clone)]
pub enum SchemaType {
    Sequence(Vec<SchemaNode>),
    Set(Vec<SchemaNode>),
    SequenceOf(Box<SchemaNode>),
    SetOf(Box<SchemaNode>),
    Choice(Vec<SchemaNode>),
    Reference(String),
    Any,
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
}

impl SchemaType {
    /// Universal tag number of this type, if it has one of its own.
    pub fn universal_tag(&self) -> Option<u32> {
        match self {
            SchemaType::Boolean => Some(1),
            SchemaType::Integer => Some(2),
            SchemaType::BitString => Some(3),
            SchemaType::OctetString => Some(4),
            SchemaType::Null => Some(5),
            SchemaType::ObjectId => Some(6),
            SchemaType::Enumerated => Some(10),
            SchemaType::Utf8String => Some(12),
            SchemaType::NumericString => Some(18),
            SchemaType::PrintableString => Some(19),
            SchemaType::T61String => Some(20),
            SchemaType::Ia5String => Some(22),
            SchemaType::UtcTime => Some(23),
            SchemaType::GeneralizedTime => Some(24),
            SchemaType::UniversalString => Some(28),
            SchemaType::BmpString => Some(30),
            SchemaType::Sequence(_) | SchemaType::SequenceOf(_) => Some(16),
            SchemaType::Set(_) | SchemaType::SetOf(_) => Some(17),
            SchemaType::Choice(_) | SchemaType::Reference(_) | SchemaType::Any => None,
        }
    }

    /// Whether the BER encoding of this type is constructed.
    pub fn is_constructed(&self) -> bool {
        matches!(
            self,
            SchemaType::Sequence(_)
                | SchemaType::SequenceOf(_)
                | SchemaType::Set(_)
                | SchemaType::SetOf(_)
        )
    }
}

impl Schema {
    /// Parse an ASN.1 module text.
    pub fn parse(text: &str) -> Result<Schema, Error> {
        let tokens = tokenize(text)?;
        let mut p = Parser { tokens, pos: 0 };
        p.parse_module()
    }

    /// Module name as declared in the source.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Look up a type by name; a "Module.Type" form is accepted when
    /// the module part matches this schema (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        let name = match name.split_once('.') {
            Some((module, rest)) if module.eq_ignore_ascii_case(&self.module) => rest,
            _ => name,
        };
        self.types.get(name)
    }
}

// ── Tokenizer ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Number(u32),
    Assign,
    Sym(char),
}

fn tokenize(text: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                // Comment to end of line
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b':' => {
                if bytes.get(i + 1) == Some(&b':') && bytes.get(i + 2) == Some(&b'=') {
                    tokens.push(Token::Assign);
                    i += 3;
                } else {
                    return Err(schema_err("stray ':'"));
                }
            }
            b'{' | b'}' | b'[' | b']' | b'(' | b')' | b',' | b';' | b'.' => {
                tokens.push(Token::Sym(c as char));
                i += 1;
            }
            b'0'..=b'9' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let n: u32 = text[start..i]
                    .parse()
                    .map_err(|_| schema_err("number overflow"))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-')
                    && !(bytes[i] == b'-' && bytes.get(i + 1) == Some(&b'-'))
                {
                    i += 1;
                }
                tokens.push(Token::Ident(text[start..i].to_string()));
            }
            _ => return Err(schema_err("unexpected character")),
        }
    }
    Ok(tokens)
}

fn schema_err(msg: &str) -> Error {
    Error::General(format!("schema: {msg}"))
}

// ── Parser ───────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<&Token, Error> {
        let tok = self.tokens.get(self.pos).ok_or_else(|| schema_err("unexpected end"))?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect_ident(&mut self) -> Result<String, Error> {
        match self.next()? {
            Token::Ident(s) => Ok(s.clone()),
            _ => Err(schema_err("identifier expected")),
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<(), Error> {
        match self.next()? {
            Token::Ident(s) if s == kw => Ok(()),
            _ => Err(Error::General(format!("schema: '{kw}' expected"))),
        }
    }

    fn expect_sym(&mut self, c: char) -> Result<(), Error> {
        match self.next()? {
            Token::Sym(s) if *s == c => Ok(()),
            _ => Err(Error::General(format!("schema: '{c}' expected"))),
        }
    }

    fn eat_sym(&mut self, c: char) -> bool {
        if self.peek() == Some(&Token::Sym(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, kw: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(s)) if s == kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_module(&mut self) -> Result<Schema, Error> {
        let module = self.expect_ident()?;
        self.expect_keyword("DEFINITIONS")?;
        let mut implicit_default = false;
        if self.eat_ident("IMPLICIT") {
            self.expect_keyword("TAGS")?;
            implicit_default = true;
        } else if self.eat_ident("EXPLICIT") {
            self.expect_keyword("TAGS")?;
        }
        match self.next()? {
            Token::Assign => {}
            _ => return Err(schema_err("'::=' expected")),
        }
        self.expect_keyword("BEGIN")?;

        let mut types = HashMap::new();
        loop {
            let name = self.expect_ident()?;
            if name == "END" {
                break;
            }
            match self.next()? {
                Token::Assign => {}
                _ => return Err(schema_err("'::=' expected")),
            }
            let mut node = self.parse_type(implicit_default)?;
            node.name = name.clone();
            types.insert(name, node);
        }
        Ok(Schema { module, types })
    }

    /// Parse a type, with an optional leading context tag.
    fn parse_type(&mut self, implicit_default: bool) -> Result<SchemaNode, Error> {
        let mut tag = None;
        if self.eat_sym('[') {
            let class = if self.eat_ident("UNIVERSAL") {
                Class::Universal
            } else if self.eat_ident("APPLICATION") {
                Class::Application
            } else if self.eat_ident("PRIVATE") {
                Class::Private
            } else {
                Class::Context
            };
            let number = match self.next()? {
                Token::Number(n) => *n,
                _ => return Err(schema_err("tag number expected")),
            };
            self.expect_sym(']')?;
            let explicit = if self.eat_ident("IMPLICIT") {
                false
            } else if self.eat_ident("EXPLICIT") {
                true
            } else {
                !implicit_default
            };
            tag = Some(TagSpec {
                class,
                number,
                explicit,
            });
        }

        let ty = self.parse_base_type(implicit_default)?;
        self.skip_constraint()?;

        Ok(SchemaNode {
            name: String::new(),
            ty,
            tag,
            optional: false,
        })
    }

    fn parse_base_type(&mut self, implicit_default: bool) -> Result<SchemaType, Error> {
        let ident = self.expect_ident()?;
        let ty = match ident.as_str() {
            "SEQUENCE" => {
                self.skip_size_constraint()?;
                if self.eat_ident("OF") {
                    let elem = self.parse_type(implicit_default)?;
                    SchemaType::SequenceOf(Box::new(named_elem(elem)))
                } else {
                    SchemaType::Sequence(self.parse_fields(implicit_default)?)
                }
            }
            "SET" => {
                self.skip_size_constraint()?;
                if self.eat_ident("OF") {
                    let elem = self.parse_type(implicit_default)?;
                    SchemaType::SetOf(Box::new(named_elem(elem)))
                } else {
                    SchemaType::Set(self.parse_fields(implicit_default)?)
                }
            }
            "CHOICE" => SchemaType::Choice(self.parse_fields(implicit_default)?),
            "INTEGER" => {
                self.skip_braced()?;
                SchemaType::Integer
            }
            "ENUMERATED" => {
                self.skip_braced()?;
                SchemaType::Enumerated
            }
            "BOOLEAN" => SchemaType::Boolean,
            "NULL" => SchemaType::Null,
            "OCTET" => {
                self.expect_keyword("STRING")?;
                SchemaType::OctetString
            }
            "BIT" => {
                self.expect_keyword("STRING")?;
                SchemaType::BitString
            }
            "OBJECT" => {
                self.expect_keyword("IDENTIFIER")?;
                SchemaType::ObjectId
            }
            "ANY" => {
                if self.eat_ident("DEFINED") {
                    self.expect_keyword("BY")?;
                    self.expect_ident()?;
                }
                SchemaType::Any
            }
            "UTF8String" => SchemaType::Utf8String,
            "NumericString" => SchemaType::NumericString,
            "PrintableString" => SchemaType::PrintableString,
            "T61String" | "TeletexString" => SchemaType::T61String,
            "IA5String" => SchemaType::Ia5String,
            "UTCTime" => SchemaType::UtcTime,
            "GeneralizedTime" => SchemaType::GeneralizedTime,
            "UniversalString" => SchemaType::UniversalString,
            "BMPString" => SchemaType::BmpString,
            _ => SchemaType::Reference(ident),
        };
        Ok(ty)
    }

    fn parse_fields(&mut self, implicit_default: bool) -> Result<Vec<SchemaNode>, Error> {
        self.expect_sym('{')?;
        let mut fields = Vec::new();
        loop {
            let name = self.expect_ident()?;
            let mut node = self.parse_type(implicit_default)?;
            node.name = name;
            if self.eat_ident("OPTIONAL") {
                node.optional = true;
            } else if self.eat_ident("DEFAULT") {
                // Skip the default value token
                self.next()?;
                node.optional = true;
            }
            fields.push(node);
            if self.eat_sym(',') {
                continue;
            }
            self.expect_sym('}')?;
            break;
        }
        Ok(fields)
    }

    /// Skip a parenthesised constraint, if present.
    fn skip_constraint(&mut self) -> Result<(), Error> {
        if self.eat_sym('(') {
            let mut depth = 1;
            while depth > 0 {
                match self.next()? {
                    Token::Sym('(') => depth += 1,
                    Token::Sym(')') => depth -= 1,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Skip a `SIZE (..)` or plain parenthesised constraint between a
    /// SEQUENCE/SET keyword and OF.
    fn skip_size_constraint(&mut self) -> Result<(), Error> {
        if matches!(self.peek(), Some(Token::Sym('('))) {
            self.skip_constraint()?;
        } else if self.eat_ident("SIZE") {
            self.skip_constraint()?;
        }
        Ok(())
    }

    /// Skip a named-number list, if present.
    fn skip_braced(&mut self) -> Result<(), Error> {
        if self.eat_sym('{') {
            let mut depth = 1;
            while depth > 0 {
                match self.next()? {
                    Token::Sym('{') => depth += 1,
                    Token::Sym('}') => depth -= 1,
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

// ── Bundled modules ──────────────────────────────────────────────────

static X509_SCHEMA: std::sync::OnceLock<Schema> = std::sync::OnceLock::new();
static CMS_SCHEMA: std::sync::OnceLock<Schema> = std::sync::OnceLock::new();

/// The bundled X.509 certificate grammar (module `TMTTv2`).
pub fn x509_schema() -> Result<&'static Schema, Error> {
    if let Some(s) = X509_SCHEMA.get() {
        return Ok(s);
    }
    let parsed = Schema::parse(include_str!("modules/tmttv2.asn"))?;
    Ok(X509_SCHEMA.get_or_init(|| parsed))
}

/// The bundled CMS grammar (module `CryptographicMessageSyntax`).
pub fn cms_schema() -> Result<&'static Schema, Error> {
    if let Some(s) = CMS_SCHEMA.get() {
        return Ok(s);
    }
    let parsed = Schema::parse(include_str!("modules/cms.asn"))?;
    Ok(CMS_SCHEMA.get_or_init(|| parsed))
}

/// Give a SET OF / SEQUENCE OF element a usable path name.
fn named_elem(mut elem: SchemaNode) -> SchemaNode {
    if elem.name.is_empty() {
        elem.name = match &elem.ty {
            SchemaType::Reference(r) => r.clone(),
            SchemaType::Sequence(_) | SchemaType::SequenceOf(_) => "sequence".into(),
            SchemaType::Set(_) | SchemaType::SetOf(_) => "set".into(),
            SchemaType::Choice(_) => "choice".into(),
            _ => "item".into(),
        };
    }
    elem
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULE: &str = r#"
        Demo DEFINITIONS EXPLICIT TAGS ::=
        BEGIN
        -- a comment
        Version ::= INTEGER { v1(0), v2(1), v3(2) }
        Item ::= SEQUENCE {
            id      OBJECT IDENTIFIER,
            flag    BOOLEAN DEFAULT FALSE,
            extra   [0] IMPLICIT OCTET STRING OPTIONAL,
            body    ANY DEFINED BY id
        }
        Items ::= SET OF Item
        Pick ::= CHOICE {
            num     INTEGER,
            text    UTF8String
        }
        END
    "#;

    #[test]
    fn test_parse_module() {
        let schema = Schema::parse(MODULE).unwrap();
        assert_eq!(schema.module(), "Demo");
        assert!(schema.get("Version").is_some());
        assert!(schema.get("Demo.Items").is_some());
        assert!(schema.get("demo.Items").is_some());
        assert!(schema.get("Missing").is_none());
    }

    #[test]
    fn test_sequence_fields() {
        let schema = Schema::parse(MODULE).unwrap();
        let item = schema.get("Item").unwrap();
        let fields = match &item.ty {
            SchemaType::Sequence(f) => f,
            other => panic!("not a sequence: {other:?}"),
        };
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].name, "id");
        assert!(matches!(fields[0].ty, SchemaType::ObjectId));
        assert!(fields[1].optional, "DEFAULT marks optional");
        let tag = fields[2].tag.unwrap();
        assert_eq!(tag.number, 0);
        assert!(!tag.explicit);
        assert!(fields[2].optional);
        assert!(matches!(fields[3].ty, SchemaType::Any));
    }

    #[test]
    fn test_set_of_element_named_by_reference() {
        let schema = Schema::parse(MODULE).unwrap();
        let items = schema.get("Items").unwrap();
        match &items.ty {
            SchemaType::SetOf(elem) => {
                assert_eq!(elem.name, "Item");
                assert!(matches!(elem.ty, SchemaType::Reference(ref r) if r == "Item"));
            }
            other => panic!("not SET OF: {other:?}"),
        }
    }

    #[test]
    fn test_choice() {
        let schema = Schema::parse(MODULE).unwrap();
        let pick = schema.get("Pick").unwrap();
        match &pick.ty {
            SchemaType::Choice(alts) => {
                assert_eq!(alts.len(), 2);
                assert_eq!(alts[0].name, "num");
            }
            other => panic!("not CHOICE: {other:?}"),
        }
    }

    #[test]
    fn test_universal_tags() {
        assert_eq!(SchemaType::Integer.universal_tag(), Some(2));
        assert_eq!(SchemaType::Sequence(vec![]).universal_tag(), Some(16));
        assert_eq!(SchemaType::Any.universal_tag(), None);
        assert!(SchemaType::Set(vec![]).is_constructed());
        assert!(!SchemaType::OctetString.is_constructed());
    }

    #[test]
    fn test_bundled_x509_module() {
        let schema = x509_schema().unwrap();
        assert_eq!(schema.module(), "TMTTv2");
        assert!(schema.get("TMTTv2.Certificate").is_some());
        let tbs = schema.get("TBSCertificate").unwrap();
        match &tbs.ty {
            SchemaType::Sequence(f) => {
                assert_eq!(f.len(), 10);
                assert_eq!(f[0].name, "version");
                assert!(f[0].tag.unwrap().explicit);
                assert!(f[0].optional);
                assert_eq!(f[9].name, "extensions");
            }
            other => panic!("not a sequence: {other:?}"),
        }
    }

    #[test]
    fn test_bundled_cms_module() {
        let schema = cms_schema().unwrap();
        assert_eq!(schema.module(), "CryptographicMessageSyntax");
        assert!(schema
            .get("CryptographicMessageSyntax.SignerInfos")
            .is_some());
        assert!(schema
            .get("CryptographicMessageSyntax.RecipientInfos")
            .is_some());
        let si = schema.get("SignerInfo").unwrap();
        match &si.ty {
            SchemaType::Sequence(f) => {
                assert_eq!(f[3].name, "signedAttrs");
                let tag = f[3].tag.unwrap();
                assert_eq!(tag.number, 0);
                assert!(!tag.explicit);
            }
            other => panic!("not a sequence: {other:?}"),
        }
    }

    #[test]
    fn test_module_implicit_default() {
        let text = r#"
            M DEFINITIONS IMPLICIT TAGS ::= BEGIN
            T ::= SEQUENCE { a [0] INTEGER OPTIONAL }
            END
        "#;
        let schema = Schema::parse(text).unwrap();
        let t = schema.get("T").unwrap();
        match &t.ty {
            SchemaType::Sequence(f) => {
                assert!(!f[0].tag.unwrap().explicit);
            }
            _ => panic!(),
        }
    }
}
