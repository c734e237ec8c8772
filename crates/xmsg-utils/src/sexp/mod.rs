//! Canonical s-expressions.
//!
//! The exchange format at the library boundary: every list is
//! parenthesised and every atom is encoded as
//! `<ascii-decimal-length>:<raw-bytes>`, with no whitespace.

use xmsg_types::Error;

/// An owned canonical s-expression.
#[derive(Clone, PartialEq, Eq)]
pub struct Sexp(Vec<u8>);

impl Sexp {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Sexp(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Sexp {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Sexp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &b in &self.0 {
            if (0x20..0x7F).contains(&b) {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02X}")?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Sexp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sexp({self})")
    }
}

/// Incremental builder for canonical s-expressions.
pub struct SexpBuilder {
    buf: Vec<u8>,
}

impl SexpBuilder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append literal text, e.g. an opening parenthesis or a
    /// pre-encoded fragment.
    pub fn raw(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    /// Append a length-prefixed atom.
    pub fn atom(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf
            .extend_from_slice(bytes.len().to_string().as_bytes());
        self.buf.push(b':');
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append a string atom.
    pub fn atom_str(&mut self, s: &str) -> &mut Self {
        self.atom(s.as_bytes())
    }

    /// Append an unsigned number as a decimal atom.
    pub fn atom_uint(&mut self, n: u64) -> &mut Self {
        self.atom(n.to_string().as_bytes())
    }

    pub fn finish(self) -> Sexp {
        Sexp(self.buf)
    }
}

impl Default for SexpBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Cursor over a canonical s-expression.
pub struct SexpParser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SexpParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// True if positioned at an opening parenthesis.
    pub fn at_open(&self) -> bool {
        self.peek() == Some(b'(')
    }

    /// True if positioned at a closing parenthesis.
    pub fn at_close(&self) -> bool {
        self.peek() == Some(b')')
    }

    /// True if positioned at a decimal digit (an atom length).
    pub fn at_digit(&self) -> bool {
        matches!(self.peek(), Some(c) if c.is_ascii_digit())
    }

    /// Consume an opening parenthesis.
    pub fn expect_open(&mut self) -> Result<(), Error> {
        if !self.at_open() {
            return Err(Error::InvalidSexp);
        }
        self.pos += 1;
        Ok(())
    }

    /// Consume a closing parenthesis.
    pub fn expect_close(&mut self) -> Result<(), Error> {
        if !self.at_close() {
            return Err(Error::InvalidSexp);
        }
        self.pos += 1;
        Ok(())
    }

    /// Consume a length-prefixed atom.  Empty lengths are not allowed.
    pub fn atom(&mut self) -> Result<&'a [u8], Error> {
        let start = self.pos;
        while self.at_digit() {
            self.pos += 1;
        }
        if self.pos == start || self.peek() != Some(b':') {
            return Err(Error::InvalidSexp);
        }
        let len: usize = std::str::from_utf8(&self.data[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(Error::InvalidSexp)?;
        if len == 0 {
            return Err(Error::InvalidSexp);
        }
        self.pos += 1; // ':'
        if len > self.data.len() - self.pos {
            return Err(Error::InvalidSexp);
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Skip one complete expression (list or atom).
    pub fn skip_expr(&mut self) -> Result<(), Error> {
        if self.at_digit() {
            self.atom()?;
            return Ok(());
        }
        self.expect_open()?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                Some(b'(') => {
                    self.pos += 1;
                    depth += 1;
                }
                Some(b')') => {
                    self.pos += 1;
                    depth -= 1;
                }
                Some(c) if c.is_ascii_digit() => {
                    self.atom()?;
                }
                _ => return Err(Error::InvalidSexp),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_atoms() {
        let mut sb = SexpBuilder::new();
        sb.raw("(").atom_str("public-key").raw("(");
        sb.atom_str("rsa");
        sb.raw("(").atom_str("e").atom(&[0x01, 0x00, 0x01]).raw(")");
        sb.raw("))");
        let sexp = sb.finish();
        assert_eq!(
            sexp.as_bytes(),
            b"(10:public-key(3:rsa(1:e3:\x01\x00\x01)))"
        );
    }

    #[test]
    fn test_atom_uint() {
        let mut sb = SexpBuilder::new();
        sb.raw("(").atom_str("salt-length").atom_uint(20).raw(")");
        assert_eq!(sb.finish().as_bytes(), b"(11:salt-length2:20)");
    }

    #[test]
    fn test_parser_walk() {
        let data = b"(3:rsa(1:n2:ab)(1:e1:c))";
        let mut p = SexpParser::new(data);
        p.expect_open().unwrap();
        assert_eq!(p.atom().unwrap(), b"rsa");
        p.expect_open().unwrap();
        assert_eq!(p.atom().unwrap(), b"n");
        assert_eq!(p.atom().unwrap(), b"ab");
        p.expect_close().unwrap();
        p.expect_open().unwrap();
        assert_eq!(p.atom().unwrap(), b"e");
        assert_eq!(p.atom().unwrap(), b"c");
        p.expect_close().unwrap();
        p.expect_close().unwrap();
    }

    #[test]
    fn test_parser_skip_expr() {
        let data = b"(5:flags3:pss)9:remainder";
        let mut p = SexpParser::new(data);
        p.skip_expr().unwrap();
        assert_eq!(p.atom().unwrap(), b"remainder");
    }

    #[test]
    fn test_parser_rejects_empty_length() {
        let mut p = SexpParser::new(b"0:");
        assert!(matches!(p.atom(), Err(Error::InvalidSexp)));
        let mut p = SexpParser::new(b":x");
        assert!(matches!(p.atom(), Err(Error::InvalidSexp)));
    }

    #[test]
    fn test_parser_rejects_overrun() {
        let mut p = SexpParser::new(b"9:ab");
        assert!(matches!(p.atom(), Err(Error::InvalidSexp)));
    }

    #[test]
    fn test_display_escapes() {
        let sexp = Sexp::from_bytes(b"(1:q2:\x00\xFF)".to_vec());
        assert_eq!(sexp.to_string(), "(1:q2:\\x00\\xFF)");
    }
}
