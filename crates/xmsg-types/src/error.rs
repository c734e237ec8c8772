/// BER/DER, key-info and CMS processing errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // General errors
    #[error("invalid value")]
    InvalidValue,
    #[error("out of core")]
    OutOfCore,
    #[error("object already initialized")]
    Conflict,
    #[error("no data")]
    NoData,
    #[error("no value")]
    NoValue,
    #[error("general error: {0}")]
    General(String),

    // BER/DER structural errors
    #[error("bad BER encoding")]
    Ber,
    #[error("not DER encoded")]
    NotDerEncoded,
    #[error("unexpected tag")]
    UnexpectedTag,
    #[error("object too short")]
    ObjectTooShort,
    #[error("object too large")]
    ObjectTooLarge,
    #[error("unsupported encoding")]
    UnsupportedEncoding,

    // Key-info and object-level errors
    #[error("invalid key info")]
    InvalidKeyInfo,
    #[error("invalid object")]
    InvalidObject,

    // S-expression errors
    #[error("invalid s-expression")]
    InvalidSexp,
    #[error("unknown s-expression")]
    UnknownSexp,

    // Algorithm lookup errors
    #[error("unknown algorithm")]
    UnknownAlgorithm,
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,

    // CMS errors
    #[error("invalid CMS object")]
    InvalidCmsObject,
    #[error("no CMS object")]
    NoCmsObject,
    #[error("unsupported CMS object")]
    UnsupportedCmsObject,
    #[error("unsupported CMS version")]
    UnsupportedCmsVersion,

    // I/O
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_simple_variants() {
        assert_eq!(Error::InvalidValue.to_string(), "invalid value");
        assert_eq!(Error::Ber.to_string(), "bad BER encoding");
        assert_eq!(Error::NotDerEncoded.to_string(), "not DER encoded");
        assert_eq!(Error::NoCmsObject.to_string(), "no CMS object");
        assert_eq!(
            Error::UnsupportedAlgorithm.to_string(),
            "unsupported algorithm"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: Error = io.into();
        let display = err.to_string();
        assert!(display.contains("pipe"), "got: {display}");
    }

    #[test]
    fn test_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
