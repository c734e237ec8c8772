#![no_main]
use libfuzzer_sys::fuzz_target;

use xmsg_pki::{CmsContentType, CmsParser};
use xmsg_utils::asn1::BerReader;

fuzz_target!(|data: &[u8]| {
    let mut parser = CmsParser::new(BerReader::from_bytes(data));
    if parser.parse_content_info().is_err() {
        return;
    }
    match parser.content_type() {
        Some(CmsContentType::SignedData) => {
            if parser.parse_signed_data_part_1().is_ok() {
                let _ = parser.parse_signed_data_part_2();
            }
        }
        Some(CmsContentType::EnvelopedData) => {
            let _ = parser.parse_enveloped_data_part_1();
        }
        _ => {}
    }
});
