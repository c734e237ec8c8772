#![no_main]
use libfuzzer_sys::fuzz_target;

use xmsg_pki::keyinfo;

fuzz_target!(|data: &[u8]| {
    if let Ok(sexp) = keyinfo::keyinfo_to_sexp(data) {
        // Anything we can read we must be able to write again
        let _ = keyinfo::keyinfo_from_sexp(sexp.as_bytes());
    }
    let _ = keyinfo::sigval_to_sexp(data);
    let _ = keyinfo::keyinfo_from_sexp(data);
});
