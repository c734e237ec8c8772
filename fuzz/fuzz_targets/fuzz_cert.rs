#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(cert) = xmsg_pki::Certificate::from_bytes(data) {
        let _ = cert.serial();
        let _ = cert.issuer();
        let _ = cert.subject();
        let _ = cert.public_key();
        let _ = cert.sig_val();
    }
});
