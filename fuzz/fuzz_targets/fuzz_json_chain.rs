#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(c) = cfdi::core::Comprobante::from_json_str(s) else {
        return;
    };
    let _ = cfdi::core::validate_extended(&c);
    let chain = cfdi::core::original_chain(&c, "30001000000500003416");
    assert!(chain.starts_with("||") && chain.ends_with("||"));
});
