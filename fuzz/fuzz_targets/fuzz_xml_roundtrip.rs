#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(tree) = cfdi::xml::xml_to_value(s) else {
        return;
    };
    let Ok(c) = cfdi::core::Comprobante::from_json(&tree) else {
        return;
    };
    // Anything we can read we must be able to write and read back
    let markup = cfdi::xml::to_cfdi_xml(&c).expect("serialization must not fail");
    let record = cfdi::xml::from_cfdi_xml(&markup, "fuzz", None).expect("own markup must parse");
    assert_eq!(record.conceptos.len(), c.conceptos.len());
});
