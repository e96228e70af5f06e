#![no_main]
use libfuzzer_sys::fuzz_target;
use xapiand_pack::{decode_length, decode_string, Action, SearchResults, WireFormat};

fuzz_target!(|data: &[u8]| {
    if let Ok((length, rest)) = decode_length(data) {
        assert!(rest.len() < data.len());
        let _ = length;
    }
    if let Ok((s, rest)) = decode_string(data) {
        assert!(s.len() + rest.len() < data.len());
    }
    for format in [WireFormat::Json, WireFormat::Msgpack] {
        if let Ok(value) = format.decode(data) {
            // Anything that decodes must encode again
            let _ = format.encode(&value).unwrap();
            let _ = SearchResults::from_envelope(value);
        }
        let _ = xapiand_pack::decode_response(Action::Search, format.content_type(), data);
    }
});
