#![no_main]
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use tetrachess::chess::save::{SaveFormat, SavedGame};

fuzz_target!(|data: &[u8]| {
    for format in [SaveFormat::Text, SaveFormat::Binary] {
        if let Ok(saved) = SavedGame::decode(data, format) {
            let encoded = saved.encode(format);
            assert_eq!(SavedGame::decode(&encoded, format).unwrap(), saved);
        }
    }
});
