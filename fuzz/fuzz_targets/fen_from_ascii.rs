#![no_main]

use chesslaw::fen::Fen;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(fen) = Fen::from_ascii(data) else {
        return;
    };
    let written = fen.to_string();
    let reparsed = Fen::from_ascii(written.as_bytes()).expect("roundtrip");
    assert_eq!(reparsed.to_string(), written);
    assert_eq!(reparsed.board.board_fen(), fen.board.board_fen());
});
