use chesslaw::{fen::Fen, validate::Validator};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

#[derive(Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Ending {
    Checkmate,
    Stalemate,
    Playing,
}

#[serde_as]
#[derive(Deserialize)]
struct Record {
    #[serde_as(as = "DisplayFromStr")]
    fen: Fen,
    ending: Ending,
}

#[test]
fn test_endings() {
    let mut reader = csv::Reader::from_path("tests/endings.csv").expect("reader");

    for (i, record) in reader.deserialize().enumerate() {
        let record: Record = record.expect("record");
        let last_move = record.fen.last_move();
        let validator = Validator::new(&record.fen.board, last_move.as_ref());
        let turn = record.fen.turn;

        assert_eq!(
            validator.is_checkmate(turn),
            record.ending == Ending::Checkmate,
            "line {}: {}",
            i + 2,
            record.fen
        );
        assert_eq!(
            validator.is_stalemate(turn),
            record.ending == Ending::Stalemate,
            "line {}: {}",
            i + 2,
            record.fen
        );
        assert_eq!(
            validator.has_legal_move(turn),
            record.ending == Ending::Playing,
            "line {}: {}",
            i + 2,
            record.fen
        );
    }
}
