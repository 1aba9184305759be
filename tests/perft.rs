use chesslaw::{fen::Fen, perft::perft_divide};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

#[serde_as]
#[derive(Deserialize)]
struct Record {
    #[serde_as(as = "DisplayFromStr")]
    fen: Fen,
    depth: u32,
    nodes: u64,
}

fn test_perft_file(path: &str, node_limit: u64) {
    let mut reader = csv::Reader::from_path(path).expect("reader");

    for (i, record) in reader.deserialize().enumerate() {
        let record: Record = record.expect("record");
        if record.nodes > node_limit {
            continue;
        }

        let divided = perft_divide(
            &record.fen.board,
            record.fen.last_move().as_ref(),
            record.fen.turn,
            record.depth,
        );
        let nodes: u64 = divided.iter().map(|&(_, nodes)| nodes).sum();
        assert_eq!(
            nodes,
            record.nodes,
            "line {}: {} depth {}, divided: {:?}",
            i + 2,
            record.fen,
            record.depth,
            divided
                .iter()
                .map(|(m, nodes)| format!("{m}: {nodes}"))
                .collect::<Vec<_>>()
        );
    }
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_perft_shallow() {
    test_perft_file("tests/perft.csv", 10_000);
}

#[test]
#[ignore = "slow in debug builds"]
fn test_perft_deep() {
    test_perft_file("tests/perft.csv", 250_000);
}
