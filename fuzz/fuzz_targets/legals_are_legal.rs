#![no_main]

use arbitrary::Arbitrary;
use chesslaw::{movegen::legal_moves, CandidateMove, Game, Origin, Validator};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Data {
    candidates: Vec<CandidateMove>,
}

fuzz_target!(|data: Data| {
    let game = Game::new();

    for candidate in data.candidates {
        let snapshot = game.executor().snapshot();
        let last_move = snapshot.last_move.as_ref();
        let legals = legal_moves(&snapshot.board, last_move, snapshot.turn);
        let validator = Validator::new(&snapshot.board, last_move);

        assert!(legals.iter().all(|&m| validator.is_legal(m, snapshot.turn)));

        let is_legal = validator.is_legal(candidate, snapshot.turn);
        let is_generated = legals.contains(&candidate)
            || (candidate.promotion.is_none()
                && legals.contains(&candidate.with_promotion(chesslaw::Role::Queen)));
        assert_eq!(is_legal, is_generated, "{candidate}");

        let executed = game.execute_move(candidate, Origin::Local);
        assert_eq!(executed.is_ok(), is_legal);

        // Keep exploring from a playable position.
        if legals.is_empty() {
            break;
        }
        if !is_legal {
            game.execute_move(legals[0], Origin::Remote).expect("generated move");
        }
    }
});
