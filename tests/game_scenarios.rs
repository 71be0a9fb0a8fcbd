use xiangqi::board::Board;
use xiangqi::game::{Ending, Game, GameState};
use xiangqi::location::Location;
use xiangqi::piece::Side;

fn at(s: &str) -> Location {
    s.parse().unwrap()
}

#[test]
fn cannon_moves_jumps_and_captures() {
    let mut game = Game::opening();

    assert!(game.make_move("h3", "h7"));
    assert!(game.make_move("b8", "b5"));
    assert!(game.make_move("b3", "a3"));
    assert!(game.make_move("b5", "i5"));

    // diagonal
    assert!(!game.make_move("a3", "c6"));
    // black piece on red's turn, and a jump without a capture
    assert!(!game.make_move("h8", "h2"));
    // capture without a screen
    assert!(!game.make_move("h7", "h8"));

    game.pass_turn();
    let chariot = game.board()[at("i1")].unwrap();
    assert!(game.make_move("i5", "i1"));
    assert_eq!(game.board().location_of(chariot), None);
    assert_eq!(game.board()[at("i1")].map(|piece| piece.side()), Some(Side::Black));
    assert_eq!(game.game_state(), GameState::Unfinished);
}

#[test]
fn cannons_deliver_checkmate() {
    let mut game = Game::opening();

    assert!(game.make_move("b3", "e3"));
    assert!(game.make_move("h8", "e8"));
    assert!(game.make_move("h3", "h6"));
    assert!(game.make_move("b8", "b4"));
    assert!(game.make_move("e3", "e7"));
    assert!(game.is_in_check(Side::Black));
    assert!(!game.is_in_checkmate(Side::Black));
    assert!(game.make_move("e8", "e4"));
    assert!(game.make_move("h6", "e6"));

    assert!(game.is_in_check(Side::Black));
    assert!(game.is_in_checkmate(Side::Black));
    assert_eq!(game.game_state(), GameState::RedWon);
    assert_eq!(game.ending(), Some(Ending::Checkmate));

    // nothing may be played once the game is decided
    assert!(!game.make_move("a10", "a9"));
    assert!(!game.make_move("a1", "a2"));
}

#[test]
fn elephant_opening_leaves_game_running() {
    let mut game = Game::opening();

    assert!(game.make_move("c1", "e3"));
    assert!(!game.is_in_check(Side::Black));
    assert!(game.make_move("e7", "e6"));
    assert_eq!(game.game_state(), GameState::Unfinished);
    assert_eq!(game.turn(), Side::Red);
    assert_eq!(game.history().len(), 2);
}

#[test]
fn boxed_in_general_is_stalemated() {
    // black keeps only the general and two advisors; the cannon on e5 pins the advisors and the
    // cannon arriving on a9 covers e9 over the soldier on c9
    let mut game = Game::from_fen("3aka3/2P6/C8/9/9/4C4/9/9/9/3K5", Side::Red).unwrap();
    assert!(!game.is_in_stalemate(Side::Black));

    assert!(game.make_move("a8", "a9"));

    assert!(!game.is_in_check(Side::Black));
    assert!(!game.is_in_checkmate(Side::Black));
    assert!(game.is_in_stalemate(Side::Black));
    assert_eq!(game.game_state(), GameState::RedWon);
    assert_eq!(game.ending(), Some(Ending::Stalemate));
    assert!(!game.make_move("e10", "e9"));
}

#[test]
fn opposing_generals_on_open_file_check_each_other() {
    let game = Game::from_fen(
        "rheakaehr/9/1c5c1/p1p3p1p/9/9/P1P3P1P/1C5C1/9/RHEAKAEHR",
        Side::Red,
    )
    .unwrap();

    assert!(game.is_in_check(Side::Black));
    assert!(game.is_in_check(Side::Red));

    let red = game.player(Side::Red).general();
    assert!(red.is_flying_general(game.board(), at("e10")));
    assert!(!game.is_in_checkmate(Side::Red));
}

#[test]
fn general_steps_out_of_check() {
    // the chariot checks along the e file; d10 is covered by the red general across the open d file
    let game = Game::from_fen("4k4/9/9/9/9/4R4/9/9/9/3K5", Side::Black).unwrap();

    assert!(game.is_in_check(Side::Black));
    assert!(!game.is_in_checkmate(Side::Black));
    assert_eq!(game.game_state(), GameState::Unfinished);

    let moves = game.available_moves();
    assert_eq!(moves.len(), 1);
    assert!(moves.iter().all(|mv| mv.to == at("f10")));
}

#[test]
fn position_already_mated_is_decided() {
    // the chariot on e5 checks, the one on d9 and the red general cover every escape
    let game = Game::from_fen("4k4/3R5/9/9/9/4R4/9/9/9/5K3", Side::Black).unwrap();

    assert!(game.is_in_checkmate(Side::Black));
    assert_eq!(game.game_state(), GameState::RedWon);
}

#[test]
fn board_without_generals_is_not_decided() {
    let game = Game::new(Board::new(), Side::Red);

    assert!(!game.is_in_stalemate(Side::Red));
    assert!(!game.is_in_checkmate(Side::Black));
    assert_eq!(game.game_state(), GameState::Unfinished);
    assert_eq!(game.ending(), None);
}

#[test]
fn display_lists_captures_and_status() {
    let mut game = Game::opening();
    assert!(game.make_move("h3", "h10"));

    let text = game.display(xiangqi::display_format::DisplayFormat::pretty()).to_string();
    assert!(text.contains("black lost:"));
    assert!(text.contains("(1) h3h10"));
    assert!(text.contains("black to play"));

    assert_eq!(game.to_string(), "1 black UNFINISHED");
}
