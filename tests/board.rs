use connect4::{
    Board, BoardConfig, Error, FieldFilter, JsonSerializer, Mode, Move, MoveError, Player,
    Serializable,
};
use serde_json::json;

fn assert_game_state(board: &Board, last: Move, should_win: bool) {
    assert_eq!(board.last_move_won(), should_win);
    if should_win {
        assert_eq!(board.winner(), Some(last.player));
    } else {
        assert_eq!(board.winner(), None);
    }
    assert_eq!(board.last_player(), last.player);
    assert_ne!(board.next_player(), last.player);
    assert_eq!(board.move_history().last(), Some(&last));
}

/// Play alternating moves from an empty board, checking each landing row.
/// Moves are `(column, expected_row)`.
fn run_game(moves: &[(usize, usize)], should_win: bool) {
    let mut board = Board::new();
    let mut player = Player::FIRST;

    for (i, &(column, row)) in moves.iter().enumerate() {
        let expected = Move {
            player,
            column,
            row,
        };
        assert_eq!(board.play(player, column).unwrap(), row);
        let is_last = i + 1 == moves.len();
        assert_game_state(&board, expected, is_last && should_win);
        player = player.other();
    }

    assert_eq!(board.last_move_won(), should_win);
}

// ---- errors -----------------------------------------------------------------

#[test]
fn initial_state_and_turn_errors() {
    let mut board = Board::new();
    assert!(board.move_history().is_empty());
    assert!(!board.last_move_won());
    assert_eq!(board.winner(), None);
    assert_eq!(board.next_player(), Player::Red);
    assert_eq!(board.last_player(), Player::Yellow);

    let err = board.play(Player::Yellow, 0).unwrap_err();
    assert_eq!(
        err,
        Error::IllegalMove(MoveError::OutOfTurn {
            expected: Player::Red
        })
    );
    assert_eq!(err.to_string(), "illegal move: it is red's turn");

    assert_eq!(board.play(Player::Red, 0).unwrap(), 0);
    assert_game_state(
        &board,
        Move {
            player: Player::Red,
            column: 0,
            row: 0,
        },
        false,
    );

    let err = board.play(Player::Red, 0).unwrap_err();
    assert_eq!(err.to_string(), "illegal move: it is yellow's turn");
}

#[test]
fn full_column_is_rejected() {
    let mut board = Board::new();
    let mut player = Player::FIRST;
    for row in 0..board.rows() {
        assert_eq!(board.play(player, 3).unwrap(), row);
        player = player.other();
    }
    let err = board.play(player, 3).unwrap_err();
    assert_eq!(err, Error::IllegalMove(MoveError::ColumnFull { column: 3 }));
    assert_eq!(board.column_heights()[3], board.rows());
    assert_eq!(board.move_history().len(), board.rows());
}

#[test]
fn column_out_of_range_is_rejected() {
    let mut board = Board::new();
    let err = board.play(Player::Red, 7).unwrap_err();
    assert_eq!(
        err,
        Error::IllegalMove(MoveError::InvalidColumn {
            column: 7,
            columns: 7
        })
    );
    assert!(board.move_history().is_empty());
}

// ---- win conditions ---------------------------------------------------------

#[test]
fn no_moves() {
    run_game(&[], false);
}

#[test]
fn one_move() {
    run_game(&[(0, 0)], false);
}

#[test]
fn horizontal_win() {
    run_game(
        &[(0, 0), (0, 1), (1, 0), (0, 2), (2, 0), (0, 3), (3, 0)],
        true,
    );
}

#[test]
fn vertical_win() {
    run_game(
        &[(0, 0), (0, 1), (1, 0), (0, 2), (2, 0), (0, 3), (4, 0), (0, 4)],
        true,
    );
}

#[test]
fn negative_diagonal_win() {
    #[rustfmt::skip]
    let moves = [
        (0, 0), (1, 0), (2, 0), (3, 0),
        (3, 1), (2, 1), (1, 1), (0, 1),
        (0, 2), (1, 2), (2, 2), (3, 2),
        (1, 3), (0, 3),
    ];
    run_game(&moves, true);
}

#[test]
fn positive_diagonal_win() {
    #[rustfmt::skip]
    let moves = [
        (0, 0), (1, 0), (2, 0), (3, 0),
        (3, 1), (2, 1), (1, 1), (0, 1),
        (0, 2), (1, 2), (2, 2), (3, 2),
        (3, 3),
    ];
    run_game(&moves, true);
}

#[test]
fn smaller_threshold_on_custom_board() {
    let config = BoardConfig {
        columns: 3,
        rows: 3,
        winning_threshold: 3,
    };
    let mut board = Board::with_config(config).unwrap();
    for column in [0, 0, 1, 1] {
        let player = board.next_player();
        board.play(player, column).unwrap();
        assert!(!board.last_move_won());
    }
    board.play(Player::Red, 2).unwrap();
    assert_eq!(board.winner(), Some(Player::Red));
    assert_eq!(board.cell(0, 2), Some(Player::Red));
    assert_eq!(board.cell(2, 2), None);
    assert_eq!(board.cell(9, 9), None);
}

// ---- config -----------------------------------------------------------------

#[test]
fn config_defaults_and_validation() {
    let config = BoardConfig::default();
    assert_eq!((config.columns, config.rows, config.winning_threshold), (7, 6, 4));
    assert!(config.validate().is_ok());

    for bad in [
        BoardConfig {
            columns: 0,
            ..config
        },
        BoardConfig { rows: 0, ..config },
        BoardConfig {
            winning_threshold: 0,
            ..config
        },
        BoardConfig {
            winning_threshold: 8,
            ..config
        },
    ] {
        assert!(matches!(Board::with_config(bad), Err(Error::Config(_))));
    }
}

#[test]
fn oversized_config_is_rejected_before_allocating() {
    let config = BoardConfig {
        columns: usize::MAX,
        rows: 2,
        winning_threshold: 4,
    };
    assert!(matches!(Board::with_config(config), Err(Error::Config(_))));

    let too_many_cells = BoardConfig {
        columns: 1 << 9,
        rows: 1 << 8,
        winning_threshold: 4,
    };
    assert!(too_many_cells.validate().is_err());

    let err = Board::from_json_value(&json!({"num_columns": i64::MAX}), Mode::Strict).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "{err}");
    let err = Board::from_json_value(&json!({"num_rows": u64::MAX}), Mode::Strict).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "{err}");
}

#[test]
fn config_deserializes_with_defaults() {
    let config: BoardConfig = serde_json::from_value(json!({"rows": 4})).unwrap();
    assert_eq!(
        config,
        BoardConfig {
            columns: 7,
            rows: 4,
            winning_threshold: 4
        }
    );
}

// ---- serialization ----------------------------------------------------------

#[test]
fn player_serde_uses_wire_names() {
    assert_eq!(serde_json::to_value(Player::Yellow).unwrap(), json!("yellow"));
    let player: Player = serde_json::from_value(json!("red")).unwrap();
    assert_eq!(player, Player::Red);
    assert!(serde_json::from_value::<Player>(json!("Red")).is_err());
}

fn sample_board() -> Board {
    let mut board = Board::new();
    for column in [3, 3, 4] {
        let player = board.next_player();
        board.play(player, column).unwrap();
    }
    board
}

#[test]
fn board_encodes_history_and_derived_state() {
    let encoded = sample_board().to_json();
    assert_eq!(encoded["num_columns"], json!(7));
    assert_eq!(encoded["num_rows"], json!(6));
    assert_eq!(encoded["winning_threshold"], json!(4));
    assert_eq!(
        encoded["move_history"],
        json!([
            {"player": "red", "column": 3, "row": 0},
            {"player": "yellow", "column": 3, "row": 1},
            {"player": "red", "column": 4, "row": 0},
        ])
    );
    assert_eq!(encoded["column_heights"], json!([0, 0, 0, 2, 1, 0, 0]));
    assert_eq!(
        encoded["game_state"][0],
        json!(["", "", "", "red", "red", "", ""])
    );
    assert_eq!(
        encoded["game_state"][1],
        json!(["", "", "", "yellow", "", "", ""])
    );
    let keys: Vec<_> = encoded.keys().cloned().collect();
    assert_eq!(
        keys,
        [
            "num_columns",
            "num_rows",
            "winning_threshold",
            "move_history",
            "column_heights",
            "game_state"
        ]
    );
}

#[test]
fn board_round_trips() {
    let board = sample_board();
    let ser = JsonSerializer::new().strict();
    let text = ser.to_string(&board).unwrap();
    let back: Board = ser.from_str(&text).unwrap();
    assert_eq!(back, board);
    assert_eq!(back.next_player(), Player::Yellow);

    let keep_all = board.to_json_with(&FieldFilter::KeepAll);
    assert_eq!(Board::from_json(&keep_all, Mode::Strict).unwrap(), board);
}

#[test]
fn empty_object_is_a_fresh_board() {
    let board = Board::from_json_value(&json!({}), Mode::Strict).unwrap();
    assert_eq!(board, Board::new());
}

#[test]
fn derived_fields_are_recomputed() {
    let raw = json!({
        "move_history": [{"player": "red", "column": 1, "row": 0}],
        "column_heights": [9, 9, 9, 9, 9, 9, 9],
        "game_state": []
    });
    let board = Board::from_json_value(&raw, Mode::Strict).unwrap();
    assert_eq!(board.column_heights(), &[0, 1, 0, 0, 0, 0, 0]);
    assert_eq!(board.cell(0, 1), Some(Player::Red));
}

#[test]
fn illegal_histories_are_rejected() {
    let out_of_turn = json!({"move_history": [{"player": "yellow", "column": 0, "row": 0}]});
    let err = Board::from_json_value(&out_of_turn, Mode::Strict).unwrap_err();
    assert!(matches!(
        err,
        Error::IllegalMove(MoveError::OutOfTurn { .. })
    ));

    let wrong_row = json!({"move_history": [{"player": "red", "column": 0, "row": 2}]});
    let err = Board::from_json_value(&wrong_row, Mode::Strict).unwrap_err();
    assert_eq!(
        err,
        Error::IllegalMove(MoveError::RowMismatch {
            column: 0,
            expected: 0,
            found: 2
        })
    );

    let bad_player = json!({"move_history": [{"player": "green", "column": 0, "row": 0}]});
    let err = Board::from_json_value(&bad_player, Mode::Strict).unwrap_err();
    assert!(matches!(err.root(), Error::InvalidValue { .. }), "{err}");
}

#[test]
fn custom_dimensions_survive_round_trip() {
    let config = BoardConfig {
        columns: 5,
        rows: 4,
        winning_threshold: 3,
    };
    let mut board = Board::with_config(config).unwrap();
    board.play(Player::Red, 4).unwrap();
    let back = Board::from_json(&board.to_json(), Mode::Strict).unwrap();
    assert_eq!(back.config(), &config);
    assert_eq!(back.cell(0, 4), Some(Player::Red));
}
