//! Connect-Four board: turn enforcement and win detection.
//!
//! The board is itself a record. Its wire form carries the configuration, the
//! move history and two derived views (column heights and the cell grid);
//! decoding replays the history, so a stored game can only come back in a
//! state reachable by legal play.

use crate::error::{Error, MoveError, Result};
use crate::record::{Record, Serializable};
use crate::schema::{FieldDecl, Schema};
use crate::types::{DeclaredType, Describe};
use crate::value::{Fields, FromValue, ToValue, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

/// One of the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    /// Moves first.
    Red,
    /// Moves second.
    Yellow,
}

impl Player {
    /// The player who opens every game.
    pub const FIRST: Player = Player::Red;

    /// The opponent.
    pub fn other(self) -> Player {
        match self {
            Player::Red => Player::Yellow,
            Player::Yellow => Player::Red,
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Player::Red => "red",
            Player::Yellow => "yellow",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Player {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "red" => Ok(Player::Red),
            "yellow" => Ok(Player::Yellow),
            other => Err(Error::InvalidValue {
                expected: "player (`red` or `yellow`)".into(),
                found: format!("str {other:?}"),
            }),
        }
    }
}

impl Describe for Player {
    fn declared_type() -> DeclaredType {
        String::declared_type()
    }
}

impl ToValue for Player {
    fn to_value(&self) -> Value {
        Value::Str(self.as_str().to_string())
    }
}

impl FromValue for Player {
    fn from_value(value: Value) -> Result<Self> {
        String::from_value(value)?.parse()
    }
}

crate::record! {
    /// A token dropped into `column`, landing on `row`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Move {
        /// Who played.
        pub player: Player,
        /// Column index, from the left.
        pub column: usize,
        /// Row index, from the bottom.
        pub row: usize,
    }
}

impl Serializable for Move {}
impl crate::record::Replaceable for Move {}

/// Board dimensions and win length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of columns.
    pub columns: usize,
    /// Number of rows (column capacity).
    pub rows: usize,
    /// Tokens in a line needed to win.
    pub winning_threshold: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: 7,
            rows: 6,
            winning_threshold: 4,
        }
    }
}

impl BoardConfig {
    /// Largest board, in cells, that [`validate`](Self::validate) accepts.
    pub const MAX_CELLS: usize = 1 << 16;

    /// Check the dimensions describe a playable board.
    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 {
            return Err(Error::Config("board needs at least one column".into()));
        }
        if self.rows == 0 {
            return Err(Error::Config("board needs at least one row".into()));
        }
        match self.columns.checked_mul(self.rows) {
            Some(cells) if cells <= Self::MAX_CELLS => {}
            _ => {
                return Err(Error::Config(format!(
                    "board of {}x{} exceeds {} cells",
                    self.columns,
                    self.rows,
                    Self::MAX_CELLS
                )))
            }
        }
        let longest = self.columns.max(self.rows);
        if self.winning_threshold == 0 || self.winning_threshold > longest {
            return Err(Error::Config(format!(
                "winning_threshold must be between 1 and {longest}, got {}",
                self.winning_threshold
            )));
        }
        Ok(())
    }
}

/// A game in progress (or finished: a board whose last move won).
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    config: BoardConfig,
    moves: Vec<Move>,
    heights: Vec<usize>,
    // grid[row][column], row 0 at the bottom
    grid: Vec<Vec<Option<Player>>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty 7x6 board, four in a row wins.
    pub fn new() -> Self {
        Self::empty(BoardConfig::default())
    }

    /// Empty board with custom dimensions.
    pub fn with_config(config: BoardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::empty(config))
    }

    fn empty(config: BoardConfig) -> Self {
        Self {
            config,
            moves: Vec::new(),
            heights: vec![0; config.columns],
            grid: vec![vec![None; config.columns]; config.rows],
        }
    }

    /// Drop `player`'s token into `column` and return the row it lands on.
    pub fn play(&mut self, player: Player, column: usize) -> Result<usize> {
        let expected = self.next_player();
        if player != expected {
            debug!(%player, %expected, "rejected out-of-turn move");
            return Err(MoveError::OutOfTurn { expected }.into());
        }
        let Some(&row) = self.heights.get(column) else {
            return Err(MoveError::InvalidColumn {
                column,
                columns: self.config.columns,
            }
            .into());
        };
        if row >= self.config.rows {
            debug!(%player, column, "rejected move into full column");
            return Err(MoveError::ColumnFull { column }.into());
        }

        self.moves.push(Move {
            player,
            column,
            row,
        });
        self.grid[row][column] = Some(player);
        self.heights[column] += 1;
        debug!(%player, column, row, "played move");

        if self.last_move_won() {
            debug!(%player, moves = self.moves.len(), "game won");
        }
        Ok(row)
    }

    /// `true` if the most recent move completed a line of
    /// `winning_threshold` tokens.
    pub fn last_move_won(&self) -> bool {
        let Some(last) = self.moves.last() else {
            return false;
        };
        let threshold = self.config.winning_threshold;
        let run = |d_row: isize, d_col: isize| self.run_length(last, d_row, d_col);

        // Nothing sits above the newest token, so vertical only looks down.
        run(-1, 0) >= threshold
            || run(0, -1) + run(0, 1) - 1 >= threshold
            || run(-1, -1) + run(1, 1) - 1 >= threshold
            || run(1, -1) + run(-1, 1) - 1 >= threshold
    }

    fn run_length(&self, from: &Move, d_row: isize, d_col: isize) -> usize {
        let (mut row, mut col) = (from.row as isize, from.column as isize);
        let mut count = 0;
        while self.occupant(row, col) == Some(from.player) {
            count += 1;
            row += d_row;
            col += d_col;
        }
        count
    }

    fn occupant(&self, row: isize, col: isize) -> Option<Player> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        self.cell(row, col)
    }

    /// The player whose last move won, if it did.
    pub fn winner(&self) -> Option<Player> {
        if self.last_move_won() {
            self.moves.last().map(|m| m.player)
        } else {
            None
        }
    }

    /// Who is due to move.
    pub fn next_player(&self) -> Player {
        self.last_player().other()
    }

    /// Who moved last. Before the first move this is the second player.
    pub fn last_player(&self) -> Player {
        match self.moves.last() {
            Some(m) => m.player,
            None => Player::FIRST.other(),
        }
    }

    /// Moves in the order they were played.
    pub fn move_history(&self) -> &[Move] {
        &self.moves
    }

    /// Tokens currently in each column.
    pub fn column_heights(&self) -> &[usize] {
        &self.heights
    }

    /// Occupant of a cell; `None` for empty or out-of-range cells.
    pub fn cell(&self, row: usize, column: usize) -> Option<Player> {
        self.grid.get(row)?.get(column).copied().flatten()
    }

    /// Cell grid as player names, `""` for empty cells.
    pub fn game_state(&self) -> Vec<Vec<String>> {
        self.grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map(Player::as_str).unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }

    /// Board configuration.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.config.columns
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.config.rows
    }

    /// Tokens in a line needed to win.
    pub fn winning_threshold(&self) -> usize {
        self.config.winning_threshold
    }
}

impl Record for Board {
    const TYPE_NAME: &'static str = concat!(module_path!(), "::Board");

    fn declared_fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::defaulted("num_columns", usize::declared_type()),
            FieldDecl::defaulted("num_rows", usize::declared_type()),
            FieldDecl::defaulted("winning_threshold", usize::declared_type()),
            FieldDecl::defaulted("move_history", Vec::<Move>::declared_type()),
            FieldDecl::defaulted("column_heights", Vec::<usize>::declared_type()),
            FieldDecl::defaulted("game_state", Vec::<Vec<String>>::declared_type()),
        ]
    }

    fn schema() -> Result<&'static Schema> {
        static SCHEMA: OnceLock<Result<Schema>> = OnceLock::new();
        Schema::cached(&SCHEMA, Self::TYPE_NAME, Self::declared_fields)
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new(Self::TYPE_NAME);
        fields.insert("num_columns", self.config.columns.to_value());
        fields.insert("num_rows", self.config.rows.to_value());
        fields.insert("winning_threshold", self.config.winning_threshold.to_value());
        fields.insert("move_history", self.moves.to_value());
        fields.insert("column_heights", self.heights.to_value());
        fields.insert("game_state", self.game_state().to_value());
        fields
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        let defaults = BoardConfig::default();
        let config = BoardConfig {
            columns: fields.take_or_else("num_columns", || defaults.columns)?,
            rows: fields.take_or_else("num_rows", || defaults.rows)?,
            winning_threshold: fields
                .take_or_else("winning_threshold", || defaults.winning_threshold)?,
        };
        let history: Vec<Move> = fields.take_or_else("move_history", Vec::new)?;
        // Derived views are checked for shape, then rebuilt by the replay.
        let _: Vec<usize> = fields.take_or_else("column_heights", Vec::new)?;
        let _: Vec<Vec<String>> = fields.take_or_else("game_state", Vec::new)?;

        let mut board = Board::with_config(config)?;
        for recorded in history {
            let row = board.play(recorded.player, recorded.column)?;
            if row != recorded.row {
                return Err(MoveError::RowMismatch {
                    column: recorded.column,
                    expected: row,
                    found: recorded.row,
                }
                .into());
            }
        }
        Ok(board)
    }
}

crate::record_glue!(Board);

impl Serializable for Board {}
