use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{EngineError, Result};

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All four directions, in the order legality is probed and search candidates are tried.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Position in [`Move::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Move::Up => 0,
            Move::Down => 1,
            Move::Left => 2,
            Move::Right => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Move::Up => "UP",
            Move::Down => "DOWN",
            Move::Left => "LEFT",
            Move::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A grid coordinate, `row` and `col` both in `0..4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self { Cell { row, col } }

    /// Row-major index in `0..16`, or `None` when outside the grid.
    #[inline]
    pub fn index(self) -> Option<usize> {
        if self.row < 4 && self.col < 4 { Some(self.row * 4 + self.col) } else { None }
    }

    #[inline]
    fn from_index(idx: usize) -> Self { Cell { row: idx / 4, col: idx % 4 } }
}

/// Largest tile a 4-bit cell can hold (2^15).
pub const MAX_TILE: u32 = 1 << MAX_EXPONENT;
const MAX_EXPONENT: u64 = 15;

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

struct Stores {
    shift_left: Box<[u64]>,
    shift_right: Box<[u64]>,
    shift_up: Box<[u64]>,
    shift_down: Box<[u64]>,
    score: Box<[Score]>,
}

type BoardRaw = u64;
type Line = u64;
type Tile = u64;
type Score = u64;

/// Packed 4x4 2048 board as 16 4-bit exponents in a `u64`.
///
/// Cell (0, 0) lives in the most significant nibble; an exponent of 0 is an
/// empty cell, an exponent `e` is a tile of value `2^e`. The type is `Copy`, so
/// every clone is an independent board with no shared storage.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self { Board(raw) }

    /// Consume this `Board`, returning the raw packed `u64`.
    #[inline]
    pub fn into_raw(self) -> BoardRaw { self.0 }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw { self.0 }

    /// Build a board from tile values (0 for empty).
    ///
    /// ```
    /// use auto_2048::engine::Board;
    /// let b = Board::from_grid(&[[2, 2, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]).unwrap();
    /// assert_eq!(b.max_tile(), 4);
    /// assert_eq!(b.count_empty(), 13);
    /// ```
    pub fn from_grid(grid: &[[u32; 4]; 4]) -> Result<Self> {
        let mut raw = 0;
        for (row, line) in grid.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                let exp = if value == 0 {
                    0
                } else {
                    exponent_of(value).ok_or(EngineError::InvalidTileValue(value))?
                };
                raw |= exp << nibble_shift(row * 4 + col);
            }
        }
        Ok(Board(raw))
    }

    /// Tile values (0 for empty) as a row-major 4x4 grid.
    pub fn to_grid(self) -> [[u32; 4]; 4] {
        let mut grid = [[0; 4]; 4];
        for (idx, value) in (0..16).map(|idx| (idx, tile_val(self, idx))) {
            grid[idx / 4][idx % 4] = value;
        }
        grid
    }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    ///
    /// ```
    /// use auto_2048::engine::{Board, Move};
    /// let b = Board::from_grid(&[[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// assert_eq!(b.shift(Move::Left).to_grid()[0], [4, 4, 0, 0]);
    /// ```
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        match dir {
            Move::Left | Move::Right => shift_rows(self, dir),
            Move::Up | Move::Down => shift_cols(self, dir),
        }
    }

    /// Slide/merge in place. Returns whether any cell changed; an illegal move
    /// leaves the board untouched.
    #[inline]
    pub fn apply_move(&mut self, dir: Move) -> bool {
        let moved = self.shift(dir);
        let changed = moved != *self;
        *self = moved;
        changed
    }

    /// True if moving in `dir` would change the board.
    #[inline]
    pub fn is_legal(self, dir: Move) -> bool { self.shift(dir) != self }

    /// Directions that change the board, in `Move::ALL` order. Never mutates.
    pub fn available_moves(self) -> Vec<Move> {
        Move::ALL.into_iter().filter(|&dir| self.is_legal(dir)).collect()
    }

    /// Every empty cell, row-major.
    pub fn available_cells(self) -> Vec<Cell> {
        (0..16).filter(|&idx| get_tile(self, idx) == 0).map(Cell::from_index).collect()
    }

    /// Place a tile of `value` into an empty cell.
    ///
    /// ```
    /// use auto_2048::engine::{Board, Cell};
    /// let mut b = Board::EMPTY;
    /// b.insert_tile(Cell::new(1, 2), 4).unwrap();
    /// assert_eq!(b.tile_value(1, 2), 4);
    /// assert!(b.insert_tile(Cell::new(1, 2), 2).is_err());
    /// ```
    pub fn insert_tile(&mut self, cell: Cell, value: u32) -> Result<()> {
        let idx = cell.index().ok_or(EngineError::InvalidCell(cell))?;
        if get_tile(*self, idx) != 0 {
            return Err(EngineError::InvalidCell(cell));
        }
        let exp = exponent_of(value).ok_or(EngineError::InvalidTileValue(value))?;
        self.0 |= exp << nibble_shift(idx);
        Ok(())
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a uniformly chosen empty cell.
    ///
    /// Returns the cell filled, or `None` when the board is full.
    ///
    /// ```
    /// use auto_2048::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let mut b = Board::EMPTY;
    /// assert!(b.insert_random_tile(&mut rng).is_some());
    /// assert_eq!(b.count_empty(), 15);
    /// ```
    pub fn insert_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Cell> {
        let cells = self.available_cells();
        if cells.is_empty() {
            return None;
        }
        let cell = cells[rng.gen_range(0..cells.len())];
        let tile = generate_random_tile(rng);
        self.0 |= tile << nibble_shift(cell.index()?);
        Some(cell)
    }

    /// Builder form of [`Self::insert_random_tile`]; a full board is returned unchanged.
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.insert_random_tile(rng);
        self
    }

    /// Total merge score implied by the tiles on the board.
    #[inline]
    pub fn score(self) -> Score { get_score(self) }

    /// Return true if no legal moves remain.
    ///
    /// ```
    /// use auto_2048::engine::Board;
    /// // Nothing slides on an empty board.
    /// assert!(Board::EMPTY.is_game_over());
    /// ```
    #[inline]
    pub fn is_game_over(self) -> bool { Move::ALL.into_iter().all(|dir| !self.is_legal(dir)) }

    /// The highest tile value present, or 0 for an empty board.
    #[inline]
    pub fn max_tile(self) -> u32 {
        let max_exp = (0..16).map(|idx| get_tile(self, idx)).max().unwrap_or(0);
        if max_exp == 0 { 0 } else { 1 << max_exp }
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> usize { 16 - count_non_empty(self) }

    /// Tile value at (`row`, `col`), 0 if empty.
    #[inline]
    pub fn tile_value(self, row: usize, col: usize) -> u32 { tile_val(self, row * 4 + col) }

    /// Set the exponent at row-major `idx`, assuming that cell is empty.
    #[inline]
    pub(crate) fn with_exponent(self, idx: usize, exp: u64) -> Board { Board(self.0 | (exp << nibble_shift(idx))) }

    /// Exponent at row-major index `idx` (0 if empty).
    #[inline]
    pub(crate) fn exponent(self, idx: usize) -> u8 { get_tile(self, idx) as u8 }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<_> = (0..16).map(|idx| format_val(tile_val(*self, idx))).collect();
        for (row, chunk) in cells.chunks(4).enumerate() {
            if row > 0 {
                writeln!(f, "-------------------------------")?;
            }
            writeln!(f, "{}|{}|{}|{}", chunk[0], chunk[1], chunk[2], chunk[3])?;
        }
        Ok(())
    }
}

impl From<BoardRaw> for Board { fn from(v: BoardRaw) -> Self { Board::from_raw(v) } }
impl From<Board> for BoardRaw { fn from(b: Board) -> Self { b.into_raw() } }

/// Build the lookup tables eagerly. Safe to call multiple times; otherwise
/// they are built on first use.
pub fn new() {
    stores();
}

fn get_score(board: Board) -> Score {
    let score_table = &stores().score;
    (0..4).fold(0, |acc, idx| {
        let row_val = extract_line(board.0, idx) as u16;
        acc + get_line_entry(score_table, row_val)
    })
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

pub(crate) fn extract_line(board: BoardRaw, line_idx: u64) -> Line {
    (board >> ((3 - line_idx) * 16)) & 0xffff
}

/// Split a 16-bit line into its four exponents, leading cell first.
pub(crate) fn line_to_vec(line: Line) -> Vec<Tile> {
    (0..4).fold(Vec::new(), |mut tiles, tile_idx| {
        tiles.push(line >> ((3 - tile_idx) * 4) & 0xf);
        tiles
    })
}

static STORES: OnceLock<Stores> = OnceLock::new();

fn create_stores() -> Stores {
    // Allocate on the heap to avoid large stack frames
    let mut shift_left = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_right = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_up = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_down = vec![0u64; LINE_TABLE_SIZE];
    let mut score = vec![0u64; LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let line = val as u64;
        shift_left[val] = shift_line(line, Move::Left);
        shift_right[val] = shift_line(line, Move::Right);
        shift_up[val] = shift_line(line, Move::Up);
        shift_down[val] = shift_line(line, Move::Down);
        score[val] = calc_score(line);
    }

    Stores {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
        shift_up: shift_up.into_boxed_slice(),
        shift_down: shift_down.into_boxed_slice(),
        score: score.into_boxed_slice(),
    }
}

#[inline(always)]
fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

#[inline(always)]
fn get_line_entry(table: &[u64], idx: u16) -> u64 {
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    unsafe { *table.get_unchecked(idx as usize) }
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile { if rng.gen_range(0..10) < 9 { 1 } else { 2 } }

fn shift_rows(board: Board, move_dir: Move) -> Board {
    let s = stores();
    let table: &[u64] = match move_dir {
        Move::Right => &s.shift_right,
        _ => &s.shift_left,
    };
    let res = (0..4).fold(0, |new_board, row_idx| {
        let row_val = extract_line(board.0, row_idx) as u16;
        let new_row_val = get_line_entry(table, row_val);
        new_board | (new_row_val << (48 - (16 * row_idx)))
    });
    Board(res)
}

fn shift_cols(board: Board, move_dir: Move) -> Board {
    let transpose_board = transpose(board.0);
    let s = stores();
    let table: &[u64] = match move_dir {
        Move::Down => &s.shift_down,
        _ => &s.shift_up,
    };
    let res = (0..4).fold(0, |new_board, col_idx| {
        let col_val = extract_line(transpose_board, col_idx) as u16;
        let new_col_val = get_line_entry(table, col_val);
        new_board | (new_col_val << (12 - (4 * col_idx)))
    });
    Board(res)
}

fn shift_line(line: Line, direction: Move) -> Line {
    let tiles = line_to_vec(line);
    match direction {
        Move::Left | Move::Right => vec_to_row(shift_vec(tiles, direction)),
        Move::Up | Move::Down => vec_to_col(shift_vec(tiles, direction)),
    }
}

fn vec_to_row(tiles: Vec<Tile>) -> Line {
    tiles[0] << 12 | tiles[1] << 8 | tiles[2] << 4 | tiles[3]
}

fn vec_to_col(tiles: Vec<Tile>) -> Line {
    tiles[0] << 48 | tiles[1] << 32 | tiles[2] << 16 | tiles[3]
}

fn shift_vec(vec: Vec<Tile>, direction: Move) -> Vec<Tile> {
    match direction {
        Move::Left | Move::Up => shift_vec_left(vec),
        Move::Right | Move::Down => shift_vec_right(vec),
    }
}

fn shift_vec_right(vec: Vec<Tile>) -> Vec<Tile> {
    let rev_vec: Vec<Tile> = vec.into_iter().rev().collect();
    shift_vec_left(rev_vec).iter().rev().copied().collect()
}

// Each slot takes the next tile and at most one merge, so a merged tile never
// merges again in the same move: [1, 1, 1, 1] -> [2, 2, 0, 0].
fn shift_vec_left(mut vec: Vec<Tile>) -> Vec<Tile> {
    for i in 0..4 {
        calculate_left_shift(&mut vec[i..]);
    }
    vec
}

fn calculate_left_shift(slice: &mut [Tile]) {
    let mut acc = 0;
    for idx in 0..slice.len() {
        let val = slice[idx];
        if val == 0 {
            continue;
        }
        if acc == 0 {
            slice[idx] = 0;
            acc = val;
        } else {
            if acc == val && acc < MAX_EXPONENT {
                slice[idx] = 0;
                acc += 1;
            }
            break;
        }
    }
    slice[0] = acc;
}

// Credit to Nneonneo
fn calc_score(line: Line) -> Score {
    let mut score = 0;
    let tiles = line_to_vec(line);
    for &tile_val in tiles.iter().take(4) {
        if tile_val >= 2 {
            // the score is the total sum of the tile and all intermediate merged tiles
            score += (tile_val - 1) * (1 << tile_val);
        }
    }
    score
}

fn count_non_empty(board: Board) -> usize {
    let mut board_copy = board.0;
    board_copy |= board_copy >> 1;
    board_copy |= board_copy >> 2;
    board_copy &= 0x1111111111111111;
    board_copy.count_ones() as usize
}

#[inline]
fn nibble_shift(idx: usize) -> u64 { 60 - (4 * idx as u64) }

fn get_tile(board: Board, idx: usize) -> Tile {
    (board.0 >> nibble_shift(idx)) & 0xf
}

fn tile_val(board: Board, idx: usize) -> u32 {
    match get_tile(board, idx) {
        0 => 0,
        exp => 1 << exp,
    }
}

fn exponent_of(value: u32) -> Option<u64> {
    if (2..=MAX_TILE).contains(&value) && value.is_power_of_two() {
        Some(value.trailing_zeros() as u64)
    } else {
        None
    }
}

fn format_val(val: u32) -> String {
    match val {
        0 => String::from("       "),
        x => format!("{:^7}", x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn row(values: [u32; 4]) -> Board {
        Board::from_grid(&[values, [0; 4], [0; 4], [0; 4]]).unwrap()
    }

    #[test]
    fn it_shift_vec_left() {
        assert_eq!(shift_vec_left(vec![0, 0, 0, 0]), vec![0, 0, 0, 0]);
        assert_eq!(shift_vec_left(vec![1, 2, 1, 2]), vec![1, 2, 1, 2]);
        assert_eq!(shift_vec_left(vec![1, 1, 2, 2]), vec![2, 3, 0, 0]);
        assert_eq!(shift_vec_left(vec![1, 0, 0, 1]), vec![2, 0, 0, 0]);
        assert_eq!(shift_vec_left(vec![1, 1, 1, 1]), vec![2, 2, 0, 0]);
        assert_eq!(shift_vec_left(vec![1, 0, 1, 1]), vec![2, 1, 0, 0]);
    }

    #[test]
    fn it_shift_vec_right() {
        assert_eq!(shift_vec_right(vec![0, 0, 0, 0]), vec![0, 0, 0, 0]);
        assert_eq!(shift_vec_right(vec![1, 2, 1, 2]), vec![1, 2, 1, 2]);
        assert_eq!(shift_vec_right(vec![1, 1, 2, 2]), vec![0, 0, 2, 3]);
        assert_eq!(shift_vec_right(vec![5, 0, 0, 5]), vec![0, 0, 0, 6]);
        assert_eq!(shift_vec_right(vec![0, 2, 2, 2]), vec![0, 0, 2, 3]);
    }

    #[test]
    fn max_tiles_do_not_merge() {
        assert_eq!(shift_vec_left(vec![15, 15, 0, 0]), vec![15, 15, 0, 0]);
        assert_eq!(shift_vec_left(vec![0, 15, 0, 15]), vec![15, 15, 0, 0]);
        assert_eq!(shift_vec_left(vec![14, 14, 15, 0]), vec![15, 15, 0, 0]);
    }

    #[test]
    fn it_insert_random_tile_fills_board() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = Board::EMPTY;
        for _ in 0..16 {
            assert!(game.insert_random_tile(&mut rng).is_some());
        }
        assert_eq!(game.count_empty(), 0);
        assert_eq!(game.insert_random_tile(&mut rng), None);
        for row in game.to_grid() {
            assert!(row.iter().all(|&v| v == 2 || v == 4));
        }
    }

    #[test]
    fn test_shift_left() {
        assert_eq!(Board::from_raw(0x0000).shift(Move::Left), Board::from_raw(0x0000));
        assert_eq!(Board::from_raw(0x0002).shift(Move::Left), Board::from_raw(0x2000));
        assert_eq!(Board::from_raw(0x2020).shift(Move::Left), Board::from_raw(0x3000));
        assert_eq!(Board::from_raw(0x1332).shift(Move::Left), Board::from_raw(0x1420));
        assert_eq!(Board::from_raw(0x1234).shift(Move::Left), Board::from_raw(0x1234));
        assert_eq!(Board::from_raw(0x1002).shift(Move::Left), Board::from_raw(0x1200));
        assert_ne!(Board::from_raw(0x1210).shift(Move::Left), Board::from_raw(0x2200));
    }

    #[test]
    fn test_shift_right() {
        assert_eq!(Board::from_raw(0x0000).shift(Move::Right), Board::from_raw(0x0000));
        assert_eq!(Board::from_raw(0x2000).shift(Move::Right), Board::from_raw(0x0002));
        assert_eq!(Board::from_raw(0x2020).shift(Move::Right), Board::from_raw(0x0003));
        assert_eq!(Board::from_raw(0x1332).shift(Move::Right), Board::from_raw(0x0142));
        assert_eq!(Board::from_raw(0x1234).shift(Move::Right), Board::from_raw(0x1234));
        assert_eq!(Board::from_raw(0x1002).shift(Move::Right), Board::from_raw(0x0012));
        assert_ne!(Board::from_raw(0x0121).shift(Move::Right), Board::from_raw(0x0022));
    }

    #[test]
    fn test_move_left() {
        let game = Board::from_raw(0x1234133220021002);
        assert_eq!(game.shift(Move::Left), Board::from_raw(0x1234142030001200));
    }

    #[test]
    fn test_move_up() {
        let game = Board::from_raw(0x1121230033004222);
        assert_eq!(game.shift(Move::Up), Board::from_raw(0x1131240232004000));
    }

    #[test]
    fn test_move_right() {
        let game = Board::from_raw(0x1234133220021002);
        assert_eq!(game.shift(Move::Right), Board::from_raw(0x1234014200030012));
    }

    #[test]
    fn test_move_down() {
        let game = Board::from_raw(0x1121230033004222);
        assert_eq!(game.shift(Move::Down), Board::from_raw(0x1000210034014232));
    }

    #[test]
    fn pairwise_merge_is_not_cascading() {
        let mut b = row([2, 2, 2, 2]);
        assert!(b.apply_move(Move::Left));
        assert_eq!(b.to_grid()[0], [4, 4, 0, 0]);

        let mut b = row([2, 0, 2, 2]);
        assert!(b.apply_move(Move::Left));
        assert_eq!(b.to_grid()[0], [4, 2, 0, 0]);

        let mut b = row([2, 2, 2, 2]);
        assert!(b.apply_move(Move::Right));
        assert_eq!(b.to_grid()[0], [0, 0, 4, 4]);
    }

    #[test]
    fn columns_merge_pairwise_toward_edge() {
        let grid = [[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0], [4, 0, 0, 0]];
        let b = Board::from_grid(&grid).unwrap();
        let up = b.shift(Move::Up).to_grid();
        assert_eq!([up[0][0], up[1][0], up[2][0], up[3][0]], [4, 8, 0, 0]);
        let down = b.shift(Move::Down).to_grid();
        assert_eq!([down[0][0], down[1][0], down[2][0], down[3][0]], [0, 0, 4, 8]);
    }

    #[test]
    fn second_no_op_move_returns_false() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut b = Board::EMPTY;
        for _ in 0..6 {
            b.insert_random_tile(&mut rng);
        }
        for dir in Move::ALL {
            let mut probe = b;
            probe.apply_move(dir);
            let settled = probe;
            assert!(!probe.apply_move(dir));
            assert_eq!(probe, settled);
        }
    }

    #[test]
    fn clone_is_independent() {
        let original = row([2, 2, 0, 4]);
        let mut copy = original.clone();
        copy.apply_move(Move::Left);
        copy.insert_tile(Cell::new(3, 3), 2).unwrap();
        assert_eq!(original.to_grid()[0], [2, 2, 0, 4]);
        assert_eq!(original.count_empty(), 13);
    }

    #[test]
    fn full_board_without_pairs_has_no_moves() {
        let grid = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
        let b = Board::from_grid(&grid).unwrap();
        assert!(b.available_moves().is_empty());
        assert!(b.is_game_over());
        assert!(b.available_cells().is_empty());
    }

    #[test]
    fn available_moves_do_not_mutate() {
        let b = row([0, 2, 0, 0]);
        let moves = b.available_moves();
        assert_eq!(moves, vec![Move::Down, Move::Left, Move::Right]);
        assert_eq!(b, row([0, 2, 0, 0]));
    }

    #[test]
    fn insert_then_cell_is_not_available() {
        let mut b = Board::EMPTY;
        assert_eq!(b.available_cells().len(), 16);
        assert_eq!(b.available_cells()[5], Cell::new(1, 1));
        b.insert_tile(Cell::new(1, 1), 2).unwrap();
        let cells = b.available_cells();
        assert_eq!(cells.len(), 15);
        assert!(!cells.contains(&Cell::new(1, 1)));
    }

    #[test]
    fn insert_rejects_bad_cells_and_values() {
        let mut b = row([2, 0, 0, 0]);
        assert!(matches!(b.insert_tile(Cell::new(0, 0), 2), Err(EngineError::InvalidCell(_))));
        assert!(matches!(b.insert_tile(Cell::new(4, 0), 2), Err(EngineError::InvalidCell(_))));
        assert!(matches!(b.insert_tile(Cell::new(0, 1), 3), Err(EngineError::InvalidTileValue(3))));
        assert!(matches!(b.insert_tile(Cell::new(0, 1), 1), Err(EngineError::InvalidTileValue(1))));
        assert_eq!(b, row([2, 0, 0, 0]));
    }

    #[test]
    fn max_tile_and_empty_count() {
        assert_eq!(Board::EMPTY.max_tile(), 0);
        let b = row([2, 512, 0, 8]);
        assert_eq!(b.max_tile(), 512);
        assert_eq!(b.count_empty(), 13);
    }

    #[test]
    fn it_count_empty() {
        let game = Board::from_raw(0x1111000011110000);
        assert_eq!(game.count_empty(), 8);
        let game = Board::from_raw(0x1100000000000000);
        assert_eq!(game.count_empty(), 14);
    }

    #[test]
    fn it_get_tile_val() {
        let game = Board::from_raw(0x0123456789abcdef);
        assert_eq!(game.tile_value(0, 3), 8);
        assert_eq!(game.tile_value(2, 2), 1024);
        assert_eq!(game.tile_value(3, 3), 32768);
        assert_eq!(game.tile_value(0, 0), 0);
    }

    #[test]
    fn grid_round_trips_through_packing() {
        let grid = [[0, 2, 4, 8], [16, 32, 64, 128], [256, 512, 1024, 2048], [4096, 8192, 16384, 32768]];
        assert_eq!(Board::from_grid(&grid).unwrap().to_grid(), grid);
        assert!(Board::from_grid(&[[6, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    }

    #[test]
    fn score_counts_merged_value() {
        assert_eq!(row([4, 0, 0, 0]).score(), 4);
        assert_eq!(row([8, 2, 0, 0]).score(), 16);
    }
}
