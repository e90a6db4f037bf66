//! Per-game and aggregate batch logs.
//!
//! The text layout is line oriented: each game is a `-----` block of
//! `Label: value` lines, and the summary file averages every measure.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::game::GameRecord;

/// Averages over a batch of games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub games: usize,
    /// Most frequent final max tile; ties go to the one seen first.
    pub most_common_max_tile: u32,
    pub max_tile_counts: BTreeMap<u32, usize>,
    pub avg_total_moves: f64,
    pub avg_states_visited: f64,
    pub avg_total_time: f64,
    pub avg_move_time: f64,
    pub avg_fastest_move: f64,
    pub avg_longest_move: f64,
    /// Mean seconds to reach each tile, over the games that reached it.
    pub avg_time_to_reach: Vec<(u32, f64)>,
}

impl BatchSummary {
    /// `None` for an empty batch.
    pub fn from_records(records: &[GameRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let n = records.len() as f64;
        let mean = |f: fn(&GameRecord) -> f64| records.iter().map(f).sum::<f64>() / n;

        let mut first_seen: Vec<(u32, usize)> = Vec::new();
        for r in records {
            match first_seen.iter_mut().find(|(tile, _)| *tile == r.max_tile) {
                Some((_, count)) => *count += 1,
                None => first_seen.push((r.max_tile, 1)),
            }
        }
        let mut most_common = first_seen[0];
        for &(tile, count) in &first_seen[1..] {
            if count > most_common.1 {
                most_common = (tile, count);
            }
        }

        let mut reach: BTreeMap<u32, (usize, f64)> = BTreeMap::new();
        for &(tile, secs) in records.iter().flat_map(|r| r.time_to_reach.iter()) {
            let slot = reach.entry(tile).or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 += secs;
        }

        Some(BatchSummary {
            games: records.len(),
            most_common_max_tile: most_common.0,
            max_tile_counts: first_seen.into_iter().collect(),
            avg_total_moves: mean(|r| r.total_moves as f64),
            avg_states_visited: mean(|r| r.states_visited as f64),
            avg_total_time: mean(|r| r.total_time),
            avg_move_time: mean(|r| r.avg_move_time),
            avg_fastest_move: mean(|r| r.fastest_move),
            avg_longest_move: mean(|r| r.longest_move),
            avg_time_to_reach: reach.into_iter().map(|(tile, (num, total))| (tile, total / num as f64)).collect(),
        })
    }
}

pub fn write_game_log<W: Write>(w: &mut W, record: &GameRecord) -> io::Result<()> {
    writeln!(w, "-----")?;
    writeln!(w, "Max Tile: {}", record.max_tile)?;
    writeln!(w, "Total Moves: {}", record.total_moves)?;
    writeln!(w, "Total States Visited: {}", record.states_visited)?;
    writeln!(w, "Total Time: {:.6}", record.total_time)?;
    writeln!(w, "Average Time / Move: {:.6}", record.avg_move_time)?;
    writeln!(w, "Fastest Move: {:.6}", record.fastest_move)?;
    writeln!(w, "Longest Move: {:.6}", record.longest_move)?;
    writeln!(w, "Time To Get Tiles:")?;
    for (tile, secs) in &record.time_to_reach {
        writeln!(w, "{}: {:.6}", tile, secs)?;
    }
    Ok(())
}

pub fn write_summary<W: Write>(w: &mut W, summary: &BatchSummary) -> io::Result<()> {
    writeln!(w, "Average Max Tile: {}", summary.most_common_max_tile)?;
    writeln!(w, "Average Total Moves: {:.6}", summary.avg_total_moves)?;
    writeln!(w, "Average Total States Visited: {:.6}", summary.avg_states_visited)?;
    writeln!(w, "Average Total Time: {:.6}", summary.avg_total_time)?;
    writeln!(w, "Average Time / Move: {:.6}", summary.avg_move_time)?;
    writeln!(w, "Average Fastest Move: {:.6}", summary.avg_fastest_move)?;
    writeln!(w, "Average Longest Move: {:.6}", summary.avg_longest_move)?;
    writeln!(w, "Average Time To Get Tiles:")?;
    for (tile, secs) in &summary.avg_time_to_reach {
        writeln!(w, "{}: {:.6}", tile, secs)?;
    }
    Ok(())
}

/// Append one game block to `path`, creating the file if needed.
pub fn append_game_log<P: AsRef<Path>>(path: P, record: &GameRecord) -> Result<()> {
    let f = OpenOptions::new().create(true).append(true).open(path)?;
    let mut w = BufWriter::new(f);
    write_game_log(&mut w, record)?;
    w.flush()?;
    Ok(())
}

/// Create or truncate `path` and write the summary.
pub fn write_summary_file<P: AsRef<Path>>(path: P, summary: &BatchSummary) -> Result<()> {
    let mut w = BufWriter::new(fs::File::create(path)?);
    write_summary(&mut w, summary)?;
    w.flush()?;
    Ok(())
}

pub fn write_summary_json<P: AsRef<Path>>(path: P, summary: &BatchSummary) -> Result<()> {
    let w = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(w, summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(max_tile: u32, moves: u64, reach: &[(u32, f64)]) -> GameRecord {
        GameRecord {
            max_tile,
            score: 0,
            total_moves: moves,
            states_visited: moves * 10,
            total_time: moves as f64 * 0.5,
            avg_move_time: 0.5,
            fastest_move: 0.25,
            longest_move: 1.0,
            time_to_reach: reach.to_vec(),
        }
    }

    #[test]
    fn summary_of_empty_batch_is_none() {
        assert!(BatchSummary::from_records(&[]).is_none());
    }

    #[test]
    fn summary_averages_and_mode() {
        let records = [
            record(256, 100, &[(8, 1.0), (16, 2.0)]),
            record(512, 200, &[(8, 3.0)]),
            record(256, 300, &[]),
        ];
        let s = BatchSummary::from_records(&records).unwrap();
        assert_eq!(s.games, 3);
        assert_eq!(s.most_common_max_tile, 256);
        assert_eq!(s.max_tile_counts.get(&256), Some(&2));
        assert_eq!(s.avg_total_moves, 200.0);
        assert_eq!(s.avg_states_visited, 2000.0);
        assert_eq!(s.avg_time_to_reach, vec![(8, 2.0), (16, 2.0)]);
    }

    #[test]
    fn mode_ties_go_to_first_seen() {
        let records = [record(1024, 1, &[]), record(512, 1, &[]), record(512, 1, &[]), record(1024, 1, &[])];
        assert_eq!(BatchSummary::from_records(&records).unwrap().most_common_max_tile, 1024);
    }

    #[test]
    fn game_log_layout() {
        let mut buf = Vec::new();
        write_game_log(&mut buf, &record(64, 4, &[(8, 0.5)])).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "-----");
        assert_eq!(lines[1], "Max Tile: 64");
        assert_eq!(lines[2], "Total Moves: 4");
        assert_eq!(lines[3], "Total States Visited: 40");
        assert_eq!(lines[4], "Total Time: 2.000000");
        assert_eq!(lines[8], "Time To Get Tiles:");
        assert_eq!(lines[9], "8: 0.500000");
    }

    #[test]
    fn summary_layout() {
        let s = BatchSummary::from_records(&[record(128, 10, &[(8, 1.5)])]).unwrap();
        let mut buf = Vec::new();
        write_summary(&mut buf, &s).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Average Max Tile: 128\nAverage Total Moves: 10.000000\n"));
        assert!(text.ends_with("Average Time To Get Tiles:\n8: 1.500000\n"));
    }
}
