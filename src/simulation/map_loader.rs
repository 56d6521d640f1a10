//! Loading a `GridMap` from the CSV road and signal grids
//!
//! The road grid has one CSV row per map row. A cell is either `0` (no road)
//! or a quoted list of exit cells such as `"(1,2),(2,1)"`. The signal grid has
//! the same shape and holds `0` or a signal group number.

use csv::{ReaderBuilder, StringRecord, Trim};
use log::info;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::error::{MapError, MapResult};
use super::grid_map::{GridMap, GridMapBuilder};
use super::types::Cell;

/// Load the road grid and, when given, the signal grid from disk
pub fn load_map(map_path: &Path, signal_path: Option<&Path>) -> MapResult<GridMap> {
    let map_file = File::open(map_path)?;
    let map = match signal_path {
        Some(path) => parse_map(map_file, Some(File::open(path)?))?,
        None => parse_map(map_file, None::<File>)?,
    };

    let (rows, cols) = map.bounds();
    info!(
        "Loaded {}x{} map from {}: {} road cells, {} signals",
        rows,
        cols,
        map_path.display(),
        map.road_count(),
        map.signal_count()
    );
    Ok(map)
}

/// Parse a road grid and an optional signal grid from any readers
pub fn parse_map<R: Read, S: Read>(roads: R, signals: Option<S>) -> MapResult<GridMap> {
    let road_rows = read_grid(roads)?;
    let rows = road_rows.len();
    let cols = road_rows.first().map(|row| row.len()).unwrap_or(0);
    if rows == 0 || cols == 0 {
        return Err(MapError::Empty);
    }

    let mut builder = GridMapBuilder::new(rows as i32, cols as i32);

    for (i, record) in road_rows.iter().enumerate() {
        for (j, value) in record.iter().enumerate() {
            if is_blank(value) {
                continue;
            }
            let cell = Cell::new(i as i32 + 1, j as i32 + 1);
            builder.add_road(cell);
            for exit in parse_exits(value, i, j)? {
                builder.connect(cell, exit);
            }
        }
    }

    if let Some(signals) = signals {
        let signal_rows = read_grid(signals)?;
        let signal_cols = signal_rows.iter().map(|row| row.len()).min().unwrap_or(0);
        if signal_rows.len() < rows || signal_cols < cols {
            return Err(MapError::SignalGridTooSmall {
                rows: signal_rows.len(),
                cols: signal_cols,
            });
        }

        // Signals only attach to roads; stray marks on empty cells are ignored
        let road_cells = builder.build()?;
        for (i, record) in signal_rows.iter().take(rows).enumerate() {
            for (j, value) in record.iter().take(cols).enumerate() {
                if is_blank(value) {
                    continue;
                }
                let group: u8 = value.parse().map_err(|_| MapError::Malformed {
                    row: i + 1,
                    col: j + 1,
                    reason: format!("signal group {value:?} is not a number"),
                })?;
                let cell = Cell::new(i as i32 + 1, j as i32 + 1);
                if road_cells.is_road(cell) {
                    builder.set_signal(cell, group);
                }
            }
        }
    }

    builder.build()
}

fn read_grid<R: Read>(reader: R) -> MapResult<Vec<StringRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

fn is_blank(value: &str) -> bool {
    value.is_empty() || value == "0"
}

/// Parse `"(x,y),(x,y)"` into cells. `row` and `col` are 0-based and only
/// used for error reporting.
fn parse_exits(value: &str, row: usize, col: usize) -> MapResult<Vec<Cell>> {
    let malformed = |reason: String| MapError::Malformed {
        row: row + 1,
        col: col + 1,
        reason,
    };

    let mut exits = Vec::new();
    for chunk in value.split(')') {
        let chunk = chunk.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if chunk.is_empty() {
            continue;
        }
        let pair = chunk
            .strip_prefix('(')
            .ok_or_else(|| malformed(format!("expected '(' in {value:?}")))?;
        let (x, y) = pair
            .split_once(',')
            .ok_or_else(|| malformed(format!("expected 'x,y' in {value:?}")))?;
        let x: i32 = x
            .trim()
            .parse()
            .map_err(|_| malformed(format!("bad row {x:?}")))?;
        let y: i32 = y
            .trim()
            .parse()
            .map_err(|_| malformed(format!("bad column {y:?}")))?;
        exits.push(Cell::new(x, y));
    }

    if exits.is_empty() {
        return Err(malformed(format!("no exits in {value:?}")));
    }
    Ok(exits)
}
