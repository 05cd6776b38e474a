//! Battlefield text parsing.
//!
//! The format is a rectangular block of characters: `#` is a wall, `.` is
//! open floor, and `E` / `G` mark an elf or goblin standing on open floor.
//! Blank lines before and after the block are ignored.

use crate::battlefield::{Battlefield, Cell};
use crate::components::Position;
use crate::error::ParseError;
use crate::factions::Faction;

/// Terrain plus the starting cell of every unit, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBattlefield {
    /// Terrain with no units placed.
    pub battlefield: Battlefield,
    /// Faction and starting cell of each unit, in reading order.
    pub spawns: Vec<(Faction, Position)>,
}

/// Parse a battlefield description.
pub fn parse_battlefield(input: &str) -> Result<ParsedBattlefield, ParseError> {
    let lines: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .collect();

    let first = lines.iter().position(|(_, l)| !l.trim().is_empty());
    let last = lines.iter().rposition(|(_, l)| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return Err(ParseError::Empty);
    };
    let rows = &lines[first..=last];

    let width = rows[0].1.chars().count();
    let mut cells = Vec::with_capacity(width * rows.len());
    let mut spawns = Vec::new();

    for (row, &(line_no, line)) in rows.iter().enumerate() {
        let found = line.chars().count();
        if found != width {
            return Err(ParseError::RaggedRow {
                line: line_no,
                expected: width,
                found,
            });
        }

        for (col, character) in line.chars().enumerate() {
            let cell = match character {
                '#' => Cell::Blocked,
                '.' => Cell::Open,
                other => {
                    let faction =
                        Faction::from_marker(other).ok_or(ParseError::UnknownCell {
                            line: line_no,
                            column: col + 1,
                            character: other,
                        })?;
                    spawns.push((faction, Position::new(row, col)));
                    Cell::Open
                }
            };
            cells.push(cell);
        }
    }

    Ok(ParsedBattlefield {
        battlefield: Battlefield::new(width, rows.len(), cells),
        spawns,
    })
}
