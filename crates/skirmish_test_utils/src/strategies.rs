//! Proptest strategies for battlefield generation.
//!
//! Generated battlefields are always well formed: a rectangle of walls,
//! floor and units surrounded by a wall border.

use proptest::prelude::*;

/// One interior cell: mostly floor, some walls, occasional units.
pub fn arb_cell() -> impl Strategy<Value = char> {
    prop_oneof![
        6 => Just('.'),
        2 => Just('#'),
        1 => Just('E'),
        1 => Just('G'),
    ]
}

/// A walled battlefield with up to `max_rows` x `max_cols` interior cells.
pub fn arb_battlefield(max_rows: usize, max_cols: usize) -> impl Strategy<Value = String> {
    (1..=max_rows.max(1), 1..=max_cols.max(1)).prop_flat_map(|(rows, cols)| {
        proptest::collection::vec(arb_cell(), rows * cols)
            .prop_map(move |cells| frame(&cells, rows, cols))
    })
}

/// Surround a row-major block of cells with walls.
#[must_use]
pub fn frame(cells: &[char], rows: usize, cols: usize) -> String {
    let border = "#".repeat(cols + 2);
    let mut out = String::with_capacity((rows + 2) * (cols + 3));
    out.push_str(&border);
    out.push('\n');
    for row in cells.chunks(cols).take(rows) {
        out.push('#');
        out.extend(row.iter());
        out.push('#');
        out.push('\n');
    }
    out.push_str(&border);
    out
}

/// Attack power for the calibrated faction.
pub fn arb_attack_power() -> impl Strategy<Value = u32> {
    4u32..=60
}
