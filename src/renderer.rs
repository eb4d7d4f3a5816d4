use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::error::Error;
use crate::layout::{Layout, NodePosition};
use crate::text::{block_width, char_width, line_count, split_lines, unescape_markup};

const RANK_SPACING: usize = 2;
const NODE_GAP: usize = 3;
const MAX_SCALE: usize = 120;
/// Nodes closer than this on the same row are treated as overlapping.
const MIN_DX: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Blank,
    Glyph(char),
    /// Right half of a double-width glyph.
    Spill,
}

/// Character canvas. Cells covered by a box are marked so connectors routed
/// past a row of boxes leave the boxes intact.
struct Canvas {
    cells: Vec<Vec<Cell>>,
    boxed: Vec<Vec<bool>>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![Cell::Blank; width]; height],
            boxed: vec![vec![false; width]; height],
        }
    }

    fn put(&mut self, row: usize, col: usize, ch: char) {
        let Some(line) = self.cells.get_mut(row) else {
            return;
        };
        let Some(&old) = line.get(col) else {
            return;
        };
        // Never leave half of a wide glyph behind.
        match old {
            Cell::Spill if col > 0 => line[col - 1] = Cell::Blank,
            Cell::Glyph(prev) if char_width(prev) > 1 && col + 1 < line.len() => {
                line[col + 1] = Cell::Blank
            }
            _ => {}
        }
        line[col] = Cell::Glyph(ch);
    }

    fn text(&mut self, row: usize, col: usize, s: &str) {
        let mut at = col;
        for ch in s.chars() {
            self.put(row, at, ch);
            let w = char_width(ch);
            for spill in (at + 1)..(at + w) {
                if let Some(cell) = self.cells.get_mut(row).and_then(|l| l.get_mut(spill)) {
                    *cell = Cell::Spill;
                }
            }
            at += w;
        }
    }

    /// Draw a connector piece, joining it with whatever stroke is already there.
    fn join(&mut self, row: usize, col: usize, ch: char) {
        let existing = match self.cells.get(row).and_then(|l| l.get(col)) {
            Some(Cell::Glyph(c)) => *c,
            Some(_) => ' ',
            None => return,
        };
        self.put(row, col, merge_box_drawing(existing, ch));
    }

    /// Like [`Canvas::join`], but skips cells that belong to a box.
    fn route(&mut self, row: usize, col: usize, ch: char) {
        let boxed = self
            .boxed
            .get(row)
            .and_then(|l| l.get(col))
            .copied()
            .unwrap_or(false);
        if !boxed {
            self.join(row, col, ch);
        }
    }

    fn claim(&mut self, b: &NodeBox) {
        for row in b.top..=b.bottom() {
            if let Some(line) = self.boxed.get_mut(row) {
                for cell in line.iter_mut().take(b.right() + 1).skip(b.left) {
                    *cell = true;
                }
            }
        }
    }

    fn finish(&self) -> String {
        self.cells
            .iter()
            .map(|line| {
                let text: String = line
                    .iter()
                    .filter_map(|cell| match cell {
                        Cell::Blank => Some(' '),
                        Cell::Glyph(c) => Some(*c),
                        Cell::Spill => None,
                    })
                    .collect();
                text.trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct NodeBox<'a> {
    node: &'a NodePosition,
    label: String,
    width: usize,
    height: usize,
    left: usize,
    top: usize,
}

impl NodeBox<'_> {
    fn center_x(&self) -> usize {
        self.left + self.width / 2
    }

    fn right(&self) -> usize {
        self.left + self.width - 1
    }

    fn bottom(&self) -> usize {
        self.top + self.height - 1
    }
}

/// Draw the layout as boxes joined by box-drawing connectors, one row of
/// boxes per level.
pub fn render(layout: &Layout) -> String {
    let mut boxes = measure(layout);
    let scale = natural_scale(&boxes);
    let width = assign_columns(&mut boxes, scale);
    draw(layout, &boxes, width, scale)
}

/// Like [`render`], but squeezes the horizontal scale until the drawing fits
/// in `max_width` columns.
pub fn render_with_max_width(layout: &Layout, max_width: usize) -> Result<String, Error> {
    let mut boxes = measure(layout);
    let natural = natural_scale(&boxes);

    for scale in (1..=natural).rev() {
        let width = assign_columns(&mut boxes, scale);
        if width <= max_width {
            return Ok(draw(layout, &boxes, width, scale));
        }
    }

    Err(Error::TooWide(max_width))
}

fn measure(layout: &Layout) -> Vec<NodeBox<'_>> {
    let depths = layout.max_depth().map_or(0, |d| d + 1);
    let mut row_heights = vec![0; depths];

    let mut boxes: Vec<NodeBox> = layout
        .nodes
        .iter()
        .map(|node| {
            let label = node.label();
            let height = line_count(&label) + 2;
            row_heights[node.depth] = row_heights[node.depth].max(height);
            NodeBox {
                node,
                width: block_width(&label) + 4,
                height,
                label,
                left: 0,
                top: 0,
            }
        })
        .collect();

    let mut row_tops = Vec::with_capacity(depths);
    let mut y = 0;
    for h in &row_heights {
        row_tops.push(y);
        y += h + RANK_SPACING;
    }
    for b in &mut boxes {
        b.top = row_tops[b.node.depth];
    }

    boxes
}

/// Columns per layout unit needed to keep same-row neighbors apart.
fn natural_scale(boxes: &[NodeBox]) -> usize {
    let mut rows: HashMap<usize, Vec<&NodeBox>> = HashMap::new();
    for b in boxes {
        rows.entry(b.node.depth).or_default().push(b);
    }

    let mut scale = 1;
    for row in rows.values_mut() {
        row.sort_by(|a, b| a.node.x.total_cmp(&b.node.x));
        for pair in row.windows(2) {
            let dx = pair[1].node.x - pair[0].node.x;
            if dx < MIN_DX {
                continue;
            }
            // +2 absorbs rounding both centers to whole columns.
            let needed = (pair[0].width + pair[1].width) / 2 + NODE_GAP + 2;
            scale = scale.max((needed as f64 / dx).ceil() as usize);
        }
    }
    scale.min(MAX_SCALE)
}

/// Set each box's left column for the given scale and return the total width.
fn assign_columns(boxes: &mut [NodeBox], scale: usize) -> usize {
    let min_x = boxes
        .iter()
        .map(|b| b.node.x)
        .fold(f64::INFINITY, f64::min);

    let centers: Vec<i64> = boxes
        .iter()
        .map(|b| ((b.node.x - min_x) * scale as f64).round() as i64)
        .collect();
    let shift = boxes
        .iter()
        .zip(&centers)
        .map(|(b, &c)| (b.width / 2) as i64 - c)
        .max()
        .unwrap_or(0)
        .max(0);

    for (b, c) in boxes.iter_mut().zip(centers) {
        b.left = (c + shift - (b.width / 2) as i64) as usize;
    }

    boxes.iter().map(|b| b.left + b.width).max().unwrap_or(0)
}

fn draw(layout: &Layout, boxes: &[NodeBox], width: usize, scale: usize) -> String {
    let height = boxes.iter().map(|b| b.top + b.height).max().unwrap_or(0);
    debug!(width, height, scale, nodes = boxes.len(), "drawing tree");

    let mut canvas = Canvas::new(width, height);
    let box_map: HashMap<&str, &NodeBox> =
        boxes.iter().map(|b| (b.node.id.as_str(), b)).collect();

    for b in boxes {
        draw_box(&mut canvas, b);
        canvas.claim(b);
    }

    for edge in &layout.edges {
        let (Some(from), Some(to)) = (
            box_map.get(edge.from.as_str()),
            box_map.get(edge.to.as_str()),
        ) else {
            continue;
        };
        if from.node.id == to.node.id {
            continue;
        }
        match from.node.depth.cmp(&to.node.depth) {
            Ordering::Less => draw_down_edge(&mut canvas, from, to),
            Ordering::Greater => draw_down_edge(&mut canvas, to, from),
            Ordering::Equal => draw_side_edge(&mut canvas, from, to),
        }
    }

    canvas.finish()
}

fn draw_box(canvas: &mut Canvas, b: &NodeBox) {
    let right = b.right();
    let bottom = b.bottom();

    canvas.put(b.top, b.left, '┌');
    for col in (b.left + 1)..right {
        canvas.put(b.top, col, '─');
    }
    canvas.put(b.top, right, '┐');

    for (i, line) in split_lines(&b.label).into_iter().enumerate() {
        let row = b.top + 1 + i;
        canvas.put(row, b.left, '│');
        canvas.text(row, b.left + 2, &unescape_markup(line));
        canvas.put(row, right, '│');
    }

    canvas.put(bottom, b.left, '└');
    for col in (b.left + 1)..right {
        canvas.put(bottom, col, '─');
    }
    canvas.put(bottom, right, '┘');
}

/// Connect the bottom of `upper` to the top of a box on a lower row. Rows in
/// between may hold other boxes; the connector breaks around them.
fn draw_down_edge(canvas: &mut Canvas, upper: &NodeBox, lower: &NodeBox) {
    let from_cx = upper.center_x();
    let to_cx = lower.center_x();
    let bus = lower.top - RANK_SPACING;

    canvas.join(upper.bottom(), from_cx, '┬');
    for row in (upper.bottom() + 1)..bus {
        canvas.route(row, from_cx, '│');
    }

    match to_cx.cmp(&from_cx) {
        Ordering::Equal => canvas.route(bus, from_cx, '│'),
        Ordering::Less => {
            canvas.route(bus, from_cx, '┘');
            for col in (to_cx + 1)..from_cx {
                canvas.route(bus, col, '─');
            }
            canvas.route(bus, to_cx, '┌');
        }
        Ordering::Greater => {
            canvas.route(bus, from_cx, '└');
            for col in (from_cx + 1)..to_cx {
                canvas.route(bus, col, '─');
            }
            canvas.route(bus, to_cx, '┐');
        }
    }

    for row in (bus + 1)..lower.top {
        canvas.route(row, to_cx, '│');
    }
    canvas.join(lower.top, to_cx, '┴');
}

/// Connect two boxes on the same row through their first label line.
fn draw_side_edge(canvas: &mut Canvas, a: &NodeBox, b: &NodeBox) {
    let (left, right) = if a.left <= b.left { (a, b) } else { (b, a) };
    if right.left <= left.right() + 1 {
        return;
    }

    let row = left.top + 1;
    canvas.put(row, left.right(), '├');
    for col in (left.right() + 1)..right.left {
        canvas.route(row, col, '─');
    }
    canvas.put(row, right.left, '┤');
}

const UP: u8 = 1;
const DOWN: u8 = 2;
const LEFT: u8 = 4;
const RIGHT: u8 = 8;

/// Box-drawing glyphs and the directions their strokes reach.
const GLYPHS: [(char, u8); 11] = [
    ('─', LEFT | RIGHT),
    ('│', UP | DOWN),
    ('┌', DOWN | RIGHT),
    ('┐', DOWN | LEFT),
    ('└', UP | RIGHT),
    ('┘', UP | LEFT),
    ('┬', DOWN | LEFT | RIGHT),
    ('┴', UP | LEFT | RIGHT),
    ('├', UP | DOWN | RIGHT),
    ('┤', UP | DOWN | LEFT),
    ('┼', UP | DOWN | LEFT | RIGHT),
];

fn strokes(ch: char) -> u8 {
    GLYPHS.iter().find(|(g, _)| *g == ch).map_or(0, |&(_, s)| s)
}

/// Overlay `new` on `existing`, joining their strokes when both are
/// box-drawing glyphs.
fn merge_box_drawing(existing: char, new: char) -> char {
    let base = strokes(existing);
    if base == 0 {
        return new;
    }
    let joined = base | strokes(new);
    GLYPHS
        .iter()
        .find(|(_, s)| *s == joined)
        .map_or(new, |&(g, _)| g)
}
