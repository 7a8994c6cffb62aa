//! Stream-style table detection: tables inferred from text alignment and
//! whitespace, without relying on drawn grid lines.
//!
//! Text runs are clustered into rows by baseline, and adjacent runs within a
//! row are merged into segments. A table candidate is a run of multi-segment
//! rows; a row with fewer segments whose text starts inside one of the run's
//! non-leading columns is a wrapped line of the row above and stays in the
//! run. Any other row, or a vertical gap wider than `row_gap_ratio` ems, ends
//! the candidate. Column boundaries are the whitespace gaps left in the union
//! of all segment extents across the candidate's record rows.

use serde::{Deserialize, Serialize};

use crate::layout::TextBox;

/// Tuning knobs for layout and detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionOptions {
    /// Baselines closer than this (points) belong to the same row.
    pub row_tolerance: f32,
    /// Fewest rows (header included) for a table. Wrapped lines don't count.
    pub min_rows: usize,
    /// Fewest segments a row needs to count as tabular, and fewest columns
    /// a table needs.
    pub min_columns: usize,
    /// Estimated glyph advance as a fraction of the font size.
    pub glyph_width_ratio: f32,
    /// Runs separated by less than this many ems are one segment.
    pub segment_gap_ratio: f32,
    /// A vertical gap wider than this many ems ends a table.
    pub row_gap_ratio: f32,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            row_tolerance: 2.0,
            min_rows: 2,
            min_columns: 2,
            glyph_width_ratio: 0.5,
            segment_gap_ratio: 1.0,
            row_gap_ratio: 4.0,
        }
    }
}

/// A table found on one page, as a grid of trimmed cell strings.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    pub page: u32,
    pub rows: Vec<Vec<String>>,
    pub columns: usize,
}

impl DetectedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    text: String,
    x0: f32,
    x1: f32,
}

impl Segment {
    fn center(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }
}

#[derive(Debug, Clone)]
struct Row {
    segments: Vec<Segment>,
    y: f32,
    font_size: f32,
    /// Wrapped text belonging to the record row above.
    continuation: bool,
}

impl Row {
    fn new(boxes: &[&TextBox], gap_ratio: f32) -> Self {
        Self {
            segments: merge_segments(boxes, gap_ratio),
            y: boxes.first().map_or(0.0, |b| b.y),
            font_size: boxes.iter().map(|b| b.font_size).fold(0.0, f32::max),
            continuation: false,
        }
    }
}

/// Detects every stream table on a page, top to bottom.
pub fn detect_tables(page: u32, boxes: &[TextBox], options: &DetectionOptions) -> Vec<DetectedTable> {
    let rows: Vec<Row> = cluster_into_rows(boxes, options.row_tolerance)
        .iter()
        .map(|row| Row::new(row, options.segment_gap_ratio))
        .collect();

    let mut tables = Vec::new();
    let mut run: Vec<Row> = Vec::new();

    for mut row in rows {
        if let Some(last) = run.last() {
            let limit = options.row_gap_ratio * last.font_size.max(row.font_size);
            if last.y - row.y > limit {
                flush_run(page, &mut run, options, &mut tables);
            }
        }

        if row.segments.len() >= options.min_columns {
            run.push(row);
        } else if continues_run(&run, &row) {
            row.continuation = true;
            run.push(row);
        } else {
            flush_run(page, &mut run, options, &mut tables);
        }
    }
    flush_run(page, &mut run, options, &mut tables);

    tables
}

fn flush_run(page: u32, run: &mut Vec<Row>, options: &DetectionOptions, tables: &mut Vec<DetectedTable>) {
    let records = run.iter().filter(|r| !r.continuation).count();
    if records >= options.min_rows {
        if let Some(table) = build_table(page, run, options) {
            tables.push(table);
        }
    }
    run.clear();
}

/// Every segment of `row` starts inside a column of `run` other than the
/// leading one, which opens each record.
fn continues_run(run: &[Row], row: &Row) -> bool {
    let spans = column_spans(run);
    let Some(&(_, leading_end)) = spans.first() else {
        return false;
    };
    !row.segments.is_empty()
        && row.segments.iter().all(|s| {
            s.x0 > leading_end
                && spans
                    .iter()
                    .any(|(x0, x1)| s.x0 >= x0 - row.font_size && s.x0 <= *x1)
        })
}

/// Groups runs into rows, top of the page first, each row left to right.
fn cluster_into_rows(boxes: &[TextBox], tolerance: f32) -> Vec<Vec<&TextBox>> {
    if boxes.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&TextBox> = boxes.iter().collect();
    sorted.sort_by(|a, b| b.y.total_cmp(&a.y));

    let mut rows: Vec<Vec<&TextBox>> = Vec::new();
    let mut current_row = vec![sorted[0]];
    let mut current_y = sorted[0].y;

    for tbox in &sorted[1..] {
        if (current_y - tbox.y).abs() <= tolerance {
            current_row.push(tbox);
        } else {
            current_row.sort_by(|a, b| a.x.total_cmp(&b.x));
            rows.push(current_row);
            current_row = vec![tbox];
            current_y = tbox.y;
        }
    }

    current_row.sort_by(|a, b| a.x.total_cmp(&b.x));
    rows.push(current_row);
    rows
}

fn merge_segments(row: &[&TextBox], gap_ratio: f32) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();

    for tbox in row {
        let text = tbox.text.trim();
        if let Some(last) = segments.last_mut() {
            let gap = tbox.x - last.x1;
            if gap <= gap_ratio * tbox.font_size {
                if gap > 0.1 * tbox.font_size && !last.text.ends_with(' ') {
                    last.text.push(' ');
                }
                last.text.push_str(text);
                last.x1 = last.x1.max(tbox.right());
                continue;
            }
        }
        segments.push(Segment {
            text: text.to_string(),
            x0: tbox.x,
            x1: tbox.right(),
        });
    }

    segments
}

/// Column spans: the union of record-row segment extents, split at
/// whitespace gaps.
fn column_spans(rows: &[Row]) -> Vec<(f32, f32)> {
    let mut extents: Vec<(f32, f32)> = rows
        .iter()
        .filter(|r| !r.continuation)
        .flat_map(|r| &r.segments)
        .map(|s| (s.x0, s.x1))
        .collect();
    extents.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut spans: Vec<(f32, f32)> = Vec::new();
    for (x0, x1) in extents {
        match spans.last_mut() {
            Some(last) if x0 <= last.1 => last.1 = last.1.max(x1),
            _ => spans.push((x0, x1)),
        }
    }
    spans
}

/// The span holding the segment's center, else its left edge, else the
/// nearest span starting left of it.
fn column_of(spans: &[(f32, f32)], segment: &Segment) -> usize {
    let within = |x: f32| spans.iter().position(|(x0, x1)| x >= *x0 && x <= *x1);
    within(segment.center())
        .or_else(|| within(segment.x0))
        .or_else(|| spans.iter().rposition(|(x0, _)| *x0 <= segment.x0))
        .unwrap_or(0)
}

fn push_cell_text(cell: &mut String, text: &str) {
    if !cell.is_empty() {
        cell.push(' ');
    }
    cell.push_str(text);
}

fn build_table(page: u32, run: &[Row], options: &DetectionOptions) -> Option<DetectedTable> {
    let spans = column_spans(run);
    if spans.is_empty() || spans.len() < options.min_columns {
        return None;
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in run {
        if row.continuation {
            if let Some(cells) = rows.last_mut() {
                for segment in &row.segments {
                    push_cell_text(&mut cells[column_of(&spans, segment)], &segment.text);
                }
            }
            continue;
        }

        let mut cells = vec![String::new(); spans.len()];
        for segment in &row.segments {
            push_cell_text(&mut cells[column_of(&spans, segment)], &segment.text);
        }
        rows.push(cells);
    }

    Some(DetectedTable {
        page,
        rows,
        columns: spans.len(),
    })
}
