//! Inert drawing records produced by scripts for an external renderer.

use crate::domain::value::{Color, DrawingKind, DrawingRef, grid_len};

#[derive(Debug, Clone, PartialEq)]
pub struct BoxDrawing {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub color: Option<Color>,
    pub bar_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineDrawing {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub color: Option<Color>,
    pub bar_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelDrawing {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: Option<Color>,
    pub bar_index: usize,
}

/// Row-major text grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDrawing {
    pub rows: usize,
    pub columns: usize,
    pub cells: Vec<String>,
    pub bar_index: usize,
}

impl TableDrawing {
    /// `None` when the grid would exceed the collection length limit.
    pub fn new(rows: usize, columns: usize, bar_index: usize) -> Option<Self> {
        let len = grid_len(rows, columns)?;
        Some(Self {
            rows,
            columns,
            cells: vec![String::new(); len],
            bar_index,
        })
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.cells.get(row * self.columns + column).map(String::as_str)
    }

    /// Returns `false` when the cell lies outside the grid.
    pub fn set_cell(&mut self, row: usize, column: usize, text: String) -> bool {
        if row >= self.rows || column >= self.columns {
            return false;
        }
        self.cells[row * self.columns + column] = text;
        true
    }
}

/// Marker emitted by `showshape` when its condition holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDrawing {
    pub title: String,
    pub shape: String,
    pub location: String,
    pub bar_index: usize,
    pub time: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawings {
    pub boxes: Vec<BoxDrawing>,
    pub lines: Vec<LineDrawing>,
    pub labels: Vec<LabelDrawing>,
    pub tables: Vec<TableDrawing>,
    pub shapes: Vec<ShapeDrawing>,
}

impl Drawings {
    pub fn add_box(&mut self, drawing: BoxDrawing) -> DrawingRef {
        self.boxes.push(drawing);
        reference(DrawingKind::Box, self.boxes.len())
    }

    pub fn add_line(&mut self, drawing: LineDrawing) -> DrawingRef {
        self.lines.push(drawing);
        reference(DrawingKind::Line, self.lines.len())
    }

    pub fn add_label(&mut self, drawing: LabelDrawing) -> DrawingRef {
        self.labels.push(drawing);
        reference(DrawingKind::Label, self.labels.len())
    }

    pub fn add_table(&mut self, drawing: TableDrawing) -> DrawingRef {
        self.tables.push(drawing);
        reference(DrawingKind::Table, self.tables.len())
    }

    pub fn add_shape(&mut self, drawing: ShapeDrawing) -> DrawingRef {
        self.shapes.push(drawing);
        reference(DrawingKind::Shape, self.shapes.len())
    }

    pub fn label_mut(&mut self, handle: DrawingRef) -> Option<&mut LabelDrawing> {
        match handle.kind {
            DrawingKind::Label => self.labels.get_mut(handle.index),
            _ => None,
        }
    }

    pub fn table_mut(&mut self, handle: DrawingRef) -> Option<&mut TableDrawing> {
        match handle.kind {
            DrawingKind::Table => self.tables.get_mut(handle.index),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len() + self.lines.len() + self.labels.len() + self.tables.len() + self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every drawing created on `bar_index` or later.
    pub fn truncate_from(&mut self, bar_index: usize) {
        self.boxes.retain(|d| d.bar_index < bar_index);
        self.lines.retain(|d| d.bar_index < bar_index);
        self.labels.retain(|d| d.bar_index < bar_index);
        self.tables.retain(|d| d.bar_index < bar_index);
        self.shapes.retain(|d| d.bar_index < bar_index);
    }
}

fn reference(kind: DrawingKind, len: usize) -> DrawingRef {
    DrawingRef {
        kind,
        index: len - 1,
    }
}
