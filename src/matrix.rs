//! Matrix cells and the slice algebra used by tabular projection.
//!
//! Frequency tables are small in-memory matrices of [`Datum`] cells. A
//! [`MatrixSlice`] selects a rectangular region by two inclusive corners,
//! north-west and south-east, whose components are [`Coord`] values counted
//! from the start or the end of an axis. All operations here are total:
//! out-of-range or inverted selections yield empty results, never panics.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexSet;

/// A single table cell: either a raw string or a numeric value.
#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    Str(String),
    Num(f64),
}

/// A row-major table of cells.
pub type Matrix = Vec<Vec<Datum>>;

impl Datum {
    /// Whether this cell reads as blank: the empty string or numeric zero.
    /// The *string* `"0"` is not blank; only the number is.
    pub fn is_blank(&self) -> bool {
        match self {
            Datum::Str(s) => s.is_empty(),
            Datum::Num(n) => *n == 0.0,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Str(s) => write!(f, "{}", s),
            Datum::Num(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::Str(value.to_string())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::Str(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Num(value)
    }
}

/// One corner component, counted from the start or the end of an axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coord {
    /// A 0-based offset from the start of the axis.
    FromStart(usize),
    /// An offset from the end of the axis; `FromEnd(1)` is the last element.
    FromEnd(usize),
    /// Past the last element of the axis.
    End,
}

impl From<i64> for Coord {
    fn from(value: i64) -> Self {
        if value < 0 {
            Coord::FromEnd(value.unsigned_abs() as usize)
        } else {
            Coord::FromStart(value as usize)
        }
    }
}

impl Coord {
    /// Resolve this component as an inclusive start index, clamped to `len`.
    pub(crate) fn resolve_start(&self, len: usize) -> usize {
        match *self {
            Coord::FromStart(i) => i.min(len),
            Coord::FromEnd(k) => len.saturating_sub(k),
            Coord::End => len,
        }
    }

    /// Resolve this component as an exclusive end index. The corner is
    /// inclusive, so it selects through its own row or column; `FromEnd(1)`
    /// names the last element and therefore resolves through the end.
    pub(crate) fn resolve_end(&self, len: usize) -> usize {
        match *self {
            Coord::FromStart(i) => i.saturating_add(1).min(len),
            Coord::FromEnd(1) => len,
            Coord::FromEnd(k) => (len + 1).saturating_sub(k).min(len),
            Coord::End => len,
        }
    }
}

/// A rectangular matrix region between two inclusive corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixSlice {
    /// The top-left corner, as (row, column).
    pub north_west: (Coord, Coord),
    /// The bottom-right corner, as (row, column). Inclusive.
    pub south_east: (Coord, Coord),
}

impl MatrixSlice {
    pub fn new(north_west: (Coord, Coord), south_east: (Coord, Coord)) -> Self {
        Self {
            north_west,
            south_east,
        }
    }

    /// Build a slice from the four corner components. Negative integers
    /// count from the end, so `from_corners(1, 1, -1, -1)` selects
    /// everything but the first row and column.
    pub fn from_corners(
        nw_row: impl Into<Coord>,
        nw_col: impl Into<Coord>,
        se_row: impl Into<Coord>,
        se_col: impl Into<Coord>,
    ) -> Self {
        Self {
            north_west: (nw_row.into(), nw_col.into()),
            south_east: (se_row.into(), se_col.into()),
        }
    }

    /// The slice selecting a whole matrix.
    pub fn identity() -> Self {
        Self {
            north_west: (Coord::FromStart(0), Coord::FromStart(0)),
            south_east: (Coord::End, Coord::End),
        }
    }

    /// The slice selecting the mirrored region of a transposed matrix:
    /// the row and column components swap within each corner.
    pub fn transposed(&self) -> Self {
        Self {
            north_west: (self.north_west.1, self.north_west.0),
            south_east: (self.south_east.1, self.south_east.0),
        }
    }
}

/// Transpose a row-major matrix. Rows shorter than the first row contribute
/// nothing to the trailing columns.
pub fn transpose<T: Clone>(matrix: &[Vec<T>]) -> Vec<Vec<T>> {
    let ncols = matrix.first().map_or(0, |row| row.len());
    (0..ncols)
        .map(|j| matrix.iter().filter_map(|row| row.get(j).cloned()).collect())
        .collect()
}

/// Extract the rectangular region of `matrix` selected by `slice`.
pub fn submatrix<T: Clone>(matrix: &[Vec<T>], slice: &MatrixSlice) -> Vec<Vec<T>> {
    let nrows = matrix.len();
    let row_start = slice.north_west.0.resolve_start(nrows);
    let row_end = slice.south_east.0.resolve_end(nrows);
    if row_start >= row_end {
        return Vec::new();
    }
    matrix[row_start..row_end]
        .iter()
        .map(|row| {
            let ncols = row.len();
            let col_start = slice.north_west.1.resolve_start(ncols);
            let col_end = slice.south_east.1.resolve_end(ncols);
            if col_start >= col_end {
                Vec::new()
            } else {
                row[col_start..col_end].to_vec()
            }
        })
        .collect()
}

/// The union of several lists, preserving first-seen order.
pub fn union<T: Clone + Eq + Hash>(lists: &[Vec<T>]) -> Vec<T> {
    let mut seen: IndexSet<T> = IndexSet::new();
    for list in lists {
        for item in list {
            seen.insert(item.clone());
        }
    }
    seen.into_iter().collect()
}
