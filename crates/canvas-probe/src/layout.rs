//! Region Layout Table
//!
//! Hand-authored mapping from widget identifiers to canvas regions. Top-level
//! regions use fractional boxes in `[0, 1]` canvas units; grouped regions are
//! placed on the cell grid of their parent group.
//!
//! ```text
//! canvas (0,0)──────────────────────────────┐
//! │  display   FracRect(0.065, 0.055, ...)  │
//! │  ┌ buttons group, 5x5 grid ──────────┐  │
//! │  │ [7][8][9][ ][ ]                   │  │
//! │  │  ... GridCell(column, row, span)  │  │
//! │  └───────────────────────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```

use crate::dom::SyntheticDom;
use crate::element::SyntheticElement;
use crate::geometry::{Point, Size};
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};

/// Fractional box in units of the enclosing area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FracRect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl FracRect {
    /// Create a fractional box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole enclosing area
    #[must_use]
    pub const fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Whether every edge lies in `[0, 1]`
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        let unit = 0.0..=1.0;
        unit.contains(&self.x)
            && unit.contains(&self.y)
            && unit.contains(&self.width)
            && unit.contains(&self.height)
            && unit.contains(&(self.x + self.width))
            && unit.contains(&(self.y + self.height))
    }

    /// Scale to canvas pixels, truncating location and size independently
    #[must_use]
    pub fn to_pixels(&self, canvas: Size) -> (Point, Size) {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        (
            Point::new((self.x * w) as i32, (self.y * h) as i32),
            Size::new((self.width * w) as u32, (self.height * h) as u32),
        )
    }
}

/// Cell position on a group's grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    /// Column index
    pub column: u32,
    /// Row index
    pub row: u32,
    /// Number of columns spanned
    #[serde(default = "one")]
    pub column_span: u32,
    /// Number of rows spanned
    #[serde(default = "one")]
    pub row_span: u32,
}

const fn one() -> u32 {
    1
}

impl GridCell {
    /// Single cell
    #[must_use]
    pub const fn at(column: u32, row: u32) -> Self {
        Self {
            column,
            row,
            column_span: 1,
            row_span: 1,
        }
    }

    /// Set the spans
    #[must_use]
    pub const fn spanning(mut self, columns: u32, rows: u32) -> Self {
        self.column_span = columns;
        self.row_span = rows;
        self
    }
}

/// A group subdivided into a regular grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutGroup {
    /// Group identifier (also emitted as a synthetic element)
    pub id: String,
    /// Fractional box on the canvas
    pub bounds: FracRect,
    /// Number of grid columns
    pub columns: u32,
    /// Number of grid rows
    pub rows: u32,
}

impl LayoutGroup {
    /// Create a group
    #[must_use]
    pub fn new(id: impl Into<String>, bounds: FracRect, columns: u32, rows: u32) -> Self {
        Self {
            id: id.into(),
            bounds,
            columns,
            rows,
        }
    }

    /// Pixel rectangle of a grid cell
    ///
    /// The group box is scaled to canvas pixels first and cut into equal
    /// cells; the cell's near and far edges are then truncated independently,
    /// so adjacent cells share an edge.
    #[must_use]
    pub fn cell_rect(&self, cell: GridCell, canvas: Size) -> (Point, Size) {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let cell_w = self.bounds.width * w / f64::from(self.columns);
        let cell_h = self.bounds.height * h / f64::from(self.rows);

        let left = self.bounds.x * w + f64::from(cell.column) * cell_w;
        let top = self.bounds.y * h + f64::from(cell.row) * cell_h;
        let right = left + f64::from(cell.column_span) * cell_w;
        let bottom = top + f64::from(cell.row_span) * cell_h;

        let (x0, y0) = (left as i32, top as i32);
        (
            Point::new(x0, y0),
            Size::new(
                (right as i32 - x0).max(0) as u32,
                (bottom as i32 - y0).max(0) as u32,
            ),
        )
    }
}

/// Where a region sits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Directly on the canvas
    Canvas {
        /// Fractional box
        bounds: FracRect,
    },
    /// On the grid of a group
    Grid {
        /// Cell on the group grid
        cell: GridCell,
    },
}

/// One entry of the layout table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRegion {
    /// Widget identifier
    pub id: String,
    /// Placement
    pub placement: Placement,
    /// Parent group (required for grid placements)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl LayoutRegion {
    /// Region placed directly on the canvas
    #[must_use]
    pub fn canvas(id: impl Into<String>, bounds: FracRect) -> Self {
        Self {
            id: id.into(),
            placement: Placement::Canvas { bounds },
            group: None,
        }
    }

    /// Region placed on a group's grid
    #[must_use]
    pub fn cell(id: impl Into<String>, group: impl Into<String>, cell: GridCell) -> Self {
        Self {
            id: id.into(),
            placement: Placement::Grid { cell },
            group: Some(group.into()),
        }
    }
}

/// Static layout of one calculator skin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTable {
    /// Table name
    pub name: String,
    /// Grid groups
    #[serde(default)]
    pub groups: Vec<LayoutGroup>,
    /// Widget regions
    pub regions: Vec<LayoutRegion>,
}

impl LayoutTable {
    /// Create an empty table
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Add a group
    #[must_use]
    pub fn with_group(mut self, group: LayoutGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Add a region
    #[must_use]
    pub fn with_region(mut self, region: LayoutRegion) -> Self {
        self.regions.push(region);
        self
    }

    /// Add a single-cell button on a group grid
    #[must_use]
    pub fn with_button(self, id: &str, group: &str, column: u32, row: u32) -> Self {
        self.with_region(LayoutRegion::cell(id, group, GridCell::at(column, row)))
    }

    /// Look up a group
    #[must_use]
    pub fn group(&self, id: &str) -> Option<&LayoutGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Check the table invariants
    pub fn validate(&self) -> ProbeResult<()> {
        let invalid = |message: String| ProbeError::InvalidLayout {
            table: self.name.clone(),
            message,
        };

        for group in &self.groups {
            if !group.bounds.is_normalized() {
                return Err(invalid(format!("group '{}' leaves the canvas", group.id)));
            }
            if group.columns == 0 || group.rows == 0 {
                return Err(invalid(format!("group '{}' has an empty grid", group.id)));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for id in self
            .groups
            .iter()
            .map(|g| &g.id)
            .chain(self.regions.iter().map(|r| &r.id))
        {
            if !seen.insert(id.as_str()) {
                return Err(invalid(format!("duplicate identifier '{id}'")));
            }
        }

        for region in &self.regions {
            match (&region.placement, &region.group) {
                (Placement::Canvas { bounds }, None) => {
                    if !bounds.is_normalized() {
                        return Err(invalid(format!("region '{}' leaves the canvas", region.id)));
                    }
                }
                (Placement::Canvas { .. }, Some(_)) => {
                    return Err(invalid(format!(
                        "region '{}' has a group but a canvas placement",
                        region.id
                    )));
                }
                (Placement::Grid { .. }, None) => {
                    return Err(invalid(format!(
                        "region '{}' has a grid placement but no group",
                        region.id
                    )));
                }
                (Placement::Grid { cell }, Some(group_id)) => {
                    let group = self.group(group_id).ok_or_else(|| {
                        invalid(format!(
                            "region '{}' references unknown group '{group_id}'",
                            region.id
                        ))
                    })?;
                    if cell.column_span == 0
                        || cell.row_span == 0
                        || cell.column + cell.column_span > group.columns
                        || cell.row + cell.row_span > group.rows
                    {
                        return Err(invalid(format!(
                            "region '{}' leaves the {}x{} grid of '{group_id}'",
                            region.id, group.columns, group.rows
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Pixel rectangle of a region on a canvas of this size
    ///
    /// `None` when the region names a group the table does not have.
    #[must_use]
    pub fn region_rect(&self, region: &LayoutRegion, canvas: Size) -> Option<(Point, Size)> {
        match region.placement {
            Placement::Canvas { bounds } => Some(bounds.to_pixels(canvas)),
            Placement::Grid { cell } => {
                let group = self.group(region.group.as_deref()?)?;
                Some(group.cell_rect(cell, canvas))
            }
        }
    }

    /// Resolve every group and region to pixel rectangles for a canvas size
    ///
    /// Groups come first, then regions in table order. Regions whose group is
    /// missing are skipped; `validate` reports them.
    #[must_use]
    pub fn resolve(&self, canvas: Size) -> SyntheticDom {
        let mut dom = SyntheticDom::new(canvas);
        let groups = self
            .groups
            .iter()
            .map(|g| (&g.id, Some(g.bounds.to_pixels(canvas))));
        let regions = self
            .regions
            .iter()
            .map(|r| (&r.id, self.region_rect(r, canvas)));

        for (id, rect) in groups.chain(regions) {
            let Some((location, size)) = rect else { continue };
            dom.insert(SyntheticElement::positioned(id.clone(), location, size));
        }
        dom
    }

    /// Table for the online-calculator.com HTML5 skin: display on top and a
    /// 5x5 button grid below it
    #[must_use]
    pub fn online_calculator() -> Self {
        let g = "buttons";
        Self::new("online-calculator")
            .with_region(LayoutRegion::canvas(
                "display",
                FracRect::new(0.065, 0.055, 0.87, 0.09),
            ))
            .with_group(LayoutGroup::new(g, FracRect::new(0.05, 0.2, 0.9, 0.725), 5, 5))
            .with_button("btn_7", g, 0, 1)
            .with_button("btn_8", g, 1, 1)
            .with_button("btn_9", g, 2, 1)
            .with_button("btn_4", g, 0, 2)
            .with_button("btn_5", g, 1, 2)
            .with_button("btn_6", g, 2, 2)
            .with_button("btn_1", g, 0, 3)
            .with_button("btn_2", g, 1, 3)
            .with_button("btn_3", g, 2, 3)
            .with_button("btn_0", g, 0, 4)
            .with_button("btn_plus", g, 3, 4)
            .with_button("btn_equal", g, 4, 4)
            .with_button("btn_clear", g, 4, 0)
    }

    /// Table for the LiveCode HTML5 demo: the whole canvas is a 4x6 grid
    /// whose first row is the display
    #[must_use]
    pub fn livecode() -> Self {
        let g = "keypad";
        Self::new("livecode")
            .with_group(LayoutGroup::new(g, FracRect::full(), 4, 6))
            .with_region(LayoutRegion::cell(
                "display",
                g,
                GridCell::at(0, 0).spanning(4, 1),
            ))
            .with_button("btn_clear", g, 0, 1)
            .with_button("btn_sign", g, 1, 1)
            .with_button("btn_percent", g, 2, 1)
            .with_button("btn_divide", g, 3, 1)
            .with_button("btn_7", g, 0, 2)
            .with_button("btn_8", g, 1, 2)
            .with_button("btn_9", g, 2, 2)
            .with_button("btn_multiply", g, 3, 2)
            .with_button("btn_4", g, 0, 3)
            .with_button("btn_5", g, 1, 3)
            .with_button("btn_6", g, 2, 3)
            .with_button("btn_minus", g, 3, 3)
            .with_button("btn_1", g, 0, 4)
            .with_button("btn_2", g, 1, 4)
            .with_button("btn_3", g, 2, 4)
            .with_button("btn_plus", g, 3, 4)
            .with_region(LayoutRegion::cell(
                "btn_0",
                g,
                GridCell::at(0, 5).spanning(2, 1),
            ))
            .with_button("btn_dot", g, 2, 5)
            .with_button("btn_equal", g, 3, 5)
    }
}
