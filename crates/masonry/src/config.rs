//! Breakpoint and gap configuration.

use core::str::FromStr;

use anyhow::{Context as _, Result, bail};
use log::debug;

/// Breakpoint widths used when none are configured.
pub const DEFAULT_BREAKPOINTS: [f32; 3] = [1280.0, 800.0, 400.0];
/// Column counts paired with [`DEFAULT_BREAKPOINTS`].
pub const DEFAULT_COLUMNS: [usize; 3] = [3, 2, 1];
/// Gap between columns and rows, in pixels.
pub const DEFAULT_GAP: f32 = 24.0;
/// Upper bound on the column count of any breakpoint.
pub const MAX_COLUMNS: usize = 64;

/// Containers at least `min_width` pixels wide lay out in `columns` columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    /// Minimum container width for this entry
    pub min_width: f32,
    /// Column count in `1..=MAX_COLUMNS`
    pub columns: usize,
}

/// Responsive column configuration for one waterfall container.
///
/// Entries are kept sorted by descending `min_width`; the last entry is the
/// fallback for containers narrower than every breakpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    breakpoints: Vec<Breakpoint>,
    gap: f32,
}

impl LayoutConfig {
    /// Pair `widths` with `columns`, clamping to the shorter list.
    ///
    /// Column counts are clamped to `1..=MAX_COLUMNS` and a negative or
    /// non-finite gap becomes 0.
    pub fn new(widths: &[f32], columns: &[usize], gap: f32) -> Self {
        if widths.len() != columns.len() {
            debug!(
                "breakpoint/column length mismatch ({} vs {}), using the first {}",
                widths.len(),
                columns.len(),
                widths.len().min(columns.len())
            );
        }
        let mut breakpoints: Vec<Breakpoint> = widths
            .iter()
            .zip(columns)
            .map(|(&min_width, &count)| {
                if count > MAX_COLUMNS {
                    debug!("column count {count} at {min_width}px clamped to {MAX_COLUMNS}");
                }
                Breakpoint {
                    min_width,
                    columns: count.clamp(1, MAX_COLUMNS),
                }
            })
            .collect();
        breakpoints.sort_by(|left, right| right.min_width.total_cmp(&left.min_width));
        let clamped_gap = if gap.is_finite() { gap.max(0.0) } else { 0.0 };
        Self {
            breakpoints,
            gap: clamped_gap,
        }
    }

    /// Parse comma-separated breakpoint and column lists such as
    /// `"1280, 800, 400"` and `"3, 2, 1"`. Empty entries are skipped.
    ///
    /// # Errors
    /// Returns an error naming the first entry that is not a number, or a
    /// breakpoint that is not finite.
    pub fn parse(breakpoints: &str, columns: &str, gap: f32) -> Result<Self> {
        let widths: Vec<f32> = parse_list(breakpoints).context("invalid breakpoint list")?;
        if let Some(bad) = widths.iter().find(|width| !width.is_finite()) {
            bail!("breakpoint {bad} is not a finite width");
        }
        let counts: Vec<usize> = parse_list(columns).context("invalid column list")?;
        Ok(Self::new(&widths, &counts, gap))
    }

    /// Gap between columns and between stacked items.
    pub fn gap(&self) -> f32 {
        self.gap
    }

    /// Breakpoints sorted by descending width.
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Column count for a container of `container_width` pixels.
    pub fn resolve_columns(&self, container_width: f32) -> usize {
        self.breakpoints
            .iter()
            .find(|breakpoint| breakpoint.min_width <= container_width)
            .or_else(|| self.breakpoints.last())
            .map_or(1, |breakpoint| breakpoint.columns)
    }

    /// Width of every item when `columns` columns share `container_width`.
    pub fn item_width(&self, container_width: f32, columns: usize) -> f32 {
        let count = columns.max(1) as f32;
        self.gap.mul_add(-(count - 1.0), container_width) / count
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::new(&DEFAULT_BREAKPOINTS, &DEFAULT_COLUMNS, DEFAULT_GAP)
    }
}

fn parse_list<T>(source: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: core::error::Error + Send + Sync + 'static,
{
    source
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<T>()
                .with_context(|| format!("`{entry}` is not a number"))
        })
        .collect()
}
