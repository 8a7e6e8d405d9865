//! Named-series registry: the ordered render list plus the name → position map.
//!
//! Position order is render order (z-order and legend order). Names are the only stable
//! handle: a series keeps its position across updates, and positions above a removed
//! series shift down by one.

use ahash::AHashMap;
use log::{debug, warn};

use crate::error::Result;
use crate::models::Series;
use crate::types::AUTO_NAME_PREFIX;

/// Result of an [`SeriesRegistry::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted(usize),
    Updated(usize),
}

impl Upsert {
    pub fn position(&self) -> usize {
        match *self {
            Upsert::Inserted(p) | Upsert::Updated(p) => p,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeriesRegistry {
    render_list: Vec<Series>,
    index: AHashMap<String, usize>,
    base_reserved: bool,
}

impl SeriesRegistry {
    /// Registry for a line-only plot (no reserved base layer).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose position 0 holds `base`.
    pub fn with_base_layer(base: Series) -> Self {
        Self {
            render_list: vec![base],
            index: AHashMap::new(),
            base_reserved: true,
        }
    }

    pub fn has_base_layer(&self) -> bool {
        self.base_reserved
    }

    pub fn base(&self) -> Option<&Series> {
        if self.base_reserved {
            self.render_list.first()
        } else {
            None
        }
    }

    /// Replace the base layer. On a registry without one, the layer is inserted at
    /// position 0 and every overlay moves up by one.
    pub fn set_base(&mut self, base: Series) {
        if self.base_reserved {
            self.render_list[0] = base;
        } else {
            self.render_list.insert(0, base);
            for pos in self.index.values_mut() {
                *pos += 1;
            }
            self.base_reserved = true;
        }
        self.debug_check();
    }

    fn base_offset(&self) -> usize {
        usize::from(self.base_reserved)
    }

    /// Insert `series`, or replace the series of the same name in place.
    pub fn upsert(&mut self, series: Series) -> Upsert {
        let outcome = match self.index.get(&series.name) {
            Some(&pos) => {
                self.render_list[pos] = series;
                Upsert::Updated(pos)
            }
            None => {
                let pos = self.render_list.len();
                self.index.insert(series.name.clone(), pos);
                self.render_list.push(series);
                Upsert::Inserted(pos)
            }
        };
        self.debug_check();
        outcome
    }

    /// Remove `name`, compacting the positions above it. No-op when absent.
    pub fn remove(&mut self, name: &str) -> Option<Series> {
        let pos = self.index.remove(name)?;
        let removed = self.render_list.remove(pos);
        for p in self.index.values_mut() {
            if *p > pos {
                *p -= 1;
            }
        }
        self.debug_check();
        Some(removed)
    }

    /// Drop every overlay, keeping only the base layer if there is one.
    pub fn clear_overlays(&mut self) {
        self.render_list.truncate(self.base_offset());
        self.index.clear();
    }

    /// Forget everything, including the base layer reservation.
    pub fn reset(&mut self) {
        self.render_list.clear();
        self.index.clear();
        self.base_reserved = false;
    }

    /// Bounded-set synchronization: for every `i < n_max`, slot `"{prefix}_{i}"` is
    /// upserted when `frame(i, slot)` yields a series and removed when it yields `None`.
    ///
    /// A slot whose series fails to build keeps its previous state; the remaining slots
    /// are still synchronized and the first failure is returned.
    pub fn sync_bounded<F>(&mut self, prefix: &str, n_max: usize, mut frame: F) -> Result<()>
    where
        F: FnMut(usize, &str) -> Option<Result<Series>>,
    {
        let mut first_err = None;
        for i in 0..n_max {
            let slot = bounded_name(prefix, i);
            match frame(i, &slot) {
                Some(Ok(mut series)) => {
                    series.name = slot;
                    self.upsert(series);
                }
                Some(Err(e)) => {
                    warn!("skipping `{slot}`: {e}");
                    first_err.get_or_insert(e);
                }
                None => {
                    if self.remove(&slot).is_some() {
                        debug!("removed stale `{slot}`");
                    }
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.position(name).map(|p| &self.render_list[p])
    }

    /// The full render list, base layer first.
    pub fn series(&self) -> &[Series] {
        &self.render_list
    }

    /// Overlay names in render order.
    pub fn names(&self) -> Vec<&str> {
        self.render_list[self.base_offset()..]
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.render_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.render_list.is_empty()
    }

    pub fn overlay_count(&self) -> usize {
        self.index.len()
    }

    /// First unused `line_<n>`, starting from the current overlay count.
    pub fn next_auto_name(&self) -> String {
        (self.overlay_count()..)
            .map(|n| format!("{AUTO_NAME_PREFIX}_{n}"))
            .find(|name| !self.contains(name))
            .unwrap_or_else(|| AUTO_NAME_PREFIX.to_string())
    }

    /// Verify that every mapped name points at a series of that name and that every
    /// overlay is mapped exactly once.
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        let offset = self.base_offset();
        if self.render_list.len() < offset {
            return Err("base layer reserved but render list is empty".into());
        }
        if self.index.len() != self.render_list.len() - offset {
            return Err(format!(
                "{} mapped names for {} overlays",
                self.index.len(),
                self.render_list.len() - offset
            ));
        }
        for (name, &pos) in &self.index {
            if pos < offset {
                return Err(format!("`{name}` maps onto the base layer"));
            }
            match self.render_list.get(pos) {
                Some(s) if s.name == *name => {}
                Some(s) => {
                    return Err(format!("`{name}` maps to {pos}, which holds `{}`", s.name));
                }
                None => return Err(format!("`{name}` maps past the end ({pos})")),
            }
        }
        Ok(())
    }

    fn debug_check(&self) {
        debug_assert_eq!(self.check_consistency(), Ok(()));
    }
}

/// Slot name used by bounded-set synchronization.
pub fn bounded_name(prefix: &str, i: usize) -> String {
    format!("{prefix}_{i}")
}
