//! Cycle windowing and milestone extraction
//!
//! Groups transition events per location and cuts each group into
//! non-overlapping access cycles. Cycle `i` owns the half-open window
//! `[start_i, start_{i+1})`; the last cycle's window is unbounded above.
//! Events before the first cycle start of a location belong to no cycle.

use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::catalog::{catalog_index, TRANSITION_CATALOG};
use crate::events::LogEvent;
use crate::types::{LocationId, LocationKind};

/// One request-to-resolution episode at a location
#[derive(Debug, Clone, PartialEq)]
pub struct AccessCycle {
    /// Location the cycle belongs to
    pub location: LocationId,
    /// Timestamp of the cycle-start transition (inclusive window start)
    pub cycle_start: DateTime<FixedOffset>,
    /// Start of the next cycle at this location (exclusive window end)
    pub window_end: Option<DateTime<FixedOffset>>,
    milestones: Vec<Option<DateTime<FixedOffset>>>,
}

impl AccessCycle {
    fn open(
        location: LocationId,
        cycle_start: DateTime<FixedOffset>,
        window_end: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self { location, cycle_start, window_end, milestones: vec![None; TRANSITION_CATALOG.len()] }
    }

    /// Location type of the cycle
    pub fn kind(&self) -> LocationKind {
        self.location.kind()
    }

    /// Earliest in-window timestamp of a catalog transition
    ///
    /// `None` when the label never occurred inside the window or is not
    /// part of the catalog.
    pub fn milestone(&self, label: &str) -> Option<DateTime<FixedOffset>> {
        catalog_index(label).and_then(|index| self.milestones[index])
    }

    /// All catalog milestones in catalog order
    pub fn milestones(&self) -> impl Iterator<Item = (&'static str, Option<DateTime<FixedOffset>>)> + '_ {
        TRANSITION_CATALOG.iter().copied().zip(self.milestones.iter().copied())
    }

    /// Whether a timestamp falls inside this cycle's window
    pub fn contains(&self, timestamp: DateTime<FixedOffset>) -> bool {
        timestamp >= self.cycle_start && self.window_end.map_or(true, |end| timestamp < end)
    }

    fn record(&mut self, index: usize, timestamp: DateTime<FixedOffset>) {
        // Events arrive in ascending order, so the first one seen is the earliest.
        self.milestones[index].get_or_insert(timestamp);
    }
}

/// Result of windowing one run's events
#[derive(Debug, Clone, Default)]
pub struct WindowingOutcome {
    /// Cycles grouped by location (first-seen order), ascending start within a location
    pub cycles: Vec<AccessCycle>,
    /// Locations that never logged their cycle-start transition
    pub locations_without_cycles: Vec<LocationId>,
    /// Events logged before the first cycle start of their location
    pub dropped_before_first_cycle: usize,
    /// Number of distinct locations seen
    pub location_count: usize,
}

/// Builds access cycles from transition events
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleWindower;

impl CycleWindower {
    /// Create a new windower
    pub fn new() -> Self {
        Self
    }

    /// Group, order and window the events of one run
    ///
    /// Events may arrive in any order. Within a location they are sorted by
    /// timestamp; ties keep their arrival order.
    #[instrument(skip_all, fields(events = events.len()))]
    pub fn build_cycles(&self, events: &[LogEvent]) -> WindowingOutcome {
        let mut order: Vec<LocationId> = Vec::new();
        let mut groups: HashMap<LocationId, Vec<&LogEvent>> = HashMap::new();

        for event in events {
            groups
                .entry(event.location)
                .or_insert_with(|| {
                    order.push(event.location);
                    Vec::new()
                })
                .push(event);
        }

        let mut outcome = WindowingOutcome { location_count: order.len(), ..Default::default() };

        for location in order {
            let mut group = groups.remove(&location).unwrap_or_default();
            group.sort_by_key(|event| event.timestamp);

            let (cycles, dropped) = Self::window_location(location, &group);
            if cycles.is_empty() {
                debug!(%location, events = group.len(), "No cycle start observed, location produces no cycles");
                outcome.locations_without_cycles.push(location);
            } else {
                debug!(%location, cycles = cycles.len(), dropped, "Windowed location");
            }

            outcome.dropped_before_first_cycle += dropped;
            outcome.cycles.extend(cycles);
        }

        info!(
            "Built {} cycles across {} locations ({} without a cycle start, {} events before first cycle)",
            outcome.cycles.len(),
            outcome.location_count,
            outcome.locations_without_cycles.len(),
            outcome.dropped_before_first_cycle
        );
        outcome
    }

    /// Window one location's time-ordered events; returns the cycles and the
    /// number of events that fell before the first cycle start
    fn window_location(location: LocationId, sorted: &[&LogEvent]) -> (Vec<AccessCycle>, usize) {
        let starts: Vec<DateTime<FixedOffset>> = sorted
            .iter()
            .filter(|event| event.is_cycle_start())
            .map(|event| event.timestamp)
            .collect();

        let mut cycles: Vec<AccessCycle> = starts
            .iter()
            .enumerate()
            .map(|(i, start)| AccessCycle::open(location, *start, starts.get(i + 1).copied()))
            .collect();

        let mut dropped = 0;
        for event in sorted {
            // Index of the last cycle whose start is <= the event time.
            let owner = starts.partition_point(|start| *start <= event.timestamp);
            if owner == 0 {
                dropped += 1;
                continue;
            }

            if let Some(index) = catalog_index(&event.transition) {
                cycles[owner - 1].record(index, event.timestamp);
            }
        }

        (cycles, dropped)
    }
}
