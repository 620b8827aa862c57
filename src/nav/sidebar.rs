use std::collections::BTreeSet;

use crate::kata;
use crate::nav::route::RouteKataBinding;
use crate::reactive::{Signal, Subscriptions};
use crate::resource::ListState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SidebarRow {
    Phase {
        phase: u32,
        title: String,
        expanded: bool,
    },
    Kata {
        id: String,
        phase: u32,
        sequence: u32,
        title: String,
        current: bool,
    },
}

/// Phase/kata tree state: expanded phases plus a keyboard cursor.
pub struct SidebarTree {
    expanded: Signal<BTreeSet<u32>>,
    list: Signal<ListState>,
    current: Signal<Option<String>>,
    cursor: usize,
    _subs: Subscriptions,
}

impl SidebarTree {
    pub fn new(
        expanded: Signal<BTreeSet<u32>>,
        list: Signal<ListState>,
        current: Signal<Option<String>>,
    ) -> Self {
        let mut subs = Subscriptions::new();
        {
            let (expanded, current) = (expanded.clone(), current.clone());
            subs.push(list.subscribe(move |list| {
                current.with(|id| expand_phase_of(&expanded, list, id.as_deref()));
            }));
        }
        {
            let (expanded, list) = (expanded.clone(), list.clone());
            subs.push(current.subscribe(move |id| {
                list.with(|list| expand_phase_of(&expanded, list, id.as_deref()));
            }));
        }
        list.with(|l| current.with(|id| expand_phase_of(&expanded, l, id.as_deref())));

        Self {
            expanded,
            list,
            current,
            cursor: 0,
            _subs: subs,
        }
    }

    pub fn expanded_phases(&self) -> BTreeSet<u32> {
        self.expanded.get()
    }

    pub fn is_expanded(&self, phase: u32) -> bool {
        self.expanded.with(|set| set.contains(&phase))
    }

    /// User toggle; the only path that collapses a phase.
    pub fn toggle_phase(&self, phase: u32) {
        self.expanded.update(|set| {
            if !set.remove(&phase) {
                set.insert(phase);
            }
        });
    }

    pub fn rows(&self) -> Vec<SidebarRow> {
        let current = self.current.get();
        let expanded = self.expanded.get();
        self.list.with(|list| {
            let ListState::Ready(phases) = list else {
                return Vec::new();
            };
            let mut rows = Vec::new();
            for group in phases.iter() {
                let is_open = expanded.contains(&group.phase);
                rows.push(SidebarRow::Phase {
                    phase: group.phase,
                    title: group.title.clone(),
                    expanded: is_open,
                });
                if !is_open {
                    continue;
                }
                for summary in &group.katas {
                    rows.push(SidebarRow::Kata {
                        id: summary.id.clone(),
                        phase: group.phase,
                        sequence: summary.sequence,
                        title: summary.title.clone(),
                        current: current.as_deref() == Some(summary.id.as_str()),
                    });
                }
            }
            rows
        })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let len = self.rows().len();
        if len > 0 {
            self.cursor = (self.cursor + 1).min(len - 1);
        }
    }

    /// Move the cursor onto the current kata's row, if it is visible.
    pub fn focus_current(&mut self) {
        if let Some(idx) = self
            .rows()
            .iter()
            .position(|row| matches!(row, SidebarRow::Kata { current: true, .. }))
        {
            self.cursor = idx;
        }
    }

    /// Activate the row under the cursor: phases toggle, katas are selected.
    pub fn activate(&mut self, route: &RouteKataBinding) {
        self.activate_row(self.cursor, route);
    }

    pub fn activate_row(&mut self, index: usize, route: &RouteKataBinding) {
        let rows = self.rows();
        let Some(row) = rows.get(index) else {
            return;
        };
        self.cursor = index;
        match row {
            SidebarRow::Phase { phase, .. } => {
                self.toggle_phase(*phase);
                self.clamp_cursor();
            }
            SidebarRow::Kata { id, .. } => {
                tracing::info!(kata = %id, "kata selected from sidebar");
                route.select_kata(id);
            }
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}

/// Grow `expanded` with the phase holding `id`. Never removes anything.
fn expand_phase_of(expanded: &Signal<BTreeSet<u32>>, list: &ListState, id: Option<&str>) {
    let (ListState::Ready(phases), Some(id)) = (list, id) else {
        return;
    };
    let Some(phase) = kata::phase_of(phases, id) else {
        return;
    };
    if expanded.with(|set| set.contains(&phase)) {
        return;
    }
    expanded.update(|set| {
        set.insert(phase);
    });
}
