use std::sync::Arc;

use rust_embed::Embed;
use serde::Deserialize;

use crate::api::{Completion, Deliver, FetchError, KataService, Request};
use crate::kata::{KataDetail, KataSummary, PhaseGroup};

#[derive(Embed)]
#[folder = "assets/katas/"]
struct CatalogAssets;

#[derive(Debug, Deserialize)]
struct Catalog {
    katas: Vec<KataDetail>,
}

/// Serves the bundled catalog without a server. Code cannot be executed
/// offline, so run requests always fail.
pub struct OfflineService {
    katas: Arc<Vec<KataDetail>>,
    deliver: Deliver,
}

impl OfflineService {
    pub fn new(deliver: Deliver) -> anyhow::Result<Self> {
        let file = CatalogAssets::get("catalog.json")
            .ok_or_else(|| anyhow::anyhow!("bundled kata catalog is missing"))?;
        let catalog: Catalog = serde_json::from_slice(file.data.as_ref())?;
        Ok(Self::with_katas(catalog.katas, deliver))
    }

    pub fn with_katas(katas: Vec<KataDetail>, deliver: Deliver) -> Self {
        Self {
            katas: Arc::new(katas),
            deliver,
        }
    }
}

impl KataService for OfflineService {
    fn send(&self, request: Request) {
        let completion = match request {
            Request::List => Completion::List(Ok(group_by_phase(&self.katas))),
            Request::Detail(id) => {
                let result = self
                    .katas
                    .iter()
                    .find(|k| k.id == id)
                    .cloned()
                    .ok_or_else(|| FetchError::NotFound(id.clone()));
                Completion::Detail { id, result }
            }
            Request::Run { ticket, .. } => Completion::Run {
                ticket,
                result: Err(FetchError::Unavailable(
                    "running code requires the kata server (start without --offline)".into(),
                )),
            },
        };
        (self.deliver)(completion);
    }
}

/// Group katas into phases ordered by phase number, katas by sequence.
pub fn group_by_phase(katas: &[KataDetail]) -> Vec<PhaseGroup> {
    let mut phases: Vec<PhaseGroup> = Vec::new();

    for kata in katas {
        let phase = kata.phase.unwrap_or(0);
        let summary = KataSummary {
            id: kata.id.clone(),
            sequence: kata.sequence.unwrap_or(0),
            title: kata.title.clone(),
        };
        match phases.iter_mut().find(|g| g.phase == phase) {
            Some(group) => group.katas.push(summary),
            None => phases.push(PhaseGroup {
                phase,
                title: kata.phase_title.clone().unwrap_or_default(),
                katas: vec![summary],
            }),
        }
    }

    phases.sort_by_key(|g| g.phase);
    for group in &mut phases {
        group.katas.sort_by_key(|k| k.sequence);
    }
    phases
}
