use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Init;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Inspect, Plan, Migrate }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Inspect => "inspect", Phase::Plan => "plan", Phase::Migrate => "migrate" } }
    fn span(&self) -> Span { match self {
        Phase::Inspect => info_span!("inspect", table = "_sqlx_migrations"),
        Phase::Plan => info_span!("plan"),
        Phase::Migrate => info_span!("migrate", schema = "reader"),
    }}
}

impl OpMarker for Init {
    const NAME: &'static str = "init";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("init") }
}

