use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Refresh;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Lookup, FetchRss, ParseRss, WriteArticles, Touch }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::Lookup => "lookup",
        Phase::FetchRss => "fetch_rss",
        Phase::ParseRss => "parse_rss",
        Phase::WriteArticles => "write_articles",
        Phase::Touch => "touch",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::Lookup => info_span!("lookup"),
        Phase::FetchRss => info_span!("fetch_rss"),
        Phase::ParseRss => info_span!("parse_rss"),
        Phase::WriteArticles => info_span!("write_articles"),
        Phase::Touch => info_span!("touch"),
    }}
}

impl OpMarker for Refresh {
    const NAME: &'static str = "refresh";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("refresh") }
}
