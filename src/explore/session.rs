use std::time::{Duration, Instant};

use crate::prelude::*;

#[derive(Clone, Debug)]
/// Progress bookkeeping for one exploration.
///
/// `total` starts as the worst-case number of positions the schedule allows and shrinks as subtrees turn out to be
/// unneeded; once the exploration is over it equals `visited`.
pub struct Session
{
    pub visited:        u64,
    pub total:          u64,
    pub searches:       u64,
    pub cache_hits:     u64,
    pub transpositions: u64,
    limit:              Limit,
    nps:                f64,
    started:            Instant,
    last_report:        Option<Instant>,
}

impl Session
{
    /// How often live search progress is logged.
    pub const REPORT_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(total: u64, limit: Limit) -> Session
    {
        Session {
            visited: 0,
            total,
            searches: 0,
            cache_hits: 0,
            transpositions: 0,
            limit,
            nps: 0.0,
            started: Instant::now(),
            last_report: None,
        }
    }

    pub fn elapsed(&self) -> Duration
    {
        self.started.elapsed()
    }

    /// An estimate of the time left, if there is anything to base it on.
    pub fn eta(&self) -> Option<Duration>
    {
        let remaining = self.remaining() as f64;
        let seconds = match self.limit
        {
            | Limit::Time(ms) => remaining * ms as f64 / 1000.0,
            | Limit::Nodes(nodes) if self.nps > 0.0 => remaining * nodes as f64 / self.nps,
            | _ if self.visited > 0 => remaining * self.elapsed().as_secs_f64() / self.visited as f64,
            | _ => return None,
        };
        Some(Duration::from_secs_f64(seconds.max(0.0)))
    }

    /// Takes `nodes` positions out of the worst-case total.
    pub fn prune(&mut self, nodes: u64)
    {
        self.total = self.total.saturating_sub(nodes);
    }

    pub fn record_hit(&mut self)
    {
        self.cache_hits += 1;
    }

    /// Counts a finished engine search and folds its throughput into the average.
    pub fn record_search(&mut self, report: &SearchReport)
    {
        self.searches += 1;

        let nps = match report.nps
        {
            | 0 if !report.elapsed.is_zero() => report.nodes as f64 / report.elapsed.as_secs_f64(),
            | nps => nps as f64,
        };
        if nps > 0.0
        {
            self.nps += (nps - self.nps) / self.searches as f64;
        }
    }

    pub fn record_transposition(&mut self)
    {
        self.transpositions += 1;
    }

    /// Positions still to visit in the worst case.
    pub fn remaining(&self) -> u64
    {
        self.total.saturating_sub(self.visited)
    }

    /// Counts a position and logs the overall progress.
    pub fn visit(&mut self)
    {
        self.visited += 1;

        let (hours, minutes) = match self.eta()
        {
            | Some(eta) => (eta.as_secs() / 3600, (eta.as_secs() / 60) % 60),
            | None => (0, 0),
        };
        log::info!(
            "Analysing position {} of {}, estimated time remaining: {}h {}m.",
            self.visited,
            self.total,
            hours,
            minutes
        );
    }

    /// Logs the state of a running search, at most once per interval.
    pub fn report_search(&mut self, report: &SearchReport)
    {
        let now = Instant::now();
        if self.last_report.is_some_and(|last| now.duration_since(last) < Self::REPORT_INTERVAL)
        {
            return;
        }
        self.last_report = Some(now);

        let done = match self.limit
        {
            | Limit::Nodes(n) => report.nodes as f64 / n.max(1) as f64,
            | Limit::Time(ms) => report.elapsed.as_millis() as f64 / ms.max(1) as f64,
            | Limit::Depth(d) => report.depth as f64 / d.max(1) as f64,
        };

        let best = report.lines.first().map(ToString::to_string).unwrap_or_default();
        log::debug!(
            ">> {:.0}% @ {}nodes/s : {}",
            done.min(1.0) * 100.0,
            format_nodes(report.nps),
            best
        );
    }
}

impl std::fmt::Display for Session
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(
            f,
            "{} positions in {:.1}s ({} searches, {} cache hits, {} transpositions, {}nodes/s)",
            self.visited,
            self.elapsed().as_secs_f64(),
            self.searches,
            self.cache_hits,
            self.transpositions,
            format_nodes(self.nps as u64)
        )
    }
}
