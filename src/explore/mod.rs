mod session;
mod tree;

use std::time::{Duration, Instant};

pub use session::Session;
pub use tree::SessionTree;

use crate::prelude::*;

/// Drives an engine over a position and its best continuations, down to a fixed number of plies.
///
/// Every position is searched once under the same budget. The schedule decides how many of its lines are followed,
/// the pruning policy which of them are kept and which end the descent, and the cache, when present, races the engine
/// for a stored answer.
pub struct Explorator<'a>
{
    engine:   &'a mut dyn Engine,
    rules:    &'a dyn Rules,
    schedule: &'a Schedule,
    policy:   &'a dyn PruningPolicy,
    cache:    Option<&'a Cache>,
    limit:    Limit,
    session:  Option<Session>,
    path:     Vec<Digest>,
}

impl<'a> Explorator<'a>
{
    /// How long each poll of the engine may block.
    pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

    /// How long a stopped search may take to wind down.
    pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

    /// Occurrences of a position along the current line that draw the game.
    pub const REPETITION_DRAW: usize = 3;

    pub fn new(
        engine: &'a mut dyn Engine,
        rules: &'a dyn Rules,
        schedule: &'a Schedule,
        policy: &'a dyn PruningPolicy,
        limit: Limit,
    ) -> Explorator<'a>
    {
        Explorator {
            engine,
            rules,
            schedule,
            policy,
            cache: None,
            limit,
            session: None,
            path: Vec::new(),
        }
    }

    pub fn with_cache(mut self, cache: &'a Cache) -> Explorator<'a>
    {
        self.cache = Some(cache);
        self
    }

    /// The budget every search of the session runs under.
    pub fn budget(&self) -> SearchBudget
    {
        SearchBudget::new(self.limit, self.schedule.max_branch_factor())
    }

    /// The bookkeeping of the last exploration.
    pub fn session(&self) -> Option<&Session>
    {
        self.session.as_ref()
    }

    /// Explores `root` for `depth` plies and returns the lines found for every position on the way.
    pub fn explore(&mut self, root: &Position, depth: u32) -> Result<SessionTree>
    {
        let side = self.rules.side_to_move(root)?;
        let mut session = Session::new(self.schedule.worst_case_nodes(side, depth as i32), self.limit);
        let mut tree = SessionTree::new(root.digest());
        self.path.clear();

        log::info!(
            "Exploring {} for {} plies with {} per position and schedule {}.",
            root,
            depth,
            self.budget(),
            self.schedule
        );

        let explored = self.visit(&mut session, &mut tree, root, depth);
        let flushed = match self.cache
        {
            | Some(cache) => cache.wait_write(),
            | None => Ok(()),
        };

        log::info!("Explored {session}.");
        self.session = Some(session);

        explored?;
        flushed?;
        Ok(tree)
    }

    /// The worst-case size of the subtree below a position, or nothing if no plies are left.
    fn subtree(&self, side: Side, depth: u32) -> u64
    {
        match depth
        {
            | 0 => 0,
            | d => self.schedule.worst_case_nodes(side, d as i32),
        }
    }

    fn visit(&mut self, session: &mut Session, tree: &mut SessionTree, position: &Position, depth: u32) -> Result<()>
    {
        if depth == 0
        {
            return Ok(());
        }

        let side = self.rules.side_to_move(position)?;
        session.visit();

        if tree.contains(&position.digest())
        {
            log::debug!("Transposition to {position}.");
            session.record_transposition();
            session.prune(self.schedule.worst_case_nodes(side, depth as i32) - 1);
            return Ok(());
        }

        let requested = self.schedule.branch_factor(side, depth as i32);
        let lines = self.resolve(session, position, side, requested)?;

        let child_subtree = self.subtree(side.flip(), depth - 1);
        if lines.len() < requested
        {
            session.prune((requested - lines.len()) as u64 * child_subtree);
        }

        let move_number = self.rules.move_number(position)?;
        let retained = self.policy.retain_lines(lines.clone(), side, move_number);
        if retained.len() < lines.len()
        {
            log::debug!("Cutoff kept {} of {} lines in {}.", retained.len(), lines.len(), position);
            session.prune((lines.len() - retained.len()) as u64 * child_subtree);
        }

        tree.insert(position.digest(), retained.clone());
        self.path.push(self.rules.repetition_key(position));

        for line in retained.iter().take(requested)
        {
            let Some(mv) = line.first()
            else
            {
                session.prune(child_subtree);
                continue;
            };

            let child = match self.rules.play(position, mv)
            {
                | Ok(child) => child,
                | Err(err) =>
                {
                    self.report_fault(position, mv, depth, requested, &err);
                    return Err(err);
                }
            };

            if self.rules.is_terminal(&child)? || self.repeats(&child) || self.policy.stop_recursion(line.score)
            {
                session.prune(child_subtree);
                continue;
            }

            self.visit(session, tree, &child, depth - 1)?;
        }

        self.path.pop();
        Ok(())
    }

    /// Whether reaching `child` from the current line completes a repetition draw.
    fn repeats(&self, child: &Position) -> bool
    {
        let key = self.rules.repetition_key(child);
        self.path.iter().filter(|seen| **seen == key).count() + 1 >= Self::REPETITION_DRAW
    }

    /// Gets the lines of a position from the cache or the engine, whichever answers first.
    fn resolve(&mut self, session: &mut Session, position: &Position, side: Side, requested: usize) -> Result<Vec<ResultLine>>
    {
        let budget = self.budget();

        let mut pending = match self.cache
        {
            | Some(cache) => Some(cache.lookup(position, &budget.with_lines(requested))?),
            | None => None,
        };

        self.engine.start(position, &budget)?;
        let report = loop
        {
            match self.engine.poll(Self::POLL_INTERVAL)?
            {
                | SearchStatus::Finished(report) => break report,
                | SearchStatus::Running(report) =>
                {
                    if pending.as_mut().is_some_and(|lookup| lookup.poll())
                    {
                        log::debug!("Cache answered for {position}, stopping the engine.");
                        self.engine.stop()?;
                        break self.drain()?;
                    }
                    session.report_search(&report);
                }
            }
        };

        if let Some(hit) = pending.and_then(|lookup| lookup.into_hit())
        {
            session.record_hit();
            log::debug!("Cache hit for {} from {} ({} nodes).", position, hit.budget, format_nodes(hit.nodes));
            return Ok(hit.lines);
        }

        session.record_search(&report);
        let lines = report.normalized(side);
        if let Some(best) = lines.first()
        {
            log::debug!("{position}: {best} @ {}nodes/s.", format_nodes(report.nps));
        }

        if let Some(cache) = self.cache
        {
            cache.save(position, &budget, report.nodes, &lines)?;
        }

        Ok(lines.into_iter().take(requested).collect())
    }

    /// Waits for a stopped search to come back.
    fn drain(&mut self) -> Result<SearchReport>
    {
        let deadline = Instant::now() + Self::DRAIN_TIMEOUT;
        loop
        {
            match self.engine.poll(Self::POLL_INTERVAL)?
            {
                | SearchStatus::Finished(report) => return Ok(report),
                | SearchStatus::Running(_) if Instant::now() >= deadline =>
                {
                    let err_msg = format!("engine {} did not stop its search", self.engine.name());
                    return Err(Error::new(Kind::EngineError, err_msg));
                }
                | SearchStatus::Running(_) => (),
            }
        }
    }

    /// Logs everything needed to reproduce a fault on a move the engine suggested.
    fn report_fault(&self, position: &Position, mv: &str, depth: u32, requested: usize, err: &Error)
    {
        log::error!(
            "Bad move {} in [{}] from \"{}\" with {} ({} lines requested, {} plies left): {}",
            mv,
            position,
            self.engine.name(),
            self.budget(),
            requested,
            depth,
            err
        );
    }
}
