use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use crossbeam_channel::{Receiver, Sender};
use dashmap::DashMap;
use rusqlite::Connection;

use super::{
    entry::{select_best, CacheHit, StoredEntry},
    store,
};
use crate::prelude::*;

/// A search result waiting to be written.
pub struct Record
{
    pub digest: Digest,
    pub fen:    String,
    pub budget: SearchBudget,
    pub nodes:  u64,
    pub data:   String,
}

pub enum WriteOp
{
    Save(Record),
    Flush(Sender<()>),
    Shutdown,
}

pub struct ReadOp
{
    pub generation: u64,
    pub digest:     Digest,
    pub budget:     SearchBudget,
    pub reply:      Sender<Option<CacheHit>>,
}

/// What the cache handle and its threads share.
pub struct Shared
{
    pub config_id:  i64,
    pub generation: AtomicU64,
    pub hot:        mini_moka::sync::Cache<Digest, Arc<Vec<StoredEntry>>>,
    pub served:     DashMap<Digest, Vec<SearchBudget>>,
    pub writes:     AtomicU64,
    error:          Mutex<Option<Error>>,
}

impl Shared
{
    pub fn new(config_id: i64, memory_bytes: u64) -> Shared
    {
        let hot = mini_moka::sync::Cache::builder()
            .max_capacity(memory_bytes)
            .weigher(|_: &Digest, entries: &Arc<Vec<StoredEntry>>| Shared::weigh(entries))
            .build();

        Shared {
            config_id,
            generation: AtomicU64::new(0),
            hot,
            served: DashMap::new(),
            writes: AtomicU64::new(0),
            error: Mutex::new(None),
        }
    }

    /// A rough byte size for a memoized row set.
    fn weigh(entries: &[StoredEntry]) -> u32
    {
        let bytes: usize = entries
            .iter()
            .map(|entry| 64 + entry.lines.iter().map(|line| 16 + 8 * line.moves.len()).sum::<usize>())
            .sum();
        bytes.min(u32::MAX as usize) as u32
    }

    /// Returns the first failure any cache thread ran into.
    pub fn check(&self) -> Result<()>
    {
        match self.error.lock().unwrap_or_else(PoisonError::into_inner).as_ref()
        {
            | Some(err) => Err(err.clone()),
            | None => Ok(()),
        }
    }

    /// Records a failure; only the first one is kept.
    pub fn fail(&self, err: Error)
    {
        let mut slot = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none()
        {
            log::error!("Cache failure: {err}");
            *slot = Some(err);
        }
    }

    pub fn failed(&self) -> bool
    {
        self.check().is_err()
    }

    pub fn is_current(&self, generation: u64) -> bool
    {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Remembers the stored budget a hit for `digest` was served from.
    pub fn mark_served(&self, digest: Digest, budget: SearchBudget)
    {
        self.served.entry(digest).or_default().push(budget);
    }

    /// Whether a result already served for `digest` covers everything a search under `budget` would store.
    pub fn was_served(&self, digest: &Digest, budget: &SearchBudget) -> bool
    {
        self.served
            .get(digest)
            .is_some_and(|served| served.iter().any(|stored| stored.satisfies(budget)))
    }
}

/// Serves writes one at a time until shut down.
pub fn write_loop(mut conn: Connection, rx: Receiver<WriteOp>, shared: Arc<Shared>)
{
    for op in rx
    {
        match op
        {
            | WriteOp::Save(record) =>
            {
                if shared.failed()
                {
                    continue;
                }
                match store::insert(&mut conn, shared.config_id, &record)
                {
                    | Ok(inserted) =>
                    {
                        shared.writes.fetch_add(1, Ordering::AcqRel);
                        shared.hot.invalidate(&record.digest);
                        log::trace!("Cache write for {} ({}): inserted {}.", record.digest, record.budget, inserted);
                    }
                    | Err(err) => shared.fail(err),
                }
            }
            | WriteOp::Flush(ack) =>
            {
                let _ = ack.send(());
            }
            | WriteOp::Shutdown => break,
        }
    }
}

/// Answers lookups, skipping any that a newer lookup has superseded.
pub fn read_loop(conn: Connection, rx: Receiver<ReadOp>, shared: Arc<Shared>)
{
    while let Ok(mut op) = rx.recv()
    {
        // Older queued lookups are dropped, which their callers see as a miss.
        while let Ok(newer) = rx.try_recv()
        {
            op = newer;
        }

        if !shared.is_current(op.generation) || shared.failed()
        {
            continue;
        }

        let entries = match shared.hot.get(&op.digest)
        {
            | Some(entries) => entries,
            | None =>
            {
                let writes = shared.writes.load(Ordering::Acquire);
                match store::candidates(&conn, shared.config_id, op.digest)
                {
                    | Ok(entries) =>
                    {
                        let entries = Arc::new(entries);
                        if !entries.is_empty()
                        {
                            shared.hot.insert(op.digest, entries.clone());
                            // A write that landed while the rows were read may have been invalidated before they were
                            // memoized.
                            if shared.writes.load(Ordering::Acquire) != writes
                            {
                                shared.hot.invalidate(&op.digest);
                            }
                        }
                        entries
                    }
                    | Err(err) =>
                    {
                        shared.fail(err);
                        continue;
                    }
                }
            }
        };

        let _ = op.reply.send(select_best(&entries, &op.budget));
    }
}
