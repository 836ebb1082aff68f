mod entry;
mod schema;
mod store;
mod worker;

use std::{
    path::{Path, PathBuf},
    sync::{atomic::Ordering, Arc},
    thread::JoinHandle,
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
pub use entry::{select_best, CacheHit, StoredEntry};
pub use schema::SCHEMA_VERSION;
use worker::{ReadOp, Record, Shared, WriteOp};

use crate::prelude::*;

/// A persistent store of search results, keyed by engine configuration, search budget and position.
///
/// Writes go through a single writer thread in the order they were queued; lookups run on a separate reader thread
/// and only the most recent one is answered.
pub struct Cache
{
    path:     PathBuf,
    shared:   Arc<Shared>,
    write_tx: Option<Sender<WriteOp>>,
    read_tx:  Option<Sender<ReadOp>>,
    threads:  Vec<JoinHandle<()>>,
}

impl Cache
{
    /// Opens (or initializes) the store at `path` and registers the session's engine configuration.
    pub fn open(path: &Path, config: &EngineConfig, memory_mib: u64) -> Result<Cache>
    {
        let mut writer = schema::prepare(path)?;
        let config_id = store::register(&mut writer, config)?;
        let reader = schema::connect(path)?;

        log::debug!("Cache {} opened for {} as configuration {}.", path.display(), config, config_id);

        let shared = Arc::new(Shared::new(config_id, memory_mib.saturating_mul(1024 * 1024)));
        let (write_tx, write_rx) = crossbeam_channel::unbounded();
        let (read_tx, read_rx) = crossbeam_channel::unbounded();

        let threads = vec![
            {
                let shared = shared.clone();
                std::thread::spawn(move || worker::write_loop(writer, write_rx, shared))
            },
            {
                let shared = shared.clone();
                std::thread::spawn(move || worker::read_loop(reader, read_rx, shared))
            },
        ];

        Ok(Cache {
            path: path.to_path_buf(),
            shared,
            write_tx: Some(write_tx),
            read_tx: Some(read_tx),
            threads,
        })
    }

    /// Returns the first failure of any background operation.
    pub fn check(&self) -> Result<()>
    {
        self.shared.check()
    }

    /// Waits for outstanding writes, then shuts the store down.
    pub fn close(mut self) -> Result<()>
    {
        let flushed = self.wait_write();
        self.shutdown();
        flushed?;
        self.check()
    }

    pub fn config_id(&self) -> i64
    {
        self.shared.config_id
    }

    /// Starts looking up a stored result that satisfies `budget` for `position`.
    ///
    /// Any earlier lookup that has not been answered yet is cancelled.
    pub fn lookup(&self, position: &Position, budget: &SearchBudget) -> Result<PendingLookup>
    {
        self.check()?;

        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let (reply, rx) = crossbeam_channel::bounded(1);
        let op = ReadOp {
            generation,
            digest: position.digest(),
            budget: *budget,
            reply,
        };

        let Some(read_tx) = self.read_tx.as_ref()
        else
        {
            return Err(self.closed());
        };
        read_tx.send(op).map_err(|_| self.closed())?;

        Ok(PendingLookup {
            generation,
            digest: position.digest(),
            rx,
            shared: self.shared.clone(),
            answer: None,
        })
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    /// Queues a search result to be stored, unless a result already served for this position covers its budget.
    pub fn save(&self, position: &Position, budget: &SearchBudget, nodes: u64, lines: &[ResultLine]) -> Result<()>
    {
        self.check()?;

        if self.shared.was_served(&position.digest(), budget)
        {
            log::trace!("Skipping cache write for {}, already served.", position.digest());
            return Ok(());
        }

        let record = Record {
            digest: position.digest(),
            fen: position.text().to_string(),
            budget: *budget,
            nodes,
            data: serde_json::to_string(lines)?,
        };

        let Some(write_tx) = self.write_tx.as_ref()
        else
        {
            return Err(self.closed());
        };
        write_tx.send(WriteOp::Save(record)).map_err(|_| self.closed())
    }

    /// Blocks until every write queued so far has been committed.
    pub fn wait_write(&self) -> Result<()>
    {
        let Some(write_tx) = self.write_tx.as_ref()
        else
        {
            return Err(self.closed());
        };

        let (ack, done) = crossbeam_channel::bounded(1);
        write_tx.send(WriteOp::Flush(ack)).map_err(|_| self.closed())?;
        done.recv().map_err(|_| self.closed())?;
        self.check()
    }

    fn closed(&self) -> Error
    {
        Error::new(Kind::CacheError, format!("cache {} is closed", self.path.display()))
    }

    fn shutdown(&mut self)
    {
        if let Some(write_tx) = self.write_tx.take()
        {
            let _ = write_tx.send(WriteOp::Shutdown);
        }
        self.read_tx = None;

        for handle in self.threads.drain(..)
        {
            if handle.join().is_err()
            {
                self.shared.fail(Error::new(Kind::InternalError, "a cache thread panicked".into()));
            }
        }
    }
}

impl Drop for Cache
{
    fn drop(&mut self)
    {
        self.shutdown();
    }
}

/// A lookup running in the background.
pub struct PendingLookup
{
    generation: u64,
    digest:     Digest,
    rx:         Receiver<Option<CacheHit>>,
    shared:     Arc<Shared>,
    answer:     Option<Option<CacheHit>>,
}

impl PendingLookup
{
    /// Collects the answer if it has arrived, returning whether it is a hit.
    pub fn poll(&mut self) -> bool
    {
        if self.answer.is_none()
        {
            match self.rx.try_recv()
            {
                | Ok(answer) => self.answer = Some(answer),
                | Err(TryRecvError::Disconnected) => self.answer = Some(None),
                | Err(TryRecvError::Empty) if !self.shared.is_current(self.generation) => self.answer = Some(None),
                | Err(TryRecvError::Empty) => (),
            }
        }
        self.is_hit()
    }

    /// Waits up to `timeout` for the answer, returning whether it is a hit.
    pub fn wait(&mut self, timeout: Duration) -> bool
    {
        if self.answer.is_none()
        {
            match self.rx.recv_timeout(timeout)
            {
                | Ok(answer) => self.answer = Some(answer),
                | Err(RecvTimeoutError::Disconnected) => self.answer = Some(None),
                | Err(RecvTimeoutError::Timeout) => (),
            }
        }
        self.is_hit()
    }

    pub fn is_hit(&self) -> bool
    {
        matches!(self.answer, Some(Some(_)))
    }

    /// Whether the lookup has come back, hit or miss.
    pub fn is_settled(&self) -> bool
    {
        self.answer.is_some()
    }

    /// Takes the answer if it is a hit, marking it as served.
    pub fn into_hit(mut self) -> Option<CacheHit>
    {
        self.poll();
        let hit = self.answer.take().flatten()?;
        self.shared.mark_served(self.digest, hit.budget);
        Some(hit)
    }
}
