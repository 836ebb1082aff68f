use std::{
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
    process::{Child, ChildStdin, Command, Stdio},
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use lazy_static::lazy_static;
use regex::Regex;

use crate::prelude::*;

pub const ENGINE_READY_TIMEOUT: Duration = Duration::from_secs(30);
pub const ENGINE_QUIT_TIMEOUT: Duration = Duration::from_millis(300);
pub const ENGINE_QUIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

lazy_static! {
    static ref OPTION: Regex = Regex::new(
        r"^option\s+name\s+(?<name>.+?)\s+type\s+(?<kind>\S+)(?:\s+default(?:\s+(?<default>.*?))?)?(?:\s+(?:min|max|var)\s.*)?$"
    )
    .unwrap();
}

/// The search currently running in the engine.
struct Search
{
    snapshot: InfoSnapshot,
    started:  Instant,
    stopping: bool,
}

/// An engine process spoken to over UCI.
pub struct UciEngine
{
    child:    Child,
    stdin:    BufWriter<ChildStdin>,
    rx:       Receiver<String>,
    name:     String,
    defaults: EngineOptions,
    multipv:  Option<usize>,
    search:   Option<Search>,
}

impl UciEngine
{
    /// Starts the engine at `path` and runs the UCI handshake.
    pub fn spawn(path: &Path) -> Result<UciEngine>
    {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::from(e).chain(Error::new(
                    Kind::EngineError,
                    format!("could not start engine {}", path.display()),
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::new(Kind::EngineError, "engine has no stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::new(Kind::EngineError, "engine has no stdout".into()))?;

        let (tx, rx) = crossbeam_channel::unbounded::<String>();
        std::thread::spawn(move || {
            for line in BufReader::new(stdout).lines()
            {
                let Ok(line) = line
                else
                {
                    break;
                };
                if tx.send(line).is_err()
                {
                    break;
                }
            }
        });

        let mut engine = UciEngine {
            child,
            stdin: BufWriter::new(stdin),
            rx,
            name: path.display().to_string(),
            defaults: EngineOptions::new(),
            multipv: None,
            search: None,
        };
        engine.handshake()?;
        Ok(engine)
    }

    /// Applies an option set, then waits for the engine to be ready.
    pub fn configure(&mut self, options: &EngineOptions) -> Result<()>
    {
        for (name, value) in options.iter().filter(|(name, _)| !is_multipv(name))
        {
            self.set_option(name, value)?;
        }
        self.sync_ready()
    }

    /// The options the engine declared, at their default values.
    pub fn defaults(&self) -> &EngineOptions
    {
        &self.defaults
    }

    fn handshake(&mut self) -> Result<()>
    {
        self.write_line("uci")?;
        loop
        {
            let line = self.recv_line(ENGINE_READY_TIMEOUT)?;
            if let Some(name) = line.strip_prefix("id name ")
            {
                self.name = name.trim().to_string();
            }
            else if let Some(caps) = OPTION.captures(&line)
            {
                if &caps["kind"] == "button"
                {
                    continue;
                }
                let default = caps.name("default").map_or("", |m| m.as_str());
                self.defaults.insert(&caps["name"], default);
            }
            else if line.trim() == "uciok"
            {
                break;
            }
        }

        log::debug!("Engine {} declared {} options.", self.name, self.defaults.len());
        self.sync_ready()
    }

    fn recv_line(&self, timeout: Duration) -> Result<String>
    {
        self.rx.recv_timeout(timeout).map_err(|e| {
            Error::new(Kind::EngineError, format!("no answer from engine {}: {}", self.name, e))
        })
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<()>
    {
        self.write_line(&format!("setoption name {name} value {value}"))
    }

    fn sync_ready(&mut self) -> Result<()>
    {
        self.write_line("isready")?;
        loop
        {
            if self.recv_line(ENGINE_READY_TIMEOUT)?.trim() == "readyok"
            {
                return Ok(());
            }
        }
    }

    fn write_line(&mut self, msg: &str) -> Result<()>
    {
        log::trace!("> {msg}");
        let written = self
            .stdin
            .write_all(msg.as_bytes())
            .and_then(|_| self.stdin.write_all(b"\n"))
            .and_then(|_| self.stdin.flush());

        written.map_err(|e| {
            Error::from(e).chain(Error::new(Kind::EngineError, format!("could not write to engine {}", self.name)))
        })
    }

    /// Stops any search still running and reads until its bestmove.
    fn drain(&mut self) -> Result<()>
    {
        if self.search.is_none()
        {
            return Ok(());
        }

        self.stop()?;
        while self.search.is_some()
        {
            self.poll(ENGINE_READY_TIMEOUT)?;
        }
        Ok(())
    }
}

impl Engine for UciEngine
{
    fn name(&self) -> &str
    {
        &self.name
    }

    fn start(&mut self, position: &Position, budget: &SearchBudget) -> Result<()>
    {
        self.drain()?;

        if self.multipv != Some(budget.lines)
        {
            self.set_option("MultiPV", &budget.lines.to_string())?;
            self.sync_ready()?;
            self.multipv = Some(budget.lines);
        }

        self.write_line(&format!("position fen {position}"))?;
        self.write_line(&budget.limit.go_command())?;
        self.search = Some(Search {
            snapshot: InfoSnapshot::default(),
            started:  Instant::now(),
            stopping: false,
        });
        Ok(())
    }

    fn poll(&mut self, wait: Duration) -> Result<SearchStatus>
    {
        let deadline = Instant::now() + wait;

        loop
        {
            let Some(search) = self.search.as_mut()
            else
            {
                return Err(Error::new(Kind::InternalError, "polled an engine that is not searching".into()));
            };

            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining)
            {
                | Ok(line) if line.starts_with("info") => search.snapshot.update_from_line(&line),
                | Ok(line) if line.starts_with("bestmove") =>
                {
                    let mut report = SearchReport::from(&search.snapshot);
                    report.elapsed = report.elapsed.max(search.started.elapsed());
                    self.search = None;
                    return Ok(SearchStatus::Finished(report));
                }
                | Ok(line) => log::trace!("< {line}"),
                | Err(RecvTimeoutError::Timeout) =>
                {
                    let mut report = SearchReport::from(&search.snapshot);
                    report.elapsed = search.started.elapsed();
                    return Ok(SearchStatus::Running(report));
                }
                | Err(RecvTimeoutError::Disconnected) =>
                {
                    self.search = None;
                    return Err(Error::new(Kind::EngineError, format!("engine {} exited unexpectedly", self.name)));
                }
            }
        }
    }

    fn stop(&mut self) -> Result<()>
    {
        match self.search.as_mut()
        {
            | Some(search) if !search.stopping => search.stopping = true,
            | _ => return Ok(()),
        }
        self.write_line("stop")
    }
}

impl Drop for UciEngine
{
    fn drop(&mut self)
    {
        let _ = self.write_line("quit");
        let deadline = Instant::now() + ENGINE_QUIT_TIMEOUT;
        while Instant::now() < deadline
        {
            if let Ok(Some(_)) = self.child.try_wait()
            {
                return;
            }
            std::thread::sleep(ENGINE_QUIT_POLL_INTERVAL);
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
