//! UCI engine process adapter
//!
//! Drives an external UCI engine (Stockfish or compatible) over stdin/stdout
//! with `tokio::process`. Implements [`Oracle`].
//!
//! # Protocol
//!
//! ```text
//! open:      uci -> id name ... -> uciok
//!            setoption name Skill Level value N
//!            isready -> readyok
//! top_moves: setoption name MultiPV value N
//!            isready -> readyok
//!            position fen <fen>
//!            go depth <d> -> info ... multipv k ... pv <move> ... -> bestmove
//! interrupt: stop
//! shutdown:  quit
//! ```
//!
//! One query owns the engine's output stream at a time. The running query's
//! [`SearchTag`] is recorded next to it; `interrupt` sends `stop` only when
//! the tag matches, and a search that received `stop` reports
//! [`OracleError::Interrupted`].

use super::oracle::{Oracle, OracleError, OracleResult, RankedMove, Score, SearchTag};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

const RESYNC_TIMEOUT: Duration = Duration::from_secs(2);
const QUIT_TIMEOUT: Duration = Duration::from_millis(500);

/// One parsed `info` line that carries a scored principal variation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    pub depth: u32,
    pub multipv: usize,
    pub score: Score,
    pub first_move: String,
}

/// Parse a UCI `info` line
///
/// Returns `None` for lines without a score and a principal variation, and
/// for bound scores (`lowerbound`/`upperbound`), which are not final.
///
/// # Examples
///
/// ```
/// use chess_predictor::game::ai::{parse_info, Score};
///
/// let line = "info depth 12 seldepth 18 multipv 2 score cp -15 nodes 1000 pv d7d5 c2c4";
/// let info = parse_info(line).unwrap();
/// assert_eq!(info.multipv, 2);
/// assert_eq!(info.score, Score::Centipawns(-15));
/// assert_eq!(info.first_move, "d7d5");
/// ```
pub fn parse_info(line: &str) -> Option<InfoLine> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "info" {
        return None;
    }

    let mut depth = None;
    let mut multipv = 1;
    let mut score = None;
    let mut first_move = None;

    while let Some(token) = tokens.next() {
        match token {
            "depth" => depth = tokens.next().and_then(|v| v.parse().ok()),
            "multipv" => multipv = tokens.next().and_then(|v| v.parse().ok())?,
            "score" => {
                let kind = tokens.next()?;
                let value: i32 = tokens.next()?.parse().ok()?;
                score = match kind {
                    "cp" => Some(Score::Centipawns(value)),
                    "mate" => Some(Score::Mate(value)),
                    _ => None,
                };
            }
            "lowerbound" | "upperbound" => return None,
            "pv" => {
                first_move = tokens.next().map(str::to_string);
                break;
            }
            // "string" swallows the rest of the line
            "string" => return None,
            _ => {}
        }
    }

    Some(InfoLine {
        depth: depth.unwrap_or(0),
        multipv,
        score: score?,
        first_move: first_move?,
    })
}

/// Search currently owning the engine
#[derive(Debug, Clone, Copy)]
struct RunningSearch {
    tag: SearchTag,
    stopped: bool,
}

/// External engine process speaking UCI
pub struct UciEngine {
    name: String,
    path: PathBuf,
    stdin: Mutex<ChildStdin>,
    session: Mutex<Lines<BufReader<ChildStdout>>>,
    running: Mutex<Option<RunningSearch>>,
    child: Mutex<Child>,
    timeout: Duration,
}

impl UciEngine {
    /// Start the engine and complete the handshake
    ///
    /// `skill_level` is forwarded as the `Skill Level` option when set.
    pub async fn spawn(
        path: impl AsRef<Path>,
        skill_level: Option<u8>,
        query_timeout: Duration,
    ) -> OracleResult<Self> {
        let path = path.as_ref().to_path_buf();
        info!("[ORACLE] Starting engine {:?}", path);

        let mut child = Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OracleError::Spawn {
                path: path.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| OracleError::Protocol {
            message: "engine stdin unavailable".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| OracleError::Protocol {
            message: "engine stdout unavailable".to_string(),
        })?;

        let mut engine = Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "engine".to_string()),
            path,
            stdin: Mutex::new(stdin),
            session: Mutex::new(BufReader::new(stdout).lines()),
            running: Mutex::new(None),
            child: Mutex::new(child),
            timeout: query_timeout,
        };

        let name = timeout(query_timeout, engine.handshake(skill_level))
            .await
            .map_err(|_| OracleError::Timeout {
                ms: query_timeout.as_millis() as u64,
            })??;
        if let Some(name) = name {
            engine.name = name;
        }

        info!("[ORACLE] Engine ready: {}", engine.name);
        Ok(engine)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn handshake(&self, skill_level: Option<u8>) -> OracleResult<Option<String>> {
        let mut lines = self.session.lock().await;

        self.send("uci").await?;
        let mut name = None;
        loop {
            let line = Self::read_line(&mut lines).await?;
            if let Some(rest) = line.strip_prefix("id name ") {
                name = Some(rest.trim().to_string());
            } else if line.trim() == "uciok" {
                break;
            }
        }

        if let Some(level) = skill_level {
            self.send(&format!("setoption name Skill Level value {}", level))
                .await?;
        }
        self.wait_ready(&mut lines).await?;
        Ok(name)
    }

    async fn send(&self, command: &str) -> OracleResult<()> {
        let mut stdin = self.stdin.lock().await;
        debug!("[ORACLE] > {}", command);
        stdin.write_all(command.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn read_line(lines: &mut Lines<BufReader<ChildStdout>>) -> OracleResult<String> {
        match lines.next_line().await? {
            Some(line) => Ok(line),
            None => Err(OracleError::Closed),
        }
    }

    async fn wait_ready(&self, lines: &mut Lines<BufReader<ChildStdout>>) -> OracleResult<()> {
        self.send("isready").await?;
        loop {
            if Self::read_line(lines).await?.trim() == "readyok" {
                return Ok(());
            }
        }
    }

    async fn search(
        &self,
        lines: &mut Lines<BufReader<ChildStdout>>,
        fen: &str,
        n: usize,
        depth: u32,
    ) -> OracleResult<Vec<RankedMove>> {
        self.send(&format!("setoption name MultiPV value {}", n.max(1)))
            .await?;
        self.wait_ready(lines).await?;
        self.send(&format!("position fen {}", fen)).await?;
        self.send(&format!("go depth {}", depth.max(1))).await?;

        // Deepest line seen for each MultiPV slot
        let mut best: BTreeMap<usize, InfoLine> = BTreeMap::new();
        loop {
            let line = Self::read_line(lines).await?;
            if let Some(rest) = line.strip_prefix("bestmove") {
                if rest.split_whitespace().next() == Some("(none)") {
                    return Ok(Vec::new());
                }
                break;
            }
            if let Some(info) = parse_info(&line) {
                let replace = best
                    .get(&info.multipv)
                    .map_or(true, |seen| info.depth >= seen.depth);
                if replace {
                    best.insert(info.multipv, info);
                }
            }
        }

        if best.is_empty() {
            return Err(OracleError::Protocol {
                message: "bestmove without any scored line".to_string(),
            });
        }
        Ok(best
            .into_values()
            .take(n)
            .map(|info| RankedMove::new(info.first_move, info.score))
            .collect())
    }

    /// Drain output until the engine reports `bestmove` after a `stop`
    async fn resync(&self, lines: &mut Lines<BufReader<ChildStdout>>) {
        let drained = timeout(RESYNC_TIMEOUT, async {
            loop {
                match Self::read_line(lines).await {
                    Ok(line) if line.starts_with("bestmove") => return true,
                    Ok(_) => continue,
                    Err(_) => return false,
                }
            }
        })
        .await;
        if !matches!(drained, Ok(true)) {
            warn!("[ORACLE] Engine did not settle after stop");
        }
    }
}

#[async_trait]
impl Oracle for UciEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn top_moves(
        &self,
        fen: &str,
        n: usize,
        depth: u32,
        tag: SearchTag,
    ) -> OracleResult<Vec<RankedMove>> {
        let mut lines = self.session.lock().await;
        *self.running.lock().await = Some(RunningSearch {
            tag,
            stopped: false,
        });

        let result = timeout(self.timeout, self.search(&mut lines, fen, n, depth)).await;

        let stopped = self
            .running
            .lock()
            .await
            .take()
            .is_some_and(|running| running.stopped);
        match result {
            Ok(_) if stopped => {
                debug!("[ORACLE] Search {:?} was stopped, discarding its lines", tag);
                Err(OracleError::Interrupted)
            }
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "[ORACLE] Query timed out after {}ms, stopping search",
                    self.timeout.as_millis()
                );
                if self.send("stop").await.is_ok() {
                    self.resync(&mut lines).await;
                }
                Err(OracleError::Timeout {
                    ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn interrupt(&self, tag: SearchTag) -> OracleResult<()> {
        // held while writing so the next search cannot start in between
        let mut running = self.running.lock().await;
        match running.as_mut() {
            Some(search) if search.tag == tag => {
                search.stopped = true;
                self.send("stop").await
            }
            _ => {
                debug!("[ORACLE] {:?} is not running, not stopping", tag);
                Ok(())
            }
        }
    }

    async fn shutdown(&self) -> OracleResult<()> {
        info!("[ORACLE] Shutting down {}", self.name);
        if let Err(e) = self.send("quit").await {
            debug!("[ORACLE] quit not delivered: {}", e);
        }

        let mut child = self.child.lock().await;
        match timeout(QUIT_TIMEOUT, child.wait()).await {
            Ok(Ok(status)) => debug!("[ORACLE] Engine exited with {}", status),
            _ => {
                warn!("[ORACLE] Engine ignored quit, killing process");
                child.kill().await?;
            }
        }
        Ok(())
    }
}
