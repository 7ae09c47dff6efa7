//! Shared helpers for integration tests
//!
//! [`ScriptedOracle`] answers `top_moves` from a script keyed by the
//! placement and side-to-move fields of the FEN, so tests don't depend on
//! the move clocks. Each key holds a queue of replies; the last reply
//! repeats once the queue is down to one. A search whose tag was passed to
//! `interrupt` while it ran fails with `OracleError::Interrupted`.

#![allow(dead_code)]

use async_trait::async_trait;
use chess_predictor::core::AnalysisSettings;
use chess_predictor::game::ai::{Oracle, OracleError, OracleResult, RankedMove, Score, SearchTag};
use chess_predictor::{AnalysisSession, SessionEvent};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const AFTER_E4_FEN: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

/// One scripted answer
#[derive(Debug, Clone)]
pub struct Reply {
    pub delay: Duration,
    pub moves: Vec<RankedMove>,
}

impl Reply {
    pub fn now(moves: &[&str]) -> Self {
        Self::after(Duration::ZERO, moves)
    }

    /// Candidates scored 40, 30, 20... centipawns, best first
    pub fn after(delay: Duration, moves: &[&str]) -> Self {
        let moves = moves
            .iter()
            .enumerate()
            .map(|(i, uci)| RankedMove::new(*uci, Score::Centipawns(40 - 10 * i as i32)))
            .collect();
        Self { delay, moves }
    }
}

/// A recorded `top_moves` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub key: String,
    pub n: usize,
    pub depth: u32,
    pub tag: SearchTag,
}

#[derive(Default)]
pub struct ScriptedOracle {
    script: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
    completed: AtomicUsize,
    interrupts: AtomicUsize,
    stopped: Mutex<Vec<SearchTag>>,
}

/// Placement and side to move, e.g. `"rnbqkbnr/.../RNBQKBNR w"`
pub fn fen_key(fen: &str) -> String {
    fen.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

impl ScriptedOracle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, fen: &str, reply: Reply) {
        self.script
            .lock()
            .entry(fen_key(fen))
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn interrupts(&self) -> usize {
        self.interrupts.load(Ordering::SeqCst)
    }

    /// Tags passed to `interrupt`, in call order
    pub fn stopped(&self) -> Vec<SearchTag> {
        self.stopped.lock().clone()
    }

    fn next_reply(&self, key: &str) -> Option<Reply> {
        let mut script = self.script.lock();
        let queue = script.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn top_moves(
        &self,
        fen: &str,
        n: usize,
        depth: u32,
        tag: SearchTag,
    ) -> OracleResult<Vec<RankedMove>> {
        let key = fen_key(fen);
        self.calls.lock().push(Call {
            key: key.clone(),
            n,
            depth,
            tag,
        });

        let reply = self.next_reply(&key);
        if let Some(reply) = &reply {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        if self.stopped.lock().contains(&tag) {
            return Err(OracleError::Interrupted);
        }
        match reply {
            Some(reply) => Ok(reply.moves.into_iter().take(n).collect()),
            None => Err(OracleError::Protocol {
                message: format!("no script for {}", key),
            }),
        }
    }

    async fn interrupt(&self, tag: SearchTag) -> OracleResult<()> {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
        self.stopped.lock().push(tag);
        Ok(())
    }
}

/// Session backed by `oracle` (or none) on its own runtime
pub fn session_with(oracle: Option<Arc<ScriptedOracle>>) -> (Runtime, AnalysisSession) {
    let runtime = Runtime::new().unwrap();
    let oracle = oracle.map(|o| o as Arc<dyn Oracle>);
    let session = AnalysisSession::new(&AnalysisSettings::default(), oracle, runtime.handle().clone());
    (runtime, session)
}

/// Pump `session.update()` until `done` holds for the collected events
///
/// Panics after two seconds.
pub fn pump_until(
    session: &mut AnalysisSession,
    mut done: impl FnMut(&[SessionEvent]) -> bool,
) -> Vec<SessionEvent> {
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut events = Vec::new();
    loop {
        events.extend(session.update());
        if done(&events) {
            return events;
        }
        assert!(
            Instant::now() < deadline,
            "timed out waiting for session events, got {:?}",
            events
        );
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Block until the oracle has received `count` queries
pub fn wait_for_calls(oracle: &ScriptedOracle, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while oracle.calls().len() < count {
        assert!(Instant::now() < deadline, "oracle saw only {} queries", oracle.calls().len());
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// Wait until the oracle has finished `count` queries, then drain the session
pub fn settle(session: &mut AnalysisSession, oracle: &ScriptedOracle, count: usize) -> Vec<SessionEvent> {
    let deadline = Instant::now() + Duration::from_secs(2);
    while oracle.completed() < count {
        assert!(Instant::now() < deadline, "oracle finished only {} queries", oracle.completed());
        std::thread::sleep(Duration::from_millis(5));
    }
    // let the finished tasks post their events
    std::thread::sleep(Duration::from_millis(50));
    session.update()
}
