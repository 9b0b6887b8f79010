// aclink/src/link/exchange.rs

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use log::{debug, error, trace, warn};

use crate::config::LinkConfig;
use crate::constants::RETIRED_SEQUENCE_WINDOW;
use crate::link::sequence::SequenceAllocator;
use crate::link::stats::LinkStats;
use crate::protocol::Frame;
use crate::transport::FrameWriter;
use crate::types::{CommandType, ModuleId, Reply, SequenceId};
use crate::utils::HexDump;
use crate::{Error, Result};

/// Identifies one exchange; also its FIFO ticket number.
pub type ExchangeId = u64;

/// What the dispatcher hands an endpoint for its exchange.
#[derive(Debug)]
pub enum Outcome {
    /// Device is still working; the exchange stays open.
    Pending,
    /// Final reply (`Success` or `Failure`).
    Reply(Reply),
    /// The exchange failed on the wire.
    Failed(Error),
}

/// Where a received frame (or receive error) has to go.
#[derive(Debug)]
pub enum Routing {
    Deliver {
        holder: ModuleId,
        exchange: ExchangeId,
        outcome: Outcome,
    },
    /// Nothing is waiting for it.
    Drop,
}

/// The single outstanding request on the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightRequest {
    pub holder: ModuleId,
    pub expected_sequence_id: Option<SequenceId>,
    /// Still waiting for a final reply or error.
    pub awaiting: bool,
    exchange: ExchangeId,
    answered: bool,
}

impl InFlightRequest {
    pub fn exchange(&self) -> ExchangeId {
        self.exchange
    }
}

/// Proof that the caller holds the link. Handed back to
/// [`LinkLock::end_exchange`] to release it.
#[must_use = "an exchange token must be passed to end_exchange"]
#[derive(Debug)]
pub struct ExchangeToken {
    exchange: ExchangeId,
    module_id: ModuleId,
}

impl ExchangeToken {
    pub fn id(&self) -> ExchangeId {
        self.exchange
    }

    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }
}

struct LinkState {
    next_ticket: u64,
    now_serving: u64,
    in_flight: Option<InFlightRequest>,
    sequence: SequenceAllocator,
    /// Sequence ids of exchanges that ended without a final reply, newest last.
    retired: VecDeque<SequenceId>,
    closed: bool,
}

impl LinkState {
    fn retire(&mut self, seq: SequenceId) {
        if self.retired.len() == RETIRED_SEQUENCE_WINDOW {
            self.retired.pop_front();
        }
        self.retired.push_back(seq);
    }

    fn in_flight_for(&mut self, exchange: ExchangeId) -> Option<&mut InFlightRequest> {
        self.in_flight
            .as_mut()
            .filter(|req| req.exchange == exchange)
    }
}

/// Serializes exchanges over the single physical link.
///
/// Owns the sequence counter, the in-flight slot and the write half of the
/// transport. Waiters are admitted in arrival order.
pub struct LinkLock {
    state: Mutex<LinkState>,
    turn: Condvar,
    writer: Mutex<Box<dyn FrameWriter>>,
    stats: LinkStats,
    config: LinkConfig,
}

impl LinkLock {
    pub fn new(writer: Box<dyn FrameWriter>, config: LinkConfig) -> Self {
        Self {
            state: Mutex::new(LinkState {
                next_ticket: 0,
                now_serving: 0,
                in_flight: None,
                sequence: SequenceAllocator::new(config.initial_sequence),
                retired: VecDeque::with_capacity(RETIRED_SEQUENCE_WINDOW),
                closed: false,
            }),
            turn: Condvar::new(),
            writer: Mutex::new(writer),
            stats: LinkStats::default(),
            config,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    /// Snapshot of the in-flight slot.
    pub fn in_flight(&self) -> Option<InFlightRequest> {
        self.lock_state().in_flight.clone()
    }

    /// Block until the link is free and this caller's turn has come, then
    /// record an in-flight request for `module_id`.
    pub fn begin_exchange(&self, module_id: ModuleId) -> Result<ExchangeToken> {
        let mut state = self.lock_state();
        if state.closed {
            return Err(Error::LinkClosed);
        }
        let ticket = state.next_ticket;
        state.next_ticket += 1;

        while state.now_serving != ticket {
            if state.closed {
                return Err(Error::LinkClosed);
            }
            state = self
                .turn
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.closed {
            state.now_serving += 1;
            self.turn.notify_all();
            return Err(Error::LinkClosed);
        }

        state.in_flight = Some(InFlightRequest {
            holder: module_id,
            expected_sequence_id: None,
            awaiting: false,
            exchange: ticket,
            answered: false,
        });
        debug!("exchange {} begins for {}", ticket, module_id);
        Ok(ExchangeToken {
            exchange: ticket,
            module_id,
        })
    }

    /// Allocate the sequence id for this exchange's frame and start
    /// expecting a reply carrying it.
    pub fn next_sequence(&self, token: &ExchangeToken) -> Result<SequenceId> {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        if state.in_flight_for(token.exchange).is_none() {
            return Err(Error::LinkClosed);
        }
        let seq = state.sequence.next();
        state.retired.retain(|s| *s != seq);
        if let Some(req) = state.in_flight_for(token.exchange) {
            req.expected_sequence_id = Some(seq);
            req.awaiting = true;
        }
        Ok(seq)
    }

    /// Write the exchange's frame to the transport, exactly once. A write
    /// failure aborts the exchange on the spot.
    pub fn transmit(&self, token: &ExchangeToken, frame: &[u8]) -> Result<()> {
        if self.is_closed() {
            self.abort(token);
            return Err(Error::LinkClosed);
        }
        let written = {
            let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
            writer.write(frame)
        };
        match written {
            Ok(()) => {
                self.stats.record_sent();
                trace!("exchange {} wrote: {}", token.exchange, HexDump(frame));
                Ok(())
            }
            Err(e) => {
                error!("exchange {} write failed: {}", token.exchange, e);
                self.abort(token);
                // Writes never close the link; a dead reader does that.
                Err(match e {
                    Error::Transport(_) => e,
                    other => Error::Transport(other.to_string()),
                })
            }
        }
    }

    /// Clear the in-flight slot without handing the turn on.
    fn abort(&self, token: &ExchangeToken) {
        let mut state = self.lock_state();
        if let Some(req) = state.in_flight.take_if(|req| req.exchange == token.exchange) {
            if let Some(seq) = req.expected_sequence_id {
                state.retire(seq);
            }
        }
    }

    /// Release the link and admit the next waiter. Safe on every exit path,
    /// including after a failed transmit.
    pub fn end_exchange(&self, token: ExchangeToken) {
        self.release(&token);
    }

    fn release(&self, token: &ExchangeToken) {
        let mut state = self.lock_state();
        if let Some(req) = state.in_flight.take_if(|req| req.exchange == token.exchange) {
            if !req.answered {
                if let Some(seq) = req.expected_sequence_id {
                    state.retire(seq);
                }
            }
        }
        state.now_serving = state.now_serving.max(token.exchange + 1);
        debug!("exchange {} ends for {}", token.exchange, token.module_id);
        drop(state);
        self.turn.notify_all();
    }

    /// Match a decoded frame against the in-flight request.
    pub fn correlate(&self, frame: Frame) -> Routing {
        let mut guard = self.lock_state();
        let state = &mut *guard;

        let Some(req) = state.in_flight.as_mut().filter(|r| r.awaiting) else {
            self.stats.record_stale();
            debug!(
                "dropping frame seq {} from {}: no exchange waiting",
                frame.sequence_id, frame.module_id
            );
            return Routing::Drop;
        };
        let Some(expected) = req.expected_sequence_id else {
            self.stats.record_stale();
            return Routing::Drop;
        };

        if frame.sequence_id != expected {
            if state.retired.contains(&frame.sequence_id) {
                self.stats.record_stale();
                warn!(
                    "dropping stale reply seq {} (waiting for {})",
                    frame.sequence_id, expected
                );
                return Routing::Drop;
            }
            self.stats.record_out_of_order();
            warn!(
                "out of order reply: expected seq {}, got {}",
                expected, frame.sequence_id
            );
            req.awaiting = false;
            return Routing::Deliver {
                holder: req.holder,
                exchange: req.exchange,
                outcome: Outcome::Failed(Error::OutOfOrder {
                    expected,
                    actual: frame.sequence_id,
                }),
            };
        }

        if frame.module_id != req.holder {
            self.stats.record_out_of_order();
            warn!(
                "reply seq {} addressed to {} but {} holds the link",
                frame.sequence_id, frame.module_id, req.holder
            );
            req.awaiting = false;
            return Routing::Deliver {
                holder: req.holder,
                exchange: req.exchange,
                outcome: Outcome::Failed(Error::ModuleMismatch {
                    expected: req.holder,
                    actual: frame.module_id,
                }),
            };
        }

        let outcome = match frame.command_type {
            CommandType::Pending => {
                debug!("exchange {} pending", req.exchange);
                Outcome::Pending
            }
            CommandType::Command => {
                req.awaiting = false;
                Outcome::Failed(Error::UnexpectedCommandType(CommandType::Command))
            }
            CommandType::Success | CommandType::Failure => {
                req.awaiting = false;
                req.answered = true;
                Outcome::Reply(Reply::new(frame.command_type, frame.payload))
            }
        };
        Routing::Deliver {
            holder: req.holder,
            exchange: req.exchange,
            outcome,
        }
    }

    /// Fail whatever exchange is waiting with `err`.
    pub fn fail_in_flight(&self, err: Error) -> Routing {
        let mut state = self.lock_state();
        match state.in_flight.as_mut().filter(|r| r.awaiting) {
            Some(req) => {
                req.awaiting = false;
                Routing::Deliver {
                    holder: req.holder,
                    exchange: req.exchange,
                    outcome: Outcome::Failed(err),
                }
            }
            None => {
                debug!("no exchange waiting for error: {}", err);
                Routing::Drop
            }
        }
    }

    /// Close the link for good: new exchanges fail with `LinkClosed` and
    /// queued waiters are woken.
    pub fn close(&self) {
        {
            let mut state = self.lock_state();
            if state.closed {
                return;
            }
            state.closed = true;
        }
        debug!("link closing");
        let closed = {
            let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
            writer.close()
        };
        if let Err(e) = closed {
            warn!("closing transport failed: {}", e);
        }
        self.turn.notify_all();
    }
}

/// Holds an exchange and releases it on drop, so the link is freed even if
/// the holder unwinds.
#[derive(Debug)]
pub struct ExchangeGuard<'a> {
    link: &'a LinkLock,
    token: ExchangeToken,
}

impl<'a> ExchangeGuard<'a> {
    pub fn new(link: &'a LinkLock, token: ExchangeToken) -> Self {
        Self { link, token }
    }

    /// Block for the link like [`LinkLock::begin_exchange`], guarded.
    pub fn begin(link: &'a LinkLock, module_id: ModuleId) -> Result<Self> {
        let token = link.begin_exchange(module_id)?;
        Ok(Self::new(link, token))
    }

    pub fn token(&self) -> &ExchangeToken {
        &self.token
    }
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!("releasing exchange {} after a panic", self.token.exchange);
        }
        self.link.release(&self.token);
    }
}

impl std::fmt::Debug for LinkLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("LinkLock")
            .field("in_flight", &state.in_flight)
            .field("next_sequence", &state.sequence.peek())
            .field("closed", &state.closed)
            .finish()
    }
}
