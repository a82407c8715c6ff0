//! FIFO admission of requests onto a connection.
//!
//! The protocol carries no request id: the server answers in the order it
//! was asked. Only one request is in flight at a time, the rest wait here.
//! Every written request gets a generation, and the generations of written
//! but unanswered requests are kept in wire order. A reply always belongs
//! to the oldest unanswered generation; if that is not the armed request
//! (because it timed out), the reply is stale and dropped.

use std::collections::VecDeque;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};
use wmipc_frame::types::message_name;
use wmipc_frame::Frame;

use crate::error::{ClientError, Result};

/// Result slot of a single request.
pub type ReplySlot = oneshot::Sender<Result<Value>>;

/// A request admitted to the queue but not yet written.
#[derive(Debug)]
pub struct QueuedRequest {
    frame: Frame,
    slot: ReplySlot,
}

impl QueuedRequest {
    pub fn new(frame: Frame, slot: ReplySlot) -> Self {
        Self { frame, slot }
    }
}

#[derive(Debug)]
struct PendingRequest {
    code: u32,
    generation: u64,
    slot: ReplySlot,
    deadline: Instant,
}

/// What became of an incoming reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Handed to the in-flight request.
    Delivered { generation: u64 },
    /// Answer to a request that already timed out; dropped.
    Stale { generation: u64 },
    /// No request was waiting for it; dropped.
    Unsolicited,
}

#[derive(Debug)]
pub struct RequestQueue {
    waiting: VecDeque<QueuedRequest>,
    in_flight: Option<PendingRequest>,
    unanswered: VecDeque<u64>,
    next_generation: u64,
    reply_timeout: Duration,
}

impl RequestQueue {
    pub fn new(reply_timeout: Duration) -> Self {
        Self {
            waiting: VecDeque::new(),
            in_flight: None,
            unanswered: VecDeque::new(),
            next_generation: 1,
            reply_timeout,
        }
    }

    /// Admit a request behind everything already queued.
    pub fn enqueue(&mut self, request: QueuedRequest) {
        self.waiting.push_back(request);
    }

    /// If nothing is in flight, arm the next live request and hand back the
    /// frame to write. Requests whose caller already gave up are skipped.
    pub fn start_next(&mut self, now: Instant) -> Option<Frame> {
        if self.in_flight.is_some() {
            return None;
        }

        while let Some(request) = self.waiting.pop_front() {
            if request.slot.is_closed() {
                debug!("skipping request abandoned by its caller");
                continue;
            }

            let generation = self.next_generation;
            self.next_generation += 1;
            let code = request.frame.type_word.code();

            debug!(generation, message = message_name(code), "request in flight");
            self.unanswered.push_back(generation);
            self.in_flight = Some(PendingRequest {
                code,
                generation,
                slot: request.slot,
                deadline: now + self.reply_timeout,
            });
            return Some(request.frame);
        }

        None
    }

    /// Deadline of the in-flight request, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.in_flight.as_ref().map(|pending| pending.deadline)
    }

    /// Match a reply against the oldest unanswered request.
    pub fn on_reply(&mut self, code: u32, result: Result<Value>) -> ReplyOutcome {
        let Some(generation) = self.unanswered.pop_front() else {
            warn!(message = message_name(code), "dropping unsolicited reply");
            return ReplyOutcome::Unsolicited;
        };

        match self.in_flight.take() {
            Some(pending) if pending.generation == generation => {
                if pending.code != code {
                    warn!(
                        sent = message_name(pending.code),
                        received = message_name(code),
                        "reply type differs from request type"
                    );
                }
                if pending.slot.send(result).is_err() {
                    debug!(generation, "reply arrived after caller gave up");
                }
                ReplyOutcome::Delivered { generation }
            }
            other => {
                self.in_flight = other;
                warn!(generation, "dropping late reply for timed-out request");
                ReplyOutcome::Stale { generation }
            }
        }
    }

    /// Fail the in-flight request if its deadline has passed.
    ///
    /// Its generation stays unanswered so the late reply is recognized.
    pub fn on_deadline(&mut self, now: Instant) -> bool {
        match self.in_flight.take() {
            Some(pending) if pending.deadline <= now => {
                warn!(
                    generation = pending.generation,
                    message = message_name(pending.code),
                    timeout = ?self.reply_timeout,
                    "request timed out"
                );
                let _ = pending
                    .slot
                    .send(Err(ClientError::ReplyTimeout(self.reply_timeout)));
                true
            }
            other => {
                self.in_flight = other;
                false
            }
        }
    }

    /// Fail the in-flight request and everything queued behind it.
    pub fn fail_all(&mut self) {
        if let Some(pending) = self.in_flight.take() {
            let _ = pending.slot.send(Err(ClientError::ConnectionClosed));
        }
        for request in self.waiting.drain(..) {
            let _ = request.slot.send(Err(ClientError::ConnectionClosed));
        }
        self.unanswered.clear();
    }

    /// Whether a request is waiting for its reply.
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Requests admitted but not yet written.
    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }
}
