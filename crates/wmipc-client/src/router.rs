use tracing::warn;
use wmipc_frame::{Frame, Message};

use crate::hub::EventHub;
use crate::queue::{ReplyOutcome, RequestQueue};

/// Where a routed frame ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// A reply, matched (or not) against the request queue.
    Reply(ReplyOutcome),
    /// An event, with the number of listeners that saw it.
    Event { listeners: usize },
    /// An event whose payload was not JSON.
    DroppedEvent,
}

/// Splits decoded frames between the request queue and the event hub.
#[derive(Debug)]
pub struct Router {
    queue: RequestQueue,
    hub: EventHub,
}

impl Router {
    pub fn new(queue: RequestQueue, hub: EventHub) -> Self {
        Self { queue, hub }
    }

    /// Decode one frame and hand it to its consumer.
    ///
    /// A reply with a broken payload still answers the oldest request, which
    /// then fails with the payload error. A broken event is logged and dropped.
    pub fn route(&mut self, frame: Frame) -> Routed {
        let type_word = frame.type_word;
        match Message::from_frame(&frame) {
            Ok(Message::Reply { code, body }) => Routed::Reply(self.queue.on_reply(code, Ok(body))),
            Ok(Message::Event { code, body }) => Routed::Event {
                listeners: self.hub.dispatch(code, body),
            },
            Err(err) if type_word.is_event() => {
                warn!(code = type_word.code(), %err, "dropping event with invalid payload");
                Routed::DroppedEvent
            }
            Err(err) => {
                warn!(code = type_word.code(), %err, "reply with invalid payload");
                Routed::Reply(self.queue.on_reply(type_word.code(), Err(err.into())))
            }
        }
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut RequestQueue {
        &mut self.queue
    }

    pub fn hub_mut(&mut self) -> &mut EventHub {
        &mut self.hub
    }

    /// Fail every outstanding request and silence all listeners.
    pub fn shutdown(&mut self) {
        self.queue.fail_all();
        self.hub.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::oneshot;
    use tokio::time::Instant;
    use wmipc_frame::{FrameError, TypeWord};

    use super::*;
    use crate::error::ClientError;
    use crate::event::{Event, EventKind};
    use crate::hub::ListenerId;
    use crate::queue::QueuedRequest;

    fn router() -> Router {
        Router::new(RequestQueue::new(Duration::from_secs(1)), EventHub::new())
    }

    #[test]
    fn event_flag_routes_to_hub() {
        let mut router = router();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        router.hub_mut().add(
            EventKind::Window,
            ListenerId(1),
            Box::new(move |_: &Event| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let routed = router.route(Frame::new(TypeWord::event(3), &br#"{"change":"new"}"#[..]));

        assert_eq!(routed, Routed::Event { listeners: 1 });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reply_routes_to_queue() {
        let mut router = router();
        let (tx, mut rx) = oneshot::channel();
        router.queue_mut().enqueue(QueuedRequest::new(
            Frame::new(TypeWord::message(7), &b""[..]),
            tx,
        ));
        router.queue_mut().start_next(Instant::now()).unwrap();

        let routed = router.route(Frame::new(TypeWord::message(7), &br#"{"major":4}"#[..]));

        assert_eq!(
            routed,
            Routed::Reply(ReplyOutcome::Delivered { generation: 1 })
        );
        assert_eq!(rx.try_recv().unwrap().unwrap()["major"], 4);
    }

    #[test]
    fn invalid_reply_payload_fails_only_that_request() {
        let mut router = router();
        let (tx, mut rx) = oneshot::channel();
        router.queue_mut().enqueue(QueuedRequest::new(
            Frame::new(TypeWord::message(4), &b""[..]),
            tx,
        ));
        router.queue_mut().start_next(Instant::now()).unwrap();

        router.route(Frame::new(TypeWord::message(4), &b"{truncated"[..]));

        assert!(matches!(
            rx.try_recv().unwrap(),
            Err(ClientError::Frame(FrameError::Payload { .. }))
        ));
        assert!(!router.queue().has_in_flight());
    }

    #[test]
    fn invalid_event_payload_is_dropped() {
        let mut router = router();
        let routed = router.route(Frame::new(TypeWord::event(0), &b"not json"[..]));
        assert_eq!(routed, Routed::DroppedEvent);
    }
}
