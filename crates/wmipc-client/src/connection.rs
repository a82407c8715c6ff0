//! The client facade and the task that drives one connection.
//!
//! All connection state (frame assembler, request queue, event hub) lives in
//! a single driver task. The [`Connection`] handle only sends it operations,
//! so state is never touched from two places at once and needs no locks.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::BytesMut;
use futures_util::SinkExt;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tokio_util::codec::FramedWrite;
use tracing::{debug, error, warn};
use wmipc_frame::types::{
    GET_BAR_CONFIG, GET_BINDING_MODES, GET_CONFIG, GET_MARKS, GET_OUTPUTS, GET_TREE,
    GET_VERSION, GET_WORKSPACES, RUN_COMMAND, SEND_TICK, SUBSCRIBE, SYNC,
};
use wmipc_frame::{request_frame, Frame, FrameAssembler, FrameError, IpcCodec};
use wmipc_transport::IpcStream;

use crate::command::{check_success, join_command};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::event::{Event, EventKind};
use crate::hub::{EventHub, Listener, ListenerId};
use crate::queue::{QueuedRequest, RequestQueue};
use crate::router::{Routed, Router};

enum Op {
    Request(QueuedRequest),
    AddListener {
        kind: EventKind,
        id: ListenerId,
        listener: Listener,
    },
    RemoveListener(ListenerId),
    Close,
}

/// A live connection to the window manager.
///
/// Dropping the handle closes the connection.
pub struct Connection {
    ops: mpsc::UnboundedSender<Op>,
    next_listener_id: AtomicU64,
}

impl Connection {
    /// Start driving an already connected stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_stream<S: IpcStream>(stream: S, config: ClientConfig) -> Self {
        let (ops_tx, ops_rx) = mpsc::unbounded_channel();
        let (reader, writer) = tokio::io::split(stream);

        let driver = Driver {
            ops: ops_rx,
            reader,
            writer: FramedWrite::new(writer, IpcCodec::with_config(config.frame.clone())),
            assembler: FrameAssembler::with_config(config.frame.clone()),
            chunk: BytesMut::with_capacity(config.read_chunk_size),
            read_chunk_size: config.read_chunk_size.max(1),
            router: Router::new(RequestQueue::new(config.reply_timeout), EventHub::new()),
        };
        tokio::spawn(driver.run());

        Self {
            ops: ops_tx,
            next_listener_id: AtomicU64::new(1),
        }
    }

    /// Send a message of the given type and wait for its reply body.
    ///
    /// Payload encoding errors are returned before anything is queued.
    pub async fn query<T: Serialize + ?Sized>(&self, code: u32, payload: &T) -> Result<Value> {
        let frame = request_frame(code, payload)?;
        self.request(frame).await
    }

    async fn request(&self, frame: Frame) -> Result<Value> {
        let (tx, rx) = oneshot::channel();
        self.ops
            .send(Op::Request(QueuedRequest::new(frame, tx)))
            .map_err(|_| ClientError::ConnectionClosed)?;
        rx.await.map_err(|_| ClientError::ConnectionClosed)?
    }

    /// Run a command, with `args` appended after single spaces.
    ///
    /// Returns the reply (one outcome per command); any outcome with
    /// `success: false` becomes [`ClientError::ApplicationFailure`].
    pub async fn send_command(&self, command: &str, args: &[Value]) -> Result<Value> {
        let payload = join_command(command, args)?;
        let reply = self.query(RUN_COMMAND, payload.as_str()).await?;
        check_success(reply)
    }

    /// Ask the server to start pushing the given events.
    pub async fn subscribe(&self, kinds: &[EventKind]) -> Result<()> {
        let names = kinds
            .iter()
            .map(|kind| match kind {
                EventKind::Unknown => Err(ClientError::InvalidSubscription(kind.to_string())),
                known => Ok(known.name()),
            })
            .collect::<Result<Vec<_>>>()?;

        let reply = self.query(SUBSCRIBE, &names).await?;
        check_success(reply)?;
        debug!(events = ?names, "subscribed");
        Ok(())
    }

    /// Register a listener for one event channel. Returns immediately.
    ///
    /// Events only arrive for kinds passed to [`subscribe`](Self::subscribe);
    /// [`EventKind::Unknown`] listeners see codes outside the known table.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        let _ = self.ops.send(Op::AddListener {
            kind,
            id,
            listener: Box::new(listener),
        });
        id
    }

    /// Remove a listener registered with [`on`](Self::on).
    pub fn off(&self, id: ListenerId) {
        let _ = self.ops.send(Op::RemoveListener(id));
    }

    /// Close the connection and wait until the driver has stopped.
    ///
    /// Outstanding requests fail with [`ClientError::ConnectionClosed`].
    pub async fn close(&self) {
        let _ = self.ops.send(Op::Close);
        self.ops.closed().await;
    }

    /// Whether the connection has shut down.
    pub fn is_closed(&self) -> bool {
        self.ops.is_closed()
    }

    /// GET_WORKSPACES.
    pub async fn get_workspaces(&self) -> Result<Value> {
        self.query(GET_WORKSPACES, "").await
    }

    /// GET_OUTPUTS.
    pub async fn get_outputs(&self) -> Result<Value> {
        self.query(GET_OUTPUTS, "").await
    }

    /// GET_TREE.
    pub async fn get_tree(&self) -> Result<Value> {
        self.query(GET_TREE, "").await
    }

    /// GET_MARKS.
    pub async fn get_marks(&self) -> Result<Value> {
        self.query(GET_MARKS, "").await
    }

    /// GET_BAR_CONFIG: the list of bar ids, or one bar's config.
    pub async fn get_bar_config(&self, bar_id: Option<&str>) -> Result<Value> {
        self.query(GET_BAR_CONFIG, bar_id.unwrap_or("")).await
    }

    /// GET_VERSION.
    pub async fn get_version(&self) -> Result<Value> {
        self.query(GET_VERSION, "").await
    }

    /// GET_BINDING_MODES.
    pub async fn get_binding_modes(&self) -> Result<Value> {
        self.query(GET_BINDING_MODES, "").await
    }

    /// GET_CONFIG.
    pub async fn get_config(&self) -> Result<Value> {
        self.query(GET_CONFIG, "").await
    }

    /// SEND_TICK: broadcast a tick event carrying `payload` to subscribers.
    pub async fn send_tick(&self, payload: &str) -> Result<()> {
        check_success(self.query(SEND_TICK, payload).await?)?;
        Ok(())
    }

    /// SYNC with the X11 window manager, echoing `random` back in a client message.
    pub async fn sync(&self, window: u32, random: u32) -> Result<()> {
        let payload = json!({ "window": window, "rnd": random });
        check_success(self.query(SYNC, &payload).await?)?;
        Ok(())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[derive(Debug)]
enum CloseReason {
    Requested,
    ServerClosed,
    Framing(FrameError),
    Io(std::io::Error),
}

struct Driver<S> {
    ops: mpsc::UnboundedReceiver<Op>,
    reader: ReadHalf<S>,
    writer: FramedWrite<WriteHalf<S>, IpcCodec>,
    assembler: FrameAssembler,
    chunk: BytesMut,
    read_chunk_size: usize,
    router: Router,
}

impl<S: IpcStream> Driver<S> {
    async fn run(mut self) {
        let reason = self.drive().await;
        match &reason {
            CloseReason::Requested => debug!("connection closed by client"),
            CloseReason::ServerClosed => debug!("connection closed by server"),
            CloseReason::Framing(err) => error!(%err, "framing error, closing connection"),
            CloseReason::Io(err) => warn!(%err, "transport error, closing connection"),
        }

        let queue = self.router.queue();
        if queue.has_in_flight() || queue.waiting_len() > 0 {
            debug!(
                in_flight = queue.has_in_flight(),
                waiting = queue.waiting_len(),
                "failing outstanding requests"
            );
        }
        self.router.shutdown();
        // Dropping `self` drops the op receiver, which is what `close` waits for.
    }

    async fn drive(&mut self) -> CloseReason {
        loop {
            let deadline = self.router.queue().deadline();
            self.chunk.reserve(self.read_chunk_size);

            tokio::select! {
                biased;

                op = self.ops.recv() => match op {
                    Some(Op::Request(request)) => {
                        self.router.queue_mut().enqueue(request);
                        if let Err(reason) = self.start_next().await {
                            return reason;
                        }
                    }
                    Some(Op::AddListener { kind, id, listener }) => {
                        self.router.hub_mut().add(kind, id, listener);
                    }
                    Some(Op::RemoveListener(id)) => {
                        self.router.hub_mut().remove(id);
                    }
                    Some(Op::Close) | None => return CloseReason::Requested,
                },

                read = self.reader.read_buf(&mut self.chunk) => match read {
                    Ok(0) => return CloseReason::ServerClosed,
                    Ok(_) => {
                        if let Err(reason) = self.process_chunk().await {
                            return reason;
                        }
                    }
                    Err(err) => return CloseReason::Io(err),
                },

                () = wait_for(deadline) => {
                    self.router.queue_mut().on_deadline(Instant::now());
                    if let Err(reason) = self.start_next().await {
                        return reason;
                    }
                }
            }
        }
    }

    async fn process_chunk(&mut self) -> std::result::Result<(), CloseReason> {
        let assembled = self.assembler.push(&self.chunk);
        self.chunk.clear();

        // Frames ahead of corrupt bytes are complete replies and events;
        // route them before the connection goes down.
        let broken = assembled.error.is_some();
        for frame in assembled.frames {
            // The next request goes out as soon as a reply frees the slot,
            // before later frames from the same read are routed.
            let routed = self.router.route(frame);
            if !broken && matches!(routed, Routed::Reply(_)) {
                self.start_next().await?;
            }
        }

        match assembled.error {
            Some(err) => Err(CloseReason::Framing(err)),
            None => Ok(()),
        }
    }

    async fn start_next(&mut self) -> std::result::Result<(), CloseReason> {
        let Some(frame) = self.router.queue_mut().start_next(Instant::now()) else {
            return Ok(());
        };
        self.writer.send(frame).await.map_err(|err| match err {
            FrameError::Io(io) => CloseReason::Io(io),
            other => CloseReason::Framing(other),
        })
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
