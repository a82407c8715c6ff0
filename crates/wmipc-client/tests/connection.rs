use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio_util::codec::Framed;
use wmipc_client::{ClientConfig, ClientError, Connection, Event, EventKind};
use wmipc_frame::types::{
    GET_TREE, GET_VERSION, GET_WORKSPACES, RUN_COMMAND, SEND_TICK, SUBSCRIBE,
};
use wmipc_frame::{encode_message, Frame, FrameError, IpcCodec, TypeWord};

struct FakeServer {
    framed: Framed<DuplexStream, IpcCodec>,
}

impl FakeServer {
    async fn next_request(&mut self) -> Frame {
        self.framed
            .next()
            .await
            .expect("client should send a request")
            .expect("request should decode")
    }

    async fn reply(&mut self, code: u32, body: Value) {
        let payload = serde_json::to_vec(&body).expect("reply should serialize");
        self.framed
            .send(Frame::new(TypeWord::message(code), payload))
            .await
            .expect("reply should be written");
    }

    async fn event(&mut self, code: u32, body: Value) {
        let payload = serde_json::to_vec(&body).expect("event should serialize");
        self.framed
            .send(Frame::new(TypeWord::event(code), payload))
            .await
            .expect("event should be written");
    }

    async fn write_raw(&mut self, bytes: &[u8]) {
        let stream = self.framed.get_mut();
        stream.write_all(bytes).await.expect("raw write should succeed");
        stream.flush().await.expect("flush should succeed");
    }

    /// Answer one GET_VERSION round trip. Everything the server wrote before
    /// it has been routed once the client sees this reply.
    async fn answer_version(&mut self) {
        let request = self.next_request().await;
        assert_eq!(request.type_word.code(), GET_VERSION);
        self.reply(GET_VERSION, json!({"major": 4})).await;
    }
}

fn pair_with_config(config: ClientConfig) -> (Connection, FakeServer) {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let conn = Connection::from_stream(client, config);
    let server = FakeServer {
        framed: Framed::new(server, IpcCodec::default()),
    };
    (conn, server)
}

fn pair() -> (Connection, FakeServer) {
    pair_with_config(ClientConfig::default())
}

fn reply_bytes(code: u32, body: &Value) -> Vec<u8> {
    let payload = serde_json::to_vec(body).expect("reply should serialize");
    Frame::new(TypeWord::message(code), payload)
        .to_bytes()
        .expect("reply should encode")
        .to_vec()
}

#[tokio::test]
async fn run_command_sends_literal_text() {
    let (conn, mut server) = pair();

    let (result, ()) = tokio::join!(conn.send_command("exit", &[]), async {
        let request = server.next_request().await;
        assert_eq!(request.type_word, TypeWord::message(RUN_COMMAND));
        assert_eq!(&request.payload[..], b"exit");
        assert_eq!(
            request.to_bytes().unwrap().as_ref(),
            encode_message(RUN_COMMAND, "exit").unwrap().as_ref()
        );
        server.reply(RUN_COMMAND, json!([{"success": true}])).await;
    });

    assert_eq!(result.unwrap(), json!([{"success": true}]));
}

#[tokio::test]
async fn command_args_are_joined_with_spaces() {
    let (conn, mut server) = pair();

    let args = [json!("number"), json!(3)];
    let (result, ()) = tokio::join!(
        conn.send_command("workspace", &args),
        async {
            let request = server.next_request().await;
            assert_eq!(&request.payload[..], b"workspace number 3");
            server.reply(RUN_COMMAND, json!([{"success": true}])).await;
        }
    );

    assert!(result.is_ok());
}

#[tokio::test]
async fn failed_command_is_application_failure() {
    let (conn, mut server) = pair();

    let (result, ()) = tokio::join!(conn.send_command("nonsense", &[]), async {
        server.next_request().await;
        server
            .reply(
                RUN_COMMAND,
                json!([{"success": false, "parse_error": true, "error": "Expected one of these tokens"}]),
            )
            .await;
    });

    match result.unwrap_err() {
        ClientError::ApplicationFailure { error, reply } => {
            assert_eq!(error, "Expected one of these tokens");
            assert_eq!(reply[0]["parse_error"], json!(true));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn coalesced_replies_reach_their_callers() {
    let (conn, mut server) = pair();

    let (workspaces, tree, ()) = tokio::join!(conn.get_workspaces(), conn.get_tree(), async {
        let first = server.next_request().await;
        assert_eq!(first.type_word.code(), GET_WORKSPACES);

        // Both replies in one write; the second request has not been sent yet.
        let mut both = reply_bytes(GET_WORKSPACES, &json!([{"num": 1}]));
        both.extend(reply_bytes(GET_TREE, &json!({"type": "root"})));
        server.write_raw(&both).await;

        let second = server.next_request().await;
        assert_eq!(second.type_word.code(), GET_TREE);
    });

    assert_eq!(workspaces.unwrap(), json!([{"num": 1}]));
    assert_eq!(tree.unwrap(), json!({"type": "root"}));
}

#[tokio::test]
async fn concurrent_requests_are_written_and_answered_in_order() {
    let (conn, mut server) = pair();

    let (a, b, c, ()) = tokio::join!(
        conn.query(RUN_COMMAND, "a"),
        conn.query(RUN_COMMAND, "b"),
        conn.query(RUN_COMMAND, "c"),
        async {
            for expected in ["a", "b", "c"] {
                let request = server.next_request().await;
                assert_eq!(&request.payload[..], expected.as_bytes());
                server.reply(RUN_COMMAND, json!({ "echo": expected })).await;
            }
        }
    );

    assert_eq!(a.unwrap()["echo"], "a");
    assert_eq!(b.unwrap()["echo"], "b");
    assert_eq!(c.unwrap()["echo"], "c");
}

#[tokio::test]
async fn timed_out_request_does_not_steal_the_next_reply() {
    let (conn, mut server) = pair_with_config(ClientConfig {
        reply_timeout: Duration::from_millis(100),
        ..ClientConfig::default()
    });

    let (tree, ()) = tokio::join!(conn.get_tree(), async {
        let request = server.next_request().await;
        assert_eq!(request.type_word.code(), GET_TREE);
    });
    assert!(matches!(tree, Err(ClientError::ReplyTimeout(d)) if d == Duration::from_millis(100)));

    let (version, ()) = tokio::join!(conn.get_version(), async {
        let request = server.next_request().await;
        assert_eq!(request.type_word.code(), GET_VERSION);
        // Late answer to the timed-out request, then the real one.
        server.reply(GET_TREE, json!({"type": "root"})).await;
        server.reply(GET_VERSION, json!({"major": 4})).await;
    });

    assert_eq!(version.unwrap(), json!({"major": 4}));
}

#[tokio::test]
async fn events_fan_out_to_every_listener_in_order() {
    let (conn, mut server) = pair();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let (subscribed, ()) = tokio::join!(conn.subscribe(&[EventKind::Window]), async {
        let request = server.next_request().await;
        assert_eq!(request.type_word.code(), SUBSCRIBE);
        assert_eq!(&request.payload[..], br#"["window"]"#);
        server.reply(SUBSCRIBE, json!({"success": true})).await;
    });
    subscribed.unwrap();

    for (name, kind) in [
        ("first", EventKind::Window),
        ("workspace", EventKind::Workspace),
        ("second", EventKind::Window),
    ] {
        let seen = Arc::clone(&seen);
        conn.on(kind, move |event: &Event| {
            seen.lock()
                .unwrap()
                .push((name, event.body["change"].clone()));
        });
    }

    let (version, ()) = tokio::join!(conn.get_version(), async {
        server.event(3, json!({"change": "focus"})).await;
        server.answer_version().await;
    });
    version.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![("first", json!("focus")), ("second", json!("focus"))]
    );
}

#[tokio::test]
async fn unknown_event_codes_go_to_the_unknown_channel() {
    let (conn, mut server) = pair();
    let codes = Arc::new(Mutex::new(HashMap::new()));

    for kind in [EventKind::Window, EventKind::Unknown] {
        let codes = Arc::clone(&codes);
        conn.on(kind, move |event: &Event| {
            codes.lock().unwrap().insert(event.kind, event.code);
        });
    }

    let (version, ()) = tokio::join!(conn.get_version(), async {
        server.event(42, json!({"change": "new-thing"})).await;
        server.answer_version().await;
    });
    version.unwrap();

    let codes = codes.lock().unwrap();
    assert_eq!(codes.get(&EventKind::Unknown), Some(&42));
    assert!(!codes.contains_key(&EventKind::Window));
}

#[tokio::test]
async fn removed_listener_is_not_called() {
    let (conn, mut server) = pair();
    let hits = Arc::new(Mutex::new(0));

    let counter = Arc::clone(&hits);
    let id = conn.on(EventKind::Tick, move |_: &Event| {
        *counter.lock().unwrap() += 1;
    });
    conn.off(id);

    let (version, ()) = tokio::join!(conn.get_version(), async {
        server.event(7, json!({"first": false, "payload": "ping"})).await;
        server.answer_version().await;
    });
    version.unwrap();

    assert_eq!(*hits.lock().unwrap(), 0);
}

#[tokio::test]
async fn unknown_kind_cannot_be_subscribed() {
    let (conn, _server) = pair();
    let err = conn
        .subscribe(&[EventKind::Window, EventKind::Unknown])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidSubscription(name) if name == "unknown"));
}

#[tokio::test]
async fn send_tick_uses_payload_text() {
    let (conn, mut server) = pair();

    let (result, ()) = tokio::join!(conn.send_tick("hello"), async {
        let request = server.next_request().await;
        assert_eq!(request.type_word.code(), SEND_TICK);
        assert_eq!(&request.payload[..], b"hello");
        server.reply(SEND_TICK, json!({"success": true})).await;
    });

    result.unwrap();
}

#[tokio::test]
async fn close_fails_pending_requests() {
    let (conn, mut server) = pair();

    let (tree, ()) = tokio::join!(conn.get_tree(), async {
        server.next_request().await;
        conn.close().await;
    });

    assert!(matches!(tree, Err(ClientError::ConnectionClosed)));
    assert!(conn.is_closed());
    assert!(matches!(
        conn.get_version().await,
        Err(ClientError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn server_hangup_closes_connection() {
    let (conn, server) = pair();

    let (tree, ()) = tokio::join!(conn.get_tree(), async move {
        let mut server = server;
        server.next_request().await;
        drop(server);
    });

    assert!(matches!(tree, Err(ClientError::ConnectionClosed)));
    tokio::time::timeout(Duration::from_secs(1), async {
        while !conn.is_closed() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("connection should report closed");
}

#[tokio::test]
async fn garbage_on_the_wire_closes_connection() {
    let (conn, mut server) = pair();

    let (tree, ()) = tokio::join!(conn.get_tree(), async {
        server.next_request().await;
        server.write_raw(b"not-an-ipc-frame-at-all").await;
    });

    assert!(matches!(tree, Err(ClientError::ConnectionClosed)));
}

#[tokio::test]
async fn reply_ahead_of_garbage_is_still_delivered() {
    let (conn, mut server) = pair();

    let (tree, ()) = tokio::join!(conn.get_tree(), async {
        server.next_request().await;
        let mut bytes = reply_bytes(GET_TREE, &json!({"type": "root"}));
        bytes.extend_from_slice(b"garbage-garbage-garbage");
        server.write_raw(&bytes).await;
    });
    assert_eq!(tree.unwrap(), json!({"type": "root"}));

    let version = conn.get_version().await;
    assert!(matches!(version, Err(ClientError::ConnectionClosed)));
}

#[tokio::test]
async fn malformed_reply_fails_only_its_request() {
    let (conn, mut server) = pair();

    let (tree, ()) = tokio::join!(conn.get_tree(), async {
        server.next_request().await;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"i3-ipc");
        bytes.extend_from_slice(&5u32.to_le_bytes());
        bytes.extend_from_slice(&GET_TREE.to_le_bytes());
        bytes.extend_from_slice(b"{oops");
        server.write_raw(&bytes).await;
    });
    assert!(matches!(
        tree,
        Err(ClientError::Frame(FrameError::Payload { .. }))
    ));

    let (version, ()) = tokio::join!(conn.get_version(), server.answer_version());
    assert_eq!(version.unwrap()["major"], 4);
}

#[tokio::test]
async fn unencodable_payload_fails_without_writing() {
    let (conn, mut server) = pair();

    let mut bad = HashMap::new();
    bad.insert((1, 2), "tuple keys");
    let err = conn.query(RUN_COMMAND, &bad).await.unwrap_err();
    assert!(matches!(err, ClientError::Frame(FrameError::Encoding(_))));

    // The next thing on the wire is the follow-up request.
    let (version, ()) = tokio::join!(conn.get_version(), server.answer_version());
    assert!(version.is_ok());
}

#[tokio::test]
async fn reply_split_into_single_bytes_is_reassembled() {
    let (conn, mut server) = pair();

    let (marks, ()) = tokio::join!(conn.get_marks(), async {
        let request = server.next_request().await;
        let bytes = reply_bytes(request.type_word.code(), &json!(["a", "b"]));
        for byte in bytes {
            server.write_raw(&[byte]).await;
        }
    });

    assert_eq!(marks.unwrap(), json!(["a", "b"]));
}
