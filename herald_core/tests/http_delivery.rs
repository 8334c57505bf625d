//! End-to-end delivery through the real `ureq` transport against a mock Bot API.

use std::num::NonZeroU32;
use std::time::Duration;

use herald_core::{Options, TelegramSender};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123456:test-token";

fn options_for(api_base: String, chat_ids: &[&str]) -> Options {
    Options {
        rps: NonZeroU32::new(50).unwrap(),
        api_base,
        timeout_secs: 5,
        ..Options::new(TOKEN, chat_ids.iter().copied())
    }
}

/// Runs the blocking sender off the async runtime; returns whether it drained.
async fn send_and_drain(options: Options, messages: Vec<&'static str>) -> bool {
    tokio::task::spawn_blocking(move || {
        let sender = TelegramSender::new(options).unwrap();
        for message in messages {
            sender.send(message).unwrap();
        }
        let drained = sender.wait_timeout(Duration::from_secs(10));
        sender.shutdown();
        drained
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn posts_one_send_message_call_per_chat() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(2)
        .mount(&server)
        .await;

    let text = "deploy #42 done & green: 100%";
    let drained = send_and_drain(options_for(server.uri(), &["-1001", "77"]), vec![text]).await;
    assert!(drained);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let mut chats: Vec<String> = Vec::new();
    for request in &requests {
        assert_eq!(request.method.as_str(), "POST");
        assert!(request.body.is_empty());

        let param = |key: &str| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        };
        assert_eq!(param("text").as_deref(), Some(text));
        chats.push(param("chat_id").unwrap());
    }
    chats.sort();
    assert_eq!(chats, vec!["-1001", "77"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn non_200_status_does_not_stop_later_sends() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(query_param("chat_id", "blocked"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string(r#"{"ok":false,"description":"Forbidden: bot was blocked by the user"}"#),
        )
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(query_param("chat_id", "fine"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let drained = send_and_drain(
        options_for(server.uri(), &["blocked", "fine"]),
        vec!["one", "two"],
    )
    .await;
    assert!(drained);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let drained = send_and_drain(options_for(server.uri(), &["1"]), vec!["once"]).await;
    assert!(drained);

    // Give a hypothetical retry a few ticks to show up.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[test]
fn connection_failure_still_drains() {
    // Nothing listens on port 1; the connect fails fast.
    let sender = TelegramSender::new(options_for("http://127.0.0.1:1".into(), &["1", "2"])).unwrap();

    sender.send("unreachable").unwrap();

    assert!(sender.wait_timeout(Duration::from_secs(10)));
    assert_eq!(sender.in_flight(), 0);
}
