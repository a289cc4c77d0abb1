use std::cell::Cell;

use bytes::Bytes;
use futures::channel::mpsc;
use futures::stream;

use doctalk_client::client::{consume_stream, StreamOutcome, WorkerCmd};
use doctalk_client::conversation::Conversation;
use shared::response::QueryResponse;

fn chunk(text: &str) -> std::io::Result<Bytes> {
    Ok(Bytes::copy_from_slice(text.as_bytes()))
}

#[tokio::test]
async fn test_streamed_turn_lands_in_transcript() {
    let mut conversation = Conversation::new();
    assert!(conversation.submit("What does the contract say about renewal?"));

    let (_tx, rx) = mpsc::unbounded::<WorkerCmd>();
    let body = stream::iter(vec![
        chunk("data: {\"token\": \"Renews \"}\n"),
        chunk("data: {\"token\": \"annually.\"}\n"),
        chunk("data: {\"sources\": [{\"filename\": \"contract.pdf\", \"page\": 12}]}\n"),
        chunk("data: [DONE]\n"),
    ]);

    let tokens_seen = Cell::new(0);
    let outcome = consume_stream(body, &|_| tokens_seen.set(tokens_seen.get() + 1), rx)
        .await
        .expect("session completes");

    match outcome {
        StreamOutcome::Complete { answer, sources } => {
            conversation.resolve_assistant_turn(Ok(QueryResponse { answer, sources }));
        }
        StreamOutcome::Cancelled => panic!("nothing cancelled this session"),
    }

    let messages = conversation.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "Renews annually.");
    assert_eq!(messages[1].sources[0].to_string(), "contract.pdf (Page 12)");
    assert_eq!(tokens_seen.get(), 3);
    assert!(!conversation.is_awaiting_response());
}

#[tokio::test]
async fn test_failed_turn_still_yields_one_assistant_entry() {
    let mut conversation = Conversation::new();
    assert!(conversation.submit("anything"));

    let (_tx, rx) = mpsc::unbounded::<WorkerCmd>();
    let body = stream::iter(vec![
        chunk("data: {\"token\": \"half an ans\"}\n"),
        Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection dropped",
        )),
    ]);

    let result = consume_stream(body, &|_| {}, rx).await;
    let err = result.expect_err("the read error fails the session");
    conversation.resolve_assistant_turn(Err(err.user_message()));

    let messages = conversation.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[1].content,
        "Error: Failed to get response. Please try again."
    );
}
