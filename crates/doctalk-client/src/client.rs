//! The streaming query session: one question in, a stream of answer
//! fragments out, ending in exactly one terminal outcome.

use bytes::Bytes;
use futures::channel::mpsc::UnboundedReceiver;
use futures::{Stream, StreamExt};

use shared::request::QueryRequest;
use shared::response::{ChunkPayload, Source};

use crate::api::{ApiClient, ApiError};
use crate::constants;
use crate::stream::{classify, LineDecoder, StreamEvent};

/// Commands the owner of a running session can issue.
#[derive(Clone, Debug)]
pub enum WorkerCmd {
    Stop,
}

/// How a session ended, short of an error. `Cancelled` means the caller asked
/// us to stop: no answer is reported and none should be appended.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamOutcome {
    Complete {
        answer: String,
        sources: Vec<Source>,
    },
    Cancelled,
}

pub struct DocTalkClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl DocTalkClient {
    pub fn new(token: Option<String>, endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.unwrap_or_else(|| constants::HTTP_ENDPOINT.into()),
            token,
        }
    }

    /// Run one streamed question/answer exchange. `on_chunk` fires once per
    /// data frame, in arrival order; the returned value is the session's
    /// single terminal outcome. At most one session should run per
    /// conversation turn, which the caller enforces via
    /// [`crate::conversation::Conversation::submit`].
    pub async fn ask(
        &self,
        question: &str,
        on_chunk: &impl Fn(ChunkPayload),
        cmds: UnboundedReceiver<WorkerCmd>,
    ) -> Result<StreamOutcome, ApiError> {
        let body = QueryRequest {
            question: question.to_string(),
        };

        let mut request = self
            .client
            .post(format!("{}/query/stream", self.endpoint))
            .json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let res = request.send().await?;
        let res = ApiClient::check_status(res).await?;

        let chunks = res.bytes_stream().map(|chunk| {
            chunk.map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))
        });
        consume_stream(chunks, on_chunk, cmds).await
    }
}

/// Drive the frame decoder over a chunked response body until a terminal
/// state. Cancellation is cooperative: the command channel is checked before
/// each read is issued, and once more when a read completes so a chunk that
/// was already in flight gets discarded rather than processed.
pub async fn consume_stream<S>(
    mut chunks: S,
    on_chunk: &impl Fn(ChunkPayload),
    mut cmds: UnboundedReceiver<WorkerCmd>,
) -> Result<StreamOutcome, ApiError>
where
    S: Stream<Item = std::io::Result<Bytes>> + Unpin,
{
    let mut decoder = LineDecoder::new();
    let mut answer = String::new();
    let mut sources: Vec<Source> = Vec::new();

    loop {
        if stop_requested(&mut cmds) {
            log::info!("session cancelled");
            return Ok(StreamOutcome::Cancelled);
        }

        let chunk = chunks.next().await;

        if stop_requested(&mut cmds) {
            log::info!("session cancelled, discarding in-flight read");
            return Ok(StreamOutcome::Cancelled);
        }

        let bytes = match chunk {
            Some(Ok(bytes)) => bytes,
            Some(Err(err)) => return Err(ApiError::StreamError(err)),
            None => break,
        };

        for line in decoder.push(&bytes) {
            match classify(&line) {
                Some(StreamEvent::Terminal) => {
                    return Ok(StreamOutcome::Complete { answer, sources });
                }
                Some(StreamEvent::Data(payload)) => {
                    if let Some(error) = &payload.error {
                        return Err(ApiError::ServerError(error.clone()));
                    }
                    if let Some(token) = &payload.token {
                        answer.push_str(token);
                    }
                    if let Some(cited) = &payload.sources {
                        sources = cited.clone();
                    }
                    on_chunk(payload);
                }
                Some(StreamEvent::Malformed(raw)) => {
                    // One corrupt frame must not cost us the rest of the
                    // answer.
                    log::warn!("dropping malformed frame: {}", raw);
                }
                None => {}
            }
        }
    }

    // The server newline-terminates its sentinel, so a leftover here is a
    // truncated fragment from a connection that closed early.
    if let Some(fragment) = decoder.finish() {
        log::debug!("discarding {} unterminated bytes at end of stream", fragment.len());
    }

    Ok(StreamOutcome::Complete { answer, sources })
}

fn stop_requested(cmds: &mut UnboundedReceiver<WorkerCmd>) -> bool {
    matches!(cmds.try_next(), Ok(Some(WorkerCmd::Stop)))
}
