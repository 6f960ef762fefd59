// src/client.rs

use crate::errors::{ColloquyError, ColloquyResult};
use crate::logging;
use crate::reassemble::Reassembler;
use crate::session::{Sender, Transition};
use futures::StreamExt;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Wire body for the predict endpoint.
#[derive(Debug, Serialize)]
struct AskBody<'a> {
    question: &'a str,
    history: &'a [(Sender, String)],
}

/// The HTTP side of an exchange: one POST, one streamed answer.
#[derive(Debug, Clone)]
pub struct PredictClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PredictClient {
    pub fn new(endpoint: impl Into<String>, connect_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POSTs the question with its prior history and hands back the raw
    /// streaming response. Any non-2xx status is an error; no retry.
    pub async fn ask(
        &self,
        question: &str,
        history: &[(Sender, String)],
    ) -> ColloquyResult<reqwest::Response> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&AskBody { question, history })
            .send()
            .await
            .map_err(|e| ColloquyError::request_error(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ColloquyError::request_error(format!(
                "endpoint returned {}",
                status
            )));
        }
        Ok(response)
    }
}

/// One exchange worker: performs the request, feeds the byte stream
/// through the reassembler, and reports everything that happened as
/// transitions on the channel. Every failure collapses to `StreamFailed`;
/// the specifics go to the log file.
pub async fn run_exchange(
    client: PredictClient,
    question: String,
    history: Vec<(Sender, String)>,
    mut reassembler: Reassembler,
    tx: mpsc::Sender<Transition>,
) {
    let started = Instant::now();
    let response = match client.ask(&question, &history).await {
        Ok(response) => response,
        Err(err) => {
            log::warn!("exchange failed before any output: {}", err);
            let _ = tx.send(Transition::StreamFailed).await;
            return;
        }
    };

    let status = response.status().as_u16();
    let mut stream = response.bytes_stream();
    let mut received = 0usize;
    while let Some(chunk) = stream.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                let err = ColloquyError::stream_error(format!(
                    "read failed after {} bytes: {}",
                    received, err
                ));
                log::warn!("{}", err);
                let _ = tx.send(Transition::StreamFailed).await;
                return;
            }
        };
        received += bytes.len();
        for text in reassembler.push(&bytes) {
            if tx.send(Transition::ChunkReceived { text }).await.is_err() {
                return; // the UI went away; nothing left to publish to
            }
        }
    }

    if let Some(text) = reassembler.finish() {
        if tx.send(Transition::ChunkReceived { text }).await.is_err() {
            return;
        }
    }

    logging::record_exchange(client.endpoint(), status, received, started.elapsed());
    let _ = tx.send(Transition::StreamEnded).await;
}
