use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{RemoteError, TransportError};
use crate::remote::{FunctionCall, RemoteApi, RemoteRequest, RemoteResponse, Transport};

pub(crate) fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

pub(crate) fn json_response(status: u16, body: &Value) -> RemoteResponse {
    RemoteResponse {
        status,
        headers: BTreeMap::new(),
        body: body.to_string().into_bytes(),
    }
}

/// One scripted transport outcome.
pub(crate) enum Step {
    Respond(RemoteResponse),
    Connect,
    Build,
    Hang,
}

/// Transport that replays scripted steps in order and repeats the last one
/// once the script runs out.
pub(crate) struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    attempts: AtomicU32,
    requests: Mutex<Vec<RemoteRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            attempts: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<RemoteRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn next_step(&self) -> Step {
        let next = self.steps.lock().ok().and_then(|mut steps| steps.pop_front());
        let Ok(mut last) = self.last.lock() else {
            return Step::Connect;
        };
        match next {
            Some(step) => {
                let replay = step.replay();
                *last = Some(step);
                replay
            }
            None => last.as_ref().map_or(Step::Connect, Step::replay),
        }
    }
}

impl Step {
    fn replay(&self) -> Step {
        match self {
            Step::Respond(response) => Step::Respond(response.clone()),
            Step::Connect => Step::Connect,
            Step::Build => Step::Build,
            Step::Hang => Step::Hang,
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        match self.next_step() {
            Step::Respond(response) => Ok(response),
            Step::Connect => Err(TransportError::Connect {
                message: "connection refused".to_owned(),
            }),
            Step::Build => Err(TransportError::Build {
                message: "invalid header value".to_owned(),
            }),
            Step::Hang => {
                std::future::pending::<()>().await;
                Err(TransportError::Connect {
                    message: "unreachable".to_owned(),
                })
            }
        }
    }
}

/// Canned replies per function name, consumed in order.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    replies: Mutex<BTreeMap<String, VecDeque<Result<Value, String>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub(crate) fn reply(self, function: &str, reply: Result<Value, String>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies
                .entry(function.to_owned())
                .or_default()
                .push_back(reply);
        }
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RemoteApi for ScriptedApi {
    async fn invoke(&self, call: &FunctionCall) -> Result<Value, RemoteError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.name.clone());
        }
        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.get_mut(&call.name).and_then(VecDeque::pop_front));
        match reply {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(RemoteError::Http {
                function: call.name.clone(),
                status: 500,
                message,
            }),
            None => Err(RemoteError::Network {
                function: call.name.clone(),
                attempts: call.max_attempts(),
                source: TransportError::Connect {
                    message: "backend unreachable".to_owned(),
                },
            }),
        }
    }
}
