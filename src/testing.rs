// src/testing.rs

//! Scripted gateway for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::Payload;
use crate::services::gateway::{Endpoint, FetchGateway};
use crate::utils::lock;

#[derive(Clone)]
struct Reply {
    outcome: Result<Payload, FetchError>,
    delay: Duration,
}

/// Answers endpoints from per-endpoint reply queues and records every
/// call. The last reply in a queue repeats. Unscripted reads fail with a
/// 404 server error; unscripted writes are acknowledged.
#[derive(Default)]
pub struct ScriptedGateway {
    routes: Mutex<Vec<(Endpoint, VecDeque<Reply>)>>,
    calls: Mutex<Vec<Endpoint>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, endpoint: Endpoint, reply: Reply) {
        let mut routes = lock(&self.routes);
        match routes.iter_mut().find(|(e, _)| *e == endpoint) {
            Some((_, queue)) => queue.push_back(reply),
            None => routes.push((endpoint, VecDeque::from([reply]))),
        }
    }

    pub fn reply(&self, endpoint: Endpoint, payload: Payload) {
        self.reply_after(endpoint, payload, Duration::ZERO);
    }

    pub fn reply_after(&self, endpoint: Endpoint, payload: Payload, delay: Duration) {
        self.push(
            endpoint,
            Reply {
                outcome: Ok(payload),
                delay,
            },
        );
    }

    pub fn fail(&self, endpoint: Endpoint, error: FetchError) {
        self.fail_after(endpoint, error, Duration::ZERO);
    }

    pub fn fail_after(&self, endpoint: Endpoint, error: FetchError, delay: Duration) {
        self.push(
            endpoint,
            Reply {
                outcome: Err(error),
                delay,
            },
        );
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        lock(&self.calls).clone()
    }

    pub fn calls_where(&self, pred: impl Fn(&Endpoint) -> bool) -> Vec<Endpoint> {
        lock(&self.calls).iter().filter(|e| pred(e)).cloned().collect()
    }

    fn next_reply(&self, endpoint: &Endpoint) -> Reply {
        let mut routes = lock(&self.routes);
        let queue = routes
            .iter_mut()
            .find(|(e, _)| e == endpoint)
            .map(|(_, queue)| queue);

        match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
        .unwrap_or_else(|| Reply {
            outcome: if endpoint.is_write() {
                Ok(Payload::Ack)
            } else {
                Err(FetchError::server(Some(404), format!("no script for {endpoint}")))
            },
            delay: Duration::ZERO,
        })
    }
}

#[async_trait]
impl FetchGateway for ScriptedGateway {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Payload, FetchError> {
        lock(&self.calls).push(endpoint.clone());
        let reply = self.next_reply(endpoint);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.outcome
    }
}
