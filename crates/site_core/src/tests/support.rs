use std::{collections::VecDeque, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::{FormKind, FormRecord};
use tokio::{
    net::TcpListener,
    sync::{Mutex, Semaphore},
};

use crate::api::{ApiFailure, LeadApi, SubmissionReceipt};

pub(crate) fn sample_contact_record() -> FormRecord {
    FormRecord {
        institution_name: "ABC College".into(),
        contact_person: "Jane Doe".into(),
        email: "jane@abc.edu".into(),
        phone: String::new(),
        message: "Interested in funding.".into(),
    }
}

pub(crate) fn receipt(message: &str) -> SubmissionReceipt {
    SubmissionReceipt {
        message: Some(message.to_string()),
        submission_id: None,
    }
}

pub(crate) fn rejection(status: StatusCode, detail: Option<&str>) -> ApiFailure {
    ApiFailure::Rejected {
        url: "http://lead-api.test/api/contact".into(),
        status,
        detail: detail.map(str::to_owned),
    }
}

/// Scripted `LeadApi`. Replies are consumed in order; once exhausted every
/// call succeeds with an empty receipt. With a gate, each call records itself
/// and then waits for one permit before replying.
pub(crate) struct TestLeadApi {
    replies: Mutex<VecDeque<Result<SubmissionReceipt, ApiFailure>>>,
    pub(crate) calls: Arc<Mutex<Vec<(FormKind, FormRecord)>>>,
    gate: Option<Arc<Semaphore>>,
}

impl TestLeadApi {
    pub(crate) fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    pub(crate) fn reply(mut self, reply: Result<SubmissionReceipt, ApiFailure>) -> Self {
        self.replies.get_mut().push_back(reply);
        self
    }

    pub(crate) fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl LeadApi for TestLeadApi {
    async fn submit(
        &self,
        kind: FormKind,
        record: &FormRecord,
    ) -> Result<SubmissionReceipt, ApiFailure> {
        self.calls.lock().await.push((kind, record.clone()));
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .expect("test gate closed")
                .forget();
        }
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(SubmissionReceipt::default()))
    }
}

#[derive(Clone)]
pub(crate) struct LeadServerState {
    pub(crate) received: Arc<Mutex<Vec<(FormKind, Value)>>>,
    reply: Arc<Mutex<(StatusCode, Value)>>,
}

impl LeadServerState {
    pub(crate) async fn set_reply(&self, status: StatusCode, body: Value) {
        *self.reply.lock().await = (status, body);
    }
}

async fn record_and_reply(
    state: &LeadServerState,
    kind: FormKind,
    body: Value,
) -> (StatusCode, Json<Value>) {
    state.received.lock().await.push((kind, body));
    let (status, reply) = state.reply.lock().await.clone();
    (status, Json(reply))
}

async fn handle_contact(
    State(state): State<LeadServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_and_reply(&state, FormKind::Contact, body).await
}

async fn handle_collaboration(
    State(state): State<LeadServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_and_reply(&state, FormKind::Collaboration, body).await
}

async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "timestamp": "2024-05-01T09:30:00.123456"}))
}

async fn handle_stats(State(state): State<LeadServerState>) -> Json<Value> {
    let received = state.received.lock().await;
    let contacts = received
        .iter()
        .filter(|(kind, _)| *kind == FormKind::Contact)
        .count();
    Json(json!({
        "total_contacts": contacts,
        "total_collaborations": received.len() - contacts,
        "timestamp": "2024-05-01T09:30:00"
    }))
}

/// Lead API stand-in on an ephemeral port. Every form POST is recorded and
/// answered with the current reply.
pub(crate) async fn spawn_lead_server(
    status: StatusCode,
    reply: Value,
) -> Result<(String, LeadServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = LeadServerState {
        received: Arc::new(Mutex::new(Vec::new())),
        reply: Arc::new(Mutex::new((status, reply))),
    };
    let app = Router::new()
        .route("/api/contact", post(handle_contact))
        .route("/api/collaboration", post(handle_collaboration))
        .route("/api/health", get(handle_health))
        .route("/api/submissions/stats", get(handle_stats))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

/// Base URL of a port that refuses connections.
pub(crate) async fn unreachable_base_url() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}
