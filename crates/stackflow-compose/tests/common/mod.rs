//! In-memory StackClient that records every call

#![allow(dead_code)]

use async_trait::async_trait;
use stackflow_cloud::{
    ChangeSetHandle, ClientError, Result, StackClient, StackRequest, StackStatus,
};
use stackflow_compose::{Composer, ComposerOptions, Reporter};
use stackflow_core::{ComposeConfig, Flow, Stack};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Describe(String),
    Create(String),
    Update(String),
    Delete(String),
    CreateChangeSet { stack: String, name: String },
    ExecuteChangeSet(String),
}

impl Call {
    pub fn stack(&self) -> &str {
        match self {
            Call::Describe(s)
            | Call::Create(s)
            | Call::Update(s)
            | Call::Delete(s)
            | Call::ExecuteChangeSet(s) => s,
            Call::CreateChangeSet { stack, .. } => stack,
        }
    }

    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Call::Create(_) | Call::Update(_) | Call::Delete(_) | Call::ExecuteChangeSet(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Describe,
    Create,
    Update,
    Delete,
    CreateChangeSet,
    ExecuteChangeSet,
}

/// Scripted statuses and failures per stack; unknown stacks do not exist
#[derive(Default)]
pub struct RecordingClient {
    statuses: Mutex<HashMap<String, StackStatus>>,
    failures: Mutex<HashMap<(String, Op), ClientError>>,
    calls: Mutex<Vec<Call>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(self, stack: &str, status: StackStatus) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(stack.to_string(), status);
        self
    }

    pub fn failing(self, stack: &str, op: Op, error: ClientError) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert((stack.to_string(), op), error);
        self
    }

    /// Every mutating call takes this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, stack: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.stack() == stack)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn scripted_failure(&self, stack: &str, op: Op) -> Result<()> {
        match self.failures.lock().unwrap().get(&(stack.to_string(), op)) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn set_status(&self, stack: &str, status: StackStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(stack.to_string(), status);
    }

    /// Scripted failures return at once; successes take `delay`
    async fn mutate(&self, stack: &str, op: Op) -> Result<()> {
        self.scripted_failure(stack, op)?;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl StackClient for RecordingClient {
    async fn describe_status(&self, stack_name: &str) -> Result<StackStatus> {
        self.record(Call::Describe(stack_name.to_string()));
        self.scripted_failure(stack_name, Op::Describe)?;
        self.statuses
            .lock()
            .unwrap()
            .get(stack_name)
            .cloned()
            .ok_or(ClientError::NotFound)
    }

    async fn create_and_wait(&self, request: &StackRequest) -> Result<()> {
        self.record(Call::Create(request.stack_name.clone()));
        self.mutate(&request.stack_name, Op::Create).await?;
        self.set_status(&request.stack_name, StackStatus::CreateComplete);
        Ok(())
    }

    async fn update_and_wait(&self, request: &StackRequest) -> Result<()> {
        self.record(Call::Update(request.stack_name.clone()));
        self.mutate(&request.stack_name, Op::Update).await?;
        self.set_status(&request.stack_name, StackStatus::UpdateComplete);
        Ok(())
    }

    async fn delete_and_wait(&self, stack_name: &str) -> Result<()> {
        self.record(Call::Delete(stack_name.to_string()));
        self.mutate(stack_name, Op::Delete).await?;
        self.set_status(stack_name, StackStatus::DeleteComplete);
        Ok(())
    }

    async fn create_change_set_and_wait(
        &self,
        request: &StackRequest,
        change_set_name: &str,
    ) -> Result<ChangeSetHandle> {
        self.record(Call::CreateChangeSet {
            stack: request.stack_name.clone(),
            name: change_set_name.to_string(),
        });
        self.scripted_failure(&request.stack_name, Op::CreateChangeSet)?;
        Ok(ChangeSetHandle {
            stack_name: request.stack_name.clone(),
            change_set_name: change_set_name.to_string(),
            id: format!("arn:changeSet/{change_set_name}"),
            stack_id: format!("arn:stack/{}", request.stack_name),
            link: Some(format!("https://console.example/{change_set_name}")),
        })
    }

    async fn execute_change_set_and_wait(&self, change_set: &ChangeSetHandle) -> Result<()> {
        self.record(Call::ExecuteChangeSet(change_set.stack_name.clone()));
        self.mutate(&change_set.stack_name, Op::ExecuteChangeSet).await?;
        self.set_status(&change_set.stack_name, StackStatus::UpdateComplete);
        Ok(())
    }
}

pub fn stack(name: &str) -> Stack {
    Stack::new(name).with_template_url(format!("https://templates.example/{name}.yml"))
}

pub fn flow(name: &str, order: i64, stacks: &[&str]) -> Flow {
    Flow::new(name, order, stacks.iter().map(|s| stack(s)).collect())
}

pub fn config(flows: Vec<Flow>) -> ComposeConfig {
    let mut config = ComposeConfig::default();
    for flow in flows {
        config.flows.insert(flow.name.clone(), flow);
    }
    config
}

pub fn composer(client: Arc<RecordingClient>, dry_run: bool, workers: i64) -> Composer {
    Composer::new(
        client,
        Reporter::silent(),
        ComposerOptions {
            dry_run,
            workers,
            grace_period: Duration::from_millis(200),
        },
    )
}
