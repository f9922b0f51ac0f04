//! Worker Process Backend
//!
//! Drives the training framework through one long-lived child process
//! speaking newline-delimited JSON on stdin/stdout. The worker brings the
//! framework runtime up once per session and serves every experiment:
//!
//! ```text
//! -> {"op":"init"}                   <- {"ok":true}      (session start)
//! -> {"op":"build","config":{...}}   <- {"ok":true}      (per experiment)
//! -> {"op":"train"}                  <- {"result":{...}} (per round)
//! -> {"op":"stop"}                   <- {"ok":true}      (per experiment)
//! -> {"op":"shutdown"}               <- {"ok":true}      (session end)
//! ```
//!
//! Any reply carrying `"error"` fails the request. Output lines that do not
//! parse as a JSON object are worker chatter and are skipped. A worker that
//! breaks the pipe is dropped and a fresh one is started for the next
//! experiment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::backend::{Trainer, TrainingBackend};
use super::config::TrainerConfig;
use super::replay::nullify_non_finite;
use crate::config::BackendConfig;
use crate::error::{Result, RlcostError};

const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum WorkerRequest<'a> {
    Init,
    Build { config: &'a TrainerConfig },
    Train,
    Stop,
    Shutdown,
}

#[derive(Debug, Default, Deserialize)]
struct WorkerReply {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl WorkerReply {
    fn into_result(self) -> Result<Self> {
        match self.error {
            Some(error) => Err(RlcostError::Backend(format!("worker error: {}", error))),
            None => Ok(self),
        }
    }

    fn acknowledge(self, op: &str) -> Result<()> {
        let reply = self.into_result()?;
        if !reply.ok {
            return Err(RlcostError::Backend(format!("worker did not acknowledge {}", op)));
        }
        Ok(())
    }
}

/// A running worker and its stdio pipes
#[derive(Debug)]
struct WorkerProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    label: String,
}

impl WorkerProcess {
    fn spawn(command: &str, args: &[String]) -> Result<Self> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RlcostError::Backend(format!("failed to spawn worker {}: {}", command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RlcostError::Backend("worker stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RlcostError::Backend("worker stdout unavailable".to_string()))?;

        let label = format!("{}[{}]", command, child.id().unwrap_or_default());
        info!(worker = %label, "Spawned training worker");

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout).lines(),
            label,
        })
    }

    /// Send one request and read its reply; errors here mean the pipe is unusable
    async fn request(&mut self, request: &WorkerRequest<'_>) -> Result<WorkerReply> {
        let stdin = self.stdin.as_mut().ok_or_else(|| {
            RlcostError::Backend(format!("worker {} input already closed", self.label))
        })?;

        let mut line = serde_json::to_string(request)?;
        line.push('\n');
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;

        self.read_reply().await
    }

    async fn read_reply(&mut self) -> Result<WorkerReply> {
        loop {
            let line = self.stdout.next_line().await?.ok_or_else(|| {
                RlcostError::Backend(format!("worker {} exited before replying", self.label))
            })?;

            let trimmed = line.trim();
            if !trimmed.starts_with('{') {
                debug!(worker = %self.label, "{}", trimmed);
                continue;
            }

            match serde_json::from_str(&nullify_non_finite(trimmed)) {
                Ok(reply) => return Ok(reply),
                Err(e) => debug!(worker = %self.label, "Skipping unparseable output ({}): {}", e, trimmed),
            }
        }
    }

    /// Ask the worker to tear the runtime down and wait for it to exit
    ///
    /// A worker still running after `timeout` is killed.
    async fn shutdown(mut self, timeout: Duration) -> Result<()> {
        let acknowledged = match tokio::time::timeout(timeout, self.request(&WorkerRequest::Shutdown)).await {
            Ok(reply) => reply.and_then(|reply| reply.acknowledge("shutdown")),
            Err(_) => Err(RlcostError::Backend(format!(
                "worker {} did not answer shutdown within {:?}",
                self.label, timeout
            ))),
        };

        // Closing stdin lets a well-behaved worker exit on its own
        self.stdin.take();

        let status = match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!(worker = %self.label, ?timeout, "Worker still running after shutdown, killing it");
                self.child.kill().await?;
                return Err(RlcostError::Backend(format!(
                    "worker {} did not exit within {:?} of shutdown",
                    self.label, timeout
                )));
            }
        };

        acknowledged?;
        if !status.success() {
            warn!(worker = %self.label, %status, "Worker exited with failure status");
            return Err(RlcostError::Backend(format!(
                "worker {} exited with {}",
                self.label, status
            )));
        }

        info!(worker = %self.label, "Training worker shut down");
        Ok(())
    }
}

type SharedWorker = Arc<Mutex<Option<WorkerProcess>>>;

/// Send a request to the current worker, dropping it if the pipe breaks
async fn exchange(slot: &mut Option<WorkerProcess>, request: &WorkerRequest<'_>) -> Result<WorkerReply> {
    let worker = slot
        .as_mut()
        .ok_or_else(|| RlcostError::Backend("training worker is not running".to_string()))?;

    match worker.request(request).await {
        Ok(reply) => reply.into_result(),
        Err(e) => {
            warn!(worker = %worker.label, "Dropping training worker: {}", e);
            *slot = None;
            Err(e)
        }
    }
}

/// Backend running the framework in one worker process per session
#[derive(Debug)]
pub struct ProcessBackend {
    command: String,
    args: Vec<String>,
    stop_timeout: Duration,
    worker: SharedWorker,
}

impl ProcessBackend {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            worker: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        let stop_timeout =
            Duration::try_from_secs_f64(config.stop_timeout_s).unwrap_or(DEFAULT_STOP_TIMEOUT);
        Self::new(config.command.clone(), config.args.clone()).with_stop_timeout(stop_timeout)
    }

    /// Spawn the worker and bring the runtime up unless it is already running
    async fn start_worker(&self, slot: &mut Option<WorkerProcess>) -> Result<()> {
        if slot.is_some() {
            return Ok(());
        }

        let mut worker = WorkerProcess::spawn(&self.command, &self.args)?;
        worker.request(&WorkerRequest::Init).await?.acknowledge("init")?;
        info!(worker = %worker.label, "Training runtime ready");

        *slot = Some(worker);
        Ok(())
    }
}

#[async_trait]
impl TrainingBackend for ProcessBackend {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn init(&self) -> Result<()> {
        let mut slot = self.worker.lock().await;
        self.start_worker(&mut slot).await
    }

    async fn build(&self, config: &TrainerConfig) -> Result<Box<dyn Trainer>> {
        let label = format!("{}/{}", config.algorithm, config.env);
        let mut slot = self.worker.lock().await;

        if slot.is_none() {
            info!(experiment = %label, "No training worker running, starting one");
        }
        self.start_worker(&mut slot).await?;

        exchange(&mut slot, &WorkerRequest::Build { config })
            .await?
            .acknowledge("build")?;
        debug!(experiment = %label, "Trainer built");

        Ok(Box::new(ProcessTrainer {
            worker: Arc::clone(&self.worker),
            label,
            stopped: false,
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        let worker = self.worker.lock().await.take();
        match worker {
            Some(worker) => worker.shutdown(self.stop_timeout).await,
            None => Ok(()),
        }
    }
}

/// Trainer living in the session's worker process
pub struct ProcessTrainer {
    worker: SharedWorker,
    label: String,
    stopped: bool,
}

#[async_trait]
impl Trainer for ProcessTrainer {
    async fn train(&mut self) -> Result<Value> {
        let mut slot = self.worker.lock().await;
        let reply = exchange(&mut slot, &WorkerRequest::Train).await?;
        reply.result.ok_or_else(|| {
            RlcostError::Backend(format!("worker replied without a result for {}", self.label))
        })
    }

    async fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;

        let mut slot = self.worker.lock().await;
        exchange(&mut slot, &WorkerRequest::Stop)
            .await?
            .acknowledge("stop")?;

        info!(experiment = %self.label, "Trainer stopped");
        Ok(())
    }
}
