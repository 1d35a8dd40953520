//! In-memory stand-in for a Conductor cluster, used by `--simulation` runs and
//! tests. State is not persisted, so each CLI invocation starts empty.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::api::{CloudConfig, ErrorMessages, Job, JobError, JobResponse, Node, PRODUCT_SERVER};
use super::client::{ClientError, ConductorApi};

#[derive(Default)]
struct State {
    next_id: u64,
    jobs: HashMap<String, SimulatedJob>,
    nodes: Vec<Node>,
    min_nodes: usize,
    outage: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SimulatedJob {
    pub job: Job,
    pub response: JobResponse,
}

pub struct SimulatedConductor {
    state: Mutex<State>,
}

impl Default for SimulatedConductor {
    /// One active server and a minimum of one node.
    fn default() -> Self {
        Self::with_nodes(vec![Node::new(PRODUCT_SERVER, "active")], 1)
    }
}

impl SimulatedConductor {
    pub fn with_nodes(nodes: Vec<Node>, min_nodes: usize) -> Self {
        Self {
            state: Mutex::new(State {
                nodes,
                min_nodes,
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every call fail with HTTP 503 until [`Self::restore`] is called.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.state().outage = Some(message.into());
    }

    pub fn restore(&self) {
        self.state().outage = None;
    }

    /// Move a job along, as the cluster would. Returns false for unknown ids.
    pub fn set_status(&self, id: &str, status: &str, pct_complete: u32) -> bool {
        let mut state = self.state();
        let Some(entry) = state.jobs.get_mut(id) else {
            return false;
        };

        let now = Some(Utc::now().fixed_offset());
        let response = &mut entry.response;
        response.status = status.to_string();
        response.pct_complete = pct_complete;

        match status.to_ascii_lowercase().as_str() {
            "running" | "preprocessing" | "postprocessing" => {
                response.start_time = response.start_time.or(now);
            }
            "complete" => {
                response.start_time = response.start_time.or(now);
                response.complete_time = now;
            }
            "error" => {
                response.errored_time = now;
                response.error_messages = ErrorMessages {
                    errors: vec![JobError {
                        message: "simulated failure".to_string(),
                        ..Default::default()
                    }],
                };
            }
            _ => {}
        }
        true
    }

    /// The job document last submitted under `id`.
    pub fn submitted(&self, id: &str) -> Option<SimulatedJob> {
        self.state().jobs.get(id).cloned()
    }

    pub fn job_count(&self) -> usize {
        self.state().jobs.len()
    }

    fn check_outage(state: &State) -> Result<(), ClientError> {
        match &state.outage {
            Some(message) => Err(ClientError::Status {
                status: 503,
                body: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ConductorApi for SimulatedConductor {
    async fn submit_job(&self, job: &Job) -> Result<String, ClientError> {
        let mut state = self.state();
        Self::check_outage(&state)?;

        state.next_id += 1;
        let id = state.next_id.to_string();
        let response = JobResponse {
            href: format!("/jobs/{id}"),
            status: "pending".to_string(),
            submitted: Some(Utc::now().fixed_offset()),
            ..Default::default()
        };
        state.jobs.insert(
            id.clone(),
            SimulatedJob {
                job: job.clone(),
                response,
            },
        );
        Ok(id)
    }

    async fn query_job(&self, id: &str) -> Result<JobResponse, ClientError> {
        let state = self.state();
        Self::check_outage(&state)?;

        state
            .jobs
            .get(id)
            .map(|entry| entry.response.clone())
            .ok_or_else(|| ClientError::Status {
                status: 404,
                body: format!("job {id} not found"),
            })
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, ClientError> {
        let state = self.state();
        Self::check_outage(&state)?;
        Ok(state.nodes.clone())
    }

    async fn cloud_config(&self) -> Result<CloudConfig, ClientError> {
        let state = self.state();
        Self::check_outage(&state)?;
        Ok(CloudConfig {
            min_nodes: state.min_nodes,
            max_nodes: state.nodes.len().max(state.min_nodes),
            authorize_scaling: false,
        })
    }
}
