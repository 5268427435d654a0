//! Managed job trigger and monitoring
//!
//! A job run moves STARTING → RUNNING → one of {SUCCEEDED, FAILED,
//! STOPPED}. This module only observes: it starts a run, then polls the
//! state at a fixed interval until the run is terminal or the overall
//! timeout is exceeded. Failed runs are reported, never retried.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use txp_common::config::AwsConfig;
use txp_common::{EtlError, Result};

/// Observed state of a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Starting,
    Running,
    Stopping,
    Succeeded,
    Failed,
    Stopped,
}

impl JobState {
    /// Terminal states end the polling loop.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed | JobState::Stopped)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Starting => "STARTING",
            JobState::Running => "RUNNING",
            JobState::Stopping => "STOPPING",
            JobState::Succeeded => "SUCCEEDED",
            JobState::Failed => "FAILED",
            JobState::Stopped => "STOPPED",
        };
        write!(f, "{s}")
    }
}

/// The two operations the monitor needs from the job service.
#[async_trait]
pub trait JobClient {
    /// Start a run of the named job, returning its run id.
    async fn start_job_run(&self, job_name: &str) -> Result<String>;

    /// Current state of a run.
    async fn job_run_state(&self, job_name: &str, run_id: &str) -> Result<JobState>;
}

/// Polling parameters. Both bounds are mandatory; there is no unbounded
/// polling mode.
#[derive(Debug, Clone, Copy)]
pub struct MonitorOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl MonitorOptions {
    pub fn from_config(config: &AwsConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            timeout: Duration::from_secs(config.job_timeout_secs),
        }
    }
}

/// Start a run of the named job.
pub async fn trigger<C: JobClient>(client: &C, job_name: &str) -> Result<String> {
    let run_id = client.start_job_run(job_name).await?;
    info!(job = job_name, run_id = %run_id, "job run triggered");
    Ok(run_id)
}

/// Poll the run until it reaches a terminal state. Returns
/// [`EtlError::JobTimeout`] when the next poll would exceed the overall
/// timeout.
pub async fn monitor<C: JobClient>(
    client: &C,
    job_name: &str,
    run_id: &str,
    options: &MonitorOptions,
) -> Result<JobState> {
    let started = tokio::time::Instant::now();
    loop {
        let state = client.job_run_state(job_name, run_id).await?;
        info!(job = job_name, run_id, state = %state, "job run status");

        if state.is_terminal() {
            return Ok(state);
        }
        if started.elapsed() + options.poll_interval > options.timeout {
            return Err(EtlError::JobTimeout {
                job_name: job_name.to_string(),
                waited_secs: options.timeout.as_secs(),
            });
        }
        tokio::time::sleep(options.poll_interval).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Plays back a fixed sequence of states, repeating the last one.
    struct ScriptedClient {
        states: Mutex<Vec<JobState>>,
        polls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(states: Vec<JobState>) -> Self {
            Self {
                states: Mutex::new(states),
                polls: AtomicUsize::new(0),
            }
        }

        fn poll_count(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobClient for ScriptedClient {
        async fn start_job_run(&self, _job_name: &str) -> Result<String> {
            Ok("jr_test".to_string())
        }

        async fn job_run_state(&self, _job_name: &str, _run_id: &str) -> Result<JobState> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let mut states = self.states.lock().unwrap();
            if states.len() > 1 {
                Ok(states.remove(0))
            } else {
                Ok(states[0])
            }
        }
    }

    fn fast_options() -> MonitorOptions {
        MonitorOptions {
            poll_interval: Duration::from_secs(10),
            timeout: Duration::from_secs(3600),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_polls_until_terminal() {
        let client = ScriptedClient::new(vec![
            JobState::Running,
            JobState::Running,
            JobState::Succeeded,
        ]);

        let state = monitor(&client, "etl-job", "jr_test", &fast_options())
            .await
            .unwrap();

        assert_eq!(state, JobState::Succeeded);
        assert_eq!(client.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_stops_on_failed() {
        let client = ScriptedClient::new(vec![JobState::Starting, JobState::Failed]);

        let state = monitor(&client, "etl-job", "jr_test", &fast_options())
            .await
            .unwrap();

        assert_eq!(state, JobState::Failed);
        assert_eq!(client.poll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_times_out() {
        let client = ScriptedClient::new(vec![JobState::Running]);
        let options = MonitorOptions {
            poll_interval: Duration::from_secs(10),
            timeout: Duration::from_secs(25),
        };

        let err = monitor(&client, "etl-job", "jr_test", &options)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EtlError::JobTimeout { waited_secs: 25, .. }
        ));
        // Polls at t=0, t=10, t=20; the poll at t=30 would exceed 25s.
        assert_eq!(client.poll_count(), 3);
    }

    #[test]
    fn test_terminal_states() {
        for state in [JobState::Succeeded, JobState::Failed, JobState::Stopped] {
            assert!(state.is_terminal());
        }
        for state in [JobState::Starting, JobState::Running, JobState::Stopping] {
            assert!(!state.is_terminal());
        }
    }
}
