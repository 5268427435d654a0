//! Glue-backed job client

use aws_sdk_glue::Client;
use tracing::debug;

use txp_common::config::AwsConfig;
use txp_common::{EtlError, Result};

use crate::aws::load_sdk_config;
use crate::job::{JobClient, JobState};

/// [`JobClient`] over AWS Glue: start-job-run and get-job-run.
pub struct GlueJobClient {
    client: Client,
}

impl GlueJobClient {
    pub async fn new(config: &AwsConfig) -> Self {
        let sdk_config = load_sdk_config(config).await;
        Self {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait::async_trait]
impl JobClient for GlueJobClient {
    async fn start_job_run(&self, job_name: &str) -> Result<String> {
        let response = self
            .client
            .start_job_run()
            .job_name(job_name)
            .send()
            .await
            .map_err(|err| EtlError::JobRun(err.to_string()))?;

        response
            .job_run_id()
            .map(str::to_string)
            .ok_or_else(|| EtlError::JobRun("start_job_run returned no run id".to_string()))
    }

    async fn job_run_state(&self, job_name: &str, run_id: &str) -> Result<JobState> {
        let response = self
            .client
            .get_job_run()
            .job_name(job_name)
            .run_id(run_id)
            .send()
            .await
            .map_err(|err| EtlError::JobRun(err.to_string()))?;

        let state = response
            .job_run()
            .and_then(|run| run.job_run_state())
            .ok_or_else(|| EtlError::JobRun("get_job_run returned no state".to_string()))?;

        debug!(job = job_name, run_id, state = state.as_str(), "glue reported state");
        parse_state(state.as_str())
    }
}

fn parse_state(state: &str) -> Result<JobState> {
    match state {
        "STARTING" => Ok(JobState::Starting),
        "RUNNING" => Ok(JobState::Running),
        "STOPPING" => Ok(JobState::Stopping),
        "SUCCEEDED" => Ok(JobState::Succeeded),
        "FAILED" | "ERROR" | "TIMEOUT" => Ok(JobState::Failed),
        "STOPPED" => Ok(JobState::Stopped),
        other => Err(EtlError::JobRun(format!("unexpected job run state: {other}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state_maps_glue_failure_modes() {
        assert_eq!(parse_state("RUNNING").unwrap(), JobState::Running);
        assert_eq!(parse_state("SUCCEEDED").unwrap(), JobState::Succeeded);
        assert_eq!(parse_state("TIMEOUT").unwrap(), JobState::Failed);
        assert!(parse_state("WAITING").is_err());
    }
}
