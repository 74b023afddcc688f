//! A `StageInvoker` that posts the closure and its inputs to a configured
//! stage-runner URL as a JSON envelope and folds transport failures into a
//! `stage_invoke_failed` result rather than surfacing them as errors.

use crate::errors::InvokerError;
use async_trait::async_trait;
use completer_core::{CResult, Datum, ErrorKind, StageId, StageInvoker};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct WireResult {
    success: bool,
    datum: Datum,
}

impl From<&CResult> for WireResult {
    fn from(result: &CResult) -> Self {
        match result {
            CResult::Success(datum) => WireResult { success: true, datum: datum.clone() },
            CResult::Failure(datum) => WireResult { success: false, datum: datum.clone() },
        }
    }
}

impl From<WireResult> for CResult {
    fn from(wire: WireResult) -> Self {
        if wire.success {
            CResult::Success(wire.datum)
        } else {
            CResult::Failure(wire.datum)
        }
    }
}

#[derive(Serialize)]
struct StageInvokeRequest<'a> {
    function_id: &'a str,
    stage_id: String,
    closure: &'a Datum,
    inputs: Vec<WireResult>,
}

pub struct HttpStageInvoker {
    client: reqwest::Client,
    stage_runner_url: reqwest::Url,
}

impl HttpStageInvoker {
    pub fn new(stage_runner_url: impl AsRef<str>) -> Result<Self, InvokerError> {
        let stage_runner_url = reqwest::Url::parse(stage_runner_url.as_ref())
            .map_err(|err| InvokerError::InvalidStageRunnerUrl(err.to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            stage_runner_url,
        })
    }
}

#[async_trait]
impl StageInvoker for HttpStageInvoker {
    async fn invoke_stage(
        &self,
        function_id: &str,
        stage_id: StageId,
        closure: Datum,
        inputs: Vec<CResult>,
    ) -> CResult {
        let request = StageInvokeRequest {
            function_id,
            stage_id: stage_id.to_string(),
            closure: &closure,
            inputs: inputs.iter().map(WireResult::from).collect(),
        };

        let response = match self
            .client
            .post(self.stage_runner_url.clone())
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return CResult::error(ErrorKind::StageInvokeFailed, err.to_string()),
        };

        if !response.status().is_success() {
            return CResult::error(
                ErrorKind::StageInvokeFailed,
                format!("stage runner responded with {}", response.status()),
            );
        }

        match response.json::<WireResult>().await {
            Ok(wire) => wire.into(),
            Err(err) => CResult::error(
                ErrorKind::StageInvokeFailed,
                format!("malformed stage runner response: {err}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_an_unparseable_stage_runner_url() {
        let err = HttpStageInvoker::new("not a url").unwrap_err();
        assert!(matches!(err, InvokerError::InvalidStageRunnerUrl(_)));
    }

    #[test]
    fn wire_result_round_trips_success_and_failure() {
        let success = CResult::Success(Datum::Empty);
        let failure = CResult::error(ErrorKind::UnknownError, "boom");

        let wire_success = WireResult::from(&success);
        let wire_failure = WireResult::from(&failure);

        assert_eq!(CResult::from(wire_success), success);
        assert_eq!(CResult::from(wire_failure), failure);
    }
}
