//! Interfaces for the two out-of-process collaborators the engine calls
//! out to. The engine never inspects closure bytes and never retries on
//! their behalf -- a transport failure is already folded into a `CResult`
//! by the implementation before it reaches a combinator.

use crate::datum::{Datum, HttpMethod, Headers};
use crate::ids::StageId;
use crate::result::CResult;
use async_trait::async_trait;

#[async_trait]
pub trait StageInvoker: Send + Sync {
    async fn invoke_stage(
        &self,
        function_id: &str,
        stage_id: StageId,
        closure: Datum,
        inputs: Vec<CResult>,
    ) -> CResult;
}

#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke_function(
        &self,
        function_id: &str,
        method: HttpMethod,
        headers: Headers,
        body: Vec<u8>,
    ) -> CResult;
}
