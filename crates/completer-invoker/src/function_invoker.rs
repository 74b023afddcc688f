//! A `FunctionInvoker` that issues the raw HTTP call a graph's
//! `invokeFunction` stage describes. Only a transport failure (could not
//! reach the callee at all) becomes `Failure(function_invoke_failed)`; a
//! completed exchange is always `Success(HttpResp)` regardless of status
//! code, since the status is data for the caller's own closures to inspect.

use async_trait::async_trait;
use completer_core::{CResult, Datum, ErrorKind, FunctionInvoker, Headers, HttpMethod};

pub struct HttpFunctionInvoker {
    client: reqwest::Client,
}

impl HttpFunctionInvoker {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFunctionInvoker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FunctionInvoker for HttpFunctionInvoker {
    async fn invoke_function(
        &self,
        function_id: &str,
        method: HttpMethod,
        headers: Headers,
        body: Vec<u8>,
    ) -> CResult {
        let reqwest_method = match reqwest::Method::from_bytes(method.as_str().as_bytes()) {
            Ok(method) => method,
            Err(err) => return CResult::error(ErrorKind::FunctionInvokeFailed, err.to_string()),
        };

        let mut builder = self.client.request(reqwest_method, function_id).body(body);
        for (key, value) in headers.iter() {
            builder = builder.header(key, value);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return CResult::error(ErrorKind::FunctionInvokeFailed, err.to_string()),
        };

        let status_code = response.status().as_u16();
        let mut response_headers = Headers::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                response_headers.push(name.as_str(), value);
            }
        }

        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => return CResult::error(ErrorKind::FunctionInvokeFailed, err.to_string()),
        };

        CResult::Success(Datum::HttpResp {
            status_code,
            headers: response_headers,
            body,
        })
    }
}
