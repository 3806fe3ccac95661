//! gloo-net transport.
//!
//! Implements [`AuditApi`] with the browser's `fetch`. Requests are
//! same-origin, so the `access_token` cookie travels on its own; only the
//! bearer header is added.

use gloo_net::http::{Request, RequestBuilder, Response};
use js_sys::{Array, Uint8Array};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;
use web_sys::{Blob, FormData};

use sitetester_core::api::stop_path;
use sitetester_core::{
    ApiError, ApiResult, AuditApi, AuditKind, AuditProfile, BearerToken, H1Result,
    PerformanceReport, PhoneResult, ProgressRecord, SessionConfig, SessionId, UploadReceipt,
    UploadRequest,
};

use crate::config::backend_url;

/// The audit backend, reached from the page.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserApi;

fn js_error(err: JsValue) -> ApiError {
    ApiError::Decode(format!("{:?}", err))
}

fn authorized(request: RequestBuilder, token: Option<&BearerToken>) -> RequestBuilder {
    match token {
        Some(token) => request.header("Authorization", &token.authorization_value()),
        None => request,
    }
}

/// Multipart body of an upload.
fn form_data(request: &UploadRequest) -> ApiResult<FormData> {
    let form = FormData::new().map_err(js_error)?;

    if let Some(file) = &request.file {
        let parts = Array::of1(&Uint8Array::from(file.bytes.as_slice()));
        let blob = Blob::new_with_u8_array_sequence(&parts).map_err(js_error)?;
        form.append_with_blob_and_filename("file", &blob, &file.name)
            .map_err(js_error)?;
    }

    for (name, value) in &request.fields {
        form.append_with_str(name, value).map_err(js_error)?;
    }

    Ok(form)
}

/// Body of a success response, or the mapped failure.
async fn read(response: Response) -> ApiResult<String> {
    let ok = response.ok();
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !ok {
        log::debug!("Backend replied {}: {}", status, body);
        return Err(ApiError::from_status(status, &body));
    }
    Ok(body)
}

async fn get_json<T: DeserializeOwned>(path: &str, token: Option<&BearerToken>) -> ApiResult<T> {
    let response = authorized(Request::get(&backend_url(path)), token)
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    let body = read(response).await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

impl AuditApi for BrowserApi {
    async fn submit(&self, request: &UploadRequest, token: &BearerToken) -> ApiResult<UploadReceipt> {
        let url = backend_url(&request.kind.profile().upload_path());
        let response = authorized(Request::post(&url), Some(token))
            .body(form_data(request)?)
            .map_err(|e| ApiError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let body = read(response).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn progress_record(
        &self,
        profile: &AuditProfile,
        session: &SessionId,
    ) -> ApiResult<ProgressRecord> {
        get_json(&profile.progress_path(session), None).await
    }

    async fn performance_report(
        &self,
        session: &SessionId,
        token: Option<&BearerToken>,
    ) -> ApiResult<PerformanceReport> {
        get_json(&AuditKind::Performance.profile().progress_path(session), token).await
    }

    async fn h1_results(&self, session: &SessionId, token: &BearerToken) -> ApiResult<Vec<H1Result>> {
        get_json(&format!("/h1-results/{}", session), Some(token)).await
    }

    async fn phone_results(
        &self,
        session: &SessionId,
        token: &BearerToken,
    ) -> ApiResult<Vec<PhoneResult>> {
        get_json(&format!("/phone-results/{}", session), Some(token)).await
    }

    async fn session_config(
        &self,
        kind: AuditKind,
        session: &SessionId,
        token: Option<&BearerToken>,
    ) -> ApiResult<SessionConfig> {
        get_json(&format!("/session-config/{}/{}", kind.slug(), session), token).await
    }

    async fn stop_session(&self, session: &SessionId, token: &BearerToken) -> ApiResult<()> {
        let response = authorized(Request::post(&backend_url(&stop_path(session))), Some(token))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        read(response).await.map(|_| ())
    }
}
