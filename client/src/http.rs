//! reqwest transport.
//!
//! Implements [`AuditApi`] over HTTP. Authenticated calls carry the token
//! twice: as a bearer `Authorization` header and as the `access_token`
//! cookie, since some result endpoints only read the cookie.

use reqwest::header::{AUTHORIZATION, COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use sitetester_core::api::stop_path;
use sitetester_core::credentials::ACCESS_TOKEN_COOKIE;
use sitetester_core::{
    ApiError, ApiResult, AuditApi, AuditKind, AuditProfile, BearerToken, H1Result,
    PerformanceReport, PhoneResult, ProgressRecord, SessionConfig, SessionId, UploadReceipt,
    UploadRequest,
};

use crate::config::ClientConfig;

/// HTTP client of the audit backend.
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    config: ClientConfig,
}

impl HttpApi {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn authorized(&self, request: RequestBuilder, token: &BearerToken) -> RequestBuilder {
        request
            .header(AUTHORIZATION, token.authorization_value())
            .header(COOKIE, format!("{}={}", ACCESS_TOKEN_COOKIE, token.secret()))
    }

    fn get(&self, path: &str, token: Option<&BearerToken>) -> RequestBuilder {
        let request = self.client.get(self.config.url(path));
        match token {
            Some(token) => self.authorized(request, token),
            None => request,
        }
    }

    /// Send, then decode a success body or map the failure.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            log::debug!("Backend replied {}: {}", status, body);
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        Ok(body)
    }

    fn form(request: &UploadRequest) -> ApiResult<Form> {
        let mut form = Form::new();

        if let Some(file) = &request.file {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(file.content_type)
                .map_err(|e| ApiError::Decode(e.to_string()))?;
            form = form.part("file", part);
        }

        for (name, value) in &request.fields {
            form = form.text(*name, value.clone());
        }

        Ok(form)
    }
}

impl AuditApi for HttpApi {
    async fn submit(&self, request: &UploadRequest, token: &BearerToken) -> ApiResult<UploadReceipt> {
        let profile = request.kind.profile();
        let form = Self::form(request)?;
        let builder = self
            .client
            .post(self.config.url(&profile.upload_path()))
            .multipart(form);

        self.send_json(self.authorized(builder, token)).await
    }

    async fn progress_record(
        &self,
        profile: &AuditProfile,
        session: &SessionId,
    ) -> ApiResult<ProgressRecord> {
        self.send_json(self.get(&profile.progress_path(session), None))
            .await
    }

    async fn performance_report(
        &self,
        session: &SessionId,
        token: Option<&BearerToken>,
    ) -> ApiResult<PerformanceReport> {
        let path = AuditKind::Performance.profile().progress_path(session);
        self.send_json(self.get(&path, token)).await
    }

    async fn h1_results(&self, session: &SessionId, token: &BearerToken) -> ApiResult<Vec<H1Result>> {
        let path = format!("/h1-results/{}", session);
        self.send_json(self.get(&path, Some(token))).await
    }

    async fn phone_results(
        &self,
        session: &SessionId,
        token: &BearerToken,
    ) -> ApiResult<Vec<PhoneResult>> {
        let path = format!("/phone-results/{}", session);
        self.send_json(self.get(&path, Some(token))).await
    }

    async fn session_config(
        &self,
        kind: AuditKind,
        session: &SessionId,
        token: Option<&BearerToken>,
    ) -> ApiResult<SessionConfig> {
        let path = format!("/session-config/{}/{}", kind.slug(), session);
        self.send_json(self.get(&path, token)).await
    }

    async fn stop_session(&self, session: &SessionId, token: &BearerToken) -> ApiResult<()> {
        let builder = self.client.post(self.config.url(&stop_path(session)));
        self.send(self.authorized(builder, token)).await.map(|_| ())
    }
}
