use chrono::{DateTime, Utc};
use ledger::{CollectionKind, Gateway, GatewayError, Record};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Body sent to create a document.
#[derive(Debug, Serialize)]
struct NewDocument<'a, F> {
    #[serde(flatten)]
    fields: &'a F,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct DocumentCreated {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// [`Gateway`] talking to the remote document store over HTTP.
///
/// Collections live under `users/{user_id}/{collection}` and documents under
/// `users/{user_id}/{collection}/{id}`.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: Url,
    token: Option<String>,
    http: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Usage(format!("invalid base_url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Usage(format!("invalid base_url: {base_url}")));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("cost_tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url,
            token,
            http,
        })
    }

    fn endpoint(
        &self,
        user_id: &str,
        kind: CollectionKind,
        id: Option<&str>,
    ) -> std::result::Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GatewayError::Transport("invalid base_url".to_string()))?;
            segments
                .pop_if_empty()
                .extend(["users", user_id, kind.collection_name()]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let req = self.http.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> std::result::Result<Response, GatewayError> {
        let res = req
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        if res.status().is_success() {
            return Ok(res);
        }

        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(error_for_status(status, body))
    }
}

fn error_for_status(status: StatusCode, body: String) -> GatewayError {
    match status.as_u16() {
        401 => GatewayError::Unauthorized,
        403 => GatewayError::Forbidden,
        404 => GatewayError::NotFound(body),
        _ => GatewayError::Server(format!("{status}: {body}")),
    }
}

fn decode_error(err: reqwest::Error) -> GatewayError {
    GatewayError::Decode(err.to_string())
}

impl Gateway for HttpGateway {
    async fn list<R: Record>(&self, user_id: &str) -> std::result::Result<Vec<R>, GatewayError> {
        let url = self.endpoint(user_id, R::KIND, None)?;
        let res = self.send(self.request(Method::GET, url)).await?;
        let documents = res
            .json::<Vec<serde_json::Value>>()
            .await
            .map_err(decode_error)?;
        Ok(ledger::decode_documents(documents))
    }

    async fn create<R: Record>(
        &self,
        user_id: &str,
        fields: &R::Fields,
        created_at: DateTime<Utc>,
    ) -> std::result::Result<R, GatewayError> {
        let url = self.endpoint(user_id, R::KIND, None)?;
        let payload = NewDocument { fields, created_at };
        let res = self
            .send(self.request(Method::POST, url).json(&payload))
            .await?;
        let created = res
            .json::<DocumentCreated>()
            .await
            .map_err(decode_error)?;
        Ok(R::from_parts(created.id, fields.clone(), created_at))
    }

    async fn update<R: Record>(
        &self,
        user_id: &str,
        id: &str,
        fields: &R::Fields,
    ) -> std::result::Result<(), GatewayError> {
        let url = self.endpoint(user_id, R::KIND, Some(id))?;
        self.send(self.request(Method::PATCH, url).json(fields))
            .await?;
        Ok(())
    }

    async fn delete<R: Record>(
        &self,
        user_id: &str,
        id: &str,
    ) -> std::result::Result<(), GatewayError> {
        let url = self.endpoint(user_id, R::KIND, Some(id))?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
