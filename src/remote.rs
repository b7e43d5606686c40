use anyhow::Context;
use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Method, StatusCode, Url,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{
    config::RemoteConfig,
    error::{StoreError, StoreResult},
    model::{NewTask, Task, TaskChanges, TaskId},
    store::TaskStore,
};

const TABLE_PATH: &str = "rest/v1/todos";

/// The hosted `todos` table, reached through its REST interface.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    table: Url,
    /// `apikey` and bearer headers sent with every request.
    auth: HeaderMap,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(alias = "msg")]
    message: Option<String>,
    code: Option<Value>,
}

impl RestStore {
    pub fn connect(config: &RemoteConfig) -> anyhow::Result<Self> {
        let mut auth = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&config.anon_key)
            .context("anon key is not a valid header value")?;
        api_key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.anon_key))
            .context("anon key is not a valid header value")?;
        bearer.set_sensitive(true);
        auth.insert("apikey", api_key);
        auth.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed building HTTP client for the task store")?;
        let table = config
            .url
            .join(TABLE_PATH)
            .with_context(|| format!("cannot derive table endpoint from {}", config.url))?;

        debug!(endpoint = %table, timeout = ?config.timeout, "task store client ready");
        Ok(Self {
            client,
            table,
            auth,
        })
    }

    fn url_with(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.table.clone();
        url.query_pairs_mut().extend_pairs(params);
        url
    }

    fn list_url(&self) -> Url {
        self.url_with(&[("select", "*"), ("order", "created_at.desc")])
    }

    fn fetch_url(&self, id: &TaskId) -> Url {
        let filter = format!("eq.{id}");
        self.url_with(&[("select", "*"), ("id", &filter), ("limit", "1")])
    }

    fn row_url(&self, id: &TaskId) -> Url {
        let filter = format!("eq.{id}");
        self.url_with(&[("id", &filter)])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url).headers(self.auth.clone())
    }

    fn list_request(&self) -> RequestBuilder {
        self.request(Method::GET, self.list_url())
    }

    fn fetch_request(&self, id: &TaskId) -> RequestBuilder {
        self.request(Method::GET, self.fetch_url(id))
    }

    fn insert_request(&self, task: &NewTask) -> RequestBuilder {
        self.request(Method::POST, self.table.clone())
            .header("Prefer", "return=minimal")
            .json(&[task])
    }

    fn update_request(&self, id: &TaskId, changes: &TaskChanges) -> RequestBuilder {
        self.request(Method::PATCH, self.row_url(id)).json(changes)
    }

    fn toggle_request(&self, id: &TaskId, is_completed: bool) -> RequestBuilder {
        self.request(Method::PATCH, self.row_url(id))
            .json(&json!({ "is_completed": is_completed }))
    }

    fn delete_request(&self, id: &TaskId) -> RequestBuilder {
        self.request(Method::DELETE, self.row_url(id))
    }

    fn execute(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        let err = api_error(status, &body);
        warn!(status = status.as_u16(), error = %err, "task store rejected request");
        Err(err)
    }

    fn rows(&self, request: RequestBuilder) -> StoreResult<Vec<Task>> {
        let body = self.execute(request)?.text()?;
        decode_rows(&body)
    }
}

impl TaskStore for RestStore {
    #[tracing::instrument(skip(self))]
    fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let tasks = self.rows(self.list_request())?;
        debug!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    fn fetch_task(&self, id: &TaskId) -> StoreResult<Task> {
        self.rows(self.fetch_request(id))?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    #[tracing::instrument(skip(self))]
    fn insert_task(&self, task: &NewTask) -> StoreResult<()> {
        self.execute(self.insert_request(task))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn update_task(&self, id: &TaskId, changes: &TaskChanges) -> StoreResult<()> {
        self.execute(self.update_request(id, changes))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn set_completed(&self, id: &TaskId, is_completed: bool) -> StoreResult<()> {
        self.execute(self.toggle_request(id, is_completed))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn delete_task(&self, id: &TaskId) -> StoreResult<()> {
        self.execute(self.delete_request(id))?;
        Ok(())
    }
}

fn decode_rows(body: &str) -> StoreResult<Vec<Task>> {
    Ok(serde_json::from_str(body)?)
}

fn api_error(status: StatusCode, body: &str) -> StoreError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
    let code = parsed
        .as_ref()
        .and_then(|err| err.code.as_ref())
        .map(|code| match code {
            Value::String(code) => code.clone(),
            other => other.to_string(),
        });
    let message = parsed
        .and_then(|err| err.message)
        .filter(|message| !message.trim().is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|body| !body.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string())
        });

    StoreError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}
