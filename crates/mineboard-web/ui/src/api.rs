use async_trait::async_trait;
use gloo::net::http::{Request, Response};
use mineboard_client::{StoreError, TaskStore};
use mineboard_shared::{
    ApiErrorBody, Category, NewTask, ServerInfo, Task, TaskId, ToggleAssignmentArgs,
};
use serde::de::DeserializeOwned;

const API_BASE: &str = "/api";

/// Talks to `mineboard-server` over the same origin the UI was served from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpTaskStore;

pub async fn fetch_categories() -> Result<Vec<Category>, StoreError> {
    let response = Request::get(&format!("{API_BASE}/categories"))
        .send()
        .await
        .map_err(unavailable)?;
    decode(check(response, None).await?).await
}

pub async fn fetch_server_info() -> Result<ServerInfo, StoreError> {
    let response = Request::get(&format!("{API_BASE}/server"))
        .send()
        .await
        .map_err(unavailable)?;
    decode(check(response, None).await?).await
}

#[async_trait(?Send)]
impl TaskStore for HttpTaskStore {
    async fn get_all(&self) -> Result<Vec<Task>, StoreError> {
        let response = Request::get(&format!("{API_BASE}/tasks"))
            .send()
            .await
            .map_err(unavailable)?;
        decode(check(response, None).await?).await
    }

    async fn create(&self, task: NewTask) -> Result<Task, StoreError> {
        let response = Request::post(&format!("{API_BASE}/tasks"))
            .json(&task)
            .map_err(|e| StoreError::Decode(format!("failed to encode task: {e}")))?
            .send()
            .await
            .map_err(unavailable)?;
        decode(check(response, None).await?).await
    }

    async fn toggle_completion(&self, task_id: TaskId) -> Result<(), StoreError> {
        let response = Request::post(&format!("{API_BASE}/tasks/{task_id}/completion"))
            .send()
            .await
            .map_err(unavailable)?;
        check(response, Some(task_id)).await.map(|_| ())
    }

    async fn toggle_assignment(&self, nickname: &str, task_id: TaskId) -> Result<(), StoreError> {
        let args = ToggleAssignmentArgs {
            nickname: nickname.to_string(),
        };
        let response = Request::post(&format!("{API_BASE}/tasks/{task_id}/players"))
            .json(&args)
            .map_err(|e| StoreError::Decode(format!("failed to encode nickname: {e}")))?
            .send()
            .await
            .map_err(unavailable)?;
        check(response, Some(task_id)).await.map(|_| ())
    }
}

fn unavailable(err: gloo::net::Error) -> StoreError {
    StoreError::Unavailable(format!("request failed: {err}"))
}

/// Maps non-2xx statuses onto [`StoreError`] using the `{"error": ..}` body
/// when the server sent one.
async fn check(response: Response, task_id: Option<TaskId>) -> Result<Response, StoreError> {
    if response.ok() {
        return Ok(response);
    }

    let status = response.status();
    if status == 404 {
        if let Some(id) = task_id {
            return Err(StoreError::NotFound(id));
        }
    }

    let message = match response.json::<ApiErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => response.status_text(),
    };
    tracing::warn!(status, %message, "task store request rejected");
    if status >= 500 {
        Err(StoreError::Unavailable(message))
    } else {
        Err(StoreError::Rejected { status, message })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::Decode(format!("decode error: {e}")))
}
