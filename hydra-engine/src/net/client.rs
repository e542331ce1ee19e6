//! Game-server client over the browser `fetch` API.
//!
//! Works from both the main thread (`Window`) and a Web Worker
//! (`WorkerGlobalScope`). URL building and reply decoding are plain
//! functions so they can be tested natively.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Window, WorkerGlobalScope};

use crate::error::SyncError;
use crate::net::protocol::{
    AgentConfiguration, AgentConfigurationsResponse, AgentGameResponse, InitResponse,
    ProgressResponse, Reply, Request,
};
use crate::net::util::{build_query, join_url};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameServer {
    base_url: String,
}

impl GameServer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, request: &Request) -> String {
        let query = match request {
            Request::Init {
                level_size,
                dim_count,
            } => build_query(&[
                ("level_size", level_size.to_string()),
                ("n_dims", dim_count.to_string()),
            ]),
            Request::Progress { direction } => build_query(&[("direction", direction.to_string())]),
            Request::GameFromAgent(config) => build_query(&[
                ("level_size", config.level_size.to_string()),
                ("n_dims", config.n_dims.to_string()),
                ("model_name", config.model_name.clone()),
                ("train_timesteps", config.train_timesteps.to_string()),
            ]),
        };
        format!("{}{}", join_url(&self.base_url, request.name()), query)
    }

    pub async fn send(&self, request: &Request) -> Result<Reply, SyncError> {
        let url = self.url_for(request);
        log::debug!("GET {}", url);
        let body = fetch_text(&url).await?;
        decode_reply(request, &body)
    }

    pub async fn agent_configurations(&self) -> Result<Vec<AgentConfiguration>, SyncError> {
        let url = join_url(&self.base_url, "available_agent_configurations");
        let body = fetch_text(&url).await?;
        let parsed: AgentConfigurationsResponse = serde_json::from_str(&body)?;
        Ok(parsed.configurations)
    }
}

/// Decode a response body according to the request that produced it.
pub fn decode_reply(request: &Request, body: &str) -> Result<Reply, SyncError> {
    Ok(match request {
        Request::Init { .. } => Reply::Init(serde_json::from_str::<InitResponse>(body)?),
        Request::Progress { .. } => Reply::Progress(serde_json::from_str::<ProgressResponse>(body)?),
        Request::GameFromAgent(_) => {
            Reply::GameFromAgent(serde_json::from_str::<AgentGameResponse>(body)?)
        }
    })
}

async fn fetch_text(url: &str) -> Result<String, SyncError> {
    let global = js_sys::global();
    let promise = if let Some(window) = global.dyn_ref::<Window>() {
        window.fetch_with_str(url)
    } else if let Some(worker) = global.dyn_ref::<WorkerGlobalScope>() {
        worker.fetch_with_str(url)
    } else {
        return Err(SyncError::Request("fetch is unavailable in this context".to_string()));
    };

    let value = JsFuture::from(promise).await.map_err(js_request_error)?;
    let response: Response = value
        .dyn_into()
        .map_err(|_| SyncError::Request("fetch did not resolve to a Response".to_string()))?;
    if !response.ok() {
        return Err(SyncError::Http {
            status: response.status(),
        });
    }
    let text = JsFuture::from(response.text().map_err(js_request_error)?)
        .await
        .map_err(js_request_error)?;
    text.as_string()
        .ok_or_else(|| SyncError::Decode("response body is not text".to_string()))
}

fn js_request_error(e: JsValue) -> SyncError {
    SyncError::Request(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::protocol::{Diff, GameStatus};

    fn server() -> GameServer {
        GameServer::new("http://localhost:5000/")
    }

    #[test]
    fn init_url() {
        let url = server().url_for(&Request::Init {
            level_size: 5,
            dim_count: 4,
        });
        assert_eq!(url, "http://localhost:5000/init?level_size=5&n_dims=4");
    }

    #[test]
    fn progress_url_carries_signed_direction() {
        let url = server().url_for(&Request::Progress { direction: -5 });
        assert_eq!(url, "http://localhost:5000/progress?direction=-5");
    }

    #[test]
    fn game_from_agent_url_escapes_model_name() {
        let url = server().url_for(&Request::GameFromAgent(AgentConfiguration {
            model_name: "ppo large".to_string(),
            n_dims: 2,
            level_size: 5,
            train_timesteps: 5_000_000,
        }));
        assert_eq!(
            url,
            "http://localhost:5000/game_from_agent?level_size=5&n_dims=2&model_name=ppo%20large&train_timesteps=5000000"
        );
    }

    #[test]
    fn decodes_progress_reply() {
        let reply = decode_reply(
            &Request::Progress { direction: 1 },
            r#"{"diff": {"2": 1}, "status": 0}"#,
        )
        .unwrap();
        assert_eq!(
            reply,
            Reply::Progress(ProgressResponse {
                diff: Some(Diff::from([(2, 1)])),
                status: GameStatus::Playing,
            })
        );
    }

    #[test]
    fn malformed_body_is_a_request_failure() {
        let err = decode_reply(
            &Request::Init {
                level_size: 2,
                dim_count: 2,
            },
            "<html>502</html>",
        )
        .unwrap_err();
        assert!(err.is_request_failure());
    }
}
