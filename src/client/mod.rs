use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{
    body::Incoming,
    header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT},
    Method, Request, Response,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client as HyperClient},
    rt::TokioExecutor,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::{timeout, Duration};

use crate::{
    config::Config,
    error::FetchError,
    model::{GroupDetails, UpdateAllResponse},
};

pub use self::response::ServiceResponse;

mod response;

static MY_USER_AGENT: &str = env!("CARGO_PKG_NAME");

type InnerClient = HyperClient<HttpsConnector<HttpConnector>, Full<Bytes>>;

pub struct Client {
    client: InnerClient,
}

impl Client {
    pub fn new() -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();

        let client = HyperClient::builder(TokioExecutor::new()).build(connector);

        info!("statistics client initialized");

        Self { client }
    }

    /// Requests the full details of one group, memberships included.
    pub async fn get_group_details(&self, group_id: u32) -> Result<GroupDetails, FetchError> {
        if group_id == 0 {
            return Err(FetchError::InvalidGroupId);
        }

        let url = format!("{}/groups/{group_id}", Config::get().api_base_url);
        let bytes = self.send_get_request(&url).await?;

        Self::decode(&url, bytes)
    }

    /// Asks the service to queue a refresh of every member of the group.
    /// The group's verification code authorizes the request.
    pub async fn post_update_all(
        &self,
        group_id: u32,
        verification_code: &str,
    ) -> Result<UpdateAllResponse, FetchError> {
        if group_id == 0 {
            return Err(FetchError::InvalidGroupId);
        }

        let url = format!("{}/groups/{group_id}/update-all", Config::get().api_base_url);
        let data = UpdateAllRequest { verification_code };
        let bytes = self.send_post_request(&url, &data).await?;

        Self::decode(&url, bytes)
    }

    /// Sends a GET request
    async fn send_get_request(&self, url: &str) -> Result<Bytes, FetchError> {
        trace!("sending GET request to url {url}");

        let req = Request::builder()
            .uri(url)
            .method(Method::GET)
            .header(USER_AGENT, MY_USER_AGENT)
            .body(Full::default())
            .map_err(|source| FetchError::Request {
                url: url.to_owned(),
                source,
            })?;

        self.dispatch(url, req).await
    }

    /// Sends a POST request containing JSON data
    async fn send_post_request<J>(&self, url: &str, data: &J) -> Result<Bytes, FetchError>
    where
        J: Serialize,
    {
        trace!("sending POST request to url {url}");

        let data = serde_json::to_vec(data).map_err(FetchError::Encode)?;

        let req = Request::builder()
            .method(Method::POST)
            .uri(url)
            .header(USER_AGENT, MY_USER_AGENT)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, data.len())
            .body(Full::new(Bytes::from(data)))
            .map_err(|source| FetchError::Request {
                url: url.to_owned(),
                source,
            })?;

        self.dispatch(url, req).await
    }

    /// A request that does not complete within the configured timeout is
    /// abandoned so the session never blocks indefinitely.
    async fn dispatch(&self, url: &str, req: Request<Full<Bytes>>) -> Result<Bytes, FetchError> {
        let seconds = Config::get().fetch_timeout;

        let response = match timeout(Duration::from_secs(seconds), self.client.request(req)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(source)) => {
                return Err(FetchError::Transport {
                    url: url.to_owned(),
                    source,
                })
            }
            Err(_) => {
                return Err(FetchError::TimedOut {
                    url: url.to_owned(),
                    seconds,
                })
            }
        };

        Self::error_for_status(response, url).await
    }

    async fn error_for_status(
        response: Response<Incoming>,
        url: &str,
    ) -> Result<Bytes, FetchError> {
        let status = response.status();

        let bytes = response
            .into_body()
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(|source| FetchError::Body {
                url: url.to_owned(),
                source,
            })?;

        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status,
                response: ServiceResponse::new(bytes),
            });
        }

        Ok(bytes)
    }

    fn decode<T: DeserializeOwned>(url: &str, bytes: Bytes) -> Result<T, FetchError> {
        serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
            url: url.to_owned(),
            text: String::from_utf8_lossy(&bytes).into_owned(),
            source,
        })
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAllRequest<'c> {
    verification_code: &'c str,
}
