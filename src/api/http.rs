use std::thread;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;

use crate::api::{Completion, Deliver, FetchError, KataService, Request};
use crate::kata::{ExecutionRequest, ExecutionResult, KataDetail, KataListResponse, PhaseGroup};

pub struct HttpService {
    base_url: Url,
    client: Client,
    deliver: Deliver,
}

impl HttpService {
    pub fn new(base_url: &str, timeout: Duration, deliver: Deliver) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("kata server URL cannot take a path: {base_url}");
        }
        Ok(Self {
            base_url,
            client,
            deliver,
        })
    }
}

impl KataService for HttpService {
    fn send(&self, request: Request) {
        let client = self.client.clone();
        let base = self.base_url.clone();
        let deliver = self.deliver.clone();

        tracing::debug!(?request, "dispatching request");
        thread::spawn(move || {
            let completion = match request {
                Request::List => Completion::List(fetch_list(&client, &base)),
                Request::Detail(id) => {
                    let result = fetch_detail(&client, &base, &id);
                    Completion::Detail { id, result }
                }
                Request::Run { ticket, code } => Completion::Run {
                    ticket,
                    result: run_code(&client, &base, code),
                },
            };
            deliver(completion);
        });
    }
}

/// `base` with `segments` appended, each percent-encoded as one path
/// segment so ids cannot add path parts, a query or a fragment.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::Network(format!("{base} cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn fetch_list(client: &Client, base: &Url) -> Result<Vec<PhaseGroup>, FetchError> {
    let response = client
        .get(endpoint(base, &["katas"])?)
        .send()
        .map_err(|e| FetchError::Network(e.to_string()))?;
    let body: KataListResponse = decode(response)?;
    Ok(body.phases)
}

fn fetch_detail(client: &Client, base: &Url, id: &str) -> Result<KataDetail, FetchError> {
    let response = client
        .get(endpoint(base, &["katas", id])?)
        .send()
        .map_err(|e| FetchError::Network(e.to_string()))?;
    decode(response)
}

fn run_code(client: &Client, base: &Url, code: String) -> Result<ExecutionResult, FetchError> {
    let response = client
        .post(endpoint(base, &["playground", "run"])?)
        .json(&ExecutionRequest { code })
        .send()
        .map_err(|e| FetchError::Network(e.to_string()))?;
    decode(response)
}

fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    response
        .json::<T>()
        .map_err(|e| FetchError::Decode(e.to_string()))
}
