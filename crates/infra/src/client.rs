//! Boundary to the external game protocol client.
//!
//! The client itself (request framing, transport, decoding, auth tickets) lives
//! outside this workspace. Everything here talks to it through [`GameClient`].

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info};

use pokecull_core::{Coordinate, DomainError, DomainResult, ItemId};

/// Account provider used for login.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthService {
    Ptc,
    Google,
}

impl AuthService {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthService::Ptc => "ptc",
            AuthService::Google => "google",
        }
    }
}

impl core::fmt::Display for AuthService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthService {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ptc" => Ok(AuthService::Ptc),
            "google" => Ok(AuthService::Google),
            other => Err(DomainError::validation(format!(
                "invalid auth service `{other}` (expected 'ptc' or 'google')"
            ))),
        }
    }
}

/// Sub-request kinds understood by the remote service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    GetPlayer,
    GetInventory,
    GetMapObjects,
    FortDetails,
    FortSearch,
    ReleasePokemon,
}

impl Method {
    /// Wire name; also the key of this sub-request's entry in `Responses`.
    pub fn name(self) -> &'static str {
        match self {
            Method::GetPlayer => "GET_PLAYER",
            Method::GetInventory => "GET_INVENTORY",
            Method::GetMapObjects => "GET_MAP_OBJECTS",
            Method::FortDetails => "FORT_DETAILS",
            Method::FortSearch => "FORT_SEARCH",
            Method::ReleasePokemon => "RELEASE_POKEMON",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Method::GetPlayer,
            Method::GetInventory,
            Method::GetMapObjects,
            Method::FortDetails,
            Method::FortSearch,
            Method::ReleasePokemon,
        ]
        .into_iter()
        .find(|m| m.name() == name)
    }
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// One sub-operation inside a chained call.
#[derive(Debug, Clone, PartialEq)]
pub struct SubRequest {
    pub method: Method,
    pub params: Value,
}

/// Chained request: sub-operations executed by a single `call()`, in the order
/// they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestChain {
    requests: Vec<SubRequest>,
}

impl RequestChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, method: Method, params: Value) -> Self {
        self.requests.push(SubRequest { method, params });
        self
    }

    pub fn get_player(self) -> Self {
        self.add(Method::GetPlayer, json!({}))
    }

    pub fn get_inventory(self) -> Self {
        self.add(Method::GetInventory, json!({}))
    }

    pub fn release_pokemon(self, item_id: ItemId) -> Self {
        self.add(Method::ReleasePokemon, json!({ "pokemon_id": item_id.get() }))
    }

    pub fn requests(&self) -> &[SubRequest] {
        &self.requests
    }

    pub fn methods(&self) -> Vec<Method> {
        self.requests.iter().map(|r| r.method).collect()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Decoded response document of one `call()`.
///
/// Shape: `{ "responses": { "<METHOD NAME>": { ...decoded fields... } }, ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Responses(Value);

impl Responses {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Build a document from per-method bodies.
    pub fn from_bodies(bodies: impl IntoIterator<Item = (Method, Value)>) -> Self {
        let responses: Map<String, Value> = bodies
            .into_iter()
            .map(|(method, body)| (method.name().to_string(), body))
            .collect();
        Self(json!({ "status_code": 1, "responses": responses }))
    }

    pub fn get(&self, method: Method) -> Option<&Value> {
        self.0.get("responses").and_then(|r| r.get(method.name()))
    }

    pub fn require(&self, method: Method) -> Result<&Value, ClientError> {
        self.get(method)
            .ok_or(ClientError::MissingResponse(method.name()))
    }

    /// Raw document (for snapshots).
    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn into_raw(self) -> Value {
        self.0
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("login rejected: {0}")]
    LoginRejected(String),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("response is missing `{0}`")]
    MissingResponse(&'static str),

    #[error("{method} returned result {code}")]
    Rejected { method: &'static str, code: i64 },
}

/// The opaque protocol client.
pub trait GameClient {
    /// Authenticate the session. Must succeed before any `call`.
    fn login(&mut self, service: AuthService, username: &str, password: &str)
    -> Result<(), ClientError>;

    /// Position reported with every subsequent call of the session.
    fn set_position(&mut self, position: Coordinate);

    /// Execute a single or chained request.
    fn call(&mut self, chain: RequestChain) -> Result<Responses, ClientError>;

    /// Start a chained request.
    fn create_request(&self) -> RequestChain {
        RequestChain::new()
    }
}

/// Log in, mapping any rejection onto the fatal `AuthenticationFailure`.
pub fn authenticate<C: GameClient + ?Sized>(
    client: &mut C,
    service: AuthService,
    username: &str,
    password: &str,
) -> DomainResult<()> {
    client
        .login(service, username, password)
        .map_err(|e| DomainError::authentication(e.to_string()))?;
    info!(auth_service = %service, username, "logged in");
    Ok(())
}

/// Profile + inventory in one chained call.
pub fn fetch_player_and_inventory<C: GameClient + ?Sized>(
    client: &mut C,
) -> Result<Responses, ClientError> {
    let chain = client.create_request().get_player().get_inventory();
    let responses = client.call(chain)?;
    if let Some(name) = player_name(&responses) {
        info!(player = name, "fetched player profile");
    }
    Ok(responses)
}

pub fn player_name(responses: &Responses) -> Option<&str> {
    responses
        .get(Method::GetPlayer)?
        .get("player_data")?
        .get("username")?
        .as_str()
}

/// Disposal primitive: one `RELEASE_POKEMON` call.
pub fn release_item<C: GameClient + ?Sized>(
    client: &mut C,
    item_id: ItemId,
) -> Result<(), ClientError> {
    let chain = client.create_request().release_pokemon(item_id);
    let responses = client.call(chain)?;
    let body = responses.require(Method::ReleasePokemon)?;

    let code = match body.get("result") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) if s == "SUCCESS" => Some(1),
        Some(Value::String(_)) => Some(-1),
        _ => None,
    };

    match code {
        Some(1) => {
            debug!(item_id = %item_id, "release acknowledged");
            Ok(())
        }
        Some(code) => Err(ClientError::Rejected {
            method: Method::ReleasePokemon.name(),
            code,
        }),
        None => Err(ClientError::MissingResponse("RELEASE_POKEMON.result")),
    }
}
