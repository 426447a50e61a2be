//! Offline [`GameClient`] answering from a recorded response document.
//!
//! The recording is a snapshot such as `inventory.json`. Reads are answered
//! from it; releases are simulated and always succeed.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use tracing::{debug, info};

use pokecull_core::Coordinate;

use crate::client::{AuthService, ClientError, GameClient, Method, RequestChain, Responses};

#[derive(Debug, Clone)]
pub struct ReplayClient {
    recording: Responses,
    logged_in: bool,
    position: Option<Coordinate>,
    calls: Vec<Vec<Method>>,
}

impl ReplayClient {
    pub fn new(recording: Responses) -> Self {
        Self {
            recording,
            logged_in: false,
            position: None,
            calls: Vec::new(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ClientError::Transport(format!("{}: {e}", path.display())))?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| ClientError::Transport(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "replaying recorded responses");
        Ok(Self::new(Responses::from_value(value)))
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    /// Method lists of every call made, in order.
    pub fn calls(&self) -> &[Vec<Method>] {
        &self.calls
    }

    pub fn released(&self) -> usize {
        self.calls
            .iter()
            .flatten()
            .filter(|m| **m == Method::ReleasePokemon)
            .count()
    }
}

impl GameClient for ReplayClient {
    fn login(
        &mut self,
        service: AuthService,
        username: &str,
        _password: &str,
    ) -> Result<(), ClientError> {
        if username.trim().is_empty() {
            return Err(ClientError::LoginRejected("empty username".into()));
        }
        debug!(auth_service = %service, username, "replay login");
        self.logged_in = true;
        Ok(())
    }

    fn set_position(&mut self, position: Coordinate) {
        self.position = Some(position);
    }

    fn call(&mut self, chain: RequestChain) -> Result<Responses, ClientError> {
        if !self.logged_in {
            return Err(ClientError::NotAuthenticated);
        }
        self.calls.push(chain.methods());

        let bodies = chain.requests().iter().filter_map(|request| match request.method {
            Method::ReleasePokemon => {
                info!(params = %request.params, "simulated release");
                Some((request.method, json!({ "result": 1 })))
            }
            method => self.recording.get(method).cloned().map(|body| (method, body)),
        });
        Ok(Responses::from_bodies(bodies.collect::<Vec<_>>()))
    }
}
