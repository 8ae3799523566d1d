use crate::{error::{CuehandError, Result},
            oracle::{IntentOracle, OracleRequest}};
use serde_json::Value;
use std::{cell::RefCell, collections::VecDeque};

/// A request seen by [`ScriptedOracle`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub system: String,
    pub prompt: String,
    pub schema: Value,
}

#[derive(Debug)]
enum Reply {
    Value(Value),
    Failure(String),
}

/// Deterministic oracle answering from a queue of canned replies.
///
/// Every request is recorded. Running out of replies is an oracle failure.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    replies: RefCell<VecDeque<Reply>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: queue a successful reply
    pub fn respond(self, value: Value) -> Self {
        self.push(value);
        self
    }

    /// Builder method: queue a failure
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.replies.borrow_mut().push_back(Reply::Failure(message.into()));
        self
    }

    /// Queue a successful reply
    pub fn push(&self, value: Value) {
        self.replies.borrow_mut().push_back(Reply::Value(value));
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    /// Number of replies not consumed yet
    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl IntentOracle for ScriptedOracle {
    fn generate(&self, request: &OracleRequest<'_>) -> Result<Value> {
        self.requests.borrow_mut().push(RecordedRequest {
            system: request.system.to_string(),
            prompt: request.prompt.to_string(),
            schema: request.schema.clone(),
        });

        match self.replies.borrow_mut().pop_front() {
            Some(Reply::Value(value)) => Ok(value),
            Some(Reply::Failure(message)) => Err(CuehandError::Oracle(message)),
            None => Err(CuehandError::Oracle("no scripted reply left".to_string())),
        }
    }
}
