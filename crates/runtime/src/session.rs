//! The dispatch loop.

use crate::conversation::Conversation;
use crate::llm::{Backend, ModelRequest, ToolCall, Turn, Usage};
use crate::{Error, Result};
use std::collections::HashSet;
use std::io::BufRead;
use tools::{Registry, ToolError, ToolSpec};
use uuid::Uuid;

/// Where the loop is between transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    AwaitingUserInput,
    AwaitingCompletion,
    DispatchingTools,
    Terminated,
}

/// A source of user input lines.
pub trait UserInput {
    /// The next line without its line terminator, or `None` at end of input.
    fn read_line(&mut self) -> std::io::Result<Option<String>>;
}

impl<R: BufRead> UserInput for R {
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if BufRead::read_line(self, &mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

/// Receives what the loop wants shown to the user.
pub trait Observer {
    /// About to wait for user input.
    fn prompt(&mut self) {}

    /// A text-only assistant turn.
    fn assistant(&mut self, _text: &str) {}

    /// A registered tool is about to run.
    fn tool_call(&mut self, _call: &ToolCall) {}

    /// A failure that returned control to the user.
    fn error(&mut self, _error: &Error) {}
}

impl Observer for () {}

/// A conversation between one user, one model backend, and a tool registry.
///
/// The session alternates between reading user input and asking the backend
/// for a completion. When the model requests tools, every call is executed in
/// order and answered before the backend is asked again, without involving
/// the user.
pub struct Session<B> {
    backend: B,
    registry: Registry,
    conversation: Conversation,
    system: Option<String>,
    usage: Usage,
    state: State,
}

impl<B: Backend> Session<B> {
    /// Create a new session with the given backend and tools.
    pub fn new(backend: B, registry: Registry) -> Self {
        Self {
            backend,
            registry,
            conversation: Conversation::new(),
            system: None,
            usage: Usage::default(),
            state: State::AwaitingUserInput,
        }
    }

    /// Set the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Token usage summed over every completion so far.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn tools(&self) -> &[ToolSpec] {
        self.registry.specs()
    }

    /// Drive the loop until input is exhausted or the user quits.
    ///
    /// Completion failures are reported to the observer and control returns
    /// to the user. Only input I/O failures or a broken conversation
    /// invariant end the loop with an error.
    pub async fn run(
        &mut self,
        input: &mut impl UserInput,
        observer: &mut impl Observer,
    ) -> Result<()> {
        while self.state != State::Terminated {
            self.step(input, observer).await?;
        }
        Ok(())
    }

    /// Perform one state transition and return the new state.
    pub async fn step(
        &mut self,
        input: &mut impl UserInput,
        observer: &mut impl Observer,
    ) -> Result<State> {
        self.state = match self.state {
            State::AwaitingUserInput => self.read_user_turn(input, observer)?,
            State::AwaitingCompletion => self.complete(observer).await?,
            State::DispatchingTools => self.dispatch_pending(observer).await?,
            State::Terminated => State::Terminated,
        };
        Ok(self.state)
    }

    fn read_user_turn(
        &mut self,
        input: &mut impl UserInput,
        observer: &mut impl Observer,
    ) -> Result<State> {
        observer.prompt();
        let Some(line) = input.read_line()? else {
            return Ok(State::Terminated);
        };

        let command = line.trim();
        if command.is_empty() {
            return Ok(State::AwaitingUserInput);
        }
        if matches!(command, "quit" | "exit") {
            return Ok(State::Terminated);
        }

        self.conversation.push(Turn::user(line))?;
        Ok(State::AwaitingCompletion)
    }

    async fn complete(&mut self, observer: &mut impl Observer) -> Result<State> {
        let request = ModelRequest {
            system: self.system.as_deref(),
            turns: self.conversation.turns(),
            tools: self.registry.specs(),
        };
        tracing::debug!(turns = request.turns.len(), "requesting completion");

        let mut response = match self.backend.call(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "completion failed");
                observer.error(&Error::Model(e));
                return Ok(State::AwaitingUserInput);
            }
        };

        self.usage += response.usage;
        assign_missing_ids(&mut response.tool_calls);
        let calls = response.tool_calls.len();
        tracing::debug!(calls, usage = ?response.usage, "completion received");

        let turn = response.into_turn();
        if calls > 0 {
            self.conversation.push(turn)?;
            return Ok(State::DispatchingTools);
        }

        observer.assistant(turn.content());
        self.conversation.push(turn)?;
        Ok(State::AwaitingUserInput)
    }

    async fn dispatch_pending(&mut self, observer: &mut impl Observer) -> Result<State> {
        let calls: Vec<ToolCall> = self
            .conversation
            .pending_calls()
            .into_iter()
            .cloned()
            .collect();

        for call in calls {
            let content = self.dispatch(&call, observer).await;
            self.conversation.push(Turn::tool_result(call.id, content))?;
        }
        Ok(State::AwaitingCompletion)
    }

    /// Run one tool call and render its outcome as result text.
    async fn dispatch(&self, call: &ToolCall, observer: &mut impl Observer) -> String {
        let Some(handler) = self.registry.lookup(&call.name) else {
            tracing::warn!(tool = %call.name, "model requested an unregistered tool");
            return ToolError::UnknownTool(call.name.clone()).to_string();
        };

        observer.tool_call(call);
        match handler.invoke(call.arguments.as_bytes()).await {
            Ok(output) => {
                tracing::debug!(tool = %call.name, id = %call.id, "tool succeeded");
                output
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, id = %call.id, error = %e, "tool failed");
                e.to_string()
            }
        }
    }
}

/// Give every call a distinct id so each result can be correlated.
fn assign_missing_ids(calls: &mut [ToolCall]) {
    let mut seen = HashSet::new();
    for call in calls {
        if call.id.is_empty() || !seen.insert(call.id.clone()) {
            call.id = format!("call_{}", Uuid::new_v4().simple());
            seen.insert(call.id.clone());
        }
    }
}
