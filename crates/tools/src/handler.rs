//! Tool handler contract.

use crate::{Result, ToolError};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;

/// Future returned by a [`Handler`] invocation.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<String>> + Send + 'static>>;

/// The local function behind a tool.
///
/// A handler receives the raw argument bytes exactly as the model emitted
/// them and returns a short human-readable result. Any closure or `async fn`
/// of shape `Fn(Vec<u8>) -> impl Future<Output = Result<String>>` is a
/// handler, which keeps test doubles trivial.
pub trait Handler: Send + Sync {
    /// Run the tool with the given raw arguments.
    fn invoke(&self, arguments: &[u8]) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Vec<u8>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    fn invoke(&self, arguments: &[u8]) -> HandlerFuture {
        Box::pin(self(arguments.to_vec()))
    }
}

/// Decode raw arguments into a handler's parameter record.
///
/// Empty input is treated as `{}` since some providers send nothing for
/// tools whose parameters are all optional.
pub(crate) fn decode<T: DeserializeOwned>(arguments: &[u8]) -> Result<T> {
    let arguments = if arguments.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        arguments
    };
    serde_json::from_slice(arguments).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

/// Reject an empty required string parameter.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ToolError::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Params {
        #[serde(default)]
        path: Option<String>,
    }

    #[test]
    fn decode_treats_blank_as_empty_object() {
        let params: Params = decode(b"  ").unwrap();
        assert!(params.path.is_none());
    }

    #[test]
    fn decode_reports_malformed_json_as_invalid_input() {
        let err = decode::<Params>(b"{\"path\":").unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn require_rejects_empty() {
        assert_eq!(
            require("path", "").unwrap_err().to_string(),
            "invalid input: path cannot be empty"
        );
        assert!(require("path", "x").is_ok());
    }

    #[tokio::test]
    async fn closures_are_handlers() {
        let handler = |args: Vec<u8>| async move { Ok::<_, ToolError>(format!("{} bytes", args.len())) };
        assert_eq!(handler.invoke(b"abc").await.unwrap(), "3 bytes");
    }
}
