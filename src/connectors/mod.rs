//! Outbound connectors
//!
//! Each knowledge connector wraps one external information source as a plain
//! request-to-parsed-answer mapping. Failures never cross the connector
//! boundary: any network or parse error becomes an empty string so the
//! dialogue processor can apply its fallback logic uniformly. The light
//! connector is the one exception — it returns a `Result` so the processor
//! can speak a failure notice distinct from the success confirmation.

mod device;
mod knowledge;

pub use device::HttpLight;
pub use knowledge::HttpKnowledge;

use async_trait::async_trait;

use crate::Result;

/// Knowledge lookups used by the dialogue processor
#[async_trait]
pub trait Knowledge: Send + Sync {
    /// Random joke, formatted as `"{setup} ... {punchline}"`
    async fn joke(&self) -> String;

    /// First dictionary definition for `word`
    async fn definition(&self, word: &str) -> String;

    /// Current temperature at the configured coordinates
    async fn weather(&self) -> String;

    /// General-knowledge primary (instant-answer API)
    async fn answer(&self, query: &str) -> String;

    /// General-knowledge secondary (encyclopedia summary)
    async fn summary(&self, query: &str) -> String;
}

/// Binary light control
#[async_trait]
pub trait LightSwitch: Send + Sync {
    /// Set the light state; not retried on failure
    ///
    /// # Errors
    ///
    /// Returns error if the control endpoint is unreachable
    async fn set_light(&self, on: bool) -> Result<()>;
}
