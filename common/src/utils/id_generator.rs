//! Unique ID generator.

use uuid::Uuid;

/// Generates unique identifiers for plugin invocations.
pub struct IdGenerator;

impl IdGenerator {
    /// Generates a unique invocation ID.
    ///
    /// # Returns
    /// A unique UUID string.
    pub fn invocation_id() -> String {
        Uuid::new_v4().to_string()
    }
}
