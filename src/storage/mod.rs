//! Storage layer: JSON key-value store and managed media files.

pub mod media;
pub mod store;

pub use media::MediaStore;
pub use store::Store;

/// Key builders for the JSON store.
pub mod keys {
    /// Trial state for a user.
    pub fn trial(user_id: &str) -> String {
        format!("trial:{user_id}")
    }

    /// Subscription entitlement for a user.
    pub fn subscription(user_id: &str) -> String {
        format!("subscription:{user_id}")
    }

    /// Identification history index for a user (newest first).
    pub fn history(user_id: &str) -> String {
        format!("history:{user_id}")
    }

    /// Saved journeys for a user.
    pub fn journeys(user_id: &str) -> String {
        format!("journeys:{user_id}")
    }
}
