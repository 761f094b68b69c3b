mod card;
pub use card::*;

mod catalog;
pub use catalog::*;

mod engine;
pub use engine::*;

mod machine;
pub use machine::*;

mod view;
pub use view::*;

use serde::{Deserialize, Serialize};
use std::ops::Deref;

// TrackId
#[derive(Eq, PartialEq, Clone, Hash, Debug, Serialize, Deserialize)]
pub struct TrackId(pub(crate) String);

impl Deref for TrackId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<String> for TrackId {
    fn from(value: String) -> Self {
        TrackId(value)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        TrackId(value.to_string())
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod test_support;
