use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

macro_rules! token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn generate() -> Self {
                $name(Uuid::new_v4())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                Display::fmt(&self.0, f)
            }
        }
    };
}

token!(
    /// Identifies one page load. A history entry carrying another session was
    /// written before a reload and cannot be matched against the in-memory stack.
    SessionId
);

token!(
    /// Identifies one mounted page for its whole lifetime.
    ItemId
);

token!(OperationId);
