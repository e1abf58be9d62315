/// Marker for view intents: user actions and cache or mutation results.
pub trait Intent: Send + 'static {}
