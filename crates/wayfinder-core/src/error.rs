//! Engine-level errors.

use wayfinder_logic::error::NavError;

/// Errors raised while configuring or steering the engine
#[derive(Debug)]
pub enum EngineError {
    /// Rejected by the wayfinding core.
    Nav(NavError),
    /// Engine configuration JSON could not be parsed.
    Config(serde_json::Error),
    /// The entity is not a live pedestrian.
    NoSuchPedestrian(hecs::Entity),
}

impl From<NavError> for EngineError {
    fn from(e: NavError) -> Self {
        EngineError::Nav(e)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Config(e)
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Nav(e) => write!(f, "Navigation error: {}", e),
            EngineError::Config(e) => write!(f, "Config error: {}", e),
            EngineError::NoSuchPedestrian(entity) => write!(f, "No pedestrian {:?}", entity),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Nav(e) => Some(e),
            EngineError::Config(e) => Some(e),
            EngineError::NoSuchPedestrian(_) => None,
        }
    }
}
