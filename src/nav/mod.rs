pub mod engine;
pub mod request;

pub use engine::{NavContext, NavEngine, NavState, NavigationSession};
pub use request::{NavTarget, NavigationRequest};
