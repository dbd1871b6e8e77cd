pub mod config;
pub mod domain;
pub mod outbound;

pub use domain::session;
pub use domain::user;
pub use domain::verification;
pub use outbound::repositories;

// Re-export commonly used types
pub use domain::session::service::SessionConfig;
pub use domain::session::service::SessionService;
pub use domain::verification::service::VerificationService;
