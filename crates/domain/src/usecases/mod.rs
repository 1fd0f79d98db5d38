//! Application use cases / business logic

pub mod dispatch;
pub mod publish;

pub use dispatch::{DispatchConfig, DispatchError, DispatchLoop};
pub use publish::{PublishOutcome, PublishUseCase, PublishUseCaseError};
