//! # Framework Errors
//!
//! Common error types used throughout the actor framework. Entity-specific failures travel
//! boxed inside [`FrameworkError::EntityError`] and can be recovered with
//! [`FrameworkError::entity_error`].

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Duplicate id: {0}")]
    DuplicateId(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Borrow the typed entity error, if this is an [`FrameworkError::EntityError`] of type `E`.
    pub fn entity_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            FrameworkError::EntityError(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// True when the failure came from the channel plumbing rather than the entity.
    pub fn is_transport(&self) -> bool {
        matches!(self, FrameworkError::ActorClosed | FrameworkError::ActorDropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, thiserror::Error)]
    #[error("out of stock")]
    struct OutOfStock;

    #[test]
    fn entity_error_downcasts_to_original_type() {
        let err = FrameworkError::EntityError(Box::new(OutOfStock));
        assert_eq!(err.entity_error::<OutOfStock>(), Some(&OutOfStock));
        assert!(err.entity_error::<std::io::Error>().is_none());
        assert!(!err.is_transport());
    }

    #[test]
    fn transport_errors_have_no_entity_error() {
        let err = FrameworkError::ActorClosed;
        assert!(err.entity_error::<OutOfStock>().is_none());
        assert!(err.is_transport());
    }
}
