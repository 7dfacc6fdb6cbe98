use crate::validation::{ValidationVerdict, Validator};

/// The seam the repair loop validates through.
pub trait CommandValidator: Send + Sync {
    fn validate(&self, command: &str) -> ValidationVerdict;
}

impl CommandValidator for Validator {
    fn validate(&self, command: &str) -> ValidationVerdict {
        Validator::validate(self, command)
    }
}

impl<V: CommandValidator + ?Sized> CommandValidator for std::sync::Arc<V> {
    fn validate(&self, command: &str) -> ValidationVerdict {
        (**self).validate(command)
    }
}
