//! Error plumbing shared by generators and tasks.

use std::any::Any;

use thiserror::Error;

/// Type-erased error carried out of a generator or task body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A frame body panicked while being resumed.
///
/// The panic is caught at the resume boundary; the frame is unusable
/// afterwards and its owner treats it as failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("frame panicked: {message}")]
pub struct Panicked {
    /// Panic message, when the payload was a string.
    pub message: String,
}

impl Panicked {
    /// Build from a payload returned by `std::panic::catch_unwind`.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_messages() {
        assert_eq!(Panicked::from_payload(Box::new("boom")).message, "boom");
        assert_eq!(
            Panicked::from_payload(Box::new(String::from("owned"))).message,
            "owned"
        );
        assert_eq!(
            Panicked::from_payload(Box::new(7_u32)).message,
            "non-string panic payload"
        );
    }

    #[test]
    fn display() {
        let p = Panicked {
            message: "index out of bounds".into(),
        };
        assert_eq!(p.to_string(), "frame panicked: index out of bounds");
    }
}
