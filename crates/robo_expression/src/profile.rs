//! How each expression is presented on the indicator.

use robo_core::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionProfile {
    /// Indicator caption
    pub text: &'static str,
    /// Icon name from the icon font
    pub icon: &'static str,
    /// CSS class applied to the face; empty for the resting face
    pub face_class: &'static str,
}

pub fn profile(expression: Expression) -> ExpressionProfile {
    match expression {
        Expression::Neutral => ExpressionProfile {
            text: "Feeling friendly and ready to chat!",
            icon: "fa-smile",
            face_class: "",
        },
        Expression::Idle => ExpressionProfile {
            text: "Just hanging out... waiting for interaction",
            icon: "fa-meh",
            face_class: "idle",
        },
        Expression::Bored => ExpressionProfile {
            text: "Getting bored... need some conversation!",
            icon: "fa-tired",
            face_class: "bored",
        },
        Expression::Talking => ExpressionProfile {
            text: "Engaged in conversation!",
            icon: "fa-comment-dots",
            face_class: "talking",
        },
        // Excited reuses the talking face with its own caption.
        Expression::Excited => ExpressionProfile {
            text: "Excited to be talking with you!",
            icon: "fa-grin-stars",
            face_class: "talking",
        },
    }
}
