//! Boundary to the external color/theme provider
//!
//! Paint callbacks query colors by role; the core never interprets them.

use crate::color::Color;

/// Semantic color slots a paint callback may ask for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Background,
    Surface,
    Foreground,
    Accent,
    Border,
    /// Overlay tint used by hover and press states
    Highlight,
    /// Ripple fill
    Ripple,
}

/// Supplies colors to paint callbacks
pub trait ColorProvider {
    fn color(&self, role: ColorRole) -> Color;
}

impl<F> ColorProvider for F
where
    F: Fn(ColorRole) -> Color,
{
    fn color(&self, role: ColorRole) -> Color {
        self(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_provider() {
        let provider = |role: ColorRole| match role {
            ColorRole::Accent => Color::BLUE,
            _ => Color::WHITE,
        };
        assert_eq!(provider.color(ColorRole::Accent), Color::BLUE);
        assert_eq!(provider.color(ColorRole::Border), Color::WHITE);
    }
}
