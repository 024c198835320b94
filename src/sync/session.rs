use std::fmt;

/// Whether the dashboard holds an authenticated session.
///
/// Only moves forward: a running dashboard never drops back to
/// `Unauthenticated`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated,
}

/// What the session flag means for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub login_form: bool,
    pub controls: bool,
}

impl SessionState {
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }

    pub fn visibility(self) -> Visibility {
        Visibility {
            login_form: !self.is_authenticated(),
            controls: self.is_authenticated(),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}
