use std::fmt;

/// The two mutually exclusive results the authentication subsystem emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthSignal {
    LoggedIn,
    NotLoggedIn,
}

impl AuthSignal {
    /// Event name as fired on the page.
    pub fn event_name(&self) -> &'static str {
        match self {
            AuthSignal::LoggedIn => "USER_LOGGED_IN",
            AuthSignal::NotLoggedIn => "USER_NOT_LOGGED_IN",
        }
    }

    pub fn from_logged_in(logged_in: bool) -> Self {
        if logged_in {
            AuthSignal::LoggedIn
        } else {
            AuthSignal::NotLoggedIn
        }
    }
}

impl fmt::Display for AuthSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}
