use serde::{Deserialize, Serialize};

/// Key under which the mock session blob is stored.
pub const SESSION_KEY: &str = "tc_session";

/// Mock session blob written at login.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionData {
    pub name: String,
    pub email: String,
    pub city: String,
    pub country: String,
    pub age: Option<u32>,
    pub profession: String,
    pub created_at: Option<String>,
}

impl SessionData {
    /// Builds a session for `email`; a blank `name` is derived from the email's local part.
    pub fn for_login(email: &str, name: Option<&str>, created_at: impl Into<String>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| display_name_from_email(email));
        Self {
            name,
            email: email.trim().to_string(),
            created_at: Some(created_at.into()),
            ..Self::default()
        }
    }
}

/// Read side of the session store, injected wherever a page needs the login gate.
pub trait SessionGate {
    fn read_session(&self) -> Option<SessionData>;

    /// A session counts only when its blob parses and carries an email.
    fn has_session(&self) -> bool {
        self.read_session()
            .is_some_and(|session| !session.email.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountAccess {
    Granted(SessionData),
    RedirectToLogin,
}

/// Gate decision for account pages.
pub fn account_access(gate: &dyn SessionGate) -> AccountAccess {
    match gate.read_session() {
        Some(session) if !session.email.trim().is_empty() => AccountAccess::Granted(session),
        _ => AccountAccess::RedirectToLogin,
    }
}

/// `maria.jose_perez@x.cl` -> `Maria Jose Perez`; falls back to `Usuario`.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let name = local
        .split(|c: char| matches!(c, '.' | '_' | '-') || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        "Usuario".to_string()
    } else {
        name
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<SessionData>);

    impl SessionGate for Fixed {
        fn read_session(&self) -> Option<SessionData> {
            self.0.clone()
        }
    }

    #[test]
    fn names_derive_from_email_local_part() {
        assert_eq!(display_name_from_email("maria.jose_perez@x.cl"), "Maria Jose Perez");
        assert_eq!(display_name_from_email("ANA@x.cl"), "Ana");
        assert_eq!(display_name_from_email("@x.cl"), "Usuario");
    }

    #[test]
    fn gate_requires_an_email() {
        assert!(!Fixed(None).has_session());
        assert!(!Fixed(Some(SessionData::default())).has_session());

        let session = SessionData::for_login("ana@x.cl", None, "2024-01-01T00:00:00Z");
        assert_eq!(session.name, "Ana");
        let gate = Fixed(Some(session.clone()));
        assert!(gate.has_session());
        assert_eq!(account_access(&gate), AccountAccess::Granted(session));
        assert_eq!(account_access(&Fixed(None)), AccountAccess::RedirectToLogin);
    }
}
