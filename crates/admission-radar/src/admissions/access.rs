use serde::{Deserialize, Serialize};

/// Caller identity as asserted by the upstream identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub email: Option<String>,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
        }
    }
}

/// Addresses allowed to administer the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList {
    emails: Vec<String>,
}

impl AdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|email| normalize(email.as_ref()))
            .filter(|email| !email.is_empty())
            .collect();
        Self { emails }
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// Case-insensitive, whitespace-tolerant membership check. A principal
    /// without an email is never permitted.
    pub fn permits(&self, principal: &Principal) -> bool {
        match principal.email.as_deref().map(normalize) {
            Some(email) if !email.is_empty() => self.emails.iter().any(|allowed| *allowed == email),
            _ => false,
        }
    }

    pub fn authorize(&self, principal: &Principal) -> Result<(), AccessDenied> {
        if self.permits(principal) {
            Ok(())
        } else {
            Err(AccessDenied {
                email: principal.email.clone(),
            })
        }
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} is not allowed to administer the catalog", .email.as_deref().unwrap_or("anonymous caller"))]
pub struct AccessDenied {
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permits_ignore_case_and_whitespace() {
        let allow = AdminAllowList::new([" Registrar@Example.edu "]);

        assert!(allow.permits(&Principal::with_email("registrar@example.edu")));
        assert!(allow.permits(&Principal::with_email("  REGISTRAR@example.EDU")));
        assert!(!allow.permits(&Principal::with_email("student@example.edu")));
    }

    #[test]
    fn anonymous_and_blank_principals_are_refused() {
        let allow = AdminAllowList::new(["registrar@example.edu", ""]);

        assert!(!allow.permits(&Principal::anonymous()));
        assert!(!allow.permits(&Principal::with_email("   ")));
        assert_eq!(
            allow.authorize(&Principal::anonymous()),
            Err(AccessDenied { email: None })
        );
    }
}
