use std::fmt;

/// The outcome of a single admission decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed {
        reason: String,
    },
    AllowedWithWarning {
        reason: String,
        warning: String,
    },
    Denied {
        reason: String,
    },
}

/// A machine-readable tag for a [`Verdict`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allow,
    Warn,
    Deny,
}

// === impl Verdict ===

impl Verdict {
    pub fn allowed(reason: impl Into<String>) -> Self {
        Self::Allowed {
            reason: reason.into(),
        }
    }

    pub fn allowed_with_warning(reason: impl Into<String>, warning: impl Into<String>) -> Self {
        Self::AllowedWithWarning {
            reason: reason.into(),
            warning: warning.into(),
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: reason.into(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Allowed { .. } => Outcome::Allow,
            Self::AllowedWithWarning { .. } => Outcome::Warn,
            Self::Denied { .. } => Outcome::Deny,
        }
    }

    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Denied { .. })
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Allowed { reason }
            | Self::AllowedWithWarning { reason, .. }
            | Self::Denied { reason } => reason,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::AllowedWithWarning { warning, .. } => Some(warning),
            _ => None,
        }
    }
}

// === impl Outcome ===

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Warn => "allow-with-warning",
            Self::Deny => "deny",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_tags() {
        for (verdict, tag, allowed) in [
            (Verdict::allowed("ok"), "allow", true),
            (
                Verdict::allowed_with_warning("ok", "careful"),
                "allow-with-warning",
                true,
            ),
            (Verdict::denied("no"), "deny", false),
        ] {
            assert_eq!(verdict.outcome().to_string(), tag);
            assert_eq!(verdict.is_allowed(), allowed, "{tag}");
        }
    }
}
