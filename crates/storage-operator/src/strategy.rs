/// Controls how much the operator may mutate a child resource that already exists.
///
/// Resolved once per reconciliation pass with [`ReconcileStrategy::resolve`] and passed down, so
/// every resource of a pass sees the same value.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ReconcileStrategy {
    /// Hands off: nothing is read, created or updated.
    Ignore,

    /// Create the resource if it is missing, never touch it afterwards.
    Init,

    /// Create the resource if it is missing, otherwise force it back to the desired state.
    #[default]
    Manage,
}

impl ReconcileStrategy {
    /// Maps a raw configuration value onto a strategy.
    ///
    /// Only the exact lowercase names are recognised. Never fails: empty and unrecognised values,
    /// including differently cased or padded names, resolve to [`ReconcileStrategy::Manage`].
    pub fn resolve(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("ignore", ReconcileStrategy::Ignore)]
    #[case("Ignore", ReconcileStrategy::Manage)]
    #[case("IGNORE", ReconcileStrategy::Manage)]
    #[case("init", ReconcileStrategy::Init)]
    #[case(" INIT ", ReconcileStrategy::Manage)]
    #[case("init ", ReconcileStrategy::Manage)]
    #[case("manage", ReconcileStrategy::Manage)]
    #[case("", ReconcileStrategy::Manage)]
    #[case("standalone", ReconcileStrategy::Manage)]
    #[case("something-else", ReconcileStrategy::Manage)]
    fn resolve(#[case] input: &str, #[case] expected: ReconcileStrategy) {
        assert_eq!(ReconcileStrategy::resolve(input), expected);
    }

    #[test]
    fn display_matches_configuration_value() {
        assert_eq!(ReconcileStrategy::Ignore.to_string(), "ignore");
        assert_eq!(ReconcileStrategy::Init.to_string(), "init");
        assert_eq!(ReconcileStrategy::Manage.to_string(), "manage");
    }
}
