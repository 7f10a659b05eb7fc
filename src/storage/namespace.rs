use std::fmt::Display;

use clap::ValueEnum;

/// Fixed list of keys the application stores data under. Backups only ever contain these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Namespace {
    Reports,
    Goals,
    #[value(name = "personal-info")]
    PersonalInfo,
    #[value(name = "work-days")]
    WorkDays,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Reports,
        Namespace::Goals,
        Namespace::PersonalInfo,
        Namespace::WorkDays,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Namespace::Reports => "reports",
            Namespace::Goals => "goals",
            Namespace::PersonalInfo => "personalInfo",
            Namespace::WorkDays => "workDays",
        }
    }

    pub fn from_key(key: &str) -> Option<Namespace> {
        Self::ALL.into_iter().find(|v| v.key() == key)
    }

    pub fn all_keys() -> Vec<String> {
        Self::ALL.iter().map(|v| v.key().to_string()).collect()
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::Namespace;

    #[test]
    fn keys_round_trip() {
        for namespace in Namespace::ALL {
            assert_eq!(Namespace::from_key(namespace.key()), Some(namespace));
        }
        assert_eq!(Namespace::from_key("@App:reports"), None);
    }
}
