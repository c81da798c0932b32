use std::fmt;

use serde::Serialize;

/// Name, version and build details of a binary
///
/// `repo_version` and `build_timestamp` are only present when the crate
/// expanding [`build_info!`](crate::build_info) exports `REPO_VERSION` and
/// `BUILD_TIMESTAMP` from its build script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub profile: &'static str,
    pub repo_version: Option<&'static str>,
    pub build_timestamp: Option<&'static str>,
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} ({})", self.name, self.version, self.profile)?;
        if let Some(repo_version) = self.repo_version {
            write!(f, " {}", repo_version)?;
        }
        if let Some(timestamp) = self.build_timestamp {
            write!(f, " built {}", timestamp)?;
        }
        Ok(())
    }
}

/// Build info of the crate the macro is expanded in
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::version::BuildInfo {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            profile: match option_env!("BUILD_PROFILE") {
                Some(profile) => profile,
                None if cfg!(debug_assertions) => "debug",
                None => "release",
            },
            repo_version: option_env!("REPO_VERSION"),
            build_timestamp: option_env!("BUILD_TIMESTAMP"),
        }
    };
}

/// Build info of this library
pub fn build_info() -> BuildInfo {
    build_info!()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info() {
        let info = build_info();
        assert_eq!(info.name, "docseal-common");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.to_string().starts_with("docseal-common v"));
    }

    #[test]
    fn test_display_with_repo_details() {
        let info = BuildInfo {
            name: "docseal",
            version: "0.1.0",
            profile: "release",
            repo_version: Some("v0.1.0-3-gabc1234"),
            build_timestamp: Some("2024-01-01T00:00:00Z"),
        };
        assert_eq!(
            info.to_string(),
            "docseal v0.1.0 (release) v0.1.0-3-gabc1234 built 2024-01-01T00:00:00Z"
        );
    }
}
