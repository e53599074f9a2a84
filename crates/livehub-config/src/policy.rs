//! First-match policy lookups over an application list.
//!
//! Application names are not required to be unique. Every lookup resolves to
//! the first entry carrying the name and never looks past it.

use crate::Application;

/// The first application named `name`, if any.
pub fn find_application<'a>(
    applications: &'a [Application],
    name: &str,
) -> Option<&'a Application> {
    applications.iter().find(|app| app.appname == name)
}

/// Whether `name` may publish live.
pub fn check_app_name(applications: &[Application], name: &str) -> bool {
    find_application(applications, name).is_some_and(|app| app.live)
}

/// Static push targets for `name`.
///
/// `None` covers an unknown name, an application that is not live, and a live
/// application without targets; callers treat all three as "do not push".
pub fn static_push_urls(applications: &[Application], name: &str) -> Option<Vec<String>> {
    let app = find_application(applications, name)?;
    if app.live && !app.static_push.is_empty() {
        Some(app.static_push.clone())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServerConfig;
    use pretty_assertions::assert_eq;

    fn app(name: &str, live: bool, push: &[&str]) -> Application {
        Application {
            appname: name.to_string(),
            live,
            static_push: push.iter().map(|url| url.to_string()).collect(),
            ..Application::default()
        }
    }

    #[test]
    fn default_application_is_live_without_targets() {
        let apps = ServerConfig::default().applications;
        assert!(check_app_name(&apps, "live"));
        assert!(!check_app_name(&apps, "nonexistent"));
        assert_eq!(static_push_urls(&apps, "live"), None);
    }

    #[test]
    fn live_application_returns_targets_in_order() {
        let apps = vec![app("a", true, &["u1", "u2"])];
        assert_eq!(
            static_push_urls(&apps, "a"),
            Some(vec!["u1".to_string(), "u2".to_string()])
        );
    }

    #[test]
    fn application_that_is_not_live_never_pushes() {
        let apps = vec![app("a", false, &["u1"])];
        assert!(!check_app_name(&apps, "a"));
        assert_eq!(static_push_urls(&apps, "a"), None);
    }

    #[test]
    fn duplicate_names_resolve_to_first_entry() {
        let apps = vec![app("x", false, &[]), app("x", true, &["u1"])];
        assert!(!check_app_name(&apps, "x"));
        assert_eq!(static_push_urls(&apps, "x"), None);
        assert_eq!(find_application(&apps, "x").map(|app| app.live), Some(false));
    }

    #[test]
    fn names_match_exactly() {
        let apps = vec![app("Live", true, &[])];
        assert!(!check_app_name(&apps, "live"));
        assert!(!check_app_name(&apps, ""));
    }
}
