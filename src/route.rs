use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    NewEntry,
    Details(String),
    Edit(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route: {0}")]
pub struct UnknownRoute(pub String);

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::NewEntry => "/new-entry".to_string(),
            Route::Details(id) => format!("/details/{id}"),
            Route::Edit(id) => format!("/edit-entry/{id}"),
        }
    }
}

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        match segments.as_slice() {
            [] => Ok(Route::Home),
            ["new-entry"] => Ok(Route::NewEntry),
            ["details", id] => Ok(Route::Details(id.to_string())),
            ["edit-entry", id] => Ok(Route::Edit(id.to_string())),
            _ => Err(UnknownRoute(path.to_string())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!("/".parse::<Route>(), Ok(Route::Home));
        assert_eq!("".parse::<Route>(), Ok(Route::Home));
        assert_eq!("/new-entry".parse::<Route>(), Ok(Route::NewEntry));
        assert_eq!("/details/42".parse::<Route>(), Ok(Route::Details("42".into())));
        assert_eq!("/edit-entry/42/".parse::<Route>(), Ok(Route::Edit("42".into())));
    }

    #[test]
    fn path_round_trips() {
        for route in [
            Route::Home,
            Route::NewEntry,
            Route::Details("abc".into()),
            Route::Edit("abc".into()),
        ] {
            assert_eq!(route.path().parse::<Route>(), Ok(route));
        }
    }

    #[test]
    fn rejects_unknown_paths() {
        assert!("/edit-entry".parse::<Route>().is_err());
        assert!("/blogs/1/2".parse::<Route>().is_err());
    }
}
