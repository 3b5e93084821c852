use std::fmt;

/// Browser-facing pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SignIn,
    Dashboard,
    CreateAd,
    EditAd(String),
    DeleteAd(String),
}

impl Route {
    /// Where `/` sends a visitor.
    pub fn landing_target(authenticated: bool) -> Route {
        if authenticated { Route::Dashboard } else { Route::SignIn }
    }

    pub fn path(&self) -> String {
        match self {
            Self::SignIn => "/sign-in".into(),
            Self::Dashboard => "/dashboard".into(),
            Self::CreateAd => "/dashboard/create".into(),
            Self::EditAd(id) => format!("/dashboard/edit/{}", encode_segment(id)),
            Self::DeleteAd(id) => format!("/dashboard/delete/{}", encode_segment(id)),
        }
    }
}

/// Percent-encode one path segment. `byte_serialize` writes spaces as `+`,
/// which a path would keep literally, so those become `%20`.
fn encode_segment(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
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
    fn landing_redirects_by_session() {
        assert_eq!(Route::landing_target(true).path(), "/dashboard");
        assert_eq!(Route::landing_target(false).path(), "/sign-in");
    }

    #[test]
    fn id_routes_embed_the_id() {
        assert_eq!(Route::EditAd("abc".into()).to_string(), "/dashboard/edit/abc");
        assert_eq!(Route::DeleteAd("abc".into()).path(), "/dashboard/delete/abc");
    }

    #[test]
    fn ids_cannot_escape_their_segment() {
        assert_eq!(Route::EditAd("a/b?c".into()).path(), "/dashboard/edit/a%2Fb%3Fc");
        assert_eq!(Route::DeleteAd("a b+c".into()).path(), "/dashboard/delete/a%20b%2Bc");
        let uuid = "0b6c2f3e-8d1a-4c55-9b1e-2f4a6d8c0e13";
        assert_eq!(Route::EditAd(uuid.into()).path(), format!("/dashboard/edit/{}", uuid));
    }
}
