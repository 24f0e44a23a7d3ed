// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Location-based view selection.

/// Which surface a location selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Administrative course editor.
    Admin,
    /// The page-label driven student app.
    App,
}

impl Route {
    /// Paths starting with `/admin` select the admin view.
    pub fn resolve(path: &str) -> Self {
        if path.trim().starts_with("/admin") {
            Self::Admin
        } else {
            Self::App
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_prefix() {
        assert_eq!(Route::resolve("/admin"), Route::Admin);
        assert_eq!(Route::resolve("/admin/courses"), Route::Admin);
        assert_eq!(Route::resolve("/"), Route::App);
        assert_eq!(Route::resolve("/courses"), Route::App);
        assert_eq!(Route::resolve("admin"), Route::App);
    }
}
