//! Dashboard links
//!
//! Tenants on `<tenant>.<region>.auth0.com` are managed at
//! `https://manage.auth0.com/dashboard/<region>/<tenant>/`. Custom domains
//! have no derivable dashboard, so every link built on top comes out empty.

const DASHBOARD: &str = "https://manage.auth0.com/dashboard";

/// Dashboard link of the tenant, or `""` when the domain is not an
/// `auth0.com` tenant domain
pub fn account_weblink(domain: &str) -> String {
    let parts: Vec<&str> = domain.split('.').collect();
    match parts.as_slice() {
        [tenant, region, "auth0", ..] => format!("{DASHBOARD}/{region}/{tenant}/"),
        _ => String::new(),
    }
}

/// Dashboard link of a user. `|` in the id is percent-encoded.
pub fn user_weblink(account_weblink: &str, user_id: &str) -> Option<String> {
    if account_weblink.is_empty() {
        return None;
    }
    Some(format!(
        "{account_weblink}users/{}",
        user_id.replace('|', "%7C")
    ))
}

/// Dashboard link of an application's settings page
pub fn client_weblink(account_weblink: &str, client_id: &str) -> Option<String> {
    if account_weblink.is_empty() {
        return None;
    }
    Some(format!("{account_weblink}applications/{client_id}/settings"))
}
