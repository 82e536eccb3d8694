//! Wire models for the account and platform-profile backends.

use super::Platform;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account record returned by register/login.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Register/login response body (success and failure share one shape).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub data: Option<AccountRecord>,
    pub message: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest<'a> {
    pub user_id: &'a str,
    pub handle: &'a str,
}

/// Generic `{success, error|message}` reply used by link/refresh/unlink.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ActionResponse {
    /// Best available failure explanation from the backend.
    pub fn failure_reason(&self, fallback: &str) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// `GET /profile/:userId` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub success: bool,
    pub data: Option<RemoteUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsLinked {
    #[serde(default)]
    pub has_codeforces: bool,
    #[serde(default)]
    pub has_codechef: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandleRef {
    pub handle: Option<String>,
}

/// Authoritative account/link status for one user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    #[serde(default)]
    pub accounts_linked: AccountsLinked,
    pub codeforces: Option<HandleRef>,
    pub codechef: Option<HandleRef>,
}

impl RemoteUser {
    /// The linked handle for `platform`, only if the backend both reports the
    /// link and supplies a non-empty handle.
    pub fn linked_handle(&self, platform: Platform) -> Option<&str> {
        let (linked, handle) = match platform {
            Platform::Codeforces => (self.accounts_linked.has_codeforces, &self.codeforces),
            Platform::Codechef => (self.accounts_linked.has_codechef, &self.codechef),
        };
        if !linked {
            return None;
        }
        handle
            .as_ref()
            .and_then(|h| h.handle.as_deref())
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

/// Rating summary for one linked handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformProfile {
    pub platform: Platform,
    pub handle: String,
    pub rating: u32,
    pub max_rating: u32,
    /// Codeforces rank title
    pub rank: Option<String>,
    /// CodeChef star count
    pub stars: Option<u32>,
}

impl PlatformProfile {
    /// Build from the profile backend's loosely typed JSON.
    ///
    /// Returns the backend's `error` text when the body reports one.
    pub fn from_json(platform: Platform, requested_handle: &str, body: &Value) -> Result<Self, String> {
        if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
            return Err(err
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string()));
        }

        let handle = body
            .get("handle")
            .and_then(Value::as_str)
            .filter(|h| !h.is_empty())
            .unwrap_or(requested_handle)
            .to_string();
        let rating = lenient_u32(body.get("rating"));
        let max_rating = lenient_u32(body.get("max_rating").or_else(|| body.get("maxRating")));

        let (rank, stars) = match platform {
            Platform::Codeforces => {
                let rank = body
                    .get("rank")
                    .or_else(|| body.get("max_rank"))
                    .and_then(Value::as_str)
                    .filter(|r| !r.is_empty())
                    .unwrap_or("unrated")
                    .to_string();
                (Some(rank), None)
            }
            Platform::Codechef => (None, Some(lenient_u32(body.get("stars")))),
        };

        Ok(Self {
            platform,
            handle,
            rating,
            max_rating,
            rank,
            stars,
        })
    }
}

/// Accept numbers, numeric strings (including "4★"-style suffixes), or nothing.
fn lenient_u32(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_linked_handle_requires_flag_and_handle() {
        let user: RemoteUser = serde_json::from_value(json!({
            "accountsLinked": { "hasCodeforces": true, "hasCodechef": true },
            "codeforces": { "handle": "tourist" },
            "codechef": { "handle": "  " }
        }))
        .unwrap();

        assert_eq!(user.linked_handle(Platform::Codeforces), Some("tourist"));
        assert_eq!(user.linked_handle(Platform::Codechef), None);
    }

    #[test]
    fn test_linked_handle_ignores_unflagged_handle() {
        let user: RemoteUser = serde_json::from_value(json!({
            "accountsLinked": { "hasCodeforces": false },
            "codeforces": { "handle": "tourist" }
        }))
        .unwrap();

        assert_eq!(user.linked_handle(Platform::Codeforces), None);
    }

    #[test]
    fn test_codechef_profile_parses_string_numbers() {
        let body = json!({ "rating": "1876", "max_rating": "1950", "stars": "4★" });
        let profile = PlatformProfile::from_json(Platform::Codechef, "gennady", &body).unwrap();

        assert_eq!(profile.handle, "gennady");
        assert_eq!(profile.rating, 1876);
        assert_eq!(profile.max_rating, 1950);
        assert_eq!(profile.stars, Some(4));
        assert_eq!(profile.rank, None);
    }

    #[test]
    fn test_codeforces_profile_defaults() {
        let body = json!({ "handle": "tourist", "rating": 3800, "maxRating": 4000 });
        let profile = PlatformProfile::from_json(Platform::Codeforces, "x", &body).unwrap();

        assert_eq!(profile.handle, "tourist");
        assert_eq!(profile.max_rating, 4000);
        assert_eq!(profile.rank.as_deref(), Some("unrated"));
    }

    #[test]
    fn test_profile_error_body() {
        let body = json!({ "error": "User not found" });
        let err = PlatformProfile::from_json(Platform::Codeforces, "nobody", &body).unwrap_err();
        assert_eq!(err, "User not found");
    }

    #[test]
    fn test_action_response_failure_reason() {
        let resp: ActionResponse = serde_json::from_value(json!({ "success": false })).unwrap();
        assert_eq!(resp.failure_reason("Failed to link account"), "Failed to link account");

        let resp: ActionResponse =
            serde_json::from_value(json!({ "success": false, "error": "Handle taken" })).unwrap();
        assert_eq!(resp.failure_reason("x"), "Handle taken");
    }
}
