use rocket::Request;
use rocket::serde::json::Json;

use crate::error::ApiError;

pub fn parse_poll_id(id: &str) -> Result<u64, ApiError> {
    id.trim().parse().map_err(|_| ApiError::InvalidId(id.to_string()))
}

/// Unwraps a JSON body, turning parse failures into a 400 instead of
/// Rocket's default 422.
pub fn json_body<T>(body: Result<Json<T>, rocket::serde::json::Error<'_>>) -> Result<T, ApiError> {
    body.map(Json::into_inner)
        .map_err(|e| ApiError::MalformedBody(e.to_string()))
}

/// Caller address as resolved by Rocket: the configured `ip_header` when
/// present, else the socket peer. Raw forwarding headers are not trusted.
pub fn client_addr(req: &Request<'_>) -> String {
    req.client_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "0.0.0.0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poll_id() {
        assert_eq!(parse_poll_id("12").unwrap(), 12);
        assert!(matches!(parse_poll_id("abc"), Err(ApiError::InvalidId(id)) if id == "abc"));
        assert!(matches!(parse_poll_id("-1"), Err(ApiError::InvalidId(_))));
    }
}
