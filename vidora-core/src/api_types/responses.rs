use serde::{Deserialize, Serialize};

/// Success envelope wrapping every payload the API returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data,
            message: message.into(),
            success: status_code < 400,
        }
    }

    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(200, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(201, data, message)
    }
}

/// Failure envelope produced at the HTTP boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub success: bool,
    pub errors: Vec<String>,
}

impl ApiErrorResponse {
    pub fn new(status_code: u16, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            success: false,
            errors,
        }
    }
}

/// Serializes as `{}` for endpoints with nothing to return.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Empty {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_is_camel_case() {
        let body = serde_json::to_value(ApiResponse::created(json!({"a": 1}), "Created")).unwrap();
        assert_eq!(
            body,
            json!({"statusCode": 201, "data": {"a": 1}, "message": "Created", "success": true})
        );
    }

    #[test]
    fn status_code_drives_success_flag() {
        assert!(!ApiResponse::new(404, Empty {}, "missing").success);
        assert!(ApiResponse::ok(Empty {}, "fine").success);
    }

    #[test]
    fn failure_envelope_always_unsuccessful() {
        let body = serde_json::to_value(ApiErrorResponse::new(409, "taken", vec![])).unwrap();
        assert_eq!(
            body,
            json!({"statusCode": 409, "message": "taken", "success": false, "errors": []})
        );
    }

    #[test]
    fn empty_serializes_as_object() {
        assert_eq!(serde_json::to_string(&Empty {}).unwrap(), "{}");
    }
}
