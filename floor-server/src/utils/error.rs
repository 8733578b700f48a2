//! 统一错误处理
//!
//! 错误类型统一定义在 `shared::error`，这里只做 re-export，
//! 并补充 validator 错误转换。
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Reservation reservation:1"))
//!
//! // 返回成功响应
//! Ok(Json(reservation))
//! ```

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 把 validator 的错误汇总为一条可读消息
///
/// 形如 `guests: range; tables: length`，字段按字母序排列。
pub fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{}: {}", field, reasons.join(", "))
        })
        .collect();

    // nested structs (customer_info, dimensions) 报告为 "field: invalid"
    for (field, kind) in errors.errors() {
        if !matches!(kind, validator::ValidationErrorsKind::Field(_)) {
            parts.push(format!("{}: invalid", field));
        }
    }

    parts.sort();
    parts.join("; ")
}

/// 校验请求体，失败返回 400
pub fn validate_payload<T: validator::Validate>(payload: &T) -> AppResult<()> {
    payload
        .validate()
        .map_err(|e| AppError::validation(validation_message(&e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(range(min = 1))]
        guests: u32,
        #[validate(length(min = 1))]
        tables: Vec<String>,
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let sample = Sample {
            guests: 0,
            tables: vec![],
        };
        let err = validate_payload(&sample).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "guests: range; tables: length");
    }

    #[test]
    fn test_valid_payload_passes() {
        let sample = Sample {
            guests: 2,
            tables: vec!["dining_table:1".into()],
        };
        assert!(validate_payload(&sample).is_ok());
    }
}
