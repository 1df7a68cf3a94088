use serde::{Deserialize, Serialize};

/// 按发送通道单段上限切分后的短信分段，按顺序拼接等于原文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageParts {
    parts: Vec<String>,
}

impl MessageParts {
    /// 按字符数切分，`max_part_len` 为 0 表示不限制
    pub fn split(body: &str, max_part_len: usize) -> Self {
        if max_part_len == 0 {
            return Self {
                parts: vec![body.to_string()],
            };
        }

        let mut parts = Vec::new();
        let mut start = 0;
        let mut count = 0;
        for (idx, _) in body.char_indices() {
            if count == max_part_len {
                parts.push(body[start..idx].to_string());
                start = idx;
                count = 0;
            }
            count += 1;
        }
        parts.push(body[start..].to_string());

        Self { parts }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn is_multipart(&self) -> bool {
        self.parts.len() > 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.parts
    }

    pub fn concat(&self) -> String {
        self.parts.concat()
    }
}

/// 发送通道对单个分段提交的原始结果码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitResultCode {
    Ok,
    GenericFailure,
    NoService,
    RadioOff,
    NullPdu,
    Other(i32),
}

impl SubmitResultCode {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitResultCode::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_body_is_single_part() {
        let parts = MessageParts::split("hi", 160);
        assert_eq!(parts.len(), 1);
        assert!(!parts.is_multipart());
        assert_eq!(parts.concat(), "hi");
    }

    #[test]
    fn test_body_at_limit_is_single_part() {
        let body = "x".repeat(160);
        let parts = MessageParts::split(&body, 160);
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_long_body_splits_in_order() {
        let body: String = (0..400).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let parts = MessageParts::split(&body, 160);

        assert_eq!(parts.len(), 3);
        assert_eq!(parts.as_slice()[0].chars().count(), 160);
        assert_eq!(parts.as_slice()[1].chars().count(), 160);
        assert_eq!(parts.as_slice()[2].chars().count(), 80);
        assert_eq!(parts.concat(), body);
    }

    #[test]
    fn test_split_respects_char_boundaries() {
        let body = "验证码123456请勿泄露";
        let parts = MessageParts::split(body, 5);

        assert!(parts.is_multipart());
        assert!(parts.iter().all(|p| p.chars().count() <= 5));
        assert_eq!(parts.concat(), body);
    }

    #[test]
    fn test_empty_body_and_unlimited() {
        let parts = MessageParts::split("", 160);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts.concat(), "");

        let body = "y".repeat(1000);
        let parts = MessageParts::split(&body, 0);
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_only_ok_code_is_success() {
        assert!(SubmitResultCode::Ok.is_success());
        assert!(!SubmitResultCode::GenericFailure.is_success());
        assert!(!SubmitResultCode::NoService.is_success());
        assert!(!SubmitResultCode::RadioOff.is_success());
        assert!(!SubmitResultCode::NullPdu.is_success());
        assert!(!SubmitResultCode::Other(42).is_success());
    }
}
