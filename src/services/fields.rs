//! 表单字段派生规则 - 业务能力层
//!
//! 全部是纯函数，把记录里的原始字段切成页面各输入框需要的形状。

use anyhow::{bail, Result};

/// 出生日期拆分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParts {
    pub year: String,
    pub month: String,
    pub day: String,
}

/// "YYYY-MM-DD" -> {year, month, day}
///
/// 必须恰好被 '-' 切成 3 段，否则视为格式错误。
pub fn split_date(date: &str) -> Result<DateParts> {
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() != 3 {
        bail!("日期格式错误，应为 'YYYY-MM-DD': {}", date);
    }
    Ok(DateParts {
        year: parts[0].to_string(),
        month: parts[1].to_string(),
        day: parts[2].to_string(),
    })
}

/// 电话号码拆分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneParts {
    pub first_three: String,
    pub middle_four: String,
    pub last_four: String,
}

/// 电话号码从尾部切分：末 4 位、前 4 位、剩余前缀
pub fn split_phone(phone: &str) -> PhoneParts {
    let digits = phone.trim();
    let n = digits.len();
    PhoneParts {
        first_three: digits[..n.saturating_sub(8)].to_string(),
        middle_four: digits[n.saturating_sub(8)..n.saturating_sub(4)].to_string(),
        last_four: digits[n.saturating_sub(4)..].to_string(),
    }
}

/// 完整表单只取末 11 位
pub fn phone_full(phone: &str) -> &str {
    let digits = phone.trim();
    &digits[digits.len().saturating_sub(11)..]
}

/// 邮编拆分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipParts {
    pub first: String,
    pub last: String,
}

/// "XXX-XXXX" -> {first, last}
pub fn split_zipcode(zipcode: &str) -> Result<ZipParts> {
    let parts: Vec<&str> = zipcode.split('-').collect();
    if parts.len() != 2 {
        bail!("邮编格式错误，应为 'XXX-XXXX': {}", zipcode);
    }
    Ok(ZipParts {
        first: parts[0].to_string(),
        last: parts[1].to_string(),
    })
}

/// 同行者姓名按单个空格拆成恰好两段
///
/// 其他段数直接报错，不做猜测。
pub fn split_peer_name(peer_name: &str) -> Result<(String, String)> {
    let tokens: Vec<&str> = peer_name.trim().split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.len() != 2 {
        bail!("同行者姓名应为空格分隔的两段: {}", peer_name);
    }
    Ok((tokens[0].to_string(), tokens[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_splits_into_three_parts() {
        let parts = split_date("2020-11-12").unwrap();
        assert_eq!(parts.year, "2020");
        assert_eq!(parts.month, "11");
        assert_eq!(parts.day, "12");
    }

    #[test]
    fn date_with_wrong_separator_fails() {
        assert!(split_date("2020/11/12").is_err());
        assert!(split_date("2020-11").is_err());
        assert!(split_date("2020-11-12-01").is_err());
    }

    #[test]
    fn phone_splits_from_the_back() {
        let parts = split_phone("08012345678");
        assert_eq!(parts.first_three, "080");
        assert_eq!(parts.middle_four, "1234");
        assert_eq!(parts.last_four, "5678");
    }

    #[test]
    fn phone_full_keeps_trailing_eleven() {
        assert_eq!(phone_full("182110331391"), "82110331391");
        assert_eq!(phone_full("08012345678"), "08012345678");
    }

    #[test]
    fn zipcode_splits_into_two_parts() {
        let parts = split_zipcode("100-0001").unwrap();
        assert_eq!(parts.first, "100");
        assert_eq!(parts.last, "0001");
    }

    #[test]
    fn zipcode_without_hyphen_fails() {
        assert!(split_zipcode("1000001").is_err());
        assert!(split_zipcode("100-00-01").is_err());
    }

    #[test]
    fn peer_name_requires_exactly_two_tokens() {
        assert_eq!(
            split_peer_name("Hatsune Miku").unwrap(),
            ("Hatsune".to_string(), "Miku".to_string())
        );
        assert!(split_peer_name("Miku").is_err());
        assert!(split_peer_name("A B C").is_err());
    }
}
