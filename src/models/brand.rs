//! 品牌（商户身份）定义
//!
//! 每个品牌带有固定的账单身份：持卡人名称、邮编，以及可选的地址字段。

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AutomationError;

/// 支持的品牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    Booking,
    Expedia,
}

/// 品牌固定的账单地址
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingAddress {
    pub country: &'static str,
    pub street: &'static str,
    pub region: &'static str,
}

/// 品牌固定的账单身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingIdentity {
    pub cardholder_name: &'static str,
    pub postal_code: &'static str,
    /// 只有部分品牌需要填写国家/街道/地区
    pub address: Option<BillingAddress>,
}

impl Brand {
    /// 标准名称
    pub fn name(self) -> &'static str {
        match self {
            Brand::Booking => "booking",
            Brand::Expedia => "expedia",
        }
    }

    pub fn billing(self) -> BillingIdentity {
        match self {
            Brand::Booking => BillingIdentity {
                cardholder_name: "Booking.com B.V.",
                postal_code: "1017CE",
                address: None,
            },
            Brand::Expedia => BillingIdentity {
                cardholder_name: "Expedia Inc",
                postal_code: "98119",
                address: Some(BillingAddress {
                    country: "US",
                    street: "1111 Expedia Group Way W",
                    region: "WA",
                }),
            },
        }
    }
}

impl FromStr for Brand {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "booking" | "booking.com" => Ok(Brand::Booking),
            "expedia" => Ok(Brand::Expedia),
            other => Err(AutomationError::Config(format!(
                "未知品牌 '{}'，只支持 booking / expedia",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_brand_case_insensitively() {
        assert_eq!("Booking".parse::<Brand>().unwrap(), Brand::Booking);
        assert_eq!(" EXPEDIA ".parse::<Brand>().unwrap(), Brand::Expedia);
        assert!("agoda".parse::<Brand>().is_err());
    }

    #[test]
    fn only_expedia_fills_address() {
        assert!(Brand::Booking.billing().address.is_none());
        assert!(Brand::Expedia.billing().address.is_some());
    }
}
