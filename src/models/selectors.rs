//! 远端虚拟终端的页面选择器

// 导航
pub const TRANSACTIONS_LINK: &str = "a[href$='/transactions']";
pub const TRANSACTIONS_LINK_FALLBACK: &str = "nav [data-nav='transactions']";
pub const NEW_TRANSACTION_LINK: &str = "a[href$='/transactions/new']";
pub const NEW_TRANSACTION_LINK_FALLBACK: &str = "button[data-action='new-transaction']";

// 表单
pub const TRANSACTION_FORM: &str = "form#new-transaction";
pub const MERCHANT_ACCOUNT: &str = "#merchantAccount";
pub const AMOUNT: &str = "#amount";
pub const ORDER_ID: &str = "#orderId";
pub const CUSTOMER_NAME: &str = "#customerName";
pub const CARD_NUMBER: &str = "#cardNumber";
pub const EXPIRY: &str = "#expiryDate";
pub const CVV: &str = "#cvc";
pub const CARDHOLDER_NAME: &str = "#holderName";
pub const POSTAL_CODE: &str = "#postalCode";
pub const COUNTRY: &str = "#country";
pub const STREET: &str = "#street";
pub const REGION: &str = "#stateOrProvince";
pub const SKIP_FRAUD_CHECK: &str = "#skipRiskCheck";
pub const SUBMIT_BUTTON: &str = "form#new-transaction button[type='submit']";

// 结果
pub const RESULT_STATUS: &str = "[data-testid='transaction-status']";
