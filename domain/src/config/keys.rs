//! Well-known keys of the persisted run-parameter artifact

pub const ENVIRONMENT: &str = "environment";
pub const CUSTOMER_TYPE: &str = "customerType";
pub const CITY: &str = "userSelectedCityProperty";
pub const MOBILE_PREFIX: &str = "mobileNoStarting2digitPrefix";
pub const LEAD_COUNT: &str = "totalLeadsToCreate";
pub const LAST_PROCESSED_INDEX: &str = "lastProcessedLeadIndex";
pub const RUN_DATE: &str = "leadScriptRunDate";
pub const GMAIL_DOMAIN: &str = "gmailDomain";
pub const CUSTOMER_NAME: &str = "customerName";

/// Nested sections keyed by environment name
pub const PROJECT_ENVIRONMENTS: &str = "projectEnvironments";
pub const LOGIN_CREDENTIALS: &str = "login_Credential";

/// Date format of `leadScriptRunDate`
pub const RUN_DATE_FORMAT: &str = "%d-%m-%Y";
