pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(not(windows))]
pub const EXEC_NAME: &str = "payform";
#[cfg(windows)]
pub const EXEC_NAME: &str = "payform.exe";

pub const API_URL_ENV: &str = "PAYFORM_API_URL";
pub const CONTEXT_STORE_PATH: &str = ".payform/context.json";

pub const DEFAULT_CURRENCY: &str = "EUR";
