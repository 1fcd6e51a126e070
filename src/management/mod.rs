mod cache;
mod report;
mod token;

pub use cache::CATALOG_NAMESPACE;
pub use cache::CATALOG_TTL;
pub use cache::CacheError;
pub use cache::CachedResponse;
pub use cache::ResponseCache;
pub use cache::USER_TTL;
pub use cache::user_namespace;
pub use report::HistoryManager;
pub use report::ReportError;
pub use report::ReportManager;
pub use report::history_csv;
pub use token::TokenManager;
