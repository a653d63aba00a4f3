pub mod client;
pub mod models;
pub mod schema;
pub mod tracker;

pub use client::ApiClient;
pub use models::{
    ApiError, ApiReply, ApiResponse, CreateTransactionRequest, Transaction, UpdateTransactionRequest,
};
pub use schema::{SchemaError, SchemaValidator};
pub use tracker::{CleanupReport, TransactionTracker};
