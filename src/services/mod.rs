//! Business logic services

pub mod audit_log;

pub use audit_log::AuditLogService;
