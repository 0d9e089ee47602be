/*
 * Responsibility
 * - Public surface of the middleware layer
 * - auth (identity), cors, http (request id/trace/limits), security headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
