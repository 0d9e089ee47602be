/*!
 * Current-user extractor
 *
 * Responsibility:
 * - Hand the identity resolved by `middleware::auth::access` to handlers
 *
 * Public API:
 * - CurrentUser
 */

mod core;

pub use core::CurrentUser;
