/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// Access control is applied explicitly at the router level (the admin access
/// guard middleware), preventing accidental exposure of protected endpoints.

/// Routes accessible to all clients (storefront reads, sign-in, locale).
/// Handlers must enforce visibility checks (`published`, `active`) at the
/// repository level.
pub mod public;

/// Routes nested under the protected admin prefix. Every request reaching
/// these handlers has already passed the access guard.
pub mod admin;
