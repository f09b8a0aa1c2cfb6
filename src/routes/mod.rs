// # Routes Module
//
// - This module contains all HTTP route handlers for the gateway.
// - Routes are organized by functionality into separate submodules.
//
// ## Available Route Modules
// - `health`: Health check and monitoring endpoints
// - `auth`: Sign-in, OAuth callback, and session read surface
// - `chat`: Topic submission and conversation log endpoints
//
// ## Adding New Routes
// 1. Create a new file in the `routes/` directory
// 2. Add the module declaration here with `pub mod module_name;`
// 3. Register the routes in `server.rs` using the Router

/// Health check and monitoring endpoints
pub mod health;

/// Sign-in, OAuth callback, and session endpoints
pub mod auth;

/// Topic submission and conversation endpoints
pub mod chat;
