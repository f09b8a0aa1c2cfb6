//! # Authentication Module
//!
//! Owns the OAuth credential lifecycle for the signed-in user: the initial
//! handshake with the identity provider, lazy expiry detection, silent
//! refresh, and the sealed session token handed to the browser.

pub mod jwt;
pub mod oauth;
pub mod session;
