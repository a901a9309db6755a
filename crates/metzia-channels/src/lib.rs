//! # metzia-channels
//!
//! Messaging platform integrations for Metzia.

pub mod whatsapp;
