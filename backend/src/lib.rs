//! SkillSwap Backend Library
//!
//! Skill-exchange marketplace API: swap request lifecycle, admin moderation
//! and the supporting skill, profile, review, message and verification
//! domains, on top of pluggable record and object stores.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod message;
pub mod middleware;
pub mod models;
pub mod moderation;
pub mod profile;
pub mod review;
pub mod routes;
pub mod skill;
pub mod state;
pub mod store;
pub mod swap;
pub mod verification;
