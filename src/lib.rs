//! xtcpress - comics and documents for 1-bit e-ink readers
//!
//! Converts image folders, single images and pre-rendered documents into
//! XTC containers of XTG bitmap pages (or 1-bit PNGs), and merges or splits
//! existing containers.
//! This library exposes modules for integration testing.

pub mod error;
pub mod format;
pub mod models;
pub mod rendering;
pub mod services;
