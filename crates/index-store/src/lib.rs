//! # index-store
//!
//! Where finished runs go.
//!
//! - [`IndexStore`]: append-only index history (one row per scored run)
//! - [`NewsLedger`]: links the news monitor already published
//! - [`Notifier`]: Telegram delivery of monitor findings
//!
//! Persistence is best-effort from the runner's point of view: an insert
//! failure is reported, never retried here.

pub mod error;
pub mod store;
pub mod supabase;
pub mod telegram;

pub use error::{Result, StoreError};
pub use store::{IndexStore, MemoryLedger, MemoryStore, NewsEntry, NewsLedger};
pub use supabase::{SupabaseClient, SupabaseConfig};
pub use telegram::{MemoryNotifier, Notifier, TelegramConfig, TelegramNotifier, escape_markdown, news_message};
