//! Hot reload of rule snapshots.
//!
//! A `notify` watcher forwards changed paths into a channel. One consumer
//! task per repository maps each path to its format, collapses bursts
//! within the debounce window, optionally syncs from a remote, re-parses
//! only the affected formats and publishes new snapshots to the
//! [`RuleStore`](crate::store::RuleStore). Subscribers then receive the
//! list of formats that changed.

mod manager;
mod watcher;


pub use manager::{
    ReloadHandle, ReloadManager, ReloadOptions, ReloadPhase, Subscriber, SubscriptionId,
};
