//! Spatial interaction engine for the infinite-canvas idea board.
//!
//! This crate owns everything that happens between a raw pointer event and a
//! settled scene mutation: translating screen input into world coordinates,
//! running the select / hand / connect gesture state machine, snapping and
//! merge-target detection while a note is dragged, rotation-aware resizing,
//! and the linear undo/redo history. It performs no I/O and never awaits; the
//! asynchronous half of the merge protocol is driven by the host through
//! [`merge::MergeTicket`]s emitted as [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`]: pointer/key handlers and commands |
//! | [`doc`] | Notes, connections and the [`doc::Scene`] that owns them |
//! | [`history`] | Snapshot-per-step undo/redo stack |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`geometry`] | Overlap tests, free-position search, de-overlap relaxation |
//! | [`input`] | Tools, modifiers and the gesture state machine types |
//! | [`hit`] | Rotation-aware hit-testing against notes and resize handles |
//! | [`resize`] | Anchored, rotation-aware resize math |
//! | [`snap`] | Alignment guides and merge-target detection |
//! | [`merge`] | Optimistic merge protocol: begin, complete, roll back |
//! | [`export`] | Markdown and SVG serialization of the scene |
//! | [`consts`] | Shared numeric constants (sizes, thresholds, zoom limits) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod export;
pub mod geometry;
pub mod hit;
pub mod history;
pub mod input;
pub mod merge;
pub mod resize;
pub mod snap;
