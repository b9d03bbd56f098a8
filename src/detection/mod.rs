// Email-Change Detection Module
//
// - classifier: pure request classification over a keyword/pattern vocabulary
// - dedup: time-bucketed report suppression shared across threads
// - listener: per-request host callback tying the two together
//
// Architecture:
//   classifier.rs (leaf, pure)     dedup.rs (leaf, shared state)
//            ↑                          ↑
//            └──────── listener.rs ─────┘
//                          ↑
//                main.rs / menu.rs

pub mod classifier;
pub mod dedup;
pub mod listener;

pub use classifier::*;
pub use dedup::*;
pub use listener::*;
